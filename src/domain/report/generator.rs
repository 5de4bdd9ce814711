use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::foundation::{ChildId, Timestamp, UserId, ValidationError};
use crate::domain::invoice::{Invoice, InvoiceSummary};
use crate::domain::milestone::MilestoneAward;
use crate::domain::request::ScheduleRequest;
use crate::domain::session::{Session, SessionStatus};

/// Flat rate a coach earns for each completed session.
pub const COACH_RATE_PER_SESSION_LKR: i64 = 1_000;

const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Weekly,
    Monthly,
}

/// Inclusive reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl ReportRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, ValidationError> {
        if end.is_before(&start) {
            return Err(ValidationError::invalid_format(
                "end",
                "report range must not end before it starts",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, ts: &Timestamp) -> bool {
        !ts.is_before(&self.start) && !ts.is_after(&self.end)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub scheduled: u64,
    pub completed: u64,
    pub canceled: u64,
    /// Late reschedule or cancel requests filed in the window.
    pub late: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachPerformance {
    pub name: String,
    pub sessions: u64,
    pub earnings: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildActivity {
    pub name: String,
    pub sessions: u64,
    pub milestones: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardLine {
    pub child_name: String,
    pub awarded_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub period: ReportPeriod,
    pub date_range: ReportRange,
    pub attendance: Attendance,
    pub coach_performance: Vec<CoachPerformance>,
    pub child_activity: Vec<ChildActivity>,
    pub finance: InvoiceSummary,
    pub milestone_awards: Vec<AwardLine>,
}

/// Records loaded for one reporting window.
pub struct ReportInputs<'a> {
    pub sessions: &'a [Session],
    pub invoices: &'a [Invoice],
    pub awards: &'a [MilestoneAward],
    pub requests: &'a [ScheduleRequest],
    pub coach_names: &'a HashMap<UserId, String>,
    pub child_names: &'a HashMap<ChildId, String>,
}

impl ReportInputs<'_> {
    fn coach_name(&self, id: &UserId) -> String {
        self.coach_names
            .get(id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }

    fn child_name(&self, id: &ChildId) -> String {
        self.child_names
            .get(id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }
}

/// Builds a report from records already filtered to `range`.
///
/// Coaches and children are listed by name in alphabetical order. Awards
/// only count toward a child's activity when the child also trained in the
/// window.
pub fn generate_report(period: ReportPeriod, range: ReportRange, inputs: &ReportInputs<'_>) -> Report {
    let mut attendance = Attendance {
        scheduled: inputs.sessions.len() as u64,
        late: inputs.requests.iter().filter(|r| r.is_late).count() as u64,
        ..Attendance::default()
    };

    let mut coaches: BTreeMap<String, CoachPerformance> = BTreeMap::new();
    let mut children: BTreeMap<String, ChildActivity> = BTreeMap::new();

    for session in inputs.sessions {
        match session.status() {
            SessionStatus::Completed => attendance.completed += 1,
            SessionStatus::Canceled => attendance.canceled += 1,
            SessionStatus::Booked => {}
        }

        let name = inputs.coach_name(session.coach_id());
        let coach = coaches.entry(name.clone()).or_insert_with(|| CoachPerformance {
            name,
            sessions: 0,
            earnings: 0,
        });
        coach.sessions += 1;
        if session.status() == SessionStatus::Completed {
            coach.earnings += COACH_RATE_PER_SESSION_LKR;
        }

        for child_id in session.child_ids() {
            let name = inputs.child_name(child_id);
            children
                .entry(name.clone())
                .or_insert_with(|| ChildActivity {
                    name,
                    sessions: 0,
                    milestones: 0,
                })
                .sessions += 1;
        }
    }

    let milestone_awards = inputs
        .awards
        .iter()
        .map(|award| {
            let child_name = inputs.child_name(&award.child_id);
            if let Some(activity) = children.get_mut(&child_name) {
                activity.milestones += 1;
            }
            AwardLine {
                child_name,
                awarded_at: award.awarded_at,
            }
        })
        .collect();

    Report {
        period,
        date_range: range,
        attendance,
        coach_performance: coaches.into_values().collect(),
        child_activity: children.into_values().collect(),
        finance: InvoiceSummary::from_invoices(inputs.invoices),
        milestone_awards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{LocationId, MilestoneRuleId};
    use crate::domain::invoice::PaymentMethod;
    use crate::domain::request::RequestType;
    use crate::domain::session::{SessionType, TimeSlot};

    fn session(coach: UserId, children: Vec<ChildId>, start: Timestamp) -> Session {
        Session::book(
            SessionType::Group,
            coach,
            children,
            LocationId::new(),
            TimeSlot::new(start, start.plus_hours(1)).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        let now = Timestamp::now();
        assert!(ReportRange::new(now, now.plus_days(-1)).is_err());
        let range = ReportRange::new(now, now.plus_days(7)).unwrap();
        assert!(range.contains(&now));
        assert!(range.contains(&now.plus_days(7)));
        assert!(!range.contains(&now.plus_days(8)));
    }

    #[test]
    fn report_aggregates_attendance_coaches_children_and_finance() {
        let now = Timestamp::now();
        let (nimal, kasun) = (UserId::new(), UserId::new());
        let (amaya, dinuk) = (ChildId::new(), ChildId::new());

        let mut done = session(nimal, vec![amaya, dinuk], now.plus_days(1));
        done.complete().unwrap();
        let mut canceled = session(nimal, vec![amaya], now.plus_days(2));
        canceled.cancel().unwrap();
        let booked = session(kasun, vec![dinuk], now.plus_days(3));

        let request = {
            let mut r = ScheduleRequest::submit(
                RequestType::Cancel,
                &booked,
                UserId::new(),
                "travel",
                booked.start_at().plus_hours(-2),
            )
            .unwrap();
            r.reject("no", now).unwrap();
            r
        };

        let parent = UserId::new();
        let mut paid = Invoice::issue(parent, 5_000, now).unwrap();
        paid.mark_paid(PaymentMethod::Cash, None, now).unwrap();
        let unpaid = Invoice::issue(parent, 2_500, now).unwrap();

        let award = MilestoneAward::grant(amaya, MilestoneRuleId::new(), now);

        let coach_names = HashMap::from([(nimal, "Nimal".to_string()), (kasun, "Kasun".to_string())]);
        let child_names = HashMap::from([(amaya, "Amaya".to_string()), (dinuk, "Dinuk".to_string())]);

        let report = generate_report(
            ReportPeriod::Weekly,
            ReportRange::new(now, now.plus_days(7)).unwrap(),
            &ReportInputs {
                sessions: &[done, canceled, booked],
                invoices: &[paid, unpaid],
                awards: std::slice::from_ref(&award),
                requests: std::slice::from_ref(&request),
                coach_names: &coach_names,
                child_names: &child_names,
            },
        );

        assert_eq!(
            report.attendance,
            Attendance {
                scheduled: 3,
                completed: 1,
                canceled: 1,
                late: 1,
            }
        );
        assert_eq!(
            report.coach_performance,
            vec![
                CoachPerformance {
                    name: "Kasun".into(),
                    sessions: 1,
                    earnings: 0,
                },
                CoachPerformance {
                    name: "Nimal".into(),
                    sessions: 2,
                    earnings: COACH_RATE_PER_SESSION_LKR,
                },
            ]
        );
        assert_eq!(
            report.child_activity,
            vec![
                ChildActivity {
                    name: "Amaya".into(),
                    sessions: 2,
                    milestones: 1,
                },
                ChildActivity {
                    name: "Dinuk".into(),
                    sessions: 2,
                    milestones: 0,
                },
            ]
        );
        assert_eq!(report.finance.total_paid, 5_000);
        assert_eq!(report.finance.total_unpaid, 2_500);
        assert_eq!(report.milestone_awards[0].child_name, "Amaya");
    }

    #[test]
    fn missing_names_fall_back_to_unknown() {
        let now = Timestamp::now();
        let sessions = [session(UserId::new(), vec![ChildId::new()], now)];
        let report = generate_report(
            ReportPeriod::Monthly,
            ReportRange::new(now, now.plus_days(30)).unwrap(),
            &ReportInputs {
                sessions: &sessions,
                invoices: &[],
                awards: &[],
                requests: &[],
                coach_names: &HashMap::new(),
                child_names: &HashMap::new(),
            },
        );
        assert_eq!(report.coach_performance[0].name, "Unknown");
        assert_eq!(report.child_activity[0].name, "Unknown");
    }
}
