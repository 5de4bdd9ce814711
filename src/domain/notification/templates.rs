//! HTML email templates.

use chrono::FixedOffset;
use std::fmt::Write;

use crate::domain::foundation::Timestamp;
use crate::domain::people::UserRole;
use crate::domain::session::ReminderKind;

use super::EmailMessage;

const SIGNATURE: &str = "Grow Fitness Team";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// What a reminder email says about the upcoming session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderDetails {
    pub child_name: String,
    pub start_at: Timestamp,
    pub location: String,
    pub kind: ReminderKind,
}

/// One session listed in a daily digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestSessionLine {
    pub time: String,
    pub children: String,
    pub location: String,
}

/// One pending request listed in an admin digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRequestLine {
    pub request_type: String,
    pub session_date: String,
    pub requester: String,
}

pub fn session_reminder(to: &str, details: &ReminderDetails, offset: FixedOffset) -> EmailMessage {
    let local = details.start_at.in_offset(offset);
    let child = escape(&details.child_name);

    let subject = format!("Session Reminder - {} Notice", details.kind.notice_label());
    let html = format!(
        "<h2>Session Reminder</h2>\
         <p>Dear Parent,</p>\
         <p>This is a reminder that {child} has a fitness session:</p>\
         <ul>\
         <li><strong>Date:</strong> {date}</li>\
         <li><strong>Time:</strong> {time}</li>\
         <li><strong>Location:</strong> {location}</li>\
         </ul>\
         <p>Please ensure your child arrives on time and brings appropriate clothing.</p>\
         <p>Best regards,<br>{SIGNATURE}</p>",
        date = local.format(DATE_FORMAT),
        time = local.format(TIME_FORMAT),
        location = escape(&details.location),
    );

    EmailMessage::new(to, subject, html)
}

/// Builds a digest for one staff member. Only admins see pending requests.
pub fn daily_digest(
    to: &str,
    role: UserRole,
    today: Timestamp,
    offset: FixedOffset,
    sessions: &[DigestSessionLine],
    pending: &[DigestRequestLine],
) -> EmailMessage {
    let greeting = if role == UserRole::Admin { "Admin" } else { "Coach" };

    let mut html = format!(
        "<h2>Daily Digest - {}</h2><p>Dear {},</p><h3>Today's Sessions ({})</h3>",
        today.in_offset(offset).format(DATE_FORMAT),
        greeting,
        sessions.len()
    );

    if sessions.is_empty() {
        html.push_str("<p>No sessions scheduled for today.</p>");
    } else {
        html.push_str("<ul>");
        for line in sessions {
            let _ = write!(
                html,
                "<li>{} - {} at {}</li>",
                escape(&line.time),
                escape(&line.children),
                escape(&line.location)
            );
        }
        html.push_str("</ul>");
    }

    if role == UserRole::Admin {
        let _ = write!(html, "<h3>Pending Requests ({})</h3>", pending.len());
        if pending.is_empty() {
            html.push_str("<p>No pending requests.</p>");
        } else {
            html.push_str("<ul>");
            for line in pending {
                let _ = write!(
                    html,
                    "<li>{} request for {} - {}</li>",
                    escape(&line.request_type),
                    escape(&line.session_date),
                    escape(&line.requester)
                );
            }
            html.push_str("</ul>");
        }
    }

    let _ = write!(html, "<p>Have a great day!<br>{}</p>", SIGNATURE);

    EmailMessage::new(to, "Daily Digest - Grow Fitness", html)
}

pub fn milestone_congratulations(
    to: &str,
    child_name: &str,
    milestone_name: &str,
    awarded_at: Timestamp,
    offset: FixedOffset,
) -> EmailMessage {
    let child = escape(child_name);
    let milestone = escape(milestone_name);

    let subject = format!("Congratulations! {} achieved {}", child_name, milestone_name);
    let html = format!(
        "<h2>Congratulations!</h2>\
         <p>Dear Parent,</p>\
         <p>We're thrilled to announce that {child} has achieved the milestone:</p>\
         <h3>{milestone}</h3>\
         <p>Achieved on: {date}</p>\
         <p>This is a wonderful accomplishment and we're proud of {child}'s dedication and progress!</p>\
         <p>Keep up the great work!<br>{SIGNATURE}</p>",
        date = awarded_at.in_offset(offset).format(DATE_FORMAT),
    );

    EmailMessage::new(to, subject, html)
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn colombo() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    fn at(h: u32, m: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 3, 1, h, m, 0).unwrap())
    }

    #[test]
    fn reminder_uses_threshold_subject_and_local_time() {
        let email = session_reminder(
            "parent@example.com",
            &ReminderDetails {
                child_name: "Amaya".into(),
                start_at: at(10, 0),
                location: "Viharamahadevi Park".into(),
                kind: ReminderKind::DayBefore,
            },
            colombo(),
        );

        assert_eq!(email.subject, "Session Reminder - 24 Hours Notice");
        assert!(email.html.contains("Amaya has a fitness session"));
        assert!(email.html.contains("2026-03-01"));
        assert!(email.html.contains("15:30"));
        assert!(email.html.contains("Viharamahadevi Park"));
    }

    #[test]
    fn one_hour_subject() {
        let email = session_reminder(
            "p@example.com",
            &ReminderDetails {
                child_name: "Child".into(),
                start_at: at(10, 0),
                location: "Location".into(),
                kind: ReminderKind::HourBefore,
            },
            colombo(),
        );
        assert_eq!(email.subject, "Session Reminder - 1 Hour Notice");
    }

    #[test]
    fn coach_digest_omits_pending_requests() {
        let pending = [DigestRequestLine {
            request_type: "cancel".into(),
            session_date: "2026-03-02".into(),
            requester: "Ruwan".into(),
        }];

        let coach = daily_digest("c@grow.fit", UserRole::Coach, at(1, 0), colombo(), &[], &pending);
        let admin = daily_digest("a@grow.fit", UserRole::Admin, at(1, 0), colombo(), &[], &pending);

        assert_eq!(coach.subject, "Daily Digest - Grow Fitness");
        assert!(coach.html.contains("Dear Coach"));
        assert!(coach.html.contains("No sessions scheduled for today."));
        assert!(!coach.html.contains("Pending Requests"));
        assert!(admin.html.contains("Pending Requests (1)"));
        assert!(admin.html.contains("cancel request for 2026-03-02 - Ruwan"));
    }

    #[test]
    fn milestone_subject_names_child_and_milestone() {
        let email = milestone_congratulations("p@example.com", "Dinuk", "10 Sessions", at(0, 0), colombo());
        assert_eq!(email.subject, "Congratulations! Dinuk achieved 10 Sessions");
        assert!(email.html.contains("<h3>10 Sessions</h3>"));
    }

    #[test]
    fn names_are_html_escaped() {
        let email = milestone_congratulations("p@example.com", "<b>", "A&B", at(0, 0), colombo());
        assert!(email.html.contains("&lt;b&gt;"));
        assert!(email.html.contains("A&amp;B"));
    }
}
