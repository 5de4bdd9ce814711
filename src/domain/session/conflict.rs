//! Scheduling conflict detection.
//!
//! A conflict is reported per participant, not per overlapping session: the
//! coach appears at most once, and each child at most once.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChildId, SessionId, UserId};

use super::{Session, TimeSlot};

/// One participant who is already booked during the requested slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "child_id", rename_all = "snake_case")]
pub enum Conflict {
    Coach,
    Child(ChildId),
}

impl Conflict {
    pub fn message(&self) -> String {
        match self {
            Conflict::Coach => "Coach has conflicting sessions".to_string(),
            Conflict::Child(id) => format!("Child {} has conflicting sessions", id),
        }
    }
}

/// Who wants to be booked, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictQuery {
    pub coach_id: UserId,
    pub child_ids: Vec<ChildId>,
    pub slot: TimeSlot,
    /// Session to ignore, used when moving an existing session.
    pub exclude: Option<SessionId>,
}

impl ConflictQuery {
    pub fn new(coach_id: UserId, child_ids: Vec<ChildId>, slot: TimeSlot) -> Self {
        Self {
            coach_id,
            child_ids,
            slot,
            exclude: None,
        }
    }

    pub fn excluding(mut self, session_id: SessionId) -> Self {
        self.exclude = Some(session_id);
        self
    }

    /// Query that re-checks an existing session at a new slot.
    pub fn for_move(session: &Session, slot: TimeSlot) -> Self {
        Self::new(*session.coach_id(), session.child_ids().to_vec(), slot).excluding(*session.id())
    }

    fn considers(&self, session: &Session) -> bool {
        session.is_booked()
            && self.exclude.as_ref() != Some(session.id())
            && session.slot().overlaps(&self.slot)
    }
}

/// Scans candidate sessions once and reports who is double-booked.
///
/// Candidates may be any superset of the relevant sessions; non-booked,
/// excluded and non-overlapping ones are ignored. The coach conflict, if any,
/// comes first, followed by children in query order.
pub fn detect_conflicts<'a, I>(query: &ConflictQuery, candidates: I) -> Vec<Conflict>
where
    I: IntoIterator<Item = &'a Session>,
{
    let mut coach_busy = false;
    let mut busy_children = vec![false; query.child_ids.len()];

    for session in candidates {
        if !query.considers(session) {
            continue;
        }
        if session.coach_id() == &query.coach_id {
            coach_busy = true;
        }
        for (busy, child) in busy_children.iter_mut().zip(&query.child_ids) {
            if !*busy && session.involves_child(child) {
                *busy = true;
            }
        }
    }

    let mut conflicts = Vec::new();
    if coach_busy {
        conflicts.push(Conflict::Coach);
    }
    conflicts.extend(
        query
            .child_ids
            .iter()
            .zip(busy_children)
            .filter(|(_, busy)| *busy)
            .map(|(child, _)| Conflict::Child(*child)),
    );
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{LocationId, Timestamp};
    use crate::domain::session::SessionType;
    use proptest::prelude::*;

    fn at_minute(m: i64) -> Timestamp {
        Timestamp::from_datetime(chrono::DateTime::UNIX_EPOCH).plus_minutes(m)
    }

    fn slot(start: i64, end: i64) -> TimeSlot {
        TimeSlot::new(at_minute(start), at_minute(end)).unwrap()
    }

    fn booked(coach: UserId, children: Vec<ChildId>, start: i64, end: i64) -> Session {
        Session::book(
            SessionType::Group,
            coach,
            children,
            LocationId::new(),
            slot(start, end),
        )
        .unwrap()
    }

    #[test]
    fn no_candidates_means_no_conflicts() {
        let query = ConflictQuery::new(UserId::new(), vec![ChildId::new()], slot(0, 60));
        assert!(detect_conflicts(&query, std::iter::empty()).is_empty());
    }

    #[test]
    fn coach_overlap_is_reported_once() {
        let coach = UserId::new();
        let existing = vec![
            booked(coach, vec![ChildId::new()], 0, 60),
            booked(coach, vec![ChildId::new()], 30, 90),
        ];
        let query = ConflictQuery::new(coach, vec![ChildId::new()], slot(15, 45));

        let conflicts = detect_conflicts(&query, &existing);

        assert_eq!(conflicts, vec![Conflict::Coach]);
        assert_eq!(conflicts[0].message(), "Coach has conflicting sessions");
    }

    #[test]
    fn each_busy_child_is_reported() {
        let (a, b, c) = (ChildId::new(), ChildId::new(), ChildId::new());
        let existing = vec![
            booked(UserId::new(), vec![a], 0, 60),
            booked(UserId::new(), vec![c, a], 10, 20),
        ];
        let query = ConflictQuery::new(UserId::new(), vec![a, b, c], slot(0, 30));

        let conflicts = detect_conflicts(&query, &existing);

        assert_eq!(conflicts, vec![Conflict::Child(a), Conflict::Child(c)]);
        assert_eq!(
            conflicts[0].message(),
            format!("Child {} has conflicting sessions", a)
        );
    }

    #[test]
    fn back_to_back_sessions_do_not_conflict() {
        let coach = UserId::new();
        let existing = vec![booked(coach, vec![ChildId::new()], 0, 60)];
        let query = ConflictQuery::new(coach, vec![ChildId::new()], slot(60, 120));
        assert!(detect_conflicts(&query, &existing).is_empty());
    }

    #[test]
    fn canceled_and_completed_sessions_are_ignored() {
        let coach = UserId::new();
        let mut canceled = booked(coach, vec![ChildId::new()], 0, 60);
        canceled.cancel().unwrap();
        let mut completed = booked(coach, vec![ChildId::new()], 0, 60);
        completed.complete().unwrap();

        let query = ConflictQuery::new(coach, vec![ChildId::new()], slot(0, 60));
        assert!(detect_conflicts(&query, &[canceled, completed]).is_empty());
    }

    #[test]
    fn excluded_session_is_ignored() {
        let coach = UserId::new();
        let child = ChildId::new();
        let session = booked(coach, vec![child], 0, 60);

        let query = ConflictQuery::for_move(&session, slot(30, 90));

        assert!(detect_conflicts(&query, std::slice::from_ref(&session)).is_empty());
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in 0i64..1000, la in 1i64..300, b in 0i64..1000, lb in 1i64..300) {
            let x = slot(a, a + la);
            let y = slot(b, b + lb);
            prop_assert_eq!(x.overlaps(&y), y.overlaps(&x));
        }

        #[test]
        fn overlap_matches_interval_arithmetic(a in 0i64..1000, la in 1i64..300, b in 0i64..1000, lb in 1i64..300) {
            let x = slot(a, a + la);
            let y = slot(b, b + lb);
            let expected = a.max(b) < (a + la).min(b + lb);
            prop_assert_eq!(x.overlaps(&y), expected);
        }

        #[test]
        fn slot_always_overlaps_itself(a in 0i64..1000, la in 1i64..300) {
            let x = slot(a, a + la);
            prop_assert!(x.overlaps(&x));
        }
    }
}
