//! CheckConflictsHandler - Query handler for scheduling conflicts.

use std::sync::Arc;

use crate::domain::session::{detect_conflicts, Conflict, ConflictQuery, SessionError};
use crate::ports::SessionRepository;

/// Loads overlap candidates and reports double-bookings for `query`.
///
/// Shared by session creation and reschedule approval.
pub(crate) async fn find_conflicts(
    sessions: &dyn SessionRepository,
    query: &ConflictQuery,
) -> Result<Vec<Conflict>, SessionError> {
    let candidates = sessions
        .find_booked_overlapping(&query.slot, &query.coach_id, &query.child_ids)
        .await?;
    Ok(detect_conflicts(query, &candidates))
}

/// Handler for answering "would this booking conflict?".
pub struct CheckConflictsHandler {
    sessions: Arc<dyn SessionRepository>,
}

impl CheckConflictsHandler {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    pub async fn handle(&self, query: ConflictQuery) -> Result<Vec<Conflict>, SessionError> {
        let conflicts = find_conflicts(self.sessions.as_ref(), &query).await?;
        tracing::debug!(
            coach_id = %query.coach_id,
            conflicts = conflicts.len(),
            "Checked session conflicts"
        );
        Ok(conflicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::World;
    use crate::domain::foundation::{ChildId, Timestamp, UserId};
    use crate::domain::people::UserRole;
    use crate::domain::session::TimeSlot;

    #[tokio::test]
    async fn reports_coach_and_child_conflicts_from_storage() {
        let world = World::new();
        let coach = world.user(UserRole::Coach, "coach@grow.fit", "Nimal").await;
        let parent = world.user(UserRole::Parent, "p@example.com", "Ruwan").await;
        let child = world.child(&parent, "Amaya").await;
        let park = world.location("Park").await;
        let start = Timestamp::now().plus_days(2);
        world.session(coach.id, vec![child.id], &park, start).await;

        let handler = CheckConflictsHandler::new(world.store.clone());
        let slot = TimeSlot::new(start.plus_minutes(30), start.plus_minutes(90)).unwrap();

        let conflicts = handler
            .handle(ConflictQuery::new(coach.id, vec![child.id, ChildId::new()], slot))
            .await
            .unwrap();

        assert_eq!(conflicts, vec![Conflict::Coach, Conflict::Child(child.id)]);
    }

    #[tokio::test]
    async fn free_slot_has_no_conflicts() {
        let world = World::new();
        let handler = CheckConflictsHandler::new(world.store.clone());
        let start = Timestamp::now();
        let slot = TimeSlot::new(start, start.plus_hours(1)).unwrap();

        let conflicts = handler
            .handle(ConflictQuery::new(UserId::new(), vec![ChildId::new()], slot))
            .await
            .unwrap();

        assert!(conflicts.is_empty());
    }
}
