//! CreateSessionHandler - Command handler for booking new sessions.

use std::sync::Arc;

use crate::domain::foundation::{ChildId, LocationId, UserId};
use crate::domain::people::UserRole;
use crate::domain::session::{ConflictQuery, Session, SessionError, SessionType, TimeSlot};
use crate::ports::{ChildRepository, SessionRepository, UserRepository};

use super::check_conflicts::find_conflicts;

/// Command to book a new session.
#[derive(Debug, Clone)]
pub struct CreateSessionCommand {
    pub session_type: SessionType,
    pub coach_id: UserId,
    pub child_ids: Vec<ChildId>,
    pub location_id: LocationId,
    pub slot: TimeSlot,
}

/// Handler for booking sessions.
pub struct CreateSessionHandler {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    children: Arc<dyn ChildRepository>,
}

impl CreateSessionHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        children: Arc<dyn ChildRepository>,
    ) -> Self {
        Self {
            sessions,
            users,
            children,
        }
    }

    pub async fn handle(&self, cmd: CreateSessionCommand) -> Result<Session, SessionError> {
        // 1. Build the aggregate (validates children against the type)
        let session = Session::book(
            cmd.session_type,
            cmd.coach_id,
            cmd.child_ids,
            cmd.location_id,
            cmd.slot,
        )?;

        // 2. Referenced people must exist
        self.ensure_coach(&cmd.coach_id).await?;
        self.ensure_children(session.child_ids()).await?;

        // 3. Reject double-bookings
        let query = ConflictQuery::new(cmd.coach_id, session.child_ids().to_vec(), cmd.slot);
        let conflicts = find_conflicts(self.sessions.as_ref(), &query).await?;
        if !conflicts.is_empty() {
            tracing::info!(
                coach_id = %cmd.coach_id,
                conflicts = conflicts.len(),
                "Session booking rejected due to conflicts"
            );
            return Err(SessionError::Conflict(conflicts));
        }

        // 4. Persist
        self.sessions.save(&session).await?;

        tracing::info!(
            session_id = %session.id(),
            coach_id = %cmd.coach_id,
            start_at = %session.start_at(),
            "Session booked"
        );

        Ok(session)
    }

    async fn ensure_coach(&self, coach_id: &UserId) -> Result<(), SessionError> {
        match self.users.find_by_id(coach_id).await? {
            Some(user) if user.role == UserRole::Coach => Ok(()),
            Some(_) => Err(SessionError::validation(
                "coach_id",
                format!("User {} is not a coach", coach_id),
            )),
            None => Err(SessionError::validation(
                "coach_id",
                format!("Coach not found: {}", coach_id),
            )),
        }
    }

    async fn ensure_children(&self, child_ids: &[ChildId]) -> Result<(), SessionError> {
        let found = self.children.find_by_ids(child_ids).await?;
        if let Some(missing) = child_ids
            .iter()
            .find(|id| !found.iter().any(|c| &c.id == *id))
        {
            return Err(SessionError::validation(
                "child_ids",
                format!("Child not found: {}", missing),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::World;
    use crate::domain::foundation::Timestamp;
    use crate::domain::foundation::{DomainError, SessionId};
    use crate::domain::session::{Conflict, ReminderKind};
    use async_trait::async_trait;

    struct Fixture {
        world: World,
        handler: CreateSessionHandler,
        coach: UserId,
        child: ChildId,
        location: LocationId,
    }

    async fn fixture() -> Fixture {
        let world = World::new();
        let coach = world.user(UserRole::Coach, "coach@grow.fit", "Nimal").await;
        let parent = world.user(UserRole::Parent, "p@example.com", "Ruwan").await;
        let child = world.child(&parent, "Amaya").await;
        let location = world.location("Park").await;
        let handler = CreateSessionHandler::new(
            world.store.clone(),
            world.store.clone(),
            world.store.clone(),
        );
        Fixture {
            world,
            handler,
            coach: coach.id,
            child: child.id,
            location: location.id,
        }
    }

    fn command(f: &Fixture, start: Timestamp) -> CreateSessionCommand {
        CreateSessionCommand {
            session_type: SessionType::Individual,
            coach_id: f.coach,
            child_ids: vec![f.child],
            location_id: f.location,
            slot: TimeSlot::new(start, start.plus_hours(1)).unwrap(),
        }
    }

    #[tokio::test]
    async fn books_session_when_slot_is_free() {
        let f = fixture().await;
        let start = Timestamp::now().plus_days(1);

        let session = f.handler.handle(command(&f, start)).await.unwrap();

        let stored = f.world.reload(&session).await;
        assert!(stored.is_booked());
        assert_eq!(stored.start_at(), start);
    }

    #[tokio::test]
    async fn rejects_overlapping_booking_with_all_conflicts() {
        let f = fixture().await;
        let start = Timestamp::now().plus_days(1);
        f.handler.handle(command(&f, start)).await.unwrap();

        let err = f
            .handler
            .handle(command(&f, start.plus_minutes(30)))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SessionError::Conflict(vec![Conflict::Coach, Conflict::Child(f.child)])
        );
    }

    #[tokio::test]
    async fn back_to_back_booking_is_allowed() {
        let f = fixture().await;
        let start = Timestamp::now().plus_days(1);
        f.handler.handle(command(&f, start)).await.unwrap();

        assert!(f.handler.handle(command(&f, start.plus_hours(1))).await.is_ok());
    }

    /// Overlap queries come back empty, as when a rival booking lands
    /// between the conflict check and the insert.
    struct LateRivalSessions {
        inner: Arc<dyn SessionRepository>,
    }

    #[async_trait]
    impl SessionRepository for LateRivalSessions {
        async fn save(&self, session: &Session) -> Result<(), DomainError> {
            self.inner.save(session).await
        }

        async fn update(&self, session: &Session) -> Result<(), DomainError> {
            self.inner.update(session).await
        }

        async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
            self.inner.find_by_id(id).await
        }

        async fn find_booked_overlapping(
            &self,
            _slot: &TimeSlot,
            _coach_id: &UserId,
            _child_ids: &[ChildId],
        ) -> Result<Vec<Session>, DomainError> {
            Ok(Vec::new())
        }

        async fn find_booked_starting_between(
            &self,
            from: &Timestamp,
            to: &Timestamp,
        ) -> Result<Vec<Session>, DomainError> {
            self.inner.find_booked_starting_between(from, to).await
        }

        async fn find_starting_between(
            &self,
            from: &Timestamp,
            to: &Timestamp,
        ) -> Result<Vec<Session>, DomainError> {
            self.inner.find_starting_between(from, to).await
        }

        async fn claim_reminder(&self, id: &SessionId, kind: ReminderKind) -> Result<bool, DomainError> {
            self.inner.claim_reminder(id, kind).await
        }

        async fn release_reminder(&self, id: &SessionId, kind: ReminderKind) -> Result<(), DomainError> {
            self.inner.release_reminder(id, kind).await
        }

        async fn count_completed_for_child(&self, child_id: &ChildId) -> Result<u64, DomainError> {
            self.inner.count_completed_for_child(child_id).await
        }
    }

    #[tokio::test]
    async fn storage_refuses_coach_double_booking_missed_by_the_check() {
        let f = fixture().await;
        let start = Timestamp::now().plus_days(1);
        f.handler.handle(command(&f, start)).await.unwrap();
        let racing = CreateSessionHandler::new(
            Arc::new(LateRivalSessions {
                inner: f.world.store.clone(),
            }),
            f.world.store.clone(),
            f.world.store.clone(),
        );

        let err = racing
            .handle(command(&f, start.plus_minutes(30)))
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::Conflict(vec![Conflict::Coach]));
        let day = SessionRepository::find_starting_between(
            f.world.store.as_ref(),
            &start,
            &start.plus_hours(1),
        )
        .await
        .unwrap();
        assert_eq!(day.len(), 1);
    }

    #[tokio::test]
    async fn unknown_child_is_a_validation_error() {
        let f = fixture().await;
        let mut cmd = command(&f, Timestamp::now());
        cmd.child_ids = vec![ChildId::new()];

        let err = f.handler.handle(cmd).await.unwrap_err();
        assert!(matches!(err, SessionError::ValidationFailed { ref field, .. } if field == "child_ids"));
    }

    #[tokio::test]
    async fn non_coach_cannot_run_sessions() {
        let f = fixture().await;
        let admin = f.world.user(UserRole::Admin, "a@grow.fit", "Admin").await;
        let mut cmd = command(&f, Timestamp::now());
        cmd.coach_id = admin.id;

        let err = f.handler.handle(cmd).await.unwrap_err();
        assert!(matches!(err, SessionError::ValidationFailed { ref field, .. } if field == "coach_id"));
    }
}
