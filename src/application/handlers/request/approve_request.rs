//! ApproveRequestHandler - applies an approved reschedule or cancellation.

use std::sync::Arc;

use crate::application::handlers::session::find_conflicts;
use crate::domain::crm::CrmEvent;
use crate::domain::foundation::{RequestId, Timestamp, UserId};
use crate::domain::request::{RequestError, RequestType, ScheduleRequest};
use crate::domain::session::{ConflictQuery, Session, TimeSlot};
use crate::ports::{CrmEventRepository, RequestRepository, SessionRepository};

#[derive(Debug, Clone)]
pub struct ApproveRequestCommand {
    pub request_id: RequestId,
    pub admin_id: UserId,
    /// Required for reschedule requests, ignored for cancellations.
    pub new_slot: Option<TimeSlot>,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApproveRequestResult {
    pub request: ScheduleRequest,
    pub session: Session,
    pub event: CrmEvent,
}

pub struct ApproveRequestHandler {
    sessions: Arc<dyn SessionRepository>,
    requests: Arc<dyn RequestRepository>,
    crm: Arc<dyn CrmEventRepository>,
}

impl ApproveRequestHandler {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        requests: Arc<dyn RequestRepository>,
        crm: Arc<dyn CrmEventRepository>,
    ) -> Self {
        Self {
            sessions,
            requests,
            crm,
        }
    }

    pub async fn handle(&self, cmd: ApproveRequestCommand) -> Result<ApproveRequestResult, RequestError> {
        let now = Timestamp::now();

        // 1. Load and check the request before touching the session
        let mut request = self
            .requests
            .find_by_id(&cmd.request_id)
            .await?
            .ok_or(RequestError::NotFound(cmd.request_id))?;
        if !request.status.is_pending() {
            return Err(RequestError::InvalidState(format!(
                "Request {} is already {}",
                request.id, request.status
            )));
        }

        let mut session = self
            .sessions
            .find_by_id(&request.session_id)
            .await?
            .ok_or(RequestError::SessionNotFound(request.session_id))?;

        // 2. Apply the change to the session
        let original = session.clone();
        let event = match request.request_type {
            RequestType::Reschedule => {
                let new_slot = cmd.new_slot.ok_or(RequestError::MissingNewSlot)?;

                let query = ConflictQuery::for_move(&session, new_slot);
                let conflicts = find_conflicts(self.sessions.as_ref(), &query).await?;
                if !conflicts.is_empty() {
                    return Err(RequestError::Conflict(conflicts));
                }

                let old_slot = session.reschedule(new_slot)?;
                CrmEvent::session_rescheduled(cmd.admin_id, &request, &old_slot, &new_slot, now)
            }
            RequestType::Cancel => {
                session.cancel()?;
                CrmEvent::session_canceled(cmd.admin_id, &request, now)
            }
        };
        request.approve(cmd.note, now)?;

        // 3. Persist the session, then close the request
        self.sessions.update(&session).await?;
        if let Err(e) = self.requests.update(&request).await {
            // The request stays pending, so the session goes back to match it.
            if let Err(restore) = self.sessions.update(&original).await {
                tracing::error!(
                    request_id = %request.id,
                    session_id = %session.id(),
                    error = %restore,
                    "Could not restore session after failed request update"
                );
            }
            return Err(e.into());
        }

        // 4. The approval is committed; a lost audit entry must not undo it
        if let Err(e) = self.crm.append(&event).await {
            tracing::error!(
                request_id = %request.id,
                error = %e,
                "Failed to log approval CRM event"
            );
        }

        tracing::info!(
            request_id = %request.id,
            session_id = %session.id(),
            request_type = %request.request_type,
            admin_id = %cmd.admin_id,
            "Schedule request approved"
        );

        Ok(ApproveRequestResult {
            request,
            session,
            event,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::World;
    use crate::domain::crm::CrmEventKind;
    use crate::domain::people::UserRole;
    use crate::domain::request::RequestStatus;
    use crate::domain::foundation::DomainError;
    use crate::domain::session::{Conflict, ReminderKind, SessionStatus};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Fixture {
        world: World,
        handler: ApproveRequestHandler,
        session: Session,
        admin: UserId,
    }

    async fn fixture() -> Fixture {
        let world = World::new();
        let admin = world.user(UserRole::Admin, "admin@grow.fit", "Admin").await;
        let coach = world.user(UserRole::Coach, "coach@grow.fit", "Nimal").await;
        let parent = world.user(UserRole::Parent, "p@example.com", "Ruwan").await;
        let child = world.child(&parent, "Amaya").await;
        let park = world.location("Park").await;
        let session = world
            .session(coach.id, vec![child.id], &park, Timestamp::now().plus_days(2))
            .await;
        let handler = ApproveRequestHandler::new(
            world.store.clone(),
            world.store.clone(),
            world.store.clone(),
        );
        Fixture {
            world,
            handler,
            session,
            admin: admin.id,
        }
    }

    async fn file(f: &Fixture, kind: RequestType) -> ScheduleRequest {
        let request =
            ScheduleRequest::submit(kind, &f.session, UserId::new(), "Exams", Timestamp::now())
                .unwrap();
        RequestRepository::save(f.world.store.as_ref(), &request)
            .await
            .unwrap();
        request
    }

    fn command(f: &Fixture, request: &ScheduleRequest, new_slot: Option<TimeSlot>) -> ApproveRequestCommand {
        ApproveRequestCommand {
            request_id: request.id,
            admin_id: f.admin,
            new_slot,
            note: Some("ok".into()),
        }
    }

    #[tokio::test]
    async fn approving_cancel_cancels_session_and_logs_event() {
        let f = fixture().await;
        let request = file(&f, RequestType::Cancel).await;

        let result = f.handler.handle(command(&f, &request, None)).await.unwrap();

        assert_eq!(result.request.status, RequestStatus::Approved);
        assert_eq!(result.request.admin_note.as_deref(), Some("ok"));
        assert!(result.request.decided_at.is_some());
        assert_eq!(f.world.reload(&f.session).await.status(), SessionStatus::Canceled);

        let events = f.world.store.crm_events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, CrmEventKind::SessionCanceled);
        assert_eq!(events[0].actor_id, f.admin);
        assert_eq!(events[0].payload["reason"], "Exams");
    }

    #[tokio::test]
    async fn approving_reschedule_moves_session_and_resets_reminders() {
        let f = fixture().await;
        f.world
            .store
            .claim_reminder(f.session.id(), ReminderKind::DayBefore)
            .await
            .unwrap();
        let request = file(&f, RequestType::Reschedule).await;
        let new_start = f.session.start_at().plus_days(1);
        let new_slot = TimeSlot::new(new_start, new_start.plus_hours(1)).unwrap();

        let result = f
            .handler
            .handle(command(&f, &request, Some(new_slot)))
            .await
            .unwrap();

        let stored = f.world.reload(&f.session).await;
        assert_eq!(stored.start_at(), new_start);
        assert!(stored.reminders_sent().is_empty());
        assert_eq!(result.event.kind, CrmEventKind::SessionRescheduled);
        assert_eq!(
            result.event.payload["oldStartAt"],
            serde_json::to_value(f.session.start_at()).unwrap()
        );
    }

    #[tokio::test]
    async fn reschedule_into_own_slot_does_not_self_conflict() {
        let f = fixture().await;
        let request = file(&f, RequestType::Reschedule).await;
        let shifted = TimeSlot::new(
            f.session.start_at().plus_minutes(30),
            f.session.end_at().plus_minutes(30),
        )
        .unwrap();

        assert!(f.handler.handle(command(&f, &request, Some(shifted))).await.is_ok());
    }

    #[tokio::test]
    async fn reschedule_into_busy_slot_is_rejected_without_changes() {
        let f = fixture().await;
        let park = f.world.location("Court").await;
        let busy_start = f.session.start_at().plus_days(1);
        f.world
            .session(*f.session.coach_id(), vec![crate::domain::foundation::ChildId::new()], &park, busy_start)
            .await;
        let request = file(&f, RequestType::Reschedule).await;
        let new_slot = TimeSlot::new(busy_start, busy_start.plus_hours(1)).unwrap();

        let err = f
            .handler
            .handle(command(&f, &request, Some(new_slot)))
            .await
            .unwrap_err();

        assert_eq!(err, RequestError::Conflict(vec![Conflict::Coach]));
        assert_eq!(f.world.reload(&f.session).await.start_at(), f.session.start_at());
        assert!(f.world.store.crm_events().await.is_empty());
    }

    #[tokio::test]
    async fn reschedule_without_slot_is_rejected() {
        let f = fixture().await;
        let request = file(&f, RequestType::Reschedule).await;

        let err = f.handler.handle(command(&f, &request, None)).await.unwrap_err();

        assert_eq!(err, RequestError::MissingNewSlot);
    }

    #[tokio::test]
    async fn decided_request_cannot_be_approved_again() {
        let f = fixture().await;
        let request = file(&f, RequestType::Cancel).await;
        f.handler.handle(command(&f, &request, None)).await.unwrap();

        let err = f.handler.handle(command(&f, &request, None)).await.unwrap_err();

        assert!(matches!(err, RequestError::InvalidState(_)));
        assert_eq!(f.world.store.crm_events().await.len(), 1);
    }

    /// Request storage whose updates fail until `recover` is called.
    struct FlakyRequests {
        inner: Arc<dyn RequestRepository>,
        down: AtomicBool,
    }

    impl FlakyRequests {
        fn recover(&self) {
            self.down.store(false, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl RequestRepository for FlakyRequests {
        async fn save(&self, request: &ScheduleRequest) -> Result<(), DomainError> {
            self.inner.save(request).await
        }

        async fn update(&self, request: &ScheduleRequest) -> Result<(), DomainError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(DomainError::database("connection reset"));
            }
            self.inner.update(request).await
        }

        async fn find_by_id(&self, id: &RequestId) -> Result<Option<ScheduleRequest>, DomainError> {
            self.inner.find_by_id(id).await
        }

        async fn list_pending(&self) -> Result<Vec<ScheduleRequest>, DomainError> {
            self.inner.list_pending().await
        }

        async fn find_created_between(
            &self,
            from: &Timestamp,
            to: &Timestamp,
        ) -> Result<Vec<ScheduleRequest>, DomainError> {
            self.inner.find_created_between(from, to).await
        }
    }

    #[tokio::test]
    async fn failed_request_write_restores_session_for_retry() {
        let f = fixture().await;
        let request = file(&f, RequestType::Cancel).await;
        let requests = Arc::new(FlakyRequests {
            inner: f.world.store.clone(),
            down: AtomicBool::new(true),
        });
        let handler = ApproveRequestHandler::new(
            f.world.store.clone(),
            requests.clone(),
            f.world.store.clone(),
        );

        let err = handler.handle(command(&f, &request, None)).await.unwrap_err();

        assert!(matches!(err, RequestError::Infrastructure(_)));
        assert!(f.world.reload(&f.session).await.is_booked());
        assert!(f.world.store.crm_events().await.is_empty());

        requests.recover();
        let result = handler.handle(command(&f, &request, None)).await.unwrap();

        assert_eq!(result.request.status, RequestStatus::Approved);
        assert_eq!(f.world.reload(&f.session).await.status(), SessionStatus::Canceled);
        assert_eq!(f.world.store.crm_events().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let f = fixture().await;
        let id = RequestId::new();
        let err = f
            .handler
            .handle(ApproveRequestCommand {
                request_id: id,
                admin_id: f.admin,
                new_slot: None,
                note: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, RequestError::NotFound(id));
    }
}
