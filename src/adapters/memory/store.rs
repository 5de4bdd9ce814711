use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::crm::CrmEvent;
use crate::domain::foundation::{
    ChildId, DomainError, ErrorCode, InvoiceId, LocationId, MilestoneRuleId, RequestId,
    SessionId, Timestamp, UserId,
};
use crate::domain::invoice::Invoice;
use crate::domain::milestone::{MilestoneAward, MilestoneRule};
use crate::domain::people::{Child, Location, User, UserRole};
use crate::domain::request::ScheduleRequest;
use crate::domain::session::{ReminderKind, Session, SessionStatus, TimeSlot};
use crate::ports::{
    ChildRepository, CrmEventRepository, InvoiceRepository, LocationRepository,
    MilestoneRepository, RequestRepository, SessionRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    children: HashMap<ChildId, Child>,
    locations: HashMap<LocationId, Location>,
    sessions: HashMap<SessionId, Session>,
    requests: HashMap<RequestId, ScheduleRequest>,
    rules: HashMap<MilestoneRuleId, MilestoneRule>,
    awards: Vec<MilestoneAward>,
    crm_events: Vec<CrmEvent>,
    invoices: HashMap<InvoiceId, Invoice>,
}

/// Thread-safe in-memory implementation of the repository ports.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Snapshot of the CRM log in insertion order.
    pub async fn crm_events(&self) -> Vec<CrmEvent> {
        self.tables.read().await.crm_events.clone()
    }

    pub async fn awards(&self) -> Vec<MilestoneAward> {
        self.tables.read().await.awards.clone()
    }
}

fn within(ts: &Timestamp, from: &Timestamp, to: &Timestamp) -> bool {
    !ts.is_before(from) && !ts.is_after(to)
}

/// Same rule as the `sessions_no_coach_overlap` exclusion constraint,
/// checked under the write lock.
fn reject_coach_overlap(
    sessions: &HashMap<SessionId, Session>,
    session: &Session,
) -> Result<(), DomainError> {
    if session.status() != SessionStatus::Booked {
        return Ok(());
    }
    let clash = sessions.values().any(|other| {
        other.id() != session.id()
            && other.status() == SessionStatus::Booked
            && other.coach_id() == session.coach_id()
            && other.slot().overlaps(session.slot())
    });
    if clash {
        return Err(DomainError::new(
            ErrorCode::ScheduleConflict,
            format!("Coach {} is already booked for an overlapping session", session.coach_id()),
        ));
    }
    Ok(())
}

fn by_start(mut sessions: Vec<Session>) -> Vec<Session> {
    sessions.sort_by_key(|s| s.start_at());
    sessions
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn save(&self, user: &User) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(DomainError::new(
                ErrorCode::AlreadyExists,
                format!("Email already registered: {}", user.email),
            ));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn list_by_roles(&self, roles: &[UserRole]) -> Result<Vec<User>, DomainError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| roles.contains(&u.role))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }
}

#[async_trait]
impl ChildRepository for InMemoryStore {
    async fn save(&self, child: &Child) -> Result<(), DomainError> {
        self.tables.write().await.children.insert(child.id, child.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ChildId) -> Result<Option<Child>, DomainError> {
        Ok(self.tables.read().await.children.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ChildId]) -> Result<Vec<Child>, DomainError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.children.get(id).cloned())
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Child>, DomainError> {
        let tables = self.tables.read().await;
        let mut children: Vec<Child> = tables.children.values().cloned().collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }
}

#[async_trait]
impl LocationRepository for InMemoryStore {
    async fn save(&self, location: &Location) -> Result<(), DomainError> {
        self.tables
            .write()
            .await
            .locations
            .insert(location.id, location.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &LocationId) -> Result<Option<Location>, DomainError> {
        Ok(self.tables.read().await.locations.get(id).cloned())
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        reject_coach_overlap(&tables.sessions, session)?;
        tables.sessions.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &Session) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        reject_coach_overlap(&tables.sessions, session)?;
        match tables.sessions.get_mut(session.id()) {
            Some(existing) => {
                *existing = session.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            )),
        }
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        Ok(self.tables.read().await.sessions.get(id).cloned())
    }

    async fn find_booked_overlapping(
        &self,
        slot: &TimeSlot,
        coach_id: &UserId,
        child_ids: &[ChildId],
    ) -> Result<Vec<Session>, DomainError> {
        let tables = self.tables.read().await;
        Ok(by_start(
            tables
                .sessions
                .values()
                .filter(|s| s.is_booked() && s.slot().overlaps(slot))
                .filter(|s| {
                    s.coach_id() == coach_id || child_ids.iter().any(|c| s.involves_child(c))
                })
                .cloned()
                .collect(),
        ))
    }

    async fn find_booked_starting_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<Session>, DomainError> {
        let tables = self.tables.read().await;
        Ok(by_start(
            tables
                .sessions
                .values()
                .filter(|s| s.is_booked() && within(&s.start_at(), from, to))
                .cloned()
                .collect(),
        ))
    }

    async fn find_starting_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<Session>, DomainError> {
        let tables = self.tables.read().await;
        Ok(by_start(
            tables
                .sessions
                .values()
                .filter(|s| within(&s.start_at(), from, to))
                .cloned()
                .collect(),
        ))
    }

    async fn claim_reminder(&self, id: &SessionId, kind: ReminderKind) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.sessions.get_mut(id) {
            Some(session) if session.is_booked() => session.record_reminder(kind),
            _ => false,
        })
    }

    async fn release_reminder(&self, id: &SessionId, kind: ReminderKind) -> Result<(), DomainError> {
        if let Some(session) = self.tables.write().await.sessions.get_mut(id) {
            session.forget_reminder(kind);
        }
        Ok(())
    }

    async fn count_completed_for_child(&self, child_id: &ChildId) -> Result<u64, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .values()
            .filter(|s| s.status() == SessionStatus::Completed && s.involves_child(child_id))
            .count() as u64)
    }
}

#[async_trait]
impl RequestRepository for InMemoryStore {
    async fn save(&self, request: &ScheduleRequest) -> Result<(), DomainError> {
        self.tables
            .write()
            .await
            .requests
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn update(&self, request: &ScheduleRequest) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        match tables.requests.get_mut(&request.id) {
            Some(existing) => {
                *existing = request.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::RequestNotFound,
                format!("Request not found: {}", request.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &RequestId) -> Result<Option<ScheduleRequest>, DomainError> {
        Ok(self.tables.read().await.requests.get(id).cloned())
    }

    async fn list_pending(&self) -> Result<Vec<ScheduleRequest>, DomainError> {
        let tables = self.tables.read().await;
        let mut pending: Vec<ScheduleRequest> = tables
            .requests
            .values()
            .filter(|r| r.status.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.created_at);
        Ok(pending)
    }

    async fn find_created_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<ScheduleRequest>, DomainError> {
        let tables = self.tables.read().await;
        let mut requests: Vec<ScheduleRequest> = tables
            .requests
            .values()
            .filter(|r| within(&r.created_at, from, to))
            .cloned()
            .collect();
        requests.sort_by_key(|r| r.created_at);
        Ok(requests)
    }
}

#[async_trait]
impl MilestoneRepository for InMemoryStore {
    async fn save_rule(&self, rule: &MilestoneRule) -> Result<(), DomainError> {
        self.tables.write().await.rules.insert(rule.id, rule.clone());
        Ok(())
    }

    async fn list_active_rules(&self) -> Result<Vec<MilestoneRule>, DomainError> {
        let tables = self.tables.read().await;
        let mut rules: Vec<MilestoneRule> = tables
            .rules
            .values()
            .filter(|r| r.is_active)
            .cloned()
            .collect();
        rules.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rules)
    }

    async fn award_exists(
        &self,
        child_id: &ChildId,
        rule_id: &MilestoneRuleId,
    ) -> Result<bool, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .awards
            .iter()
            .any(|a| &a.child_id == child_id && &a.rule_id == rule_id))
    }

    async fn insert_award(&self, award: &MilestoneAward) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        if tables
            .awards
            .iter()
            .any(|a| a.child_id == award.child_id && a.rule_id == award.rule_id)
        {
            return Ok(false);
        }
        tables.awards.push(award.clone());
        Ok(true)
    }

    async fn find_awards_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<MilestoneAward>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .awards
            .iter()
            .filter(|a| within(&a.awarded_at, from, to))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CrmEventRepository for InMemoryStore {
    async fn append(&self, event: &CrmEvent) -> Result<(), DomainError> {
        self.tables.write().await.crm_events.push(event.clone());
        Ok(())
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryStore {
    async fn save(&self, invoice: &Invoice) -> Result<(), DomainError> {
        self.tables
            .write()
            .await
            .invoices
            .insert(invoice.id, invoice.clone());
        Ok(())
    }

    async fn update(&self, invoice: &Invoice) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        match tables.invoices.get_mut(&invoice.id) {
            Some(existing) => {
                *existing = invoice.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::InvoiceNotFound,
                format!("Invoice not found: {}", invoice.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &InvoiceId) -> Result<Option<Invoice>, DomainError> {
        Ok(self.tables.read().await.invoices.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Invoice>, DomainError> {
        let tables = self.tables.read().await;
        let mut invoices: Vec<Invoice> = tables.invoices.values().cloned().collect();
        invoices.sort_by_key(|i| std::cmp::Reverse(i.created_at));
        Ok(invoices)
    }

    async fn find_created_between(
        &self,
        from: &Timestamp,
        to: &Timestamp,
    ) -> Result<Vec<Invoice>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .invoices
            .values()
            .filter(|i| within(&i.created_at, from, to))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::LocationId;
    use crate::domain::session::SessionType;

    fn booked_at(start: Timestamp, coach: UserId, child: ChildId) -> Session {
        Session::book(
            SessionType::Individual,
            coach,
            vec![child],
            LocationId::new(),
            TimeSlot::new(start, start.plus_hours(1)).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn claim_reminder_succeeds_once() {
        let store = InMemoryStore::new();
        let session = booked_at(Timestamp::now(), UserId::new(), ChildId::new());
        SessionRepository::save(&store, &session).await.unwrap();

        assert!(store.claim_reminder(session.id(), ReminderKind::HourBefore).await.unwrap());
        assert!(!store.claim_reminder(session.id(), ReminderKind::HourBefore).await.unwrap());

        store.release_reminder(session.id(), ReminderKind::HourBefore).await.unwrap();
        assert!(store.claim_reminder(session.id(), ReminderKind::HourBefore).await.unwrap());
    }

    #[tokio::test]
    async fn claim_reminder_refuses_canceled_sessions() {
        let store = InMemoryStore::new();
        let mut session = booked_at(Timestamp::now(), UserId::new(), ChildId::new());
        session.cancel().unwrap();
        SessionRepository::save(&store, &session).await.unwrap();

        assert!(!store.claim_reminder(session.id(), ReminderKind::DayBefore).await.unwrap());
    }

    #[tokio::test]
    async fn overlap_query_matches_coach_or_child() {
        let store = InMemoryStore::new();
        let now = Timestamp::now();
        let (coach, child) = (UserId::new(), ChildId::new());
        let mine = booked_at(now, coach, ChildId::new());
        let theirs = booked_at(now, UserId::new(), child);
        let unrelated = booked_at(now, UserId::new(), ChildId::new());
        for s in [&mine, &theirs, &unrelated] {
            SessionRepository::save(&store, s).await.unwrap();
        }

        let slot = TimeSlot::new(now.plus_minutes(30), now.plus_minutes(90)).unwrap();
        let found = store.find_booked_overlapping(&slot, &coach, &[child]).await.unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|s| s.id() != unrelated.id()));
    }

    #[tokio::test]
    async fn coach_overlap_is_refused_at_write_time() {
        let store = InMemoryStore::new();
        let now = Timestamp::now();
        let coach = UserId::new();
        let first = booked_at(now, coach, ChildId::new());
        SessionRepository::save(&store, &first).await.unwrap();

        let clash = booked_at(now.plus_minutes(30), coach, ChildId::new());
        let err = SessionRepository::save(&store, &clash).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ScheduleConflict);

        let back_to_back = booked_at(now.plus_hours(1), coach, ChildId::new());
        SessionRepository::save(&store, &back_to_back).await.unwrap();

        let mut moved = back_to_back.clone();
        moved
            .reschedule(TimeSlot::new(now.plus_minutes(15), now.plus_minutes(75)).unwrap())
            .unwrap();
        let err = SessionRepository::update(&store, &moved).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ScheduleConflict);

        let mut canceled = clash;
        canceled.cancel().unwrap();
        SessionRepository::save(&store, &canceled).await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_award_is_not_inserted() {
        let store = InMemoryStore::new();
        let award = MilestoneAward::grant(ChildId::new(), MilestoneRuleId::new(), Timestamp::now());
        let again = MilestoneAward::grant(award.child_id, award.rule_id, Timestamp::now());

        assert!(store.insert_award(&award).await.unwrap());
        assert!(!store.insert_award(&again).await.unwrap());
        assert_eq!(store.awards().await.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        let a = User::new(UserRole::Parent, "p@example.com", "A").unwrap();
        let b = User::new(UserRole::Parent, "P@example.com", "B").unwrap();
        UserRepository::save(&store, &a).await.unwrap();

        let err = UserRepository::save(&store, &b).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
    }
}
