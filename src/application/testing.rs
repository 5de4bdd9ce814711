//! Shared fixtures for handler and job tests.

use std::sync::Arc;

use chrono::FixedOffset;

use crate::adapters::email::RecordingMailer;
use crate::adapters::memory::InMemoryStore;
use crate::domain::foundation::{ChildId, Timestamp, UserId};
use crate::domain::people::{Child, Gender, Location, User, UserRole};
use crate::domain::session::{Session, SessionType, TimeSlot};
use crate::ports::{ChildRepository, LocationRepository, SessionRepository, UserRepository};

pub fn colombo() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
}

pub struct World {
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl World {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            mailer: Arc::new(RecordingMailer::new()),
        }
    }

    pub async fn user(&self, role: UserRole, email: &str, name: &str) -> User {
        let user = User::new(role, email, name).unwrap();
        UserRepository::save(self.store.as_ref(), &user).await.unwrap();
        user
    }

    pub async fn child(&self, parent: &User, name: &str) -> Child {
        let child = Child::new(parent.id, name, 10, Gender::Other).unwrap();
        ChildRepository::save(self.store.as_ref(), &child).await.unwrap();
        child
    }

    pub async fn location(&self, label: &str) -> Location {
        let location = Location::new(label).unwrap();
        LocationRepository::save(self.store.as_ref(), &location).await.unwrap();
        location
    }

    pub async fn session(
        &self,
        coach: UserId,
        children: Vec<ChildId>,
        location: &Location,
        start: Timestamp,
    ) -> Session {
        let session_type = if children.len() == 1 {
            SessionType::Individual
        } else {
            SessionType::Group
        };
        let session = Session::book(
            session_type,
            coach,
            children,
            location.id,
            TimeSlot::new(start, start.plus_hours(1)).unwrap(),
        )
        .unwrap();
        SessionRepository::save(self.store.as_ref(), &session).await.unwrap();
        session
    }

    pub async fn reload(&self, session: &Session) -> Session {
        SessionRepository::find_by_id(self.store.as_ref(), session.id())
            .await
            .unwrap()
            .unwrap()
    }
}
