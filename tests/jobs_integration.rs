//! Integration tests for the scheduled jobs.
//!
//! Jobs are wired exactly as the server wires them and triggered through the
//! `JobRunner` with a fixed clock.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;

use grow_fitness::adapters::email::RecordingMailer;
use grow_fitness::adapters::memory::InMemoryStore;
use grow_fitness::application::jobs::JobReport;
use grow_fitness::bootstrap::{build_app, job_runner, Repositories};
use grow_fitness::config::SchedulerConfig;
use grow_fitness::domain::foundation::Timestamp;
use grow_fitness::domain::milestone::MilestoneRule;
use grow_fitness::domain::people::{Child, Gender, Location, User, UserRole};
use grow_fitness::domain::session::{Session, SessionType, TimeSlot};
use grow_fitness::ports::{
    ChildRepository, LocationRepository, MilestoneRepository, SessionRepository, UserRepository,
};
use grow_fitness::scheduler::JobRunner;

struct Fixture {
    store: Arc<InMemoryStore>,
    mailer: Arc<RecordingMailer>,
    runner: JobRunner,
    coach: User,
    parent: User,
    child: Child,
    location: Location,
}

async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let mailer = Arc::new(RecordingMailer::new());

    let admin = User::new(UserRole::Admin, "admin@grow.fit", "Admin").unwrap();
    let coach = User::new(UserRole::Coach, "coach@grow.fit", "Nimal").unwrap();
    let parent = User::new(UserRole::Parent, "parent@example.com", "Ruwan").unwrap();
    let child = Child::new(parent.id, "Amaya", 9, Gender::Female).unwrap();
    let location = Location::new("Viharamahadevi Park").unwrap();

    for user in [&admin, &coach, &parent] {
        UserRepository::save(store.as_ref(), user).await.unwrap();
    }
    ChildRepository::save(store.as_ref(), &child).await.unwrap();
    LocationRepository::save(store.as_ref(), &location).await.unwrap();

    let config = SchedulerConfig::default();
    let repos = Repositories::in_memory(store.clone());
    let app = build_app(&repos, mailer.clone(), config.offset().unwrap());
    let runner = job_runner(&app.jobs, &config).unwrap();

    Fixture {
        store,
        mailer,
        runner,
        coach,
        parent,
        child,
        location,
    }
}

fn at(d: u32, h: u32, m: u32) -> Timestamp {
    Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap())
}

impl Fixture {
    async fn book(&self, start: Timestamp) -> Session {
        let session = Session::book(
            SessionType::Individual,
            self.coach.id,
            vec![self.child.id],
            self.location.id,
            TimeSlot::new(start, start.plus_hours(1)).unwrap(),
        )
        .unwrap();
        SessionRepository::save(self.store.as_ref(), &session).await.unwrap();
        session
    }
}

#[tokio::test]
async fn day_before_reminder_is_sent_once() {
    let fx = fixture().await;
    let now = at(10, 4, 0);
    fx.book(now.plus_hours(24)).await;

    let first = fx.runner.trigger("reminders", now).await.unwrap().unwrap();
    let JobReport::Reminders(first) = first else {
        panic!("expected a reminder report");
    };
    assert_eq!(first.sent_24h, 1);
    assert_eq!(fx.mailer.sent_to(&fx.parent.email).len(), 1);

    // The next tick still sees the session inside the window.
    let second = fx.runner.trigger("reminders", now.plus_minutes(5)).await.unwrap().unwrap();
    let JobReport::Reminders(second) = second else {
        panic!("expected a reminder report");
    };
    assert_eq!(second.sent_24h, 0);
    assert_eq!(fx.mailer.sent_to(&fx.parent.email).len(), 1);
}

#[tokio::test]
async fn failed_reminder_is_retried_next_tick() {
    let fx = fixture().await;
    let now = at(10, 4, 0);
    let session = fx.book(now.plus_hours(1)).await;
    fx.mailer.fail_for(fx.parent.email.clone());

    let report = fx.runner.trigger("reminders", now).await.unwrap().unwrap();
    assert!(matches!(report, JobReport::Reminders(r) if r.failed == 1 && r.sent_1h == 0));

    let stored = SessionRepository::find_by_id(fx.store.as_ref(), session.id())
        .await
        .unwrap()
        .unwrap();
    assert!(stored.reminders_sent().is_empty());
}

#[tokio::test]
async fn milestone_is_awarded_once_with_crm_event() {
    let fx = fixture().await;
    let mut session = fx.book(at(1, 4, 0)).await;
    session.complete().unwrap();
    SessionRepository::update(fx.store.as_ref(), &session).await.unwrap();

    let rule = MilestoneRule::new(
        "First Session",
        json!({ "type": "session_count", "threshold": 1 }),
        "certificate",
    )
    .unwrap();
    fx.store.save_rule(&rule).await.unwrap();

    let now = at(2, 18, 30);
    let report = fx.runner.trigger("milestones", now).await.unwrap().unwrap();
    assert!(matches!(report, JobReport::Milestones(r) if r.awarded == 1));

    let again = fx.runner.trigger("milestones", now.plus_days(1)).await.unwrap().unwrap();
    assert!(matches!(again, JobReport::Milestones(r) if r.awarded == 0));

    assert_eq!(fx.store.awards().await.len(), 1);
    assert_eq!(fx.store.crm_events().await.len(), 1);
    assert_eq!(fx.mailer.sent_to(&fx.parent.email).len(), 1);
}

#[tokio::test]
async fn digest_goes_to_staff_only() {
    let fx = fixture().await;
    // 06:00 in Colombo on the 10th.
    let now = at(10, 0, 30);
    fx.book(at(10, 4, 0)).await;

    let report = fx.runner.trigger("digest", now).await.unwrap().unwrap();
    let JobReport::Digest(report) = report else {
        panic!("expected a digest report");
    };

    assert_eq!(report.sessions, 1);
    assert_eq!(report.recipients, 2);
    assert_eq!(report.sent, 2);
    assert!(fx.mailer.sent_to(&fx.parent.email).is_empty());
}

#[tokio::test]
async fn unknown_job_is_not_triggered() {
    let fx = fixture().await;
    assert!(fx.runner.trigger("payroll", at(10, 0, 0)).await.is_none());
}
