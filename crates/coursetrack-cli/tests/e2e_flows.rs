//! End-to-end flows through the library crates, wired together the same
//! way the CLI wires them: in-memory store, injected clock, recording
//! notifier.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use coursetrack_core::engine::ProgressEngine;
use coursetrack_core::model::{Account, Course, CourseAssignment, Question, Quiz, Video};
use coursetrack_core::traits::{Clock, FixedClock, ReminderTier, Store};
use coursetrack_providers::mock::RecordingNotifier;
use coursetrack_providers::MemoryStore;
use coursetrack_report::DashboardAggregator;
use coursetrack_scheduler::{ReminderLedger, ReminderScheduler};

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn onboarding_course() -> Course {
    Course {
        id: "onboarding".into(),
        title: "Company Onboarding".into(),
        description: String::new(),
        passing_score: Some(70),
        videos: (1..=4)
            .map(|i| Video {
                id: format!("video-{i}"),
                title: format!("Video {i}"),
                duration_secs: Some(300),
            })
            .collect(),
        quizzes: vec![Quiz {
            id: "final".into(),
            title: "Final Quiz".into(),
            questions: (0..10)
                .map(|_| Question {
                    prompt: "?".into(),
                    choices: vec!["a".into(), "b".into()],
                    correct_choice: 0,
                    points: 1,
                })
                .collect(),
        }],
    }
}

fn account(id: &str, created_at: DateTime<Utc>, activated: bool) -> Account {
    Account {
        id: id.into(),
        email: format!("{id}@example.com"),
        name: id.into(),
        created_at,
        activated_at: activated.then_some(created_at + Duration::hours(1)),
        has_password: activated,
    }
}

fn assignment(account_id: &str, course_id: &str, due: DateTime<Utc>) -> CourseAssignment {
    CourseAssignment {
        account_id: account_id.into(),
        course_id: course_id.into(),
        due_date: due,
        assigned_at: due - Duration::days(30),
    }
}

/// First `correct` answers right, the rest wrong.
fn answers(correct: usize) -> Vec<usize> {
    (0..10).map(|i| usize::from(i >= correct)).collect()
}

/// A learner works through a whole course: videos first, a failed quiz
/// attempt, then a passing one. The finished course classifies as
/// completed even though the due date has passed.
#[tokio::test]
async fn course_completion_flow() {
    let store = Arc::new(MemoryStore::new());
    store.insert_course(onboarding_course());
    store.insert_account(account("alice", at("2026-07-01T09:00:00Z"), true));
    store.insert_assignment(assignment("alice", "onboarding", at("2026-08-15T00:00:00Z")));

    let clock = Arc::new(FixedClock::new(at("2026-08-20T12:00:00Z")));
    let engine = ProgressEngine::new(
        Arc::clone(&store) as Arc<dyn Store>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    );

    for i in 1..=4 {
        engine
            .mark_video_complete("alice", "onboarding", &format!("video-{i}"))
            .await
            .unwrap();
    }
    let snapshot = engine.get_progress("alice", "onboarding").await.unwrap().unwrap();
    assert_eq!(snapshot.percent, 80);
    assert!(!snapshot.completed);

    // 6 of 10 is below the fixed threshold of 8: the attempt is logged but
    // progress stays where it was.
    let failed = engine
        .submit_quiz("alice", "onboarding", "final", &answers(6))
        .await
        .unwrap();
    assert!(!failed.passed);
    assert_eq!(failed.percentage, 60);

    let snapshot = engine.get_progress("alice", "onboarding").await.unwrap().unwrap();
    assert_eq!(snapshot.percent, 80);
    assert_eq!(snapshot.completed_quizzes, 0);

    let passed = engine
        .submit_quiz("alice", "onboarding", "final", &answers(9))
        .await
        .unwrap();
    assert!(passed.passed);

    let snapshot = engine.get_progress("alice", "onboarding").await.unwrap().unwrap();
    assert_eq!(snapshot.percent, 100);
    assert!(snapshot.completed);

    // Both attempts are in the log, the failing one included.
    let attempts = store.attempts().await.unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts.iter().filter(|a| a.passed).count(), 1);

    // Past due, but completed wins the classification.
    let report = engine.classify_assignments("alice").await.unwrap();
    assert_eq!(report.completed.len(), 1);
    assert!(report.overdue.is_empty());
    assert_eq!(report.summary.completion_rate, 100.0);
}

/// The reminder tick walks the same store the engine writes to. A completed
/// course stops generating overdue reminders; an untouched one escalates
/// through the tiers as the clock advances, each tier at most once.
#[tokio::test]
async fn reminder_escalation_flow() {
    let store = Arc::new(MemoryStore::new());
    store.insert_course(onboarding_course());
    store.insert_account(account("alice", at("2026-06-01T09:00:00Z"), true));
    store.insert_account(account("bob", at("2026-06-01T09:00:00Z"), true));
    store.insert_assignment(assignment("alice", "onboarding", at("2026-08-10T00:00:00Z")));
    store.insert_assignment(assignment("bob", "onboarding", at("2026-08-10T00:00:00Z")));

    let clock = Arc::new(FixedClock::new(at("2026-08-17T12:00:00Z")));
    let engine = ProgressEngine::new(
        Arc::clone(&store) as Arc<dyn Store>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    );

    // Alice finishes everything before the first tick.
    for i in 1..=4 {
        engine
            .mark_video_complete("alice", "onboarding", &format!("video-{i}"))
            .await
            .unwrap();
    }
    engine
        .submit_quiz("alice", "onboarding", "final", &answers(10))
        .await
        .unwrap();

    let notifier = Arc::new(RecordingNotifier::new());
    let scheduler = ReminderScheduler::new(
        Arc::clone(&store) as Arc<dyn Store>,
        notifier.clone(),
        Arc::clone(&clock) as Arc<dyn Clock>,
        ReminderLedger::new(),
        "https://app.example.com",
    );

    // Day 7 past due: only bob gets the first overdue touch.
    let outcome = scheduler.run_tick().await.unwrap();
    assert_eq!(outcome.sent.len(), 1);
    assert_eq!(outcome.sent[0].account_id, "bob");
    assert_eq!(outcome.sent[0].tier, ReminderTier::Overdue7);
    assert_eq!(outcome.sent[0].course_title.as_deref(), Some("Company Onboarding"));
    assert_eq!(outcome.sent[0].link, "https://app.example.com/login");

    // Next day, still inside the 7-8 window: the ledger suppresses a repeat.
    clock.advance(Duration::days(1));
    let outcome = scheduler.run_tick().await.unwrap();
    assert!(outcome.sent.is_empty());

    // Day 15: the second touch fires, once.
    clock.advance(Duration::days(7));
    let outcome = scheduler.run_tick().await.unwrap();
    assert_eq!(outcome.sent.len(), 1);
    assert_eq!(outcome.sent[0].tier, ReminderTier::Overdue15);

    // 12 hours before the day-30 cutoff: final notice.
    clock.set(at("2026-09-08T12:00:00Z"));
    let outcome = scheduler.run_tick().await.unwrap();
    assert_eq!(outcome.sent.len(), 1);
    assert_eq!(outcome.sent[0].tier, ReminderTier::FinalNotice);

    // Past the cutoff: silence.
    clock.advance(Duration::days(2));
    let outcome = scheduler.run_tick().await.unwrap();
    assert!(outcome.sent.is_empty());

    let sent = notifier.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|n| n.account_id == "bob"));
}

/// The dashboard reflects engine writes and swallows store failures by
/// degrading to an empty snapshot.
#[tokio::test]
async fn dashboard_flow() {
    let store = Arc::new(MemoryStore::new());
    store.insert_course(onboarding_course());
    store.insert_account(account("alice", at("2026-07-01T09:00:00Z"), true));
    store.insert_account(account("bob", at("2026-07-01T09:00:00Z"), false));
    store.insert_assignment(assignment("alice", "onboarding", at("2026-09-15T00:00:00Z")));
    store.insert_assignment(assignment("bob", "onboarding", at("2026-09-15T00:00:00Z")));

    let clock = Arc::new(FixedClock::new(at("2026-08-20T12:00:00Z")));
    let engine = ProgressEngine::new(
        Arc::clone(&store) as Arc<dyn Store>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    engine
        .mark_video_complete("alice", "onboarding", "video-1")
        .await
        .unwrap();

    let aggregator = DashboardAggregator::new(
        Arc::clone(&store) as Arc<dyn Store>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    );

    let snapshot = aggregator.snapshot().await;
    assert_eq!(snapshot.total_accounts, 2);
    assert_eq!(snapshot.active_accounts, 1);
    assert_eq!(snapshot.assignment_count, 2);
    assert_eq!(snapshot.todo_count, 2);
    // alice at 20%, bob with no record counts as 0.
    assert_eq!(snapshot.average_completion, 10.0);
    assert!(snapshot.generated_at.is_some());

    store.set_fail_reads(true);
    let degraded = aggregator.snapshot().await;
    assert!(degraded.generated_at.is_none());
    assert_eq!(degraded.total_accounts, 0);
}
