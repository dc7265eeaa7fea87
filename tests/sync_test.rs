//! Remote sync against a local fake backend

mod common;

use std::rc::Rc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use drp_progress::progress::{ManualClock, PullStatus, RemoteSync};

use common::{day, file_engine, FakeBackend};

#[test]
fn test_push_posts_state_blob() {
    let backend = FakeBackend::start();
    let sync = RemoteSync::with_url(backend.base_url.clone());
    let dir = TempDir::new().expect("Failed to create temp dir");
    let clock = Rc::new(ManualClock::new(day(2026, 10, 18)));
    let mut engine = file_engine(dir.path(), &clock);
    engine.complete_module("post-module");

    let handle = engine.push(&sync, "learner 7").expect("push started");
    handle.join().expect("push thread panicked");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].url, "/api/v1/users/learner%207/gamification");

    let body: serde_json::Value = serde_json::from_str(&requests[0].body).expect("JSON body");
    assert_eq!(body["xp"], 200);
    assert_eq!(body["badges"], serde_json::json!(["rights-guardian"]));
    assert_eq!(body["lastActivityDate"], "2026-10-18");
}

#[test]
fn test_push_failure_is_silent() {
    let backend = FakeBackend::start();
    backend.fail_with(503);
    let sync = RemoteSync::with_url(backend.base_url.clone());
    let dir = TempDir::new().expect("Failed to create temp dir");
    let clock = Rc::new(ManualClock::new(day(2026, 10, 18)));
    let mut engine = file_engine(dir.path(), &clock);
    engine.complete_lesson("l1", None);

    let handle = engine.push(&sync, "learner").expect("push started");
    handle.join().expect("push thread must not panic");
    assert_eq!(engine.xp(), 50);

    assert!(sync.push_blocking("learner", &serde_json::json!({})).is_err());
}

#[test]
fn test_pull_merges_and_persists() {
    let backend = FakeBackend::start();
    backend.set_blob(
        r#"{"xp": 3200, "level": 4, "streak": 5, "badges": ["explorer"],
            "modulesCompleted": ["a", "b", "c"], "lastActivityDate": "2026-10-18",
            "weeklyQuests": [{"id": "wq-1", "target": 3}], "timeBasedChallenges": []}"#,
    );
    let sync = RemoteSync::with_url(backend.base_url.clone());
    let dir = TempDir::new().expect("Failed to create temp dir");
    let clock = Rc::new(ManualClock::new(day(2026, 10, 18)));

    {
        let mut engine = file_engine(dir.path(), &clock);
        engine.complete_module("sdg-module");

        assert!(engine.pull(&sync, "learner"));
        let state = engine.state();
        assert_eq!(state.xp(), 3200);
        assert_eq!(state.level(), 4);
        assert_eq!(state.streak(), 5);
        assert!(state.has_badge("explorer"));
        assert!(state.has_badge("sustainability-steward"));
        assert_eq!(state.modules_completed().len(), 4);
        assert_eq!(state.weekly_quests().len(), 1);
    }

    let reopened = file_engine(dir.path(), &clock);
    assert_eq!(reopened.xp(), 3200);
    assert!(reopened.state().has_completed_module("sdg-module"));

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
}

#[test]
fn test_pull_missing_remote_state() {
    let backend = FakeBackend::start();
    let sync = RemoteSync::with_url(backend.base_url.clone());
    let dir = TempDir::new().expect("Failed to create temp dir");
    let clock = Rc::new(ManualClock::new(day(2026, 10, 18)));
    let mut engine = file_engine(dir.path(), &clock);
    engine.complete_lesson("l1", None);
    let before = engine.state();

    assert_eq!(sync.fetch("nobody").expect("404 is not an error"), None);
    assert!(!engine.pull(&sync, "nobody"));
    assert_eq!(engine.state(), before);
}

#[test]
fn test_pull_server_error() {
    let backend = FakeBackend::start();
    backend.set_blob(r#"{"xp": 5000}"#);
    backend.fail_with(500);
    let sync = RemoteSync::with_url(backend.base_url.clone());
    let dir = TempDir::new().expect("Failed to create temp dir");
    let clock = Rc::new(ManualClock::new(day(2026, 10, 18)));
    let mut engine = file_engine(dir.path(), &clock);

    assert!(sync.fetch("learner").is_err());
    assert!(!engine.pull(&sync, "learner"));
    assert_eq!(engine.xp(), 0);
}

#[test]
fn test_pull_rejects_non_object() {
    let backend = FakeBackend::start();
    backend.set_blob("[1, 2, 3]");
    let sync = RemoteSync::with_url(backend.base_url.clone());
    let dir = TempDir::new().expect("Failed to create temp dir");
    let clock = Rc::new(ManualClock::new(day(2026, 10, 18)));
    let mut engine = file_engine(dir.path(), &clock);

    assert!(!engine.pull(&sync, "learner"));
    assert_eq!(engine.xp(), 0);
}

#[test]
fn test_spawned_pull() {
    let backend = FakeBackend::start();
    backend.set_blob(r#"{"xp": 1500, "badges": ["activity-hero"]}"#);
    let sync = RemoteSync::with_url(backend.base_url.clone());

    let pending = sync.spawn_pull("learner");
    let mut status = pending.poll();
    for _ in 0..200 {
        if !matches!(status, PullStatus::Pending) {
            break;
        }
        thread::sleep(Duration::from_millis(10));
        status = pending.poll();
    }

    let PullStatus::Ready(blob) = status else {
        panic!("expected a ready pull, got {:?}", status);
    };
    assert_eq!(blob["xp"], 1500);

    let dir = TempDir::new().expect("Failed to create temp dir");
    let clock = Rc::new(ManualClock::new(day(2026, 10, 18)));
    let mut engine = file_engine(dir.path(), &clock);
    assert!(engine.apply_remote(&blob));
    assert_eq!(engine.level(), 2);
    assert!(engine.state().has_badge("activity-hero"));
}

#[test]
fn test_spawned_pull_wait_empty() {
    let backend = FakeBackend::start();
    let sync = RemoteSync::with_url(backend.base_url.clone());

    let status = sync.spawn_pull("nobody").wait();
    assert!(matches!(status, PullStatus::Empty));
}
