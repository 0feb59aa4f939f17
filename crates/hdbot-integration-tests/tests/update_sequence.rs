//! Integration test: scheduled update sequence.
//!
//! Exercises status → season ordering, the freshness rules of the store,
//! sequence timeouts and the update-key check.

use std::sync::Arc;
use std::time::Duration;

use hdbot_integration_tests::{harness, season_payload, FakeUpstream};
use hdbot_remote::RemoteError;
use hdbot_sync::{SnapshotStore, SyncEngine, SyncError, TriggerError, UpdateTrigger};

#[tokio::test]
async fn update_season_without_status_is_not_found() {
    let (engine, _reader) = harness(FakeUpstream::new(150));

    let err = engine.update_season(None).await.expect_err("no status yet");
    assert!(
        matches!(err, SyncError::NotFound { season: None }),
        "expected NotFound, got {err:?}"
    );
    assert_eq!(engine.source().season_fetches(), 0);
}

#[tokio::test]
async fn update_season_uses_latest_status() {
    let upstream = FakeUpstream::new(151).with_season(151, season_payload(151, &[("active", 10)]));
    let (engine, _reader) = harness(upstream);

    let status = engine.update_status().await.expect("status");
    assert_eq!(status.season, 151);

    let snapshot = engine.update_season(None).await.expect("season");
    assert_eq!(snapshot.season, 151);
}

#[tokio::test]
async fn update_all_persists_status_then_season() {
    let upstream = FakeUpstream::new(150).with_season(150, season_payload(150, &[("active", 350)]));
    let (engine, _reader) = harness(upstream);

    let (status, snapshot) = engine.update_all().await.expect("update");
    assert_eq!(status.season, 150);
    assert_eq!(snapshot.season, 150);

    let store = engine.store();
    assert_eq!(store.status().await.expect("read"), Some(status));
    assert_eq!(store.season(150).await.expect("read"), Some(snapshot));
    assert!(store.status_payload().await.expect("read").is_some());
    assert!(store.season_payload(150).await.expect("read").is_some());
}

#[tokio::test]
async fn active_season_is_refreshed() {
    let upstream = FakeUpstream::new(150).with_season(150, season_payload(150, &[("active", 100)]));
    let (engine, _reader) = harness(upstream);

    engine.update_season(Some(150)).await.expect("first");
    engine.update_season(Some(150)).await.expect("second");
    assert_eq!(engine.source().season_fetches(), 2, "updates always go upstream");
}

#[tokio::test]
async fn concluded_season_is_frozen() {
    let store = SnapshotStore::open_memory().expect("store");

    let first = FakeUpstream::new(149).with_season(149, season_payload(149, &[("defeated", 1000)]));
    let engine = SyncEngine::new(first, store.clone());
    engine.update_season(Some(149)).await.expect("first write");

    // Upstream later reports different numbers for the finished season.
    let second = FakeUpstream::new(149).with_season(149, season_payload(149, &[("defeated", 3)]));
    let engine = SyncEngine::new(second, store.clone());
    let kept = engine.update_season(Some(149)).await.expect("second write");

    assert_eq!(kept.campaigns[0].points, 1000, "concluded seasons are never overwritten");
    let stored = store.season(149).await.expect("read").expect("row");
    assert_eq!(stored.campaigns[0].points, 1000);
}

#[tokio::test]
async fn timed_out_update_leaves_previous_state() {
    let upstream = FakeUpstream::new(150).with_season(150, season_payload(150, &[("active", 200)]));
    let store = SnapshotStore::open_memory().expect("store");
    let engine = SyncEngine::new(upstream, store).with_sequence_timeout(Duration::from_millis(100));

    let (status, snapshot) = engine.update_all().await.expect("first update");

    engine.source().set_delay_ms(1_000);
    let err = engine.update_all().await.expect_err("sequence must time out");
    assert!(
        matches!(err, SyncError::Remote(RemoteError::Timeout)),
        "expected a timeout, got {err:?}"
    );

    assert_eq!(engine.store().status().await.expect("read"), Some(status));
    assert_eq!(engine.store().season(150).await.expect("read"), Some(snapshot));
}

#[tokio::test]
async fn abandoned_update_does_not_block_next_reader() {
    let upstream = FakeUpstream::new(150).with_season(150, season_payload(150, &[("active", 5)]));
    let store = SnapshotStore::open_memory().expect("store");
    let engine = Arc::new(SyncEngine::new(upstream, store));

    // Start a slow fetch and cancel it partway through.
    engine.source().set_delay_ms(500);
    let slow = tokio::time::timeout(Duration::from_millis(50), engine.update_season(Some(150))).await;
    assert!(slow.is_err(), "the slow fetch should have been cancelled");

    engine.source().set_delay_ms(0);
    let snapshot = engine.backfill_season(Some(150)).await.expect("fresh leader");
    assert_eq!(snapshot.season, 150);
}

#[tokio::test]
async fn update_and_backfill_share_one_fetch() {
    let upstream = FakeUpstream::new(150).with_season(150, season_payload(150, &[("active", 42)]));
    upstream.set_delay_ms(50);
    let (engine, reader) = harness(upstream);

    let (updated, read) = tokio::join!(engine.update_season(Some(150)), reader.get_campaign(Some(150)));
    let updated = updated.expect("update");
    let read = read.expect("read").expect("stored");
    assert_eq!(updated, read);
    assert_eq!(engine.source().season_fetches(), 1);
}

#[tokio::test]
async fn trigger_distinguishes_missing_and_wrong_key() {
    let upstream = FakeUpstream::new(150).with_season(150, season_payload(150, &[("active", 1)]));
    let (engine, _reader) = harness(upstream);
    let trigger = UpdateTrigger::new(Arc::clone(&engine), "s3cret");

    let err = trigger.run(None).await.expect_err("no key");
    assert!(matches!(err, TriggerError::BadRequest));

    let err = trigger.run(Some("S3CRET")).await.expect_err("wrong key");
    assert!(matches!(err, TriggerError::Unauthorized));

    assert_eq!(engine.source().status_fetches(), 0, "rejected triggers never reach upstream");

    let report = trigger.run(Some("s3cret")).await.expect("authorized");
    assert_eq!(report.status.season, 150);
    assert_eq!(report.season.season, 150);
    assert_eq!(engine.source().status_fetches(), 1);
}
