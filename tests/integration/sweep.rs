use std::time::Duration;

use axum::http::StatusCode;
use tokio::sync::broadcast;

use knock_services::Sweeper;

use crate::*;

/// 16 idle minutes with the sweeper running: the old cookie no longer works.
#[tokio::test(start_paused = true)]
async fn test_idle_session_evicted_by_sweeper() {
    let h = Harness::new();
    let (shutdown_tx, _) = broadcast::channel(1);
    let sweeper = tokio::spawn(Sweeper::new(h.store.clone(), shutdown_tx.subscribe()).run());

    let token = login(&h, CLIENT_A).await;

    tokio::time::sleep(Duration::from_secs(16 * 60 + 30)).await;
    assert!(h.store.is_empty().await);

    let resp = h.get_with_session(CLIENT_A, "/", &token).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(resp).await, "invalid session cookie and no key");

    shutdown_tx.send(()).unwrap();
    sweeper.await.unwrap();
}

/// Regular use keeps a session alive well past the idle timeout.
#[tokio::test(start_paused = true)]
async fn test_active_session_survives_sweeps() {
    let h = Harness::new();
    let (shutdown_tx, _) = broadcast::channel(1);
    let sweeper = tokio::spawn(Sweeper::new(h.store.clone(), shutdown_tx.subscribe()).run());

    let token = login(&h, CLIENT_A).await;

    for _ in 0..6 {
        tokio::time::sleep(Duration::from_secs(10 * 60)).await;
        let resp = h.get_with_session(CLIENT_A, "/", &token).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    shutdown_tx.send(()).unwrap();
    sweeper.await.unwrap();
}

/// Eviction is per identity: an idle client goes, an active one stays.
#[tokio::test(start_paused = true)]
async fn test_sweep_only_evicts_idle_clients() {
    let h = Harness::new();
    let (shutdown_tx, _) = broadcast::channel(1);
    let sweeper = tokio::spawn(Sweeper::new(h.store.clone(), shutdown_tx.subscribe()).run());

    let idle = login(&h, CLIENT_A).await;
    let busy = login(&h, CLIENT_B).await;

    for _ in 0..2 {
        tokio::time::sleep(Duration::from_secs(9 * 60)).await;
        let resp = h.get_with_session(CLIENT_B, "/", &busy).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = h.get_with_session(CLIENT_A, "/", &idle).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(h.store.len().await, 1);

    shutdown_tx.send(()).unwrap();
    sweeper.await.unwrap();
}
