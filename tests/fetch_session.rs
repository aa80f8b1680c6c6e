//! End-to-end fetch sessions against a mock ad library server

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use adlibrary_fetch::{AccessToken, TerminationReason, artifact, run_session};
use std::time::{Duration, Instant};
use common::{ads, config_for, mount_page, mount_status, requested_offsets};
use tempfile::TempDir;
use wiremock::MockServer;

fn token() -> AccessToken {
    AccessToken::new("integration-token").unwrap()
}

#[tokio::test]
async fn fetches_all_pages_until_empty() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, 0, ads(0, 5)).await;
    mount_page(&server, 5, ads(5, 5)).await;
    mount_page(&server, 10, ads(10, 5)).await;
    mount_page(&server, 15, vec![]).await;

    let config = config_for(&server, dir.path(), 5, 3);
    let outcome = run_session(&config, token()).await.unwrap();

    assert_eq!(outcome.reason, TerminationReason::Completed);
    assert_eq!(outcome.requests, 4);
    assert_eq!(requested_offsets(&server).await, vec![0, 5, 10, 15]);

    let saved = artifact::read_artifact(&config.output_path()).await.unwrap();
    assert_eq!(saved, ads(0, 15));
}

#[tokio::test]
async fn throttled_page_is_retried_in_place() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_status(&server, 0, 429, 2).await;
    mount_page(&server, 0, ads(0, 3)).await;
    mount_page(&server, 3, vec![]).await;

    let config = config_for(&server, dir.path(), 3, 5);
    let start = Instant::now();
    let outcome = run_session(&config, token()).await.unwrap();

    assert!(outcome.is_complete());
    assert_eq!(requested_offsets(&server).await, vec![0, 0, 0, 3]);
    // 10ms + 20ms of backoff
    assert!(start.elapsed() >= Duration::from_millis(30));
    assert_eq!(outcome.records, ads(0, 3));
}

#[tokio::test]
async fn persistent_throttling_exhausts_and_keeps_progress() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, 0, ads(0, 2)).await;
    mount_status(&server, 2, 429, 5).await;

    let config = config_for(&server, dir.path(), 2, 4);
    let outcome = run_session(&config, token()).await.unwrap();

    assert_eq!(
        outcome.reason,
        TerminationReason::RetriesExhausted {
            offset: 2,
            attempts: 5
        }
    );
    assert_eq!(requested_offsets(&server).await, vec![0, 2, 2, 2, 2, 2]);

    let saved = artifact::read_artifact(&config.output_path()).await.unwrap();
    assert_eq!(saved, ads(0, 2));
}

#[tokio::test]
async fn server_error_stops_and_saves_prior_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, 0, ads(0, 4)).await;
    mount_page(&server, 4, ads(4, 4)).await;
    mount_status(&server, 8, 500, 1).await;

    let config = config_for(&server, dir.path(), 4, 5);
    let outcome = run_session(&config, token()).await.unwrap();

    assert!(matches!(
        outcome.reason,
        TerminationReason::HardFailure {
            offset: 8,
            status: Some(500),
            ..
        }
    ));
    let saved = artifact::read_artifact(&config.output_path()).await.unwrap();
    assert_eq!(saved, ads(0, 8));
}

#[tokio::test]
async fn empty_first_page_writes_empty_array() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, 0, vec![]).await;

    let config = config_for(&server, dir.path(), 25, 5);
    let outcome = run_session(&config, token()).await.unwrap();

    assert!(outcome.is_complete());
    assert_eq!(outcome.requests, 1);
    let raw = tokio::fs::read(config.output_path()).await.unwrap();
    assert_eq!(raw, b"[]");
}

#[tokio::test]
async fn existing_artifact_is_overwritten() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_page(&server, 0, ads(0, 1)).await;
    mount_page(&server, 1, vec![]).await;

    let config = config_for(&server, dir.path(), 1, 5);
    tokio::fs::write(config.output_path(), b"stale contents").await.unwrap();

    run_session(&config, token()).await.unwrap();

    let saved = artifact::read_artifact(&config.output_path()).await.unwrap();
    assert_eq!(saved, ads(0, 1));
}

#[tokio::test]
async fn invalid_config_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let config = config_for(&server, dir.path(), 0, 5);
    assert!(run_session(&config, token()).await.is_err());
    assert!(requested_offsets(&server).await.is_empty());
    assert!(!config.output_path().exists());
}
