//! Tests for running downloads against an in-memory source.

use parfetch::{ByteRange, CancellationToken, Error, Phase};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::helpers::*;

const CONTENT_LEN: usize = 64 * 1024;

#[tokio::test]
async fn test_chunks_completing_out_of_order() {
    init_tracing();
    let dir = create_temp_dir();
    let content = create_test_content(CONTENT_LEN);
    let source = Arc::new(
        MockSource::new(content.clone()).reverse_delay(Duration::from_millis(10)),
    );

    let download = test_builder(dir.path())
        .concurrency(4)
        .build_with_source(source.clone())
        .unwrap();
    let summary = download.run(CancellationToken::new()).await.unwrap();

    assert_file_content(&download.destination(), &content);
    assert_eq!(summary.chunks(), 4);
    assert_eq!(summary.size(), CONTENT_LEN as u64);
    assert!(summary.rangeable());
    assert_eq!(summary.path(), download.destination());
    assert_eq!(source.opened().len(), 4);
    assert!(download.chunks().iter().all(|chunk| chunk.is_complete()));
    assert!(!download.temp_path().exists());
}

#[tokio::test]
async fn test_accessors_after_success() {
    let dir = create_temp_dir();
    let content = create_test_content(CONTENT_LEN);
    let source = Arc::new(MockSource::new(content));

    let download = test_builder(dir.path())
        .concurrency(2)
        .build_with_source(source)
        .unwrap();
    assert_eq!(download.phase(), Phase::Idle);

    download.run(CancellationToken::new()).await.unwrap();

    assert_eq!(download.phase(), Phase::Done);
    assert_eq!(download.total_size(), CONTENT_LEN as u64);
    assert_eq!(download.transferred_size(), CONTENT_LEN as u64);
    assert!(download.is_rangeable());
    assert_eq!(download.progress().percent(), Some(100));

    let elapsed = download.elapsed();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(download.elapsed(), elapsed);
}

#[tokio::test]
async fn test_not_rangeable_is_single_chunk() {
    let dir = create_temp_dir();
    let content = create_test_content(CONTENT_LEN);
    let source = Arc::new(MockSource::new(content.clone()).not_rangeable());

    let download = test_builder(dir.path())
        .concurrency(8)
        .build_with_source(source.clone())
        .unwrap();
    let summary = download.run(CancellationToken::new()).await.unwrap();

    assert_file_content(&download.destination(), &content);
    assert_eq!(summary.chunks(), 1);
    assert!(!download.is_rangeable());
    assert_eq!(
        source.opened(),
        vec![ByteRange::Full {
            size: Some(CONTENT_LEN as u64)
        }]
    );
}

#[tokio::test]
async fn test_unknown_size() {
    let dir = create_temp_dir();
    let content = create_test_content(10_000);
    let source = Arc::new(MockSource::new(content.clone()).unknown_size());

    let download = test_builder(dir.path()).build_with_source(source).unwrap();
    let summary = download.run(CancellationToken::new()).await.unwrap();

    assert_file_content(&download.destination(), &content);
    assert_eq!(download.total_size(), 0);
    assert_eq!(download.transferred_size(), 10_000);
    assert_eq!(summary.size(), 10_000);
}

#[tokio::test]
async fn test_cancel_mid_transfer() {
    let dir = create_temp_dir();
    let source = Arc::new(MockSource::new(create_test_content(CONTENT_LEN)).stall());
    let download = test_builder(dir.path())
        .concurrency(4)
        .build_with_source(source)
        .unwrap();

    let ctx = CancellationToken::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(5), download.run(ctx))
        .await
        .expect("run did not observe cancellation");

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(download.phase(), Phase::Failed);
    assert!(download.transferred_size() > 0);
    assert!(!download.destination().exists());
    assert!(!download.temp_path().exists());
}

#[tokio::test]
async fn test_cancel_before_start() {
    let dir = create_temp_dir();
    let source = Arc::new(MockSource::new(create_test_content(CONTENT_LEN)));
    let download = test_builder(dir.path())
        .build_with_source(source.clone())
        .unwrap();

    let ctx = CancellationToken::new();
    ctx.cancel();

    assert!(matches!(download.run(ctx).await, Err(Error::Cancelled)));
    assert!(source.opened().is_empty());
    assert!(!download.destination().exists());
}

#[tokio::test]
async fn test_chunk_failure_fails_download() {
    let dir = create_temp_dir();
    let source = Arc::new(MockSource::new(create_test_content(CONTENT_LEN)).fail_at(16 * 1024));
    let download = test_builder(dir.path())
        .concurrency(4)
        .chunk_retries(0)
        .build_with_source(source)
        .unwrap();

    let result = download.run(CancellationToken::new()).await;

    assert!(matches!(result, Err(Error::Network(_))));
    assert_eq!(download.phase(), Phase::Failed);
    assert!(!download.destination().exists());
    assert!(!download.temp_path().exists());
}

#[tokio::test]
async fn test_persistent_failure_exhausts_retries() {
    let dir = create_temp_dir();
    let source = Arc::new(MockSource::new(create_test_content(CONTENT_LEN)).fail_at(0));
    let download = test_builder(dir.path())
        .concurrency(4)
        .chunk_retries(1)
        .build_with_source(source.clone())
        .unwrap();

    let result = download.run(CancellationToken::new()).await;

    assert!(matches!(result, Err(Error::Network(_))));
    let attempts = source
        .opened()
        .iter()
        .filter(|range| range.start() == 0)
        .count();
    assert_eq!(attempts, 2);
}

#[tokio::test]
async fn test_broken_stream_resumes_from_cursor() {
    init_tracing();
    let dir = create_temp_dir();
    let content = create_test_content(CONTENT_LEN);
    let source = Arc::new(MockSource::new(content.clone()).break_after(2 * PIECE));
    let download = test_builder(dir.path())
        .concurrency(4)
        .chunk_retries(2)
        .build_with_source(source.clone())
        .unwrap();

    download.run(CancellationToken::new()).await.unwrap();

    assert_file_content(&download.destination(), &content);
    assert_eq!(download.transferred_size(), CONTENT_LEN as u64);

    let opened = source.opened();
    assert_eq!(opened.len(), 5);
    let chunk_size = (CONTENT_LEN / 4) as u64;
    assert!(opened
        .iter()
        .any(|range| range.start() % chunk_size == 2 * PIECE as u64));
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let dir = create_temp_dir();
    let content = create_test_content(CONTENT_LEN);
    let source = Arc::new(MockSource::new(content.clone()));
    let download = test_builder(dir.path())
        .concurrency(3)
        .build_with_source(source.clone())
        .unwrap();

    let first = download.run(CancellationToken::new()).await.unwrap();
    let second = download.run(CancellationToken::new()).await.unwrap();

    assert_file_content(&download.destination(), &content);
    assert_eq!(first.size(), second.size());
    assert_eq!(first.chunks(), second.chunks());
    assert_eq!(download.transferred_size(), CONTENT_LEN as u64);
    assert_eq!(source.probes(), 1);
}

#[tokio::test]
async fn test_existing_destination_is_replaced() {
    let dir = create_temp_dir();
    let content = create_test_content(4096);
    std::fs::write(dir.path().join(TEST_FILENAME), b"stale").unwrap();

    let source = Arc::new(MockSource::new(content.clone()));
    let download = test_builder(dir.path()).build_with_source(source).unwrap();
    download.run(CancellationToken::new()).await.unwrap();

    assert_file_content(&download.destination(), &content);
}

#[tokio::test]
async fn test_missing_directory_is_created() {
    let dir = create_temp_dir();
    let nested = dir.path().join("a").join("b");
    let content = create_test_content(4096);
    let source = Arc::new(MockSource::new(content.clone()));

    let download = test_builder(&nested).build_with_source(source).unwrap();
    download.run(CancellationToken::new()).await.unwrap();

    assert_file_content(&nested.join(TEST_FILENAME), &content);
}

#[tokio::test]
async fn test_probe_error_is_surfaced() {
    let dir = create_temp_dir();
    let source = Arc::new(MockSource::new(Vec::new()).probe_error());
    let download = test_builder(dir.path())
        .build_with_source(source.clone())
        .unwrap();

    let result = download.run(CancellationToken::new()).await;

    assert!(matches!(result, Err(Error::Probe(_))));
    assert_eq!(download.phase(), Phase::Failed);
    assert!(download.info().is_none());
    assert!(source.opened().is_empty());
    assert!(!download.temp_path().exists());
}

#[tokio::test]
async fn test_invalid_chunk_bounds_fail_planning() {
    let dir = create_temp_dir();
    let source = Arc::new(MockSource::new(create_test_content(4096)));
    let download = test_builder(dir.path())
        .chunk_size_bounds(4096, 1024)
        .build_with_source(source.clone())
        .unwrap();

    let result = download.run(CancellationToken::new()).await;

    assert!(matches!(result, Err(Error::Planning(_))));
    assert!(source.opened().is_empty());
    assert!(!download.temp_path().exists());
}

#[tokio::test]
async fn test_rangeable_without_size_fails_probe() {
    let dir = create_temp_dir();
    let source = Arc::new(MockSource::new(Vec::new()));
    let download = test_builder(dir.path())
        .build_with_source(source.clone())
        .unwrap();

    let result = download.run(CancellationToken::new()).await;

    assert!(matches!(result, Err(Error::Probe(_))));
    assert!(download.info().is_none());
    assert!(!download.is_rangeable());
    assert!(download.chunks().is_empty());
    assert!(source.opened().is_empty());
}

#[tokio::test]
async fn test_empty_resource() {
    let dir = create_temp_dir();
    let source = Arc::new(MockSource::new(Vec::new()).not_rangeable());
    let download = test_builder(dir.path()).build_with_source(source).unwrap();

    let summary = download.run(CancellationToken::new()).await.unwrap();

    assert_eq!(summary.size(), 0);
    assert_file_content(&download.destination(), &[]);
}
