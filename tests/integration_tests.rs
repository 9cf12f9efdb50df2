//! End-to-end tests of the downloader against a local HTTP server.
//!
//! These tests exercise the whole pipeline: probing, partitioning, parallel
//! range requests, retries, verification and history recording.

use pdl::{Error, HistoryStatus, Progress, Verdict, WriteMode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod common;
use common::helpers::*;
use common::server::{closed_port_url, Fixture, FixtureServer};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_end_to_end_download() {
    let content = create_test_content(100_000);
    let server = FixtureServer::start(Fixture::new(content.clone())).await;
    let temp_dir = create_temp_dir();
    let history = create_history();

    let downloader = create_fast_downloader_builder()
        .history(history.clone())
        .build();
    let task = create_task_in(&server.url(), temp_dir.path(), 5);

    let summary = downloader.download(&task).await.expect("Download failed");

    assert_file_content(&task.destination, &content);
    assert_eq!(summary.total_size(), 100_000);
    assert_eq!(summary.size_on_disk(), 100_000);
    assert!(summary.is_complete());
    assert_eq!(summary.verdict(), Verdict::Unknown);
    assert_eq!(server.head_count(), 1);
    for start in [0, 20_000, 40_000, 60_000, 80_000] {
        assert_eq!(server.hits(start), 1, "range starting at {}", start);
    }

    let records = history.page(1).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, HistoryStatus::Ok);
    assert_eq!(records[0].filename, "payload.bin");
    assert_eq!(records[0].url, server.url().to_string());
    assert!(records[0].start_time <= records[0].end_time);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_three_partitions_of_thousand_bytes() {
    let content = create_test_content(1000);
    let server = FixtureServer::start(Fixture::new(content.clone())).await;
    let temp_dir = create_temp_dir();

    let downloader = create_fast_downloader_builder().build();
    let task = create_task_in(&server.url(), temp_dir.path(), 3);
    downloader.download(&task).await.unwrap();

    assert_eq!(server.hits(0), 1);
    assert_eq!(server.hits(333), 1);
    assert_eq!(server.hits(666), 1);
    assert_file_content(&task.destination, &content);
}

#[tokio::test]
async fn test_matching_checksum_hex_and_base64() {
    for checksum in [HELLO_MD5_HEX, HELLO_MD5_BASE64] {
        let server =
            FixtureServer::start(Fixture::new(b"Hello, World!".to_vec()).content_md5(checksum))
                .await;
        let temp_dir = create_temp_dir();

        let downloader = create_fast_downloader_builder().build();
        let task = create_task_in(&server.url(), temp_dir.path(), 4);
        let summary = downloader.download(&task).await.unwrap();

        assert_eq!(summary.verdict(), Verdict::Match, "checksum {}", checksum);
        assert_file_content(&task.destination, b"Hello, World!");
    }
}

#[tokio::test]
async fn test_checksum_mismatch_is_informational() {
    let content = create_test_content(4096);
    let wrong = md5_hex(b"something else");
    let server = FixtureServer::start(Fixture::new(content.clone()).content_md5(wrong)).await;
    let temp_dir = create_temp_dir();
    let history = create_history();

    let downloader = create_fast_downloader_builder()
        .history(history.clone())
        .build();
    let task = create_task_in(&server.url(), temp_dir.path(), 2);
    let summary = downloader.download(&task).await.unwrap();

    assert_eq!(summary.verdict(), Verdict::Mismatch);
    assert!(summary.is_complete());
    assert_file_content(&task.destination, &content);
    assert_eq!(history.page(1).unwrap()[0].status, HistoryStatus::Ok);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failing_partition_is_reported_after_siblings() {
    let content = create_test_content(1000);
    let server = FixtureServer::start(Fixture::new(content.clone()).fail(666, u32::MAX)).await;
    let temp_dir = create_temp_dir();
    let history = create_history();

    let downloader = create_fast_downloader_builder()
        .history(history.clone())
        .build();
    let task = create_task_in(&server.url(), temp_dir.path(), 3).max_attempts(3);

    let err = downloader.download(&task).await.unwrap_err();
    match err {
        Error::PartitionFailed {
            index,
            range,
            attempts,
            ..
        } => {
            assert_eq!(index, 2);
            assert_eq!((range.start, range.last()), (666, Some(999)));
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error: {}", other),
    }

    assert_eq!(server.hits(666), 3);
    assert_eq!(server.hits(0), 1);
    assert_eq!(server.hits(333), 1);

    // The sibling partitions were written; the failed one never was.
    let on_disk = std::fs::read(&task.destination).unwrap();
    assert_eq!(on_disk.len(), 666);
    assert!(on_disk[..666] == content[..666]);

    let records = history.page(1).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, HistoryStatus::Error);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_transient_failure_is_retried() {
    let content = create_test_content(9000);
    let server = FixtureServer::start(Fixture::new(content.clone()).fail(3000, 2)).await;
    let temp_dir = create_temp_dir();

    let downloader = create_fast_downloader_builder().build();
    let task = create_task_in(&server.url(), temp_dir.path(), 3).max_attempts(3);
    let progress = Progress::new();

    let summary = downloader
        .download_with_progress(&task, progress.clone())
        .await
        .unwrap();

    assert!(summary.is_complete());
    assert_eq!(server.hits(3000), 3);
    assert_eq!(progress.downloaded(), 9000);
    assert_eq!(progress.total(), 9000);
    assert_file_content(&task.destination, &content);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interrupted_body_is_not_counted_twice() {
    let content = create_test_content(64 * 1024);
    let temp_dir = create_temp_dir();

    for mode in [WriteMode::Buffered, WriteMode::Streaming] {
        let server = FixtureServer::start(Fixture::new(content.clone()).truncate(0, 1)).await;
        let downloader = create_fast_downloader_builder().write_mode(mode).build();
        let task = create_task_in(&server.url(), temp_dir.path(), 2);
        let progress = Progress::new();

        downloader
            .download_with_progress(&task, progress.clone())
            .await
            .unwrap();

        assert_eq!(server.hits(0), 2, "{:?}", mode);
        assert_eq!(progress.downloaded(), 64 * 1024, "{:?}", mode);
        assert_file_content(&task.destination, &content);
    }
}

#[tokio::test]
async fn test_streaming_mode_matches_buffered() {
    let content = create_test_content(50_001);
    let server = FixtureServer::start(Fixture::new(content.clone())).await;
    let temp_dir = create_temp_dir();

    let buffered = create_fast_downloader_builder().build();
    let streaming = create_fast_downloader_builder()
        .write_mode(WriteMode::Streaming)
        .build();

    let a = create_task_in(&server.url(), &temp_dir.path().join("a"), 7);
    let b = create_task_in(&server.url(), &temp_dir.path().join("b"), 7);
    buffered.download(&a).await.unwrap();
    streaming.download(&b).await.unwrap();

    assert_eq!(
        std::fs::read(&a.destination).unwrap(),
        std::fs::read(&b.destination).unwrap()
    );
    assert_file_content(&b.destination, &content);
}

#[tokio::test]
async fn test_zero_length_resource() {
    let server = FixtureServer::start(Fixture::new(Vec::new())).await;
    let temp_dir = create_temp_dir();
    let history = create_history();

    let downloader = create_fast_downloader_builder()
        .history(history.clone())
        .build();
    let task = create_task_in(&server.url(), temp_dir.path(), 5);
    let summary = downloader.download(&task).await.unwrap();

    assert!(summary.is_complete());
    assert_eq!(summary.size_on_disk(), 0);
    assert_file_size(&task.destination, 0);
    assert_eq!(server.get_count(), 0);
    assert_eq!(history.page(1).unwrap()[0].status, HistoryStatus::Ok);
}

#[tokio::test]
async fn test_more_workers_than_bytes() {
    let content = b"abc".to_vec();
    let server = FixtureServer::start(Fixture::new(content.clone())).await;
    let temp_dir = create_temp_dir();

    let downloader = create_fast_downloader_builder().build();
    let task = create_task_in(&server.url(), temp_dir.path(), 10);
    downloader.download(&task).await.unwrap();

    assert_eq!(server.get_count(), 3);
    assert_file_content(&task.destination, &content);
}

#[tokio::test]
async fn test_missing_length() {
    let server = FixtureServer::start(Fixture::new(create_test_content(10)).omit_length()).await;
    let temp_dir = create_temp_dir();
    let history = create_history();

    let downloader = create_fast_downloader_builder()
        .history(history.clone())
        .build();
    let task = create_task_in(&server.url(), temp_dir.path(), 2);
    let err = downloader.download(&task).await.unwrap_err();

    assert!(matches!(err, Error::MissingLength(_)));
    assert_eq!(server.get_count(), 0);
    assert_eq!(history.page(1).unwrap()[0].status, HistoryStatus::Error);
}

#[tokio::test]
async fn test_unreachable_resource() {
    let temp_dir = create_temp_dir();
    let downloader = create_fast_downloader_builder().build();

    let url = closed_port_url().await;
    let task = create_task_in(&url, temp_dir.path(), 2);
    let err = downloader.download(&task).await.unwrap_err();
    assert!(matches!(err, Error::UnreachableResource { .. }));

    let server = FixtureServer::start(Fixture::new(create_test_content(10))).await;
    let task = create_task_in(&server.url_for("/missing.bin"), temp_dir.path(), 2);
    let err = downloader.download(&task).await.unwrap_err();
    match err {
        Error::UnreachableResource { reason, .. } => assert!(reason.contains("404")),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_range_probe() {
    let content = create_test_content(2048);
    let server = FixtureServer::start(Fixture::new(content.clone())).await;
    let temp_dir = create_temp_dir();

    let downloader = create_fast_downloader_builder()
        .use_range_for_content_length(true)
        .build();
    let task = create_task_in(&server.url(), temp_dir.path(), 2);
    let summary = downloader.download(&task).await.unwrap();

    assert_eq!(server.head_count(), 0);
    assert_eq!(summary.total_size(), 2048);
    assert_file_content(&task.destination, &content);
}

#[tokio::test]
async fn test_existing_file_is_replaced() {
    let content = create_test_content(1000);
    let server = FixtureServer::start(Fixture::new(content.clone())).await;
    let temp_dir = create_temp_dir();
    create_temp_file(temp_dir.path(), "payload.bin", &vec![0xff; 5000]);

    let downloader = create_fast_downloader_builder().build();
    let task = create_task_in(&server.url(), temp_dir.path(), 4);
    downloader.download(&task).await.unwrap();
    downloader.download(&task).await.unwrap();

    assert_file_content(&task.destination, &content);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fail_fast_stops_siblings() {
    let content = create_test_content(3000);
    let server = FixtureServer::start(
        Fixture::new(content)
            .fail(0, u32::MAX)
            .slow(1000)
            .slow(2000),
    )
    .await;
    let temp_dir = create_temp_dir();

    let downloader = create_fast_downloader_builder().fail_fast(true).build();
    let task = create_task_in(&server.url(), temp_dir.path(), 3).max_attempts(2);
    let err = downloader.download(&task).await.unwrap_err();

    assert!(matches!(err, Error::PartitionFailed { index: 0, .. }));
    assert_eq!(server.hits(0), 2);
    // Siblings are stopped before or while their single attempt runs.
    assert!(server.hits(1000) <= 1);
    assert!(server.hits(2000) <= 1);
    let on_disk = std::fs::metadata(&task.destination).unwrap().len();
    assert!(on_disk < 3000);
}

#[tokio::test]
async fn test_used_progress_is_rejected() {
    let temp_dir = create_temp_dir();
    let downloader = create_fast_downloader_builder().build();
    let task = create_task_in(
        &reqwest::Url::parse(TEST_DOMAIN).unwrap(),
        temp_dir.path(),
        1,
    );

    let progress = Progress::new();
    progress.add(1);
    let err = downloader
        .download_with_progress(&task, progress)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Internal(_)));
}

#[tokio::test]
async fn test_on_complete_callback() {
    let server = FixtureServer::start(Fixture::new(create_test_content(500))).await;
    let temp_dir = create_temp_dir();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let downloader = create_fast_downloader_builder()
        .on_complete(move |summary| {
            assert!(summary.is_complete());
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let task = create_task_in(&server.url(), temp_dir.path(), 2);
    downloader.download(&task).await.unwrap();

    let task = create_task_in(&server.url_for("/missing.bin"), temp_dir.path(), 2);
    assert!(downloader.download(&task).await.is_err());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_huge_announced_partition_fails_cleanly() {
    // One terabyte announced, ten bytes delivered.
    let server = FixtureServer::start(
        Fixture::new(create_test_content(10)).announce(1 << 40),
    )
    .await;
    let temp_dir = create_temp_dir();
    let history = create_history();

    let downloader = create_fast_downloader_builder()
        .history(history.clone())
        .build();
    let task = create_task_in(&server.url(), temp_dir.path(), 1).max_attempts(2);
    let err = downloader.download(&task).await.unwrap_err();

    match err {
        Error::PartitionFailed {
            index,
            attempts,
            reason,
            ..
        } => {
            assert_eq!(index, 0);
            assert_eq!(attempts, 2);
            assert!(reason.starts_with("body ended after 10 of"), "reason: {}", reason);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(server.hits(0), 2);
    assert_eq!(history.page(1).unwrap()[0].status, HistoryStatus::Error);
}
