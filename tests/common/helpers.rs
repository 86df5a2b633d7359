#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use parfetch::{ByteRange, ByteStream, DownloadBuilder, Error, Info, RangeSource, Result};
use reqwest::Url;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

// Common test constants
pub const TEST_URL: &str = "http://domain.com/data.bin";
pub const TEST_FILENAME: &str = "data.bin";
pub const PIECE: usize = 512;

/// Routes `tracing` output to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Deterministic, non-repeating-per-chunk content of `len` bytes.
pub fn create_test_content(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// A builder writing into `dir`, quiet and with small chunk bounds.
pub fn test_builder(dir: &Path) -> DownloadBuilder {
    DownloadBuilder::new(TEST_URL)
        .directory(dir.to_path_buf())
        .chunk_size_bounds(1024, 1 << 20)
        .interval(Duration::from_millis(5))
        .hidden()
}

/// Asserts that the file at `path` holds exactly `expected`.
pub fn assert_file_content(path: &Path, expected: &[u8]) {
    let actual = fs::read(path).expect("Failed to read downloaded file");
    assert_eq!(actual.len(), expected.len(), "File size mismatch at {:?}", path);
    assert!(actual == expected, "File content mismatch at {:?}", path);
}

/// In-memory [`RangeSource`] with failure injection.
pub struct MockSource {
    content: Vec<u8>,
    rangeable: bool,
    report_size: bool,
    probe_error: bool,
    /// Delay unit; chunks starting earlier in the file wait longer.
    reverse_delay: Option<Duration>,
    /// Any stream starting at this offset fails to open.
    fail_start: Option<u64>,
    /// The first stream opened breaks after this many bytes.
    break_after: Mutex<Option<usize>>,
    /// Streams stall forever after their first piece.
    stall: bool,
    probes: AtomicUsize,
    opened: Mutex<Vec<ByteRange>>,
}

impl MockSource {
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            rangeable: true,
            report_size: true,
            probe_error: false,
            reverse_delay: None,
            fail_start: None,
            break_after: Mutex::new(None),
            stall: false,
            probes: AtomicUsize::new(0),
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn not_rangeable(mut self) -> Self {
        self.rangeable = false;
        self
    }

    pub fn unknown_size(mut self) -> Self {
        self.rangeable = false;
        self.report_size = false;
        self
    }

    pub fn probe_error(mut self) -> Self {
        self.probe_error = true;
        self
    }

    pub fn reverse_delay(mut self, unit: Duration) -> Self {
        self.reverse_delay = Some(unit);
        self
    }

    pub fn fail_at(mut self, start: u64) -> Self {
        self.fail_start = Some(start);
        self
    }

    pub fn break_after(self, bytes: usize) -> Self {
        *self.break_after.lock().unwrap() = Some(bytes);
        self
    }

    pub fn stall(mut self) -> Self {
        self.stall = true;
        self
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> Vec<ByteRange> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl RangeSource for MockSource {
    async fn probe(&self, _url: &Url) -> Result<Info> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.probe_error {
            return Err(Error::Probe("mock probe refused".into()));
        }
        Ok(Info {
            size: if self.report_size {
                self.content.len() as u64
            } else {
                0
            },
            rangeable: self.rangeable,
        })
    }

    async fn open(&self, _url: &Url, range: &ByteRange) -> Result<ByteStream> {
        self.opened.lock().unwrap().push(*range);

        let start = range.start() as usize;
        let end = match range {
            ByteRange::Span { end, .. } => *end as usize + 1,
            ByteRange::Full { .. } => self.content.len(),
        };

        if let Some(unit) = self.reverse_delay {
            let steps = (self.content.len() - start) * 8 / self.content.len().max(1);
            tokio::time::sleep(unit * steps as u32).await;
        }
        if self.fail_start == Some(start as u64) {
            return Err(Error::Network(format!("mock refused bytes {}", range)));
        }

        let mut pieces: Vec<Result<Bytes>> = self.content[start..end]
            .chunks(PIECE)
            .map(|piece| Ok(Bytes::copy_from_slice(piece)))
            .collect();

        if let Some(limit) = self.break_after.lock().unwrap().take() {
            pieces.truncate(limit.div_ceil(PIECE));
            pieces.push(Err(Error::Network("mock connection reset".into())));
        }

        if self.stall {
            pieces.truncate(1);
            return Ok(stream::iter(pieces).chain(stream::pending()).boxed());
        }
        Ok(stream::iter(pieces).boxed())
    }
}
