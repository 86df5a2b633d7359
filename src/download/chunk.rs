//! Byte ranges, chunks and the chunk planner.
//!
//! [`plan_chunks`] splits a resource into an ordered list of [`ByteRange`]s
//! whose union is exactly `[0, total_size)`. Each range becomes a [`Chunk`],
//! which additionally tracks how many bytes its fetcher has written so far.
//!
//! # Examples
//!
//! ```rust
//! use parfetch::download::{plan_chunks, ByteRange};
//!
//! // 10 bytes, 3 workers, chunks between 2 and 8 bytes.
//! let ranges = plan_chunks(10, true, 3, 2, 8)?;
//! assert_eq!(
//!     ranges,
//!     vec![
//!         ByteRange::Span { start: 0, end: 2 },
//!         ByteRange::Span { start: 3, end: 5 },
//!         ByteRange::Span { start: 6, end: 9 },
//!     ]
//! );
//!
//! // Without range support there is a single whole-stream range.
//! let ranges = plan_chunks(10, false, 3, 2, 8)?;
//! assert_eq!(ranges, vec![ByteRange::Full { size: Some(10) }]);
//! # Ok::<(), parfetch::Error>(())
//! ```

use crate::error::{Error, Result};

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// A contiguous part of the remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// The whole stream, requested without a `Range` header.
    ///
    /// `size` is the expected length when the server reported one.
    Full { size: Option<u64> },
    /// Bytes `start..=end` of the resource.
    Span { start: u64, end: u64 },
}

impl ByteRange {
    /// Offset of the first byte of the range in the destination file.
    pub fn start(&self) -> u64 {
        match self {
            ByteRange::Full { .. } => 0,
            ByteRange::Span { start, .. } => *start,
        }
    }

    /// Number of bytes in the range, `None` when the length is unknown.
    pub fn len(&self) -> Option<u64> {
        match self {
            ByteRange::Full { size } => *size,
            ByteRange::Span { start, end } => Some(end - start + 1),
        }
    }

    /// Whether the range is known to hold no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// The part of this range left after `written` bytes have been stored.
    ///
    /// Only spans can be resumed; a whole-stream range must restart from the
    /// beginning, so `None` is returned once any of it has been written.
    pub fn resume_from(&self, written: u64) -> Option<ByteRange> {
        match *self {
            ByteRange::Full { .. } if written == 0 => Some(*self),
            ByteRange::Full { .. } => None,
            ByteRange::Span { start, end } => Some(ByteRange::Span {
                start: start + written,
                end,
            }),
        }
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteRange::Full { size: Some(size) } => write!(f, "0-{} (whole)", size),
            ByteRange::Full { size: None } => write!(f, "0- (whole)"),
            ByteRange::Span { start, end } => write!(f, "{}-{}", start, end),
        }
    }
}

/// One planned range and the progress of the fetcher assigned to it.
///
/// Only that fetcher advances the cursor; the coordinator reads it to decide
/// whether a failed chunk can be resumed and whether all chunks completed.
#[derive(Debug)]
pub struct Chunk {
    index: usize,
    range: ByteRange,
    written: AtomicU64,
    complete: AtomicBool,
}

impl Chunk {
    /// Creates a chunk with an empty write cursor.
    pub fn new(index: usize, range: ByteRange) -> Self {
        Self {
            index,
            range,
            written: AtomicU64::new(0),
            complete: AtomicBool::new(false),
        }
    }

    /// Position of the chunk in the plan.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The planned range.
    pub fn range(&self) -> ByteRange {
        self.range
    }

    /// Bytes written to the destination so far.
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Acquire)
    }

    /// Bytes still expected, `None` when the range length is unknown.
    pub fn remaining(&self) -> Option<u64> {
        self.range.len().map(|len| len.saturating_sub(self.written()))
    }

    /// Whether the chunk has been fully written and flushed.
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    pub(crate) fn advance(&self, n: u64) {
        self.written.fetch_add(n, Ordering::AcqRel);
    }

    pub(crate) fn mark_complete(&self) {
        self.complete.store(true, Ordering::Release);
    }
}

/// Split a resource into consecutive ranges.
///
/// When the resource is not rangeable or its size is unknown (`0`), a single
/// whole-stream range is returned. Otherwise the target chunk count is
/// `min(concurrency, total_size / min_chunk_size)`, at least one, and each
/// chunk is `total_size / count` bytes clamped to the bounds. The remainder is
/// folded into the last chunk when it still fits under `max_chunk_size`, and
/// becomes one shorter trailing chunk otherwise.
///
/// A `concurrency` of `0` is treated as `1`. Fails with [`Error::Planning`]
/// when `min_chunk_size` is zero or larger than `max_chunk_size`.
pub fn plan_chunks(
    total_size: u64,
    rangeable: bool,
    concurrency: usize,
    min_chunk_size: u64,
    max_chunk_size: u64,
) -> Result<Vec<ByteRange>> {
    if min_chunk_size == 0 {
        return Err(Error::Planning("minimum chunk size must be positive".into()));
    }
    if min_chunk_size > max_chunk_size {
        return Err(Error::Planning(format!(
            "minimum chunk size {} exceeds maximum chunk size {}",
            min_chunk_size, max_chunk_size
        )));
    }

    if !rangeable || total_size == 0 {
        let size = (total_size > 0).then_some(total_size);
        return Ok(vec![ByteRange::Full { size }]);
    }

    let concurrency = concurrency.max(1) as u64;
    let count = concurrency.min(total_size / min_chunk_size).max(1);
    let chunk_size = (total_size / count).clamp(min_chunk_size, max_chunk_size);

    if total_size <= chunk_size {
        return Ok(vec![ByteRange::Span {
            start: 0,
            end: total_size - 1,
        }]);
    }

    let full_chunks = total_size / chunk_size;
    let remainder = total_size % chunk_size;
    let mut ranges: Vec<ByteRange> = (0..full_chunks)
        .map(|i| ByteRange::Span {
            start: i * chunk_size,
            end: (i + 1) * chunk_size - 1,
        })
        .collect();

    if remainder > 0 {
        if chunk_size + remainder <= max_chunk_size {
            if let Some(ByteRange::Span { end, .. }) = ranges.last_mut() {
                *end = total_size - 1;
            }
        } else {
            ranges.push(ByteRange::Span {
                start: full_chunks * chunk_size,
                end: total_size - 1,
            });
        }
    }

    Ok(ranges)
}
