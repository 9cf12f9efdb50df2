//! Byte range partitioning.
//!
//! A resource of `total` bytes is split into contiguous, non-overlapping
//! ranges whose union is exactly `[0, total)`. The last range absorbs the
//! remainder of the integer division.
//!
//! ```rust
//! use pdl::download::partition::partition;
//!
//! let ranges = partition(1000, 3);
//! let bounds: Vec<_> = ranges.iter().map(|r| (r.start, r.last().unwrap())).collect();
//! assert_eq!(bounds, vec![(0, 332), (333, 665), (666, 999)]);
//! ```

use std::fmt;

/// A contiguous span of bytes, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    /// First byte of the range.
    pub start: u64,
    /// One past the last byte of the range.
    pub end: u64,
}

impl ByteRange {
    /// Creates a new range. `end` is exclusive.
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Number of bytes covered by the range.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Whether the range covers no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive index of the last byte, `None` for an empty range.
    pub fn last(&self) -> Option<u64> {
        (!self.is_empty()).then(|| self.end - 1)
    }

    /// Value of the HTTP `Range` header requesting this span.
    pub fn header_value(&self) -> Option<String> {
        self.last().map(|last| format!("bytes={}-{}", self.start, last))
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.header_value() {
            Some(v) => f.write_str(&v),
            None => write!(f, "empty@{}", self.start),
        }
    }
}

/// Split `total` bytes into at most `workers` ranges.
///
/// `workers` is clamped to `[1, total]` so no range is ever empty, except for
/// a zero-byte resource which yields a single empty range.
pub fn partition(total: u64, workers: usize) -> Vec<ByteRange> {
    if total == 0 {
        return vec![ByteRange::new(0, 0)];
    }

    let workers = (workers.max(1) as u64).min(total);
    let part_size = total / workers;

    (0..workers)
        .map(|i| {
            let start = i * part_size;
            let end = if i == workers - 1 {
                total
            } else {
                (i + 1) * part_size
            };
            ByteRange::new(start, end)
        })
        .collect()
}
