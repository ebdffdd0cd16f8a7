//! Intervals and interval normalization.
//!
//! All intervals here are 1-based and end-inclusive, as in GFF3. Source files
//! sometimes carry inverted start/end pairs (e.g. anchor tables written in
//! query orientation); every interval is normalized with [`sorted_pos()`] on
//! ingestion so that `start <= end` always holds afterwards.

use crate::{traits::GenomicInterval, Position};

pub mod operations;

/// Order a pair of positions so the smaller comes first.
pub fn sorted_pos(start: Position, end: Position) -> (Position, Position) {
    if start > end {
        (end, start)
    } else {
        (start, end)
    }
}

/// A normalized, 1-based, end-inclusive interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    pub start: Position,
    pub end: Position,
}

impl Interval {
    /// Create a new interval, swapping `start` and `end` if they are inverted.
    pub fn new(start: Position, end: Position) -> Self {
        let (start, end) = sorted_pos(start, end);
        Self { start, end }
    }
}

impl GenomicInterval for Interval {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}
