//! Traits used by the gffkit library.
//!

use crate::Position;

/// The [`GenomicInterval`] trait defines common functionality for all types with a
/// 1-based, end-inclusive interval, e.g. [`Record`] and [`Interval`].
///
/// Implementors must uphold `start() <= end()`.
///
/// [`Record`]: crate::gff::record::Record
/// [`Interval`]: crate::ranges::Interval
pub trait GenomicInterval {
    fn start(&self) -> Position;
    fn end(&self) -> Position;

    /// The number of basepairs covered, `end - start + 1`.
    fn width(&self) -> Position {
        self.end() - self.start() + 1
    }

    /// Whether `other` lies entirely within this interval.
    fn contains<I: GenomicInterval>(&self, other: &I) -> bool {
        self.start() <= other.start() && other.end() <= self.end()
    }

    /// Return a tuple version of this interval.
    fn as_tuple(&self) -> (Position, Position) {
        (self.start(), self.end())
    }
}

/// Defines how to serialize something to a single TSV line (without the
/// trailing newline).
pub trait TsvSerialize {
    fn to_tsv(&self) -> String;
}
