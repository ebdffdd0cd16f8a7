//! The [`GffError`] `enum` definition and error messages.
//!
use crate::Position;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// The [`GffError`] defines the standard set of errors that should
/// be passed to the user.
///
/// Recoverable conditions (malformed attribute segments, features with no
/// containing anchor, gene models rejected by the structural filter) are not
/// errors; they are logged and tallied in a [`Report`](crate::reporting::Report).
#[derive(Debug, Error)]
pub enum GffError {
    // IO related errors
    #[error("File reading error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("TSV reading error: {0}")]
    CsvError(#[from] csv::Error),

    // File parsing related errors
    #[error("Integer parsing error: {0}")]
    ParseIntError(#[from] ParseIntError),
    #[error("Float parsing error: {0}")]
    ParseFloatError(#[from] ParseFloatError),
    #[error("Line has too few columns ({found}); GFF3 records need nine.\nLine: {line}")]
    TooFewColumns { line: String, found: usize },
    #[error("Anchor table row has too few columns ({found}); at least eight are required.\nLine: {line}")]
    AnchorTooFewColumns { line: String, found: usize },
    #[error("Invalid position '{0}': positions must be positive integers")]
    InvalidPosition(String),
    #[error("Unrecognized sequence file extension: '{0}'")]
    UnrecognizedFileExtension(String),

    // Hierarchy errors
    #[error("{feature} has no ID, Parent or locus_tag to derive an identity from.\nLine: {line}")]
    MissingRequiredKey { feature: String, line: String },
    #[error("{feature} Parent '{found}' does not match the open {parent} '{expected}'")]
    HierarchyLinkageMismatch {
        feature: String,
        parent: String,
        expected: String,
        found: String,
    },

    // Coordinate projection errors
    #[error("Invalid anchor strand '{0}': must be either '+' or '-'")]
    InvalidStrand(String),
    #[error("Projected position {projected} is out of anchor range (anchor reference start {ref_start}, query [{query_start}, {query_end}], position {position})")]
    OutOfAnchorRange {
        projected: i64,
        ref_start: Position,
        query_start: Position,
        query_end: Position,
        position: Position,
    },

    // Renaming errors
    #[error("Invalid gene ID format template '{0}': it needs exactly two numeric slots (%s, %d or %0Nd)")]
    InvalidFormatTemplate(String),

    // Command line tool related errors
    #[error("Command line argument error: {0}")]
    ArgumentError(#[from] clap::error::Error),
}
