//! # gffkit
//!
//! A small library (and the `gffkit` command line tool) for working with GFF3 gene
//! models: rebuilding gene → mRNA → {exon, CDS} hierarchies from flat annotation lines,
//! lifting coordinates between two assemblies with alignment anchors, renaming feature
//! identifiers consistently, filtering gene models by structural heuristics, and writing
//! everything back out in canonical sorted order.
//!
//! GFF3 coordinates are 1-based and end-inclusive, and this library keeps them that way
//! throughout (there is no conversion to 0-based half-open ranges).
//!

pub mod commands;
pub mod error;
pub mod filter;
pub mod gff;
pub mod io;
pub mod lift;
pub mod ranges;
pub mod rename;
pub mod reporting;
pub mod sort;
pub mod test_utilities;
pub mod traits;

/// A 1-based, end-inclusive genomic position.
pub type Position = u64;

/// A signed position, used for intermediate coordinate arithmetic.
pub type PositionOffset = i64;

pub mod prelude {
    pub use crate::error::GffError;
    pub use crate::filter::{FilterParams, StructuralFilter};
    pub use crate::gff::{
        attributes::{Attributes, CanonicalOrder},
        hierarchy::{GeneGroup, HierarchyBuilder, LinkagePolicy},
        record::{FeatureType, Record, Strand},
    };
    pub use crate::io::{GffIterator, InputFile, OutputFile};
    pub use crate::lift::{AlignmentAnchor, AnchorTable};
    pub use crate::ranges::{sorted_pos, Interval};
    pub use crate::rename::{ExonSynthesis, GeneIdFormat, NamingPolicy};
    pub use crate::sort::SortOptions;
    pub use crate::traits::{GenomicInterval, TsvSerialize};
}
