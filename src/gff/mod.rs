//! GFF3 records, attributes and gene-model hierarchies.
//!
//! - [`record`]: the nine-column [`Record`](record::Record) line type.
//! - [`attributes`]: the ordered attribute column codec.
//! - [`hierarchy`]: gene → mRNA → {exon, CDS} reconstruction.

pub mod attributes;
pub mod hierarchy;
pub mod record;

/// The header line written by the sorting emitter.
pub const GFF3_HEADER: &str = "##gff-version 3";
