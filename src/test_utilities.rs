//! Test cases and test utility functions.
//!

use rand::{thread_rng, Rng};
use std::io::Write;
use tempfile::NamedTempFile;

use crate::{
    error::GffError,
    filter::TranscriptGroup,
    gff::{
        attributes::Attributes,
        record::{FeatureType, Record, Strand},
    },
    lift::AlignmentAnchor,
    ranges::Interval,
    Position,
};

// number of chromosome sequences
pub const NCHROM: usize = 22;

// chromosome sizes
pub const MIN_CHROM_LEN: Position = 1_000_000;
pub const MAX_CHROM_LEN: Position = 50_000_000;

// anchor length
pub const MIN_ANCHOR_LEN: Position = 1;
pub const MAX_ANCHOR_LEN: Position = 100_000;

/// Sample two positions on a random sequence, in no particular order.
pub fn random_position_pair() -> (Position, Position) {
    let mut rng = thread_rng();
    let chrom_len = rng.gen_range(MIN_CHROM_LEN..=MAX_CHROM_LEN);
    (rng.gen_range(1..=chrom_len), rng.gen_range(1..=chrom_len))
}

/// Sample a random chromosome name.
pub fn random_chrom() -> String {
    let mut rng = thread_rng();
    format!("chr{}", rng.gen_range(1..NCHROM + 1))
}

/// Build a random stranded anchor with equally wide reference and query intervals,
/// and a position inside its reference interval.
pub fn random_anchor_and_position() -> (AlignmentAnchor, Position) {
    let mut rng = thread_rng();
    let len = rng.gen_range(MIN_ANCHOR_LEN..MAX_ANCHOR_LEN);
    let ref_start = rng.gen_range(1..=MAX_CHROM_LEN);
    let query_start = rng.gen_range(1..=MAX_CHROM_LEN);
    let strand = if rng.gen_bool(0.5) {
        Strand::Forward
    } else {
        Strand::Reverse
    };
    let anchor = AlignmentAnchor {
        ref_seqid: random_chrom(),
        reference: Interval::new(ref_start, ref_start + len - 1),
        query: Interval::new(query_start, query_start + len - 1),
        query_name: "query".to_string(),
        strand,
    };
    let position = rng.gen_range(ref_start..ref_start + len);
    (anchor, position)
}

/// Parse GFF3 text, skipping blank and comment lines like the file readers do.
pub fn parse_records(input: &str) -> Vec<Result<Record, GffError>> {
    input
        .lines()
        .filter(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(Record::parse)
        .collect()
}

/// Write `contents` to a new temporary file.
pub fn temp_file_with(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("could not create a temporary file");
    file.write_all(contents.as_bytes())
        .expect("could not write the temporary file");
    file.flush().expect("could not flush the temporary file");
    file
}

fn feature(
    seqid: &str,
    feature_type: FeatureType,
    start: Position,
    end: Position,
    strand: Strand,
    attributes: &str,
) -> Record {
    Record::new(
        seqid,
        "random",
        feature_type,
        start,
        end,
        strand,
        Attributes::parse(attributes),
    )
}

/// Build a random gene model starting at `start`: a gene, one mRNA, and one to six
/// exons each with a CDS that covers most of it.
pub fn random_gene_model<R: Rng>(
    rng: &mut R,
    seqid: &str,
    gene_id: &str,
    start: Position,
) -> Vec<Record> {
    let strand = if rng.gen_bool(0.5) {
        Strand::Forward
    } else {
        Strand::Reverse
    };
    let mrna_id = format!("{}.t1", gene_id);
    let parent = format!("Parent={}", mrna_id);

    let mut children = Vec::new();
    let mut position = start;
    for _ in 0..rng.gen_range(1..=6) {
        position += rng.gen_range(0..150);
        let exon_end = position + rng.gen_range(100..600);
        let cds_start = position + rng.gen_range(0..20);
        let cds_end = exon_end - rng.gen_range(0..20);
        children.push(feature(seqid, FeatureType::Exon, position, exon_end, strand, &parent));
        children.push(feature(seqid, FeatureType::Cds, cds_start, cds_end, strand, &parent));
        position = exon_end + 1;
    }
    let end = position - 1;

    let mut records = vec![
        feature(seqid, FeatureType::Gene, start, end, strand, &format!("ID={}", gene_id)),
        feature(
            seqid,
            FeatureType::MRna,
            start,
            end,
            strand,
            &format!("ID={};Parent={}", mrna_id, gene_id),
        ),
    ];
    records.extend(children);
    records
}

/// A random gene model as a single transcript group.
pub fn random_transcript_group<R: Rng>(rng: &mut R, gene_id: &str) -> TranscriptGroup {
    let start = rng.gen_range(1..10_000);
    TranscriptGroup {
        records: random_gene_model(rng, "chr1", gene_id, start),
    }
}

/// Build a random annotation of `ngenes` non-overlapping gene models, as GFF3 text with
/// the genes of each chromosome in a shuffled order.
pub fn random_annotation(ngenes: usize) -> String {
    use rand::seq::SliceRandom;

    let mut rng = thread_rng();
    let mut models = Vec::with_capacity(ngenes);
    let mut start = 1;
    for i in 0..ngenes {
        let model = random_gene_model(&mut rng, "chr1", &format!("gene{}", i), start);
        start = model[0].sort_key().2 + rng.gen_range(1..5000);
        models.push(model);
    }
    models.shuffle(&mut rng);

    let mut text = String::from("##gff-version 3\n");
    for record in models.iter().flatten() {
        text.push_str(&record.to_gff_line(Default::default()));
        text.push('\n');
    }
    text
}
