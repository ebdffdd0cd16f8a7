//! Coordinate lifting between two assemblies through alignment anchors.
//!
//! An [`AlignmentAnchor`] places a reference interval onto a query sequence,
//! either forward or reversed. A feature is lifted through the **first** anchor
//! (in file order) on its sequence whose reference interval contains the whole
//! feature; there is no best-match search, so file order is the tie-break for
//! overlapping anchors.
//!
//! Lifting a feature:
//!
//!  1. projects both endpoints independently with [`project()`],
//!  2. re-normalizes the pair, since a reverse anchor inverts their order,
//!  3. renames the sequence to the anchor's query name,
//!  4. flips the feature strand if the anchor is on the reverse strand.
//!
//! [`project()`]: crate::ranges::operations::project

use indexmap::IndexMap;

use crate::{
    error::GffError,
    gff::record::{Record, Strand},
    ranges::{operations, Interval},
    traits::GenomicInterval,
    Position,
};

/// One reference ↔ query placement from the anchor table.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignmentAnchor {
    pub ref_seqid: String,
    pub reference: Interval,
    pub query: Interval,
    pub query_name: String,
    pub strand: Strand,
}

impl AlignmentAnchor {
    /// Project a reference position into this anchor's query interval.
    pub fn project(&self, position: Position) -> Result<Position, GffError> {
        operations::project(
            self.reference.start,
            self.query.start,
            self.query.end,
            position,
            self.strand,
        )
    }

    /// Map a query position back into reference space.
    pub fn unproject(&self, position: Position) -> Result<Position, GffError> {
        operations::unproject(
            self.reference.start,
            self.query.start,
            self.query.end,
            position,
            self.strand,
        )
    }
}

/// The reference interval of the anchor.
impl GenomicInterval for AlignmentAnchor {
    fn start(&self) -> Position {
        self.reference.start
    }
    fn end(&self) -> Position {
        self.reference.end
    }
}

/// All anchors, grouped by reference sequence id in file order.
#[derive(Clone, Debug, Default)]
pub struct AnchorTable {
    by_seqid: IndexMap<String, Vec<AlignmentAnchor>>,
}

impl AnchorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, anchor: AlignmentAnchor) {
        self.by_seqid
            .entry(anchor.ref_seqid.clone())
            .or_default()
            .push(anchor);
    }

    pub fn anchors(&self, seqid: &str) -> Option<&[AlignmentAnchor]> {
        self.by_seqid.get(seqid).map(Vec::as_slice)
    }

    /// The first anchor on `seqid` whose reference interval contains `feature`.
    pub fn find_containing_anchor<I: GenomicInterval>(
        &self,
        seqid: &str,
        feature: &I,
    ) -> Option<&AlignmentAnchor> {
        self.anchors(seqid)?
            .iter()
            .find(|anchor| anchor.contains(feature))
    }

    /// Total number of anchors.
    pub fn len(&self) -> usize {
        self.by_seqid.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<AlignmentAnchor> for AnchorTable {
    fn from_iter<T: IntoIterator<Item = AlignmentAnchor>>(iter: T) -> Self {
        let mut table = AnchorTable::new();
        for anchor in iter {
            table.push(anchor);
        }
        table
    }
}

/// What happened to a record passed through [`lift_record()`].
#[derive(Clone, Debug, PartialEq)]
pub enum LiftOutcome {
    /// Projected into query coordinates.
    Lifted(Record),
    /// The record's sequence has no anchors at all; passed through unchanged.
    NoAnchors(Record),
    /// The sequence has anchors, but none contains the record; passed through unchanged.
    NoContainingAnchor(Record),
}

impl LiftOutcome {
    pub fn into_record(self) -> Record {
        match self {
            LiftOutcome::Lifted(record)
            | LiftOutcome::NoAnchors(record)
            | LiftOutcome::NoContainingAnchor(record) => record,
        }
    }
}

/// Lift a single record through the anchor table.
///
/// Projection errors (an unstranded anchor, or a projection outside the query
/// sequence) indicate a corrupt anchor table and are returned as errors.
pub fn lift_record(table: &AnchorTable, mut record: Record) -> Result<LiftOutcome, GffError> {
    if table.anchors(&record.seqid).is_none() {
        return Ok(LiftOutcome::NoAnchors(record));
    }
    let Some(anchor) = table.find_containing_anchor(&record.seqid, &record) else {
        return Ok(LiftOutcome::NoContainingAnchor(record));
    };

    let start = anchor.project(record.start())?;
    let end = anchor.project(record.end())?;
    record.set_interval(start, end);
    record.seqid = anchor.query_name.clone();
    if anchor.strand == Strand::Reverse {
        record.strand = record.strand.flip();
    }
    Ok(LiftOutcome::Lifted(record))
}
