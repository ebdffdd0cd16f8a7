//! The GFF3 [`Record`] type: one tab-separated annotation line.
//!

use std::fmt;
use std::str::FromStr;

use crate::{
    error::GffError,
    gff::attributes::{Attributes, CanonicalOrder},
    ranges::sorted_pos,
    traits::{GenomicInterval, TsvSerialize},
    Position,
};

/// The number of tab-separated columns in a GFF3 line.
pub const GFF_COLUMNS: usize = 9;

/// Feature type (the third GFF3 column).
///
/// Only the types participating in gene models get their own variant; everything else
/// keeps its original spelling in [`FeatureType::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FeatureType {
    Gene,
    MRna,
    Exon,
    Cds,
    TRna,
    RRna,
    Other(String),
}

impl FeatureType {
    /// Whether this line opens a transcript, i.e. is `mRNA` or `transcript`.
    pub fn is_transcript(&self) -> bool {
        match self {
            FeatureType::MRna => true,
            FeatureType::Other(other) => other == "transcript",
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FeatureType::Gene => "gene",
            FeatureType::MRna => "mRNA",
            FeatureType::Exon => "exon",
            FeatureType::Cds => "CDS",
            FeatureType::TRna => "tRNA",
            FeatureType::RRna => "rRNA",
            FeatureType::Other(other) => other,
        }
    }
}

impl From<&str> for FeatureType {
    fn from(value: &str) -> Self {
        match value {
            "gene" => FeatureType::Gene,
            "mRNA" => FeatureType::MRna,
            "exon" => FeatureType::Exon,
            "CDS" => FeatureType::Cds,
            "tRNA" => FeatureType::TRna,
            "rRNA" => FeatureType::RRna,
            other => FeatureType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Nucleotide strand enum type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unstranded,
}

impl Strand {
    /// Swap `+` and `-`; an unstranded feature stays unstranded.
    pub fn flip(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
            Strand::Unstranded => Strand::Unstranded,
        }
    }
}

impl FromStr for Strand {
    type Err = GffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            // GFF3 uses '?' for "relevant but unknown"
            "." | "?" => Ok(Strand::Unstranded),
            other => Err(GffError::InvalidStrand(other.to_string())),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unstranded => ".",
        };
        write!(f, "{}", s)
    }
}

/// A single GFF3 annotation line.
///
/// `start <= end` always holds: inverted source coordinates are swapped on parse, and
/// [`Record::set_interval()`] normalizes as well.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub seqid: String,
    pub source: String,
    pub feature_type: FeatureType,
    start: Position,
    end: Position,
    pub score: String,
    pub strand: Strand,
    pub phase: String,
    pub attributes: Attributes,
}

fn parse_position(column: &str) -> Result<Position, GffError> {
    match column.trim().parse::<Position>() {
        Ok(position) if position > 0 => Ok(position),
        _ => Err(GffError::InvalidPosition(column.to_string())),
    }
}

impl Record {
    /// Build a record from its parts; `start` and `end` are normalized.
    pub fn new(
        seqid: impl Into<String>,
        source: impl Into<String>,
        feature_type: FeatureType,
        start: Position,
        end: Position,
        strand: Strand,
        attributes: Attributes,
    ) -> Self {
        let (start, end) = sorted_pos(start, end);
        Self {
            seqid: seqid.into(),
            source: source.into(),
            feature_type,
            start,
            end,
            score: ".".to_string(),
            strand,
            phase: ".".to_string(),
            attributes,
        }
    }

    /// Parse one (non-comment) GFF3 line.
    pub fn parse(line: &str) -> Result<Self, GffError> {
        Self::parse_counted(line).map(|(record, _)| record)
    }

    /// Parse one GFF3 line, also returning the number of malformed attribute segments
    /// that were dropped.
    pub fn parse_counted(line: &str) -> Result<(Self, usize), GffError> {
        let columns: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if columns.len() < GFF_COLUMNS {
            return Err(GffError::TooFewColumns {
                line: line.to_string(),
                found: columns.len(),
            });
        }
        let (start, end) = sorted_pos(parse_position(columns[3])?, parse_position(columns[4])?);
        // attribute values may legally contain tabs only if someone broke the format;
        // keep whatever follows the eighth tab
        let (attributes, malformed) = Attributes::parse_counted(&columns[8..].join("\t"));
        let record = Self {
            seqid: columns[0].to_string(),
            source: columns[1].to_string(),
            feature_type: FeatureType::from(columns[2]),
            start,
            end,
            score: columns[5].to_string(),
            strand: columns[6].parse()?,
            phase: columns[7].to_string(),
            attributes,
        };
        Ok((record, malformed))
    }

    pub fn set_interval(&mut self, start: Position, end: Position) {
        let (start, end) = sorted_pos(start, end);
        self.start = start;
        self.end = end;
    }

    pub fn id(&self) -> Option<&str> {
        self.attributes.id()
    }

    pub fn parent(&self) -> Option<&str> {
        self.attributes.parent()
    }

    /// A copy of this record with a different feature type.
    pub fn retyped(&self, feature_type: FeatureType) -> Self {
        let mut record = self.clone();
        record.feature_type = feature_type;
        record
    }

    /// The canonical sort key, `(seqid, start, end)`.
    pub fn sort_key(&self) -> (&str, Position, Position) {
        (&self.seqid, self.start, self.end)
    }

    /// Serialize to a GFF3 line with attributes in the given order.
    pub fn to_gff_line(&self, order: CanonicalOrder) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.seqid,
            self.source,
            self.feature_type,
            self.start,
            self.end,
            self.score,
            self.strand,
            self.phase,
            self.attributes.serialize(order)
        )
    }
}

impl GenomicInterval for Record {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

impl TsvSerialize for Record {
    fn to_tsv(&self) -> String {
        self.to_gff_line(CanonicalOrder::Insertion)
    }
}

impl FromStr for Record {
    type Err = GffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Record::parse(s)
    }
}
