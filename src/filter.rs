//! Structural quality filtering of gene models.
//!
//! The filter works on *transcript groups*: the flat lines of one transcript (the
//! `mRNA` or `transcript` line and the exon/CDS lines after it), together with the
//! `gene` line immediately preceding it, if any. A group is kept only if its CDS count,
//! total CDS length, CDS/exon length ratio and longest intron all pass the thresholds in
//! [`FilterParams`]. Rejections are never errors; they are returned as a [`Rejection`]
//! so the caller can log and count them.

use std::fmt;

use crate::{
    gff::record::{FeatureType, Record},
    traits::GenomicInterval,
    Position, PositionOffset,
};

/// Thresholds of the structural filter.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterParams {
    pub min_cds_count: usize,
    pub min_cds_length: Position,
    pub max_cds_length: Position,
    pub min_cds_exon_ratio: f64,
    pub max_intron: Position,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            min_cds_count: 3,
            min_cds_length: 900,
            max_cds_length: 2000,
            min_cds_exon_ratio: 0.6,
            max_intron: 80,
        }
    }
}

/// The flat records of one transcript, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TranscriptGroup {
    pub records: Vec<Record>,
}

impl TranscriptGroup {
    pub fn transcript(&self) -> Option<&Record> {
        self.records.iter().find(|r| r.feature_type.is_transcript())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A short label for diagnostics: the transcript id, if there is one.
    pub fn label(&self) -> String {
        self.transcript()
            .and_then(Record::id)
            .or_else(|| self.records.first().and_then(Record::id))
            .unwrap_or("<unnamed>")
            .to_string()
    }
}

/// Split a flat record stream into transcript groups.
///
/// A transcript line starts a new group unless the open group has no transcript yet
/// (i.e. it only holds the gene line). A gene line always starts a new group.
pub fn split_transcript_groups<I>(records: I) -> Vec<TranscriptGroup>
where
    I: IntoIterator<Item = Record>,
{
    let mut groups = Vec::new();
    let mut current = TranscriptGroup::default();
    let mut has_transcript = false;

    for record in records {
        let starts_group = match &record.feature_type {
            FeatureType::Gene => true,
            t if t.is_transcript() => has_transcript,
            _ => false,
        };
        if starts_group && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
            has_transcript = false;
        }
        has_transcript |= record.feature_type.is_transcript();
        current.records.push(record);
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Length totals of an accepted transcript group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupStats {
    pub cds_count: usize,
    pub cds_length: Position,
    pub exon_length: Position,
}

/// Why a transcript group was rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum Rejection {
    NoTranscript,
    IntronTooLong {
        exon_start: Position,
        previous: Position,
    },
    TooFewCds(usize),
    CdsLengthOutOfRange(Position),
    NoExonLength,
    LowCdsExonRatio(f64),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoTranscript => write!(f, "no mRNA or transcript line"),
            Rejection::IntronTooLong {
                exon_start,
                previous,
            } => write!(
                f,
                "intron of {} bp before exon at {}",
                exon_start - previous,
                exon_start
            ),
            Rejection::TooFewCds(count) => write!(f, "only {} CDS", count),
            Rejection::CdsLengthOutOfRange(length) => {
                write!(f, "total CDS length {} out of range", length)
            }
            Rejection::NoExonLength => write!(f, "no exon length"),
            Rejection::LowCdsExonRatio(ratio) => write!(f, "CDS/exon ratio {:.3}", ratio),
        }
    }
}

/// Accepts or rejects transcript groups according to [`FilterParams`].
#[derive(Clone, Debug, Default)]
pub struct StructuralFilter {
    pub params: FilterParams,
}

impl StructuralFilter {
    pub fn new(params: FilterParams) -> Self {
        Self { params }
    }

    /// Evaluate one group. The intron check exits early on the first long intron, before
    /// any of the length checks.
    pub fn evaluate(&self, group: &TranscriptGroup) -> Result<GroupStats, Rejection> {
        let params = &self.params;
        let mut stats = GroupStats::default();
        let mut previous: Option<Position> = None;

        for record in &group.records {
            match &record.feature_type {
                t if t.is_transcript() => previous = Some(record.start()),
                FeatureType::Exon => {
                    let reference = previous.ok_or(Rejection::NoTranscript)?;
                    let gap = record.start() as PositionOffset - reference as PositionOffset;
                    if gap > params.max_intron as PositionOffset {
                        return Err(Rejection::IntronTooLong {
                            exon_start: record.start(),
                            previous: reference,
                        });
                    }
                    previous = Some(record.end());
                    stats.exon_length += record.width();
                }
                FeatureType::Cds => {
                    stats.cds_count += 1;
                    stats.cds_length += record.width();
                }
                _ => {}
            }
        }

        if group.transcript().is_none() {
            return Err(Rejection::NoTranscript);
        }
        if stats.cds_count < params.min_cds_count {
            return Err(Rejection::TooFewCds(stats.cds_count));
        }
        if stats.cds_length < params.min_cds_length || stats.cds_length > params.max_cds_length {
            return Err(Rejection::CdsLengthOutOfRange(stats.cds_length));
        }
        if stats.exon_length == 0 {
            return Err(Rejection::NoExonLength);
        }
        let ratio = stats.cds_length as f64 / stats.exon_length as f64;
        if ratio < params.min_cds_exon_ratio {
            return Err(Rejection::LowCdsExonRatio(ratio));
        }
        Ok(stats)
    }

    pub fn accept(&self, group: &TranscriptGroup) -> bool {
        self.evaluate(group).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::{parse_records, random_transcript_group};
    use rand::{rngs::StdRng, SeedableRng};

    fn records(input: &str) -> Vec<Record> {
        parse_records(input).into_iter().map(|r| r.unwrap()).collect()
    }

    // CDS lengths 300, 300, 300; exon lengths 300, 400, 300; introns of 50
    const ACCEPTED: &str = "\
chr1\tsrc\tgene\t1\t1100\t.\t+\t.\tID=g1
chr1\tsrc\tmRNA\t1\t1100\t.\t+\t.\tID=m1;Parent=g1
chr1\tsrc\texon\t1\t300\t.\t+\t.\tParent=m1
chr1\tsrc\tCDS\t1\t300\t.\t+\t0\tParent=m1
chr1\tsrc\texon\t351\t750\t.\t+\t.\tParent=m1
chr1\tsrc\tCDS\t351\t650\t.\t+\t0\tParent=m1
chr1\tsrc\texon\t801\t1100\t.\t+\t.\tParent=m1
chr1\tsrc\tCDS\t801\t1100\t.\t+\t0\tParent=m1
";

    #[test]
    fn test_split_transcript_groups() {
        let input = "\
chr1\tsrc\tgene\t1\t1000\t.\t+\t.\tID=g1
chr1\tsrc\tmRNA\t1\t1000\t.\t+\t.\tID=m1;Parent=g1
chr1\tsrc\tCDS\t1\t1000\t.\t+\t0\tParent=m1
chr1\tsrc\tmRNA\t1\t900\t.\t+\t.\tID=m2;Parent=g1
chr1\tsrc\tCDS\t1\t900\t.\t+\t0\tParent=m2
chr1\tsrc\tgene\t2000\t3000\t.\t+\t.\tID=g2
chr1\tsrc\ttranscript\t2000\t3000\t.\t+\t.\tID=t3;Parent=g2
";
        let groups = split_transcript_groups(records(input));
        let sizes: Vec<usize> = groups.iter().map(TranscriptGroup::len).collect();
        assert_eq!(sizes, vec![3, 2, 2]);
        // the gene line travels with the transcript after it
        assert_eq!(groups[2].records[0].id(), Some("g2"));
        assert_eq!(groups[2].label(), "t3");
        assert_eq!(groups[1].label(), "m2");
    }

    #[test]
    fn test_accepts_good_model() {
        let groups = split_transcript_groups(records(ACCEPTED));
        assert_eq!(groups.len(), 1);
        let stats = StructuralFilter::default().evaluate(&groups[0]).unwrap();
        assert_eq!(
            stats,
            GroupStats {
                cds_count: 3,
                cds_length: 900,
                exon_length: 1000
            }
        );
    }

    #[test]
    fn test_rejects_two_cds() {
        let input: String = ACCEPTED
            .lines()
            .filter(|line| !line.contains("\t801\t1100\t.\t+\t0"))
            .map(|line| format!("{}\n", line))
            .collect();
        let groups = split_transcript_groups(records(&input));
        let filter = StructuralFilter::new(FilterParams {
            min_cds_length: 0,
            ..Default::default()
        });
        assert_eq!(filter.evaluate(&groups[0]), Err(Rejection::TooFewCds(2)));
    }

    #[test]
    fn test_long_intron_exits_early() {
        // a 200 bp intron, and too few CDS: the intron is reported
        let input = "\
chr1\tsrc\tmRNA\t1\t1000\t.\t+\t.\tID=m1
chr1\tsrc\texon\t1\t100\t.\t+\t.\tParent=m1
chr1\tsrc\texon\t301\t400\t.\t+\t.\tParent=m1
";
        let groups = split_transcript_groups(records(input));
        assert_eq!(
            StructuralFilter::default().evaluate(&groups[0]),
            Err(Rejection::IntronTooLong {
                exon_start: 301,
                previous: 100
            })
        );

        // the first exon is measured from the transcript start
        let input = "\
chr1\tsrc\tmRNA\t1\t1000\t.\t+\t.\tID=m1
chr1\tsrc\texon\t101\t400\t.\t+\t.\tParent=m1
";
        let groups = split_transcript_groups(records(input));
        assert!(matches!(
            StructuralFilter::default().evaluate(&groups[0]),
            Err(Rejection::IntronTooLong { previous: 1, .. })
        ));
    }

    #[test]
    fn test_ratio_and_length_rejections() {
        let params = FilterParams {
            min_cds_exon_ratio: 0.95,
            ..Default::default()
        };
        let groups = split_transcript_groups(records(ACCEPTED));
        assert!(matches!(
            StructuralFilter::new(params).evaluate(&groups[0]),
            Err(Rejection::LowCdsExonRatio(_))
        ));

        let params = FilterParams {
            max_cds_length: 899,
            ..Default::default()
        };
        assert_eq!(
            StructuralFilter::new(params).evaluate(&groups[0]),
            Err(Rejection::CdsLengthOutOfRange(900))
        );
    }

    #[test]
    fn test_no_exons_is_rejected() {
        let input = "\
chr1\tsrc\tmRNA\t1\t1000\t.\t+\t.\tID=m1
chr1\tsrc\tCDS\t1\t300\t.\t+\t0\tParent=m1
chr1\tsrc\tCDS\t351\t650\t.\t+\t0\tParent=m1
chr1\tsrc\tCDS\t701\t1000\t.\t+\t0\tParent=m1
";
        let groups = split_transcript_groups(records(input));
        assert_eq!(
            StructuralFilter::default().evaluate(&groups[0]),
            Err(Rejection::NoExonLength)
        );
    }

    #[test]
    fn test_filter_is_monotonic() {
        let mut rng = StdRng::seed_from_u64(7);
        let groups: Vec<TranscriptGroup> = (0..300)
            .map(|i| random_transcript_group(&mut rng, &format!("g{}", i)))
            .collect();
        let accepted = |params: FilterParams| {
            let filter = StructuralFilter::new(params);
            groups.iter().filter(|g| filter.accept(g)).count()
        };

        let mut last = usize::MAX;
        for min_cds_count in 0..8 {
            let count = accepted(FilterParams {
                min_cds_count,
                ..Default::default()
            });
            assert!(count <= last);
            last = count;
        }

        let mut last = usize::MAX;
        for max_cds_length in (500..=3000).rev().step_by(250) {
            let count = accepted(FilterParams {
                max_cds_length,
                ..Default::default()
            });
            assert!(count <= last);
            last = count;
        }
    }
}
