//! Consistent renaming of gene model identifiers.
//!
//! Three naming policies are supported, selected with [`NamingPolicy`]:
//!
//!  1. **Format**: gene ids come from a printf-style [`GeneIdFormat`] template filled
//!     with a per-sequence counter `n` (incremented each time the sequence id changes)
//!     and a per-sequence gene index `k` (reset on every new sequence). The mRNA is
//!     `<gene>.1`, and children are `<mrna>.exon<j>` / `<mrna>.cds<j>`.
//!
//!  2. **Locus tag**: gene ids are `<prefix>_<n:05>` for a strictly increasing counter
//!     `n` over emitted genes, or the original id when there is no prefix. The mRNA is
//!     `<gene>.mrna1`, and children are `<mrna>.exon<k>` / `<mrna>.CDS<k>`.
//!
//!  3. **Prefixed**: gene ids are `<prefix>_<seqid>_<n>` for a global counter `n`, and
//!     `Name` becomes `prediction_<seqid>_<n>`. The model is flattened: the mRNA is
//!     `<gene>.1`, children are `<gene>.exon<k>` / `<gene>.cds<k>`, and every `Parent`
//!     points at the gene.
//!
//! In all cases every `Parent` reference is rewritten to match.
//!
//! When a transcript has no explicit exon lines, exons can be synthesized by copying
//! its CDS lines, but only if it has at least [`ExonSynthesis::min_cds`] of them. Some
//! pipelines treat any CDS as exon-worthy, others want single-exon genes left CDS-only,
//! so the threshold is explicit.

use std::fmt;
use std::str::FromStr;

use crate::{
    error::GffError,
    gff::{
        attributes::{CanonicalOrder, ID, NAME, PARENT},
        hierarchy::TranscriptModel,
        record::{FeatureType, Record},
    },
};

/// The default gene id template of the format policy.
pub const DEFAULT_GENE_FORMAT: &str = "CgT%sg%05d0";

/// The default gene id prefix of the prefixed policy.
pub const DEFAULT_GENE_PREFIX: &str = "EVM";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Number { width: usize, zero_pad: bool },
}

/// A printf-style gene id template with exactly two numeric slots.
///
/// Supported conversions are `%s`, `%d`, `%Nd` and `%0Nd`; `%%` is a literal `%`. The
/// first slot receives the sequence counter and the second the gene index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneIdFormat {
    template: String,
    segments: Vec<Segment>,
}

impl FromStr for GeneIdFormat {
    type Err = GffError;

    fn from_str(template: &str) -> Result<Self, Self::Err> {
        let invalid = || GffError::InvalidFormatTemplate(template.to_string());
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                literal.push('%');
                continue;
            }
            let zero_pad = chars.peek() == Some(&'0');
            let mut digits = String::new();
            while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(*d);
                chars.next();
            }
            let width = if digits.is_empty() {
                0
            } else {
                digits.parse().map_err(|_| invalid())?
            };
            match chars.next() {
                Some('d') => {}
                Some('s') if digits.is_empty() => {}
                _ => return Err(invalid()),
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Number { width, zero_pad });
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let slots = segments
            .iter()
            .filter(|s| matches!(s, Segment::Number { .. }))
            .count();
        if slots != 2 {
            return Err(invalid());
        }
        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }
}

impl Default for GeneIdFormat {
    fn default() -> Self {
        // the default template is known to be valid
        Self {
            template: DEFAULT_GENE_FORMAT.to_string(),
            segments: vec![
                Segment::Literal("CgT".to_string()),
                Segment::Number { width: 0, zero_pad: false },
                Segment::Literal("g".to_string()),
                Segment::Number { width: 5, zero_pad: true },
                Segment::Literal("0".to_string()),
            ],
        }
    }
}

impl GeneIdFormat {
    /// Fill the template with the sequence counter `n` and gene index `k`.
    pub fn format(&self, n: usize, k: usize) -> String {
        let mut values = [n, k].into_iter();
        let mut id = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => id.push_str(text),
                Segment::Number { width, zero_pad } => {
                    let value = values.next().unwrap_or_default();
                    if *zero_pad {
                        id.push_str(&format!("{:0width$}", value, width = *width));
                    } else {
                        id.push_str(&format!("{:width$}", value, width = *width));
                    }
                }
            }
        }
        id
    }
}

impl fmt::Display for GeneIdFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.template)
    }
}

/// How new gene ids (and, from them, transcript and child ids) are derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamingPolicy {
    Format(GeneIdFormat),
    LocusTag(Option<String>),
    Prefixed(String),
}

impl Default for NamingPolicy {
    fn default() -> Self {
        NamingPolicy::Format(GeneIdFormat::default())
    }
}

impl NamingPolicy {
    pub fn mrna_id(&self, gene_id: &str) -> String {
        match self {
            NamingPolicy::Format(_) | NamingPolicy::Prefixed(_) => format!("{}.1", gene_id),
            NamingPolicy::LocusTag(_) => format!("{}.mrna1", gene_id),
        }
    }

    /// The `Parent` of exon and CDS records: the gene for the flat prefixed policy,
    /// otherwise the mRNA.
    pub fn child_parent<'a>(&self, gene_id: &'a str, mrna_id: &'a str) -> &'a str {
        match self {
            NamingPolicy::Prefixed(_) => gene_id,
            _ => mrna_id,
        }
    }

    /// The id of the `index`-th (1-based) exon or CDS below `parent_id`.
    pub fn child_id(&self, parent_id: &str, feature_type: &FeatureType, index: usize) -> String {
        let suffix = match (self, feature_type) {
            (_, FeatureType::Exon) => "exon",
            (NamingPolicy::LocusTag(_), _) => "CDS",
            _ => "cds",
        };
        format!("{}.{}{}", parent_id, suffix, index)
    }

    /// The attribute order renamed records are written with.
    pub fn attribute_order(&self) -> CanonicalOrder {
        match self {
            NamingPolicy::Format(_) | NamingPolicy::Prefixed(_) => CanonicalOrder::IdFirst,
            NamingPolicy::LocusTag(_) => CanonicalOrder::IdNameParent,
        }
    }
}

/// The minimum number of CDS lines a transcript needs before exon lines are synthesized
/// from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExonSynthesis {
    pub min_cds: usize,
}

impl ExonSynthesis {
    pub fn new(min_cds: usize) -> Self {
        Self { min_cds }
    }

    pub fn applies(&self, cds_count: usize) -> bool {
        cds_count > 0 && cds_count >= self.min_cds
    }
}

impl Default for ExonSynthesis {
    /// Single-exon models stay CDS-only.
    fn default() -> Self {
        Self { min_cds: 2 }
    }
}

/// Configuration of a rename run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameOptions {
    pub policy: NamingPolicy,
    pub exon_synthesis: ExonSynthesis,
    pub attribute_order: CanonicalOrder,
}

impl Default for RenameOptions {
    fn default() -> Self {
        let policy = NamingPolicy::default();
        let attribute_order = policy.attribute_order();
        Self {
            policy,
            exon_synthesis: ExonSynthesis::default(),
            attribute_order,
        }
    }
}

/// Renames gene models one at a time, keeping the counters of the active policy.
#[derive(Clone, Debug, Default)]
pub struct IdentifierRenamer {
    pub policy: NamingPolicy,
    pub exon_synthesis: ExonSynthesis,
    current_seqid: Option<String>,
    sequence_counter: usize,
    gene_index: usize,
    emitted: usize,
}

impl IdentifierRenamer {
    pub fn new(policy: NamingPolicy, exon_synthesis: ExonSynthesis) -> Self {
        Self {
            policy,
            exon_synthesis,
            ..Default::default()
        }
    }

    /// Advance the counters for a gene on `seqid` and return its new id.
    pub fn next_gene_id(&mut self, seqid: &str, original_id: &str) -> String {
        self.emitted += 1;
        match &self.policy {
            NamingPolicy::Format(format) => {
                if self.current_seqid.as_deref() != Some(seqid) {
                    self.current_seqid = Some(seqid.to_string());
                    self.sequence_counter += 1;
                    self.gene_index = 0;
                }
                self.gene_index += 1;
                format.format(self.sequence_counter, self.gene_index)
            }
            NamingPolicy::LocusTag(Some(prefix)) => format!("{}_{:05}", prefix, self.emitted),
            NamingPolicy::LocusTag(None) => original_id.to_string(),
            NamingPolicy::Prefixed(prefix) => format!("{}_{}_{}", prefix, seqid, self.emitted),
        }
    }

    /// Rename a gene and one of its transcripts, returning the records in emission
    /// order: gene, mRNA, then (exon, CDS) pairs by child index.
    pub fn rename_model(
        &mut self,
        original_id: &str,
        gene: &Record,
        transcript: &TranscriptModel,
    ) -> Vec<Record> {
        let gene_id = self.next_gene_id(&gene.seqid, original_id);
        let mrna_id = self.policy.mrna_id(&gene_id);
        let child_parent = self.policy.child_parent(&gene_id, &mrna_id).to_string();
        let locus_tag = matches!(self.policy, NamingPolicy::LocusTag(_));
        // the prefixed policy only rewrites a Name below the gene when one is present
        let prediction = match self.policy {
            NamingPolicy::Prefixed(_) => {
                Some(format!("prediction_{}_{}", gene.seqid, self.emitted))
            }
            _ => None,
        };

        let mut gene = gene.clone();
        gene.attributes.set(ID, gene_id.clone());
        gene.attributes
            .set(NAME, prediction.clone().unwrap_or_else(|| gene_id.clone()));

        let mut mrna = transcript.mrna.clone();
        mrna.attributes.set(ID, mrna_id.clone());
        match &prediction {
            Some(name) if mrna.attributes.contains_key(NAME) => mrna.attributes.set(NAME, name),
            Some(_) => {}
            None if locus_tag => mrna.attributes.set(NAME, gene_id.clone()),
            None => mrna.attributes.set(NAME, mrna_id.clone()),
        }
        mrna.attributes.set(PARENT, gene_id.clone());

        let exons: Vec<Record> = if transcript.exons.is_empty()
            && self.exon_synthesis.applies(transcript.cds.len())
        {
            transcript
                .cds
                .iter()
                .map(|cds| cds.retyped(FeatureType::Exon))
                .collect()
        } else {
            transcript.exons.clone()
        };

        let rename_child = |record: &Record, index: usize| {
            let mut record = record.clone();
            let child_id = self
                .policy
                .child_id(&child_parent, &record.feature_type, index + 1);
            record.attributes.set(ID, child_id);
            if locus_tag {
                record.attributes.set(NAME, gene_id.clone());
            } else if let Some(name) = &prediction {
                if record.attributes.contains_key(NAME) {
                    record.attributes.set(NAME, name);
                }
            }
            record.attributes.set(PARENT, child_parent.clone());
            record
        };

        let mut records = vec![gene, mrna];
        for index in 0..exons.len().max(transcript.cds.len()) {
            if let Some(exon) = exons.get(index) {
                records.push(rename_child(exon, index));
            }
            if let Some(cds) = transcript.cds.get(index) {
                records.push(rename_child(cds, index));
            }
        }
        records
    }

    /// The number of genes renamed so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gff::hierarchy::{HierarchyBuilder, LinkagePolicy};
    use crate::test_utilities::parse_records;
    use std::collections::HashSet;

    const MODELS: &str = "\
chr1\tsrc\tgene\t100\t900\t.\t+\t.\tID=g1;Note=first
chr1\tsrc\tmRNA\t100\t900\t.\t+\t.\tID=m1;Parent=g1
chr1\tsrc\texon\t100\t300\t.\t+\t.\tID=e1;Parent=m1
chr1\tsrc\texon\t500\t900\t.\t+\t.\tID=e2;Parent=m1
chr1\tsrc\tCDS\t150\t300\t.\t+\t0\tID=c1;Parent=m1
chr1\tsrc\tCDS\t500\t800\t.\t+\t0\tID=c2;Parent=m1
chr1\tsrc\tgene\t2000\t2900\t.\t-\t.\tID=g2
chr1\tsrc\tmRNA\t2000\t2900\t.\t-\t.\tID=m2;Parent=g2
chr1\tsrc\tCDS\t2000\t2900\t.\t-\t0\tID=c3;Parent=m2
chr2\tsrc\tgene\t10\t90\t.\t+\t.\tID=g3
chr2\tsrc\tmRNA\t10\t90\t.\t+\t.\tID=m3;Parent=g3
chr2\tsrc\tCDS\t10\t40\t.\t+\t0\tID=c4;Parent=m3
chr2\tsrc\tCDS\t60\t90\t.\t+\t0\tID=c5;Parent=m3
";

    fn rename_all(renamer: &mut IdentifierRenamer) -> Vec<Vec<Record>> {
        let hierarchy = HierarchyBuilder::new(LinkagePolicy::Strict)
            .build(parse_records(MODELS))
            .unwrap();
        hierarchy
            .groups
            .values()
            .map(|group| {
                let transcript = group.first_transcript().unwrap();
                renamer.rename_model(&group.gene_id, &group.gene, transcript)
            })
            .collect()
    }

    fn lines(records: &[Record], order: CanonicalOrder) -> Vec<String> {
        records
            .iter()
            .map(|r| format!("{}\t{}", r.feature_type, r.attributes.serialize(order)))
            .collect()
    }

    #[test]
    fn test_gene_id_format() {
        let format: GeneIdFormat = DEFAULT_GENE_FORMAT.parse().unwrap();
        assert_eq!(format, GeneIdFormat::default());
        assert_eq!(format.format(1, 1), "CgT1g000010");
        assert_eq!(format.format(12, 345), "CgT12g003450");

        let format: GeneIdFormat = "chr%02d_%d%%".parse().unwrap();
        assert_eq!(format.format(3, 7), "chr03_7%");
        let format: GeneIdFormat = "g%3d-%d".parse().unwrap();
        assert_eq!(format.format(3, 7), "g  3-7");
    }

    #[test]
    fn test_gene_id_format_invalid() {
        for template in ["gene%d", "%d%d%d", "x%q%d", "%05s%d", "%d%"] {
            assert!(
                matches!(
                    template.parse::<GeneIdFormat>(),
                    Err(GffError::InvalidFormatTemplate(_))
                ),
                "{} should be rejected",
                template
            );
        }
    }

    #[test]
    fn test_format_policy() {
        let mut renamer = IdentifierRenamer::new(NamingPolicy::default(), ExonSynthesis::new(2));
        let renamed = rename_all(&mut renamer);
        let order = renamer.policy.attribute_order();

        assert_eq!(
            lines(&renamed[0], order),
            vec![
                "gene\tID=CgT1g000010;Note=first;Name=CgT1g000010",
                "mRNA\tID=CgT1g000010.1;Parent=CgT1g000010;Name=CgT1g000010.1",
                "exon\tID=CgT1g000010.1.exon1;Parent=CgT1g000010.1",
                "CDS\tID=CgT1g000010.1.cds1;Parent=CgT1g000010.1",
                "exon\tID=CgT1g000010.1.exon2;Parent=CgT1g000010.1",
                "CDS\tID=CgT1g000010.1.cds2;Parent=CgT1g000010.1",
            ]
        );
        // single-CDS model: no exon synthesized at the default threshold
        assert_eq!(
            lines(&renamed[1], order),
            vec![
                "gene\tID=CgT1g000020;Name=CgT1g000020",
                "mRNA\tID=CgT1g000020.1;Parent=CgT1g000020;Name=CgT1g000020.1",
                "CDS\tID=CgT1g000020.1.cds1;Parent=CgT1g000020.1",
            ]
        );
        // a new sequence bumps n and resets k; two CDS get exons
        let third = lines(&renamed[2], order);
        assert_eq!(third[0], "gene\tID=CgT2g000010;Name=CgT2g000010");
        assert_eq!(third[2], "exon\tID=CgT2g000010.1.exon1;Parent=CgT2g000010.1");
        assert_eq!(third.len(), 6);
    }

    #[test]
    fn test_exon_synthesis_threshold() {
        let mut renamer = IdentifierRenamer::new(NamingPolicy::default(), ExonSynthesis::new(1));
        let renamed = rename_all(&mut renamer);
        let types: Vec<String> = renamed[1].iter().map(|r| r.feature_type.to_string()).collect();
        assert_eq!(types, vec!["gene", "mRNA", "exon", "CDS"]);
        // synthesized exons keep the CDS interval
        assert_eq!(renamed[1][2].sort_key(), renamed[1][3].sort_key());
    }

    #[test]
    fn test_locus_tag_policy() {
        let mut renamer = IdentifierRenamer::new(
            NamingPolicy::LocusTag(Some("ABC".to_string())),
            ExonSynthesis::new(1),
        );
        let renamed = rename_all(&mut renamer);
        let order = renamer.policy.attribute_order();
        assert_eq!(
            lines(&renamed[1], order),
            vec![
                "gene\tID=ABC_00002;Name=ABC_00002",
                "mRNA\tID=ABC_00002.mrna1;Name=ABC_00002;Parent=ABC_00002",
                "exon\tID=ABC_00002.mrna1.exon1;Name=ABC_00002;Parent=ABC_00002.mrna1",
                "CDS\tID=ABC_00002.mrna1.CDS1;Name=ABC_00002;Parent=ABC_00002.mrna1",
            ]
        );
        assert_eq!(renamer.emitted(), 3);
    }

    #[test]
    fn test_locus_tag_without_prefix_keeps_ids() {
        let mut renamer =
            IdentifierRenamer::new(NamingPolicy::LocusTag(None), ExonSynthesis::new(1));
        let renamed = rename_all(&mut renamer);
        assert_eq!(renamed[0][0].id(), Some("g1"));
        assert_eq!(renamed[0][1].id(), Some("g1.mrna1"));
    }

    #[test]
    fn test_prefixed_policy() {
        let mut renamer = IdentifierRenamer::new(
            NamingPolicy::Prefixed(DEFAULT_GENE_PREFIX.to_string()),
            ExonSynthesis::default(),
        );
        let renamed = rename_all(&mut renamer);
        let order = renamer.policy.attribute_order();
        assert_eq!(order, CanonicalOrder::IdFirst);
        assert_eq!(
            lines(&renamed[0], order),
            vec![
                "gene\tID=EVM_chr1_1;Note=first;Name=prediction_chr1_1",
                "mRNA\tID=EVM_chr1_1.1;Parent=EVM_chr1_1",
                "exon\tID=EVM_chr1_1.exon1;Parent=EVM_chr1_1",
                "CDS\tID=EVM_chr1_1.cds1;Parent=EVM_chr1_1",
                "exon\tID=EVM_chr1_1.exon2;Parent=EVM_chr1_1",
                "CDS\tID=EVM_chr1_1.cds2;Parent=EVM_chr1_1",
            ]
        );
        // the counter is global, not per sequence
        assert_eq!(renamed[2][0].id(), Some("EVM_chr2_3"));
        assert_eq!(renamed[2][0].attributes.name(), Some("prediction_chr2_3"));
    }

    #[test]
    fn test_prefixed_policy_rewrites_existing_names() {
        let input = "\
ctg7\tsrc\tgene\t10\t90\t.\t+\t.\tID=g1;Name=old
ctg7\tsrc\tmRNA\t10\t90\t.\t+\t.\tID=m1;Parent=g1;Name=old-t1
ctg7\tsrc\tCDS\t10\t90\t.\t+\t0\tParent=m1;Name=old-c1
";
        let hierarchy = HierarchyBuilder::new(LinkagePolicy::Strict)
            .build(parse_records(input))
            .unwrap();
        let group = &hierarchy.groups["g1"];
        let mut renamer = IdentifierRenamer::new(
            NamingPolicy::Prefixed("PRED".to_string()),
            ExonSynthesis::default(),
        );
        let renamed =
            renamer.rename_model(&group.gene_id, &group.gene, group.coding_transcript().unwrap());
        assert_eq!(
            lines(&renamed, CanonicalOrder::IdFirst),
            vec![
                "gene\tID=PRED_ctg7_1;Name=prediction_ctg7_1",
                "mRNA\tID=PRED_ctg7_1.1;Parent=PRED_ctg7_1;Name=prediction_ctg7_1",
                "CDS\tID=PRED_ctg7_1.cds1;Parent=PRED_ctg7_1;Name=prediction_ctg7_1",
            ]
        );
    }

    #[test]
    fn test_locus_tag_is_injective() {
        let mut renamer = IdentifierRenamer::new(
            NamingPolicy::LocusTag(Some("LT".to_string())),
            ExonSynthesis::default(),
        );
        let ids: Vec<String> = (0..5000)
            .map(|i| renamer.next_gene_id(&format!("chr{}", i % 7), &format!("gene{}", i % 13)))
            .collect();
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }
}
