//! The canonical sorter and emitter.
//!
//! Sorting reads only `gene`, `mRNA` and `CDS` lines: existing `exon` lines are dropped
//! and regenerated from the CDS lines (see [`ExonSynthesis`]). All retained records are
//! sorted by `(seqid, start, end)` first and then grouped, so genes come out in genomic
//! order and each transcript's children in ascending position order.
//!
//! Children are **not** reversed for minus-strand transcripts, so the first CDS of a
//! `-` strand gene is the leftmost one, not the one at the start codon.
//!
//! Identities are derived leniently, since the input may come from tools that do not
//! set `ID` on every line:
//!
//! - a gene is keyed by `ID`, else `locus_tag`, else `Parent`,
//! - an mRNA or CDS is owned by `Parent`, else `locus_tag`, else `ID`.

use indexmap::IndexMap;
use log::warn;
use std::collections::HashMap;

use crate::{
    error::GffError,
    gff::{
        attributes::{ID, LOCUS_TAG, PARENT},
        hierarchy::TranscriptModel,
        record::{FeatureType, Record},
    },
    rename::{ExonSynthesis, IdentifierRenamer, NamingPolicy},
    traits::TsvSerialize,
};

/// Configuration of a sort run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortOptions {
    /// Renumber genes as `<prefix>_<n:05>`; keep the original ids if `None`.
    pub locus_tag: Option<String>,
    pub exon_synthesis: ExonSynthesis,
    /// Write the `##gff-version 3` header.
    pub header: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            locus_tag: None,
            exon_synthesis: ExonSynthesis::new(1),
            header: true,
        }
    }
}

fn missing_key(record: &Record) -> GffError {
    GffError::MissingRequiredKey {
        feature: record.feature_type.to_string(),
        line: record.to_tsv(),
    }
}

fn first_present(record: &Record, keys: [&str; 3]) -> Result<String, GffError> {
    keys.iter()
        .find_map(|key| record.attributes.get(key))
        .map(String::from)
        .ok_or_else(|| missing_key(record))
}

/// The identity a gene line is keyed by.
pub fn gene_identity(record: &Record) -> Result<String, GffError> {
    first_present(record, [ID, LOCUS_TAG, PARENT])
}

/// The identity of the feature owning an mRNA or CDS line.
pub fn owner_identity(record: &Record) -> Result<String, GffError> {
    first_present(record, [PARENT, LOCUS_TAG, ID])
}

/// Gene, mRNA and CDS lines indexed by identity, in genomic order.
#[derive(Clone, Debug, Default)]
pub struct SortIndex {
    genes: IndexMap<String, Record>,
    mrnas: HashMap<String, Record>,
    cds: HashMap<String, Vec<Record>>,
}

impl SortIndex {
    /// Sort the records and index them.
    pub fn build<I>(records: I) -> Result<Self, GffError>
    where
        I: IntoIterator<Item = Result<Record, GffError>>,
    {
        let mut retained = Vec::new();
        for record in records {
            let record = record?;
            if matches!(
                record.feature_type,
                FeatureType::Gene | FeatureType::MRna | FeatureType::Cds
            ) {
                retained.push(record);
            }
        }
        // stable, so a gene sharing its interval with its mRNA stays first
        retained.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut index = SortIndex::default();
        for record in retained {
            match record.feature_type {
                FeatureType::Gene => {
                    let id = gene_identity(&record)?;
                    index.genes.insert(id, record);
                }
                FeatureType::MRna => {
                    let owner = owner_identity(&record)?;
                    index.mrnas.insert(owner, record);
                }
                _ => {
                    let owner = owner_identity(&record)?;
                    index.cds.entry(owner).or_default().push(record);
                }
            }
        }
        Ok(index)
    }

    pub fn genes(&self) -> impl Iterator<Item = (&String, &Record)> {
        self.genes.iter()
    }

    /// The transcript of a gene: its mRNA and that mRNA's CDS lines.
    ///
    /// A gene without an mRNA but with CDS lines keyed to the gene itself gets a
    /// synthetic mRNA, a copy of the gene line. Returns `Ok(None)` if the gene has no
    /// mRNA or no CDS evidence.
    pub fn transcript(&self, gene_id: &str) -> Result<Option<TranscriptModel>, GffError> {
        let (mrna, cds) = match (self.mrnas.get(gene_id), self.genes.get(gene_id)) {
            (Some(mrna), _) => {
                let mrna_id = mrna.id().ok_or_else(|| missing_key(mrna))?;
                (mrna.clone(), self.cds.get(mrna_id))
            }
            (None, Some(gene)) => (gene.retyped(FeatureType::MRna), self.cds.get(gene_id)),
            (None, None) => return Ok(None),
        };
        Ok(cds.filter(|cds| !cds.is_empty()).map(|cds| TranscriptModel {
            mrna,
            exons: Vec::new(),
            cds: cds.clone(),
        }))
    }
}

/// The emitted records of a sort run.
#[derive(Clone, Debug, Default)]
pub struct SortedModels {
    pub records: Vec<Record>,
    /// `(old id, new id)` for every emitted gene.
    pub id_map: Vec<(String, String)>,
    /// Genes left out for lack of an mRNA or CDS.
    pub skipped: Vec<String>,
}

/// Sort, regroup and renumber gene models.
pub fn sort_gene_models<I>(records: I, options: &SortOptions) -> Result<SortedModels, GffError>
where
    I: IntoIterator<Item = Result<Record, GffError>>,
{
    let index = SortIndex::build(records)?;
    let mut renamer = IdentifierRenamer::new(
        NamingPolicy::LocusTag(options.locus_tag.clone()),
        options.exon_synthesis,
    );
    let mut sorted = SortedModels::default();

    for (gene_id, gene) in index.genes() {
        let Some(transcript) = index.transcript(gene_id)? else {
            warn!("gene {} has no mRNA or CDS; skipping", gene_id);
            sorted.skipped.push(gene_id.clone());
            continue;
        };
        let records = renamer.rename_model(gene_id, gene, &transcript);
        if let Some(new_id) = records.first().and_then(Record::id) {
            sorted.id_map.push((gene_id.clone(), new_id.to_string()));
        }
        sorted.records.extend(records);
    }
    Ok(sorted)
}
