//! Reconstruction of gene → mRNA → {exon, CDS} hierarchies from a flat record stream.
//!
//! # Design
//!
//! The [`HierarchyBuilder`] consumes records in file order and expects every parent to
//! precede its children: a `gene`, then its `mRNA`s, each followed by their `exon` and
//! `CDS` lines. All of the bookkeeping lives in an explicit [`ParseState`] that lives for
//! exactly one build.
//!
//! Linkage problems are handled according to a [`LinkagePolicy`]:
//!
//! | Problem                               | [`LinkagePolicy::Strict`]          | [`LinkagePolicy::Permissive`]              |
//! |---------------------------------------|------------------------------------|--------------------------------------------|
//! | mRNA `Parent` is not the open gene    | the whole build fails              | attach to that gene if seen, else promote  |
//! | exon/CDS `Parent` is not the open mRNA| the gene group is dropped          | the line is dropped                        |
//!
//! An orphan mRNA is *promoted* by copying it, retyping the copy as `gene` and using the
//! mRNA's `Parent` as the new gene's `ID`.

use indexmap::IndexMap;
use log::{debug, warn};

use crate::{
    error::GffError,
    gff::{
        attributes::{ID, PARENT},
        record::{FeatureType, Record},
    },
    traits::TsvSerialize,
};

/// How the builder reacts to records whose `Parent` does not match the open feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkagePolicy {
    Strict,
    #[default]
    Permissive,
}

/// One transcript and its children, in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptModel {
    pub mrna: Record,
    pub exons: Vec<Record>,
    pub cds: Vec<Record>,
}

impl TranscriptModel {
    pub fn new(mrna: Record) -> Self {
        Self {
            mrna,
            exons: Vec::new(),
            cds: Vec::new(),
        }
    }
}

/// A gene with its transcripts, keyed by transcript `ID` in first-seen order.
///
/// Every transcript's `Parent` is the gene's `ID`, and every exon/CDS `Parent` is its
/// transcript's `ID`.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneGroup {
    pub gene_id: String,
    pub gene: Record,
    pub transcripts: IndexMap<String, TranscriptModel>,
}

impl GeneGroup {
    pub fn new(gene_id: impl Into<String>, gene: Record) -> Self {
        Self {
            gene_id: gene_id.into(),
            gene,
            transcripts: IndexMap::new(),
        }
    }

    /// A gene group is valid if it has a transcript with CDS evidence.
    pub fn is_valid(&self) -> bool {
        self.coding_transcript().is_some()
    }

    pub fn first_transcript(&self) -> Option<&TranscriptModel> {
        self.transcripts.values().next()
    }

    /// The first transcript, in file order, that has at least one CDS.
    pub fn coding_transcript(&self) -> Option<&TranscriptModel> {
        self.transcripts
            .values()
            .find(|transcript| !transcript.cds.is_empty())
    }
}

/// Counts of the records the builder did not place into a gene group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HierarchyStats {
    pub dropped_children: usize,
    pub promoted_orphans: usize,
    pub aborted_groups: usize,
    pub ignored_records: usize,
}

/// The mutable state of a single hierarchy build.
#[derive(Debug, Default)]
pub struct ParseState {
    current_gene: Option<String>,
    current_mrna: Option<String>,
    aborted: bool,
    groups: IndexMap<String, GeneGroup>,
    stats: HierarchyStats,
}

/// The result of a hierarchy build: gene groups in first-seen order.
#[derive(Debug, Default)]
pub struct Hierarchy {
    pub groups: IndexMap<String, GeneGroup>,
    pub stats: HierarchyStats,
}

impl ParseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Hierarchy {
        Hierarchy {
            groups: self.groups,
            stats: self.stats,
        }
    }

    fn open_group(&mut self) -> Option<&mut GeneGroup> {
        let gene_id = self.current_gene.as_ref()?;
        self.groups.get_mut(gene_id)
    }
}

fn required_id(record: &Record) -> Result<String, GffError> {
    record
        .id()
        .map(String::from)
        .ok_or_else(|| GffError::MissingRequiredKey {
            feature: record.feature_type.to_string(),
            line: record.to_tsv(),
        })
}

fn describe(id: Option<&str>) -> String {
    id.unwrap_or("<none>").to_string()
}

/// Builds [`GeneGroup`]s from a position-ordered record stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct HierarchyBuilder {
    pub policy: LinkagePolicy,
}

impl HierarchyBuilder {
    pub fn new(policy: LinkagePolicy) -> Self {
        Self { policy }
    }

    /// Build the hierarchy from every record of `records`.
    pub fn build<I>(&self, records: I) -> Result<Hierarchy, GffError>
    where
        I: IntoIterator<Item = Result<Record, GffError>>,
    {
        let mut state = ParseState::new();
        for record in records {
            self.push(&mut state, record?)?;
        }
        Ok(state.finish())
    }

    /// Place a single record into the hierarchy under construction.
    pub fn push(&self, state: &mut ParseState, record: Record) -> Result<(), GffError> {
        if record.feature_type.is_transcript() {
            return self.push_transcript(state, record);
        }
        match record.feature_type {
            FeatureType::Gene => self.push_gene(state, record),
            FeatureType::Exon | FeatureType::Cds => {
                self.push_child(state, record);
                Ok(())
            }
            _ => {
                state.stats.ignored_records += 1;
                Ok(())
            }
        }
    }

    fn push_gene(&self, state: &mut ParseState, record: Record) -> Result<(), GffError> {
        let gene_id = required_id(&record)?;
        if state.groups.contains_key(&gene_id) {
            warn!("gene {} appears more than once; keeping the last one", gene_id);
        }
        state
            .groups
            .insert(gene_id.clone(), GeneGroup::new(gene_id.clone(), record));
        state.current_gene = Some(gene_id);
        state.current_mrna = None;
        state.aborted = false;
        Ok(())
    }

    fn push_transcript(&self, state: &mut ParseState, record: Record) -> Result<(), GffError> {
        if state.aborted {
            state.stats.dropped_children += 1;
            return Ok(());
        }
        let mrna_id = required_id(&record)?;
        let parent = record.parent().map(String::from);

        let linked = parent.is_some() && parent == state.current_gene;
        if !linked {
            match self.policy {
                LinkagePolicy::Strict => {
                    return Err(GffError::HierarchyLinkageMismatch {
                        feature: format!("{} {}", record.feature_type, mrna_id),
                        parent: "gene".to_string(),
                        expected: describe(state.current_gene.as_deref()),
                        found: describe(parent.as_deref()),
                    })
                }
                LinkagePolicy::Permissive => {
                    let gene_id = parent.ok_or_else(|| GffError::MissingRequiredKey {
                        feature: record.feature_type.to_string(),
                        line: record.to_tsv(),
                    })?;
                    if !state.groups.contains_key(&gene_id) {
                        debug!(
                            "promoting orphan {} {} to gene {}",
                            record.feature_type, mrna_id, gene_id
                        );
                        let mut gene = record.retyped(FeatureType::Gene);
                        gene.attributes.set(ID, gene_id.clone());
                        gene.attributes.remove(PARENT);
                        state
                            .groups
                            .insert(gene_id.clone(), GeneGroup::new(gene_id.clone(), gene));
                        state.stats.promoted_orphans += 1;
                    }
                    state.current_gene = Some(gene_id);
                }
            }
        }

        if let Some(group) = state.open_group() {
            group
                .transcripts
                .insert(mrna_id.clone(), TranscriptModel::new(record));
        }
        state.current_mrna = Some(mrna_id);
        Ok(())
    }

    fn push_child(&self, state: &mut ParseState, record: Record) {
        if state.aborted {
            state.stats.dropped_children += 1;
            return;
        }
        let parent = record.parent().map(String::from);
        let policy = self.policy;
        let current_mrna = state.current_mrna.clone();

        let transcript = state.open_group().and_then(|group| {
            let key = match policy {
                // only the open mRNA may own children
                LinkagePolicy::Strict => current_mrna.filter(|id| Some(id) == parent.as_ref()),
                // any transcript of the open gene may
                LinkagePolicy::Permissive => parent.clone(),
            }?;
            group.transcripts.get_mut(&key)
        });

        match transcript {
            Some(transcript) => {
                if record.feature_type == FeatureType::Exon {
                    transcript.exons.push(record);
                } else {
                    transcript.cds.push(record);
                }
            }
            None => match self.policy {
                LinkagePolicy::Strict => {
                    warn!(
                        "{} Parent {} does not match the open mRNA {}; dropping gene {}",
                        record.feature_type,
                        describe(parent.as_deref()),
                        describe(state.current_mrna.as_deref()),
                        describe(state.current_gene.as_deref()),
                    );
                    if let Some(gene_id) = state.current_gene.as_ref() {
                        state.groups.shift_remove(gene_id);
                        state.stats.aborted_groups += 1;
                    }
                    state.aborted = true;
                    state.stats.dropped_children += 1;
                }
                LinkagePolicy::Permissive => {
                    warn!(
                        "{} Parent {} is not a transcript of gene {}; dropping line",
                        record.feature_type,
                        describe(parent.as_deref()),
                        describe(state.current_gene.as_deref()),
                    );
                    state.stats.dropped_children += 1;
                }
            },
        }
    }
}
