//! The gene-function annotation table.
//!
//! A headerless TSV keyed by gene (or transcript) id in column 0. The remaining
//! columns are the merged output of several annotation sources, with `-` for
//! "no result". Only a few columns matter here:
//!
//! - column 2: a comma-separated list of candidate gene symbols,
//! - columns 3, 6, 10, 13 and 16: product descriptions, in priority order.
//!
//! [`FunctionRecord`] is the only place these indices appear.

use csv::StringRecord;
use indexmap::IndexMap;
use std::path::PathBuf;

use crate::error::GffError;
use crate::io::tsv::build_tsv_reader;

const GENE_ID: usize = 0;
const GENE_SYMBOLS: usize = 2;
const PRODUCT_COLUMNS: [usize; 5] = [3, 6, 10, 13, 16];
const ABSENT: &str = "-";
const SYMBOL_LENGTH: usize = 5;

pub const HYPOTHETICAL_PROTEIN: &str = "hypothetical protein";

/// A typed view of one gene-function table row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionRecord {
    pub gene_id: String,
    pub gene_symbol: Option<String>,
    pub product_candidates: [Option<String>; 5],
}

fn field(row: &StringRecord, column: usize) -> Option<String> {
    row.get(column)
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != ABSENT)
        .map(String::from)
}

/// Pick a gene symbol from a comma-separated candidate list.
///
/// Spaces and hyphens are removed first, and only candidates exactly five characters
/// long are accepted; the *last* accepted candidate wins.
pub fn best_gene_symbol(candidates: &str) -> Option<String> {
    let cleaned: String = candidates
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();
    cleaned
        .split(',')
        .filter(|candidate| candidate.chars().count() == SYMBOL_LENGTH)
        .last()
        .map(String::from)
}

impl FunctionRecord {
    pub fn from_row(row: &StringRecord) -> Option<Self> {
        let gene_id = field(row, GENE_ID)?;
        let gene_symbol = field(row, GENE_SYMBOLS).and_then(|s| best_gene_symbol(&s));
        let product_candidates = PRODUCT_COLUMNS.map(|column| field(row, column));
        Some(Self {
            gene_id,
            gene_symbol,
            product_candidates,
        })
    }

    /// The first present product description, or `hypothetical protein`.
    pub fn product(&self) -> &str {
        self.product_candidates
            .iter()
            .flatten()
            .next()
            .map_or(HYPOTHETICAL_PROTEIN, String::as_str)
    }
}

/// Gene-function records keyed by gene id.
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    records: IndexMap<String, FunctionRecord>,
}

impl FunctionTable {
    pub fn from_path(filepath: impl Into<PathBuf>) -> Result<Self, GffError> {
        let mut reader = build_tsv_reader(filepath)?;
        let mut records = IndexMap::new();
        for result in reader.records() {
            if let Some(record) = FunctionRecord::from_row(&result?) {
                records.insert(record.gene_id.clone(), record);
            }
        }
        Ok(Self { records })
    }

    pub fn get(&self, gene_id: &str) -> Option<&FunctionRecord> {
        self.records.get(gene_id)
    }

    /// Look up `(gene symbol, product)` for an id; unknown ids are hypothetical proteins.
    pub fn lookup(&self, gene_id: &str) -> (Option<&str>, &str) {
        match self.get(gene_id) {
            Some(record) => (record.gene_symbol.as_deref(), record.product()),
            None => (None, HYPOTHETICAL_PROTEIN),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
