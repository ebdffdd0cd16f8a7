//! The alignment anchor table.
//!
//! This is a headerless TSV produced by an external placement tool. The column
//! layout is a fixed contract of that producer:
//!
//! | column | content                  |
//! |--------|--------------------------|
//! | 0      | reference sequence id    |
//! | 1, 2   | reference start, end     |
//! | 4      | query (output) sequence  |
//! | 5      | strand of the placement  |
//! | 6, 7   | query start, end         |
//!
//! Column 3 and anything after column 7 are ignored. Both intervals are
//! normalized, since producers write reverse placements with inverted
//! coordinates.

use csv::StringRecord;
use std::path::PathBuf;

use crate::error::GffError;
use crate::io::tsv::build_tsv_reader;
use crate::lift::{AlignmentAnchor, AnchorTable};
use crate::ranges::Interval;
use crate::Position;

const REF_SEQID: usize = 0;
const REF_START: usize = 1;
const REF_END: usize = 2;
const QUERY_NAME: usize = 4;
const STRAND: usize = 5;
const QUERY_START: usize = 6;
const QUERY_END: usize = 7;
const MIN_COLUMNS: usize = 8;

fn position(row: &StringRecord, column: usize) -> Result<Position, GffError> {
    let value = &row[column];
    value
        .trim()
        .parse::<Position>()
        .map_err(|_| GffError::InvalidPosition(value.to_string()))
}

/// Parse one anchor table row.
pub fn parse_anchor_row(row: &StringRecord) -> Result<AlignmentAnchor, GffError> {
    if row.len() < MIN_COLUMNS {
        return Err(GffError::AnchorTooFewColumns {
            line: row.iter().collect::<Vec<_>>().join("\t"),
            found: row.len(),
        });
    }
    Ok(AlignmentAnchor {
        ref_seqid: row[REF_SEQID].to_string(),
        reference: Interval::new(position(row, REF_START)?, position(row, REF_END)?),
        query: Interval::new(position(row, QUERY_START)?, position(row, QUERY_END)?),
        query_name: row[QUERY_NAME].to_string(),
        strand: row[STRAND].trim().parse()?,
    })
}

/// Load the whole anchor table, indexed by reference sequence id, preserving
/// file order within each sequence.
pub fn read_anchor_table(filepath: impl Into<PathBuf>) -> Result<AnchorTable, GffError> {
    let mut reader = build_tsv_reader(filepath)?;
    let mut table = AnchorTable::new();
    for result in reader.records() {
        let row = result?;
        if row.len() == 1 && row[0].trim().is_empty() {
            continue;
        }
        table.push(parse_anchor_row(&row)?);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gff::record::Strand;
    use crate::test_utilities::temp_file_with;

    #[test]
    fn test_read_anchor_table() {
        let table = read_anchor_table("tests_data/anchors.tsv").unwrap();
        assert_eq!(table.len(), 3);
        let anchors = table.anchors("ctg1").unwrap();
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].reference, Interval::new(1, 5000));
        assert_eq!(anchors[0].query, Interval::new(10001, 15000));
        assert_eq!(anchors[0].query_name, "chrA");
        assert_eq!(anchors[0].strand, Strand::Forward);
        // inverted query coordinates are normalized
        let ctg2 = table.anchors("ctg2").unwrap();
        assert_eq!(ctg2[0].query, Interval::new(20001, 26000));
        assert_eq!(ctg2[0].strand, Strand::Reverse);
    }

    #[test]
    fn test_bad_rows() {
        let file = temp_file_with("ctg1\t1\t100\tx\tchrA\t+\t1\n");
        assert!(matches!(
            read_anchor_table(file.path()),
            Err(GffError::AnchorTooFewColumns { found: 7, .. })
        ));

        let file = temp_file_with("ctg1\t1\t100\tx\tchrA\t*\t1\t100\n");
        assert!(matches!(
            read_anchor_table(file.path()),
            Err(GffError::InvalidStrand(s)) if s == "*"
        ));

        let file = temp_file_with("ctg1\tone\t100\tx\tchrA\t+\t1\t100\n");
        assert!(matches!(
            read_anchor_table(file.path()),
            Err(GffError::InvalidPosition(_))
        ));
    }
}
