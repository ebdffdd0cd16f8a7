//! The GFF3 parsing iterator.

use std::io;
use std::path::PathBuf;

use crate::error::GffError;
use crate::gff::record::Record;
use crate::io::file::InputFile;

/// An iterator over the [`Record`]s of a GFF3 file.
///
/// Comment lines (including `##` directives) and blank lines are skipped. Each
/// item is a [`Result`], since any line may fail to parse; callers usually
/// propagate the first error. Malformed attribute segments are dropped and
/// counted; see [`GffIterator::malformed_attributes`].
pub struct GffIterator {
    lines: Box<dyn Iterator<Item = io::Result<String>>>,
    malformed_attributes: usize,
}

impl std::fmt::Debug for GffIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GffIterator").finish_non_exhaustive()
    }
}

impl GffIterator {
    /// Creates a parsing iterator over a (possibly gzip-compressed) GFF3 file.
    pub fn new(filepath: impl Into<PathBuf>) -> Result<Self, GffError> {
        let lines = InputFile::new(filepath).data_lines()?;
        Ok(Self {
            lines: Box::new(lines),
            malformed_attributes: 0,
        })
    }

    /// The number of attribute segments dropped as malformed so far.
    pub fn malformed_attributes(&self) -> usize {
        self.malformed_attributes
    }
}

impl Iterator for GffIterator {
    type Item = Result<Record, GffError>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(e) => return Some(Err(e.into())),
        };
        Some(Record::parse_counted(&line).map(|(record, malformed)| {
            self.malformed_attributes += malformed;
            record
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gff::record::FeatureType;
    use crate::traits::GenomicInterval;

    #[test]
    fn test_read_example_gff() {
        let records: Vec<Record> = GffIterator::new("tests_data/example.gff3")
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 15);
        assert_eq!(records[0].feature_type, FeatureType::Gene);
        assert_eq!(records[0].id(), Some("geneA"));
        assert_eq!(records[0].as_tuple(), (1000, 2600));
    }

    #[test]
    fn test_counts_malformed_attributes() {
        let file = crate::test_utilities::temp_file_with(
            "chr1\tsrc\tgene\t10\t90\t.\t+\t.\tID=g1;loose note\n\
             chr1\tsrc\tmRNA\t10\t90\t.\t+\t.\tID=m1;Parent=g1;x;y\n",
        );
        let mut iter = GffIterator::new(file.path()).unwrap();
        let records: Vec<Record> = iter.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(iter.malformed_attributes(), 3);
    }

    #[test]
    fn test_parse_error_propagates() {
        let file = crate::test_utilities::temp_file_with("chr1\tsrc\tgene\t10\n");
        let mut iter = GffIterator::new(file.path()).unwrap();
        assert!(matches!(iter.next(), Some(Err(GffError::TooFewColumns { .. }))));
        assert!(iter.next().is_none());
    }
}
