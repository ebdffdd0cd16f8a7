//! Essential TSV reading functionality, which wraps the [`csv`] crate's reader.
//!
//! Used for the auxiliary tables (alignment anchors, gene functions), whose
//! columns are addressed by fixed index rather than by header name.

use csv::{Reader, ReaderBuilder};
use std::io::Read;
use std::path::PathBuf;

use crate::error::GffError;
use crate::io::file::InputFile;

/// Build a TSV reader which ignores comment lines, works on gzip-compressed
/// files, and tolerates rows of different lengths.
///
/// Quoting is disabled: these tables are plain tab-delimited text, and a stray
/// `"` in a description column must not swallow the rest of the file.
pub fn build_tsv_reader(filepath: impl Into<PathBuf>) -> Result<Reader<Box<dyn Read>>, GffError> {
    let stream: Box<dyn Read> = Box::new(InputFile::new(filepath).reader()?);
    let reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(stream);
    Ok(reader)
}
