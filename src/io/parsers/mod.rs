//! Parsing iterators and table loaders.
//!
//! - [`gff`]: the [`GffIterator`] parsing iterator over GFF3 records.
//! - [`anchors`]: the alignment anchor table consumed by coordinate lifting.
//! - [`function`]: the gene-function annotation table.
//! - [`utils`]: filetype detection helpers.
//!
//! All of these read plaintext or gzip-compressed input, and skip blank lines and
//! lines starting with `#`.

pub mod anchors;
pub mod function;
pub mod gff;
pub mod utils;

pub use anchors::read_anchor_table;
pub use function::{FunctionRecord, FunctionTable};
pub use gff::GffIterator;
pub use utils::{get_base_extension, SequenceFormat};
