//! Input/Output file handling with [`InputFile`] and [`OutputFile`].
//!
//! These types abstract over reading/writing both plaintext and gzip-compressed
//! input/output.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Check if a file is gzipped by looking for the magic numbers. Files shorter
/// than two bytes are not gzipped.
pub fn is_gzipped_file(file_path: impl AsRef<Path>) -> io::Result<bool> {
    let file = File::open(file_path.as_ref())?;
    let mut buffer = Vec::with_capacity(2);
    file.take(2).read_to_end(&mut buffer)?;
    Ok(buffer == [0x1f, 0x8b])
}

/// Represents an input file.
///
/// This abstracts how data is read in, allowing for both plaintext and gzip-compressed
/// input to be read through a common interface.
#[derive(Clone, Debug)]
pub struct InputFile {
    pub filepath: PathBuf,
}

impl InputFile {
    /// Constructs a new `InputFile`. Compression is detected from the file's
    /// magic bytes, not its extension.
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    /// Opens the file and returns a buffered reader, decompressing gzip input.
    pub fn reader(&self) -> io::Result<BufReader<Box<dyn Read>>> {
        let file = File::open(&self.filepath)?;
        let reader: Box<dyn Read> = if is_gzipped_file(&self.filepath)? {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::new(reader))
    }

    /// Iterate over the lines that carry data, i.e. skipping blank lines and
    /// lines starting with `#`.
    pub fn data_lines(&self) -> io::Result<impl Iterator<Item = io::Result<String>>> {
        let lines = self.reader()?.lines();
        Ok(lines.filter(|line| match line {
            Ok(line) => {
                let trimmed = line.trim();
                !trimmed.is_empty() && !trimmed.starts_with('#')
            }
            Err(_) => true,
        }))
    }
}

enum OutputDestination {
    File(PathBuf),
    Stdout,
}

/// Represents an output file.
///
/// This struct is used to handle operations on an output file, such as writing to the file.
/// This abstracts writing both plaintext and gzip-compressed files.
pub struct OutputFile {
    destination: OutputDestination,
    pub header: Option<Vec<String>>,
}

impl OutputFile {
    /// Constructs a new `OutputFile`.
    ///
    /// # Arguments
    ///
    /// * `filepath` - The path of the file. If the file extension is `.gz`, `OutputFile`
    ///   will automatically write gzip-compressed output.
    /// * `header` - Optional header lines, written verbatim before anything else.
    pub fn new(filepath: impl Into<PathBuf>, header: Option<Vec<String>>) -> Self {
        Self {
            destination: OutputDestination::File(filepath.into()),
            header,
        }
    }

    /// Constructs a new [`OutputFile`] for standard output.
    pub fn new_stdout(header: Option<Vec<String>>) -> Self {
        Self {
            destination: OutputDestination::Stdout,
            header,
        }
    }

    /// Either a file at `output`, or standard output if `output` is `None`.
    pub fn from_option(output: Option<impl Into<PathBuf>>, header: Option<Vec<String>>) -> Self {
        match output {
            Some(path) => Self::new(path, header),
            None => Self::new_stdout(header),
        }
    }

    /// Opens the file and returns a writer, with the header (if any) already written.
    pub fn writer(&self) -> io::Result<Box<dyn Write>> {
        let mut writer: Box<dyn Write> = match &self.destination {
            OutputDestination::File(path) => {
                let is_gzip = path.extension().map_or(false, |ext| ext == "gz");
                if is_gzip {
                    Box::new(BufWriter::new(GzEncoder::new(
                        File::create(path)?,
                        Compression::default(),
                    )))
                } else {
                    Box::new(BufWriter::new(File::create(path)?))
                }
            }
            OutputDestination::Stdout => Box::new(BufWriter::new(io::stdout())),
        };
        if let Some(entries) = &self.header {
            for entry in entries {
                writeln!(writer, "{}", entry)?;
            }
        }
        Ok(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::temp_file_with;

    #[test]
    fn test_gzip_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gff3.gz");
        {
            let output = OutputFile::new(&path, Some(vec!["##gff-version 3".to_string()]));
            let mut writer = output.writer().unwrap();
            writeln!(writer, "chr1\tsrc\tgene\t1\t10\t.\t+\t.\tID=g1").unwrap();
            writer.flush().unwrap();
        }
        assert!(is_gzipped_file(&path).unwrap());
        let lines: Vec<String> = InputFile::new(&path)
            .data_lines()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines, vec!["chr1\tsrc\tgene\t1\t10\t.\t+\t.\tID=g1".to_string()]);
    }

    #[test]
    fn test_data_lines_skip_comments_and_blanks() {
        let file = temp_file_with("##gff-version 3\n\nchr1\tline\n# comment\nchr2\tline\n");
        let lines: Vec<String> = InputFile::new(file.path())
            .data_lines()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines, vec!["chr1\tline", "chr2\tline"]);
    }

    #[test]
    fn test_empty_file_not_gzipped() {
        let file = temp_file_with("");
        assert!(!is_gzipped_file(file.path()).unwrap());
    }
}
