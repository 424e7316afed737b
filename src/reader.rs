use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

#[cfg(feature = "bz2")]
use bzip2::read::BzDecoder;
#[cfg(feature = "gzip")]
use flate2::read::MultiGzDecoder;
use memchr::memchr_iter;
#[cfg(feature = "zstd")]
use zstd::stream::read::Decoder as ZstdDecoder;

use crate::transcript::{has_prefix, Transcript, FIELD_COUNT};

/// Result alias for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// An error that can occur when reading a refGene table.
#[derive(Debug)]
pub enum ReaderError {
    /// An I/O error.
    Io(io::Error),
    /// An error that occurred when decoding a line.
    InvalidEncoding {
        /// The line number where the error occurred.
        line: usize,
        /// The error message.
        message: String,
    },
    /// An error that occurred when parsing a field.
    InvalidField {
        /// The line number where the error occurred.
        line: usize,
        /// The name of the field that could not be parsed.
        field: &'static str,
        /// The error message.
        message: String,
    },
    /// An error that occurred when a record has an unexpected number of fields.
    UnexpectedFieldCount {
        /// The line number where the error occurred.
        line: usize,
        /// The expected number of fields.
        expected: usize,
        /// The actual number of fields.
        actual: usize,
    },
    /// The exon coordinate lists disagree with the declared exon count.
    ExonCountMismatch {
        /// The line number where the error occurred.
        line: usize,
        /// The declared exon count.
        expected: usize,
        /// Number of exon starts found.
        starts: usize,
        /// Number of exon ends found.
        ends: usize,
        /// The offending raw row.
        row: String,
    },
    /// An error that occurred when building a reader.
    Builder(String),
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::Io(err) => write!(f, "I/O error: {err}"),
            ReaderError::InvalidEncoding { line, message } => {
                write!(f, "invalid UTF-8 at line {line}: {message}")
            }
            ReaderError::InvalidField {
                line,
                field,
                message,
            } => write!(f, "invalid {field} at line {line}: {message}"),
            ReaderError::UnexpectedFieldCount {
                line,
                expected,
                actual,
            } => write!(f, "line {line} had {actual} fields, expected {expected}"),
            ReaderError::ExonCountMismatch {
                line,
                expected,
                starts,
                ends,
                row,
            } => write!(
                f,
                "line {line} declares {expected} exons but lists {starts} starts and {ends} ends: {row}"
            ),
            ReaderError::Builder(msg) => write!(f, "builder error: {msg}"),
        }
    }
}

impl std::error::Error for ReaderError {
    /// Returns the source error, if any.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReaderError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ReaderError {
    /// Creates a new `ReaderError` from an `io::Error`.
    fn from(err: io::Error) -> Self {
        ReaderError::Io(err)
    }
}

impl ReaderError {
    /// Creates a new `ReaderError` for an invalid field.
    pub(crate) fn invalid_field(line: usize, field: &'static str, message: String) -> ReaderError {
        ReaderError::InvalidField {
            line,
            field,
            message,
        }
    }

    /// Creates a new `ReaderError` for an unexpected field count.
    pub(crate) fn unexpected_field_count(
        line: usize,
        expected: usize,
        actual: usize,
    ) -> ReaderError {
        ReaderError::UnexpectedFieldCount {
            line,
            expected,
            actual,
        }
    }

    /// Creates a new `ReaderError` for an invalid encoding.
    fn invalid_encoding(line: usize, message: impl Into<String>) -> ReaderError {
        ReaderError::InvalidEncoding {
            line,
            message: message.into(),
        }
    }
}

/// Default transcript accession prefixes of non-coding RNAs.
pub const DEFAULT_NONCODING_PREFIXES: [&str; 2] = ["NR", "XR"];

/// Configuration for reader behaviour.
///
/// # Example
///
/// ```
/// use refgene2gtf::reader::ReaderOptions;
///
/// let options = ReaderOptions::new().skip_header(false).noncoding_prefixes(["NR"]);
/// assert!(!options.skips_header());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Discard the first line of the input
    skip_header: bool,
    /// Rows whose accession starts with one of these are dropped
    noncoding_prefixes: Vec<String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            skip_header: true,
            noncoding_prefixes: DEFAULT_NONCODING_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        }
    }
}

impl ReaderOptions {
    /// Creates a new options builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the first line is a header to discard.
    pub fn skip_header(mut self, skip: bool) -> Self {
        self.skip_header = skip;
        self
    }

    /// Replaces the accession prefixes treated as non-coding.
    pub fn noncoding_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.noncoding_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Keeps every row regardless of its accession.
    pub fn keep_noncoding(mut self) -> Self {
        self.noncoding_prefixes.clear();
        self
    }

    /// Returns whether the first line is discarded.
    pub fn skips_header(&self) -> bool {
        self.skip_header
    }

    /// Returns the non-coding accession prefixes.
    pub fn prefixes(&self) -> &[String] {
        &self.noncoding_prefixes
    }
}

/// The compression format of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Automatically detect the compression format from the file extension.
    ///
    /// This is the default.
    #[default]
    Auto,
    /// No compression.
    None,
    /// Gzip compression.
    Gzip,
    /// Zstandard compression.
    Zstd,
    /// Bzip2 compression.
    Bzip2,
}

/// Detect compression from file extension
fn detect_compression_from_extension(path: &Path) -> Compression {
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    match ext {
        "gz" => Compression::Gzip,
        "zst" | "zstd" => Compression::Zstd,
        "bz2" | "bzip2" => Compression::Bzip2,
        _ => Compression::None,
    }
}

/// A builder for creating a `Reader`.
///
/// # Example
///
/// ```rust,no_run
/// use refgene2gtf::reader::{Reader, ReaderOptions};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let reader = Reader::builder()
///         .from_path("tests/data/refgene.txt")
///         .options(ReaderOptions::new().skip_header(true))
///         .build()?;
///
///     for record in reader {
///         let record = record?;
///         println!("{} -> {}", record.name, record.gene_id);
///     }
///
///     Ok(())
/// }
/// ```
pub struct ReaderBuilder {
    source: Option<ReaderSource>,
    options: ReaderOptions,
    buffer_capacity: usize,
    compression: Compression,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self {
            source: None,
            options: ReaderOptions::default(),
            buffer_capacity: 64 * 1024,
            compression: Compression::default(),
        }
    }
}

impl ReaderBuilder {
    /// Reads from a filesystem path.
    pub fn from_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source = Some(ReaderSource::Path(path.as_ref().into()));
        self
    }

    /// Reads from any byte source.
    pub fn from_reader<T>(mut self, reader: T) -> Self
    where
        T: Read + Send + 'static,
    {
        self.source = Some(ReaderSource::Reader(Box::new(reader)));
        self
    }

    /// Replaces the reader options.
    pub fn options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the buffer capacity for the reader.
    ///
    /// The default is 64 KB.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(8 * 1024);
        self
    }

    /// Sets the compression format of a path input.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Builds the `Reader`.
    pub fn build(mut self) -> ReaderResult<Reader> {
        let source = self
            .source
            .take()
            .ok_or_else(|| ReaderError::Builder("ERROR: no input source configured".into()))?;

        let stream = match source {
            ReaderSource::Path(path) => self.open_path_stream(&path)?,
            ReaderSource::Reader(reader) => reader,
        };

        Ok(Reader {
            inner: BufReader::with_capacity(self.buffer_capacity, stream),
            buffer: Vec::with_capacity(1024),
            options: self.options,
            line_number: 0,
            filtered: 0,
        })
    }

    /// Opens a path as a stream, decompressing when asked or detected.
    fn open_path_stream(&self, path: &Path) -> ReaderResult<Box<dyn Read + Send>> {
        let compression = match self.compression {
            Compression::Auto => detect_compression_from_extension(path),
            other => other,
        };

        let file = File::open(path)?;
        match compression {
            Compression::None | Compression::Auto => Ok(Box::new(file)),
            Compression::Gzip => {
                #[cfg(feature = "gzip")]
                {
                    Ok(Box::new(MultiGzDecoder::new(file)))
                }
                #[cfg(not(feature = "gzip"))]
                {
                    drop(file);
                    Err(ReaderError::Builder(
                        "gzip compression requested but the `gzip` feature is disabled".into(),
                    ))
                }
            }
            Compression::Zstd => {
                #[cfg(feature = "zstd")]
                {
                    Ok(Box::new(ZstdDecoder::new(file)?))
                }
                #[cfg(not(feature = "zstd"))]
                {
                    drop(file);
                    Err(ReaderError::Builder(
                        "zstd compression requested but the `zstd` feature is disabled".into(),
                    ))
                }
            }
            Compression::Bzip2 => {
                #[cfg(feature = "bz2")]
                {
                    Ok(Box::new(BzDecoder::new(file)))
                }
                #[cfg(not(feature = "bz2"))]
                {
                    drop(file);
                    Err(ReaderError::Builder(
                        "bzip2 compression requested but the `bz2` feature is disabled".into(),
                    ))
                }
            }
        }
    }
}

/// Reader source
enum ReaderSource {
    Path(PathBuf),
    Reader(Box<dyn Read + Send>),
}

/// A reader for refGene tables.
///
/// Yields one [`Transcript`] per accepted row. The header, blank lines,
/// `#` comments and non-coding accessions are skipped.
///
/// # Example
///
/// ```rust,no_run
/// use refgene2gtf::reader::Reader;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut reader = Reader::from_path("tests/data/refgene.txt")?;
///
///     for record in reader.records() {
///         let record = record?;
///         println!("{}: {} exons", record.gene_id, record.exon_count);
///     }
///
///     Ok(())
/// }
/// ```
pub struct Reader {
    inner: BufReader<Box<dyn Read + Send>>,
    buffer: Vec<u8>,
    options: ReaderOptions,
    line_number: usize,
    filtered: usize,
}

impl Reader {
    /// Creates a new `ReaderBuilder` to configure a `Reader`.
    pub fn builder() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Creates a new `Reader` from a path with default options.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ReaderResult<Self> {
        Self::builder().from_path(path).build()
    }

    /// Creates a new `Reader` from a path with custom reader options.
    pub fn from_path_with_options<P: AsRef<Path>>(
        path: P,
        options: ReaderOptions,
    ) -> ReaderResult<Self> {
        Self::builder().from_path(path).options(options).build()
    }

    /// Creates a new `Reader` from a byte source with default options.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use refgene2gtf::reader::Reader;
    ///
    /// fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let reader = Reader::from_reader(std::io::stdin())?;
    ///     for record in reader {
    ///         let _ = record?;
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn from_reader<T>(reader: T) -> ReaderResult<Self>
    where
        T: Read + Send + 'static,
    {
        Self::builder().from_reader(reader).build()
    }

    /// Returns how many rows were dropped by the non-coding filter so far.
    pub fn filtered(&self) -> usize {
        self.filtered
    }

    /// Returns the options in use.
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Returns an iterator over the remaining records.
    pub fn records(&mut self) -> Records<'_> {
        Records { reader: self }
    }

    fn next_record(&mut self) -> Option<ReaderResult<Transcript>> {
        loop {
            match self.fill_buffer() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(err) => return Some(Err(err)),
            }

            self.line_number += 1;
            if self.line_number == 1 && self.options.skip_header {
                continue;
            }

            let line = match std::str::from_utf8(&self.buffer) {
                Ok(line) => line,
                Err(err) => {
                    return Some(Err(ReaderError::invalid_encoding(
                        self.line_number,
                        err.to_string(),
                    )))
                }
            };

            if should_skip(line) {
                continue;
            }

            let fields = split_fields(line);
            if let Some(name) = fields.get(1) {
                if has_prefix(name, self.options.prefixes()) {
                    self.filtered += 1;
                    log::debug!("skipping non-coding transcript {name} at line {}", self.line_number);
                    continue;
                }
            }

            return Some(Transcript::from_fields(&fields, line, self.line_number));
        }
    }

    /// Fills the buffer with the next line, without its line terminator.
    fn fill_buffer(&mut self) -> ReaderResult<bool> {
        self.buffer.clear();
        let bytes = self.inner.read_until(b'\n', &mut self.buffer)?;
        if bytes == 0 {
            return Ok(false);
        }
        trim_line(&mut self.buffer);
        Ok(true)
    }
}

impl Iterator for Reader {
    type Item = ReaderResult<Transcript>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }
}

/// An iterator over the records in a `Reader`.
///
/// This struct is created by the `records` method on `Reader`.
pub struct Records<'a> {
    reader: &'a mut Reader,
}

impl<'a> Iterator for Records<'a> {
    type Item = ReaderResult<Transcript>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_record()
    }
}

/// Splits a row on tabs, keeping empty columns so positions stay fixed.
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(FIELD_COUNT + 3);
    let mut start = 0usize;
    for idx in memchr_iter(b'\t', line.as_bytes()) {
        fields.push(&line[start..idx]);
        start = idx + 1;
    }
    fields.push(&line[start..]);
    fields
}

/// Strips trailing line terminators.
fn trim_line(line: &mut Vec<u8>) {
    while line.last().is_some_and(|b| *b == b'\n' || *b == b'\r') {
        line.pop();
    }
}

/// Returns `true` if the line should be skipped.
fn should_skip(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_empty_columns() {
        assert_eq!(split_fields("a\t\tc\t"), vec!["a", "", "c", ""]);
        assert_eq!(split_fields("single"), vec!["single"]);
    }

    #[test]
    fn trim_strips_crlf() {
        let mut line = b"row\r\n".to_vec();
        trim_line(&mut line);
        assert_eq!(line, b"row");
    }

    #[test]
    fn detects_compression() {
        assert_eq!(
            detect_compression_from_extension(Path::new("refGene.txt.gz")),
            Compression::Gzip
        );
        assert_eq!(
            detect_compression_from_extension(Path::new("refGene.txt")),
            Compression::None
        );
    }
}
