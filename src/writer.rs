use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "compression")]
use flate2::write::GzEncoder;
#[cfg(feature = "compression")]
use flate2::Compression as GzCompression;
use tempfile::NamedTempFile;

use crate::exon::Exon;
use crate::gene::Gene;

/// Result alias for writer operations.
pub type WriterResult<T> = Result<T, WriterError>;

/// Errors that can occur while writing records.
#[derive(Debug)]
pub enum WriterError {
    /// An I/O error occurred while writing.
    Io(io::Error),
    /// The finished output could not be moved into place.
    Persist {
        /// Destination path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The requested operation cannot be performed with the current feature set.
    Unsupported(String),
}

impl fmt::Display for WriterError {
    /// Formats the writer error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriterError::Io(err) => write!(f, "write error: {err}"),
            WriterError::Persist { path, source } => {
                write!(f, "could not move output into {}: {source}", path.display())
            }
            WriterError::Unsupported(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for WriterError {
    /// Returns the source error, if any.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WriterError::Io(err) => Some(err),
            WriterError::Persist { source, .. } => Some(source),
            WriterError::Unsupported(_) => None,
        }
    }
}

impl From<io::Error> for WriterError {
    /// Creates a new `WriterError` from an `io::Error`.
    fn from(err: io::Error) -> Self {
        WriterError::Io(err)
    }
}

/// Output configuration.
///
/// # Example
///
/// ```
/// use refgene2gtf::writer::WriterOptions;
///
/// let options = WriterOptions::new().one_based(true);
/// assert!(options.is_one_based());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterOptions {
    one_based: bool,
}

impl WriterOptions {
    /// Creates options that emit coordinates exactly as read.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shifts starts by one so 0-based half-open input becomes 1-based GTF.
    pub fn one_based(mut self, enabled: bool) -> Self {
        self.one_based = enabled;
        self
    }

    /// Returns whether starts are shifted to 1-based.
    pub fn is_one_based(&self) -> bool {
        self.one_based
    }
}

/// Emits merged genes as GTF lines.
pub struct Writer;

impl Writer {
    /// Writes every exon of `gene`, one line each. Returns the line count.
    pub fn from_gene<W: Write>(
        gene: &Gene,
        writer: &mut W,
        options: &WriterOptions,
    ) -> WriterResult<usize> {
        for exon in gene.exons() {
            write_exon(writer, exon, options)?;
        }
        Ok(gene.len())
    }

    /// Writes all `genes` in the given order. Returns the line count.
    pub fn from_genes<W: Write>(
        genes: &[Gene],
        writer: &mut W,
        options: &WriterOptions,
    ) -> WriterResult<usize> {
        let mut lines = 0usize;
        for gene in genes {
            lines += Self::from_gene(gene, writer, options)?;
        }
        Ok(lines)
    }

    /// Writes all `genes` to `path`. Returns the line count.
    ///
    /// Output goes to a temporary file next to `path` that replaces it only
    /// once everything is written, so a failure never leaves a truncated file.
    /// A `.gz` path is gzip-compressed when the `compression` feature is on.
    pub fn to_path<P: AsRef<Path>>(
        path: P,
        genes: &[Gene],
        options: &WriterOptions,
    ) -> WriterResult<usize> {
        let path = path.as_ref();
        let gzip = path.extension().is_some_and(|ext| ext == "gz");

        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&parent)?;

        let lines = if gzip {
            write_gzip(tmp.as_file_mut(), genes, options)?
        } else {
            let mut writer = BufWriter::with_capacity(64 * 1024, tmp.as_file_mut());
            let lines = Self::from_genes(genes, &mut writer, options)?;
            writer.flush()?;
            lines
        };

        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|err| WriterError::Persist {
            path: path.to_path_buf(),
            source: err.error,
        })?;

        Ok(lines)
    }
}

#[cfg(feature = "compression")]
fn write_gzip(file: &mut File, genes: &[Gene], options: &WriterOptions) -> WriterResult<usize> {
    let sink = BufWriter::with_capacity(64 * 1024, file);
    let mut encoder = GzEncoder::new(sink, GzCompression::fast());
    let lines = Writer::from_genes(genes, &mut encoder, options)?;
    let mut sink = encoder.finish()?;
    sink.flush()?;
    Ok(lines)
}

#[cfg(not(feature = "compression"))]
fn write_gzip(_file: &mut File, _genes: &[Gene], _options: &WriterOptions) -> WriterResult<usize> {
    Err(WriterError::Unsupported(
        "enable the `compression` feature to write gzip outputs".into(),
    ))
}

/// Writes a single GTF line.
///
/// Columns: seqname, source, feature, start, end, score, strand, frame,
/// attributes.
fn write_exon<W: Write>(writer: &mut W, exon: &Exon, options: &WriterOptions) -> WriterResult<()> {
    let start = if options.one_based {
        exon.start + 1
    } else {
        exon.start
    };

    writer.write_all(exon.chrom.as_bytes())?;
    writer.write_all(b"\t")?;
    writer.write_all(exon.source.as_bytes())?;
    writer.write_all(b"\t")?;
    writer.write_all(exon.feature.as_bytes())?;
    writer.write_all(b"\t")?;
    write_u64(writer, start)?;
    writer.write_all(b"\t")?;
    write_u64(writer, exon.end)?;
    writer.write_all(b"\t")?;
    writer.write_all(exon.score.as_bytes())?;
    writer.write_all(b"\t")?;
    writer.write_all(exon.strand.as_str().as_bytes())?;
    writer.write_all(b"\t")?;
    writer.write_all(exon.frame.as_bytes())?;
    writer.write_all(b"\t")?;
    writer.write_all(exon.attributes.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Writes a u64 value to the writer as decimal text.
///
/// Uses a stack buffer and writes digits from right to left.
fn write_u64<W: Write>(writer: &mut W, mut value: u64) -> io::Result<()> {
    let mut buf = [0u8; 20];
    let mut idx = buf.len();
    if value == 0 {
        return writer.write_all(b"0");
    }
    while value > 0 {
        idx -= 1;
        buf[idx] = b'0' + (value % 10) as u8;
        value /= 10;
    }
    writer.write_all(&buf[idx..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_u64_renders_decimal() {
        for value in [0u64, 7, 10, 9_220_303, u64::MAX] {
            let mut buf = Vec::new();
            write_u64(&mut buf, value).unwrap();
            assert_eq!(String::from_utf8(buf).unwrap(), value.to_string());
        }
    }
}
