//! End-to-end conversion of a refGene table into a collapsed GTF.
//!
//! The whole table is read before any gene is merged, and every gene is
//! merged before anything is written. Any error aborts the run and leaves
//! the output path untouched.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::exon::{ExonError, ExonTemplate};
use crate::gene::Gene;
use crate::genome::{ChromOrder, Genome};
use crate::merge::{MergeError, MergeOptions};
use crate::reader::{Reader, ReaderError, ReaderOptions, ReaderResult};
use crate::transcript::Transcript;
use crate::writer::{Writer, WriterError, WriterOptions};

/// Input path that stands for standard input.
pub const STDIN: &str = "-";

/// Result alias for conversion runs.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Any error that aborts a conversion.
#[derive(Debug)]
pub enum ConvertError {
    /// The input table is malformed or unreadable.
    Reader(ReaderError),
    /// An exon violates `start < end`.
    Exon(ExonError),
    /// A gene could not be merged.
    Merge(MergeError),
    /// The output could not be written.
    Writer(WriterError),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Reader(err) => write!(f, "{err}"),
            ConvertError::Exon(err) => write!(f, "{err}"),
            ConvertError::Merge(err) => write!(f, "{err}"),
            ConvertError::Writer(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Reader(err) => Some(err),
            ConvertError::Exon(err) => Some(err),
            ConvertError::Merge(err) => Some(err),
            ConvertError::Writer(err) => Some(err),
        }
    }
}

impl From<ReaderError> for ConvertError {
    fn from(err: ReaderError) -> Self {
        ConvertError::Reader(err)
    }
}

impl From<ExonError> for ConvertError {
    fn from(err: ExonError) -> Self {
        ConvertError::Exon(err)
    }
}

impl From<MergeError> for ConvertError {
    fn from(err: MergeError) -> Self {
        ConvertError::Merge(err)
    }
}

impl From<WriterError> for ConvertError {
    fn from(err: WriterError) -> Self {
        ConvertError::Writer(err)
    }
}

/// Everything one conversion run needs.
///
/// # Example
///
/// ```rust,no_run
/// use refgene2gtf::convert::{run, Config};
/// use refgene2gtf::genome::ChromOrder;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::new("refGene.txt", "refGene.gtf").order(ChromOrder::Natural);
///     let stats = run(&config)?;
///     println!("{} genes", stats.genes);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    input: PathBuf,
    output: PathBuf,
    reader: ReaderOptions,
    template: ExonTemplate,
    merge: MergeOptions,
    order: ChromOrder,
    writer: WriterOptions,
}

impl Config {
    /// Creates a configuration with defaults for every stage.
    pub fn new<I: Into<PathBuf>, O: Into<PathBuf>>(input: I, output: O) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            reader: ReaderOptions::default(),
            template: ExonTemplate::default(),
            merge: MergeOptions::default(),
            order: ChromOrder::default(),
            writer: WriterOptions::default(),
        }
    }

    /// Replaces the reader options.
    pub fn reader(mut self, options: ReaderOptions) -> Self {
        self.reader = options;
        self
    }

    /// Replaces the exon template.
    pub fn template(mut self, template: ExonTemplate) -> Self {
        self.template = template;
        self
    }

    /// Replaces the merge options.
    pub fn merge(mut self, options: MergeOptions) -> Self {
        self.merge = options;
        self
    }

    /// Sets the chromosome ordering of the output.
    pub fn order(mut self, order: ChromOrder) -> Self {
        self.order = order;
        self
    }

    /// Replaces the writer options.
    pub fn writer(mut self, options: WriterOptions) -> Self {
        self.writer = options;
        self
    }

    /// Returns the input path.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Returns the output path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Returns the reader options.
    pub fn reader_options(&self) -> &ReaderOptions {
        &self.reader
    }

    /// Returns the merge options.
    pub fn merge_options(&self) -> &MergeOptions {
        &self.merge
    }

    /// Returns the chromosome ordering.
    pub fn chrom_order(&self) -> ChromOrder {
        self.order
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Transcripts accepted from the table.
    pub transcripts: usize,
    /// Rows dropped by the non-coding filter.
    pub filtered: usize,
    /// Exons read before merging.
    pub raw_exons: usize,
    /// Genes in the output.
    pub genes: usize,
    /// Exons in the output.
    pub merged_exons: usize,
}

/// Groups the exons of `records` by gene.
///
/// Returns the genome and the number of transcripts consumed.
pub fn collect<I>(records: I, template: &ExonTemplate) -> ConvertResult<(Genome, usize)>
where
    I: IntoIterator<Item = ReaderResult<Transcript>>,
{
    let mut genome = Genome::new();
    let mut transcripts = 0usize;

    for record in records {
        let record = record?;
        genome.add_transcript(&record, template)?;
        transcripts += 1;
    }

    Ok((genome, transcripts))
}

/// Merges every gene and returns them in output order.
pub fn collapse(
    mut genome: Genome,
    options: &MergeOptions,
    order: ChromOrder,
) -> ConvertResult<Vec<Gene>> {
    genome.merge_all(options)?;
    Ok(genome.into_sorted(order))
}

/// Runs a full conversion from `config.input` to `config.output`.
pub fn run(config: &Config) -> ConvertResult<RunStats> {
    let mut reader = if config.input == Path::new(STDIN) {
        log::info!("Reading refGene table from stdin");
        Reader::builder()
            .from_reader(std::io::stdin())
            .options(config.reader.clone())
            .build()?
    } else {
        log::info!("Reading refGene table from {}", config.input.display());
        Reader::from_path_with_options(&config.input, config.reader.clone())?
    };

    let (genome, transcripts) = collect(reader.records(), &config.template)?;
    let filtered = reader.filtered();
    let raw_exons = genome.exon_count();
    log::info!(
        "Read {} transcripts ({} non-coding skipped) into {} genes with {} exons",
        transcripts,
        filtered,
        genome.len(),
        raw_exons
    );

    let genes = collapse(genome, &config.merge, config.order)?;
    let merged_exons: usize = genes.iter().map(Gene::len).sum();
    log::info!(
        "Merged {} exons into {} across {} genes",
        raw_exons,
        merged_exons,
        genes.len()
    );

    let lines = Writer::to_path(&config.output, &genes, &config.writer)?;
    log::info!("Wrote {} records to {}", lines, config.output.display());

    Ok(RunStats {
        transcripts,
        filtered,
        raw_exons,
        genes: genes.len(),
        merged_exons,
    })
}
