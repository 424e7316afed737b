//! # refgene2gtf
//!
//! Collapses the transcript isoforms of a UCSC refGene table into one merged
//! set of exons per gene and writes them as GTF.
//!
//! ## Overview
//!
//! A refGene table carries one row per transcript isoform, with the exon
//! coordinates of that isoform in two comma separated columns. Many
//! downstream tools want a single exon model per gene instead. This crate
//! reads the table, pools the exons of every isoform under its gene symbol,
//! merges overlapping exons into a minimal ordered set and emits one GTF line
//! per merged exon.
//!
//! ## Pipeline
//!
//! 1. [`Reader`] yields one [`Transcript`] per coding row (header, comments and
//!    `NR`/`XR` accessions are skipped).
//! 2. [`Genome`] groups the exploded [`Exon`]s by gene identifier.
//! 3. [`merge::merge_exons`] sorts and sweeps each gene's exons once.
//! 4. [`Genome::into_sorted`] orders genes by the chromosome of their first
//!    exon, lexicographically by default (`chr10` before `chr2`).
//! 5. [`Writer`] renders every exon as a tab separated GTF line and moves the
//!    finished file into place atomically.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use refgene2gtf::convert::{run, Config};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stats = run(&Config::new("refGene.txt", "refGene.gtf"))?;
//!     println!("{} genes, {} exons", stats.genes, stats.merged_exons);
//!     Ok(())
//! }
//! ```
//!
//! ## Working with the core directly
//!
//! ```rust
//! use refgene2gtf::{ChromOrder, ExonTemplate, Genome, MergeOptions, Strand, Writer, WriterOptions};
//!
//! let template = ExonTemplate::new();
//! let mut genome = Genome::new();
//! for (gene, chrom, start, end) in [("B", "chr2", 5, 9), ("A", "chr10", 1, 4)] {
//!     let exon = template.build(gene, chrom, &Strand::Forward, start, end).unwrap();
//!     genome.add_exon(gene, exon);
//! }
//! genome.merge_all(&MergeOptions::new()).unwrap();
//!
//! let genes = genome.into_sorted(ChromOrder::Lexicographic);
//! let mut out = Vec::new();
//! Writer::from_genes(&genes, &mut out, &WriterOptions::new()).unwrap();
//! assert!(String::from_utf8(out).unwrap().starts_with("chr10\t"));
//! ```
//!
//! ## Merge semantics
//!
//! Exons are half-open. Two exons merge when they share at least one
//! coordinate, so `[10,20)` and `[20,30)` stay apart while `[10,20)` and
//! `[19,30)` become `[10,30)`. [`MergeOptions::merge_touching`] also joins
//! touching exons. The merged exon keeps the columns of the first exon of
//! its run; only its end is widened.
//!
//! ## Error Handling
//!
//! Every stage has its own error type ([`ReaderError`], [`ExonError`],
//! [`MergeError`], [`WriterError`]) and [`convert::ConvertError`] wraps
//! them for a full run. Malformed rows and empty or inverted exons abort the
//! conversion; no partial output is left behind.
//!
//! ## Feature Flags
//!
//! - `cli`: the `refgene2gtf` binary (adds `clap` and `simple_logger`)
//! - `gzip`, `zstd`, `bz2`: compressed inputs
//! - `compression`: gzip inputs and `.gz` outputs

#![cfg_attr(doc, warn(missing_docs))]

#[cfg(feature = "cli")]
pub mod cli;
pub mod convert;
pub mod exon;
pub mod gene;
pub mod genome;
pub mod merge;
pub mod reader;
pub mod strand;
pub mod transcript;
pub mod writer;

pub use exon::{Exon, ExonError, ExonTemplate};
pub use gene::Gene;
pub use genome::{ChromOrder, Genome};
pub use merge::{MergeError, MergeOptions};
pub use reader::{Reader, ReaderBuilder, ReaderError, ReaderOptions, ReaderResult};
pub use strand::Strand;
pub use transcript::Transcript;
pub use writer::{Writer, WriterError, WriterOptions};
