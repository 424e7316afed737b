use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use log::Level;

use crate::convert::{Config, STDIN};
use crate::exon::{ExonTemplate, DEFAULT_FEATURE, DEFAULT_SCORE, DEFAULT_SOURCE};
use crate::genome::ChromOrder;
use crate::merge::MergeOptions;
use crate::reader::ReaderOptions;
use crate::writer::WriterOptions;

#[derive(Debug, Parser)]
#[command(
    name = "refgene2gtf",
    version,
    about = "Collapse refGene transcript isoforms into per-gene merged exons in GTF"
)]
pub struct Args {
    #[arg(
        short = 'i',
        long = "input",
        required = true,
        value_name = "PATH",
        help = "Path to refGene table ('-' reads stdin)"
    )]
    pub input: PathBuf,

    #[arg(
        short = 'o',
        long = "output",
        required = true,
        value_name = "PATH",
        help = "Path to output GTF (.gz compresses)"
    )]
    pub output: PathBuf,

    #[arg(
        long = "source",
        value_name = "LABEL",
        default_value = DEFAULT_SOURCE,
        help = "GTF source column"
    )]
    pub source: String,

    #[arg(
        long = "feature",
        value_name = "TYPE",
        default_value = DEFAULT_FEATURE,
        help = "GTF feature column"
    )]
    pub feature: String,

    #[arg(
        long = "score",
        value_name = "SCORE",
        default_value = DEFAULT_SCORE,
        help = "GTF score column"
    )]
    pub score: String,

    #[arg(
        short = 'p',
        long = "prefixes",
        value_name = "PREFIXES",
        value_delimiter = ',',
        default_values = ["NR", "XR"],
        help = "Accession prefixes of non-coding transcripts to drop, delimited by comma"
    )]
    pub prefixes: Vec<String>,

    #[arg(
        long = "keep-noncoding",
        help = "Keep every transcript regardless of its accession",
        default_value_t = false
    )]
    pub keep_noncoding: bool,

    #[arg(
        long = "no-header",
        help = "Input has no header line",
        default_value_t = false
    )]
    pub no_header: bool,

    #[arg(
        long = "natural-sort",
        help = "Order chromosomes naturally (chr2 before chr10)",
        default_value_t = false
    )]
    pub natural_sort: bool,

    #[arg(
        long = "merge-touching",
        help = "Also merge exons that only touch end to start",
        default_value_t = false
    )]
    pub merge_touching: bool,

    #[arg(
        long = "strict",
        help = "Fail on genes spanning several chromosomes or strands",
        default_value_t = false
    )]
    pub strict: bool,

    #[arg(
        long = "one-based",
        help = "Shift starts by one to emit 1-based coordinates",
        default_value_t = false
    )]
    pub one_based: bool,

    #[arg(
        short = 'L',
        long = "level",
        value_name = "LEVEL",
        default_value = "info",
        help = "Log level (error, warn, info, debug, trace)"
    )]
    pub level: Level,
}

/// Invalid command line arguments.
#[derive(Debug)]
pub enum CliError {
    /// An argument failed validation.
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidInput(msg) => write!(f, "ERROR: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Args {
    /// Validates paths before any work starts.
    pub fn check(&self) -> Result<(), CliError> {
        if self.input.as_os_str() != STDIN && !self.input.is_file() {
            return Err(CliError::InvalidInput(format!(
                "input file {} does not exist",
                self.input.display()
            )));
        }

        if self.input == self.output {
            return Err(CliError::InvalidInput(
                "input and output must be different files".into(),
            ));
        }

        if let Some(dir) = self.output.parent() {
            if !dir.as_os_str().is_empty() && !dir.is_dir() {
                return Err(CliError::InvalidInput(format!(
                    "output directory {} does not exist",
                    dir.display()
                )));
            }
        }

        if self.source.is_empty() || self.feature.is_empty() {
            return Err(CliError::InvalidInput(
                "source and feature labels must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Builds the run configuration.
    pub fn to_config(&self) -> Config {
        let reader = if self.keep_noncoding {
            ReaderOptions::new().keep_noncoding()
        } else {
            ReaderOptions::new().noncoding_prefixes(self.prefixes.iter().cloned())
        }
        .skip_header(!self.no_header);

        let order = if self.natural_sort {
            ChromOrder::Natural
        } else {
            ChromOrder::Lexicographic
        };

        Config::new(&self.input, &self.output)
            .reader(reader)
            .template(
                ExonTemplate::new()
                    .source(self.source.as_str())
                    .feature(self.feature.as_str())
                    .score(self.score.as_str()),
            )
            .merge(
                MergeOptions::new()
                    .merge_touching(self.merge_touching)
                    .strict(self.strict),
            )
            .order(order)
            .writer(WriterOptions::new().one_based(self.one_based))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_refgene_conventions() {
        let args = Args::parse_from(["refgene2gtf", "-i", "in.txt", "-o", "out.gtf"]);
        assert_eq!(args.prefixes, vec!["NR".to_string(), "XR".to_string()]);
        assert_eq!(args.source, "hg19_refGene");
        assert!(!args.natural_sort);
        assert_eq!(args.level, Level::Info);
    }

    #[test]
    fn flags_reach_config() {
        let args = Args::parse_from([
            "refgene2gtf",
            "-i",
            "in.txt",
            "-o",
            "out.gtf",
            "--natural-sort",
            "--no-header",
            "-p",
            "NR",
        ]);
        let config = args.to_config();
        assert_eq!(config.input(), std::path::Path::new("in.txt"));
        assert_eq!(config.output(), std::path::Path::new("out.gtf"));
        assert_eq!(config.chrom_order(), ChromOrder::Natural);
        assert!(!config.reader_options().skips_header());
        assert_eq!(config.reader_options().prefixes(), &["NR".to_string()]);
        assert!(!config.merge_options().merges_touching());
        assert!(!config.merge_options().is_strict());
    }
}
