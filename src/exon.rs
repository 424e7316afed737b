use std::fmt;

use crate::strand::Strand;

/// Default GTF source column.
pub const DEFAULT_SOURCE: &str = "hg19_refGene";
/// Default GTF feature column.
pub const DEFAULT_FEATURE: &str = "exon";
/// Default GTF score column.
pub const DEFAULT_SCORE: &str = "0.0";
/// Frame column; frame information is discarded.
pub const DEFAULT_FRAME: &str = ".";

/// Result alias for exon construction.
pub type ExonResult<T> = Result<T, ExonError>;

/// Errors raised while building an [`Exon`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExonError {
    /// The interval is empty or inverted (`start >= end`).
    InvalidInterval {
        /// Chromosome of the offending interval.
        chrom: String,
        /// Start coordinate.
        start: u64,
        /// End coordinate.
        end: u64,
        /// Gene the interval belongs to.
        gene_id: String,
    },
}

impl fmt::Display for ExonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExonError::InvalidInterval {
                chrom,
                start,
                end,
                gene_id,
            } => write!(
                f,
                "invalid exon {chrom}:{start}-{end} for gene {gene_id}: start must be lower than end"
            ),
        }
    }
}

impl std::error::Error for ExonError {}

/// Constant pass-through columns shared by every exon of a run.
///
/// # Example
///
/// ```
/// use refgene2gtf::exon::ExonTemplate;
///
/// let template = ExonTemplate::new().source("hg38_refGene");
/// assert_eq!(template.source_label(), "hg38_refGene");
/// assert_eq!(template.feature_type(), "exon");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExonTemplate {
    source: String,
    feature: String,
    score: String,
    frame: String,
}

impl Default for ExonTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.into(),
            feature: DEFAULT_FEATURE.into(),
            score: DEFAULT_SCORE.into(),
            frame: DEFAULT_FRAME.into(),
        }
    }
}

impl ExonTemplate {
    /// Creates a template with the refGene defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the source column.
    pub fn source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = source.into();
        self
    }

    /// Overrides the feature column.
    pub fn feature<S: Into<String>>(mut self, feature: S) -> Self {
        self.feature = feature.into();
        self
    }

    /// Overrides the score column.
    pub fn score<S: Into<String>>(mut self, score: S) -> Self {
        self.score = score.into();
        self
    }

    /// Returns the source column.
    #[inline]
    pub fn source_label(&self) -> &str {
        &self.source
    }

    /// Returns the feature column.
    #[inline]
    pub fn feature_type(&self) -> &str {
        &self.feature
    }

    /// Returns the score column.
    #[inline]
    pub fn score_value(&self) -> &str {
        &self.score
    }

    /// Builds a validated exon of `gene_id` from this template.
    ///
    /// # Errors
    ///
    /// Returns [`ExonError::InvalidInterval`] when `start >= end`.
    pub fn build(
        &self,
        gene_id: &str,
        chrom: &str,
        strand: &Strand,
        start: u64,
        end: u64,
    ) -> ExonResult<Exon> {
        if start >= end {
            return Err(ExonError::InvalidInterval {
                chrom: chrom.to_string(),
                start,
                end,
                gene_id: gene_id.to_string(),
            });
        }

        Ok(Exon {
            chrom: chrom.to_string(),
            source: self.source.clone(),
            feature: self.feature.clone(),
            start,
            end,
            score: self.score.clone(),
            strand: strand.clone(),
            frame: self.frame.clone(),
            attributes: gene_attributes(gene_id),
        })
    }
}

/// Renders the attribute column of a collapsed gene.
///
/// Isoform identity is gone after merging, so the gene identifier fills both
/// `gene_id` and `transcript_id`.
pub fn gene_attributes(gene_id: &str) -> String {
    format!("gene_id \"{gene_id}\"; transcript_id \"{gene_id}\";")
}

/// One exon interval with its GTF pass-through columns.
///
/// Coordinates are half-open and must satisfy `start < end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exon {
    /// Chromosome or scaffold name.
    pub chrom: String,
    /// GTF source column.
    pub source: String,
    /// GTF feature column.
    pub feature: String,
    /// Start coordinate.
    pub start: u64,
    /// End coordinate.
    pub end: u64,
    /// GTF score column.
    pub score: String,
    /// Strand, carried through unchanged.
    pub strand: Strand,
    /// GTF frame column.
    pub frame: String,
    /// GTF attribute column.
    pub attributes: String,
}

impl Exon {
    /// Returns the chromosome name.
    #[inline]
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// Returns the start coordinate.
    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Returns true if the interval is empty or inverted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Exon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.source,
            self.feature,
            self.start,
            self.end,
            self.score,
            self.strand,
            self.frame,
            self.attributes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_uses_template_columns() {
        let exon = ExonTemplate::new()
            .build("ABC1", "chr1", &Strand::Forward, 100, 200)
            .unwrap();

        assert_eq!(
            exon.to_string(),
            "chr1\thg19_refGene\texon\t100\t200\t0.0\t+\t.\tgene_id \"ABC1\"; transcript_id \"ABC1\";"
        );
        assert!(!exon.is_empty());
    }

    #[test]
    fn build_rejects_empty_and_inverted() {
        let template = ExonTemplate::new();
        assert!(template
            .build("G", "chr1", &Strand::Forward, 10, 10)
            .is_err());

        let err = template
            .build("G", "chr2", &Strand::Reverse, 20, 10)
            .unwrap_err();
        assert_eq!(
            err,
            ExonError::InvalidInterval {
                chrom: "chr2".into(),
                start: 20,
                end: 10,
                gene_id: "G".into(),
            }
        );
    }
}
