//! Per-gene exon aggregate.

use crate::exon::Exon;
use crate::merge::{self, MergeOptions, MergeResult};

/// All exons of one gene symbol, pooled across its transcript isoforms.
///
/// Before [`Gene::merge`] the exons are in insertion order and may overlap;
/// afterwards they are strictly increasing by start and disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    gene_id: String,
    exons: Vec<Exon>,
}

impl Gene {
    /// Creates an empty gene aggregate.
    pub fn new<S: Into<String>>(gene_id: S) -> Self {
        Self {
            gene_id: gene_id.into(),
            exons: Vec::new(),
        }
    }

    /// Returns the gene identifier.
    #[inline]
    pub fn gene_id(&self) -> &str {
        &self.gene_id
    }

    /// Returns the exons.
    #[inline]
    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    /// Appends an exon. Duplicates and overlaps are resolved by [`Gene::merge`].
    pub fn push(&mut self, exon: Exon) {
        self.exons.push(exon);
    }

    /// Returns the number of exons.
    #[inline]
    pub fn len(&self) -> usize {
        self.exons.len()
    }

    /// Returns true if the gene holds no exons.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.exons.is_empty()
    }

    /// Returns the chromosome of the first exon.
    pub fn chrom(&self) -> Option<&str> {
        self.exons.first().map(Exon::chrom)
    }

    /// Returns the start of the first exon.
    pub fn start(&self) -> Option<u64> {
        self.exons.first().map(Exon::start)
    }

    /// Collapses the exons into sorted, non-overlapping intervals.
    pub fn merge(&mut self, options: &MergeOptions) -> MergeResult<()> {
        merge::merge_exons(&self.gene_id, &mut self.exons, options)
    }
}
