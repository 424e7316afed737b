use std::cmp::Ordering;
use std::collections::HashMap;

use crate::exon::{Exon, ExonResult, ExonTemplate};
use crate::gene::Gene;
use crate::merge::{MergeOptions, MergeResult};
use crate::transcript::Transcript;

/// How genes are ordered by chromosome on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromOrder {
    /// Plain string comparison, so `chr10` sorts before `chr2`.
    #[default]
    Lexicographic,
    /// Natural ordering of embedded numbers, so `chr2` sorts before `chr10`.
    Natural,
}

impl ChromOrder {
    /// Compares two chromosome names.
    pub fn compare(&self, lhs: &str, rhs: &str) -> Ordering {
        match self {
            ChromOrder::Lexicographic => lhs.cmp(rhs),
            ChromOrder::Natural => natord::compare(lhs, rhs),
        }
    }
}

/// Every gene of one run, keyed by gene identifier.
///
/// # Example
///
/// ```
/// use refgene2gtf::exon::ExonTemplate;
/// use refgene2gtf::genome::{ChromOrder, Genome};
/// use refgene2gtf::merge::MergeOptions;
/// use refgene2gtf::strand::Strand;
///
/// let template = ExonTemplate::new();
/// let mut genome = Genome::new();
/// for (start, end) in [(100, 200), (300, 400), (150, 250)] {
///     let exon = template.build("ABC1", "chr1", &Strand::Forward, start, end).unwrap();
///     genome.add_exon("ABC1", exon);
/// }
///
/// genome.merge_all(&MergeOptions::new()).unwrap();
/// let genes = genome.into_sorted(ChromOrder::Lexicographic);
/// let spans: Vec<_> = genes[0].exons().iter().map(|e| (e.start, e.end)).collect();
/// assert_eq!(spans, vec![(100, 250), (300, 400)]);
/// ```
#[derive(Debug, Default)]
pub struct Genome {
    genes: HashMap<String, Gene>,
}

impl Genome {
    /// Creates an empty genome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `exon` to the gene `gene_id`, creating the gene on first sight.
    pub fn add_exon(&mut self, gene_id: &str, exon: Exon) {
        match self.genes.get_mut(gene_id) {
            Some(gene) => gene.push(exon),
            None => {
                let mut gene = Gene::new(gene_id);
                gene.push(exon);
                self.genes.insert(gene_id.to_string(), gene);
            }
        }
    }

    /// Explodes a transcript into exons and files them under its gene.
    ///
    /// Returns the number of exons added.
    ///
    /// # Errors
    ///
    /// Fails on the first exon with `start >= end`; nothing from the
    /// transcript is added in that case.
    pub fn add_transcript(
        &mut self,
        transcript: &Transcript,
        template: &ExonTemplate,
    ) -> ExonResult<usize> {
        let exons = transcript.exons(template)?;
        let count = exons.len();
        for exon in exons {
            self.add_exon(&transcript.gene_id, exon);
        }
        Ok(count)
    }

    /// Returns the gene `gene_id`, if present.
    pub fn get(&self, gene_id: &str) -> Option<&Gene> {
        self.genes.get(gene_id)
    }

    /// Consumes the genome and returns all genes in unspecified order.
    pub fn into_genes(self) -> impl Iterator<Item = Gene> {
        self.genes.into_values()
    }

    /// Returns the number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns true if no gene was added.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Returns the number of exons across all genes.
    pub fn exon_count(&self) -> usize {
        self.genes.values().map(Gene::len).sum()
    }

    /// Merges the exons of every gene.
    ///
    /// # Errors
    ///
    /// Stops at the first gene that fails to merge.
    pub fn merge_all(&mut self, options: &MergeOptions) -> MergeResult<()> {
        for gene in self.genes.values_mut() {
            let before = gene.len();
            gene.merge(options)?;
            log::debug!(
                "merged {} exons of {} into {}",
                before,
                gene.gene_id(),
                gene.len()
            );
        }
        Ok(())
    }

    /// Consumes the genome and returns its genes in output order.
    ///
    /// Genes are ordered by the chromosome of their first exon, then by the
    /// start of that exon, then by identifier. Genes without exons go last.
    pub fn into_sorted(self, order: ChromOrder) -> Vec<Gene> {
        let mut genes: Vec<Gene> = self.into_genes().collect();
        genes.sort_by(|lhs, rhs| compare_genes(lhs, rhs, order));
        genes
    }
}

/// Total order over genes for output.
fn compare_genes(lhs: &Gene, rhs: &Gene, order: ChromOrder) -> Ordering {
    let by_chrom = match (lhs.chrom(), rhs.chrom()) {
        (Some(a), Some(b)) => order.compare(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_chrom
        .then_with(|| lhs.start().cmp(&rhs.start()))
        .then_with(|| lhs.gene_id().cmp(rhs.gene_id()))
}
