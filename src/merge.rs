//! Interval merge engine.
//!
//! Collapses the exons of one gene into the minimal, ordered set of
//! non-overlapping intervals covering the same coordinates. Exons are stably
//! sorted by start and swept once, keeping only the last emitted interval.
//! When an exon overlaps that interval, only the end boundary is widened; the
//! representative keeps its own chromosome, strand and attribute columns.

use std::fmt;

use crate::exon::Exon;

/// Result alias for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Errors raised by the merge engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// An input exon violates `start < end`.
    InvalidInterval {
        /// Gene being merged.
        gene_id: String,
        /// The offending exon.
        exon: Box<Exon>,
    },
    /// Exons of one gene disagree on chromosome or strand (strict mode only).
    InconsistentGene {
        /// Gene being merged.
        gene_id: String,
        /// The field that differs.
        field: &'static str,
        /// Value carried by the first exon.
        expected: String,
        /// Conflicting value.
        found: String,
    },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::InvalidInterval { gene_id, exon } => write!(
                f,
                "invalid interval {}:{}-{} in gene {gene_id}: start must be lower than end [{exon}]",
                exon.chrom, exon.start, exon.end
            ),
            MergeError::InconsistentGene {
                gene_id,
                field,
                expected,
                found,
            } => write!(
                f,
                "gene {gene_id} spans multiple values for {field} ({expected} vs {found})"
            ),
        }
    }
}

impl std::error::Error for MergeError {}

/// Configuration for the merge engine.
///
/// By default exons merge only when they share a coordinate, so `[10,20)`
/// and `[20,30)` stay apart. This differs from the plain `last.end < next.start`
/// push condition of a textbook sweep, which joins touching exons too; set
/// [`MergeOptions::merge_touching`] to get that output.
///
/// # Example
///
/// ```
/// use refgene2gtf::merge::MergeOptions;
///
/// let options = MergeOptions::new().merge_touching(true).strict(true);
/// assert!(options.merges_touching());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    merge_touching: bool,
    strict: bool,
}

impl MergeOptions {
    /// Creates options with defaults: touching exons stay apart, metadata is
    /// not cross-checked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also merges exons that only touch (`next.start == last.end`).
    pub fn merge_touching(mut self, enabled: bool) -> Self {
        self.merge_touching = enabled;
        self
    }

    /// Rejects genes whose exons span several chromosomes or strands.
    pub fn strict(mut self, enabled: bool) -> Self {
        self.strict = enabled;
        self
    }

    /// Returns whether touching exons are merged.
    pub fn merges_touching(&self) -> bool {
        self.merge_touching
    }

    /// Returns whether strict metadata checks are enabled.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    #[inline]
    fn joins(&self, last: &Exon, next: &Exon) -> bool {
        if self.merge_touching {
            next.start <= last.end
        } else {
            next.start < last.end
        }
    }
}

/// Merges `exons` of `gene_id` in place.
///
/// # Errors
///
/// Fails on the first exon with `start >= end`, and in strict mode when the
/// exons disagree on chromosome or strand. On error `exons` is left untouched.
///
/// # Example
///
/// ```
/// use refgene2gtf::exon::ExonTemplate;
/// use refgene2gtf::merge::{merge_exons, MergeOptions};
/// use refgene2gtf::strand::Strand;
///
/// let template = ExonTemplate::new();
/// let mut exons = vec![
///     template.build("G", "chr1", &Strand::Forward, 19, 30).unwrap(),
///     template.build("G", "chr1", &Strand::Forward, 10, 20).unwrap(),
/// ];
/// merge_exons("G", &mut exons, &MergeOptions::new()).unwrap();
/// assert_eq!(exons.len(), 1);
/// assert_eq!((exons[0].start, exons[0].end), (10, 30));
/// ```
pub fn merge_exons(gene_id: &str, exons: &mut Vec<Exon>, options: &MergeOptions) -> MergeResult<()> {
    if exons.is_empty() {
        return Ok(());
    }

    if let Some(exon) = exons.iter().find(|exon| exon.is_empty()) {
        return Err(MergeError::InvalidInterval {
            gene_id: gene_id.to_string(),
            exon: Box::new(exon.clone()),
        });
    }

    if options.strict {
        check_consistency(gene_id, exons)?;
    }

    // stable: ties keep insertion order, which picks the representative
    exons.sort_by_key(|exon| exon.start);

    let mut merged: Vec<Exon> = Vec::with_capacity(exons.len());
    for exon in exons.drain(..) {
        match merged.last_mut() {
            Some(last) if options.joins(last, &exon) => {
                if last.end < exon.end {
                    last.end = exon.end;
                }
            }
            _ => merged.push(exon),
        }
    }

    debug_assert!(is_merged(&merged, options.merge_touching));
    *exons = merged;

    Ok(())
}

/// Returns true if `exons` is strictly increasing by start, every interval is
/// non-empty and neighbours do not overlap. With `merge_touching` set,
/// neighbours must not touch either.
pub fn is_merged(exons: &[Exon], merge_touching: bool) -> bool {
    exons.iter().all(|exon| !exon.is_empty())
        && exons.windows(2).all(|pair| {
            if merge_touching {
                pair[0].end < pair[1].start
            } else {
                pair[0].end <= pair[1].start
            }
        })
}

/// Ensures all exons share the first exon's chromosome and strand.
fn check_consistency(gene_id: &str, exons: &[Exon]) -> MergeResult<()> {
    let Some((first, rest)) = exons.split_first() else {
        return Ok(());
    };

    for exon in rest {
        if exon.chrom != first.chrom {
            return Err(MergeError::InconsistentGene {
                gene_id: gene_id.to_string(),
                field: "chrom",
                expected: first.chrom.clone(),
                found: exon.chrom.clone(),
            });
        }
        if exon.strand != first.strand {
            return Err(MergeError::InconsistentGene {
                gene_id: gene_id.to_string(),
                field: "strand",
                expected: first.strand.to_string(),
                found: exon.strand.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exon::ExonTemplate;
    use crate::strand::Strand;

    fn exon(start: u64, end: u64) -> Exon {
        ExonTemplate::new()
            .build("G", "chr1", &Strand::Forward, start, end)
            .unwrap()
    }

    fn spans(exons: &[Exon]) -> Vec<(u64, u64)> {
        exons.iter().map(|e| (e.start, e.end)).collect()
    }

    #[test]
    fn touching_stays_apart_by_default() {
        let mut exons = vec![exon(10, 20), exon(20, 30)];
        merge_exons("G", &mut exons, &MergeOptions::new()).unwrap();
        assert_eq!(spans(&exons), vec![(10, 20), (20, 30)]);
    }

    #[test]
    fn touching_joins_when_requested() {
        let mut exons = vec![exon(20, 30), exon(10, 20)];
        let options = MergeOptions::new().merge_touching(true);
        merge_exons("G", &mut exons, &options).unwrap();
        assert_eq!(spans(&exons), vec![(10, 30)]);
    }

    #[test]
    fn contained_exon_is_absorbed() {
        let mut exons = vec![exon(10, 30), exon(15, 20)];
        merge_exons("G", &mut exons, &MergeOptions::new()).unwrap();
        assert_eq!(spans(&exons), vec![(10, 30)]);
    }

    #[test]
    fn invalid_exon_leaves_input_untouched() {
        let mut bad = exon(10, 20);
        bad.end = 5;
        let mut exons = vec![exon(40, 50), bad];

        let err = merge_exons("G", &mut exons, &MergeOptions::new()).unwrap_err();
        assert!(matches!(err, MergeError::InvalidInterval { .. }));
        assert_eq!(spans(&exons), vec![(40, 50), (10, 5)]);
    }

    #[test]
    fn strict_rejects_mixed_strands() {
        let template = ExonTemplate::new();
        let mut exons = vec![
            template.build("G", "chr1", &Strand::Forward, 1, 5).unwrap(),
            template.build("G", "chr1", &Strand::Reverse, 8, 9).unwrap(),
        ];

        let lenient = exons.clone();
        let err = merge_exons("G", &mut exons, &MergeOptions::new().strict(true)).unwrap_err();
        assert!(matches!(
            err,
            MergeError::InconsistentGene { field: "strand", .. }
        ));

        let mut lenient = lenient;
        merge_exons("G", &mut lenient, &MergeOptions::new()).unwrap();
        assert_eq!(lenient.len(), 2);
    }

    #[test]
    fn is_merged_checks_gaps() {
        assert!(is_merged(&[exon(1, 5), exon(5, 9)], false));
        assert!(!is_merged(&[exon(1, 5), exon(5, 9)], true));
        assert!(!is_merged(&[exon(1, 6), exon(5, 9)], false));
    }
}
