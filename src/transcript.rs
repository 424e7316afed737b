use crate::exon::{Exon, ExonResult, ExonTemplate};
use crate::reader::{ReaderError, ReaderResult};
use crate::strand::Strand;

/// Number of columns a refGene row must carry.
pub const FIELD_COUNT: usize = 13;

const NAME: usize = 1;
const CHROM: usize = 2;
const STRAND: usize = 3;
const EXON_COUNT: usize = 8;
const EXON_STARTS: usize = 9;
const EXON_ENDS: usize = 10;
const NAME2: usize = 12;

/// One transcript isoform read from a refGene table row.
///
/// `exon_starts.len() == exon_ends.len() == exon_count` always holds for
/// records produced by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Transcript accession (e.g. `NM_000014`).
    pub name: String,
    /// Chromosome or scaffold name.
    pub chrom: String,
    /// Strand, carried through unchanged.
    pub strand: Strand,
    /// Declared number of exons.
    pub exon_count: usize,
    /// Exon start coordinates.
    pub exon_starts: Vec<u64>,
    /// Exon end coordinates.
    pub exon_ends: Vec<u64>,
    /// Gene symbol shared by all isoforms of a gene.
    pub gene_id: String,
}

impl Transcript {
    /// Parses a refGene row split into `fields`.
    ///
    /// `raw` is the untouched line, kept for diagnostics when the exon
    /// lists disagree with the declared exon count.
    pub(crate) fn from_fields(fields: &[&str], raw: &str, line: usize) -> ReaderResult<Self> {
        if fields.len() < FIELD_COUNT {
            return Err(ReaderError::unexpected_field_count(
                line,
                FIELD_COUNT,
                fields.len(),
            ));
        }

        let exon_count = __to_usize(fields[EXON_COUNT], line, "exonCount")?;
        let exon_starts = __parse_coords(fields[EXON_STARTS], line, "exonStarts")?;
        let exon_ends = __parse_coords(fields[EXON_ENDS], line, "exonEnds")?;

        if exon_count != exon_starts.len() || exon_count != exon_ends.len() {
            return Err(ReaderError::ExonCountMismatch {
                line,
                expected: exon_count,
                starts: exon_starts.len(),
                ends: exon_ends.len(),
                row: raw.to_string(),
            });
        }

        Ok(Self {
            name: fields[NAME].to_string(),
            chrom: fields[CHROM].to_string(),
            strand: Strand::parse(fields[STRAND], line)?,
            exon_count,
            exon_starts,
            exon_ends,
            gene_id: fields[NAME2].to_string(),
        })
    }

    /// Returns the transcript accession.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the gene symbol.
    #[inline]
    pub fn gene_id(&self) -> &str {
        &self.gene_id
    }

    /// Returns exon coordinates as (start, end) pairs.
    pub fn exon_spans(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.exon_starts
            .iter()
            .copied()
            .zip(self.exon_ends.iter().copied())
    }

    /// Explodes the transcript into validated exons of its gene.
    ///
    /// # Errors
    ///
    /// Fails on the first exon with `start >= end`.
    pub fn exons(&self, template: &ExonTemplate) -> ExonResult<Vec<Exon>> {
        self.exon_spans()
            .map(|(start, end)| template.build(&self.gene_id, &self.chrom, &self.strand, start, end))
            .collect()
    }
}

/// Returns true if `accession` starts with any of `prefixes`.
///
/// Accessions shorter than a prefix never match it.
pub(crate) fn has_prefix<S: AsRef<str>>(accession: &str, prefixes: &[S]) -> bool {
    prefixes
        .iter()
        .any(|prefix| accession.starts_with(prefix.as_ref()))
}

/// Parses a count field to a usize
fn __to_usize(field: &str, line: usize, label: &'static str) -> ReaderResult<usize> {
    field.trim().parse::<usize>().map_err(|_| {
        ReaderError::invalid_field(
            line,
            label,
            format!("ERROR: expected unsigned integer, got '{field}' in {line}:{label}"),
        )
    })
}

/// Parses a comma separated coordinate list.
///
/// A single trailing comma is allowed; any other empty item is an error.
fn __parse_coords(list: &str, line: usize, label: &'static str) -> ReaderResult<Vec<u64>> {
    let list = list.trim();
    let list = list.strip_suffix(',').unwrap_or(list);
    if list.is_empty() {
        return Ok(Vec::new());
    }

    list.split(',')
        .map(str::trim)
        .map(|item| {
            item.parse::<u64>().map_err(|_| {
                ReaderError::invalid_field(
                    line,
                    label,
                    format!(
                        "ERROR: failed to parse '{item}' as unsigned integer in {line}:{label}"
                    ),
                )
            })
        })
        .collect()
}
