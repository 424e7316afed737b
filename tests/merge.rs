use std::collections::BTreeSet;

use refgene2gtf::exon::{Exon, ExonTemplate};
use refgene2gtf::genome::{ChromOrder, Genome};
use refgene2gtf::merge::{is_merged, merge_exons, MergeError, MergeOptions};
use refgene2gtf::strand::Strand;
use refgene2gtf::Gene;

fn exon(start: u64, end: u64) -> Exon {
    ExonTemplate::new()
        .build("G", "chr1", &Strand::Forward, start, end)
        .unwrap()
}

fn spans(exons: &[Exon]) -> Vec<(u64, u64)> {
    exons.iter().map(|e| (e.start, e.end)).collect()
}

fn coverage(exons: &[Exon]) -> BTreeSet<u64> {
    exons.iter().flat_map(|e| e.start..e.end).collect()
}

/// Small deterministic generator so the exon sets are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

fn random_exons(rng: &mut Lcg) -> Vec<Exon> {
    let count = 1 + rng.next(12);
    (0..count)
        .map(|_| {
            let start = rng.next(200);
            let end = start + 1 + rng.next(40);
            exon(start, end)
        })
        .collect()
}

#[test]
fn test_merge_preserves_coverage_and_order() {
    let mut rng = Lcg(42);
    for _ in 0..500 {
        let original = random_exons(&mut rng);
        let mut merged = original.clone();
        merge_exons("G", &mut merged, &MergeOptions::new()).unwrap();

        assert_eq!(coverage(&original), coverage(&merged));
        assert!(is_merged(&merged, false));
        assert!(merged.windows(2).all(|p| p[0].start < p[1].start));
        assert!(merged.windows(2).all(|p| p[0].end <= p[1].start));
    }
}

#[test]
fn test_merge_is_idempotent() {
    let mut rng = Lcg(7);
    for _ in 0..200 {
        let mut once = random_exons(&mut rng);
        merge_exons("G", &mut once, &MergeOptions::new()).unwrap();
        let mut twice = once.clone();
        merge_exons("G", &mut twice, &MergeOptions::new()).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn test_merge_touching_option_leaves_gaps() {
    let mut rng = Lcg(99);
    let options = MergeOptions::new().merge_touching(true);
    for _ in 0..200 {
        let original = random_exons(&mut rng);
        let mut merged = original.clone();
        merge_exons("G", &mut merged, &options).unwrap();

        assert_eq!(coverage(&original), coverage(&merged));
        assert!(merged.windows(2).all(|p| p[0].end < p[1].start));
    }
}

#[test]
fn test_touching_exons_do_not_merge() {
    let mut exons = vec![exon(10, 20), exon(20, 30)];
    merge_exons("G", &mut exons, &MergeOptions::new()).unwrap();
    assert_eq!(spans(&exons), vec![(10, 20), (20, 30)]);
}

#[test]
fn test_one_unit_overlap_merges() {
    let mut exons = vec![exon(10, 20), exon(19, 30)];
    merge_exons("G", &mut exons, &MergeOptions::new()).unwrap();
    assert_eq!(spans(&exons), vec![(10, 30)]);
}

#[test]
fn test_contained_exon_is_absorbed() {
    let mut exons = vec![exon(10, 30), exon(15, 20)];
    merge_exons("G", &mut exons, &MergeOptions::new()).unwrap();
    assert_eq!(spans(&exons), vec![(10, 30)]);
}

#[test]
fn test_empty_gene_is_noop() {
    let mut gene = Gene::new("EMPTY");
    gene.merge(&MergeOptions::new()).unwrap();
    assert!(gene.is_empty());
}

#[test]
fn test_single_exon_unchanged() {
    let mut exons = vec![exon(5, 6)];
    merge_exons("G", &mut exons, &MergeOptions::new()).unwrap();
    assert_eq!(spans(&exons), vec![(5, 6)]);
}

#[test]
fn test_zero_width_and_inverted_exons_abort() {
    for (start, end) in [(10u64, 10u64), (30, 20)] {
        let mut bad = exon(1, 2);
        bad.start = start;
        bad.end = end;
        let mut exons = vec![exon(0, 5), bad];

        match merge_exons("G", &mut exons, &MergeOptions::new()) {
            Err(MergeError::InvalidInterval { gene_id, exon }) => {
                assert_eq!(gene_id, "G");
                assert_eq!((exon.start, exon.end), (start, end));
            }
            other => panic!("expected invalid interval, got {:?}", other),
        }
    }
}

#[test]
fn test_representative_keeps_first_exon_columns() {
    let template = ExonTemplate::new();
    let mut exons = vec![
        template.build("G", "chr1", &Strand::Forward, 10, 20).unwrap(),
        template.build("G", "chrX", &Strand::Reverse, 10, 40).unwrap(),
    ];
    merge_exons("G", &mut exons, &MergeOptions::new()).unwrap();

    assert_eq!(exons.len(), 1);
    assert_eq!(exons[0].chrom, "chr1");
    assert_eq!(exons[0].strand, Strand::Forward);
    assert_eq!((exons[0].start, exons[0].end), (10, 40));
}

#[test]
fn test_strict_mode_rejects_mixed_chromosomes() {
    let template = ExonTemplate::new();
    let mut exons = vec![
        template.build("G", "chr1", &Strand::Forward, 10, 20).unwrap(),
        template.build("G", "chrX", &Strand::Forward, 50, 60).unwrap(),
    ];
    let err = merge_exons("G", &mut exons, &MergeOptions::new().strict(true)).unwrap_err();
    assert_eq!(
        err,
        MergeError::InconsistentGene {
            gene_id: "G".into(),
            field: "chrom",
            expected: "chr1".into(),
            found: "chrX".into(),
        }
    );
}

#[test]
fn test_isoforms_collapse_per_gene() {
    let template = ExonTemplate::new();
    let mut genome = Genome::new();
    for (start, end) in [(100, 200), (300, 400)] {
        genome.add_exon(
            "ABC1",
            template.build("ABC1", "chr1", &Strand::Forward, start, end).unwrap(),
        );
    }
    genome.add_exon(
        "ABC1",
        template.build("ABC1", "chr1", &Strand::Forward, 150, 250).unwrap(),
    );
    assert_eq!(genome.len(), 1);
    assert_eq!(genome.exon_count(), 3);

    genome.merge_all(&MergeOptions::new()).unwrap();
    let gene = genome.get("ABC1").unwrap();
    assert_eq!(spans(gene.exons()), vec![(100, 250), (300, 400)]);
}

#[test]
fn test_genes_sorted_lexicographically_by_chrom() {
    let template = ExonTemplate::new();
    let mut genome = Genome::new();
    for (gene, chrom) in [("TWO", "chr2"), ("TEN", "chr10"), ("ONE", "chr1")] {
        genome.add_exon(gene, template.build(gene, chrom, &Strand::Forward, 1, 2).unwrap());
    }
    genome.merge_all(&MergeOptions::new()).unwrap();

    let order: Vec<String> = genome
        .into_sorted(ChromOrder::Lexicographic)
        .iter()
        .map(|g| g.gene_id().to_string())
        .collect();
    assert_eq!(order, vec!["ONE", "TEN", "TWO"]);
}

#[test]
fn test_genes_sorted_naturally_when_requested() {
    let template = ExonTemplate::new();
    let mut genome = Genome::new();
    for (gene, chrom) in [("TEN", "chr10"), ("TWO", "chr2"), ("X", "chrX")] {
        genome.add_exon(gene, template.build(gene, chrom, &Strand::Forward, 1, 2).unwrap());
    }

    let order: Vec<String> = genome
        .into_sorted(ChromOrder::Natural)
        .iter()
        .map(|g| g.gene_id().to_string())
        .collect();
    assert_eq!(order, vec!["TWO", "TEN", "X"]);
}
