use criterion::{criterion_group, criterion_main, Criterion};
use gffkit::{
    gff::hierarchy::{HierarchyBuilder, LinkagePolicy},
    prelude::*,
    sort::sort_gene_models,
    test_utilities::{random_annotation, temp_file_with},
};

const NGENES: usize = 20_000;

fn bench_parse_and_sort(c: &mut Criterion) {
    // create the benchmark group
    let mut group = c.benchmark_group("io");

    // create the test data
    let annotation = temp_file_with(&random_annotation(NGENES));

    // configure the sample size for the group
    group.sample_size(10);

    group.bench_function("parse", |b| {
        b.iter(|| {
            let iter = GffIterator::new(annotation.path()).unwrap();
            iter.map(|record| record.unwrap()).count()
        });
    });

    group.bench_function("hierarchy", |b| {
        b.iter(|| {
            let iter = GffIterator::new(annotation.path()).unwrap();
            let hierarchy = HierarchyBuilder::new(LinkagePolicy::Strict)
                .build(iter)
                .unwrap();
            hierarchy.groups.len()
        });
    });

    group.bench_function("sort", |b| {
        b.iter(|| {
            let iter = GffIterator::new(annotation.path()).unwrap();
            let options = SortOptions {
                locus_tag: Some("BENCH".to_string()),
                ..Default::default()
            };
            sort_gene_models(iter, &options).unwrap().records.len()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse_and_sort);
criterion_main!(benches);
