//! Performance benchmarks for the spatial analysis pipeline.
//!
//! Performance targets:
//! - Small document (20 elements, 1 page): <1ms
//! - Medium document (200 elements, 10 pages): <10ms
//! - Large document (2000 elements, 100 pages): <150ms

use std::collections::HashMap;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use spatial_engine::{analyze_layout, AnalyzerConfig, Bbox, LayoutElement};

fn synthetic_document(pages: i32, elements_per_page: i32) -> Vec<LayoutElement> {
    let mut elements = Vec::new();
    for page in 1..=pages {
        let mut y = 0;
        let title = Bbox::new(0, y, 600, y + 30).unwrap();
        elements.push(
            LayoutElement::new("title", title, page, "Section Title", "Section Title").unwrap(),
        );
        y += 40;
        for line in 0..elements_per_page {
            let bbox = Bbox::new(0, y, 600, y + 14).unwrap();
            let text = format!("Body line {line} of page {page}.");
            elements.push(LayoutElement::new("text", bbox, page, &text, &text).unwrap());
            y += 16;
        }
    }
    elements
}

fn fixture_metadata(pages: i32, per_page: i32, name: &str) -> String {
    format!("{} ({} elements, {} pages)", name, pages * (per_page + 1), pages)
}

/// Benchmark: full pipeline (C3..C9) over synthetic documents of
/// increasing size, at default configuration.
fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");

    let small = synthetic_document(1, 19);
    let medium = synthetic_document(10, 19);
    let large = synthetic_document(100, 19);
    let config = AnalyzerConfig::default();

    group.bench_with_input(
        BenchmarkId::new("analyze_layout", fixture_metadata(1, 19, "small")),
        &small,
        |b, elements| {
            b.iter(|| {
                let tree =
                    analyze_layout(black_box(elements.clone()), &config, &HashMap::new()).unwrap();
                black_box(tree);
            });
        },
    );

    group.bench_with_input(
        BenchmarkId::new("analyze_layout", fixture_metadata(10, 19, "medium")),
        &medium,
        |b, elements| {
            b.iter(|| {
                let tree =
                    analyze_layout(black_box(elements.clone()), &config, &HashMap::new()).unwrap();
                black_box(tree);
            });
        },
    );

    group.bench_with_input(
        BenchmarkId::new("analyze_layout", fixture_metadata(100, 19, "large")),
        &large,
        |b, elements| {
            b.iter(|| {
                let tree =
                    analyze_layout(black_box(elements.clone()), &config, &HashMap::new()).unwrap();
                black_box(tree);
            });
        },
    );

    group.finish();
}

/// Benchmark: pipeline with every optional stage disabled, isolating the
/// mandatory C9 tree-building cost from the optional stages around it.
fn bench_minimal_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimal_pipeline");

    let medium = synthetic_document(10, 19);
    let mut config = AnalyzerConfig::default();
    config.use_zone_classification = false;
    config.use_reading_order = false;
    config.use_markdown_validation = false;
    config.use_thinning = false;

    group.bench_with_input(
        BenchmarkId::new("analyze_layout", fixture_metadata(10, 19, "medium")),
        &medium,
        |b, elements| {
            b.iter(|| {
                let tree =
                    analyze_layout(black_box(elements.clone()), &config, &HashMap::new()).unwrap();
                black_box(tree);
            });
        },
    );

    group.finish();
}

criterion_group!(benches, bench_full_pipeline, bench_minimal_pipeline);
criterion_main!(benches);
