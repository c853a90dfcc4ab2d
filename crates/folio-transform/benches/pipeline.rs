//! Benchmarks for the page transform pipeline.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use folio_transform::{LinkSafety, Minify, PageMeta, Pipeline, SyntaxHighlight, Transform, TransformOptions};

/// Generate a page with `sections` headings, each followed by prose and a code block.
fn generate_page(sections: usize) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head><title>Bench</title></head>\n<body>\n");
    for i in 0..sections {
        html.push_str(&format!("  <h2 id=\"section-{i}\">Section {i}</h2>\n"));
        html.push_str(&format!(
            "  <p>Paragraph {i} with <a href=\"https://example.com/{i}\" target=\"_blank\">a link</a>.</p>\n"
        ));
        html.push_str(&format!(
            "  <pre><code class=\"language-rust\">fn section_{i}() -> usize {{\n    {i} * 2\n}}\n</code></pre>\n"
        ));
    }
    html.push_str("</body>\n</html>\n");
    html
}

fn bench_stages(c: &mut Criterion) {
    SyntaxHighlight::warm_up();
    let page = generate_page(20);
    let meta = PageMeta::new("bench/index.html", "/bench/");

    let stages: Vec<Box<dyn Transform>> = vec![
        Box::new(LinkSafety::default()),
        Box::new(SyntaxHighlight::default()),
        Box::new(Minify::new()),
    ];
    for stage in &stages {
        c.bench_function(stage.name(), |b| {
            b.iter(|| stage.apply(&page, &meta));
        });
    }
}

fn bench_pipeline_sizes(c: &mut Criterion) {
    SyntaxHighlight::warm_up();
    let pipeline = Pipeline::standard(&TransformOptions::default());
    let meta = PageMeta::new("bench/index.html", "/bench/");

    let mut group = c.benchmark_group("standard_pipeline");
    for sections in [5, 20, 80] {
        let page = generate_page(sections);
        group.throughput(Throughput::Bytes(page.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &page, |b, page| {
            b.iter(|| pipeline.apply_all(page, &meta));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_stages, bench_pipeline_sizes);
criterion_main!(benches);
