// SPDX-License-Identifier: PMPL-1.0-or-later
//! Benchmarks for pagebot extractors and codecs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagebot::analyzers::{analyze_page, PageInput};
use pagebot::config::Config;
use pagebot::{
    analyses_to_csv, analyses_to_json, create_default_analysis, extract_contrast_issues,
    extract_css_colors, parse_analyses_json, Analysis,
};

fn sample_page() -> String {
    let mut html = String::from("<html lang=\"en\"><head><title>Bench</title></head><body>");
    for i in 0..200u32 {
        html.push_str(&format!(
            "<p style=\"color:#{:06x};background-color:#f{:05x};font-family:'Inter', sans-serif\">{}</p><img src=\"{}.png\">",
            i * 97,
            i * 13,
            i,
            i
        ));
    }
    html.push_str("</body></html>");
    html
}

fn sample_records() -> Vec<Analysis> {
    (0..100)
        .map(|i| create_default_analysis(&format!("site{}.example", i)))
        .collect()
}

fn bench_color_extraction(c: &mut Criterion) {
    let html = sample_page();

    c.bench_function("extract_css_colors", |b| {
        b.iter(|| extract_css_colors(black_box(&html)))
    });
}

fn bench_contrast_issues(c: &mut Criterion) {
    let html = sample_page();

    c.bench_function("extract_contrast_issues", |b| {
        b.iter(|| extract_contrast_issues(black_box(&html)))
    });
}

fn bench_page_analyzers(c: &mut Criterion) {
    let page = PageInput::new(sample_page());
    let config = Config::default();

    c.bench_function("analyze_page", |b| {
        b.iter(|| analyze_page(black_box(&page), black_box(&config)))
    });
}

fn bench_export(c: &mut Criterion) {
    let records = sample_records();
    let json = analyses_to_json(&records).unwrap_or_default();

    c.bench_function("analyses_to_csv", |b| {
        b.iter(|| analyses_to_csv(black_box(&records)))
    });
    c.bench_function("parse_analyses_json", |b| {
        b.iter(|| parse_analyses_json(black_box(&json)))
    });
}

criterion_group!(
    benches,
    bench_color_extraction,
    bench_contrast_issues,
    bench_page_analyzers,
    bench_export
);
criterion_main!(benches);
