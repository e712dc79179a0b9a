//! Delimiter engine benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mathdown::engine::{check, fix, scan, DelimiterConfig};

/// Build a synthetic manuscript with a spread of segment kinds
fn sample_document(paragraphs: usize) -> String {
    let mut doc = String::new();
    for i in 0..paragraphs {
        doc.push_str(&format!(
            "Paragraph {i} relates \\(a_{i} + b\\) to the sum below.\n\n\
             \\[\\sum_{{k=0}}^{{{i}}} \\frac{{k}}{{k+1}}\\]\n\n\
             Use `$code$` spans and fences:\n\n\
             ```\nlet x = \"$ not math $\";\n```\n\n\
             \\begin{{aligned}}\nx &= {i} \\\\\ny &= x\n\\end{{aligned}}\n\n"
        ));
    }
    doc
}

fn bench_scan(c: &mut Criterion) {
    let config = DelimiterConfig::default();
    let doc = sample_document(200);
    c.bench_function("scan_200_paragraphs", |b| {
        b.iter(|| scan(black_box(&doc), &config))
    });
}

fn bench_fix(c: &mut Criterion) {
    let config = DelimiterConfig::default();
    let doc = sample_document(200);
    c.bench_function("fix_200_paragraphs", |b| {
        b.iter(|| fix(black_box(&doc), &config))
    });
}

fn bench_check(c: &mut Criterion) {
    let config = DelimiterConfig::default();
    let doc = sample_document(200);
    c.bench_function("check_200_paragraphs", |b| {
        b.iter(|| check(black_box(&doc), &config))
    });
}

criterion_group!(benches, bench_scan, bench_fix, bench_check);
criterion_main!(benches);
