//! Benchmarks for the KFX build pipeline.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use kfxbuild::book::SectionSummary;
use kfxbuild::kfx::calculate_approximate_pages;
use kfxbuild::{
    BookSummary, KfxBookBuilder, KfxConfig, LandmarkInfo, PositionItem, ResourceInfo, Stylesheet,
    TocEntry,
};

const SAMPLE_CSS: &str = r#"
    body { font-family: "Georgia", serif; line-height: 1.4 }
    p { text-indent: 1.5em; margin: 0 }
    h1, h2 { font-weight: bold; text-align: center; margin: 2em 0 1em }
    .epigraph { font-style: italic; margin-left: 10%; margin-right: 10% }
    .small-caps { font-variant: small-caps }
    .note::before { content: "Note: " }
    blockquote p { font-size: 0.9em }
    @media amzn-kf8 { .wide { width: 100% } }
    @media amzn-mobi { .wide { width: 80% } }
"#;

/// A synthetic book: `chapters` sections, each with one image and a few
/// hundred positions.
fn sample_book(chapters: usize) -> (BookSummary, Vec<TocEntry>, Vec<PositionItem>) {
    let mut book = BookSummary::new("Benchmark Book")
        .with_author("A. Writer")
        .with_language("en")
        .with_document_id("bench-book");
    let mut toc = Vec::new();
    let mut positions = Vec::new();
    let mut eid = 1000;

    for ch in 0..chapters {
        let image = format!("images/fig{ch}.jpg");
        book = book
            .with_section(SectionSummary::new(format!("c{ch}")).with_resource(image.clone()))
            .with_resource(
                image,
                ResourceInfo::new("image/jpeg", 600, 800)
                    .with_location(format!("images/fig{ch}.jpg"))
                    .with_data(vec![0xFF; 4096]),
            );
        toc.push(TocEntry::new(format!("Chapter {}", ch + 1), eid));
        for i in 0..300 {
            positions.push(PositionItem::new(eid, 40 + (i % 7) * 60));
            eid += 1;
        }
    }
    (book, toc, positions)
}

// ============================================================================
// Pipeline Benchmarks
// ============================================================================

fn bench_parse_css(c: &mut Criterion) {
    c.bench_function("parse_css", |b| {
        b.iter(|| Stylesheet::parse(black_box(SAMPLE_CSS)));
    });
}

fn bench_build(c: &mut Criterion) {
    let (book, toc, positions) = sample_book(40);
    let sheet = Stylesheet::parse(SAMPLE_CSS);
    let config = KfxConfig::default()
        .with_page_size(2300)
        .with_landmarks(LandmarkInfo {
            cover_eid: 999,
            start_eid: 1000,
            ..Default::default()
        });

    c.bench_function("build_graph", |b| {
        b.iter(|| {
            KfxBookBuilder::new(black_box(&book))
                .with_toc(&toc)
                .with_positions(&positions)
                .with_stylesheet(&sheet)
                .with_config(config.clone())
                .build()
                .unwrap()
        });
    });

    let output = KfxBookBuilder::new(&book)
        .with_toc(&toc)
        .with_positions(&positions)
        .with_stylesheet(&sheet)
        .with_config(config)
        .build()
        .unwrap();

    c.bench_function("serialize_container", |b| {
        b.iter(|| black_box(&output).to_bytes().unwrap());
    });
}

fn bench_page_list(c: &mut Criterion) {
    let (_, _, positions) = sample_book(200);
    c.bench_function("approximate_pages", |b| {
        b.iter(|| calculate_approximate_pages(black_box(&positions), 2300));
    });
}

criterion_group!(benches, bench_parse_css, bench_build, bench_page_list);
criterion_main!(benches);
