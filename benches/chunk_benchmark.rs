//! Benchmarks for docsplit sectioning and chunking.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic page records and text, so no fixture files
//! are needed.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docsplit::{BBox, ChunkOptions, LineRecord, PageRecord, Paragraph};

/// Synthetic prose of roughly `words` words.
fn create_text(words: usize) -> String {
    const VOCAB: &[&str] = &[
        "the", "document", "section", "retrieval", "of", "chunk", "overlap", "and", "heading",
        "boundary", "context", "index",
    ];
    (0..words)
        .map(|i| VOCAB[(i * 5 + i / 7) % VOCAB.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Synthetic pages: one 18pt heading followed by 40 body lines per page.
fn create_pages(page_count: u32) -> Vec<PageRecord> {
    (1..=page_count)
        .map(|n| {
            let mut page = PageRecord::letter(n).with_line(LineRecord::new(
                format!("Chapter {}", n),
                BBox::new(72.0, 60.0, 300.0, 78.0),
                18.0,
                true,
            ));
            for i in 0..40 {
                let y = 90.0 + i as f32 * 14.0;
                page = page.with_line(LineRecord::new(
                    create_text(12),
                    BBox::new(72.0, y, 540.0, y + 11.0),
                    11.0,
                    false,
                ));
            }
            page
        })
        .collect()
}

/// Benchmark the chunker at various text sizes.
fn bench_chunk_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_text");
    let options = ChunkOptions::default();

    for words in [500, 5_000, 50_000].iter() {
        let text = create_text(*words);
        group.bench_function(format!("{}_words", words), |b| {
            b.iter(|| docsplit::chunk_text(black_box(&text), &options));
        });
    }

    group.finish();
}

/// Benchmark PDF sectionization at various page counts.
fn bench_sectionize_pdf(c: &mut Criterion) {
    let mut group = c.benchmark_group("sectionize_pdf");

    for page_count in [1, 10, 100].iter() {
        let pages = create_pages(*page_count);
        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| docsplit::sectionize_pdf(black_box(&pages)));
        });
    }

    group.finish();
}

/// Benchmark DOCX sectionization.
fn bench_sectionize_docx(c: &mut Criterion) {
    let paragraphs: Vec<Paragraph> = (0..2_000)
        .map(|i| {
            if i % 20 == 0 {
                Paragraph::new(format!("Heading {}", i / 20), format!("Heading {}", 1 + i % 3))
            } else {
                Paragraph::new(create_text(30), "Normal")
            }
        })
        .collect();

    c.bench_function("sectionize_docx_2000_paragraphs", |b| {
        b.iter(|| docsplit::sectionize_docx(black_box(&paragraphs)));
    });
}

/// Benchmark content sniffing.
fn bench_sniff(c: &mut Criterion) {
    let pdf = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n1 0 obj\n<< /Type /Catalog >>\nendobj\n";
    let unknown = b"Not a known file type, just random text content";

    c.bench_function("sniff_pdf", |b| {
        b.iter(|| docsplit::sniff_bytes(black_box(pdf)));
    });

    c.bench_function("sniff_unknown", |b| {
        b.iter(|| docsplit::sniff_bytes(black_box(unknown)));
    });
}

criterion_group!(
    benches,
    bench_chunk_text,
    bench_sectionize_pdf,
    bench_sectionize_docx,
    bench_sniff,
);
criterion_main!(benches);
