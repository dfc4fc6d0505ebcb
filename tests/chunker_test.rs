//! Integration tests for chunking.

use docsplit::{chunk_result, chunk_sections, chunk_text, ChunkOptions, ProcessResult, Section};

fn opts(max: usize, overlap: usize) -> ChunkOptions {
    ChunkOptions::new().with_max_chars(max).with_overlap(overlap)
}

/// Deterministic prose with words of varying length.
fn prose(words: usize) -> String {
    const VOCAB: &[&str] = &[
        "section", "a", "document", "of", "heading", "retrieval", "is", "chunked", "into",
        "overlapping", "pieces", "with", "bounded", "length", "and", "context",
    ];
    (0..words)
        .map(|i| VOCAB[(i * 7 + i / 3) % VOCAB.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn section(id: &str, title: &str, text: &str) -> Section {
    let mut s = Section::new(id, 2, title, 1);
    if !text.is_empty() {
        s.push_text(text);
    }
    s
}

#[test]
fn test_second_piece_starts_at_snap_minus_overlap() {
    // 3000 chars with a single space at 1450: the first window snaps there
    let mut text = "a".repeat(1450);
    text.push(' ');
    text.push_str(&"b".repeat(1549));
    assert_eq!(text.chars().count(), 3000);

    let pieces = chunk_text(&text, &opts(1500, 200));
    assert_eq!(pieces[0], "a".repeat(1450));

    let expected: String = text.chars().skip(1450 - 200).take(1500).collect();
    assert_eq!(pieces[1], expected);
    assert!(pieces.iter().all(|p| p.chars().count() <= 1500));
}

#[test]
fn test_pieces_never_exceed_max() {
    let text = prose(2000);
    for (max, overlap) in [(1, 0), (7, 3), (50, 10), (333, 40), (1500, 200), (80, 120)] {
        let pieces = chunk_text(&text, &opts(max, overlap));
        assert!(!pieces.is_empty());
        for piece in &pieces {
            assert!(piece.chars().count() <= max, "max {} overlap {}", max, overlap);
            assert!(!piece.is_empty());
            assert_eq!(piece.trim(), piece);
        }
    }
}

#[test]
fn test_pieces_are_substrings_covering_the_text() {
    let text = prose(600);
    let pieces = chunk_text(&text, &opts(120, 30));

    let mut search_from = 0;
    for piece in &pieces {
        let at = text[search_from..]
            .find(piece.as_str())
            .map(|i| search_from + i)
            .expect("piece is a substring in order");
        search_from = at + 1;
    }

    // Every word of the input appears in some piece
    for word in text.split_whitespace() {
        assert!(pieces.iter().any(|p| p.contains(word)));
    }
    assert!(text.starts_with(pieces[0].as_str()));
    assert!(text.ends_with(pieces.last().unwrap().as_str()));
}

#[test]
fn test_chunking_is_idempotent() {
    let text = prose(900);
    let options = opts(200, 50);
    assert_eq!(chunk_text(&text, &options), chunk_text(&text, &options));
}

#[test]
fn test_passthrough_keeps_whole_text() {
    let text = prose(3000);
    let pieces = chunk_text(&text, &ChunkOptions::new().passthrough());
    assert_eq!(pieces, vec![text.clone()]);
}

#[test]
fn test_indices_are_global_across_sections() {
    let sections = vec![
        section("sec_1", "Overview", &prose(120)),
        section("sec_2", "Empty", ""),
        section("sec_3", "Details", &prose(300)),
    ];
    let chunks = chunk_sections("doc", &sections, &opts(100, 20));

    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_index, i);
        assert_eq!(chunk.document_id, "doc");
    }

    let empty: Vec<_> = chunks.iter().filter(|c| c.source_section_id == "sec_2").collect();
    assert_eq!(empty.len(), 1);
    assert_eq!(empty[0].text, "Empty");
    assert_eq!(empty[0].chunk_id, "sec_2_c1");

    let details: Vec<_> = chunks.iter().filter(|c| c.source_section_id == "sec_3").collect();
    assert!(details.len() > 1);
    assert!(details[0].text.starts_with("Details\n\n"));
    for (j, chunk) in details.iter().enumerate() {
        assert_eq!(chunk.chunk_id, format!("sec_3_c{}", j + 1));
        assert_eq!(chunk.metadata.title, "Details");
    }
}

#[test]
fn test_chunk_result_uses_document_id() {
    let mut result = ProcessResult::new("doc-99", "application/pdf");
    result.sections.push(section("sec_1", "Only", "Short body."));

    let chunks = chunk_result(&result, &ChunkOptions::default());
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].document_id, "doc-99");
    assert_eq!(chunks[0].text, "Only\n\nShort body.");
    assert_eq!(chunks[0].metadata.page_start, 1);
}

#[test]
fn test_chunks_serialize_to_json() {
    let result = {
        let mut r = ProcessResult::new("doc-1", "application/pdf");
        r.sections.push(section("sec_1", "Title", "Body"));
        r
    };
    let chunks = chunk_result(&result, &ChunkOptions::default());
    let json = serde_json::to_value(&chunks).unwrap();

    assert_eq!(json[0]["chunk_id"], "sec_1_c1");
    assert_eq!(json[0]["chunk_index"], 0);
    assert_eq!(json[0]["metadata"]["level"], 2);
    assert!(json[0]["metadata"]["related"].as_object().unwrap().is_empty());
}
