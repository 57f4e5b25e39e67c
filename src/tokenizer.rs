//! Tokenization and corpus building
//!
//! Converts file contents into ranked-searchable documents. Tokenization
//! lower-cases text and splits on non-alphanumeric boundaries, then
//! additionally splits identifiers on camelCase and snake_case boundaries
//! while keeping the full compound token, so `handleLogin` contributes
//! `handle`, `login`, and `handlelogin`. Queries use natural words while
//! code uses compound identifiers; indexing both spellings bridges the gap.
//! Stop-words are kept: code tokens like `get` and `set` carry signal.

use std::collections::HashMap;

use crate::models::{Document, FileRecord, ScanConfig};

/// Tokenize a chunk of text into lowercased terms.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in text.split(|c: char| !c.is_alphanumeric() && c != '_') {
        if word.is_empty() {
            continue;
        }
        let parts = split_identifier(word);
        if parts.len() > 1 {
            // Compound form without separators, so a query for the full
            // identifier still matches.
            tokens.push(word.replace('_', "").to_lowercase());
        }
        tokens.extend(parts);
    }
    tokens
}

/// Split an identifier on snake_case and camelCase boundaries.
///
/// Acronym runs stay together: `HTTPServer` yields `http`, `server`.
fn split_identifier(word: &str) -> Vec<String> {
    let mut parts = Vec::new();
    for segment in word.split('_') {
        if segment.is_empty() {
            continue;
        }
        let chars: Vec<char> = segment.chars().collect();
        let mut start = 0;
        for i in 1..chars.len() {
            let prev = chars[i - 1];
            let cur = chars[i];
            let lower_to_upper = prev.is_lowercase() && cur.is_uppercase();
            let acronym_end = i + 1 < chars.len()
                && prev.is_uppercase()
                && cur.is_uppercase()
                && chars[i + 1].is_lowercase();
            let digit_boundary = prev.is_ascii_digit() != cur.is_ascii_digit();
            if lower_to_upper || acronym_end || digit_boundary {
                parts.push(chars[start..i].iter().collect::<String>().to_lowercase());
                start = i;
            }
        }
        parts.push(chars[start..].iter().collect::<String>().to_lowercase());
    }
    parts
}

/// Build the documents for one file.
///
/// Short files become a single document covering all lines. A file longer
/// than `chunk_threshold` lines is split into overlapping windows of
/// `chunk_window` lines (overlapping by `chunk_overlap`) so snippet size
/// stays bounded and ranking granularity stays useful. Document ids are
/// assigned later, in the single-threaded join phase.
pub fn documents_for_file(record: &FileRecord, config: &ScanConfig) -> Vec<Document> {
    let lines: Vec<&str> = record.content.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }

    if lines.len() <= config.chunk_threshold {
        return build_document(record, &lines, 1, lines.len())
            .into_iter()
            .collect();
    }

    let step = config.chunk_window.saturating_sub(config.chunk_overlap).max(1);
    let mut documents = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + config.chunk_window).min(lines.len());
        if let Some(doc) = build_document(record, &lines[start..end], start + 1, end) {
            documents.push(doc);
        }
        if end == lines.len() {
            break;
        }
        start += step;
    }
    documents
}

/// Tokenize a line window into a document; empty windows produce none.
fn build_document(
    record: &FileRecord,
    lines: &[&str],
    line_start: usize,
    line_end: usize,
) -> Option<Document> {
    let mut term_counts: HashMap<String, u32> = HashMap::new();
    let mut length = 0u32;
    for line in lines {
        for token in tokenize(line) {
            *term_counts.entry(token).or_insert(0) += 1;
            length += 1;
        }
    }
    if length == 0 {
        return None;
    }
    Some(Document {
        doc_id: 0, // assigned during snapshot assembly
        file_path: record.path.clone(),
        line_start,
        line_end,
        term_counts,
        length,
    })
}
