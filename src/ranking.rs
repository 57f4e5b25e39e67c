//! BM25 lexical ranking index
//!
//! An inverted index mapping terms to posting lists, scored with the BM25
//! formula (k1 = 1.5, b = 0.75). Corpus statistics (document count,
//! average length, per-term document frequency) are computed once at build
//! time and frozen, so every snapshot holds a stable view for its whole
//! lifetime. Building is O(total tokens); querying is O(query terms x
//! postings length).

use std::collections::HashMap;

use crate::models::{DocId, Document};
use crate::tokenizer::tokenize;

const K1: f64 = 1.5;
const B: f64 = 0.75;

/// One term occurrence entry: which document, and how often
#[derive(Debug, Clone, Copy)]
struct Posting {
    doc: DocId,
    tf: u32,
}

/// Frozen term-frequency ranking structure over one corpus
#[derive(Debug)]
pub struct RankingIndex {
    postings: HashMap<String, Vec<Posting>>,
    doc_lengths: Vec<u32>,
    avg_doc_len: f64,
    doc_count: usize,
}

impl RankingIndex {
    /// Build the index from a corpus of documents.
    ///
    /// Documents must already carry their final `doc_id`s, assigned
    /// contiguously from 0 in corpus order.
    pub fn build(documents: &[Document]) -> Self {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut doc_lengths = vec![0u32; documents.len()];
        let mut total_len = 0u64;

        for doc in documents {
            doc_lengths[doc.doc_id as usize] = doc.length;
            total_len += u64::from(doc.length);
            for (term, &tf) in &doc.term_counts {
                postings
                    .entry(term.clone())
                    .or_default()
                    .push(Posting { doc: doc.doc_id, tf });
            }
        }

        // Posting lists in ascending doc order; insertion order depends on
        // term_counts map iteration and must not leak into scoring.
        for list in postings.values_mut() {
            list.sort_by_key(|p| p.doc);
        }

        let avg_doc_len = if documents.is_empty() {
            0.0
        } else {
            total_len as f64 / documents.len() as f64
        };

        log::debug!(
            "Built ranking index: {} documents, {} distinct terms, avgdl {:.1}",
            documents.len(),
            postings.len(),
            avg_doc_len
        );

        RankingIndex {
            postings,
            doc_lengths,
            avg_doc_len,
            doc_count: documents.len(),
        }
    }

    /// Number of documents in the corpus
    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    /// Score the corpus against `query_text` and return the top `k`
    /// documents, descending by score, ties broken by ascending doc id.
    ///
    /// A query with no matching terms returns an empty vector.
    pub fn query(&self, query_text: &str, k: usize) -> Vec<(DocId, f64)> {
        if k == 0 || self.doc_count == 0 {
            return Vec::new();
        }

        let mut scores: HashMap<DocId, f64> = HashMap::new();
        for term in tokenize(query_text) {
            let Some(list) = self.postings.get(&term) else {
                continue;
            };
            let idf = self.idf(list.len());
            for posting in list {
                let tf = f64::from(posting.tf);
                let len = f64::from(self.doc_lengths[posting.doc as usize]);
                let norm = K1 * (1.0 - B + B * len / self.avg_doc_len);
                let contribution = idf * (tf * (K1 + 1.0)) / (tf + norm);
                *scores.entry(posting.doc).or_insert(0.0) += contribution;
            }
        }

        let mut ranked: Vec<(DocId, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }

    /// `ln((N - n_t + 0.5) / (n_t + 0.5) + 1)`
    fn idf(&self, containing_docs: usize) -> f64 {
        let n = self.doc_count as f64;
        let n_t = containing_docs as f64;
        ((n - n_t + 0.5) / (n_t + 0.5) + 1.0).ln()
    }
}
