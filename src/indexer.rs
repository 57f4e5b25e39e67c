//! Snapshot build pipeline
//!
//! Scanning feeds per-file tokenization and heuristic extraction, which
//! run in parallel on a rayon pool; the join phase is single threaded
//! because edge resolution needs the complete node set and document ids
//! must be assigned in a stable order. The result is one immutable
//! [`Snapshot`] holding the ranking index, the relationship graph, and
//! the line-indexed snippet sources.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use crate::error::ScanError;
use crate::graph;
use crate::heuristics::{self, FileOutline};
use crate::models::{Document, Edge, Node, ScanConfig};
use crate::ranking::RankingIndex;
use crate::scanner;
use crate::tokenizer;

/// One immutable, fully-built index over a scanned tree
///
/// Built once per rebuild, published atomically by the coordinator, and
/// never mutated. Readers holding an `Arc<Snapshot>` keep it alive until
/// they finish, even after a newer snapshot supersedes it.
#[derive(Debug)]
pub struct Snapshot {
    pub documents: Vec<Document>,
    pub ranking: RankingIndex,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// node id -> index into `nodes`
    pub node_index: HashMap<String, usize>,
    /// file path -> source lines, for snippet assembly
    pub sources: HashMap<String, Vec<String>>,
    pub file_count: usize,
    pub skipped_files: usize,
    /// Context lines shown around matched windows
    pub snippet_context: usize,
    /// RFC 3339 build timestamp
    pub built_at: String,
}

impl Snapshot {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }
}

/// Result of per-file processing (parallel phase)
struct FileProduct {
    documents: Vec<Document>,
    outline: FileOutline,
}

/// Builds snapshots from a root directory
pub struct SnapshotBuilder {
    config: ScanConfig,
}

impl SnapshotBuilder {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scan `root` and build a complete snapshot.
    ///
    /// Fails only on a bad root; per-file problems are skipped and
    /// counted.
    pub fn build(&self, root: &Path, show_progress: bool) -> Result<Snapshot, ScanError> {
        let started = Instant::now();
        log::info!("Building snapshot for {}", root.display());

        let pool = self.thread_pool();
        let snapshot = pool.install(|| self.build_inner(root, show_progress))?;

        log::info!(
            "Snapshot built in {:?}: {} files, {} documents, {} nodes, {} edges",
            started.elapsed(),
            snapshot.file_count,
            snapshot.documents.len(),
            snapshot.nodes.len(),
            snapshot.edges.len()
        );
        Ok(snapshot)
    }

    fn build_inner(&self, root: &Path, show_progress: bool) -> Result<Snapshot, ScanError> {
        let outcome = scanner::scan(root, &self.config)?;

        let pb = if show_progress {
            let pb = ProgressBar::new(outcome.records.len() as u64);
            pb.set_draw_target(ProgressDrawTarget::stderr());
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        // Parallel phase: per-file tokenization and extraction.
        let products: Vec<FileProduct> = outcome
            .records
            .par_iter()
            .map(|record| {
                let product = FileProduct {
                    documents: tokenizer::documents_for_file(record, &self.config),
                    outline: heuristics::extract(record),
                };
                pb.inc(1);
                product
            })
            .collect();
        pb.finish_and_clear();

        // Join phase: stable document ids in path order, then whole-corpus
        // graph resolution.
        let mut documents = Vec::new();
        let mut outlines = Vec::with_capacity(products.len());
        for product in products {
            for mut doc in product.documents {
                doc.doc_id = documents.len() as u32;
                documents.push(doc);
            }
            outlines.push(product.outline);
        }

        let ranking = RankingIndex::build(&documents);
        let (nodes, edges) = graph::assemble(&outlines);
        let node_index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        let sources = outcome
            .records
            .iter()
            .map(|r| (r.path.clone(), r.content.lines().map(str::to_string).collect()))
            .collect();

        Ok(Snapshot {
            documents,
            ranking,
            nodes,
            edges,
            node_index,
            sources,
            file_count: outcome.records.len(),
            skipped_files: outcome.skipped_files,
            snippet_context: self.config.snippet_context,
            built_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Worker pool sized from config (0 = auto, 80% of available cores to
    /// avoid locking the system).
    fn thread_pool(&self) -> rayon::ThreadPool {
        let num_threads = if self.config.parallel_threads == 0 {
            ((num_cpus::get() as f64 * 0.8).ceil() as usize).max(1)
        } else {
            self.config.parallel_threads
        };
        log::debug!("Using {} indexing threads", num_threads);
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default thread pool: {}", e);
                rayon::ThreadPoolBuilder::new()
                    .build()
                    .expect("default rayon pool")
            })
    }
}
