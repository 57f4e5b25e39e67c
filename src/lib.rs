//! Lexmap: local-first lexical code search and relationship mapping
//!
//! Lexmap indexes a source tree for natural-language-ish lexical search
//! and extracts a lightweight relationship graph (files, routes,
//! functions, imports, client calls, test links), so a caller can jump
//! from a query to relevant code and then to connected code.
//!
//! # Architecture
//!
//! - **Scanner**: enumerates eligible files under a root, applying size,
//!   extension, and ignore rules
//! - **Tokenizer**: turns file contents into line-anchored, chunked
//!   documents with identifier-aware tokens
//! - **Ranking index**: frozen BM25 structure built once per snapshot
//! - **Heuristics + graph**: regex-anchored per-language extraction,
//!   resolved into nodes and edges in a two-phase build
//! - **Coordinator**: owns the published snapshot; rebuilds swap a single
//!   reference so readers never see a partially-built index
//!
//! # Example
//!
//! ```no_run
//! use lexmap::{Coordinator, QueryEngine, ScanConfig};
//!
//! let coordinator = Coordinator::new(ScanConfig::default());
//! let report = coordinator.rebuild(std::path::Path::new(".")).unwrap();
//! println!("indexed {} files", report.file_count);
//!
//! let engine = QueryEngine::new(coordinator.current().unwrap());
//! for hit in engine.search("handle login", 10) {
//!     println!("{}:{} ({:.2})", hit.file_path, hit.line_start, hit.score);
//! }
//! ```

pub mod cli;
pub mod coordinator;
pub mod error;
pub mod graph;
pub mod heuristics;
pub mod indexer;
pub mod models;
pub mod output;
pub mod query;
pub mod ranking;
pub mod scanner;
pub mod tokenizer;

// Re-export commonly used types
pub use coordinator::Coordinator;
pub use error::ScanError;
pub use indexer::{Snapshot, SnapshotBuilder};
pub use models::{
    Edge, EdgeKind, FileRecord, GraphView, Language, Node, NodeKind, RebuildReport, ScanConfig,
    SearchHit,
};
pub use query::QueryEngine;
pub use ranking::RankingIndex;
