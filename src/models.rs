//! Core data models for Lexmap
//!
//! These structures represent the normalized, deterministic output format
//! that Lexmap provides to CLI and programmatic consumers. Everything that
//! crosses the crate boundary is serde-serializable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};

/// Programming language identifier, inferred from file extension
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Rust,
    Go,
    Java,
    C,
    Cpp,
    Ruby,
    Html,
    Css,
    Markdown,
    Yaml,
    Json,
    Toml,
    Sql,
    Shell,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "py" => Language::Python,
            "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
            "ts" | "mts" | "cts" | "tsx" => Language::TypeScript,
            "rs" => Language::Rust,
            "go" => Language::Go,
            "java" => Language::Java,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" => Language::Cpp,
            "rb" | "rake" => Language::Ruby,
            "html" | "htm" => Language::Html,
            "css" | "scss" | "sass" => Language::Css,
            "md" | "markdown" => Language::Markdown,
            "yaml" | "yml" => Language::Yaml,
            "json" => Language::Json,
            "toml" => Language::Toml,
            "sql" => Language::Sql,
            "sh" | "bash" | "zsh" => Language::Shell,
            _ => Language::Unknown,
        }
    }

    /// Check if files of this language are eligible for indexing.
    ///
    /// Unknown extensions are excluded; everything else is plain text and
    /// participates in lexical ranking even when no relationship heuristics
    /// exist for it.
    pub fn is_indexable(&self) -> bool {
        !matches!(self, Language::Unknown)
    }
}

/// One eligible file as produced by the repository scanner
///
/// Created once per scan, then owned immutably by the snapshot build
/// pipeline. Files that fail UTF-8 decoding never become records.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path relative to the scanned root, with forward slashes
    pub path: String,
    /// Language inferred from the file extension
    pub language: Language,
    /// Size of the file on disk in bytes
    pub byte_size: u64,
    /// Number of lines in the decoded content
    pub line_count: usize,
    /// Decoded text content
    pub content: String,
}

/// Identifier of a ranked document within one snapshot
pub type DocId = u32;

/// Unit of lexical ranking: a whole file, or one chunk of a long file
///
/// Invariants: every document belongs to exactly one [`FileRecord`] and
/// `line_end >= line_start`.
#[derive(Debug, Clone)]
pub struct Document {
    pub doc_id: DocId,
    pub file_path: String,
    /// First line covered by this document (1-indexed, inclusive)
    pub line_start: usize,
    /// Last line covered by this document (1-indexed, inclusive)
    pub line_end: usize,
    /// Term -> occurrence count within this document
    pub term_counts: HashMap<String, u32>,
    /// Total token count (sum of term_counts values)
    pub length: u32,
}

/// Kind of vertex in the relationship graph
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Route,
    Function,
    Class,
    Test,
    Component,
}

/// A vertex in the extracted code relationship graph
///
/// `id` is a stable string key combining kind and identifying path/name
/// (`file:src/app.py`, `route:GET /api/search`, `fn:src/app.py::login`),
/// unique within a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub path: String,
    pub language: Language,
    pub start_line: usize,
    pub end_line: usize,
}

/// Kind of relationship between two nodes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Imports,
    ClientToRoute,
    TestToSubject,
    Calls,
}

/// A directed relationship between two nodes of the same snapshot
///
/// Both endpoints are guaranteed to exist in the snapshot's node set;
/// dangling references are dropped during graph assembly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Edge {
    pub src: String,
    pub dst: String,
    pub kind: EdgeKind,
}

/// A nodes-plus-edges slice of the relationship graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// One ranked search result with its marked snippet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub file_path: String,
    /// First line of the matched window (1-indexed)
    pub line_start: usize,
    /// Last line of the matched window (1-indexed)
    pub line_end: usize,
    /// Source text for the window plus context lines, with matched lines
    /// gutter-marked by `>`
    pub snippet: String,
    pub score: f64,
}

/// Summary returned by a successful rebuild
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildReport {
    pub file_count: usize,
    pub document_count: usize,
    pub node_count: usize,
    pub edge_count: usize,
    /// Files excluded by size, read failure, or UTF-8 decode failure
    pub skipped_files: usize,
    pub elapsed_ms: u64,
}

/// Configuration for scanning and snapshot building
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Maximum file size to index (bytes)
    pub max_file_size: u64,
    /// Files longer than this many lines are chunked into windows
    pub chunk_threshold: usize,
    /// Window size in lines when chunking
    pub chunk_window: usize,
    /// Overlap in lines between consecutive windows
    pub chunk_overlap: usize,
    /// Context lines shown around a matched window in snippets
    pub snippet_context: usize,
    /// Number of threads for parallel indexing (0 = auto, 80% of cores)
    pub parallel_threads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10 MB
            chunk_threshold: 500,
            chunk_window: 60,
            chunk_overlap: 10,
            snippet_context: 3,
            parallel_threads: 0, // 0 = auto (80% of available cores)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("tsx"), Language::TypeScript);
        assert_eq!(Language::from_extension("mjs"), Language::JavaScript);
        assert_eq!(Language::from_extension("exe"), Language::Unknown);
        assert!(!Language::from_extension("bin").is_indexable());
        assert!(Language::from_extension("md").is_indexable());
    }

    #[test]
    fn test_kind_display_forms() {
        assert_eq!(NodeKind::Route.to_string(), "route");
        assert_eq!(EdgeKind::ClientToRoute.to_string(), "client_to_route");
        assert_eq!(EdgeKind::TestToSubject.to_string(), "test_to_subject");
        assert_eq!("imports".parse::<EdgeKind>().unwrap(), EdgeKind::Imports);
        assert_eq!("function".parse::<NodeKind>().unwrap(), NodeKind::Function);
    }
}
