//! Query operations over a published snapshot
//!
//! All operations here are read-only against an immutable snapshot and
//! may run with unbounded concurrency; the engine holds an `Arc` clone,
//! so a snapshot superseded mid-query stays alive until the engine is
//! dropped.

use std::collections::HashSet;
use std::sync::Arc;

use crate::indexer::Snapshot;
use crate::models::{Edge, EdgeKind, GraphView, Node, NodeKind, SearchHit};

/// Executes searches and graph lookups against one snapshot
pub struct QueryEngine {
    snapshot: Arc<Snapshot>,
}

impl QueryEngine {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    /// Rank documents against `query` and return up to `max_results` hits
    /// with marked snippets.
    pub fn search(&self, query: &str, max_results: usize) -> Vec<SearchHit> {
        log::debug!("search: query='{}', max_results={}", query, max_results);
        self.snapshot
            .ranking
            .query(query, max_results)
            .into_iter()
            .map(|(doc_id, score)| {
                let doc = &self.snapshot.documents[doc_id as usize];
                SearchHit {
                    file_path: doc.file_path.clone(),
                    line_start: doc.line_start,
                    line_end: doc.line_end,
                    snippet: self.render_snippet(&doc.file_path, doc.line_start, doc.line_end),
                    score,
                }
            })
            .collect()
    }

    /// List nodes, optionally restricted to one kind.
    pub fn nodes(&self, kind: Option<NodeKind>) -> Vec<Node> {
        self.snapshot
            .nodes
            .iter()
            .filter(|n| kind.is_none_or(|k| n.kind == k))
            .cloned()
            .collect()
    }

    /// List edges, optionally restricted to one kind.
    pub fn edges(&self, kind: Option<EdgeKind>) -> Vec<Edge> {
        self.snapshot
            .edges
            .iter()
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .cloned()
            .collect()
    }

    /// 1-hop neighbors of a node over all edges, direction-agnostic,
    /// sorted by id. Unknown ids yield an empty set.
    pub fn related_files(&self, node_id: &str) -> Vec<Node> {
        let mut neighbor_ids: HashSet<&str> = HashSet::new();
        for edge in &self.snapshot.edges {
            if edge.src == node_id {
                neighbor_ids.insert(&edge.dst);
            } else if edge.dst == node_id {
                neighbor_ids.insert(&edge.src);
            }
        }
        let mut neighbors: Vec<Node> = neighbor_ids
            .into_iter()
            .filter_map(|id| self.snapshot.node(id).cloned())
            .collect();
        neighbors.sort_by(|a, b| a.id.cmp(&b.id));
        neighbors
    }

    /// Graph slice for a query: nodes whose backing files appear in the
    /// top search results, plus their 1-hop neighbors, plus every edge
    /// with both endpoints in that set.
    pub fn subgraph_for_query(&self, query: &str, max_results: usize) -> GraphView {
        let hit_paths: HashSet<String> = self
            .snapshot
            .ranking
            .query(query, max_results)
            .into_iter()
            .map(|(doc_id, _)| self.snapshot.documents[doc_id as usize].file_path.clone())
            .collect();

        let mut ids: HashSet<&str> = self
            .snapshot
            .nodes
            .iter()
            .filter(|n| hit_paths.contains(&n.path))
            .map(|n| n.id.as_str())
            .collect();

        // Expand one hop.
        let mut frontier: Vec<&str> = Vec::new();
        for edge in &self.snapshot.edges {
            if ids.contains(edge.src.as_str()) {
                frontier.push(&edge.dst);
            }
            if ids.contains(edge.dst.as_str()) {
                frontier.push(&edge.src);
            }
        }
        ids.extend(frontier);

        let mut nodes: Vec<Node> = self
            .snapshot
            .nodes
            .iter()
            .filter(|n| ids.contains(n.id.as_str()))
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let edges: Vec<Edge> = self
            .snapshot
            .edges
            .iter()
            .filter(|e| ids.contains(e.src.as_str()) && ids.contains(e.dst.as_str()))
            .cloned()
            .collect();

        GraphView { nodes, edges }
    }

    /// Render the source for `[line_start, line_end]` plus context lines,
    /// gutter-marking the matched window:
    ///
    /// ```text
    ///      11 | def helper():
    /// >    12 |     return login()
    /// ```
    fn render_snippet(&self, file_path: &str, line_start: usize, line_end: usize) -> String {
        let Some(lines) = self.snapshot.sources.get(file_path) else {
            return String::new();
        };
        let context = self.snapshot.snippet_context;
        let from = line_start.saturating_sub(context).max(1);
        let to = (line_end + context).min(lines.len());

        let mut out = Vec::with_capacity(to - from + 1);
        for line_no in from..=to {
            let marker = if line_no >= line_start && line_no <= line_end { ">" } else { " " };
            out.push(format!("{} {:>4} | {}", marker, line_no, lines[line_no - 1]));
        }
        out.join("\n")
    }
}
