//! CLI argument parsing and command handlers
//!
//! Each invocation scans the requested root, builds a fresh snapshot
//! through a [`Coordinator`], and runs one query operation against it.
//! Results print as human-readable text by default or as JSON with
//! `--json`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::coordinator::Coordinator;
use crate::models::{EdgeKind, NodeKind, ScanConfig};
use crate::output;
use crate::query::QueryEngine;

/// Lexmap: local-first lexical code search and relationship mapping
#[derive(Parser, Debug)]
#[command(
    name = "lxm",
    version,
    about = "Search a source tree and map how its files connect",
    long_about = "Lexmap indexes a source tree for lexical (BM25) search and extracts a \
                  lightweight relationship graph: files, routes, functions, imports, \
                  client calls, and test-to-subject links. Jump from a query to relevant \
                  code, then to connected code."
)]
pub struct Cli {
    /// Enable verbose logging (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a directory and report index statistics
    Index {
        /// Directory to index (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,

        /// Show a progress bar while indexing
        #[arg(long)]
        progress: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output (only with --json)
        #[arg(long)]
        pretty: bool,
    },

    /// Search the tree and print ranked snippets
    Search {
        /// Query text (natural words or identifiers)
        query: String,

        /// Directory to search (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output (only with --json)
        #[arg(long)]
        pretty: bool,
    },

    /// List graph nodes
    Nodes {
        /// Directory to index (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Filter by node kind (file, route, function, class, test, component)
        #[arg(short, long)]
        kind: Option<NodeKind>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output (only with --json)
        #[arg(long)]
        pretty: bool,
    },

    /// List graph edges
    Edges {
        /// Directory to index (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Filter by edge kind (imports, client_to_route, test_to_subject, calls)
        #[arg(short, long)]
        kind: Option<EdgeKind>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output (only with --json)
        #[arg(long)]
        pretty: bool,
    },

    /// Show the 1-hop neighbors of a node
    Related {
        /// Node id, e.g. 'file:src/app.py' or 'route:GET /search'
        node_id: String,

        /// Directory to index (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output (only with --json)
        #[arg(long)]
        pretty: bool,
    },

    /// Show the graph slice around the top results for a query
    Subgraph {
        /// Query text
        query: String,

        /// Directory to index (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Number of top search results seeding the subgraph
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output (only with --json)
        #[arg(long)]
        pretty: bool,
    },
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        init_logging(self.verbose);

        match self.command {
            Command::Index { path, progress, json, pretty } => {
                let coordinator = Coordinator::new(ScanConfig::default());
                let report = coordinator
                    .rebuild_with_progress(&path, progress)
                    .with_context(|| format!("Failed to index {}", path.display()))?;
                if json {
                    print_json(&report, pretty)?;
                } else {
                    output::success(&format!(
                        "Indexed {} files ({} documents, {} nodes, {} edges, {} skipped) in {} ms",
                        report.file_count,
                        report.document_count,
                        report.node_count,
                        report.edge_count,
                        report.skipped_files,
                        report.elapsed_ms
                    ));
                }
                Ok(())
            }

            Command::Search { query, root, limit, json, pretty } => {
                let engine = engine_for(&root)?;
                let hits = engine.search(&query, limit);
                if json {
                    print_json(&hits, pretty)?;
                } else if hits.is_empty() {
                    output::warn("No results.");
                } else {
                    for hit in &hits {
                        println!(
                            "{}:{}-{}  (score {:.3})",
                            hit.file_path, hit.line_start, hit.line_end, hit.score
                        );
                        println!("{}\n", hit.snippet);
                    }
                }
                Ok(())
            }

            Command::Nodes { root, kind, json, pretty } => {
                let engine = engine_for(&root)?;
                let nodes = engine.nodes(kind);
                if json {
                    print_json(&nodes, pretty)?;
                } else {
                    for node in &nodes {
                        println!(
                            "{}  [{}]  {}:{}-{}",
                            node.id, node.kind, node.path, node.start_line, node.end_line
                        );
                    }
                }
                Ok(())
            }

            Command::Edges { root, kind, json, pretty } => {
                let engine = engine_for(&root)?;
                let edges = engine.edges(kind);
                if json {
                    print_json(&edges, pretty)?;
                } else {
                    for edge in &edges {
                        println!("{}  -[{}]->  {}", edge.src, edge.kind, edge.dst);
                    }
                }
                Ok(())
            }

            Command::Related { node_id, root, json, pretty } => {
                let engine = engine_for(&root)?;
                let neighbors = engine.related_files(&node_id);
                if json {
                    print_json(&neighbors, pretty)?;
                } else if neighbors.is_empty() {
                    output::warn(&format!("No neighbors for '{}'.", node_id));
                } else {
                    for node in &neighbors {
                        println!("{}  [{}]  {}", node.id, node.kind, node.path);
                    }
                }
                Ok(())
            }

            Command::Subgraph { query, root, limit, json, pretty } => {
                let engine = engine_for(&root)?;
                let view = engine.subgraph_for_query(&query, limit);
                if json {
                    print_json(&view, pretty)?;
                } else {
                    println!("{} nodes, {} edges", view.nodes.len(), view.edges.len());
                    for node in &view.nodes {
                        println!("  {}", node.id);
                    }
                    for edge in &view.edges {
                        println!("  {}  -[{}]->  {}", edge.src, edge.kind, edge.dst);
                    }
                }
                Ok(())
            }
        }
    }
}

/// Build a snapshot for `root` and wrap it in a query engine.
fn engine_for(root: &std::path::Path) -> Result<QueryEngine> {
    let coordinator = Coordinator::new(ScanConfig::default());
    coordinator
        .rebuild(root)
        .with_context(|| format!("Failed to index {}", root.display()))?;
    let snapshot = coordinator.current().context("Snapshot missing after rebuild")?;
    Ok(QueryEngine::new(snapshot))
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
