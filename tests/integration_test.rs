//! End-to-end tests over real temporary trees
//!
//! Exercises the full pipeline: scan, tokenize, rank, extract, assemble,
//! publish, query. Scenarios mirror the engine's contract: idempotent
//! rebuilds, deterministic ranking, graph soundness, and error behavior
//! around missing roots and unindexed state.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use lexmap::{
    Coordinator, EdgeKind, NodeKind, QueryEngine, ScanConfig, ScanError, SnapshotBuilder,
};

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Small two-language project used by most scenarios
fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.py", "def login():\n    pass\n");
    write(dir.path(), "b.py", "import a\na.login()\n");
    write(
        dir.path(),
        "server.py",
        "@app.route('/api/search', methods=['POST'])\ndef search():\n    return []\n",
    );
    write(
        dir.path(),
        "web/client.js",
        "fetch('/api/search', { method: 'POST', body: q });\n",
    );
    write(dir.path(), "tests/test_login.py", "import a\n\ndef test_login():\n    pass\n");
    dir
}

fn engine(coordinator: &Coordinator) -> QueryEngine {
    QueryEngine::new(coordinator.current().unwrap())
}

#[test]
fn test_import_scenario_nodes_and_edges() {
    let dir = sample_project();
    let coordinator = Coordinator::new(ScanConfig::default());
    coordinator.rebuild(dir.path()).unwrap();
    let engine = engine(&coordinator);

    let node_ids: HashSet<String> = engine.nodes(None).into_iter().map(|n| n.id).collect();
    assert!(node_ids.contains("file:a.py"));
    assert!(node_ids.contains("file:b.py"));
    assert!(node_ids.contains("fn:a.py::login"));
    assert!(node_ids.contains("route:POST /api/search"));

    let imports = engine.edges(Some(EdgeKind::Imports));
    assert!(imports
        .iter()
        .any(|e| e.src == "file:b.py" && e.dst == "file:a.py"));
}

#[test]
fn test_search_ranks_defining_file_above_others() {
    let dir = sample_project();
    let coordinator = Coordinator::new(ScanConfig::default());
    coordinator.rebuild(dir.path()).unwrap();
    let engine = engine(&coordinator);

    let hits = engine.search("login", 10);
    assert!(!hits.is_empty());
    // Files containing the token rank ahead of any file that lacks it;
    // server.py has no "login" token at all.
    assert!(hits.iter().all(|h| h.file_path != "server.py"));
    let top = &hits[0];
    assert!(top.score > 0.0);
    assert!(
        top.file_path == "a.py"
            || top.file_path == "b.py"
            || top.file_path == "tests/test_login.py"
    );
}

#[test]
fn test_unique_token_round_trip() {
    let dir = sample_project();
    write(dir.path(), "zz.py", "def qqzzunique():\n    pass\n");
    let coordinator = Coordinator::new(ScanConfig::default());
    coordinator.rebuild(dir.path()).unwrap();

    let hits = engine(&coordinator).search("qqzzunique", 10);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].file_path, "zz.py");
    assert!(hits[0].score > 0.0);
}

#[test]
fn test_client_call_and_test_link_edges() {
    let dir = sample_project();
    let coordinator = Coordinator::new(ScanConfig::default());
    coordinator.rebuild(dir.path()).unwrap();
    let engine = engine(&coordinator);

    let client = engine.edges(Some(EdgeKind::ClientToRoute));
    assert!(client
        .iter()
        .any(|e| e.src == "file:web/client.js" && e.dst == "route:POST /api/search"));

    let test_links = engine.edges(Some(EdgeKind::TestToSubject));
    assert!(test_links
        .iter()
        .any(|e| e.src == "file:tests/test_login.py"));
}

#[test]
fn test_graph_soundness_no_dangling_edges() {
    let dir = sample_project();
    let coordinator = Coordinator::new(ScanConfig::default());
    coordinator.rebuild(dir.path()).unwrap();
    let engine = engine(&coordinator);

    let ids: HashSet<String> = engine.nodes(None).into_iter().map(|n| n.id).collect();
    for edge in engine.edges(None) {
        assert!(ids.contains(&edge.src), "dangling src: {}", edge.src);
        assert!(ids.contains(&edge.dst), "dangling dst: {}", edge.dst);
    }
}

#[test]
fn test_rebuild_is_idempotent() {
    let dir = sample_project();
    let builder = SnapshotBuilder::new(ScanConfig::default());

    let first = builder.build(dir.path(), false).unwrap();
    let second = builder.build(dir.path(), false).unwrap();

    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.edges, second.edges);

    let engine_a = QueryEngine::new(Arc::new(first));
    let engine_b = QueryEngine::new(Arc::new(second));
    let order_a: Vec<(String, usize)> = engine_a
        .search("search login", 20)
        .into_iter()
        .map(|h| (h.file_path, h.line_start))
        .collect();
    let order_b: Vec<(String, usize)> = engine_b
        .search("search login", 20)
        .into_iter()
        .map(|h| (h.file_path, h.line_start))
        .collect();
    assert_eq!(order_a, order_b);
}

#[test]
fn test_search_before_rebuild_is_not_indexed() {
    let coordinator = Coordinator::new(ScanConfig::default());
    match coordinator.current() {
        Err(ScanError::NotIndexed) => {}
        other => panic!("expected NotIndexed, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_failed_rescan_keeps_previous_snapshot_queryable() {
    let dir = sample_project();
    let coordinator = Coordinator::new(ScanConfig::default());
    coordinator.rebuild(dir.path()).unwrap();

    let err = coordinator.rebuild(Path::new("/nonexistent/lexmap-root")).unwrap_err();
    assert!(matches!(err, ScanError::PathNotFound(_)));

    // Previous snapshot still answers queries.
    let hits = engine(&coordinator).search("login", 10);
    assert!(!hits.is_empty());
}

#[test]
fn test_rebuild_on_file_root_is_not_a_directory() {
    let dir = sample_project();
    let coordinator = Coordinator::new(ScanConfig::default());
    let err = coordinator.rebuild(&dir.path().join("a.py")).unwrap_err();
    assert!(matches!(err, ScanError::NotADirectory(_)));
}

#[test]
fn test_related_files_from_route_node() {
    let dir = sample_project();
    let coordinator = Coordinator::new(ScanConfig::default());
    coordinator.rebuild(dir.path()).unwrap();
    let engine = engine(&coordinator);

    let neighbors: Vec<String> = engine
        .related_files("route:POST /api/search")
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert!(neighbors.contains(&"file:web/client.js".to_string()));
}

#[test]
fn test_subgraph_for_query_includes_neighbors_and_is_closed() {
    let dir = sample_project();
    let coordinator = Coordinator::new(ScanConfig::default());
    coordinator.rebuild(dir.path()).unwrap();
    let engine = engine(&coordinator);

    let view = engine.subgraph_for_query("login", 5);
    let ids: HashSet<String> = view.nodes.iter().map(|n| n.id.clone()).collect();
    assert!(ids.contains("file:a.py"));
    // b.py imports a.py, so it rides in as a 1-hop neighbor.
    assert!(ids.contains("file:b.py"));
    for edge in &view.edges {
        assert!(ids.contains(&edge.src));
        assert!(ids.contains(&edge.dst));
    }
}

#[test]
fn test_chunked_files_report_window_line_ranges() {
    let dir = TempDir::new().unwrap();
    let mut big = String::new();
    for i in 0..600 {
        big.push_str(&format!("value_{} = {}\n", i, i));
    }
    big.push_str("def chunk_needle():\n    pass\n");
    write(dir.path(), "big.py", &big);

    let coordinator = Coordinator::new(ScanConfig::default());
    coordinator.rebuild(dir.path()).unwrap();
    let hits = engine(&coordinator).search("chunk_needle", 5);

    assert!(!hits.is_empty());
    let top = &hits[0];
    assert_eq!(top.file_path, "big.py");
    // The needle sits in the final window, not the whole file.
    assert!(top.line_start > 500);
    assert!(top.line_end >= 601);
    assert!(top.snippet.contains("chunk_needle"));
}

#[test]
fn test_binary_and_oversized_files_are_counted_not_fatal() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "ok.py", "def fine():\n    pass\n");
    fs::write(dir.path().join("junk.py"), [0xFFu8, 0x00, 0x9C]).unwrap();

    let coordinator = Coordinator::new(ScanConfig::default());
    let report = coordinator.rebuild(dir.path()).unwrap();
    assert_eq!(report.file_count, 1);
    assert_eq!(report.skipped_files, 1);
}

#[test]
fn test_node_kind_filters() {
    let dir = sample_project();
    let coordinator = Coordinator::new(ScanConfig::default());
    coordinator.rebuild(dir.path()).unwrap();
    let engine = engine(&coordinator);

    assert_eq!(engine.nodes(Some(NodeKind::Route)).len(), 1);
    assert_eq!(engine.nodes(Some(NodeKind::File)).len(), 5);
    assert!(engine
        .nodes(Some(NodeKind::Test))
        .iter()
        .all(|n| n.path == "tests/test_login.py"));
}
