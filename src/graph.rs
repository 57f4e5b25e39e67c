//! Relationship graph assembly
//!
//! Phase two of extraction: once every file's outline is known, raw
//! references are resolved into edges by id lookup against the complete
//! node arena. Resolution is by path and name, never by prior node
//! existence, so the result is independent of scan order. Edges whose
//! endpoints cannot be resolved are dropped, never surfaced; a dangling
//! edge can never escape assembly.

use std::collections::{HashMap, HashSet};

use crate::heuristics::{file_node_id, FileOutline};
use crate::models::{Edge, EdgeKind, Node, NodeKind};

/// Extensions tried when resolving a JS/TS relative import specifier
const JS_RESOLVE_SUFFIXES: &[&str] = &[
    "", ".js", ".jsx", ".ts", ".tsx", "/index.js", "/index.ts", "/index.jsx", "/index.tsx",
];

/// Minimum name similarity for a test-to-subject link
const SUBJECT_SIMILARITY_FLOOR: f64 = 0.5;

/// Assemble the snapshot graph from per-file outlines.
///
/// Returns nodes sorted by id and deduplicated edges sorted by
/// (src, dst, kind).
pub fn assemble(outlines: &[FileOutline]) -> (Vec<Node>, Vec<Edge>) {
    let mut nodes: Vec<Node> = Vec::new();
    let mut node_ids: HashSet<String> = HashSet::new();
    for outline in outlines {
        for node in &outline.nodes {
            // First definition wins; duplicate ids (same route declared
            // twice) collapse to one node.
            if node_ids.insert(node.id.clone()) {
                nodes.push(node.clone());
            }
        }
    }

    let paths: HashSet<&str> = outlines.iter().map(|o| o.path.as_str()).collect();
    let routes = route_table(&nodes);

    let mut edges: HashSet<Edge> = HashSet::new();

    for outline in outlines {
        let src = file_node_id(&outline.path);

        // module base name -> resolved file, feeds both import and call
        // edges
        let mut resolved_imports: HashMap<String, String> = HashMap::new();

        for import in &outline.imports {
            let target = resolve_import(&import.spec, &outline.path, &paths);
            let Some(target) = target else {
                log::debug!(
                    "Unresolved import '{}' in {}:{}",
                    import.spec,
                    outline.path,
                    import.line
                );
                continue;
            };
            if target != outline.path {
                edges.insert(Edge {
                    src: src.clone(),
                    dst: file_node_id(&target),
                    kind: EdgeKind::Imports,
                });
            }
            if let Some(base) = module_base(&import.spec) {
                resolved_imports.insert(base, target);
            }
        }

        for call in &outline.client_calls {
            if let Some(route_id) = routes.lookup(&call.method, &call.path) {
                edges.insert(Edge {
                    src: src.clone(),
                    dst: route_id.to_string(),
                    kind: EdgeKind::ClientToRoute,
                });
            }
        }

        for call in &outline.calls {
            let Some(target) = resolved_imports.get(&call.module) else {
                continue;
            };
            let fn_id = format!("fn:{}::{}", target, call.name);
            if node_ids.contains(&fn_id) {
                edges.insert(Edge {
                    src: src.clone(),
                    dst: fn_id,
                    kind: EdgeKind::Calls,
                });
            }
        }

        if outline.is_test_file {
            if let Some(subject_id) = find_test_subject(outline, &nodes) {
                edges.insert(Edge {
                    src: src.clone(),
                    dst: subject_id,
                    kind: EdgeKind::TestToSubject,
                });
            }
        }
    }

    let mut edges: Vec<Edge> = edges
        .into_iter()
        .filter(|e| e.src != e.dst && node_ids.contains(&e.src) && node_ids.contains(&e.dst))
        .collect();

    nodes.sort_by(|a, b| a.id.cmp(&b.id));
    edges.sort_by(|a, b| {
        a.src
            .cmp(&b.src)
            .then_with(|| a.dst.cmp(&b.dst))
            .then_with(|| a.kind.to_string().cmp(&b.kind.to_string()))
    });

    log::info!("Assembled graph: {} nodes, {} edges", nodes.len(), edges.len());
    (nodes, edges)
}

/// Resolve an import specifier against the scanned path set.
///
/// Dotted specs are treated as Python modules, `./`-style specs as JS
/// relative paths. Anything unresolved is dropped by the caller.
fn resolve_import(spec: &str, importer: &str, paths: &HashSet<&str>) -> Option<String> {
    if spec.starts_with("./") || spec.starts_with("../") {
        resolve_js_relative(spec, importer, paths)
    } else {
        resolve_python_module(spec, importer, paths)
    }
}

fn resolve_js_relative(spec: &str, importer: &str, paths: &HashSet<&str>) -> Option<String> {
    let base = join_normalized(parent_dir(importer), spec)?;
    for suffix in JS_RESOLVE_SUFFIXES {
        let candidate = format!("{}{}", base, suffix);
        if paths.contains(candidate.as_str()) {
            return Some(candidate);
        }
    }
    None
}

fn resolve_python_module(spec: &str, importer: &str, paths: &HashSet<&str>) -> Option<String> {
    let importer_dir = parent_dir(importer);

    let (search_dirs, module_path): (Vec<String>, String) = if let Some(stripped) =
        spec.strip_prefix('.')
    {
        // Relative import: one leading dot anchors at the importer's
        // directory, each further dot climbs one level.
        let extra_dots = stripped.len() - stripped.trim_start_matches('.').len();
        let module = stripped.trim_start_matches('.');
        let mut dir = importer_dir.to_string();
        for _ in 0..extra_dots {
            dir = parent_dir(&dir).to_string();
        }
        (vec![dir], module.replace('.', "/"))
    } else {
        // Absolute module: try the importer's directory first, then the
        // repository root.
        (
            vec![importer_dir.to_string(), String::new()],
            spec.replace('.', "/"),
        )
    };

    for dir in &search_dirs {
        let base = if dir.is_empty() {
            module_path.clone()
        } else if module_path.is_empty() {
            dir.clone()
        } else {
            format!("{}/{}", dir, module_path)
        };
        for candidate in [format!("{}.py", base), format!("{}/__init__.py", base)] {
            if paths.contains(candidate.as_str()) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Last path/module segment of an import spec, used to key qualified calls
fn module_base(spec: &str) -> Option<String> {
    let seg = spec
        .trim_end_matches('/')
        .rsplit(['/', '.'])
        .next()?
        .to_string();
    if seg.is_empty() { None } else { Some(seg) }
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Join a relative specifier onto a directory and collapse `.`/`..`
/// segments. Returns None when `..` escapes the repository root.
fn join_normalized(dir: &str, spec: &str) -> Option<String> {
    let mut parts: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for seg in spec.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// Route lookup table keyed by literal and normalized path
struct RouteTable {
    // (method, path) -> node id; path stored both raw and normalized
    exact: HashMap<(String, String), String>,
    by_path: HashMap<String, String>,
}

fn route_table(nodes: &[Node]) -> RouteTable {
    let mut exact = HashMap::new();
    let mut by_path = HashMap::new();
    for node in nodes.iter().filter(|n| n.kind == NodeKind::Route) {
        let Some((method, path)) = node.name.split_once(' ') else {
            continue;
        };
        for key in [path.to_string(), normalize_endpoint(path)] {
            exact
                .entry((method.to_string(), key.clone()))
                .or_insert_with(|| node.id.clone());
            by_path.entry(key).or_insert_with(|| node.id.clone());
        }
    }
    RouteTable { exact, by_path }
}

impl RouteTable {
    /// Prefer a route with the matching HTTP method, fall back to any
    /// route on the same path.
    fn lookup(&self, method: &str, path: &str) -> Option<&str> {
        for key in [path.to_string(), normalize_endpoint(path)] {
            if let Some(id) = self.exact.get(&(method.to_string(), key.clone())) {
                return Some(id);
            }
            if let Some(id) = self.by_path.get(&key) {
                return Some(id);
            }
        }
        None
    }
}

/// Strip slashes and an `api/` prefix so `/api/search` matches `/search`
fn normalize_endpoint(path: &str) -> String {
    let trimmed = path.trim_matches('/').to_lowercase();
    trimmed.strip_prefix("api/").unwrap_or(&trimmed).to_string()
}

/// Best-effort test-to-subject resolution.
///
/// The stripped test stem is compared against candidate names by longest
/// common subsequence ratio; ties break by directory distance, then by
/// node id. This is a documented heuristic: repositories with duplicate
/// basenames across directories may still misattribute.
fn find_test_subject(outline: &FileOutline, nodes: &[Node]) -> Option<String> {
    let test_stem = strip_test_markers(file_stem(&outline.path));
    if test_stem.is_empty() {
        return None;
    }

    let mut best: Option<(f64, usize, &Node)> = None;
    for node in nodes {
        let eligible = match node.kind {
            NodeKind::Function | NodeKind::Class | NodeKind::Component => true,
            NodeKind::File => node.path != outline.path,
            _ => false,
        };
        if !eligible || crate::heuristics::is_test_file(&node.path) {
            continue;
        }

        let candidate_name = match node.kind {
            NodeKind::File => file_stem(&node.path).to_string(),
            _ => node.name.to_lowercase(),
        };
        let score = similarity(&test_stem, &candidate_name.to_lowercase());
        if score < SUBJECT_SIMILARITY_FLOOR {
            continue;
        }
        let distance = dir_distance(&outline.path, &node.path);
        let better = match &best {
            None => true,
            Some((s, d, n)) => {
                score > *s
                    || (score == *s && distance < *d)
                    || (score == *s && distance == *d && node.id < n.id)
            }
        };
        if better {
            best = Some((score, distance, node));
        }
    }
    best.map(|(_, _, node)| node.id.clone())
}

fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.split_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

fn strip_test_markers(stem: &str) -> String {
    let s = stem.to_lowercase();
    let s = s.strip_prefix("test_").unwrap_or(&s);
    let s = s.strip_suffix("_test").unwrap_or(s);
    let s = s.strip_suffix(".test").unwrap_or(s);
    let s = s.strip_suffix(".spec").unwrap_or(s);
    s.to_string()
}

/// Normalized longest-common-subsequence ratio in [0, 1]
fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let lcs = lcs_len(a.as_bytes(), b.as_bytes()) as f64;
    2.0 * lcs / (a.len() + b.len()) as f64
}

fn lcs_len(a: &[u8], b: &[u8]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Number of path components not shared between two files' directories
fn dir_distance(a: &str, b: &str) -> usize {
    let a_parts: Vec<&str> = parent_dir(a).split('/').filter(|s| !s.is_empty()).collect();
    let b_parts: Vec<&str> = parent_dir(b).split('/').filter(|s| !s.is_empty()).collect();
    let shared = a_parts
        .iter()
        .zip(b_parts.iter())
        .take_while(|(x, y)| x == y)
        .count();
    (a_parts.len() - shared) + (b_parts.len() - shared)
}
