//! Per-language structural heuristics
//!
//! Each supported language family provides a pure extraction function
//! `(&FileRecord) -> outline` selected through a dispatch table. The
//! heuristics are pattern-based by design, not a parser: missed
//! relationships are acceptable, false positives are kept down by
//! requiring syntactic anchors (route paths must be string literals
//! starting with `/`, imports must sit in import statements).
//!
//! Extraction is phase one of the graph build: it emits nodes and raw
//! references. Cross-file resolution happens later, once the whole node
//! set is known, so output never depends on scan order.

pub mod javascript;
pub mod python;

use crate::models::{FileRecord, Language, Node, NodeKind};

/// Raw import reference, unresolved until graph assembly
#[derive(Debug, Clone)]
pub struct ImportRef {
    /// Import specifier as written: `app.services`, `./utils`, `../api`
    pub spec: String,
    pub line: usize,
}

/// Network-call-like expression with a literal path
#[derive(Debug, Clone)]
pub struct ClientCall {
    pub method: String,
    pub path: String,
    pub line: usize,
}

/// Qualified call `module.name(...)` against an imported module
#[derive(Debug, Clone)]
pub struct CallRef {
    pub module: String,
    pub name: String,
    pub line: usize,
}

/// Everything phase one knows about a single file
#[derive(Debug, Default)]
pub struct FileOutline {
    pub path: String,
    pub is_test_file: bool,
    pub nodes: Vec<Node>,
    pub imports: Vec<ImportRef>,
    pub client_calls: Vec<ClientCall>,
    pub calls: Vec<CallRef>,
}

/// Extract the outline for one file.
///
/// Always emits a `file:` node; language-specific detection is layered on
/// top for the families we have heuristics for.
pub fn extract(record: &FileRecord) -> FileOutline {
    let mut outline = FileOutline {
        path: record.path.clone(),
        is_test_file: is_test_file(&record.path),
        ..FileOutline::default()
    };

    outline.nodes.push(Node {
        id: file_node_id(&record.path),
        kind: NodeKind::File,
        name: basename(&record.path).to_string(),
        path: record.path.clone(),
        language: record.language,
        start_line: 1,
        end_line: record.line_count.max(1),
    });

    match record.language {
        Language::Python => python::extract(record, &mut outline),
        Language::JavaScript | Language::TypeScript => javascript::extract(record, &mut outline),
        _ => {}
    }

    outline
}

/// Stable node id for a file
pub fn file_node_id(path: &str) -> String {
    format!("file:{}", path)
}

/// Test-naming conventions across the supported families
pub fn is_test_file(path: &str) -> bool {
    let name = basename(path);
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
    name.starts_with("test_")
        || stem.ends_with("_test")
        || stem.ends_with(".test")
        || stem.ends_with(".spec")
        || path.split('/').any(|part| part == "tests" || part == "__tests__")
}

pub(crate) fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Last line of an indentation-delimited block starting at `start` (0-based
/// index into `lines`). Used for Python bodies.
pub(crate) fn indent_block_end(lines: &[&str], start: usize) -> usize {
    let indent = leading_spaces(lines[start]);
    let mut end = start;
    for (i, line) in lines.iter().enumerate().skip(start + 1) {
        if line.trim().is_empty() {
            continue;
        }
        if leading_spaces(line) <= indent {
            break;
        }
        end = i;
    }
    end
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
