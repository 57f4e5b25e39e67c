//! Structural heuristics for Python sources
//!
//! Detects function/class definitions, Flask/FastAPI route decorators,
//! import statements, and HTTP client calls (`requests`/`httpx`). Body
//! extents come from indentation, not parsing.

use regex::Regex;
use std::sync::LazyLock;

use crate::heuristics::{indent_block_end, CallRef, ClientCall, FileOutline, ImportRef};
use crate::models::{FileRecord, Node, NodeKind};

static DEF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(").unwrap()
});
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*class\s+([A-Za-z_]\w*)").unwrap());

// @app.route('/path') and blueprint variants; path must be a string
// literal starting with /
static ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*@\w+(?:\.\w+)*\.route\(\s*['"](/[^'"]*)['"]"#).unwrap()
});
static ROUTE_METHODS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"methods\s*=\s*\[\s*['"](\w+)['"]"#).unwrap()
});
// FastAPI style: @app.get('/path'), @router.post('/path')
static ROUTE_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*@\w+(?:\.\w+)*\.(get|post|put|delete|patch)\(\s*['"](/[^'"]*)['"]"#).unwrap()
});

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*import\s+([A-Za-z_][\w.]*)").unwrap());
static FROM_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*from\s+(\.*[A-Za-z_][\w.]*|\.+)\s+import\b").unwrap());

static CLIENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:requests|httpx)\.(get|post|put|delete|patch)\s*\(\s*['"](/[^'"]*)['"]"#)
        .unwrap()
});

// Qualified call like mod.func(, candidate for a cross-file call edge
static QUALIFIED_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_]\w*)\.([A-Za-z_]\w*)\s*\(").unwrap()
});

pub fn extract(record: &FileRecord, outline: &mut FileOutline) {
    let lines: Vec<&str> = record.content.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        let line_no = i + 1;

        if let Some(caps) = DEF_RE.captures(line) {
            let name = caps[1].to_string();
            let end_line = indent_block_end(&lines, i) + 1;
            let kind = if outline.is_test_file && name.starts_with("test") {
                NodeKind::Test
            } else {
                NodeKind::Function
            };
            let prefix = if kind == NodeKind::Test { "test" } else { "fn" };
            outline.nodes.push(Node {
                id: format!("{}:{}::{}", prefix, record.path, name),
                kind,
                name,
                path: record.path.clone(),
                language: record.language,
                start_line: line_no,
                end_line,
            });
        } else if let Some(caps) = CLASS_RE.captures(line) {
            let name = caps[1].to_string();
            let end_line = indent_block_end(&lines, i) + 1;
            outline.nodes.push(Node {
                id: format!("class:{}::{}", record.path, name),
                kind: NodeKind::Class,
                name,
                path: record.path.clone(),
                language: record.language,
                start_line: line_no,
                end_line,
            });
        }

        if let Some(caps) = ROUTE_RE.captures(line) {
            let method = ROUTE_METHODS_RE
                .captures(line)
                .map(|m| m[1].to_uppercase())
                .unwrap_or_else(|| "GET".to_string());
            push_route(outline, record, &method, &caps[1], line_no);
        } else if let Some(caps) = ROUTE_VERB_RE.captures(line) {
            push_route(outline, record, &caps[1].to_uppercase(), &caps[2], line_no);
        }

        if let Some(caps) = IMPORT_RE.captures(line) {
            outline.imports.push(ImportRef {
                spec: caps[1].to_string(),
                line: line_no,
            });
        } else if let Some(caps) = FROM_IMPORT_RE.captures(line) {
            outline.imports.push(ImportRef {
                spec: caps[1].to_string(),
                line: line_no,
            });
        }

        for caps in CLIENT_RE.captures_iter(line) {
            outline.client_calls.push(ClientCall {
                method: caps[1].to_uppercase(),
                path: caps[2].to_string(),
                line: line_no,
            });
        }

        for caps in QUALIFIED_CALL_RE.captures_iter(line) {
            let module = caps[1].to_string();
            // self/cls method calls are never cross-file
            if module == "self" || module == "cls" {
                continue;
            }
            outline.calls.push(CallRef {
                module,
                name: caps[2].to_string(),
                line: line_no,
            });
        }
    }
}

fn push_route(
    outline: &mut FileOutline,
    record: &FileRecord,
    method: &str,
    path: &str,
    line_no: usize,
) {
    outline.nodes.push(Node {
        id: format!("route:{} {}", method, path),
        kind: NodeKind::Route,
        name: format!("{} {}", method, path),
        path: record.path.clone(),
        language: record.language,
        start_line: line_no,
        end_line: line_no,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics;
    use crate::models::Language;

    fn record(path: &str, content: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            language: Language::Python,
            byte_size: content.len() as u64,
            line_count: content.lines().count(),
            content: content.to_string(),
        }
    }

    fn outline_for(path: &str, content: &str) -> FileOutline {
        heuristics::extract(&record(path, content))
    }

    #[test]
    fn test_function_and_class_nodes_with_extents() {
        let outline = outline_for(
            "app.py",
            "class Auth:\n    def check(self):\n        return True\n\ndef login():\n    pass\n",
        );
        let class = outline.nodes.iter().find(|n| n.kind == NodeKind::Class).unwrap();
        assert_eq!(class.name, "Auth");
        assert_eq!((class.start_line, class.end_line), (1, 3));

        let login = outline.nodes.iter().find(|n| n.name == "login").unwrap();
        assert_eq!(login.kind, NodeKind::Function);
        assert_eq!(login.id, "fn:app.py::login");
        assert_eq!((login.start_line, login.end_line), (5, 6));
    }

    #[test]
    fn test_flask_route_decorator() {
        let outline = outline_for(
            "api.py",
            "@app.route('/api/search', methods=['POST'])\ndef search():\n    pass\n",
        );
        let route = outline.nodes.iter().find(|n| n.kind == NodeKind::Route).unwrap();
        assert_eq!(route.id, "route:POST /api/search");
    }

    #[test]
    fn test_fastapi_verb_decorator() {
        let outline = outline_for("api.py", "@router.get(\"/users\")\ndef users():\n    pass\n");
        let route = outline.nodes.iter().find(|n| n.kind == NodeKind::Route).unwrap();
        assert_eq!(route.id, "route:GET /users");
    }

    #[test]
    fn test_route_requires_leading_slash_literal() {
        let outline = outline_for("api.py", "@app.route(path)\n@app.route('users')\n");
        assert!(outline.nodes.iter().all(|n| n.kind != NodeKind::Route));
    }

    #[test]
    fn test_imports_both_forms() {
        let outline = outline_for(
            "b.py",
            "import a\nfrom app.services import helper\nfrom . import sibling\n",
        );
        let specs: Vec<&str> = outline.imports.iter().map(|i| i.spec.as_str()).collect();
        assert!(specs.contains(&"a"));
        assert!(specs.contains(&"app.services"));
    }

    #[test]
    fn test_client_calls_need_literal_path() {
        let outline = outline_for(
            "client.py",
            "r = requests.post('/api/search', json=q)\nhttpx.get(url)\n",
        );
        assert_eq!(outline.client_calls.len(), 1);
        assert_eq!(outline.client_calls[0].method, "POST");
        assert_eq!(outline.client_calls[0].path, "/api/search");
    }

    #[test]
    fn test_test_functions_in_test_files() {
        let outline = outline_for("tests/test_auth.py", "def test_login():\n    pass\n");
        let node = outline.nodes.iter().find(|n| n.name == "test_login").unwrap();
        assert_eq!(node.kind, NodeKind::Test);
    }

    #[test]
    fn test_qualified_calls_skip_self() {
        let outline = outline_for("b.py", "import a\na.login()\nself.cleanup()\n");
        assert_eq!(outline.calls.len(), 1);
        assert_eq!(outline.calls[0].module, "a");
        assert_eq!(outline.calls[0].name, "login");
    }
}
