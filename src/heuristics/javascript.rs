//! Structural heuristics for JavaScript and TypeScript sources
//!
//! Detects function declarations, arrow-function bindings, Express-style
//! route registrations, ES/CommonJS imports, and client calls
//! (`fetch`/`axios`). Function extents come from brace counting on the
//! declaration's own lines; arrow bindings are recorded as single-line
//! nodes.

use regex::Regex;
use std::sync::LazyLock;

use crate::heuristics::{basename, ClientCall, FileOutline, ImportRef};
use crate::models::{FileRecord, Language, Node, NodeKind};

static FUNC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfunction\s+([A-Za-z_$][\w$]*)\s*\(").unwrap()
});
static ARROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s*)?\([^)]*\)\s*=>").unwrap()
});

// app.get('/path', handler) and router variants
static ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:app|router)\.(get|post|put|delete|patch)\s*\(\s*['"](/[^'"]*)['"]"#)
        .unwrap()
});

static IMPORT_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s+[^'"]*?\bfrom\s+['"]([^'"]+)['"]"#).unwrap()
});
static IMPORT_BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*import\s+['"]([^'"]+)['"]"#).unwrap());
static REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:require|import)\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap()
});

// fetch('/path') with optional { method: 'POST' } options on the same line
static FETCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bfetch\s*\(\s*['"`](/[^'"`]*)['"`](?:\s*,\s*\{[^}]*method\s*:\s*['"](\w+)['"])?"#).unwrap()
});
static AXIOS_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\baxios\.(get|post|put|delete|patch)\s*\(\s*['"`](/[^'"`]*)['"`]"#).unwrap()
});
static AXIOS_CONFIG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\baxios\s*\(\s*\{[^}]*url\s*:\s*['"`](/[^'"`]*)['"`]"#).unwrap()
});

// it('...') / test('...') / describe('...') registrations in test files
static TEST_CASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:it|test|describe)\s*\(\s*['"`]([^'"`]+)['"`]"#).unwrap()
});

pub fn extract(record: &FileRecord, outline: &mut FileOutline) {
    let lines: Vec<&str> = record.content.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        let line_no = i + 1;

        if let Some(caps) = FUNC_RE.captures(line) {
            let name = caps[1].to_string();
            let end_line = brace_block_end(&lines, i) + 1;
            push_definition(outline, record, name, line_no, end_line);
        } else if let Some(caps) = ARROW_RE.captures(line) {
            push_definition(outline, record, caps[1].to_string(), line_no, line_no);
        } else if outline.is_test_file {
            if let Some(caps) = TEST_CASE_RE.captures(line) {
                let name = caps[1].to_string();
                outline.nodes.push(Node {
                    id: format!("test:{}::{}", record.path, name),
                    kind: NodeKind::Test,
                    name,
                    path: record.path.clone(),
                    language: record.language,
                    start_line: line_no,
                    end_line: brace_block_end(&lines, i) + 1,
                });
            }
        }

        for caps in ROUTE_RE.captures_iter(line) {
            let method = caps[1].to_uppercase();
            let path = caps[2].to_string();
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

        if let Some(caps) = IMPORT_FROM_RE.captures(line) {
            outline.imports.push(ImportRef { spec: caps[1].to_string(), line: line_no });
        } else if let Some(caps) = IMPORT_BARE_RE.captures(line) {
            outline.imports.push(ImportRef { spec: caps[1].to_string(), line: line_no });
        }
        for caps in REQUIRE_RE.captures_iter(line) {
            outline.imports.push(ImportRef { spec: caps[1].to_string(), line: line_no });
        }

        for caps in FETCH_RE.captures_iter(line) {
            let method = caps
                .get(2)
                .map(|m| m.as_str().to_uppercase())
                .unwrap_or_else(|| "GET".to_string());
            outline.client_calls.push(ClientCall {
                method,
                path: caps[1].to_string(),
                line: line_no,
            });
        }
        for caps in AXIOS_VERB_RE.captures_iter(line) {
            outline.client_calls.push(ClientCall {
                method: caps[1].to_uppercase(),
                path: caps[2].to_string(),
                line: line_no,
            });
        }
        for caps in AXIOS_CONFIG_RE.captures_iter(line) {
            outline.client_calls.push(ClientCall {
                method: "GET".to_string(),
                path: caps[1].to_string(),
                line: line_no,
            });
        }
    }
}

fn push_definition(
    outline: &mut FileOutline,
    record: &FileRecord,
    name: String,
    start_line: usize,
    end_line: usize,
) {
    let kind = if outline.is_test_file && name.starts_with("test") {
        NodeKind::Test
    } else if is_component(record, &name) {
        NodeKind::Component
    } else {
        NodeKind::Function
    };
    let prefix = match kind {
        NodeKind::Test => "test",
        NodeKind::Component => "component",
        _ => "fn",
    };
    outline.nodes.push(Node {
        id: format!("{}:{}::{}", prefix, record.path, name),
        kind,
        name,
        path: record.path.clone(),
        language: record.language,
        start_line,
        end_line,
    });
}

/// Capitalized definitions in JSX/TSX files are almost always components.
fn is_component(record: &FileRecord, name: &str) -> bool {
    let jsx = basename(&record.path).ends_with(".jsx") || basename(&record.path).ends_with(".tsx");
    jsx && matches!(record.language, Language::JavaScript | Language::TypeScript)
        && name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Last line of a brace-delimited block opened at `start` (0-based).
/// Falls back to `start` when no opening brace follows.
fn brace_block_end(lines: &[&str], start: usize) -> usize {
    let mut depth = 0i32;
    let mut opened = false;
    for (i, line) in lines.iter().enumerate().skip(start) {
        for ch in line.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        if opened && depth <= 0 {
            return i;
        }
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics;
    use crate::models::Language;

    fn record(path: &str, content: &str) -> FileRecord {
        let ext = path.rsplit('.').next().unwrap_or("");
        FileRecord {
            path: path.to_string(),
            language: Language::from_extension(ext),
            byte_size: content.len() as u64,
            line_count: content.lines().count(),
            content: content.to_string(),
        }
    }

    fn outline_for(path: &str, content: &str) -> FileOutline {
        heuristics::extract(&record(path, content))
    }

    #[test]
    fn test_function_declaration_with_brace_extent() {
        let outline = outline_for(
            "app.js",
            "function handleLogin(user) {\n  return user;\n}\nlet x = 1;\n",
        );
        let node = outline.nodes.iter().find(|n| n.name == "handleLogin").unwrap();
        assert_eq!(node.kind, NodeKind::Function);
        assert_eq!((node.start_line, node.end_line), (1, 3));
    }

    #[test]
    fn test_arrow_function_binding() {
        let outline = outline_for("util.ts", "export const sum = (a, b) => a + b;\n");
        let node = outline.nodes.iter().find(|n| n.name == "sum").unwrap();
        assert_eq!(node.kind, NodeKind::Function);
    }

    #[test]
    fn test_jsx_component_detection() {
        let outline = outline_for("Login.jsx", "function LoginForm() {\n  return null;\n}\n");
        let node = outline.nodes.iter().find(|n| n.name == "LoginForm").unwrap();
        assert_eq!(node.kind, NodeKind::Component);
        assert_eq!(node.id, "component:Login.jsx::LoginForm");
    }

    #[test]
    fn test_express_route_registration() {
        let outline = outline_for(
            "server.js",
            "app.post('/api/search', handler);\nrouter.get('/users', list);\n",
        );
        let ids: Vec<&str> = outline
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Route)
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["route:POST /api/search", "route:GET /users"]);
    }

    #[test]
    fn test_import_forms() {
        let outline = outline_for(
            "main.js",
            "import { api } from './api';\nimport 'polyfill';\nconst u = require('../utils');\nconst lazy = import('./lazy');\n",
        );
        let specs: Vec<&str> = outline.imports.iter().map(|i| i.spec.as_str()).collect();
        assert_eq!(specs, vec!["./api", "polyfill", "../utils", "./lazy"]);
    }

    #[test]
    fn test_fetch_with_method_option() {
        let outline = outline_for(
            "client.js",
            "fetch('/api/search', { method: 'POST', body: q });\nfetch('/health');\n",
        );
        assert_eq!(outline.client_calls.len(), 2);
        assert_eq!(outline.client_calls[0].method, "POST");
        assert_eq!(outline.client_calls[0].path, "/api/search");
        assert_eq!(outline.client_calls[1].method, "GET");
    }

    #[test]
    fn test_axios_calls() {
        let outline = outline_for(
            "client.js",
            "axios.put('/api/users/1', body);\naxios({ url: '/api/stats' });\n",
        );
        assert_eq!(outline.client_calls.len(), 2);
        assert_eq!(outline.client_calls[0].method, "PUT");
        assert_eq!(outline.client_calls[1].path, "/api/stats");
    }

    #[test]
    fn test_it_and_describe_blocks_in_test_files() {
        let outline = outline_for(
            "src/auth.test.js",
            "describe('auth', () => {\n  it('rejects bad tokens', () => {\n    check();\n  });\n});\n",
        );
        let tests: Vec<&str> = outline
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Test)
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(tests, vec!["auth", "rejects bad tokens"]);
    }

    #[test]
    fn test_client_call_requires_literal_leading_slash() {
        let outline = outline_for("client.js", "fetch(url);\nfetch('relative/path');\n");
        assert!(outline.client_calls.is_empty());
    }
}
