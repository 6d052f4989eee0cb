//! Lexical fallback for files without a grammar.
//!
//! Pattern matching over raw text. Only unindented declarations are
//! considered top level. Results carry `Confidence::Lexical`.

use crate::definition::{Definition, DefinitionKind, LineSpan};
use crate::languages::is_capitalized;
use regex::Regex;
use std::sync::OnceLock;

static DECLARATION: OnceLock<Regex> = OnceLock::new();
static TYPE_DECL: OnceLock<Regex> = OnceLock::new();
static ARROW_CONST: OnceLock<Regex> = OnceLock::new();
static IMPORT_FROM: OnceLock<Regex> = OnceLock::new();
static IMPORT_BARE: OnceLock<Regex> = OnceLock::new();
static REQUIRE: OnceLock<Regex> = OnceLock::new();

fn declaration() -> &'static Regex {
    DECLARATION.get_or_init(|| {
        Regex::new(
            r"(?m)^(export\s+)?(?:default\s+)?(?:pub(?:\([^)]*\))?\s+)?(?:public\s+|private\s+|internal\s+|abstract\s+|final\s+|open\s+|data\s+|async\s+)*(function|class|def|func|fun|fn|struct)\s+([A-Za-z_][A-Za-z0-9_]*)",
        )
        .expect("declaration pattern is valid")
    })
}

fn type_decl() -> &'static Regex {
    TYPE_DECL.get_or_init(|| {
        Regex::new(r"(?m)^type\s+([A-Za-z_][A-Za-z0-9_]*)\s+(?:struct|interface)\b")
            .expect("type pattern is valid")
    })
}

fn arrow_const() -> &'static Regex {
    ARROW_CONST.get_or_init(|| {
        Regex::new(
            r"(?m)^(export\s+)?const\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?:async\s+)?(?:\([^)]*\)|[A-Za-z_][A-Za-z0-9_]*)\s*=>",
        )
        .expect("arrow pattern is valid")
    })
}

fn import_from() -> &'static Regex {
    IMPORT_FROM.get_or_init(|| {
        Regex::new(r#"import\s+[^;]*?\s+from\s+['"]([^'"]+)['"]"#).expect("import pattern is valid")
    })
}

fn import_bare() -> &'static Regex {
    IMPORT_BARE.get_or_init(|| {
        Regex::new(r#"^\s*(?:import|use|require|require_once|include)\s+['"]?([A-Za-z_@./][A-Za-z0-9_@./:-]*)"#)
            .expect("bare import pattern is valid")
    })
}

fn require_call() -> &'static Regex {
    REQUIRE.get_or_init(|| {
        Regex::new(r#"require\(\s*['"]([^'"]+)['"]\s*\)"#).expect("require pattern is valid")
    })
}

/// Best-effort extraction for files without a grammar.
pub(crate) struct LexicalExtractor;

impl LexicalExtractor {
    pub(crate) fn extract(&self, source: &str, ui_file: bool) -> (Vec<Definition>, Vec<String>) {
        let mut found: Vec<(usize, Definition)> = Vec::new();

        for caps in declaration().captures_iter(source) {
            let (Some(whole), Some(keyword), Some(name)) = (caps.get(0), caps.get(2), caps.get(3))
            else {
                continue;
            };
            let exported = caps.get(1).is_some();
            let name = name.as_str();
            let kind = match keyword.as_str() {
                "class" | "struct" => DefinitionKind::Class,
                _ => DefinitionKind::Function,
            };
            let kind = if ui_file && exported && is_capitalized(name) {
                DefinitionKind::Component
            } else {
                kind
            };
            let line = line_of(source, whole.start());
            found.push((whole.start(), Definition::new(name, kind, LineSpan::new(line, line))));
        }

        // Go: type User struct { ... }
        for caps in type_decl().captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let line = line_of(source, whole.start());
            found.push((
                whole.start(),
                Definition::new(name.as_str(), DefinitionKind::Class, LineSpan::new(line, line)),
            ));
        }

        for caps in arrow_const().captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let exported = caps.get(1).is_some();
            let kind = if ui_file && exported && is_capitalized(name.as_str()) {
                DefinitionKind::Component
            } else {
                DefinitionKind::Function
            };
            let line = line_of(source, whole.start());
            found.push((
                whole.start(),
                Definition::new(name.as_str(), kind, LineSpan::new(line, line)),
            ));
        }

        found.sort_by_key(|(offset, _)| *offset);
        let definitions = found.into_iter().map(|(_, def)| def).collect();

        let mut imports = Vec::new();
        for line in source.lines() {
            let captured = import_from()
                .captures(line)
                .or_else(|| require_call().captures(line))
                .or_else(|| import_bare().captures(line));
            if let Some(m) = captured.and_then(|caps| caps.get(1)) {
                imports.push(m.as_str().to_string());
            }
        }

        (definitions, imports)
    }
}

fn line_of(source: &str, offset: usize) -> u32 {
    source[..offset].matches('\n').count() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_like_source() {
        let source = "package main\n\nimport \"fmt\"\n\ntype T struct{}\n\nfunc Run() {\n\tfmt.Println()\n}\n";
        let (defs, imports) = LexicalExtractor.extract(source, false);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "T");
        assert_eq!(defs[0].kind, DefinitionKind::Class);
        assert_eq!(defs[0].line_span.start, 5);
        assert_eq!(defs[1].name, "Run");
        assert_eq!(defs[1].kind, DefinitionKind::Function);
        assert_eq!(defs[1].line_span.start, 7);
        assert_eq!(imports, vec!["fmt"]);
    }

    #[test]
    fn test_go_types() {
        let source = "type User struct {\n\tName string\n}\n\ntype Store interface {\n\tGet() User\n}\n\ntype ID int\n";
        let (defs, _) = LexicalExtractor.extract(source, false);
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["User", "Store"]);
        assert!(defs.iter().all(|d| d.kind == DefinitionKind::Class));
    }

    #[test]
    fn test_kotlin_source() {
        let source = "package app\n\nimport app.db.Repo\n\nfun main() {}\n\nclass Repo\n\ndata class User(val id: Int)\n\nprivate fun helper() = 1\n";
        let (defs, imports) = LexicalExtractor.extract(source, false);
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["main", "Repo", "User", "helper"]);
        assert_eq!(defs[0].kind, DefinitionKind::Function);
        assert_eq!(defs[1].kind, DefinitionKind::Class);
        assert_eq!(defs[2].kind, DefinitionKind::Class);
        assert_eq!(defs[3].kind, DefinitionKind::Function);
        assert_eq!(imports, vec!["app.db.Repo"]);
    }

    #[test]
    fn test_vue_script_block() {
        let source = "<script>\nimport Card from './Card.vue'\nexport function Helper() {}\nexport const Panel = () => null\n</script>\n";
        let (defs, imports) = LexicalExtractor.extract(source, true);
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Helper", "Panel"]);
        assert!(defs.iter().all(|d| d.kind == DefinitionKind::Component));
        assert_eq!(imports, vec!["./Card.vue"]);
    }

    #[test]
    fn test_indented_declarations_are_ignored() {
        let source = "class Outer:\n    def inner(self):\n        pass\n";
        let (defs, _) = LexicalExtractor.extract(source, false);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "Outer");
        assert_eq!(defs[0].kind, DefinitionKind::Class);
    }
}
