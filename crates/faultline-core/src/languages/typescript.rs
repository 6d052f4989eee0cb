//! TypeScript / JavaScript extractor.
//!
//! Handles .ts with the TypeScript grammar and .tsx/.js/.jsx with the TSX
//! grammar (a superset that accepts JSX). Only module-level declarations are
//! reported; `export` wrappers are unwrapped and remembered.

use super::{
    get_text, is_capitalized, span_of, unquote, ExtractContext, Extracted, LanguageExtractor,
};
use crate::definition::{Definition, DefinitionKind};
use tree_sitter::{Language, Node, Tree};

pub struct TypeScriptExtractor {
    tsx: bool,
}

impl TypeScriptExtractor {
    /// Extractor for plain TypeScript files.
    pub fn typescript() -> Self {
        Self { tsx: false }
    }

    /// Extractor for TSX and JavaScript files.
    pub fn tsx() -> Self {
        Self { tsx: true }
    }
}

impl LanguageExtractor for TypeScriptExtractor {
    fn language(&self) -> Language {
        if self.tsx {
            tree_sitter_typescript::language_tsx()
        } else {
            tree_sitter_typescript::language_typescript()
        }
    }

    fn extensions(&self) -> &[&str] {
        if self.tsx {
            &["tsx", "js", "jsx", "mjs", "cjs"]
        } else {
            &["ts", "mts", "cts"]
        }
    }

    fn extract(&self, tree: &Tree, source: &str, ctx: &ExtractContext<'_>) -> Extracted {
        let root = tree.root_node();
        let mut out = Extracted::default();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "import_statement" => {
                    if let Some(src) = child.child_by_field_name("source") {
                        out.imports.push(unquote(&get_text(&src, source)));
                    }
                }

                "export_statement" => {
                    if let Some(decl) = child.child_by_field_name("declaration") {
                        extract_declaration(&decl, &child, true, source, ctx, &mut out.definitions);
                    }
                    // export { x } from './y'
                    if let Some(src) = child.child_by_field_name("source") {
                        out.imports.push(unquote(&get_text(&src, source)));
                    }
                }

                _ => extract_declaration(&child, &child, false, source, ctx, &mut out.definitions),
            }
        }

        out
    }
}

fn extract_declaration(
    node: &Node,
    outer: &Node,
    exported: bool,
    source: &str,
    ctx: &ExtractContext<'_>,
    definitions: &mut Vec<Definition>,
) {
    let doc = leading_doc(outer, source);

    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = get_text(&name_node, source);
                let kind = callable_kind(&name, exported, ctx);
                push(definitions, Definition::new(name, kind, span_of(outer)), doc);
            }
        }

        "class_declaration" | "abstract_class_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = get_text(&name_node, source);
                let bases = class_bases(node, source);
                let kind = if bases.iter().any(|b| ctx.config.is_model_marker(b)) {
                    DefinitionKind::Model
                } else if ctx.ui_file && exported && is_capitalized(&name) {
                    DefinitionKind::Component
                } else {
                    DefinitionKind::Class
                };
                let def = Definition::new(name, kind, span_of(outer)).with_bases(bases);
                push(definitions, def, doc);
            }
        }

        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = node.walk();
            for declarator in node.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let (Some(name_node), Some(value)) = (
                    declarator.child_by_field_name("name"),
                    declarator.child_by_field_name("value"),
                ) else {
                    continue;
                };
                if name_node.kind() != "identifier" {
                    continue;
                }
                let name = get_text(&name_node, source);

                let kind = match value.kind() {
                    "arrow_function" | "function_expression" | "function"
                    | "generator_function" => callable_kind(&name, exported, ctx),
                    // memo(...), forwardRef(...), styled.div`...`
                    "call_expression"
                        if ctx.ui_file && exported && is_capitalized(&name) =>
                    {
                        DefinitionKind::Component
                    }
                    _ => continue,
                };
                push(
                    definitions,
                    Definition::new(name, kind, span_of(outer)),
                    doc.clone(),
                );
            }
        }

        _ => {}
    }
}

fn callable_kind(name: &str, exported: bool, ctx: &ExtractContext<'_>) -> DefinitionKind {
    if ctx.ui_file && exported && is_capitalized(name) {
        DefinitionKind::Component
    } else {
        DefinitionKind::Function
    }
}

fn push(definitions: &mut Vec<Definition>, def: Definition, doc: Option<String>) {
    definitions.push(match doc {
        Some(doc) => def.with_doc(doc),
        None => def,
    });
}

/// Types named in the `extends` clause.
fn class_bases(node: &Node, source: &str) -> Vec<String> {
    let mut bases = Vec::new();
    let mut cursor = node.walk();
    let Some(heritage) = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "class_heritage")
    else {
        return bases;
    };

    let mut cursor = heritage.walk();
    for clause in heritage.named_children(&mut cursor) {
        match clause.kind() {
            "extends_clause" => {
                let mut inner = clause.walk();
                for value in clause.named_children(&mut inner) {
                    if value.kind() != "type_arguments" {
                        bases.push(get_text(&value, source));
                    }
                }
            }
            "implements_clause" => {}
            _ => bases.push(get_text(&clause, source)),
        }
    }
    bases
}

/// A `/** ... */` comment directly before the declaration.
fn leading_doc(node: &Node, source: &str) -> Option<String> {
    let prev = node.prev_sibling()?;
    if prev.kind() != "comment" {
        return None;
    }
    let text = get_text(&prev, source);
    let body = text.strip_prefix("/**")?.strip_suffix("*/")?;
    let doc = body
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if doc.is_empty() {
        None
    } else {
        Some(doc)
    }
}
