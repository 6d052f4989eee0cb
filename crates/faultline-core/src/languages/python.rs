//! Python extractor.
//!
//! Handles .py files. Top-level `def`/`class` become definitions;
//! imports are collected from anywhere in the file so that imports guarded
//! by `try` or `if TYPE_CHECKING` are not lost.

use super::{get_text, span_of, unquote, ExtractContext, Extracted, LanguageExtractor};
use crate::definition::{Definition, DefinitionKind};
use tree_sitter::{Language, Node, Tree};

pub struct PythonExtractor;

impl LanguageExtractor for PythonExtractor {
    fn language(&self) -> Language {
        tree_sitter_python::language()
    }

    fn extensions(&self) -> &[&str] {
        &["py"]
    }

    fn extract(&self, tree: &Tree, source: &str, ctx: &ExtractContext<'_>) -> Extracted {
        let root = tree.root_node();
        let mut out = Extracted::default();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if let Some(def) = extract_definition(&child, &child, source, ctx) {
                out.definitions.push(def);
            }
        }

        collect_imports(&root, source, &mut out.imports);
        out
    }
}

/// Extracts a definition from a top-level statement.
///
/// `outer` is the statement as it appears at module level (a decorated
/// definition spans its decorators too).
fn extract_definition(
    node: &Node,
    outer: &Node,
    source: &str,
    ctx: &ExtractContext<'_>,
) -> Option<Definition> {
    match node.kind() {
        "function_definition" => {
            let name = get_text(&node.child_by_field_name("name")?, source);
            let mut def = Definition::new(name, DefinitionKind::Function, span_of(outer));
            if let Some(doc) = docstring(node, source) {
                def = def.with_doc(doc);
            }
            Some(def)
        }

        "class_definition" => {
            let name = get_text(&node.child_by_field_name("name")?, source);
            let bases = class_bases(node, source);
            let kind = if bases.iter().any(|b| ctx.config.is_model_marker(b)) {
                DefinitionKind::Model
            } else {
                DefinitionKind::Class
            };
            let mut def = Definition::new(name, kind, span_of(outer)).with_bases(bases);
            if let Some(doc) = docstring(node, source) {
                def = def.with_doc(doc);
            }
            Some(def)
        }

        "decorated_definition" => {
            let inner = node.child_by_field_name("definition")?;
            extract_definition(&inner, outer, source, ctx)
        }

        _ => None,
    }
}

/// Base classes as written, minus keyword arguments like `metaclass=`.
fn class_bases(node: &Node, source: &str) -> Vec<String> {
    let Some(args) = node.child_by_field_name("superclasses") else {
        return Vec::new();
    };

    let mut cursor = args.walk();
    let bases = args
        .named_children(&mut cursor)
        .filter(|arg| matches!(arg.kind(), "identifier" | "attribute" | "subscript"))
        .map(|arg| {
            let text = get_text(&arg, source);
            // Generic[T] -> Generic
            match text.find('[') {
                Some(pos) => text[..pos].to_string(),
                None => text,
            }
        })
        .collect();
    bases
}

/// The docstring of a function or class body, if its first statement is a string.
fn docstring(node: &Node, source: &str) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let literal = first.named_child(0)?;
    if literal.kind() != "string" {
        return None;
    }
    let doc = unquote(&get_text(&literal, source)).trim().to_string();
    if doc.is_empty() {
        None
    } else {
        Some(doc)
    }
}

/// Collects import references anywhere below `node`.
fn collect_imports(node: &Node, source: &str, imports: &mut Vec<String>) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                if let Some(module) = imported_name(&name, source) {
                    imports.push(module);
                }
            }
            return;
        }

        "import_from_statement" => {
            let Some(module_node) = node.child_by_field_name("module_name") else {
                return;
            };
            let module = get_text(&module_node, source);

            let mut cursor = node.walk();
            let wildcard = node
                .named_children(&mut cursor)
                .any(|c| c.kind() == "wildcard_import");
            if wildcard {
                return;
            }

            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                if let Some(symbol) = imported_name(&name, source) {
                    if module.ends_with('.') {
                        imports.push(format!("{}{}", module, symbol));
                    } else {
                        imports.push(format!("{}.{}", module, symbol));
                    }
                }
            }
            return;
        }

        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_imports(&child, source, imports);
    }
}

/// The imported (not aliased) name of a `dotted_name` or `aliased_import`.
fn imported_name(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "dotted_name" => Some(get_text(node, source)),
        "aliased_import" => node
            .child_by_field_name("name")
            .map(|n| get_text(&n, source)),
        _ => None,
    }
}
