//! The emitter (spec §4.5): orders declarations, appends inferred variable
//! types, rebuilds namespace bodies from their recursively extracted
//! members, and joins everything into the final `.d.ts` text.

use crate::inferencer::infer_variable_type;
use crate::model::{DeclKind, Declaration};
use crate::resolver::PruneResult;

pub fn emit(declarations: &[Declaration], pruned: &PruneResult, triple_slash: &[String]) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if !triple_slash.is_empty() {
        blocks.push(triple_slash.join("\n"));
    }

    if !pruned.kept_imports.is_empty() {
        let lines: Vec<String> = pruned.kept_imports.iter().map(render_with_comments).collect();
        blocks.push(lines.join("\n"));
    }

    let relevant: Vec<&Declaration> = declarations
        .iter()
        .filter(|d| d.kind != DeclKind::Import)
        .filter(|d| d.is_exported || (d.kind == DeclKind::Interface && pruned.needed_interfaces.contains(&d.name)))
        .collect();

    let mut type_reexports: Vec<&Declaration> =
        relevant.iter().copied().filter(|d| d.kind == DeclKind::Export && d.is_type_only).collect();
    type_reexports.sort_by_key(|d| d.order);
    for d in &type_reexports {
        blocks.push(render_with_comments(d));
    }

    let mut other: Vec<&Declaration> =
        relevant.iter().copied().filter(|d| d.kind != DeclKind::Export && !is_default_bucket(d)).collect();
    other.sort_by_key(|d| d.order);
    for d in &other {
        blocks.push(render_with_comments(d));
    }

    let mut value_reexports: Vec<&Declaration> = relevant
        .iter()
        .copied()
        .filter(|d| d.kind == DeclKind::Export && !d.is_type_only && d.name != "export=")
        .collect();
    value_reexports.sort_by_key(|d| d.order);
    for d in &value_reexports {
        blocks.push(render_with_comments(d));
    }

    let mut default_section: Vec<&Declaration> = relevant.iter().copied().filter(|d| is_default_bucket(d)).collect();
    default_section.sort_by_key(|d| d.order);
    for d in &default_section {
        blocks.push(render_with_comments(d));
    }

    let mut out = blocks.join("\n\n").replace("\r\n", "\n");
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn is_default_bucket(d: &Declaration) -> bool {
    d.is_default_export_value
        || ((d.kind == DeclKind::Function || d.kind == DeclKind::Class) && d.is_default)
        || (d.kind == DeclKind::Export && d.name == "export=")
}

fn render_with_comments(d: &Declaration) -> String {
    let body = render_declaration(d);
    if d.leading_comments.is_empty() { body } else { format!("{}\n{}", d.leading_comments.join("\n"), body) }
}

fn render_declaration(d: &Declaration) -> String {
    match d.kind {
        DeclKind::Variable => {
            let is_const = d.text.split_whitespace().any(|w| w == "const");
            let ty = infer_variable_type(d.value.as_deref(), d.type_annotation.as_deref(), is_const);
            let mut line = format!("{}: {};", d.text, ty);
            if d.is_default_export_value {
                line.push('\n');
                line.push_str("export default _default;");
            }
            line
        }
        // Named namespaces: the extractor only built the header; the body
        // comes from recursively rendering `nested`, indented one level.
        // Ambient/quoted modules already carry their full body verbatim in
        // `text` (it contains a brace already), so they skip this arm.
        DeclKind::Module if !d.text.contains('{') => {
            if d.nested.is_empty() {
                format!("{} {{}}", d.text)
            } else {
                let body = d.nested.iter().map(|n| indent(&render_nested(n))).collect::<Vec<_>>().join("\n\n");
                format!("{} {{\n{}\n}}", d.text, body)
            }
        }
        _ => d.text.clone(),
    }
}

/// Renders a declaration that lives inside a namespace/ambient-module body.
/// Its own `declare` was only ever meaningful at file scope; a member of an
/// already-ambient namespace repeating it is invalid `.d.ts` (TS1038).
fn render_nested(d: &Declaration) -> String {
    let body = strip_declare(&render_declaration(d));
    if d.leading_comments.is_empty() { body } else { format!("{}\n{}", d.leading_comments.join("\n"), body) }
}

fn strip_declare(text: &str) -> String {
    if let Some(rest) = text.strip_prefix("export declare ") {
        format!("export {rest}")
    } else if let Some(rest) = text.strip_prefix("declare ") {
        rest.to_string()
    } else {
        text.to_string()
    }
}

fn indent(text: &str) -> String {
    text.lines().map(|l| if l.is_empty() { l.to_string() } else { format!("  {l}") }).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Declaration;
    use crate::resolver::prune;

    fn exported_var(name: &str, value: &str) -> Declaration {
        let mut d = Declaration::new(DeclKind::Variable, name, 0);
        d.is_exported = true;
        d.value = Some(value.to_string());
        d.text = format!("export declare const {name}");
        d
    }

    #[test]
    fn variable_gets_inferred_type_appended() {
        let decls = vec![exported_var("count", "1")];
        let pruned = prune(&decls, &[]);
        let out = emit(&decls, &pruned, &[]);
        assert_eq!(out.trim(), "export declare const count: 1;");
    }

    #[test]
    fn default_export_value_rendered_last_as_two_lines() {
        let mut d = Declaration::new(DeclKind::Variable, "_default", 5);
        d.is_exported = true;
        d.is_default = true;
        d.is_default_export_value = true;
        d.value = Some("{ a: 1 }".to_string());
        d.text = "declare const _default".to_string();
        let mut f = exported_var("x", "1");
        f.order = 0;
        let decls = vec![f, d];
        let pruned = prune(&decls, &[]);
        let out = emit(&decls, &pruned, &[]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "export declare const x: 1;");
        assert!(out.contains("declare const _default: { a: 1 };"));
        assert!(out.trim_end().ends_with("export default _default;"));
    }

    #[test]
    fn named_namespace_renders_indented_nested_body() {
        let mut inner = exported_var("inner", "1");
        inner.order = 0;
        let mut ns = Declaration::new(DeclKind::Module, "NS", 0);
        ns.is_exported = true;
        ns.text = "export declare namespace NS".to_string();
        ns.nested = vec![inner];
        let decls = vec![ns];
        let pruned = prune(&decls, &[]);
        let out = emit(&decls, &pruned, &[]);
        // `declare` only belongs at file scope; a member of an already-ambient
        // namespace repeating it is invalid `.d.ts` (TS1038).
        assert!(out.contains("export declare namespace NS {\n  export const inner: 1;\n}"));
    }

    #[test]
    fn namespace_member_without_export_loses_declare_too() {
        let mut inner = Declaration::new(DeclKind::Function, "helper", 0);
        inner.text = "declare function helper(): void;".to_string();
        let mut ns = Declaration::new(DeclKind::Module, "NS", 0);
        ns.is_exported = true;
        ns.text = "export declare namespace NS".to_string();
        ns.nested = vec![inner];
        let decls = vec![ns];
        let pruned = prune(&decls, &[]);
        let out = emit(&decls, &pruned, &[]);
        assert!(out.contains("export declare namespace NS {\n  function helper(): void;\n}"));
    }

    #[test]
    fn nested_namespace_inside_namespace_loses_outer_declare() {
        let mut leaf = exported_var("value", "1");
        leaf.order = 0;
        let mut inner_ns = Declaration::new(DeclKind::Module, "Inner", 0);
        inner_ns.is_exported = true;
        inner_ns.text = "export declare namespace Inner".to_string();
        inner_ns.nested = vec![leaf];
        let mut outer_ns = Declaration::new(DeclKind::Module, "Outer", 0);
        outer_ns.is_exported = true;
        outer_ns.text = "export declare namespace Outer".to_string();
        outer_ns.nested = vec![inner_ns];
        let decls = vec![outer_ns];
        let pruned = prune(&decls, &[]);
        let out = emit(&decls, &pruned, &[]);
        assert!(out.contains("export namespace Inner {\n    export const value: 1;\n  }"));
    }

    #[test]
    fn unexported_interface_dropped_unless_needed() {
        let mut iface = Declaration::new(DeclKind::Interface, "Hidden", 0);
        iface.text = "declare interface Hidden {}".to_string();
        let decls = vec![iface];
        let pruned = prune(&decls, &[]);
        let out = emit(&decls, &pruned, &[]);
        assert!(out.is_empty());
    }
}
