//! The extractor (spec §4.2): walks the parser's top-level node list and
//! produces one `Declaration` per item, with `text` already in its final
//! DTS-ready shape for every kind except `Variable` (left as a prefix; see
//! `model::Declaration` docs) — mirroring the emitter exception list.

use dtsx_common::comments::CommentRange;
use dtsx_common::{Span, get_comment_ranges, split_top_level_commas};
use dtsx_parser::{Arena, Modifier, Node, NodeId, NodeKind, ParseResult};

use crate::model::{ClassMember, ClassMemberKind, DeclKind, Declaration, ModifierList};

pub fn extract(source: &str, parse: &ParseResult, keep_comments: bool) -> Vec<Declaration> {
    let comments = if keep_comments { get_comment_ranges(source) } else { Vec::new() };
    extract_nodes(source, &parse.arena, &parse.top_level, &comments, keep_comments)
}

/// Shared by the top-level walk and by named-namespace bodies, whose
/// members live in the same arena (see `dtsx_parser`'s nested-block
/// remapping).
fn extract_nodes(
    source: &str,
    arena: &Arena,
    node_ids: &[NodeId],
    comments: &[CommentRange],
    keep_comments: bool,
) -> Vec<Declaration> {
    let overload_names = overload_signature_names(arena, node_ids, source);
    let mut out = Vec::new();
    let mut prev_end = node_ids.first().map(|id| arena.get(*id).span.start).unwrap_or(0);

    for &id in node_ids {
        let node = arena.get(id);
        let leading = if keep_comments {
            leading_comments_for(comments, source, prev_end, node.span.start)
        } else {
            Vec::new()
        };
        prev_end = node.span.end;

        match node.kind {
            Some(NodeKind::Import) => out.push(build_import_decl(node, source, leading)),
            Some(NodeKind::ImportEquals) => out.push(build_import_equals_decl(node, source, leading)),
            Some(NodeKind::Variable) => {
                out.extend(build_variable_decls(node, arena, source, leading));
            }
            Some(NodeKind::Function) => {
                let name = node.name.map(|s| s.text(source).to_string()).unwrap_or_default();
                if node.body.is_none() || !overload_names.contains(&name) {
                    out.push(build_function_decl(node, source, leading, false));
                }
            }
            Some(NodeKind::Class) => out.push(build_class_decl(node, arena, source, leading, false)),
            Some(NodeKind::Interface) => out.push(build_interface_decl(node, source, leading)),
            Some(NodeKind::TypeAlias) => out.push(build_type_alias_decl(node, source, leading)),
            Some(NodeKind::Enum) => out.push(build_enum_decl(node, source, leading)),
            Some(NodeKind::Module) => out.push(build_module_decl(node, arena, source, leading, comments, keep_comments)),
            Some(NodeKind::ExportDefault) => {
                if let Some(d) = build_export_default_decl(node, arena, source, leading) {
                    out.push(d);
                }
            }
            Some(NodeKind::ExportAssignment) => out.push(build_export_assignment_decl(node, source, leading)),
            Some(NodeKind::ExportStar) => out.push(build_export_star_decl(node, source, leading)),
            Some(NodeKind::ExportNamed) => out.push(build_export_named_decl(node, source, leading)),
            _ => {}
        }
    }
    out
}

/// Names of functions that have at least one body-less overload signature
/// among the given node list — those names' standalone bodies (the single
/// implementation signature) are folded away by the caller, keeping only
/// the overload signatures themselves (§4.2 "Function overload sets").
fn overload_signature_names(arena: &Arena, node_ids: &[NodeId], source: &str) -> rustc_hash::FxHashSet<String> {
    let mut names = rustc_hash::FxHashSet::default();
    for &id in node_ids {
        let node = arena.get(id);
        if node.kind == Some(NodeKind::Function) && node.body.is_none() {
            if let Some(name_span) = node.name {
                names.insert(name_span.text(source).to_string());
            }
        }
    }
    names
}

// ---- shared field readers ----

fn text_of(span: Option<Span>, source: &str) -> Option<String> {
    span.map(|s| s.text(source).trim().to_string())
}

fn name_of(node: &Node, source: &str) -> String {
    text_of(node.name, source).unwrap_or_default()
}

fn retained_modifiers(node: &Node) -> ModifierList {
    node.modifiers.iter().copied().filter(|m| !matches!(m, Modifier::Export | Modifier::Default)).collect()
}

fn export_prefix(node: &Node) -> &'static str {
    if node.has_modifier(Modifier::Default) {
        "export default "
    } else if node.has_modifier(Modifier::Export) {
        "export "
    } else {
        ""
    }
}

fn ensure_semi(mut s: String) -> String {
    let trimmed = s.trim_end();
    if !trimmed.ends_with(';') {
        s = format!("{};", trimmed);
    } else if trimmed.len() != s.len() {
        s = trimmed.to_string();
    }
    s
}

// ---- imports ----

fn build_import_decl(node: &Node, source: &str, leading: Vec<String>) -> Declaration {
    let specifier = text_of(node.module_specifier, source).map(|s| unquote(&s));
    let order = node.span.start;
    let mut d = Declaration::new(DeclKind::Import, specifier.clone().unwrap_or_default(), order);
    d.leading_comments = leading;
    d.is_side_effect = node.is_side_effect_import;
    d.is_type_only = node.is_type_only;
    d.source = specifier;
    d.text = normalize_import_text(node.text(source));
    d
}

fn build_import_equals_decl(node: &Node, source: &str, leading: Vec<String>) -> Declaration {
    let name = name_of(node, source);
    let order = node.span.start;
    let mut d = Declaration::new(DeclKind::Import, name, order);
    d.leading_comments = leading;
    // `import X = require(...)`/`import X = A.B.C` is a local alias binding
    // with no module-specifier string to prune against; always retain it,
    // the same way side-effect imports are always retained.
    d.is_side_effect = true;
    d.text = ensure_semi(node.text(source).trim().to_string());
    d
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 {
        let bytes = s.as_bytes();
        if (bytes[0] == b'\'' || bytes[0] == b'"') && bytes[bytes.len() - 1] == bytes[0] {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

fn normalize_import_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = String::new();
    let bytes = trimmed.as_bytes();
    let mut i = 0usize;
    let mut replaced = false;
    while i < bytes.len() {
        if !replaced && bytes[i] == b'"' {
            if let Some(rel_end) = trimmed[i + 1..].find('"') {
                let end = i + 1 + rel_end;
                out.push('\'');
                out.push_str(&trimmed[i + 1..end]);
                out.push('\'');
                i = end + 1;
                replaced = true;
                continue;
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    ensure_semi(out)
}

// ---- variables ----

fn build_variable_decls(node: &Node, arena: &Arena, source: &str, leading: Vec<String>) -> Vec<Declaration> {
    let kw = text_of(node.keyword, source).unwrap_or_else(|| "const".to_string());
    let is_exported = node.has_modifier(Modifier::Export);
    let export_kw = if is_exported { "export " } else { "" };
    node.members
        .iter()
        .enumerate()
        .map(|(i, &decl_id)| {
            let decl = arena.get(decl_id);
            let name = name_of(decl, source);
            let mut d = Declaration::new(DeclKind::Variable, name.clone(), decl.span.start);
            if i == 0 {
                d.leading_comments = leading.clone();
            }
            d.is_exported = is_exported;
            d.type_annotation = text_of(decl.type_annotation, source);
            d.value = text_of(decl.value, source);
            d.text = format!("{export_kw}declare {kw} {name}");
            d
        })
        .collect()
}

// ---- functions ----

fn build_function_decl(node: &Node, source: &str, leading: Vec<String>, force_default: bool) -> Declaration {
    let name = node.name.map(|s| s.text(source).to_string()).unwrap_or_else(|| "default".to_string());
    let mut d = Declaration::new(DeclKind::Function, name.clone(), node.span.start);
    d.leading_comments = leading;
    d.is_exported = node.has_modifier(Modifier::Export) || force_default;
    d.is_default = node.has_modifier(Modifier::Default) || force_default;
    d.modifiers = retained_modifiers(node);
    d.generics = text_of(node.generics, source);
    let params = text_of(node.params, source).unwrap_or_else(|| "()".to_string());
    let ret = text_of(node.return_type, source).unwrap_or_else(|| "void".to_string());
    let star = if node.has_modifier(Modifier::Generator) { "*" } else { "" };
    let prefix = if d.is_default {
        "export default "
    } else if d.is_exported {
        "export "
    } else {
        ""
    };
    let decl_kw = if d.is_default { "" } else { "declare " };
    let generics = d.generics.clone().unwrap_or_default();
    d.text = format!("{prefix}{decl_kw}function{star} {name}{generics}{params}: {ret};");
    d
}

// ---- classes ----

const PARAM_PROPERTY_MODIFIERS: &[&str] = &["public", "private", "protected", "readonly"];

fn build_class_decl(node: &Node, arena: &Arena, source: &str, leading: Vec<String>, force_default: bool) -> Declaration {
    let name = name_of(node, source);
    let mut d = Declaration::new(DeclKind::Class, name.clone(), node.span.start);
    d.leading_comments = leading;
    d.is_exported = node.has_modifier(Modifier::Export) || force_default;
    d.is_default = node.has_modifier(Modifier::Default) || force_default;
    d.modifiers = retained_modifiers(node);
    d.generics = text_of(node.generics, source);
    d.extends = text_of(node.heritage, source).filter(|s| !s.is_empty());

    for &mid in &node.members {
        let m = arena.get(mid);
        if m.has_modifier(Modifier::Private) {
            continue;
        }
        let mname = name_of(m, source);
        if mname.starts_with('#') {
            continue;
        }
        if mname == "constructor" && m.params.is_some() {
            let (ctor_text, fields) = build_constructor_members(m, source);
            d.members.push(ClassMember { kind: ClassMemberKind::Method, name: mname, text: ctor_text });
            d.members.extend(fields);
            continue;
        }
        if let Some(member) = build_class_member(m, source) {
            d.members.push(member);
        }
    }

    let prefix = if d.is_default {
        "export default "
    } else if d.is_exported {
        "export "
    } else {
        ""
    };
    let abstract_kw = if node.has_modifier(Modifier::Abstract) { "abstract " } else { "" };
    let decl_kw = if d.is_default { "" } else { "declare " };
    let generics = d.generics.clone().unwrap_or_default();
    let extends_clause = d.extends.as_ref().map(|e| format!(" {e}")).unwrap_or_default();
    let body_lines: Vec<String> = d.members.iter().map(|m| format!("  {}", m.text)).collect();
    let body = if body_lines.is_empty() { "{}".to_string() } else { format!("{{\n{}\n}}", body_lines.join("\n")) };
    d.text = format!("{prefix}{decl_kw}{abstract_kw}class {name}{generics}{extends_clause} {body}");
    d
}

fn build_class_member(m: &Node, source: &str) -> Option<ClassMember> {
    let name = name_of(m, source);
    if name.is_empty() {
        return None;
    }
    let mods_prefix = modifier_prefix(m);
    let optional = if m.is_optional { "?" } else { "" };
    if m.is_getter {
        let params = text_of(m.params, source).unwrap_or_else(|| "()".to_string());
        let ret = text_of(m.return_type, source).unwrap_or_else(|| "unknown".to_string());
        let text = format!("{mods_prefix}get {name}{params}: {ret};");
        return Some(ClassMember { kind: ClassMemberKind::Getter, name, text });
    }
    if m.is_setter {
        let params = text_of(m.params, source).unwrap_or_else(|| "()".to_string());
        let text = format!("{mods_prefix}set {name}{params};");
        return Some(ClassMember { kind: ClassMemberKind::Setter, name, text });
    }
    if m.params.is_some() {
        let generics = text_of(m.generics, source).unwrap_or_default();
        let params = text_of(m.params, source).unwrap_or_else(|| "()".to_string());
        let ret = text_of(m.return_type, source).unwrap_or_else(|| "void".to_string());
        let star = if m.has_modifier(Modifier::Generator) { "*" } else { "" };
        let text = format!("{mods_prefix}{star}{name}{optional}{generics}{params}: {ret};");
        return Some(ClassMember { kind: ClassMemberKind::Method, name, text });
    }
    let ty = text_of(m.type_annotation, source).unwrap_or_else(|| "unknown".to_string());
    let text = format!("{mods_prefix}{name}{optional}: {ty};");
    Some(ClassMember { kind: ClassMemberKind::Field, name, text })
}

fn modifier_prefix(m: &Node) -> String {
    let mut parts = Vec::new();
    for modifier in &m.modifiers {
        if let Some(kw) = modifier_keyword(*modifier) {
            parts.push(kw);
        }
    }
    if parts.is_empty() { String::new() } else { format!("{} ", parts.join(" ")) }
}

fn modifier_keyword(m: Modifier) -> Option<&'static str> {
    match m {
        Modifier::Static => Some("static"),
        Modifier::Abstract => Some("abstract"),
        Modifier::Override => Some("override"),
        Modifier::Readonly => Some("readonly"),
        Modifier::Protected => Some("protected"),
        Modifier::Public => Some("public"),
        Modifier::Private | Modifier::Export | Modifier::Default | Modifier::Const | Modifier::Async | Modifier::Generator | Modifier::Declare => None,
    }
}

fn build_constructor_members(m: &Node, source: &str) -> (String, Vec<ClassMember>) {
    let params_raw = text_of(m.params, source).unwrap_or_else(|| "()".to_string());
    let inner = if params_raw.len() >= 2 { &params_raw[1..params_raw.len() - 1] } else { "" };
    let mut cleaned = Vec::new();
    let mut fields = Vec::new();
    for part in split_top_level_commas(inner) {
        let p = part.text(inner).trim();
        if p.is_empty() {
            continue;
        }
        let (mods, rest) = strip_leading_modifiers(p, PARAM_PROPERTY_MODIFIERS);
        cleaned.push(rest.to_string());
        let is_private = mods.contains(&"private");
        let is_property = mods.iter().any(|m| matches!(*m, "public" | "protected" | "readonly"));
        if is_property && !is_private {
            if let Some((key, ty)) = dtsx_common::split_first_top_level_colon(rest) {
                let key_text = key.text(rest).trim();
                let ty_text = ty.text(rest).trim();
                let readonly = if mods.contains(&"readonly") { "readonly " } else { "" };
                fields.push(ClassMember {
                    kind: ClassMemberKind::Field,
                    name: key_text.trim_end_matches('?').to_string(),
                    text: format!("{readonly}{key_text}: {ty_text};"),
                });
            }
        }
    }
    (format!("constructor({});", cleaned.join(", ")), fields)
}

fn strip_leading_modifiers<'a>(mut text: &'a str, words: &[&str]) -> (Vec<&'a str>, &'a str) {
    let mut mods = Vec::new();
    loop {
        let mut matched = None;
        for &word in words {
            if let Some(after) = text.strip_prefix(word) {
                if after.starts_with(|c: char| c.is_whitespace()) {
                    matched = Some((word, after.trim_start()));
                    break;
                }
            }
        }
        match matched {
            Some((word, rest)) => {
                mods.push(word);
                text = rest;
            }
            None => break,
        }
    }
    (mods, text)
}

// ---- interfaces / types / enums ----

fn build_interface_decl(node: &Node, source: &str, leading: Vec<String>) -> Declaration {
    let name = name_of(node, source);
    let mut d = Declaration::new(DeclKind::Interface, name.clone(), node.span.start);
    d.leading_comments = leading;
    d.is_exported = node.has_modifier(Modifier::Export);
    d.generics = text_of(node.generics, source);
    d.extends = text_of(node.heritage, source).filter(|s| !s.is_empty());
    let body = text_of(node.body, source).unwrap_or_else(|| "{}".to_string());
    let export_kw = if d.is_exported { "export " } else { "" };
    let generics = d.generics.clone().unwrap_or_default();
    let extends_clause = d.extends.as_ref().map(|e| format!(" {e}")).unwrap_or_default();
    d.text = format!("{export_kw}declare interface {name}{generics}{extends_clause} {body}");
    d
}

fn build_type_alias_decl(node: &Node, source: &str, leading: Vec<String>) -> Declaration {
    let name = name_of(node, source);
    let mut d = Declaration::new(DeclKind::Type, name.clone(), node.span.start);
    d.leading_comments = leading;
    d.is_exported = node.has_modifier(Modifier::Export);
    d.generics = text_of(node.generics, source);
    d.value = text_of(node.value, source);
    let export_kw = if d.is_exported { "export " } else { "" };
    let generics = d.generics.clone().unwrap_or_default();
    let value = d.value.clone().unwrap_or_else(|| "unknown".to_string());
    d.text = format!("{export_kw}declare type {name}{generics} = {value};");
    d
}

fn build_enum_decl(node: &Node, source: &str, leading: Vec<String>) -> Declaration {
    let name = name_of(node, source);
    let mut d = Declaration::new(DeclKind::Enum, name.clone(), node.span.start);
    d.leading_comments = leading;
    d.is_exported = node.has_modifier(Modifier::Export);
    let is_const = node.has_modifier(Modifier::Const);
    let body = text_of(node.body, source).unwrap_or_else(|| "{}".to_string());
    let export_kw = if d.is_exported { "export " } else { "" };
    let const_kw = if is_const { "const " } else { "" };
    d.text = format!("{export_kw}declare {const_kw}enum {name} {body}");
    d
}

// ---- namespaces / modules ----

fn build_module_decl(
    node: &Node,
    arena: &Arena,
    source: &str,
    leading: Vec<String>,
    comments: &[CommentRange],
    keep_comments: bool,
) -> Declaration {
    if node.is_declare_global {
        let mut d = Declaration::new(DeclKind::Module, "global".to_string(), node.span.start);
        d.leading_comments = leading;
        d.is_declare_global = true;
        d.text = node.text(source).trim().to_string();
        return d;
    }
    let raw_name = node.name.map(|s| s.text(source)).unwrap_or_default();
    let is_quoted = raw_name.starts_with('\'') || raw_name.starts_with('"');
    if is_quoted {
        let mut d = Declaration::new(DeclKind::Module, unquote(raw_name), node.span.start);
        d.leading_comments = leading;
        let mut text = node.text(source).trim().to_string();
        if !text.starts_with("declare") {
            text = format!("declare {text}");
        }
        d.text = text;
        return d;
    }
    let name = raw_name.trim().to_string();
    let mut d = Declaration::new(DeclKind::Module, name.clone(), node.span.start);
    d.leading_comments = leading;
    d.is_exported = node.has_modifier(Modifier::Export);
    d.nested = extract_nodes(source, arena, &node.members, comments, keep_comments);
    let export_kw = if d.is_exported { "export " } else { "" };
    d.text = format!("{export_kw}declare namespace {name}");
    d
}

// ---- exports ----

fn build_export_default_decl(node: &Node, arena: &Arena, source: &str, leading: Vec<String>) -> Option<Declaration> {
    if let Some(&inner_id) = node.members.first() {
        let inner = arena.get(inner_id);
        return match inner.kind {
            Some(NodeKind::Function) => Some(build_function_decl(inner, source, leading, true)),
            Some(NodeKind::Class) => Some(build_class_decl(inner, arena, source, leading, true)),
            _ => None,
        };
    }
    let value = text_of(node.value, source).unwrap_or_else(|| "unknown".to_string());
    let mut d = Declaration::new(DeclKind::Variable, "_default".to_string(), node.span.start);
    d.leading_comments = leading;
    d.is_exported = true;
    d.is_default = true;
    d.is_default_export_value = true;
    d.value = Some(value);
    d.text = "declare const _default".to_string();
    Some(d)
}

fn build_export_assignment_decl(node: &Node, source: &str, leading: Vec<String>) -> Declaration {
    let value = text_of(node.value, source).unwrap_or_default();
    let mut d = Declaration::new(DeclKind::Export, "export=".to_string(), node.span.start);
    d.leading_comments = leading;
    d.is_exported = true;
    d.text = ensure_semi(format!("export = {value}"));
    d
}

fn build_export_star_decl(node: &Node, source: &str, leading: Vec<String>) -> Declaration {
    let alias = node.name.map(|s| s.text(source).to_string());
    let specifier = text_of(node.module_specifier, source).map(|s| unquote(&s)).unwrap_or_default();
    let mut d = Declaration::new(DeclKind::Export, format!("*{}", alias.clone().unwrap_or_default()), node.span.start);
    d.leading_comments = leading;
    d.is_exported = true;
    d.source = Some(specifier.clone());
    d.text = match &alias {
        Some(a) => format!("export * as {a} from '{specifier}';"),
        None => format!("export * from '{specifier}';"),
    };
    d
}

fn build_export_named_decl(node: &Node, source: &str, leading: Vec<String>) -> Declaration {
    let specifier = text_of(node.module_specifier, source).map(|s| unquote(&s));
    let mut d = Declaration::new(
        DeclKind::Export,
        specifier.clone().unwrap_or_else(|| "local".to_string()),
        node.span.start,
    );
    d.leading_comments = leading;
    d.is_exported = true;
    d.is_type_only = node.is_type_only;
    d.source = specifier;
    d.text = ensure_semi(node.text(source).trim().to_string());
    d
}

// ---- comment attachment ----

fn leading_comments_for(comments: &[CommentRange], source: &str, prev_end: u32, node_start: u32) -> Vec<String> {
    let mut collected = Vec::new();
    let mut boundary = node_start;
    for c in comments.iter().rev() {
        if c.span.start < prev_end || c.span.end > boundary {
            continue;
        }
        if c.followed_by_blank_line {
            break;
        }
        collected.push(c.span.text(source).to_string());
        boundary = c.span.start;
    }
    collected.reverse();
    collected
}
