//! Top-level statement parser.
//!
//! Classifies each top-level statement by its leading keyword/modifier
//! sequence, then captures the sub-spans the extractor (spec §4.2) and
//! emitter (spec §4.5) need to reconstruct a DTS-ready form, without
//! building a full expression grammar (see `node` module docs).

use dtsx_common::{LineMap, ParseError, Span};
use dtsx_scanner::{Scanner, SyntaxKind};

use crate::cursor::Cursor;
use crate::node::{Arena, Modifier, Node, NodeId, NodeKind};

pub struct ParseResult {
    pub arena: Arena,
    pub top_level: Vec<NodeId>,
    pub errors: Vec<ParseError>,
}

pub fn parse_program(source: &str) -> ParseResult {
    let tokens = Scanner::new(source).tokenize();
    let line_map = LineMap::new(source);
    let mut p = Parser {
        source,
        cursor: Cursor::new(&tokens),
        arena: Arena::default(),
        errors: Vec::new(),
        line_map,
    };
    let top_level = p.parse_top_level();
    ParseResult { arena: p.arena, top_level, errors: p.errors }
}

struct Parser<'s> {
    source: &'s str,
    cursor: Cursor<'s>,
    arena: Arena,
    errors: Vec<ParseError>,
    line_map: LineMap,
}

const MODIFIER_WORDS: &[(&str, Modifier)] = &[
    ("declare", Modifier::Declare),
    ("abstract", Modifier::Abstract),
    ("async", Modifier::Async),
    ("public", Modifier::Public),
    ("private", Modifier::Private),
    ("protected", Modifier::Protected),
    ("readonly", Modifier::Readonly),
    ("static", Modifier::Static),
    ("override", Modifier::Override),
];

impl<'s> Parser<'s> {
    fn error(&mut self, offset: u32, message: impl Into<String>) {
        let pos = self.line_map.position(offset);
        self.errors.push(ParseError::new(pos.line, pos.column, message.into()));
    }

    fn skip_decorators(&mut self) {
        while self.cursor.is_punct("@") {
            self.cursor.advance();
            // decorator name / member access chain
            while self.cursor.peek().kind == SyntaxKind::Identifier || self.cursor.is_punct(".") {
                self.cursor.advance();
            }
            if self.cursor.is_punct("(") {
                self.cursor.consume_balanced("(", ")");
            }
        }
    }

    fn parse_top_level(&mut self) -> Vec<NodeId> {
        let mut out = Vec::new();
        loop {
            while self.cursor.eat_punct(";") {}
            if self.cursor.at_end() {
                break;
            }
            let before = self.cursor.pos;
            if let Some(id) = self.parse_statement() {
                out.push(id);
            }
            if self.cursor.pos == before {
                // Nothing consumed: avoid an infinite loop on unparsable
                // input by forcing one token of progress.
                self.cursor.advance();
            }
        }
        out
    }

    fn parse_statement(&mut self) -> Option<NodeId> {
        self.skip_decorators();
        let start = self.cursor.cur_start();
        let mut modifiers = Vec::new();

        if self.cursor.is_ident("export") {
            self.cursor.advance();
            if self.cursor.eat_ident("default") {
                return Some(self.parse_export_default(start));
            }
            if self.cursor.is_punct("=") {
                return Some(self.parse_export_assignment(start));
            }
            if self.cursor.is_punct("*") {
                return Some(self.parse_export_star(start));
            }
            if self.cursor.is_punct("{") || (self.cursor.is_ident("type") && self.cursor.peek_at(1).is_punct("{"))
            {
                return Some(self.parse_export_named(start));
            }
            modifiers.push(Modifier::Export);
        }

        self.skip_decorators();
        loop {
            let Some(&(_, m)) = MODIFIER_WORDS.iter().find(|(w, _)| self.cursor.is_ident(w)) else {
                break;
            };
            modifiers.push(m);
            self.cursor.advance();
        }

        if self.cursor.is_ident("global") && modifiers.contains(&Modifier::Declare) {
            return Some(self.parse_declare_global(start, modifiers));
        }

        match self.cursor.peek().text.as_str() {
            "import" => Some(self.parse_import(start)),
            "const" if self.cursor.peek_at(1).is_ident("enum") => {
                Some(self.parse_enum(start, modifiers, true))
            }
            "const" => Some(self.parse_variable(start, modifiers, "const")),
            "let" => Some(self.parse_variable(start, modifiers, "let")),
            "var" => Some(self.parse_variable(start, modifiers, "var")),
            "function" => Some(self.parse_function(start, modifiers)),
            "class" => Some(self.parse_class(start, modifiers)),
            "interface" => Some(self.parse_interface(start, modifiers)),
            "type" => Some(self.parse_type_alias(start, modifiers)),
            "enum" => Some(self.parse_enum(start, modifiers, false)),
            "namespace" | "module" => Some(self.parse_module(start, modifiers)),
            _ => {
                let tok = self.cursor.peek().clone();
                self.error(tok.span.start, format!("unexpected token '{}' at top level", tok.text));
                // Recover: skip to the next `;`, top-level `}`, or the next
                // token that looks like a fresh statement start, so one
                // malformed statement doesn't swallow the next valid one.
                self.cursor.scan_until(|t, depth| {
                    depth == 0 && (t.is_punct(";") || t.is_punct("}") || is_stmt_start_keyword(t))
                });
                self.cursor.eat_punct(";");
                None
            }
        }
    }

    // ---- imports ----

    fn parse_import(&mut self, start: u32) -> NodeId {
        self.cursor.advance(); // 'import'
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::Import);

        if self.cursor.peek().kind == SyntaxKind::StringLiteral {
            // side-effect import: import "mod";
            let spec = self.cursor.advance();
            node.module_specifier = Some(spec.span);
            node.is_side_effect_import = true;
            self.finish_stmt(&mut node, start);
            return self.arena.push(node);
        }

        // import equals: import X = require("mod"); / import X = A.B.C;
        if self.cursor.peek().kind == SyntaxKind::Identifier && self.cursor.peek_at(1).is_punct("=") {
            node.kind = Some(NodeKind::ImportEquals);
            let name = self.cursor.advance();
            node.name = Some(name.span);
            self.cursor.advance(); // '='
            let value = self.cursor.scan_until(|t, depth| depth == 0 && t.is_punct(";"));
            node.value = Some(value);
            self.finish_stmt(&mut node, start);
            return self.arena.push(node);
        }

        if self.cursor.eat_ident("type") && !self.cursor.is_punct(",") && !self.cursor.is_ident("from")
        {
            node.is_type_only = true;
        }

        // default / namespace / named bindings, then 'from' "mod"
        self.cursor.scan_until(|t, depth| depth == 0 && t.is_ident("from"));
        self.cursor.eat_ident("from");
        if self.cursor.peek().kind == SyntaxKind::StringLiteral {
            let spec = self.cursor.advance();
            node.module_specifier = Some(spec.span);
        }
        // attribute clause: `with { type: "json" }` / legacy `assert {...}`
        if self.cursor.is_ident("with") || self.cursor.is_ident("assert") {
            self.cursor.advance();
            self.cursor.consume_balanced("{", "}");
        }
        self.finish_stmt(&mut node, start);
        self.arena.push(node)
    }

    // ---- exports ----

    fn parse_export_default(&mut self, start: u32) -> NodeId {
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::ExportDefault);
        node.modifiers.push(Modifier::Export);
        node.modifiers.push(Modifier::Default);

        match self.cursor.peek().text.as_str() {
            "function" | "class" => {
                let kw = self.cursor.peek().text.clone();
                let inner_start = self.cursor.cur_start();
                let inner = if kw == "function" {
                    self.parse_function(inner_start, vec![])
                } else {
                    self.parse_class(inner_start, vec![])
                };
                self.arena.get_mut(inner).modifiers.push(Modifier::Export);
                self.arena.get_mut(inner).modifiers.push(Modifier::Default);
                node.members.push(inner);
                node.span = self.arena.get(inner).span;
                return self.arena.push(node);
            }
            _ => {}
        }
        let value = self.cursor.scan_until(|t, depth| depth == 0 && t.is_punct(";"));
        node.value = Some(value);
        self.finish_stmt(&mut node, start);
        self.arena.push(node)
    }

    fn parse_export_assignment(&mut self, start: u32) -> NodeId {
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::ExportAssignment);
        self.cursor.advance(); // '='
        let value = self.cursor.scan_until(|t, depth| depth == 0 && t.is_punct(";"));
        node.value = Some(value);
        self.finish_stmt(&mut node, start);
        self.arena.push(node)
    }

    fn parse_export_star(&mut self, start: u32) -> NodeId {
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::ExportStar);
        self.cursor.advance(); // '*'
        if self.cursor.eat_ident("as") {
            let name = self.cursor.advance();
            node.name = Some(name.span);
        }
        self.cursor.eat_ident("from");
        if self.cursor.peek().kind == SyntaxKind::StringLiteral {
            let spec = self.cursor.advance();
            node.module_specifier = Some(spec.span);
        }
        self.finish_stmt(&mut node, start);
        self.arena.push(node)
    }

    fn parse_export_named(&mut self, start: u32) -> NodeId {
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::ExportNamed);
        if self.cursor.eat_ident("type") {
            node.is_type_only = true;
        }
        self.cursor.consume_balanced("{", "}");
        if self.cursor.eat_ident("from") && self.cursor.peek().kind == SyntaxKind::StringLiteral {
            let spec = self.cursor.advance();
            node.module_specifier = Some(spec.span);
        }
        self.finish_stmt(&mut node, start);
        self.arena.push(node)
    }

    fn parse_declare_global(&mut self, start: u32, modifiers: Vec<Modifier>) -> NodeId {
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::Module);
        node.modifiers = modifiers;
        self.cursor.advance(); // 'global'
        node.is_declare_global = true;
        if let Some(body) = self.cursor.consume_balanced("{", "}") {
            node.body = Some(body);
            node.members = self.parse_nested_block(body);
        }
        node.span = Span::new(start, self.cursor.prev_end());
        self.arena.push(node)
    }

    // ---- variables ----

    fn parse_variable(&mut self, start: u32, modifiers: Vec<Modifier>, kw: &str) -> NodeId {
        let kw_tok = self.cursor.advance();
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::Variable);
        node.modifiers = modifiers;
        node.keyword = Some(kw_tok.span);
        let _ = kw;

        loop {
            let decl_start = self.cursor.cur_start();
            let mut decl = Node::new(Span::new(decl_start, decl_start));
            decl.kind = Some(NodeKind::VariableDeclarator);

            // name, possibly a destructuring pattern `{ a, b }` / `[a, b]`
            if self.cursor.is_punct("{") || self.cursor.is_punct("[") {
                let open = if self.cursor.is_punct("{") { "{" } else { "[" };
                let close = if open == "{" { "}" } else { "]" };
                let pat = self.cursor.consume_balanced(open, close);
                decl.name = pat;
            } else {
                let name = self.cursor.advance();
                decl.name = Some(name.span);
            }

            if self.cursor.is_punct(":") {
                self.cursor.advance();
                let ann = self.cursor.scan_until(|t, depth| depth == 0 && (t.is_punct("=") || t.is_punct(",") || t.is_punct(";")));
                decl.type_annotation = Some(ann);
            }
            if self.cursor.eat_punct("=") {
                let val = self.cursor.scan_until(|t, depth| depth == 0 && (t.is_punct(",") || t.is_punct(";")));
                decl.value = Some(val);
            }
            decl.span = Span::new(decl_start, self.cursor.prev_end());
            let decl_id = self.arena.push(decl);
            node.members.push(decl_id);

            if !self.cursor.eat_punct(",") {
                break;
            }
        }
        self.finish_stmt(&mut node, start);
        self.arena.push(node)
    }

    // ---- functions ----

    fn parse_function(&mut self, start: u32, modifiers: Vec<Modifier>) -> NodeId {
        self.cursor.advance(); // 'function'
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::Function);
        node.modifiers = modifiers;
        if self.cursor.eat_punct("*") {
            node.modifiers.push(Modifier::Generator);
        }
        if self.cursor.peek().kind == SyntaxKind::Identifier {
            let name = self.cursor.advance();
            node.name = Some(name.span);
        }
        node.generics = self.cursor.consume_generics();
        node.params = self.cursor.consume_balanced("(", ")");
        if self.cursor.eat_punct(":") {
            let rt = self.cursor.scan_until(|t, depth| depth == 0 && (t.is_punct("{") || t.is_punct(";")));
            node.return_type = Some(rt);
        }
        if self.cursor.is_punct("{") {
            node.body = self.cursor.consume_balanced("{", "}");
        } else {
            self.cursor.eat_punct(";");
        }
        node.span = Span::new(start, self.cursor.prev_end());
        self.arena.push(node)
    }

    // ---- classes ----

    fn parse_class(&mut self, start: u32, modifiers: Vec<Modifier>) -> NodeId {
        self.cursor.advance(); // 'class'
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::Class);
        node.modifiers = modifiers;
        if self.cursor.peek().kind == SyntaxKind::Identifier {
            let name = self.cursor.advance();
            node.name = Some(name.span);
        }
        node.generics = self.cursor.consume_generics();
        let heritage_span = self.cursor.scan_until(|t, depth| depth == 0 && t.is_punct("{"));
        node.heritage = if heritage_span.is_empty() { None } else { Some(heritage_span) };
        if let Some(body) = self.cursor.consume_balanced("{", "}") {
            node.body = Some(body);
            node.members = self.parse_class_members(body);
        }
        node.span = Span::new(start, self.cursor.prev_end());
        self.arena.push(node)
    }

    fn parse_class_members(&mut self, body: Span) -> Vec<NodeId> {
        let inner = Span::new(body.start + 1, body.end.saturating_sub(1));
        let text = inner.text(self.source);
        let tokens = Scanner::new(text).tokenize();
        let mut cursor = Cursor::new(&tokens);
        let mut members = Vec::new();

        loop {
            while cursor.eat_punct(";") {}
            if cursor.at_end() {
                break;
            }
            // skip decorators on members
            while cursor.is_punct("@") {
                cursor.advance();
                while cursor.peek().kind == SyntaxKind::Identifier || cursor.is_punct(".") {
                    cursor.advance();
                }
                if cursor.is_punct("(") {
                    cursor.consume_balanced("(", ")");
                }
            }

            // static initialization block: `static { ... }`
            if cursor.is_ident("static") && cursor.peek_at(1).is_punct("{") {
                cursor.advance();
                cursor.consume_balanced("{", "}");
                continue;
            }

            let member_start = cursor.cur_start();
            let mut modifiers = Vec::new();
            loop {
                let Some(&(_, m)) = MODIFIER_WORDS.iter().find(|(w, _)| cursor.is_ident(w)) else {
                    break;
                };
                // `public`/`private` etc. are only modifiers when followed
                // by something other than `(` (method named `private(...)`
                // is vanishingly unlikely in real TS, this heuristic is
                // sufficient for well-formed isolated-declarations input).
                modifiers.push(m);
                cursor.advance();
            }

            let mut is_get = false;
            let mut is_set = false;
            if cursor.is_ident("get") && !cursor.peek_at(1).is_punct("(") {
                is_get = true;
                cursor.advance();
            } else if cursor.is_ident("set") && !cursor.peek_at(1).is_punct("(") {
                is_set = true;
                cursor.advance();
            }
            if cursor.eat_ident("async") {
                modifiers.push(Modifier::Async);
            }
            let is_generator = cursor.eat_punct("*");

            let mut member = Node::new(Span::new(member_start, member_start));
            member.kind = Some(NodeKind::ClassMember);
            member.modifiers = modifiers;
            member.is_getter = is_get;
            member.is_setter = is_set;
            if is_generator {
                member.modifiers.push(Modifier::Generator);
            }

            // private `#name`
            let is_private_hash = cursor.is_punct("#");
            if is_private_hash {
                cursor.advance();
            }
            // computed key `[expr]`
            if cursor.is_punct("[") {
                let key = cursor.consume_balanced("[", "]");
                member.name = key;
            } else if cursor.peek().kind == SyntaxKind::StringLiteral
                || cursor.peek().kind == SyntaxKind::NumericLiteral
                || cursor.peek().kind == SyntaxKind::Identifier
            {
                let name = cursor.advance();
                member.name = Some(name.span);
                if is_private_hash {
                    // extend name span left to include the `#`
                    member.name = Some(Span::new(name.span.start - 1, name.span.end));
                }
            }

            member.is_optional = cursor.eat_punct("?");
            cursor.eat_punct("!"); // definite-assignment marker, dropped in .d.ts

            if cursor.is_punct("(") || cursor.is_punct("<") {
                member.generics = cursor.consume_generics();
                member.params = cursor.consume_balanced("(", ")");
                if cursor.eat_punct(":") {
                    let rt = cursor.scan_until(|t, depth| depth == 0 && (t.is_punct("{") || t.is_punct(";")));
                    member.return_type = Some(rt);
                }
                if cursor.is_punct("{") {
                    member.body = cursor.consume_balanced("{", "}");
                } else {
                    cursor.eat_punct(";");
                }
            } else {
                if cursor.eat_punct(":") {
                    let ann = cursor.scan_until(|t, depth| depth == 0 && (t.is_punct("=") || t.is_punct(";")));
                    member.type_annotation = Some(ann);
                }
                if cursor.eat_punct("=") {
                    let val = cursor.scan_until(|t, depth| depth == 0 && t.is_punct(";"));
                    member.value = Some(val);
                }
                cursor.eat_punct(";");
            }
            member.span = Span::new(member_start, cursor.prev_end());
            // translate spans (relative to `text`) back to absolute source offsets
            offset_node(&mut member, body.start + 1);
            members.push(self.arena.push(member));
        }
        members
    }

    // ---- interfaces / type aliases / enums ----

    fn parse_interface(&mut self, start: u32, modifiers: Vec<Modifier>) -> NodeId {
        self.cursor.advance(); // 'interface'
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::Interface);
        node.modifiers = modifiers;
        if self.cursor.peek().kind == SyntaxKind::Identifier {
            let name = self.cursor.advance();
            node.name = Some(name.span);
        }
        node.generics = self.cursor.consume_generics();
        let heritage = self.cursor.scan_until(|t, depth| depth == 0 && t.is_punct("{"));
        node.heritage = if heritage.is_empty() { None } else { Some(heritage) };
        node.body = self.cursor.consume_balanced("{", "}");
        node.span = Span::new(start, self.cursor.prev_end());
        self.arena.push(node)
    }

    fn parse_type_alias(&mut self, start: u32, modifiers: Vec<Modifier>) -> NodeId {
        self.cursor.advance(); // 'type'
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::TypeAlias);
        node.modifiers = modifiers;
        if self.cursor.peek().kind == SyntaxKind::Identifier {
            let name = self.cursor.advance();
            node.name = Some(name.span);
        }
        node.generics = self.cursor.consume_generics();
        self.cursor.eat_punct("=");
        let value = self.cursor.scan_until(|t, depth| depth == 0 && t.is_punct(";"));
        node.value = Some(value);
        self.finish_stmt(&mut node, start);
        self.arena.push(node)
    }

    fn parse_enum(&mut self, start: u32, mut modifiers: Vec<Modifier>, is_const: bool) -> NodeId {
        if is_const {
            self.cursor.advance(); // 'const'
            modifiers.push(Modifier::Const);
        }
        self.cursor.advance(); // 'enum'
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::Enum);
        node.modifiers = modifiers;
        if self.cursor.peek().kind == SyntaxKind::Identifier {
            let name = self.cursor.advance();
            node.name = Some(name.span);
        }
        node.body = self.cursor.consume_balanced("{", "}");
        node.span = Span::new(start, self.cursor.prev_end());
        self.arena.push(node)
    }

    fn parse_module(&mut self, start: u32, modifiers: Vec<Modifier>) -> NodeId {
        let kw_tok = self.cursor.advance(); // 'namespace' | 'module'
        let mut node = Node::new(Span::new(start, start));
        node.kind = Some(NodeKind::Module);
        node.modifiers = modifiers;
        node.keyword = Some(kw_tok.span);
        if self.cursor.peek().kind == SyntaxKind::StringLiteral {
            let name = self.cursor.advance();
            node.name = Some(name.span);
        } else {
            let name = self.cursor.scan_until(|t, depth| depth == 0 && t.is_punct("{"));
            node.name = Some(name);
        }
        if let Some(body) = self.cursor.consume_balanced("{", "}") {
            node.body = Some(body);
            node.members = self.parse_nested_block(body);
        } else {
            self.cursor.eat_punct(";");
        }
        node.span = Span::new(start, self.cursor.prev_end());
        self.arena.push(node)
    }

    /// Re-run the top-level statement parser over a nested `{ ... }` body
    /// (namespace / `declare global`), translating spans back to absolute
    /// offsets in the original source.
    fn parse_nested_block(&mut self, body: Span) -> Vec<NodeId> {
        let inner = Span::new(body.start + 1, body.end.saturating_sub(1));
        let text = inner.text(self.source);
        let mut nested = parse_program(text);
        let base = inner.start;
        for node in nested.arena.iter_mut() {
            offset_node(node, base);
        }
        // Re-home nested node ids into this parser's arena.
        let mut remap = std::collections::HashMap::new();
        let nodes = std::mem::take(&mut nested.arena).into_vec();
        for (i, node) in nodes.into_iter().enumerate() {
            let new_id = self.arena.push(node);
            remap.insert(i as u32, new_id.0);
        }
        let remap_id = |id: NodeId| NodeId(*remap.get(&id.0).unwrap_or(&id.0));
        for id in &nested.top_level {
            let real_id = remap_id(*id);
            let members = std::mem::take(&mut self.arena.get_mut(real_id).members);
            let remapped_members: Vec<NodeId> = members.into_iter().map(remap_id).collect();
            self.arena.get_mut(real_id).members = remapped_members;
        }
        self.errors.extend(nested.errors.into_iter().map(|mut e| {
            // nested errors already computed against the sub-text's own
            // line map; approximate by leaving them as-is with a note.
            e.message = format!("(nested) {}", e.message);
            e
        }));
        nested.top_level.into_iter().map(remap_id).collect()
    }

    fn finish_stmt(&mut self, node: &mut Node, start: u32) {
        self.cursor.eat_punct(";");
        node.span = Span::new(start, self.cursor.prev_end());
    }
}

const STMT_START_KEYWORDS: &[&str] = &[
    "export", "import", "const", "let", "var", "function", "class", "interface", "type", "enum",
    "namespace", "module", "declare",
];

fn is_stmt_start_keyword(t: &dtsx_scanner::Token) -> bool {
    t.kind == SyntaxKind::Identifier && STMT_START_KEYWORDS.contains(&t.text.as_str())
}

fn offset_node(node: &mut Node, base: u32) {
    let shift = |s: Span| Span::new(s.start + base, s.end + base);
    node.span = shift(node.span);
    node.keyword = node.keyword.map(shift);
    node.name = node.name.map(shift);
    node.generics = node.generics.map(shift);
    node.heritage = node.heritage.map(shift);
    node.params = node.params.map(shift);
    node.return_type = node.return_type.map(shift);
    node.type_annotation = node.type_annotation.map(shift);
    node.body = node.body.map(shift);
    node.value = node.value.map(shift);
    node.module_specifier = node.module_specifier.map(shift);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn parse(src: &str) -> ParseResult {
        parse_program(src)
    }

    #[test]
    fn parses_simple_const() {
        let src = "export const foo: string = 'bar';";
        let r = parse(src);
        assert_eq!(r.errors, vec![]);
        assert_eq!(r.top_level.len(), 1);
        let var = r.arena.get(r.top_level[0]);
        assert_eq!(var.kind, Some(NodeKind::Variable));
        assert!(var.has_modifier(Modifier::Export));
        let decl = r.arena.get(var.members[0]);
        assert_eq!(decl.name.unwrap().text(src), "foo");
        assert_eq!(decl.type_annotation.unwrap().text(src).trim(), "string");
        assert_eq!(decl.value.unwrap().text(src).trim(), "'bar'");
    }

    #[test]
    fn parses_function_overload_set() {
        let src = "function process(a: string): string;\nfunction process(a: number): number;\nfunction process(a: any): any { return a; }";
        let r = parse(src);
        assert_eq!(r.top_level.len(), 3);
        for id in &r.top_level {
            assert_eq!(r.arena.get(*id).kind, Some(NodeKind::Function));
        }
        assert!(r.arena.get(r.top_level[0]).body.is_none());
        assert!(r.arena.get(r.top_level[1]).body.is_none());
        assert!(r.arena.get(r.top_level[2]).body.is_some());
    }

    #[test]
    fn parses_class_with_accessors_and_private() {
        let src = "export class C { private s: string = ''; get v(): number { return 0; } set v(n: number) {} #h = 1; }";
        let r = parse(src);
        assert_eq!(r.top_level.len(), 1);
        let class = r.arena.get(r.top_level[0]);
        assert_eq!(class.kind, Some(NodeKind::Class));
        assert_eq!(class.members.len(), 4);
        let get_member = r.arena.get(class.members[1]);
        assert!(get_member.is_getter);
        let set_member = r.arena.get(class.members[2]);
        assert!(set_member.is_setter);
        let private_field = r.arena.get(class.members[3]);
        assert_eq!(private_field.name.unwrap().text(src), "#h");
    }

    #[test]
    fn parses_import_with_named_bindings() {
        let src = "import { Used, Unused } from 'm';";
        let r = parse(src);
        let import = r.arena.get(r.top_level[0]);
        assert_eq!(import.kind, Some(NodeKind::Import));
        assert_eq!(import.module_specifier.unwrap().text(src), "'m'");
    }

    #[test]
    fn parses_as_const_tuple() {
        let src = "export const tags = ['a', 'b', 'c'] as const;";
        let r = parse(src);
        let var = r.arena.get(r.top_level[0]);
        let decl = r.arena.get(var.members[0]);
        assert_eq!(decl.value.unwrap().text(src).trim(), "['a', 'b', 'c'] as const");
    }

    #[test]
    fn parses_namespace_recursively() {
        let src = "export namespace N { export const x: number = 1; }";
        let r = parse(src);
        let ns = r.arena.get(r.top_level[0]);
        assert_eq!(ns.kind, Some(NodeKind::Module));
        assert_eq!(ns.members.len(), 1);
        let inner = r.arena.get(ns.members[0]);
        assert_eq!(inner.kind, Some(NodeKind::Variable));
        assert_eq!(inner.members.len(), 1);
    }

    #[test]
    fn recovers_from_unparsable_statement() {
        let src = "+++ garbage +++\nexport const x = 1;";
        let r = parse(src);
        assert!(!r.errors.is_empty());
        assert!(r.top_level.iter().any(|id| r.arena.get(*id).kind == Some(NodeKind::Variable)));
    }
}
