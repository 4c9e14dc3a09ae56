//! The AST produced by the parser.
//!
//! Unlike a full-fidelity TypeScript AST, nodes here carry *spans* into the
//! original source for most sub-structure (parameter lists, bodies, RHS
//! expressions) rather than a fully recursive expression tree: spec §4.1
//! only requires "an AST covering the TypeScript top-level surface and
//! enough expression structure for type inference of literal initializers
//! and function expressions" — and §4.3's inference rules are themselves
//! specified as lexical/textual classification over raw source, not tree
//! walks. Keeping nodes shallow mirrors that design and keeps the parser a
//! single pass over balanced brackets rather than a full expression
//! grammar.
//!
//! Nodes still live in a flat arena indexed by `NodeId`, the same "HOW" as
//! the teacher's `NodeIndex`-into-arena parser, because namespaces and
//! class bodies do nest recursively.

use dtsx_common::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Import,
    ExportNamed,
    ExportStar,
    ExportDefault,
    ExportAssignment,
    ImportEquals,
    Variable,
    VariableDeclarator,
    Function,
    Class,
    ClassMember,
    Interface,
    TypeAlias,
    Enum,
    Module,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Export,
    Default,
    Declare,
    Const,
    Abstract,
    Async,
    Readonly,
    Static,
    Private,
    Protected,
    Public,
    Override,
    Generator,
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    pub kind: Option<NodeKind>,
    pub span: Span,
    pub modifiers: Vec<Modifier>,
    /// `const` / `let` / `var` / `function` / `class` / `interface` /
    /// `type` / `enum` / `namespace` / `module`.
    pub keyword: Option<Span>,
    pub name: Option<Span>,
    /// Raw `<...>` slice including angle brackets.
    pub generics: Option<Span>,
    /// `extends X implements Y` raw text, name/generics through the
    /// opening body brace (exclusive).
    pub heritage: Option<Span>,
    /// `(...)` slice including parens, for functions/methods.
    pub params: Option<Span>,
    /// Return type annotation text, if explicit (functions/methods).
    pub return_type: Option<Span>,
    /// Type annotation text, if explicit (variable declarators).
    pub type_annotation: Option<Span>,
    /// `{...}` slice including braces.
    pub body: Option<Span>,
    /// Variable/parameter initializer or export-default expression, raw
    /// source, not including a trailing `;`.
    pub value: Option<Span>,
    /// Quoted module specifier for imports/re-exports.
    pub module_specifier: Option<Span>,
    pub is_type_only: bool,
    pub is_side_effect_import: bool,
    pub is_getter: bool,
    pub is_setter: bool,
    /// `declare global { ... }` — an ambient `Module` node with no name.
    pub is_declare_global: bool,
    /// `name?: T` — optional property/parameter marker.
    pub is_optional: bool,
    /// Nested declarations: class members, namespace/`declare global` body
    /// statements, or `const a = 1, b = 2` declarators.
    pub members: Vec<NodeId>,
    /// Leading comment ranges (indices into the file's comment list)
    /// contiguous with this node, populated by the extractor, not the
    /// parser — the parser only produces node spans.
    pub leading_comments: Vec<usize>,
}

impl Node {
    pub fn new(span: Span) -> Self {
        Node { span, ..Default::default() }
    }

    pub fn has_modifier(&self, m: Modifier) -> bool {
        self.modifiers.contains(&m)
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }
}

#[derive(Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn into_vec(self) -> Vec<Node> {
        self.nodes
    }
}
