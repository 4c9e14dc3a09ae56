//! The `Declaration` record extracted from a parsed source file, and the
//! smaller structures nested inside it (class members, namespace bodies).

use smallvec::SmallVec;

pub use dtsx_parser::Modifier;

/// Modifiers rarely exceed `public|static|readonly`-depth stacking, so this
/// stays on the stack for every declaration that doesn't hit the rare
/// five-or-more-modifier case (e.g. `export default abstract class`).
pub type ModifierList = SmallVec<[Modifier; 4]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclKind {
    Import,
    Variable,
    Function,
    Interface,
    Type,
    Class,
    Enum,
    Module,
    Export,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassMemberKind {
    Field,
    Method,
    Getter,
    Setter,
}

/// One retained line inside a reconstructed class body. Private members
/// never reach this stage — the extractor drops them before building the
/// list, per §4.2's "private members ... are omitted".
#[derive(Clone, Debug)]
pub struct ClassMember {
    pub kind: ClassMemberKind,
    pub name: String,
    /// Fully reconstructed `.d.ts` member line, no trailing newline and no
    /// leading indentation — the emitter indents when it joins the body.
    pub text: String,
}

/// The central record produced by the extractor and consumed once by the
/// emitter. See module docs for the full kind/field contract; mirrors the
/// attributes named for the `Declaration` data model.
#[derive(Clone, Debug)]
pub struct Declaration {
    pub kind: DeclKind,
    pub name: String,
    /// DTS-ready surface form. For `Variable`, this is only the
    /// `[export ]declare const|let|var name` prefix — the emitter appends
    /// `: Type;` after inference (§4.5).
    pub text: String,
    pub leading_comments: Vec<String>,
    pub is_exported: bool,
    pub is_default: bool,
    pub is_side_effect: bool,
    pub is_type_only: bool,
    /// Ordered modifiers excluding `export`/`default`, which are tracked by
    /// the dedicated booleans above.
    pub modifiers: ModifierList,
    pub generics: Option<String>,
    pub extends: Option<String>,
    pub type_annotation: Option<String>,
    pub value: Option<String>,
    /// Import/re-export module specifier, unquoted.
    pub source: Option<String>,
    pub members: Vec<ClassMember>,
    /// Recursively extracted declarations of a named namespace's body.
    /// Rendered and indented by the emitter, the same way top-level
    /// declarations are, but never pass through the pruner — reachability
    /// is computed only at file scope (see resolver module docs).
    pub nested: Vec<Declaration>,
    pub is_declare_global: bool,
    /// Set only on the synthetic `_default` binding synthesized for
    /// `export default <expr>;` where `<expr>` is not a bare identifier —
    /// tells the emitter to follow the binding with `export default
    /// _default;` instead of exporting the binding itself.
    pub is_default_export_value: bool,
    /// Byte offset of the declaration's first token, used only to keep
    /// emission in source order (§4.5 "Other declarations in source
    /// order").
    pub order: u32,
}

impl Declaration {
    pub fn new(kind: DeclKind, name: impl Into<String>, order: u32) -> Self {
        Declaration {
            kind,
            name: name.into(),
            text: String::new(),
            leading_comments: Vec::new(),
            is_exported: false,
            is_default: false,
            is_side_effect: false,
            is_type_only: false,
            modifiers: ModifierList::new(),
            generics: None,
            extends: None,
            type_annotation: None,
            value: None,
            source: None,
            members: Vec::new(),
            nested: Vec::new(),
            is_declare_global: false,
            is_default_export_value: false,
            order,
        }
    }

    pub fn has_modifier(&self, m: Modifier) -> bool {
        self.modifiers.contains(&m)
    }

    /// Local binding names this import declaration introduces (default,
    /// namespace, and each named import including its alias), derived from
    /// `text` on demand per the invariant that this be "stable under
    /// re-parse" rather than stored redundantly.
    pub fn import_bindings(&self) -> Vec<String> {
        crate::resolver::parse_import_bindings(&self.text)
    }
}
