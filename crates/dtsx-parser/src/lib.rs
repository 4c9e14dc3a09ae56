//! Top-level TypeScript statement parser for dtsx.
//!
//! Produces a shallow, arena-indexed AST (see `node` module docs) covering
//! spec §4.1's statement surface, plus the sub-spans the extractor and
//! emitter need to reconstruct each declaration's DTS-ready form.

pub mod cursor;
pub mod node;
pub mod parser;

pub use node::{Arena, Modifier, Node, NodeId, NodeKind};
pub use parser::{ParseResult, parse_program};
