//! Common types and utilities shared by the dtsx scanner, parser and core
//! crates.
//!
//! This crate provides:
//! - Source spans (`Span`) as byte offsets
//! - Line/column position conversion (`Position`, `Range`)
//! - Comment-range scanning (`CommentRange`, `get_comment_ranges`)
//! - Diagnostics (`ParseError`, `Diagnostic`)
//! - Centralized recursion/capacity limits
//! - A bounded, evictable cache used for process-local memoization

pub mod balanced;
pub mod cache;
pub mod comments;
pub mod diagnostics;
pub mod limits;
pub mod position;
pub mod span;

pub use balanced::{find_matching, split_first_top_level_colon, split_top_level_commas};
pub use cache::BoundedCache;
pub use comments::{CommentRange, get_comment_ranges};
pub use diagnostics::{Diagnostic, DiagnosticCategory, ParseError};
pub use position::{LineMap, Position, Range};
pub use span::Span;
