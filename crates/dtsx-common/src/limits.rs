//! Centralized limits and thresholds.
//!
//! Centralizing these avoids duplicate, possibly inconsistent, constants
//! scattered across the parser/inferencer.

/// Maximum recursion depth for the type inferencer (spec §4.3 "Recursion
/// bound"). Exceeding it yields `unknown` (or the container-appropriate
/// fallback) rather than overflowing the stack.
pub const MAX_INFER_DEPTH: u32 = 20;

/// Maximum recursion depth for the expression/type parser. Deeply nested
/// parenthesized or generic expressions bail out with a `ParseError`
/// rather than blowing the stack.
pub const MAX_PARSE_DEPTH: u32 = 256;

/// Bounded cache capacity for process-local caches (compiled scan tables,
/// parsed-import bindings). See spec §5 "Shared state".
pub const CACHE_CAPACITY: usize = 400;

/// Arrays at or below this element count, when every element is a
/// primitive literal, are emitted as a tuple type rather than `T[]`
/// (spec §4.3 rule 7).
pub const MAX_INLINE_TUPLE_LEN: usize = 10;
