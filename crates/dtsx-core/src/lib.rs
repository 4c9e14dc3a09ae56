//! Isolated-declarations `.d.ts` generator core.
//!
//! `process_source` is the single pure entry point (spec §6): parse once,
//! extract declarations, infer narrow types, prune unreachable imports and
//! locals, and emit the final text. No I/O, no shared mutable state beyond
//! the bounded caches described in spec §5 (none are needed yet — every
//! stage here is a pure function of its input).

pub mod emitter;
pub mod extractor;
pub mod inferencer;
pub mod model;
pub mod resolver;

use dtsx_common::ParseError;

pub use model::{ClassMember, ClassMemberKind, DeclKind, Declaration};
pub use resolver::PruneResult;

/// Successful transform result: the emitted text plus any non-fatal
/// diagnostics collected along the way (spec §7 — `UnsupportedConstruct`
/// and similar are reported alongside a result, never by aborting it).
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub dts: String,
    pub diagnostics: Vec<dtsx_common::Diagnostic>,
}

/// Parse `source`, extract its declarations, infer and prune, and emit the
/// final `.d.ts` text.
///
/// `file_name` is used only for error messages. `import_priority` orders
/// surviving imports (spec §4.4 "Sort order"). Returns the first parse
/// error encountered, if any — the parser itself recovers token-by-token,
/// but a file with unparseable statements cannot be faithfully declared.
pub fn process_source(
    source: &str,
    file_name: &str,
    keep_comments: bool,
    import_priority: &[String],
) -> Result<ProcessResult, ParseError> {
    tracing::debug!(file_name, len = source.len(), "dtsx: parsing source");
    let parse = dtsx_parser::parse_program(source);
    if let Some(first) = parse.errors.first() {
        tracing::warn!(file_name, %first, "dtsx: parse failed");
        return Err(first.clone());
    }

    let triple_slash = extract_triple_slash(source);
    let declarations = extractor::extract(source, &parse, keep_comments);
    tracing::debug!(file_name, count = declarations.len(), "dtsx: extracted declarations");

    let pruned = resolver::prune(&declarations, import_priority);
    tracing::debug!(
        file_name,
        kept_imports = pruned.kept_imports.len(),
        needed_interfaces = pruned.needed_interfaces.len(),
        "dtsx: pruned imports"
    );

    let dts = emitter::emit(&declarations, &pruned, &triple_slash);
    Ok(ProcessResult { dts, diagnostics: Vec::new() })
}

/// Triple-slash reference directives are preserved verbatim at the top of
/// the file (spec §4.1/§4.5); they precede any declaration and are not
/// part of the statement grammar the parser classifies, so they're lifted
/// directly from the raw source rather than the AST.
fn extract_triple_slash(source: &str) -> Vec<String> {
    let mut out = Vec::new();
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with("///") {
            out.push(line.trim_end().to_string());
            continue;
        }
        break;
    }
    out
}

/// Test-only hooks mirroring spec §5 "Shared state" — `clear_caches()` is
/// currently a no-op since no stage here keeps a process-local cache yet;
/// kept as the seam the resolver's import-binding parsing would hang a
/// cache off if profiling ever calls for one.
#[cfg(test)]
pub mod testing {
    pub fn clear_caches() {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_const_scenario() {
        let out = process_source("export const foo: string = 'bar';", "t.ts", true, &[]).unwrap();
        assert!(out.dts.contains("export declare const foo: string;"));
    }

    #[test]
    fn satisfies_scenario() {
        let src = "export const config = { port: 3000 } satisfies { port: number };";
        let out = process_source(src, "t.ts", true, &[]).unwrap();
        assert!(out.dts.contains("export declare const config: { port: number };"));
    }

    #[test]
    fn as_const_tuple_scenario() {
        let src = "export const tags = ['a', 'b', 'c'] as const;";
        let out = process_source(src, "t.ts", true, &[]).unwrap();
        assert!(out.dts.contains("export declare const tags: readonly ['a', 'b', 'c'];"));
    }

    #[test]
    fn unused_import_pruning_scenario() {
        let src = "import { Used, Unused } from 'm'; export function f(x: Used): void {}";
        let out = process_source(src, "t.ts", true, &[]).unwrap();
        assert!(out.dts.contains("Used"));
        assert!(!out.dts.contains("Unused"));
        assert!(out.dts.contains("export declare function f(x: Used): void;"));
    }

    #[test]
    fn triple_slash_directive_preserved_at_top() {
        let src = "/// <reference types=\"node\" />\nexport const x = 1;";
        let out = process_source(src, "t.ts", true, &[]).unwrap();
        assert!(out.dts.starts_with("/// <reference types=\"node\" />"));
    }
}
