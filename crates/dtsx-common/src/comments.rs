//! Comment extraction.
//!
//! Comments are not part of the AST; they are scanned from the raw source
//! text independently and later associated with declarations by adjacency
//! (see `dtsx_core::extractor`).

use serde::{Deserialize, Serialize};

use crate::span::Span;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommentRange {
    pub span: Span,
    pub is_multi_line: bool,
    /// `/** ... */` form (JSDoc), as opposed to a plain `/* ... */` block.
    pub is_jsdoc: bool,
    /// A blank line (two or more consecutive newlines) follows this comment
    /// before the next token. Used to decide comment-to-declaration
    /// adjacency.
    pub followed_by_blank_line: bool,
}

impl CommentRange {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }
}

/// Scan `source` for all `//` and `/* ... */` comments, in order.
///
/// Mirrors the teacher's trivia scanner: walk bytes, skip whitespace, and
/// classify anything starting with `//` or `/*`. String/template literals
/// are not comment-scanned here; the parser re-derives comment ownership
/// per declaration using only positions that are known (by construction)
/// to sit between top-level tokens, so literal bodies containing `//` are
/// never misparsed as comments.
pub fn get_comment_ranges(source: &str) -> Vec<CommentRange> {
    let mut comments = Vec::new();
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut pos = 0usize;

    while pos < len {
        let ch = bytes[pos];

        if ch == b' ' || ch == b'\t' || ch == b'\r' || ch == b'\n' {
            pos += 1;
            continue;
        }

        if ch == b'/' && pos + 1 < len && bytes[pos + 1] == b'/' {
            let start = pos as u32;
            pos += 2;
            while pos < len && bytes[pos] != b'\n' && bytes[pos] != b'\r' {
                pos += 1;
            }
            let end = pos as u32;
            let followed_by_blank_line = blank_line_follows(bytes, pos);
            comments.push(CommentRange {
                span: Span::new(start, end),
                is_multi_line: false,
                is_jsdoc: false,
                followed_by_blank_line,
            });
            continue;
        }

        if ch == b'/' && pos + 1 < len && bytes[pos + 1] == b'*' {
            let start = pos as u32;
            let is_jsdoc = pos + 2 < len && bytes[pos + 2] == b'*' && !(pos + 3 < len && bytes[pos + 3] == b'/');
            pos += 2;
            let mut closed = false;
            while pos + 1 < len {
                if bytes[pos] == b'*' && bytes[pos + 1] == b'/' {
                    pos += 2;
                    closed = true;
                    break;
                }
                pos += 1;
            }
            if !closed {
                pos = len;
            }
            let end = pos as u32;
            let followed_by_blank_line = blank_line_follows(bytes, pos);
            comments.push(CommentRange {
                span: Span::new(start, end),
                is_multi_line: true,
                is_jsdoc,
                followed_by_blank_line,
            });
            continue;
        }

        // Not a comment: skip to next whitespace boundary so we don't
        // spuriously scan inside string/template literals for `//`/`/*`.
        pos = skip_non_comment_token(bytes, pos);
    }

    comments
}

fn blank_line_follows(bytes: &[u8], mut pos: usize) -> bool {
    let len = bytes.len();
    let mut newlines = 0;
    while pos < len {
        match bytes[pos] {
            b' ' | b'\t' | b'\r' => pos += 1,
            b'\n' => {
                newlines += 1;
                pos += 1;
                if newlines >= 2 {
                    return true;
                }
            }
            _ => return false,
        }
    }
    false
}

/// Skip a string/template literal or a single non-comment char, returning
/// the new position.
fn skip_non_comment_token(bytes: &[u8], pos: usize) -> usize {
    let len = bytes.len();
    match bytes[pos] {
        quote @ (b'\'' | b'"' | b'`') => {
            let mut i = pos + 1;
            while i < len && bytes[i] != quote {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            (i + 1).min(len)
        }
        _ => pos + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_line_comment() {
        let comments = get_comment_ranges("// hi\nconst x = 1;");
        assert_eq!(comments.len(), 1);
        assert!(!comments[0].is_multi_line);
        assert_eq!(comments[0].text("// hi\nconst x = 1;"), "// hi");
    }

    #[test]
    fn finds_jsdoc_block() {
        let src = "/** doc */\nexport const x = 1;";
        let comments = get_comment_ranges(src);
        assert_eq!(comments.len(), 1);
        assert!(comments[0].is_jsdoc);
    }

    #[test]
    fn ignores_comment_markers_inside_strings() {
        let src = "const x = '// not a comment';\n// real one\nconst y = 1;";
        let comments = get_comment_ranges(src);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text(src), "// real one");
    }

    #[test]
    fn blank_line_detected_between_comment_and_next_token() {
        let src = "// orphaned\n\nconst x = 1;";
        let comments = get_comment_ranges(src);
        assert!(comments[0].followed_by_blank_line);
    }
}
