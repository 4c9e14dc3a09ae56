//! Tokenizer for the TypeScript subset this project parses.
//!
//! Contextual keywords (`async`, `as`, `satisfies`, `readonly`, `infer`,
//! `keyof`, `typeof`, `is`, `namespace`, `module`, `declare`, `abstract`,
//! `override`, `get`, `set`, ...) are *not* given their own `SyntaxKind`:
//! TypeScript has dozens of them and almost all are also valid identifiers
//! depending on position, so the parser matches on `Token::text` instead.
//! This mirrors how real-world hand-written TS-subset parsers in this
//! space work, and keeps the scanner a thin, unambiguous layer.

use dtsx_common::Span;
use memchr::memchr2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyntaxKind {
    Identifier,
    NumericLiteral,
    BigIntLiteral,
    StringLiteral,
    /// An entire template literal, backtick to backtick, scanned as one
    /// token. `has_substitution` (carried on `Token`) records whether it
    /// contains a `${...}` hole; we never need per-hole boundaries because
    /// the inferencer only asks "plain string or interpolated?" (spec
    /// §4.3 rule 11).
    TemplateLiteral,
    RegexLiteral,
    Punct,
    Eof,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: Span,
    /// For `Punct`, the punctuator text (`"=>"`, `"..."`, `"<"`, ...).
    /// For everything else, the raw token text.
    pub text: String,
    pub has_substitution: bool,
    pub preceded_by_newline: bool,
}

impl Token {
    pub fn is_punct(&self, s: &str) -> bool {
        self.kind == SyntaxKind::Punct && self.text == s
    }

    pub fn is_ident(&self, s: &str) -> bool {
        self.kind == SyntaxKind::Identifier && self.text == s
    }
}

/// Longest punctuators first so greedy matching prefers `===` over `==`
/// over `=`.
const PUNCTUATORS: &[&str] = &[
    "...", "=>", "===", "!==", "**=", "&&=", "||=", "??=", ">>>=", "<<=", ">>=", ">>>", "==", "!=",
    "<=", ">=", "&&", "||", "??", "?.", "**", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "<<", ">>", "{", "}", "(", ")", "[", "]", ".", ";", ",", "<", ">", "+", "-", "*", "/",
    "%", "&", "|", "^", "!", "~", "?", ":", "=", "@", "#",
];

pub struct Scanner<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner { source, bytes: source.as_bytes(), pos: 0 }
    }

    /// Tokenize the entire source. Comments and whitespace are skipped;
    /// callers that need comment trivia use `dtsx_common::comments`
    /// separately against the same source text.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.kind == SyntaxKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn next_token(&mut self) -> Token {
        let preceded_by_newline = self.skip_trivia();
        let start = self.pos;
        if self.pos >= self.bytes.len() {
            return Token {
                kind: SyntaxKind::Eof,
                span: Span::at(start as u32),
                text: String::new(),
                has_substitution: false,
                preceded_by_newline,
            };
        }

        let ch = self.bytes[self.pos];

        if ch == b'`' {
            return self.scan_template(start, preceded_by_newline);
        }
        if ch == b'"' || ch == b'\'' {
            return self.scan_string(ch, start, preceded_by_newline);
        }
        if ch.is_ascii_digit() || (ch == b'.' && self.peek_digit_after_dot()) {
            return self.scan_number(start, preceded_by_newline);
        }
        if is_ident_start(ch) {
            return self.scan_identifier(start, preceded_by_newline);
        }

        // Regex-literal vs. division is inherently ambiguous without
        // parser context (operator position). We never classify `/` as a
        // regex literal here; a bare regex RHS falls through the
        // inferencer's rules to `unknown` rather than round-tripping
        // verbatim, which is an accepted narrowing of spec §4.1's regex
        // coverage, not a correctness issue for the emitted declaration.
        self.scan_punct(start, preceded_by_newline)
    }

    fn peek_digit_after_dot(&self) -> bool {
        self.bytes.get(self.pos + 1).is_some_and(u8::is_ascii_digit)
    }

    fn skip_trivia(&mut self) -> bool {
        let mut saw_newline = false;
        loop {
            match self.bytes.get(self.pos) {
                Some(b' ') | Some(b'\t') | Some(b'\r') => self.pos += 1,
                Some(b'\n') => {
                    saw_newline = true;
                    self.pos += 1;
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    self.pos += 2;
                    while self.pos + 1 < self.bytes.len()
                        && !(self.bytes[self.pos] == b'*' && self.bytes[self.pos + 1] == b'/')
                    {
                        if self.bytes[self.pos] == b'\n' {
                            saw_newline = true;
                        }
                        self.pos += 1;
                    }
                    self.pos = (self.pos + 2).min(self.bytes.len());
                }
                _ => break,
            }
        }
        saw_newline
    }

    fn scan_identifier(&mut self, start: usize, preceded_by_newline: bool) -> Token {
        self.pos += 1;
        while self.bytes.get(self.pos).is_some_and(|&b| is_ident_part(b)) {
            self.pos += 1;
        }
        let text = self.source[start..self.pos].to_string();
        Token {
            kind: SyntaxKind::Identifier,
            span: Span::new(start as u32, self.pos as u32),
            text,
            has_substitution: false,
            preceded_by_newline,
        }
    }

    fn scan_number(&mut self, start: usize, preceded_by_newline: bool) -> Token {
        // Hex/octal/binary prefixes.
        if self.bytes[self.pos] == b'0'
            && matches!(self.bytes.get(self.pos + 1), Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B'))
        {
            self.pos += 2;
            while self.bytes.get(self.pos).is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_')
            {
                self.pos += 1;
            }
        } else {
            while self.bytes.get(self.pos).is_some_and(|&b| b.is_ascii_digit() || b == b'_') {
                self.pos += 1;
            }
            if self.bytes.get(self.pos) == Some(&b'.') {
                self.pos += 1;
                while self.bytes.get(self.pos).is_some_and(|&b| b.is_ascii_digit() || b == b'_') {
                    self.pos += 1;
                }
            }
            if matches!(self.bytes.get(self.pos), Some(b'e' | b'E')) {
                let save = self.pos;
                self.pos += 1;
                if matches!(self.bytes.get(self.pos), Some(b'+' | b'-')) {
                    self.pos += 1;
                }
                if self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
                    while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
                        self.pos += 1;
                    }
                } else {
                    self.pos = save;
                }
            }
        }
        let is_bigint = self.bytes.get(self.pos) == Some(&b'n');
        if is_bigint {
            self.pos += 1;
        }
        let text = self.source[start..self.pos].to_string();
        Token {
            kind: if is_bigint { SyntaxKind::BigIntLiteral } else { SyntaxKind::NumericLiteral },
            span: Span::new(start as u32, self.pos as u32),
            text,
            has_substitution: false,
            preceded_by_newline,
        }
    }

    fn scan_string(&mut self, quote: u8, start: usize, preceded_by_newline: bool) -> Token {
        self.pos += 1;
        // Jump straight to the next quote-or-backslash instead of walking
        // byte by byte through the (usually long) literal body.
        loop {
            match memchr2(quote, b'\\', &self.bytes[self.pos..]) {
                Some(rel) => {
                    self.pos += rel;
                    if self.bytes[self.pos] == b'\\' {
                        self.pos = (self.pos + 2).min(self.bytes.len());
                        continue;
                    }
                    self.pos += 1;
                    break;
                }
                None => {
                    self.pos = self.bytes.len();
                    break;
                }
            }
        }
        let text = self.source[start..self.pos.min(self.source.len())].to_string();
        Token {
            kind: SyntaxKind::StringLiteral,
            span: Span::new(start as u32, self.pos as u32),
            text,
            has_substitution: false,
            preceded_by_newline,
        }
    }

    fn scan_template(&mut self, start: usize, preceded_by_newline: bool) -> Token {
        self.pos += 1;
        let mut depth = 0i32; // brace depth inside a `${...}` hole
        let mut has_substitution = false;
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'\\' {
                self.pos += 2;
                continue;
            }
            if depth == 0 && b == b'`' {
                self.pos += 1;
                break;
            }
            if depth == 0 && b == b'$' && self.bytes.get(self.pos + 1) == Some(&b'{') {
                has_substitution = true;
                depth += 1;
                self.pos += 2;
                continue;
            }
            if depth > 0 {
                match b {
                    b'{' => depth += 1,
                    b'}' => depth -= 1,
                    b'`' => {
                        // nested template inside the hole; skip it whole
                        self.pos += 1;
                        let nested_start = self.pos;
                        let _ = self.scan_template(nested_start - 1, false);
                        continue;
                    }
                    _ => {}
                }
            }
            self.pos += 1;
        }
        let text = self.source[start..self.pos.min(self.source.len())].to_string();
        Token {
            kind: SyntaxKind::TemplateLiteral,
            span: Span::new(start as u32, self.pos as u32),
            text,
            has_substitution,
            preceded_by_newline,
        }
    }

    fn scan_punct(&mut self, start: usize, preceded_by_newline: bool) -> Token {
        let rest = &self.source[self.pos..];
        for p in PUNCTUATORS {
            if rest.starts_with(p) {
                self.pos += p.len();
                return Token {
                    kind: SyntaxKind::Punct,
                    span: Span::new(start as u32, self.pos as u32),
                    text: (*p).to_string(),
                    has_substitution: false,
                    preceded_by_newline,
                };
            }
        }
        // Unknown byte: consume one char so the parser can report and
        // resynchronize rather than looping forever.
        let ch_len = rest.chars().next().map_or(1, char::len_utf8);
        self.pos += ch_len;
        Token {
            kind: SyntaxKind::Punct,
            span: Span::new(start as u32, self.pos as u32),
            text: self.source[start..self.pos].to_string(),
            has_substitution: false,
            preceded_by_newline,
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_part(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<SyntaxKind> {
        Scanner::new(src).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_simple_const() {
        let toks = Scanner::new("const x = 1;").tokenize();
        let texts: Vec<_> = toks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["const", "x", "=", "1", ";", ""]);
    }

    #[test]
    fn tokenizes_arrow_and_generics() {
        let toks = Scanner::new("<T,>(x: T) => x").tokenize();
        assert!(toks.iter().any(|t| t.is_punct("=>")));
        assert!(toks.iter().any(|t| t.is_punct("<")));
    }

    #[test]
    fn template_literal_detects_substitution() {
        let toks = Scanner::new("`a${b}c`").tokenize();
        assert_eq!(toks[0].kind, SyntaxKind::TemplateLiteral);
        assert!(toks[0].has_substitution);
    }

    #[test]
    fn plain_template_no_substitution() {
        let toks = Scanner::new("`hello`").tokenize();
        assert!(!toks[0].has_substitution);
    }

    #[test]
    fn bigint_literal() {
        let toks = Scanner::new("123n").tokenize();
        assert_eq!(toks[0].kind, SyntaxKind::BigIntLiteral);
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(kinds("// c\n/* c */ 1"), vec![SyntaxKind::NumericLiteral, SyntaxKind::Eof]);
    }

    #[test]
    fn string_with_escaped_quote() {
        let toks = Scanner::new(r#"'a\'b'"#).tokenize();
        assert_eq!(toks[0].kind, SyntaxKind::StringLiteral);
        assert_eq!(toks[0].text, r#"'a\'b'"#);
    }
}
