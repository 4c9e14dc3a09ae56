//! Narrow type inference over raw RHS source text.
//!
//! Operates lexically rather than over a full expression AST: the parser
//! keeps variable/parameter initializers as unparsed spans (see
//! `dtsx_parser::node` docs), so classification here is prefix/suffix
//! matching and balanced-bracket splitting, the same "HOW" as
//! `dtsx_common::balanced` and the parser's own cursor scans.

use dtsx_common::limits::{MAX_INFER_DEPTH, MAX_INLINE_TUPLE_LEN};
use dtsx_common::{find_matching, split_first_top_level_colon, split_top_level_commas};

/// Infer the narrowest type for a variable given its optional explicit
/// annotation and optional initializer, applying the annotation policy of
/// §4.3: a "broad" annotation is replaced by narrower inference when
/// inference doesn't fall back to `unknown`; any other explicit annotation
/// wins outright; with no annotation, inference always runs and falls back
/// to `any` only if it produces nothing.
pub fn infer_variable_type(value: Option<&str>, annotation: Option<&str>, is_const: bool) -> String {
    if let Some(ann) = annotation {
        let ann = ann.trim();
        if is_broad_annotation(ann) {
            if let Some(v) = value {
                let inferred = infer_type(v, is_const, 0);
                if inferred != "unknown" {
                    return inferred;
                }
            }
            return ann.to_string();
        }
        return ann.to_string();
    }
    match value {
        Some(v) => {
            let t = infer_type(v, is_const, 0);
            if t.is_empty() { "any".to_string() } else { t }
        }
        None => "any".to_string(),
    }
}

fn is_broad_annotation(ann: &str) -> bool {
    matches!(ann, "any" | "object" | "unknown")
        || ann.starts_with("Record<")
        || ann.starts_with("Array<")
        || (ann.contains(": string]") && ann.trim_end_matches(';').trim_end().ends_with("any}"))
}

/// Public entry point: infer a type for `expr` in a non-union context.
pub fn infer_type(expr: &str, is_const: bool, depth: u32) -> String {
    infer_type_ctx(expr, is_const, depth, false)
}

fn infer_type_ctx(expr: &str, is_const: bool, depth: u32, union_context: bool) -> String {
    let expr = expr.trim();
    if expr.is_empty() || depth > MAX_INFER_DEPTH {
        return "unknown".to_string();
    }

    // 1. `satisfies T` — wins unconditionally, even over a preceding `as const`.
    if let Some(i) = scan_top_level(expr, keyword_match("satisfies")) {
        let rhs = &expr[i + "satisfies".len()..];
        return rhs.trim().trim_end_matches(';').trim().to_string();
    }

    // 2. `… as const`
    if let Some(inner) = strip_as_const_suffix(expr) {
        return infer_type_ctx(inner, true, depth + 1, union_context);
    }

    // 3 / 11. strings, tagged templates, plain templates.
    if let Some(t) = infer_string_like(expr, is_const) {
        return t;
    }

    // 4. number / boolean / null / undefined
    if let Some(t) = infer_primitive(expr, is_const) {
        return t;
    }

    // 5. bigint
    if let Some(t) = infer_bigint(expr, is_const) {
        return t;
    }

    // 6. Symbol(...) / Symbol.for(...)
    if expr.starts_with("Symbol(") || expr.starts_with("Symbol.for(") {
        return "symbol".to_string();
    }

    // 7. array literal
    if expr.starts_with('[') && expr.ends_with(']') {
        return infer_array(expr, is_const, depth);
    }

    // 8. object literal
    if expr.starts_with('{') && expr.ends_with('}') {
        return infer_object(expr, is_const, depth);
    }

    // 9. new expression
    if let Some(t) = infer_new(expr) {
        return t;
    }

    // 10. function expression / arrow function
    if let Some(t) = infer_function_like(expr, depth, union_context) {
        return t;
    }

    // 12. Promise.resolve / .reject / .all
    if let Some(t) = infer_promise(expr, depth) {
        return t;
    }

    // 13. await
    if expr.starts_with("await ") || expr == "await" {
        return "unknown".to_string();
    }

    // 14. fallthrough
    "unknown".to_string()
}

// ---- rule 1/2 helpers ----

fn keyword_match(word: &'static str) -> impl Fn(&[u8], usize) -> bool {
    move |bytes, i| {
        if !bytes[i..].starts_with(word.as_bytes()) {
            return false;
        }
        let before_ok = i == 0 || !is_ident_byte(bytes[i - 1]);
        let after = i + word.len();
        let after_ok = after >= bytes.len() || !is_ident_byte(bytes[after]);
        before_ok && after_ok
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn strip_as_const_suffix(expr: &str) -> Option<&str> {
    let trimmed = expr.trim_end();
    let idx = trimmed.len().checked_sub("as const".len())?;
    if &trimmed[idx..] != "as const" || idx == 0 {
        return None;
    }
    let before = &trimmed[..idx];
    let before_trimmed = before.trim_end();
    if before_trimmed.is_empty() {
        return None;
    }
    let had_space = before.len() > before_trimmed.len();
    let boundary_ident = before_trimmed.as_bytes().last().is_some_and(|b| is_ident_byte(*b));
    if had_space || !boundary_ident { Some(before_trimmed) } else { None }
}

// ---- rule 3 / 11: strings and templates ----

fn infer_string_like(expr: &str, is_const: bool) -> Option<String> {
    let first = expr.as_bytes().first().copied()?;
    if first == b'\'' || first == b'"' {
        if expr.len() < 2 || expr.as_bytes()[expr.len() - 1] != first {
            return None;
        }
        return Some(if is_const { expr.to_string() } else { "string".to_string() });
    }
    // `tag\`...\`` — anything preceding the opening backtick is a tag.
    if let Some(tick) = expr.find('`') {
        if !expr.ends_with('`') || expr.len() < 2 {
            return None;
        }
        let prefix = expr[..tick].trim();
        if !prefix.is_empty() {
            return Some("string".to_string());
        }
        if tick != 0 {
            return None;
        }
        let body = &expr[1..expr.len() - 1];
        return Some(if has_top_level_substitution(body) {
            if is_const { expr.to_string() } else { "string".to_string() }
        } else if is_const {
            expr.to_string()
        } else {
            "string".to_string()
        });
    }
    None
}

fn has_top_level_substitution(body: &str) -> bool {
    body.contains("${")
}

// ---- rule 4: primitives ----

fn infer_primitive(expr: &str, is_const: bool) -> Option<String> {
    match expr {
        "null" => return Some("null".to_string()),
        "undefined" => return Some("undefined".to_string()),
        "true" | "false" => return Some(if is_const { expr.to_string() } else { "boolean".to_string() }),
        _ => {}
    }
    if is_number_literal(expr) {
        return Some(if is_const { expr.to_string() } else { "number".to_string() });
    }
    None
}

fn is_number_literal(expr: &str) -> bool {
    let s = expr.strip_prefix('-').unwrap_or(expr);
    if s.is_empty() {
        return false;
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return !rest.is_empty() && rest.chars().all(|c| c.is_ascii_hexdigit() || c == '_');
    }
    if let Some(rest) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        return !rest.is_empty() && rest.chars().all(|c| c == '0' || c == '1' || c == '_');
    }
    if let Some(rest) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        return !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == '_');
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '0'..='9' | '_' => seen_digit = true,
            '.' if !seen_dot && !seen_exp => seen_dot = true,
            'e' | 'E' if !seen_exp && seen_digit => {
                seen_exp = true;
                if matches!(chars.peek(), Some('+') | Some('-')) {
                    chars.next();
                }
            }
            _ => return false,
        }
    }
    seen_digit
}

// ---- rule 5: bigint ----

fn infer_bigint(expr: &str, is_const: bool) -> Option<String> {
    let body = expr.strip_suffix('n')?;
    let bare = body.strip_prefix('-').unwrap_or(body);
    if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return None;
    }
    Some(if is_const { expr.to_string() } else { "bigint".to_string() })
}

// ---- rule 7: arrays ----

fn infer_array(expr: &str, is_const: bool, depth: u32) -> String {
    let inner = &expr[1..expr.len() - 1];
    let elements: Vec<&str> = split_top_level_commas(inner)
        .into_iter()
        .map(|s| s.text(inner).trim())
        .filter(|s| !s.is_empty())
        .collect();
    if elements.is_empty() {
        return if is_const { "readonly []".to_string() } else { "unknown[]".to_string() };
    }
    let elem_types: Vec<String> =
        elements.iter().map(|e| infer_type_ctx(e, is_const, depth + 1, true)).collect();
    let all_primitive_literals = elements.iter().all(|e| is_primitive_literal_text(e));

    if is_const || (all_primitive_literals && elements.len() <= MAX_INLINE_TUPLE_LEN) {
        format!("readonly [{}]", elem_types.join(", "))
    } else if elem_types.iter().all(|t| t == &elem_types[0]) {
        format!("{}[]", elem_types[0])
    } else {
        format!("({})[]", elem_types.join(" | "))
    }
}

fn is_primitive_literal_text(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() {
        return false;
    }
    let first = t.as_bytes()[0];
    if first == b'\'' || first == b'"' {
        return t.len() >= 2 && t.as_bytes()[t.len() - 1] == first;
    }
    matches!(t, "true" | "false" | "null" | "undefined") || is_number_literal(t) || t.ends_with('n')
}

// ---- rule 8: objects ----

fn infer_object(expr: &str, is_const: bool, depth: u32) -> String {
    let inner = &expr[1..expr.len() - 1];
    let entries: Vec<&str> = split_top_level_commas(inner)
        .into_iter()
        .map(|s| s.text(inner).trim())
        .filter(|s| !s.is_empty())
        .collect();
    let mut props = Vec::new();
    for entry in entries {
        if entry.starts_with("...") || entry.starts_with('#') {
            continue;
        }
        if let Some((key_span, value_span)) = split_first_top_level_colon(entry) {
            let key = key_span.text(entry).trim();
            let value = value_span.text(entry).trim();
            if key.is_empty() {
                continue;
            }
            let ty = infer_type_ctx(value, is_const, depth + 1, false);
            props.push(format!("{}: {}", key, ty));
            continue;
        }
        // shorthand method `name(params) { ... }` / `*name(params) { ... }`
        if let Some(paren) = entry.find('(') {
            let before = entry[..paren].trim();
            if !before.is_empty() && before.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '*')
            {
                let name = before.trim_start_matches('*');
                let sig = method_signature_fallback(entry, paren, depth);
                props.push(format!("{}: {}", name, sig));
                continue;
            }
        }
        // bare shorthand `{ a }` — value comes from enclosing scope.
        if entry.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
            props.push(format!("{}: unknown", entry));
        }
    }
    if props.is_empty() { "{}".to_string() } else { format!("{{ {} }}", props.join("; ")) }
}

fn method_signature_fallback(entry: &str, paren: usize, depth: u32) -> String {
    let rest = &entry[paren..];
    let close = match find_matching(rest, b'(', b')') {
        Some(i) => i,
        None => return "unknown".to_string(),
    };
    let params = clean_params(&rest[..=close], depth);
    let after = rest[close + 1..].trim_start();
    let ret = if let Some(r) = after.strip_prefix(':') {
        match scan_top_level(r, |b, i| b[i] == b'{') {
            Some(i) => r[..i].trim().to_string(),
            None => r.trim().to_string(),
        }
    } else {
        "unknown".to_string()
    };
    format!("{params} => {ret}")
}

// ---- rule 9: new expressions ----

fn infer_new(expr: &str) -> Option<String> {
    let rest = expr.strip_prefix("new ")?.trim_start();
    let name_end = rest.find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))?;
    if name_end == 0 {
        return None;
    }
    let name = &rest[..name_end];
    let after_name = rest[name_end..].trim_start();
    if after_name.starts_with('<') {
        if let Some(i) = find_matching(after_name, b'<', b'>') {
            return Some(format!("{}{}", name, &after_name[..=i]));
        }
    }
    Some(builtin_new_mapping(name).unwrap_or_else(|| name.to_string()))
}

fn builtin_new_mapping(name: &str) -> Option<String> {
    Some(
        match name {
            "Date" => "Date",
            "Map" => "Map<any, any>",
            "Set" => "Set<any>",
            "WeakMap" => "WeakMap<any, any>",
            "WeakSet" => "WeakSet<any>",
            "RegExp" => "RegExp",
            "Error" | "TypeError" | "RangeError" | "SyntaxError" | "EvalError" | "URIError" => "Error",
            "Promise" => "Promise<any>",
            _ => return None,
        }
        .to_string(),
    )
}

// ---- rule 10: function expressions / arrow functions ----

fn infer_function_like(expr: &str, depth: u32, union_context: bool) -> Option<String> {
    let (is_async, rest) = if let Some(r) = expr.strip_prefix("async") {
        if r.starts_with(|c: char| c.is_whitespace()) || r.starts_with('(') {
            (true, r.trim_start())
        } else {
            (false, expr)
        }
    } else {
        (false, expr)
    };

    if let Some(after_kw) = strip_keyword(rest, "function") {
        return Some(infer_function_expr(after_kw, is_async, depth));
    }
    infer_arrow(rest, is_async, depth, union_context)
}

fn strip_keyword<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(word)?;
    if rest.is_empty() || !is_ident_byte(rest.as_bytes()[0]) {
        Some(rest)
    } else {
        None
    }
}

fn infer_function_expr(rest: &str, is_async: bool, depth: u32) -> String {
    let rest = rest.trim_start();
    let (is_generator, rest) = match rest.strip_prefix('*') {
        Some(r) => (true, r.trim_start()),
        None => (false, rest),
    };
    let head_end = rest.find(|c: char| c == '(' || c == '<').unwrap_or(rest.len());
    let rest2 = &rest[head_end..];
    let (generics, rest3) = if rest2.starts_with('<') {
        match find_matching(rest2, b'<', b'>') {
            Some(i) => (Some(&rest2[..=i]), rest2[i + 1..].trim_start()),
            None => (None, rest2),
        }
    } else {
        (None, rest2)
    };
    if !rest3.starts_with('(') {
        return "unknown".to_string();
    }
    let close = match find_matching(rest3, b'(', b')') {
        Some(i) => i,
        None => return "unknown".to_string(),
    };
    let params_clean = clean_params(&rest3[..=close], depth);
    let after_params = rest3[close + 1..].trim_start();
    let explicit_rt = after_params.strip_prefix(':').map(|r| {
        let r = r.trim_start();
        match scan_top_level(r, |b, i| b[i] == b'{') {
            Some(i) => r[..i].trim().to_string(),
            None => r.trim().to_string(),
        }
    });

    let mut ret = if is_generator {
        explicit_rt.unwrap_or_else(|| "Generator<any, any, any>".to_string())
    } else {
        explicit_rt.unwrap_or_else(|| "unknown".to_string())
    };
    if is_async && !is_generator {
        ret = format!("Promise<{}>", ret);
    }
    format!("{}{params_clean} => {ret}", generics.unwrap_or(""))
}

fn infer_arrow(rest: &str, is_async: bool, depth: u32, union_context: bool) -> Option<String> {
    let rest = rest.trim_start();
    let (generics, after_generics) = if rest.starts_with('<') {
        match find_matching(rest, b'<', b'>') {
            Some(i) => (Some(&rest[..=i]), rest[i + 1..].trim_start()),
            None => (None, rest),
        }
    } else {
        (None, rest)
    };
    let (params_raw, after_params) = if after_generics.starts_with('(') {
        let close = find_matching(after_generics, b'(', b')')?;
        (&after_generics[..=close], after_generics[close + 1..].trim_start())
    } else {
        let end = after_generics.find(|c: char| c.is_whitespace() || c == ':' || c == '=').unwrap_or(after_generics.len());
        let starts_ident = after_generics.as_bytes().first().is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_' || *b == b'$');
        if end == 0 || !starts_ident {
            return None;
        }
        (&after_generics[..end], after_generics[end..].trim_start())
    };

    let (explicit_rt, after_rt): (Option<&str>, &str) = if let Some(r) = after_params.strip_prefix(':') {
        let r = r.trim_start();
        match scan_top_level(r, |b, i| b.get(i) == Some(&b'=') && b.get(i + 1) == Some(&b'>')) {
            Some(i) => (Some(r[..i].trim()), &r[i..]),
            None => (None, r),
        }
    } else {
        (None, after_params)
    };
    let after_arrow = after_rt.trim_start().strip_prefix("=>")?.trim_start();

    let params_clean = clean_params(params_raw, depth);
    let mut ret = if let Some(rt) = explicit_rt {
        rt.to_string()
    } else if after_arrow.starts_with('{') {
        "unknown".to_string()
    } else if union_context {
        "unknown".to_string()
    } else {
        infer_type_ctx(after_arrow, false, depth + 1, false)
    };
    if is_async {
        ret = format!("Promise<{}>", ret);
    }
    Some(format!("{}{params_clean} => {ret}", generics.unwrap_or("")))
}

/// Rewrite parameter defaults per §4.3.10: `name: T = v` → `name?: T`,
/// `name = v` → `name?: inferredFromV`; rest params pass through unchanged.
fn clean_params(params_raw: &str, depth: u32) -> String {
    let inner = &params_raw[1..params_raw.len() - 1];
    let parts = split_top_level_commas(inner);
    let cleaned: Vec<String> = parts
        .into_iter()
        .map(|s| s.text(inner).trim())
        .filter(|s| !s.is_empty())
        .map(|p| clean_one_param(p, depth))
        .collect();
    format!("({})", cleaned.join(", "))
}

fn clean_one_param(param: &str, depth: u32) -> String {
    if param.starts_with("...") {
        return param.to_string();
    }
    if let Some(eq) = scan_top_level(param, |b, i| b[i] == b'=') {
        let (before, after) = (param[..eq].trim(), param[eq + 1..].trim());
        if let Some(colon) = scan_top_level(before, |b, i| b[i] == b':') {
            let name = before[..colon].trim().trim_end_matches('?');
            return format!("{}?: {}", name, before[colon + 1..].trim());
        }
        let name = before.trim_end_matches('?');
        return format!("{}?: {}", name, infer_type_ctx(after, false, depth + 1, false));
    }
    param.to_string()
}

// ---- rule 12: Promise helpers ----

fn infer_promise(expr: &str, depth: u32) -> Option<String> {
    if let Some(inner) = strip_call(expr, "Promise.resolve") {
        return Some(format!("Promise<{}>", infer_type_ctx(inner, false, depth + 1, false)));
    }
    if strip_call(expr, "Promise.reject").is_some() {
        return Some("Promise<never>".to_string());
    }
    if let Some(inner) = strip_call(expr, "Promise.all") {
        let inner = inner.trim();
        if inner.starts_with('[') && inner.ends_with(']') {
            let items = split_top_level_commas(&inner[1..inner.len() - 1]);
            let types: Vec<String> = items
                .into_iter()
                .map(|s| s.text(&inner[1..inner.len() - 1]).trim().to_string())
                .filter(|s| !s.is_empty())
                .map(|s| infer_type_ctx(&s, false, depth + 1, false))
                .collect();
            return Some(format!("Promise<[{}]>", types.join(", ")));
        }
        return Some("Promise<unknown[]>".to_string());
    }
    None
}

fn strip_call<'a>(expr: &'a str, callee: &str) -> Option<&'a str> {
    let rest = expr.strip_prefix(callee)?.trim_start();
    if !rest.starts_with('(') || !rest.ends_with(')') {
        return None;
    }
    Some(&rest[1..rest.len() - 1])
}

// ---- shared top-level byte scanner ----

/// Scan `text` left to right at bracket depth 0 (honoring string/template
/// literal bodies), returning the byte offset of the first position where
/// `is_match` holds.
fn scan_top_level(text: &str, is_match: impl Fn(&[u8], usize) -> bool) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut i = 0usize;
    while i < bytes.len() {
        if depth == 0 && is_match(bytes, i) {
            return Some(i);
        }
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_literal_bytes(bytes, i);
                continue;
            }
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'>' if depth > 0 => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

fn skip_literal_bytes(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == quote {
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literal_widens_without_const() {
        assert_eq!(infer_type("'bar'", false, 0), "string");
        assert_eq!(infer_type("'bar'", true, 0), "'bar'");
    }

    #[test]
    fn satisfies_wins_over_shape() {
        assert_eq!(infer_type("{ port: 3000 } satisfies { port: number }", false, 0), "{ port: number }");
    }

    #[test]
    fn as_const_array_becomes_readonly_tuple() {
        assert_eq!(infer_type("['a', 'b', 'c'] as const", false, 0), "readonly ['a', 'b', 'c']");
    }

    #[test]
    fn object_literal_infers_each_property() {
        assert_eq!(infer_type("{ port: 3000, name: 'x' }", false, 0), "{ port: number; name: string }");
    }

    #[test]
    fn arrow_function_strips_default_and_body() {
        assert_eq!(infer_type("(x: number = 1) => x + 1", false, 0), "(x?: number) => unknown");
    }

    #[test]
    fn new_with_builtin_mapping() {
        assert_eq!(infer_type("new Map()", false, 0), "Map<any, any>");
        assert_eq!(infer_type("new Foo<string>()", false, 0), "Foo<string>");
    }

    #[test]
    fn promise_resolve_infers_inner_type() {
        assert_eq!(infer_type("Promise.resolve(1)", false, 0), "Promise<number>");
    }

    #[test]
    fn annotation_policy_prefers_narrow_over_broad() {
        assert_eq!(infer_variable_type(Some("1"), Some("any"), false), "1");
        assert_eq!(infer_variable_type(None, Some("string"), false), "string");
    }

    #[test]
    fn const_declarations_narrow_string_literals() {
        assert_eq!(infer_variable_type(Some("'x'"), None, true), "'x'");
        assert_eq!(infer_variable_type(Some("'x'"), None, false), "string");
    }
}
