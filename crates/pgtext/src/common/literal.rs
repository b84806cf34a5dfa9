//! Literal encoding of single values
//!
//! Turns the output function text of one value into a literal of the
//! selected dialect. Encoding never fails: every category has a rendering
//! and unknown types are already classified as [`TypeCategory::Other`].

use crate::common::{Dialect, TypeCategory};

/// Append `text` to `out` as a literal of `category`.
///
/// | category  | JSON               | plain              |
/// |-----------|--------------------|--------------------|
/// | Numeric   | `42`               | `42`               |
/// | BitString | `"B'0101'"`        | `B'0101'`          |
/// | Boolean   | `true` / `false`   | `true` / `false`   |
/// | Other     | `"escaped"`        | `'O''Neil'`        |
pub fn encode_literal(out: &mut String, category: TypeCategory, text: &str, dialect: Dialect) {
    match category {
        TypeCategory::Numeric => out.push_str(text),
        TypeCategory::BitString => match dialect {
            Dialect::Json => {
                out.push_str("\"B'");
                out.push_str(text);
                out.push_str("'\"");
            }
            Dialect::Plain => {
                out.push_str("B'");
                out.push_str(text);
                out.push('\'');
            }
        },
        TypeCategory::Boolean => {
            // Output function convention is "t"/"f"; anything else reads as false
            out.push_str(if text == "t" { "true" } else { "false" });
        }
        TypeCategory::Other => match dialect {
            Dialect::Json => push_json_string(out, text),
            Dialect::Plain => push_sql_string(out, text),
        },
    }
}

/// Encode into a fresh string.
pub fn literal(category: TypeCategory, text: &str, dialect: Dialect) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    encode_literal(&mut out, category, text, dialect);
    out
}

/// Append a double-quoted JSON string.
///
/// Only `\n`, `\r`, `\t`, `"` and `\` are escaped; every other character,
/// including other control characters, is copied as is.
pub fn push_json_string(out: &mut String, text: &str) {
    out.reserve(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

/// Append a single-quoted SQL string literal, doubling embedded quotes.
pub fn push_sql_string(out: &mut String, text: &str) {
    out.reserve(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
}

/// Append an identifier, double-quoting it unless it is a plain lower-case
/// identifier.
pub fn push_identifier(out: &mut String, ident: &str) {
    if is_plain_identifier(ident) {
        out.push_str(ident);
        return;
    }
    out.push('"');
    for ch in ident.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}

fn is_plain_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_is_verbatim() {
        for text in ["1", "-42", "3.14159", "1e+30", "NaN", "12345678901234567890.5"] {
            assert_eq!(literal(TypeCategory::Numeric, text, Dialect::Json), text);
            assert_eq!(literal(TypeCategory::Numeric, text, Dialect::Plain), text);
        }
    }

    #[test]
    fn test_bit_string() {
        assert_eq!(
            literal(TypeCategory::BitString, "0101", Dialect::Json),
            "\"B'0101'\""
        );
        assert_eq!(
            literal(TypeCategory::BitString, "0101", Dialect::Plain),
            "B'0101'"
        );
    }

    #[test]
    fn test_boolean() {
        assert_eq!(literal(TypeCategory::Boolean, "t", Dialect::Json), "true");
        assert_eq!(literal(TypeCategory::Boolean, "f", Dialect::Json), "false");
        assert_eq!(literal(TypeCategory::Boolean, "true", Dialect::Json), "false");
        assert_eq!(literal(TypeCategory::Boolean, "", Dialect::Plain), "false");
        assert_eq!(literal(TypeCategory::Boolean, "T", Dialect::Plain), "false");
    }

    #[test]
    fn test_json_string_escapes() {
        assert_eq!(
            literal(TypeCategory::Other, "a\nb\rc\td\"e\\f", Dialect::Json),
            r#""a\nb\rc\td\"e\\f""#
        );
        assert_eq!(literal(TypeCategory::Other, "O'Neil", Dialect::Json), "\"O'Neil\"");
    }

    #[test]
    fn test_json_leaves_other_control_bytes() {
        assert_eq!(
            literal(TypeCategory::Other, "a\u{0001}b\u{001b}", Dialect::Json),
            "\"a\u{0001}b\u{001b}\""
        );
    }

    #[test]
    fn test_plain_string_doubles_quotes() {
        assert_eq!(literal(TypeCategory::Other, "O'Neil", Dialect::Plain), "'O''Neil'");
        assert_eq!(literal(TypeCategory::Other, "''", Dialect::Plain), "''''''");
        assert_eq!(
            literal(TypeCategory::Other, "a\nb\\c\"d", Dialect::Plain),
            "'a\nb\\c\"d'"
        );
    }

    #[test]
    fn test_encode_appends() {
        let mut out = String::from("x=");
        encode_literal(&mut out, TypeCategory::Numeric, "1", Dialect::Json);
        assert_eq!(out, "x=1");
    }

    #[test]
    fn test_identifier_quoting() {
        let quote = |s: &str| {
            let mut out = String::new();
            push_identifier(&mut out, s);
            out
        };
        assert_eq!(quote("users"), "users");
        assert_eq!(quote("_tmp1"), "_tmp1");
        assert_eq!(quote("Users"), "\"Users\"");
        assert_eq!(quote("1st"), "\"1st\"");
        assert_eq!(quote("my table"), "\"my table\"");
        assert_eq!(quote("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote(""), "\"\"");
    }
}
