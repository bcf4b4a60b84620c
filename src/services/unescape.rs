//! Turns an extracted array back into parseable JSON text.

use std::borrow::Cow;

use super::extractor::{EmbeddedArray, Escaping};

/// Undo the outer-string escaping: `\"` becomes `"`, then `\\` becomes `\`.
///
/// Quotes go first so a `\\` unit followed by `\"` is never read as a
/// backslash-quote pair. Text without escapes is returned borrowed.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\\\"", "\"").replace("\\\\", "\\"))
}

/// JSON text for an extracted array.
///
/// Plain matches are already JSON and pass through untouched, which keeps
/// their own string escapes intact.
pub fn normalize<'a>(array: &EmbeddedArray<'a>) -> Cow<'a, str> {
    match array.escaping {
        Escaping::Escaped => unescape(array.text),
        Escaping::Plain => Cow::Borrowed(array.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::extractor::Strategy;

    /// Outer-string escaping as done by the page's serializer.
    fn escape(text: &str) -> String {
        text.replace('\\', "\\\\").replace('"', "\\\"")
    }

    #[test]
    fn test_unescape_reverses_outer_escaping() {
        let samples = [
            r#"[]"#,
            r#"[{"name":"A","lat":1.5}]"#,
            r#"[{"name":"quote \" inside","path":"C:\\dir\\"}]"#,
            r#"[{"name":"ends with backslash \\"},{"n":"\\\""}]"#,
            r#"[{"name":"두쫀쿠 \u0041 [x]"}]"#,
        ];
        for json in samples {
            assert_eq!(unescape(&escape(json)), json, "sample {json}");
        }
    }

    #[test]
    fn test_unescape_without_escapes_is_borrowed() {
        assert!(matches!(unescape(r#"[{"a":1}]"#), Cow::Borrowed(_)));
    }

    #[test]
    fn test_plain_array_keeps_json_escapes() {
        let text = r#"[{"name":"say \"hi\""}]"#;
        let array = EmbeddedArray {
            text,
            start: 0,
            escaping: Escaping::Plain,
            strategy: Strategy::Scanner,
        };
        assert_eq!(normalize(&array), text);
    }

    #[test]
    fn test_escaped_array_is_unescaped() {
        let array = EmbeddedArray {
            text: r#"[{\"name\":\"A\"}]"#,
            start: 0,
            escaping: Escaping::Escaped,
            strategy: Strategy::FastPath,
        };
        assert_eq!(normalize(&array), r#"[{"name":"A"}]"#);
    }
}
