//! Content extraction from chat-completion response bodies
//!
//! The default strategy is a positional text scan: find the first `"content"`
//! key, take the string literal after it, and unescape it. It never builds a
//! JSON tree, so it tolerates truncated or non-conforming bodies as long as
//! the first content string is intact. The flip side is that it will happily
//! return the wrong string when an unrelated `"content"` key appears earlier
//! in the document (for instance an echoed request message).
//!
//! [`ExtractionMode::Structured`] swaps the scan for a `serde_json` parse of
//! `choices[0].message.content`. That changes the failure modes: malformed
//! JSON is rejected outright, while earlier `content` keys are ignored.

use crate::protocol::ChatCompletionResponse;
use serde::{Deserialize, Serialize};

const CONTENT_KEY: &str = "\"content\"";

/// How the content string is pulled out of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Positional scan for the first `"content"` string literal
    #[default]
    Positional,
    /// Schema-aware parse of `choices[0].message.content`
    Structured,
}

impl ExtractionMode {
    /// Extract the content string from `body` using this mode
    pub fn extract(self, body: &str) -> Option<String> {
        match self {
            Self::Positional => extract_content(body),
            Self::Structured => extract_content_structured(body),
        }
    }
}

/// Locate the first `"content"` string value in `body` and return it unescaped.
///
/// Returns `None` when the key, the colon after it, the opening quote, or an
/// unescaped closing quote is missing.
pub fn extract_content(body: &str) -> Option<String> {
    let key_pos = body.find(CONTENT_KEY)?;
    let colon_pos = key_pos + body[key_pos..].find(':')?;
    let start = colon_pos + body[colon_pos..].find('"')? + 1;
    let len = find_closing_quote(&body.as_bytes()[start..])?;

    Some(unescape(&body[start..start + len]))
}

/// Parse `body` as a chat-completion response and return the first choice's content
pub fn extract_content_structured(body: &str) -> Option<String> {
    let response: ChatCompletionResponse = serde_json::from_str(body).ok()?;
    response.choices.into_iter().next()?.message.content
}

/// Offset of the first quote not preceded by an escaping backslash.
///
/// A backslash always consumes the following byte. Both `"` and `\` are ASCII,
/// so walking bytes never mistakes the tail of a multi-byte character for one.
fn find_closing_quote(bytes: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Undo string-literal escaping in a captured value.
///
/// `\n`, `\r`, `\t`, `\"` and `\\` map to their characters and `\uXXXX`
/// decodes to the code point it names (surrogate pairs are joined). Any other
/// escaped character is kept without its backslash. A trailing lone backslash
/// is kept as is.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        match after.chars().next() {
            None => {
                out.push('\\');
                rest = after;
            }
            Some('u') => match decode_unicode_escape(&after[1..]) {
                Some((ch, consumed)) => {
                    out.push(ch);
                    rest = &after[1 + consumed..];
                }
                None => {
                    out.push('u');
                    rest = &after[1..];
                }
            },
            Some(c) => {
                out.push(match c {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    other => other,
                });
                rest = &after[c.len_utf8()..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decode the hex digits following `\u`, returning the character and the
/// number of bytes consumed after the `u`.
fn decode_unicode_escape(s: &str) -> Option<(char, usize)> {
    let first = hex4(s)?;

    if (0xD800..0xDC00).contains(&first) {
        let low = s
            .get(4..)
            .and_then(|r| r.strip_prefix("\\u"))
            .and_then(hex4)
            .filter(|low| (0xDC00..0xE000).contains(low))?;
        let code = 0x10000 + ((first - 0xD800) << 10) + (low - 0xDC00);
        return char::from_u32(code).map(|c| (c, 10));
    }

    char::from_u32(first).map(|c| (c, 4))
}

fn hex4(s: &str) -> Option<u32> {
    let digits = s.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"choices":[{"message":{"content":"hello \"world\"\n"}}]}"#;

    #[test]
    fn test_extracts_sample_body() {
        assert_eq!(extract_content(SAMPLE).as_deref(), Some("hello \"world\"\n"));
    }

    #[test]
    fn test_whitespace_around_colon() {
        let body = "{\"content\" :\n  \"spaced\"}";
        assert_eq!(extract_content(body).as_deref(), Some("spaced"));
    }

    #[test]
    fn test_first_content_key_wins() {
        let body = r#"{"echo":{"content":"prompt"},"choices":[{"message":{"content":"answer"}}]}"#;
        assert_eq!(extract_content(body).as_deref(), Some("prompt"));
        assert_eq!(extract_content_structured(body).as_deref(), Some("answer"));
    }

    #[test]
    fn test_null_content_skips_to_next_quote() {
        // Positional scan does not understand `null`; it grabs the next string.
        let body = r#"{"content":null,"role":"assistant"}"#;
        assert_eq!(extract_content(body).as_deref(), Some("role"));
    }

    #[test]
    fn test_trailing_backslash_is_unterminated() {
        assert_eq!(extract_content(r#"{"content":"abc\"#), None);
    }

    #[test]
    fn test_unescape_known_sequences() {
        assert_eq!(unescape(r#"a\nb\rc\td\"e\\f"#), "a\nb\rc\td\"e\\f");
    }

    #[test]
    fn test_unescape_unknown_sequence_drops_backslash() {
        assert_eq!(unescape(r"\/path\b"), "/pathb");
    }

    #[test]
    fn test_unescape_unicode() {
        assert_eq!(unescape(r"\u0041\u00e9"), "Aé");
        assert_eq!(unescape(r"\ud83d\ude00"), "😀");
        // lone surrogate or bad hex falls back to the literal text
        assert_eq!(unescape(r"\ud83dx"), "ud83dx");
        assert_eq!(unescape(r"\u12"), "u12");
    }

    #[test]
    fn test_unescape_lone_trailing_backslash() {
        assert_eq!(unescape("end\\"), "end\\");
    }

    #[test]
    fn test_structured_mode() {
        assert_eq!(
            ExtractionMode::Structured.extract(SAMPLE).as_deref(),
            Some("hello \"world\"\n")
        );
        assert_eq!(ExtractionMode::Structured.extract("{ not json"), None);
        assert_eq!(ExtractionMode::Positional.extract("{\"content\":\"ok\""), Some("ok".into()));
    }
}
