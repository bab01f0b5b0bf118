//! JSON string-literal escaping for request bodies
//!
//! Only the characters that would break a JSON string literal are rewritten:
//! quotes, backslashes, and control characters. Everything else, including
//! non-ASCII text, passes through untouched.

use std::fmt::Write;

/// Escape `input` so it can be embedded between double quotes in a JSON body.
///
/// `"`, `\`, newline and carriage return become their two-character escapes.
/// Any other character below U+0020 becomes a lowercase `\u00xx` escape.
pub fn json_escape(input: &str) -> String {
    // Most prompts need no escaping at all; leave a little headroom for the rest.
    let mut output = String::with_capacity(input.len() + input.len() / 8 + 2);

    for ch in input.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                // Writing into a String cannot fail.
                let _ = write!(output, "\\u{:04x}", c as u32);
            }
            c => output.push(c),
        }
    }

    output
}
