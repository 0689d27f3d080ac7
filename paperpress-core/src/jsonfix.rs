//! Repair unescaped double quotes inside JSON string values.
//!
//! Typographic quotes “…” sometimes arrive converted to ASCII `"` inside
//! string values, breaking JSON validity. A character-level state machine
//! decides for each `"` whether it is a structural delimiter or inner
//! content: inside a string, a `"` closes the string only when the next
//! non-blank character is one of the valid post-string tokens
//! (`,` `}` `]` `:` or a line break); otherwise it is escaped.

use std::path::Path;

use anyhow::{Context, Result};

pub fn fix_json_quotes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escape_next = false;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];

        // The previous character was a backslash — already escaped.
        if escape_next {
            result.push(c);
            escape_next = false;
            i += 1;
            continue;
        }

        if c == '\\' {
            result.push(c);
            escape_next = true;
            i += 1;
            continue;
        }

        if !in_string {
            if c == '"' {
                in_string = true;
            }
            result.push(c);
        } else if c == '"' {
            // Peek at the next non-blank character.
            let mut j = i + 1;
            while j < chars.len() && (chars[j] == ' ' || chars[j] == '\t') {
                j += 1;
            }
            let next = chars.get(j).copied();

            match next {
                Some(',') | Some('}') | Some(']') | Some(':') | Some('\n') | Some('\r')
                | None => {
                    in_string = false;
                    result.push(c);
                }
                _ => {
                    // Inner content quote — escape it.
                    result.push('\\');
                    result.push(c);
                }
            }
        } else {
            result.push(c);
        }

        i += 1;
    }

    result
}

/// Fix a file on disk and verify the result parses. Returns the number of
/// top-level items found (`chapters` or `citations` array).
pub fn fix_file(input: &Path, output: &Path) -> Result<usize> {
    let original = std::fs::read_to_string(input)
        .with_context(|| format!("cannot read {}", input.display()))?;
    let fixed = fix_json_quotes(&original);

    let value: serde_json::Value = serde_json::from_str(&fixed)
        .with_context(|| format!("still invalid JSON after fix: {}", input.display()))?;
    let items = value
        .get("chapters")
        .or_else(|| value.get("citations"))
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or(0);

    std::fs::write(output, fixed)
        .with_context(|| format!("cannot write {}", output.display()))?;
    Ok(items)
}
