//! `{{ key }}` template interpolation (spec §4.3 "Interpolation").

use crate::path;
use flow_core::VarValue;

/// Scans `template` for `{{ key }}` (whitespace around `key` tolerated) and
/// replaces each placeholder by resolving `key` as a dotted path against
/// `root`. Missing keys leave the placeholder intact unless
/// `throw_on_missing` is set, in which case the first missing key is
/// reported as an error message.
pub fn interpolate(root: &VarValue, template: &str, throw_on_missing: bool) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' && i + 1 < bytes.len() && bytes[i + 1] == b'{' {
            if let Some(end) = find_close(template, i + 2) {
                let key = template[i + 2..end].trim();
                match path::get(root, key) {
                    Some(value) => {
                        out.push_str(&value.interpolated_string());
                    }
                    None => {
                        if throw_on_missing {
                            return Err(format!("missing variable: {key}"));
                        }
                        out.push_str(&template[i..end + 2]);
                    }
                }
                i = end + 2;
                continue;
            }
        }
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }

    Ok(out)
}

fn find_close(template: &str, from: usize) -> Option<usize> {
    template[from..].find("}}").map(|p| from + p)
}

/// True iff `s` is exactly one placeholder, e.g. `"{{ token }}"`. Used by
/// condition evaluation to decide whether an operand is a variable
/// reference rather than a literal (spec §4.3 step 1).
pub fn as_sole_placeholder(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    let inner = trimmed.strip_prefix("{{")?.strip_suffix("}}")?;
    Some(inner.trim())
}
