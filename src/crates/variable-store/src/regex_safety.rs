//! The regex-safety gate (spec §4.3 `matches`, §8 "Regex-safety gate").
//!
//! Every pattern reaching `matches` is funneled through [`check`] before a
//! `regex::Regex` is ever constructed from it. This is the single checked
//! entry point for user-supplied regex in the whole control plane. No
//! other call site is permitted to build a `Regex` from a `Condition`'s
//! `right` operand.

use flow_core::CoreError;

const MAX_PATTERN_LEN: usize = 500;

/// Rejects patterns at or beyond 500 chars, or containing a
/// nested-quantifier construct: a capturing group whose content ends in `+`
/// or `*`, itself followed by `+`, `*`, or `{` (the classic ReDoS shape,
/// e.g. `(a+)+`, `(a*)+`, `(a+){2,}`).
pub fn check(pattern: &str) -> Result<(), CoreError> {
    if pattern.len() >= MAX_PATTERN_LEN {
        return Err(CoreError::regex_unsafe(format!(
            "pattern length {} exceeds the {} char safety limit",
            pattern.len(),
            MAX_PATTERN_LEN
        )));
    }

    if has_nested_quantifier(pattern) {
        return Err(CoreError::regex_unsafe(
            "pattern contains a nested quantifier: ReDoS risk".to_string(),
        ));
    }

    regex::Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| CoreError::regex_unsafe(format!("invalid pattern: {e}")))
}

/// Scans for `( ... [+*] ) [+*{]`, a capturing group ending in a quantified
/// atom, immediately followed by another quantifier. This is a conservative
/// syntactic scan, not a full regex parse: it is meant to catch the common
/// catastrophic-backtracking idiom, not to be a sound static analyzer.
fn has_nested_quantifier(pattern: &str) -> bool {
    let chars: Vec<char> = pattern.chars().collect();
    let mut depth_stack: Vec<usize> = Vec::new(); // indices of '(' starts

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                i += 2;
                continue;
            }
            '(' => depth_stack.push(i),
            ')' => {
                if let Some(open) = depth_stack.pop() {
                    // Inner content is chars[open+1 .. i]; find if it ends
                    // with a quantified atom (`+` or `*` right before `)`),
                    // skipping a lazy `?` modifier if present.
                    let mut end = i;
                    if end > open + 1 && chars[end - 1] == '?' {
                        end -= 1;
                    }
                    let ends_quantified = end > open + 1 && matches!(chars[end - 1], '+' | '*');
                    if ends_quantified {
                        // Look at what follows the closing paren (skipping a
                        // non-capturing/group-name prefix isn't needed here).
                        let mut j = i + 1;
                        if j < chars.len() && chars[j] == '?' {
                            j += 1; // lazy modifier on the outer quantifier too
                        }
                        if j < chars.len() && matches!(chars[j], '+' | '*' | '{') {
                            return true;
                        }
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_classic_redos_pattern() {
        assert!(check("(a+)+").is_err());
        assert!(check("(a*)+").is_err());
        assert!(check("(a+)*").is_err());
    }

    #[test]
    fn rejects_overlong_patterns() {
        let long = "a".repeat(500);
        assert!(check(&long).is_err());
    }

    #[test]
    fn accepts_ordinary_patterns() {
        assert!(check("^[a-z]+$").is_ok());
        assert!(check(r"\d{3}-\d{4}").is_ok());
    }

    #[test]
    fn rejects_invalid_syntax() {
        assert!(check("(unclosed").is_err());
    }

    #[test]
    fn accepts_non_nested_plus_groups() {
        // A quantified group not itself re-quantified is fine.
        assert!(check("(abc+)").is_ok());
    }
}
