//! A JSONPath *subset* sufficient for extraction (spec §1 Non-goals: "a full
//! JSONPath implementation" is explicitly out of scope; spec §4.3 only needs
//! dotted-key and single-level-wildcard extraction).
//!
//! Supported: `$.a.b.c`, `$.a[0].b`, `$.a[*].b` (wildcard fans out into a
//! `VarValue::Array` of matches). Anything else returns `None`; callers
//! treat that the same as "path is unresolvable" (spec §4.3).

use flow_core::VarValue;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Key(String),
    Index(usize),
    Wildcard,
}

fn tokenize(path: &str) -> Option<Vec<Token>> {
    let path = path.strip_prefix("$.").or_else(|| path.strip_prefix('$'))?;
    let mut tokens = Vec::new();
    for raw in path.split('.') {
        if raw.is_empty() {
            continue;
        }
        let mut rest = raw;
        // Split a leading key from any trailing `[...]` groups, e.g. `items[*]`.
        if let Some(bracket_pos) = rest.find('[') {
            let key = &rest[..bracket_pos];
            if !key.is_empty() {
                tokens.push(Token::Key(key.to_string()));
            }
            rest = &rest[bracket_pos..];
            while let Some(stripped) = rest.strip_prefix('[') {
                let close = stripped.find(']')?;
                let inner = &stripped[..close];
                if inner == "*" {
                    tokens.push(Token::Wildcard);
                } else {
                    tokens.push(Token::Index(inner.parse().ok()?));
                }
                rest = &stripped[close + 1..];
            }
        } else {
            tokens.push(Token::Key(rest.to_string()));
        }
    }
    Some(tokens)
}

/// Extracts a single match, a `VarValue::Array` of matches for a wildcard
/// path, or `None` if the path is syntactically invalid or unresolvable.
pub fn extract(data: &VarValue, path: &str) -> Option<VarValue> {
    let tokens = tokenize(path)?;
    resolve(data, &tokens)
}

fn resolve(data: &VarValue, tokens: &[Token]) -> Option<VarValue> {
    let Some((head, rest)) = tokens.split_first() else {
        return Some(data.clone());
    };

    match head {
        Token::Key(k) => {
            let obj = data.as_object()?;
            let next = obj.get(k)?;
            resolve(next, rest)
        }
        Token::Index(i) => {
            let arr = data.as_array()?;
            let next = arr.get(*i)?;
            resolve(next, rest)
        }
        Token::Wildcard => {
            let arr = data.as_array()?;
            let matches: Vec<VarValue> = arr.iter().filter_map(|item| resolve(item, rest)).collect();
            Some(VarValue::Array(matches))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VarValue {
        VarValue::from_json(serde_json::json!({
            "auth": { "token": "abc" },
            "items": [{"id": 1}, {"id": 2}, {"id": 3}]
        }))
    }

    #[test]
    fn extracts_nested_key() {
        let v = extract(&sample(), "$.auth.token");
        assert_eq!(v, Some(VarValue::from("abc")));
    }

    #[test]
    fn extracts_indexed_array_element() {
        let v = extract(&sample(), "$.items[1].id");
        assert_eq!(v.and_then(|x| x.as_f64()), Some(2.0));
    }

    #[test]
    fn wildcard_fans_out_matches() {
        let v = extract(&sample(), "$.items[*].id").unwrap();
        let arr = v.as_array().unwrap();
        assert_eq!(arr.len(), 3);
    }

    #[test]
    fn unresolvable_path_is_none() {
        assert_eq!(extract(&sample(), "$.nope.nested"), None);
    }

    #[test]
    fn syntactically_invalid_path_is_none() {
        assert_eq!(extract(&sample(), "not-a-jsonpath"), None);
    }
}
