//! Dotted-path addressing into a [`VarValue`] tree (spec §4.3 "Addressing").
//!
//! - Simple keys (`foo`).
//! - Dotted paths (`user.profile.name`) traverse nested objects, creating
//!   intermediate maps on `set`.
//! - Numeric segments index arrays when the preceding value is an array;
//!   otherwise they are treated as a string key (an object can legitimately
//!   have a key like `"0"`).

use flow_core::VarValue;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

pub fn parse(path: &str) -> Vec<Segment> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<usize>() {
            Ok(n) => Segment::Index(n),
            Err(_) => Segment::Key(s.to_string()),
        })
        .collect()
}

/// Resolves `path` against `root`, returning `None` if any segment is
/// missing. A numeric segment is only treated as an array index if the
/// value at that point actually is an array; otherwise it falls back to
/// being looked up as an object key (its string form).
pub fn get<'a>(root: &'a VarValue, path: &str) -> Option<&'a VarValue> {
    let segments = parse(path);
    let mut current = root;
    for seg in segments {
        current = match (&seg, current) {
            (Segment::Index(i), VarValue::Array(arr)) => arr.get(*i)?,
            (Segment::Index(i), VarValue::Object(obj)) => obj.get(&i.to_string())?,
            (Segment::Key(k), VarValue::Object(obj)) => obj.get(k)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Sets `path` to `value` within `root`, creating intermediate objects as
/// needed. If an intermediate segment exists but is not a container, it is
/// overwritten with a fresh object (setting is allowed to reshape, per the
/// testable property `set(path, v); get(path) = v`).
pub fn set(root: &mut VarValue, path: &str, value: VarValue) {
    let segments = parse(path);
    if segments.is_empty() {
        *root = value;
        return;
    }
    set_segments(root, &segments, value);
}

fn set_segments(current: &mut VarValue, segments: &[Segment], value: VarValue) {
    let (head, rest) = (&segments[0], &segments[1..]);

    match head {
        Segment::Key(key) => {
            if !matches!(current, VarValue::Object(_)) {
                *current = VarValue::Object(BTreeMap::new());
            }
            let obj = current.as_object_mut().expect("just coerced to object");
            if rest.is_empty() {
                obj.insert(key.clone(), value);
            } else {
                let entry = obj.entry(key.clone()).or_insert(VarValue::Null);
                set_segments(entry, rest, value);
            }
        }
        Segment::Index(idx) => {
            if matches!(current, VarValue::Array(_)) {
                let arr = current.as_array_mut().expect("just checked array");
                while arr.len() <= *idx {
                    arr.push(VarValue::Null);
                }
                if rest.is_empty() {
                    arr[*idx] = value;
                } else {
                    set_segments(&mut arr[*idx], rest, value);
                }
            } else {
                // Numeric segment against a non-array container: treat as a
                // string key, per the addressing rule.
                if !matches!(current, VarValue::Object(_)) {
                    *current = VarValue::Object(BTreeMap::new());
                }
                let obj = current.as_object_mut().expect("just coerced to object");
                let key = idx.to_string();
                if rest.is_empty() {
                    obj.insert(key, value);
                } else {
                    let entry = obj.entry(key).or_insert(VarValue::Null);
                    set_segments(entry, rest, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_roundtrips_for_nested_paths() {
        let mut root = VarValue::Object(BTreeMap::new());
        set(&mut root, "user.profile.name", VarValue::from("ada"));
        assert_eq!(get(&root, "user.profile.name"), Some(&VarValue::from("ada")));
    }

    #[test]
    fn numeric_segment_indexes_arrays() {
        let mut root = VarValue::Object(BTreeMap::new());
        set(&mut root, "items", VarValue::Array(vec![VarValue::from("a"), VarValue::from("b")]));
        set(&mut root, "items.1", VarValue::from("z"));
        assert_eq!(get(&root, "items.1"), Some(&VarValue::from("z")));
        assert_eq!(get(&root, "items.0"), Some(&VarValue::from("a")));
    }

    #[test]
    fn numeric_segment_is_string_key_on_non_array() {
        let mut root = VarValue::Object(BTreeMap::new());
        set(&mut root, "counts.0", VarValue::from("first"));
        assert_eq!(get(&root, "counts.0"), Some(&VarValue::from("first")));
    }

    #[test]
    fn missing_path_returns_none() {
        let root = VarValue::Object(BTreeMap::new());
        assert_eq!(get(&root, "nope.nested"), None);
    }
}
