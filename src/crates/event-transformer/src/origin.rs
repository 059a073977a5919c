//! Minimal same-origin check for `navigation` URL reduction (spec §4.4).
//! Not a general URL parser: it only needs scheme+host+port, which it reads
//! off the string directly rather than pulling in a full URL crate for one
//! comparison.

pub fn origin_of(url: &str) -> Option<&str> {
    let after_scheme = url.split_once("://").map(|(_, rest)| rest)?;
    let end = after_scheme.find('/').unwrap_or(after_scheme.len());
    Some(&after_scheme[..end])
}

pub fn relative_path(url: &str) -> &str {
    match url.split_once("://") {
        Some((_, rest)) => match rest.find('/') {
            Some(idx) => &rest[idx..],
            None => "/",
        },
        None => url,
    }
}

/// Reduces `url` against `base_origin` per spec §4.4: relative path if
/// same-origin, otherwise the absolute URL unchanged.
pub fn reduce_navigation_url(url: &str, base_origin: Option<&str>) -> String {
    match (base_origin, origin_of(url)) {
        (Some(base), Some(candidate)) if base == candidate => relative_path(url).to_string(),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_origin_becomes_relative() {
        assert_eq!(
            reduce_navigation_url("https://app.example.com/dashboard", Some("app.example.com")),
            "/dashboard"
        );
    }

    #[test]
    fn cross_origin_stays_absolute() {
        assert_eq!(
            reduce_navigation_url("https://other.example.com/x", Some("app.example.com")),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn no_base_origin_stays_absolute() {
        assert_eq!(reduce_navigation_url("https://app.example.com/x", None), "https://app.example.com/x");
    }
}
