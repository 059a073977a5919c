//! Given an element's observable attributes, produce a ranked list of
//! selector candidates (spec §4.5).
//!
//! Strategies, in decreasing priority: `testId, role, css, xpath`. Each
//! strategy emits at most one candidate. Candidates are scored, then sorted
//! first by strategy priority, then by score descending (stable for ties).

use flow_core::{Selector, TargetInfo};

const BASE_TEST_ID: i32 = 95;
const BASE_ROLE: i32 = 80;
const BASE_CSS: i32 = 30;
const BASE_XPATH: i32 = 20;

/// A scored, rankable selector candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub selector: Selector,
    pub base_score: i32,
    pub score: i32,
    pub is_unique: bool,
    pub is_readable: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PrioritizerOptions {
    pub max_fallbacks: usize,
    pub require_unique: bool,
}

impl Default for PrioritizerOptions {
    fn default() -> Self {
        PrioritizerOptions { max_fallbacks: 2, require_unique: false }
    }
}

/// Builds every strategy's candidate for `target`, scores them, and returns
/// them ranked: `testId` first, then by score descending, capped to
/// `1 + options.max_fallbacks` entries (the primary candidate plus
/// fallbacks), optionally filtered to unique candidates only.
pub fn rank(target: &TargetInfo, options: PrioritizerOptions) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();

    if let Some(test_id) = &target.test_id {
        candidates.push(score_candidate(
            Selector::TestId { value: test_id.clone() },
            BASE_TEST_ID,
            target,
        ));
    }
    if let Some(role) = &target.role {
        candidates.push(score_candidate(
            Selector::Role { role: role.clone(), name: role_name(target) },
            BASE_ROLE,
            target,
        ));
    }
    if let Some(css) = build_css(target) {
        candidates.push(score_candidate(Selector::Css { value: css }, BASE_CSS, target));
    }
    if let Some(xpath) = build_xpath(target) {
        candidates.push(score_candidate(Selector::XPath { value: xpath }, BASE_XPATH, target));
    }

    candidates.sort_by(|a, b| {
        a.selector
            .priority_rank()
            .cmp(&b.selector.priority_rank())
            .then(b.score.cmp(&a.score))
    });

    if options.require_unique {
        candidates.retain(|c| c.is_unique);
    }

    candidates.truncate(1 + options.max_fallbacks);
    candidates
}

fn role_name(target: &TargetInfo) -> Option<String> {
    target.aria_label.clone().or_else(|| target.text.clone())
}

fn build_css(target: &TargetInfo) -> Option<String> {
    if let Some(id) = &target.id {
        return Some(format!("#{id}"));
    }
    let tag = target.tag.as_deref().unwrap_or("div");
    if !target.classes.is_empty() {
        let classes: String = target.classes.iter().map(|c| format!(".{c}")).collect();
        return Some(format!("{tag}{classes}"));
    }
    if let Some(name) = &target.name {
        return Some(format!("{tag}[name=\"{name}\"]"));
    }
    None
}

fn build_xpath(target: &TargetInfo) -> Option<String> {
    let tag = target.tag.as_deref().unwrap_or("*");
    if let Some(text) = &target.text {
        return Some(format!("//{tag}[contains(text(), \"{text}\")]"));
    }
    if target.id.is_some() || !target.classes.is_empty() || target.name.is_some() {
        return Some(format!("//{tag}"));
    }
    None
}

fn score_candidate(selector: Selector, base: i32, target: &TargetInfo) -> Candidate {
    let raw = selector_string(&selector);
    let mut score = base;

    if target.is_unique {
        score += 5;
    }
    let readable = is_readable(&selector);
    if readable {
        score += 5;
    }

    if raw.contains(":nth-child") {
        score -= 20;
    }
    if raw.contains(":nth-of-type") {
        score -= 15;
    }

    let depth = raw.matches('>').count() + 1;
    if depth > 3 {
        score -= 15;
    }
    if depth > 5 {
        score -= 10;
    }

    let class_tokens = raw.matches('.').count();
    if class_tokens > 2 {
        score -= 10;
    }

    score = score.clamp(0, 100);

    Candidate {
        selector,
        base_score: base,
        score,
        is_unique: target.is_unique,
        is_readable: readable,
    }
}

/// A selector "reads" as human-intelligible when it isn't a bare generated
/// id/class hash. `testId` and `role` (by name) are always readable; `css`
/// is readable only when built from a stable attribute rather than an
/// autogenerated class; `xpath` is never considered readable.
fn is_readable(selector: &Selector) -> bool {
    match selector {
        Selector::TestId { .. } => true,
        Selector::Role { name, .. } => name.is_some(),
        Selector::Css { value } => !value.chars().any(|c| c.is_ascii_digit()) || value.starts_with('#'),
        Selector::XPath { .. } => false,
    }
}

fn selector_string(selector: &Selector) -> String {
    match selector {
        Selector::TestId { value } => value.clone(),
        Selector::Role { role, name } => format!("{role}{}", name.as_deref().unwrap_or("")),
        Selector::Css { value } => value.clone(),
        Selector::XPath { value } => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(test_id: Option<&str>, role: Option<&str>, id: Option<&str>) -> TargetInfo {
        TargetInfo {
            test_id: test_id.map(String::from),
            role: role.map(String::from),
            aria_label: None,
            id: id.map(String::from),
            name: None,
            tag: Some("button".into()),
            text: None,
            classes: vec![],
            depth: 1,
            is_unique: true,
        }
    }

    #[test]
    fn test_id_ranks_above_everything() {
        let t = target(Some("submit-btn"), Some("button"), Some("submit"));
        let ranked = rank(&t, PrioritizerOptions::default());
        assert!(matches!(ranked[0].selector, Selector::TestId { .. }));
    }

    #[test]
    fn nth_child_penalty_lowers_css_score() {
        let mut t = target(None, None, None);
        t.classes = vec!["item".into()];
        let clean = build_css(&t).unwrap();
        let penalized_score = score_candidate(Selector::Css { value: format!("{clean}:nth-child(2)") }, BASE_CSS, &t).score;
        let clean_score = score_candidate(Selector::Css { value: clean }, BASE_CSS, &t).score;
        assert!(penalized_score < clean_score);
    }

    #[test]
    fn max_fallbacks_caps_result_length() {
        let mut t = target(Some("x"), Some("button"), Some("y"));
        t.text = Some("Submit".into());
        let ranked = rank(&t, PrioritizerOptions { max_fallbacks: 1, require_unique: false });
        assert!(ranked.len() <= 2);
    }

    #[test]
    fn require_unique_filters_non_unique_candidates() {
        let mut t = target(None, None, Some("x"));
        t.is_unique = false;
        let ranked = rank(&t, PrioritizerOptions { max_fallbacks: 2, require_unique: true });
        assert!(ranked.iter().all(|c| c.is_unique));
    }

    #[test]
    fn more_than_two_classes_is_penalized() {
        let mut t = target(None, None, None);
        t.classes = vec!["a".into(), "b".into(), "c".into()];
        let css = build_css(&t).unwrap();
        let candidate = score_candidate(Selector::Css { value: css }, BASE_CSS, &t);
        assert!(candidate.score <= BASE_CSS);
    }
}
