//! Reduces a time-ordered sequence of raw UI events into a canonical
//! [`Step`] sequence (spec §4.4): `navigation, click, blur, keydown, hover,
//! scroll, select` become `navigate, click, type, keypress, hover, scroll,
//! select` respectively, `input` events are dropped (the trailing `blur`
//! carries the final value), and adjacent same-selector `type` steps are
//! merged into one.

mod origin;

use flow_core::{RawEvent, RawEventType, Selector, Step};
use selector_prioritizer::{rank, PrioritizerOptions};

/// Reduces `events` into a [`Step`] sequence. `base_origin` is the
/// scheme+host of the session's starting page, used to decide whether a
/// `navigation` event's URL reduces to a relative path (spec §4.4).
pub fn transform(events: &[RawEvent], base_origin: Option<&str>) -> Vec<Step> {
    let steps: Vec<Step> = events
        .iter()
        .filter_map(|event| reduce_event(event, base_origin))
        .collect();
    merge_adjacent_type_steps(steps)
}

fn selector_for(event: &RawEvent) -> Option<Selector> {
    let target = event.target.as_ref()?;
    rank(target, PrioritizerOptions::default())
        .into_iter()
        .next()
        .map(|candidate| candidate.selector)
}

fn reduce_event(event: &RawEvent, base_origin: Option<&str>) -> Option<Step> {
    match event.event_type {
        RawEventType::Navigation => {
            let url = event.url.as_deref()?;
            Some(Step::Navigate {
                id: Some(event.id.clone()),
                url: origin::reduce_navigation_url(url, base_origin),
                optional: None,
            })
        }
        RawEventType::Click => Some(Step::Click {
            id: Some(event.id.clone()),
            selector: selector_for(event)?,
            optional: None,
        }),
        RawEventType::Blur => {
            let value = event.value.clone()?;
            Some(Step::Type {
                id: Some(event.id.clone()),
                selector: selector_for(event)?,
                value,
                sensitive: event.is_sensitive,
                optional: None,
            })
        }
        RawEventType::Input => None,
        // Only Enter keydowns reduce to a step; every other key is dropped
        // (spec §4.4: "keydown where key is Enter → keypress{...}").
        RawEventType::Keydown => {
            if event.key.as_deref() != Some("Enter") {
                return None;
            }
            Some(Step::Keypress {
                id: Some(event.id.clone()),
                key: "Enter".to_string(),
                selector: selector_for(event),
                optional: None,
            })
        }
        RawEventType::Hover => Some(Step::Hover {
            id: Some(event.id.clone()),
            selector: selector_for(event)?,
            optional: None,
        }),
        RawEventType::Scroll => Some(Step::Scroll {
            id: Some(event.id.clone()),
            selector: selector_for(event),
            x: event.scroll_x,
            y: event.scroll_y,
            optional: None,
        }),
        RawEventType::Select => Some(Step::Select {
            id: Some(event.id.clone()),
            selector: selector_for(event)?,
            value: event.value.clone().unwrap_or_default(),
            optional: None,
        }),
    }
}

/// Single left-to-right pass: adjacent `type` steps against the same
/// selector collapse into one, keeping the later value and sensitivity flag
/// (spec §4.4 "Type-step merging").
fn merge_adjacent_type_steps(steps: Vec<Step>) -> Vec<Step> {
    let mut merged: Vec<Step> = Vec::with_capacity(steps.len());
    for step in steps {
        if let (Some(Step::Type { selector: prev_selector, .. }), Step::Type { selector, .. }) =
            (merged.last(), &step)
        {
            if prev_selector == selector {
                merged.pop();
            }
        }
        merged.push(step);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::TargetInfo;

    fn target(test_id: &str) -> TargetInfo {
        TargetInfo {
            test_id: Some(test_id.to_string()),
            role: None,
            aria_label: None,
            id: None,
            name: None,
            tag: Some("input".into()),
            text: None,
            classes: vec![],
            depth: 1,
            is_unique: true,
        }
    }

    fn event(id: &str, event_type: RawEventType) -> RawEvent {
        RawEvent {
            id: id.to_string(),
            event_type,
            timestamp: 0,
            url: None,
            target: None,
            value: None,
            is_sensitive: false,
            key: None,
            scroll_x: None,
            scroll_y: None,
        }
    }

    #[test]
    fn navigation_same_origin_reduces_to_relative_path() {
        let mut e = event("e1", RawEventType::Navigation);
        e.url = Some("https://app.example.com/dashboard".into());
        let steps = transform(&[e], Some("app.example.com"));
        match &steps[0] {
            Step::Navigate { url, .. } => assert_eq!(url, "/dashboard"),
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[test]
    fn input_events_are_dropped_blur_carries_value() {
        let mut input = event("e1", RawEventType::Input);
        input.target = Some(target("email"));
        input.value = Some("partial".into());

        let mut blur = event("e2", RawEventType::Blur);
        blur.target = Some(target("email"));
        blur.value = Some("final@example.com".into());

        let steps = transform(&[input, blur], None);
        assert_eq!(steps.len(), 1);
        match &steps[0] {
            Step::Type { value, .. } => assert_eq!(value, "final@example.com"),
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[test]
    fn keydown_enter_becomes_keypress() {
        let mut e = event("e1", RawEventType::Keydown);
        e.key = Some("Enter".into());
        let steps = transform(&[e], None);
        match &steps[0] {
            Step::Keypress { key, .. } => assert_eq!(key, "Enter"),
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[test]
    fn keydown_non_enter_is_dropped() {
        let mut a = event("e1", RawEventType::Keydown);
        a.key = Some("a".into());
        let mut tab = event("e2", RawEventType::Keydown);
        tab.key = Some("Tab".into());
        let steps = transform(&[a, tab], None);
        assert!(steps.is_empty());
    }

    #[test]
    fn adjacent_type_steps_on_same_selector_merge_keeping_later_value() {
        let mut blur1 = event("e1", RawEventType::Blur);
        blur1.target = Some(target("email"));
        blur1.value = Some("a".into());

        let mut blur2 = event("e2", RawEventType::Blur);
        blur2.target = Some(target("email"));
        blur2.value = Some("ab".into());

        let steps = transform(&[blur1, blur2], None);
        assert_eq!(steps.len(), 1);
        match &steps[0] {
            Step::Type { value, .. } => assert_eq!(value, "ab"),
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[test]
    fn type_steps_on_different_selectors_do_not_merge() {
        let mut blur1 = event("e1", RawEventType::Blur);
        blur1.target = Some(target("email"));
        blur1.value = Some("a".into());

        let mut blur2 = event("e2", RawEventType::Blur);
        blur2.target = Some(target("password"));
        blur2.value = Some("b".into());

        let steps = transform(&[blur1, blur2], None);
        assert_eq!(steps.len(), 2);
    }
}
