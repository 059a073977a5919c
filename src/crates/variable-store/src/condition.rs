//! Condition evaluation (spec §4.3 `evaluateCondition` / `evaluateCompound`).

use crate::{interpolate, path, regex_safety};
use flow_core::{
    Condition, ConditionEvalResult, ConditionNode, ConditionOperator, CompoundCondition, VarValue,
};

/// Resolves an operand string per spec §4.3 step 1: if it is exactly one
/// `{{ expr }}` placeholder, look up `expr` as a path (missing ⇒ `None`);
/// otherwise try to JSON-parse it (so numeric/boolean/array literals parse
/// as such); otherwise keep it as a plain string.
fn resolve_operand(root: &VarValue, operand: &str) -> Option<VarValue> {
    if let Some(key) = interpolate::as_sole_placeholder(operand) {
        return path::get(root, key).cloned();
    }
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(operand) {
        return Some(VarValue::from_json(json));
    }
    Some(VarValue::String(operand.to_string()))
}

fn deep_eq(a: &VarValue, b: &VarValue) -> bool {
    a == b
}

/// Evaluates a single [`Condition`] against `root`. Never panics: any
/// failure mode (unsafe regex, non-numeric comparison, ...) becomes
/// `{result: false, error: Some(..)}` rather than propagating.
pub fn evaluate_condition(root: &VarValue, cond: &Condition) -> ConditionEvalResult {
    let left = resolve_operand(root, &cond.left).unwrap_or(VarValue::Null);
    let left_exists = !cond.left.is_empty()
        && interpolate::as_sole_placeholder(&cond.left)
            .map(|key| path::get(root, key).is_some())
            .unwrap_or(true);

    if cond.operator.is_unary() {
        let result = match cond.operator {
            ConditionOperator::Exists => left_exists && !left.is_null(),
            ConditionOperator::IsEmpty => !left_exists || left.is_empty(),
            _ => unreachable!(),
        };
        return ConditionEvalResult {
            result,
            left_value: left.to_json(),
            right_value: None,
            error: None,
        };
    }

    let right_str = match &cond.right {
        Some(r) => r,
        None => {
            return ConditionEvalResult {
                result: false,
                left_value: left.to_json(),
                right_value: None,
                error: Some(format!("operator {:?} requires a right operand", cond.operator)),
            }
        }
    };
    let right = resolve_operand(root, right_str).unwrap_or(VarValue::Null);

    let outcome: Result<bool, String> = match cond.operator {
        ConditionOperator::Eq => Ok(deep_eq(&left, &right)),
        ConditionOperator::Ne => Ok(!deep_eq(&left, &right)),
        ConditionOperator::Gt | ConditionOperator::Gte | ConditionOperator::Lt | ConditionOperator::Lte => {
            match (left.as_f64(), right.as_f64()) {
                (Some(l), Some(r)) => Ok(match cond.operator {
                    ConditionOperator::Gt => l > r,
                    ConditionOperator::Gte => l >= r,
                    ConditionOperator::Lt => l < r,
                    ConditionOperator::Lte => l <= r,
                    _ => unreachable!(),
                }),
                _ => Err("operands are not numeric".to_string()),
            }
        }
        ConditionOperator::Contains => {
            Ok(left.interpolated_string().contains(&right.interpolated_string()))
        }
        ConditionOperator::StartsWith => {
            Ok(left.interpolated_string().starts_with(&right.interpolated_string()))
        }
        ConditionOperator::EndsWith => {
            Ok(left.interpolated_string().ends_with(&right.interpolated_string()))
        }
        ConditionOperator::Matches => {
            let pattern = right.interpolated_string();
            match regex_safety::check(&pattern) {
                Ok(()) => regex::Regex::new(&pattern)
                    .map(|re| re.is_match(&left.interpolated_string()))
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            }
        }
        ConditionOperator::Exists | ConditionOperator::IsEmpty => unreachable!("handled above"),
    };

    match outcome {
        Ok(result) => ConditionEvalResult {
            result,
            left_value: left.to_json(),
            right_value: Some(right.to_json()),
            error: None,
        },
        Err(error) => ConditionEvalResult {
            result: false,
            left_value: left.to_json(),
            right_value: Some(right.to_json()),
            error: Some(error),
        },
    }
}

/// Evaluates a compound condition tree. Per the documented design decision
/// (DESIGN.md "Open Question decisions" #3): all branches are evaluated
/// eagerly, even after one fails, so that every error surfaces rather than
/// only the first. `and`/`or` fold the boolean results with the usual
/// semantics once every branch has been evaluated.
pub fn evaluate_compound(root: &VarValue, compound: &CompoundCondition) -> ConditionEvalResult {
    let (conditions, is_and) = match compound {
        CompoundCondition::And { conditions } => (conditions, true),
        CompoundCondition::Or { conditions } => (conditions, false),
    };

    let mut results = Vec::with_capacity(conditions.len());
    let mut first_error = None;
    for node in conditions {
        let r = evaluate_node(root, node);
        if first_error.is_none() {
            first_error = r.error.clone();
        }
        results.push(r.result);
    }

    let result = if is_and {
        results.iter().all(|b| *b)
    } else {
        results.iter().any(|b| *b)
    };

    ConditionEvalResult {
        result,
        left_value: serde_json::Value::Array(results.into_iter().map(serde_json::Value::Bool).collect()),
        right_value: None,
        error: first_error,
    }
}

pub fn evaluate_node(root: &VarValue, node: &ConditionNode) -> ConditionEvalResult {
    match node {
        ConditionNode::Leaf(c) => evaluate_condition(root, c),
        ConditionNode::Compound(c) => evaluate_compound(root, c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn root_with(key: &str, value: VarValue) -> VarValue {
        let mut m = BTreeMap::new();
        m.insert(key.to_string(), value);
        VarValue::Object(m)
    }

    fn cond(left: &str, op: ConditionOperator, right: Option<&str>) -> Condition {
        Condition { left: left.to_string(), operator: op, right: right.map(|s| s.to_string()) }
    }

    #[test]
    fn exists_true_when_variable_present() {
        let root = root_with("token", VarValue::from("abc"));
        let c = cond("{{ token }}", ConditionOperator::Exists, None);
        assert!(evaluate_condition(&root, &c).result);
    }

    #[test]
    fn exists_false_when_variable_missing() {
        let root = VarValue::Object(BTreeMap::new());
        let c = cond("{{ token }}", ConditionOperator::Exists, None);
        assert!(!evaluate_condition(&root, &c).result);
    }

    #[test]
    fn unsafe_regex_is_rejected_as_error() {
        let root = root_with("s", VarValue::from("hello"));
        let c = cond("{{ s }}", ConditionOperator::Matches, Some("(a+)+"));
        let r = evaluate_condition(&root, &c);
        assert!(!r.result);
        assert!(r.error.unwrap().contains("ReDoS"));
    }

    #[test]
    fn gt_numeric_coercion() {
        let root = VarValue::Object(BTreeMap::new());
        let c = cond("5", ConditionOperator::Gt, Some("3"));
        assert!(evaluate_condition(&root, &c).result);
    }

    #[test]
    fn is_empty_true_for_missing_and_empty_string() {
        let root = root_with("s", VarValue::from(""));
        assert!(evaluate_condition(&root, &cond("{{ s }}", ConditionOperator::IsEmpty, None)).result);
        assert!(evaluate_condition(&root, &cond("{{ missing }}", ConditionOperator::IsEmpty, None)).result);
    }

    #[test]
    fn compound_and_requires_all_true() {
        let root = root_with("n", VarValue::from(5.0));
        let conditions = vec![
            ConditionNode::Leaf(cond("{{ n }}", ConditionOperator::Gt, Some("1"))),
            ConditionNode::Leaf(cond("{{ n }}", ConditionOperator::Lt, Some("10"))),
        ];
        let compound = CompoundCondition::And { conditions };
        assert!(evaluate_compound(&root, &compound).result);
    }

    #[test]
    fn compound_evaluates_all_branches_eagerly() {
        let root = VarValue::Object(BTreeMap::new());
        let conditions = vec![
            ConditionNode::Leaf(cond("a", ConditionOperator::Matches, Some("(a+)+"))),
            ConditionNode::Leaf(cond("a", ConditionOperator::Eq, Some("\"a\""))),
        ];
        let compound = CompoundCondition::Or { conditions };
        let r = evaluate_compound(&root, &compound);
        // Second branch is true, so `or` is true, but the error from the
        // first (unsafe regex) branch still surfaces.
        assert!(r.result);
        assert!(r.error.is_some());
    }
}
