//! The `VariableStore` itself (spec §4.3).
//!
//! Owned by a single flow run (spec §3 "Ownership & lifetimes"). It is
//! created fresh per flow execution from that flow's `initialVariables`, and
//! requires no internal locking because a run's store is never shared
//! across concurrent flows (spec §5).

use crate::{condition, interpolate, jsonpath, path};
use flow_core::{Condition, ConditionEvalResult, ConditionNode, VarValue};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct VariableStore {
    root: VarValue,
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableStore {
    pub fn new() -> Self {
        VariableStore { root: VarValue::Object(BTreeMap::new()) }
    }

    pub fn from_initial(initial: BTreeMap<String, VarValue>) -> Self {
        VariableStore { root: VarValue::Object(initial) }
    }

    pub fn get(&self, path: &str) -> Option<&VarValue> {
        path::get(&self.root, path)
    }

    pub fn set(&mut self, path: &str, value: VarValue) {
        path::set(&mut self.root, path, value);
    }

    /// All top-level bindings, e.g. for coercing into driver-safe
    /// primitives before a `scenario` node dispatch (spec §4.1).
    pub fn bindings(&self) -> &BTreeMap<String, VarValue> {
        self.root.as_object().expect("root is always an object")
    }

    /// `{{ key }}` template interpolation (spec §4.3).
    pub fn interpolate(&self, template: &str, throw_on_missing: bool) -> Result<String, String> {
        interpolate::interpolate(&self.root, template, throw_on_missing)
    }

    /// Read-only JSONPath (leading `$.`) dispatched over the flattened root
    /// of all top-level variables (spec §4.3 "Addressing").
    pub fn extract_json_path(&self, data: &VarValue, json_path: &str) -> Option<VarValue> {
        jsonpath::extract(data, json_path)
    }

    /// `extractAndStore(name, data, path, default?)` (spec §4.3).
    pub fn extract_and_store(
        &mut self,
        name: &str,
        data: &VarValue,
        json_path: Option<&str>,
        default: Option<VarValue>,
    ) {
        let resolved = match json_path {
            Some(p) => jsonpath::extract(data, p),
            None => Some(data.clone()),
        };
        let value = resolved.or(default).unwrap_or(VarValue::Null);
        self.set(name, value);
    }

    pub fn evaluate_condition(&self, cond: &Condition) -> ConditionEvalResult {
        condition::evaluate_condition(&self.root, cond)
    }

    pub fn evaluate_node(&self, node: &ConditionNode) -> ConditionEvalResult {
        condition::evaluate_node(&self.root, node)
    }

    /// Deep copy of all bindings, independent of later mutation (spec §4.3
    /// "Snapshot/restore").
    pub fn snapshot(&self) -> VarValue {
        self.root.clone()
    }

    pub fn restore(&mut self, snapshot: VarValue) {
        self.root = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn snapshot_restore_is_independent_of_later_mutation() {
        let mut store = VariableStore::new();
        store.set("a.b", VarValue::from("1"));
        let snap = store.snapshot();
        store.set("a.b", VarValue::from("2"));
        store.restore(snap);
        assert_eq!(store.get("a.b"), Some(&VarValue::from("1")));
    }

    #[test]
    fn extract_and_store_falls_back_to_default() {
        let mut store = VariableStore::new();
        let data = VarValue::from_json(serde_json::json!({"auth": {}}));
        store.extract_and_store("token", &data, Some("$.auth.token"), Some(VarValue::from("none")));
        assert_eq!(store.get("token"), Some(&VarValue::from("none")));
    }

    proptest! {
        #[test]
        fn set_then_get_roundtrips(key in "[a-z]{1,6}", value in "[a-zA-Z0-9]{0,10}") {
            let mut store = VariableStore::new();
            store.set(&key, VarValue::from(value.clone()));
            prop_assert_eq!(store.get(&key), Some(&VarValue::from(value)));
        }
    }
}
