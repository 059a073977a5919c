//! Scenario entity (spec §3).

use crate::step::Step;
use crate::variable::VarValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        // Matches the recorder extension's default capture viewport.
        Viewport { width: 1280, height: 720 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub url: String,
    #[serde(default)]
    pub viewport: Viewport,
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub setup: Vec<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teardown: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_variables: Option<BTreeMap<String, VarValue>>,
    pub ast_schema_version: u32,
}

impl Scenario {
    pub fn total_step_count(&self) -> usize {
        self.steps.len()
    }
}

/// Driver construction options recognized by the `ScenarioRunner` capability
/// (spec §6). Callers of the Flow Execution Engine and the Scenario
/// Execution Service share this shape so `runnerOptions` passed to
/// `Execute(flow, options)` forwards unchanged into scenario dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunnerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headless: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_on_failure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_failure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}
