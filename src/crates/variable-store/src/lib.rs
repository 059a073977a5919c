//! Typed, path-addressable variable context used for both template
//! substitution in step inputs and condition evaluation at branch nodes
//! (spec §4.3), with a regex-safety gate guarding against
//! catastrophic-backtracking `matches` patterns.

pub mod condition;
pub mod interpolate;
pub mod jsonpath;
pub mod path;
pub mod regex_safety;
pub mod store;

pub use store::VariableStore;
