//! Short opaque identifiers with a type prefix (spec §6: "All ids are short
//! opaque strings with a type prefix").

use rand::Rng;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

fn prefixed(prefix: &str, len: usize) -> String {
    format!("{prefix}-{}", random_suffix(len))
}

pub fn new_session_id() -> String {
    prefixed("session", 12)
}

pub fn new_scenario_id() -> String {
    prefixed("scenario", 12)
}

pub fn new_flow_id() -> String {
    prefixed("flow", 12)
}

pub fn new_result_id() -> String {
    prefixed("result", 12)
}

pub fn new_flow_result_id() -> String {
    prefixed("flowresult", 12)
}

/// Scenario execution ids are always 12 random chars, per spec §4.2 step 4.
pub fn new_execution_id() -> String {
    prefixed("exec", 12)
}
