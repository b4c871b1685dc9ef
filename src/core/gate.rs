//! Gate evaluation - skip flags emitted by upstream stages

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Decision produced by evaluating a gate flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateDecision {
    /// Downstream execution may proceed
    Permit,
    /// Downstream execution is skipped
    Deny,
}

impl GateDecision {
    pub fn is_permit(&self) -> bool {
        matches!(self, GateDecision::Permit)
    }
}

/// Evaluate a raw flag value.
///
/// Only the literal string `"true"` denies. An unset flag permits:
/// absence of a skip signal must not block downstream stages.
pub fn evaluate_flag(flag: Option<&str>) -> GateDecision {
    match flag {
        Some("true") => GateDecision::Deny,
        _ => GateDecision::Permit,
    }
}

/// A gate on a stage, driven by an upstream output variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    /// Name of the host variable holding the flag
    pub variable: String,
}

impl Gate {
    /// Evaluate this gate against a set of host-supplied variables
    pub fn evaluate(&self, host: &HashMap<String, String>) -> GateDecision {
        evaluate_flag(host.get(&self.variable).map(String::as_str))
    }
}
