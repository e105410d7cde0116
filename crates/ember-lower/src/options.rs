// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lowering configuration.

use crate::ErrorPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct LowerOptions {
    pub module_name: String,
    /// Name of the function wrapping the top-level statements
    pub entry_name: String,
    /// Name of the string output helper programs call
    pub helper_name: String,
    /// Name the loop induction variable is bound to inside loop bodies
    pub induction_name: String,
    pub target_triple: Option<String>,
    pub policy: ErrorPolicy,
}

impl Default for LowerOptions {
    fn default() -> Self {
        Self {
            module_name: "main".to_string(),
            entry_name: "main".to_string(),
            helper_name: "println".to_string(),
            induction_name: "i".to_string(),
            target_triple: None,
            policy: ErrorPolicy::BestEffort,
        }
    }
}

impl LowerOptions {
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_target_triple(mut self, triple: impl Into<String>) -> Self {
        self.target_triple = Some(triple.into());
        self
    }
}
