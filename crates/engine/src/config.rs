use kbstep_core::Action;
use serde::Deserialize;

use crate::error::EngineError;
use crate::sync::DraftPolicy;

/// Editor settings, usually read from a `[kb_editor]`-style TOML table.
///
/// ```toml
/// draft_policy = "provisional"
/// default_action = "delete_chunk"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub draft_policy: DraftPolicy,
    /// Discriminator used when a stored record has none.
    pub default_action: Action,
}

impl EditorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, EngineError> {
        Ok(toml::from_str(s)?)
    }

    pub fn with_draft_policy(mut self, policy: DraftPolicy) -> Self {
        self.draft_policy = policy;
        self
    }
}
