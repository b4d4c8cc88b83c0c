use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::{ACTION_KEY, Action};
use crate::field_value::FieldValue;

/// A record as held by the external store, before migration.
pub type RawConfig = BTreeMap<String, FieldValue>;

/// Configuration change carrying the discriminator and the active fields only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedUpdate {
    pub action: Action,
    pub fields: BTreeMap<String, FieldValue>,
}

impl NormalizedUpdate {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Names whose values differ from `previous`, including added and removed keys.
    pub fn changed_fields(&self, previous: &NormalizedUpdate) -> Vec<String> {
        let mut changed: Vec<String> = self
            .fields
            .iter()
            .filter(|(k, v)| previous.fields.get(*k) != Some(*v))
            .map(|(k, _)| k.clone())
            .collect();
        changed.extend(
            previous
                .fields
                .keys()
                .filter(|k| !self.fields.contains_key(*k))
                .cloned(),
        );
        if self.action != previous.action {
            changed.push(ACTION_KEY.to_string());
        }
        changed.sort();
        changed
    }

    /// Flatten into a store record with the discriminator under `action`.
    pub fn to_record(&self) -> RawConfig {
        let mut record = self.fields.clone();
        record.insert(
            ACTION_KEY.to_string(),
            FieldValue::Text(self.action.as_str().to_string()),
        );
        record
    }
}
