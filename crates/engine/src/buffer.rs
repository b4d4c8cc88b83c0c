use std::collections::BTreeMap;

use kbstep_core::{ACTION_KEY, Action, ActionProfile, CoreError, FieldValue, RawConfig};

/// Live edit state of one step: the discriminator plus every value ever
/// entered, whether or not the current action uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBuffer {
    discriminator: String,
    values: BTreeMap<String, FieldValue>,
}

impl ConfigBuffer {
    pub fn new(discriminator: impl Into<String>, values: BTreeMap<String, FieldValue>) -> Self {
        Self {
            discriminator: discriminator.into(),
            values,
        }
    }

    /// Split a stored record into discriminator and values, as-is.
    ///
    /// A missing or blank `action` falls back to `default_action`. Any other
    /// value is kept verbatim so the resolver can reject it.
    pub fn from_record(mut record: RawConfig, default_action: Action) -> Self {
        let discriminator = match record.remove(ACTION_KEY) {
            None | Some(FieldValue::Null) => default_action.as_str().to_string(),
            Some(FieldValue::Text(s)) if s.trim().is_empty() => default_action.as_str().to_string(),
            Some(FieldValue::Text(s)) => s,
            Some(FieldValue::Boolean(b)) => b.to_string(),
            Some(FieldValue::Integer(n)) => n.to_string(),
            Some(FieldValue::Float(f)) => f.to_string(),
        };
        Self::new(discriminator, record)
    }

    /// Inverse of [`ConfigBuffer::from_record`]; keeps every value.
    pub fn to_record(&self) -> RawConfig {
        let mut record = self.values.clone();
        record.insert(
            ACTION_KEY.to_string(),
            FieldValue::Text(self.discriminator.clone()),
        );
        record
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn profile(&self) -> Result<&'static ActionProfile, CoreError> {
        kbstep_core::resolve(&self.discriminator)
    }

    pub(crate) fn set(&mut self, name: &str, value: FieldValue) -> bool {
        match self.values.get(name) {
            Some(existing) if *existing == value => false,
            _ => {
                self.values.insert(name.to_string(), value);
                true
            }
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.values.remove(name)
    }

    pub(crate) fn set_discriminator(&mut self, action: Action) {
        self.discriminator = action.as_str().to_string();
    }
}
