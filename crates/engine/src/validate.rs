//! Validation of the active field subset.
//!
//! A [`RuleSet`] is built once per discriminator from the action profile and
//! the schema registry. Fields the action does not use are never looked at,
//! however malformed their stored values are.

use std::collections::BTreeMap;
use std::fmt;

use kbstep_core::{
    Action, ActionProfile, CoreError, FieldFormat, FieldKind, FieldSpec, FieldValue,
    NormalizedUpdate, SchemaRegistry,
};
use serde_json::{Map, Value as JsonValue};

use crate::buffer::ConfigBuffer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Required,
    TypeMismatch {
        expected: FieldKind,
        found: &'static str,
    },
    Malformed(String),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Required => f.write_str("required"),
            FieldError::TypeMismatch { expected, found } => {
                write!(f, "expected {}, found {found}", expected.as_str())
            }
            FieldError::Malformed(reason) => f.write_str(reason),
        }
    }
}

/// Every violation found in one pass, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.keys().map(String::as_str).collect()
    }

    fn insert(&mut self, field: &str, error: FieldError) {
        self.errors.insert(field.to_string(), error);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, error)) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone)]
struct FieldRule {
    spec: &'static FieldSpec,
    required: bool,
}

/// Resolved validation rules for one action.
#[derive(Debug, Clone)]
pub struct RuleSet {
    action: Action,
    rules: Vec<FieldRule>,
}

impl RuleSet {
    /// Fails with [`CoreError::UnknownField`] if the profile names a field the
    /// registry does not declare.
    pub fn resolve(
        profile: &ActionProfile,
        registry: &'static SchemaRegistry,
    ) -> Result<Self, CoreError> {
        profile.check_against(registry)?;
        let rules = profile
            .active
            .iter()
            .map(|name| -> Result<FieldRule, CoreError> {
                Ok(FieldRule {
                    spec: registry.get(name)?,
                    required: profile.is_required(name),
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        Ok(Self {
            action: profile.action,
            rules,
        })
    }

    pub fn for_action(action: Action) -> Result<Self, CoreError> {
        Self::resolve(action.profile(), SchemaRegistry::global())
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Active fields with defaults filled in for absent or null values.
    pub fn normalize(&self, buffer: &ConfigBuffer) -> NormalizedUpdate {
        let fields = self
            .rules
            .iter()
            .map(|rule| (rule.spec.name.to_string(), effective_value(buffer, rule.spec)))
            .collect();
        NormalizedUpdate {
            action: self.action,
            fields,
        }
    }

    pub fn validate(&self, buffer: &ConfigBuffer) -> Result<ValidatedConfig, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let mut values = BTreeMap::new();

        for rule in &self.rules {
            let value = effective_value(buffer, rule.spec);
            if let Err(error) = check_value(rule, &value) {
                errors.insert(rule.spec.name, error);
            }
            values.insert(rule.spec.name.to_string(), value);
        }

        if errors.is_empty() {
            Ok(ValidatedConfig {
                action: self.action,
                values,
            })
        } else {
            Err(errors)
        }
    }
}

/// Validate a buffer against a profile using the global registry.
pub fn validate(
    buffer: &ConfigBuffer,
    profile: &ActionProfile,
) -> Result<Result<ValidatedConfig, ValidationErrors>, CoreError> {
    Ok(RuleSet::resolve(profile, SchemaRegistry::global())?.validate(buffer))
}

fn effective_value(buffer: &ConfigBuffer, spec: &FieldSpec) -> FieldValue {
    match buffer.get(spec.name) {
        None | Some(FieldValue::Null) => spec.default_value(),
        Some(value) => value.clone(),
    }
}

fn check_value(rule: &FieldRule, value: &FieldValue) -> Result<(), FieldError> {
    let spec = rule.spec;
    match (spec.kind, value) {
        (FieldKind::Boolean, FieldValue::Boolean(_)) => return Ok(()),
        (FieldKind::Text | FieldKind::LongText | FieldKind::Identifier, FieldValue::Text(_))
        | (_, FieldValue::Null) => {}
        (expected, other) => {
            return Err(FieldError::TypeMismatch {
                expected,
                found: other.type_name(),
            });
        }
    }

    // Blank values are only ever a `Required` problem, whatever they contain.
    if value.is_empty() {
        return if rule.required {
            Err(FieldError::Required)
        } else {
            Ok(())
        };
    }
    let Some(text) = value.as_text() else {
        return Ok(());
    };

    match spec.kind {
        FieldKind::Text if text.contains(['\n', '\r']) => {
            Err(FieldError::Malformed("must be a single line".into()))
        }
        FieldKind::Identifier if text.trim() != text => Err(FieldError::Malformed(
            "must not have leading or trailing whitespace".into(),
        )),
        FieldKind::Identifier if text.chars().any(char::is_control) => Err(
            FieldError::Malformed("must not contain control characters".into()),
        ),
        _ => match spec.format {
            Some(format) if !is_variable_reference(text) => check_format(format, text),
            _ => Ok(()),
        },
    }
}

/// `{component@variable}`, filled in by the workflow at run time.
fn is_variable_reference(text: &str) -> bool {
    let plain = |part: &str| {
        !part.is_empty()
            && !part
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '"' | '@'))
    };
    text.trim()
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .and_then(|inner| inner.split_once('@'))
        .is_some_and(|(component, variable)| plain(component) && plain(variable))
}

fn check_format(format: FieldFormat, text: &str) -> Result<(), FieldError> {
    match format {
        FieldFormat::JsonObject => match serde_json::from_str::<JsonValue>(text) {
            Ok(JsonValue::Object(_)) => Ok(()),
            Ok(_) => Err(FieldError::Malformed("must be a JSON object".into())),
            Err(e) => Err(FieldError::Malformed(format!("invalid JSON: {e}"))),
        },
        FieldFormat::OneOf(allowed) => {
            let text = text.trim();
            if allowed.iter().any(|a| *a == text) {
                Ok(())
            } else {
                Err(FieldError::Malformed(format!(
                    "must be one of {}",
                    allowed.join("|")
                )))
            }
        }
    }
}

/// Active-field values that passed validation; what execution receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    action: Action,
    values: BTreeMap<String, FieldValue>,
}

impl ValidatedConfig {
    pub fn action(&self) -> Action {
        self.action
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Trimmed text; `None` when inactive or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(FieldValue::as_text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_boolean)
    }

    /// `important_keywords`, split on commas.
    pub fn keywords(&self) -> Vec<String> {
        self.text("important_keywords")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `questions`, one per non-blank line.
    pub fn questions(&self) -> Vec<String> {
        self.text("questions")
            .map(|s| {
                s.lines()
                    .map(str::trim)
                    .filter(|q| !q.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn parser_config(&self) -> Option<Map<String, JsonValue>> {
        match serde_json::from_str(self.text("parser_config")?) {
            Ok(JsonValue::Object(map)) => Some(map),
            _ => None,
        }
    }

    pub fn into_update(self) -> NormalizedUpdate {
        NormalizedUpdate {
            action: self.action,
            fields: self.values,
        }
    }
}
