//! Field declarations shared by every knowledge-base action.
//!
//! The registry is a fixed table. Nothing mutates it at runtime; lookups of a
//! name that is not declared here are programming errors and surface as
//! [`CoreError::UnknownField`].

use crate::error::CoreError;
use crate::field_value::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text.
    Text,
    /// Multi-line text.
    LongText,
    Boolean,
    /// An id, a name, or a variable reference such as `{begin@dataset}`.
    Identifier,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::LongText => "long_text",
            Self::Boolean => "boolean",
            Self::Identifier => "identifier",
        }
    }
}

/// Extra rule applied to non-empty values after the kind check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// Text must parse as a JSON object.
    JsonObject,
    /// Text must be one of the listed values.
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: DefaultValue,
    pub format: Option<FieldFormat>,
}

/// Compile-time default; converted to a [`FieldValue`] on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Text(&'static str),
    Boolean(bool),
}

impl DefaultValue {
    pub fn to_value(self) -> FieldValue {
        match self {
            Self::Text(s) => FieldValue::Text(s.to_string()),
            Self::Boolean(b) => FieldValue::Boolean(b),
        }
    }
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind, default: DefaultValue) -> Self {
        Self {
            name,
            kind,
            default,
            format: None,
        }
    }

    const fn with_format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn default_value(&self) -> FieldValue {
        self.default.to_value()
    }
}

pub const CHUNK_METHODS: &[&str] = &[
    "naive",
    "manual",
    "qa",
    "table",
    "paper",
    "book",
    "laws",
    "presentation",
    "picture",
    "one",
    "knowledge_graph",
    "email",
    "tag",
];

const EMPTY: DefaultValue = DefaultValue::Text("");

static FIELDS: [FieldSpec; 13] = [
    FieldSpec::new("dataset", FieldKind::Identifier, EMPTY),
    FieldSpec::new("document_id", FieldKind::Identifier, EMPTY),
    FieldSpec::new("document_name", FieldKind::Text, EMPTY),
    FieldSpec::new("chunk_id", FieldKind::Identifier, EMPTY),
    FieldSpec::new("content", FieldKind::LongText, EMPTY),
    FieldSpec::new("filename", FieldKind::Text, DefaultValue::Text("update.md")),
    FieldSpec::new("mime", FieldKind::Text, DefaultValue::Text("text/markdown")),
    FieldSpec::new("chunk_method", FieldKind::Text, EMPTY)
        .with_format(FieldFormat::OneOf(CHUNK_METHODS)),
    FieldSpec::new("parser_config", FieldKind::LongText, EMPTY)
        .with_format(FieldFormat::JsonObject),
    FieldSpec::new("parse", FieldKind::Boolean, DefaultValue::Boolean(true)),
    FieldSpec::new("enabled", FieldKind::Boolean, DefaultValue::Boolean(true)),
    FieldSpec::new("important_keywords", FieldKind::Text, EMPTY),
    FieldSpec::new("questions", FieldKind::LongText, EMPTY),
];

static GLOBAL: SchemaRegistry = SchemaRegistry { fields: &FIELDS };

#[derive(Debug)]
pub struct SchemaRegistry {
    fields: &'static [FieldSpec],
}

impl SchemaRegistry {
    pub fn global() -> &'static SchemaRegistry {
        &GLOBAL
    }

    pub fn get(&self, name: &str) -> Result<&FieldSpec, CoreError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| CoreError::UnknownField(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn all(&self) -> &[FieldSpec] {
        self.fields
    }

    pub fn default_for(&self, name: &str) -> Result<FieldValue, CoreError> {
        Ok(self.get(name)?.default_value())
    }
}
