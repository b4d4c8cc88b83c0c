//! Action discriminator and the data-driven field-set table.
//!
//! Which fields are active depends on the action alone. No field value takes
//! part in the lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::schema::SchemaRegistry;

/// Key under which the discriminator is stored in a raw record.
pub const ACTION_KEY: &str = "action";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    AppendChunk,
    ReplaceDocument,
    DeleteDocument,
    DeleteChunk,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::AppendChunk,
        Action::ReplaceDocument,
        Action::DeleteDocument,
        Action::DeleteChunk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppendChunk => "append_chunk",
            Self::ReplaceDocument => "replace_document",
            Self::DeleteDocument => "delete_document",
            Self::DeleteChunk => "delete_chunk",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "append_chunk" => Ok(Self::AppendChunk),
            "replace_document" => Ok(Self::ReplaceDocument),
            "delete_document" => Ok(Self::DeleteDocument),
            "delete_chunk" => Ok(Self::DeleteChunk),
            _ => Err(CoreError::UnknownAction(s.to_string())),
        }
    }

    pub fn profile(&self) -> &'static ActionProfile {
        match self {
            Self::AppendChunk => &APPEND_CHUNK,
            Self::ReplaceDocument => &REPLACE_DOCUMENT,
            Self::DeleteDocument => &DELETE_DOCUMENT,
            Self::DeleteChunk => &DELETE_CHUNK,
        }
    }
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active and required fields for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionProfile {
    pub action: Action,
    /// Active fields, in display order.
    pub active: &'static [&'static str],
    pub required: &'static [&'static str],
}

impl ActionProfile {
    pub fn is_active(&self, field: &str) -> bool {
        self.active.iter().any(|f| *f == field)
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required.iter().any(|f| *f == field)
    }

    /// Every named field must be declared in the registry.
    pub fn check_against(&self, registry: &SchemaRegistry) -> Result<(), CoreError> {
        for name in self.active.iter().chain(self.required) {
            registry.get(name)?;
        }
        Ok(())
    }
}

static APPEND_CHUNK: ActionProfile = ActionProfile {
    action: Action::AppendChunk,
    active: &[
        "dataset",
        "content",
        "filename",
        "mime",
        "document_id",
        "document_name",
        "important_keywords",
        "questions",
    ],
    required: &["dataset", "content"],
};

static REPLACE_DOCUMENT: ActionProfile = ActionProfile {
    action: Action::ReplaceDocument,
    active: &[
        "dataset",
        "content",
        "filename",
        "mime",
        "chunk_method",
        "parser_config",
        "parse",
        "enabled",
    ],
    required: &["dataset", "content"],
};

static DELETE_DOCUMENT: ActionProfile = ActionProfile {
    action: Action::DeleteDocument,
    active: &["dataset"],
    required: &["dataset"],
};

static DELETE_CHUNK: ActionProfile = ActionProfile {
    action: Action::DeleteChunk,
    active: &["dataset", "document_id", "chunk_id"],
    required: &["dataset"],
};

/// Look up the profile for a discriminator string.
pub fn resolve(discriminator: &str) -> Result<&'static ActionProfile, CoreError> {
    Ok(Action::parse(discriminator)?.profile())
}
