pub mod action;
pub mod catalog;
pub mod error;
pub mod field_value;
pub mod ids;
pub mod schema;
pub mod update;

pub use action::{ACTION_KEY, Action, ActionProfile, resolve};
pub use catalog::{Catalog, KnowledgeBase};
pub use error::CoreError;
pub use field_value::FieldValue;
pub use ids::*;
pub use schema::{FieldFormat, FieldKind, FieldSpec, SchemaRegistry};
pub use update::{NormalizedUpdate, RawConfig};
