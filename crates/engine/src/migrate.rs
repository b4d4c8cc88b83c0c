//! One-time normalization of deprecated field names.
//!
//! Older step records stored the target knowledge base under `dataset_id`.
//! This module is the only code aware of that name.

use kbstep_core::{Action, FieldValue, RawConfig};

use crate::buffer::ConfigBuffer;

const CANONICAL_DATASET: &str = "dataset";
const LEGACY_DATASET: &str = "dataset_id";

/// Build the edit buffer for a stored record.
///
/// Copies `dataset_id` into `dataset` when `dataset` is absent or blank.
/// The legacy key is left in place; it is never an active field so it never
/// reaches the store again.
pub fn migrate(raw: RawConfig, default_action: Action) -> ConfigBuffer {
    let mut buffer = ConfigBuffer::from_record(raw, default_action);

    let canonical_empty = buffer
        .get(CANONICAL_DATASET)
        .is_none_or(FieldValue::is_empty);
    let legacy = buffer
        .get(LEGACY_DATASET)
        .filter(|v| !v.is_empty())
        .cloned();

    if canonical_empty && let Some(legacy) = legacy {
        tracing::debug!(from = LEGACY_DATASET, to = CANONICAL_DATASET, "migrated legacy field");
        buffer.set(CANONICAL_DATASET, legacy);
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawConfig {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
            .collect()
    }

    #[test]
    fn legacy_id_fills_missing_dataset() {
        let buffer = migrate(record(&[("dataset_id", "kb1")]), Action::AppendChunk);
        assert_eq!(buffer.values(), &record(&[("dataset", "kb1"), ("dataset_id", "kb1")]));
    }

    #[test]
    fn legacy_id_fills_blank_dataset() {
        let buffer = migrate(
            record(&[("dataset", ""), ("dataset_id", "kb1")]),
            Action::AppendChunk,
        );
        assert_eq!(buffer.get("dataset"), Some(&FieldValue::from("kb1")));
    }

    #[test]
    fn canonical_value_wins() {
        let buffer = migrate(
            record(&[("dataset", "kb2"), ("dataset_id", "kb1")]),
            Action::AppendChunk,
        );
        assert_eq!(buffer.get("dataset"), Some(&FieldValue::from("kb2")));
    }

    #[test]
    fn blank_legacy_value_is_ignored() {
        let buffer = migrate(record(&[("dataset_id", "")]), Action::AppendChunk);
        assert_eq!(buffer.get("dataset"), None);
    }

    #[test]
    fn migration_is_idempotent() {
        for raw in [
            record(&[("dataset_id", "kb1")]),
            record(&[("dataset", "kb2"), ("dataset_id", "kb1")]),
            record(&[("action", "delete_chunk"), ("chunk_id", "c1")]),
            RawConfig::new(),
        ] {
            let once = migrate(raw, Action::AppendChunk);
            let twice = migrate(once.to_record(), Action::AppendChunk);
            assert_eq!(once, twice);
        }
    }
}
