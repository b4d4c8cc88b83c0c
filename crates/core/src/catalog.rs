use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub id: String,
    pub name: String,
}

/// Knowledge-base list supplied by an outside lookup service.
///
/// Display only: a dataset value that matches nothing here is still valid,
/// since it may be a variable reference resolved at run time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<KnowledgeBase>,
}

impl Catalog {
    pub fn new(entries: Vec<KnowledgeBase>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display name for a dataset value given by id or by name.
    pub fn label_for(&self, dataset: &str) -> Option<&str> {
        let dataset = dataset.trim();
        self.entries
            .iter()
            .find(|kb| kb.id == dataset)
            .or_else(|| self.entries.iter().find(|kb| kb.name == dataset))
            .map(|kb| kb.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            KnowledgeBase { id: "50bf01".into(), name: "SalesKB".into() },
            KnowledgeBase { id: "77aa02".into(), name: "Support".into() },
        ])
    }

    #[test]
    fn label_by_id_or_name() {
        let catalog = catalog();
        assert_eq!(catalog.label_for("50bf01"), Some("SalesKB"));
        assert_eq!(catalog.label_for("Support"), Some("Support"));
        assert_eq!(catalog.label_for("{begin@dataset}"), None);
    }
}
