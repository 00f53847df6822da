//! Per-collection field-name configuration.

/// Field names used to interpret documents from a source collection.
///
/// Source collections disagree on how the unique id and the modification
/// timestamp are spelled, so both names are explicit configuration rather
/// than being guessed from the source URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    /// Field holding the document's unique id. When `None`, documents are
    /// treated as a single fixed resource with an empty id.
    pub id_field: Option<String>,
    /// Field holding the document's last-modified timestamp.
    pub modified_field: String,
}

impl FieldMap {
    /// Creates a field map with the given id and modified-timestamp fields.
    pub fn new(id_field: impl Into<String>, modified_field: impl Into<String>) -> Self {
        Self {
            id_field: Some(id_field.into()),
            modified_field: modified_field.into(),
        }
    }

    /// Creates a field map without an id field.
    pub fn without_id(modified_field: impl Into<String>) -> Self {
        Self {
            id_field: None,
            modified_field: modified_field.into(),
        }
    }

    /// Returns true when an id field is configured.
    pub fn has_id_field(&self) -> bool {
        self.id_field.is_some()
    }
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::without_id("lastModified")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_id_field() {
        let fields = FieldMap::default();
        assert_eq!(fields.id_field, None);
        assert_eq!(fields.modified_field, "lastModified");
    }

    #[test]
    fn explicit_fields() {
        let fields = FieldMap::new("DocumentId", "ModifiedOn");
        assert_eq!(fields.id_field.as_deref(), Some("DocumentId"));
        assert_eq!(fields.modified_field, "ModifiedOn");
    }
}
