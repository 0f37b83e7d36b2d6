//! Collection traits
//!
//! [`Repository`] uses return-position `impl Trait` in traits, so backends
//! implement it with plain `async fn` and callers stay generic without boxing.
//!
//! [`Document`] describes a stored entity well enough for a backend to keep it
//! as JSON: its identifier, how a create draft becomes a full document, and
//! which fields an update may never touch.

use std::fmt::Display;
use std::future::Future;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use super::error::RepositoryError;
use crate::query::QuerySpec;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Field-by-field changes merged onto a stored document
pub type Patch = Map<String, Value>;

/// Async CRUD over a document collection
pub trait Repository<Id, Entity, Create, Update>: Send + Sync {
    /// Number of documents in the collection
    fn count_all(&self) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Number of documents matching the search and filter criteria of `spec`
    ///
    /// The pagination window of `spec` is ignored.
    fn count_matching(&self, spec: &QuerySpec)
        -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Matching documents in insertion order, restricted to the window of `spec`
    fn fetch_page(&self, spec: &QuerySpec)
        -> impl Future<Output = RepositoryResult<Vec<Entity>>> + Send;

    /// Load a document by identifier
    fn find_by_id(&self, id: &Id) -> impl Future<Output = RepositoryResult<Option<Entity>>> + Send;

    /// Insert a new document, assigning its identifier and creation time
    fn create(&self, data: Create) -> impl Future<Output = RepositoryResult<Entity>> + Send;

    /// Merge `data` onto a stored document and return the result
    ///
    /// Returns `Ok(None)` when no document has this identifier.
    fn update(
        &self,
        id: &Id,
        data: Update,
    ) -> impl Future<Output = RepositoryResult<Option<Entity>>> + Send;

    /// Remove a document, returning whether it existed
    fn delete(&self, id: &Id) -> impl Future<Output = RepositoryResult<bool>> + Send;
}

/// An entity stored as a JSON document
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identifier type
    type Id: Clone + Eq + Display + Send + Sync + 'static;

    /// Data accepted by `create`
    type Draft: Send + 'static;

    /// Entity name used in errors and logs
    const ENTITY: &'static str;

    /// JSON field holding the identifier
    const ID_FIELD: &'static str;

    /// JSON fields an update never changes
    const IMMUTABLE_FIELDS: &'static [&'static str];

    /// This document's identifier
    fn id(&self) -> &Self::Id;

    /// Build a complete document from a draft, assigning identifier and timestamps
    fn from_draft(draft: Self::Draft) -> Self;
}

/// Merge `patch` onto the JSON form of `current` and decode the result
///
/// Immutable fields in `patch` are skipped. A merge that no longer decodes as
/// `D` is a validation failure.
pub fn merge_patch<D: Document>(current: &D, patch: Patch) -> RepositoryResult<D> {
    use super::error::RepositoryOperation;

    let mut value = serde_json::to_value(current)
        .map_err(|e| RepositoryError::serialization_error(RepositoryOperation::Update, e.to_string()))?;

    if let Value::Object(fields) = &mut value {
        for (key, new_value) in patch {
            if D::IMMUTABLE_FIELDS.contains(&key.as_str()) {
                continue;
            }
            fields.insert(key, new_value);
        }
    }

    serde_json::from_value(value).map_err(|e| {
        RepositoryError::validation_failed(RepositoryOperation::Update, e.to_string())
            .with_entity(D::ENTITY, current.id().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryErrorKind;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        title: String,
        #[serde(default)]
        pinned: bool,
    }

    impl Document for Note {
        type Id = String;
        type Draft = String;
        const ENTITY: &'static str = "Note";
        const ID_FIELD: &'static str = "id";
        const IMMUTABLE_FIELDS: &'static [&'static str] = &["id"];

        fn id(&self) -> &String {
            &self.id
        }

        fn from_draft(title: String) -> Self {
            Self {
                id: "n1".to_string(),
                title,
                pinned: false,
            }
        }
    }

    fn patch(value: Value) -> Patch {
        match value {
            Value::Object(map) => map,
            _ => panic!("patch must be an object"),
        }
    }

    #[test]
    fn test_merge_changes_only_given_fields() {
        let note = Note::from_draft("groceries".to_string());
        let merged = merge_patch(&note, patch(json!({ "pinned": true }))).unwrap();
        assert_eq!(merged.title, "groceries");
        assert!(merged.pinned);
    }

    #[test]
    fn test_merge_ignores_immutable_fields() {
        let note = Note::from_draft("groceries".to_string());
        let merged = merge_patch(&note, patch(json!({ "id": "n2", "title": "chores" }))).unwrap();
        assert_eq!(merged.id, "n1");
        assert_eq!(merged.title, "chores");
    }

    #[test]
    fn test_merge_rejects_invalid_result() {
        let note = Note::from_draft("groceries".to_string());
        let err = merge_patch(&note, patch(json!({ "pinned": "yes" }))).unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::ValidationFailed);
        assert_eq!(err.entity_id.as_deref(), Some("n1"));
    }
}
