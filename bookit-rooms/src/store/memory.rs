//! In-process document collection

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use super::matcher::document_matches;
use crate::query::QuerySpec;
use crate::repository::{
    merge_patch, Document, Patch, Repository, RepositoryError, RepositoryOperation,
    RepositoryResult,
};

/// Documents kept in insertion order behind an async lock
///
/// Cloning shares the underlying collection.
#[derive(Debug)]
pub struct MemoryStore<D> {
    documents: Arc<RwLock<Vec<D>>>,
}

impl<D> Clone for MemoryStore<D> {
    fn clone(&self) -> Self {
        Self {
            documents: Arc::clone(&self.documents),
        }
    }
}

impl<D> Default for MemoryStore<D> {
    fn default() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<D: Document> MemoryStore<D> {
    /// An empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection holding `documents` in the given order
    pub fn with_documents(documents: Vec<D>) -> Self {
        Self {
            documents: Arc::new(RwLock::new(documents)),
        }
    }

    /// A collection created from a JSON array of drafts
    ///
    /// Each draft receives a fresh identifier and creation time.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> RepositoryResult<Self>
    where
        D::Draft: DeserializeOwned,
    {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await.map_err(|e| {
            RepositoryError::connection_failed(format!(
                "failed to read seed file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let drafts: Vec<D::Draft> = serde_json::from_slice(&raw).map_err(|e| {
            RepositoryError::serialization_error(
                RepositoryOperation::Connect,
                format!("invalid seed file '{}': {}", path.display(), e),
            )
        })?;

        let documents: Vec<D> = drafts.into_iter().map(D::from_draft).collect();
        tracing::info!(
            entity = D::ENTITY,
            count = documents.len(),
            "Seeded collection from {}",
            path.display()
        );

        Ok(Self::with_documents(documents))
    }

    fn matching<'a>(
        documents: &'a [D],
        spec: &QuerySpec,
        operation: RepositoryOperation,
    ) -> RepositoryResult<Vec<&'a D>> {
        if spec.matches_all() {
            return Ok(documents.iter().collect());
        }

        let mut matched = Vec::new();
        for document in documents {
            let value = serde_json::to_value(document)
                .map_err(|e| RepositoryError::serialization_error(operation, e.to_string()))?;
            if document_matches(&value, spec) {
                matched.push(document);
            }
        }
        Ok(matched)
    }
}

impl<D: Document> Repository<D::Id, D, D::Draft, Patch> for MemoryStore<D> {
    async fn count_all(&self) -> RepositoryResult<u64> {
        Ok(self.documents.read().await.len() as u64)
    }

    async fn count_matching(&self, spec: &QuerySpec) -> RepositoryResult<u64> {
        let documents = self.documents.read().await;
        let matched = Self::matching(&documents, spec, RepositoryOperation::Count)?;
        Ok(matched.len() as u64)
    }

    async fn fetch_page(&self, spec: &QuerySpec) -> RepositoryResult<Vec<D>> {
        let documents = self.documents.read().await;
        let matched = Self::matching(&documents, spec, RepositoryOperation::FetchPage)?;

        let page: Vec<D> = match spec.window() {
            Some(window) => window.apply(matched.into_iter()).cloned().collect(),
            None => matched.into_iter().cloned().collect(),
        };
        tracing::debug!(entity = D::ENTITY, returned = page.len(), "Fetched page");
        Ok(page)
    }

    async fn find_by_id(&self, id: &D::Id) -> RepositoryResult<Option<D>> {
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|d| d.id() == id).cloned())
    }

    async fn create(&self, data: D::Draft) -> RepositoryResult<D> {
        let document = D::from_draft(data);
        self.documents.write().await.push(document.clone());
        tracing::debug!(entity = D::ENTITY, id = %document.id(), "Created document");
        Ok(document)
    }

    async fn update(&self, id: &D::Id, data: Patch) -> RepositoryResult<Option<D>> {
        let mut documents = self.documents.write().await;
        let Some(slot) = documents.iter_mut().find(|d| d.id() == id) else {
            return Ok(None);
        };

        let updated = merge_patch(slot, data)?;
        *slot = updated.clone();
        tracing::debug!(entity = D::ENTITY, id = %id, "Updated document");
        Ok(Some(updated))
    }

    async fn delete(&self, id: &D::Id) -> RepositoryResult<bool> {
        let mut documents = self.documents.write().await;
        let Some(position) = documents.iter().position(|d| d.id() == id) else {
            return Ok(false);
        };

        documents.remove(position);
        tracing::debug!(entity = D::ENTITY, id = %id, "Deleted document");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RoomId;
    use crate::query::QueryParams;
    use crate::repository::RepositoryErrorKind;
    use crate::rooms::{fixtures::new_room, Room};
    use serde_json::json;
    use std::io::Write;

    async fn beach_store() -> MemoryStore<Room> {
        let store = MemoryStore::new();
        for i in 0..10 {
            let address = if i % 5 < 3 {
                format!("{i} Beach Avenue")
            } else {
                format!("{i} Mountain Pass")
            };
            store
                .create(new_room(&format!("Room {i}"), &address, 50.0 * (i + 1) as f64))
                .await
                .unwrap();
        }
        store
    }

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().copied().collect()
    }

    fn patch(value: serde_json::Value) -> Patch {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_unrestricted_spec_returns_everything_in_order() {
        let store = beach_store().await;
        let p = QueryParams::default();
        let spec = QuerySpec::new().search(&p, "address").filter(&p);

        let rooms = store.fetch_page(&spec).await.unwrap();
        let names: Vec<_> = rooms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "Room 0");
        assert_eq!(names[9], "Room 9");
        assert_eq!(store.count_matching(&spec).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_keyword_count_and_second_page() {
        let store = beach_store().await;
        let p = params(&[("keyword", "BEACH"), ("page", "2")]);
        let criteria = QuerySpec::new().search(&p, "address").filter(&p);

        assert_eq!(store.count_all().await.unwrap(), 10);
        assert_eq!(store.count_matching(&criteria).await.unwrap(), 6);

        let page = store.fetch_page(&criteria.clone().paginate(&p, 4)).await.unwrap();
        let names: Vec<_> = page.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Room 6", "Room 7"]);
    }

    #[tokio::test]
    async fn test_pages_are_contiguous_slices_of_filtered_set() {
        let store = beach_store().await;
        let base = params(&[("pricePerNight[gt]", "100")]);
        let criteria = QuerySpec::new().filter(&base);
        let all = store.fetch_page(&criteria).await.unwrap();

        let mut stitched = Vec::new();
        for page in 1..=3 {
            let p = params(&[("page", &page.to_string())]);
            let rooms = store.fetch_page(&criteria.clone().paginate(&p, 3)).await.unwrap();
            assert!(rooms.len() <= 3);
            stitched.extend(rooms);
        }
        assert_eq!(stitched, all);
    }

    #[tokio::test]
    async fn test_price_range() {
        let store = beach_store().await;
        let p = params(&[("pricePerNight[gte]", "100"), ("pricePerNight[lte]", "250")]);
        let rooms = store.fetch_page(&QuerySpec::new().filter(&p)).await.unwrap();

        assert_eq!(rooms.len(), 4);
        assert!(rooms
            .iter()
            .all(|r| (100.0..=250.0).contains(&r.price_per_night)));
    }

    #[tokio::test]
    async fn test_count_matching_ignores_window() {
        let store = beach_store().await;
        let p = params(&[("keyword", "mountain"), ("page", "5")]);
        let spec = QuerySpec::new().search(&p, "address").paginate(&p, 1);

        assert_eq!(store.count_matching(&spec).await.unwrap(), 4);
        assert!(store.fetch_page(&spec).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_update_delete() {
        let store = beach_store().await;
        let target = store.fetch_page(&QuerySpec::new()).await.unwrap()[3].clone();

        let found = store.find_by_id(&target.id).await.unwrap();
        assert_eq!(found.as_ref(), Some(&target));

        let updated = store
            .update(
                &target.id,
                patch(json!({ "pricePerNight": 99, "_id": RoomId::new(), "isBreakfast": true })),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, target.id);
        assert_eq!(updated.created_at, target.created_at);
        assert_eq!(updated.price_per_night, 99.0);
        assert!(updated.is_breakfast);
        assert_eq!(updated.name, target.name);

        assert!(store.delete(&target.id).await.unwrap());
        assert!(!store.delete(&target.id).await.unwrap());
        assert!(store.find_by_id(&target.id).await.unwrap().is_none());
        assert_eq!(store.count_all().await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_update_missing_and_invalid() {
        let store = beach_store().await;
        let missing = store
            .update(&RoomId::new(), patch(json!({ "name": "x" })))
            .await
            .unwrap();
        assert!(missing.is_none());

        let id = store.fetch_page(&QuerySpec::new()).await.unwrap()[0].id.clone();
        let err = store
            .update(&id, patch(json!({ "category": "Penthouse" })))
            .await
            .unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::ValidationFailed);

        let unchanged = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(serde_json::to_value(unchanged.category).unwrap(), json!("King"));
    }

    #[tokio::test]
    async fn test_clones_share_documents() {
        let store: MemoryStore<Room> = MemoryStore::new();
        let other = store.clone();
        store.create(new_room("Shared", "1 Way", 10.0)).await.unwrap();
        assert_eq!(other.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let seed = json!([
            {
                "name": "Harbour Suite",
                "description": "Near the water",
                "pricePerNight": 210,
                "address": "2 Harbour Rd",
                "guestCapacity": 4,
                "numOfBeds": 2,
                "category": "Twins"
            },
            {
                "name": "Attic",
                "description": "Cosy",
                "pricePerNight": 45.5,
                "address": "9 High St",
                "guestCapacity": 1,
                "numOfBeds": 1,
                "category": "Single"
            }
        ]);
        write!(file, "{seed}").unwrap();

        let store: MemoryStore<Room> = MemoryStore::from_seed_file(file.path()).await.unwrap();
        let rooms = store.fetch_page(&QuerySpec::new()).await.unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].name, "Harbour Suite");
        assert_ne!(rooms[0].id, rooms[1].id);
    }

    #[tokio::test]
    async fn test_seed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = MemoryStore::<Room>::from_seed_file(dir.path().join("none.json"))
            .await
            .unwrap_err();
        assert_eq!(missing.kind, RepositoryErrorKind::ConnectionFailed);

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let bad = MemoryStore::<Room>::from_seed_file(&path).await.unwrap_err();
        assert_eq!(bad.kind, RepositoryErrorKind::SerializationError);
    }
}
