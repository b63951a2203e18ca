use crate::{BatchReport, HitList, SearchError, SearchRequest};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// An entity the application wants findable through the cluster.
pub trait Searchable {
    /// Stable identifier, used as the document `_id`.
    fn search_key(&self) -> String;

    /// Index the entity's documents live under.
    fn searchable_as(&self) -> String;

    /// Fields sent to the cluster. An empty map means "do not index".
    fn to_searchable(&self) -> Map<String, Value>;

    /// Fields eligible for free-text matching.
    fn searchable_fields(&self) -> Vec<String>;

    /// `Some(trashed)` for entities that support soft deletion.
    fn soft_deleted(&self) -> Option<bool> {
        None
    }
}

/// The application's record store, used to re-hydrate hits.
#[async_trait]
pub trait RecordStore {
    type Record: Searchable + Send;

    /// Records for the given ids, in any order. Unknown ids are ignored.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Self::Record>, SearchError>;
}

#[async_trait]
pub trait SearchEngine {
    async fn update<T>(&self, documents: &[T]) -> Result<BatchReport, SearchError>
    where
        T: Searchable + Sync;

    async fn delete(&self, index: &str, ids: &[String]) -> Result<BatchReport, SearchError>;

    async fn search(&self, request: &SearchRequest) -> Result<HitList, SearchError>;

    async fn paginate(
        &self,
        request: &SearchRequest,
        per_page: usize,
        page: usize,
    ) -> Result<HitList, SearchError>;

    async fn raw_search(
        &self,
        request: &SearchRequest,
        document: &Value,
    ) -> Result<HitList, SearchError>;

    async fn flush(&self, index: &str) -> Result<(), SearchError> {
        self.delete_index(index).await
    }

    async fn create_index(&self, index: &str, options: &Value) -> Result<(), SearchError>;

    async fn delete_index(&self, index: &str) -> Result<(), SearchError>;
}
