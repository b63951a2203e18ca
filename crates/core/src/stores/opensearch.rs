use crate::config::{ClusterConfig, Transport};
use crate::error::CREATE_INDEX_UNSUPPORTED;
use crate::hits::parse_hits;
use crate::query::{translate, translate_page, QueryDocument};
use crate::traits::{SearchEngine, Searchable};
use crate::{BatchReport, DocumentFailure, HitList, QueryBody, SearchError, SearchRequest};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const SOFT_DELETE_FIELD: &str = "__soft_deleted";

pub struct OpenSearchEngine {
    client: Arc<Client>,
    base_url: Url,
    transport: Transport,
    soft_delete: bool,
}

impl OpenSearchEngine {
    pub fn new(config: &ClusterConfig) -> Result<Self, SearchError> {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &ClusterConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url()?,
            transport: config.transport()?,
            soft_delete: config.soft_delete,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `{base}/{segments...}` with each segment percent-encoded. Dot segments
    /// are normalized away by the URL parser even when encoded, so they are
    /// rejected instead of silently addressing a different resource.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SearchError> {
        if let Some(segment) = segments
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            return Err(SearchError::PathSegment(segment.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SearchError::Config(format!("{} cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Request body for one document, or `None` when it has nothing to index.
    pub fn document_body<T: Searchable>(&self, document: &T) -> Option<Map<String, Value>> {
        let fields = document.to_searchable();
        if fields.is_empty() {
            return None;
        }

        let mut body = Map::new();
        body.insert("id".to_string(), Value::String(document.search_key()));
        body.extend(fields);

        if self.soft_delete {
            if let Some(trashed) = document.soft_deleted() {
                body.insert(SOFT_DELETE_FIELD.to_string(), Value::from(u8::from(trashed)));
            }
        }

        Some(body)
    }

    async fn upsert(&self, index: &str, id: &str, body: &Map<String, Value>) -> Result<(), SearchError> {
        let url = self.endpoint(&[index, "_doc", id])?;
        debug!(%url, "upserting document");

        let response = self
            .transport
            .apply(self.client.post(url))
            .json(body)
            .send()
            .await?;

        ensure_success(response).await
    }

    async fn remove(&self, index: &str, id: &str) -> Result<(), SearchError> {
        let url = self.endpoint(&[index, "_doc", id])?;
        debug!(%url, "deleting document");

        let response = self
            .transport
            .apply(self.client.delete(url))
            .send()
            .await?;

        ensure_success(response).await
    }

    async fn execute(&self, index: &str, body: &Value) -> Result<HitList, SearchError> {
        let url = self.endpoint(&[index, "_search"])?;
        debug!(%url, %body, "searching");

        let response = self
            .transport
            .apply(self.client.post(url))
            .json(body)
            .send()
            .await?;

        let response = ensure_ok(response).await?;
        let response_json: Value = response.json().await?;
        let hits = response_json.pointer("/hits").cloned().unwrap_or(Value::Null);

        Ok(parse_hits(&hits))
    }
}

#[async_trait]
impl SearchEngine for OpenSearchEngine {
    async fn update<T>(&self, documents: &[T]) -> Result<BatchReport, SearchError>
    where
        T: Searchable + Sync,
    {
        let mut report = BatchReport::default();

        for document in documents {
            let Some(body) = self.document_body(document) else {
                report.skipped += 1;
                continue;
            };

            let id = document.search_key();
            report.attempted += 1;
            match self.upsert(&document.searchable_as(), &id, &body).await {
                Ok(()) => report.succeeded.push(id),
                Err(error) => {
                    warn!(id = %id, error = %error, "document upsert failed");
                    report.failures.push(failure(id, &error));
                }
            }
        }

        Ok(report)
    }

    async fn delete(&self, index: &str, ids: &[String]) -> Result<BatchReport, SearchError> {
        let mut report = BatchReport::default();

        for id in ids {
            report.attempted += 1;
            match self.remove(index, id).await {
                Ok(()) => report.succeeded.push(id.clone()),
                Err(error) => {
                    warn!(id = %id, index = %index, error = %error, "document delete failed");
                    report.failures.push(failure(id.clone(), &error));
                }
            }
        }

        Ok(report)
    }

    async fn search(&self, request: &SearchRequest) -> Result<HitList, SearchError> {
        let body = search_body(request, translate(request))?;
        self.execute(&request.index, &body).await
    }

    async fn paginate(
        &self,
        request: &SearchRequest,
        per_page: usize,
        page: usize,
    ) -> Result<HitList, SearchError> {
        let body = search_body(request, translate_page(request, per_page, page))?;
        self.execute(&request.index, &body).await
    }

    async fn raw_search(
        &self,
        request: &SearchRequest,
        document: &Value,
    ) -> Result<HitList, SearchError> {
        self.execute(&request.index, document).await
    }

    async fn create_index(&self, _index: &str, _options: &Value) -> Result<(), SearchError> {
        Err(SearchError::Unsupported(CREATE_INDEX_UNSUPPORTED))
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchError> {
        let url = self.endpoint(&[index])?;
        debug!(%url, "deleting index");

        let response = self
            .transport
            .apply(self.client.delete(url))
            .send()
            .await?;

        ensure_ok(response).await?;
        Ok(())
    }
}

/// A `Raw` request body wins over the translated document.
fn search_body(request: &SearchRequest, translated: QueryDocument) -> Result<Value, SearchError> {
    match &request.body {
        QueryBody::Raw(document) => Ok(document.clone()),
        QueryBody::Translated => Ok(translated.to_value()?),
    }
}

fn failure(id: String, error: &SearchError) -> DocumentFailure {
    DocumentFailure {
        id,
        status: error.status(),
        reason: error.to_string(),
    }
}

/// Searches and index deletion only accept a plain 200.
async fn ensure_ok(response: Response) -> Result<Response, SearchError> {
    if response.status() == StatusCode::OK {
        return Ok(response);
    }
    Err(cluster_error(response).await)
}

/// Document writes answer 200 or 201 depending on whether the id existed.
async fn ensure_success(response: Response) -> Result<(), SearchError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(cluster_error(response).await)
}

async fn cluster_error(response: Response) -> SearchError {
    let status = response.status();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);

    SearchError::Cluster {
        status: status.as_u16(),
        reason: error_reason(&body, status),
    }
}

fn error_reason(body: &Value, status: StatusCode) -> String {
    body.pointer("/error/reason")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string())
        })
}
