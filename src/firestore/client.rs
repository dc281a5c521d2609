use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use super::document::{Document, ListDocumentsPage, RunQueryItem};
use super::error::FirestoreError;
use super::query::StructuredQuery;
use crate::auth::TokenProvider;
use crate::config::FirestoreConfig;

/// Read-only client for the Firestore v1 REST API of one database.
#[derive(Clone)]
pub struct FirestoreClient {
    http: Client,
    base_url: Url,
    project_id: String,
    database_id: String,
    page_size: Option<u32>,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for FirestoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreClient")
            .field("base_url", &self.base_url.as_str())
            .field("project_id", &self.project_id)
            .field("database_id", &self.database_id)
            .field("tokens", &self.tokens.kind())
            .finish()
    }
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl FirestoreClient {
    pub fn new(config: &FirestoreConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, FirestoreError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(FirestoreError::Request)?;
        Self::with_http(config, http, tokens)
    }

    /// Build on an existing HTTP client (shared with the token provider).
    pub fn with_http(
        config: &FirestoreConfig,
        http: Client,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, FirestoreError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FirestoreError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FirestoreError::InvalidUrl(config.base_url.clone()));
        }

        Ok(Self {
            http,
            base_url,
            project_id: config.project_id.clone(),
            database_id: config.database_id.clone(),
            page_size: config.page_size,
            tokens,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    /// `{base}/projects/{p}/databases/{d}/documents[/{path}][:{verb}]`
    fn documents_url(&self, path: &str, verb: Option<&str>) -> Result<Url, FirestoreError> {
        let mut segments: Vec<String> = vec![
            "projects".into(),
            self.project_id.clone(),
            "databases".into(),
            self.database_id.clone(),
            "documents".into(),
        ];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(FirestoreError::InvalidUrl(format!("invalid path segment in {path:?}")));
            }
            segments.push(segment.to_string());
        }
        if let (Some(verb), Some(last)) = (verb, segments.last_mut()) {
            last.push(':');
            last.push_str(verb);
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FirestoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(&segments);
        Ok(url)
    }

    /// List every document of a top-level collection, following `nextPageToken`.
    #[tracing::instrument(skip(self), fields(project = %self.project_id, database = %self.database_id))]
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, FirestoreError> {
        let url = self.documents_url(collection, None)?;
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let token = self.tokens.access_token().await?;

            let mut request = self.http.get(url.clone()).bearer_auth(token);
            if let Some(size) = self.page_size {
                request = request.query(&[("pageSize", size.to_string())]);
            }
            if let Some(page_token) = &page_token {
                request = request.query(&[("pageToken", page_token)]);
            }

            let response = request.send().await.map_err(FirestoreError::Request)?;
            let page: ListDocumentsPage = Self::decode(response).await?;
            pages += 1;
            documents.extend(page.documents);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) if page_token.as_deref() == Some(next.as_str()) => {
                    tracing::warn!("Firestore repeated page token {:?}, stopping pagination", next);
                    break;
                }
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!("Fetched {} documents in {} page(s)", documents.len(), pages);
        Ok(documents)
    }

    /// Run a structured query, optionally scoped to a parent document path.
    ///
    /// Stream items carrying no document (progress / `readTime` markers) are dropped.
    #[tracing::instrument(skip(self, query), fields(project = %self.project_id, database = %self.database_id))]
    pub async fn run_query(
        &self,
        parent: Option<&str>,
        query: StructuredQuery,
    ) -> Result<Vec<Document>, FirestoreError> {
        let url = self.documents_url(parent.unwrap_or_default(), Some("runQuery"))?;
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&query.into_request())
            .send()
            .await
            .map_err(FirestoreError::Request)?;

        let items: Vec<RunQueryItem> = Self::decode(response).await?;
        let documents: Vec<Document> = items.into_iter().filter_map(|item| item.document).collect();

        tracing::debug!("Query returned {} documents", documents.len());
        Ok(documents)
    }

    /// Every document in collections named `collection_id` below `parent`
    /// (or anywhere in the database when `parent` is `None`).
    pub async fn collection_group(
        &self,
        collection_id: &str,
        parent: Option<&str>,
    ) -> Result<Vec<Document>, FirestoreError> {
        self.run_query(parent, StructuredQuery::collection_group(collection_id))
            .await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, FirestoreError> {
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message);
            tracing::error!(
                "Firestore returned {}: {}",
                status,
                message.as_deref().unwrap_or(body.as_str())
            );
            return Err(FirestoreError::Status { status, message });
        }

        response.json::<T>().await.map_err(FirestoreError::Decode)
    }
}
