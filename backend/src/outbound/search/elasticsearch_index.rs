//! Reqwest-backed article index over an Elasticsearch-compatible REST API.
//!
//! This adapter owns transport details only: request bodies, URL layout,
//! HTTP error mapping and decoding hits back into articles.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::{Value, json};
use tracing::{debug, warn};
use uuid::Uuid;

use super::dto::{ArticleDocument, SearchResponseDto};
use crate::domain::ports::{ArticleIndex, ArticleIndexError};
use crate::domain::{Article, ArticleFieldUpdate, ArticleId, AuthorId};

const DEFAULT_INDEX_NAME: &str = "articles";
const DEFAULT_MAX_RESULTS: u32 = 1000;

/// Index name, result cap and write visibility for one index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElasticsearchIndexOptions {
    /// Name of the index holding article documents.
    pub index: String,
    /// Explicit `size` sent with every query.
    pub max_results: u32,
    /// Ask writes to wait for a refresh so subsequent reads observe them.
    pub wait_for_refresh: bool,
}

impl Default for ElasticsearchIndexOptions {
    fn default() -> Self {
        Self {
            index: DEFAULT_INDEX_NAME.to_owned(),
            max_results: DEFAULT_MAX_RESULTS,
            wait_for_refresh: true,
        }
    }
}

/// Article index adapter talking to one Elasticsearch endpoint.
#[derive(Debug, Clone)]
pub struct ElasticsearchArticleIndex {
    client: Client,
    endpoint: Url,
    options: ElasticsearchIndexOptions,
}

impl ElasticsearchArticleIndex {
    /// Build an adapter with default index options.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_options(endpoint, timeout, ElasticsearchIndexOptions::default())
    }

    /// Build an adapter with explicit index options.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_options(
        endpoint: Url,
        timeout: Duration,
        options: ElasticsearchIndexOptions,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            options: ElasticsearchIndexOptions {
                max_results: options.max_results.max(1),
                ..options
            },
        })
    }

    /// Name of the index this adapter reads and writes.
    pub fn index_name(&self) -> &str {
        &self.options.index
    }

    /// Create the index with its mapping unless it already exists.
    ///
    /// Returns `true` when the index was created by this call.
    ///
    /// # Errors
    ///
    /// Returns [`ArticleIndexError`] when the endpoint is unreachable or
    /// rejects the mapping.
    pub async fn ensure_index(&self) -> Result<bool, ArticleIndexError> {
        let url = self.url(&[])?;
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(map_transport_error)?;
        match response.status() {
            status if status.is_success() => {
                debug!(index = %self.options.index, "search index already exists");
                Ok(false)
            }
            StatusCode::NOT_FOUND => {
                self.send(self.client.put(url).json(&index_mapping()))
                    .await?;
                debug!(index = %self.options.index, "search index created");
                Ok(true)
            }
            status => Err(map_status_error(status, &[])),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ArticleIndexError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| ArticleIndexError::transport("search endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push(&self.options.index)
            .extend(segments);
        Ok(url)
    }

    fn with_refresh(&self, request: RequestBuilder) -> RequestBuilder {
        if self.options.wait_for_refresh {
            request.query(&[("refresh", "wait_for")])
        } else {
            request
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ArticleIndexError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }

    async fn query(&self, query: Value) -> Result<Vec<Article>, ArticleIndexError> {
        let url = self.url(&["_search"])?;
        let body = search_body(query, self.options.max_results);
        let response = self.send(self.client.post(url).json(&body)).await?;
        parse_hits(&response)
    }
}

#[async_trait]
impl ArticleIndex for ElasticsearchArticleIndex {
    async fn index(&self, article: &Article) -> Result<(), ArticleIndexError> {
        let id = article.id.to_string();
        let url = self.url(&["_doc", id.as_str()])?;
        let request = self
            .client
            .put(url)
            .json(&ArticleDocument::from(article));
        self.send(self.with_refresh(request)).await?;
        Ok(())
    }

    async fn update_fields(
        &self,
        id: &ArticleId,
        fields: &ArticleFieldUpdate,
    ) -> Result<(), ArticleIndexError> {
        let key = id.to_string();
        let url = self.url(&["_update", key.as_str()])?;
        let request = self.client.post(url).json(&update_body(id, fields));
        self.send(self.with_refresh(request)).await?;
        Ok(())
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Article>, ArticleIndexError> {
        self.query(keyword_query(keyword)).await
    }

    async fn find_by_author_id(
        &self,
        author_id: &AuthorId,
    ) -> Result<Vec<Article>, ArticleIndexError> {
        self.query(json!({ "term": { "author_id": author_id.to_string() } }))
            .await
    }

    async fn find_by_author_ids(
        &self,
        author_ids: &[AuthorId],
    ) -> Result<Vec<Article>, ArticleIndexError> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = author_ids.iter().map(ToString::to_string).collect();
        self.query(json!({ "terms": { "author_id": ids } })).await
    }

    async fn find_all(&self) -> Result<Vec<Article>, ArticleIndexError> {
        self.query(json!({ "match_all": {} })).await
    }
}

fn index_mapping() -> Value {
    let searchable_text = json!({
        "type": "text",
        "fields": { "wild": { "type": "wildcard" } }
    });
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "title": searchable_text,
                "body": searchable_text,
                "author_id": { "type": "keyword" },
                "created_at": { "type": "date" },
                "updated_at": { "type": "date" }
            }
        }
    })
}

/// Partial update that creates a complete document when none exists yet.
fn update_body(id: &ArticleId, fields: &ArticleFieldUpdate) -> Value {
    json!({
        "doc": fields,
        "upsert": ArticleDocument::upsert_seed(id, fields)
    })
}

fn search_body(query: Value, size: u32) -> Value {
    json!({
        "size": size,
        "query": query,
        "sort": [
            { "created_at": { "order": "desc", "unmapped_type": "date" } }
        ]
    })
}

fn keyword_query(keyword: &str) -> Value {
    let pattern = format!("*{}*", escape_wildcard(keyword));
    let clause = |field: &str| {
        let mut wildcard = serde_json::Map::new();
        wildcard.insert(
            field.to_owned(),
            json!({ "value": pattern, "case_insensitive": true }),
        );
        json!({ "wildcard": wildcard })
    };
    json!({
        "bool": {
            "should": [clause("title.wild"), clause("body.wild")],
            "minimum_should_match": 1
        }
    })
}

fn escape_wildcard(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '*' | '?') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_hits(body: &[u8]) -> Result<Vec<Article>, ArticleIndexError> {
    let decoded: SearchResponseDto = serde_json::from_slice(body).map_err(|error| {
        ArticleIndexError::decode(format!("invalid search response payload: {error}"))
    })?;
    Ok(decoded
        .hits
        .hits
        .into_iter()
        .filter_map(
            |hit| match serde_json::from_value::<ArticleDocument>(hit.source) {
                Ok(mut document) => {
                    if document.id.is_nil() {
                        document.id = Uuid::parse_str(&hit.id).ok()?;
                    }
                    Some(Article::from(document))
                }
                Err(error) => {
                    warn!(document_id = %hit.id, %error, "skipping undecodable search hit");
                    None
                }
            },
        )
        .collect())
}

fn map_transport_error(error: reqwest::Error) -> ArticleIndexError {
    ArticleIndexError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ArticleIndexError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned()
    } else {
        preview
    };
    ArticleIndexError::status(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
#[path = "elasticsearch_index_tests.rs"]
mod tests;
