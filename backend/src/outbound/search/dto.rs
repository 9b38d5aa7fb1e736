//! Wire shapes for the search index REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Article, ArticleFieldUpdate, ArticleId, AuthorId};

/// Document stored per article. Never carries the author snapshot.
///
/// Every field defaults on decode so documents created by a partial upsert
/// still read back; a nil `id` is filled from the hit's `_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(super) struct ArticleDocument {
    pub(super) id: Uuid,
    pub(super) title: String,
    pub(super) body: String,
    pub(super) author_id: Uuid,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

impl From<&Article> for ArticleDocument {
    fn from(article: &Article) -> Self {
        Self {
            id: *article.id.as_uuid(),
            title: article.title.clone(),
            body: article.body.clone(),
            author_id: *article.author_id.as_uuid(),
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

impl ArticleDocument {
    /// Seed document used when a partial update finds no existing document.
    /// The creation time is taken from the update time when one is given.
    pub(super) fn upsert_seed(id: &ArticleId, fields: &ArticleFieldUpdate) -> Self {
        let stamp = fields.updated_at.unwrap_or_default();
        Self {
            id: *id.as_uuid(),
            title: fields.title.clone().unwrap_or_default(),
            body: fields.body.clone().unwrap_or_default(),
            author_id: fields
                .author_id
                .map(|author_id| *author_id.as_uuid())
                .unwrap_or_default(),
            created_at: stamp,
            updated_at: stamp,
        }
    }
}

impl From<ArticleDocument> for Article {
    fn from(document: ArticleDocument) -> Self {
        Self {
            id: ArticleId::from_uuid(document.id),
            title: document.title,
            body: document.body,
            author_id: AuthorId::from_uuid(document.author_id),
            created_at: document.created_at,
            updated_at: document.updated_at,
            author: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponseDto {
    pub(super) hits: HitsDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct HitsDto {
    #[serde(default)]
    pub(super) hits: Vec<HitDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HitDto {
    #[serde(rename = "_id", default)]
    pub(super) id: String,
    #[serde(rename = "_source", default)]
    pub(super) source: serde_json::Value,
}
