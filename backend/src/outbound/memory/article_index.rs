//! In-memory article search index.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{ArticleIndex, ArticleIndexError};
use crate::domain::{Article, ArticleFieldUpdate, ArticleId, AuthorId};

/// Search index kept in process memory. Clones share documents.
///
/// Matches the Elasticsearch adapter: case-insensitive substring search over
/// title and body, newest first, upserting partial updates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArticleIndex {
    documents: Arc<Mutex<HashMap<ArticleId, Article>>>,
}

impl InMemoryArticleIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<ArticleId, Article>> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Stored document for `id`, if any.
    pub fn document(&self, id: &ArticleId) -> Option<Article> {
        self.documents().get(id).cloned()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents().len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents().is_empty()
    }

    fn matching(&self, predicate: impl Fn(&Article) -> bool) -> Vec<Article> {
        let mut hits: Vec<Article> = self
            .documents()
            .values()
            .filter(|doc| predicate(doc))
            .cloned()
            .collect();
        hits.sort_by_key(|doc| Reverse(doc.created_at));
        hits
    }
}

#[async_trait]
impl ArticleIndex for InMemoryArticleIndex {
    async fn index(&self, article: &Article) -> Result<(), ArticleIndexError> {
        self.documents()
            .insert(article.id, article.without_author());
        Ok(())
    }

    async fn update_fields(
        &self,
        id: &ArticleId,
        fields: &ArticleFieldUpdate,
    ) -> Result<(), ArticleIndexError> {
        let mut documents = self.documents();
        let document = documents.entry(*id).or_insert_with(|| {
            let stamp = fields.updated_at.unwrap_or_default();
            Article {
                id: *id,
                created_at: stamp,
                updated_at: stamp,
                ..Article::default()
            }
        });
        document.apply(fields);
        Ok(())
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Article>, ArticleIndexError> {
        let needle = keyword.to_lowercase();
        Ok(self.matching(|doc| {
            doc.title.to_lowercase().contains(&needle) || doc.body.to_lowercase().contains(&needle)
        }))
    }

    async fn find_by_author_id(
        &self,
        author_id: &AuthorId,
    ) -> Result<Vec<Article>, ArticleIndexError> {
        Ok(self.matching(|doc| doc.author_id == *author_id))
    }

    async fn find_by_author_ids(
        &self,
        author_ids: &[AuthorId],
    ) -> Result<Vec<Article>, ArticleIndexError> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.matching(|doc| author_ids.contains(&doc.author_id)))
    }

    async fn find_all(&self) -> Result<Vec<Article>, ArticleIndexError> {
        Ok(self.matching(|_| true))
    }
}
