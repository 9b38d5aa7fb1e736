//! Article read composition.
//!
//! Reads fan out to the search index and hydrate author data from the
//! relational store, joining the two in memory. No locks are taken, so a read
//! may observe a write that has reached only one of the stores.
//!
//! Misses are reported as `not_found`; transport failures of either store are
//! reported as `internal`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::article_service::{map_index_error, map_repository_error};
use crate::domain::ports::{
    ArticleIndex, ArticleQuery, ArticleRepository, AuthorRepository, AuthorRepositoryError,
};
use crate::domain::{Article, ArticleId, ArticleWithAuthor, Author, AuthorId, Error};

fn map_author_error(error: AuthorRepositoryError) -> Error {
    Error::internal(format!("author lookup failed: {error}"))
}

/// Service implementing [`ArticleQuery`].
pub struct ArticleQueryService<R, A, I> {
    articles: Arc<R>,
    authors: Arc<A>,
    index: Arc<I>,
}

impl<R, A, I> Clone for ArticleQueryService<R, A, I> {
    fn clone(&self) -> Self {
        Self {
            articles: Arc::clone(&self.articles),
            authors: Arc::clone(&self.authors),
            index: Arc::clone(&self.index),
        }
    }
}

impl<R, A, I> ArticleQueryService<R, A, I> {
    /// Create a new query service over both stores.
    pub fn new(articles: Arc<R>, authors: Arc<A>, index: Arc<I>) -> Self {
        Self {
            articles,
            authors,
            index,
        }
    }
}

impl<R, A, I> ArticleQueryService<R, A, I>
where
    A: AuthorRepository,
{
    async fn author_of(&self, article: &Article) -> Result<Author, Error> {
        self.authors
            .find_by_id(&article.author_id)
            .await
            .map_err(map_author_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "author {} of article {} not found",
                    article.author_id, article.id
                ))
                .with_details(json!({ "id": article.id, "authorId": article.author_id }))
            })
    }
}

/// Distinct ids in first-seen order.
fn distinct_author_ids(articles: &[Article]) -> Vec<AuthorId> {
    let mut seen = HashSet::new();
    articles
        .iter()
        .map(|article| article.author_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

#[async_trait]
impl<R, A, I> ArticleQuery for ArticleQueryService<R, A, I>
where
    R: ArticleRepository,
    A: AuthorRepository,
    I: ArticleIndex,
{
    async fn get_article_by_id(&self, id: ArticleId) -> Result<Article, Error> {
        let article = self
            .articles
            .find_by_id(&id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!("article {id} not found")).with_details(json!({ "id": id }))
            })?;
        let author = self.author_of(&article).await?;
        Ok(article.with_author(author))
    }

    async fn get_articles_by_keyword(&self, keyword: String) -> Result<Vec<Article>, Error> {
        let hits = self
            .index
            .search(&keyword)
            .await
            .map_err(|error| map_index_error(error).with_details(json!({ "keyword": keyword })))?;
        if hits.is_empty() {
            return Ok(hits);
        }

        let author_ids = distinct_author_ids(&hits);
        let authors: HashMap<AuthorId, Author> = self
            .authors
            .find_by_ids(&author_ids)
            .await
            .map_err(|error| map_author_error(error).with_details(json!({ "keyword": keyword })))?
            .into_iter()
            .map(|author| (author.id, author))
            .collect();
        debug!(
            hits = hits.len(),
            authors = author_ids.len(),
            resolved = authors.len(),
            "keyword search joined"
        );

        // Unresolved authors are attached as the zero value rather than failing the read.
        Ok(hits
            .into_iter()
            .map(|article| {
                let author = authors.get(&article.author_id).cloned().unwrap_or_default();
                article.with_author(author)
            })
            .collect())
    }

    async fn get_article_with_author_by_id(
        &self,
        author_id: AuthorId,
    ) -> Result<ArticleWithAuthor, Error> {
        let author = self
            .authors
            .find_by_id(&author_id)
            .await
            .map_err(map_author_error)?
            .ok_or_else(|| {
                Error::not_found(format!("author {author_id} not found"))
                    .with_details(json!({ "id": author_id }))
            })?;
        let articles = self
            .index
            .find_by_author_id(&author_id)
            .await
            .map_err(|error| map_index_error(error).with_details(json!({ "id": author_id })))?;
        Ok(ArticleWithAuthor { author, articles })
    }

    async fn get_articles_by_author_name(
        &self,
        name: String,
    ) -> Result<Vec<ArticleWithAuthor>, Error> {
        let matches = self
            .authors
            .find_id_names_by_name(&name)
            .await
            .map_err(|error| map_author_error(error).with_details(json!({ "name": name })))?;
        if matches.is_empty() {
            return Err(
                Error::not_found(format!("no author named {name}")).with_details(json!({ "name": name }))
            );
        }

        let mut positions = HashMap::with_capacity(matches.len());
        let mut groups = Vec::with_capacity(matches.len());
        for found in matches {
            positions.insert(found.id, groups.len());
            groups.push(ArticleWithAuthor {
                author: Author {
                    id: found.id,
                    name: found.name,
                    ..Author::default()
                },
                articles: Vec::new(),
            });
        }
        let author_ids: Vec<AuthorId> = groups.iter().map(|group| group.author.id).collect();

        let hits = self
            .index
            .find_by_author_ids(&author_ids)
            .await
            .map_err(|error| map_index_error(error).with_details(json!({ "name": name })))?;
        for article in hits {
            let group = positions
                .get(&article.author_id)
                .and_then(|&position| groups.get_mut(position));
            match group {
                Some(group) => group.articles.push(article),
                None => debug!(article_id = %article.id, "dropping hit for unrequested author"),
            }
        }
        Ok(groups)
    }

    async fn get_all_articles(&self) -> Result<Vec<Article>, Error> {
        let documents = self.index.find_all().await.map_err(map_index_error)?;
        let mut hydrated = Vec::with_capacity(documents.len());
        for article in documents {
            let author = self.author_of(&article).await?;
            hydrated.push(article.with_author(author));
        }
        Ok(hydrated)
    }
}

#[cfg(test)]
#[path = "article_queries_tests.rs"]
mod tests;
