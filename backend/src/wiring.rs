//! One-time construction of the author and article services.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use thiserror::Error;
use tracing::info;

use crate::config::{SettingsError, StoreSettings};
use crate::domain::ports::{
    ArticleIndex, ArticleIndexError, ArticleRepository, AuthorRepository, RelationalTransactions,
};
use crate::domain::{ArticleCommandService, ArticleQueryService, AuthorService};
use crate::outbound::memory::{InMemoryArticleIndex, InMemoryRelationalStore};
use crate::outbound::persistence::{
    DbPool, DieselArticleRepository, DieselAuthorRepository, DieselTransactions, PoolError,
};
use crate::outbound::search::ElasticsearchArticleIndex;

/// Failure while wiring services against real infrastructure.
#[derive(Debug, Error)]
pub enum WiringError {
    /// Settings failed validation.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The relational pool could not be built.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// The HTTP client for the search index could not be built.
    #[error("search client could not be built: {message}")]
    SearchClient { message: String },
    /// The search index could not be checked or created.
    #[error("search index could not be prepared: {0}")]
    SearchIndex(#[from] ArticleIndexError),
}

/// The services over one relational store and one search index.
///
/// Every service shares the same adapter instances, so a write through
/// `articles` is visible to `article_queries`.
pub struct ContentServices<T, A, R, I> {
    /// Author commands and queries.
    pub authors: AuthorService<T, A>,
    /// Article mutations across both stores.
    pub articles: ArticleCommandService<T, R, I>,
    /// Article reads joined with author data.
    pub article_queries: ArticleQueryService<R, A, I>,
}

/// Services over PostgreSQL and an Elasticsearch-compatible index.
pub type PostgresContentServices = ContentServices<
    DieselTransactions,
    DieselAuthorRepository,
    DieselArticleRepository,
    ElasticsearchArticleIndex,
>;

/// Services over the process-local adapters.
pub type InMemoryContentServices = ContentServices<
    InMemoryRelationalStore,
    InMemoryRelationalStore,
    InMemoryRelationalStore,
    InMemoryArticleIndex,
>;

impl<T, A, R, I> ContentServices<T, A, R, I>
where
    T: RelationalTransactions,
    A: AuthorRepository<Tx = T::Tx>,
    R: ArticleRepository<Tx = T::Tx>,
    I: ArticleIndex,
{
    /// Build the services over caller-supplied adapters.
    pub fn from_parts(
        transactions: Arc<T>,
        authors: Arc<A>,
        articles: Arc<R>,
        index: Arc<I>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            authors: AuthorService::new(transactions.clone(), authors.clone(), clock.clone()),
            articles: ArticleCommandService::new(
                transactions,
                articles.clone(),
                index.clone(),
                clock,
            ),
            article_queries: ArticleQueryService::new(articles, authors, index),
        }
    }
}

impl PostgresContentServices {
    /// Connect to the stores named by `settings`.
    ///
    /// Relational connections are opened lazily. The search index is created
    /// with its mapping when missing, so the first document write never
    /// triggers dynamic mapping of `author_id` and the wildcard sub-fields.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError`] when settings are invalid, a client cannot be
    /// built, or the search index cannot be checked or created.
    pub async fn connect(settings: &StoreSettings) -> Result<Self, WiringError> {
        settings.validate()?;
        let pool = DbPool::new(settings.pool_config()?).await?;
        let index = ElasticsearchArticleIndex::with_options(
            settings.search_endpoint()?,
            settings.search_timeout(),
            settings.index_options()?,
        )
        .map_err(|err| WiringError::SearchClient {
            message: err.to_string(),
        })?;
        let created = index.ensure_index().await?;
        info!(
            index = index.index_name(),
            created, "content services connected"
        );

        Ok(Self::from_parts(
            Arc::new(DieselTransactions::new(pool.clone())),
            Arc::new(DieselAuthorRepository::new(pool.clone())),
            Arc::new(DieselArticleRepository::new(pool)),
            Arc::new(index),
            Arc::new(DefaultClock),
        ))
    }
}

impl InMemoryContentServices {
    /// Wire the services over fresh process-local stores.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryRelationalStore::new());
        Self::from_parts(
            store.clone(),
            store.clone(),
            store,
            Arc::new(InMemoryArticleIndex::new()),
            Arc::new(DefaultClock),
        )
    }
}
