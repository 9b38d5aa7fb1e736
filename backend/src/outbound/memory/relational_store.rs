//! In-memory relational store with staged transactions.
//!
//! Each transaction works on a private copy of the committed tables and
//! records its writes. Commit replays the writes against the live tables and
//! swaps them in only if every write still applies, so a failed commit leaves
//! the store untouched.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    ArticleRepository, ArticleRepositoryError, AuthorRepository, AuthorRepositoryError,
    RelationalTransactions, TransactionError,
};
use crate::domain::{
    Article, ArticleId, ArticleUpdate, Author, AuthorId, AuthorIdName, AuthorUpdate,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    authors: HashMap<AuthorId, Author>,
    articles: HashMap<ArticleId, Article>,
}

#[derive(Debug, Clone)]
enum StagedWrite {
    InsertAuthor(Author),
    UpdateAuthor(AuthorUpdate),
    InsertArticles(Vec<Article>),
    UpdateArticle(ArticleUpdate),
}

impl Tables {
    fn insert_author(&mut self, author: &Author) -> Result<(), AuthorRepositoryError> {
        if self.authors.contains_key(&author.id) {
            return Err(AuthorRepositoryError::query(format!(
                "duplicate key value violates unique constraint \"authors_pkey\": {}",
                author.id
            )));
        }
        self.authors.insert(author.id, author.clone());
        Ok(())
    }

    fn update_author(&mut self, update: &AuthorUpdate) -> Result<(), AuthorRepositoryError> {
        let row = self
            .authors
            .get_mut(&update.id)
            .ok_or(AuthorRepositoryError::NotFound { id: update.id })?;
        row.name.clone_from(&update.name);
        row.email.clone_from(&update.email);
        row.updated_at = update.updated_at;
        Ok(())
    }

    fn insert_articles(&mut self, articles: &[Article]) -> Result<(), ArticleRepositoryError> {
        let mut staged = self.articles.clone();
        for article in articles {
            if staged.contains_key(&article.id) {
                return Err(ArticleRepositoryError::query(format!(
                    "duplicate key value violates unique constraint \"articles_pkey\": {}",
                    article.id
                )));
            }
            if !self.authors.contains_key(&article.author_id) {
                return Err(ArticleRepositoryError::query(format!(
                    "insert violates foreign key constraint \"articles_author_id_fkey\": {}",
                    article.author_id
                )));
            }
            staged.insert(article.id, article.without_author());
        }
        self.articles = staged;
        Ok(())
    }

    fn update_article(&mut self, update: &ArticleUpdate) -> Result<(), ArticleRepositoryError> {
        let row = self
            .articles
            .get_mut(&update.id)
            .filter(|row| row.author_id == update.author_id)
            .ok_or(ArticleRepositoryError::NotFound { id: update.id })?;
        row.title.clone_from(&update.title);
        row.body.clone_from(&update.body);
        row.updated_at = update.updated_at;
        Ok(())
    }

    fn replay(&mut self, write: &StagedWrite) -> Result<(), String> {
        match write {
            StagedWrite::InsertAuthor(author) => {
                self.insert_author(author).map_err(|err| err.to_string())
            }
            StagedWrite::UpdateAuthor(update) => {
                self.update_author(update).map_err(|err| err.to_string())
            }
            StagedWrite::InsertArticles(articles) => {
                self.insert_articles(articles).map_err(|err| err.to_string())
            }
            StagedWrite::UpdateArticle(update) => {
                self.update_article(update).map_err(|err| err.to_string())
            }
        }
    }
}

/// Open transaction against an [`InMemoryRelationalStore`].
#[derive(Debug)]
pub struct InMemoryTx {
    view: Tables,
    writes: Vec<StagedWrite>,
}

/// Relational store kept in process memory.
///
/// Implements [`RelationalTransactions`], [`AuthorRepository`] and
/// [`ArticleRepository`] over one shared set of tables. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRelationalStore {
    committed: Arc<Mutex<Tables>>,
}

impl InMemoryRelationalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of committed article rows.
    pub fn article_count(&self) -> usize {
        self.tables().articles.len()
    }

    /// Number of committed author rows.
    pub fn author_count(&self) -> usize {
        self.tables().authors.len()
    }
}

/// Rows come back oldest first, ties broken by id, matching the Diesel
/// adapter's `ORDER BY created_at, id`.
fn authors_matching(tables: &Tables, predicate: impl Fn(&Author) -> bool) -> Vec<Author> {
    let mut rows: Vec<Author> = tables
        .authors
        .values()
        .filter(|author| predicate(author))
        .cloned()
        .collect();
    rows.sort_by_key(|author| (author.created_at, author.id));
    rows
}

#[async_trait]
impl RelationalTransactions for InMemoryRelationalStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<Self::Tx, TransactionError> {
        Ok(InMemoryTx {
            view: self.tables().clone(),
            writes: Vec::new(),
        })
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), TransactionError> {
        let mut live = self.tables();
        let mut next = live.clone();
        for write in &tx.writes {
            next.replay(write).map_err(TransactionError::commit)?;
        }
        *live = next;
        debug!(writes = tx.writes.len(), "in-memory transaction committed");
        Ok(())
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), TransactionError> {
        debug!(
            writes = tx.writes.len(),
            "in-memory transaction rolled back"
        );
        Ok(())
    }
}

#[async_trait]
impl AuthorRepository for InMemoryRelationalStore {
    type Tx = InMemoryTx;

    async fn save(&self, tx: &mut Self::Tx, author: &Author) -> Result<(), AuthorRepositoryError> {
        tx.view.insert_author(author)?;
        tx.writes.push(StagedWrite::InsertAuthor(author.clone()));
        Ok(())
    }

    async fn update(
        &self,
        tx: &mut Self::Tx,
        update: &AuthorUpdate,
    ) -> Result<(), AuthorRepositoryError> {
        tx.view.update_author(update)?;
        tx.writes.push(StagedWrite::UpdateAuthor(update.clone()));
        Ok(())
    }

    async fn find_by_id(&self, id: &AuthorId) -> Result<Option<Author>, AuthorRepositoryError> {
        Ok(self.tables().authors.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[AuthorId]) -> Result<Vec<Author>, AuthorRepositoryError> {
        Ok(authors_matching(&self.tables(), |author| {
            ids.contains(&author.id)
        }))
    }

    async fn find_id_names_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<AuthorIdName>, AuthorRepositoryError> {
        Ok(authors_matching(&self.tables(), |author| author.name == name)
            .into_iter()
            .map(|author| AuthorIdName {
                id: author.id,
                name: author.name,
            })
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, AuthorRepositoryError> {
        Ok(authors_matching(&self.tables(), |author| author.email == email)
            .into_iter()
            .next())
    }
}

#[async_trait]
impl ArticleRepository for InMemoryRelationalStore {
    type Tx = InMemoryTx;

    async fn save(
        &self,
        tx: &mut Self::Tx,
        article: &Article,
    ) -> Result<(), ArticleRepositoryError> {
        self.save_many(tx, std::slice::from_ref(article)).await
    }

    async fn save_many(
        &self,
        tx: &mut Self::Tx,
        articles: &[Article],
    ) -> Result<(), ArticleRepositoryError> {
        tx.view.insert_articles(articles)?;
        tx.writes.push(StagedWrite::InsertArticles(articles.to_vec()));
        Ok(())
    }

    async fn update(
        &self,
        tx: &mut Self::Tx,
        update: &ArticleUpdate,
    ) -> Result<(), ArticleRepositoryError> {
        tx.view.update_article(update)?;
        tx.writes.push(StagedWrite::UpdateArticle(update.clone()));
        Ok(())
    }

    async fn find_by_id(&self, id: &ArticleId) -> Result<Option<Article>, ArticleRepositoryError> {
        Ok(self.tables().articles.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{ArticleInput, AuthorInput};

    #[fixture]
    fn store() -> InMemoryRelationalStore {
        InMemoryRelationalStore::new()
    }

    fn author(name: &str) -> Author {
        Author::create(
            AuthorInput::new(name, format!("{name}@example.com")),
            AuthorId::random(),
            Utc::now(),
        )
    }

    fn article(author_id: AuthorId, title: &str) -> Article {
        Article::create(
            ArticleInput::new(title, "body"),
            ArticleId::random(),
            author_id,
            Utc::now(),
        )
    }

    async fn committed_author(store: &InMemoryRelationalStore, name: &str) -> Author {
        let author = author(name);
        let mut tx = store.begin().await.expect("begin");
        AuthorRepository::save(store, &mut tx, &author)
            .await
            .expect("save author");
        store.commit(tx).await.expect("commit");
        author
    }

    #[rstest]
    #[tokio::test]
    async fn uncommitted_writes_are_invisible(store: InMemoryRelationalStore) {
        let author = author("Ada");
        let mut tx = store.begin().await.expect("begin");
        AuthorRepository::save(&store, &mut tx, &author)
            .await
            .expect("save author");

        let found = AuthorRepository::find_by_id(&store, &author.id)
            .await
            .expect("lookup");
        assert!(found.is_none());

        store.commit(tx).await.expect("commit");
        let found = AuthorRepository::find_by_id(&store, &author.id)
            .await
            .expect("lookup");
        assert_eq!(found, Some(author));
    }

    #[rstest]
    #[tokio::test]
    async fn rollback_discards_writes(store: InMemoryRelationalStore) {
        let author = committed_author(&store, "Ada").await;
        let mut tx = store.begin().await.expect("begin");
        ArticleRepository::save_many(
            &store,
            &mut tx,
            &[article(author.id, "one"), article(author.id, "two")],
        )
        .await
        .expect("save articles");
        store.rollback(tx).await.expect("rollback");

        assert_eq!(store.article_count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn article_insert_enforces_foreign_key(store: InMemoryRelationalStore) {
        let mut tx = store.begin().await.expect("begin");
        let result =
            ArticleRepository::save(&store, &mut tx, &article(AuthorId::random(), "orphan")).await;
        assert!(matches!(result, Err(ArticleRepositoryError::Query { .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn save_many_is_all_or_nothing(store: InMemoryRelationalStore) {
        let author = committed_author(&store, "Ada").await;
        let first = article(author.id, "first");
        let mut tx = store.begin().await.expect("begin");
        let result = ArticleRepository::save_many(
            &store,
            &mut tx,
            &[first.clone(), article(AuthorId::random(), "bad")],
        )
        .await;
        assert!(result.is_err());
        store.commit(tx).await.expect("commit");
        let found = ArticleRepository::find_by_id(&store, &first.id)
            .await
            .expect("lookup");
        assert!(found.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn article_update_is_scoped_to_owner(store: InMemoryRelationalStore) {
        let owner = committed_author(&store, "Ada").await;
        let row = article(owner.id, "title");
        let mut tx = store.begin().await.expect("begin");
        ArticleRepository::save(&store, &mut tx, &row)
            .await
            .expect("save");
        store.commit(tx).await.expect("commit");

        let mut tx = store.begin().await.expect("begin");
        let foreign = ArticleInput::new("new", "new").into_update(row.id, AuthorId::random(), Utc::now());
        let result = ArticleRepository::update(&store, &mut tx, &foreign).await;
        assert_eq!(result, Err(ArticleRepositoryError::NotFound { id: row.id }));
    }

    #[rstest]
    #[tokio::test]
    async fn author_update_of_missing_row_is_not_found(store: InMemoryRelationalStore) {
        let id = AuthorId::random();
        let mut tx = store.begin().await.expect("begin");
        let update = AuthorInput::new("n", "e").into_update(id, Utc::now());
        let result = AuthorRepository::update(&store, &mut tx, &update).await;
        assert_eq!(result, Err(AuthorRepositoryError::NotFound { id }));
    }

    #[rstest]
    #[tokio::test]
    async fn name_lookup_returns_every_match(store: InMemoryRelationalStore) {
        let first = committed_author(&store, "Same").await;
        let second = committed_author(&store, "Same").await;
        committed_author(&store, "Other").await;

        let matches = store.find_id_names_by_name("Same").await.expect("lookup");
        let ids: Vec<AuthorId> = matches.iter().map(|m| m.id).collect();
        assert_eq!(matches.len(), 2);
        assert!(ids.contains(&first.id));
        assert!(ids.contains(&second.id));
    }

    #[rstest]
    #[tokio::test]
    async fn conflicting_commit_leaves_store_untouched(store: InMemoryRelationalStore) {
        let author = author("Ada");
        let mut first = store.begin().await.expect("begin");
        let mut second = store.begin().await.expect("begin");
        AuthorRepository::save(&store, &mut first, &author)
            .await
            .expect("stage first");
        AuthorRepository::save(&store, &mut second, &author)
            .await
            .expect("stage second");

        store.commit(first).await.expect("first commit");
        let result = store.commit(second).await;
        assert!(matches!(result, Err(TransactionError::Commit { .. })));
        assert_eq!(store.author_count(), 1);
    }
}
