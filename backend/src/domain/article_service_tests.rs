//! Tests for the article mutation coordinator.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{ArticleQuery, AuthorCommand, MockArticleIndex};
use crate::domain::{ArticleQueryService, AuthorInput, AuthorService, ErrorCode};
use crate::outbound::memory::{InMemoryArticleIndex, InMemoryRelationalStore};
use crate::test_support::clock::FixedClock;
use crate::test_support::faults::{CommitFailingTransactions, FlakyArticleIndex};

struct Stores {
    relational: Arc<InMemoryRelationalStore>,
    index: Arc<InMemoryArticleIndex>,
    author_id: AuthorId,
}

impl Stores {
    fn coordinator(
        &self,
    ) -> ArticleCommandService<InMemoryRelationalStore, InMemoryRelationalStore, InMemoryArticleIndex>
    {
        ArticleCommandService::new(
            Arc::clone(&self.relational),
            Arc::clone(&self.relational),
            Arc::clone(&self.index),
            Arc::new(FixedClock::at_fixture_time()),
        )
    }

    fn with_index<I: ArticleIndex>(
        &self,
        index: I,
    ) -> ArticleCommandService<InMemoryRelationalStore, InMemoryRelationalStore, I> {
        ArticleCommandService::new(
            Arc::clone(&self.relational),
            Arc::clone(&self.relational),
            Arc::new(index),
            Arc::new(FixedClock::at_fixture_time()),
        )
    }

    fn queries(
        &self,
    ) -> ArticleQueryService<InMemoryRelationalStore, InMemoryRelationalStore, InMemoryArticleIndex>
    {
        ArticleQueryService::new(
            Arc::clone(&self.relational),
            Arc::clone(&self.relational),
            Arc::clone(&self.index),
        )
    }

    async fn row_exists(&self, id: ArticleId) -> bool {
        ArticleRepository::find_by_id(self.relational.as_ref(), &id)
            .await
            .expect("row lookup")
            .is_some()
    }
}

#[fixture]
async fn stores() -> Stores {
    let relational = Arc::new(InMemoryRelationalStore::new());
    let authors = AuthorService::new(
        Arc::clone(&relational),
        Arc::clone(&relational),
        Arc::new(FixedClock::at_fixture_time()),
    );
    let author_id = authors
        .create_author(AuthorInput::new("Ada", "ada@example.com"))
        .await
        .expect("seed author");
    Stores {
        relational,
        index: Arc::new(InMemoryArticleIndex::new()),
        author_id,
    }
}

fn inputs(count: usize) -> Vec<ArticleInput> {
    (1..=count)
        .map(|n| ArticleInput::new(format!("Title {n}"), format!("Body {n}")))
        .collect()
}

#[rstest]
#[tokio::test]
async fn create_article_writes_row_and_document(#[future] stores: Stores) {
    let stores = stores.await;
    let created = stores
        .coordinator()
        .create_article(ArticleInput::new("Hello", "World"), stores.author_id)
        .await
        .expect("create article");

    assert!(stores.row_exists(created.id).await);
    let document = stores.index.document(&created.id).expect("document indexed");
    assert_eq!(document.title, "Hello");
    assert_eq!(document.author_id, stores.author_id);
    assert!(document.author.is_none());
}

#[rstest]
#[tokio::test]
async fn created_article_round_trips_with_author(#[future] stores: Stores) {
    let stores = stores.await;
    let created = stores
        .coordinator()
        .create_article(ArticleInput::new("Hello", "World"), stores.author_id)
        .await
        .expect("create article");

    let fetched = stores
        .queries()
        .get_article_by_id(created.id)
        .await
        .expect("fetch article");
    assert_eq!(fetched.title, "Hello");
    assert_eq!(fetched.body, "World");
    assert_eq!(fetched.author_id, stores.author_id);
    let author = fetched.author.expect("author attached");
    assert_eq!(author.id, stores.author_id);
    assert_eq!(author.name, "Ada");
}

#[rstest]
#[tokio::test]
async fn index_failure_rolls_back_the_row(#[future] stores: Stores) {
    let stores = stores.await;
    let coordinator =
        stores.with_index(FlakyArticleIndex::new(InMemoryArticleIndex::new()).failing_after(0));

    let error = coordinator
        .create_article(ArticleInput::new("Hello", "World"), stores.author_id)
        .await
        .expect_err("index write fails");

    assert_eq!(error.code(), ErrorCode::Internal);
    assert_eq!(stores.relational.article_count(), 0);
}

#[rstest]
#[tokio::test]
async fn relational_failure_never_touches_the_index(#[future] stores: Stores) {
    let stores = stores.await;
    let mut index = MockArticleIndex::new();
    index.expect_index().times(0);
    let coordinator = stores.with_index(index);

    let error = coordinator
        .create_article(ArticleInput::new("Hello", "World"), AuthorId::random())
        .await
        .expect_err("foreign key rejects unknown author");

    assert_eq!(error.code(), ErrorCode::Internal);
}

#[rstest]
#[case(1, 0)]
#[case(3, 0)]
#[case(3, 1)]
#[case(3, 2)]
#[case(5, 4)]
#[tokio::test]
async fn bulk_index_failure_rolls_back_every_row(
    #[future] stores: Stores,
    #[case] batch: usize,
    #[case] failing_item: usize,
) {
    let stores = stores.await;
    let index = InMemoryArticleIndex::new();
    let coordinator =
        stores.with_index(FlakyArticleIndex::new(index.clone()).failing_after(failing_item));

    let error = coordinator
        .create_many_articles(inputs(batch), stores.author_id)
        .await
        .expect_err("bulk index fails");

    assert_eq!(error.code(), ErrorCode::Internal);
    assert_eq!(
        error.details().and_then(|details| details.get("position")),
        Some(&json!(failing_item))
    );
    assert_eq!(stores.relational.article_count(), 0);
    // Documents indexed before the failing item remain as orphans.
    assert_eq!(index.len(), failing_item);
}

#[rstest]
#[tokio::test]
async fn bulk_create_indexes_every_article(#[future] stores: Stores) {
    let stores = stores.await;
    let created = stores
        .coordinator()
        .create_many_articles(inputs(3), stores.author_id)
        .await
        .expect("bulk create");

    assert_eq!(created.len(), 3);
    for article in &created {
        assert!(stores.row_exists(article.id).await);
        assert!(stores.index.document(&article.id).is_some());
    }
}

#[rstest]
#[tokio::test]
async fn empty_bulk_create_touches_nothing(#[future] stores: Stores) {
    let stores = stores.await;
    let mut index = MockArticleIndex::new();
    index.expect_index().times(0);

    let created = stores
        .with_index(index)
        .create_many_articles(Vec::new(), stores.author_id)
        .await
        .expect("empty batch");
    assert!(created.is_empty());
}

#[rstest]
#[tokio::test]
async fn commit_failure_leaves_orphan_document(#[future] stores: Stores) {
    let stores = stores.await;
    let coordinator = ArticleCommandService::new(
        Arc::new(CommitFailingTransactions::new(stores.relational.as_ref().clone())),
        Arc::clone(&stores.relational),
        Arc::clone(&stores.index),
        Arc::new(FixedClock::at_fixture_time()),
    );

    let error = coordinator
        .create_article(ArticleInput::new("Ghost", "Orphaned"), stores.author_id)
        .await
        .expect_err("commit fails");
    assert_eq!(error.code(), ErrorCode::Internal);

    let orphans = stores.index.find_all().await.expect("index scan");
    assert_eq!(orphans.len(), 1);
    let orphan = orphans.first().expect("orphan present");
    assert_eq!(orphan.title, "Ghost");
    assert!(!stores.row_exists(orphan.id).await);
}

#[rstest]
#[tokio::test]
async fn update_writes_row_and_upserts_document(#[future] stores: Stores) {
    let stores = stores.await;
    let coordinator = stores.coordinator();
    let created = coordinator
        .create_article(ArticleInput::new("Draft", "Rough"), stores.author_id)
        .await
        .expect("create article");

    let id = coordinator
        .update_article(
            Some(ArticleInput::new("Final", "Polished")),
            created.id,
            stores.author_id,
        )
        .await
        .expect("update article");
    assert_eq!(id, created.id);

    let fetched = stores.queries().get_article_by_id(id).await.expect("fetch");
    assert_eq!(fetched.title, "Final");
    assert_eq!(fetched.created_at, created.created_at);
    let document = stores.index.document(&id).expect("document");
    assert_eq!(document.body, "Polished");
}

#[rstest]
#[tokio::test]
async fn update_sends_title_body_owner_and_timestamp(#[future] stores: Stores) {
    let stores = stores.await;
    let created = stores
        .coordinator()
        .create_article(ArticleInput::new("Draft", "Rough"), stores.author_id)
        .await
        .expect("create article");

    let author_id = stores.author_id;
    let mut index = MockArticleIndex::new();
    index
        .expect_update_fields()
        .withf(move |_, fields| {
            fields.title.as_deref() == Some("Final")
                && fields.body.as_deref() == Some("Polished")
                && fields.author_id == Some(author_id)
                && fields.updated_at.is_some()
        })
        .times(1)
        .returning(|_, _| Ok(()));

    stores
        .with_index(index)
        .update_article(
            Some(ArticleInput::new("Final", "Polished")),
            created.id,
            stores.author_id,
        )
        .await
        .expect("update article");
}

#[rstest]
#[tokio::test]
async fn update_index_failure_restores_the_row(#[future] stores: Stores) {
    let stores = stores.await;
    let created = stores
        .coordinator()
        .create_article(ArticleInput::new("Draft", "Rough"), stores.author_id)
        .await
        .expect("create article");

    let error = stores
        .with_index(FlakyArticleIndex::new(InMemoryArticleIndex::new()).failing_after(0))
        .update_article(
            Some(ArticleInput::new("Final", "Polished")),
            created.id,
            stores.author_id,
        )
        .await
        .expect_err("index update fails");
    assert_eq!(error.code(), ErrorCode::Internal);

    let row = ArticleRepository::find_by_id(stores.relational.as_ref(), &created.id)
        .await
        .expect("lookup")
        .expect("row still present");
    assert_eq!(row.title, "Draft");
}

#[rstest]
#[case(None, false, false)]
#[case(Some(ArticleInput::new("t", "b")), true, false)]
#[case(Some(ArticleInput::new("t", "b")), false, true)]
#[tokio::test]
async fn update_validation_touches_neither_store(
    #[future] stores: Stores,
    #[case] input: Option<ArticleInput>,
    #[case] nil_article: bool,
    #[case] nil_author: bool,
) {
    let stores = stores.await;
    let mut index = MockArticleIndex::new();
    index.expect_update_fields().times(0);
    let id = if nil_article { ArticleId::nil() } else { ArticleId::random() };
    let author_id = if nil_author { AuthorId::nil() } else { stores.author_id };

    let error = stores
        .with_index(index)
        .update_article(input, id, author_id)
        .await
        .expect_err("validation fails");
    assert_eq!(error.code(), ErrorCode::InvalidInput);
}

#[rstest]
#[tokio::test]
async fn update_by_another_author_is_not_found(#[future] stores: Stores) {
    let stores = stores.await;
    let coordinator = stores.coordinator();
    let created = coordinator
        .create_article(ArticleInput::new("Draft", "Rough"), stores.author_id)
        .await
        .expect("create article");

    let error = coordinator
        .update_article(
            Some(ArticleInput::new("Hijack", "Nope")),
            created.id,
            AuthorId::random(),
        )
        .await
        .expect_err("not the owner");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(
        stores.index.document(&created.id).map(|doc| doc.title),
        Some("Draft".to_owned())
    );
}
