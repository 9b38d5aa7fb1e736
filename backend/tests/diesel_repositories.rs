//! PostgreSQL-backed repository and transaction behaviour.
//!
//! Runs only when `SCRIPTORIUM_TEST_DATABASE_URL` points at a disposable
//! database; otherwise every test prints a skip marker and returns.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use rstest::rstest;
use scriptorium::domain::ports::{
    ArticleRepository, ArticleRepositoryError, AuthorRepository, AuthorRepositoryError,
    RelationalTransactions,
};
use scriptorium::domain::{
    Article, ArticleId, ArticleInput, ArticleUpdate, Author, AuthorId, AuthorInput,
};
use scriptorium::outbound::persistence::{
    DbPool, DieselArticleRepository, DieselAuthorRepository, DieselTransactions, PoolConfig,
    run_migrations,
};
use uuid::Uuid;

struct Repositories {
    transactions: DieselTransactions,
    authors: DieselAuthorRepository,
    articles: DieselArticleRepository,
}

async fn repositories() -> Option<Repositories> {
    let Ok(url) = std::env::var("SCRIPTORIUM_TEST_DATABASE_URL") else {
        eprintln!("SKIP-POSTGRES: SCRIPTORIUM_TEST_DATABASE_URL is not set");
        return None;
    };
    run_migrations(&url).await.expect("migrations apply");
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(4))
        .await
        .expect("pool builds");
    Some(Repositories {
        transactions: DieselTransactions::new(pool.clone()),
        authors: DieselAuthorRepository::new(pool.clone()),
        articles: DieselArticleRepository::new(pool),
    })
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

fn author(name: &str, created_at: DateTime<Utc>) -> Author {
    let input = AuthorInput::new(name, format!("{}@example.com", unique("author")))
        .with_credential_hash("hash");
    Author::create(input, AuthorId::random(), created_at)
}

async fn persist_author(repos: &Repositories, author: &Author) {
    let mut tx = repos.transactions.begin().await.expect("begin");
    repos.authors.save(&mut tx, author).await.expect("save author");
    repos.transactions.commit(tx).await.expect("commit");
}

#[rstest]
#[tokio::test]
async fn authors_round_trip_and_update() {
    let Some(repos) = repositories().await else {
        return;
    };
    let created_at = now();
    let stored = author(&unique("Ada"), created_at);
    persist_author(&repos, &stored).await;

    let found = repos
        .authors
        .find_by_id(&stored.id)
        .await
        .expect("read")
        .expect("author present");
    assert_eq!(found, stored);

    let update = AuthorInput::new("Renamed", stored.email.clone())
        .into_update(stored.id, created_at + TimeDelta::seconds(5));
    let mut tx = repos.transactions.begin().await.expect("begin");
    repos.authors.update(&mut tx, &update).await.expect("update");
    repos.transactions.commit(tx).await.expect("commit");

    let by_email = repos
        .authors
        .find_by_email(&stored.email)
        .await
        .expect("read")
        .expect("author present");
    assert_eq!(by_email.name, "Renamed");
    assert_eq!(by_email.created_at, created_at);
    assert_eq!(by_email.updated_at, created_at + TimeDelta::seconds(5));
    assert_eq!(by_email.credential_hash.as_deref(), Some("hash"));
}

#[rstest]
#[tokio::test]
async fn updating_a_missing_author_is_not_found() {
    let Some(repos) = repositories().await else {
        return;
    };
    let missing = AuthorId::random();
    let update = AuthorInput::new("Nobody", "nobody@example.com").into_update(missing, now());

    let mut tx = repos.transactions.begin().await.expect("begin");
    let error = repos
        .authors
        .update(&mut tx, &update)
        .await
        .expect_err("no row matches");
    repos.transactions.rollback(tx).await.expect("rollback");

    assert_eq!(error, AuthorRepositoryError::not_found(missing));
}

#[rstest]
#[tokio::test]
async fn name_lookups_return_every_namesake_oldest_first() {
    let Some(repos) = repositories().await else {
        return;
    };
    let name = unique("Same");
    let older = author(&name, now());
    let newer = author(&name, older.created_at + TimeDelta::seconds(1));
    persist_author(&repos, &newer).await;
    persist_author(&repos, &older).await;

    let matches = repos
        .authors
        .find_id_names_by_name(&name)
        .await
        .expect("read");
    let ids: Vec<AuthorId> = matches.iter().map(|entry| entry.id).collect();
    assert_eq!(ids, vec![older.id, newer.id]);

    let bulk = repos
        .authors
        .find_by_ids(&[newer.id, AuthorId::random(), older.id])
        .await
        .expect("read");
    assert_eq!(bulk.len(), 2);
}

#[rstest]
#[tokio::test]
async fn rolled_back_and_abandoned_writes_are_not_visible() {
    let Some(repos) = repositories().await else {
        return;
    };
    let rolled_back = author(&unique("Gone"), now());
    let abandoned = author(&unique("Dropped"), now());

    let mut tx = repos.transactions.begin().await.expect("begin");
    repos
        .authors
        .save(&mut tx, &rolled_back)
        .await
        .expect("save");
    repos.transactions.rollback(tx).await.expect("rollback");

    let mut tx = repos.transactions.begin().await.expect("begin");
    repos.authors.save(&mut tx, &abandoned).await.expect("save");
    drop(tx);

    for id in [rolled_back.id, abandoned.id] {
        let found = repos.authors.find_by_id(&id).await.expect("read");
        assert!(found.is_none(), "author {id} must not be persisted");
    }
}

#[rstest]
#[tokio::test]
async fn batch_insert_is_atomic_and_updates_are_owner_scoped() {
    let Some(repos) = repositories().await else {
        return;
    };
    let owner = author(&unique("Owner"), now());
    persist_author(&repos, &owner).await;
    let batch: Vec<Article> = (0..3)
        .map(|n| {
            Article::create(
                ArticleInput::new(format!("Title {n}"), "Body"),
                ArticleId::random(),
                owner.id,
                now(),
            )
        })
        .collect();

    let mut tx = repos.transactions.begin().await.expect("begin");
    repos
        .articles
        .save_many(&mut tx, &batch)
        .await
        .expect("batch insert");
    repos.transactions.commit(tx).await.expect("commit");

    let first = &batch[0];
    let stranger = AuthorId::random();
    let foreign = ArticleUpdate {
        id: first.id,
        author_id: stranger,
        title: "Hijacked".to_owned(),
        body: "Nope".to_owned(),
        updated_at: now(),
    };
    let mut tx = repos.transactions.begin().await.expect("begin");
    let error = repos
        .articles
        .update(&mut tx, &foreign)
        .await
        .expect_err("other authors cannot update");
    repos.transactions.rollback(tx).await.expect("rollback");
    assert_eq!(error, ArticleRepositoryError::not_found(first.id));

    let stored = repos
        .articles
        .find_by_id(&first.id)
        .await
        .expect("read")
        .expect("article present");
    assert_eq!(stored.title, "Title 0");
    assert_eq!(stored.author_id, owner.id);
}

#[rstest]
#[tokio::test]
async fn articles_for_unknown_authors_violate_the_foreign_key() {
    let Some(repos) = repositories().await else {
        return;
    };
    let orphan = Article::create(
        ArticleInput::new("Orphan", "No author"),
        ArticleId::random(),
        AuthorId::random(),
        now(),
    );

    let mut tx = repos.transactions.begin().await.expect("begin");
    let error = repos
        .articles
        .save(&mut tx, &orphan)
        .await
        .expect_err("foreign key enforced");
    repos.transactions.rollback(tx).await.expect("rollback");

    match error {
        ArticleRepositoryError::Query { message } => {
            assert!(message.contains("foreign key"), "unexpected message: {message}");
        }
        other => panic!("expected query error, got {other:?}"),
    }
}
