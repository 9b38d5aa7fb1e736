//! Internal Diesel row structs.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{Article, ArticleId, ArticleUpdate, Author, AuthorId, AuthorUpdate};

use super::schema::{articles, authors};

/// Row struct for reading from the authors table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = authors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuthorRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub credential_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: AuthorId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            credential_hash: row.credential_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating author records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = authors)]
pub(crate) struct NewAuthorRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub credential_hash: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Author> for NewAuthorRow<'a> {
    fn from(author: &'a Author) -> Self {
        Self {
            id: *author.id.as_uuid(),
            name: &author.name,
            email: &author.email,
            credential_hash: author.credential_hash.as_deref(),
            created_at: author.created_at,
            updated_at: author.updated_at,
        }
    }
}

/// Changeset for author updates. `created_at` is never part of it.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = authors)]
pub(crate) struct AuthorChangeset<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a AuthorUpdate> for AuthorChangeset<'a> {
    fn from(update: &'a AuthorUpdate) -> Self {
        Self {
            name: &update.name,
            email: &update.email,
            updated_at: update.updated_at,
        }
    }
}

/// Row struct for reading from the articles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArticleRow {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: ArticleId::from_uuid(row.id),
            title: row.title,
            body: row.body,
            author_id: AuthorId::from_uuid(row.author_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
            author: None,
        }
    }
}

/// Insertable struct for creating article records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = articles)]
pub(crate) struct NewArticleRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub body: &'a str,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Article> for NewArticleRow<'a> {
    fn from(article: &'a Article) -> Self {
        Self {
            id: *article.id.as_uuid(),
            title: &article.title,
            body: &article.body,
            author_id: *article.author_id.as_uuid(),
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

/// Changeset for article updates. Ownership and `created_at` are fixed.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = articles)]
pub(crate) struct ArticleChangeset<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a ArticleUpdate> for ArticleChangeset<'a> {
    fn from(update: &'a ArticleUpdate) -> Self {
        Self {
            title: &update.title,
            body: &update.body,
            updated_at: update.updated_at,
        }
    }
}
