//! Article data model and the author-grouped read composite.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::author::{Author, AuthorId};

/// Error returned when an article id string is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("article id must be a valid UUID")]
pub struct InvalidArticleId;

/// Stable article identifier, also used as the search document key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(Uuid);

impl ArticleId {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The nil identifier.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Whether this is the nil identifier.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ArticleId {
    type Err = InvalidArticleId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| InvalidArticleId)
    }
}

/// Article row, optionally annotated with its author at read time.
///
/// ## Invariants
/// - `author` is a response-time annotation and is never persisted in
///   either store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Document key in the search index as well as the row key.
    pub id: ArticleId,
    pub title: String,
    pub body: String,
    /// Owning author.
    pub author_id: AuthorId,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Refreshed by every update.
    pub updated_at: DateTime<Utc>,
    /// Author attached by read composition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

impl Article {
    /// Build a new article row from caller input.
    pub fn create(
        input: ArticleInput,
        id: ArticleId,
        author_id: AuthorId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: input.title,
            body: input.body,
            author_id,
            created_at: now,
            updated_at: now,
            author: None,
        }
    }

    /// Copy of the article with any attached author removed.
    pub fn without_author(&self) -> Self {
        Self {
            author: None,
            ..self.clone()
        }
    }

    /// Attach an author snapshot for response composition.
    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    /// Apply a partial field update, leaving absent fields unchanged.
    pub fn apply(&mut self, fields: &ArticleFieldUpdate) {
        if let Some(title) = &fields.title {
            self.title.clone_from(title);
        }
        if let Some(body) = &fields.body {
            self.body.clone_from(body);
        }
        if let Some(author_id) = fields.author_id {
            self.author_id = author_id;
        }
        if let Some(updated_at) = fields.updated_at {
            self.updated_at = updated_at;
        }
    }
}

/// Caller-supplied article fields. Never carries an id or timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleInput {
    /// Article title.
    pub title: String,
    /// Article body text.
    pub body: String,
}

impl ArticleInput {
    /// Convenience constructor.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Project the input onto an update of an existing row.
    pub fn into_update(
        self,
        id: ArticleId,
        author_id: AuthorId,
        updated_at: DateTime<Utc>,
    ) -> ArticleUpdate {
        ArticleUpdate {
            id,
            author_id,
            title: self.title,
            body: self.body,
            updated_at,
        }
    }
}

/// Column changes applied by an article update.
///
/// `author_id` scopes the update to the owning author; it is not rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleUpdate {
    /// Row to update.
    pub id: ArticleId,
    /// Author that must own the row.
    pub author_id: AuthorId,
    pub title: String,
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

impl ArticleUpdate {
    /// Field set mirrored into the search index after the row is written.
    pub fn index_fields(&self) -> ArticleFieldUpdate {
        ArticleFieldUpdate {
            title: Some(self.title.clone()),
            body: Some(self.body.clone()),
            author_id: Some(self.author_id),
            updated_at: Some(self.updated_at),
        }
    }
}

/// Partial search document update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFieldUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<AuthorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One author grouped with zero or more of their articles.
///
/// Never persisted; serialises with the author fields inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleWithAuthor {
    #[serde(flatten)]
    pub author: Author,
    #[serde(rename = "article")]
    pub articles: Vec<Article>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn apply_only_overwrites_present_fields() {
        let mut article = Article::create(
            ArticleInput::new("Title", "Body"),
            ArticleId::random(),
            AuthorId::random(),
            Utc::now(),
        );
        article.apply(&ArticleFieldUpdate {
            body: Some("New body".to_owned()),
            ..ArticleFieldUpdate::default()
        });
        assert_eq!(article.title, "Title");
        assert_eq!(article.body, "New body");
    }

    #[rstest]
    fn field_update_serialises_only_present_fields() {
        let value = serde_json::to_value(ArticleFieldUpdate {
            title: Some("t".to_owned()),
            ..ArticleFieldUpdate::default()
        })
        .expect("serialise update");
        assert_eq!(value, json!({ "title": "t" }));
    }

    #[rstest]
    fn unannotated_article_omits_author() {
        let article = Article::default();
        let value = serde_json::to_value(&article).expect("serialise article");
        assert!(value.get("author").is_none());
    }

    #[rstest]
    fn composite_flattens_author_fields() {
        let author = Author {
            name: "Ada".to_owned(),
            ..Author::default()
        };
        let composite = ArticleWithAuthor {
            author,
            articles: vec![Article::default()],
        };
        let value = serde_json::to_value(&composite).expect("serialise composite");
        assert_eq!(value["name"], json!("Ada"));
        assert_eq!(value["article"].as_array().map(Vec::len), Some(1));
    }

    #[rstest]
    fn index_fields_mirror_the_written_row() {
        let now = Utc::now();
        let author_id = AuthorId::random();
        let update = ArticleInput::new("T", "B").into_update(ArticleId::random(), author_id, now);
        let fields = update.index_fields();
        assert_eq!(fields.title.as_deref(), Some("T"));
        assert_eq!(fields.author_id, Some(author_id));
        assert_eq!(fields.updated_at, Some(now));
    }
}
