//! Domain entities, services, and ports.
//!
//! Purpose: keep the relational store (source of truth) and the article
//! search index (derived copy) aligned on every mutation, and compose reads
//! that fan out across both.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Author / Article and their input, update, and composite types.
//! - AuthorService: author command and query driving ports.
//! - ArticleCommandService: the dual-write coordinator.
//! - ArticleQueryService: read composition across both stores.

pub mod article;
pub mod article_queries;
pub mod article_service;
pub mod author;
pub mod author_service;
pub mod error;
pub mod ports;
mod unit_of_work;

pub use self::article::{
    Article, ArticleFieldUpdate, ArticleId, ArticleInput, ArticleUpdate, ArticleWithAuthor,
    InvalidArticleId,
};
pub use self::article_queries::ArticleQueryService;
pub use self::article_service::ArticleCommandService;
pub use self::author::{
    Author, AuthorId, AuthorIdName, AuthorInput, AuthorUpdate, AuthorValidationError,
};
pub use self::author_service::AuthorService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use scriptorium::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<u32> {
///     Err(Error::not_found("nothing here"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
