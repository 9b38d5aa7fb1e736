//! Store configuration loaded via OrthoConfig.
//!
//! Values come from `SCRIPTORIUM_*` environment variables, configuration
//! files and CLI flags. Optional fields fall back to the defaults below.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::outbound::persistence::PoolConfig;
use crate::outbound::search::ElasticsearchIndexOptions;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SEARCH_URL: &str = "http://localhost:9200";
const DEFAULT_SEARCH_INDEX: &str = "articles";
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SEARCH_MAX_RESULTS: u32 = 1000;

/// Invalid or missing store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("configuration could not be loaded: {message}")]
    Load { message: String },
    #[error("database_url must be set")]
    MissingDatabaseUrl,
    #[error("database_max_connections must be greater than zero")]
    ZeroPoolSize,
    #[error("search_url {url:?} is not a valid URL: {message}")]
    InvalidSearchUrl { url: String, message: String },
    #[error("search_index must not be blank")]
    BlankIndexName,
    #[error("search_max_results must be greater than zero")]
    ZeroResultCap,
}

/// Connection settings for the relational store and the search index.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SCRIPTORIUM")]
pub struct StoreSettings {
    /// PostgreSQL URL for the relational store.
    pub database_url: Option<String>,
    /// Connection pool size.
    pub database_max_connections: Option<u32>,
    /// Elasticsearch-compatible endpoint.
    pub search_url: Option<String>,
    /// Index holding article documents.
    pub search_index: Option<String>,
    /// Per-request timeout for the search endpoint, in seconds.
    pub search_timeout_secs: Option<u64>,
    /// Hit cap sent with every query.
    pub search_max_results: Option<u32>,
    /// Make index writes visible to the next read.
    pub search_wait_for_refresh: Option<bool>,
}

impl StoreSettings {
    /// Load settings from the environment and configuration files only.
    ///
    /// Command-line arguments are left to the calling binary.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Load`] when a source cannot be parsed.
    pub fn from_environment() -> Result<Self, SettingsError> {
        Self::load_from_iter([OsString::from("scriptorium")]).map_err(|err| SettingsError::Load {
            message: err.to_string(),
        })
    }

    /// Check every field, returning the first problem found.
    ///
    /// # Errors
    ///
    /// Returns the [`SettingsError`] describing the invalid field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.pool_config()?;
        self.search_endpoint()?;
        self.index_options()?;
        Ok(())
    }

    /// Trimmed database URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingDatabaseUrl`] when unset or blank.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Pool settings for the relational store.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] for a missing URL or a zero pool size.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let max_size = self
            .database_max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        if max_size == 0 {
            return Err(SettingsError::ZeroPoolSize);
        }
        Ok(PoolConfig::new(self.database_url()?).with_max_size(max_size))
    }

    /// Parsed search endpoint, defaulting to a local node.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidSearchUrl`] when the URL cannot carry
    /// an index path.
    pub fn search_endpoint(&self) -> Result<Url, SettingsError> {
        let raw = self.search_url.as_deref().unwrap_or(DEFAULT_SEARCH_URL);
        let url = Url::parse(raw).map_err(|err| SettingsError::InvalidSearchUrl {
            url: raw.to_owned(),
            message: err.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(SettingsError::InvalidSearchUrl {
                url: raw.to_owned(),
                message: "URL cannot carry a path".to_owned(),
            });
        }
        Ok(url)
    }

    /// Per-request timeout for the search endpoint.
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(
            self.search_timeout_secs
                .unwrap_or(DEFAULT_SEARCH_TIMEOUT_SECS),
        )
    }

    /// Index name, result cap and refresh policy.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] for a blank index name or a zero cap.
    pub fn index_options(&self) -> Result<ElasticsearchIndexOptions, SettingsError> {
        let index = self
            .search_index
            .as_deref()
            .unwrap_or(DEFAULT_SEARCH_INDEX)
            .trim();
        if index.is_empty() {
            return Err(SettingsError::BlankIndexName);
        }
        let max_results = self
            .search_max_results
            .unwrap_or(DEFAULT_SEARCH_MAX_RESULTS);
        if max_results == 0 {
            return Err(SettingsError::ZeroResultCap);
        }
        Ok(ElasticsearchIndexOptions {
            index: index.to_owned(),
            max_results,
            wait_for_refresh: self.search_wait_for_refresh.unwrap_or(true),
        })
    }
}
