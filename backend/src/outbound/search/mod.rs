//! Search index outbound adapters.
//!
//! A thin HTTP implementation of the `ArticleIndex` port for
//! Elasticsearch-compatible endpoints.

mod dto;
mod elasticsearch_index;

pub use elasticsearch_index::{ElasticsearchArticleIndex, ElasticsearchIndexOptions};
