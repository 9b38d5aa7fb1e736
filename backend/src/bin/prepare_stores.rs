//! Prepare the relational store and the search index for the services.
//!
//! Applies pending schema migrations and creates the article index with its
//! mapping. Connection settings come from `SCRIPTORIUM_*` variables.
//!
//! # Examples
//! ```sh
//! SCRIPTORIUM_DATABASE_URL=postgres://localhost/scriptorium \
//!   cargo run --manifest-path backend/Cargo.toml --bin prepare-stores -- --skip-index
//! ```
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use scriptorium::config::StoreSettings;
use scriptorium::outbound::persistence::run_migrations;
use scriptorium::outbound::search::ElasticsearchArticleIndex;
use scriptorium::telemetry::init_tracing;
use tokio::runtime::Builder;
use tracing::info;

/// `prepare-stores` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "prepare-stores",
    about = "Apply schema migrations and create the article search index",
    version
)]
struct CliArgs {
    /// Leave the relational schema untouched.
    #[arg(long)]
    skip_migrations: bool,
    /// Leave the search index untouched.
    #[arg(long)]
    skip_index: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;
    let args = CliArgs::parse();
    let settings = StoreSettings::from_environment()?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(prepare(&args, &settings))
}

async fn prepare(args: &CliArgs, settings: &StoreSettings) -> Result<()> {
    if args.skip_migrations {
        info!("skipping schema migrations");
    } else {
        let applied = run_migrations(settings.database_url()?)
            .await
            .wrap_err("failed to apply schema migrations")?;
        info!(applied, "relational store ready");
    }

    if args.skip_index {
        info!("skipping search index creation");
    } else {
        let index = ElasticsearchArticleIndex::with_options(
            settings.search_endpoint()?,
            settings.search_timeout(),
            settings.index_options()?,
        )
        .wrap_err("failed to build search client")?;
        let created = index
            .ensure_index()
            .await
            .wrap_err("failed to prepare search index")?;
        info!(index = index.index_name(), created, "search index ready");
    }

    Ok(())
}
