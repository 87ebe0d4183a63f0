//! Runs one full catalog extraction and reports per-kind record counts.
//!
//! Connection settings come from `config/config.toml` or
//! `CATALOG__DATABASE__URL`. All reads run in one serializable read-only
//! transaction. Exits non-zero with a diagnostic naming the catalog kind that
//! failed.

use anyhow::Context;
use catalog_extract::{connect, CatalogReader, CatalogSnapshot, DatabaseConfig, MayPostgresExecutor};

fn run() -> anyhow::Result<()> {
    let config = DatabaseConfig::load().context("loading database configuration")?;
    let client = connect(&config.url).context("connecting to database")?;
    let reader = CatalogReader::new(MayPostgresExecutor::new(client));

    let snapshot = CatalogSnapshot::extract_consistent(&reader)?;
    log::info!(
        "session: client_encoding={} standard_conforming_strings={} default_with_oids={}",
        snapshot.session.client_encoding,
        snapshot.session.standard_conforming_strings,
        snapshot.session.default_with_oids
    );
    for (kind, count) in snapshot.counts() {
        log::info!("{kind}: {count}");
    }

    #[cfg(feature = "metrics")]
    log_query_metrics();
    Ok(())
}

#[cfg(feature = "metrics")]
fn log_query_metrics() {
    match catalog_extract::metrics::METRICS.render() {
        Ok(text) => log::debug!("query metrics:\n{text}"),
        Err(e) => log::warn!("failed to render query metrics: {e}"),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let outcome = match may::go!(run).join() {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!("extraction coroutine panicked")),
    };

    if let Err(e) = outcome {
        log::error!("catalog extraction failed: {e:#}");
        std::process::exit(1);
    }
}
