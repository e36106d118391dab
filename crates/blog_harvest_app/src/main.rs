mod settings;

use std::path::Path;

use anyhow::{Context, Result};
use blog_harvest_engine::{Harvester, RunSummary};
use harvest_logging::{harvest_info, harvest_warn, LevelFilter};

use settings::{Settings, SETTINGS_FILENAME};

fn main() -> Result<()> {
    let settings = Settings::load(Path::new("."))?;
    harvest_logging::initialize(&settings.log_destination(), LevelFilter::Info);
    if settings != Settings::default() {
        harvest_info!("Using overrides from {}", SETTINGS_FILENAME);
    }

    let config = settings.into_engine_config();
    harvest_info!(
        "Harvesting {} into {:?} (images in {:?})",
        config.listing_url,
        config.content_dir,
        config.assets_dir
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("could not start the async runtime")?;
    let harvester = Harvester::new(config);
    let summary = runtime
        .block_on(harvester.run())
        .context("harvest aborted")?;

    report(&summary);
    Ok(())
}

fn report(summary: &RunSummary) {
    harvest_info!(
        "{} listing pages, {} posts found, {} saved, {} failed",
        summary.crawl.pages_fetched,
        summary.discovered(),
        summary.saved_count(),
        summary.failures.len()
    );
    for failure in &summary.failures {
        harvest_warn!("  {}: {}", failure.url, failure.reason);
    }
}
