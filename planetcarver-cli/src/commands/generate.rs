//! `generate-extracts` subcommand.
//!
//! Downloads (or reuses) the planet dump, seeds the root extent, and runs
//! the split scheduler until every branch of the quadtree has reached the
//! target size or the zoom ceiling.

use crate::error::CliError;
use crate::{Cli, MappingAuth};
use clap::Args;
use planetcarver::bootstrap::{self, DEFAULT_PLANET_URL};
use planetcarver::catalog::HttpCatalog;
use planetcarver::config::{format_size, parse_size};
use planetcarver::extract::OsmConvertExtractor;
use planetcarver::scheduler::{default_worker_count, RunSummary, SchedulerConfig, SplitScheduler};
use planetcarver::sink::OutputDirSink;
use planetcarver::store::ExtentStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Arguments for `generate-extracts`.
#[derive(Debug, Args)]
pub struct GenerateExtractsArgs {
    /// Url of the source pbf file
    #[arg(short = 'p', long, default_value = DEFAULT_PLANET_URL)]
    pub planet_dump: String,

    /// Target files will not be larger than this size (e.g. "1.5GB")
    #[arg(short = 's', long, default_value = "1.5GB", value_parser = parse_size)]
    pub target_size: u64,

    /// Maximum zoom level above which no further splitting will be performed
    #[arg(short = 'z', long, default_value_t = 9)]
    pub max_zoom: u8,

    /// How many concurrent extraction processes to use
    #[arg(long, default_value_t = default_worker_count())]
    pub workers: usize,

    /// Assume the root extent is already seeded and skip the download
    #[arg(long)]
    pub skip_download: bool,
}

/// Runs the subcommand to completion and returns the run summary.
pub async fn run_generate_extracts(
    cli: &Cli,
    args: &GenerateExtractsArgs,
) -> Result<RunSummary, CliError> {
    let store = ExtentStore::new(&cli.working_dir);

    if args.skip_download {
        info!("skipping planet dump download (--skip-download)");
    } else {
        let dump = bootstrap::download_planet_dump(&args.planet_dump, &cli.working_dir)
            .await
            .map_err(CliError::Bootstrap)?;
        bootstrap::seed_root(&store, &dump)
            .await
            .map_err(CliError::Bootstrap)?;
    }

    let mut sink = OutputDirSink::new(&cli.output_dir);
    match (&cli.mapping_url, &cli.mapping_auth) {
        (Some(url), Some(MappingAuth { username, password })) => {
            let catalog = HttpCatalog::new(url.clone(), username.clone(), password.clone())
                .map_err(CliError::Catalog)?;
            sink = sink.with_catalog(Arc::new(catalog));
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("--mapping-url and --mapping-auth must be given together; uploads disabled");
        }
        (None, None) => {}
    }

    let config = SchedulerConfig::default()
        .with_target_size(args.target_size)
        .with_max_zoom(args.max_zoom)
        .with_workers(args.workers);
    info!(
        target_size = %format_size(args.target_size),
        max_zoom = args.max_zoom,
        workers = config.workers,
        "extracting tiles"
    );

    let scheduler = SplitScheduler::new(
        store,
        Arc::new(OsmConvertExtractor::new()),
        Arc::new(sink),
        config,
    );

    // Ctrl-C stops new submissions and kills running extractions.
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling run");
            signal_token.cancel();
        }
    });

    scheduler.run(shutdown).await.map_err(CliError::Scheduler)
}
