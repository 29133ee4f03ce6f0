mod atmosphere;
mod binning;
mod config;
mod flight;
mod geodesy;
mod publish;
mod sites;
mod stats;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::binning::{locate_flights, BinnedData, LocatedFlight};
use crate::config::Config;
use crate::flight::{discover_summary_files, load_summaries, TypeTable};
use crate::publish::{publish_flights, DirectorySink};
use crate::sites::LaunchSiteIndex;
use crate::stats::analyse_sites;

#[derive(Parser)]
#[command(name = "sonde-sites")]
#[command(about = "Bin radiosonde flight summaries into launch sites")]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Launch site dataset, overrides the configuration file
    #[arg(long, global = true)]
    sites: Option<PathBuf>,
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BinningArgs {
    /// Radius from launch site in km
    #[arg(long)]
    radius: Option<f64>,
    /// Altitude cap for launch fixes (m)
    #[arg(long)]
    alt: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bin summary files into launch sites
    Bin {
        /// Top-level folder of the summary archive
        #[arg(long)]
        folder: PathBuf,
        #[command(flatten)]
        binning: BinningArgs,
        /// Write binned sondes to this file
        #[arg(long, default_value = "binned_sites.json")]
        binned_output: PathBuf,
        /// Perform burst altitude / descent rate analysis
        #[arg(long)]
        post_analysis: bool,
        /// Write out the updated launch sites dataset
        #[arg(long)]
        update_sites: Option<PathBuf>,
    },
    /// Burst altitude / descent rate analysis of an existing binned data file
    Analyse {
        #[arg(long)]
        binned_input: PathBuf,
        /// Write out the updated launch sites dataset
        #[arg(long)]
        update_sites: Option<PathBuf>,
    },
    /// Republish newly located flights with their launch site
    Publish {
        #[arg(long)]
        folder: PathBuf,
        #[command(flatten)]
        binning: BinningArgs,
        #[arg(long)]
        sink_dir: Option<PathBuf>,
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long)]
        queue_capacity: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Error reading config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    if let Some(sites) = cli.sites {
        config.sites = sites;
    }

    let mut sites = match LaunchSiteIndex::from_file(&config.sites) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Error loading launch sites: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if sites.is_empty() {
        log::error!("No launch sites in {}", config.sites.display());
        return ExitCode::FAILURE;
    }
    log::info!("Loaded {} launch sites.", sites.len());

    match cli.command {
        Commands::Bin {
            folder,
            binning,
            binned_output,
            post_analysis,
            update_sites,
        } => {
            binning.apply(&mut config);
            bin(
                &config,
                &mut sites,
                &folder,
                &binned_output,
                post_analysis,
                update_sites.as_deref(),
            )
        }
        Commands::Analyse {
            binned_input,
            update_sites,
        } => analyse(&config, &mut sites, &binned_input, update_sites.as_deref()),
        Commands::Publish {
            folder,
            binning,
            sink_dir,
            workers,
            queue_capacity,
        } => {
            binning.apply(&mut config);
            if let Some(dir) = sink_dir {
                config.publish.sink_dir = dir;
            }
            if let Some(n) = workers {
                config.publish.workers = n;
            }
            if let Some(n) = queue_capacity {
                config.publish.queue_capacity = n;
            }
            publish(&config, &sites, &folder)
        }
    }
}

impl BinningArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(radius) = self.radius {
            config.binning.radius_km = radius;
        }
        if let Some(alt) = self.alt {
            config.binning.alt_limit_m = alt;
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn bin(
    config: &Config,
    sites: &mut LaunchSiteIndex,
    folder: &Path,
    binned_output: &Path,
    post_analysis: bool,
    update_sites: Option<&Path>,
) -> ExitCode {
    let started = Instant::now();

    let Some(located) = locate_corpus(config, sites, folder) else {
        return ExitCode::FAILURE;
    };
    let binned = BinnedData::from_located(&located, sites);

    if let Err(e) = binned.write_file(binned_output) {
        log::error!("Error writing {}: {}", binned_output.display(), e);
        return ExitCode::FAILURE;
    }
    log::info!("Wrote binned data to {}.", binned_output.display());

    if post_analysis {
        analyse_sites(&binned, sites, &config.aggregate_params());
    }

    if let Some(path) = update_sites {
        if let Err(e) = sites.write_dataset(path) {
            log::error!("Error writing {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    log::info!("Finished in {}", elapsed(started));
    ExitCode::SUCCESS
}

fn analyse(
    config: &Config,
    sites: &mut LaunchSiteIndex,
    binned_input: &Path,
    update_sites: Option<&Path>,
) -> ExitCode {
    let binned = match BinnedData::from_file(binned_input) {
        Ok(b) => b,
        Err(e) => {
            log::error!("Error reading binned data: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if binned.is_empty() {
        log::warn!("No binned sondes in {}", binned_input.display());
    }
    log::info!(
        "Loaded {} sondes across {} sites from {}.",
        binned.flight_count(),
        binned.len(),
        binned_input.display()
    );

    analyse_sites(&binned, sites, &config.aggregate_params());

    if let Some(path) = update_sites {
        if let Err(e) = sites.write_dataset(path) {
            log::error!("Error writing {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn publish(config: &Config, sites: &LaunchSiteIndex, folder: &Path) -> ExitCode {
    let started = Instant::now();

    let table = match &config.publish.type_table {
        Some(path) => match TypeTable::from_file(path) {
            Ok(t) => t,
            Err(e) => {
                log::error!("Error loading type table {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => TypeTable::default(),
    };
    if table.is_empty() {
        log::error!("Sonde type table has no entries");
        return ExitCode::FAILURE;
    }
    log::debug!("Using {} sonde type mappings", table.len());

    let Some(located) = locate_corpus(config, sites, folder) else {
        return ExitCode::FAILURE;
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(r) => r,
        Err(e) => {
            log::error!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let sink = Arc::new(DirectorySink::new(config.publish.sink_dir.clone()));
    let settings = config.publish_settings();
    log::info!(
        "Publishing to {} with {} workers (batch queue {})",
        config.publish.sink_dir.display(),
        settings.workers,
        settings.queue_capacity
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let report = match runtime.block_on(publish_flights(located, &table, sink, &settings, shutdown))
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("Publishing failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if report.cancelled {
        log::warn!("Publishing was interrupted; remaining flights were not queued");
    }
    log::info!(
        "Batch {}: {} uploaded, {} failed, {} already had a launch site, {} unrecognized type",
        report.batch_id,
        report.uploaded,
        report.failed,
        report.previously_sited,
        report.unknown_type
    );
    log::info!("Finished in {}", elapsed(started));
    ExitCode::SUCCESS
}

/// Discover, load and bin the archive under `folder`, logging batch counts.
/// `None` means a fatal error has been logged.
fn locate_corpus(
    config: &Config,
    sites: &LaunchSiteIndex,
    folder: &Path,
) -> Option<Vec<LocatedFlight>> {
    let files = match discover_summary_files(folder) {
        Ok(f) => f,
        Err(e) => {
            log::error!("Need a folder to work on: {}", e);
            return None;
        }
    };
    log::info!("Working on {} files.", files.len());

    let (summaries, load_report) = load_summaries(&files);
    if load_report.rejected_total() > 0 {
        let reasons: Vec<String> = load_report
            .rejected
            .iter()
            .map(|(reason, count)| format!("{}: {}", reason, count))
            .collect();
        log::info!(
            "Rejected {}/{} files ({})",
            load_report.rejected_total(),
            load_report.files,
            reasons.join(", ")
        );
    }

    let (located, report) = match locate_flights(summaries, sites, &config.binning_params()) {
        Ok(r) => r,
        Err(e) => {
            log::error!("{}", e);
            return None;
        }
    };

    log::info!("Sonde Summary processing complete!");
    log::info!(
        "Sondes that could not be binned: {}/{}",
        report.unbinned,
        load_report.files
    );
    log::info!(
        "{}/{} located sondes already had a launch site",
        report.previously_sited,
        report.located
    );
    Some(located)
}

fn elapsed(started: Instant) -> humantime::FormattedDuration {
    humantime::format_duration(Duration::from_secs(started.elapsed().as_secs()))
}
