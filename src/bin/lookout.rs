use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use lookout::{
    load_config, resolve_config, DiscordWebhook, LastSeenStore, Lookout, LookoutConfig, RunOutcome,
    Strategy,
};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "lookout")]
#[command(about = "Relay the newest post of a handle through healthy mirrors", long_about = None)]
struct Cli {
    /// Handle to watch, without the leading @
    handle: String,

    /// JSON config file; omitted fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep polling instead of exiting after one run
    #[arg(short, long)]
    watch: bool,

    /// Seconds between polls in watch mode
    #[arg(long, default_value_t = 300)]
    interval: u64,

    /// Directory for last-seen files
    #[arg(long)]
    log_dir: Option<String>,

    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LookoutConfig::default(),
    };
    if let Some(dir) = cli.log_dir.clone() {
        config.log_dir = dir;
    }
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    let config = resolve_config(config)?;

    let level = if cli.verbose { tracing::Level::DEBUG } else { config.log_level.into() };
    tracing_subscriber::fmt().with_max_level(level).init();

    let handle = cli.handle.trim_start_matches('@').to_string();
    let store = LastSeenStore::new(config.log_dir.clone());
    store.path_for(&handle)?;
    let notifier = DiscordWebhook::from_env()?;
    let monitor = Lookout::from_config(config);

    tracing::info!(handle = %handle, watch = cli.watch, "Lookout monitoring");

    if !cli.watch {
        return Ok(match monitor.run_once(&handle, &store, &notifier).await {
            Ok(outcome) => {
                report(&outcome);
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(handle = %handle, error = %e, "Run failed");
                ExitCode::FAILURE
            }
        });
    }

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    let interval = Duration::from_secs(cli.interval);
    loop {
        match monitor.run_once(&handle, &store, &notifier).await {
            Ok(outcome) => report(&outcome),
            Err(e) => tracing::error!(handle = %handle, error = %e, "Run failed, retrying next interval"),
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.cancelled() => {
                tracing::info!("Shutdown requested, exiting");
                break;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Unchanged(post) => {
            tracing::info!(url = %post.content_url, "Already delivered, nothing to do");
        }
        RunOutcome::Delivered(post) => {
            tracing::info!(
                url = %post.content_url,
                via = %post.source_instance,
                "Delivered new post"
            );
        }
    }
}
