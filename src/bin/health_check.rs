use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use lookout::{
    config::diagnostic_instances, load_config, resolve_config, HealthCache, HealthReport, HttpProbe,
    LookoutConfig,
};

const TEST_INSTANCES: &[&str] = &[
    "xcancel.com",
    "nitter.poast.org",
    "nitter.privacydev.net",
    "nitter.net",
    "nitter.catsarch.com",
];

#[derive(Parser)]
#[command(name = "health_check")]
#[command(about = "Probe mirrors and print them fastest first", long_about = None)]
struct Cli {
    /// Mirrors to check; defaults to the config file's list, else a fixed test list
    instances: Vec<String>,

    /// JSON config file for mirrors and probe settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Probe at most this many instances (default: all of them)
    #[arg(short, long)]
    max: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => load_config(path)?,
        None => LookoutConfig::default(),
    };
    let config = resolve_config(base)?;
    let from_file = cli.config.is_some().then_some(&config);
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(config.log_level))
        .init();

    let instances = diagnostic_instances(&cli.instances, from_file, TEST_INSTANCES)?;
    let max = cli.max.unwrap_or(instances.len());

    let probe = HttpProbe::new(&config.probe);
    let cache = HealthCache::new(config.cache_ttl);
    let healthy = cache.get_or_refresh(&probe, &instances, max).await;
    let report = HealthReport::new(max.min(instances.len()), healthy);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.has_healthy() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_report(report: &HealthReport) {
    println!("{}", "=".repeat(60));
    println!(
        "Final results: {} healthy of {} probed",
        report.healthy.len(),
        report.probed
    );

    if report.has_healthy() {
        println!("\nRecommended priority order:");
        for (index, outcome) in report.healthy.outcomes().iter().enumerate() {
            println!("   {}. {} ({}ms)", index + 1, outcome.instance, outcome.latency_ms);
        }
    } else {
        println!("\nNo instances are currently available");
    }
}
