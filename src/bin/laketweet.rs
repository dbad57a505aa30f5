use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use laketweet::{
    alerts::AlertDispatcher, config::Config, fetcher::TemperatureFetcher,
    orchestrator::Orchestrator, publish::build_targets, util::build_http_client,
};
use tracing::{debug, error, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// Publishes the current lake temperature and alerts on failure.
#[derive(Debug, Clone, Parser)]
#[command(version)]
struct Args {
    /// Read environment variables from this file instead of `./.env`
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Log at trace level
    #[arg(short, long)]
    verbose: bool,
}

fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::DEBUG
    };
    let filter = filter::Targets::new().with_targets(vec![("laketweet", level)]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let env_loaded = match &args.env_file {
        Some(path) => dotenv::from_path(path).map(|_| path.display().to_string()),
        None => dotenv::dotenv().map(|path| path.display().to_string()),
    };

    init(args.verbose);
    trace!("started with args: {args:?}");
    match env_loaded {
        Ok(path) => debug!("loaded environment from {path}"),
        Err(e) if args.env_file.is_some() => warn!("could not load env file: {e}"),
        Err(_) => trace!("no .env file found"),
    }

    let config = Config::from_env();
    let client = match build_http_client(config.timeout_secs) {
        Ok(client) => client,
        Err(e) => {
            // alerting needs the same client, so this failure can only be logged
            error!("{e}, aborting without alerts");
            return Ok(ExitCode::FAILURE);
        }
    };

    let fetcher = TemperatureFetcher::new(client.clone(), config.backend.clone());
    let orchestrator = Orchestrator::new(
        Box::new(fetcher),
        build_targets(&config, &client),
        config.template.clone(),
    );
    debug!("publishing to [{}]", orchestrator.target_names().join(", "));

    let report = orchestrator.run().await;
    if report.success {
        info!("run finished successfully");
        return Ok(ExitCode::SUCCESS);
    }

    let summary = AlertDispatcher::new(client, &config)
        .dispatch(&report)
        .await;
    debug!("alert summary: {summary:?}");
    error!("run failed at {:?}", report.failed_at);

    Ok(ExitCode::FAILURE)
}
