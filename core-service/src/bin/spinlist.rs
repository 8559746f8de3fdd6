use std::process::ExitCode;

use anyhow::{Context, Result};
use bridge_traits::LogLevel;
use clap::Parser;
use core_runtime::config::CoreConfigBuilder;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::{BoundaryResponse, ImportRequest, ImportResponse, ImportService};
use tracing::error;

fn parse_log_format(s: &str) -> Result<LogFormat> {
    Ok(s.parse()?)
}

/// Import a Discogs collection, wantlist or list into a Spotify playlist.
///
/// Credentials are read from SPINLIST_SPOTIFY_TOKEN and, for private
/// catalog resources, SPINLIST_DISCOGS_TOKEN.
#[derive(Parser, Debug)]
#[command(name = "spinlist", version)]
struct CliArgs {
    /// Discogs URL, e.g. https://www.discogs.com/user/<name>/collection
    pub url: String,

    /// Playlist name (defaults to one derived from the URL)
    #[arg(long)]
    pub name: Option<String>,

    /// Playlist description
    #[arg(long)]
    pub description: Option<String>,

    /// pretty, json or compact
    #[arg(long, value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,

    /// Print pipeline progress to stderr as JSON lines
    #[arg(long)]
    pub progress: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

#[core_async::main]
async fn main() -> ExitCode {
    let cli_args = CliArgs::parse();

    match run(cli_args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("spinlist: {:#}", err);
            ExitCode::from(2)
        }
    }
}

async fn run(cli_args: CliArgs) -> Result<ExitCode> {
    let level = if cli_args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let mut logging = LoggingConfig::default().with_level(level);
    if let Some(format) = cli_args.log_format {
        logging = logging.with_format(format);
    }
    init_logging(logging).context("initializing logging")?;

    let config = CoreConfigBuilder::from_env()
        .build()
        .context("loading configuration")?;
    let service = ImportService::from_config(&config)?;

    let progress = cli_args.progress.then(|| {
        let mut events = service.subscribe();
        core_async::spawn(async move {
            while let Ok(event) = events.recv().await {
                match serde_json::to_string(&event) {
                    Ok(line) => eprintln!("{}", line),
                    Err(_) => eprintln!("{}", event.description()),
                }
                if event.is_terminal() {
                    break;
                }
            }
        })
    });

    let mut request = ImportRequest::new(cli_args.url);
    if let Some(name) = cli_args.name {
        request = request.with_name(name);
    }
    if let Some(description) = cli_args.description {
        request = request.with_description(description);
    }

    let outcome = service.import(&request).await;

    if let Some(handle) = progress {
        let _ = handle.await;
    }

    match outcome {
        Ok(result) => {
            let body = serde_json::to_string_pretty(&ImportResponse::from(&result))?;
            println!("{}", body);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(kind = %err.kind(), error = %err, "Import failed");
            let response = BoundaryResponse::from_error(&err);
            eprintln!("{}", serde_json::to_string_pretty(&response)?);
            Ok(ExitCode::FAILURE)
        }
    }
}
