//! Running the CLI

// Allow exits because in this file we ideally handle all errors with known exit codes
#![allow(clippy::exit)]

use crate::ci::notifier::DEFAULT_API_URL;
use crate::config::Config;
use crate::db::init::default_database_url;
use crate::server::app::{serve, ServeOptions};
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{fmt, EnvFilter};

/// File name prefix of the rolling log files.
const LOG_FILE_PREFIX: &str = "hookci.log";

/// hookci builds and tests pushed branches and reports their commit statuses.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the default history database. Defaults to cwd.
    #[arg(short, long, default_value_t = String::from("."))]
    data_dir: String,
    /// Write logs to daily rolling files in this directory, in addition to stdout.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// hookci cli subcommands
    #[command(subcommand)]
    subcommands: Subcommands,
}

///
#[derive(Clone, clap::Subcommand)]
enum Subcommands {
    /// Receive push webhooks and serve the build history
    Serve {
        /// Interface to bind to.
        #[arg(long, default_value_t = String::from("127.0.0.1"))]
        host: String,
        /// Port on which to listen.
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
        /// Directory under which build workspaces are created.
        /// Defaults to `hookci` in the system temp directory.
        #[arg(short, long)]
        workspace_root: Option<PathBuf>,
        /// History database URL. Defaults to a `SQLite` file in the data directory.
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
        /// Base URL of the commit status API.
        #[arg(long, default_value_t = String::from(DEFAULT_API_URL))]
        status_api_url: String,
        /// TOML file configuring the build tool.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
///
/// The returned guard flushes the log file when dropped.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer());
    match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}

/// Main entrypoint to application
///
/// # Errors
/// Errors if the server cannot bind to the requested address.
pub fn run() -> std::io::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_deref());
    tracing::debug!("Starting application");

    match cli.subcommands {
        Subcommands::Serve {
            host,
            port,
            workspace_root,
            database_url,
            status_api_url,
            config,
        } => {
            let config = Config::load_or_default(config.as_deref()).unwrap_or_else(|err| {
                tracing::error!("Unable to load configuration: {err:#}");
                process::exit(1);
            });
            let database_url = database_url
                .unwrap_or_else(|| default_database_url(Path::new(&cli.data_dir)));
            let workspace_root =
                workspace_root.unwrap_or_else(|| env::temp_dir().join(env!("CARGO_PKG_NAME")));
            serve(ServeOptions {
                host,
                port,
                workspace_root,
                database_url,
                status_api_url,
                config,
            })
        }
    }
}
