//! Debugbar CLI - the web framework debug toolbar in your terminal
//!
//! Usage:
//!   debugbar watch <REQUEST_ID>   Interactive toolbar for a request
//!   debugbar feed <REQUEST_ID>    Print the live request list
//!   debugbar open [REQUEST_ID]    Open a toolbar page in the browser
//!   debugbar prefs show|reset     Inspect or clear stored preferences
//!   debugbar init                 Write a starter config file

mod commands;
mod config;
mod prefs;
mod sse;
mod toolbar;
mod tui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use commands::feed::FeedFormat;
use commands::ToolbarOptions;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "debugbar")]
#[command(author = "Debugbar Team")]
#[command(version)]
#[command(about = "The web framework debug toolbar in your terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct PageArgs {
    /// Id of the request whose toolbar to show
    request_id: String,

    /// Toolbar root URL
    #[arg(long, env = "DEBUGBAR_ROOT")]
    root: Option<String>,

    /// Lay out only these panels, in this order
    #[arg(short, long = "panel", value_delimiter = ',')]
    panels: Vec<String>,

    /// Panels disabled on this page
    #[arg(long, value_delimiter = ',')]
    disable: Vec<String>,

    /// Log sticky panel decisions
    #[arg(long)]
    debug_sticky: bool,

    /// Behave as if the page had no server push support
    #[arg(long)]
    no_push: bool,

    /// Neither read nor write stored preferences
    #[arg(long)]
    ephemeral: bool,
}

impl From<PageArgs> for ToolbarOptions {
    fn from(args: PageArgs) -> Self {
        Self {
            root: args.root,
            request_id: args.request_id,
            panels: args.panels,
            disable: args.disable,
            debug_sticky: args.debug_sticky,
            no_push: args.no_push,
            ephemeral: args.ephemeral,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive toolbar for a request
    Watch {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Print the live request list
    Feed {
        #[command(flatten)]
        page: PageArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: FeedFormat,
    },

    /// Open a toolbar page in the browser
    Open {
        /// Request id (opens the toolbar root when omitted)
        request_id: Option<String>,

        /// Toolbar root URL
        #[arg(long, env = "DEBUGBAR_ROOT")]
        root: Option<String>,
    },

    /// Inspect or clear stored toolbar preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },

    /// Write a starter config file
    Init {
        /// Toolbar root URL
        #[arg(long)]
        root: Option<String>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum PrefsAction {
    /// List stored cookies
    Show,

    /// Clear all stored preferences
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Install the tracing subscriber; the TUI logs to a file so it keeps the screen
fn init_logging(verbose: bool, log_file: Option<PathBuf>) -> Result<()> {
    let log_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{},debugbar_cli=info", log_level).into());

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(&path).context("Failed to create log file")?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(std::sync::Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().without_time())
                .init();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Ensure config directories exist
    config::ensure_dirs()?;

    let log_file = match &cli.command {
        Commands::Watch { .. } => Some(config::logs_dir().join("watch.log")),
        _ => None,
    };
    init_logging(cli.verbose, log_file)?;

    // Handle commands
    match cli.command {
        Commands::Watch { page } => {
            commands::watch::run(page.into()).await?;
        }

        Commands::Feed { page, format } => {
            commands::feed::run(page.into(), format).await?;
        }

        Commands::Open { request_id, root } => {
            let opts = ToolbarOptions {
                root,
                request_id: request_id.unwrap_or_default(),
                ..Default::default()
            };
            commands::open::run(opts).await?;
        }

        Commands::Prefs { action } => match action {
            PrefsAction::Show => commands::prefs::show().await?,
            PrefsAction::Reset { yes } => commands::prefs::reset(yes).await?,
        },

        Commands::Init { root, force } => {
            commands::init::run(root, force).await?;
        }
    }

    Ok(())
}
