mod commands;
mod event_args;

use std::path::PathBuf;

use anyhow::Result;
use cal_invite_core::config::CalInviteConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use event_args::EventArgs;

/// Env var holding the log filter, e.g. `CAL_INVITE_LOG=cal_invite_core=trace`
const LOG_ENV: &str = "CAL_INVITE_LOG";

#[derive(Parser)]
#[command(name = "cal-invite")]
#[command(about = "Generate add-to-calendar links and .ics invitations")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the calendar URL(s) or ICS text for an event
    Generate {
        /// google, outlook, office365, yahoo, ical or ics
        provider: String,

        #[command(flatten)]
        event: EventArgs,
    },
    /// Write the event as an .ics file
    Download {
        #[command(flatten)]
        event: EventArgs,

        /// Directory to write into (defaults to the current directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// List supported providers
    Providers,
    /// Show config path and effective settings
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate { provider, event } => {
            let config = CalInviteConfig::load()?;
            commands::generate::run(&provider, event, &config)
        }
        Commands::Download { event, out_dir } => {
            let config = CalInviteConfig::load()?;
            commands::download::run(event, out_dir, &config)
        }
        Commands::Providers => commands::providers::run(),
        Commands::Config => commands::config::run(),
    }
}

/// Logs go to stderr so stdout only ever carries the generated output.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
