use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bouncer::audit;
use bouncer::config::Config;
use bouncer::report::{self, ReportFormat};

#[derive(Parser)]
#[command(name = "bouncer")]
#[command(about = "List wiki roster characters with no recent login on the MUSH")]
struct Cli {
    /// Configuration file (default: ~/.bouncer.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the wiki, finger the roster, and print who needs review
    Run {
        #[arg(short, long, value_enum, default_value_t)]
        format: ReportFormat,
    },
    /// Crawl the wiki and print the roster without connecting to the MUSH
    Roster {
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Plain)]
        format: ReportFormat,
    },
    /// Validate the configuration file
    Check,
}

/// Logs go to stderr; stdout carries only the report.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "bouncer=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) => path,
        None => Config::default_path()?,
    };
    tracing::debug!(path = %path.display(), "Loading configuration");
    Ok(Config::load(&path)?)
}

fn emit(report: String) {
    if report.ends_with('\n') {
        print!("{report}");
    } else {
        println!("{report}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(cli.config)?;

    match cli.command {
        Some(Commands::Run { format }) => {
            let remaining = audit::audit(&config).await?;
            emit(report::render(&remaining, format)?);
        }
        Some(Commands::Roster { format }) => {
            let roster = audit::crawl(&config).await?;
            emit(report::render(&roster, format)?);
        }
        Some(Commands::Check) => {
            println!("Configuration OK");
            println!("  MUSH:  {} (as {})", config.server.address(), config.server.login);
            println!("  Index: {}", config.wiki.index_url());
            println!(
                "  Timing: settle {:?}, pacing {:?}, poll {:?}, {} pages per batch",
                config.timing.settle_delay,
                config.timing.query_pacing,
                config.timing.read_poll,
                config.timing.fetch_concurrency
            );
        }
        None => {
            let remaining = audit::audit(&config).await?;
            emit(report::render(&remaining, ReportFormat::default())?);
        }
    }

    Ok(())
}
