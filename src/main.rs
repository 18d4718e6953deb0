use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use thesis_manager::config::Config;
use thesis_manager::db;
use tracing::Level;

#[derive(Parser)]
#[command(version, author, about)]
struct Args {
    /// Use FILE instead of thesis-manager.toml
    #[arg(short, long, value_name = "FILE", default_value = "thesis-manager.toml")]
    config: PathBuf,
    /// Set verbosity level
    #[arg(short, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve,
    /// Create the database tables if they do not exist
    InitDb,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let level = match args.verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();
    let config = Config::load(&args.config)?;
    match args.command {
        Command::Serve => thesis_manager::start_server(config).await,
        Command::InitDb => {
            let pool = db::connect(&config.database).await?;
            db::init_schema(&pool, &config.database.url).await
        }
    }
}
