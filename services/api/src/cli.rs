use crate::demo::{run_demo, run_rank, DemoArgs, RankArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tailor_market::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Tailor Marketplace Directory",
    about = "Serve, rank, and demonstrate the tailor marketplace directory from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank a JSON export of tailor documents and print the listing
    Rank(RankArgs),
    /// Seed sample tailors, submit reviews, and print the listing before and after
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON array of tailor documents to preload into the in-memory store
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
    /// Preload the built-in sample tailors when no seed file is given
    #[arg(long)]
    pub(crate) sample_data: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rank(args) => run_rank(args),
        Command::Demo(args) => run_demo(args),
    }
}
