use crate::demo::{run_demo, run_recommend, DemoArgs, RecommendArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use client_engagement::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Client Engagement Service",
    about = "Score package recommendations and run the assessment workflow",
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
    /// Score one intake from flags, or every row of an exported CSV
    Recommend(RecommendArgs),
    /// Walk an in-memory engagement from intake form to accepted assessment
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
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Recommend(args) => run_recommend(args),
        Command::Demo(args) => run_demo(args),
    }
}
