use crate::demo::{run_demo, run_resync, run_scan, DemoArgs, ResyncArgs, ScanArgs};
use crate::server;
use certwatch::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Certification Alert Service",
    about = "Track certification expirations and notify client companies",
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
    /// Run one alert scan from the command line
    Scan(ScanArgs),
    /// Mark every currently at-risk certification as already alerted,
    /// without sending e-mail
    Resync(ResyncArgs),
    /// Run an end-to-end CLI demo over a seeded roster
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
    /// Seed the in-memory store with a demo roster
    #[arg(long)]
    pub(crate) demo_data: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Scan(args) => run_scan(args),
        Command::Resync(args) => run_resync(args),
        Command::Demo(args) => run_demo(args),
    }
}
