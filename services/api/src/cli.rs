use crate::demo::{run_demo, run_queue, DemoArgs, QueueArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use teranga_admin::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Teranga Admin",
    about = "Run the Teranga back-office service or explore its moderation workflow from the command line",
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
    /// Print the validation queue of the demo catalog
    Queue(QueueArgs),
    /// Walk through submission, review, auto-publish and trash on demo data
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
        Command::Queue(args) => run_queue(args),
        Command::Demo(args) => run_demo(args),
    }
}
