use crate::demo::{run_catalog_validate, run_demo, run_match, CatalogValidateArgs, DemoArgs, MatchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use ib_match::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "IB Programme Matcher",
    about = "Match IB Diploma candidates against university programme requirements",
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
    /// Rank catalog programmes for a candidate profile stored as JSON
    Match(MatchArgs),
    /// Inspect programme catalog exports
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Walk through sample candidates against the bundled catalog
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Ingest a catalog export and list every rejected programme
    Validate(CatalogValidateArgs),
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
        Command::Match(args) => run_match(args),
        Command::Catalog {
            command: CatalogCommand::Validate(args),
        } => run_catalog_validate(args),
        Command::Demo(args) => run_demo(args),
    }
}
