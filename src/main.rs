use clap::Parser;
use cyber_auth::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Keygen(args) => cli::keygen::run(args).await,
        Command::InspectKey { file } => cli::inspect::run(&file).await,
        Command::Demo(args) => cli::demo::run(args).await,
    }
}
