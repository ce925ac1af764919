use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    bookflow::logging::init().context("init logging")?;

    let cli = bookflow::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        bookflow::cli::Command::Run(args) => {
            let config = bookflow::config::Config::from_env().context("load config")?;
            bookflow::pipeline::run(args, &config).await.context("run")?;
        }
        bookflow::cli::Command::Fetch(args) => {
            let config = bookflow::config::Config::from_env().context("load config")?;
            bookflow::fetch::run(args, &config).await.context("fetch")?;
        }
        bookflow::cli::Command::Transform(args) => {
            bookflow::transform::run(args).context("transform")?;
        }
        bookflow::cli::Command::Load(args) => {
            bookflow::load::run(args).context("load")?;
        }
        bookflow::cli::Command::Audit(args) => {
            bookflow::audit::run(&args).context("audit")?;
        }
    }

    Ok(())
}
