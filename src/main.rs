use anyhow::Result;
use clap::Parser;
use dio_sync::cli::{Cli, Command};
use dio_sync::config::Credentials;
use dio_sync::fetch::{BrowserSource, HttpSource};
use dio_sync::pipeline::{run_fetch, run_update};
use dio_sync::store::FileStore;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let store = FileStore::new(cli.config.clone(), cli.data.clone());

    match cli.command {
        Command::Fetch { login } => fetch(&store, login).await?,
        Command::Update => run_update(&store, &cli.resume)?,
        Command::Sync { login } => {
            fetch(&store, login).await?;
            run_update(&store, &cli.resume)?;
        }
    }

    Ok(())
}

async fn fetch(store: &FileStore, login: bool) -> Result<()> {
    if login {
        let credentials = Credentials::from_env()?;
        run_fetch(&BrowserSource::new(credentials), store).await
    } else {
        run_fetch(&HttpSource::new()?, store).await
    }
}
