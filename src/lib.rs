use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

pub mod address;
pub mod balance;
pub mod cli;
pub mod history;
pub mod models;
pub mod payment;
pub mod rpc_client;
pub mod settings;
pub mod signer;
pub mod simplify;

pub async fn start_app() -> Result<()> {
    init_logger();

    let args: Args = argh::from_env();

    cli::run(args).await
}

fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_writer(std::io::stderr)
        .init();
}
