use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cloudfront_signed_url::{AppState, ProviderSettings, SignedUrlProvider, logging, run};

#[derive(Parser)]
struct Args {
    #[clap(long, default_value = "127.0.0.1")]
    host: String,
    #[clap(long, default_value = "3000")]
    port: u16,
    #[clap(flatten)]
    settings: ProviderSettings,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging()?;

    let provider = SignedUrlProvider::activate(&args.settings)
        .context("activating signed URL provider")?;

    run(args.host, args.port, AppState { provider: Arc::new(provider) }).await
}
