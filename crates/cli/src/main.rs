use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use cloudfront_signed_url::{
    BlobInfo, Configuration, ProviderSettings, SignedUrlIssuer, SignedUrlProvider, Value, logging,
};

/// Print a signed CloudFront URL for a stored binary.
#[derive(Parser)]
struct Args {
    #[clap(long)]
    content_identity: String,
    /// Binary length in bytes, compared against --min-size.
    #[clap(long)]
    length: Option<u64>,
    /// Sign regardless of length.
    #[clap(long)]
    force: bool,
    #[clap(flatten)]
    settings: ProviderSettings,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging()?;

    println!("{}", signed_url(args, Utc::now())?);
    Ok(())
}

/// The signed URL for `args`, or an error when the size gate declines.
fn signed_url(args: Args, now: DateTime<Utc>) -> Result<String> {
    let config = Configuration::from_settings(&args.settings).context("loading configuration")?;

    if args.force {
        return SignedUrlIssuer::from_config(&config)
            .issue(&args.content_identity, now)
            .context("signing URL");
    }

    let minimum = config.minimum_size_bytes();
    let provider = SignedUrlProvider::new(config);
    let blob = BlobInfo {
        length: args.length,
        content_identity: Some(args.content_identity),
    };
    match provider.resolve(&Value::Binary(&blob), now).context("signing URL")? {
        Some(uri) => Ok(uri.to_string()),
        None => bail!("no redirect: length {:?} does not exceed {minimum} bytes", args.length),
    }
}
