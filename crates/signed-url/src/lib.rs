pub mod config;
pub mod error;
pub mod issuer;
pub mod logging;
pub mod provider;
pub mod server;
pub mod signing;

pub use config::{Configuration, ProviderSettings};
pub use error::SignedUrlError;
pub use issuer::{SignedUrlIssuer, sign_canned_url, storage_key};
pub use provider::{Blob, BlobInfo, SignedUrlProvider, Value};
pub use server::{AppState, router, run};
pub use signing::{PolicySigner, RsaSha1Signer, parse_private_key};
