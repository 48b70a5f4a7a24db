use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, SignedUrlError};
use crate::signing::{PolicySigner, RsaSha1Signer, parse_private_key};

pub const DEFAULT_TTL_SECONDS: i64 = 60;
pub const DEFAULT_MIN_SIZE_KB: i64 = 100;

fn default_ttl() -> i64 {
    DEFAULT_TTL_SECONDS
}

fn default_min_size() -> i64 {
    DEFAULT_MIN_SIZE_KB
}

/// Options supplied by the host, either as a JSON property bag or on the
/// command line.
#[derive(Debug, Clone, Deserialize, clap::Args)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    /// The CloudFront URL including a trailing slash, normally `https://<domain>/`.
    #[clap(long, env = "SIGNED_URL_CLOUD_FRONT_URL")]
    #[serde(default)]
    pub cloud_front_url: String,

    /// Seconds each signed URL stays valid.
    #[clap(long, env = "SIGNED_URL_TTL", default_value_t = DEFAULT_TTL_SECONDS, allow_negative_numbers = true)]
    #[serde(default = "default_ttl")]
    pub ttl: i64,

    /// Minimum binary size, in KiB, above which a redirect is issued.
    #[clap(long, env = "SIGNED_URL_MIN_SIZE", default_value_t = DEFAULT_MIN_SIZE_KB, allow_negative_numbers = true)]
    #[serde(default = "default_min_size")]
    pub min_size: i64,

    /// Path to the PKCS#8 PEM private key.
    #[clap(long, env = "SIGNED_URL_PRIVATE_KEY_FILE")]
    #[serde(default)]
    pub private_key_file: PathBuf,

    /// Key pair id assigned by CloudFront to the matching public key.
    #[clap(long, env = "SIGNED_URL_KEY_PAIR_ID")]
    #[serde(default)]
    pub key_pair_id: String,
}

impl ProviderSettings {
    pub fn from_json(properties: &serde_json::Value) -> Result<Self> {
        Self::deserialize(properties)
            .map_err(|e| SignedUrlError::Configuration(format!("invalid provider properties: {e}")))
    }
}

/// Immutable signing configuration held for an activation's lifetime.
pub struct Configuration {
    base_url: String,
    ttl_seconds: u64,
    minimum_size_bytes: u64,
    key_pair_id: String,
    signer: Arc<dyn PolicySigner>,
}

impl Configuration {
    /// Build from host settings, reading the key file once.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        debug!(cloud_front_url = %settings.cloud_front_url, "Property cloudFrontUrl");
        debug!(ttl = settings.ttl, "Property ttl");
        debug!(private_key_file = %settings.private_key_file.display(), "Property privateKeyFile");
        debug!(key_pair_id = %settings.key_pair_id, "Property keyPairId");
        debug!(min_size = settings.min_size, "Property minSize");

        if settings.private_key_file.as_os_str().is_empty() {
            return Err(SignedUrlError::Configuration("privateKeyFile is required".into()));
        }
        let pem = read_key_file(&settings.private_key_file)?;

        Self::new(
            &settings.cloud_front_url,
            settings.ttl,
            settings.min_size,
            &pem,
            &settings.key_pair_id,
        )
    }

    /// Build directly from PEM text, without touching the filesystem.
    pub fn new(
        base_url: &str,
        ttl_seconds: i64,
        min_size_kb: i64,
        private_key_pem: &str,
        key_pair_id: &str,
    ) -> Result<Self> {
        let ttl_seconds = non_negative("ttl", ttl_seconds)?;
        let minimum_size_bytes = non_negative("minSize", min_size_kb)?
            .checked_mul(1024)
            .ok_or_else(|| SignedUrlError::Configuration("minSize overflows when converted to bytes".into()))?;
        let private_key = parse_private_key(private_key_pem)?;

        Self::with_signer(
            base_url,
            ttl_seconds,
            minimum_size_bytes,
            key_pair_id,
            Arc::new(RsaSha1Signer::new(private_key)),
        )
    }

    /// Build around an already constructed signer.
    pub fn with_signer(
        base_url: &str,
        ttl_seconds: u64,
        minimum_size_bytes: u64,
        key_pair_id: &str,
        signer: Arc<dyn PolicySigner>,
    ) -> Result<Self> {
        let base_url = canonical_base_url(base_url)?;
        if key_pair_id.trim().is_empty() {
            return Err(SignedUrlError::Configuration("keyPairId is required".into()));
        }
        if !key_pair_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SignedUrlError::Configuration(format!(
                "keyPairId {key_pair_id:?} must be alphanumeric"
            )));
        }
        i64::try_from(ttl_seconds)
            .map_err(|_| SignedUrlError::Configuration(format!("ttl {ttl_seconds} is out of range")))?;

        Ok(Self {
            base_url,
            ttl_seconds,
            minimum_size_bytes,
            key_pair_id: key_pair_id.to_string(),
            signer,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn minimum_size_bytes(&self) -> u64 {
        self.minimum_size_bytes
    }

    pub fn key_pair_id(&self) -> &str {
        &self.key_pair_id
    }

    pub fn signer(&self) -> &dyn PolicySigner {
        self.signer.as_ref()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("base_url", &self.base_url)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("minimum_size_bytes", &self.minimum_size_bytes)
            .field("key_pair_id", &self.key_pair_id)
            .field("algorithm", &self.signer.algorithm())
            .finish()
    }
}

fn read_key_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| SignedUrlError::KeyFile {
        path: path.to_path_buf(),
        source,
    })
}

fn non_negative(name: &str, value: i64) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| SignedUrlError::Configuration(format!("{name} must not be negative, got {value}")))
}

/// Parse the base URL and return its normalized form, which is the exact
/// prefix of every signed resource.
fn canonical_base_url(base_url: &str) -> Result<String> {
    if base_url.trim().is_empty() {
        return Err(SignedUrlError::Configuration("cloudFrontUrl is required".into()));
    }
    let url = Url::parse(base_url)
        .map_err(|e| SignedUrlError::Configuration(format!("cloudFrontUrl {base_url:?} is not a valid URL: {e}")))?;
    if url.cannot_be_a_base() || url.query().is_some() || url.fragment().is_some() {
        return Err(SignedUrlError::Configuration(format!(
            "cloudFrontUrl {base_url:?} must be a hierarchical URL without query or fragment"
        )));
    }
    if !url.path().ends_with('/') {
        warn!(cloud_front_url = %url, "cloudFrontUrl has no trailing slash, storage keys will be appended directly");
    }
    Ok(url.as_str().to_string())
}
