use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, error, info, trace};
use url::Url;

use crate::config::{Configuration, ProviderSettings};
use crate::error::{Result, SignedUrlError};
use crate::issuer::SignedUrlIssuer;

/// Binary metadata exposed by the storage layer.
pub trait Blob {
    /// Length in bytes, `None` when the backend cannot tell.
    fn length(&self) -> Option<u64>;

    /// Stable backend identity, `None` when the backend has none.
    fn content_identity(&self) -> Option<String>;
}

/// Plain binary metadata, e.g. taken from a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobInfo {
    pub length: Option<u64>,
    pub content_identity: Option<String>,
}

impl Blob for BlobInfo {
    fn length(&self) -> Option<u64> {
        self.length
    }

    fn content_identity(&self) -> Option<String> {
        self.content_identity.clone()
    }
}

/// A value offered for conversion.
pub enum Value<'a> {
    Binary(&'a dyn Blob),
    Other,
}

/// Converts binary values to signed CloudFront URLs.
///
/// The configuration is swapped as a whole; a conversion always signs with
/// one consistent snapshot.
#[derive(Default)]
pub struct SignedUrlProvider {
    config: RwLock<Option<Arc<Configuration>>>,
}

impl SignedUrlProvider {
    pub fn new(config: Configuration) -> Self {
        Self {
            config: RwLock::new(Some(Arc::new(config))),
        }
    }

    pub fn activate(settings: &ProviderSettings) -> Result<Self> {
        let config = Configuration::from_settings(settings)?;
        info!(cloud_front_url = %config.base_url(), "Signed URL provider activated");
        Ok(Self::new(config))
    }

    /// Replace the configuration. On error the previous configuration stays in force.
    pub fn reconfigure(&self, settings: &ProviderSettings) -> Result<()> {
        let config = Configuration::from_settings(settings)?;
        self.replace(config);
        info!(cloud_front_url = %settings.cloud_front_url, "Signed URL provider reconfigured");
        Ok(())
    }

    pub fn replace(&self, config: Configuration) {
        *self.config.write() = Some(Arc::new(config));
    }

    pub fn deactivate(&self) {
        self.config.write().take();
        info!("Signed URL provider deactivated");
    }

    pub fn close(&self) {
        self.deactivate();
    }

    pub fn is_active(&self) -> bool {
        self.config.read().is_some()
    }

    /// Snapshot of the active configuration.
    pub fn configuration(&self) -> Option<Arc<Configuration>> {
        self.config.read().clone()
    }

    /// Convert `value` to a signed URI, or `None` to use the default
    /// retrieval path. Never fails; errors are logged and degrade to `None`.
    pub fn to_uri(&self, value: &Value<'_>) -> Option<Url> {
        self.to_uri_at(value, Utc::now())
    }

    pub fn to_uri_at(&self, value: &Value<'_>, now: DateTime<Utc>) -> Option<Url> {
        let candidate = match self.candidate(value) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return None,
            Err(SignedUrlError::NotActive) => {
                debug!("Signed URL provider is not active, not redirecting");
                return None;
            }
            Err(e) => {
                error!(error = %e, "Unable to get content identity");
                return None;
            }
        };

        match candidate.sign(now) {
            Ok(uri) => {
                info!(content_identity = %candidate.content_identity, %uri, "Generated URI");
                Some(uri)
            }
            Err(e) => {
                error!(content_identity = %candidate.content_identity, error = %e, "Unable to sign content identity");
                None
            }
        }
    }

    /// Gating decision and signing without logging of failures.
    pub fn resolve(&self, value: &Value<'_>, now: DateTime<Utc>) -> Result<Option<Url>> {
        self.candidate(value)?
            .map(|candidate| candidate.sign(now))
            .transpose()
    }

    /// Apply the gate, reading the content identity at most once.
    fn candidate(&self, value: &Value<'_>) -> Result<Option<Candidate>> {
        let Value::Binary(blob) = value else {
            trace!("value carries no binary");
            return Ok(None);
        };
        let config = self.configuration().ok_or(SignedUrlError::NotActive)?;

        let Some(length) = blob.length() else {
            trace!("binary length unknown");
            return Ok(None);
        };
        if length <= config.minimum_size_bytes() {
            trace!(length, minimum = config.minimum_size_bytes(), "binary below redirect threshold");
            return Ok(None);
        }
        let Some(content_identity) = blob.content_identity() else {
            trace!("binary has no content identity");
            return Ok(None);
        };

        Ok(Some(Candidate { config, content_identity }))
    }
}

/// A binary that passed the gate, with the configuration snapshot it is
/// signed under.
struct Candidate {
    config: Arc<Configuration>,
    content_identity: String,
}

impl Candidate {
    fn sign(&self, now: DateTime<Utc>) -> Result<Url> {
        let signed = SignedUrlIssuer::from_config(&self.config).issue(&self.content_identity, now)?;
        Ok(Url::parse(&signed)?)
    }
}
