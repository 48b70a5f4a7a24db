use chrono::{DateTime, Utc};
use url::Url;

use crate::config::Configuration;
use crate::error::{Result, SignedUrlError};
use crate::signing::{CannedPolicy, PolicySigner, to_url_safe_base64};

const PREFIX_CHARS: usize = 4;

/// Map a content identity to the key the S3 backend stores it under:
/// the 4 character prefix, a dash, then the remainder.
pub fn storage_key(content_identity: &str) -> Result<String> {
    let split = content_identity
        .char_indices()
        .map(|(index, _)| index)
        .chain(std::iter::once(content_identity.len()))
        .nth(PREFIX_CHARS)
        .ok_or_else(|| SignedUrlError::InvalidContentIdentity(content_identity.to_string()))?;

    let (prefix, rest) = content_identity.split_at(split);
    Ok(format!("{prefix}-{rest}"))
}

/// Sign `resource` with a canned policy expiring at `expires`.
///
/// The policy carries `resource.as_str()`, the same string the returned URL
/// starts with. Appends `Expires`, `Signature` and `Key-Pair-Id` in the order
/// CloudFront documents them.
pub fn sign_canned_url(
    resource: &Url,
    key_pair_id: &str,
    signer: &dyn PolicySigner,
    expires: i64,
) -> Result<String> {
    if resource.query().is_some() || resource.fragment().is_some() {
        return Err(SignedUrlError::Signing(format!(
            "resource {resource} must not carry a query or fragment"
        )));
    }
    let resource_url = resource.as_str();
    let policy = CannedPolicy::new(resource_url, expires).to_json()?;
    let signature = signer
        .sign(policy.as_bytes())
        .map_err(|e| SignedUrlError::Signing(format!("{e:#}")))?;

    Ok(format!(
        "{resource_url}?Expires={expires}&Signature={}&Key-Pair-Id={key_pair_id}",
        to_url_safe_base64(&signature)
    ))
}

/// Issues time-limited CloudFront URLs for content identities.
pub struct SignedUrlIssuer<'a> {
    base_url: &'a str,
    ttl_seconds: u64,
    key_pair_id: &'a str,
    signer: &'a dyn PolicySigner,
}

impl<'a> SignedUrlIssuer<'a> {
    pub fn new(
        base_url: &'a str,
        ttl_seconds: u64,
        key_pair_id: &'a str,
        signer: &'a dyn PolicySigner,
    ) -> Self {
        Self { base_url, ttl_seconds, key_pair_id, signer }
    }

    pub fn from_config(config: &'a Configuration) -> Self {
        Self::new(
            config.base_url(),
            config.ttl_seconds(),
            config.key_pair_id(),
            config.signer(),
        )
    }

    /// Expiry in epoch seconds for a URL issued at `now`.
    pub fn expiry(&self, now: DateTime<Utc>) -> Result<i64> {
        i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now.timestamp().checked_add(ttl))
            .ok_or_else(|| SignedUrlError::Signing(format!("expiry overflows for ttl {}", self.ttl_seconds)))
    }

    /// The unsigned, normalized resource URL for a content identity.
    pub fn resource_url(&self, content_identity: &str) -> Result<Url> {
        let resource = Url::parse(&format!("{}{}", self.base_url, storage_key(content_identity)?))?;
        if resource.query().is_some() || resource.fragment().is_some() {
            return Err(SignedUrlError::InvalidContentIdentity(content_identity.to_string()));
        }
        Ok(resource)
    }

    pub fn issue(&self, content_identity: &str, now: DateTime<Utc>) -> Result<String> {
        let expires = self.expiry(now)?;
        let resource = self.resource_url(content_identity)?;
        sign_canned_url(&resource, self.key_pair_id, self.signer, expires)
    }
}
