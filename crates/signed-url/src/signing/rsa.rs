use anyhow::{Context, Result};
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha1::Sha1;

use super::signer::PolicySigner;

/// RSA PKCS#1 v1.5 signer with SHA-1 digest, the scheme CloudFront
/// expects for canned policies.
///
/// The key is only ever used for signing.
pub struct RsaSha1Signer {
    signing_key: SigningKey<Sha1>,
}

impl RsaSha1Signer {
    pub fn new(private_key: RsaPrivateKey) -> Self {
        Self {
            signing_key: SigningKey::<Sha1>::new(private_key),
        }
    }
}

impl PolicySigner for RsaSha1Signer {
    fn sign(&self, policy: &[u8]) -> Result<Vec<u8>> {
        let signature = self
            .signing_key
            .try_sign(policy)
            .context("RSA/SHA-1 signing")?;
        Ok(signature.to_vec())
    }

    fn algorithm(&self) -> &str {
        "rsa-pkcs1v15-sha1"
    }
}
