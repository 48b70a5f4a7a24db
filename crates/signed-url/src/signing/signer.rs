/// Trait for signing a serialized CDN policy document.
///
/// Implementations are sync; signing is CPU-bound and runs on the
/// request path without I/O.
pub trait PolicySigner: Send + Sync {
    /// Sign the policy bytes. Returns raw signature bytes.
    fn sign(&self, policy: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Algorithm identifier string (e.g. "rsa-pkcs1v15-sha1").
    fn algorithm(&self) -> &str;
}
