use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SignedUrlError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Failed to read private key file {}: {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Private key could not be decoded: {0}")]
    KeyFormat(String),
    #[error("Content identity {0:?} is shorter than the 4 character prefix")]
    InvalidContentIdentity(String),
    #[error("Failed to sign canned policy: {0}")]
    Signing(String),
    #[error("Signed URL is not a valid URI: {0}")]
    InvalidUri(#[from] url::ParseError),
    #[error("Signed URL provider is not active")]
    NotActive,
}

impl SignedUrlError {
    /// Errors that are fatal to activation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SignedUrlError::Configuration(_)
                | SignedUrlError::KeyFile { .. }
                | SignedUrlError::KeyFormat(_)
        )
    }
}

pub type Result<T, E = SignedUrlError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_activation_fatal() {
        assert!(SignedUrlError::Configuration("missing".into()).is_configuration());
        assert!(SignedUrlError::KeyFormat("bad der".into()).is_configuration());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = SignedUrlError::KeyFile { path: "/etc/key.pem".into(), source: io };
        assert!(error.is_configuration());
        assert!(error.to_string().contains("/etc/key.pem"));
    }

    #[test]
    fn request_errors_are_not_configuration() {
        assert!(!SignedUrlError::Signing("boom".into()).is_configuration());
        assert!(!SignedUrlError::InvalidContentIdentity("ab".into()).is_configuration());
        assert!(!SignedUrlError::NotActive.is_configuration());
    }

    #[test]
    fn short_identity_message_names_identity() {
        let error = SignedUrlError::InvalidContentIdentity("ab".into());
        assert_eq!(
            error.to_string(),
            "Content identity \"ab\" is shorter than the 4 character prefix"
        );
    }
}
