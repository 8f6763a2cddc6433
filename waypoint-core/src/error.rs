/// Structured error types for waypoint-core.
///
/// Library consumers get `thiserror` enums; the `waypoint` binary wraps them
/// in `anyhow` with context.
use thiserror::Error;

/// Settings could not be loaded from the environment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was required but not set
    #[error("Missing required setting '{var}'")]
    Missing { var: &'static str },

    /// A variable was set to something unusable
    #[error("Invalid value for '{var}': {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    /// Create an invalid-value error
    pub fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

/// Field encryption failures.
///
/// Decoding problems and authentication failures are separate variants so
/// callers can tell a malformed envelope from a tampered one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// An envelope field was not valid base64
    #[error("Envelope field '{field}' is not valid base64: {reason}")]
    Decode { field: &'static str, reason: String },

    /// The decoded nonce has the wrong size
    #[error("Envelope nonce must be {expected} bytes, got {actual}")]
    NonceLength { expected: usize, actual: usize },

    /// Tag did not verify: wrong key, wrong associated data, or tampering
    #[error("Authentication failed: ciphertext or associated data was altered")]
    Authentication,

    /// The cipher refused to encrypt (payload too large)
    #[error("Encryption failed")]
    Encryption,
}

impl CryptoError {
    /// Whether this error indicates tampering rather than a malformed envelope
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::invalid("TOKEN_TTL_SECONDS", "not a number");
        assert_eq!(
            err.to_string(),
            "Invalid value for 'TOKEN_TTL_SECONDS': not a number"
        );

        let err = ConfigError::Missing {
            var: "ENCRYPTION_MASTER_KEY",
        };
        assert!(err.to_string().contains("ENCRYPTION_MASTER_KEY"));
    }

    #[test]
    fn crypto_error_kinds() {
        assert!(CryptoError::Authentication.is_authentication());
        let decode = CryptoError::Decode {
            field: "ct",
            reason: "Invalid byte 33, offset 0.".into(),
        };
        assert!(!decode.is_authentication());
        assert!(decode.to_string().contains("'ct'"));
    }
}
