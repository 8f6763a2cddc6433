//! Field-level encryption at rest built on AES-256-GCM.
//!
//! Values are sealed into an [`Envelope`] of two base64 strings: the 96-bit
//! nonce (`n`) and the ciphertext with its 16-byte tag appended (`ct`).
//! Every call to [`FieldCipher::encrypt`] draws a fresh nonce from the OS
//! RNG; nothing else is remembered between calls.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::config::Settings;
use crate::error::{ConfigError, CryptoError};

/// AES-256 key size in bytes
pub const KEY_LEN: usize = 32;
/// GCM nonce size in bytes
pub const NONCE_LEN: usize = 12;
/// GCM authentication tag size in bytes
pub const TAG_LEN: usize = 16;

/// Length of a padded base64 encoding of a 32-byte key.
/// Shorter secrets are never treated as base64.
const ENCODED_KEY_LEN: usize = 44;

/// Serializable ciphertext envelope: `{"n": ..., "ct": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// base64 of the 12-byte nonce
    pub n: String,
    /// base64 of ciphertext followed by the 16-byte tag
    pub ct: String,
}

/// Derive a 256-bit key from a configured secret.
///
/// A secret of at least 44 characters that decodes as standard base64 to
/// exactly 32 bytes is used as-is. Anything else is taken as raw UTF-8,
/// zero-padded on the right and truncated to 32 bytes.
pub fn derive_key(secret: &str) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];

    if secret.len() >= ENCODED_KEY_LEN {
        if let Ok(mut decoded) = STANDARD.decode(secret) {
            let usable = decoded.len() == KEY_LEN;
            if usable {
                key.copy_from_slice(&decoded);
            }
            decoded.zeroize();
            if usable {
                tracing::debug!("encryption key decoded from base64 secret");
                return key;
            }
        }
    }

    let raw = secret.as_bytes();
    let take = raw.len().min(KEY_LEN);
    key[..take].copy_from_slice(&raw[..take]);
    key
}

/// Authenticated encryption of opaque field values.
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCipher").finish_non_exhaustive()
    }
}

impl FieldCipher {
    /// Build a cipher from raw key bytes.
    pub fn from_key(key: &[u8; KEY_LEN]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Build a cipher from a configured secret (see [`derive_key`]).
    pub fn from_secret(secret: &str) -> Self {
        let mut key = derive_key(secret);
        let cipher = Self::from_key(&key);
        key.zeroize();
        cipher
    }

    /// Build a cipher from `ENCRYPTION_MASTER_KEY`.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let secret = settings
            .encryption_master_key
            .as_ref()
            .ok_or(ConfigError::Missing {
                var: "ENCRYPTION_MASTER_KEY",
            })?;
        Ok(Self::from_secret(secret.expose()))
    }

    /// Encrypt `plaintext`, binding it to `aad` when given.
    pub fn encrypt(&self, plaintext: &[u8], aad: Option<&[u8]>) -> Result<Envelope, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad: aad.unwrap_or_default(),
                },
            )
            .map_err(|_| CryptoError::Encryption)?;

        Ok(Envelope {
            n: STANDARD.encode(nonce_bytes),
            ct: STANDARD.encode(sealed),
        })
    }

    /// Decrypt an envelope produced by [`FieldCipher::encrypt`].
    ///
    /// `aad` must match what was supplied at encryption time.
    pub fn decrypt(&self, envelope: &Envelope, aad: Option<&[u8]>) -> Result<Vec<u8>, CryptoError> {
        let nonce_bytes = STANDARD
            .decode(envelope.n.as_bytes())
            .map_err(|e| CryptoError::Decode {
                field: "n",
                reason: e.to_string(),
            })?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(CryptoError::NonceLength {
                expected: NONCE_LEN,
                actual: nonce_bytes.len(),
            });
        }

        let sealed = STANDARD
            .decode(envelope.ct.as_bytes())
            .map_err(|e| CryptoError::Decode {
                field: "ct",
                reason: e.to_string(),
            })?;

        self.cipher
            .decrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: &sealed,
                    aad: aad.unwrap_or_default(),
                },
            )
            .map_err(|_| CryptoError::Authentication)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> FieldCipher {
        FieldCipher::from_secret("unit-test-secret")
    }

    fn flip_byte(encoded: &str, index: usize) -> String {
        let mut bytes = STANDARD.decode(encoded).unwrap();
        bytes[index] ^= 0x01;
        STANDARD.encode(bytes)
    }

    #[test]
    fn round_trip_with_aad() {
        let c = cipher();
        let env = c.encrypt(b"+61 400 000 000", Some(b"applications:phone")).unwrap();
        let plain = c.decrypt(&env, Some(b"applications:phone")).unwrap();
        assert_eq!(plain, b"+61 400 000 000");
    }

    #[test]
    fn round_trip_without_aad_matches_empty_aad() {
        let c = cipher();
        let env = c.encrypt(b"hello", None).unwrap();
        assert_eq!(c.decrypt(&env, None).unwrap(), b"hello");
        assert_eq!(c.decrypt(&env, Some(b"")).unwrap(), b"hello");
    }

    #[test]
    fn envelope_sizes() {
        let env = cipher().encrypt(b"abc", None).unwrap();
        assert_eq!(STANDARD.decode(&env.n).unwrap().len(), NONCE_LEN);
        assert_eq!(STANDARD.decode(&env.ct).unwrap().len(), 3 + TAG_LEN);
    }

    #[test]
    fn mismatched_aad_fails_authentication() {
        let c = cipher();
        let env = c.encrypt(b"secret", Some(b"one")).unwrap();
        let err = c.decrypt(&env, Some(b"two")).unwrap_err();
        assert_eq!(err, CryptoError::Authentication);

        let err = c.decrypt(&env, None).unwrap_err();
        assert_eq!(err, CryptoError::Authentication);
    }

    #[test]
    fn flipped_ciphertext_byte_fails_authentication() {
        let c = cipher();
        let mut env = c.encrypt(b"secret", None).unwrap();
        env.ct = flip_byte(&env.ct, 0);
        assert_eq!(c.decrypt(&env, None).unwrap_err(), CryptoError::Authentication);
    }

    #[test]
    fn flipped_tag_byte_fails_authentication() {
        let c = cipher();
        let mut env = c.encrypt(b"secret", None).unwrap();
        let last = STANDARD.decode(&env.ct).unwrap().len() - 1;
        env.ct = flip_byte(&env.ct, last);
        assert_eq!(c.decrypt(&env, None).unwrap_err(), CryptoError::Authentication);
    }

    #[test]
    fn flipped_nonce_byte_fails_authentication() {
        let c = cipher();
        let mut env = c.encrypt(b"secret", None).unwrap();
        env.n = flip_byte(&env.n, 5);
        assert_eq!(c.decrypt(&env, None).unwrap_err(), CryptoError::Authentication);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let env = cipher().encrypt(b"secret", None).unwrap();
        let other = FieldCipher::from_secret("a different secret");
        assert!(other.decrypt(&env, None).unwrap_err().is_authentication());
    }

    #[test]
    fn nonces_are_fresh() {
        let c = cipher();
        let a = c.encrypt(b"same", None).unwrap();
        let b = c.encrypt(b"same", None).unwrap();
        assert_ne!(a.n, b.n);
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_base64_is_a_decode_error() {
        let c = cipher();
        let good = c.encrypt(b"x", None).unwrap();

        let bad_nonce = Envelope {
            n: "not base64!".into(),
            ct: good.ct.clone(),
        };
        assert!(matches!(
            c.decrypt(&bad_nonce, None).unwrap_err(),
            CryptoError::Decode { field: "n", .. }
        ));

        let bad_ct = Envelope {
            n: good.n.clone(),
            ct: "%%%".into(),
        };
        assert!(matches!(
            c.decrypt(&bad_ct, None).unwrap_err(),
            CryptoError::Decode { field: "ct", .. }
        ));
    }

    #[test]
    fn short_nonce_is_rejected_before_decrypting() {
        let c = cipher();
        let good = c.encrypt(b"x", None).unwrap();
        let env = Envelope {
            n: STANDARD.encode([0u8; 8]),
            ct: good.ct,
        };
        assert_eq!(
            c.decrypt(&env, None).unwrap_err(),
            CryptoError::NonceLength {
                expected: NONCE_LEN,
                actual: 8
            }
        );
    }

    #[test]
    fn derive_key_pads_short_secrets() {
        let key = derive_key("abc");
        assert_eq!(&key[..3], b"abc");
        assert!(key[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn derive_key_truncates_long_raw_secrets() {
        let secret = "x".repeat(50);
        let key = derive_key(&secret);
        assert_eq!(key, [b'x'; KEY_LEN]);
    }

    #[test]
    fn derive_key_prefers_base64() {
        let raw: Vec<u8> = (0u8..32).collect();
        let encoded = STANDARD.encode(&raw);
        assert_eq!(encoded.len(), 44);
        assert_eq!(derive_key(&encoded).to_vec(), raw);
    }

    #[test]
    fn derive_key_ignores_base64_of_wrong_length() {
        // 48 decoded bytes: valid base64 but not a 32-byte key
        let encoded = STANDARD.encode([7u8; 48]);
        let key = derive_key(&encoded);
        assert_eq!(&key[..], &encoded.as_bytes()[..KEY_LEN]);
    }

    #[test]
    fn derive_key_is_deterministic() {
        assert_eq!(derive_key("same secret"), derive_key("same secret"));
        let a = FieldCipher::from_secret("same secret");
        let b = FieldCipher::from_secret("same secret");
        let env = a.encrypt(b"portable", None).unwrap();
        assert_eq!(b.decrypt(&env, None).unwrap(), b"portable");
    }

    #[test]
    fn envelope_wire_format() {
        let env = Envelope {
            n: "AAAA".into(),
            ct: "BBBB".into(),
        };
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json, serde_json::json!({"n": "AAAA", "ct": "BBBB"}));
    }
}
