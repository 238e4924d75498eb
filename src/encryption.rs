//! Cookie payload encryption
//!
//! The bucket service expects the API key inside a cookie header, encrypted
//! with AES-256-CBC under a shared key and a fixed 16-byte IV, then base64
//! encoded. The IV is deliberately not randomized: the service decrypts with
//! the same fixed IV, so output must be deterministic for a given key pair.

use crate::{Error, Result};
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const KEY_SIZE: usize = 32;
const IV_SIZE: usize = 16;

/// Symmetric encoder/decoder for the `x-api-key` cookie payload
#[derive(Clone)]
pub struct PayloadEncryptor {
    key: [u8; KEY_SIZE],
    iv: [u8; IV_SIZE],
}

impl PayloadEncryptor {
    /// Create an encryptor from a secret key and a 16-byte IV.
    ///
    /// The key is normalized to 32 bytes (truncated or zero-padded), matching
    /// how the service side derives its AES-256 key from the shared secret.
    pub fn new(key: &str, iv: &str) -> Result<Self> {
        if key.is_empty() || iv.is_empty() {
            return Err(Error::Config(
                "cookie secret key and IV must both be set".to_string(),
            ));
        }
        if iv.len() != IV_SIZE {
            return Err(Error::Config(format!(
                "cookie IV must be exactly {} bytes, got {}",
                IV_SIZE,
                iv.len()
            )));
        }

        let mut key_bytes = [0u8; KEY_SIZE];
        let len = key.len().min(KEY_SIZE);
        key_bytes[..len].copy_from_slice(&key.as_bytes()[..len]);

        let mut iv_bytes = [0u8; IV_SIZE];
        iv_bytes.copy_from_slice(iv.as_bytes());

        Ok(Self {
            key: key_bytes,
            iv: iv_bytes,
        })
    }

    /// Create from `DUI_BUCKET_COOKIE_SECRET_KEY` / `DUI_BUCKET_COOKIE_IV_SECRET`
    pub fn from_env() -> Result<Self> {
        let key = std::env::var("DUI_BUCKET_COOKIE_SECRET_KEY").unwrap_or_default();
        let iv = std::env::var("DUI_BUCKET_COOKIE_IV_SECRET").unwrap_or_default();
        if key.is_empty() || iv.is_empty() {
            return Err(Error::Config(
                "DUI_BUCKET_COOKIE_SECRET_KEY and DUI_BUCKET_COOKIE_IV_SECRET must be set"
                    .to_string(),
            ));
        }
        Self::new(&key, &iv)
    }

    /// Encrypt a plaintext string to base64 ciphertext
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        Ok(BASE64.encode(ciphertext))
    }

    /// Decrypt base64 ciphertext back to the plaintext string
    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let ciphertext = BASE64
            .decode(encoded)
            .map_err(|e| Error::Crypto(format!("invalid base64: {e}")))?;

        let plaintext = Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| Error::Crypto("decryption failed".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| Error::Crypto("decrypted payload is not valid UTF-8".to_string()))
    }
}

impl std::fmt::Debug for PayloadEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // key material stays out of logs
        f.debug_struct("PayloadEncryptor").finish_non_exhaustive()
    }
}
