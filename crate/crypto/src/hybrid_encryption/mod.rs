use base64::{Engine, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::{
    crypto::{rsa::OaepHash, symmetric::symmetric_ciphers::SymCipher},
    error::{CryptoError, result::CryptoResult},
};

pub mod rsa_oaep_aes_cbc;
pub mod rsa_oaep_aes_ctr;

/// The algorithm choices of an envelope. Both sides of an exchange must agree
/// on them; nothing in the bundle records them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeParameters {
    /// Hash used by OAEP to wrap the per message key.
    pub oaep_hash: OaepHash,
    /// Strength of the per message AES key.
    pub sym_cipher: SymCipher,
}

/// The two halves of an envelope: the OAEP wrapped per message key and the
/// `IV || ciphertext` blob it protects.
///
/// Each is useless without the other. No framing is defined between them;
/// whoever stores or sends them side by side decides how.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvelopeBundle {
    pub wrapped_key: Vec<u8>,
    pub blob: Vec<u8>,
}

impl EnvelopeBundle {
    /// The wrapped key in standard base64, for text transport.
    #[must_use]
    pub fn wrapped_key_base64(&self) -> String {
        encode_wrapped_key(&self.wrapped_key)
    }

    /// Rebuild a bundle from a base64 wrapped key and a raw blob.
    ///
    /// Invalid base64 is reported as [`CryptoError::DecryptionFailed`], the
    /// same as a wrapped key that fails to unwrap.
    pub fn from_base64(wrapped_key_b64: &str, blob: Vec<u8>) -> CryptoResult<Self> {
        Ok(Self {
            wrapped_key: decode_wrapped_key(wrapped_key_b64)?,
            blob,
        })
    }
}

/// Encode a wrapped key as standard base64.
#[must_use]
pub fn encode_wrapped_key(wrapped_key: &[u8]) -> String {
    general_purpose::STANDARD.encode(wrapped_key)
}

/// Decode a base64 wrapped key, ignoring surrounding whitespace.
///
/// Invalid base64 is a [`CryptoError::DecryptionFailed`].
pub fn decode_wrapped_key(wrapped_key_b64: &str) -> CryptoResult<Vec<u8>> {
    general_purpose::STANDARD
        .decode(wrapped_key_b64.trim())
        .map_err(|_e| CryptoError::DecryptionFailed)
}

impl std::fmt::Debug for EnvelopeBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeBundle")
            .field("wrapped_key_len", &self.wrapped_key.len())
            .field("blob_len", &self.blob.len())
            .finish()
    }
}
