use openssl::{rand::rand_bytes, symm::Cipher};
use serde::{Deserialize, Serialize};
use tracing::trace;
use zeroize::Zeroizing;

use crate::error::{CryptoError, result::CryptoResult};

/// AES block size in bytes, for every key length.
pub const AES_BLOCK_SIZE: usize = 16;
/// AES initialization vector length in bytes, for both CTR and CBC.
pub const AES_IV_LENGTH: usize = AES_BLOCK_SIZE;

/// AES 128 key length in bytes.
pub const AES_128_KEY_LENGTH: usize = 16;
/// AES 192 key length in bytes.
pub const AES_192_KEY_LENGTH: usize = 24;
/// AES 256 key length in bytes.
pub const AES_256_KEY_LENGTH: usize = 32;

/// The mode of operation the block cipher is driven in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCipherMode {
    /// Counter mode: a byte-granular keystream.
    Ctr,
    /// Cipher block chaining: block-aligned input only.
    Cbc,
}

/// The supported AES key strengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymCipher {
    Aes128,
    Aes192,
    #[default]
    Aes256,
}

impl SymCipher {
    /// Pick the cipher matching a raw key length.
    pub fn from_key_length(key_length: usize) -> CryptoResult<Self> {
        match key_length {
            AES_128_KEY_LENGTH => Ok(Self::Aes128),
            AES_192_KEY_LENGTH => Ok(Self::Aes192),
            AES_256_KEY_LENGTH => Ok(Self::Aes256),
            other => Err(CryptoError::InvalidKeyLength(other)),
        }
    }

    /// Get the key size in bytes.
    #[must_use]
    pub const fn key_size(&self) -> usize {
        match self {
            Self::Aes128 => AES_128_KEY_LENGTH,
            Self::Aes192 => AES_192_KEY_LENGTH,
            Self::Aes256 => AES_256_KEY_LENGTH,
        }
    }

    /// Get the IV size in bytes.
    #[must_use]
    pub const fn iv_size(&self) -> usize {
        AES_IV_LENGTH
    }

    /// Convert to the corresponding OpenSSL cipher.
    #[must_use]
    pub fn to_openssl_cipher(self, mode: BlockCipherMode) -> Cipher {
        trace!("cipher: {self:?}, mode: {mode:?}");
        match (self, mode) {
            (Self::Aes128, BlockCipherMode::Ctr) => Cipher::aes_128_ctr(),
            (Self::Aes192, BlockCipherMode::Ctr) => Cipher::aes_192_ctr(),
            (Self::Aes256, BlockCipherMode::Ctr) => Cipher::aes_256_ctr(),
            (Self::Aes128, BlockCipherMode::Cbc) => Cipher::aes_128_cbc(),
            (Self::Aes192, BlockCipherMode::Cbc) => Cipher::aes_192_cbc(),
            (Self::Aes256, BlockCipherMode::Cbc) => Cipher::aes_256_cbc(),
        }
    }
}

impl std::fmt::Display for SymCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aes128 => write!(f, "aes-128"),
            Self::Aes192 => write!(f, "aes-192"),
            Self::Aes256 => write!(f, "aes-256"),
        }
    }
}

/// Fill a fresh buffer from the OpenSSL CSPRNG.
pub fn random_bytes(len: usize) -> CryptoResult<Vec<u8>> {
    let mut bytes = vec![0; len];
    rand_bytes(&mut bytes).map_err(|e| CryptoError::RandomSourceFailure(e.to_string()))?;
    Ok(bytes)
}

/// Generate a random IV, one cipher block long.
pub fn random_iv() -> CryptoResult<[u8; AES_IV_LENGTH]> {
    let mut iv = [0; AES_IV_LENGTH];
    rand_bytes(&mut iv).map_err(|e| CryptoError::RandomSourceFailure(e.to_string()))?;
    Ok(iv)
}

/// Generate a random key for the given symmetric cipher.
pub fn random_key(sym_cipher: SymCipher) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let mut key = Zeroizing::from(vec![0; sym_cipher.key_size()]);
    rand_bytes(&mut key).map_err(|e| CryptoError::RandomSourceFailure(e.to_string()))?;
    Ok(key)
}

/// Check a key against the accepted AES sizes before any primitive sees it.
pub(crate) fn check_key(key: &[u8]) -> CryptoResult<SymCipher> {
    SymCipher::from_key_length(key.len())
}

/// Check an IV length before any primitive sees it.
pub(crate) const fn check_iv(iv: &[u8]) -> CryptoResult<()> {
    if iv.len() != AES_IV_LENGTH {
        return Err(CryptoError::InvalidIvLength {
            expected: AES_IV_LENGTH,
            actual: iv.len(),
        });
    }
    Ok(())
}
