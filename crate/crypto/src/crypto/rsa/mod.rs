use openssl::{
    md::{Md, MdRef},
    pkey::{HasPublic, PKey},
};
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, result::CryptoResult};

pub mod ckm_rsa_pkcs_oaep;
pub mod keys;

/// The hash function used by OAEP, both for the mask generation and the
/// (empty) label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OaepHash {
    /// What `openssl rsautl -oaep` and most legacy peers expect.
    #[default]
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl OaepHash {
    /// The OpenSSL digest for this hash.
    #[must_use]
    pub fn to_md_ref(self) -> &'static MdRef {
        match self {
            Self::Sha1 => Md::sha1(),
            Self::Sha224 => Md::sha224(),
            Self::Sha256 => Md::sha256(),
            Self::Sha384 => Md::sha384(),
            Self::Sha512 => Md::sha512(),
        }
    }

    /// Digest output length in bytes.
    #[must_use]
    pub const fn output_size(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

impl std::fmt::Display for OaepHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha1 => write!(f, "sha1"),
            Self::Sha224 => write!(f, "sha224"),
            Self::Sha256 => write!(f, "sha256"),
            Self::Sha384 => write!(f, "sha384"),
            Self::Sha512 => write!(f, "sha512"),
        }
    }
}

/// The largest payload OAEP can wrap under `key` with `hash`:
/// `k - 2*hLen - 2` where `k` is the modulus length in bytes.
///
/// Zero when the modulus is too small for the hash.
pub fn oaep_capacity<T: HasPublic>(key: &PKey<T>, hash: OaepHash) -> CryptoResult<usize> {
    let rsa = key
        .rsa()
        .map_err(|_e| CryptoError::KeyParsing("not an RSA key".to_owned()))?;
    let modulus_len = usize::try_from(rsa.size())?;
    Ok(modulus_len.saturating_sub(2 * hash.output_size() + 2))
}
