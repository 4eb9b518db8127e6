use openssl::pkey::{PKey, Private, Public};

use crate::{
    crypto::rsa::keys::{parse_private_key_pem, public_key_from_private},
    error::result::CryptoResult,
};

pub mod rsa;
pub mod symmetric;

/// An RSA `KeyPair` `(private key, public key)`.
///
/// Both halves are parsed once and held immutably; the public half is always
/// derived from the private key so the two cannot disagree.
pub struct KeyPair(PKey<Private>, PKey<Public>);

impl KeyPair {
    /// Build the pair from a private key, deriving its public half.
    pub fn from_private_key(private_key: PKey<Private>) -> CryptoResult<Self> {
        let public_key = public_key_from_private(&private_key)?;
        Ok(Self(private_key, public_key))
    }

    /// Parse a PEM encoded RSA private key (PKCS#1 or PKCS#8) and derive the pair.
    pub fn from_private_key_pem(pem: &[u8]) -> CryptoResult<Self> {
        Self::from_private_key(parse_private_key_pem(pem)?)
    }

    /// Get the private key
    #[must_use]
    pub const fn private_key(&self) -> &PKey<Private> {
        &self.0
    }

    /// Get the public key
    #[must_use]
    pub const fn public_key(&self) -> &PKey<Public> {
        &self.1
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("bits", &self.1.bits())
            .finish_non_exhaustive()
    }
}
