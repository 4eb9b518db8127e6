//! Implements the RSA Key Encryption Mechanism `CKM_RSA_PKCS_OAEP`
//! a.k.a PKCS #1 RSA OAEP as specified in PKCS#11 v2.40 available at
//! <http://docs.oasis-open.org/pkcs11/pkcs11-curr/v2.40/cos01/pkcs11-curr-v2.40-cos01.html>#_Toc408226895
//!
//! The label is always empty. With the default SHA-1 hash the output is
//! interoperable with `openssl rsautl -oaep`.
use base64::{Engine, engine::general_purpose};
use openssl::{
    pkey::{PKey, Private, Public},
    pkey_ctx::PkeyCtx,
};
use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::{
    crypto::rsa::{OaepHash, oaep_capacity},
    error::{CryptoError, result::CryptoResult},
};

/// Key Wrap using `CKM_RSA_PKCS_OAEP`
///
/// The maximum dek length is  k-2-2*hLen where
///  - k is the length in octets of the RSA modulus
///  - hLen is the length in octets of the hash function output
///
/// Larger inputs fail with [`CryptoError::MessageTooLong`] before any RSA
/// operation. The output length is the same as the modulus length.
///
/// Arguments:
/// - `pub_key`: the public key used to wrap the key
/// - `hash_fn`: the hash function to use for OAEP
/// - `key_to_wrap`: the data encryption key to wrap
pub fn ckm_rsa_pkcs_oaep_key_wrap(
    pub_key: &PKey<Public>,
    hash_fn: OaepHash,
    key_to_wrap: &[u8],
) -> CryptoResult<Vec<u8>> {
    let max = oaep_capacity(pub_key, hash_fn)?;
    if key_to_wrap.len() > max {
        return Err(CryptoError::MessageTooLong {
            max,
            actual: key_to_wrap.len(),
        });
    }

    // The ciphertext has the same length as the modulus.
    let mut ciphertext = Vec::with_capacity(pub_key.size());

    let mut ctx = PkeyCtx::new(pub_key)?;
    ctx.encrypt_init()?;
    ctx.set_rsa_padding(openssl::rsa::Padding::PKCS1_OAEP)?;
    ctx.set_rsa_oaep_md(hash_fn.to_md_ref())?;
    ctx.encrypt_to_vec(key_to_wrap, &mut ciphertext)?;
    trace!(
        "ckm_rsa_pkcs_oaep_key_wrap: {} bytes wrapped with {hash_fn}",
        key_to_wrap.len()
    );
    Ok(ciphertext)
}

/// Key Unwrap using `CKM_RSA_PKCS_OAEP`
///
/// The wrapped key should be of size k where k is the length in octets of the
/// RSA modulus.
///
/// Every failure, whatever its cause, is reported as the same
/// [`CryptoError::DecryptionFailed`]: the caller cannot tell a bad length from
/// a bad padding.
///
/// Arguments:
/// - `priv_key`: the private key used to unwrap the key
/// - `hash_fn`: the hash function to use for OAEP
/// - `wrapped_key`: the `wrapped_key` of the key to unwrap
pub fn ckm_rsa_pkcs_oaep_key_unwrap(
    priv_key: &PKey<Private>,
    hash_fn: OaepHash,
    wrapped_key: &[u8],
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let plaintext = oaep_decrypt(priv_key, hash_fn, wrapped_key).map_err(|_e| {
        // the cause stays here
        debug!("ckm_rsa_pkcs_oaep_key_unwrap: unwrap failed");
        CryptoError::DecryptionFailed
    })?;
    Ok(plaintext)
}

fn oaep_decrypt(
    priv_key: &PKey<Private>,
    hash_fn: OaepHash,
    wrapped_key: &[u8],
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    if wrapped_key.len() != priv_key.size() {
        return Err(CryptoError::DecryptionFailed);
    }
    let mut plaintext = Zeroizing::from(Vec::with_capacity(oaep_capacity(priv_key, hash_fn)?));

    let mut ctx = PkeyCtx::new(priv_key)?;
    ctx.decrypt_init()?;
    ctx.set_rsa_padding(openssl::rsa::Padding::PKCS1_OAEP)?;
    ctx.set_rsa_oaep_md(hash_fn.to_md_ref())?;
    ctx.decrypt_to_vec(wrapped_key, &mut plaintext)?;
    Ok(plaintext)
}

/// Wrap `plaintext` with OAEP and encode the result as standard base64,
/// the usual text transport for a wrapped key.
pub fn oaep_encrypt_base64(
    pub_key: &PKey<Public>,
    hash_fn: OaepHash,
    plaintext: &[u8],
) -> CryptoResult<String> {
    let wrapped = ckm_rsa_pkcs_oaep_key_wrap(pub_key, hash_fn, plaintext)?;
    Ok(general_purpose::STANDARD.encode(wrapped))
}

/// Reverse of [`oaep_encrypt_base64`]. Invalid base64 is a
/// [`CryptoError::DecryptionFailed`] like any other unwrap failure.
pub fn oaep_decrypt_base64(
    priv_key: &PKey<Private>,
    hash_fn: OaepHash,
    wrapped_b64: &str,
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let wrapped = general_purpose::STANDARD
        .decode(wrapped_b64.trim())
        .map_err(|_e| CryptoError::DecryptionFailed)?;
    ckm_rsa_pkcs_oaep_key_unwrap(priv_key, hash_fn, &wrapped)
}
