use openssl::pkey::{PKey, Private, Public};
use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::{
    crypto::{
        rsa::ckm_rsa_pkcs_oaep::{ckm_rsa_pkcs_oaep_key_unwrap, ckm_rsa_pkcs_oaep_key_wrap},
        symmetric::{
            cbc::{decrypt_cbc, encrypt_cbc},
            symmetric_ciphers::random_key,
        },
    },
    error::{CryptoError, result::CryptoResult},
    hybrid_encryption::{EnvelopeBundle, EnvelopeParameters},
};

/// Asymmetrically encrypt data under an RSA public key.
///
/// Let `m` be the message to encrypt, first generate a temporary random AES key
/// `dek`. Wrap it using RSA-OAEP; `c` is the wrapped key.
///
/// Encrypt the message `m` such as `blob = iv || enc(dek, pad(m))` with
/// AES-CBC and the legacy random padding.
///
/// Return `{c, blob}`. The `dek` lives only for the duration of this call.
pub fn envelope_encrypt(
    pub_key: &PKey<Public>,
    params: &EnvelopeParameters,
    plaintext: &[u8],
) -> CryptoResult<EnvelopeBundle> {
    // Generate temporary AES key.
    let dek = random_key(params.sym_cipher)?;

    // Wrap it using RSA-OAEP.
    let wrapped_key = ckm_rsa_pkcs_oaep_key_wrap(pub_key, params.oaep_hash, &dek)?;

    let blob = encrypt_cbc(&dek, plaintext)?;
    trace!(
        "envelope_encrypt: {} with {}: wrapped key {} bytes, blob {} bytes",
        params.sym_cipher,
        params.oaep_hash,
        wrapped_key.len(),
        blob.len()
    );

    Ok(EnvelopeBundle { wrapped_key, blob })
}

/// Decrypt an [`EnvelopeBundle`] with the RSA private key.
///
/// First recover the data-encryption-key `dek` using RSA-OAEP, then decrypt
/// the blob with AES-CBC.
///
/// A wrapped key that does not unwrap to a key of the expected length is a
/// [`CryptoError::DecryptionFailed`] with no further detail. Without an
/// integrity tag a tampered blob may still decrypt to garbage.
pub fn envelope_decrypt(
    priv_key: &PKey<Private>,
    params: &EnvelopeParameters,
    bundle: &EnvelopeBundle,
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let dek = unwrap_dek(priv_key, params, &bundle.wrapped_key)?;
    decrypt_cbc(&dek, &bundle.blob)
}

/// Recover the per message key and check its length against `params`.
pub(crate) fn unwrap_dek(
    priv_key: &PKey<Private>,
    params: &EnvelopeParameters,
    wrapped_key: &[u8],
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let dek = ckm_rsa_pkcs_oaep_key_unwrap(priv_key, params.oaep_hash, wrapped_key)?;
    if dek.len() != params.sym_cipher.key_size() {
        debug!("envelope: unwrapped key rejected");
        return Err(CryptoError::DecryptionFailed);
    }
    Ok(dek)
}
