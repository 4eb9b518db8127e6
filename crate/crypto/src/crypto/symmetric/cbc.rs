use openssl::symm::{Crypter, Mode};
use tracing::trace;
use zeroize::Zeroizing;

use crate::{
    crypto::symmetric::{
        padding::{LegacyRandomPadding, PaddingScheme},
        symmetric_ciphers::{AES_BLOCK_SIZE, AES_IV_LENGTH, BlockCipherMode, check_key, random_iv},
    },
    crypto_ensure,
    error::{CryptoError, result::CryptoResult},
};

/// Encrypt `plaintext` with AES-CBC and the legacy randomized padding.
///
/// Returns `IV || ciphertext`; the IV is freshly generated and the ciphertext
/// is always at least one block long.
/// Note: the padding is custom, only an equivalent implementation can decrypt this.
pub fn encrypt_cbc(key: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    encrypt_cbc_with_padding(&LegacyRandomPadding, key, plaintext)
}

/// Decrypt an `IV || ciphertext` blob produced by [`encrypt_cbc`].
pub fn decrypt_cbc(key: &[u8], blob: &[u8]) -> CryptoResult<Zeroizing<Vec<u8>>> {
    decrypt_cbc_with_padding(&LegacyRandomPadding, key, blob)
}

/// Same as [`encrypt_cbc`] with a caller-chosen padding scheme.
pub fn encrypt_cbc_with_padding<P: PaddingScheme>(
    padding: &P,
    key: &[u8],
    plaintext: &[u8],
) -> CryptoResult<Vec<u8>> {
    let sym_cipher = check_key(key)?;

    let padded = padding.pad(plaintext, AES_BLOCK_SIZE)?;
    crypto_ensure!(
        !padded.is_empty() && padded.len() % AES_BLOCK_SIZE == 0,
        CryptoError::InvalidPadding(format!(
            "padded length {} is not a non-zero multiple of {AES_BLOCK_SIZE}",
            padded.len()
        ))
    );

    let iv = random_iv()?;
    let ciphertext = crypt_blocks(
        Mode::Encrypt,
        sym_cipher.to_openssl_cipher(BlockCipherMode::Cbc),
        key,
        &iv,
        &padded,
    )?;
    trace!(
        "encrypt_cbc: plaintext {} bytes, blob {} bytes",
        plaintext.len(),
        AES_IV_LENGTH + ciphertext.len()
    );

    Ok([iv.as_slice(), ciphertext.as_slice()].concat())
}

/// Same as [`decrypt_cbc`] with a caller-chosen padding scheme.
pub fn decrypt_cbc_with_padding<P: PaddingScheme>(
    padding: &P,
    key: &[u8],
    blob: &[u8],
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    // shape first, crypto second
    let sym_cipher = check_key(key)?;
    crypto_ensure!(
        blob.len() >= AES_IV_LENGTH,
        CryptoError::InvalidBlobLength(format!(
            "{} bytes is shorter than the {AES_IV_LENGTH} bytes IV",
            blob.len()
        ))
    );
    let (iv, ciphertext) = blob.split_at(AES_IV_LENGTH);
    crypto_ensure!(
        !ciphertext.is_empty() && ciphertext.len() % AES_BLOCK_SIZE == 0,
        CryptoError::InvalidBlobLength(format!(
            "ciphertext of {} bytes is not a non-zero multiple of {AES_BLOCK_SIZE}",
            ciphertext.len()
        ))
    );

    let padded = crypt_blocks(
        Mode::Decrypt,
        sym_cipher.to_openssl_cipher(BlockCipherMode::Cbc),
        key,
        iv,
        ciphertext,
    )?;
    let plaintext = padding.unpad(&padded)?;
    Ok(Zeroizing::new(plaintext.to_vec()))
}

/// Run block-aligned data through AES-CBC without OpenSSL's own padding.
fn crypt_blocks(
    mode: Mode,
    cipher: openssl::symm::Cipher,
    key: &[u8],
    iv: &[u8],
    input: &[u8],
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    let mut c = Crypter::new(cipher, mode, key, Some(iv))?;
    c.pad(false);
    let mut output = Zeroizing::new(vec![0; input.len() + cipher.block_size()]);
    let count = c.update(input, &mut output)?;
    let rest = c.finalize(output.get_mut(count..).ok_or_else(|| {
        CryptoError::IndexingSlicing("cbc: crypt_blocks: finalize: count..".to_owned())
    })?)?;
    output.truncate(count + rest);
    Ok(output)
}
