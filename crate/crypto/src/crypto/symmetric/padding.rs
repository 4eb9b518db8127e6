use zeroize::Zeroizing;

use crate::{
    crypto::symmetric::symmetric_ciphers::random_bytes,
    error::{CryptoError, result::CryptoResult},
};

/// A reversible way of bringing a plaintext to a multiple of the block size.
pub trait PaddingScheme {
    /// Return the padded plaintext; its length is a non-zero multiple of `block_size`.
    fn pad(&self, plaintext: &[u8], block_size: usize) -> CryptoResult<Zeroizing<Vec<u8>>>;

    /// Strip the padding added by [`PaddingScheme::pad`].
    fn unpad<'a>(&self, padded: &'a [u8]) -> CryptoResult<&'a [u8]>;
}

/// Legacy randomized prefix padding.
///
/// `padding || plaintext`, where `padding` is `1..=block_size` random bytes whose
/// first byte is overwritten with the padding length. Block-aligned input gets a
/// whole extra block, so the length byte is always present.
///
/// There is no integrity check: a corrupted length byte yields wrong plaintext
/// rather than an error. Only a length that cannot be sliced is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyRandomPadding;

impl LegacyRandomPadding {
    /// Number of padding bytes for a plaintext of `plaintext_len` bytes.
    #[must_use]
    pub const fn padding_length(plaintext_len: usize, block_size: usize) -> usize {
        block_size - plaintext_len % block_size
    }
}

impl PaddingScheme for LegacyRandomPadding {
    fn pad(&self, plaintext: &[u8], block_size: usize) -> CryptoResult<Zeroizing<Vec<u8>>> {
        if block_size == 0 || block_size > usize::from(u8::MAX) {
            return Err(CryptoError::InvalidPadding(format!(
                "block size {block_size} cannot be described by a single length byte"
            )));
        }
        let pad_len = Self::padding_length(plaintext.len(), block_size);
        let mut padded = Zeroizing::new(random_bytes(pad_len)?);
        if let Some(first) = padded.first_mut() {
            *first = u8::try_from(pad_len)?;
        }
        padded.extend_from_slice(plaintext);
        Ok(padded)
    }

    fn unpad<'a>(&self, padded: &'a [u8]) -> CryptoResult<&'a [u8]> {
        let pad_len = padded
            .first()
            .ok_or_else(|| CryptoError::InvalidPadding("empty padded buffer".to_owned()))?;
        padded.get(usize::from(*pad_len)..).ok_or_else(|| {
            CryptoError::InvalidPadding(format!(
                "length byte {pad_len} exceeds the {} byte buffer",
                padded.len()
            ))
        })
    }
}
