use openssl::symm::{Crypter, Mode};
use zeroize::Zeroizing;

use crate::{
    crypto::symmetric::symmetric_ciphers::{BlockCipherMode, check_iv, check_key},
    crypto_bail, crypto_ensure,
    error::{CryptoError, result::CryptoResult},
};

/// AES in counter mode, used as a plain XOR keystream.
///
/// The keystream position advances with every byte processed, so feeding a
/// message in chunks of any size (including chunks smaller than a block)
/// yields exactly the output of a single call over the whole message.
/// Encryption and decryption are the same operation.
pub struct KeystreamCipher {
    crypter: Crypter,
    block_size: usize,
    position: u64,
}

impl KeystreamCipher {
    /// Set up the keystream for `key` starting at counter block `iv`.
    ///
    /// The key length (16, 24 or 32 bytes) selects AES-128/192/256.
    pub fn new(key: &[u8], iv: &[u8]) -> CryptoResult<Self> {
        let sym_cipher = check_key(key)?;
        check_iv(iv)?;
        let cipher = sym_cipher.to_openssl_cipher(BlockCipherMode::Ctr);
        // the direction is irrelevant for a keystream
        let mut crypter = Crypter::new(cipher, Mode::Encrypt, key, Some(iv))?;
        crypter.pad(false);
        Ok(Self {
            crypter,
            block_size: cipher.block_size(),
            position: 0,
        })
    }

    /// XOR the next `src.len()` keystream bytes with `src` into `dst`.
    ///
    /// `dst` must be at least as long as `src`; only its first `src.len()`
    /// bytes are written. Nothing is consumed from the keystream on error.
    pub fn xor_key_stream(&mut self, dst: &mut [u8], src: &[u8]) -> CryptoResult<()> {
        crypto_ensure!(
            dst.len() >= src.len(),
            CryptoError::ShortBuffer(format!(
                "keystream destination holds {} bytes, source has {}",
                dst.len(),
                src.len()
            ))
        );
        if src.is_empty() {
            return Ok(());
        }
        // openssl wants one spare block of output room, even for a stream mode
        let mut out = Zeroizing::new(vec![0; src.len() + self.block_size]);
        let written = self.crypter.update(src, &mut out)?;
        if written != src.len() {
            crypto_bail!(
                "counter mode produced {written} bytes for {} input bytes",
                src.len()
            );
        }
        let produced = out.get(..written).ok_or_else(|| {
            CryptoError::IndexingSlicing("keystream: output ..written".to_owned())
        })?;
        dst.get_mut(..written)
            .ok_or_else(|| CryptoError::IndexingSlicing("keystream: dst ..written".to_owned()))?
            .copy_from_slice(produced);
        self.position += u64::try_from(written)?;
        Ok(())
    }

    /// Transform `buf` in place.
    pub fn apply_in_place(&mut self, buf: &mut [u8]) -> CryptoResult<()> {
        let src = Zeroizing::new(buf.to_vec());
        self.xor_key_stream(buf, &src)
    }

    /// Number of keystream bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }
}

impl std::fmt::Debug for KeystreamCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystreamCipher")
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
