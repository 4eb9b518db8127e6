//! Counter-mode framing over byte streams.
//!
//! Wire format: `IV (16 bytes) || ciphertext`, where the ciphertext has exactly
//! the length of the plaintext. The IV is generated by the writer on first use
//! and consumed by the reader on first use; it is never supplied by the caller.

use std::io::{self, Read, Write};

use tracing::trace;
use zeroize::Zeroizing;

use crate::{
    crypto::symmetric::{
        ctr::KeystreamCipher,
        symmetric_ciphers::{AES_IV_LENGTH, check_key, random_iv},
    },
    error::{CryptoError, result::CryptoResult},
};

/// Lifecycle of one framed stream.
#[derive(Debug)]
enum StreamState {
    /// No byte has crossed the stream yet; the IV frame is still pending.
    Uninitialized,
    /// The IV frame is done and the keystream is live.
    Streaming(KeystreamCipher),
    /// The underlying stream failed after the keystream moved; nothing more
    /// can be produced without desynchronising both ends.
    Poisoned,
}

/// Encrypts everything written to it and forwards the ciphertext to `inner`,
/// preceded by a freshly generated IV.
///
/// Not meant to be shared: one writer per stream.
pub struct CtrWriter<W: Write> {
    key: Zeroizing<Vec<u8>>,
    inner: W,
    state: StreamState,
}

impl<W: Write> CtrWriter<W> {
    /// Wrap `inner`; the key length (16, 24 or 32 bytes) is checked here.
    pub fn new(key: &[u8], inner: W) -> CryptoResult<Self> {
        check_key(key)?;
        Ok(Self {
            key: Zeroizing::new(key.to_vec()),
            inner,
            state: StreamState::Uninitialized,
        })
    }

    /// Emit the IV frame if that has not happened yet.
    fn start(&mut self) -> CryptoResult<()> {
        match self.state {
            StreamState::Streaming(_) => return Ok(()),
            StreamState::Poisoned => return Err(CryptoError::StreamPoisoned),
            StreamState::Uninitialized => {}
        }
        let iv = random_iv()?;
        let keystream = KeystreamCipher::new(&self.key, &iv)?;
        // a single write: a sink that cannot take the whole IV at once is an error
        let written = self.inner.write(&iv)?;
        if written != iv.len() {
            self.state = StreamState::Poisoned;
            return Err(CryptoError::ShortIvWrite {
                expected: iv.len(),
                written,
            });
        }
        trace!("ctr writer: IV frame written");
        self.state = StreamState::Streaming(keystream);
        Ok(())
    }

    /// Make sure the IV frame is out (even for an empty payload), flush and
    /// hand back the underlying sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.start().map_err(CryptoError::into_io_error)?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Gets a reference to the underlying writer.
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }
}

impl<W: Write> Write for CtrWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.start().map_err(CryptoError::into_io_error)?;
        let StreamState::Streaming(keystream) = &mut self.state else {
            return Err(CryptoError::StreamPoisoned.into_io_error());
        };
        let mut ciphertext = vec![0; buf.len()];
        keystream
            .xor_key_stream(&mut ciphertext, buf)
            .map_err(CryptoError::into_io_error)?;
        // the keystream has advanced by buf.len(): all of it must reach the sink
        if let Err(e) = self.inner.write_all(&ciphertext) {
            self.state = StreamState::Poisoned;
            return Err(e);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> std::fmt::Debug for CtrWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtrWriter")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Reads a stream produced by [`CtrWriter`] from `inner` and yields the
/// plaintext.
///
/// The first `read` must offer a buffer of at least one block: it consumes the
/// IV frame before serving any plaintext.
pub struct CtrReader<R: Read> {
    key: Zeroizing<Vec<u8>>,
    inner: R,
    state: StreamState,
}

impl<R: Read> CtrReader<R> {
    /// Wrap `inner`; the key length (16, 24 or 32 bytes) is checked here.
    pub fn new(key: &[u8], inner: R) -> CryptoResult<Self> {
        check_key(key)?;
        Ok(Self {
            key: Zeroizing::new(key.to_vec()),
            inner,
            state: StreamState::Uninitialized,
        })
    }

    fn start(&mut self, buf_len: usize) -> io::Result<()> {
        match self.state {
            StreamState::Streaming(_) => return Ok(()),
            StreamState::Poisoned => return Err(CryptoError::StreamPoisoned.into_io_error()),
            StreamState::Uninitialized => {}
        }
        if buf_len < AES_IV_LENGTH {
            return Err(CryptoError::ShortBuffer(format!(
                "the first read needs room for at least {AES_IV_LENGTH} bytes, got {buf_len}"
            ))
            .into_io_error());
        }
        let mut iv = [0_u8; AES_IV_LENGTH];
        if let Err(e) = self.inner.read_exact(&mut iv) {
            // part of the IV frame may be gone
            self.state = StreamState::Poisoned;
            return Err(e);
        }
        let keystream = KeystreamCipher::new(&self.key, &iv).map_err(CryptoError::into_io_error)?;
        trace!("ctr reader: IV frame consumed");
        self.state = StreamState::Streaming(keystream);
        Ok(())
    }

    /// Gets a reference to the underlying reader.
    pub const fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwraps this `CtrReader`, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for CtrReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.start(buf.len())?;
        let StreamState::Streaming(keystream) = &mut self.state else {
            return Err(CryptoError::StreamPoisoned.into_io_error());
        };
        // a failed read leaves the keystream untouched
        let n = self.inner.read(buf)?;
        let chunk = buf.get_mut(..n).ok_or_else(|| {
            CryptoError::IndexingSlicing("ctr reader: buf ..n".to_owned()).into_io_error()
        })?;
        keystream
            .apply_in_place(chunk)
            .map_err(CryptoError::into_io_error)?;
        Ok(n)
    }
}

impl<R: Read> std::fmt::Debug for CtrReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtrReader")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
