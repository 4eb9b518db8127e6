//! AES based symmetric transforms: a counter-mode byte stream and a
//! block-chained whole-buffer cipher.

pub mod cbc;
pub mod ctr;
pub mod padding;
pub mod stream;
pub mod symmetric_ciphers;

pub use cbc::{decrypt_cbc, encrypt_cbc};
pub use ctr::KeystreamCipher;
pub use stream::{CtrReader, CtrWriter};

#[cfg(test)]
mod tests;
