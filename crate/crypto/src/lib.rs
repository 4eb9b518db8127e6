//! Envelope encryption primitives.
//!
//! - [`crypto::symmetric`]: AES in counter mode as a byte stream (`Read`/`Write`
//!   adapters with an in-band IV) and AES-CBC over whole buffers.
//! - [`crypto::rsa`]: RSA-OAEP key wrapping and PEM key parsing.
//! - [`hybrid_encryption`]: a fresh AES key per message, OAEP-wrapped under an RSA
//!   public key, protecting a CBC blob or a CTR stream.
//!
//! None of these constructions authenticate the ciphertext.

pub use error::{CryptoError, result::CryptoResult};

pub mod crypto;
mod error;
pub mod hybrid_encryption;

pub mod reexport {
    pub use openssl;
    pub use zeroize;
}
