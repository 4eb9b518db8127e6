use std::{io, num::TryFromIntError};

use thiserror::Error;

pub(crate) mod result;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Conversion Error: {0}")]
    ConversionError(String),

    /// Intentionally carries no detail: callers must not learn which check failed.
    #[error("decryption failed: ciphertext, key or bundle is invalid")]
    DecryptionFailed,

    #[error("{0}")]
    Default(String),

    #[error("Indexing slicing Error: {0}")]
    IndexingSlicing(String),

    #[error("invalid blob length: {0}")]
    InvalidBlobLength(String),

    #[error("invalid initialization vector length: expected {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("invalid key length: {0} bytes; AES keys are 16, 24 or 32 bytes long")]
    InvalidKeyLength(usize),

    #[error("invalid padding: {0}")]
    InvalidPadding(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("key parsing error: {0}")]
    KeyParsing(String),

    #[error("message too long: {actual} bytes exceed the {max} bytes the RSA key can wrap")]
    MessageTooLong { max: usize, actual: usize },

    #[error("not a PEM")]
    NotPem,

    #[error("OpenSSL Error: {0}")]
    OpenSSL(String),

    #[error("random source failure: {0}")]
    RandomSourceFailure(String),

    #[error("short buffer: {0}")]
    ShortBuffer(String),

    #[error("short initialization vector write: {written} of {expected} bytes accepted")]
    ShortIvWrite { expected: usize, written: usize },

    #[error("stream is unusable after a previous failure")]
    StreamPoisoned,
}

impl CryptoError {
    /// Wrap this error so that it can travel through `std::io::Read`/`Write`.
    pub(crate) fn into_io_error(self) -> io::Error {
        match self {
            Self::Io(e) => e,
            other => io::Error::other(other),
        }
    }
}

impl From<openssl::error::ErrorStack> for CryptoError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::OpenSSL(format!("Error: {e}. Details: {e:?}"))
    }
}

impl From<TryFromIntError> for CryptoError {
    fn from(e: TryFromIntError) -> Self {
        Self::ConversionError(e.to_string())
    }
}

impl From<pem::PemError> for CryptoError {
    fn from(_e: pem::PemError) -> Self {
        Self::NotPem
    }
}

/// Return early with an error if a condition is not satisfied.
///
/// This macro is equivalent to `if !$cond { return Err(From::from($err)); }`.
#[macro_export]
macro_rules! crypto_ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($crate::crypto_error!($msg));
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return ::core::result::Result::Err($crate::crypto_error!($fmt, $($arg)*));
        }
    };
}

/// Construct a crypto error from a string.
#[macro_export]
macro_rules! crypto_error {
    ($msg:literal) => {
        $crate::CryptoError::Default(::core::format_args!($msg).to_string())
    };
    ($err:expr $(,)?) => ({
        $crate::CryptoError::Default($err.to_string())
    });
    ($fmt:expr, $($arg:tt)*) => {
        $crate::CryptoError::Default(::core::format_args!($fmt, $($arg)*).to_string())
    };
}

/// Return early with an error.
#[macro_export]
macro_rules! crypto_bail {
    ($msg:literal) => {
        return ::core::result::Result::Err($crate::crypto_error!($msg))
    };
    ($err:expr $(,)?) => {
        return ::core::result::Result::Err($err)
    };
    ($fmt:expr, $($arg:tt)*) => {
        return ::core::result::Result::Err($crate::crypto_error!($fmt, $($arg)*))
    };
}
