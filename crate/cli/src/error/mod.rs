#[cfg(test)]
use assert_cmd::cargo::CargoError;
use envelope_crypto::CryptoError;
use thiserror::Error;

pub mod result;

#[derive(Error, Debug)]
pub enum CliError {
    #[cfg(test)]
    #[error(transparent)]
    CargoError(#[from] CargoError),
    #[error(transparent)]
    CryptoError(#[from] CryptoError),
    #[error("{0}")]
    Default(String),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlError(#[from] toml::de::Error),
    #[cfg(test)]
    #[error(transparent)]
    OpenSSL(#[from] openssl::error::ErrorStack),
}
