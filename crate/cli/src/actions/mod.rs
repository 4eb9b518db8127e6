use std::{
    ffi::OsString,
    fmt::Display,
    path::{Path, PathBuf},
};

use clap::{Args, ValueEnum};
use envelope_crypto::{
    crypto::{rsa::OaepHash, symmetric::symmetric_ciphers::SymCipher},
    hybrid_encryption::EnvelopeParameters,
};
use serde::{Deserialize, Serialize};

use crate::config::CliConf;

pub mod console;
pub mod decrypt;
pub mod encrypt;
pub mod file_utils;

/// Extension of the file holding the base64 wrapped key.
pub const WRAPPED_KEY_EXTENSION: &str = "key";

/// How the payload is encrypted under the per message key.
#[derive(ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EncryptionMode {
    /// AES-CBC over the whole file, loaded in memory
    #[default]
    Cbc,
    /// AES-CTR streamed from file to file
    Ctr,
}

impl Display for EncryptionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cbc => write!(f, "cbc"),
            Self::Ctr => write!(f, "ctr"),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum HashFn {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl From<HashFn> for OaepHash {
    fn from(value: HashFn) -> Self {
        match value {
            HashFn::Sha1 => Self::Sha1,
            HashFn::Sha224 => Self::Sha224,
            HashFn::Sha256 => Self::Sha256,
            HashFn::Sha384 => Self::Sha384,
            HashFn::Sha512 => Self::Sha512,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CipherFn {
    Aes128,
    Aes192,
    Aes256,
}

impl From<CipherFn> for SymCipher {
    fn from(value: CipherFn) -> Self {
        match value {
            CipherFn::Aes128 => Self::Aes128,
            CipherFn::Aes192 => Self::Aes192,
            CipherFn::Aes256 => Self::Aes256,
        }
    }
}

/// Algorithm options shared by `encrypt` and `decrypt`.
/// When not specified, the configuration file value is used.
#[derive(Args, Debug, Clone, Copy)]
pub struct EnvelopeOptions {
    /// The payload encryption mode
    #[clap(long, short = 'm')]
    mode: Option<EncryptionMode>,

    /// The hash function used by RSA-OAEP to wrap the key
    #[clap(long = "hash", short = 's')]
    hash_fn: Option<HashFn>,

    /// The strength of the per message AES key
    #[clap(long = "cipher", short = 'c')]
    cipher_fn: Option<CipherFn>,
}

impl EnvelopeOptions {
    /// Merge the command line options over the configuration.
    #[must_use]
    pub fn resolve(&self, conf: &CliConf) -> (EnvelopeParameters, EncryptionMode) {
        let mut params = conf.envelope_parameters();
        if let Some(hash_fn) = self.hash_fn {
            params.oaep_hash = hash_fn.into();
        }
        if let Some(cipher_fn) = self.cipher_fn {
            params.sym_cipher = cipher_fn.into();
        }
        (params, self.mode.unwrap_or(conf.mode))
    }
}

/// `path` with `.extension` appended, keeping any existing extension:
/// `plain.txt` becomes `plain.txt.enc`.
#[must_use]
pub fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut os_string: OsString = path.as_os_str().to_owned();
    os_string.push(".");
    os_string.push(extension);
    PathBuf::from(os_string)
}
