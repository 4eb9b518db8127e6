use std::{
    env, fs,
    path::{Path, PathBuf},
};

use envelope_crypto::{
    crypto::{rsa::OaepHash, symmetric::symmetric_ciphers::SymCipher},
    hybrid_encryption::EnvelopeParameters,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    actions::EncryptionMode,
    error::result::{CliResult, CliResultHelper},
};

pub const ENVELOPE_CLI_CONF_ENV: &str = "ENVELOPE_CLI_CONF";

/// Define the configuration of the CLI reading a toml file
///
/// ```toml
/// oaep_hash = "sha1"
/// sym_cipher = "aes256"
/// mode = "cbc"
/// ```
///
/// Every field is optional. Command line options take precedence.
#[derive(Serialize, Deserialize, Eq, PartialEq, Debug, Clone, Copy, Default)]
#[serde(default, deny_unknown_fields)]
pub struct CliConf {
    pub oaep_hash: OaepHash,
    pub sym_cipher: SymCipher,
    pub mode: EncryptionMode,
}

impl CliConf {
    /// The configuration file to use: `conf` when given, else the
    /// `ENVELOPE_CLI_CONF` env variable, else none.
    #[must_use]
    pub fn location(conf: Option<PathBuf>) -> Option<PathBuf> {
        conf.or_else(|| env::var_os(ENVELOPE_CLI_CONF_ENV).map(PathBuf::from))
    }

    /// Load the configuration; a missing file yields the defaults.
    ///
    /// # Errors
    /// Return an error if the file exists but cannot be read or is not a
    /// valid configuration.
    pub fn load(conf: Option<PathBuf>) -> CliResult<Self> {
        match Self::location(conf) {
            Some(path) if path.exists() => {
                debug!("Loading configuration from: {path:?}");
                Self::from_toml(&path)
            }
            Some(path) => {
                debug!("No configuration at {path:?}, using the defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse a toml configuration file.
    ///
    /// # Errors
    /// Return an error if the file cannot be read or is not a valid toml
    /// configuration.
    pub fn from_toml(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Can't read the configuration file {path:?}"))?;
        toml::from_str(&content)
            .with_context(|| format!("Config TOML malformed in {path:?}"))
    }

    #[must_use]
    pub const fn envelope_parameters(&self) -> EnvelopeParameters {
        EnvelopeParameters {
            oaep_hash: self.oaep_hash,
            sym_cipher: self.sym_cipher,
        }
    }
}
