use std::{
    fs::{self, File},
    io::Read,
    path::Path,
};

use envelope_crypto::{
    crypto::rsa::keys::{parse_private_key_pem, parse_public_key_pem},
    reexport::openssl::pkey::{PKey, Private, Public},
};

use tempfile::NamedTempFile;

use crate::error::{CliError, result::CliResultHelper};

/// Read all bytes from a file
pub fn read_bytes_from_file(file: &impl AsRef<Path>) -> Result<Vec<u8>, CliError> {
    let mut buffer = Vec::new();
    File::open(file)
        .with_context(|| format!("could not open the file {}", file.as_ref().display()))?
        .read_to_end(&mut buffer)
        .with_context(|| format!("could not read the file {}", file.as_ref().display()))?;

    Ok(buffer)
}

/// Write all bytes to a file
pub fn write_bytes_to_file(bytes: &[u8], file: &impl AsRef<Path>) -> Result<(), CliError> {
    fs::write(file, bytes)
        .with_context(|| format!("failed writing data to file {}", file.as_ref().display()))
}

/// Read a PEM RSA public key file
pub fn read_public_key_file(file: &impl AsRef<Path>) -> Result<PKey<Public>, CliError> {
    let pem = read_bytes_from_file(file)?;
    parse_public_key_pem(&pem)
        .with_context(|| format!("invalid public key file {}", file.as_ref().display()))
}

/// Read a PEM RSA private key file
pub fn read_private_key_file(file: &impl AsRef<Path>) -> Result<PKey<Private>, CliError> {
    let pem = read_bytes_from_file(file)?;
    parse_private_key_pem(&pem)
        .with_context(|| format!("invalid private key file {}", file.as_ref().display()))
}

/// Create a temporary file in the directory of `file`.
///
/// Output is written there and only moved to `file` by [`persist_temp_file`]
/// once complete, so a failure never leaves a partial file behind.
pub fn temp_file_next_to(file: &impl AsRef<Path>) -> Result<NamedTempFile, CliError> {
    let dir = match file.as_ref().parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir)
        .with_context(|| format!("could not create a temporary file in {}", dir.display()))
}

/// Move a fully written temporary file to `file`
pub fn persist_temp_file(tmp: NamedTempFile, file: &impl AsRef<Path>) -> Result<(), CliError> {
    tmp.persist(file)
        .with_context(|| format!("failed writing data to file {}", file.as_ref().display()))?;
    Ok(())
}
