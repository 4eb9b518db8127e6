use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use assert_cmd::prelude::*;
use openssl::rsa::Rsa;

use super::PROG_NAME;
use crate::{
    actions::console::ENVELOPE_CLI_FORMAT, config::ENVELOPE_CLI_CONF_ENV, error::result::CliResult,
};

/// Recover output logs from a command call `cmd` and re-inject it into stdio
pub(crate) fn recover_cmd_logs(cmd: &mut Command) -> Output {
    let output = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .unwrap();
    std::io::stdout()
        .write_all(format!("\r\x1b[K{}", String::from_utf8_lossy(&output.stdout)).as_bytes())
        .unwrap();
    std::io::stderr()
        .write_all(format!("\r\x1b[K{}", String::from_utf8_lossy(&output.stderr)).as_bytes())
        .unwrap();
    output
}

/// The binary, isolated from the environment of the test runner.
pub(crate) fn envelope_cmd() -> CliResult<Command> {
    let mut cmd = Command::cargo_bin(PROG_NAME)?;
    cmd.env_remove(ENVELOPE_CLI_CONF_ENV)
        .env_remove(ENVELOPE_CLI_FORMAT)
        .env_remove("RUST_LOG");
    Ok(cmd)
}

/// An RSA key pair written as PEM files: `(public SPKI, private PKCS#1)`.
pub(crate) fn create_rsa_key_files(dir: &Path, bits: u32) -> CliResult<(PathBuf, PathBuf)> {
    let rsa = Rsa::generate(bits)?;
    let public_key_file = dir.join("public.pem");
    let private_key_file = dir.join("private.pem");
    fs::write(&public_key_file, rsa.public_key_to_pem()?)?;
    fs::write(&private_key_file, rsa.private_key_to_pem()?)?;
    Ok((public_key_file, private_key_file))
}
