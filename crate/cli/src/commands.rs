use std::path::PathBuf;

use clap::{Parser, Subcommand};
use envelope_logger::log_init;
use tracing::{info, trace};

use crate::{
    actions::{decrypt::DecryptAction, encrypt::EncryptAction},
    config::CliConf,
    error::result::CliResult,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file location
    ///
    /// This is an alternative to the env variable `ENVELOPE_CLI_CONF`.
    /// Takes precedence over `ENVELOPE_CLI_CONF` env variable.
    #[arg(long, global = true)]
    conf: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommands,
}

#[derive(Subcommand)]
pub enum CliCommands {
    /// Encrypt a file under an RSA public key
    Encrypt(EncryptAction),
    /// Decrypt a file with an RSA private key
    Decrypt(DecryptAction),
}

/// Main function of the `envelope` CLI.
///
/// Initializes logging, parses the command line, loads the configuration
/// and runs the command.
///
/// # Errors
///
/// This function will return an error if:
/// - The command-line arguments cannot be parsed.
/// - The configuration file cannot be loaded.
/// - The command fails.
pub fn envelope_main() -> CliResult<()> {
    log_init(Some("warn"));
    info!("Starting envelope CLI");
    let cli = Cli::parse();

    let conf = CliConf::load(cli.conf)?;
    trace!("Configuration: {conf:?}");

    match cli.command {
        CliCommands::Encrypt(action) => action.run(&conf)?,
        CliCommands::Decrypt(action) => action.run(&conf)?,
    }

    Ok(())
}
