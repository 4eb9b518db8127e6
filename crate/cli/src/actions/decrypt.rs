use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter},
    path::PathBuf,
};

use clap::Parser;
use envelope_crypto::hybrid_encryption::{
    EnvelopeBundle, decode_wrapped_key, rsa_oaep_aes_cbc::envelope_decrypt,
    rsa_oaep_aes_ctr::open_stream,
};
use tracing::debug;

use crate::{
    actions::{
        EncryptionMode, EnvelopeOptions, WRAPPED_KEY_EXTENSION, append_extension,
        console,
        file_utils::{
            persist_temp_file, read_bytes_from_file, read_private_key_file, temp_file_next_to,
            write_bytes_to_file,
        },
    },
    config::CliConf,
    error::result::{CliResult, CliResultHelper},
};

/// Decrypt a file produced by `encrypt` with the RSA private key.
///
/// The wrapped key is read from `FILE.key` unless `--wrapped-key` is given.
/// The mode, hash and cipher must match the ones used to encrypt.
///
/// Any problem with the wrapped key is reported as a generic decryption
/// failure.
#[derive(Parser, Debug)]
#[clap(verbatim_doc_comment)]
pub struct DecryptAction {
    /// The file to decrypt
    #[clap(required = true, name = "FILE")]
    input_file: PathBuf,

    /// The PEM file of the RSA private key (PKCS#1 or PKCS#8)
    #[clap(long = "private-key", short = 'k')]
    private_key_file: PathBuf,

    /// The file holding the base64 wrapped key, `FILE.key` by default
    #[clap(long = "wrapped-key", short = 'w')]
    wrapped_key_file: Option<PathBuf>,

    #[clap(flatten)]
    options: EnvelopeOptions,

    /// The decrypted output file path, `FILE.plain` by default
    #[clap(required = false, long, short = 'o')]
    output_file: Option<PathBuf>,
}

impl DecryptAction {
    /// Run the decryption.
    ///
    /// # Errors
    /// Fails if a file cannot be read or written, if the key is not a PEM RSA
    /// private key or if the decryption fails.
    pub fn run(&self, conf: &CliConf) -> CliResult<()> {
        let (params, mode) = self.options.resolve(conf);
        let private_key = read_private_key_file(&self.private_key_file)?;

        let wrapped_key_file = self
            .wrapped_key_file
            .clone()
            .unwrap_or_else(|| append_extension(&self.input_file, WRAPPED_KEY_EXTENSION));
        let wrapped_key_b64 = fs::read_to_string(&wrapped_key_file).with_context(|| {
            format!(
                "could not read the wrapped key file {}",
                wrapped_key_file.display()
            )
        })?;

        let output_file = self
            .output_file
            .clone()
            .unwrap_or_else(|| append_extension(&self.input_file, "plain"));
        debug!(
            "decrypt {:?} to {output_file:?} ({mode}, {}, {})",
            self.input_file, params.sym_cipher, params.oaep_hash
        );

        match mode {
            EncryptionMode::Cbc => {
                let blob = read_bytes_from_file(&self.input_file)
                    .with_context(|| "Cannot read bytes from the file to decrypt")?;
                let bundle = EnvelopeBundle::from_base64(&wrapped_key_b64, blob)?;
                let plaintext = envelope_decrypt(&private_key, &params, &bundle)?;
                write_bytes_to_file(&plaintext, &output_file)?;
            }
            EncryptionMode::Ctr => {
                let wrapped_key = decode_wrapped_key(&wrapped_key_b64)?;
                let input = BufReader::new(File::open(&self.input_file).with_context(|| {
                    format!("could not open the file {}", self.input_file.display())
                })?);
                let mut reader = open_stream(&private_key, &params, &wrapped_key, input)?;
                // plaintext only reaches `output_file` once the whole stream is read
                let mut output = BufWriter::new(temp_file_next_to(&output_file)?);
                io::copy(&mut reader, &mut output)?;
                let output = output
                    .into_inner()
                    .map_err(io::IntoInnerError::into_error)?;
                persist_temp_file(output, &output_file)?;
            }
        }

        let mut stdout = console::Stdout::new("The decrypted file is available");
        stdout.set_output_file(&output_file);
        stdout.set_mode(&mode);
        stdout.write()?;

        Ok(())
    }
}
