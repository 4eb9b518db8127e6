use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    path::PathBuf,
};

use clap::Parser;
use envelope_crypto::hybrid_encryption::{
    encode_wrapped_key, rsa_oaep_aes_cbc::envelope_encrypt, rsa_oaep_aes_ctr::seal_stream,
};
use tracing::debug;

use crate::{
    actions::{
        EncryptionMode, EnvelopeOptions, WRAPPED_KEY_EXTENSION, append_extension,
        console,
        file_utils::{
            persist_temp_file, read_bytes_from_file, read_public_key_file, temp_file_next_to,
            write_bytes_to_file,
        },
    },
    config::CliConf,
    error::result::{CliResult, CliResultHelper},
};

/// Encrypt a file under an RSA public key.
///
/// A fresh AES key is generated for the file and wrapped with RSA-OAEP.
/// Two files are written:
///   - the ciphertext: `IV || AES-CBC(padded data)` or `IV || AES-CTR(data)`
///   - the wrapped key, base64 encoded, next to it with a `.key` extension
///
/// Both are needed to decrypt. Neither is authenticated.
///
/// In `cbc` mode the file is entirely loaded in memory;
/// in `ctr` mode it is streamed.
#[derive(Parser, Debug)]
#[clap(verbatim_doc_comment)]
pub struct EncryptAction {
    /// The file to encrypt
    #[clap(required = true, name = "FILE")]
    input_file: PathBuf,

    /// The PEM file of the RSA public key (PKCS#1 or SPKI)
    #[clap(long = "public-key", short = 'p')]
    public_key_file: PathBuf,

    #[clap(flatten)]
    options: EnvelopeOptions,

    /// The encrypted output file path, `FILE.enc` by default
    #[clap(required = false, long, short = 'o')]
    output_file: Option<PathBuf>,
}

impl EncryptAction {
    /// Run the encryption.
    ///
    /// # Errors
    /// Fails if a file cannot be read or written, if the key is not a PEM RSA
    /// public key or if the encryption fails.
    pub fn run(&self, conf: &CliConf) -> CliResult<()> {
        let (params, mode) = self.options.resolve(conf);
        let public_key = read_public_key_file(&self.public_key_file)?;

        let output_file = self
            .output_file
            .clone()
            .unwrap_or_else(|| append_extension(&self.input_file, "enc"));
        let wrapped_key_file = append_extension(&output_file, WRAPPED_KEY_EXTENSION);
        debug!(
            "encrypt {:?} to {output_file:?} ({mode}, {}, {})",
            self.input_file, params.sym_cipher, params.oaep_hash
        );

        let wrapped_key_b64 = match mode {
            EncryptionMode::Cbc => {
                let data = read_bytes_from_file(&self.input_file)
                    .with_context(|| "Cannot read bytes from the file to encrypt")?;
                let bundle = envelope_encrypt(&public_key, &params, &data)?;
                write_bytes_to_file(&bundle.blob, &output_file)?;
                bundle.wrapped_key_base64()
            }
            EncryptionMode::Ctr => {
                let mut input = BufReader::new(File::open(&self.input_file).with_context(|| {
                    format!("could not open the file {}", self.input_file.display())
                })?);
                let output = BufWriter::new(temp_file_next_to(&output_file)?);
                let (wrapped_key, mut writer) = seal_stream(&public_key, &params, output)?;
                io::copy(&mut input, &mut writer)?;
                let output = writer
                    .finish()?
                    .into_inner()
                    .map_err(io::IntoInnerError::into_error)?;
                persist_temp_file(output, &output_file)?;
                encode_wrapped_key(&wrapped_key)
            }
        };
        write_bytes_to_file(wrapped_key_b64.as_bytes(), &wrapped_key_file)?;

        let mut stdout = console::Stdout::new("The encrypted file is available");
        stdout.set_output_file(&output_file);
        stdout.set_wrapped_key_file(&wrapped_key_file);
        stdout.set_mode(&mode);
        stdout.write()?;

        Ok(())
    }
}
