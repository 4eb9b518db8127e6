//! The streaming envelope: an OAEP wrapped per stream key in front of an
//! AES-CTR stream, for payloads that must not be held in memory.
use std::io::{Read, Write};

use openssl::pkey::{PKey, Private, Public};
use tracing::trace;

use crate::{
    crypto::{
        rsa::ckm_rsa_pkcs_oaep::ckm_rsa_pkcs_oaep_key_wrap,
        symmetric::{
            stream::{CtrReader, CtrWriter},
            symmetric_ciphers::random_key,
        },
    },
    error::result::CryptoResult,
    hybrid_encryption::{EnvelopeParameters, rsa_oaep_aes_cbc::unwrap_dek},
};

/// Start an encrypted stream towards `sink` under `pub_key`.
///
/// Returns the wrapped stream key, to be transported next to the stream, and
/// the writer. Call [`CtrWriter::finish`] once the payload is written.
pub fn seal_stream<W: Write>(
    pub_key: &PKey<Public>,
    params: &EnvelopeParameters,
    sink: W,
) -> CryptoResult<(Vec<u8>, CtrWriter<W>)> {
    let dek = random_key(params.sym_cipher)?;
    let wrapped_key = ckm_rsa_pkcs_oaep_key_wrap(pub_key, params.oaep_hash, &dek)?;
    let writer = CtrWriter::new(&dek, sink)?;
    trace!("seal_stream: {} stream key wrapped", params.sym_cipher);
    Ok((wrapped_key, writer))
}

/// Open a stream produced by [`seal_stream`].
///
/// The stream key is unwrapped eagerly: a bad wrapped key fails here with
/// [`crate::CryptoError::DecryptionFailed`] before `source` is touched.
pub fn open_stream<R: Read>(
    priv_key: &PKey<Private>,
    params: &EnvelopeParameters,
    wrapped_key: &[u8],
    source: R,
) -> CryptoResult<CtrReader<R>> {
    let dek = unwrap_dek(priv_key, params, wrapped_key)?;
    CtrReader::new(&dek, source)
}
