//! PEM decoding of RSA keys.

use openssl::{
    pkey::{Id, PKey, Private, Public},
    rsa::Rsa,
};

use crate::error::{CryptoError, result::CryptoResult};

const PKCS1_PRIVATE_KEY: &str = "RSA PRIVATE KEY";
const PKCS8_PRIVATE_KEY: &str = "PRIVATE KEY";
const PKCS1_PUBLIC_KEY: &str = "RSA PUBLIC KEY";
const SPKI_PUBLIC_KEY: &str = "PUBLIC KEY";

/// Parse a PEM encoded RSA private key, PKCS#1 (`RSA PRIVATE KEY`) or
/// PKCS#8 (`PRIVATE KEY`).
///
/// Anything that is not PEM is [`CryptoError::NotPem`]; a PEM with another
/// label, broken DER or a non RSA key is [`CryptoError::KeyParsing`].
pub fn parse_private_key_pem(bytes: &[u8]) -> CryptoResult<PKey<Private>> {
    let pem = pem::parse(bytes)?;
    let key = match pem.tag() {
        PKCS1_PRIVATE_KEY => Rsa::private_key_from_der(pem.contents())
            .and_then(PKey::from_rsa)
            .map_err(|e| CryptoError::KeyParsing(format!("PKCS#1 private key: {e}")))?,
        PKCS8_PRIVATE_KEY => PKey::private_key_from_der(pem.contents())
            .map_err(|e| CryptoError::KeyParsing(format!("PKCS#8 private key: {e}")))?,
        other => {
            return Err(CryptoError::KeyParsing(format!(
                "unexpected PEM label for an RSA private key: {other}"
            )));
        }
    };
    ensure_rsa(key)
}

/// Parse a PEM encoded RSA public key, PKCS#1 (`RSA PUBLIC KEY`) or
/// `SubjectPublicKeyInfo` (`PUBLIC KEY`).
pub fn parse_public_key_pem(bytes: &[u8]) -> CryptoResult<PKey<Public>> {
    let pem = pem::parse(bytes)?;
    let key = match pem.tag() {
        PKCS1_PUBLIC_KEY => Rsa::public_key_from_der_pkcs1(pem.contents())
            .and_then(PKey::from_rsa)
            .map_err(|e| CryptoError::KeyParsing(format!("PKCS#1 public key: {e}")))?,
        SPKI_PUBLIC_KEY => PKey::public_key_from_der(pem.contents())
            .map_err(|e| CryptoError::KeyParsing(format!("SPKI public key: {e}")))?,
        other => {
            return Err(CryptoError::KeyParsing(format!(
                "unexpected PEM label for an RSA public key: {other}"
            )));
        }
    };
    ensure_rsa(key)
}

/// Derive the public half of an RSA private key.
pub fn public_key_from_private(priv_key: &PKey<Private>) -> CryptoResult<PKey<Public>> {
    let rsa = priv_key
        .rsa()
        .map_err(|e| CryptoError::KeyParsing(format!("not an RSA private key: {e}")))?;
    let public = Rsa::from_public_components(rsa.n().to_owned()?, rsa.e().to_owned()?)?;
    Ok(PKey::from_rsa(public)?)
}

fn ensure_rsa<T>(key: PKey<T>) -> CryptoResult<PKey<T>> {
    if key.id() != Id::RSA {
        return Err(CryptoError::KeyParsing(format!(
            "expected an RSA key, found {:?}",
            key.id()
        )));
    }
    Ok(key)
}
