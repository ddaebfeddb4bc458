//! PKCS#7 detached signatures used as the ESIA `client_secret`.
//!
//! ESIA authenticates a client by a signature over `scope + timestamp + clientId + state`.
//! The signature is a DER-encoded PKCS#7 signed-data structure (SHA-256, signer certificate
//! embedded, content detached) carried in URL-safe base64 without padding.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use openssl::{
	pkcs7::{Pkcs7, Pkcs7Flags},
	pkey::{PKey, Private},
	stack::Stack,
	x509::X509,
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, SignError},
};

/// Signs arbitrary messages with a client certificate and its private key.
#[derive(Clone)]
pub struct Signer {
	certificate: X509,
	key: PKey<Private>,
}
impl Signer {
	/// Parses PEM-encoded `certificate` and `key`.
	///
	/// Empty inputs are rejected with [`SignError::MissingCredentials`]; unparsable PEM and a
	/// key that does not belong to the certificate are configuration errors.
	pub fn new(certificate: &str, key: &str) -> Result<Self> {
		if certificate.trim().is_empty() || key.trim().is_empty() {
			return Err(SignError::MissingCredentials.into());
		}

		let certificate = X509::from_pem(certificate.as_bytes())
			.map_err(|source| ConfigError::InvalidCertificate { source })?;
		let key = PKey::private_key_from_pem(key.as_bytes())
			.map_err(|source| ConfigError::InvalidKey { source })?;
		let public = certificate
			.public_key()
			.map_err(|source| ConfigError::InvalidCertificate { source })?;

		if !public.public_eq(&key) {
			return Err(ConfigError::KeyMismatch.into());
		}

		Ok(Self { certificate, key })
	}

	/// Signs `message` and returns the URL-safe base64 encoding of the DER structure.
	///
	/// An empty message is valid and yields a signature over zero bytes. Output differs
	/// between calls because the signed attributes carry the signing time.
	pub fn sign(&self, message: impl AsRef<[u8]>) -> Result<String, SignError> {
		let der = self.sign_der(message.as_ref())?;

		Ok(URL_SAFE_NO_PAD.encode(der))
	}

	/// Signs `message` and returns the raw DER-encoded PKCS#7 structure.
	pub fn sign_der(&self, message: &[u8]) -> Result<Vec<u8>, SignError> {
		let extra_certs = Stack::new()?;
		let flags = Pkcs7Flags::DETACHED | Pkcs7Flags::BINARY | Pkcs7Flags::NOSMIMECAP;
		let signed = Pkcs7::sign(&self.certificate, &self.key, &extra_certs, message, flags)?;

		Ok(signed.to_der()?)
	}

	/// Certificate embedded into every signature.
	pub fn certificate(&self) -> &X509 {
		&self.certificate
	}
}
impl Debug for Signer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let subject = self
			.certificate
			.subject_name()
			.entries()
			.map(|entry| String::from_utf8_lossy(entry.data().as_slice()).into_owned())
			.collect::<Vec<_>>()
			.join(", ");

		f.debug_struct("Signer").field("subject", &subject).field("key", &"<redacted>").finish()
	}
}
