//! Client-level error types shared across configuration, signing, transport, and flows.

// crates.io
use openssl::error::ErrorStack;
// self
use crate::{_prelude::*, transport::Endpoint};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller input rejected before any network call.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Signature generation failed.
	#[error(transparent)]
	Sign(#[from] SignError),
	/// Upstream endpoint answered with an unexpected status or body.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Access token or token response could not be interpreted.
	#[error(transparent)]
	Token(#[from] TokenError),

	/// Authorization code exchange failed; wraps the first error raised by the flow.
	#[error("Failed to exchange the authorization code for an access token: {source}")]
	Exchange {
		/// Error that aborted the exchange.
		#[source]
		source: Box<Error>,
	},
}
impl Error {
	pub(crate) fn exchange(source: Error) -> Self {
		Self::Exchange { source: Box::new(source) }
	}
}

/// Configuration and construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required configuration field is absent or empty.
	#[error("Field `{field}` is required to configure the client.")]
	MissingField {
		/// External (camelCase) name of the field.
		field: &'static str,
	},
	/// A configured URL or path cannot be parsed.
	#[error("Field `{field}` does not form a valid URL.")]
	InvalidUrl {
		/// External (camelCase) name of the field.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The certificate is not a valid PEM-encoded X.509 certificate.
	#[error("Certificate cannot be parsed.")]
	InvalidCertificate {
		/// OpenSSL failure.
		#[source]
		source: ErrorStack,
	},
	/// The private key is not a valid PEM-encoded key.
	#[error("Private key cannot be parsed.")]
	InvalidKey {
		/// OpenSSL failure.
		#[source]
		source: ErrorStack,
	},
	/// The private key does not belong to the certificate.
	#[error("Private key does not match the certificate public key.")]
	KeyMismatch,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Caller input failures detected before touching the network.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Token exchange was called without an authorization code.
	#[error("Authorization code is required to obtain an access token.")]
	MissingAuthorizationCode,
	/// Resource load was called without a bearer token.
	#[error("Access token is required to load data.")]
	MissingAccessToken,
}

/// Failures raised while producing a detached signature.
#[derive(Debug, ThisError)]
pub enum SignError {
	/// Certificate and key must both be supplied.
	#[error("Certificate and key are required to sign data.")]
	MissingCredentials,
	/// OpenSSL could not build or encode the signed-data structure.
	#[error("Failed to produce a PKCS#7 signature.")]
	Pkcs7(#[from] ErrorStack),
	/// The request timestamp could not be rendered.
	#[error("Failed to format the request timestamp.")]
	Timestamp(#[from] time::error::Format),
}

/// Unexpected responses from provider endpoints.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Endpoint returned a non-success status.
	#[error("The {endpoint} endpoint returned an unexpected response: {message}.")]
	Endpoint {
		/// Endpoint that produced the response.
		endpoint: Endpoint,
		/// Summary of the failure (status line or body preview).
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Endpoint responded with JSON that could not be parsed.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	ResponseParse {
		/// Endpoint that produced the response.
		endpoint: Endpoint,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures interpreting the token endpoint response or the access token itself.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// The access token is not a `header.payload.signature` triple.
	#[error("Access token is malformed: {reason}.")]
	Malformed {
		/// What was wrong with the token layout.
		reason: &'static str,
	},
	/// The payload segment is not valid base64url.
	#[error("Access token payload is not valid base64url.")]
	PayloadEncoding(#[from] base64::DecodeError),
	/// The payload segment is not a JSON object.
	#[error("Access token payload is not a JSON object.")]
	PayloadJson(#[from] serde_json::Error),
	/// The subject identifier claim is absent or not a string/number.
	#[error("Access token does not carry the `{claim}` subject claim.")]
	MissingSubject {
		/// Claim that was looked up.
		claim: String,
	},
	/// State returned by the provider differs from the one sent.
	#[error("State returned by the provider does not match the request state.")]
	StateMismatch,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn exchange_wrapper_keeps_original_message_and_source() {
		let err = Error::exchange(ValidationError::MissingAccessToken.into());

		assert_eq!(
			err.to_string(),
			"Failed to exchange the authorization code for an access token: Access token is required to load data."
		);

		let source = err.source().expect("Exchange errors must expose their source.");

		assert_eq!(source.to_string(), "Access token is required to load data.");
	}

	#[test]
	fn timestamp_failures_surface_as_sign_errors() {
		let failure = time::macros::datetime!(2015-06-03 02:01:02)
			.format(time::macros::format_description!("[offset_hour]"))
			.expect_err("Offsets cannot be rendered without an offset.");
		let err = Error::from(SignError::from(failure));

		assert!(matches!(err, Error::Sign(SignError::Timestamp(_))));
		assert_eq!(err.to_string(), "Failed to format the request timestamp.");
		assert!(err.source().is_some());
	}

	#[test]
	fn missing_field_names_the_field() {
		let err = ConfigError::MissingField { field: "clientId" };

		assert_eq!(err.to_string(), "Field `clientId` is required to configure the client.");
	}
}
