//! Immutable client configuration and the endpoints resolved from it.
//!
//! [`EsiaConfig`] is produced by [`EsiaConfigBuilder`], which applies the provider defaults,
//! rejects missing required fields by their external (camelCase) names, and resolves the
//! authorization, token, and personal data endpoints against the portal URL once.

/// Builder API and serde surface for assembling configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Default ESIA portal URL.
pub const DEFAULT_ESIA_URL: &str = "https://esia.gosuslugi.ru";
/// Default authorization page path.
pub const DEFAULT_AUTH_PATH: &str = "/aas/oauth2/ac";
/// Default token ("marker") endpoint path.
pub const DEFAULT_MARKER_PATH: &str = "/aas/oauth2/te";
/// Default personal data endpoint path.
pub const DEFAULT_DATA_PATH: &str = "/rs/prns";
/// Default requested scope.
pub const DEFAULT_SCOPE: &str = "openid";
/// Default access-token claim carrying the subject (person) identifier.
pub const DEFAULT_SUBJECT_CLAIM: &str = "urn:esia:sbj_id";

/// Endpoints resolved against the portal URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsiaEndpoints {
	/// Authorization page users are redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// Base of the personal data endpoint; the subject id and resource suffix follow it.
	pub resource: Url,
}
impl EsiaEndpoints {
	/// Builds `<resource>/<subject><suffix>`, e.g. `.../rs/prns/1000299654/ctts`.
	pub fn resource_url(&self, subject: &str, suffix: &str) -> Result<Url, ConfigError> {
		let base = self.resource.as_str().trim_end_matches('/');

		Url::parse(&format!("{base}/{subject}{suffix}"))
			.map_err(|source| ConfigError::InvalidUrl { field: "dataPath", source })
	}
}

/// Immutable configuration consumed by [`EsiaClient`](crate::flows::EsiaClient).
#[derive(Clone, PartialEq, Eq)]
pub struct EsiaConfig {
	/// Resolved provider endpoints.
	pub endpoints: EsiaEndpoints,
	/// Space-delimited scope string, signed verbatim.
	pub scope: String,
	/// Client (information system) identifier.
	pub client_id: String,
	/// Redirect URI registered with the provider, sent verbatim.
	pub redirect_uri: String,
	/// PEM-encoded client certificate.
	pub certificate: String,
	/// Access-token claim carrying the subject identifier.
	pub subject_claim: String,
	key: String,
}
impl EsiaConfig {
	/// Creates a new builder with every field unset.
	pub fn builder() -> EsiaConfigBuilder {
		EsiaConfigBuilder::default()
	}

	/// PEM-encoded private key. Callers must avoid logging this string.
	pub fn key(&self) -> &str {
		&self.key
	}
}
impl Debug for EsiaConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("EsiaConfig")
			.field("endpoints", &self.endpoints)
			.field("scope", &self.scope)
			.field("client_id", &self.client_id)
			.field("redirect_uri", &self.redirect_uri)
			.field("subject_claim", &self.subject_claim)
			.field("key", &"<redacted>")
			.finish()
	}
}
