// crates.io
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	config::{
		DEFAULT_AUTH_PATH, DEFAULT_DATA_PATH, DEFAULT_ESIA_URL, DEFAULT_MARKER_PATH,
		DEFAULT_SCOPE, DEFAULT_SUBJECT_CLAIM, EsiaConfig, EsiaEndpoints,
	},
	error::ConfigError,
};

/// Builder for [`EsiaConfig`] values.
///
/// Deserializes from the camelCase option names (`esiaUrl`, `authPath`, `markerPath`,
/// `dataPath`, `scope`, `clientId`, `redirectUri`, `certificate`, `key`, `subjectClaim`), so
/// a configuration can be loaded from any serde source and finished with [`build`](Self::build).
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EsiaConfigBuilder {
	/// Portal URL (defaults to [`DEFAULT_ESIA_URL`]).
	#[serde(default)]
	pub esia_url: Option<String>,
	/// Authorization page path (defaults to [`DEFAULT_AUTH_PATH`]).
	#[serde(default)]
	pub auth_path: Option<String>,
	/// Token endpoint path (defaults to [`DEFAULT_MARKER_PATH`]).
	#[serde(default)]
	pub marker_path: Option<String>,
	/// Personal data endpoint path (defaults to [`DEFAULT_DATA_PATH`]).
	#[serde(default)]
	pub data_path: Option<String>,
	/// Requested scopes (defaults to [`DEFAULT_SCOPE`]).
	#[serde(default)]
	pub scope: Option<String>,
	/// Client identifier; required. Numbers are accepted and kept in decimal form.
	#[serde(default, deserialize_with = "string_or_number")]
	pub client_id: Option<String>,
	/// Redirect URI; required.
	#[serde(default)]
	pub redirect_uri: Option<String>,
	/// PEM-encoded certificate; required.
	#[serde(default)]
	pub certificate: Option<String>,
	/// PEM-encoded private key; required.
	#[serde(default)]
	pub key: Option<String>,
	/// Subject identifier claim (defaults to [`DEFAULT_SUBJECT_CLAIM`]).
	#[serde(default)]
	pub subject_claim: Option<String>,
}
impl EsiaConfigBuilder {
	/// Sets the portal URL.
	pub fn esia_url(mut self, url: impl Into<String>) -> Self {
		self.esia_url = Some(url.into());

		self
	}

	/// Sets the authorization page path.
	pub fn auth_path(mut self, path: impl Into<String>) -> Self {
		self.auth_path = Some(path.into());

		self
	}

	/// Sets the token endpoint path.
	pub fn marker_path(mut self, path: impl Into<String>) -> Self {
		self.marker_path = Some(path.into());

		self
	}

	/// Sets the personal data endpoint path.
	pub fn data_path(mut self, path: impl Into<String>) -> Self {
		self.data_path = Some(path.into());

		self
	}

	/// Sets the scope string.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the redirect URI.
	pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
		self.redirect_uri = Some(redirect_uri.into());

		self
	}

	/// Sets the PEM-encoded certificate.
	pub fn certificate(mut self, certificate: impl Into<String>) -> Self {
		self.certificate = Some(certificate.into());

		self
	}

	/// Sets the PEM-encoded private key.
	pub fn key(mut self, key: impl Into<String>) -> Self {
		self.key = Some(key.into());

		self
	}

	/// Overrides the claim holding the subject identifier.
	pub fn subject_claim(mut self, claim: impl Into<String>) -> Self {
		self.subject_claim = Some(claim.into());

		self
	}

	/// Consumes the builder, applies defaults, and validates the resulting configuration.
	///
	/// Absent or empty required fields fail with [`ConfigError::MissingField`]; a defaulted
	/// field explicitly set to an empty string fails the same way.
	pub fn build(self) -> Result<EsiaConfig, ConfigError> {
		let client_id = required("clientId", self.client_id)?;
		let redirect_uri = required("redirectUri", self.redirect_uri)?;
		let certificate = required("certificate", self.certificate)?;
		let key = required("key", self.key)?;
		let esia_url = defaulted("esiaUrl", self.esia_url, DEFAULT_ESIA_URL)?;
		let auth_path = defaulted("authPath", self.auth_path, DEFAULT_AUTH_PATH)?;
		let marker_path = defaulted("markerPath", self.marker_path, DEFAULT_MARKER_PATH)?;
		let data_path = defaulted("dataPath", self.data_path, DEFAULT_DATA_PATH)?;
		let scope = defaulted("scope", self.scope, DEFAULT_SCOPE)?;
		let subject_claim =
			defaulted("subjectClaim", self.subject_claim, DEFAULT_SUBJECT_CLAIM)?;

		Url::parse(&redirect_uri)
			.map_err(|source| ConfigError::InvalidUrl { field: "redirectUri", source })?;

		let base = Url::parse(&esia_url)
			.map_err(|source| ConfigError::InvalidUrl { field: "esiaUrl", source })?;
		let endpoints = EsiaEndpoints {
			authorization: join(&base, "authPath", &auth_path)?,
			token: join(&base, "markerPath", &marker_path)?,
			resource: join(&base, "dataPath", &data_path)?,
		};

		Ok(EsiaConfig { endpoints, scope, client_id, redirect_uri, certificate, subject_claim, key })
	}
}
impl Debug for EsiaConfigBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("EsiaConfigBuilder")
			.field("esia_url", &self.esia_url)
			.field("auth_path", &self.auth_path)
			.field("marker_path", &self.marker_path)
			.field("data_path", &self.data_path)
			.field("scope", &self.scope)
			.field("client_id", &self.client_id)
			.field("redirect_uri", &self.redirect_uri)
			.field("certificate_set", &self.certificate.is_some())
			.field("key_set", &self.key.is_some())
			.field("subject_claim", &self.subject_claim)
			.finish()
	}
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
	match value {
		Some(value) if !value.trim().is_empty() => Ok(value),
		_ => Err(ConfigError::MissingField { field }),
	}
}

fn defaulted(
	field: &'static str,
	value: Option<String>,
	default: &str,
) -> Result<String, ConfigError> {
	match value {
		None => Ok(default.to_owned()),
		value => required(field, value),
	}
}

fn join(base: &Url, field: &'static str, path: &str) -> Result<Url, ConfigError> {
	base.join(path).map_err(|source| ConfigError::InvalidUrl { field, source })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Text(String),
		Unsigned(u64),
		Signed(i64),
	}

	Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
		Raw::Text(value) => value,
		Raw::Unsigned(value) => value.to_string(),
		Raw::Signed(value) => value.to_string(),
	}))
}
