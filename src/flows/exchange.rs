//! Authorization code exchange followed by the personal data fan-out.

// crates.io
use futures::future;
use oauth2::http::{
	Method, Request,
	header::{ACCEPT, CONTENT_TYPE},
};
use serde_json::Value;
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenClaims, TokenResponse},
	error::{ConfigError, TokenError, TransientError, ValidationError},
	flows::{
		EsiaClient,
		common::{FORM_CONTENT_TYPE, SignedParams},
	},
	http::ProviderHttpClient,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	transport::{self, Endpoint, TransportErrorMapper},
};

/// Personal data resources to fetch once the access token is known.
///
/// Each entry is a suffix appended to `<dataPath>/<subject>`, e.g. `/ctts` or
/// `/addrs?embed=(elements)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DataPaths {
	/// Fetch the person record itself (`/`).
	#[default]
	Root,
	/// Fetch nothing; the outcome carries an empty resource list.
	Skip,
	/// Fetch each suffix, returning results in the same order.
	List(Vec<String>),
}
impl DataPaths {
	/// Builds [`DataPaths::List`] from any sequence of suffixes.
	pub fn list<I, S>(paths: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::List(paths.into_iter().map(Into::into).collect())
	}

	/// Suffixes to request, in order.
	pub fn suffixes(&self) -> Vec<&str> {
		match self {
			DataPaths::Root => vec!["/"],
			DataPaths::Skip => Vec::new(),
			DataPaths::List(paths) => paths.iter().map(String::as_str).collect(),
		}
	}
}
impl<S> FromIterator<S> for DataPaths
where
	S: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self::list(iter)
	}
}

/// Result of a successful [`EsiaClient::exchange_code`] call.
#[derive(Clone)]
pub struct ExchangeOutcome {
	/// Typed view of the token response.
	pub token: TokenResponse,
	/// Token response exactly as returned by the provider.
	pub raw: Value,
	/// Decoded (unverified) access token claims.
	pub claims: AccessTokenClaims,
	/// Subject identifier the resources were fetched for.
	pub subject: String,
	/// Fetched resources, in request order.
	pub resources: Vec<Value>,
}
impl Debug for ExchangeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ExchangeOutcome")
			.field("token", &self.token)
			.field("raw", &"<redacted>")
			.field("claims", &self.claims)
			.field("subject", &self.subject)
			.field("resources", &self.resources)
			.finish()
	}
}

impl<C, M> EsiaClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges an authorization `code` for an access token, then loads `data_paths`.
	///
	/// An empty code fails with [`ValidationError::MissingAuthorizationCode`] before any
	/// request is sent. Every later failure is wrapped in [`Error::Exchange`]; resources are
	/// fetched concurrently and the first failure aborts the whole exchange.
	pub async fn exchange_code(
		&self,
		code: &str,
		data_paths: DataPaths,
	) -> Result<ExchangeOutcome> {
		const KIND: OperationKind = OperationKind::TokenExchange;

		if code.is_empty() {
			return Err(ValidationError::MissingAuthorizationCode.into());
		}

		let span = OperationSpan::new(KIND, "exchange_code");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result =
			span.instrument(self.exchange(code, &data_paths)).await.map_err(Error::exchange);

		obs::record_operation_outcome(KIND, OperationOutcome::of(&result));

		result
	}

	async fn exchange(&self, code: &str, data_paths: &DataPaths) -> Result<ExchangeOutcome> {
		let params = SignedParams::generate(&self.config, self.signer())?;
		let raw = self.request_token(code, &params).await?;
		let token: TokenResponse = serde_path_to_error::deserialize(&raw).map_err(|source| {
			TransientError::ResponseParse { endpoint: Endpoint::Token, source, status: None }
		})?;

		if token.state.as_deref().is_some_and(|echoed| echoed != params.state) {
			return Err(TokenError::StateMismatch.into());
		}

		let access_token = token.access_token.secret();
		let claims = AccessTokenClaims::decode(access_token)?;
		let subject = claims.subject(&self.config.subject_claim)?;
		let urls = data_paths
			.suffixes()
			.into_iter()
			.map(|suffix| self.config.endpoints.resource_url(&subject, suffix))
			.collect::<Result<Vec<_>, _>>()?;

		#[cfg(feature = "tracing")]
		tracing::debug!(resources = urls.len(), "Access token issued; loading resources.");

		let resources =
			future::try_join_all(urls.iter().map(|url| self.load_resource(url, access_token)))
				.await?;

		Ok(ExchangeOutcome { token, raw, claims, subject, resources })
	}

	async fn request_token(&self, code: &str, params: &SignedParams) -> Result<Value> {
		let body = Serializer::new(String::new())
			.append_pair("client_id", &params.client_id)
			.append_pair("code", code)
			.append_pair("grant_type", "authorization_code")
			.append_pair("client_secret", &params.client_secret)
			.append_pair("state", &params.state)
			.append_pair("redirect_uri", &params.redirect_uri)
			.append_pair("scope", &params.scope)
			.append_pair("timestamp", &params.timestamp)
			.append_pair("token_type", "Bearer")
			.finish();
		let request = Request::builder()
			.method(Method::POST)
			.uri(self.config.endpoints.token.as_str())
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(ACCEPT, "application/json")
			.body(body.into_bytes())
			.map_err(ConfigError::from)?;

		transport::request_json(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			Endpoint::Token,
			request,
		)
		.await
	}
}
