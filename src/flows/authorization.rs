//! Signed authorization redirect construction.

// self
use crate::{
	_prelude::*,
	config::EsiaConfig,
	error::TokenError,
	flows::{EsiaClient, common::SignedParams},
	http::ProviderHttpClient,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	sign::Signer,
	transport::TransportErrorMapper,
};

/// Query parameters of the authorization redirect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationParams {
	/// Client identifier.
	pub client_id: String,
	/// Detached signature over `scope + timestamp + client_id + state`.
	pub client_secret: String,
	/// Redirect URI registered with the provider.
	pub redirect_uri: String,
	/// Requested scopes.
	pub scope: String,
	/// Random per-request state (UUID v4).
	pub state: String,
	/// Request timestamp, `YYYY.MM.DD HH:MM:SS ±HHMM`.
	pub timestamp: String,
	/// Always `code`.
	pub response_type: String,
	/// Always `offline`.
	pub access_type: String,
}
impl AuthorizationParams {
	/// Returns the parameters as ordered query pairs.
	pub fn pairs(&self) -> [(&'static str, &str); 8] {
		[
			("client_id", &self.client_id),
			("client_secret", &self.client_secret),
			("redirect_uri", &self.redirect_uri),
			("scope", &self.scope),
			("state", &self.state),
			("timestamp", &self.timestamp),
			("response_type", &self.response_type),
			("access_type", &self.access_type),
		]
	}

	fn from_signed(params: SignedParams) -> Self {
		let SignedParams { client_id, client_secret, redirect_uri, scope, state, timestamp } =
			params;

		Self {
			client_id,
			client_secret,
			redirect_uri,
			scope,
			state,
			timestamp,
			response_type: "code".into(),
			access_type: "offline".into(),
		}
	}
}

/// Authorization redirect returned by [`EsiaClient::start_authorization`].
///
/// Callers persist [`state`](AuthorizationParams::state) to correlate the later callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
	/// Fully-formed authorization URL to send the end-user to.
	pub url: Url,
	/// Parameters used to build [`url`](Self::url).
	pub params: AuthorizationParams,
}
impl AuthorizationRequest {
	/// Validates the `state` returned to the redirect handler.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.params.state {
			Ok(())
		} else {
			Err(TokenError::StateMismatch.into())
		}
	}
}

impl<C, M> EsiaClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds a freshly signed authorization redirect.
	pub fn start_authorization(&self) -> Result<AuthorizationRequest> {
		const KIND: OperationKind = OperationKind::Authorization;

		let _span = OperationSpan::new(KIND, "start_authorization").entered();

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = build_request(&self.config, self.signer());

		obs::record_operation_outcome(KIND, OperationOutcome::of(&result));

		result
	}
}

fn build_request(config: &EsiaConfig, signer: &Signer) -> Result<AuthorizationRequest> {
	let params = AuthorizationParams::from_signed(SignedParams::generate(config, signer)?);
	let mut url = config.endpoints.authorization.clone();

	url.query_pairs_mut().extend_pairs(params.pairs());

	Ok(AuthorizationRequest { url, params })
}
