//! Bearer-authenticated personal data requests.

// crates.io
use oauth2::http::{
	Method, Request,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ValidationError},
	flows::{EsiaClient, common::FORM_CONTENT_TYPE},
	http::ProviderHttpClient,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	transport::{self, Endpoint, TransportErrorMapper},
};

/// Fetches `url` with `access_token` and returns the JSON body.
///
/// An empty token fails with [`ValidationError::MissingAccessToken`] before any request is
/// sent. Non-success statuses, transport failures, and malformed JSON are propagated as is.
pub async fn load<C, M>(
	http_client: &C,
	mapper: &M,
	url: &Url,
	access_token: &str,
) -> Result<Value>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	if access_token.is_empty() {
		return Err(ValidationError::MissingAccessToken.into());
	}

	let request = Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(AUTHORIZATION, format!("Bearer {access_token}"))
		.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
		.body(Vec::new())
		.map_err(ConfigError::from)?;

	transport::request_json(http_client, mapper, Endpoint::Resource, request).await
}

impl<C, M> EsiaClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Loads a single personal data resource with an access token obtained earlier.
	pub async fn load_resource(&self, url: &Url, access_token: &str) -> Result<Value> {
		const KIND: OperationKind = OperationKind::ResourceLoad;

		let span = OperationSpan::new(KIND, "load_resource");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(load(
				self.http_client.as_ref(),
				self.transport_mapper.as_ref(),
				url,
				access_token,
			))
			.await;

		obs::record_operation_outcome(KIND, OperationOutcome::of(&result));

		result
	}
}
