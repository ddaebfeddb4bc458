//! ESIA (gosuslugi) single sign-on client: signed authorization URLs, PKCS#7 client secrets,
//! authorization-code exchange, and personal data fetches over a pluggable HTTP transport.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod loader;
pub mod obs;
pub mod sign;
pub mod timestamp;
pub mod transport;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests: an insecure reqwest client for the
	//! `httpmock` servers and an in-process recording transport.

	pub use crate::_prelude::*;

	// crates.io
	use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
	use oauth2::{
		AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
		http::{HeaderMap, Method, StatusCode},
	};
	// self
	use crate::{
		config::EsiaConfig,
		error::TransportError,
		flows::EsiaClient,
		http::{ProviderHttpClient, ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
		transport::{Endpoint, ReqwestTransportErrorMapper, TransportErrorMapper},
	};

	/// PEM certificate matching [`TEST_KEY`].
	pub const TEST_CERTIFICATE: &str = include_str!("../tests/fixtures/client.crt");
	/// PEM private key matching [`TEST_CERTIFICATE`].
	pub const TEST_KEY: &str = include_str!("../tests/fixtures/client.key");
	/// Client identifier used by test configurations.
	pub const TEST_CLIENT_ID: &str = "TEST_SYSTEM";
	/// Redirect URI used by test configurations.
	pub const TEST_REDIRECT_URI: &str = "https://app.example.com/esia/callback";
	/// Scope used by test configurations.
	pub const TEST_SCOPE: &str = "openid fullname email";

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = EsiaClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;
	/// Client type alias used by tests that run against [`RecordingHttpClient`].
	pub type RecordingTestClient = EsiaClient<RecordingHttpClient, RecordingTransportErrorMapper>;

	/// Builds a configuration pointing every endpoint at `esia_url`.
	pub fn test_config(esia_url: &str) -> EsiaConfig {
		EsiaConfig::builder()
			.esia_url(esia_url)
			.client_id(TEST_CLIENT_ID)
			.redirect_uri(TEST_REDIRECT_URI)
			.scope(TEST_SCOPE)
			.certificate(TEST_CERTIFICATE)
			.key(TEST_KEY)
			.build()
			.expect("Test configuration should build.")
	}

	/// Builds a reqwest-backed client for `httpmock` servers.
	pub fn build_reqwest_test_client(config: EsiaConfig) -> ReqwestTestClient {
		EsiaClient::with_http_client(config, test_reqwest_http_client(), ReqwestTransportErrorMapper)
			.expect("Reqwest test client should build.")
	}

	/// Builds a client that dispatches through `http_client`.
	pub fn build_recording_test_client(
		config: EsiaConfig,
		http_client: RecordingHttpClient,
	) -> RecordingTestClient {
		EsiaClient::with_http_client(config, http_client, RecordingTransportErrorMapper)
			.expect("Recording test client should build.")
	}

	/// Mints an unsigned `header.payload.signature` token carrying `claims`.
	pub fn test_access_token(claims: &serde_json::Value) -> String {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
		let payload = URL_SAFE_NO_PAD.encode(claims.to_string());

		format!("{header}.{payload}.c2lnbmF0dXJl")
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Request captured by [`RecordingHttpClient`].
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// HTTP method.
		pub method: Method,
		/// Absolute request URL.
		pub url: Url,
		/// Request headers.
		pub headers: HeaderMap,
		/// Raw request body.
		pub body: Vec<u8>,
	}
	impl RecordedRequest {
		/// Decodes an `application/x-www-form-urlencoded` body into ordered pairs.
		pub fn form_pairs(&self) -> Vec<(String, String)> {
			url::form_urlencoded::parse(&self.body).into_owned().collect()
		}

		/// Returns a header value as a string slice.
		pub fn header(&self, name: &str) -> Option<&str> {
			self.headers.get(name).and_then(|value| value.to_str().ok())
		}
	}

	#[derive(Clone, Debug)]
	struct Route {
		method: Method,
		path: String,
		status: StatusCode,
		body: Vec<u8>,
	}

	#[derive(Debug, Default)]
	struct RecordingState {
		routes: Mutex<Vec<Route>>,
		requests: Mutex<Vec<RecordedRequest>>,
	}

	/// In-process transport that answers from canned routes and records every request.
	///
	/// Unknown routes answer `404` with an empty JSON object so failures flow through the
	/// regular status handling.
	#[derive(Clone, Debug, Default)]
	pub struct RecordingHttpClient(Arc<RecordingState>);
	impl RecordingHttpClient {
		/// Registers a canned JSON response for `method` + `path`.
		pub fn route(
			self,
			method: Method,
			path: &str,
			status: u16,
			body: impl Into<String>,
		) -> Self {
			let status = StatusCode::from_u16(status).expect("Route status must be a valid code.");

			self.0.routes.lock().push(Route {
				method,
				path: path.to_owned(),
				status,
				body: body.into().into_bytes(),
			});

			self
		}

		/// Returns every request dispatched so far, in order.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.0.requests.lock().clone()
		}

		/// Number of requests dispatched so far.
		pub fn calls(&self) -> usize {
			self.0.requests.lock().len()
		}
	}
	impl ProviderHttpClient for RecordingHttpClient {
		type Handle = RecordingHandle;
		type TransportError = RecordingTransportError;

		fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
			RecordingHandle { state: Arc::clone(&self.0), slot }
		}
	}

	/// Handle returned by [`RecordingHttpClient`].
	pub struct RecordingHandle {
		state: Arc<RecordingState>,
		slot: ResponseMetadataSlot,
	}
	impl<'c> AsyncHttpClient<'c> for RecordingHandle {
		type Error = HttpClientError<RecordingTransportError>;
		type Future =
			Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

		fn call(&'c self, request: HttpRequest) -> Self::Future {
			let state = Arc::clone(&self.state);
			let slot = self.slot.clone();

			Box::pin(async move {
				slot.take();

				let url = Url::parse(&request.uri().to_string())
					.map_err(|_| Box::new(RecordingTransportError::InvalidUri))?;
				let route = state
					.routes
					.lock()
					.iter()
					.find(|route| &route.method == request.method() && route.path == url.path())
					.cloned();

				state.requests.lock().push(RecordedRequest {
					method: request.method().clone(),
					url,
					headers: request.headers().clone(),
					body: request.body().clone(),
				});

				let (status, body) = match route {
					Some(route) => (route.status, route.body),
					None => (StatusCode::NOT_FOUND, b"{}".to_vec()),
				};

				slot.store(ResponseMetadata { status: Some(status.as_u16()), retry_after: None });

				let mut response = HttpResponse::new(body);

				*response.status_mut() = status;

				Ok(response)
			})
		}
	}

	/// Failures raised by [`RecordingHttpClient`].
	#[derive(Debug, ThisError)]
	pub enum RecordingTransportError {
		/// The request URI could not be parsed back into a URL.
		#[error("Recorded request URI is invalid.")]
		InvalidUri,
	}

	/// Maps [`RecordingTransportError`] into crate errors.
	#[derive(Clone, Debug, Default)]
	pub struct RecordingTransportErrorMapper;
	impl TransportErrorMapper<RecordingTransportError> for RecordingTransportErrorMapper {
		fn map_transport_error(
			&self,
			endpoint: Endpoint,
			_metadata: Option<&ResponseMetadata>,
			error: HttpClientError<RecordingTransportError>,
		) -> Error {
			let failure = EndpointFailure { endpoint, message: error.to_string() };

			TransportError::network(failure).into()
		}
	}

	#[derive(Debug, ThisError)]
	#[error("{endpoint} endpoint failed: {message}")]
	struct EndpointFailure {
		endpoint: Endpoint,
		message: String,
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
