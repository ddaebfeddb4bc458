//! Per-call signed parameters shared by the authorization and token requests.

// crates.io
use uuid::Uuid;
// self
use crate::{_prelude::*, config::EsiaConfig, error::SignError, sign::Signer, timestamp};

/// Content type of the token request body and the personal data requests.
pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Timestamp, state, and signature generated fresh for every provider call.
#[derive(Clone, Debug)]
pub(crate) struct SignedParams {
	pub(crate) client_id: String,
	pub(crate) client_secret: String,
	pub(crate) redirect_uri: String,
	pub(crate) scope: String,
	pub(crate) state: String,
	pub(crate) timestamp: String,
}
impl SignedParams {
	pub(crate) fn generate(config: &EsiaConfig, signer: &Signer) -> Result<Self> {
		let timestamp = timestamp::now().map_err(SignError::from)?;

		Self::sign_with(config, signer, timestamp, Uuid::new_v4().to_string())
	}

	fn sign_with(
		config: &EsiaConfig,
		signer: &Signer,
		timestamp: String,
		state: String,
	) -> Result<Self> {
		let message = signing_message(&config.scope, &timestamp, &config.client_id, &state);
		let client_secret = signer.sign(message)?;

		Ok(Self {
			client_id: config.client_id.clone(),
			client_secret,
			redirect_uri: config.redirect_uri.clone(),
			scope: config.scope.clone(),
			state,
			timestamp,
		})
	}
}

/// Concatenates the signed fields in provider order, without separators.
pub(crate) fn signing_message(scope: &str, timestamp: &str, client_id: &str, state: &str) -> String {
	[scope, timestamp, client_id, state].concat()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const CERTIFICATE: &str = include_str!("../../tests/fixtures/client.crt");
	const KEY: &str = include_str!("../../tests/fixtures/client.key");

	fn config() -> EsiaConfig {
		EsiaConfig::builder()
			.client_id("TEST_SYSTEM")
			.redirect_uri("https://app.example.com/cb")
			.scope("openid fullname")
			.certificate(CERTIFICATE)
			.key(KEY)
			.build()
			.expect("Fixture configuration should build.")
	}

	#[test]
	fn signing_message_concatenates_in_order() {
		assert_eq!(
			signing_message("openid", "2015.06.03 02:01:02 +0300", "SYS", "state-1"),
			"openid2015.06.03 02:01:02 +0300SYSstate-1"
		);
	}

	#[test]
	fn generated_params_are_fresh_per_call() {
		let config = config();
		let signer = Signer::new(&config.certificate, config.key()).expect("Signer should load.");
		let first = SignedParams::generate(&config, &signer).expect("Params should sign.");
		let second = SignedParams::generate(&config, &signer).expect("Params should sign.");

		assert_ne!(first.state, second.state);
		assert_eq!(first.client_id, "TEST_SYSTEM");
		assert_eq!(first.scope, "openid fullname");
		assert_eq!(first.redirect_uri, "https://app.example.com/cb");
		assert_eq!(
			Uuid::parse_str(&first.state).expect("State should be a UUID.").get_version_num(),
			4
		);
	}

	#[test]
	fn explicit_inputs_are_carried_verbatim() {
		let config = config();
		let signer = Signer::new(&config.certificate, config.key()).expect("Signer should load.");
		let params = SignedParams::sign_with(
			&config,
			&signer,
			"2015.06.03 02:01:02 +0300".into(),
			"fixed-state".into(),
		)
		.expect("Params should sign.");

		assert_eq!(params.timestamp, "2015.06.03 02:01:02 +0300");
		assert_eq!(params.state, "fixed-state");
		assert!(!params.client_secret.is_empty());
	}
}
