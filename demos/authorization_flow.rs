//! Builds a signed ESIA authorization URL, keeps its state for the redirect handler, and,
//! when `ESIA_CODE` is set, exchanges the returned code and loads the person record.
//!
//! `ESIA_CERTIFICATE` and `ESIA_KEY` point at PEM files (the test fixtures by default);
//! `ESIA_URL`, `ESIA_CLIENT_ID`, and `ESIA_REDIRECT_URI` override the portal settings.

// std
use std::{collections::HashMap, env, fs};
// crates.io
use color_eyre::Result;
// self
use esia_client::{
	config::EsiaConfig,
	flows::{DataPaths, EsiaClient},
};

fn setting(name: &str, default: &str) -> String {
	env::var(name).unwrap_or_else(|_| default.into())
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let certificate = fs::read_to_string(setting("ESIA_CERTIFICATE", "tests/fixtures/client.crt"))?;
	let key = fs::read_to_string(setting("ESIA_KEY", "tests/fixtures/client.key"))?;
	let config = EsiaConfig::builder()
		.esia_url(setting("ESIA_URL", "https://esia-portal1.test.gosuslugi.ru"))
		.client_id(setting("ESIA_CLIENT_ID", "DEMO_SYSTEM"))
		.redirect_uri(setting("ESIA_REDIRECT_URI", "https://app.example.com/esia/callback"))
		.scope("openid fullname birthdate contacts")
		.certificate(certificate)
		.key(key)
		.build()?;
	let client = EsiaClient::new(config)?;
	let request = client.start_authorization()?;

	println!("Send your user to {}.", &request.url);

	let mut pending = HashMap::new();

	pending.insert(request.params.state.clone(), request);

	let Ok(code) = env::var("ESIA_CODE") else {
		println!("Set ESIA_CODE to the `code` returned to the redirect URI to finish the flow.");

		return Ok(());
	};
	// The redirect handler receives `state` alongside `code`.
	let returned_state = env::var("ESIA_STATE").unwrap_or_default();

	match pending.remove(&returned_state) {
		Some(stashed) => stashed.validate_state(&returned_state)?,
		None => eprintln!("State `{returned_state}` was not issued by this process."),
	}

	let outcome = client.exchange_code(&code, DataPaths::default()).await?;

	println!("Subject {} received {} resource(s).", outcome.subject, outcome.resources.len());

	for resource in &outcome.resources {
		println!("{}", serde_json::to_string_pretty(resource)?);
	}

	Ok(())
}
