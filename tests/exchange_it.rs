#![cfg(feature = "reqwest")]

// std
use std::time::Duration as StdDuration;
// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use esia_client::{
	_preludet::*,
	error::{TokenError, TransientError, ValidationError},
	flows::DataPaths,
	transport::{Endpoint, oauth2::http::Method},
};

const SUBJECT: &str = "1000299654";
const TOKEN_PATH: &str = "/aas/oauth2/te";

fn access_token() -> String {
	test_access_token(&json!({
		"iss": "http://esia.gosuslugi.ru/",
		"urn:esia:sbj_id": 1000299654_u64,
		"exp": 1433286062,
	}))
}

fn token_body(access_token: &str) -> String {
	json!({
		"access_token": access_token,
		"refresh_token": "refresh-it",
		"id_token": "id.token.it",
		"token_type": "Bearer",
		"expires_in": 3600,
	})
	.to_string()
}

fn recording_client(http: &RecordingHttpClient) -> RecordingTestClient {
	build_recording_test_client(test_config("https://esia.example"), http.clone())
}

#[tokio::test]
async fn exchange_code_fetches_person_record_by_default() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_config(&server.base_url()));
	let token = access_token();
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(token_body(&token));
		})
		.await;
	let bearer = format!("Bearer {token}");
	let person_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/rs/prns/1000299654/").header("authorization", bearer.as_str());
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"firstName\":\"Ivan\",\"lastName\":\"Ivanov\"}");
		})
		.await;
	let outcome = client
		.exchange_code("valid-code", DataPaths::default())
		.await
		.expect("Exchange should succeed.");

	token_mock.assert_async().await;
	person_mock.assert_async().await;

	assert_eq!(outcome.token.access_token.secret(), &token);
	assert_eq!(outcome.raw["refresh_token"], "refresh-it");
	assert_eq!(outcome.raw["expires_in"], 3600);
	assert_eq!(outcome.subject, SUBJECT);
	assert_eq!(outcome.claims.issuer(), Some("http://esia.gosuslugi.ru/"));
	assert_eq!(outcome.resources, vec![json!({ "firstName": "Ivan", "lastName": "Ivanov" })]);
	assert!(!format!("{outcome:?}").contains(&token));
}

#[tokio::test]
async fn exchange_code_keeps_request_order_when_responses_finish_out_of_order() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_config(&server.base_url()));
	let token = access_token();
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(token_body(&token));
		})
		.await;
	let contacts_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/rs/prns/1000299654/ctts");
			// Answers after `/addrs`, so results complete in reverse order.
			then.status(200)
				.delay(StdDuration::from_millis(400))
				.header("content-type", "application/json")
				.body("{\"elements\":[\"ctts/1\"]}");
		})
		.await;
	let addresses_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/rs/prns/1000299654/addrs");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"elements\":[\"addrs/7\"]}");
		})
		.await;
	let outcome = client
		.exchange_code("valid-code", DataPaths::list(["/ctts", "/addrs"]))
		.await
		.expect("Exchange should succeed.");

	token_mock.assert_async().await;
	contacts_mock.assert_async().await;
	addresses_mock.assert_async().await;

	assert_eq!(
		outcome.resources,
		vec![json!({ "elements": ["ctts/1"] }), json!({ "elements": ["addrs/7"] })]
	);
}

#[tokio::test]
async fn exchange_code_skips_resources_when_requested() {
	let http = RecordingHttpClient::default().route(
		Method::POST,
		TOKEN_PATH,
		200,
		token_body(&access_token()),
	);
	let outcome = recording_client(&http)
		.exchange_code("valid-code", DataPaths::Skip)
		.await
		.expect("Exchange should succeed.");

	assert!(outcome.resources.is_empty());
	assert_eq!(http.calls(), 1);

	let outcome = recording_client(&http)
		.exchange_code("valid-code", DataPaths::List(Vec::new()))
		.await
		.expect("Exchange with an empty list should succeed.");

	assert!(outcome.resources.is_empty());
	assert_eq!(http.calls(), 2);
}

#[tokio::test]
async fn token_request_carries_signed_form_fields() {
	let http = RecordingHttpClient::default().route(
		Method::POST,
		TOKEN_PATH,
		200,
		token_body(&access_token()),
	);
	let client = recording_client(&http);
	let authorization = client.start_authorization().expect("Authorization URL should build.");

	client.exchange_code("auth-code", DataPaths::Skip).await.expect("Exchange should succeed.");

	let requests = http.requests();

	assert_eq!(requests.len(), 1);

	let request = &requests[0];

	assert_eq!(request.method, Method::POST);
	assert_eq!(request.url.as_str(), "https://esia.example/aas/oauth2/te");
	assert_eq!(request.header("content-type"), Some("application/x-www-form-urlencoded"));

	let pairs = request.form_pairs();
	let keys = pairs.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>();
	let field = |name: &str| {
		pairs
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.clone())
			.expect("Form field should be present.")
	};

	assert_eq!(
		keys,
		[
			"client_id",
			"code",
			"grant_type",
			"client_secret",
			"state",
			"redirect_uri",
			"scope",
			"timestamp",
			"token_type",
		]
	);
	assert_eq!(field("client_id"), TEST_CLIENT_ID);
	assert_eq!(field("code"), "auth-code");
	assert_eq!(field("grant_type"), "authorization_code");
	assert_eq!(field("redirect_uri"), TEST_REDIRECT_URI);
	assert_eq!(field("scope"), TEST_SCOPE);
	assert_eq!(field("token_type"), "Bearer");
	assert!(!field("client_secret").is_empty());
	assert_ne!(field("state"), authorization.params.state);
}

#[tokio::test]
async fn missing_code_fails_without_network_calls() {
	let http = RecordingHttpClient::default();
	let err = recording_client(&http)
		.exchange_code("", DataPaths::default())
		.await
		.expect_err("An empty authorization code should be rejected.");

	assert!(matches!(err, Error::Validation(ValidationError::MissingAuthorizationCode)));
	assert_eq!(http.calls(), 0);
}

#[tokio::test]
async fn token_endpoint_failure_is_wrapped() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_config(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"ESIA-007014\"}");
		})
		.await;
	let err = client
		.exchange_code("stale-code", DataPaths::default())
		.await
		.expect_err("Rejected codes should fail the exchange.");

	mock.assert_async().await;

	assert!(
		err.to_string()
			.starts_with("Failed to exchange the authorization code for an access token: ")
	);
	assert!(err.to_string().contains("invalid_grant"));

	match err {
		Error::Exchange { source } => match *source {
			Error::Transient(TransientError::Endpoint { endpoint, status, .. }) => {
				assert_eq!(endpoint, Endpoint::Token);
				assert_eq!(status, Some(400));
			},
			other => panic!("Unexpected exchange source: {other:?}."),
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn resource_failure_fails_whole_exchange() {
	let token = access_token();
	let http = RecordingHttpClient::default()
		.route(Method::POST, TOKEN_PATH, 200, token_body(&token))
		.route(Method::GET, "/rs/prns/1000299654/ctts", 200, "{\"elements\":[]}")
		.route(Method::GET, "/rs/prns/1000299654/docs", 500, "{\"code\":\"ESIA-000000\"}");
	let err = recording_client(&http)
		.exchange_code("valid-code", DataPaths::list(["/ctts", "/docs"]))
		.await
		.expect_err("A failing resource should fail the exchange.");

	match err {
		Error::Exchange { source } => assert!(matches!(
			*source,
			Error::Transient(TransientError::Endpoint {
				endpoint: Endpoint::Resource,
				status: Some(500),
				..
			})
		)),
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn echoed_state_must_match() {
	let mut body: Value = serde_json::from_str(&token_body(&access_token()))
		.expect("Token body fixture should be JSON.");

	body["state"] = json!("not-the-sent-state");

	let http =
		RecordingHttpClient::default().route(Method::POST, TOKEN_PATH, 200, body.to_string());
	let err = recording_client(&http)
		.exchange_code("valid-code", DataPaths::default())
		.await
		.expect_err("A mismatched state should fail the exchange.");

	assert_eq!(http.calls(), 1);

	match err {
		Error::Exchange { source } => {
			assert!(matches!(*source, Error::Token(TokenError::StateMismatch)))
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn token_without_subject_claim_is_rejected() {
	let token = test_access_token(&json!({ "iss": "http://esia.gosuslugi.ru/" }));
	let http =
		RecordingHttpClient::default().route(Method::POST, TOKEN_PATH, 200, token_body(&token));
	let err = recording_client(&http)
		.exchange_code("valid-code", DataPaths::default())
		.await
		.expect_err("Tokens without a subject should fail the exchange.");

	match err {
		Error::Exchange { source } => assert!(matches!(
			*source,
			Error::Token(TokenError::MissingSubject { ref claim }) if claim == "urn:esia:sbj_id"
		)),
		other => panic!("Unexpected error: {other:?}."),
	}
	assert_eq!(http.calls(), 1);
}
