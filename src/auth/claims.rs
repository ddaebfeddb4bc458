//! Unverified decoding of access-token claims.
//!
//! The client trusts the token because it was just received from the provider over TLS;
//! claims are only read to learn the subject identifier, never used to make trust decisions.

// crates.io
use base64::{
	Engine as _, alphabet,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, error::TokenError};

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
	&alphabet::URL_SAFE,
	GeneralPurposeConfig::new()
		.with_encode_padding(false)
		.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims carried in the payload segment of an access token.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessTokenClaims(pub Map<String, Value>);
impl AccessTokenClaims {
	/// Decodes the payload of a `header.payload.signature` token without verifying it.
	pub fn decode(token: &str) -> Result<Self, TokenError> {
		let segments = token.split('.').collect::<Vec<_>>();

		if segments.len() != 3 {
			return Err(TokenError::Malformed { reason: "expected three dot-separated segments" });
		}

		let payload = segments[1];

		if payload.is_empty() {
			return Err(TokenError::Malformed { reason: "payload segment is empty" });
		}

		let bytes = URL_SAFE_LENIENT.decode(payload)?;

		Ok(Self(serde_json::from_slice(&bytes)?))
	}

	/// Returns a raw claim value.
	pub fn get(&self, claim: &str) -> Option<&Value> {
		self.0.get(claim)
	}

	/// Reads the subject identifier from `claim`; string and numeric values are accepted.
	pub fn subject(&self, claim: &str) -> Result<String, TokenError> {
		match self.get(claim) {
			Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
			Some(Value::Number(value)) => Ok(value.to_string()),
			_ => Err(TokenError::MissingSubject { claim: claim.to_owned() }),
		}
	}

	/// Token issuer (`iss`), if present.
	pub fn issuer(&self) -> Option<&str> {
		self.get("iss").and_then(Value::as_str)
	}

	/// Expiry instant (`exp`), if present and representable.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		let exp = self.get("exp").and_then(Value::as_i64)?;

		OffsetDateTime::from_unix_timestamp(exp).ok()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
	// self
	use super::*;

	fn token(payload: &Value) -> String {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
		let payload = URL_SAFE_NO_PAD.encode(payload.to_string());

		format!("{header}.{payload}.c2lnbmF0dXJl")
	}

	#[test]
	fn decodes_numeric_and_string_subjects() {
		let claims = AccessTokenClaims::decode(&token(&serde_json::json!({
			"urn:esia:sbj_id": 1000299654,
			"iss": "http://esia.gosuslugi.ru/",
			"exp": 1433286062
		})))
		.expect("Token payload should decode.");

		assert_eq!(claims.subject("urn:esia:sbj_id").expect("Subject should exist."), "1000299654");
		assert_eq!(claims.issuer(), Some("http://esia.gosuslugi.ru/"));
		assert_eq!(
			claims.expires_at().map(OffsetDateTime::unix_timestamp),
			Some(1433286062)
		);

		let claims = AccessTokenClaims::decode(&token(&serde_json::json!({ "sub": "abc-42" })))
			.expect("Token payload should decode.");

		assert_eq!(claims.subject("sub").expect("Subject should exist."), "abc-42");
	}

	#[test]
	fn accepts_padded_payloads() {
		let payload = URL_SAFE.encode(br#"{"sub":"padded"}"#);
		let claims = AccessTokenClaims::decode(&format!("e30.{payload}.sig"))
			.expect("Padded payload should decode.");

		assert_eq!(claims.subject("sub").expect("Subject should exist."), "padded");
	}

	#[test]
	fn rejects_malformed_tokens() {
		assert!(matches!(
			AccessTokenClaims::decode("opaque-token"),
			Err(TokenError::Malformed { .. })
		));
		assert!(matches!(AccessTokenClaims::decode("a..c"), Err(TokenError::Malformed { .. })));
		assert!(matches!(
			AccessTokenClaims::decode("a.@@@.c"),
			Err(TokenError::PayloadEncoding(_))
		));

		let not_json = URL_SAFE_NO_PAD.encode("plain text");

		assert!(matches!(
			AccessTokenClaims::decode(&format!("a.{not_json}.c")),
			Err(TokenError::PayloadJson(_))
		));
	}

	#[test]
	fn missing_or_empty_subject_is_reported() {
		let claims = AccessTokenClaims::decode(&token(&serde_json::json!({ "urn:esia:sbj_id": "" })))
			.expect("Token payload should decode.");
		let err = claims.subject("urn:esia:sbj_id").expect_err("Empty subject must fail.");

		assert!(matches!(err, TokenError::MissingSubject { claim } if claim == "urn:esia:sbj_id"));
		assert!(claims.subject("sub").is_err());
	}
}
