//! Typed view of the token endpoint response.

// crates.io
use oauth2::{AccessToken, RefreshToken};
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Token endpoint response.
///
/// Well-known fields are typed (secrets are redacted from `Debug`); every other member is
/// preserved in [`extra`](Self::extra).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Bearer token used for personal data requests.
	pub access_token: AccessToken,
	/// Refresh token, issued for `access_type=offline`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<RefreshToken>,
	/// OpenID Connect identity token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id_token: Option<String>,
	/// Token type, normally `Bearer`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
	/// Lifetime of the access token in seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_in: Option<u64>,
	/// State echoed by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state: Option<String>,
	/// Remaining response members.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl TokenResponse {
	/// Computes the expiry instant relative to `issued_at`, when `expires_in` is present.
	pub fn expires_at(&self, issued_at: OffsetDateTime) -> Option<OffsetDateTime> {
		let secs = i64::try_from(self.expires_in?).ok()?;

		issued_at.checked_add(Duration::seconds(secs))
	}
}
