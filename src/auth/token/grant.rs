//! Request and response bodies for the token and refresh endpoints.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Body posted to the token endpoint when signing in.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
	/// Account username.
	pub username: String,
	/// Account password; never logged.
	pub password: TokenSecret,
}
impl LoginRequest {
	/// Creates a new login body.
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self { username: username.into(), password: TokenSecret::new(password) }
	}
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Token endpoint response: `{access, refresh, user?}`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TokenGrant {
	/// Newly minted access token.
	#[serde(default)]
	pub access: Option<TokenSecret>,
	/// Newly minted refresh token.
	#[serde(default)]
	pub refresh: Option<TokenSecret>,
	/// Optional user attributes attached by the backend.
	#[serde(default)]
	pub user: Option<Value>,
}

/// Body posted to the refresh endpoint.
#[derive(Clone, Serialize)]
pub struct RefreshRequest<'a> {
	/// Stored refresh token.
	pub refresh: &'a str,
}

/// Refresh endpoint response: `{access}`, with `refresh` present only when the backend rotates
/// refresh tokens.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RefreshGrant {
	/// Replacement access token.
	#[serde(default)]
	pub access: Option<TokenSecret>,
	/// Replacement refresh token, if rotation is enabled.
	#[serde(default)]
	pub refresh: Option<TokenSecret>,
}
impl RefreshGrant {
	/// Returns the access token when it is present and non-empty.
	pub fn usable_access(&self) -> Option<&TokenSecret> {
		self.access.as_ref().filter(|secret| !secret.expose().is_empty())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn login_request_serializes_password_but_redacts_debug() {
		let body = LoginRequest::new("bodega", "hunter2");
		let json = serde_json::to_value(&body).expect("Login body should serialize.");

		assert_eq!(json, serde_json::json!({ "username": "bodega", "password": "hunter2" }));
		assert!(!format!("{body:?}").contains("hunter2"));
	}

	#[test]
	fn refresh_grant_rejects_empty_access() {
		let grant: RefreshGrant =
			serde_json::from_str("{\"access\":\"\"}").expect("Grant should deserialize.");

		assert!(grant.usable_access().is_none());

		let grant: RefreshGrant =
			serde_json::from_str("{\"access\":\"newtok\"}").expect("Grant should deserialize.");

		assert_eq!(grant.usable_access().map(TokenSecret::expose), Some("newtok"));
		assert!(grant.refresh.is_none());
	}
}
