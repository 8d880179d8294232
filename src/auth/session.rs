//! Locally held session: the credential pair plus the signed-in user's profile.

// crates.io
use serde_json::Map;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Credential pair and profile persisted by a [`SessionStore`](crate::store::SessionStore).
///
/// At most one session is held at a time. Login replaces it, a refresh replaces the access
/// token, and logout (voluntary or forced) clears it entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
	/// Short-lived bearer credential.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access: Option<TokenSecret>,
	/// Longer-lived credential used solely to mint new access tokens.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh: Option<TokenSecret>,
	/// Signed-in user, when known.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub profile: Option<SessionProfile>,
}
impl SessionState {
	/// Creates a session from a freshly issued credential pair.
	pub fn new(access: TokenSecret, refresh: Option<TokenSecret>) -> Self {
		Self { access: Some(access), refresh, profile: None }
	}

	/// Attaches the signed-in user's profile.
	pub fn with_profile(mut self, profile: SessionProfile) -> Self {
		self.profile = Some(profile);

		self
	}

	/// Returns `true` when an access token is stored.
	pub fn is_authenticated(&self) -> bool {
		self.access.is_some()
	}

	/// Returns `true` when the signed-in user is flagged as staff.
	pub fn is_staff(&self) -> bool {
		self.profile.as_ref().is_some_and(|profile| profile.is_staff)
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.access.is_none() && self.refresh.is_none() && self.profile.is_none()
	}
}

/// User attributes remembered alongside the credential pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProfile {
	/// Display username.
	pub username: String,
	/// Whether the user may access staff-only screens.
	#[serde(default)]
	pub is_staff: bool,
	/// Any further attributes returned by the backend.
	#[serde(default, flatten)]
	pub attributes: Map<String, Value>,
}
impl SessionProfile {
	/// Builds a profile from the token endpoint's optional `user` object.
	///
	/// `fallback_username` is used when the backend omits `user.username`.
	pub fn from_login(fallback_username: &str, user: Option<Value>) -> Self {
		let mut attributes = match user {
			Some(Value::Object(map)) => map,
			_ => Map::new(),
		};
		let username = match attributes.remove("username") {
			Some(Value::String(name)) if !name.is_empty() => name,
			_ => fallback_username.to_owned(),
		};
		let is_staff = attributes.remove("is_staff").as_ref().is_some_and(staff_flag);

		Self { username, is_staff, attributes }
	}
}

fn staff_flag(value: &Value) -> bool {
	match value {
		Value::Bool(flag) => *flag,
		Value::Number(number) => number.as_u64() == Some(1),
		Value::String(text) => matches!(text.as_str(), "1" | "true" | "True"),
		_ => false,
	}
}
