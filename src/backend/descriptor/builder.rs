// self
use crate::{
	_prelude::*,
	backend::{
		AuthEndpoints, BackendDescriptor, RefreshPolicy,
		descriptor::{default_api_prefix, default_login_entry},
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum BackendDescriptorError {
	/// Only HTTP(S) backends are reachable.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// URLs such as `mailto:` cannot carry paths.
	#[error("Base URL cannot be used as a base: {url}.")]
	NotABase {
		/// Base URL that failed validation.
		url: String,
	},
	/// Query strings and fragments would be lost when joining paths.
	#[error("Base URL must not carry a query or fragment: {url}.")]
	QueryOrFragment {
		/// Base URL that failed validation.
		url: String,
	},
	/// A configured path is not a plain absolute path.
	#[error("The {field} path is invalid: {value:?}.")]
	InvalidPath {
		/// Which path failed validation.
		field: &'static str,
		/// Path value that failed validation.
		value: String,
	},
	/// Logout handlers need somewhere to send the user.
	#[error("Login entry point cannot be empty.")]
	EmptyLoginEntry,
}

/// Builder for [`BackendDescriptor`] values.
#[derive(Debug, Deserialize)]
pub struct BackendDescriptorBuilder {
	/// Scheme, host, port, and optional mount path of the backend.
	pub base_url: Url,
	/// Prefix under which router resources live.
	#[serde(default = "default_api_prefix")]
	pub api_prefix: String,
	/// Auth endpoint paths.
	#[serde(default)]
	pub endpoints: AuthEndpoints,
	/// Login entry point handed to logout handlers.
	#[serde(default = "default_login_entry")]
	pub login_entry: String,
	/// Refresh coordination policy.
	#[serde(default)]
	pub refresh_policy: RefreshPolicy,
}
impl BackendDescriptorBuilder {
	/// Creates a new builder seeded with the provided base URL and default paths.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			api_prefix: default_api_prefix(),
			endpoints: AuthEndpoints::default(),
			login_entry: default_login_entry(),
			refresh_policy: RefreshPolicy::default(),
		}
	}

	/// Sets the API prefix (for example `/api/api`).
	pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.api_prefix = prefix.into();

		self
	}

	/// Sets the password login endpoint path.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.token = path.into();

		self
	}

	/// Sets the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.endpoints.refresh = path.into();

		self
	}

	/// Sets the login entry point handed to logout handlers.
	pub fn login_entry(mut self, entry: impl Into<String>) -> Self {
		self.login_entry = entry.into();

		self
	}

	/// Overrides the refresh coordination policy.
	pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
		self.refresh_policy = policy;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<BackendDescriptor, BackendDescriptorError> {
		validate_base_url(&self.base_url)?;

		let api_prefix = normalize_prefix(&self.api_prefix)?;
		let endpoints = AuthEndpoints {
			token: normalize_path("token", &self.endpoints.token)?,
			refresh: normalize_path("refresh", &self.endpoints.refresh)?,
		};
		let login_entry = self.login_entry.trim();

		if login_entry.is_empty() {
			return Err(BackendDescriptorError::EmptyLoginEntry);
		}

		Ok(BackendDescriptor {
			base_url: self.base_url,
			api_prefix,
			endpoints,
			login_entry: login_entry.to_owned(),
			refresh_policy: self.refresh_policy,
		})
	}
}
impl TryFrom<BackendDescriptorBuilder> for BackendDescriptor {
	type Error = BackendDescriptorError;

	fn try_from(builder: BackendDescriptorBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

fn validate_base_url(url: &Url) -> Result<(), BackendDescriptorError> {
	if !matches!(url.scheme(), "http" | "https") {
		return Err(BackendDescriptorError::UnsupportedScheme { url: url.to_string() });
	}
	if url.cannot_be_a_base() {
		return Err(BackendDescriptorError::NotABase { url: url.to_string() });
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(BackendDescriptorError::QueryOrFragment { url: url.to_string() });
	}

	Ok(())
}

fn normalize_prefix(raw: &str) -> Result<String, BackendDescriptorError> {
	let trimmed = raw.trim().trim_end_matches('/');

	if trimmed.is_empty() {
		return Ok(String::new());
	}

	normalize_path("api_prefix", trimmed)
}

fn normalize_path(field: &'static str, raw: &str) -> Result<String, BackendDescriptorError> {
	let trimmed = raw.trim();
	let invalid = || BackendDescriptorError::InvalidPath { field, value: raw.to_owned() };

	if trimmed.is_empty() || trimmed == "/" {
		return Err(invalid());
	}
	if trimmed.contains("://") || trimmed.chars().any(char::is_whitespace) {
		return Err(invalid());
	}
	if trimmed.split('/').any(|segment| segment == "..") {
		return Err(invalid());
	}

	if trimmed.starts_with('/') { Ok(trimmed.to_owned()) } else { Ok(format!("/{trimmed}")) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn paths_gain_a_leading_slash() {
		assert_eq!(normalize_path("token", "api/auth/token/"), Ok("/api/auth/token/".into()));
		assert_eq!(normalize_prefix("/api/api/"), Ok("/api/api".into()));
		assert_eq!(normalize_prefix("/"), Ok(String::new()));
	}

	#[test]
	fn suspicious_paths_are_rejected() {
		assert!(normalize_path("token", "https://evil.test/token").is_err());
		assert!(normalize_path("token", "/api/../admin/").is_err());
		assert!(normalize_path("refresh", "/api/auth token/").is_err());
		assert!(normalize_path("refresh", "  ").is_err());
	}
}
