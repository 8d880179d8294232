//! Backend descriptor data structures and URL helpers shared by all flows.

/// Builder API for assembling backend descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError, resource::ResourcePath};

/// Prefix under which the backend's router resources live.
pub const DEFAULT_API_PREFIX: &str = "/api/api";
/// Password login endpoint.
pub const DEFAULT_TOKEN_PATH: &str = "/api/auth/token/";
/// Access-token refresh endpoint.
pub const DEFAULT_REFRESH_PATH: &str = "/api/auth/token/refresh/";
/// Location logout handlers are told to redirect to.
pub const DEFAULT_LOGIN_ENTRY: &str = "/paginas/login/login.html";

/// How concurrent calls that hit a 401 coordinate their refreshes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
	#[default]
	/// Every rejected call refreshes on its own; concurrent refreshes are not de-duplicated.
	Independent,
	/// Refreshes are serialized; a call whose rejected token was already replaced by another
	/// call's refresh reuses the stored token instead of refreshing again.
	Shared,
}

/// Auth endpoint paths, relative to the base URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEndpoints {
	/// Password login endpoint.
	#[serde(default = "default_token_path")]
	pub token: String,
	/// Access-token refresh endpoint.
	#[serde(default = "default_refresh_path")]
	pub refresh: String,
}
impl Default for AuthEndpoints {
	fn default() -> Self {
		Self { token: default_token_path(), refresh: default_refresh_path() }
	}
}

/// Immutable, validated backend descriptor consumed by flows.
///
/// Deserializing a descriptor runs the same validation as [`BackendDescriptorBuilder::build`],
/// so configuration files can only produce usable descriptors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BackendDescriptorBuilder")]
pub struct BackendDescriptor {
	/// Scheme, host, port, and optional mount path of the backend.
	pub base_url: Url,
	/// Normalized API prefix (leading slash, no trailing slash; empty for the root).
	pub api_prefix: String,
	/// Auth endpoint paths.
	pub endpoints: AuthEndpoints,
	/// Login entry point handed to logout handlers.
	pub login_entry: String,
	/// Refresh coordination policy.
	pub refresh_policy: RefreshPolicy,
}
impl BackendDescriptor {
	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> BackendDescriptorBuilder {
		BackendDescriptorBuilder::new(base_url)
	}

	/// Absolute URL of a resource under the API prefix.
	pub fn resource_url(&self, resource: &ResourcePath) -> Result<Url, ConfigError> {
		self.join(&format!("{}/{}", self.api_prefix, resource.as_str()))
	}

	/// Absolute URL of the password login endpoint.
	pub fn token_url(&self) -> Result<Url, ConfigError> {
		self.join(&self.endpoints.token)
	}

	/// Absolute URL of the refresh endpoint.
	pub fn refresh_url(&self) -> Result<Url, ConfigError> {
		self.join(&self.endpoints.refresh)
	}

	fn join(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');

		Url::parse(&format!("{base}{path}"))
			.map_err(|source| ConfigError::InvalidUrl { path: path.to_owned(), source })
	}
}

fn default_api_prefix() -> String {
	DEFAULT_API_PREFIX.into()
}

fn default_token_path() -> String {
	DEFAULT_TOKEN_PATH.into()
}

fn default_refresh_path() -> String {
	DEFAULT_REFRESH_PATH.into()
}

fn default_login_entry() -> String {
	DEFAULT_LOGIN_ENTRY.into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn descriptor(base: &str) -> BackendDescriptor {
		BackendDescriptor::builder(Url::parse(base).expect("Fixture base URL should parse."))
			.build()
			.expect("Fixture descriptor should build.")
	}

	#[test]
	fn resource_urls_live_under_the_api_prefix() {
		let descriptor = descriptor("http://127.0.0.1:8000");
		let path = ResourcePath::new("/productos/").expect("Fixture path should be valid.");

		assert_eq!(
			descriptor.resource_url(&path).expect("Resource URL should build.").as_str(),
			"http://127.0.0.1:8000/api/api/productos/"
		);
		assert_eq!(
			descriptor.refresh_url().expect("Refresh URL should build.").as_str(),
			"http://127.0.0.1:8000/api/auth/token/refresh/"
		);
	}

	#[test]
	fn mount_paths_on_the_base_url_are_kept() {
		let descriptor = descriptor("https://example.com/inventario/");
		let path = ResourcePath::new("marcas/3/").expect("Fixture path should be valid.");

		assert_eq!(
			descriptor.resource_url(&path).expect("Resource URL should build.").as_str(),
			"https://example.com/inventario/api/api/marcas/3/"
		);
		assert_eq!(
			descriptor.token_url().expect("Token URL should build.").as_str(),
			"https://example.com/inventario/api/auth/token/"
		);
	}

	#[test]
	fn query_strings_survive_joining() {
		let descriptor = descriptor("http://localhost:8000");
		let path =
			ResourcePath::new("productos/?search=notebook").expect("Fixture path should be valid.");

		assert_eq!(
			descriptor.resource_url(&path).expect("Resource URL should build.").query(),
			Some("search=notebook")
		);
	}
}
