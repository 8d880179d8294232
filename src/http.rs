//! Transport primitives for backend calls.
//!
//! The module exposes [`ApiTransport`] alongside the crate-owned [`ApiRequest`] and
//! [`ApiResponse`] types so downstream crates can plug in custom HTTP stacks (or scripted
//! fakes) without the client depending on them. The default implementation,
//! [`ReqwestTransport`], is enabled by the `reqwest` feature.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`ApiTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing backend calls.
///
/// The trait is the client's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so a single transport can be shared across clones of the client,
/// and they must report every HTTP response (including 4xx/5xx) as `Ok`; only failures that
/// produced no response at all are `Err`.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the backend's response.
	fn send(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// HTTP methods used against the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// Header map keyed by lowercase header names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);
impl Headers {
	/// Inserts or replaces a header; the name is stored lowercase.
	pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
		self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
	}

	/// Looks up a header by case-insensitive name.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Returns `true` when the header is present.
	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Iterates over `(name, value)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}
}
impl<K, V> FromIterator<(K, V)> for Headers
where
	K: AsRef<str>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut headers = Self::default();

		for (name, value) in iter {
			headers.insert(name, value);
		}

		headers
	}
}

/// Fully resolved outbound request.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL.
	pub url: Url,
	/// Request headers, including `Authorization` once signed.
	pub headers: Headers,
	/// Encoded body, if any.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a request without headers or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: Headers::default(), body: None }
	}

	/// Returns the bearer token attached to the request, if any.
	pub fn bearer_token(&self) -> Option<&str> {
		self.headers.get("authorization")?.strip_prefix("Bearer ")
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("authorized", &self.headers.contains("authorization"))
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.finish()
	}
}

/// Response returned by an [`ApiTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: Headers,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response with the given status and body.
	pub fn new(status: u16, body: Vec<u8>) -> Self {
		Self { status, headers: Headers::default(), body }
	}

	/// Adds a response header.
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` for `204 No Content`.
	pub fn is_no_content(&self) -> bool {
		self.status == 204
	}

	/// Returns `true` for `401 Unauthorized`.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Retry-After hint expressed as a relative duration.
	pub fn retry_after(&self) -> Option<Duration> {
		parse_retry_after(self.headers.get("retry-after")?)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// No timeout is configured by default; use [`ReqwestTransport::with_timeout`] or pass a
/// preconfigured client to [`ReqwestTransport::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests fail once `timeout` elapses.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ConfigError> {
		Ok(Self(ReqwestClient::builder().timeout(timeout).build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let ApiRequest { method, url, headers, body } = request;
			let mut builder = client.request(method.into(), url);

			for (name, value) in headers.iter() {
				builder = builder.header(name, value);
			}
			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let mut collected = Headers::default();

			for (name, value) in response.headers() {
				if let Ok(text) = value.to_str() {
					collected.insert(name.as_str(), text);
				}
			}

			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, headers: collected, body })
		})
	}
}

fn parse_retry_after(raw: &str) -> Option<Duration> {
	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
