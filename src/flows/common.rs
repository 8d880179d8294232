//! Shared helpers for flow implementations (request descriptors, attempt phases, decoding).

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	backend::{BackendDescriptor, BackendStrategy, ErrorContext},
	error::ConfigError,
	ext::{BearerSigner, RequestSignerExt},
	http::{ApiRequest, ApiResponse, Headers, Method},
};

/// Outbound request body.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
	/// JSON document; sent with `Content-Type: application/json` unless the caller set one.
	Json(Value),
	/// Pre-encoded bytes (multipart, binary uploads) sent as-is with no content-type negotiation.
	Raw(Vec<u8>),
}
impl RequestBody {
	/// Serializes `value` into a JSON body.
	pub fn json(value: &impl Serialize) -> Result<Self, ConfigError> {
		serde_json::to_value(value).map(Self::Json).map_err(ConfigError::BodyEncoding)
	}
}
impl From<Value> for RequestBody {
	fn from(value: Value) -> Self {
		Self::Json(value)
	}
}
impl From<Vec<u8>> for RequestBody {
	fn from(bytes: Vec<u8>) -> Self {
		Self::Raw(bytes)
	}
}

/// Per-call options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
	/// Skips bearer attachment and the refresh path.
	pub skip_auth: bool,
	/// Caller-supplied headers added to every attempt.
	pub headers: Headers,
}
impl RequestOptions {
	/// Marks the call as anonymous.
	pub fn skip_auth(mut self) -> Self {
		self.skip_auth = true;

		self
	}

	/// Adds a caller header.
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.insert(name, value);

		self
	}
}

/// Which send of a logical call is being made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttemptPhase {
	/// First send.
	Initial,
	/// The single send that follows a successful refresh.
	Retry,
}
impl AttemptPhase {
	/// Returns a stable label suitable for span or log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AttemptPhase::Initial => "initial",
			AttemptPhase::Retry => "retry",
		}
	}
}
impl Display for AttemptPhase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Request descriptor built once per logical call and reused verbatim by the retry.
///
/// Only the bearer header differs between attempts; it is attached from the token passed to
/// [`PendingRequest::to_api_request`].
#[derive(Clone, PartialEq, Eq)]
pub struct PendingRequest {
	method: Method,
	url: Url,
	headers: Headers,
	body: Option<Vec<u8>>,
	skip_auth: bool,
}
impl PendingRequest {
	/// Resolves `url` and encodes `body` once.
	pub fn new(
		method: Method,
		url: Url,
		body: Option<RequestBody>,
		options: RequestOptions,
	) -> Result<Self, ConfigError> {
		let RequestOptions { skip_auth, mut headers } = options;
		let body = match body {
			None => None,
			Some(RequestBody::Raw(bytes)) => Some(bytes),
			Some(RequestBody::Json(value)) => {
				if !headers.contains("content-type") {
					headers.insert("content-type", "application/json");
				}

				Some(serde_json::to_vec(&value).map_err(ConfigError::BodyEncoding)?)
			},
		};

		headers.insert("accept", "application/json");

		Ok(Self { method, url, headers, body, skip_auth })
	}

	/// Builds the request for a path under the descriptor's API prefix.
	pub fn for_resource(
		descriptor: &BackendDescriptor,
		path: &str,
		method: Method,
		body: Option<RequestBody>,
		options: RequestOptions,
	) -> Result<Self, ConfigError> {
		let path = crate::resource::ResourcePath::new(path)?;

		Self::new(method, descriptor.resource_url(&path)?, body, options)
	}

	/// HTTP method.
	pub fn method(&self) -> Method {
		self.method
	}

	/// Absolute URL.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Returns `true` when attempts carry a bearer token and may trigger the refresh path.
	pub fn requires_auth(&self) -> bool {
		!self.skip_auth
	}

	/// Materializes one attempt, signed with `token` when provided.
	pub fn to_api_request(&self, token: Option<&TokenSecret>) -> ApiRequest {
		let request = ApiRequest {
			method: self.method,
			url: self.url.clone(),
			headers: self.headers.clone(),
			body: self.body.clone(),
		};

		match token {
			Some(token) => match BearerSigner.attach_token(request, token) {
				Ok(signed) => signed,
			},
			None => request,
		}
	}
}
impl Debug for PendingRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PendingRequest")
			.field("method", &self.method)
			.field("url", &self.url.as_str())
			.field("skip_auth", &self.skip_auth)
			.field("body_len", &self.body.as_ref().map(Vec::len))
			.finish()
	}
}

/// Converts a non-success response into [`Error::RequestFailed`].
///
/// `fallback` supplies the detail when the strategy finds none in the body.
pub(crate) fn request_failed(
	strategy: &dyn BackendStrategy,
	response: &ApiResponse,
	fallback: impl FnOnce() -> String,
) -> Error {
	let ctx = ErrorContext::from_body(response.status, &response.body);
	let detail = strategy.error_detail(&ctx).unwrap_or_else(fallback);

	Error::RequestFailed {
		status: response.status,
		detail,
		body: ctx.json_body,
		retry_after: response.retry_after(),
	}
}

/// Decodes a JSON body, keeping the path of the first failing field.
pub(crate) fn decode_json<R>(body: &[u8]) -> Result<R, serde_path_to_error::Error<serde_json::Error>>
where
	R: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
}
