//! Backend strategy hooks that turn error responses into caller-facing detail.
//!
//! Implementations work on crate-owned data (status code, parsed JSON, body preview) so they
//! stay decoupled from any HTTP client.

// self
use crate::_prelude::*;

/// Strategy hook that extracts a human-readable detail from non-success responses.
///
/// Implementors are required to be `Send + Sync`. Returning `None` makes flows fall back to
/// `HTTP error <status>`.
pub trait BackendStrategy: Send + Sync {
	/// Produces the detail surfaced in [`Error::RequestFailed`](crate::error::Error::RequestFailed).
	fn error_detail(&self, ctx: &ErrorContext) -> Option<String>;
}

/// Context passed to backend strategies when describing an error response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorContext {
	/// HTTP status code returned by the backend.
	pub http_status: u16,
	/// Parsed error body, when it was valid JSON.
	pub json_body: Option<Value>,
	/// Preview of the response body for non-JSON payloads.
	pub body_preview: Option<String>,
}
impl ErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a new context for the provided status.
	pub fn new(http_status: u16) -> Self {
		Self { http_status, json_body: None, body_preview: None }
	}

	/// Builds a context from a raw response body, parsing JSON when possible.
	pub fn from_body(http_status: u16, body: &[u8]) -> Self {
		let ctx = Self::new(http_status);

		if body.is_empty() {
			return ctx;
		}

		match serde_json::from_slice::<Value>(body) {
			Ok(json) => ctx.with_json_body(json),
			Err(_) => ctx.with_body_preview(String::from_utf8_lossy(body)),
		}
	}

	/// Adds the parsed JSON body.
	pub fn with_json_body(mut self, body: Value) -> Self {
		self.json_body = Some(body);

		self
	}

	/// Adds a body preview for responses that are not JSON.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}
}

/// Default strategy following Django REST Framework conventions.
///
/// It prefers the `detail` field, then `non_field_errors`, then the compact JSON body
/// (field-level validation errors). Non-JSON bodies produce no detail.
#[derive(Debug, Default)]
pub struct DefaultBackendStrategy;
impl Display for DefaultBackendStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-backend-strategy")
	}
}
impl BackendStrategy for DefaultBackendStrategy {
	fn error_detail(&self, ctx: &ErrorContext) -> Option<String> {
		let body = ctx.json_body.as_ref()?;

		if let Some(detail) = body.get("detail") {
			return Some(match detail {
				Value::String(text) => text.clone(),
				other => other.to_string(),
			});
		}
		if let Some(joined) = body.get("non_field_errors").and_then(join_messages) {
			return Some(joined);
		}

		Some(body.to_string())
	}
}

fn join_messages(value: &Value) -> Option<String> {
	let messages = value.as_array()?.iter().filter_map(Value::as_str).collect::<Vec<_>>();

	if messages.is_empty() { None } else { Some(messages.join("; ")) }
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= ErrorContext::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}
