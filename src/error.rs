//! Client-level error types shared across flows, transports, and stores.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// No access token is stored; the session was logged out before any network call.
	#[error("No access token is stored; sign in again.")]
	Unauthenticated,
	/// The access token was rejected and the one-shot refresh failed; the session was logged out.
	#[error("Session expired; sign in again.")]
	SessionExpired {
		/// Why the refresh failed.
		#[source]
		cause: RefreshError,
	},
	/// Backend answered with a non-success status.
	#[error("Request failed with status {status}: {detail}")]
	RequestFailed {
		/// HTTP status code.
		status: u16,
		/// Backend-provided detail, or `HTTP error <status>` when none could be extracted.
		detail: String,
		/// Parsed JSON error body, when the backend sent one.
		body: Option<Value>,
		/// Retry-After hint from the backend, if supplied.
		retry_after: Option<Duration>,
	},
	/// Success response carried a body that could not be decoded.
	#[error("Backend returned a body that could not be decoded.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},

	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure that produced no response. Never retried.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl Error {
	/// Returns `true` when the error ended the local session (forced logout happened).
	pub fn ends_session(&self) -> bool {
		matches!(self, Self::Unauthenticated | Self::SessionExpired { .. })
	}

	/// HTTP status carried by the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::RequestFailed { status, .. } | Self::Decode { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Reasons a token refresh did not produce a new access token.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// No refresh token is stored.
	#[error("No refresh token is stored.")]
	MissingRefreshToken,
	/// Refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the token with status {status}: {detail}")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Backend-provided detail.
		detail: String,
	},
	/// Refresh endpoint answered successfully but without an access token.
	#[error("Refresh response did not contain an access token.")]
	MissingAccessToken,
	/// Refresh endpoint returned malformed JSON.
	#[error("Refresh endpoint returned malformed JSON.")]
	MalformedResponse(#[source] serde_path_to_error::Error<serde_json::Error>),
	/// Session was cleared by another call while the refresh was in flight.
	#[error("Session was cleared before the refreshed token could be used.")]
	SessionCleared,
	/// Network failure while calling the refresh endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Storage failure while reading or rotating the credential pair.
	#[error(transparent)]
	Storage(#[from] crate::store::StoreError),
	/// Refresh request could not be built.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Resource path is not usable under the API prefix.
	#[error("Resource path is invalid.")]
	InvalidResourcePath(#[from] crate::resource::ResourcePathError),
	/// Joining the backend base URL with a path produced an invalid URL.
	#[error("Cannot build a URL for `{path}`.")]
	InvalidUrl {
		/// Path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized to JSON.")]
	BodyEncoding(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures that produced no HTTP response.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn session_ending_errors_are_flagged() {
		assert!(Error::Unauthenticated.ends_session());
		assert!(
			Error::SessionExpired { cause: RefreshError::MissingRefreshToken }.ends_session()
		);

		let failed = Error::RequestFailed {
			status: 404,
			detail: "Not found.".into(),
			body: None,
			retry_after: None,
		};

		assert!(!failed.ends_session());
		assert_eq!(failed.status(), Some(404));
		assert_eq!(failed.to_string(), "Request failed with status 404: Not found.");
	}

	#[test]
	fn session_expired_exposes_refresh_cause() {
		let err = Error::SessionExpired {
			cause: RefreshError::Rejected { status: 401, detail: "Token is invalid".into() },
		};
		let source =
			StdError::source(&err).expect("Session expiry should expose the refresh failure.");

		assert!(source.to_string().contains("Token is invalid"));
	}

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let err: Error = store_error.clone().into();

		assert!(matches!(err, Error::Storage(_)));
		assert!(err.to_string().contains("disk unavailable"));
	}
}
