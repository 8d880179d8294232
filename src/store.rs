//! Storage contracts and built-in store implementations for the session credential pair.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{SessionState, TokenSecret},
};

/// Boxed future returned by [`SessionStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Process-wide session storage injected into the client.
///
/// The store holds at most one [`SessionState`]. Clients read it before every authenticated
/// attempt, so a token written by one call is visible to every later attempt of every call.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Returns the stored session (empty when nothing is stored).
	fn load(&self) -> StoreFuture<'_, SessionState>;

	/// Replaces the stored session.
	fn save(&self, state: SessionState) -> StoreFuture<'_, ()>;

	/// Replaces the access token, and the refresh token when one is supplied, provided the
	/// stored refresh token still equals `expected_refresh`.
	///
	/// The profile and any refresh token not being replaced are kept. Nothing is written unless
	/// the outcome is [`RotationOutcome::Updated`].
	fn rotate_access<'a>(
		&'a self,
		expected_refresh: &'a str,
		access: TokenSecret,
		refresh: Option<TokenSecret>,
	) -> StoreFuture<'a, RotationOutcome>;

	/// Removes every piece of stored session state.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Result of a conditional access-token rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationOutcome {
	/// The refresh token matched and the session was updated.
	Updated,
	/// A session is stored but it holds a different refresh token.
	RefreshMismatch,
	/// No refresh token is stored; the session was cleared.
	Missing,
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures (e.g., serde_json) surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

pub(crate) fn apply_rotation(
	state: &mut SessionState,
	expected_refresh: &str,
	access: TokenSecret,
	refresh: Option<TokenSecret>,
) -> RotationOutcome {
	match &state.refresh {
		None => return RotationOutcome::Missing,
		Some(current) if current.expose() != expected_refresh =>
			return RotationOutcome::RefreshMismatch,
		Some(_) => {},
	}

	state.access = Some(access);

	if let Some(refresh) = refresh {
		state.refresh = Some(refresh);
	}

	RotationOutcome::Updated
}
