//! Thread-safe in-memory [`SessionStore`] implementation for local tools and tests.

// self
use crate::{
	_prelude::*,
	auth::{SessionState, TokenSecret},
	store::{RotationOutcome, SessionStore, StoreFuture, apply_rotation},
};

type SessionCell = Arc<RwLock<SessionState>>;

/// Thread-safe storage backend that keeps the session in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SessionCell);
impl MemoryStore {
	/// Creates a store pre-seeded with `state`.
	pub fn with_state(state: SessionState) -> Self {
		Self(Arc::new(RwLock::new(state)))
	}

	/// Synchronous snapshot of the stored session.
	pub fn snapshot(&self) -> SessionState {
		self.0.read().clone()
	}
}
impl SessionStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, SessionState> {
		let cell = self.0.clone();

		Box::pin(async move { Ok(cell.read().clone()) })
	}

	fn save(&self, state: SessionState) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			*cell.write() = state;

			Ok(())
		})
	}

	fn rotate_access<'a>(
		&'a self,
		expected_refresh: &'a str,
		access: TokenSecret,
		refresh: Option<TokenSecret>,
	) -> StoreFuture<'a, RotationOutcome> {
		let cell = self.0.clone();

		Box::pin(async move { Ok(apply_rotation(&mut cell.write(), expected_refresh, access, refresh)) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			*cell.write() = SessionState::default();

			Ok(())
		})
	}
}
