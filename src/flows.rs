//! Flow orchestrators built on the [`ApiClient`] facade.

pub mod common;
pub mod refresh;
pub mod request;
pub mod session;

pub use common::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	backend::{BackendDescriptor, BackendStrategy, DefaultBackendStrategy},
	ext::{LogoutHandler, LogoutSignal},
	http::ApiTransport,
	store::SessionStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Authenticated client for the inventory backend.
///
/// The client owns the transport, session store, backend descriptor, error-detail strategy, and
/// logout handler so individual flows only carry their own logic. Clones share every component through [`Arc`], so a
/// token rotated by one clone is visible to all of them.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Transport used for every outbound call.
	pub transport: Arc<T>,
	/// Store holding the session credential pair.
	pub store: Arc<dyn SessionStore>,
	/// Backend descriptor that defines endpoints and the refresh policy.
	pub descriptor: BackendDescriptor,
	/// Strategy that extracts error details from non-success bodies.
	pub strategy: Arc<dyn BackendStrategy>,
	/// Hook notified whenever the session ends.
	pub logout: Arc<dyn LogoutHandler>,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	///
	/// The client starts with [`DefaultBackendStrategy`] and a fresh [`LogoutSignal`]; replace
	/// them with [`ApiClient::with_strategy`] and [`ApiClient::with_logout_handler`].
	pub fn with_transport(
		store: Arc<dyn SessionStore>,
		descriptor: BackendDescriptor,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			descriptor,
			strategy: Arc::new(DefaultBackendStrategy),
			logout: Arc::new(LogoutSignal::default()),
			refresh_metrics: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Replaces the error-detail strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn BackendStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Replaces the logout handler.
	pub fn with_logout_handler(mut self, handler: Arc<dyn LogoutHandler>) -> Self {
		self.logout = handler;

		self
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client backed by a default reqwest transport.
	///
	/// Use [`ApiClient::with_transport`] with [`ReqwestTransport::with_client`] to supply a
	/// client configured with timeouts or custom TLS roots.
	pub fn new(store: Arc<dyn SessionStore>, descriptor: BackendDescriptor) -> Self {
		Self::with_transport(store, descriptor, ReqwestTransport::default())
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			descriptor: self.descriptor.clone(),
			strategy: self.strategy.clone(),
			logout: self.logout.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("descriptor", &self.descriptor)
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}
