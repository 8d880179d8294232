//! Async client for the inventory REST backend: bearer attachment, one-shot JWT refresh with a
//! single retry, pluggable session stores, and transport-aware observability.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod backend;
pub mod error;
pub mod ext;
pub mod flows;
pub mod http;
pub mod obs;
pub mod resource;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	// std
	use std::collections::VecDeque;
	// self
	pub use crate::_prelude::*;
	use crate::{
		backend::BackendDescriptor,
		error::TransportError,
		ext::{LogoutHandler, LogoutSignal},
		flows::ApiClient,
		http::{ApiRequest, ApiResponse, ApiTransport, TransportFuture},
		store::{MemoryStore, SessionStore},
	};
	#[cfg(feature = "reqwest")] use crate::{flows::ReqwestApiClient, http::ReqwestTransport};

	/// Reply queued on a [`ScriptedTransport`].
	#[derive(Clone, Debug)]
	pub enum ScriptedReply {
		/// Respond with the given HTTP response.
		Response(ApiResponse),
		/// Fail at the transport layer with the given message.
		NetworkFailure(String),
	}
	impl ScriptedReply {
		/// JSON reply with the provided status and body.
		pub fn json(status: u16, body: &str) -> Self {
			Self::Response(ApiResponse::new(status, body.as_bytes().to_vec()).with_header(
				"content-type",
				"application/json",
			))
		}

		/// Reply with an empty body.
		pub fn empty(status: u16) -> Self {
			Self::Response(ApiResponse::new(status, Vec::new()))
		}
	}

	/// Transport error raised by [`ScriptedTransport`].
	#[derive(Debug)]
	pub struct ScriptedFailure(pub String);
	impl Display for ScriptedFailure {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			write!(f, "Scripted transport failure: {}.", self.0)
		}
	}
	impl StdError for ScriptedFailure {}

	/// In-process transport that replays queued replies and records every request it receives.
	#[derive(Debug, Default)]
	pub struct ScriptedTransport {
		replies: Mutex<VecDeque<ScriptedReply>>,
		requests: Mutex<Vec<ApiRequest>>,
	}
	impl ScriptedTransport {
		/// Creates a transport that answers requests with `replies`, in order.
		pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
			Self { replies: Mutex::new(replies.into_iter().collect()), requests: Default::default() }
		}

		/// Appends another reply to the script.
		pub fn push(&self, reply: ScriptedReply) {
			self.replies.lock().push_back(reply);
		}

		/// Returns every request dispatched so far.
		pub fn requests(&self) -> Vec<ApiRequest> {
			self.requests.lock().clone()
		}

		/// Returns the number of requests dispatched so far.
		pub fn call_count(&self) -> usize {
			self.requests.lock().len()
		}
	}
	impl ApiTransport for ScriptedTransport {
		fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
			self.requests.lock().push(request);

			let reply = self.replies.lock().pop_front();

			Box::pin(async move {
				match reply {
					Some(ScriptedReply::Response(response)) => Ok(response),
					Some(ScriptedReply::NetworkFailure(message)) =>
						Err(TransportError::network(ScriptedFailure(message))),
					None => Err(TransportError::network(ScriptedFailure("script exhausted".into()))),
				}
			})
		}
	}

	/// Builds a descriptor rooted at `base_url` with default paths.
	pub fn test_descriptor(base_url: &str) -> BackendDescriptor {
		BackendDescriptor::builder(
			Url::parse(base_url).expect("Test base URL should parse successfully."),
		)
		.build()
		.expect("Test backend descriptor should build successfully.")
	}

	/// Constructs an [`ApiClient`] over `transport` with an in-memory store and a recording logout
	/// handler.
	pub fn build_scripted_client(
		transport: Arc<ScriptedTransport>,
	) -> (ApiClient<ScriptedTransport>, Arc<MemoryStore>, Arc<LogoutSignal>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let signal = Arc::new(LogoutSignal::default());
		let handler: Arc<dyn LogoutHandler> = signal.clone();
		let client = ApiClient::with_transport(
			store,
			test_descriptor("http://inventory.test"),
			transport,
		)
		.with_logout_handler(handler);

		(client, store_backend, signal)
	}

	/// Constructs a reqwest-backed [`ApiClient`] pointed at `base_url` (usually an `httpmock`
	/// server) with an in-memory store and a recording logout handler.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_client(
		base_url: &str,
	) -> (ReqwestApiClient, Arc<MemoryStore>, Arc<LogoutSignal>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let signal = Arc::new(LogoutSignal::default());
		let handler: Arc<dyn LogoutHandler> = signal.clone();
		let client =
			ApiClient::with_transport(store, test_descriptor(base_url), ReqwestTransport::default())
				.with_logout_handler(handler);

		(client, store_backend, signal)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
