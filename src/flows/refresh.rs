//! Refresh token exchange with an optional shared guard and rotation persistence.
//!
//! [`ApiClient::refresh_access_token`] posts the stored refresh token to the backend's refresh
//! endpoint, stores the returned access token, and persists a replacement refresh token when
//! the backend rotates them. Under [`RefreshPolicy::Shared`] concurrent callers serialize on one
//! guard and skip the exchange once another caller has already replaced the rejected token.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{RefreshGrant, RefreshRequest, TokenSecret},
	backend::{ErrorContext, RefreshPolicy},
	error::RefreshError,
	ext::LogoutReason,
	flows::{ApiClient, PendingRequest, RequestBody, RequestOptions, common},
	http::{ApiTransport, Method},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::RotationOutcome,
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Exchanges the stored refresh token for a new access token.
	///
	/// Failure ends the session the same way a failed refresh inside a request does: the store
	/// is cleared, the logout handler is notified, and [`Error::SessionExpired`] is returned.
	pub async fn refresh_access_token(&self) -> Result<TokenSecret> {
		match self.exchange_refresh().await {
			Ok(access) => Ok(access),
			Err(cause) => Err(self.expire_session(cause).await),
		}
	}

	/// Refreshes after the backend rejected `rejected`, honoring the descriptor's policy.
	///
	/// An empty store means another call already ended the session, so no exchange is made.
	pub(crate) async fn refresh_after_rejection(
		&self,
		rejected: &TokenSecret,
	) -> Result<(), RefreshError> {
		let policy = self.descriptor.refresh_policy;
		let _singleflight = match policy {
			RefreshPolicy::Independent => None,
			RefreshPolicy::Shared => Some(self.refresh_guard.lock().await),
		};
		let Some(current) = self.store.load().await?.access else {
			return Err(RefreshError::SessionCleared);
		};

		if policy == RefreshPolicy::Shared && &current != rejected {
			return Ok(());
		}

		self.exchange_refresh().await.map(|_| ())
	}

	/// Maps a failed refresh to [`Error::SessionExpired`], ending the session unless another
	/// call already cleared it.
	pub(crate) async fn expire_session(&self, cause: RefreshError) -> Error {
		if !matches!(cause, RefreshError::SessionCleared) {
			self.end_session(LogoutReason::SessionExpired).await;
		}

		Error::SessionExpired { cause }
	}

	async fn exchange_refresh(&self) -> Result<TokenSecret, RefreshError> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "exchange_refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span.instrument(self.exchange_refresh_inner()).await;

		match &result {
			Ok(_) => {
				self.refresh_metrics.record_success();
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
			},
			Err(_) => {
				self.refresh_metrics.record_failure();
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}

	async fn exchange_refresh_inner(&self) -> Result<TokenSecret, RefreshError> {
		let refresh = self.store.load().await?.refresh.ok_or(RefreshError::MissingRefreshToken)?;
		let body = RequestBody::json(&RefreshRequest { refresh: refresh.expose() })?;
		let pending = PendingRequest::new(
			Method::Post,
			self.descriptor.refresh_url()?,
			Some(body),
			RequestOptions::default().skip_auth(),
		)?;
		let response = self.transport.send(pending.to_api_request(None)).await?;

		obs::trace_attempt("refresh", response.status, None);

		if !response.is_success() {
			let ctx = ErrorContext::from_body(response.status, &response.body);
			let detail = self
				.strategy
				.error_detail(&ctx)
				.unwrap_or_else(|| format!("HTTP error {}", response.status));

			return Err(RefreshError::Rejected { status: response.status, detail });
		}

		let grant = common::decode_json::<RefreshGrant>(&response.body)
			.map_err(RefreshError::MalformedResponse)?;
		let access = grant.usable_access().cloned().ok_or(RefreshError::MissingAccessToken)?;
		let rotated = grant.refresh.filter(|secret| !secret.expose().is_empty());
		let rotating = rotated.is_some();

		match self.store.rotate_access(refresh.expose(), access.clone(), rotated).await? {
			RotationOutcome::Updated => {
				obs::trace_refresh(&access, rotating);

				Ok(access)
			},
			// Another call already stored a newer session; hand that one to the retry.
			RotationOutcome::RefreshMismatch =>
				self.store.load().await?.access.ok_or(RefreshError::SessionCleared),
			RotationOutcome::Missing => Err(RefreshError::SessionCleared),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use crate::{
		_preludet::*,
		auth::{SessionState, TokenSecret},
		backend::RefreshPolicy,
		error::{RefreshError, TransportError},
		ext::{LogoutHandler, LogoutReason, LogoutSignal},
		flows::ApiClient,
		http::{ApiRequest, ApiTransport, Method, TransportFuture},
		store::{MemoryStore, SessionStore},
	};

	/// Overwrites the session store while a refresh call is in flight, the way a concurrent
	/// logout (empty `replacement`) or login would.
	struct InterferingTransport {
		inner: ScriptedTransport,
		store: Arc<MemoryStore>,
		replacement: SessionState,
	}
	impl InterferingTransport {
		fn client(self: &Arc<Self>) -> (ApiClient<InterferingTransport>, Arc<LogoutSignal>) {
			let store: Arc<dyn SessionStore> = self.store.clone();
			let signal = Arc::new(LogoutSignal::default());
			let handler: Arc<dyn LogoutHandler> = signal.clone();
			let client = ApiClient::with_transport(
				store,
				test_descriptor("http://inventory.test"),
				self.clone(),
			)
			.with_logout_handler(handler);

			(client, signal)
		}
	}
	impl ApiTransport for InterferingTransport {
		fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
			Box::pin(async move {
				if request.url.path().ends_with("/token/refresh/") {
					if self.replacement.is_empty() {
						self.store.clear().await.map_err(TransportError::network)?;
					} else {
						self.store
							.save(self.replacement.clone())
							.await
							.map_err(TransportError::network)?;
					}
				}

				self.inner.send(request).await
			})
		}
	}

	#[tokio::test]
	async fn rotation_is_persisted() {
		let transport = Arc::new(ScriptedTransport::new([ScriptedReply::json(
			200,
			"{\"access\":\"a2\",\"refresh\":\"r2\"}",
		)]));
		let (client, store, _signal) = build_scripted_client(transport.clone());

		store
			.save(SessionState::new(TokenSecret::new("a1"), Some(TokenSecret::new("r1"))))
			.await
			.expect("Seeding the store should succeed.");

		let access = client.refresh_access_token().await.expect("Refresh should succeed.");
		let body: Value = serde_json::from_slice(
			transport.requests()[0].body.as_deref().expect("Refresh should post a body."),
		)
		.expect("Refresh body should be JSON.");
		let snapshot = store.snapshot();

		assert_eq!(access.expose(), "a2");
		assert_eq!(body, serde_json::json!({ "refresh": "r1" }));
		assert_eq!(snapshot.access.as_ref().map(TokenSecret::expose), Some("a2"));
		assert_eq!(snapshot.refresh.as_ref().map(TokenSecret::expose), Some("r2"));
	}

	#[tokio::test]
	async fn missing_refresh_token_skips_the_network() {
		let transport = Arc::new(ScriptedTransport::default());
		let (client, store, signal) = build_scripted_client(transport.clone());

		store
			.save(SessionState::new(TokenSecret::new("a1"), None))
			.await
			.expect("Seeding the store should succeed.");

		let err = client.refresh_access_token().await.expect_err("Refresh should fail.");

		assert!(matches!(err, Error::SessionExpired { cause: RefreshError::MissingRefreshToken }));
		assert_eq!(transport.call_count(), 0);
		assert_eq!(signal.last().map(|event| event.reason), Some(LogoutReason::SessionExpired));
	}

	#[tokio::test]
	async fn empty_access_is_a_failure() {
		let transport =
			Arc::new(ScriptedTransport::new([ScriptedReply::json(200, "{\"access\":\"\"}")]));
		let (client, store, _signal) = build_scripted_client(transport);

		store
			.save(SessionState::new(TokenSecret::new("a1"), Some(TokenSecret::new("r1"))))
			.await
			.expect("Seeding the store should succeed.");

		let err = client.refresh_access_token().await.expect_err("Refresh should fail.");

		assert!(matches!(err, Error::SessionExpired { cause: RefreshError::MissingAccessToken }));
		assert!(store.snapshot().is_empty());
	}

	#[tokio::test]
	async fn malformed_refresh_body_is_reported() {
		let transport = Arc::new(ScriptedTransport::new([ScriptedReply::json(200, "<html>")]));
		let (client, store, _signal) = build_scripted_client(transport);

		store
			.save(SessionState::new(TokenSecret::new("a1"), Some(TokenSecret::new("r1"))))
			.await
			.expect("Seeding the store should succeed.");

		let err = client.refresh_access_token().await.expect_err("Refresh should fail.");

		assert!(matches!(err, Error::SessionExpired { cause: RefreshError::MalformedResponse(_) }));
	}

	#[tokio::test]
	async fn logout_during_refresh_is_not_undone() {
		let store = Arc::new(MemoryStore::with_state(SessionState::new(
			TokenSecret::new("a1"),
			Some(TokenSecret::new("r1")),
		)));
		let transport = Arc::new(InterferingTransport {
			inner: ScriptedTransport::new([
				ScriptedReply::empty(401),
				ScriptedReply::json(200, "{\"access\":\"a2\",\"refresh\":\"r2\"}"),
			]),
			store: store.clone(),
			replacement: SessionState::default(),
		});
		let (client, signal) = transport.client();
		let err = client
			.request("marcas/", Method::Get, None, Default::default())
			.await
			.expect_err("Request should fail once the session is gone.");

		assert!(matches!(err, Error::SessionExpired { cause: RefreshError::SessionCleared }));
		assert!(store.snapshot().is_empty());
		assert_eq!(signal.count(), 0);
		assert_eq!(transport.inner.call_count(), 2);
	}

	#[tokio::test]
	async fn rotation_defers_to_a_newer_session() {
		let store = Arc::new(MemoryStore::with_state(SessionState::new(
			TokenSecret::new("a1"),
			Some(TokenSecret::new("r1")),
		)));
		let transport = Arc::new(InterferingTransport {
			inner: ScriptedTransport::new([ScriptedReply::json(
				200,
				"{\"access\":\"a2\",\"refresh\":\"r2\"}",
			)]),
			store: store.clone(),
			replacement: SessionState::new(TokenSecret::new("b1"), Some(TokenSecret::new("s1"))),
		});
		let (client, signal) = transport.client();
		let access = client.refresh_access_token().await.expect("Refresh should succeed.");
		let snapshot = store.snapshot();

		assert_eq!(access.expose(), "b1");
		assert_eq!(snapshot.access.as_ref().map(TokenSecret::expose), Some("b1"));
		assert_eq!(snapshot.refresh.as_ref().map(TokenSecret::expose), Some("s1"));
		assert_eq!(signal.count(), 0);
	}

	#[tokio::test]
	async fn shared_waiter_on_an_empty_store_skips_the_exchange() {
		let transport = Arc::new(ScriptedTransport::default());
		let (mut client, _store, signal) = build_scripted_client(transport.clone());

		client.descriptor.refresh_policy = RefreshPolicy::Shared;

		let err = client
			.refresh_after_rejection(&TokenSecret::new("a1"))
			.await
			.expect_err("Refresh should report the cleared session.");

		assert!(matches!(err, RefreshError::SessionCleared));
		assert_eq!(transport.call_count(), 0);
		assert_eq!(client.refresh_metrics.attempts(), 0);
		assert_eq!(signal.count(), 0);
	}
}
