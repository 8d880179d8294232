//! Credential exchange, voluntary logout, and forced session teardown.

// self
use crate::{
	_prelude::*,
	auth::{LoginRequest, SessionProfile, SessionState, TokenGrant},
	ext::LogoutReason,
	flows::{ApiClient, PendingRequest, RequestBody, RequestOptions, common},
	http::{ApiTransport, Method},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::StoreError,
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Exchanges `username` and `password` for a credential pair and stores the new session.
	///
	/// Any previous session is replaced. A rejected login leaves the store untouched and
	/// surfaces the backend's detail, or `Login failed.` when the body carries none.
	pub async fn login(&self, username: &str, password: &str) -> Result<SessionState> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let body = RequestBody::json(&LoginRequest::new(username, password))?;
				let pending = PendingRequest::new(
					Method::Post,
					self.descriptor.token_url()?,
					Some(body),
					RequestOptions::default().skip_auth(),
				)?;
				let response = self.transport.send(pending.to_api_request(None)).await?;

				obs::trace_attempt("login", response.status, None);

				if !response.is_success() {
					return Err(common::request_failed(self.strategy.as_ref(), &response, || {
						"Login failed.".into()
					}));
				}

				let grant = common::decode_json::<TokenGrant>(&response.body)
					.map_err(|source| Error::Decode { source, status: response.status })?;
				let Some(access) = grant.access.filter(|secret| !secret.expose().is_empty()) else {
					return Err(Error::RequestFailed {
						status: response.status,
						detail: "Login response did not contain an access token.".into(),
						body: None,
						retry_after: None,
					});
				};
				let refresh = grant.refresh.filter(|secret| !secret.expose().is_empty());
				let state = SessionState::new(access, refresh)
					.with_profile(SessionProfile::from_login(username, grant.user));

				self.store.save(state.clone()).await?;

				Ok(state)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Ends the session at the user's request.
	///
	/// The logout handler is notified even when the store cannot be cleared; the storage
	/// failure is then returned.
	pub async fn logout(&self) -> Result<()> {
		match self.end_session(LogoutReason::UserRequested).await {
			Some(err) => Err(err.into()),
			None => Ok(()),
		}
	}

	/// Returns a snapshot of the stored session.
	pub async fn session(&self) -> Result<SessionState> {
		Ok(self.store.load().await?)
	}

	/// Clears the store and notifies the logout handler.
	///
	/// Returns the store failure, if any, so callers decide whether it matters. Forced logouts
	/// only log it.
	pub(crate) async fn end_session(&self, reason: LogoutReason) -> Option<StoreError> {
		const KIND: FlowKind = FlowKind::Logout;

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let cleared = self.store.clear().await.err();

		if reason.is_forced() {
			obs::trace_forced_logout(reason, cleared.as_ref());
		}

		obs::record_logout(reason);
		self.logout.on_logout(reason, &self.descriptor.login_entry);

		match cleared {
			Some(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
			None => obs::record_flow_outcome(KIND, FlowOutcome::Success),
		}

		cleared
	}
}
