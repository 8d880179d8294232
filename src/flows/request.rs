//! Authenticated request flow: bearer attachment, one refresh on 401, and a single retry.
//!
//! Every logical call is split into at most two sends. The initial attempt carries the stored
//! access token; a 401 triggers exactly one refresh, and on success the call is resent once with
//! the token read back from the store. The retry's response is final, so a second 401 surfaces
//! as [`Error::RequestFailed`] instead of looping.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::RefreshError,
	ext::LogoutReason,
	flows::{ApiClient, AttemptPhase, PendingRequest, RequestBody, RequestOptions, common},
	http::{ApiResponse, ApiTransport, Method},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	resource::Listing,
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Sends a request to `path` under the API prefix and returns the parsed JSON body.
	///
	/// Returns `Ok(None)` for `204 No Content`.
	pub async fn request(
		&self,
		path: &str,
		method: Method,
		body: Option<RequestBody>,
		options: RequestOptions,
	) -> Result<Option<Value>> {
		let pending = PendingRequest::for_resource(&self.descriptor, path, method, body, options)?;

		self.execute(&pending).await
	}

	/// Same as [`ApiClient::request`] but for an already built [`PendingRequest`].
	pub async fn execute(&self, pending: &PendingRequest) -> Result<Option<Value>> {
		let response = self.dispatch(pending).await?;

		if response.is_no_content() {
			return Ok(None);
		}

		common::decode_json(&response.body)
			.map(Some)
			.map_err(|source| Error::Decode { source, status: response.status })
	}

	/// Sends a request and decodes the body into `R`.
	///
	/// Empty and `204` bodies decode as JSON `null`, so `R = ()` or `Option<_>` accept them.
	pub async fn request_json<R>(
		&self,
		path: &str,
		method: Method,
		body: Option<RequestBody>,
		options: RequestOptions,
	) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let pending = PendingRequest::for_resource(&self.descriptor, path, method, body, options)?;
		let response = self.dispatch(&pending).await?;
		let body: &[u8] =
			if response.is_no_content() || response.body.is_empty() { b"null" } else { &response.body };

		common::decode_json(body).map_err(|source| Error::Decode { source, status: response.status })
	}

	/// `GET` returning `R`.
	pub async fn get<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request_json(path, Method::Get, None, RequestOptions::default()).await
	}

	/// `POST` with a JSON body.
	pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let body = RequestBody::json(&body)?;

		self.request_json(path, Method::Post, Some(body), RequestOptions::default()).await
	}

	/// `PUT` with a JSON body.
	pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let body = RequestBody::json(&body)?;

		self.request_json(path, Method::Put, Some(body), RequestOptions::default()).await
	}

	/// `PATCH` with a JSON body.
	pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let body = RequestBody::json(&body)?;

		self.request_json(path, Method::Patch, Some(body), RequestOptions::default()).await
	}

	/// `DELETE`, discarding any response body.
	pub async fn delete(&self, path: &str) -> Result<()> {
		self.request(path, Method::Delete, None, RequestOptions::default()).await.map(|_| ())
	}

	/// `GET` on a list endpoint, accepting bare arrays and paginated pages alike.
	pub async fn list<R>(&self, path: &str) -> Result<Vec<R>>
	where
		R: DeserializeOwned,
	{
		self.get::<Listing<R>>(path).await.map(Listing::into_items)
	}

	/// Runs the two-phase flow and returns the final 2xx response.
	async fn dispatch(&self, pending: &PendingRequest) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "dispatch");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let response = self.send_with_refresh(pending).await?;

				if response.is_success() {
					Ok(response)
				} else {
					Err(common::request_failed(self.strategy.as_ref(), &response, || {
						format!("HTTP error {}", response.status)
					}))
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn send_with_refresh(&self, pending: &PendingRequest) -> Result<ApiResponse> {
		if !pending.requires_auth() {
			return self.attempt(pending, None, AttemptPhase::Initial).await;
		}

		let Some(access) = self.store.load().await?.access else {
			self.end_session(LogoutReason::Unauthenticated).await;

			return Err(Error::Unauthenticated);
		};
		let response = self.attempt(pending, Some(&access), AttemptPhase::Initial).await?;

		if !response.is_unauthorized() {
			return Ok(response);
		}
		if let Err(cause) = self.refresh_after_rejection(&access).await {
			return Err(self.expire_session(cause).await);
		}

		let Some(access) = self.store.load().await?.access else {
			return Err(Error::SessionExpired { cause: RefreshError::SessionCleared });
		};

		self.attempt(pending, Some(&access), AttemptPhase::Retry).await
	}

	async fn attempt(
		&self,
		pending: &PendingRequest,
		token: Option<&TokenSecret>,
		phase: AttemptPhase,
	) -> Result<ApiResponse> {
		let response = self.transport.send(pending.to_api_request(token)).await?;

		obs::trace_attempt(phase.as_str(), response.status, token);

		Ok(response)
	}
}
