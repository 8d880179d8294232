// self
use crate::{_prelude::*, auth::TokenSecret, ext::LogoutReason, obs::FlowKind, store::StoreError};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by client flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("inventory_client.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event for one send of a logical call.
///
/// Tokens are identified by fingerprint only.
pub fn trace_attempt(phase: &'static str, status: u16, token: Option<&TokenSecret>) {
	#[cfg(feature = "tracing")]
	{
		let token = token.map(TokenSecret::fingerprint);

		tracing::debug!(phase, status, token = token.as_deref(), "Backend answered.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (phase, status, token);
	}
}

/// Emits an info event once a refresh stored a new access token.
pub fn trace_refresh(access: &TokenSecret, rotated_refresh: bool) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(
			token = %access.fingerprint(),
			rotated_refresh,
			"Access token refreshed."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (access, rotated_refresh);
	}
}

/// Emits a warning for a logout the client forced on the user.
///
/// `store_error` carries the failure to clear the session store, which never replaces the
/// error returned to the caller.
pub fn trace_forced_logout(reason: LogoutReason, store_error: Option<&StoreError>) {
	#[cfg(feature = "tracing")]
	{
		match store_error {
			Some(error) => tracing::warn!(
				reason = reason.as_str(),
				error = %error,
				"Session ended but the store could not be cleared."
			),
			None => tracing::warn!(reason = reason.as_str(), "Session ended."),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (reason, store_error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn event_helpers_noop_without_tracing() {
		let error = StoreError::Backend { message: "disk full".into() };

		trace_forced_logout(LogoutReason::SessionExpired, Some(&error));
		trace_forced_logout(LogoutReason::Unauthenticated, None);
		trace_attempt("initial", 401, Some(&TokenSecret::new("a1")));
		trace_refresh(&TokenSecret::new("a2"), false);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::Refresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
