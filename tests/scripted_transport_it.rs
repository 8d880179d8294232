// self
use inventory_client::{
	_preludet::*,
	auth::{SessionState, TokenSecret},
	error::RefreshError,
	ext::LogoutReason,
	flows::RequestOptions,
	http::Method,
	store::SessionStore,
};

async fn seeded_client(
	replies: impl IntoIterator<Item = ScriptedReply>,
	access: &str,
	refresh: Option<&str>,
) -> (
	Arc<ScriptedTransport>,
	inventory_client::flows::ApiClient<ScriptedTransport>,
	Arc<inventory_client::store::MemoryStore>,
	Arc<inventory_client::ext::LogoutSignal>,
) {
	let transport = Arc::new(ScriptedTransport::new(replies));
	let (client, store, signal) = build_scripted_client(transport.clone());

	store
		.save(SessionState::new(TokenSecret::new(access), refresh.map(TokenSecret::new)))
		.await
		.expect("Failed to seed the session store.");

	(transport, client, store, signal)
}

#[tokio::test]
async fn refresh_retry_makes_exactly_three_calls() {
	let (transport, client, _store, signal) = seeded_client(
		[
			ScriptedReply::empty(401),
			ScriptedReply::json(200, "{\"access\":\"a2\"}"),
			ScriptedReply::json(200, "[1,2,3]"),
		],
		"a1",
		Some("r1"),
	)
	.await;
	let value = client
		.request("productos/", Method::Get, None, RequestOptions::default())
		.await
		.expect("Retried call should succeed.");

	assert_eq!(value, Some(serde_json::json!([1, 2, 3])));
	assert_eq!(transport.call_count(), 3);
	assert_eq!(signal.count(), 0);
}

#[tokio::test]
async fn refresh_network_failure_expires_session() {
	let (transport, client, store, signal) = seeded_client(
		[ScriptedReply::empty(401), ScriptedReply::NetworkFailure("connection reset".into())],
		"a1",
		Some("r1"),
	)
	.await;
	let err = client
		.request("productos/", Method::Get, None, RequestOptions::default())
		.await
		.expect_err("Refresh network failure should end the session.");

	assert!(matches!(err, Error::SessionExpired { cause: RefreshError::Transport(_) }));
	assert_eq!(transport.call_count(), 2);
	assert!(store.snapshot().is_empty());
	assert_eq!(signal.last().map(|event| event.reason), Some(LogoutReason::SessionExpired));
}

#[tokio::test]
async fn missing_refresh_token_expires_without_refresh_call() {
	let (transport, client, store, signal) =
		seeded_client([ScriptedReply::empty(401)], "a1", None).await;
	let err = client
		.request("productos/", Method::Get, None, RequestOptions::default())
		.await
		.expect_err("Missing refresh token should end the session.");

	assert!(matches!(err, Error::SessionExpired { cause: RefreshError::MissingRefreshToken }));
	assert_eq!(transport.call_count(), 1);
	assert!(store.snapshot().is_empty());
	assert_eq!(signal.count(), 1);
}

#[tokio::test]
async fn repeated_unauthenticated_calls_are_idempotent() {
	let transport = Arc::new(ScriptedTransport::default());
	let (client, store, signal) = build_scripted_client(transport.clone());

	for _ in 0..2 {
		let err = client
			.request("productos/", Method::Get, None, RequestOptions::default())
			.await
			.expect_err("Call without a session should fail.");

		assert!(matches!(err, Error::Unauthenticated));
	}

	assert_eq!(transport.call_count(), 0);
	assert!(store.snapshot().is_empty());
	assert!(signal.events().iter().all(|event| event.reason == LogoutReason::Unauthenticated));
}

#[tokio::test]
async fn client_errors_do_not_touch_the_session() {
	let (transport, client, store, signal) = seeded_client(
		[ScriptedReply::json(403, "{\"detail\":\"You do not have permission to perform this action.\"}")],
		"a1",
		Some("r1"),
	)
	.await;
	let err = client
		.request("logs-acceso/", Method::Get, None, RequestOptions::default())
		.await
		.expect_err("Forbidden call should fail.");

	assert_eq!(err.status(), Some(403));
	assert_eq!(transport.call_count(), 1);
	assert!(store.snapshot().is_authenticated());
	assert_eq!(signal.count(), 0);
}

#[tokio::test]
async fn identical_calls_are_independent() {
	let body = "{\"id\":1,\"nombre\":\"Bodega Central\"}";
	let (transport, client, store, _signal) = seeded_client(
		[ScriptedReply::json(200, body), ScriptedReply::json(200, body)],
		"a1",
		Some("r1"),
	)
	.await;
	let before = store.snapshot();
	let first = client
		.request("sucursales/1/", Method::Get, None, RequestOptions::default())
		.await
		.expect("First call should succeed.");
	let second = client
		.request("sucursales/1/", Method::Get, None, RequestOptions::default())
		.await
		.expect("Second call should succeed.");

	assert_eq!(first, Some(serde_json::json!({ "id": 1, "nombre": "Bodega Central" })));
	assert_eq!(first, second);
	assert_eq!(transport.requests()[0], transport.requests()[1]);
	assert_eq!(store.snapshot(), before);
}
