#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use inventory_client::{
	_preludet::*,
	ext::LogoutReason,
	flows::RequestOptions,
	http::Method,
};

#[tokio::test]
async fn login_then_authenticated_call_then_logout() {
	let server = MockServer::start_async().await;
	let (client, store, signal) = build_reqwest_test_client(&server.base_url());
	let login = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/auth/token/")
				.json_body(serde_json::json!({ "username": "bodega", "password": "secreto" }));
			then.status(200).header("content-type", "application/json").body(
				"{\"access\":\"access-1\",\"refresh\":\"refresh-1\",\"user\":{\"id\":7,\"username\":\"bodega\",\"is_staff\":1}}",
			);
		})
		.await;
	let state = client.login("bodega", "secreto").await.expect("Login should succeed.");

	login.assert_async().await;

	assert!(state.is_authenticated());
	assert!(state.is_staff());
	assert_eq!(store.snapshot(), state);

	let states = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/api/estados/").header("authorization", "Bearer access-1");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"id\":1,\"nombre\":\"Disponible\"}]");
		})
		.await;

	client
		.request("estados/", Method::Get, None, RequestOptions::default())
		.await
		.expect("Authenticated call should succeed.");
	states.assert_async().await;
	client.logout().await.expect("Logout should succeed.");

	assert!(client.session().await.expect("Session should load.").is_empty());
	assert_eq!(signal.last().map(|event| event.reason), Some(LogoutReason::UserRequested));
}

#[tokio::test]
async fn rejected_login_keeps_store_empty() {
	let server = MockServer::start_async().await;
	let (client, store, signal) = build_reqwest_test_client(&server.base_url());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/token/");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"No active account found with the given credentials\"}");
		})
		.await;

	let err = client.login("bodega", "incorrecta").await.expect_err("Login should fail.");

	assert!(matches!(
		err,
		Error::RequestFailed { status: 401, ref detail, .. }
			if detail == "No active account found with the given credentials"
	));
	assert!(store.snapshot().is_empty());
	assert_eq!(signal.count(), 0);
}
