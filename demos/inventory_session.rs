//! Demonstrates a full session against a mocked inventory backend: login, an authenticated
//! list call that transparently refreshes an expired access token, and logout.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use inventory_client::{
	backend::BackendDescriptor,
	ext::{LogoutHandler, LogoutSignal},
	flows::ApiClient,
	http::ReqwestTransport,
	resource::Resource,
	store::{MemoryStore, SessionStore},
};

#[derive(Debug, serde::Deserialize)]
struct Product {
	id: u32,
	nombre: String,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/token/");
			then.status(200).header("content-type", "application/json").body(
				"{\"access\":\"demo-access-expired\",\"refresh\":\"demo-refresh\",\"user\":{\"username\":\"bodega\",\"is_staff\":true}}",
			);
		})
		.await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/api/productos/")
				.header("authorization", "Bearer demo-access-expired");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Given token not valid for any token type\"}");
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/token/refresh/");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access\":\"demo-access-fresh\"}");
		})
		.await;
	let products_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/api/productos/")
				.header("authorization", "Bearer demo-access-fresh");
			then.status(200).header("content-type", "application/json").body(
				"{\"count\":2,\"next\":null,\"previous\":null,\"results\":[{\"id\":1,\"nombre\":\"Notebook\"},{\"id\":2,\"nombre\":\"Proyector\"}]}",
			);
		})
		.await;
	let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::default());
	let signal = Arc::new(LogoutSignal::default());
	let handler: Arc<dyn LogoutHandler> = signal.clone();
	let descriptor = BackendDescriptor::builder(Url::parse(&server.base_url())?).build()?;
	let transport = ReqwestTransport::with_timeout(Duration::from_secs(10))?;
	let client = <ApiClient<ReqwestTransport>>::with_transport(store, descriptor, transport)
		.with_logout_handler(handler);
	let session = client.login("bodega", "secreto").await?;

	println!("Signed in as staff: {}.", session.is_staff());

	let products = client.collection(Resource::Products).list::<Product>().await?;

	for product in &products {
		println!("Product {}: {}.", product.id, product.nombre);
	}

	client.logout().await?;

	if let Some(event) = signal.last() {
		println!("Logged out ({}); redirect to {}.", event.reason, event.login_entry);
	}

	login_mock.assert_async().await;
	expired_mock.assert_async().await;
	refresh_mock.assert_async().await;
	products_mock.assert_async().await;

	Ok(())
}
