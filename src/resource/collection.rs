//! CRUD handle over one router collection.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::ApiClient,
	http::ApiTransport,
	resource::ResourcePath,
};

/// CRUD operations over one collection, routed through the authenticated client.
///
/// Every call inherits the client's bearer attachment and one-shot refresh.
pub struct Collection<T>
where
	T: ?Sized + ApiTransport,
{
	client: ApiClient<T>,
	path: ResourcePath,
}
impl<T> Collection<T>
where
	T: ?Sized + ApiTransport,
{
	/// Collection path relative to the API prefix.
	pub fn path(&self) -> &ResourcePath {
		&self.path
	}

	/// Lists every item, accepting bare arrays and paginated pages.
	pub async fn list<R>(&self) -> Result<Vec<R>>
	where
		R: DeserializeOwned,
	{
		self.client.list(self.path.as_str()).await
	}

	/// Fetches one item.
	pub async fn retrieve<R>(&self, id: impl Display) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.client.get(self.item(id)?.as_str()).await
	}

	/// Creates an item.
	pub async fn create<B, R>(&self, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.client.post(self.path.as_str(), body).await
	}

	/// Replaces an item (`PUT`).
	pub async fn update<B, R>(&self, id: impl Display, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.client.put(self.item(id)?.as_str(), body).await
	}

	/// Updates some fields of an item (`PATCH`).
	pub async fn partial_update<B, R>(&self, id: impl Display, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.client.patch(self.item(id)?.as_str(), body).await
	}

	/// Deletes an item.
	pub async fn destroy(&self, id: impl Display) -> Result<()> {
		self.client.delete(self.item(id)?.as_str()).await
	}

	fn item(&self, id: impl Display) -> Result<ResourcePath> {
		self.path.item(id).map_err(|err| ConfigError::from(err).into())
	}
}
impl<T> Clone for Collection<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self { client: self.client.clone(), path: self.path.clone() }
	}
}
impl<T> Debug for Collection<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Collection").field("path", &self.path).finish()
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Returns a CRUD handle for `path`.
	pub fn collection(&self, path: impl Into<ResourcePath>) -> Collection<T> {
		Collection { client: self.clone(), path: path.into() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use crate::{
		_preludet::*,
		auth::{SessionState, TokenSecret},
		http::Method,
		resource::Resource,
		store::SessionStore,
	};

	#[derive(Debug, PartialEq, Eq, Deserialize)]
	struct Brand {
		id: u32,
		nombre: String,
	}

	#[tokio::test]
	async fn crud_calls_hit_item_paths() {
		let transport = Arc::new(ScriptedTransport::new([
			ScriptedReply::json(200, "{\"results\":[{\"id\":1,\"nombre\":\"Lenovo\"}]}"),
			ScriptedReply::json(200, "{\"id\":1,\"nombre\":\"Lenovo\"}"),
			ScriptedReply::json(200, "{\"id\":1,\"nombre\":\"HP\"}"),
			ScriptedReply::empty(204),
		]));
		let (client, store, _signal) = build_scripted_client(transport.clone());

		store
			.save(SessionState::new(TokenSecret::new("a1"), None))
			.await
			.expect("Seeding the store should succeed.");

		let brands = client.collection(Resource::Brands);
		let listed: Vec<Brand> = brands.list().await.expect("List should succeed.");
		let one: Brand = brands.retrieve(1).await.expect("Retrieve should succeed.");
		let patched: Brand = brands
			.partial_update(1, &serde_json::json!({ "nombre": "HP" }))
			.await
			.expect("Patch should succeed.");

		brands.destroy(1).await.expect("Destroy should succeed.");

		let requests = transport.requests();

		assert_eq!(listed, vec![Brand { id: 1, nombre: "Lenovo".into() }]);
		assert_eq!(one.nombre, "Lenovo");
		assert_eq!(patched.nombre, "HP");
		assert_eq!(requests[0].url.path(), "/api/api/marcas/");
		assert_eq!(requests[1].url.path(), "/api/api/marcas/1/");
		assert_eq!(requests[2].method, Method::Patch);
		assert_eq!(requests[3].method, Method::Delete);
		assert!(requests.iter().all(|request| request.bearer_token() == Some("a1")));
	}
}
