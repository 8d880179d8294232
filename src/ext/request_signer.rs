//! Request signing contracts that attach the session's access token to outbound requests.

// std
use std::convert::Infallible;
// self
use crate::{_prelude::*, auth::TokenSecret, http::ApiRequest};

/// Describes how to attach an access token to an outbound request without constraining the
/// HTTP client type.
pub trait RequestSignerExt<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the provided request and injects authorization state derived from `token`.
	fn attach_token(&self, request: Request, token: &TokenSecret) -> Result<Request, Error>;
}

/// Adds `Authorization: Bearer <token>`, replacing any authorization header already present.
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerSigner;
impl RequestSignerExt<ApiRequest, Infallible> for BearerSigner {
	fn attach_token(
		&self,
		mut request: ApiRequest,
		token: &TokenSecret,
	) -> Result<ApiRequest, Infallible> {
		request.headers.insert("authorization", token.bearer());

		Ok(request)
	}
}
#[cfg(feature = "reqwest")]
impl RequestSignerExt<reqwest::RequestBuilder, Infallible> for BearerSigner {
	fn attach_token(
		&self,
		request: reqwest::RequestBuilder,
		token: &TokenSecret,
	) -> Result<reqwest::RequestBuilder, Infallible> {
		Ok(request.bearer_auth(token.expose()))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::Method;

	#[test]
	fn bearer_signer_replaces_existing_authorization() {
		let mut request = ApiRequest::new(
			Method::Get,
			Url::parse("http://inventory.test/api/api/marcas/").expect("Fixture URL should parse."),
		);

		request.headers.insert("Authorization", "Basic stale");

		let Ok(signed) = BearerSigner.attach_token(request, &TokenSecret::new("fresh"));

		assert_eq!(signed.bearer_token(), Some("fresh"));
	}
}
