//! Authenticated GET requests against the REST API.

// crates.io
use oauth2::{
	HttpRequest,
	http::{
		Method, Request, StatusCode,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::ClientConfig,
	endpoint::ApiEndpoints,
	error::{ConfigError, RequestError},
	flows,
	http::{self, HttpTransport},
	obs::{self, FlowKind},
};

/// Query parameters appended to a resource URL, in key order.
pub type QueryParams = BTreeMap<String, String>;

/// Issues bearer-authenticated GET requests and decodes their JSON bodies.
pub struct ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	http_client: Arc<C>,
	endpoints: ApiEndpoints,
}
impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client resolving resource paths against `endpoints`.
	pub fn new(http_client: impl Into<Arc<C>>, endpoints: ApiEndpoints) -> Self {
		Self { http_client: http_client.into(), endpoints }
	}

	/// Creates a client from a validated [`ClientConfig`].
	pub fn from_config(config: &ClientConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self::new(http_client, config.endpoints.clone())
	}

	/// Endpoints the client talks to.
	pub fn endpoints(&self) -> &ApiEndpoints {
		&self.endpoints
	}

	/// [`ApiClient::get_resource`] without query parameters.
	pub async fn get<T>(&self, token: &AccessToken, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.get_resource(token, path, &QueryParams::new()).await
	}

	/// Fetches `path` with `query` appended and decodes the `200 OK` body as `T`.
	///
	/// Use `serde_json::Value` for `T` to receive the whole document. Any status other than
	/// `200`, a transport failure, or a body that does not decode as `T` is logged together with
	/// the response and returned as [`Error::ResourceRequest`].
	pub async fn get_resource<T>(
		&self,
		token: &AccessToken,
		path: &str,
		query: &QueryParams,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		obs::observe(FlowKind::ResourceFetch, "get_resource", self.fetch(token, path, query)).await
	}

	async fn fetch<T>(&self, token: &AccessToken, path: &str, query: &QueryParams) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let request = self
			.resource_request(token, path, query)
			.map_err(|source| resource_request_failed(path, RequestError::Build { source }))?;

		tracing::debug!(uri = %request.uri(), "Requesting resource.");

		let response = http::execute(self.http_client.as_ref(), request)
			.await
			.map_err(|e| resource_request_failed(path, e.into()))?;
		let status = response.status();

		if status != StatusCode::OK {
			return Err(resource_request_failed(
				path,
				RequestError::Status { status: status.as_u16(), body: http::body_text(&response) },
			));
		}

		flows::decode_json(&response).map_err(|e| resource_request_failed(path, e))
	}

	fn resource_request(
		&self,
		token: &AccessToken,
		path: &str,
		query: &QueryParams,
	) -> Result<HttpRequest, ConfigError> {
		let mut url = self.endpoints.resource(path)?;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query);
		}

		Ok(Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.header(AUTHORIZATION, token.bearer())
			.header(ACCEPT, "application/json")
			.header(CONTENT_TYPE, "application/json; charset=utf-8")
			.body(Vec::new())?)
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient").field("base", &self.endpoints.base().as_str()).finish()
	}
}

fn resource_request_failed(path: &str, source: RequestError) -> Error {
	tracing::error!(
		path,
		status = ?source.status(),
		error = ?source,
		"Error when accessing the API."
	);

	Error::ResourceRequest { path: path.to_owned(), source }
}
