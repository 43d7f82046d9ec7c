//! JWT-bearer client-credentials exchange.
//!
//! Every call builds a fresh [`Assertion`], signs it with the service account's key, and posts it
//! to the token endpoint. Nothing is cached and nothing is retried: a signing failure returns
//! before any request is sent, and transport or status failures are logged and returned as-is.

// crates.io
use oauth2::{
	HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{
		AccessToken, Assertion, JWT_BEARER_ASSERTION_TYPE, ServiceIdentity, SignedAssertion,
		token::TokenResponse,
	},
	config::{ClientConfig, DEFAULT_SCOPE},
	endpoint::ApiEndpoints,
	error::{ConfigError, RequestError},
	flows,
	http::{self, HttpTransport},
	obs::{self, FlowKind},
};

/// `grant_type` sent with every token request.
pub const GRANT_TYPE: &str = "client_credentials";

/// Exchanges signed client assertions for bearer access tokens.
pub struct TokenIssuer<C>
where
	C: ?Sized + HttpTransport,
{
	http_client: Arc<C>,
	endpoints: ApiEndpoints,
	scope: String,
}
impl<C> TokenIssuer<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates an issuer requesting [`DEFAULT_SCOPE`] from `endpoints`' token endpoint.
	pub fn new(http_client: impl Into<Arc<C>>, endpoints: ApiEndpoints) -> Self {
		Self { http_client: http_client.into(), endpoints, scope: DEFAULT_SCOPE.into() }
	}

	/// Creates an issuer from a validated [`ClientConfig`].
	pub fn from_config(config: &ClientConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self::new(http_client, config.endpoints.clone()).with_scope(config.scope.clone())
	}

	/// Overrides the scope sent with the token request.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Endpoints the issuer talks to.
	pub fn endpoints(&self) -> &ApiEndpoints {
		&self.endpoints
	}

	/// Signs a fresh assertion for `identity` and exchanges it for an access token.
	pub async fn fetch_access_token(&self, identity: &ServiceIdentity) -> Result<AccessToken> {
		obs::observe(FlowKind::TokenExchange, "fetch_access_token", self.exchange(identity)).await
	}

	async fn exchange(&self, identity: &ServiceIdentity) -> Result<AccessToken> {
		let assertion = Assertion::new(
			identity.service_account(),
			self.endpoints.token(),
			OffsetDateTime::now_utc(),
		);
		let signed = assertion.sign(identity.private_key()).map_err(|e| {
			tracing::error!(
				error = ?e,
				key_fingerprint = %identity.private_key().fingerprint(),
				"Error signing JWT; check the private key."
			);

			Error::from(e)
		})?;
		let request = self
			.token_request(&signed)
			.map_err(|source| token_request_failed(RequestError::Build { source }))?;

		tracing::debug!(
			endpoint = %self.endpoints.token(),
			jti = %assertion.jti,
			"Requesting an access token."
		);

		let response = http::execute(self.http_client.as_ref(), request)
			.await
			.map_err(|e| token_request_failed(e.into()))?;
		let status = response.status();

		if !status.is_success() {
			return Err(token_request_failed(RequestError::Status {
				status: status.as_u16(),
				body: http::body_text(&response),
			}));
		}

		let body = flows::decode_json::<TokenResponse>(&response).map_err(token_request_failed)?;

		tracing::debug!(
			token_type = ?body.token_type,
			expires_in = ?body.expires_in,
			"Token endpoint accepted the assertion."
		);

		body.into_access_token().ok_or_else(|| {
			tracing::debug!("Token endpoint response carried no access_token.");

			Error::MissingAccessToken
		})
	}

	fn token_request(&self, assertion: &SignedAssertion) -> Result<HttpRequest, ConfigError> {
		let body = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("scope", &self.scope)
			.append_pair("grant_type", GRANT_TYPE)
			.append_pair("client_assertion_type", JWT_BEARER_ASSERTION_TYPE)
			.append_pair("client_assertion", assertion.expose())
			.finish();

		Ok(Request::builder()
			.method(Method::POST)
			.uri(self.endpoints.token().as_str())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.body(body.into_bytes())?)
	}
}
impl<C> Debug for TokenIssuer<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer")
			.field("token_endpoint", &self.endpoints.token().as_str())
			.field("scope", &self.scope)
			.finish()
	}
}

fn token_request_failed(source: RequestError) -> Error {
	tracing::error!(error = ?source, status = ?source.status(), "Token request failed.");

	Error::TokenRequest(source)
}
