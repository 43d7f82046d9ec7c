//! Client configuration, assembled once at process entry and passed into every flow.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::ServiceIdentity,
	endpoint::{ApiEndpoints, DEFAULT_BASE_URI},
	error::ConfigError,
	http::ReqwestHttpClient,
};

/// Scope requested by the token exchange unless overridden.
pub const DEFAULT_SCOPE: &str = "api";
/// Request timeout applied by the default transport.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Immutable configuration consumed by [`TokenIssuer`](crate::flows::TokenIssuer) and
/// [`ApiClient`](crate::flows::ApiClient).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Calling service's identity and signing key.
	pub identity: ServiceIdentity,
	/// Token and resource endpoints.
	pub endpoints: ApiEndpoints,
	/// Scope sent with the token request.
	pub scope: String,
	/// Per-request timeout for the default transport; `None` waits indefinitely.
	pub timeout: Option<StdDuration>,
}
impl ClientConfig {
	/// Creates a new builder for the provided identity.
	pub fn builder(identity: ServiceIdentity) -> ClientConfigBuilder {
		ClientConfigBuilder::new(identity)
	}

	/// Builds the default reqwest transport honoring [`ClientConfig::timeout`].
	pub fn http_client(&self) -> Result<ReqwestHttpClient, ConfigError> {
		ReqwestHttpClient::with_timeout(self.timeout)
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	identity: ServiceIdentity,
	base_uri: Option<Url>,
	scope: String,
	timeout: Option<StdDuration>,
}
impl ClientConfigBuilder {
	/// Creates a builder targeting [`DEFAULT_BASE_URI`] with [`DEFAULT_SCOPE`] and
	/// [`DEFAULT_TIMEOUT`].
	pub fn new(identity: ServiceIdentity) -> Self {
		Self {
			identity,
			base_uri: None,
			scope: DEFAULT_SCOPE.into(),
			timeout: Some(DEFAULT_TIMEOUT),
		}
	}

	/// Overrides the base API URI.
	pub fn base_uri(mut self, url: Url) -> Self {
		self.base_uri = Some(url);

		self
	}

	/// Overrides the scope sent with the token request.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Overrides the request timeout.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Lets requests wait for as long as the transport allows.
	pub fn no_timeout(mut self) -> Self {
		self.timeout = None;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let base = match self.base_uri {
			Some(url) => url,
			None => Url::parse(DEFAULT_BASE_URI)?,
		};

		validate_base_uri(&base)?;

		if self.scope.trim().is_empty() {
			return Err(ConfigError::EmptyScope);
		}

		Ok(ClientConfig {
			identity: self.identity,
			endpoints: ApiEndpoints::new(base)?,
			scope: self.scope,
			timeout: self.timeout,
		})
	}
}

// Plain HTTP is only acceptable when the traffic never leaves the machine.
fn validate_base_uri(url: &Url) -> Result<(), ConfigError> {
	let loopback = match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
		Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
		None => false,
	};

	match url.scheme() {
		"https" => Ok(()),
		"http" if loopback => Ok(()),
		_ => Err(ConfigError::InsecureBaseUri { url: url.to_string() }),
	}
}
