//! Client-level error types shared by the token exchange and the resource calls.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The client assertion could not be signed; no request was sent.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// The token endpoint could not be reached or rejected the exchange.
	#[error("Token request failed.")]
	TokenRequest(#[source] RequestError),
	/// The token endpoint answered successfully without an `access_token`.
	#[error("Token endpoint response did not include an access token.")]
	MissingAccessToken,
	/// A resource request could not be completed.
	#[error("Request for `{path}` failed.")]
	ResourceRequest {
		/// Resource path relative to the base API URI.
		path: String,
		/// Underlying request failure.
		#[source]
		source: RequestError,
	},
}

/// Configuration and validation failures raised before any request is sent.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A base URI or derived endpoint URL cannot be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The base URI would send credentials over plaintext HTTP to a remote host.
	#[error("The base URI must use HTTPS: {url}.")]
	InsecureBaseUri {
		/// Base URI that failed validation.
		url: String,
	},
	/// The token request scope is blank.
	#[error("Token request scope cannot be empty.")]
	EmptyScope,
	/// Project or service-account identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
impl From<url::ParseError> for ConfigError {
	fn from(source: url::ParseError) -> Self {
		Self::InvalidUrl { source }
	}
}

/// Failures while producing the signed client assertion.
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// The configured private key is not a PEM-encoded RSA key.
	#[error("Private key is not a valid PEM-encoded RSA key.")]
	InvalidKey {
		/// Key parsing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// The assertion could not be encoded or signed.
	#[error("Client assertion could not be signed.")]
	Encode {
		/// Encoding or signing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
}

/// A single HTTP exchange that did not produce a usable response.
#[derive(Debug, ThisError)]
pub enum RequestError {
	/// The outgoing request could not be assembled; nothing was sent.
	#[error("Request could not be built.")]
	Build {
		/// URL or header construction failure.
		#[source]
		source: ConfigError,
	},
	/// The request never produced an HTTP response.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The endpoint answered with an unexpected status code.
	#[error("Endpoint returned HTTP {status}: {body}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body, lossily decoded as UTF-8.
		body: String,
	},
	/// The endpoint answered with a body that does not match the expected JSON shape.
	#[error("Endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
impl RequestError {
	/// Returns the HTTP status code when a response was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Build { .. } | Self::Transport(_) => None,
			Self::Status { status, .. } | Self::Parse { status, .. } => Some(*status),
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
	/// The HTTP client failed in a way it could only describe as text.
	#[error("HTTP client error occurred while calling the API: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
