//! Bearer access tokens issued by the token endpoint.

// self
use crate::_prelude::*;

/// Opaque bearer token; redacted in logs.
///
/// The token carries an expiry known only to the issuing server. It is neither tracked nor
/// cached: every run requests a fresh one.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Renders the `Authorization` header value.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Subset of the token endpoint's JSON response this client reads.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct TokenResponse {
	#[serde(default)]
	pub(crate) access_token: Option<String>,
	#[serde(default)]
	pub(crate) token_type: Option<String>,
	#[serde(default)]
	pub(crate) expires_in: Option<u64>,
}
impl TokenResponse {
	/// Extracts the bearer token; absent and empty values both count as missing.
	pub(crate) fn into_access_token(self) -> Option<AccessToken> {
		self.access_token.filter(|token| !token.is_empty()).map(AccessToken::new)
	}
}
