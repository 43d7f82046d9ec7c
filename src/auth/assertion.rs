//! JWT client assertions proving the service account's identity to the token endpoint.

// crates.io
use jsonwebtoken::{Algorithm, Header};
use uuid::Uuid;
// self
use crate::{
	_prelude::*,
	auth::{PrivateKeyPem, ServiceAccountId},
	error::SigningError,
};

/// Lifetime of a client assertion, counted from the moment it is built.
pub const ASSERTION_TTL: Duration = Duration::seconds(200);
/// `client_assertion_type` value announcing a JWT-bearer client assertion.
pub const JWT_BEARER_ASSERTION_TYPE: &str =
	"urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// Claims of a client assertion.
///
/// Built fresh for every token request and discarded once signed. The `jti` claim is a random
/// v4 UUID, so two assertions never share an identifier and the token endpoint cannot mistake a
/// new request for a replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
	/// Issuer; the service account.
	pub iss: String,
	/// Subject; the service account.
	pub sub: String,
	/// Audience; the token endpoint URL.
	pub aud: String,
	/// Expiry as seconds since the Unix epoch.
	pub exp: i64,
	/// Unique assertion identifier.
	pub jti: String,
}
impl Assertion {
	/// Builds the claims for `service_account` addressed to `audience`, expiring
	/// [`ASSERTION_TTL`] after `now`.
	pub fn new(service_account: &ServiceAccountId, audience: &Url, now: OffsetDateTime) -> Self {
		Self {
			iss: service_account.to_string(),
			sub: service_account.to_string(),
			aud: audience.to_string(),
			exp: (now + ASSERTION_TTL).unix_timestamp(),
			jti: Uuid::new_v4().to_string(),
		}
	}

	/// Signs the claims with RS256.
	pub fn sign(&self, key: &PrivateKeyPem) -> Result<SignedAssertion, SigningError> {
		let key = key.encoding_key()?;
		let token = jsonwebtoken::encode(&Header::new(Algorithm::RS256), self, &key)
			.map_err(|source| SigningError::Encode { source })?;

		Ok(SignedAssertion(token))
	}
}

/// Compact JWS produced by [`Assertion::sign`]; a short-lived credential kept out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedAssertion(String);
impl SignedAssertion {
	/// Returns the compact serialization sent as `client_assertion`.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for SignedAssertion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SignedAssertion").field(&"<redacted>").finish()
	}
}
