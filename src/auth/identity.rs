//! Service identity loaded once at startup and shared by every request.

// std
use std::convert::Infallible;
// crates.io
use jsonwebtoken::EncodingKey;
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, ProjectId, ServiceAccountId},
	error::SigningError,
};

/// PEM-encoded RSA private key that never appears in logs.
///
/// Keys copied into single-line environment variables usually carry literal `\n` sequences in
/// place of line breaks; [`PrivateKeyPem::new`] turns those back into newlines so the PEM parser
/// accepts them.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKeyPem(String);
impl PrivateKeyPem {
	/// Wraps PEM text, normalizing escaped newlines and surrounding whitespace.
	pub fn new(value: impl Into<String>) -> Self {
		let value = value.into();
		let normalized = if value.contains("\\n") { value.replace("\\n", "\n") } else { value };

		Self(normalized.trim().to_owned())
	}

	/// Returns the PEM text. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Short SHA-256 fingerprint of the key material, safe to log when diagnosing which key was
	/// loaded.
	pub fn fingerprint(&self) -> String {
		Sha256::digest(self.0.as_bytes())[..8].iter().map(|byte| format!("{byte:02x}")).collect()
	}

	pub(crate) fn encoding_key(&self) -> Result<EncodingKey, SigningError> {
		EncodingKey::from_rsa_pem(self.0.as_bytes())
			.map_err(|source| SigningError::InvalidKey { source })
	}
}
impl FromStr for PrivateKeyPem {
	type Err = Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::new(s))
	}
}
impl Debug for PrivateKeyPem {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("PrivateKeyPem").field(&"<redacted>").finish()
	}
}
impl Display for PrivateKeyPem {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Immutable identity of the calling service: which project it reads and which service account
/// signs its assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceIdentity {
	project_id: ProjectId,
	service_account: ServiceAccountId,
	private_key: PrivateKeyPem,
}
impl ServiceIdentity {
	/// Validates the identifiers and wraps the PEM key.
	pub fn new(
		project_id: impl AsRef<str>,
		service_account: impl AsRef<str>,
		private_key: impl Into<String>,
	) -> Result<Self, IdentifierError> {
		Self::with_private_key(project_id, service_account, PrivateKeyPem::new(private_key))
	}

	/// Validates the identifiers and attaches an already wrapped key.
	pub fn with_private_key(
		project_id: impl AsRef<str>,
		service_account: impl AsRef<str>,
		private_key: PrivateKeyPem,
	) -> Result<Self, IdentifierError> {
		Ok(Self::from_parts(
			ProjectId::new(project_id)?,
			ServiceAccountId::new(service_account)?,
			private_key,
		))
	}

	/// Assembles an identity from validated parts.
	pub fn from_parts(
		project_id: ProjectId,
		service_account: ServiceAccountId,
		private_key: PrivateKeyPem,
	) -> Self {
		Self { project_id, service_account, private_key }
	}

	/// Project whose resources are read.
	pub fn project_id(&self) -> &ProjectId {
		&self.project_id
	}

	/// Service account used as assertion issuer and subject.
	pub fn service_account(&self) -> &ServiceAccountId {
		&self.service_account
	}

	/// Private key used to sign assertions.
	pub fn private_key(&self) -> &PrivateKeyPem {
		&self.private_key
	}
}
