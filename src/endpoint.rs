//! Endpoint URLs derived from the base API URI.

// self
use crate::{_prelude::*, auth::ProjectId, error::ConfigError};

/// Base URI of the hosted RKStudio API.
pub const DEFAULT_BASE_URI: &str = "https://rkstudio.careevolution.com/inv";
/// Token endpoint path, relative to the base URI.
pub const TOKEN_PATH: &str = "/identityserver/connect/token";

/// Resolves the API's endpoints against a base URI.
///
/// Paths are appended to the base URI verbatim instead of going through [`Url::join`], which
/// would replace the base's last path segment (`/inv`) rather than extend it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiEndpoints {
	base: Url,
	token: Url,
}
impl ApiEndpoints {
	/// Creates the endpoint set for `base`.
	pub fn new(base: Url) -> Result<Self, ConfigError> {
		let token = append_path(&base, TOKEN_PATH)?;

		Ok(Self { base, token })
	}

	/// Base URI every path is resolved against.
	pub fn base(&self) -> &Url {
		&self.base
	}

	/// Token endpoint; also the audience of client assertions.
	pub fn token(&self) -> &Url {
		&self.token
	}

	/// Resolves a resource path such as `/api/v1/...`.
	pub fn resource(&self, path: &str) -> Result<Url, ConfigError> {
		append_path(&self.base, path)
	}
}

/// Path of the participant listing for `project_id`.
pub fn participants_path(project_id: &ProjectId) -> String {
	format!("/api/v1/administration/projects/{project_id}/participants")
}

fn append_path(base: &Url, path: &str) -> Result<Url, ConfigError> {
	let base = base.as_str().trim_end_matches('/');
	let path = path.trim_start_matches('/');

	Ok(Url::parse(&format!("{base}/{path}"))?)
}
