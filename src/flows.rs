//! The two sequential flows of the client and the report that drives them.
//!
//! [`TokenIssuer`] exchanges a signed client assertion for an access token; [`ApiClient`] spends
//! that token on an authenticated GET. [`ParticipantReport`] runs them in order, awaiting the token
//! before the resource request is even built, so the ordering holds structurally.

pub mod participants;
pub mod resource;
pub mod token;

pub use participants::*;
pub use resource::*;
pub use token::*;

// crates.io
use oauth2::HttpResponse;
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::RequestError};

/// Decodes a JSON response body, reporting the failing path on mismatch.
fn decode_json<T>(response: &HttpResponse) -> Result<T, RequestError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(response.body());

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| RequestError::Parse { source, status: response.status().as_u16() })
}
