//! Participant count report: token exchange followed by one participant listing request.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ServiceIdentity},
	endpoint,
	flows::{ApiClient, TokenIssuer},
	http::HttpTransport,
};

/// Fields of the participant listing this client reads.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
	/// Number of participants enrolled in the project.
	pub total_participants: u64,
	/// Remaining fields of the listing, kept verbatim.
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Outcome of [`ParticipantReport::collect`]; its [`Display`] form is the console output.
#[derive(Clone, Debug, PartialEq)]
pub enum ParticipantReport {
	/// No access token could be obtained.
	TokenUnavailable,
	/// A token was obtained but the participant listing could not be read.
	ApiUnavailable {
		/// Token that was obtained.
		token: AccessToken,
	},
	/// Both calls succeeded.
	Counted {
		/// Token that was obtained.
		token: AccessToken,
		/// `totalParticipants` of the listing.
		total: u64,
	},
}
impl ParticipantReport {
	/// Fetches a token for `identity`, then reads its project's participant count.
	///
	/// Failures have already been logged by the flow that raised them; here they only select the
	/// report variant.
	pub async fn collect<C>(
		issuer: &TokenIssuer<C>,
		api: &ApiClient<C>,
		identity: &ServiceIdentity,
	) -> Self
	where
		C: ?Sized + HttpTransport,
	{
		let token = match issuer.fetch_access_token(identity).await {
			Ok(token) => token,
			Err(_) => return Self::TokenUnavailable,
		};
		let path = endpoint::participants_path(identity.project_id());

		match api.get::<ParticipantSummary>(&token, &path).await {
			Ok(summary) => Self::Counted { token, total: summary.total_participants },
			Err(_) => Self::ApiUnavailable { token },
		}
	}

	/// Returns the participant count when both calls succeeded.
	pub fn total(&self) -> Option<u64> {
		match self {
			Self::Counted { total, .. } => Some(*total),
			_ => None,
		}
	}
}
impl Display for ParticipantReport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::TokenUnavailable => write!(f, "Error obtaining access token."),
			Self::ApiUnavailable { token } => write!(
				f,
				"Obtained access token:\n{}\nError when accessing the API.",
				token.expose()
			),
			Self::Counted { token, total } => write!(
				f,
				"Obtained access token:\n{}\n\nTotal Participants: {total}",
				token.expose()
			),
		}
	}
}
