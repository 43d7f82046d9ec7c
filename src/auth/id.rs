//! Validated identifiers for RKStudio projects and service accounts.

// self
use crate::_prelude::*;

macro_rules! def_id {
	(
		$(#[$meta:meta])*
		$name:ident { kind: $kind:literal, reserved: [$($reserved:literal),*] }
	) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Characters rejected in addition to whitespace.
			pub const RESERVED: &'static [char] = &[$($reserved),*];

			/// Validates `value` and wraps it.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let value = value.as_ref();

				validate($kind, value, Self::RESERVED)?;

				Ok(Self(value.to_owned()))
			}

			/// Identifier text.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate($kind, &value, Self::RESERVED)?;

				Ok(Self(value))
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple(stringify!($name)).field(&self.0).finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (project, service account).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (project, service account).
		kind: &'static str,
	},
	/// The identifier contains characters that would break a URL path segment.
	#[error("{kind} identifier contains a reserved character: {found:?}.")]
	ReservedCharacter {
		/// Kind of identifier (project, service account).
		kind: &'static str,
		/// First offending character.
		found: char,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (project, service account).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! {
	/// Project whose participants are read; interpolated into resource paths, so it must stay a
	/// single path segment.
	ProjectId { kind: "Project", reserved: ['/', '?', '#', '%'] }
}
def_id! {
	/// Service account; issuer and subject of every client assertion.
	ServiceAccountId { kind: "ServiceAccount", reserved: [] }
}

fn validate(kind: &'static str, value: &str, reserved: &[char]) -> Result<(), IdentifierError> {
	if value.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if value.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if let Some(found) = value.chars().find(|c| reserved.contains(c)) {
		return Err(IdentifierError::ReservedCharacter { kind, found });
	}
	if value.chars().count() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
