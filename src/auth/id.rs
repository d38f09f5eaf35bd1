//! Strongly typed AWS identifiers validated before they reach a hostname or signature.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		def_id! { $name, $doc, $kind, validate_view }
	};
	($name:ident, $doc:literal, $kind:literal, $validate:path) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				$validate($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
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
				$validate($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 256;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} cannot be empty")]
	Empty {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} contains whitespace")]
	ContainsWhitespace {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} exceeds {max} characters")]
	TooLong {
		/// Kind of identifier.
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// The identifier contains a character outside its allowed set.
	#[error("{kind} contains the invalid character {ch:?}")]
	InvalidCharacter {
		/// Kind of identifier.
		kind: &'static str,
		/// Offending character.
		ch: char,
	},
}

def_id! { AccessKeyId, "AWS access key identifier used in SigV4 credential scopes.", "Access key" }
def_id! { ClientId, "Cognito app client identifier.", "Client ID" }
def_id! { FunctionName, "Lambda function name, partial ARN, or full ARN.", "Function name" }
def_id! { Region, "AWS region code, e.g. `us-east-1`.", "Region", validate_region }
def_id! { UserPoolId, "Cognito user pool identifier, e.g. `us-east-1_AbCdEf123`.", "User pool ID" }

impl UserPoolId {
	/// Returns the region encoded in the pool identifier prefix, if it is well formed.
	pub fn region(&self) -> Option<Region> {
		let (prefix, _) = self.0.split_once('_')?;

		Region::new(prefix).ok()
	}
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

// Regions end up in hostnames, so only the characters AWS actually uses are accepted.
fn validate_region(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_view(kind, view)?;

	if let Some(ch) =
		view.chars().find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '-'))
	{
		return Err(IdentifierError::InvalidCharacter { kind, ch });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_whitespace_and_empty_values() {
		assert!(AccessKeyId::new(" AKID").is_err(), "Leading whitespace must be rejected.");
		assert!(ClientId::new("").is_err());
		assert!(FunctionName::new("with space").is_err());

		let key = AccessKeyId::new("AKIDEXAMPLE").expect("Access key fixture should be valid.");

		assert_eq!(key.as_ref(), "AKIDEXAMPLE");
	}

	#[test]
	fn regions_only_accept_hostname_safe_characters() {
		Region::new("eu-west-2").expect("Plain region should be valid.");

		assert_eq!(
			Region::new("us-east-1.evil.com"),
			Err(IdentifierError::InvalidCharacter { kind: "Region", ch: '.' })
		);
		assert!(Region::new("US-EAST-1").is_err());
	}

	#[test]
	fn user_pool_id_exposes_its_region() {
		let pool = UserPoolId::new("ap-south-1_AbCdEf123").expect("Pool fixture should be valid.");

		assert_eq!(pool.region().as_deref(), Some("ap-south-1"));

		let bare = UserPoolId::new("poolwithoutregion").expect("Pool fixture should be valid.");

		assert!(bare.region().is_none());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let region: Region =
			serde_json::from_str("\"us-west-2\"").expect("Region should deserialize.");

		assert_eq!(region.as_ref(), "us-west-2");
		assert!(serde_json::from_str::<Region>("\"us west\"").is_err());
	}
}
