//! Normalized token response returned by every strategy.

// self
use crate::_prelude::*;

/// Kind of authorization value carried by a [`TokenResponse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
	/// SigV4 `Authorization` header value.
	#[serde(rename = "AWS_IAM_SIGV4")]
	AwsIamSigV4,
	/// `Bearer <jwt>` issued by Cognito.
	#[serde(rename = "COGNITO_JWT")]
	CognitoJwt,
	/// Static API key.
	#[serde(rename = "API_KEY")]
	ApiKey,
	/// Token minted by a Lambda custom authorizer.
	#[serde(rename = "LAMBDA_CUSTOM")]
	LambdaCustom,
}
impl TokenType {
	/// Returns the wire label for the token type.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenType::AwsIamSigV4 => "AWS_IAM_SIGV4",
			TokenType::CognitoJwt => "COGNITO_JWT",
			TokenType::ApiKey => "API_KEY",
			TokenType::LambdaCustom => "LAMBDA_CUSTOM",
		}
	}
}
impl Display for TokenType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Authorization value plus any headers that must accompany it.
///
/// Strategies only build a response once the authorization value is known to be non-empty, so
/// callers never observe a partially populated value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Value for the `Authorization` (or API key) header.
	pub authorization_header: String,
	/// Kind of value in `authorization_header`.
	pub token_type: TokenType,
	/// Companion headers, e.g. `X-Amz-Date` for SigV4.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub additional_headers: BTreeMap<String, String>,
}
impl TokenResponse {
	/// Creates a response without companion headers.
	pub fn new(authorization_header: impl Into<String>, token_type: TokenType) -> Self {
		Self {
			authorization_header: authorization_header.into(),
			token_type,
			additional_headers: BTreeMap::new(),
		}
	}

	/// Adds or replaces a companion header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.additional_headers.insert(name.into(), value.into());

		self
	}
}
