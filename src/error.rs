//! Token-proxy error types shared by the dispatcher, strategies, and HTTP adapter.

// self
use crate::{_prelude::*, auth::AuthType};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by the dispatcher and its strategies.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Request field is missing, blank, or unusable.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// The declared `auth_type` has no matching strategy.
	#[error("Unsupported auth_type: {auth_type}.")]
	UnsupportedAuthType {
		/// Tag supplied by the caller.
		auth_type: String,
	},
	/// SigV4 signing failed.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// Identity provider exchange failed.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// Lambda authorizer invocation failed.
	#[error(transparent)]
	Invocation(#[from] InvocationError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Returns `true` when the failure was caused by the caller's request rather than a
	/// downstream provider.
	pub fn is_client_error(&self) -> bool {
		matches!(self, Self::Validation(_) | Self::UnsupportedAuthType { .. })
	}
}

/// Request validation failures raised before any strategy runs.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// The `auth_type` tag is absent or blank.
	#[error("Field `auth_type` is required.")]
	MissingAuthType,
	/// A required field is absent or blank.
	#[error("Field `{field}` is required for {auth_type} authentication.")]
	Missing {
		/// Wire name of the missing field.
		field: &'static str,
		/// Auth type that requires the field.
		auth_type: AuthType,
	},
	/// A field is present but its value cannot be used.
	#[error("Field `{field}` is malformed: {reason}.")]
	Malformed {
		/// Wire name of the malformed field.
		field: &'static str,
		/// Human-readable reason.
		reason: String,
	},
	/// The request body could not be decoded at all.
	#[error("Request body is invalid: {reason}.")]
	Body {
		/// Decoder-supplied reason.
		reason: String,
	},
}

/// SigV4 signing failures.
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// Target URL cannot be parsed.
	#[error("Target URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Target URL has no host to sign.
	#[error("Target URL `{url}` has no host.")]
	MissingHost {
		/// URL that failed validation.
		url: String,
	},
	/// HTTP method is not a valid token.
	#[error("HTTP method `{method}` is invalid.")]
	InvalidMethod {
		/// Method supplied by the caller.
		method: String,
	},
	/// Signing key material was rejected by the MAC implementation.
	#[error("Signing key is invalid.")]
	InvalidKey,
	/// Request timestamp could not be formatted.
	#[error("Signing timestamp could not be formatted.")]
	Timestamp(#[from] time::error::Format),
}

/// Identity provider failures for the Cognito strategy.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
	/// Provider rejected the credentials or the client.
	#[error("Identity provider rejected the request ({code}): {message}.")]
	Rejected {
		/// AWS error type, e.g. `NotAuthorizedException`.
		code: String,
		/// Provider-supplied message.
		message: String,
		/// HTTP status code.
		status: u16,
	},
	/// Provider requires an additional challenge before issuing tokens.
	#[error("Identity provider requires the {challenge} challenge.")]
	ChallengeRequired {
		/// Challenge name returned by the provider.
		challenge: String,
	},
	/// Provider responded with a body that could not be parsed.
	#[error("Identity provider returned a malformed response.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Provider responded without an ID token.
	#[error("Identity provider response is missing an ID token.")]
	MissingToken,
	/// Provider could not be reached.
	#[error("Identity provider is unavailable.")]
	Unavailable {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl AuthenticationError {
	/// Wraps a transport-specific network error.
	pub fn unavailable(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Unavailable { source: Box::new(src) }
	}
}
impl From<ReqwestError> for AuthenticationError {
	fn from(e: ReqwestError) -> Self {
		Self::unavailable(e)
	}
}

/// Lambda authorizer failures.
#[derive(Debug, ThisError)]
pub enum InvocationError {
	/// Lambda service rejected the invoke call.
	#[error("Lambda invoke returned HTTP {status}: {message}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Service-supplied message or body preview.
		message: String,
	},
	/// Function raised an error while running.
	#[error("Lambda function failed ({kind}): {message}.")]
	FunctionError {
		/// Value of the `X-Amz-Function-Error` header.
		kind: String,
		/// Body preview describing the failure.
		message: String,
	},
	/// Authorizer returned a non-200 status code in its payload.
	#[error("Lambda authorizer denied access: {detail}.")]
	Denied {
		/// `body` of the authorizer payload, if any.
		detail: String,
	},
	/// Returned payload is not valid JSON.
	#[error("Lambda returned a malformed payload.")]
	MalformedPayload {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Returned payload has no token field.
	#[error("Lambda payload is missing a token field.")]
	MissingToken,
	/// Invoke request could not be sent or its response could not be read.
	#[error("Lambda service is unavailable.")]
	Unavailable {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl InvocationError {
	/// Wraps a transport-specific network error.
	pub fn unavailable(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Unavailable { source: Box::new(src) }
	}
}
impl From<ReqwestError> for InvocationError {
	fn from(e: ReqwestError) -> Self {
		Self::unavailable(e)
	}
}

/// Configuration failures raised while wiring the proxy.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint override is not an absolute HTTP(S) URL.
	#[error("The {endpoint} endpoint must be an absolute http(s) URL: {url}.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
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

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn client_errors_cover_validation_and_unsupported_types() {
		let missing: Error =
			ValidationError::Missing { field: "api_key", auth_type: AuthType::ApiKey }.into();
		let unsupported = Error::UnsupportedAuthType { auth_type: "BOGUS".into() };
		let downstream: Error = InvocationError::MissingToken.into();

		assert!(missing.is_client_error());
		assert!(unsupported.is_client_error());
		assert!(!downstream.is_client_error());
	}

	#[test]
	fn missing_field_message_names_the_field() {
		let err = ValidationError::Missing { field: "secret_key", auth_type: AuthType::Iam };

		assert_eq!(err.to_string(), "Field `secret_key` is required for IAM authentication.");
	}
}
