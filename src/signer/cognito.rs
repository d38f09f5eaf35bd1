//! Cognito user-pool username/password exchange.
//!
//! Calls `InitiateAuth` with the `USER_PASSWORD_AUTH` flow over the AWS JSON 1.1 protocol and
//! returns the issued ID token as a bearer value. App clients configured with a secret require a
//! `SECRET_HASH`, which is derived here from the username, client ID, and client secret.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::CONTENT_TYPE;
// self
use crate::{
	_prelude::*,
	auth::{CognitoRequest, TokenResponse, TokenType},
	endpoint::AwsEndpoints,
	error::AuthenticationError,
	http::ReqwestHttpClient,
	signer::{self, sigv4},
};

const TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const AUTH_FLOW: &str = "USER_PASSWORD_AUTH";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthInput<'a> {
	auth_flow: &'static str,
	client_id: &'a str,
	auth_parameters: BTreeMap<&'static str, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthOutput {
	#[serde(default)]
	authentication_result: Option<AuthenticationResult>,
	#[serde(default)]
	challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
	#[serde(default)]
	id_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AwsErrorBody {
	#[serde(default, rename = "__type")]
	kind: Option<String>,
	#[serde(default, alias = "Message")]
	message: Option<String>,
}

/// Exchanges the user's credentials for a Cognito ID token.
pub async fn authenticate(
	http: &ReqwestHttpClient,
	endpoints: &AwsEndpoints,
	request: &CognitoRequest,
) -> Result<TokenResponse> {
	let url = endpoints.cognito_url(&request.region)?;
	let input = InitiateAuthInput {
		auth_flow: AUTH_FLOW,
		client_id: &request.client_id,
		auth_parameters: auth_parameters(request)?,
	};

	tracing::debug!(user_pool_id = %request.user_pool_id, "initiating Cognito authentication");

	let response = http
		.post(url)
		.header("X-Amz-Target", TARGET)
		.header(CONTENT_TYPE, AMZ_JSON)
		.json(&input)
		.send()
		.await
		.map_err(AuthenticationError::from)?;
	let status = response.status();
	let bytes = response.bytes().await.map_err(AuthenticationError::from)?;

	if !status.is_success() {
		return Err(rejected(status.as_u16(), &bytes).into());
	}

	let output = signer::parse_json::<InitiateAuthOutput>(&bytes)
		.map_err(|source| AuthenticationError::MalformedResponse { source })?;

	Ok(TokenResponse::new(format!("Bearer {}", id_token(output)?), TokenType::CognitoJwt))
}

/// Computes the `SECRET_HASH` Cognito expects from clients that have a secret.
pub fn secret_hash(username: &str, client_id: &str, client_secret: &str) -> Result<String> {
	let mac = sigv4::hmac_sha256(
		client_secret.as_bytes(),
		format!("{username}{client_id}").as_bytes(),
	)?;

	Ok(STANDARD.encode(mac))
}

fn auth_parameters(request: &CognitoRequest) -> Result<BTreeMap<&'static str, String>> {
	let mut params = BTreeMap::new();

	params.insert("USERNAME", request.username.clone());
	params.insert("PASSWORD", request.password.expose().to_owned());

	if let Some(secret) = request.client_secret.as_ref() {
		params.insert(
			"SECRET_HASH",
			secret_hash(&request.username, &request.client_id, secret.expose())?,
		);
	}

	Ok(params)
}

fn id_token(output: InitiateAuthOutput) -> Result<String, AuthenticationError> {
	match (output.authentication_result, output.challenge_name) {
		(Some(result), _) =>
			result.id_token.filter(|token| !token.is_empty()).ok_or(AuthenticationError::MissingToken),
		(None, Some(challenge)) => Err(AuthenticationError::ChallengeRequired { challenge }),
		(None, None) => Err(AuthenticationError::MissingToken),
	}
}

fn rejected(status: u16, bytes: &[u8]) -> AuthenticationError {
	let body = signer::parse_json::<AwsErrorBody>(bytes).unwrap_or_default();
	// `__type` may be namespaced, e.g. `com.amazonaws...#NotAuthorizedException`.
	let code = body
		.kind
		.as_deref()
		.map(|kind| kind.rsplit('#').next().unwrap_or(kind).to_owned())
		.unwrap_or_else(|| format!("HTTP{status}"));
	let message = body.message.unwrap_or_else(|| signer::body_preview(bytes));

	AuthenticationError::Rejected { code, message, status }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_hash_is_base64_hmac_of_username_and_client() {
		let hash = secret_hash("alice", "client123", "s3cr3t").expect("Hash should compute.");
		let decoded = STANDARD.decode(&hash).expect("Hash should be valid base64.");

		assert_eq!(decoded.len(), 32);
		assert_ne!(
			hash,
			secret_hash("bob", "client123", "s3cr3t").expect("Hash should compute."),
			"Different users must produce different hashes."
		);
	}

	#[test]
	fn challenge_without_result_is_reported() {
		let output = signer::parse_json::<InitiateAuthOutput>(
			br#"{"ChallengeName":"NEW_PASSWORD_REQUIRED","Session":"abc"}"#,
		)
		.expect("Challenge payload should parse.");

		assert!(matches!(
			id_token(output),
			Err(AuthenticationError::ChallengeRequired { ref challenge })
				if challenge == "NEW_PASSWORD_REQUIRED"
		));
	}

	#[test]
	fn rejection_strips_the_error_namespace() {
		let err = rejected(
			400,
			br#"{"__type":"com.amazonaws.cognito#NotAuthorizedException","message":"Incorrect username or password."}"#,
		);

		assert!(matches!(
			err,
			AuthenticationError::Rejected { ref code, status: 400, .. }
				if code == "NotAuthorizedException"
		));
	}

	#[test]
	fn rejection_without_json_keeps_the_body() {
		let err = rejected(503, b"Service Unavailable");

		assert!(matches!(
			err,
			AuthenticationError::Rejected { ref code, ref message, .. }
				if code == "HTTP503" && message == "Service Unavailable"
		));
	}
}
