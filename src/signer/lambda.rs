//! Lambda custom authorizer invocation.
//!
//! The function is called synchronously through the Lambda `Invoke` API with a TOKEN-authorizer
//! event. The caller's JSON payload travels base64-encoded in `authorizationToken`, so the
//! authorizer sees the same shape API Gateway would send it.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value, json};
// self
use crate::{
	_prelude::*,
	auth::{LambdaRequest, TokenResponse, TokenType},
	endpoint::AwsEndpoints,
	error::InvocationError,
	http::ReqwestHttpClient,
	signer::{self, SigningParams, sigv4},
};

const SERVICE: &str = "lambda";
const FUNCTION_ERROR_HEADER: &str = "X-Amz-Function-Error";
const CONTEXT_HEADER_PREFIX: &str = "X-Lambda-";

/// Invokes the authorizer at `now` and returns the token it minted.
pub async fn invoke(
	http: &ReqwestHttpClient,
	endpoints: &AwsEndpoints,
	request: &LambdaRequest,
	now: OffsetDateTime,
) -> Result<TokenResponse> {
	let url = endpoints.lambda_invoke_url(&request.region, &request.function_name)?;
	let body = authorizer_event(request).to_string().into_bytes();
	let signed = sigv4::sign(&SigningParams {
		credentials: &request.credentials,
		region: &request.region,
		service: SERVICE,
		method: "POST",
		url: &url,
		payload: &body,
		timestamp: now,
	})?;
	let mut builder = http
		.post(url)
		.header(AUTHORIZATION, signed.authorization)
		.header("X-Amz-Date", signed.amz_date)
		.header("X-Amz-Invocation-Type", "RequestResponse")
		.header(CONTENT_TYPE, "application/json");

	if let Some(token) = signed.security_token {
		builder = builder.header("X-Amz-Security-Token", token);
	}

	tracing::debug!(function = %request.function_name, "invoking Lambda authorizer");

	let response = builder.body(body).send().await.map_err(InvocationError::from)?;
	let status = response.status();
	let function_error = response
		.headers()
		.get(FUNCTION_ERROR_HEADER)
		.and_then(|value| value.to_str().ok())
		.map(str::to_owned);
	let bytes = response.bytes().await.map_err(InvocationError::from)?;

	if !status.is_success() {
		return Err(InvocationError::Rejected {
			status: status.as_u16(),
			message: error_message(&bytes),
		}
		.into());
	}
	if let Some(kind) = function_error {
		return Err(InvocationError::FunctionError { kind, message: error_message(&bytes) }.into());
	}

	let payload = signer::parse_json::<Value>(&bytes)
		.map_err(|source| InvocationError::MalformedPayload { source })?;

	Ok(authorizer_response(payload)?)
}

/// Builds the TOKEN-authorizer event sent to the function.
pub fn authorizer_event(request: &LambdaRequest) -> Value {
	let method = request.method.to_ascii_uppercase();
	let method_arn = request
		.method_arn
		.clone()
		.unwrap_or_else(|| format!("arn:aws:execute-api:{}:*:*/*/{method}/", request.region));

	json!({
		"type": "TOKEN",
		"authorizationToken": STANDARD.encode(request.payload.to_string()),
		"methodArn": method_arn,
		"resource": "/",
		"path": "/",
		"httpMethod": method,
	})
}

/// Extracts the token and companion headers from the authorizer's response payload.
pub fn authorizer_response(payload: Value) -> Result<TokenResponse, InvocationError> {
	let Value::Object(mut fields) = payload else {
		return Err(InvocationError::MissingToken);
	};

	let denied = fields.get("statusCode").is_some_and(|status| status.as_u64() != Some(200));

	if denied {
		let detail = match fields.remove("body") {
			Some(Value::String(body)) => body,
			Some(Value::Null) | None => "No details provided".into(),
			Some(other) => other.to_string(),
		};

		return Err(InvocationError::Denied { detail });
	}

	let context = match fields.remove("context") {
		Some(Value::Object(context)) => context,
		_ => Map::new(),
	};
	let candidates =
		[fields.get("token"), fields.get("authorizationToken"), context.get("authorizationToken")];
	let token = candidates
		.into_iter()
		.flatten()
		.filter_map(Value::as_str)
		.find(|token| !token.is_empty())
		.ok_or(InvocationError::MissingToken)?;
	let mut response = TokenResponse::new(token, TokenType::LambdaCustom);

	for (key, value) in context.iter().filter(|(key, _)| *key != "authorizationToken") {
		let value = match value {
			Value::String(value) => value.clone(),
			other => other.to_string(),
		};

		response = response.with_header(format!("{CONTEXT_HEADER_PREFIX}{key}"), value);
	}

	Ok(response)
}

fn error_message(bytes: &[u8]) -> String {
	signer::parse_json::<Value>(bytes)
		.ok()
		.and_then(|value| {
			value
				.get("errorMessage")
				.or_else(|| value.get("message"))
				.or_else(|| value.get("Message"))
				.and_then(Value::as_str)
				.map(str::to_owned)
		})
		.unwrap_or_else(|| signer::body_preview(bytes))
}
