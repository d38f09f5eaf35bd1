//! Token request wire body and the validated tagged union the dispatcher matches on.

// self
use crate::{
	_prelude::*,
	auth::{AccessKeyId, ClientId, FunctionName, IdentifierError, Region, Secret, UserPoolId},
	error::ValidationError,
};

/// Authentication strategies understood by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthType {
	/// AWS Signature V4.
	#[serde(rename = "IAM")]
	Iam,
	/// Cognito user-pool username/password exchange.
	#[serde(rename = "COGNITO")]
	Cognito,
	/// Static API key passthrough.
	#[serde(rename = "API_KEY")]
	ApiKey,
	/// Lambda custom authorizer.
	#[serde(rename = "LAMBDA")]
	Lambda,
}
impl AuthType {
	/// Returns the wire tag for the auth type.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthType::Iam => "IAM",
			AuthType::Cognito => "COGNITO",
			AuthType::ApiKey => "API_KEY",
			AuthType::Lambda => "LAMBDA",
		}
	}

	/// Resolves a wire tag, accepting the AppSync spelling of the Cognito mode.
	pub fn parse(tag: &str) -> Option<Self> {
		match tag {
			"IAM" => Some(AuthType::Iam),
			"COGNITO" | "COGNITO_USER_POOLS" => Some(AuthType::Cognito),
			"API_KEY" => Some(AuthType::ApiKey),
			"LAMBDA" => Some(AuthType::Lambda),
			_ => None,
		}
	}
}
impl Display for AuthType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for AuthType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		Self::parse(s).ok_or_else(|| Error::UnsupportedAuthType { auth_type: s.to_owned() })
	}
}

/// Flat JSON body accepted by `POST /getToken`.
///
/// Every field except `auth_type` is optional on the wire; which ones are required depends on
/// the declared auth type and is enforced by [`TokenRequest::try_from`].
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenRequestBody {
	/// Strategy tag (`IAM`, `COGNITO`, `API_KEY`, `LAMBDA`).
	pub auth_type: String,
	/// AWS access key ID (IAM, LAMBDA).
	pub access_key: Option<String>,
	/// AWS secret access key (IAM, LAMBDA).
	pub secret_key: Option<String>,
	/// AWS session token for temporary credentials (IAM, LAMBDA).
	pub session_token: Option<String>,
	/// AWS region (IAM, LAMBDA; optional for COGNITO).
	pub region: Option<String>,
	/// Target API URL to sign (IAM).
	pub api_url: Option<String>,
	/// HTTP method of the signed request (IAM) or authorizer event (LAMBDA).
	pub method: Option<String>,
	/// Signing service name (IAM), defaults to `execute-api`.
	pub service: Option<String>,
	/// Request body hashed into the signature (IAM).
	pub payload: Option<String>,
	/// Cognito username.
	pub username: Option<String>,
	/// Cognito password.
	pub password: Option<String>,
	/// Cognito user pool ID.
	pub user_pool_id: Option<String>,
	/// Cognito app client ID.
	pub client_id: Option<String>,
	/// Cognito app client secret, when the client has one.
	pub client_secret: Option<String>,
	/// Static API key.
	pub api_key: Option<String>,
	/// Lambda authorizer function name or ARN.
	pub lambda_function_name: Option<String>,
	/// JSON payload forwarded to the Lambda authorizer.
	pub lambda_payload: Option<serde_json::Value>,
	/// Method ARN placed in the Lambda authorizer event.
	pub method_arn: Option<String>,
}
impl TokenRequestBody {
	/// Creates an empty body for the given tag.
	pub fn new(auth_type: impl Into<String>) -> Self {
		Self { auth_type: auth_type.into(), ..Default::default() }
	}
}
impl Debug for TokenRequestBody {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRequestBody")
			.field("auth_type", &self.auth_type)
			.field("access_key", &self.access_key)
			.field("secret_key_set", &self.secret_key.is_some())
			.field("session_token_set", &self.session_token.is_some())
			.field("region", &self.region)
			.field("api_url", &self.api_url)
			.field("method", &self.method)
			.field("username", &self.username)
			.field("password_set", &self.password.is_some())
			.field("user_pool_id", &self.user_pool_id)
			.field("client_id", &self.client_id)
			.field("api_key_set", &self.api_key.is_some())
			.field("lambda_function_name", &self.lambda_function_name)
			.finish_non_exhaustive()
	}
}

/// Long-lived or temporary AWS credentials used for signing.
#[derive(Clone, Debug)]
pub struct AwsCredentials {
	/// Access key ID.
	pub access_key: AccessKeyId,
	/// Secret access key.
	pub secret_key: Secret,
	/// Session token for temporary credentials.
	pub session_token: Option<Secret>,
}

/// Fields required to sign a request with SigV4.
#[derive(Clone, Debug)]
pub struct IamRequest {
	/// Signing credentials.
	pub credentials: AwsCredentials,
	/// Signing region.
	pub region: Region,
	/// Target URL, parsed during signing.
	pub api_url: String,
	/// HTTP method, validated during signing.
	pub method: String,
	/// Signing service name.
	pub service: String,
	/// Request body hashed into the signature.
	pub payload: String,
}

/// Fields required for a Cognito username/password exchange.
#[derive(Clone, Debug)]
pub struct CognitoRequest {
	/// User name.
	pub username: String,
	/// User password.
	pub password: Secret,
	/// User pool the user belongs to.
	pub user_pool_id: UserPoolId,
	/// App client ID.
	pub client_id: ClientId,
	/// App client secret, when configured.
	pub client_secret: Option<Secret>,
	/// Region hosting the pool.
	pub region: Region,
}

/// Fields required for the API key passthrough.
#[derive(Clone, Debug)]
pub struct ApiKeyRequest {
	/// Key returned verbatim.
	pub api_key: Secret,
}

/// Fields required to invoke a Lambda authorizer.
#[derive(Clone, Debug)]
pub struct LambdaRequest {
	/// Function name or ARN.
	pub function_name: FunctionName,
	/// Region hosting the function.
	pub region: Region,
	/// Invocation credentials.
	pub credentials: AwsCredentials,
	/// Payload encoded into the authorizer event.
	pub payload: serde_json::Value,
	/// Method ARN placed in the authorizer event.
	pub method_arn: Option<String>,
	/// HTTP method placed in the authorizer event.
	pub method: String,
}

/// Validated request; exactly one variant's fields are populated.
#[derive(Clone, Debug)]
pub enum TokenRequest {
	/// SigV4 signing.
	Iam(IamRequest),
	/// Cognito JWT exchange.
	Cognito(CognitoRequest),
	/// API key passthrough.
	ApiKey(ApiKeyRequest),
	/// Lambda authorizer invocation.
	Lambda(LambdaRequest),
}
impl TokenRequest {
	/// Returns the auth type of the populated variant.
	pub fn auth_type(&self) -> AuthType {
		match self {
			TokenRequest::Iam(_) => AuthType::Iam,
			TokenRequest::Cognito(_) => AuthType::Cognito,
			TokenRequest::ApiKey(_) => AuthType::ApiKey,
			TokenRequest::Lambda(_) => AuthType::Lambda,
		}
	}
}
impl TryFrom<TokenRequestBody> for TokenRequest {
	type Error = Error;

	fn try_from(body: TokenRequestBody) -> Result<Self> {
		if body.auth_type.trim().is_empty() {
			return Err(ValidationError::MissingAuthType.into());
		}

		let auth_type = body.auth_type.parse::<AuthType>()?;
		let request = match auth_type {
			AuthType::Iam => TokenRequest::Iam(iam(body)?),
			AuthType::Cognito => TokenRequest::Cognito(cognito(body)?),
			AuthType::ApiKey => TokenRequest::ApiKey(api_key(body)?),
			AuthType::Lambda => TokenRequest::Lambda(lambda(body)?),
		};

		Ok(request)
	}
}

const DEFAULT_SIGNING_SERVICE: &str = "execute-api";
const DEFAULT_LAMBDA_METHOD: &str = "POST";

fn iam(body: TokenRequestBody) -> Result<IamRequest, ValidationError> {
	const KIND: AuthType = AuthType::Iam;

	let access_key = required(body.access_key, "access_key", KIND)?;
	let secret_key = required(body.secret_key, "secret_key", KIND)?;
	let region = required(body.region, "region", KIND)?;
	let api_url = required(body.api_url, "api_url", KIND)?;
	let method = required(body.method, "method", KIND)?;

	Ok(IamRequest {
		credentials: AwsCredentials {
			access_key: identifier(access_key, "access_key")?,
			secret_key: Secret::new(secret_key),
			session_token: optional(body.session_token).map(Secret::new),
		},
		region: identifier(region, "region")?,
		api_url,
		method,
		service: optional(body.service).unwrap_or_else(|| DEFAULT_SIGNING_SERVICE.to_owned()),
		payload: body.payload.unwrap_or_default(),
	})
}

fn cognito(body: TokenRequestBody) -> Result<CognitoRequest, ValidationError> {
	const KIND: AuthType = AuthType::Cognito;

	let username = required(body.username, "username", KIND)?;
	let password = required(body.password, "password", KIND)?;
	let user_pool_id = required(body.user_pool_id, "user_pool_id", KIND)?;
	let client_id = required(body.client_id, "client_id", KIND)?;
	let user_pool_id: UserPoolId = identifier(user_pool_id, "user_pool_id")?;
	let region = match optional(body.region) {
		Some(region) => identifier(region, "region")?,
		None => user_pool_id
			.region()
			.ok_or(ValidationError::Missing { field: "region", auth_type: KIND })?,
	};

	Ok(CognitoRequest {
		username,
		password: Secret::new(password),
		user_pool_id,
		client_id: identifier(client_id, "client_id")?,
		client_secret: optional(body.client_secret).map(Secret::new),
		region,
	})
}

fn api_key(body: TokenRequestBody) -> Result<ApiKeyRequest, ValidationError> {
	let api_key = required(body.api_key, "api_key", AuthType::ApiKey)?;

	Ok(ApiKeyRequest { api_key: Secret::new(api_key) })
}

fn lambda(body: TokenRequestBody) -> Result<LambdaRequest, ValidationError> {
	const KIND: AuthType = AuthType::Lambda;

	let function_name = required(body.lambda_function_name, "lambda_function_name", KIND)?;
	let region = required(body.region, "region", KIND)?;
	let access_key = required(body.access_key, "access_key", KIND)?;
	let secret_key = required(body.secret_key, "secret_key", KIND)?;

	Ok(LambdaRequest {
		function_name: identifier(function_name, "lambda_function_name")?,
		region: identifier(region, "region")?,
		credentials: AwsCredentials {
			access_key: identifier(access_key, "access_key")?,
			secret_key: Secret::new(secret_key),
			session_token: optional(body.session_token).map(Secret::new),
		},
		payload: body.lambda_payload.unwrap_or_else(|| serde_json::json!({})),
		method_arn: optional(body.method_arn),
		method: optional(body.method).unwrap_or_else(|| DEFAULT_LAMBDA_METHOD.to_owned()),
	})
}

fn required(
	value: Option<String>,
	field: &'static str,
	auth_type: AuthType,
) -> Result<String, ValidationError> {
	optional(value).ok_or(ValidationError::Missing { field, auth_type })
}

fn optional(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.trim().is_empty())
}

fn identifier<T>(value: String, field: &'static str) -> Result<T, ValidationError>
where
	T: TryFrom<String, Error = IdentifierError>,
{
	T::try_from(value).map_err(|e| ValidationError::Malformed { field, reason: e.to_string() })
}
