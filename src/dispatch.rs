//! Request dispatcher routing a validated token request to its strategy.

// self
use crate::{
	_prelude::*,
	auth::{TokenRequest, TokenRequestBody, TokenResponse},
	endpoint::AwsEndpoints,
	error::ConfigError,
	http::ReqwestHttpClient,
	obs::{self, TokenOutcome, TokenSpan},
	signer,
};

/// Turns tagged credential payloads into authorization values.
///
/// The dispatcher holds only immutable configuration and a shared HTTP client, so a single
/// instance can serve any number of concurrent requests. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct TokenDispatcher {
	/// HTTP client used for the Cognito and Lambda strategies.
	pub http_client: Arc<ReqwestHttpClient>,
	/// AWS endpoints, possibly overridden for local emulators.
	pub endpoints: AwsEndpoints,
}
impl TokenDispatcher {
	/// Creates a dispatcher over the provided transport and endpoints.
	pub fn new(http_client: impl Into<Arc<ReqwestHttpClient>>, endpoints: AwsEndpoints) -> Self {
		Self { http_client: http_client.into(), endpoints }
	}

	/// Creates a dispatcher with the default client timeout and public AWS endpoints.
	pub fn try_default() -> Result<Self, ConfigError> {
		Ok(Self::new(ReqwestHttpClient::try_default()?, AwsEndpoints::default()))
	}

	/// Validates `body` and returns the authorization value for its declared auth type.
	pub async fn dispatch(&self, body: TokenRequestBody) -> Result<TokenResponse> {
		self.dispatch_at(body, OffsetDateTime::now_utc()).await
	}

	/// Same as [`dispatch`](Self::dispatch) but signs at `now`.
	pub async fn dispatch_at(
		&self,
		body: TokenRequestBody,
		now: OffsetDateTime,
	) -> Result<TokenResponse> {
		let request = TokenRequest::try_from(body).inspect_err(|e| {
			tracing::warn!(error = %e, "rejected token request");
		})?;

		self.execute(request, now).await
	}

	/// Runs the strategy matching an already validated request.
	pub async fn execute(
		&self,
		request: TokenRequest,
		now: OffsetDateTime,
	) -> Result<TokenResponse> {
		let auth_type = request.auth_type();
		let span = TokenSpan::new(auth_type, "dispatch");

		obs::record_token_outcome(auth_type, TokenOutcome::Attempt);

		let result = span
			.instrument(async move {
				match &request {
					TokenRequest::Iam(iam) => signer::sign_request(iam, now),
					TokenRequest::Cognito(cognito) =>
						signer::authenticate(&self.http_client, &self.endpoints, cognito).await,
					TokenRequest::ApiKey(api_key) => Ok(signer::passthrough(api_key)),
					TokenRequest::Lambda(lambda) =>
						signer::invoke(&self.http_client, &self.endpoints, lambda, now).await,
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_token_outcome(auth_type, TokenOutcome::Success),
			Err(e) => {
				tracing::warn!(auth_type = %auth_type, error = %e, "token dispatch failed");

				obs::record_token_outcome(auth_type, TokenOutcome::Failure);
			},
		}

		result
	}
}
