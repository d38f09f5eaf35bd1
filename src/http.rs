//! Outbound HTTP transport shared by the Cognito and Lambda strategies.
//!
//! Provider calls should not follow redirects: both AWS endpoints answer directly, and a
//! redirect would forward signed headers to an unexpected host.

// std
use std::{ops::Deref, time::Duration};
// crates.io
use reqwest::redirect::Policy;
// self
use crate::{_prelude::*, error::ConfigError};

/// Default bound on a single outbound provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	///
	/// Configure custom clients to disable redirect following.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client with [`DEFAULT_TIMEOUT`] and redirects disabled.
	pub fn try_default() -> Result<Self, ConfigError> {
		Self::with_timeout(DEFAULT_TIMEOUT)
	}

	/// Builds a client that gives up on any provider call after `timeout`.
	///
	/// Redirects are never followed.
	pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).timeout(timeout).build()?;

		Ok(Self(client))
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn custom_timeout_builds() {
		let client = ReqwestHttpClient::with_timeout(Duration::from_secs(5))
			.expect("Client with a finite timeout should build.");

		assert!(client.get("http://127.0.0.1/").build().is_ok());
	}

	#[tokio::test]
	async fn redirects_are_returned_not_followed() {
		let server = httpmock::MockServer::start_async().await;
		let redirect = server
			.mock_async(|when, then| {
				when.path("/start");
				then.status(302).header("location", "/elsewhere");
			})
			.await;
		let elsewhere = server
			.mock_async(|when, then| {
				when.path("/elsewhere");
				then.status(200);
			})
			.await;
		let client = ReqwestHttpClient::try_default().expect("Default client should build.");
		let response =
			client.get(server.url("/start")).send().await.expect("Redirect should be received.");

		assert_eq!(response.status().as_u16(), 302);

		redirect.assert_calls_async(1).await;
		elsewhere.assert_calls_async(0).await;
	}
}
