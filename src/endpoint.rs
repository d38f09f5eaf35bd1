//! AWS service endpoint resolution with optional overrides.
//!
//! By default every call goes to the public regional endpoint derived from the request's
//! region. Overrides replace the scheme/host/base path for all regions, which is how local
//! emulators and integration tests point the proxy at a mock server.

// self
use crate::{
	_prelude::*,
	auth::{FunctionName, Region},
	error::ConfigError,
};

const LAMBDA_API_VERSION: &str = "2015-03-31";

/// Resolved endpoint set used by the Cognito and Lambda strategies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AwsEndpoints {
	/// Cognito Identity Provider endpoint override.
	pub cognito: Option<Url>,
	/// Lambda endpoint override.
	pub lambda: Option<Url>,
}
impl AwsEndpoints {
	/// Creates a new builder with no overrides.
	pub fn builder() -> AwsEndpointsBuilder {
		AwsEndpointsBuilder::default()
	}

	/// Returns the Cognito Identity Provider URL for `region`.
	pub fn cognito_url(&self, region: &Region) -> Result<Url, ConfigError> {
		match &self.cognito {
			Some(url) => Ok(url.clone()),
			None => regional("cognito", &format!("https://cognito-idp.{region}.amazonaws.com/")),
		}
	}

	/// Returns the Lambda `Invoke` URL for `function` in `region`.
	pub fn lambda_invoke_url(
		&self,
		region: &Region,
		function: &FunctionName,
	) -> Result<Url, ConfigError> {
		let mut url = match &self.lambda {
			Some(url) => url.clone(),
			None => regional("lambda", &format!("https://lambda.{region}.amazonaws.com/"))?,
		};
		let invalid = ConfigError::InvalidEndpoint { endpoint: "lambda", url: url.to_string() };

		url.path_segments_mut()
			.map_err(|_| invalid)?
			.pop_if_empty()
			.extend([LAMBDA_API_VERSION, "functions", function.as_ref(), "invocations"]);

		Ok(url)
	}
}

/// Builder for [`AwsEndpoints`] values.
#[derive(Debug, Default)]
pub struct AwsEndpointsBuilder {
	/// Cognito Identity Provider endpoint override.
	pub cognito: Option<Url>,
	/// Lambda endpoint override.
	pub lambda: Option<Url>,
}
impl AwsEndpointsBuilder {
	/// Overrides the Cognito Identity Provider endpoint.
	pub fn cognito(mut self, url: Url) -> Self {
		self.cognito = Some(url);

		self
	}

	/// Overrides the Lambda endpoint.
	pub fn lambda(mut self, url: Url) -> Self {
		self.lambda = Some(url);

		self
	}

	/// Consumes the builder and validates the overrides.
	pub fn build(self) -> Result<AwsEndpoints, ConfigError> {
		if let Some(url) = self.cognito.as_ref() {
			validate_endpoint("cognito", url)?;
		}
		if let Some(url) = self.lambda.as_ref() {
			validate_endpoint("lambda", url)?;
		}

		Ok(AwsEndpoints { cognito: self.cognito, lambda: self.lambda })
	}
}

fn regional(endpoint: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|_| ConfigError::InvalidEndpoint { endpoint, url: raw.to_owned() })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	let scheme_ok = matches!(url.scheme(), "http" | "https");

	if !scheme_ok || url.host_str().is_none() || url.cannot_be_a_base() {
		Err(ConfigError::InvalidEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}
