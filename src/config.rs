//! Command-line and environment configuration for the two binaries.

// std
use std::{
	net::{IpAddr, Ipv4Addr, SocketAddr},
	time::Duration,
};
// crates.io
use clap::Parser;
// self
use crate::{
	_prelude::*,
	dispatch::TokenDispatcher,
	endpoint::AwsEndpoints,
	error::ConfigError,
	http::ReqwestHttpClient,
};

/// Default bind address for the auth server.
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
/// Default port for the auth server.
pub const DEFAULT_PORT: u16 = 8000;
/// File the scanner writes, relative to the working directory.
pub const OPENAPI_OUTPUT: &str = "openapi_spec.yaml";

/// Settings for `autodoc-auth-server`.
#[derive(Clone, Debug, Parser)]
#[command(name = "autodoc-auth-server")]
#[command(version, about = "Local token proxy for embedded API explorers.", long_about = None)]
pub struct ServerConfig {
	/// Address to bind.
	#[arg(long, env = "AUTODOC_HOST", default_value_t = DEFAULT_HOST)]
	pub host: IpAddr,
	/// Port to bind.
	#[arg(long, env = "AUTODOC_PORT", default_value_t = DEFAULT_PORT)]
	pub port: u16,
	/// Upper bound in seconds on each outbound Cognito or Lambda call.
	#[arg(
		long,
		env = "AUTODOC_TIMEOUT_SECS",
		default_value_t = 30,
		value_parser = clap::value_parser!(u64).range(1..)
	)]
	pub timeout_secs: u64,
	/// Cognito Identity Provider endpoint override, e.g. a local emulator.
	#[arg(long, env = "AUTODOC_COGNITO_ENDPOINT")]
	pub cognito_endpoint: Option<Url>,
	/// Lambda endpoint override, e.g. a local emulator.
	#[arg(long, env = "AUTODOC_LAMBDA_ENDPOINT")]
	pub lambda_endpoint: Option<Url>,
	/// Log filter used when `RUST_LOG` is unset.
	#[arg(long, env = "AUTODOC_LOG", default_value = "autodoc=info,tower_http=info")]
	pub log_filter: String,
}
impl ServerConfig {
	/// Socket address to bind.
	pub fn socket_addr(&self) -> SocketAddr {
		SocketAddr::new(self.host, self.port)
	}

	/// Outbound call timeout.
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	/// Builds the endpoint set, validating any overrides.
	pub fn endpoints(&self) -> Result<AwsEndpoints, ConfigError> {
		let mut builder = AwsEndpoints::builder();

		if let Some(url) = self.cognito_endpoint.clone() {
			builder = builder.cognito(url);
		}
		if let Some(url) = self.lambda_endpoint.clone() {
			builder = builder.lambda(url);
		}

		builder.build()
	}

	/// Builds the dispatcher described by this configuration.
	pub fn dispatcher(&self) -> Result<TokenDispatcher, ConfigError> {
		let http_client = ReqwestHttpClient::with_timeout(self.timeout())?;

		Ok(TokenDispatcher::new(http_client, self.endpoints()?))
	}
}

/// Arguments for `autodoc-openapi`.
#[derive(Clone, Debug, Parser)]
#[command(name = "autodoc-openapi")]
#[command(
	version,
	about = "Extracts route docstrings into a merged OpenAPI document (openapi_spec.yaml).",
	long_about = None
)]
pub struct ScannerArgs {
	/// Source files to scan, in order; later files win on path+method collisions.
	#[arg(required = true)]
	pub files: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn server_defaults_match_the_documented_surface() {
		let config = ServerConfig::try_parse_from(["autodoc-auth-server"])
			.expect("Defaults should parse.");

		assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8000");
		assert_eq!(config.timeout(), Duration::from_secs(30));
		assert_eq!(
			config.endpoints().expect("Default endpoints should build."),
			AwsEndpoints::default()
		);
	}

	#[test]
	fn server_flags_override_defaults() {
		let config = ServerConfig::try_parse_from([
			"autodoc-auth-server",
			"--host",
			"127.0.0.1",
			"--port",
			"9000",
			"--timeout-secs",
			"5",
			"--lambda-endpoint",
			"http://localhost:4566/",
		])
		.expect("Flags should parse.");
		let endpoints = config.endpoints().expect("Override should build.");

		assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
		assert_eq!(endpoints.lambda.as_ref().map(Url::as_str), Some("http://localhost:4566/"));
		assert!(endpoints.cognito.is_none());
	}

	#[test]
	fn zero_timeout_is_rejected() {
		assert!(
			ServerConfig::try_parse_from(["autodoc-auth-server", "--timeout-secs", "0"]).is_err()
		);
	}

	#[test]
	fn scanner_requires_at_least_one_file() {
		assert!(ScannerArgs::try_parse_from(["autodoc-openapi"]).is_err());

		let args = ScannerArgs::try_parse_from(["autodoc-openapi", "a.py", "b.js"])
			.expect("File list should parse.");

		assert_eq!(args.files, vec![PathBuf::from("a.py"), PathBuf::from("b.js")]);
	}
}
