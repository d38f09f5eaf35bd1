//! Local token proxy for embedded API explorers and a docstring-to-OpenAPI scanner.
//!
//! The token side turns a tagged credential payload into a single transport-ready authorization
//! value (AWS SigV4, Cognito JWT, API key, or a Lambda custom authorizer token) and serves it
//! over `POST /getToken`. The scanner side walks route-annotated handlers in Python and
//! JavaScript sources and merges their documentation blocks into one OpenAPI 3.0 document.

#![deny(clippy::all, missing_docs)]

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod obs;
pub mod openapi;
pub mod scanner;
pub mod server;
pub mod signer;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{dispatch::TokenDispatcher, endpoint::AwsEndpoints, http::ReqwestHttpClient};

	/// Builds a dispatcher whose Cognito and Lambda calls are routed to `base_url`, typically an
	/// `httpmock` server.
	pub fn build_test_dispatcher(base_url: &str) -> TokenDispatcher {
		let base = Url::parse(base_url).expect("Mock base URL should parse.");
		let endpoints = AwsEndpoints::builder()
			.cognito(base.clone())
			.lambda(base)
			.build()
			.expect("Mock endpoints should build.");

		let http_client =
			ReqwestHttpClient::try_default().expect("Default HTTP client should build.");

		TokenDispatcher::new(http_client, endpoints)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		path::{Path, PathBuf},
		str::FromStr,
		sync::Arc,
	};

	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
