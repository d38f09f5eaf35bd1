//! Credential strategies, one per auth type.
//!
//! Each strategy is a free function over an already validated request so the dispatcher can match
//! exhaustively on [`TokenRequest`](crate::auth::TokenRequest) and stay free of per-type logic.

pub mod api_key;
pub mod cognito;
pub mod lambda;
pub mod sigv4;

pub use api_key::passthrough;
pub use cognito::authenticate;
pub use lambda::invoke;
pub use sigv4::{SignedHeaders, SigningParams, sign, sign_request};

// crates.io
use serde::de::DeserializeOwned;

fn parse_json<T>(bytes: &[u8]) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer)
}

// Keeps provider error messages readable in a single-line `detail`.
fn body_preview(bytes: &[u8]) -> String {
	const LIMIT: usize = 256;

	let text = String::from_utf8_lossy(bytes);
	let text = text.trim();

	match text.char_indices().nth(LIMIT) {
		Some((idx, _)) => format!("{}...", &text[..idx]),
		None => text.to_owned(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn body_preview_truncates_long_bodies() {
		let long = "x".repeat(300);

		assert_eq!(body_preview(long.as_bytes()).len(), 259);
		assert_eq!(body_preview(b"  short \n"), "short");
	}

	#[test]
	fn parse_json_reports_the_failing_path() {
		#[derive(Debug, serde::Deserialize)]
		struct Outer {
			#[allow(dead_code)]
			inner: Inner,
		}
		#[derive(Debug, serde::Deserialize)]
		struct Inner {
			#[allow(dead_code)]
			value: u32,
		}

		let err = parse_json::<Outer>(br#"{"inner":{"value":"nope"}}"#)
			.expect_err("Type mismatch should fail.");

		assert_eq!(err.path().to_string(), "inner.value");
	}
}
