//! AWS Signature Version 4 header signing.
//!
//! [`sign`] produces the `Authorization` value for a single request at a fixed instant. It signs
//! `host` and `x-amz-date` (plus `x-amz-security-token` for temporary credentials), which is the
//! minimal header set API Gateway, AppSync, and Lambda accept. Canonical URIs use the
//! double-encoded form required by every service except S3.

// crates.io
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use time::{UtcOffset, macros::format_description};
// self
use crate::{
	_prelude::*,
	auth::{AwsCredentials, IamRequest, Region, TokenResponse, TokenType},
	error::SigningError,
};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const TERMINATOR: &str = "aws4_request";

/// Inputs to a single SigV4 signature.
#[derive(Clone, Copy, Debug)]
pub struct SigningParams<'a> {
	/// Signing credentials.
	pub credentials: &'a AwsCredentials,
	/// Signing region.
	pub region: &'a Region,
	/// Signing service, e.g. `execute-api` or `lambda`.
	pub service: &'a str,
	/// HTTP method.
	pub method: &'a str,
	/// Target URL.
	pub url: &'a Url,
	/// Exact request body bytes.
	pub payload: &'a [u8],
	/// Signing instant.
	pub timestamp: OffsetDateTime,
}

/// Headers produced by [`sign`]; every value must accompany the signed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedHeaders {
	/// `Authorization` header value.
	pub authorization: String,
	/// `X-Amz-Date` header value.
	pub amz_date: String,
	/// `X-Amz-Security-Token` header value for temporary credentials.
	pub security_token: Option<String>,
}
impl SignedHeaders {
	/// Converts the signature into a token response carrying the companion headers.
	pub fn into_response(self, token_type: TokenType) -> TokenResponse {
		let mut response =
			TokenResponse::new(self.authorization, token_type).with_header("X-Amz-Date", self.amz_date);

		if let Some(token) = self.security_token {
			response = response.with_header("X-Amz-Security-Token", token);
		}

		response
	}
}

/// Signs the request described by `params`.
pub fn sign(params: &SigningParams) -> Result<SignedHeaders, SigningError> {
	let method = normalize_method(params.method)?;
	let host = canonical_host(params.url)?;
	let timestamp = params.timestamp.to_offset(UtcOffset::UTC);
	let amz_date =
		timestamp.format(format_description!("[year][month][day]T[hour][minute][second]Z"))?;
	let date = timestamp.format(format_description!("[year][month][day]"))?;
	let security_token = params.credentials.session_token.as_ref().map(|t| t.expose().to_owned());
	let mut headers = vec![("host", host), ("x-amz-date", amz_date.clone())];

	if let Some(token) = security_token.as_ref() {
		headers.push(("x-amz-security-token", token.clone()));
	}

	let signed_headers = headers.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(";");
	let canonical_headers =
		headers.iter().map(|(name, value)| format!("{name}:{}\n", value.trim())).collect::<String>();
	let canonical_request = [
		method.as_str(),
		&canonical_uri(params.url),
		&canonical_query(params.url),
		&canonical_headers,
		&signed_headers,
		&hex_sha256(params.payload),
	]
	.join("\n");
	let scope = format!("{date}/{}/{}/{TERMINATOR}", params.region, params.service);
	let string_to_sign = format!(
		"{ALGORITHM}\n{amz_date}\n{scope}\n{}",
		hex_sha256(canonical_request.as_bytes())
	);
	let key = signing_key(
		params.credentials.secret_key.expose(),
		&date,
		params.region,
		params.service,
	)?;
	let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);
	let authorization = format!(
		"{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
		params.credentials.access_key
	);

	Ok(SignedHeaders { authorization, amz_date, security_token })
}

/// IAM strategy: signs `request` at `now` and packages the result for the explorer.
pub fn sign_request(request: &IamRequest, now: OffsetDateTime) -> Result<TokenResponse> {
	let url =
		Url::parse(&request.api_url).map_err(|source| SigningError::InvalidUrl { source })?;
	let signed = sign(&SigningParams {
		credentials: &request.credentials,
		region: &request.region,
		service: &request.service,
		method: &request.method,
		url: &url,
		payload: request.payload.as_bytes(),
		timestamp: now,
	})?;

	Ok(signed.into_response(TokenType::AwsIamSigV4))
}

/// Derives the per-day signing key: `kDate -> kRegion -> kService -> kSigning`.
pub fn signing_key(
	secret: &str,
	date: &str,
	region: &Region,
	service: &str,
) -> Result<Vec<u8>, SigningError> {
	let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
	let k_region = hmac_sha256(&k_date, region.as_bytes())?;
	let k_service = hmac_sha256(&k_region, service.as_bytes())?;

	hmac_sha256(&k_service, TERMINATOR.as_bytes())
}

pub(crate) fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>, SigningError> {
	let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SigningError::InvalidKey)?;

	mac.update(message);

	Ok(mac.finalize().into_bytes().to_vec())
}

fn hex_sha256(data: &[u8]) -> String {
	hex::encode(Sha256::digest(data))
}

fn normalize_method(method: &str) -> Result<String, SigningError> {
	let method = method.trim();
	let is_token = !method.is_empty()
		&& method.chars().all(|ch| ch.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(ch));

	if is_token {
		Ok(method.to_ascii_uppercase())
	} else {
		Err(SigningError::InvalidMethod { method: method.to_owned() })
	}
}

fn canonical_host(url: &Url) -> Result<String, SigningError> {
	let host = url.host_str().ok_or_else(|| SigningError::MissingHost { url: url.to_string() })?;

	Ok(match url.port() {
		Some(port) => format!("{host}:{port}"),
		None => host.to_owned(),
	})
}

fn canonical_uri(url: &Url) -> String {
	let path = url.path();

	if path.is_empty() { "/".into() } else { uri_encode(path, false) }
}

fn canonical_query(url: &Url) -> String {
	let mut pairs = url
		.query_pairs()
		.map(|(k, v)| (uri_encode(&k, true), uri_encode(&v, true)))
		.collect::<Vec<_>>();

	pairs.sort();

	pairs.into_iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
}

fn uri_encode(input: &str, encode_slash: bool) -> String {
	let mut out = String::with_capacity(input.len());

	for byte in input.bytes() {
		match byte {
			b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' =>
				out.push(byte as char),
			b'/' if !encode_slash => out.push('/'),
			_ => out.push_str(&format!("%{byte:02X}")),
		}
	}

	out
}
