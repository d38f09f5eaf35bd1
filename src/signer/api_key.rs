//! API key passthrough.

// self
use crate::auth::{ApiKeyRequest, TokenResponse, TokenType};

/// Returns the supplied key unchanged as the authorization value. Performs no I/O.
pub fn passthrough(request: &ApiKeyRequest) -> TokenResponse {
	TokenResponse::new(request.api_key.expose(), TokenType::ApiKey)
}
