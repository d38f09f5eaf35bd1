//! HTTP adapter exposing the dispatcher as `POST /getToken`.
//!
//! Caller mistakes (bad JSON, missing fields, unknown auth types) answer 422; anything that went
//! wrong downstream of validation answers 502. Both carry a `{"detail": ...}` body.

// crates.io
use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::post,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
// self
use crate::{
	_prelude::*,
	auth::{TokenRequestBody, TokenResponse},
	dispatch::TokenDispatcher,
	error::ValidationError,
};

/// Route serving token requests.
pub const TOKEN_ROUTE: &str = "/getToken";

/// Error wrapper that renders an [`Error`] as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);
impl ApiError {
	/// Status code the error maps to.
	pub fn status(&self) -> StatusCode {
		if self.0.is_client_error() {
			StatusCode::UNPROCESSABLE_ENTITY
		} else {
			StatusCode::BAD_GATEWAY
		}
	}

	/// Human-readable detail including the error's causes.
	pub fn detail(&self) -> String {
		let mut detail = self.0.to_string();
		let mut source = self.0.source();

		while let Some(cause) = source {
			detail.push_str(" Caused by: ");
			detail.push_str(&cause.to_string());

			source = cause.source();
		}

		detail
	}
}
impl<E> From<E> for ApiError
where
	E: Into<Error>,
{
	fn from(e: E) -> Self {
		Self(e.into())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status(), Json(json!({ "detail": self.detail() }))).into_response()
	}
}

/// Builds the router with permissive CORS and per-request tracing.
pub fn router(dispatcher: TokenDispatcher) -> Router {
	Router::new()
		.route(TOKEN_ROUTE, post(get_token))
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(Arc::new(dispatcher))
}

/// Serves the router on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, dispatcher: TokenDispatcher) -> std::io::Result<()> {
	serve_with_shutdown(listener, dispatcher, async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "failed to listen for the shutdown signal");
		}
	})
	.await
}

/// Serves the router on `listener` until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
	listener: TcpListener,
	dispatcher: TokenDispatcher,
	shutdown: F,
) -> std::io::Result<()>
where
	F: 'static + Send + Future<Output = ()>,
{
	axum::serve(listener, router(dispatcher)).with_graceful_shutdown(shutdown).await
}

async fn get_token(
	State(dispatcher): State<Arc<TokenDispatcher>>,
	body: Result<Json<TokenRequestBody>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
	let Json(body) =
		body.map_err(|rejection| ValidationError::Body { reason: rejection.body_text() })?;

	Ok(Json(dispatcher.dispatch(body).await?))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::InvocationError;

	#[test]
	fn client_and_downstream_errors_map_to_distinct_statuses() {
		let client = ApiError::from(Error::UnsupportedAuthType { auth_type: "BOGUS".into() });
		let downstream = ApiError::from(InvocationError::MissingToken);

		assert_eq!(client.status(), StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(downstream.status(), StatusCode::BAD_GATEWAY);
		assert_eq!(client.detail(), "Unsupported auth_type: BOGUS.");
	}
}
