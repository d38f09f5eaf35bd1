// crates.io
use httpmock::prelude::*;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
// self
use autodoc::{_preludet::*, server};

struct RunningServer {
	url: String,
	shutdown: oneshot::Sender<()>,
	handle: JoinHandle<std::io::Result<()>>,
}
impl RunningServer {
	async fn start(upstream: &str) -> Self {
		let listener =
			TcpListener::bind("127.0.0.1:0").await.expect("Loopback listener should bind.");
		let addr = listener.local_addr().expect("Listener should expose its address.");
		let (shutdown, signal) = oneshot::channel();
		let handle = tokio::spawn(server::serve_with_shutdown(
			listener,
			build_test_dispatcher(upstream),
			async move {
				let _ = signal.await;
			},
		));

		Self { url: format!("http://{addr}{}", server::TOKEN_ROUTE), shutdown, handle }
	}

	async fn post(&self, body: reqwest::Body) -> (StatusCode, Value) {
		let response = ReqwestClient::new()
			.post(&self.url)
			.header("content-type", "application/json")
			.body(body)
			.send()
			.await
			.expect("Token endpoint should respond.");
		let status = response.status();
		let json = response.json::<Value>().await.expect("Response body should be JSON.");

		(status, json)
	}

	async fn stop(self) {
		let _ = self.shutdown.send(());

		self.handle
			.await
			.expect("Server task should join.")
			.expect("Server should shut down cleanly.");
	}
}

#[tokio::test]
async fn successful_requests_return_the_token_response() {
	let server = RunningServer::start("http://127.0.0.1:9/").await;
	let body = json!({
		"auth_type": "IAM",
		"access_key": "AKIDEXAMPLE",
		"secret_key": "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
		"region": "us-east-1",
		"api_url": "https://api.example.com/prod/items",
		"method": "POST",
		"username": "ignored for IAM",
	});
	let (status, json) = server.post(body.to_string().into()).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["token_type"], "AWS_IAM_SIGV4");
	assert!(
		json["authorization_header"]
			.as_str()
			.is_some_and(|header| header.starts_with("AWS4-HMAC-SHA256 "))
	);
	assert!(json["additional_headers"]["X-Amz-Date"].is_string());

	server.stop().await;
}

#[tokio::test]
async fn caller_mistakes_return_422_with_detail() {
	let server = RunningServer::start("http://127.0.0.1:9/").await;
	let (status, json) = server.post(json!({ "auth_type": "API_KEY" }).to_string().into()).await;

	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert!(json["detail"].as_str().is_some_and(|detail| detail.contains("api_key")));

	let (status, json) = server.post(json!({ "auth_type": "BOGUS" }).to_string().into()).await;

	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert_eq!(json["detail"], "Unsupported auth_type: BOGUS.");

	let (status, json) = server.post("{not json".into()).await;

	assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	assert!(json["detail"].is_string());

	server.stop().await;
}

#[tokio::test]
async fn upstream_failures_return_502_with_detail() {
	let upstream = MockServer::start_async().await;
	let mock = upstream
		.mock_async(|when, then| {
			when.method(POST).path("/");
			then.status(500).body("{\"__type\":\"InternalErrorException\",\"message\":\"down\"}");
		})
		.await;
	let server = RunningServer::start(&upstream.base_url()).await;
	let body = json!({
		"auth_type": "COGNITO",
		"username": "alice",
		"password": "pw",
		"user_pool_id": "us-east-1_TestPool",
		"client_id": "client-it",
	});
	let (status, json) = server.post(body.to_string().into()).await;

	mock.assert_async().await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert!(
		json["detail"].as_str().is_some_and(|detail| detail.contains("InternalErrorException"))
	);

	server.stop().await;
}
