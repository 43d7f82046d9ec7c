// std
use std::{
	io::{Result as IoResult, Write},
	sync::Mutex,
};
// crates.io
use httpmock::prelude::*;
use serde_json::json;
use tracing::subscriber::DefaultGuard;
// self
use rkstudio_client::{_preludet::*, auth::AccessToken, cli, flows::ParticipantReport};

const TOKEN_PATH: &str = "/identityserver/connect/token";
const PARTICIPANTS_PATH: &str = "/api/v1/administration/projects/project-2f1c/participants";

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);
impl CapturedLogs {
	fn contents(&self) -> String {
		String::from_utf8_lossy(&self.0.lock().expect("Log buffer should not be poisoned."))
			.into_owned()
	}
}
impl Write for CapturedLogs {
	fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
		self.0.lock().expect("Log buffer should not be poisoned.").extend_from_slice(buf);

		Ok(buf.len())
	}

	fn flush(&mut self) -> IoResult<()> {
		Ok(())
	}
}

// `#[tokio::test]` runs on a current-thread runtime, so the thread-local subscriber sees every
// event of the flow.
fn capture_logs() -> (CapturedLogs, DefaultGuard) {
	let logs = CapturedLogs::default();
	let writer = logs.clone();
	let subscriber = tracing_subscriber::fmt()
		.with_ansi(false)
		.with_max_level(tracing::Level::DEBUG)
		.with_writer(move || writer.clone())
		.finish();

	(logs, tracing::subscriber::set_default(subscriber))
}

async fn mock_token<'a>(
	server: &'a MockServer,
	status: u16,
	body: &'static str,
) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(status).header("content-type", "application/json").body(body);
		})
		.await
}

#[tokio::test]
async fn report_counts_participants() {
	let server = MockServer::start_async().await;
	let token_mock = mock_token(&server, 200, "{\"access_token\":\"abc123\"}").await;
	let listing_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PARTICIPANTS_PATH).header("authorization", "Bearer abc123");
			then.status(200).json_body(json!({ "totalParticipants": 42, "participants": [] }));
		})
		.await;
	let config = test_config(&server.base_url());
	let (issuer, api) = build_reqwest_test_clients(&config);
	let report = ParticipantReport::collect(&issuer, &api, &config.identity).await;

	assert_eq!(
		report,
		ParticipantReport::Counted { token: AccessToken::new("abc123"), total: 42 }
	);
	assert_eq!(report.to_string(), "Obtained access token:\nabc123\n\nTotal Participants: 42");

	token_mock.assert_calls_async(1).await;
	listing_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn run_uses_configured_transport() {
	let server = MockServer::start_async().await;
	let _token_mock = mock_token(&server, 200, "{\"access_token\":\"abc123\"}").await;
	let _listing_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PARTICIPANTS_PATH);
			then.status(200).json_body(json!({ "totalParticipants": 3 }));
		})
		.await;
	let report = cli::run(&test_config(&server.base_url()))
		.await
		.expect("Loopback configuration should yield a report.");

	assert_eq!(report.total(), Some(3));
}

#[tokio::test]
async fn api_failure_keeps_the_token() {
	let (logs, _guard) = capture_logs();
	let server = MockServer::start_async().await;
	let _token_mock = mock_token(&server, 200, "{\"access_token\":\"abc123\"}").await;
	let listing_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PARTICIPANTS_PATH);
			then.status(403).body("{\"message\":\"Forbidden\"}");
		})
		.await;
	let config = test_config(&server.base_url());
	let (issuer, api) = build_reqwest_test_clients(&config);
	let report = ParticipantReport::collect(&issuer, &api, &config.identity).await;

	assert_eq!(report, ParticipantReport::ApiUnavailable { token: AccessToken::new("abc123") });
	assert_eq!(report.to_string(), "Obtained access token:\nabc123\nError when accessing the API.");

	listing_mock.assert_calls_async(1).await;

	let logs = logs.contents();

	assert!(logs.contains("Error when accessing the API."), "Missing failure log: {logs}");
	assert!(logs.contains("403"), "Missing status in failure log: {logs}");
}

#[tokio::test]
async fn unsendable_token_is_logged_as_an_api_failure() {
	let (logs, _guard) = capture_logs();
	let server = MockServer::start_async().await;
	let _token_mock = mock_token(&server, 200, "{\"access_token\":\"abc\\n123\"}").await;
	let listing_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PARTICIPANTS_PATH);
			then.status(200).json_body(json!({ "totalParticipants": 42 }));
		})
		.await;
	let config = test_config(&server.base_url());
	let (issuer, api) = build_reqwest_test_clients(&config);
	let report = ParticipantReport::collect(&issuer, &api, &config.identity).await;

	assert_eq!(report, ParticipantReport::ApiUnavailable { token: AccessToken::new("abc\n123") });

	listing_mock.assert_calls_async(0).await;

	let logs = logs.contents();

	assert!(logs.contains("ERROR"), "Missing error-level event: {logs}");
	assert!(logs.contains("Error when accessing the API."), "Missing failure log: {logs}");
	assert!(logs.contains("Build"), "Missing failure kind in log: {logs}");
}

#[tokio::test]
async fn listing_without_total_is_an_api_failure() {
	let server = MockServer::start_async().await;
	let _token_mock = mock_token(&server, 200, "{\"access_token\":\"abc123\"}").await;
	let _listing_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PARTICIPANTS_PATH);
			then.status(200).json_body(json!({ "participants": [] }));
		})
		.await;
	let config = test_config(&server.base_url());
	let (issuer, api) = build_reqwest_test_clients(&config);
	let report = ParticipantReport::collect(&issuer, &api, &config.identity).await;

	assert_eq!(report, ParticipantReport::ApiUnavailable { token: AccessToken::new("abc123") });
}

#[tokio::test]
async fn token_failure_skips_the_api() {
	let (logs, _guard) = capture_logs();
	let server = MockServer::start_async().await;
	let token_mock = mock_token(&server, 500, "{\"error\":\"server_error\"}").await;
	let listing_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PARTICIPANTS_PATH);
			then.status(200).json_body(json!({ "totalParticipants": 42 }));
		})
		.await;
	let config = test_config(&server.base_url());
	let (issuer, api) = build_reqwest_test_clients(&config);
	let report = ParticipantReport::collect(&issuer, &api, &config.identity).await;

	assert_eq!(report, ParticipantReport::TokenUnavailable);
	assert_eq!(report.to_string(), "Error obtaining access token.");

	token_mock.assert_calls_async(1).await;
	listing_mock.assert_calls_async(0).await;

	let logs = logs.contents();

	assert!(logs.contains("Token request failed."), "Missing failure log: {logs}");
	assert!(logs.contains("server_error"), "Missing response body in failure log: {logs}");
}

#[tokio::test]
async fn missing_token_skips_the_api() {
	let server = MockServer::start_async().await;
	let _token_mock = mock_token(&server, 200, "{}").await;
	let listing_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PARTICIPANTS_PATH);
			then.status(200).json_body(json!({ "totalParticipants": 42 }));
		})
		.await;
	let config = test_config(&server.base_url());
	let (issuer, api) = build_reqwest_test_clients(&config);
	let report = ParticipantReport::collect(&issuer, &api, &config.identity).await;

	assert_eq!(report, ParticipantReport::TokenUnavailable);

	listing_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn broken_key_never_reaches_the_network() {
	let (logs, _guard) = capture_logs();
	let server = MockServer::start_async().await;
	let token_mock = mock_token(&server, 200, "{\"access_token\":\"abc123\"}").await;
	let config = test_config(&server.base_url());
	let (issuer, api) = build_reqwest_test_clients(&config);
	let report =
		ParticipantReport::collect(&issuer, &api, &test_identity_with_broken_key()).await;

	assert_eq!(report, ParticipantReport::TokenUnavailable);

	token_mock.assert_calls_async(0).await;

	let logs = logs.contents();

	assert!(logs.contains("Error signing JWT"), "Missing signing log: {logs}");
	assert!(!logs.contains("not-a-key"), "Key material leaked into logs: {logs}");
}
