// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use rkstudio_client::{
	_preludet::*,
	auth::AccessToken,
	error::RequestError,
	flows::{ApiClient, QueryParams},
	http::ReqwestHttpClient,
};

const PARTICIPANTS_PATH: &str = "/api/v1/administration/projects/project-2f1c/participants";

fn api(server: &MockServer) -> ApiClient<ReqwestHttpClient> {
	build_reqwest_test_clients(&test_config(&server.base_url())).1
}

#[tokio::test]
async fn get_returns_whole_json_document() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(PARTICIPANTS_PATH)
				.header("authorization", "Bearer abc123")
				.header("accept", "application/json")
				.header("content-type", "application/json; charset=utf-8");
			then.status(200).json_body(json!({
				"totalParticipants": 42,
				"participants": [{ "participantIdentifier": "p-001" }],
			}));
		})
		.await;
	let document: Value = api(&server)
		.get(&AccessToken::new("abc123"), PARTICIPANTS_PATH)
		.await
		.expect("Authorized listing request should succeed.");

	assert_eq!(document["totalParticipants"], 42);
	assert_eq!(document["participants"][0]["participantIdentifier"], "p-001");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn query_parameters_reach_the_server() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(PARTICIPANTS_PATH)
				.query_param("pageSize", "50")
				.query_param("participantIdentifier", "p-001");
			then.status(200).json_body(json!({ "totalParticipants": 7 }));
		})
		.await;
	let query = QueryParams::from([
		("pageSize".to_owned(), "50".to_owned()),
		("participantIdentifier".to_owned(), "p-001".to_owned()),
	]);
	let document: Value = api(&server)
		.get_resource(&AccessToken::new("abc123"), PARTICIPANTS_PATH, &query)
		.await
		.expect("Filtered listing request should succeed.");

	assert_eq!(document["totalParticipants"], 7);

	mock.assert_async().await;
}

#[tokio::test]
async fn forbidden_is_a_resource_request_failure() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PARTICIPANTS_PATH);
			then.status(403).body("{\"message\":\"Forbidden\"}");
		})
		.await;
	let err = api(&server)
		.get::<Value>(&AccessToken::new("abc123"), PARTICIPANTS_PATH)
		.await
		.expect_err("A 403 response must fail the request.");

	match err {
		Error::ResourceRequest { path, source: RequestError::Status { status, body } } => {
			assert_eq!(path, PARTICIPANTS_PATH);
			assert_eq!(status, 403);
			assert!(body.contains("Forbidden"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn only_ok_counts_as_success() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PARTICIPANTS_PATH);
			then.status(204);
		})
		.await;
	let err = api(&server)
		.get::<Value>(&AccessToken::new("abc123"), PARTICIPANTS_PATH)
		.await
		.expect_err("A 204 response must fail the request.");

	assert!(matches!(
		err,
		Error::ResourceRequest { source: RequestError::Status { status: 204, .. }, .. }
	));
}

#[tokio::test]
async fn unexpected_body_is_a_parse_failure() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PARTICIPANTS_PATH);
			then.status(200).body("not json");
		})
		.await;
	let err = api(&server)
		.get::<Value>(&AccessToken::new("abc123"), PARTICIPANTS_PATH)
		.await
		.expect_err("A non-JSON body must fail the request.");

	assert!(matches!(
		err,
		Error::ResourceRequest { source: RequestError::Parse { status: 200, .. }, .. }
	));
}

#[tokio::test]
async fn unsendable_token_is_a_resource_request_failure() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PARTICIPANTS_PATH);
			then.status(200).json_body(json!({ "totalParticipants": 1 }));
		})
		.await;
	let err = api(&server)
		.get::<Value>(&AccessToken::new("abc\n123"), PARTICIPANTS_PATH)
		.await
		.expect_err("A token that cannot form a header must fail the request.");

	match err {
		Error::ResourceRequest { path, source: source @ RequestError::Build { .. } } => {
			assert_eq!(path, PARTICIPANTS_PATH);
			assert_eq!(source.status(), None);
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	mock.assert_calls_async(0).await;
}
