//! Directory cache and nonce behavior against a mock ACME server

mod common;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use certinel::AcmeError;
use common::{anonymous_client, mock_directory};

#[tokio::test]
async fn test_directory_is_fetched_once_and_cached() {
    let server = MockServer::start().await;
    mock_directory(&server, false).await;

    let client = anonymous_client(&server);
    let first = client.directory().all().await.unwrap();
    let second = client.directory().all().await.unwrap();
    assert_eq!(first.new_order, second.new_order);

    let directory_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/dir")
        .count();
    assert_eq!(directory_requests, 1);
}

#[tokio::test]
async fn test_refresh_forces_refetch() {
    let server = MockServer::start().await;
    mock_directory(&server, false).await;

    let client = anonymous_client(&server);
    client.directory().all().await.unwrap();
    client.directory().refresh().await.unwrap();

    let directory_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/dir")
        .count();
    assert_eq!(directory_requests, 2);
}

#[tokio::test]
async fn test_supports_ari_follows_directory() {
    let server = MockServer::start().await;
    mock_directory(&server, true).await;
    let client = anonymous_client(&server);
    assert!(client.directory().supports_ari().await.unwrap());

    let server = MockServer::start().await;
    mock_directory(&server, false).await;
    let client = anonymous_client(&server);
    assert!(!client.directory().supports_ari().await.unwrap());
}

#[tokio::test]
async fn test_order_base_url_derivation() {
    let server = MockServer::start().await;
    mock_directory(&server, false).await;

    let client = anonymous_client(&server);
    let base = client.directory().order_base_url().await.unwrap();
    assert_eq!(base, format!("{}/acme/order/", server.uri()));
}

#[tokio::test]
async fn test_directory_failure_is_a_problem() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dir"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    match client.directory().all().await {
        Err(AcmeError::Directory(problem)) => assert_eq!(problem.status, 503),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_nonce_comes_from_replay_nonce_header() {
    let server = MockServer::start().await;
    mock_directory(&server, false).await;
    Mock::given(method("HEAD"))
        .and(path("/acme/new-nonce"))
        .respond_with(ResponseTemplate::new(200).insert_header("Replay-Nonce", "  abc-123  "))
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    assert_eq!(client.nonce().get_new().await.unwrap(), "abc-123");
}

#[tokio::test]
async fn test_missing_nonce_header_is_an_error() {
    let server = MockServer::start().await;
    mock_directory(&server, false).await;
    Mock::given(method("HEAD"))
        .and(path("/acme/new-nonce"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    assert!(matches!(
        client.nonce().get_new().await,
        Err(AcmeError::MissingNonce)
    ));
}
