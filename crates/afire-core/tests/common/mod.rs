// Shared wiremock fixtures for afire-core integration tests.
#![allow(clippy::unwrap_used, dead_code)]

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use afire_api::{Clock, ManualClock};
use afire_core::{CloudClient, Controller, ControllerConfig, Credentials, RefreshEvent};

pub const PRESTIGE_KEY: &str = "e2313fe07bca48fb82861d5f961993c5";

pub fn credentials() -> Credentials {
    Credentials::new("owner@example.com", SecretString::from("hunter2".to_string()))
}

/// Config pointing at the mock server with the timer disabled.
pub fn config_for(server: &MockServer) -> ControllerConfig {
    let mut config = ControllerConfig::new(credentials());
    config.app_id = "test-app".into();
    config.base_url = Some(Url::parse(&server.uri()).unwrap());
    config.refresh_interval = Duration::ZERO;
    config
}

pub fn client_for(server: &MockServer, clock: &Arc<ManualClock>) -> Arc<CloudClient> {
    Arc::new(CloudClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        "test-app",
        credentials(),
        Arc::clone(clock) as Arc<dyn Clock>,
    ))
}

pub fn controller_for(server: &MockServer, config: ControllerConfig) -> Controller {
    let clock = Arc::new(ManualClock::starting_now());
    Controller::with_client(config, client_for(server, &clock))
}

pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "T",
            "uid": "U",
        })))
        .mount(server)
        .await;
}

pub async fn mount_bindings(server: &MockServer, devices: Value) {
    Mock::given(method("GET"))
        .and(path("/bindings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "devices": devices })))
        .mount(server)
        .await;
}

pub async fn mount_attrs(server: &MockServer, did: &str, attrs: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/devdata/{did}/latest")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "attr": attrs })))
        .mount(server)
        .await;
}

/// One fireplace `dev1` with the given attributes.
pub async fn mount_single_device(server: &MockServer, attrs: Value) {
    mount_login(server).await;
    mount_bindings(
        server,
        json!([{
            "did": "dev1",
            "product_name": "AFIRE",
            "mac": "aabbccddeeff",
            "product_key": PRESTIGE_KEY,
        }]),
    )
    .await;
    mount_attrs(server, "dev1", attrs).await;
}

pub async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}

/// Next refresh event, failing the test if none arrives in time.
pub async fn next_event(rx: &mut tokio::sync::broadcast::Receiver<RefreshEvent>) -> RefreshEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for refresh event")
        .unwrap()
}
