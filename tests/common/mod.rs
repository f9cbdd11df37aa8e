//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::Router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use report_review::config::{AppConfig, ModelConfig};
use report_review::host::MemoryHost;
use report_review::lifecycle::{bootstrap, App, Shutdown};
use report_review::routing::{NavigationState, StateReceiver};
use report_review::views::{StandardViews, ViewLoader};
use report_review::{ReportStore, ReviewServer};

/// A verdict where every section passes.
pub const PASSING_VERDICT: &str = r#"{"委托表":"合法","免责声明":"合法","补课年级":"合法","补课时间":"合法","举报途径":"合法","收费情况":"合法","违规行为":"合法"}"#;

/// Serve `router` on an ephemeral local port.
pub async fn start_mock(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// OpenAI-style completion body carrying `content`.
pub fn chat_reply(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
}

/// SSE body streaming `parts` as content deltas.
pub fn sse_body(parts: &[&str]) -> String {
    let mut body = String::new();
    for part in parts {
        let chunk = json!({ "choices": [{ "index": 0, "delta": { "content": part } }] });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

pub fn model(name: &str, upstream: SocketAddr) -> ModelConfig {
    ModelConfig {
        name: name.to_string(),
        model: format!("{}-upstream", name),
        api_key: "sk-test".to_string(),
        base_url: format!("http://{}/v1", upstream),
        json_format: None,
    }
}

/// Start the review backend on an ephemeral port.
pub async fn start_review_server(config: AppConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let store = ReportStore::in_memory().await.unwrap();
    let server = ReviewServer::new(&config, store).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Bootstrap the application in an in-memory host.
pub async fn start_app(start_path: &str) -> (App, Arc<MemoryHost>, Shutdown) {
    start_app_with(start_path, Arc::new(StandardViews::new(Some("qwen".into())))).await
}

pub async fn start_app_with(
    start_path: &str,
    loader: Arc<dyn ViewLoader>,
) -> (App, Arc<MemoryHost>, Shutdown) {
    let mut config = AppConfig::default().shell;
    config.start_path = start_path.to_string();

    let host = Arc::new(MemoryHost::new());
    let shutdown = Shutdown::new();
    let app = bootstrap(&config, host.clone(), loader, shutdown.subscribe())
        .await
        .unwrap();
    (app, host, shutdown)
}

/// Wait until the published state satisfies `f`.
pub async fn wait_for_state<F>(rx: &mut StateReceiver, f: F) -> NavigationState
where
    F: Fn(&NavigationState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| f(s)))
        .await
        .expect("timed out waiting for navigation")
        .expect("dispatcher dropped")
        .clone()
}
