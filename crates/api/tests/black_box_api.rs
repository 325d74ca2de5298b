use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use serde_json::json;
use webchain_api::ServerConfig;
use webchain_core::{
    Handler, MiddlewareChain, RequestLog, RequestRecord, ResponseWriter, SharedHandler, handler_fn,
    logging, middleware,
};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(handler: SharedHandler, config: ServerConfig) -> Self {
        // Same binding as prod, but on an ephemeral port.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            webchain_api::serve_listener(listener, handler, config)
                .await
                .unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Default)]
struct MemoryLog {
    entries: Mutex<Vec<RequestRecord>>,
}

impl RequestLog for MemoryLog {
    fn record(&self, entry: &RequestRecord) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn trace_header(name: &'static str) -> webchain_core::MiddlewareFn {
    middleware(move |next| {
        handler_fn(move |w, req| {
            w.headers_mut()
                .append("x-trace", axum::http::HeaderValue::from_static(name));
            next.serve(w, req);
        })
    })
}

#[tokio::test]
async fn demo_app_end_to_end() {
    let log = Arc::new(MemoryLog::default());
    let handler = MiddlewareChain::new([logging(log.clone())]).wrap_action(webchain_api::demo::handle);
    let server = TestServer::spawn(handler, ServerConfig::default()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("content-type").is_none());
    assert_eq!(res.text().await.unwrap(), "ok");

    let res = client
        .post(format!("{}/orders", server.base_url))
        .body("four")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "method": "POST", "path": "/orders", "body_bytes": 4 }));

    let res = client
        .get(format!("{}/empty", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.bytes().await.unwrap().is_empty());

    let entries = log.entries.lock().unwrap().clone();
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["/health", "/orders", "/empty"]);
    assert!(entries.iter().all(|e| e.status == StatusCode::OK));
}

#[tokio::test]
async fn last_registered_middleware_runs_first() {
    let chain = MiddlewareChain::new([trace_header("mw1"), trace_header("mw2")]);
    let handler = chain.add([trace_header("mw3")]).wrap_action(|_req: &webchain_core::Request| None);
    let server = TestServer::spawn(handler, ServerConfig::default()).await;

    let res = reqwest::get(format!("{}/", server.base_url)).await.unwrap();

    let order: Vec<&str> = res
        .headers()
        .get_all("x-trace")
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(order, vec!["mw3", "mw2", "mw1"]);
}

#[tokio::test]
async fn oversized_body_is_rejected_before_handler() {
    let log = Arc::new(MemoryLog::default());
    let handler = MiddlewareChain::new([logging(log.clone())]).wrap_action(webchain_api::demo::handle);
    let server = TestServer::spawn(handler, ServerConfig::default().with_max_body_bytes(8)).await;

    let res = reqwest::Client::new()
        .post(format!("{}/upload", server.base_url))
        .body(vec![0u8; 64])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "request body too large" }));
    assert!(log.entries.lock().unwrap().is_empty());
}
