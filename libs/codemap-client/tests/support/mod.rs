//! In-process stub of the mapping backend

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use codemap_client::{ClientConfig, HttpMapperClient};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

#[derive(Clone, Default)]
struct Shared {
    routes: Arc<Mutex<HashMap<(Method, String), Canned>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct StubBackend {
    pub base_url: String,
    shared: Shared,
}

impl StubBackend {
    pub async fn start() -> anyhow::Result<Self> {
        let shared = Shared::default();
        let app = Router::new().fallback(respond).with_state(shared.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self {
            base_url: format!("http://{addr}/research"),
            shared,
        })
    }

    pub fn client(&self) -> anyhow::Result<HttpMapperClient> {
        Ok(HttpMapperClient::new(ClientConfig::new(&self.base_url))?)
    }

    pub fn json(&self, method: Method, path: &str, body: serde_json::Value) {
        self.canned(method, path, StatusCode::OK, "application/json", body.to_string());
    }

    pub fn text(&self, method: Method, path: &str, body: &str) {
        self.canned(method, path, StatusCode::OK, "text/plain", body.to_string());
    }

    pub fn status(&self, method: Method, path: &str, status: StatusCode) {
        self.canned(method, path, status, "text/plain", String::new());
    }

    fn canned(
        &self,
        method: Method,
        path: &str,
        status: StatusCode,
        content_type: &'static str,
        body: String,
    ) {
        self.shared.routes.lock().unwrap().insert(
            (method, path.to_string()),
            Canned {
                status,
                content_type,
                body,
            },
        );
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }
}

async fn respond(State(shared): State<Shared>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().to_string();
    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    shared.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        body,
    });

    let canned = shared.routes.lock().unwrap().get(&(method, path)).cloned();
    match canned {
        Some(c) => (c.status, [(header::CONTENT_TYPE, c.content_type)], c.body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
