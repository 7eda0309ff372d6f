//! In-process mock backend for client integration tests.
//!
//! Every request is recorded. Responses are canned per `(method, path)`;
//! anything unregistered answers 404.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use lodge_client_lib::{AppState, ClientConfig};
use lodge_shared::constants::{KEY_AUTH_TOKEN, KEY_ENTRY_VERIFIED, KEY_USER};
use lodge_store::LocalStorage;

#[derive(Debug, Clone)]
pub struct Canned {
    pub status: StatusCode,
    pub body: Bytes,
    pub headers: Vec<(header::HeaderName, String)>,
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Default)]
struct Inner {
    routes: Mutex<HashMap<(Method, String), Canned>>,
    requests: Mutex<Vec<Recorded>>,
}

pub struct MockBackend {
    addr: SocketAddr,
    inner: Arc<Inner>,
    handle: JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(
    State(inner): State<Arc<Inner>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let path = uri.path().to_string();
    inner.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body,
    });

    let canned = inner.routes.lock().unwrap().get(&(method, path)).cloned();
    let canned = canned.unwrap_or_else(|| Canned {
        status: StatusCode::NOT_FOUND,
        body: Bytes::from(json!({"detail": "Not found."}).to_string()),
        headers: vec![(header::CONTENT_TYPE, "application/json".into())],
    });

    let mut response = Response::builder().status(canned.status);
    for (name, value) in canned.headers {
        response = response.header(name, value);
    }
    response.body(Body::from(canned.body)).unwrap()
}

impl MockBackend {
    pub async fn start() -> Self {
        let inner = Arc::new(Inner::default());
        let app = Router::new().fallback(handle).with_state(inner.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            inner,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn on_json(&self, method: Method, path: &str, status: u16, body: Value) {
        self.on(
            method,
            path,
            Canned {
                status: StatusCode::from_u16(status).unwrap(),
                body: Bytes::from(body.to_string()),
                headers: vec![(header::CONTENT_TYPE, "application/json".into())],
            },
        );
    }

    pub fn on(&self, method: Method, path: &str, canned: Canned) {
        self.inner
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), canned);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Client state pointed at this backend, with in-memory storage seeded
    /// from the given session keys.
    pub fn state(&self, session: Seed) -> AppState {
        let storage = LocalStorage::open_in_memory().unwrap();
        if session.entry_verified {
            storage.set_item(KEY_ENTRY_VERIFIED, "true").unwrap();
        }
        if let Some(token) = session.token {
            storage.set_item(KEY_AUTH_TOKEN, token).unwrap();
        }
        if let Some(user) = session.user {
            storage.set_item(KEY_USER, &user.to_string()).unwrap();
        }
        AppState::with_storage(ClientConfig::default().with_api_url(&self.url()), storage).unwrap()
    }
}

/// Initial persisted session for [`MockBackend::state`].
#[derive(Debug, Default)]
pub struct Seed {
    pub entry_verified: bool,
    pub token: Option<&'static str>,
    pub user: Option<Value>,
}

impl Seed {
    pub fn verified() -> Self {
        Self {
            entry_verified: true,
            ..Self::default()
        }
    }

    /// Verified, logged in, with the given role and inquisitor flag.
    pub fn member(role: &str, inquisitor: bool) -> Self {
        Self {
            entry_verified: true,
            token: Some("test-token"),
            user: Some(json!({
                "id": 1,
                "username": "hiram",
                "email": "hiram@lodge.org",
                "role": role,
                "is_inquisitor": inquisitor,
            })),
        }
    }
}
