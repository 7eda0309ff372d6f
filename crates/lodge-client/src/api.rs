//! API gateway.
//!
//! [`ApiClient`] wraps every backend call: it resolves endpoint paths
//! against the configured base URL, attaches the session credential, and
//! turns the backend's forced-redirect answer (403 carrying a
//! `redirect_url`) into [`Outcome::Redirecting`] after wiping the session.
//! Every other failure comes back to the caller as an [`ApiError`].

use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION};
use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};
use crate::nav::{Navigator, Route};
use crate::session::SessionHandle;

/// Result of a call that did not fail.
///
/// `Redirecting` means the backend terminated the session: local state is
/// already cleared and navigation already happened. Callers stop there and
/// do not report anything.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Redirecting(String),
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(value) => Outcome::Done(f(value)),
            Outcome::Redirecting(target) => Outcome::Redirecting(target),
        }
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Redirecting(_) => None,
        }
    }

    pub fn is_redirecting(&self) -> bool {
        matches!(self, Outcome::Redirecting(_))
    }
}

/// Binary payload with the file name the server suggested, if any.
#[derive(Debug, Clone)]
pub struct Download {
    pub bytes: Bytes,
    pub file_name: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: SessionHandle,
    navigator: Navigator,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        session: SessionHandle,
        navigator: Navigator,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| ClientError::Setup(format!("invalid API URL {}: {e}", config.api_url)))?;
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            session,
            navigator,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Url(format!("{path}: {e}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        let auth = self
            .session
            .lock()
            .map_err(|e| ApiError::Session(e.to_string()))?
            .auth_header();

        let mut builder = self.http.request(method, url);
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        Ok(builder)
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<Outcome<Response>, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(Outcome::Done(response));
        }

        let url = response.url().clone();
        let body = response.bytes().await.unwrap_or_default();
        let json: Option<Value> = serde_json::from_slice(&body).ok();

        if status == StatusCode::FORBIDDEN {
            let target = json
                .as_ref()
                .and_then(|v| v.get("redirect_url"))
                .and_then(Value::as_str)
                .filter(|t| !t.trim().is_empty());
            if let Some(target) = target {
                return Ok(Outcome::Redirecting(self.force_redirect(target)));
            }
        }

        let detail = json.as_ref().and_then(extract_detail);
        debug!(%url, status = status.as_u16(), ?detail, "request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }

    /// Wipe the session and navigate to the server-chosen target.
    fn force_redirect(&self, target: &str) -> String {
        warn!(target, "server forced session termination");
        match self.session.lock() {
            Ok(mut session) => {
                if let Err(e) = session.clear() {
                    error!(error = %e, "failed to clear session storage");
                }
            }
            Err(e) => error!(error = %e, "session lock poisoned during forced redirect"),
        }
        self.navigator.go(Route::parse(target));
        target.to_string()
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Outcome<T>, ApiError> {
        match self.dispatch(builder).await? {
            Outcome::Done(response) => {
                let bytes = response.bytes().await?;
                serde_json::from_slice(&bytes)
                    .map(Outcome::Done)
                    .map_err(|e| ApiError::Decode(e.to_string()))
            }
            Outcome::Redirecting(target) => Ok(Outcome::Redirecting(target)),
        }
    }

    async fn send_unit(&self, builder: RequestBuilder) -> Result<Outcome<()>, ApiError> {
        Ok(self.dispatch(builder).await?.map(|_| ()))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Outcome<T>, ApiError> {
        let builder = self.request(Method::GET, path)?;
        self.send_json(builder).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<Outcome<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path)?.json(body);
        self.send_json(builder).await
    }

    /// POST without a body, decoding the JSON answer.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<Outcome<T>, ApiError> {
        let builder = self.request(Method::POST, path)?;
        self.send_json(builder).await
    }

    /// POST with an optional JSON body, ignoring the answer.
    pub async fn post_unit<B>(&self, path: &str, body: Option<&B>) -> Result<Outcome<()>, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self.request(Method::POST, path)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send_unit(builder).await
    }

    pub async fn delete(&self, path: &str) -> Result<Outcome<()>, ApiError> {
        let builder = self.request(Method::DELETE, path)?;
        self.send_unit(builder).await
    }

    pub async fn download(&self, path: &str) -> Result<Outcome<Download>, ApiError> {
        let builder = self.request(Method::GET, path)?;
        match self.dispatch(builder).await? {
            Outcome::Done(response) => {
                let file_name = response
                    .headers()
                    .get(CONTENT_DISPOSITION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(disposition_file_name);
                let bytes = response.bytes().await?;
                Ok(Outcome::Done(Download { bytes, file_name }))
            }
            Outcome::Redirecting(target) => Ok(Outcome::Redirecting(target)),
        }
    }

    pub async fn upload(&self, path: &str, form: multipart::Form) -> Result<Outcome<()>, ApiError> {
        let builder = self.request(Method::POST, path)?.multipart(form);
        self.send_unit(builder).await
    }
}

/// `detail` is the backend's usual error field, `error` the entry gate's.
fn extract_detail(body: &Value) -> Option<String> {
    ["detail", "error"].iter().find_map(|key| match body.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

/// File name from `attachment; filename="backup.sqlite3"`.
fn disposition_file_name(header: &str) -> Option<String> {
    header.split(';').find_map(|part| {
        let value = part.trim().strip_prefix("filename=")?;
        let name = value.trim_matches('"').trim();
        // Keep only the last path component.
        let name = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
        (!matches!(name, "" | "." | "..")).then(|| name.to_string())
    })
}
