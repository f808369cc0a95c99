use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const MAX_PATH_LENGTH: usize = 8192;
pub const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

const JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A request against the backend. `path` is always rooted, e.g.
/// `/api/caption/a%20b`; `url` is what the shell fetches, which is the path
/// itself for same-origin shells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    method: HttpMethod,
    path: String,
    url: String,
    content_type: Option<String>,
    body: Option<Vec<u8>>,
    request_id: String,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Result<Self, HttpError> {
        let path = path.into();
        Self::validate_path(&path)?;
        Ok(Self {
            method,
            url: path.clone(),
            path,
            content_type: None,
            body: None,
            request_id: uuid::Uuid::new_v4().to_string(),
        })
    }

    pub fn get(path: impl Into<String>) -> Result<Self, HttpError> {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Result<Self, HttpError> {
        Self::new(HttpMethod::Post, path)
    }

    /// Point the request at `base` instead of the shell's own origin.
    /// Escapes in the path are kept as they are.
    pub fn on_origin(mut self, base: Option<&Url>) -> Result<Self, HttpError> {
        if let Some(base) = base {
            let url = base.join(&self.path).map_err(|e| HttpError::InvalidPath {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
            self.url = url.into();
        }
        Ok(self)
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, HttpError> {
        if self.method != HttpMethod::Post {
            return Err(HttpError::InvalidRequest {
                reason: format!("{} requests cannot have a body", self.method.as_str()),
            });
        }

        let body = serde_json::to_vec(value).map_err(|e| HttpError::Serialization {
            message: e.to_string(),
        })?;

        if body.len() > MAX_REQUEST_BODY_SIZE {
            return Err(HttpError::InvalidRequest {
                reason: format!(
                    "request body of {} bytes exceeds maximum of {MAX_REQUEST_BODY_SIZE} bytes",
                    body.len()
                ),
            });
        }

        self.content_type = Some(JSON.to_string());
        self.body = Some(body);
        Ok(self)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    fn validate_path(path: &str) -> Result<(), HttpError> {
        let invalid = |reason: &str| HttpError::InvalidPath {
            path: path.chars().take(100).collect(),
            reason: reason.to_string(),
        };

        if !path.starts_with('/') {
            return Err(invalid("path must start with '/'"));
        }
        if path.starts_with("//") {
            return Err(invalid("path cannot be protocol-relative"));
        }
        if path.len() > MAX_PATH_LENGTH {
            return Err(invalid("path exceeds maximum length"));
        }
        if path.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(invalid("path contains whitespace or control characters"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_string(&self, request_id: &str) -> Result<String, HttpError> {
        String::from_utf8(self.body.clone()).map_err(|e| HttpError::InvalidResponse {
            reason: format!("body is not valid UTF-8: {e}"),
            request_id: request_id.to_string(),
        })
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self, request_id: &str) -> Result<T, HttpError> {
        serde_json::from_slice(&self.body).map_err(|e| HttpError::InvalidResponse {
            reason: format!("failed to parse JSON: {e}"),
            request_id: request_id.to_string(),
        })
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum HttpError {
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("connection failed: {message}")]
    Connection { message: String, request_id: String },

    #[error("timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64, request_id: String },

    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String, request_id: String },
}

impl HttpError {
    pub fn request_id(&self) -> Option<&str> {
        match self {
            HttpError::Connection { request_id, .. }
            | HttpError::Timeout { request_id, .. }
            | HttpError::InvalidResponse { request_id, .. } => Some(request_id),
            _ => None,
        }
    }
}

pub type HttpResult = Result<HttpResponse, HttpError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpOperation {
    Execute(HttpRequest),
}

impl HttpOperation {
    pub fn request(&self) -> &HttpRequest {
        match self {
            HttpOperation::Execute(request) => request,
        }
    }
}

impl Operation for HttpOperation {
    type Output = HttpResult;
}

pub struct Http<Ev> {
    context: CapabilityContext<HttpOperation, Ev>,
}

impl<Ev> Capability<Ev> for Http<Ev> {
    type Operation = HttpOperation;
    type MappedSelf<MappedEv> = Http<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Http::new(self.context.map_event(f))
    }
}

impl<Ev> Http<Ev> {
    pub fn new(context: CapabilityContext<HttpOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Http<Ev>
where
    Ev: 'static,
{
    /// Hand the request to the shell. The callback receives the shell's
    /// result tagged with the request id so failures can be traced back to it.
    pub fn send<F>(&self, request: HttpRequest, callback: F)
    where
        F: FnOnce(String, HttpResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        let request_id = request.request_id().to_string();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(HttpOperation::Execute(request))
                .await;
            ctx.update_app(callback(request_id, result));
        });
    }
}
