use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::capabilities::HttpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Network unreachable, connection reset, request aborted.
    Network,
    /// The server answered with a non-2xx status.
    HttpStatus,
    /// The response body could not be decoded.
    Decoding,
    /// The shell has no viewport observation facility.
    ObservationUnavailable,
    /// A request could not be built.
    Validation,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::HttpStatus => "HTTP_STATUS",
            Self::Decoding => "DECODING_ERROR",
            Self::ObservationUnavailable => "OBSERVATION_UNAVAILABLE",
            Self::Validation => "VALIDATION_ERROR",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub context: BTreeMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        let message = body
            .and_then(|b| std::str::from_utf8(b).ok())
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(|b| b.chars().take(200).collect::<String>())
            .unwrap_or_else(|| format!("HTTP error: {status}"));

        Self::new(ErrorKind::HttpStatus, message).with_context("http_status", status.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

impl From<HttpError> for AppError {
    fn from(e: HttpError) -> Self {
        let kind = match &e {
            HttpError::InvalidResponse { .. } | HttpError::Serialization { .. } => {
                ErrorKind::Decoding
            }
            HttpError::InvalidPath { .. } | HttpError::InvalidRequest { .. } => {
                ErrorKind::Validation
            }
            HttpError::Connection { .. } | HttpError::Timeout { .. } => ErrorKind::Network,
        };
        let mut error = Self::new(kind, e.to_string());
        if let Some(request_id) = e.request_id() {
            error = error.with_context("request_id", request_id);
        }
        error
    }
}

pub type AppResult<T> = Result<T, AppError>;
