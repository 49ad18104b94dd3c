use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("AuthError: {0}")]
    Auth(#[from] AuthError),
    #[error("FetchError: {0}")]
    Fetch(#[from] FetchError),
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
}

/// Token issuance failed: the identity endpoint rejected the client
/// credentials or could not be reached. Nothing is cached on this path.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Credentials rejected by identity endpoint: {status} {server_message}")]
    CredentialsRejected { status: u16, server_message: String },
    #[error("Token request failed: {message}")]
    RequestFailed { message: String },
    #[error("Malformed token response: {message}")]
    MalformedResponse { message: String },
}

/// A metadata API call failed after a token was available.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64, endpoint: String },
    #[error("HTTP error: {status} {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("Network error: {message}")]
    Network { endpoint: String, message: String },
    #[error("Malformed payload from {endpoint}: {message}")]
    MalformedPayload { endpoint: String, message: String },
}

/// Failure surface of the fetch orchestrator. The orchestrator is the
/// single place that turns these into a user-visible decision.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("upstream: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("auth: {0}")]
    Auth(#[from] AuthError),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid parameter '{parameter}': {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("Unsafe value for parameter '{parameter}'")]
    UnsafeValue { parameter: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{name}' is missing")]
    MissingVar { name: String },
    #[error("Invalid value for '{name}': {value}: {reason}")]
    InvalidVar {
        name: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Auth(_) => ErrorSeverity::High,
            AppError::Fetch(fetch_error) => match fetch_error {
                FetchError::Auth(_) => ErrorSeverity::High,
                FetchError::Upstream(UpstreamError::Http { status, .. }) if *status >= 500 => {
                    ErrorSeverity::High
                }
                FetchError::Upstream(_) => ErrorSeverity::Medium,
            },
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::Config(_) => ErrorSeverity::Critical,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(err) => {
                (StatusCode::BAD_REQUEST, err.to_string()).into_response()
            }
            // A stale or rejected token is not the browser's fault; send it
            // back to the landing page rather than leaking the cause.
            AppError::Auth(err) | AppError::Fetch(FetchError::Auth(err)) => {
                tracing::error!(error = %err, "token issuance failed");
                Redirect::to("/").into_response()
            }
            AppError::Fetch(FetchError::Upstream(err)) => {
                tracing::error!(error = %err, "upstream fetch failed");
                (StatusCode::BAD_GATEWAY, "metadata service unavailable").into_response()
            }
            AppError::Config(err) => {
                tracing::error!(error = %err, "configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "misconfigured server").into_response()
            }
        }
    }
}
