//! Failure model for backend calls. Transport failures and non-2xx
//! responses each collapse to one uniform case; client logic never
//! branches on the status code, only surfaces its status line.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    /// The request never produced a decodable HTTP response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Any non-2xx response.
    #[error("server returned {status}")]
    Status { status: StatusCode },
}

impl RequestError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Transport(err) => err.status(),
            RequestError::Status { status } => Some(*status),
        }
    }
}
