#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Google Sheets plumbing: stored OAuth credentials and the two value-range
//! calls needed to read student rows and write their status back.

/// Authorized-user token file handling and refresh.
pub mod auth;
/// Sheets API v4 value-range client.
pub mod client;

use std::path::PathBuf;

pub use auth::{AuthorizedUser, TokenStore};
pub use client::{CellValue, SheetsClient, UpdateValuesResponse};

/// Errors raised by the spreadsheet collaborators.
#[derive(thiserror::Error, Debug)]
pub enum SheetsError {
    /// The request never produced a usable response.
    #[error("Request to {url} failed: {source}")]
    Http {
        /// URL that was requested
        url:    String,
        /// transport error
        #[source]
        source: reqwest::Error,
    },
    /// Google answered with a non-success status.
    #[error("Google API returned {status}: {message}")]
    Api {
        /// HTTP status code
        status:  u16,
        /// message from the error envelope, or the raw body
        message: String,
    },
    /// No token file exists yet.
    #[error(
        "No authorized-user token at `{0}`. Complete the OAuth consent flow once to create it."
    )]
    MissingToken(PathBuf),
    /// The token has expired and cannot be refreshed.
    #[error("The token at `{0}` has expired and holds no refresh token.")]
    NoRefreshToken(PathBuf),
    /// The token file could not be read or written.
    #[error("Could not access token file `{path}`: {source}")]
    TokenIo {
        /// token file path
        path:   PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },
    /// The token file is not valid JSON of the expected shape.
    #[error("Token file `{path}` is malformed: {source}")]
    TokenFormat {
        /// token file path
        path:   PathBuf,
        /// JSON error
        #[source]
        source: serde_json::Error,
    },
    /// The spreadsheet API base URL is unusable.
    #[error("Invalid Sheets API base URL `{0}`.")]
    BadBaseUrl(String),
}

/// Shape of Google's JSON error body.
#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    /// the error details
    error: ErrorBody,
}

/// Details inside [`ErrorEnvelope`].
#[derive(serde::Deserialize)]
struct ErrorBody {
    /// human readable message
    message: String,
}

/// Turns a failed response into [`SheetsError::Api`], preferring the message
/// from Google's error envelope over the raw body.
pub(crate) async fn api_error(response: reqwest::Response) -> SheetsError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    SheetsError::Api { status, message }
}
