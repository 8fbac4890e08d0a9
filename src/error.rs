//! Error types for the drive_mirror crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when talking to Google Drive.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse credentials JSON: {0}")]
    CredentialsParseError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid URL or ID: {0}")]
    InvalidUrlOrId(String),

    #[error("File name is not valid UTF-8: {0}")]
    InvalidFileName(String),

    #[error("JWT encoding error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;

/// Failures recorded while mirroring a local tree.
///
/// Only `InvalidPath` and `Auth` are fatal to the call that produced them;
/// the others are collected into the run report.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("{} is not under mirror root {}", path.display(), root.display())]
    InvalidPath { path: PathBuf, root: PathBuf },

    #[error("Failed to create folder '{segment}' for {}: {source}", relative.display())]
    FolderCreate {
        segment: String,
        relative: PathBuf,
        #[source]
        source: DriveError,
    },

    #[error("Failed to upload {}: {source}", path.display())]
    FileUpload {
        path: PathBuf,
        #[source]
        source: DriveError,
    },

    #[error("Directory name is not valid UTF-8: {}", path.display())]
    InvalidName { path: PathBuf },

    #[error("Failed to read {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },

    #[error("Authentication failed: {0}")]
    Auth(#[source] DriveError),
}
