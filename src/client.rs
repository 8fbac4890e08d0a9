//! Google Drive API client.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::auth::Authenticator;
use crate::error::{DriveError, MirrorError, Result};
use crate::models::{ApiErrorResponse, CreateRequest, FileMetadata};
use crate::store::{RemoteFolderId, RemoteStore};

/// Base URL for Google Drive API v3.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Upload URL for Google Drive API.
const UPLOAD_API_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Files above this size go through a resumable session (5 MB).
const RESUMABLE_THRESHOLD: u64 = 5 * 1024 * 1024;

/// Fields requested on every create.
const RESPONSE_FIELDS: &str = "id, name, size, mimeType, webViewLink";

/// Client for creating folders and files in Google Drive.
pub struct DriveClient {
    auth: Authenticator,
    http: Client,
    api_base: String,
    upload_base: String,
}

impl DriveClient {
    pub fn new(auth: Authenticator) -> Self {
        Self {
            auth,
            http: Client::new(),
            api_base: DRIVE_API_BASE.to_string(),
            upload_base: UPLOAD_API_BASE.to_string(),
        }
    }

    /// Load credentials and obtain a first token.
    ///
    /// Any failure here is fatal to a mirror run, so it comes back as
    /// `MirrorError::Auth`.
    pub async fn connect<P: AsRef<Path>>(
        credentials_file: P,
    ) -> std::result::Result<Self, MirrorError> {
        let auth = Authenticator::from_file(credentials_file).map_err(MirrorError::Auth)?;
        auth.authorize().await.map_err(MirrorError::Auth)?;
        Ok(Self::new(auth))
    }

    /// Point the client at different API endpoints (tests, proxies).
    pub fn with_base_urls(mut self, api_base: &str, upload_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.upload_base = upload_base.trim_end_matches('/').to_string();
        self
    }

    /// Create a folder. A folder with the same name under the same parent is
    /// not reused; Drive happily holds both.
    ///
    /// # Arguments
    /// * `name` - Folder name
    /// * `parent_id` - Parent folder, or `None` for My Drive's root
    pub async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<FileMetadata> {
        let token = self.auth.get_access_token().await?;

        let response = self
            .http
            .post(format!("{}/files", self.api_base))
            .bearer_auth(&token)
            .query(&[("supportsAllDrives", "true"), ("fields", RESPONSE_FIELDS)])
            .json(&CreateRequest::folder(name, parent_id))
            .send()
            .await?;

        let metadata: FileMetadata = check_status(response).await?.json().await?;
        debug!(name, id = %metadata.id, "Folder created");
        Ok(metadata)
    }

    /// Upload a file into a folder, named after the local file.
    ///
    /// # Arguments
    /// * `local_path` - Path to the local file
    /// * `parent_id` - Destination folder, or `None` for My Drive's root
    pub async fn upload_file<P: AsRef<Path>>(
        &self,
        local_path: P,
        parent_id: Option<&str>,
    ) -> Result<FileMetadata> {
        let local_path = local_path.as_ref();
        let filename = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DriveError::InvalidFileName(local_path.display().to_string()))?;

        let file_size = tokio::fs::metadata(local_path).await?.len();
        let mime_type = mime_guess::from_path(local_path)
            .first_or_octet_stream()
            .to_string();

        if file_size > RESUMABLE_THRESHOLD {
            self.upload_resumable(local_path, parent_id, filename, &mime_type, file_size)
                .await
        } else {
            self.upload_multipart(local_path, parent_id, filename, &mime_type)
                .await
        }
    }

    /// Upload a file using multipart upload (for smaller files).
    async fn upload_multipart(
        &self,
        local_path: &Path,
        parent_id: Option<&str>,
        filename: &str,
        mime_type: &str,
    ) -> Result<FileMetadata> {
        let token = self.auth.get_access_token().await?;
        let file_content = tokio::fs::read(local_path).await?;

        let metadata = serde_json::to_string(&CreateRequest::file(filename, parent_id))?;
        let metadata_part = Part::text(metadata).mime_str("application/json")?;

        let file_part = Part::bytes(file_content)
            .file_name(filename.to_string())
            .mime_str(mime_type)?;

        let form = Form::new()
            .part("metadata", metadata_part)
            .part("file", file_part);

        let response = self
            .http
            .post(format!("{}/files", self.upload_base))
            .bearer_auth(&token)
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", RESPONSE_FIELDS),
            ])
            .multipart(form)
            .send()
            .await?;

        let metadata: FileMetadata = check_status(response).await?.json().await?;
        Ok(metadata)
    }

    /// Upload a file through a resumable session, streaming it from disk.
    async fn upload_resumable(
        &self,
        local_path: &Path,
        parent_id: Option<&str>,
        filename: &str,
        mime_type: &str,
        file_size: u64,
    ) -> Result<FileMetadata> {
        let token = self.auth.get_access_token().await?;

        // Step 1: Initiate resumable upload
        let init_response = self
            .http
            .post(format!("{}/files", self.upload_base))
            .bearer_auth(&token)
            .query(&[("uploadType", "resumable"), ("supportsAllDrives", "true")])
            .header("X-Upload-Content-Type", mime_type)
            .header("X-Upload-Content-Length", file_size.to_string())
            .json(&CreateRequest::file(filename, parent_id))
            .send()
            .await?;

        let init_response = check_status(init_response).await?;
        let upload_url = init_response
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| DriveError::ApiError {
                status: 500,
                message: "No upload URL in response".to_string(),
            })?
            .to_string();

        // Step 2: Stream the file content
        let file = File::open(local_path).await?;
        let upload_response = self
            .http
            .put(&upload_url)
            .header("Content-Type", mime_type)
            .header("Content-Length", file_size.to_string())
            .query(&[("fields", RESPONSE_FIELDS)])
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;

        let metadata: FileMetadata = check_status(upload_response).await?.json().await?;
        Ok(metadata)
    }
}

/// Turn a non-2xx response into `ApiError`, preferring Google's error body.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return Err(DriveError::ApiError {
            status: api_error.error.code,
            message: api_error.error.message,
        });
    }
    Err(DriveError::ApiError {
        status: status.as_u16(),
        message: error_body,
    })
}

#[async_trait]
impl RemoteStore for DriveClient {
    async fn create_folder(&self, name: &str, parent: Option<&str>) -> Result<RemoteFolderId> {
        DriveClient::create_folder(self, name, parent)
            .await
            .map(|m| m.id)
    }

    async fn upload_file(&self, local_path: &Path, parent: Option<&str>) -> Result<String> {
        DriveClient::upload_file(self, local_path, parent)
            .await
            .map(|m| m.id)
    }
}
