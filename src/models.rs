//! Data models for Google Drive API requests and responses.

use serde::{Deserialize, Serialize};

/// MIME type Google Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Metadata for a file or folder in Google Drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub size: Option<u64>,
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) => s.parse::<u64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Request body for creating a file or folder.
///
/// `parents` is omitted entirely when no parent is given, which places the
/// object in the caller's root.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<&'a str>,
}

impl<'a> CreateRequest<'a> {
    pub fn folder(name: &'a str, parent: Option<&'a str>) -> Self {
        Self {
            name,
            mime_type: Some(FOLDER_MIME_TYPE),
            parents: parent.into_iter().collect(),
        }
    }

    pub fn file(name: &'a str, parent: Option<&'a str>) -> Self {
        Self {
            name,
            mime_type: None,
            parents: parent.into_iter().collect(),
        }
    }
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Credentials file contents. Either kind may carry its own token endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Credentials {
    ServiceAccount(ServiceAccountCredentials),
    AuthorizedUser(AuthorizedUserCredentials),
}

impl Credentials {
    pub fn token_uri(&self) -> Option<&str> {
        match self {
            Credentials::ServiceAccount(c) => c.token_uri.as_deref(),
            Credentials::AuthorizedUser(c) => c.token_uri.as_deref(),
        }
    }
}

/// Service account credentials from JSON file.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: Option<String>,
}

/// Credentials of a user who already granted consent, as written by
/// `gcloud auth application-default login`.
#[derive(Debug, Deserialize)]
pub struct AuthorizedUserCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub token_uri: Option<String>,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_request_with_parent() {
        let body = serde_json::to_value(CreateRequest::folder("docs", Some("P"))).unwrap();
        assert_eq!(body["name"], "docs");
        assert_eq!(body["mimeType"], FOLDER_MIME_TYPE);
        assert_eq!(body["parents"], serde_json::json!(["P"]));
    }

    #[test]
    fn test_file_request_without_parent() {
        let body = serde_json::to_value(CreateRequest::file("a.txt", None)).unwrap();
        assert_eq!(body, serde_json::json!({ "name": "a.txt" }));
    }

    #[test]
    fn test_credentials_kinds() {
        let sa: Credentials = serde_json::from_str(
            r#"{"client_email": "svc@p.iam.gserviceaccount.com", "private_key": "k"}"#,
        )
        .unwrap();
        assert!(matches!(sa, Credentials::ServiceAccount(_)));

        let user: Credentials = serde_json::from_str(
            r#"{"client_id": "id", "client_secret": "s", "refresh_token": "r",
                "token_uri": "http://localhost/token"}"#,
        )
        .unwrap();
        assert!(matches!(user, Credentials::AuthorizedUser(_)));
        assert_eq!(user.token_uri(), Some("http://localhost/token"));
    }

    #[test]
    fn test_folder_metadata() {
        let json = r#"{"id": "f1", "name": "sub", "mimeType": "application/vnd.google-apps.folder"}"#;
        let metadata: FileMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.mime_type.as_deref(), Some(FOLDER_MIME_TYPE));
        assert_eq!(metadata.size, None);
    }
}
