//! Parsing the remote parent folder argument.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DriveError, Result};

/// `https://drive.google.com/drive/[u/N/]folders/<ID>`
static FOLDER_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/drive/(?:u/\d+/)?folders/([a-zA-Z0-9_-]+)")
        .expect("Invalid folder URL regex")
});

/// `https://drive.google.com/open?id=<ID>`
static OPEN_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/open\?id=([a-zA-Z0-9_-]+)")
        .expect("Invalid open URL regex")
});

static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid ID regex"));

/// Turn a folder URL or a raw folder id into the id.
///
/// File links (`/file/d/<ID>`) are rejected: a file cannot be a parent.
///
/// ```
/// use drive_mirror::url_parser::extract_folder_id;
///
/// let id = extract_folder_id("https://drive.google.com/drive/folders/1abc123").unwrap();
/// assert_eq!(id, "1abc123");
/// assert_eq!(extract_folder_id("1abc123").unwrap(), "1abc123");
/// ```
pub fn extract_folder_id(url_or_id: &str) -> Result<String> {
    let trimmed = url_or_id.trim();

    [&FOLDER_URL_REGEX, &OPEN_URL_REGEX]
        .iter()
        .find_map(|re| re.captures(trimmed).and_then(|c| c.get(1)))
        .map(|m| m.as_str().to_string())
        .or_else(|| ID_REGEX.is_match(trimmed).then(|| trimmed.to_string()))
        .ok_or_else(|| DriveError::InvalidUrlOrId(url_or_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_url_with_user() {
        let url = "https://drive.google.com/drive/u/2/folders/1abc123XYZ";
        assert_eq!(extract_folder_id(url).unwrap(), "1abc123XYZ");
    }

    #[test]
    fn test_open_url() {
        let url = "https://drive.google.com/open?id=1abc123XYZ";
        assert_eq!(extract_folder_id(url).unwrap(), "1abc123XYZ");
    }

    #[test]
    fn test_file_url_rejected() {
        assert!(extract_folder_id("https://drive.google.com/file/d/1abc/view").is_err());
    }

    #[test]
    fn test_blank_rejected() {
        assert!(extract_folder_id("").is_err());
        assert!(extract_folder_id("   ").is_err());
    }
}
