//! The remote object store as seen by the mirroring core.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Opaque handle of a remote folder, as returned by the store.
pub type RemoteFolderId = String;

/// Folder and file creation in a store that models folders as named objects.
///
/// Neither call is idempotent: retrying a call that actually succeeded
/// creates a duplicate. Callers invoke each at most once per item.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create a folder named `name`, under `parent` or at the top level.
    async fn create_folder(&self, name: &str, parent: Option<&str>) -> Result<RemoteFolderId>;

    /// Upload `local_path` under `parent`, named after its basename.
    async fn upload_file(&self, local_path: &Path, parent: Option<&str>) -> Result<String>;
}
