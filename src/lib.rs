//! drive_mirror - Mirror a local directory tree into Google Drive.
//!
//! Every local directory becomes a freshly created Drive folder, and every
//! file is uploaded into the folder of its directory. The mirror root itself
//! maps onto an optional existing parent folder. Existing remote folders are
//! never reused, so mirroring the same tree twice yields two copies.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use drive_mirror::{mirror, DriveClient, MirrorOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DriveClient::connect("credentials.json").await?;
//!     let options = MirrorOptions {
//!         parent: Some("folder-id".to_string()),
//!         ..Default::default()
//!     };
//!
//!     let report = mirror(&client, Path::new("./photos"), &options).await;
//!     for failure in &report.failures {
//!         eprintln!("{}", failure);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod mirror;
pub mod models;
pub mod path;
pub mod resolver;
pub mod store;
pub mod url_parser;
pub mod walker;

// Re-exports for convenience
pub use auth::Authenticator;
pub use client::DriveClient;
pub use error::{DriveError, MirrorError, Result};
pub use mirror::{mirror, FileOutcome, MirrorOptions, MirrorReport, Progress};
pub use models::FileMetadata;
pub use resolver::FolderResolver;
pub use store::{RemoteFolderId, RemoteStore};
pub use url_parser::extract_folder_id;
pub use walker::{scan, MirrorTask};
