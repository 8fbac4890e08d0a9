//! Mirroring a local directory tree into the remote store.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::MirrorError;
use crate::path::decompose;
use crate::resolver::FolderResolver;
use crate::store::{RemoteFolderId, RemoteStore};
use crate::walker::{scan, MirrorTask};

/// How a mirror run behaves.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Remote folder the mirror root maps to; `None` is the store's top level.
    pub parent: Option<RemoteFolderId>,
    /// Uploads in flight at once within one directory.
    pub jobs: usize,
    /// Stops the run between directories and between uploads.
    pub cancel: CancellationToken,
    /// Receives one event per attempted upload, as it completes.
    pub progress: Option<UnboundedSender<Progress>>,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            parent: None,
            jobs: 1,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }
}

/// Result of a single upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Uploaded { id: String },
    Failed { error: String },
}

/// Per-file progress. `index` is 1-based over every file found by the scan,
/// so files under a skipped directory leave gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub index: usize,
    pub total: usize,
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// A local directory and the remote folder it was mirrored to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredDirectory {
    pub relative: PathBuf,
    pub folder: Option<RemoteFolderId>,
}

/// A local file and the id of its remote copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub id: String,
}

/// Everything that happened during one run.
#[derive(Debug, Default)]
pub struct MirrorReport {
    pub directories: Vec<MirroredDirectory>,
    pub files: Vec<UploadedFile>,
    /// Remote folders created, which excludes the root parent.
    pub folders_created: usize,
    /// Directories never visited because an ancestor failed.
    pub directories_skipped: usize,
    pub failures: Vec<MirrorError>,
    pub cancelled: bool,
}

impl MirrorReport {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

enum UploadOutcome {
    Uploaded(UploadedFile),
    Failed(MirrorError),
    Cancelled,
}

/// Position of one upload in the run, for progress events.
#[derive(Clone, Copy)]
struct Slot {
    index: usize,
    total: usize,
}

/// Recreate `root`'s folders under `options.parent` and upload every file.
///
/// Directories are visited parent first, and a directory's files are only
/// uploaded once its folder exists. When a folder cannot be created, that
/// directory and everything below it is skipped; the rest of the tree still
/// goes through. A failed upload only costs that one file. The run itself
/// never fails: problems end up in the report.
pub async fn mirror<S>(store: &S, root: &Path, options: &MirrorOptions) -> MirrorReport
where
    S: RemoteStore + ?Sized,
{
    let scan = scan(root);
    let total = scan.file_count();
    info!(
        root = %root.display(),
        directories = scan.tasks.len(),
        files = total,
        "Starting mirror"
    );

    let mut report = MirrorReport {
        failures: scan.failures,
        ..Default::default()
    };
    let mut resolver = FolderResolver::new(store, options.parent.clone());
    let mut abandoned: Vec<PathBuf> = Vec::new();
    let mut seen = 0;

    for task in scan.tasks {
        if options.cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let first = seen + 1;
        seen += task.files.len();

        if abandoned.iter().any(|a| task.relative.starts_with(a)) {
            report.directories_skipped += 1;
            continue;
        }

        let folder = match resolve_task(root, &task, &mut resolver).await {
            Ok(folder) => folder,
            Err(e) => {
                warn!(path = %task.dir.display(), error = %e, "Skipping directory");
                abandoned.push(task.relative.clone());
                report.failures.push(e);
                continue;
            }
        };

        upload_files(
            store,
            &task,
            folder.as_deref(),
            Slot { index: first, total },
            options,
            &mut report,
        )
        .await;
        report.directories.push(MirroredDirectory {
            relative: task.relative,
            folder,
        });
    }

    report.folders_created = resolver.created();
    info!(
        folders = report.folders_created,
        files = report.files.len(),
        failures = report.failure_count(),
        skipped = report.directories_skipped,
        cancelled = report.cancelled,
        "Mirror finished"
    );
    report
}

async fn resolve_task<S>(
    root: &Path,
    task: &MirrorTask,
    resolver: &mut FolderResolver<'_, S>,
) -> Result<Option<RemoteFolderId>, MirrorError>
where
    S: RemoteStore + ?Sized,
{
    let segments = decompose(root, &task.dir)?;
    resolver.resolve(&segments).await
}

async fn upload_files<S>(
    store: &S,
    task: &MirrorTask,
    parent: Option<&str>,
    first: Slot,
    options: &MirrorOptions,
    report: &mut MirrorReport,
) where
    S: RemoteStore + ?Sized,
{
    // Ordered output, concurrent execution.
    let outcomes: Vec<UploadOutcome> = stream::iter(task.files.iter().enumerate())
        .map(|(i, path)| {
            let slot = Slot {
                index: first.index + i,
                ..first
            };
            upload_one(store, path, parent, slot, options)
        })
        .buffered(options.jobs.max(1))
        .collect()
        .await;

    for outcome in outcomes {
        match outcome {
            UploadOutcome::Uploaded(file) => report.files.push(file),
            UploadOutcome::Failed(e) => report.failures.push(e),
            UploadOutcome::Cancelled => report.cancelled = true,
        }
    }
}

async fn upload_one<S>(
    store: &S,
    path: &Path,
    parent: Option<&str>,
    slot: Slot,
    options: &MirrorOptions,
) -> UploadOutcome
where
    S: RemoteStore + ?Sized,
{
    if options.cancel.is_cancelled() {
        return UploadOutcome::Cancelled;
    }

    let (outcome, event) = match store.upload_file(path, parent).await {
        Ok(id) => {
            info!(path = %path.display(), id = %id, "Uploaded");
            let event = FileOutcome::Uploaded { id: id.clone() };
            let file = UploadedFile {
                path: path.to_path_buf(),
                id,
            };
            (UploadOutcome::Uploaded(file), event)
        }
        Err(source) => {
            warn!(path = %path.display(), error = %source, "Upload failed");
            let event = FileOutcome::Failed {
                error: source.to_string(),
            };
            let failure = MirrorError::FileUpload {
                path: path.to_path_buf(),
                source,
            };
            (UploadOutcome::Failed(failure), event)
        }
    };

    if let Some(progress) = &options.progress {
        // The receiver going away only means nobody is watching.
        let _ = progress.send(Progress {
            index: slot.index,
            total: slot.total,
            path: path.to_path_buf(),
            outcome: event,
        });
    }
    outcome
}
