//! Turning a chain of folder names into a remote folder id.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::error::MirrorError;
use crate::store::{RemoteFolderId, RemoteStore};

/// Creates remote folders segment by segment, top first.
///
/// Every prefix that resolves is remembered for the lifetime of the resolver,
/// so a directory shares its ancestors' folders instead of recreating them.
/// Nothing is looked up remotely: a new resolver always creates new folders.
pub struct FolderResolver<'a, S: RemoteStore + ?Sized> {
    store: &'a S,
    root_parent: Option<RemoteFolderId>,
    resolved: HashMap<PathBuf, RemoteFolderId>,
    created: usize,
}

impl<'a, S: RemoteStore + ?Sized> FolderResolver<'a, S> {
    /// `root_parent` is where the mirror root maps to; `None` is the top level.
    pub fn new(store: &'a S, root_parent: Option<RemoteFolderId>) -> Self {
        Self {
            store,
            root_parent,
            resolved: HashMap::new(),
            created: 0,
        }
    }

    /// Number of folders this resolver has created.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Resolve `segments` to the id of the deepest folder.
    ///
    /// An empty chain is the mirror root and yields the root parent unchanged.
    /// The first failing create aborts the chain; later segments are not
    /// attempted.
    pub async fn resolve(
        &mut self,
        segments: &[String],
    ) -> Result<Option<RemoteFolderId>, MirrorError> {
        let (mut depth, mut current) = self.longest_resolved_prefix(segments);
        let mut prefix: PathBuf = segments[..depth].iter().collect();

        while depth < segments.len() {
            let segment = &segments[depth];
            prefix.push(segment);

            let id = self
                .store
                .create_folder(segment, current.as_deref())
                .await
                .map_err(|source| MirrorError::FolderCreate {
                    segment: segment.clone(),
                    relative: segments.iter().collect(),
                    source,
                })?;
            debug!(path = %prefix.display(), id = %id, "Resolved folder");

            self.created += 1;
            self.resolved.insert(prefix.clone(), id.clone());
            current = Some(id);
            depth += 1;
        }

        Ok(current)
    }

    fn longest_resolved_prefix(&self, segments: &[String]) -> (usize, Option<RemoteFolderId>) {
        (1..=segments.len())
            .rev()
            .find_map(|depth| {
                let prefix: PathBuf = segments[..depth].iter().collect();
                self.resolved
                    .get(&prefix)
                    .map(|id| (depth, Some(id.clone())))
            })
            .unwrap_or_else(|| (0, self.root_parent.clone()))
    }
}
