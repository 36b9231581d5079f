use crate::areas::index::IndexLock;
use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::{CacheEntry, EntryMetadata};
use crate::artifacts::index::path_policy::verify_path;
use anyhow::{Context, bail};
use std::path::PathBuf;
use tracing::{debug, info};

impl Repository {
    /// Stage `paths`, all or nothing
    ///
    /// The index lock is held from the first path to the last; any failure
    /// drops it and leaves the persisted index as it was.
    pub fn update_cache(&mut self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let lock = IndexLock::acquire(self.root())?;
        let mut index = self.index()?;

        for path in paths {
            verify_path(path)?;

            let file_path = self.workdir_path(path);
            let metadata = std::fs::metadata(&file_path)
                .with_context(|| format!("unable to stat {}", path.display()))?;
            if !metadata.is_file() {
                bail!("{} is not a regular file", path.display());
            }
            let content = std::fs::read(&file_path)
                .with_context(|| format!("unable to read {}", path.display()))?;

            let entry = CacheEntry::from_path(path, EntryMetadata::from(&metadata), &content)?;

            match index.entry_by_path(path) {
                Some(staged) if staged.oid == entry.oid && self.database().exists(&entry.oid) => {
                    debug!(path = %path.display(), oid = %entry.oid, "content unchanged, refreshing metadata");
                }
                _ => {
                    entry.index_contents(self.database(), &content)?;
                    debug!(path = %path.display(), oid = %entry.oid, "staged new content");
                }
            }

            index.upsert(entry);
        }

        lock.commit(&index)?;
        info!(staged = paths.len(), entries = index.len(), "updated index");

        Ok(())
    }
}
