//! Cache index (staging area)
//!
//! The index records which file snapshots are staged for the next tree,
//! together with the metadata needed to notice later changes.
//!
//! ## Persistence
//!
//! The whole file is rewritten on every update: the new content goes to
//! `index.lock`, which is then renamed over `index`. The lock file is created
//! exclusively and held for the whole staging operation, so a second
//! concurrent stager fails fast with [`Error::LockHeld`] instead of
//! interleaving writes. A reader only ever sees a complete file.
//!
//! ## Ordering
//!
//! Entries are kept sorted by their raw path bytes. Inserting a path that is
//! already staged replaces that entry in place.

use crate::artifacts::core::cursor::ByteCursor;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::CacheEntry;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{SIGNATURE, VERSION};
use crate::error::{Error, IoResultExt, Result};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const INDEX_FILE: &str = "index";
pub const LOCK_FILE: &str = "index.lock";

/// Staged entries keyed by raw path bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: BTreeMap<Vec<u8>, CacheEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `<root>/index`; a missing file is an empty index
    pub fn load(root: &Path) -> Result<Self> {
        let index_path = root.join(INDEX_FILE);

        let data = match std::fs::read(&index_path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %index_path.display(), "no index file, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(e).with_path(&index_path),
        };

        let index = Self::parse(Bytes::from(data))?;
        debug!(path = %index_path.display(), entries = index.len(), "loaded index");

        Ok(index)
    }

    /// Decode and verify a complete index file
    pub fn parse(data: Bytes) -> Result<Self> {
        let mut cursor = ByteCursor::new(data.clone());

        let header = IndexHeader::parse(&mut cursor)?;
        header.validate()?;

        let mut checksum = Checksum::new();
        checksum.update(&header.checksummed_fields());

        let mut index = Self::new();
        for _ in 0..header.entries_count {
            let start = cursor.position();
            let entry = CacheEntry::decode(&mut cursor)?;
            checksum.update(&data[start..cursor.position()]);

            if let Some(previous) = index.upsert(entry) {
                return Err(Error::Corrupt(format!(
                    "index lists {} more than once",
                    previous.name.display()
                )));
            }
        }

        checksum.verify(&header.checksum)?;

        if !cursor.is_empty() {
            return Err(Error::Corrupt(format!(
                "{} unexpected bytes after the last index entry",
                cursor.remaining()
            )));
        }

        Ok(index)
    }

    /// Insert `entry`, replacing any entry with the same path
    ///
    /// Returns the replaced entry, if any.
    pub fn upsert(&mut self, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.insert(entry.path_bytes().to_vec(), entry)
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&CacheEntry> {
        self.entries.get(path.as_os_str().as_bytes())
    }

    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode header and entries, recomputing the entry count and checksum
    pub fn serialize(&self) -> Result<Bytes> {
        let entries_count = u32::try_from(self.entries.len())
            .map_err(|_| Error::Corrupt("too many entries for one index".to_string()))?;
        let mut header = IndexHeader::new(SIGNATURE, VERSION, entries_count, Default::default());

        let mut checksum = Checksum::new();
        checksum.update(&header.checksummed_fields());

        let mut entry_bytes = Vec::new();
        for entry in self.entries() {
            let bytes = entry.to_bytes()?;
            checksum.update(&bytes);
            entry_bytes.extend_from_slice(&bytes);
        }
        header.checksum = checksum.finish();

        let mut bytes = header.serialize().to_vec();
        bytes.extend_from_slice(&entry_bytes);

        Ok(Bytes::from(bytes))
    }

    /// Replace `<root>/index` with this index
    ///
    /// Fails with [`Error::LockHeld`] if a staging operation is in progress.
    pub fn persist(&self, root: &Path) -> Result<()> {
        IndexLock::acquire(root)?.commit(self)
    }
}

/// Exclusive ownership of `<root>/index.lock`
///
/// Dropping the lock without committing removes the lock file and leaves
/// `index` untouched.
#[derive(Debug)]
pub struct IndexLock {
    lock_path: PathBuf,
    index_path: PathBuf,
    file: Option<File>,
    committed: bool,
}

impl IndexLock {
    pub fn acquire(root: &Path) -> Result<Self> {
        let lock_path = root.join(LOCK_FILE);

        let file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                warn!(path = %lock_path.display(), "index lock already held");
                return Err(Error::LockHeld(lock_path));
            }
            Err(e) => return Err(e).with_path(&lock_path),
        };

        debug!(path = %lock_path.display(), "acquired index lock");
        Ok(IndexLock {
            lock_path,
            index_path: root.join(INDEX_FILE),
            file: Some(file),
            committed: false,
        })
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Write `index` into the lock file and rename it over the index file
    pub fn commit(mut self, index: &Index) -> Result<()> {
        let bytes = index.serialize()?;

        if let Some(mut file) = self.file.take() {
            file.write_all(&bytes).with_path(&self.lock_path)?;
            file.sync_all().with_path(&self.lock_path)?;
        }

        std::fs::rename(&self.lock_path, &self.index_path).with_path(&self.index_path)?;
        debug!(path = %self.index_path.display(), entries = index.len(), "persisted index");

        self.committed = true;
        Ok(())
    }
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        self.file.take();
        match std::fs::remove_file(&self.lock_path) {
            Ok(()) => debug!(path = %self.lock_path.display(), "released index lock"),
            Err(e) => warn!(path = %self.lock_path.display(), error = %e, "unable to remove index lock"),
        }
    }
}
