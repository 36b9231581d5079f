//! Tree object
//!
//! A tree is a flat snapshot of the index: one record per staged path, in
//! index order.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<octal mode> <name>\0<20-byte object id>`, records
//! concatenated with nothing in between.
//!
//! ## Reading
//!
//! [`Tree::parse`] hands back a [`TreeEntries`] iterator that decodes one
//! record per step. Restarting means calling `parse` again, which re-reads
//! the object from the store.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::artifacts::core::cursor::ByteCursor;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::OBJECT_ID_SIZE;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::{Error, Result};
use bytes::Bytes;
use derive_new::new;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: PathBuf,
    pub oid: ObjectId,
}

impl TreeEntry {
    // the record name ends at the first NUL
    fn encoded_name(&self) -> Result<&[u8]> {
        let name = self.name.as_os_str().as_bytes();
        if name.is_empty() || name.contains(&0) {
            return Err(Error::InvalidPath(self.name.clone()));
        }

        Ok(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Tree { entries }
    }

    /// Snapshot the index, one record per entry in index order
    pub fn from_index(index: &Index) -> Self {
        let entries = index
            .entries()
            .map(|entry| TreeEntry::new(entry.metadata.mode, entry.name.clone(), entry.oid))
            .collect();

        Tree { entries }
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Write a tree object for the index and return its id
    ///
    /// Every referenced blob must already be in the store, otherwise the
    /// build fails with [`Error::DanglingReference`] and nothing is written.
    /// Names that cannot be encoded fail with [`Error::InvalidPath`].
    pub fn build(index: &Index, database: &Database) -> Result<ObjectId> {
        let tree = Self::from_index(index);

        for entry in &tree.entries {
            entry.encoded_name()?;
            if !database.exists(&entry.oid) {
                return Err(Error::DanglingReference {
                    path: entry.name.clone(),
                    id: entry.oid,
                });
            }
        }

        database.store(&tree)
    }

    /// Read a tree object and iterate over its records
    pub fn parse(database: &Database, tree_id: &ObjectId) -> Result<TreeEntries> {
        let object = database.get(tree_id)?;

        if object.object_type != ObjectType::Tree {
            return Err(Error::WrongType {
                id: *tree_id,
                expected: ObjectType::Tree,
                actual: object.object_type,
            });
        }

        Ok(TreeEntries::new(object.payload))
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        let mut content = Vec::new();

        for entry in &self.entries {
            let name = entry.encoded_name()?;
            content.extend_from_slice(entry.mode.to_string().as_bytes());
            content.push(b' ');
            content.extend_from_slice(name);
            content.push(0);
            content.extend_from_slice(entry.oid.as_bytes());
        }

        Ok(Bytes::from(content))
    }
}

impl Unpackable for Tree {
    fn deserialize(payload: Bytes) -> Result<Self> {
        let entries = TreeEntries::new(payload).collect::<Result<Vec<_>>>()?;
        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}

/// Record-by-record decoder over a tree payload
///
/// Stops after the first malformed record.
#[derive(Debug, Clone)]
pub struct TreeEntries {
    cursor: ByteCursor,
    failed: bool,
}

impl TreeEntries {
    pub fn new(payload: Bytes) -> Self {
        TreeEntries {
            cursor: ByteCursor::new(payload),
            failed: false,
        }
    }

    fn read_entry(&mut self) -> Result<TreeEntry> {
        let header = self.cursor.read_until(0)?;

        let space = header
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| Error::Corrupt("tree record without mode separator".to_string()))?;
        let mode = std::str::from_utf8(&header[..space])
            .map_err(|_| Error::Corrupt("tree record mode is not ASCII".to_string()))?;
        let mode = EntryMode::from_octal_str(mode)?;

        let name = &header[space + 1..];
        if name.is_empty() {
            return Err(Error::Corrupt("tree record with empty name".to_string()));
        }

        let oid = ObjectId::try_from(&self.cursor.read_bytes(OBJECT_ID_SIZE)?[..])?;

        Ok(TreeEntry {
            mode,
            name: Path::new(OsStr::from_bytes(name)).to_path_buf(),
            oid,
        })
    }
}

impl Iterator for TreeEntries {
    type Item = Result<TreeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_empty() {
            return None;
        }

        let entry = self.read_entry();
        self.failed = entry.is_err();

        Some(entry)
    }
}
