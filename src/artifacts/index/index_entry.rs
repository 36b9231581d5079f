//! Cache entry representation
//!
//! Each entry in the index represents one staged file with:
//! - File path relative to the working tree
//! - Content hash (blob object ID)
//! - File metadata (mode, size, owner, inode, timestamps)
//!
//! ## Entry Format
//!
//! ```text
//! ctime.sec ctime.nsec mtime.sec mtime.nsec dev ino mode uid gid size   10 x u32 LE
//! content id                                                            20 bytes
//! path length                                                           u16 LE
//! path                                                                  path length bytes
//! NUL padding up to the next multiple of 8
//! ```
//!
//! The metadata is never interpreted beyond change detection; it lets a
//! caller tell whether a file changed without reading its content.

use crate::areas::database::Database;
use crate::artifacts::core::cursor::ByteCursor;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::path_policy::MAX_PATH_SIZE;
use crate::artifacts::index::stat_change::StatChange;
use crate::artifacts::objects::OBJECT_ID_SIZE;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use derive_new::new;
use std::ffi::OsStr;
use std::fs::Metadata;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// Block size for entry alignment (8 bytes)
pub const ENTRY_BLOCK: usize = 8;

/// Size of the fixed-width part of an entry, up to and including the path length
pub const ENTRY_FIXED_SIZE: usize = 10 * 4 + OBJECT_ID_SIZE + 2;

/// A `{seconds, nanoseconds}` filesystem timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, new)]
pub struct EntryTime {
    pub seconds: u32,
    pub nanoseconds: u32,
}

/// Filesystem metadata captured at staging time
///
/// All fields are the low 32 bits of what `stat(2)` reports. The caller
/// supplies this record; nothing in the index computes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EntryMetadata {
    /// Change time (inode modification)
    pub ctime: EntryTime,
    /// Content modification time
    pub mtime: EntryTime,
    pub dev: u32,
    pub ino: u32,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
}

impl From<&Metadata> for EntryMetadata {
    fn from(metadata: &Metadata) -> Self {
        EntryMetadata {
            ctime: EntryTime::new(metadata.ctime() as u32, metadata.ctime_nsec() as u32),
            mtime: EntryTime::new(metadata.mtime() as u32, metadata.mtime_nsec() as u32),
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode: EntryMode::new(metadata.mode()),
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
        }
    }
}

/// One staged file
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct CacheEntry {
    /// File path relative to the working tree
    pub name: PathBuf,
    /// ID of the blob holding the file content
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
}

impl CacheEntry {
    /// Build an entry for `content`, hashing it exactly as the object store would
    ///
    /// No object is written; see [`CacheEntry::index_contents`].
    pub fn from_path(
        path: impl Into<PathBuf>,
        metadata: EntryMetadata,
        content: &[u8],
    ) -> Result<Self> {
        let name = path.into();
        if name.as_os_str().len() > MAX_PATH_SIZE {
            return Err(Error::InvalidPath(name));
        }

        let oid = Database::hash(ObjectType::Blob, content);

        Ok(CacheEntry {
            name,
            oid,
            metadata,
        })
    }

    /// Write the blob this entry points at
    ///
    /// Idempotent: the store leaves an existing object untouched.
    pub fn index_contents(&self, database: &Database, content: &[u8]) -> Result<()> {
        let oid = database.store(&Blob::new(Bytes::copy_from_slice(content)))?;

        if oid != self.oid {
            return Err(Error::Corrupt(format!(
                "content of {} changed while staging: expected {}, wrote {}",
                self.name.display(),
                self.oid,
                oid
            )));
        }

        Ok(())
    }

    pub fn path_bytes(&self) -> &[u8] {
        self.name.as_os_str().as_bytes()
    }

    pub fn stat_changes(&self, current: &EntryMetadata) -> StatChange {
        StatChange::between(&self.metadata, current)
    }

    /// Length of the encoded record, padding included
    pub fn encoded_len(&self) -> usize {
        (ENTRY_FIXED_SIZE + self.path_bytes().len()).next_multiple_of(ENTRY_BLOCK)
    }

    pub fn to_bytes(&self) -> Result<Bytes> {
        let path = self.path_bytes();
        let path_len =
            u16::try_from(path.len()).map_err(|_| Error::InvalidPath(self.name.clone()))?;
        let metadata = &self.metadata;

        let fields = [
            metadata.ctime.seconds,
            metadata.ctime.nanoseconds,
            metadata.mtime.seconds,
            metadata.mtime.nanoseconds,
            metadata.dev,
            metadata.ino,
            metadata.mode.as_u32(),
            metadata.uid,
            metadata.gid,
            metadata.size,
        ];

        let mut fixed = [0u8; ENTRY_FIXED_SIZE];
        LittleEndian::write_u32_into(&fields, &mut fixed[..40]);
        fixed[40..60].copy_from_slice(self.oid.as_bytes());
        LittleEndian::write_u16(&mut fixed[60..], path_len);

        let mut entry_bytes = Vec::with_capacity(self.encoded_len());
        entry_bytes.extend_from_slice(&fixed);
        entry_bytes.extend_from_slice(path);

        entry_bytes.resize(self.encoded_len(), 0);

        Ok(Bytes::from(entry_bytes))
    }

    /// Decode one record from the start of `data`
    ///
    /// Returns the entry and the number of bytes it occupied, padding
    /// included, so that concatenated records can be walked.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize)> {
        let mut cursor = ByteCursor::new(Bytes::copy_from_slice(data));
        let entry = Self::decode(&mut cursor)?;

        Ok((entry, cursor.position()))
    }

    /// Decode one record at the cursor, leaving it at the start of the next one
    pub fn decode(cursor: &mut ByteCursor) -> Result<Self> {
        let start = cursor.position();

        let ctime = EntryTime::new(cursor.read_u32_le()?, cursor.read_u32_le()?);
        let mtime = EntryTime::new(cursor.read_u32_le()?, cursor.read_u32_le()?);
        let dev = cursor.read_u32_le()?;
        let ino = cursor.read_u32_le()?;
        let mode = EntryMode::new(cursor.read_u32_le()?);
        let uid = cursor.read_u32_le()?;
        let gid = cursor.read_u32_le()?;
        let size = cursor.read_u32_le()?;
        let oid = ObjectId::try_from(&cursor.read_bytes(OBJECT_ID_SIZE)?[..])?;
        let path_len = cursor.read_u16_le()? as usize;
        let path = cursor.read_bytes(path_len)?;

        let consumed = cursor.position() - start;
        cursor.skip(consumed.next_multiple_of(ENTRY_BLOCK) - consumed)?;

        Ok(CacheEntry {
            name: Path::new(OsStr::from_bytes(&path)).to_path_buf(),
            oid,
            metadata: EntryMetadata {
                ctime,
                mtime,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
            },
        })
    }
}
