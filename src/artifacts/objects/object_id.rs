//! Object identifier (SHA-1 digest)
//!
//! Object IDs are 20-byte SHA-1 digests of the framed object bytes
//! (`<type> <len>\0<payload>`), printed as 40 lowercase hexadecimal characters.
//!
//! ## Storage
//!
//! Objects are stored in `<root>/objects/<first-2-chars>/<remaining-38-chars>`,
//! so the first byte of the digest selects one of 256 shard directories.

use crate::artifacts::objects::{OBJECT_ID_LENGTH, OBJECT_ID_SIZE};
use crate::error::{Error, Result};
use sha1::{Digest, Sha1};
use std::path::PathBuf;
use std::str::FromStr;

/// Content address of a stored object
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_SIZE]);

impl ObjectId {
    pub fn from_bytes(bytes: [u8; OBJECT_ID_SIZE]) -> Self {
        ObjectId(bytes)
    }

    /// Digest the given bytes
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        ObjectId(hasher.finalize().into())
    }

    /// Parse and validate an object ID from its hexadecimal form
    ///
    /// Accepts upper and lower case digits; the id always prints in lower case.
    pub fn try_parse(id: &str) -> Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(Error::InvalidObjectId(id.to_string()));
        }

        let mut bytes = [0u8; OBJECT_ID_SIZE];
        hex::decode_to_slice(id, &mut bytes).map_err(|_| Error::InvalidObjectId(id.to_string()))?;

        Ok(ObjectId(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Convert to the sharded object path relative to the objects directory
    ///
    /// For example, `abc123...` becomes `ab/c123...`
    pub fn to_path(&self) -> PathBuf {
        let hex = self.to_hex();
        let (dir, file) = hex.split_at(2);
        PathBuf::from(dir).join(file)
    }
}

impl TryFrom<&[u8]> for ObjectId {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; OBJECT_ID_SIZE] = bytes.try_into().map_err(|_| {
            Error::Corrupt(format!(
                "object id must be {OBJECT_ID_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;

        Ok(ObjectId(bytes))
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_parse(s)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}
