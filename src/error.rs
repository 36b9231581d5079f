use std::path::PathBuf;

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;

/// Errors surfaced by the object store, the cache index and the object codecs
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error("object {id} is a {actual}, expected a {expected}")]
    WrongType {
        id: ObjectId,
        expected: ObjectType,
        actual: ObjectType,
    },

    #[error("entry {} references missing object {id}", .path.display())]
    DanglingReference { path: PathBuf, id: ObjectId },

    #[error("commit has {0} parents, at most {max} are allowed", max = crate::artifacts::objects::commit::MAX_PARENTS)]
    TooManyParents(usize),

    #[error("index lock {} is held by another staging operation", .0.display())]
    LockHeld(PathBuf),

    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("no staged entries to create a tree from")]
    EmptyIndex,

    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attach the offending path to io errors
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
