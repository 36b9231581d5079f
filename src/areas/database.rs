//! Object database
//!
//! Content-addressed, write-once storage of zlib-compressed objects under
//! `<root>/objects/<xx>/<remaining 38 hex chars>`.

use crate::artifacts::objects::object::{Object, RawObject, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::{Error, IoResultExt, Result};
use bytes::Bytes;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Number of shard directories, one per value of the first id byte
pub const SHARD_COUNT: usize = 256;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    /// Create the objects directory and all 256 shard directories
    pub fn init(&self) -> Result<()> {
        for shard in 0..SHARD_COUNT {
            let shard_path = self.path.join(format!("{shard:02x}"));
            std::fs::create_dir_all(&shard_path).with_path(&shard_path)?;
        }

        debug!(path = %self.path.display(), "initialized object database");
        Ok(())
    }

    /// Compute the id `put` would assign, without writing anything
    pub fn hash(object_type: ObjectType, payload: &[u8]) -> ObjectId {
        ObjectId::digest(&frame(object_type, payload))
    }

    /// Store a payload under its content address
    ///
    /// Writing an object that already exists is a silent no-op, including
    /// when a concurrent writer wins the race to create it.
    pub fn put(&self, object_type: ObjectType, payload: &[u8]) -> Result<ObjectId> {
        let framed = frame(object_type, payload);
        let object_id = ObjectId::digest(&framed);
        let object_path = self.object_path(&object_id);

        if object_path.exists() {
            debug!(oid = %object_id, kind = %object_type, "object already present");
            return Ok(object_id);
        }

        let compressed = Self::compress(&framed)?;
        if self.write_object(&object_path, &compressed)? {
            debug!(oid = %object_id, kind = %object_type, size = payload.len(), "wrote object");
        } else {
            debug!(oid = %object_id, kind = %object_type, "object written concurrently");
        }

        Ok(object_id)
    }

    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        self.put(object.object_type(), &object.serialize()?)
    }

    /// Read an object back as its type tag and payload
    pub fn get(&self, object_id: &ObjectId) -> Result<RawObject> {
        let object_path = self.object_path(object_id);

        let compressed = match std::fs::read(&object_path) {
            Ok(compressed) => compressed,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::ObjectNotFound(*object_id));
            }
            Err(e) => return Err(e).with_path(&object_path),
        };

        let framed = Self::decompress(&compressed).map_err(|e| {
            Error::Corrupt(format!("unable to decompress object {object_id}: {e}"))
        })?;

        if ObjectId::digest(&framed) != *object_id {
            return Err(Error::Corrupt(format!(
                "object {object_id} does not hash to its own id"
            )));
        }

        let object = RawObject::parse_framed(framed)?;
        debug!(oid = %object_id, kind = %object.object_type, "read object");

        Ok(object)
    }

    /// Read and decode an object that must be of type `expected`
    pub fn parse_object_as<T: Unpackable>(
        &self,
        object_id: &ObjectId,
        expected: ObjectType,
    ) -> Result<T> {
        self.get(object_id)?.decode(object_id, expected)
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).is_file()
    }

    /// Publish `content` at `object_path` without ever replacing an existing file
    ///
    /// The content goes to a temporary file in the shard directory first and
    /// is then linked into place, so readers never observe a partial object.
    /// Returns false if another writer created the object first.
    fn write_object(&self, object_path: &Path, content: &[u8]) -> Result<bool> {
        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::Corrupt(format!("invalid object path {}", object_path.display())))?;
        std::fs::create_dir_all(object_dir).with_path(object_dir)?;

        let mut temp_file = tempfile::Builder::new()
            .prefix("tmp-obj-")
            .tempfile_in(object_dir)
            .with_path(object_dir)?;
        temp_file.write_all(content).with_path(temp_file.path())?;

        match temp_file.persist_noclobber(object_path) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.error).with_path(object_path),
        }
    }

    fn compress(data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::best());
        encoder
            .write_all(data)
            .map_err(|e| Error::Corrupt(format!("unable to compress object: {e}")))?;

        encoder
            .finish()
            .map_err(|e| Error::Corrupt(format!("unable to finish compressing object: {e}")))
    }

    fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;

        Ok(decompressed.into())
    }
}
