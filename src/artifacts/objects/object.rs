use crate::artifacts::core::cursor::ByteCursor;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::{Error, Result};
use bytes::Bytes;

/// Encode the object payload (without the `<type> <len>\0` frame)
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Decode an object payload that has already been stripped of its frame
pub trait Unpackable {
    fn deserialize(payload: Bytes) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn framed(&self) -> Result<Bytes> {
        Ok(frame(self.object_type(), &self.serialize()?))
    }

    fn object_id(&self) -> Result<ObjectId> {
        Ok(ObjectId::digest(&self.framed()?))
    }
}

/// Build the canonical `<type> <len>\0<payload>` form that is hashed and compressed
pub fn frame(object_type: ObjectType, payload: &[u8]) -> Bytes {
    let header = format!("{} {}\0", object_type.as_str(), payload.len());

    let mut framed = Vec::with_capacity(header.len() + payload.len());
    framed.extend_from_slice(header.as_bytes());
    framed.extend_from_slice(payload);

    Bytes::from(framed)
}

/// An object read back from the store: its type tag and unframed payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    pub object_type: ObjectType,
    pub payload: Bytes,
}

impl RawObject {
    /// Split a decompressed object into header and payload
    ///
    /// The declared length is only trusted once it matches the number of
    /// bytes that actually follow the NUL.
    pub fn parse_framed(data: Bytes) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);

        let header = cursor.read_until(0)?;
        let header = std::str::from_utf8(&header)
            .map_err(|_| Error::Corrupt("object header is not valid UTF-8".to_string()))?;

        let (type_tag, declared_len) = header
            .split_once(' ')
            .ok_or_else(|| Error::Corrupt(format!("malformed object header {header:?}")))?;
        let object_type = ObjectType::try_from(type_tag)?;
        let malformed_len = || Error::Corrupt(format!("malformed object length {declared_len:?}"));
        if declared_len.is_empty() || !declared_len.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed_len());
        }
        let declared_len = declared_len.parse::<usize>().map_err(|_| malformed_len())?;

        if declared_len != cursor.remaining() {
            return Err(Error::Corrupt(format!(
                "object declares {declared_len} payload bytes but holds {}",
                cursor.remaining()
            )));
        }

        Ok(RawObject {
            object_type,
            payload: cursor.read_rest(),
        })
    }

    /// Decode the payload as `T`, failing if the stored type is not `expected`
    pub fn decode<T: Unpackable>(self, id: &ObjectId, expected: ObjectType) -> Result<T> {
        if self.object_type != expected {
            return Err(Error::WrongType {
                id: *id,
                expected,
                actual: self.object_type,
            });
        }

        T::deserialize(self.payload)
    }
}
