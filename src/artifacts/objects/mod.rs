//! Object types and codecs
//!
//! Everything in the store is an object identified by the SHA-1 of its
//! framed form `<type> <size>\0<payload>`. There are three kinds:
//!
//! - **Blob**: File content (raw bytes)
//! - **Tree**: Flat listing of staged paths (mode, name, object ID)
//! - **Commit**: Tree snapshot with parents, authorship and a message

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 digest in bytes
pub const OBJECT_ID_SIZE: usize = 20;

/// Length of a SHA-1 digest in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
