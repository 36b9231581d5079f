//! Data structures and codecs
//!
//! - `core`: byte cursor shared by the binary decoders
//! - `index`: cache entries, header, checksum and change detection
//! - `objects`: object ids and the blob, tree and commit codecs

pub mod core;
pub mod index;
pub mod objects;
