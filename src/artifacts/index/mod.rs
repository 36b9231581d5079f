//! Cache index file format
//!
//! The index (also called staging area or cache) records which file snapshots
//! are ready to become a tree.
//!
//! ## File Format
//!
//! ```text
//! Header (32 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 1 (4 bytes, little-endian)
//!   - Entry count (4 bytes, little-endian)
//!   - Checksum: SHA-1 over the three fields above and every entry (20 bytes)
//!
//! Entries (variable length, no separators):
//!   - Ten little-endian u32 metadata fields, the raw 20-byte content id,
//!     a u16 path length and the path bytes
//!   - Each entry padded with NUL bytes to 8-byte alignment
//! ```

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;
pub mod path_policy;
pub mod stat_change;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 32; // 4 marker, 4 version, 4 entries_count, 20 checksum

/// Magic signature identifying index files
pub const SIGNATURE: [u8; 4] = *b"DIRC";

/// Index file format version
pub const VERSION: u32 = 1;
