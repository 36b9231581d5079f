//! Core utilities shared by the binary codecs
//!
//! - `cursor`: Position-tracking reader over an in-memory byte buffer

pub mod cursor;
