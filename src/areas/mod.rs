//! Stateful storage areas
//!
//! - `database`: content-addressed object store
//! - `index`: staging area (cache) and its lock file
//! - `repository`: ties a storage root, its configuration and an output writer together

pub mod database;
pub mod index;
pub mod repository;
