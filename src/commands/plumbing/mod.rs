//! Plumbing commands
//!
//! - `init-db`: create the storage root and object store
//! - `update-cache`: stage working tree files
//! - `write-tree`: snapshot the index as a tree object
//! - `read-tree`: list a tree object's records
//! - `commit-tree`: record a tree as a commit
//! - `cat-file`: print an object's type, size and content
//! - `show-diff`: compare staged metadata with the working tree

pub mod cat_file;
pub mod commit_tree;
pub mod init_db;
pub mod read_tree;
pub mod show_diff;
pub mod update_cache;
pub mod write_tree;
