#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::fixture::{FileWriteStr, PathChild};
use dircache::artifacts::index::entry_mode::EntryMode;
use dircache::artifacts::objects::object::Object;
use dircache::artifacts::objects::object_id::ObjectId;
use dircache::artifacts::objects::tree::{Tree, TreeEntry};
use dircache::config::ROOT_ENV;
use rstest::fixture;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

pub const STORAGE_ROOT: &str = ".dircache";
pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000";
pub const COMMITTER_DATE: &str = "2023-01-02 08:30:00 +0100";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_dircache_command(repository_dir.path(), &["init-db"])
        .assert()
        .success();

    repository_dir
}

pub fn run_dircache_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("dircache").expect("Failed to find dircache binary");
    cmd.current_dir(dir);
    cmd.env_remove(ROOT_ENV);
    cmd.envs(vec![
        ("GIT_AUTHOR_NAME", "fake_author"),
        ("GIT_AUTHOR_EMAIL", "author@example.com"),
        ("GIT_AUTHOR_DATE", AUTHOR_DATE),
        ("GIT_COMMITTER_NAME", "fake_committer"),
        ("GIT_COMMITTER_EMAIL", "committer@example.com"),
        ("GIT_COMMITTER_DATE", COMMITTER_DATE),
    ]);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let file = dir.child(name);
    if let Some(parent) = file.path().parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    file.write_str(content).expect("Failed to write file");
    file.path().to_path_buf()
}

pub fn storage_root(dir: &TempDir) -> PathBuf {
    dir.path().join(STORAGE_ROOT)
}

/// Run a command that prints a single object id and return it
pub fn object_id_output(cmd: &mut Command) -> String {
    let output = cmd.output().expect("Failed to run dircache");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout)
        .expect("Output is not UTF-8")
        .trim()
        .to_string()
}

pub fn stage(dir: &TempDir, paths: &[&str]) {
    let mut args = vec!["update-cache"];
    args.extend_from_slice(paths);
    run_dircache_command(dir.path(), &args).assert().success();
}

pub fn write_tree(dir: &TempDir) -> String {
    object_id_output(&mut run_dircache_command(dir.path(), &["write-tree"]))
}

pub fn commit_tree(dir: &TempDir, tree: &str, parents: &[&str], message: &str) -> String {
    let mut args = vec!["commit-tree", tree];
    for parent in parents {
        args.push("-p");
        args.push(parent);
    }

    let mut cmd = run_dircache_command(dir.path(), &args);
    cmd.write_stdin(message.to_string());
    object_id_output(&mut cmd)
}

/// The mode a file would be staged with
pub fn file_mode(path: &Path) -> EntryMode {
    let metadata = std::fs::metadata(path).expect("Failed to stat file");
    EntryMode::new(metadata.mode())
}

/// The tree id expected for the given `(name, content)` files in the working tree
pub fn expected_tree_id(dir: &TempDir, files: &[(&str, &str)]) -> String {
    let mut files = files.to_vec();
    files.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let entries = files
        .iter()
        .map(|(name, content)| {
            let blob_id = blob_id(content);
            TreeEntry::new(file_mode(&dir.path().join(name)), PathBuf::from(name), blob_id)
        })
        .collect();

    Tree::new(entries)
        .object_id()
        .expect("Failed to hash tree")
        .to_hex()
}

pub fn blob_id(content: &str) -> ObjectId {
    let header = format!("blob {}\0", content.len());
    ObjectId::digest(&[header.as_bytes(), content.as_bytes()].concat())
}
