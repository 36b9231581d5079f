use assert_fs::TempDir;
use common::{
    blob_id, expected_tree_id, file_mode, init_repository_dir, run_dircache_command, stage,
    storage_root, write_file, write_tree,
};
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn write_tree_snapshots_the_index(init_repository_dir: TempDir) {
    write_file(&init_repository_dir, "README", "hello\n");
    stage(&init_repository_dir, &["README"]);

    let tree_id = write_tree(&init_repository_dir);

    assert_eq!(
        tree_id,
        expected_tree_id(&init_repository_dir, &[("README", "hello\n")])
    );
    assert!(
        storage_root(&init_repository_dir)
            .join("objects")
            .join(&tree_id[..2])
            .join(&tree_id[2..])
            .is_file()
    );
}

#[rstest]
fn write_tree_is_stable_for_unchanged_index(init_repository_dir: TempDir) {
    write_file(&init_repository_dir, "a.txt", "alpha");
    write_file(&init_repository_dir, "nested/b.txt", "beta");
    stage(&init_repository_dir, &["nested/b.txt", "a.txt"]);

    let first = write_tree(&init_repository_dir);
    let second = write_tree(&init_repository_dir);

    assert_eq!(first, second);
    assert_eq!(
        first,
        expected_tree_id(
            &init_repository_dir,
            &[("a.txt", "alpha"), ("nested/b.txt", "beta")]
        )
    );
}

#[rstest]
fn write_tree_rejects_empty_index(init_repository_dir: TempDir) {
    run_dircache_command(init_repository_dir.path(), &["write-tree"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no staged entries"));
}

#[rstest]
fn write_tree_rejects_dangling_blob(init_repository_dir: TempDir) {
    write_file(&init_repository_dir, "README", "hello\n");
    stage(&init_repository_dir, &["README"]);
    std::fs::remove_file(
        storage_root(&init_repository_dir).join("objects/ce/013625030ba8dba906f756967f9e9ca394464a"),
    )
    .unwrap();

    run_dircache_command(init_repository_dir.path(), &["write-tree"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "README references missing object ce013625030ba8dba906f756967f9e9ca394464a",
        ));
}

#[rstest]
fn read_tree_lists_records_in_index_order(init_repository_dir: TempDir) {
    let readme = write_file(&init_repository_dir, "README", "hello\n");
    let main = write_file(&init_repository_dir, "src/main.c", "int main;\n");
    stage(&init_repository_dir, &["src/main.c", "README"]);
    let tree_id = write_tree(&init_repository_dir);

    let expected = format!(
        "{} {}\tREADME\n{} {}\tsrc/main.c\n",
        file_mode(&readme),
        blob_id("hello\n"),
        file_mode(&main),
        blob_id("int main;\n"),
    );

    run_dircache_command(init_repository_dir.path(), &["read-tree", &tree_id])
        .assert()
        .success()
        .stdout(expected);
}

#[rstest]
fn read_tree_rejects_non_tree_object(init_repository_dir: TempDir) {
    write_file(&init_repository_dir, "README", "hello\n");
    stage(&init_repository_dir, &["README"]);

    run_dircache_command(
        init_repository_dir.path(),
        &["read-tree", "ce013625030ba8dba906f756967f9e9ca394464a"],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("is a blob, expected a tree"));
}

#[rstest]
fn read_tree_reports_missing_object(init_repository_dir: TempDir) {
    run_dircache_command(
        init_repository_dir.path(),
        &["read-tree", "0123456789abcdef0123456789abcdef01234567"],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains(
        "object not found: 0123456789abcdef0123456789abcdef01234567",
    ));
}
