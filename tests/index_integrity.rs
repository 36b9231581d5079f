use assert_fs::TempDir;
use bytes::Bytes;
use dircache::Error;
use dircache::areas::database::Database;
use dircache::areas::index::{Index, IndexLock};
use dircache::artifacts::index::entry_mode::EntryMode;
use dircache::artifacts::index::index_entry::{CacheEntry, EntryMetadata, EntryTime};
use dircache::artifacts::objects::object_type::ObjectType;
use dircache::artifacts::objects::tree::Tree;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn entry(path: &str, content: &[u8]) -> CacheEntry {
    let metadata = EntryMetadata {
        ctime: EntryTime::new(1_700_000_000, 1),
        mtime: EntryTime::new(1_700_000_000, 2),
        dev: 1,
        ino: 2,
        mode: EntryMode::REGULAR,
        uid: 1000,
        gid: 1000,
        size: content.len() as u32,
    };
    CacheEntry::from_path(path, metadata, content).unwrap()
}

fn sample_index() -> Index {
    let mut index = Index::new();
    index.upsert(entry("src/lib.rs", b"pub mod a;\n"));
    index.upsert(entry("README", b"hello\n"));
    index.upsert(entry("docs/guide.md", b"# Guide\n"));
    index
}

proptest! {
    #[test]
    fn any_single_byte_change_is_detected(position in any::<prop::sample::Index>(), mask in 1u8..=255) {
        let mut bytes = sample_index().serialize().unwrap().to_vec();
        let position = position.index(bytes.len());
        bytes[position] ^= mask;

        let parsed = Index::parse(Bytes::from(bytes));
        prop_assert!(matches!(parsed, Err(Error::Corrupt(_))));
    }

    #[test]
    fn persisted_index_reloads_sorted(paths in prop::collection::btree_set("[a-z]{1,8}(/[a-z]{1,8}){0,2}", 1..12)) {
        let root = TempDir::new().unwrap();
        let mut index = Index::new();
        for path in paths.iter().rev() {
            index.upsert(entry(path, path.as_bytes()));
        }

        index.persist(root.path()).unwrap();
        let reloaded = Index::load(root.path()).unwrap();

        let reloaded_paths = reloaded
            .entries()
            .map(|entry| entry.name.to_str().unwrap().to_string())
            .collect::<Vec<_>>();
        let mut expected = paths.into_iter().collect::<Vec<_>>();
        expected.sort_by(|a, b| a.as_bytes().cmp(b.as_bytes()));
        prop_assert_eq!(reloaded_paths, expected);
        prop_assert_eq!(reloaded, index);
    }
}

#[rstest]
fn tree_built_from_reloaded_index_matches_original() {
    let root = TempDir::new().unwrap();
    let database = Database::new(root.path().join("objects").into_boxed_path());
    for content in [&b"pub mod a;\n"[..], &b"hello\n"[..], &b"# Guide\n"[..]] {
        database.put(ObjectType::Blob, content).unwrap();
    }

    let index = sample_index();
    index.persist(root.path()).unwrap();
    let reloaded = Index::load(root.path()).unwrap();

    let tree_id = Tree::build(&reloaded, &database).unwrap();
    assert_eq!(tree_id, Tree::build(&index, &database).unwrap());

    let names = Tree::parse(&database, &tree_id)
        .unwrap()
        .map(|entry| entry.unwrap().name.display().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["README", "docs/guide.md", "src/lib.rs"]);
}

#[rstest]
fn concurrent_stagers_cannot_both_hold_the_lock() {
    let root = TempDir::new().unwrap();
    let holders = Arc::new(AtomicUsize::new(0));
    let most_holders = Arc::new(AtomicUsize::new(0));

    let handles = (0..8)
        .map(|_| {
            let root = root.path().to_path_buf();
            let holders = Arc::clone(&holders);
            let most_holders = Arc::clone(&most_holders);

            std::thread::spawn(move || {
                IndexLock::acquire(&root).map(|lock| {
                    let holding = holders.fetch_add(1, Ordering::SeqCst) + 1;
                    most_holders.fetch_max(holding, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(50));
                    holders.fetch_sub(1, Ordering::SeqCst);
                    drop(lock);
                })
            })
        })
        .collect::<Vec<_>>();

    let results = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect::<Vec<_>>();

    assert_eq!(most_holders.load(Ordering::SeqCst), 1);
    assert!(
        results
            .iter()
            .all(|result| matches!(result, Ok(()) | Err(Error::LockHeld(_))))
    );
    assert!(!root.path().join("index.lock").exists());
}
