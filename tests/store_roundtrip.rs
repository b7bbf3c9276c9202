use git_statistics::cache::{CommitStore, StoreOptions};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn store(dir: &Path, limit: usize, pretty: bool) -> CommitStore {
    CommitStore::open(
        dir,
        &StoreOptions {
            limit,
            fresh: true,
            pretty,
        },
    )
    .unwrap()
}

fn assert_resaved_identically(name: &str, pretty: bool) {
    let dir = tempdir().unwrap();
    let source = fixture(name);
    let mut store = store(dir.path(), 100, pretty);
    store.load([&source]).unwrap();

    let target = dir.path().join("resaved.json");
    store.save(&target, pretty).unwrap();
    assert_eq!(
        fs::read_to_string(&target).unwrap(),
        fs::read_to_string(&source).unwrap()
    );
}

#[test]
fn compact_chunk_is_saved_byte_for_byte() {
    assert_resaved_identically("multiple_authors.json", false);
}

#[test]
fn pretty_chunk_is_saved_byte_for_byte() {
    assert_resaved_identically("single_author_pretty.json", true);
}

#[test]
fn loaded_fixture_keeps_order_and_fields() {
    let dir = tempdir().unwrap();
    let mut store = store(dir.path(), 100, false);
    store.load([fixture("multiple_authors.json")]).unwrap();

    let authors: Vec<&str> = store.commits().map(|c| c.author.as_str()).collect();
    assert_eq!(authors, vec!["Kevin Jalbert", "Kevin Jalbert", "John Smith"]);

    let renamed = store
        .get("fa3e5ab47ffc2a4e5b5b35b1dbac9a9d9e1f5c02")
        .and_then(|c| c.files.iter().find(|f| f.old_name.is_some()))
        .unwrap();
    assert_eq!(renamed.old_name.as_deref(), Some("lib/qux.rb"));
    assert_eq!(renamed.similar, Some(100));
}

#[test]
fn flush_boundaries_around_limit() {
    for (limit, flushed) in [(2, true), (3, false), (4, false)] {
        let dir = tempdir().unwrap();
        let mut store = store(dir.path(), limit, false);
        store.load([fixture("multiple_authors.json")]).unwrap();
        assert_eq!(store.len(), 3);

        let written = store.flush(false).unwrap();
        assert_eq!(written.is_some(), flushed, "limit {limit}");
        assert_eq!(store.is_empty(), flushed, "limit {limit}");
    }
}

#[test]
fn flushed_chunk_reloads_into_fresh_store() {
    let dir = tempdir().unwrap();
    let mut first = store(dir.path(), 100, false);
    first.load([fixture("multiple_authors.json")]).unwrap();
    let path = first.flush(true).unwrap().unwrap();
    assert_eq!(path, dir.path().join("0.json"));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        fs::read_to_string(fixture("multiple_authors.json")).unwrap()
    );

    let mut second = CommitStore::open(dir.path(), &StoreOptions::default()).unwrap();
    second.load_chunks().unwrap();
    assert_eq!(second.len(), 3);
}
