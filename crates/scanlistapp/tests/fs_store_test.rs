use chrono::{Duration, TimeZone, Utc};
use scanlistapp::model::{ItemDraft, ItemMeta};
use scanlistapp::store::backend::StorageBackend;
use scanlistapp::store::fs_backend::{FsBackend, ITEMS_FILE, LISTS_FILE, LOCK_FILE};
use scanlistapp::store::scan_store::ScanStore;
use scanlistapp::store::{DataStore, Window};
use std::fs;
use std::thread;
use tempfile::TempDir;

fn open(dir: &TempDir) -> ScanStore<FsBackend> {
    ScanStore::with_backend(FsBackend::new(dir.path().to_path_buf()))
}

fn draft(code: &str, secs: i64) -> ItemDraft {
    ItemDraft {
        list_id: "L1".into(),
        code_raw: code.into(),
        code_type: "QR".into(),
        label: Some("Test".into()),
        created_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        meta: Some(ItemMeta::new(Some("Bolts".into()), None)),
    }
}

fn window(secs: i64) -> Window {
    let start = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
    Window {
        start,
        end: start + Duration::seconds(1),
    }
}

#[test]
fn test_items_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open(&dir);
        store.create_list("L1").unwrap();
        store.upsert_item(draft("123", 0), window(0)).unwrap();
    }

    let store = open(&dir);
    let items = store.find_items("L1").unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].code_raw, "123");
    assert_eq!(items[0].label.as_deref(), Some("Test"));
    assert_eq!(
        items[0].meta.as_ref().and_then(|m| m.item_name.as_deref()),
        Some("Bolts")
    );
    assert!(store.find_list_by_name("L1").unwrap().is_some());
}

#[test]
fn test_no_tmp_files_left_behind() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    store.create_list("L1").unwrap();
    store.upsert_item(draft("1", 0), window(0)).unwrap();
    store.upsert_item(draft("2", 5), window(5)).unwrap();

    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            LOCK_FILE.to_string(),
            ITEMS_FILE.to_string(),
            LISTS_FILE.to_string()
        ]
    );
}

#[test]
fn test_empty_directory_reads_as_empty_store() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    assert!(store.list_all_lists().unwrap().is_empty());
    assert!(store.find_items("anything").unwrap().is_empty());
}

#[test]
fn test_corrupt_index_is_a_persistence_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(ITEMS_FILE), "{ nope").unwrap();
    let backend = FsBackend::new(dir.path().to_path_buf());
    assert!(matches!(
        backend.load_items(),
        Err(scanlistapp::error::ScanError::Persistence(_))
    ));
}

#[test]
fn test_unwritable_root_fails_loudly() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();

    let mut store = ScanStore::with_backend(FsBackend::new(blocker.join("data")));
    assert!(store.create_list("L1").is_err());
}

#[test]
fn test_same_bucket_merges_across_reopen() {
    let dir = TempDir::new().unwrap();
    open(&dir).upsert_item(draft("123", 0), window(0)).unwrap();

    let mut later = draft("123", 0);
    later.created_at += Duration::milliseconds(400);
    later.label = Some("Relabelled".into());
    let merged = open(&dir).upsert_item(later, window(0)).unwrap();

    assert!(!merged.was_inserted());
    let items = open(&dir).find_items("L1").unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label.as_deref(), Some("Relabelled"));
}

#[test]
fn test_two_handles_on_one_directory_keep_every_write() {
    let dir = TempDir::new().unwrap();

    let writers: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|prefix| {
            let root = dir.path().to_path_buf();
            thread::spawn(move || {
                let mut store = ScanStore::with_backend(FsBackend::new(root));
                for n in 0..50 {
                    let code = format!("{}-{}", prefix, n);
                    store.upsert_item(draft(&code, n), window(n)).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let items = open(&dir).find_items("L1").unwrap();
    assert_eq!(items.len(), 100);
    let mut seqs: Vec<_> = items.iter().map(|i| i.seq).collect();
    seqs.sort_unstable();
    seqs.dedup();
    assert_eq!(seqs.len(), 100);
}
