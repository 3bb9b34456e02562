//! Cache behaviour against a real RocksDB store in a temp directory.

use pinecache_core::{Cache, Lookup, StorageBackend, StorageError};
use pinecache_store::test_utils::TestDb;
use std::sync::Arc;
use std::thread;

fn open_store() -> (TestDb, Arc<dyn StorageBackend>) {
    let test_db = TestDb::new().expect("temp RocksDB");
    let store: Arc<dyn StorageBackend> = test_db.backend();
    (test_db, store)
}

const KEYS: &[&str] = &["", "user:42", "naïve-ключ", "a/b/c", "with space"];

fn sample_values() -> Vec<Vec<u8>> {
    vec![
        vec![0x00],
        vec![0x01, 0x02],
        vec![0xFF; 3],
        b"plain text".to_vec(),
        (0..=255u8).cycle().take(64 * 1024).collect(),
    ]
}

#[test]
fn session_scenario() {
    let (_db, store) = open_store();
    let cache = Cache::new(store, "session");

    cache.set("user:42", &[0x01, 0x02]).unwrap();
    assert_eq!(cache.get("user:42"), vec![0x01, 0x02]);
    assert!(cache.is_exist("user:42"));

    cache.delete("user:42").unwrap();
    assert!(cache.get("user:42").is_empty());
    assert!(!cache.is_exist("user:42"));
}

#[test]
fn flush_on_untouched_table_is_ok() {
    let (_db, store) = open_store();
    let cache = Cache::new(Arc::clone(&store), "unused");

    cache.flush().unwrap();
    cache.flush().unwrap();
    assert!(store.list_tables().unwrap().is_empty());
}

#[test]
fn never_written_table_reads_empty() {
    let (_db, store) = open_store();
    let cache = Cache::new(store, "fresh");

    for key in KEYS {
        assert!(cache.get(key).is_empty());
        assert_eq!(cache.lookup(key), Lookup::NotFound);
        assert!(!cache.is_exist(key));
    }
}

#[test]
fn set_then_get_returns_exact_bytes() {
    let (_db, store) = open_store();
    let cache = Cache::new(store, "bytes");

    for key in KEYS {
        for value in sample_values() {
            cache.set(key, &value).unwrap();
            assert_eq!(cache.get(key), value, "key {:?}", key);
        }
    }
}

#[test]
fn is_exist_tracks_last_terminal_operation() {
    let (_db, store) = open_store();
    let cache = Cache::new(store, "exists");

    assert!(!cache.is_exist("k"));
    cache.set("k", b"v").unwrap();
    assert!(cache.is_exist("k"));
    cache.delete("k").unwrap();
    assert!(!cache.is_exist("k"));
    cache.set("k", b"again").unwrap();
    assert!(cache.is_exist("k"));
    cache.flush().unwrap();
    assert!(!cache.is_exist("k"));
}

#[test]
fn flush_removes_every_entry() {
    let (_db, store) = open_store();
    let cache = Cache::new(store, "bulk");

    for i in 0..100 {
        cache.set(&format!("key-{}", i), format!("value-{}", i).as_bytes()).unwrap();
    }
    cache.flush().unwrap();

    for i in 0..100 {
        let key = format!("key-{}", i);
        assert!(cache.get(&key).is_empty());
        assert!(!cache.is_exist(&key));
    }
}

#[test]
fn delete_on_absent_table_errors() {
    let (_db, store) = open_store();
    let cache = Cache::new(store, "never-created");

    assert_eq!(
        cache.delete("k").unwrap_err(),
        StorageError::TableNotFound("never-created".to_string())
    );

    // Flushed tables are absent again
    cache.set("k", b"v").unwrap();
    cache.flush().unwrap();
    assert!(cache.delete("k").unwrap_err().is_table_not_found());
}

#[test]
fn delete_missing_key_in_present_table_is_ok() {
    let (_db, store) = open_store();
    let cache = Cache::new(store, "present");
    cache.set("other", b"v").unwrap();

    cache.delete("missing").unwrap();
    assert_eq!(cache.get("other"), b"v".to_vec());
}

#[test]
fn table_state_survives_restart() {
    let test_db = TestDb::new().unwrap();
    {
        let store: Arc<dyn StorageBackend> = test_db.backend();
        let sessions = Cache::new(Arc::clone(&store), "session");
        let probe = Cache::new(store, "probed");
        sessions.set("user:42", &[0x01, 0x02]).unwrap();
        assert!(!probe.is_exist("anything"));
    }

    let test_db = test_db.reopen().unwrap();
    let store: Arc<dyn StorageBackend> = test_db.backend();
    let sessions = Cache::new(Arc::clone(&store), "session");
    assert_eq!(sessions.get("user:42"), vec![0x01, 0x02]);

    // The exists check left an empty, present table behind
    let probe = Cache::new(Arc::clone(&store), "probed");
    probe.delete("anything").unwrap();
}

#[test]
fn concurrent_sets_on_different_tables_all_commit() {
    let (_db, store) = open_store();
    let writers = 8;
    let per_writer = 50;

    thread::scope(|scope| {
        for w in 0..writers {
            let cache = Cache::new(Arc::clone(&store), format!("table-{}", w));
            scope.spawn(move || {
                for i in 0..per_writer {
                    cache.set(&format!("k{}", i), format!("{}:{}", w, i).as_bytes()).unwrap();
                }
            });
        }
    });

    for w in 0..writers {
        let cache = Cache::new(Arc::clone(&store), format!("table-{}", w));
        for i in 0..per_writer {
            assert_eq!(cache.get(&format!("k{}", i)), format!("{}:{}", w, i).into_bytes());
        }
    }
    assert_eq!(store.list_tables().unwrap().len(), writers);
}

#[test]
fn concurrent_sets_on_same_key_never_tear() {
    let (_db, store) = open_store();
    let cache = Cache::new(Arc::clone(&store), "contended");
    let candidates: Vec<Vec<u8>> = (0..4u8).map(|b| vec![b; 4096]).collect();

    thread::scope(|scope| {
        for value in &candidates {
            let cache = cache.clone();
            scope.spawn(move || {
                for _ in 0..25 {
                    cache.set("shared", value).unwrap();
                }
            });
        }

        // Readers racing the writers only ever see a whole value or nothing
        let reader = cache.clone();
        let candidates = &candidates;
        scope.spawn(move || {
            for _ in 0..200 {
                let seen = reader.get("shared");
                assert!(seen.is_empty() || candidates.contains(&seen));
            }
        });
    });

    let last = cache.get("shared");
    assert!(candidates.contains(&last));
}
