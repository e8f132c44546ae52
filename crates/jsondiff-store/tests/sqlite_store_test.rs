#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use jsondiff_core::ops::{resolve_page_state, save_diff};
use jsondiff_core::{
    AllowListPolicy, DiffId, DiffStore, IdGenerator, SaveRequest, SavedDiff, SequenceSource,
};
use jsondiff_store::SqliteDiffStore;
use serde_json::json;

fn local_request(state_json: &str) -> SaveRequest {
    SaveRequest::new()
        .with_referer("http://localhost:8080/")
        .with_state_json(state_json)
}

#[test]
fn test_diffs_survive_reopen() {
    // Given: A file-backed store with one saved diff
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diffs.db");
    let id = {
        let store = SqliteDiffStore::open(&path).unwrap();
        save_diff(
            &local_request(r#"{"z": 1, "a": [true, null]}"#),
            &AllowListPolicy::default(),
            &IdGenerator::with_defaults(),
            &store,
        )
        .unwrap()
    };

    // When: The file is opened again
    let store = SqliteDiffStore::open(&path).unwrap();

    // Then: The diff renders with its original key order
    assert_eq!(
        resolve_page_state(Some(&id), &store),
        r#"{"z": 1, "a": [true, null]}"#
    );
}

#[test]
fn test_collisions_resolved_against_sqlite() {
    // Given: The generator's first candidate already stored
    let store = SqliteDiffStore::open_in_memory().unwrap();
    let ids = IdGenerator::new(Arc::new(SequenceSource::new(vec![0.5, 0.5, 0.625])), 4);
    let taken = ids.candidate();
    store.put(&SavedDiff::new(taken.clone(), json!("old"))).unwrap();

    // When: A new diff is saved
    let id = save_diff(&local_request("\"new\""), &AllowListPolicy::default(), &ids, &store)
        .unwrap();

    // Then: It lands on a fresh id and the old row is intact
    assert_ne!(id, taken);
    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(store.get(&taken).unwrap().unwrap().state(), &json!("old"));
}

#[test]
fn test_unicode_and_escapes_round_trip() {
    let store = SqliteDiffStore::open_in_memory().unwrap();
    let id = DiffId::parse("dW5pY29kZQ").unwrap();
    let state = json!({"text": "héllo \u{2028} </script> \"quoted\"", "n": 1.5e300});

    store.put(&SavedDiff::new(id.clone(), state.clone())).unwrap();

    assert_eq!(store.get(&id).unwrap().unwrap().state(), &state);
    assert!(!resolve_page_state(Some(&id), &store).contains("</script>"));
}
