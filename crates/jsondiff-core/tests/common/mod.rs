use std::sync::Arc;

use jsondiff_core::{
    AllowListPolicy, DiffId, DiffStore, IdGenerator, MemoryStore, SaveRequest, SavedDiff,
    SequenceSource,
};

/// Referer accepted by the default policy
#[allow(dead_code)]
pub const LOCAL_REFERER: &str = "http://localhost:8080/";

/// Save request from an allowed origin carrying `state_json`
#[allow(dead_code)]
pub fn local_request(state_json: &str) -> SaveRequest {
    SaveRequest::new()
        .with_referer(LOCAL_REFERER)
        .with_state_json(state_json)
}

#[allow(dead_code)]
pub fn default_policy() -> AllowListPolicy {
    AllowListPolicy::default()
}

/// Generator that replays `fractions` in order
#[allow(dead_code)]
pub fn scripted_ids(fractions: Vec<f64>, max_attempts: u32) -> IdGenerator {
    IdGenerator::new(Arc::new(SequenceSource::new(fractions)), max_attempts)
}

/// Memory store pre-loaded with one diff per id
#[allow(dead_code)]
pub fn seeded_store(ids: &[&DiffId]) -> MemoryStore {
    let store = MemoryStore::new();
    for id in ids {
        let diff = SavedDiff::new((*id).clone(), serde_json::json!({"seeded": true}));
        store.put(&diff).unwrap();
    }
    store
}
