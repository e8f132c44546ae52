use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use jsondiff_core::{
    AllowListPolicy, DiffStore, IdGenerator, MemoryStore, PageContext, PageRenderer,
    SequenceSource,
};
use jsondiff_server::{router, AppState};
use tower::ServiceExt;

pub const LOCAL_REFERER: &str = "http://localhost:8080/";

/// Router over an in-memory store with the default policy
#[allow(dead_code)]
pub fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone(), IdGenerator::with_defaults());
    (app, store)
}

/// Router over a given store and generator
#[allow(dead_code)]
pub fn app_with(store: Arc<dyn DiffStore>, ids: IdGenerator) -> Router {
    router(state_with(store, ids))
}

/// Router whose `/_save` reads at most `max_body_bytes`
#[allow(dead_code)]
pub fn app_with_body_limit(max_body_bytes: usize) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = state_with(store.clone(), IdGenerator::with_defaults())
        .with_max_body_bytes(max_body_bytes);
    (router(state), store)
}

fn state_with(store: Arc<dyn DiffStore>, ids: IdGenerator) -> AppState {
    AppState::new(
        store,
        ids,
        Arc::new(AllowListPolicy::default()),
        PageRenderer::new(PageContext::default()),
    )
}

#[allow(dead_code)]
pub fn scripted_ids(fractions: Vec<f64>, max_attempts: u32) -> IdGenerator {
    IdGenerator::new(Arc::new(SequenceSource::new(fractions)), max_attempts)
}

/// Percent-encode a form value
#[allow(dead_code)]
pub fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// GET `/_save?state_json=...` with an optional referer
#[allow(dead_code)]
pub fn save_query(state_json: &str, referer: Option<&str>) -> Request<Body> {
    let mut builder =
        Request::builder().uri(format!("/_save?state_json={}", encode(state_json)));
    if let Some(referer) = referer {
        builder = builder.header(header::REFERER, referer);
    }
    builder.body(Body::empty()).unwrap()
}

/// POST a urlencoded form the way the viewer script does
#[allow(dead_code)]
pub fn save_form(state_json: &str, referer: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/_save")
        .header(header::REFERER, referer)
        .header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded; charset=UTF-8",
        )
        .body(Body::from(format!("state_json={}", encode(state_json))))
        .unwrap()
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Send one request through a clone of the router
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

#[allow(dead_code)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
