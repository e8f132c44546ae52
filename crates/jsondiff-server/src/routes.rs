//! HTTP routes
//!
//! | Route          | Behavior                                        |
//! |----------------|-------------------------------------------------|
//! | `/`            | page with the empty state                       |
//! | `/_save`       | any method, JSON `{success, model_id|message}`   |
//! | `/<model_id>`  | page with the saved state, 404 below 6 chars    |
//!
//! `<model_id>` is the whole rest of the path, slashes included. Store
//! calls block, so they run on the blocking pool.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, Path, RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Html;
use axum::routing::{any, get};
use axum::{middleware, Extension, Json, Router};
use jsondiff_core::errors::{ExError, ExErrorKind, ExResult};
use jsondiff_core::ops::{resolve_page_state, save_diff};
use jsondiff_core::render::EMPTY_STATE_LITERAL;
use jsondiff_core::{DiffId, SaveRequest, SaveResponse};
use jsondiff_core_types::RequestContext;

use crate::request_id;
use crate::state::AppState;

/// Form and query field carrying the serialized state
pub const STATE_FIELD: &str = "state_json";

pub fn router(state: AppState) -> Router {
    let save_route = any(save).layer(DefaultBodyLimit::max(state.max_body_bytes));
    Router::new()
        .route("/", get(index))
        .route("/_save", save_route)
        .route("/*model_id", get(show))
        .layer(middleware::from_fn(request_id::propagate))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    render_page(state, None).await
}

async fn show(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let id = DiffId::parse(model_id).map_err(|_| StatusCode::NOT_FOUND)?;
    render_page(state, Some(id)).await
}

async fn render_page(state: AppState, id: Option<DiffId>) -> Result<Html<String>, StatusCode> {
    let store = state.store.clone();
    let span = tracing::Span::current();
    let literal = tokio::task::spawn_blocking(move || {
        span.in_scope(|| resolve_page_state(id.as_ref(), store.as_ref()))
    })
    .await
    .unwrap_or_else(|err| {
        tracing::error!(error = %err, "page state lookup aborted, rendering empty state");
        EMPTY_STATE_LITERAL.to_string()
    });

    state.renderer.render(&literal).map(Html).map_err(|err| {
        tracing::error!(error = %err, "page render failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn save(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Result<Bytes, BytesRejection>,
) -> Json<SaveResponse> {
    let mut request = SaveRequest::new();
    if let Some(referer) = headers.get(header::REFERER).and_then(|v| v.to_str().ok()) {
        request = request.with_referer(referer);
    }
    match &body {
        Ok(body) => {
            if let Some(state_json) = state_json_field(&headers, query.as_deref(), body) {
                request = request.with_state_json(state_json);
            }
        }
        // Leave state_json unset; the save then fails like any missing payload
        Err(rejection) => {
            tracing::warn!(status = %rejection.status(), "save body unreadable: {}", rejection);
        }
    }

    let span = tracing::Span::current();
    let result: ExResult<DiffId> = tokio::task::spawn_blocking(move || {
        span.in_scope(|| {
            save_diff(
                &request,
                state.policy.as_ref(),
                &state.ids,
                state.store.as_ref(),
            )
        })
    })
    .await
    .unwrap_or_else(|err| {
        Err(ExError::new(ExErrorKind::Internal)
            .with_op("save_diff")
            .with_message(err.to_string()))
    })
    .map_err(|err| err.with_request_id(ctx.request_id.clone()));

    if let Err(err) = &result {
        if err.kind().is_client_error() {
            tracing::info!(err_code = err.code(), "save rejected: {}", err);
        } else {
            tracing::warn!(err_code = err.code(), "save failed: {}", err);
        }
    }
    Json(SaveResponse::from_result(&result))
}

/// `state_json` from a urlencoded body, else from the query string
fn state_json_field(headers: &HeaderMap, query: Option<&str>, body: &[u8]) -> Option<String> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    let from_body = is_form.then(|| find_field(body)).flatten();
    from_body.or_else(|| query.and_then(|q| find_field(q.as_bytes())))
}

fn find_field(encoded: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(encoded)
        .find(|(key, _)| key == STATE_FIELD)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn form_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
        );
        headers
    }

    #[test]
    fn test_field_from_query() {
        let value = state_json_field(
            &HeaderMap::new(),
            Some("x=1&state_json=%7B%22a%22%3A1%7D"),
            b"",
        );
        assert_eq!(value.as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_body_wins_over_query() {
        let value = state_json_field(
            &form_headers(),
            Some("state_json=1"),
            b"state_json=%5B2%2C3%5D",
        );
        assert_eq!(value.as_deref(), Some("[2,3]"));
    }

    #[test]
    fn test_non_form_body_ignored() {
        let value = state_json_field(&HeaderMap::new(), None, b"state_json=1");
        assert_eq!(value, None);
    }

    #[test]
    fn test_plus_decodes_to_space() {
        let value = state_json_field(&form_headers(), None, b"state_json=%7B%22a%22%3A+1%7D");
        assert_eq!(value.as_deref(), Some(r#"{"a": 1}"#));
    }
}
