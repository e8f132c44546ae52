//! Request correlation middleware
//!
//! Reuses a well-formed `x-request-id` from the client, otherwise mints a
//! UUIDv7. The id goes into the request extensions, the tracing span that
//! wraps the handler, and the response headers.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use jsondiff_core_types::schema::HEADER_REQUEST_ID;
use jsondiff_core_types::{RequestContext, RequestId};
use tracing::Instrument;

pub async fn propagate(mut request: Request, next: Next) -> Response {
    let incoming = request
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|v| v.to_str().ok());
    let request_id = RequestId::from_header_or_new(incoming);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    request
        .extensions_mut()
        .insert(RequestContext::with_request_id(request_id.clone()));

    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(HEADER_REQUEST_ID, value);
    }
    response
}
