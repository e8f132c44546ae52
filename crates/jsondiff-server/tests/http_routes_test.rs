#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use axum::http::{header, StatusCode};
use jsondiff_core::id_gen::candidate_from_fraction;
use jsondiff_core::{DiffStore, MemoryStore, SavedDiff};
use jsondiff_core_types::schema::HEADER_REQUEST_ID;
use serde_json::json;

#[tokio::test]
async fn test_save_then_view_scenario() {
    // Given: A fresh server
    let (app, _store) = common::test_app();

    // When: The viewer saves {"a":1} from localhost
    let response = common::send(
        &app,
        common::save_query(r#"{"a":1}"#, Some(common::LOCAL_REFERER)),
    )
    .await;

    // Then: It gets a 16-character model id back
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["success"], json!(true));
    let model_id = body["model_id"].as_str().unwrap().to_string();
    assert_eq!(model_id.len(), 16);
    assert!(body.get("message").is_none());

    // And: Opening the id embeds the same object
    let response = common::send(&app, common::get(&format!("/{}", model_id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let html = common::body_text(response).await;
    assert!(html.contains(r#"var diffState = {"a": 1};"#));
}

#[tokio::test]
async fn test_form_post_like_the_viewer() {
    let (app, store) = common::test_app();
    let state = json!({"left": {"x": [1, 2.5, "ü"]}, "right": null});

    let response = common::send(
        &app,
        common::save_form(&state.to_string(), "https://localhost:3000/abc"),
    )
    .await;

    let body = common::body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(store.len(), 1);

    let html = common::body_text(
        common::send(
            &app,
            common::get(&format!("/{}", body["model_id"].as_str().unwrap())),
        )
        .await,
    )
    .await;
    let literal = html
        .split("var diffState = ")
        .nth(1)
        .and_then(|rest| rest.split(";\n").next())
        .unwrap();
    assert_eq!(serde_json::from_str::<serde_json::Value>(literal).unwrap(), state);
}

#[tokio::test]
async fn test_bad_referers_rejected() {
    let (app, store) = common::test_app();

    for referer in [
        None,
        Some("http://evil.com/"),
        Some("http://localhost/"),
        Some("http://jsondiff.itsagoldenage.com.evil.com/"),
    ] {
        let response = common::send(&app, common::save_query("{}", referer)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            common::body_json(response).await,
            json!({"success": false, "message": "Bad referer."}),
            "referer {:?}",
            referer
        );
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_bad_referer_wins_over_bad_payload() {
    let (app, _store) = common::test_app();

    let response = common::send(&app, common::save_query("{{{", Some("http://evil.com/"))).await;

    assert_eq!(
        common::body_json(response).await["message"],
        json!("Bad referer.")
    );
}

#[tokio::test]
async fn test_malformed_and_missing_payloads() {
    let (app, store) = common::test_app();
    let generic = json!({"success": false, "message": "Failed to save your diff."});

    for payload in ["", "{", "{'a': 1}", "NaN"] {
        let response =
            common::send(&app, common::save_query(payload, Some(common::LOCAL_REFERER))).await;
        assert_eq!(common::body_json(response).await, generic, "payload {:?}", payload);
    }

    let missing = axum::http::Request::builder()
        .uri("/_save")
        .header(header::REFERER, common::LOCAL_REFERER)
        .body(axum::body::Body::empty())
        .unwrap();
    assert_eq!(common::body_json(common::send(&app, missing).await).await, generic);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_exhausted_ids_give_generic_failure() {
    let store = Arc::new(MemoryStore::new());
    store
        .put(&SavedDiff::new(candidate_from_fraction(0.5), json!(0)))
        .unwrap();
    let app = common::app_with(store.clone(), common::scripted_ids(vec![0.5], 3));

    let response =
        common::send(&app, common::save_query("1", Some(common::LOCAL_REFERER))).await;

    assert_eq!(
        common::body_json(response).await["message"],
        json!("Failed to save your diff.")
    );
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_empty_state_pages_match() {
    let (app, _store) = common::test_app();

    let root = common::body_text(common::send(&app, common::get("/")).await).await;
    let unknown = common::body_text(common::send(&app, common::get("/bm90LWEtcmVhbC1pZA")).await).await;

    assert!(root.contains(r#"var diffState = "";"#));
    assert_eq!(root, unknown);
}

#[tokio::test]
async fn test_short_ids_and_test_route_are_404() {
    let (app, _store) = common::test_app();

    for uri in ["/abc", "/abcde", "/test"] {
        let response = common::send(&app, common::get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {}", uri);
    }

    let response = common::send(&app, common::get("/abcdef")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ids_may_contain_slashes() {
    // Given a store holding an id with a slash in it
    let (app, store) = common::test_app();
    let id = jsondiff_core::DiffId::parse("abcdef/ghi").unwrap();
    store.put(&SavedDiff::new(id, json!({"k": 1}))).unwrap();

    // When the page for that id and for an unknown nested path are fetched
    let saved = common::send(&app, common::get("/abcdef/ghi")).await;
    let unknown = common::send(&app, common::get("/abcdef/xyz")).await;
    let short = common::send(&app, common::get("/ab/c")).await;

    // Then both render, with the stored state or the empty one
    assert_eq!(saved.status(), StatusCode::OK);
    assert!(common::body_text(saved).await.contains(r#"var diffState = {"k": 1};"#));
    assert_eq!(unknown.status(), StatusCode::OK);
    assert!(common::body_text(unknown).await.contains(r#"var diffState = "";"#));
    assert_eq!(short.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_large_form_post_is_accepted() {
    // Given a state of about 3 MiB, above axum's 2 MiB default
    let (app, store) = common::test_app();
    let payload = serde_json::to_string(&json!({"blob": "x".repeat(3 * 1024 * 1024)})).unwrap();

    // When it is posted like the viewer does
    let response = common::send(&app, common::save_form(&payload, common::LOCAL_REFERER)).await;

    // Then it is saved
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_oversized_body_gives_generic_failure() {
    // Given a router that reads at most 1 KiB of save body
    let (app, store) = common::app_with_body_limit(1024);
    let payload = serde_json::to_string(&json!({"blob": "x".repeat(4096)})).unwrap();

    // When a larger form is posted
    let response = common::send(&app, common::save_form(&payload, common::LOCAL_REFERER)).await;

    // Then the answer is still 200 with the generic message
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        common::body_json(response).await,
        json!({"success": false, "message": "Failed to save your diff."})
    );
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_oversized_body_still_checks_referer_first() {
    let (app, _store) = common::app_with_body_limit(16);
    let payload = "[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]";

    let response = common::send(&app, common::save_form(payload, "http://evil.example/")).await;

    assert_eq!(
        common::body_json(response).await["message"],
        json!("Bad referer.")
    );
}

#[tokio::test]
async fn test_script_breaking_strings_are_escaped() {
    let (app, _store) = common::test_app();
    let payload = r#"{"x": "</script><script>alert(1)</script>"}"#;

    let body = common::body_json(
        common::send(&app, common::save_query(payload, Some(common::LOCAL_REFERER))).await,
    )
    .await;
    let html = common::body_text(
        common::send(
            &app,
            common::get(&format!("/{}", body["model_id"].as_str().unwrap())),
        )
        .await,
    )
    .await;

    assert!(!html.contains("alert(1)</script>"));
    assert!(html.contains("alert(1)"));
}

#[tokio::test]
async fn test_request_id_header() {
    let (app, _store) = common::test_app();

    // Generated when absent
    let response = common::send(&app, common::get("/")).await;
    let generated = response.headers()[HEADER_REQUEST_ID].to_str().unwrap();
    assert_eq!(generated.len(), 36);

    // Echoed when supplied
    let request = axum::http::Request::builder()
        .uri("/_save")
        .header(HEADER_REQUEST_ID, "client-trace-42")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = common::send(&app, request).await;
    assert_eq!(response.headers()[HEADER_REQUEST_ID], "client-trace-42");
}
