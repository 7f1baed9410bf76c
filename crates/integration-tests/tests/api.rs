//! End-to-end API flows against the in-memory store.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode, header};
use chrono::{TimeDelta, Utc};
use serde_json::json;

use phonebook_core::UserId;
use phonebook_integration_tests::TestApp;

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let app = TestApp::new();

    let live = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");

    let ready = app.send(Method::GET, "/health/ready", None, None).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();
    let response = app.send(Method::GET, "/nope", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.message(),
        "failed to process request: nothing to do here"
    );
}

#[tokio::test]
async fn test_unrouted_method_on_known_path() {
    let app = TestApp::new();
    let token = app.register("a@x.com", "pw123").await;

    for (method, uri) in [
        (Method::DELETE, "/addresses"),
        (Method::POST, "/addresses/1"),
        (Method::PUT, "/health"),
    ] {
        let response = app.send(method.clone(), uri, Some(&token), None).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(
            response.body,
            json!({ "message": "failed to process request: nothing to do here" })
        );
    }
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();
    let request = axum::http::Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.call(request).await;
    assert_eq!(response.headers["x-request-id"], "req-42");
}

// ============================================================================
// Register / Login
// ============================================================================

#[tokio::test]
async fn test_register_returns_token() {
    let app = TestApp::new();
    let response = app
        .send(
            Method::POST,
            "/register",
            None,
            Some(&json!({ "email": "a@x.com", "password": "pw123" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.message(), "success");

    let token = response.body["data"]["access_token"].as_str().unwrap();
    assert_eq!(
        response.headers[header::AUTHORIZATION],
        format!("Bearer {token}").as_str()
    );
    assert_eq!(app.tokens.resolve(token).unwrap(), UserId::new(1));
}

#[tokio::test]
async fn test_register_then_login_same_user() {
    let app = TestApp::new();
    let registered = app.register("a@x.com", "pw123").await;

    let response = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(&json!({ "email": "a@x.com", "password": "pw123" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let logged_in = response.body["data"]["access_token"].as_str().unwrap();
    assert_eq!(
        app.tokens.resolve(&registered).unwrap(),
        app.tokens.resolve(logged_in).unwrap()
    );
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::new();
    app.register("a@x.com", "pw123").await;

    let response = app
        .send(
            Method::POST,
            "/register",
            None,
            Some(&json!({ "email": "a@x.com", "password": "other" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.message(),
        "failed to process request: email already registered"
    );
    assert_eq!(app.store.user_count().await, 1);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.register("a@x.com", "pw123").await;

    let wrong_password = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(&json!({ "email": "a@x.com", "password": "nope" })),
        )
        .await;
    let unknown_email = app
        .send(
            Method::POST,
            "/login",
            None,
            Some(&json!({ "email": "b@x.com", "password": "pw123" })),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(
        wrong_password.message(),
        "failed to process request: incorrect email or password"
    );
}

#[tokio::test]
async fn test_register_missing_fields() {
    let app = TestApp::new();
    let response = app
        .send(Method::POST, "/register", None, Some(&json!({ "password": "" })))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "invalid body format");
    assert_eq!(
        response.body["errors"],
        json!({
            "email": "cannot satisfy required tag",
            "password": "cannot satisfy required tag",
        })
    );
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = TestApp::new();
    let response = app
        .send(
            Method::POST,
            "/register",
            None,
            Some(&json!({ "email": "not-an-email", "password": "pw123" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "invalid body format");
    assert_eq!(response.body["errors"]["email"], "email must contain an @ symbol");
}

#[tokio::test]
async fn test_malformed_json() {
    let app = TestApp::new();

    let syntax = app
        .send_raw(Method::POST, "/register", None, Some("{\"email\":".to_owned()))
        .await;
    let wrong_type = app
        .send_raw(
            Method::POST,
            "/login",
            None,
            Some(r#"{"email": 5, "password": "pw"}"#.to_owned()),
        )
        .await;

    for response in [syntax, wrong_type] {
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body, json!({ "message": "invalid JSON format" }));
    }
}

// ============================================================================
// Authentication boundary
// ============================================================================

#[tokio::test]
async fn test_missing_token() {
    let app = TestApp::new();
    let response = app.send(Method::GET, "/addresses", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "login to access this resource");
}

#[tokio::test]
async fn test_invalid_token() {
    let app = TestApp::new();
    let response = app
        .send(Method::GET, "/addresses", Some("garbage"), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "re-login to access this resource");
}

#[tokio::test]
async fn test_expired_token() {
    let app = TestApp::new();
    app.register("a@x.com", "pw123").await;
    let expired = app
        .tokens
        .issue_at(UserId::new(1), Utc::now() - TimeDelta::hours(2))
        .unwrap();

    let response = app
        .send(Method::GET, "/addresses", Some(&expired), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "re-login to access this resource");
}

// ============================================================================
// Addresses
// ============================================================================

#[tokio::test]
async fn test_create_and_read_address() {
    let app = TestApp::new();
    let token = app.register("a@x.com", "pw123").await;

    // Client-supplied ownership is ignored
    let response = app
        .send(
            Method::POST,
            "/addresses",
            Some(&token),
            Some(&json!({ "name": "Bob", "phone_number": "555-1", "user_id": 99, "id": 7 })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(
        response.body["data"],
        json!({ "id": 1, "user_id": 1, "name": "Bob", "phone_number": "555-1" })
    );

    let fetched = app
        .send(Method::GET, "/addresses/1", Some(&token), None)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.message(), "success");
    assert_eq!(fetched.body["data"], response.body["data"]);
}

#[tokio::test]
async fn test_address_body_validation() {
    let app = TestApp::new();
    let token = app.register("a@x.com", "pw123").await;

    let response = app
        .send(
            Method::POST,
            "/addresses",
            Some(&token),
            Some(&json!({ "name": "Bob" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({
            "message": "invalid body format",
            "errors": { "phone_number": "cannot satisfy required tag" },
        })
    );
}

#[tokio::test]
async fn test_blank_address_fields_are_missing() {
    let app = TestApp::new();
    let token = app.register("a@x.com", "pw123").await;

    let response = app
        .send(
            Method::POST,
            "/addresses",
            Some(&token),
            Some(&json!({ "name": "  ", "phone_number": "555-1" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({
            "message": "invalid body format",
            "errors": { "name": "cannot satisfy required tag" },
        })
    );
    assert_eq!(app.store.write_count(), 1);
}

#[tokio::test]
async fn test_list_all_and_mine() {
    let app = TestApp::new();
    let alice = app.register("a@x.com", "pw123").await;
    let bob = app.register("b@x.com", "pw123").await;
    app.create_address(&alice, "Carol", "555-1").await;
    app.create_address(&bob, "Dave", "555-2").await;
    app.create_address(&alice, "Erin", "555-3").await;

    let all = app.send(Method::GET, "/addresses", Some(&bob), None).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body["data"].as_array().unwrap().len(), 3);

    let mine = app
        .send(Method::GET, "/addresses/user", Some(&alice), None)
        .await;
    assert_eq!(mine.status, StatusCode::OK);
    let names: Vec<_> = mine.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, ["Carol", "Erin"]);
}

#[tokio::test]
async fn test_empty_lists() {
    let app = TestApp::new();
    let token = app.register("a@x.com", "pw123").await;

    let all = app.send(Method::GET, "/addresses", Some(&token), None).await;
    assert_eq!(all.body, json!({ "message": "success", "data": [] }));
}

#[tokio::test]
async fn test_get_missing_and_invalid_ids() {
    let app = TestApp::new();
    let token = app.register("a@x.com", "pw123").await;

    let missing = app
        .send(Method::GET, "/addresses/42", Some(&token), None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(
        missing.message(),
        "failed to process request: address not found"
    );

    let invalid = app
        .send(Method::GET, "/addresses/abc", Some(&token), None)
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        invalid.message(),
        "failed to process request: invalid address id"
    );
}

#[tokio::test]
async fn test_owner_updates_and_deletes() {
    let app = TestApp::new();
    let token = app.register("a@x.com", "pw123").await;
    app.create_address(&token, "Bob", "555-1").await;

    let updated = app
        .send(
            Method::PUT,
            "/addresses/1",
            Some(&token),
            Some(&json!({ "name": "Robert", "phone_number": "555-9" })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body, json!({ "message": "success" }));

    let fetched = app
        .send(Method::GET, "/addresses/1", Some(&token), None)
        .await;
    assert_eq!(
        fetched.body["data"],
        json!({ "id": 1, "user_id": 1, "name": "Robert", "phone_number": "555-9" })
    );

    let deleted = app
        .send(Method::DELETE, "/addresses/1", Some(&token), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, json!({ "message": "success" }));

    let gone = app
        .send(Method::GET, "/addresses/1", Some(&token), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_user_cannot_mutate() {
    let app = TestApp::new();
    let owner = app.register("a@x.com", "pw123").await;
    let intruder = app.register("b@x.com", "pw123").await;
    let created = app.create_address(&owner, "Bob", "555-1").await;

    let update = app
        .send(
            Method::PUT,
            "/addresses/1",
            Some(&intruder),
            Some(&json!({ "name": "Mallory", "phone_number": "000" })),
        )
        .await;
    assert_eq!(update.status, StatusCode::FORBIDDEN);
    assert_eq!(
        update.message(),
        "failed to process request: unauthorized update"
    );

    let delete = app
        .send(Method::DELETE, "/addresses/1", Some(&intruder), None)
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
    assert_eq!(
        delete.message(),
        "failed to process request: unauthorized delete"
    );

    let fetched = app
        .send(Method::GET, "/addresses/1", Some(&owner), None)
        .await;
    assert_eq!(fetched.body["data"], created);
}

#[tokio::test]
async fn test_mutating_missing_address() {
    let app = TestApp::new();
    let token = app.register("a@x.com", "pw123").await;

    let update = app
        .send(
            Method::PUT,
            "/addresses/9",
            Some(&token),
            Some(&json!({ "name": "n", "phone_number": "p" })),
        )
        .await;
    let delete = app
        .send(Method::DELETE, "/addresses/9", Some(&token), None)
        .await;

    assert_eq!(update.status, StatusCode::NOT_FOUND);
    assert_eq!(delete.status, StatusCode::NOT_FOUND);
}
