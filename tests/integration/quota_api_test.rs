// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use serde_json::{json, Value};

use super::helpers::create_test_app;

#[tokio::test]
async fn test_status_for_unknown_user_does_not_create_record() {
    let app = create_test_app().await;

    let response = app.server.get("/quota/nobody@example.com/status").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["plan"], "Free Trial");
    assert_eq!(body["used"], 0);
    assert_eq!(body["quota"], 5);
    assert_eq!(body["remaining"], 5);
    assert_eq!(body["last_reset"], "Never");
    assert!(!app.users_file().exists());
}

#[tokio::test]
async fn test_quota_check_creates_default_record() {
    let app = create_test_app().await;

    let response = app.server.get("/quota/new@example.com").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["can_search"], true);
    assert_eq!(
        body["message"],
        "Search allowed. 5 searches remaining on Free Trial plan"
    );

    let stored: Value =
        serde_json::from_str(&std::fs::read_to_string(app.users_file()).unwrap()).unwrap();
    assert_eq!(stored["new@example.com"]["plan"], "Free Trial");
    assert_eq!(stored["new@example.com"]["used"], 0);
}

#[tokio::test]
async fn test_plan_update() {
    let app = create_test_app().await;

    let response = app
        .server
        .put("/quota/agency@example.com/plan")
        .json(&json!({ "plan": "Agency" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["plan"], "Agency");
    assert_eq!(body["quota"], 300);
    assert_eq!(body["used"], 0);
}

#[tokio::test]
async fn test_unknown_plan_is_rejected() {
    let app = create_test_app().await;

    let response = app
        .server
        .put("/quota/someone@example.com/plan")
        .json(&json!({ "plan": "Enterprise" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Enterprise"));
    assert!(!app.users_file().exists());
}
