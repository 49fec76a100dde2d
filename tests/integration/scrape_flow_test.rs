// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use chrono::Local;
use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Mock, ResponseTemplate};

use super::helpers::{create_test_app, create_test_app_with_sheets, FailingSheets};
use std::sync::Arc;

const CONTACT_PAGE: &str = r#"<html>
<head><title>Spice Garden</title><script>var x = "noreply@tracker.com";</script></head>
<body>
  <h1>Spice Garden</h1>
  <p>Write to bookings@spicegarden.in or call +91 9876543210</p>
  <a href="https://www.facebook.com/spicegarden">Facebook</a>
  <a href="https://instagram.com/spicegarden">Instagram</a>
</body>
</html>"#;

#[tokio::test]
async fn test_end_to_end_scrape_exports_and_counts_usage() {
    let app = create_test_app().await;
    app.mock_page("spice-garden", 200, CONTACT_PAGE).await;
    app.mock_slow_page("slow-site").await;
    app.mock_search_links(&[
        app.site_url("spice-garden"),
        "https://www.facebook.com/somecafe".to_string(),
        app.site_url("slow-site"),
    ])
    .await;

    let response = app
        .server
        .post("/scrape")
        .json(&json!({
            "niche": "restaurants",
            "location": "Mumbai",
            "email": "new-user@example.com"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["results_count"], 2);
    assert_eq!(body["manual_share_required"], false);
    assert!(body["sheet_url"].as_str().unwrap().starts_with("file://"));

    let worksheets = app.exported_worksheets();
    assert_eq!(worksheets.len(), 1);
    let (name, csv) = &worksheets[0];
    assert!(name.starts_with("restaurants_Mumbai_"));

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "URL,Title,Emails,Phone Numbers,Facebook Profiles,Instagram Profiles,Scraped At,Status"
    );
    assert!(lines[1].contains("bookings@spicegarden.in"));
    assert!(lines[1].contains("+91 9876543210"));
    assert!(lines[1].contains("https://www.facebook.com/spicegarden"));
    assert!(!lines[1].contains("noreply@tracker.com"));
    assert!(lines[1].ends_with(",Success"));
    assert!(lines[2].starts_with(&app.site_url("slow-site")));
    assert!(!lines[2].contains("late@slowsite.in"));
    assert!(lines[2].ends_with(",Error"));
    assert!(csv.contains("Search Query,\"\"\"restaurants\"\" \"\"Mumbai\"\"\""));
    assert!(csv.contains("Total URLs Scraped,2\n"));
    assert!(csv.contains("Total Emails Found,1\n"));

    let status: Value = app
        .server
        .get("/quota/new-user@example.com/status")
        .await
        .json();
    assert_eq!(status["used"], 1);
    assert_eq!(status["remaining"], 4);
}

#[tokio::test]
async fn test_missing_fields_return_400_without_side_effects() {
    let app = create_test_app().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "organic": [] })))
        .expect(0)
        .mount(&app.search)
        .await;

    let response = app
        .server
        .post("/scrape")
        .json(&json!({ "niche": "restaurants", "email": "a@example.com" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing niche or location in request");
    assert!(!app.users_file().exists());

    let response = app
        .server
        .post("/scrape")
        .text("not json")
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exhausted_quota_returns_429_before_searching() {
    let app = create_test_app().await;
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    std::fs::write(
        app.users_file(),
        json!({
            "busy@example.com": {
                "plan": "Free Trial",
                "used": 5,
                "quota": 5,
                "last_reset": today
            }
        })
        .to_string(),
    )
    .unwrap();
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "organic": [] })))
        .expect(0)
        .mount(&app.search)
        .await;

    let response = app
        .server
        .post("/scrape")
        .json(&json!({
            "niche": "gyms",
            "location": "Pune",
            "email": "busy@example.com"
        }))
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "Quota exceeded. Please upgrade your plan. Current plan: Free Trial (5/5 searches used)"
    );
}

#[tokio::test]
async fn test_no_results_returns_404_and_keeps_quota() {
    let app = create_test_app().await;
    app.mock_search_links(&["https://www.instagram.com/onlysocial".to_string()])
        .await;

    let response = app
        .server
        .post("/scrape")
        .json(&json!({
            "niche": "bakeries",
            "location": "Goa",
            "email": "baker@example.com"
        }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "No data found");
    assert!(app.exported_worksheets().is_empty());

    let status: Value = app.server.get("/quota/baker@example.com/status").await.json();
    assert_eq!(status["used"], 0);
}

#[tokio::test]
async fn test_search_failure_is_500_with_generic_message() {
    let app = create_test_app().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&app.search)
        .await;

    let response = app
        .server
        .post("/scrape")
        .json(&json!({ "niche": "salons", "location": "Delhi" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_export_failure_is_500_and_consumes_no_quota() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app_with_sheets(dir, Arc::new(FailingSheets)).await;
    app.mock_page("spice-garden", 200, CONTACT_PAGE).await;
    app.mock_search_links(&[app.site_url("spice-garden")]).await;

    let response = app
        .server
        .post("/scrape")
        .json(&json!({
            "niche": "restaurants",
            "location": "Mumbai",
            "email": "unlucky@example.com"
        }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Internal server error");

    let status: Value = app
        .server
        .get("/quota/unlucky@example.com/status")
        .await
        .json();
    assert_eq!(status["used"], 0);
    assert_eq!(status["remaining"], 5);
}
