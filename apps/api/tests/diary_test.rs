//! Integration tests for the diary endpoints
//!
//! Every test needs PostgreSQL and is skipped when it is not reachable.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{
    auth_delete_request, auth_get_request, auth_json_request, cleanup_user, parse_body_value,
    unique_user_id, TestApp,
};

fn entry_body(item_id: &str, rating: f64) -> Value {
    json!({
        "itemId": item_id,
        "itemType": "album",
        "title": "In Rainbows",
        "artist": "Radiohead",
        "imageUrl": "https://i.scdn.co/image/in-rainbows",
        "rating": rating,
        "review": "Weird fishes forever"
    })
}

async fn create_entry(app: &TestApp, token: &str, body: &Value) -> String {
    let response = app
        .request(auth_json_request("POST", "/api/diary", token, body))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body_value(response).await;
    assert_eq!(body["success"], true);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_diary_lifecycle() {
    require_db!(pool);
    let app = TestApp::with_pool(pool.clone()).await;
    let user_id = unique_user_id();
    let token = app.sign_in(&user_id).await;

    let id = create_entry(&app, &token, &entry_body("7eyQXxuf2nGj9d2367Gi5f", 4.5)).await;

    // read
    let response = app
        .request(auth_get_request(&format!("/api/diary/{}", id), &token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let entry = parse_body_value(response).await;
    assert_eq!(entry["id"], id.as_str());
    assert_eq!(entry["userId"], user_id.as_str());
    assert_eq!(entry["itemType"], "album");
    assert_eq!(entry["rating"], 4.5);
    assert_eq!(entry["review"], "Weird fishes forever");

    // update
    let response = app
        .request(auth_json_request(
            "PUT",
            &format!("/api/diary/{}", id),
            &token,
            &json!({"rating": 5.0}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_body_value(response).await, json!({"success": true}));

    let response = app
        .request(auth_get_request(&format!("/api/diary/{}", id), &token))
        .await;
    let entry = parse_body_value(response).await;
    assert_eq!(entry["rating"], 5.0);
    assert_eq!(entry["review"], "Weird fishes forever");

    // an explicit review replaces the stored one
    let response = app
        .request(auth_json_request(
            "PUT",
            &format!("/api/diary/{}", id),
            &token,
            &json!({"rating": 4.0, "review": ""}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(auth_get_request(&format!("/api/diary/{}", id), &token))
        .await;
    let entry = parse_body_value(response).await;
    assert_eq!(entry["rating"], 4.0);
    assert_eq!(entry["review"], "");

    // delete
    let response = app
        .request(auth_delete_request(&format!("/api/diary/{}", id), &token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(auth_get_request(&format!("/api/diary/{}", id), &token))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    cleanup_user(&pool, &user_id).await;
}

#[tokio::test]
async fn test_list_is_newest_first_and_scoped_to_caller() {
    require_db!(pool);
    let app = TestApp::with_pool(pool.clone()).await;
    let user_id = unique_user_id();
    let other_id = unique_user_id();
    let token = app.sign_in(&user_id).await;
    let other_token = app.sign_in(&other_id).await;

    let first = create_entry(&app, &token, &entry_body("first", 3.0)).await;
    let second = create_entry(&app, &token, &entry_body("second", 3.5)).await;
    create_entry(&app, &other_token, &entry_body("theirs", 1.0)).await;

    let response = app.request(auth_get_request("/api/diary", &token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let entries = parse_body_value(response).await;
    let ids: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![second.as_str(), first.as_str()]);

    cleanup_user(&pool, &user_id).await;
    cleanup_user(&pool, &other_id).await;
}

#[tokio::test]
async fn test_create_reports_first_missing_field() {
    require_db!(pool);
    let app = TestApp::with_pool(pool.clone()).await;
    let user_id = unique_user_id();
    let token = app.sign_in(&user_id).await;

    let mut body = entry_body("x", 4.0);
    body["title"] = json!("");
    body.as_object_mut().unwrap().remove("imageUrl");

    let response = app
        .request(auth_json_request("POST", "/api/diary", &token, &body))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = parse_body_value(response).await;
    assert_eq!(error["code"], "MISSING_FIELD");
    assert_eq!(error["message"], "Missing required field: title");

    cleanup_user(&pool, &user_id).await;
}

#[tokio::test]
async fn test_create_rejects_invalid_values() {
    require_db!(pool);
    let app = TestApp::with_pool(pool.clone()).await;
    let user_id = unique_user_id();
    let token = app.sign_in(&user_id).await;

    let mut bodies = vec![entry_body("x", 5.5), entry_body("x", 2.25)];

    let mut podcast = entry_body("x", 4.0);
    podcast["itemType"] = json!("podcast");
    bodies.push(podcast);

    let mut long_review = entry_body("x", 4.0);
    long_review["review"] = json!("a".repeat(1001));
    bodies.push(long_review);

    for body in bodies {
        let response = app
            .request(auth_json_request("POST", "/api/diary", &token, &body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(parse_body_value(response).await["code"], "VALIDATION_ERROR");
    }

    let response = app.request(auth_get_request("/api/diary", &token)).await;
    assert_eq!(parse_body_value(response).await, json!([]));

    cleanup_user(&pool, &user_id).await;
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    require_db!(pool);
    let app = TestApp::with_pool(pool.clone()).await;
    let user_id = unique_user_id();
    let token = app.sign_in(&user_id).await;

    let response = app
        .request(auth_json_request(
            "POST",
            "/api/diary",
            &token,
            &json!({"itemId": "x", "rating": "five stars"}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body_value(response).await["code"], "INVALID_BODY");

    cleanup_user(&pool, &user_id).await;
}

#[tokio::test]
async fn test_update_requires_rating() {
    require_db!(pool);
    let app = TestApp::with_pool(pool.clone()).await;
    let user_id = unique_user_id();
    let token = app.sign_in(&user_id).await;
    let id = create_entry(&app, &token, &entry_body("x", 4.0)).await;

    let response = app
        .request(auth_json_request(
            "PUT",
            &format!("/api/diary/{}", id),
            &token,
            &json!({"review": "changed my mind"}),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body_value(response).await["code"], "MISSING_FIELD");

    cleanup_user(&pool, &user_id).await;
}

#[tokio::test]
async fn test_entries_of_other_users_are_forbidden() {
    require_db!(pool);
    let app = TestApp::with_pool(pool.clone()).await;
    let owner_id = unique_user_id();
    let intruder_id = unique_user_id();
    let owner_token = app.sign_in(&owner_id).await;
    let intruder_token = app.sign_in(&intruder_id).await;

    let id = create_entry(&app, &owner_token, &entry_body("x", 4.0)).await;
    let uri = format!("/api/diary/{}", id);

    let response = app.request(auth_get_request(&uri, &intruder_token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(auth_json_request(
            "PUT",
            &uri,
            &intruder_token,
            &json!({"rating": 0.5}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.request(auth_delete_request(&uri, &intruder_token)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // untouched for the owner
    let response = app.request(auth_get_request(&uri, &owner_token)).await;
    assert_eq!(parse_body_value(response).await["rating"], 4.0);

    cleanup_user(&pool, &owner_id).await;
    cleanup_user(&pool, &intruder_id).await;
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    require_db!(pool);
    let app = TestApp::with_pool(pool.clone()).await;
    let user_id = unique_user_id();
    let token = app.sign_in(&user_id).await;

    let missing = format!("/api/diary/{}", uuid::Uuid::new_v4());
    let response = app.request(auth_get_request(&missing, &token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.request(auth_delete_request(&missing, &token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(auth_get_request("/api/diary/not-a-uuid", &token))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    cleanup_user(&pool, &user_id).await;
}

#[tokio::test]
async fn test_diary_requires_session() {
    let app = TestApp::without_db().await;

    let response = app
        .request(common::get_request("/api/diary"))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
