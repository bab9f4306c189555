//! API integration tests
//!
//! These run against a live server with a seeded admin/admin account.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create a book with one available copy; returns (book_id, item_id)
async fn create_book_with_copy(client: &Client, token: &str, barcode: &str) -> (i64, i64) {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Test Book",
            "author_ids": [],
            "category_ids": []
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book");
    let book_id = body["id"].as_i64().expect("No book ID");

    let response = client
        .post(format!("{}/books/{}/items", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "barcode": barcode }))
        .send()
        .await
        .expect("Failed to create item");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse item");
    let item_id = body["id"].as_i64().expect("No item ID");

    (book_id, item_id)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_create_and_delete_book() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Disposable Book",
            "isbn13": "9780000000002",
            "author_ids": [],
            "category_ids": []
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["id"].as_i64().expect("No book ID");

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_borrow_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (book_id, _item_id) = create_book_with_copy(&client, &token, "IT-LIFE-0001").await;

    // Submit a one-copy request
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "requested_from": "2099-01-01",
            "requested_to": "2099-01-15",
            "lines": [{ "book_id": book_id, "quantity": 1 }]
        }))
        .send()
        .await
        .expect("Failed to submit request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse request");
    let request_id = body["id"].as_i64().expect("No request ID");
    assert_eq!(body["status"], "PENDING");

    // Approve it: the copy is available, so the outcome is approved
    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to approve request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse outcome");
    assert_eq!(body["outcome"], "approved");
    let loan_id = body["loan_ids"][0].as_i64().expect("No loan ID");

    // A second decision on the same request is rejected
    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Return the copy
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to return loan");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse loan");
    assert_eq!(body["status"], "RETURNED");

    // Returning twice is a conflict
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_approve_two_lines_for_same_book() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // Two copies of one book, requested as two separate one-copy lines
    let (book_id, _item_id) = create_book_with_copy(&client, &token, "IT-DUP-0001").await;
    let response = client
        .post(format!("{}/books/{}/items", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "barcode": "IT-DUP-0002" }))
        .send()
        .await
        .expect("Failed to create second item");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "requested_from": "2099-03-01",
            "requested_to": "2099-03-15",
            "lines": [
                { "book_id": book_id, "quantity": 1 },
                { "book_id": book_id, "quantity": 1 }
            ]
        }))
        .send()
        .await
        .expect("Failed to submit request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse request");
    let request_id = body["id"].as_i64().expect("No request ID");

    // Both lines must be served from distinct copies
    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to approve request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse outcome");
    assert_eq!(body["outcome"], "approved");
    assert_eq!(body["loan_ids"].as_array().expect("No loans").len(), 2);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch book");
    let body: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(body["items_available"], 0);
}

#[tokio::test]
#[ignore]
async fn test_approve_duplicate_lines_shortage_rejects() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // One copy shared by two one-copy lines: a shortage, not a conflict
    let (book_id, _item_id) = create_book_with_copy(&client, &token, "IT-DUPSHORT-0001").await;
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "requested_from": "2099-03-01",
            "requested_to": "2099-03-15",
            "lines": [
                { "book_id": book_id, "quantity": 1 },
                { "book_id": book_id, "quantity": 1 }
            ]
        }))
        .send()
        .await
        .expect("Failed to submit request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse request");
    let request_id = body["id"].as_i64().expect("No request ID");

    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to approve request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse outcome");
    assert_eq!(body["outcome"], "rejected");
    assert!(body["reason"].as_str().expect("No reason").contains("available"));

    // The copy was not consumed by the rejected allocation
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch book");
    let body: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(body["items_available"], 1);
}

#[tokio::test]
#[ignore]
async fn test_approve_shortage_rejects() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (book_id, _item_id) = create_book_with_copy(&client, &token, "IT-SHORT-0001").await;

    // Ask for more copies than exist
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "requested_from": "2099-02-01",
            "requested_to": "2099-02-15",
            "lines": [{ "book_id": book_id, "quantity": 5 }]
        }))
        .send()
        .await
        .expect("Failed to submit request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse request");
    let request_id = body["id"].as_i64().expect("No request ID");

    let response = client
        .post(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to approve request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse outcome");
    assert_eq!(body["outcome"], "rejected");
    assert!(body["reason"].as_str().expect("No reason").contains("available"));

    // The single copy was not consumed by the failed allocation
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch book");
    let body: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(body["items_available"], 1);
}

#[tokio::test]
#[ignore]
async fn test_invalid_request_range() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "requested_from": "2099-03-15",
            "requested_to": "2099-03-01",
            "lines": [{ "book_id": 1, "quantity": 1 }]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_favorite_book() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (book_id, _item_id) = create_book_with_copy(&client, &token, "IT-FAV-0001").await;

    let response = client
        .post(format!("{}/books/{}/favorite", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to add favorite");
    assert_eq!(response.status(), 201);

    // Duplicate favorite is a conflict
    let response = client
        .post(format!("{}/books/{}/favorite", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let response = client
        .delete(format!("{}/books/{}/favorite", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to remove favorite");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_rate_book() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let (book_id, _item_id) = create_book_with_copy(&client, &token, "IT-RATE-0001").await;

    let response = client
        .put(format!("{}/books/{}/rating", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "rating": 4, "review": "Solid" }))
        .send()
        .await
        .expect("Failed to rate book");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/books/{}/ratings", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to fetch ratings");
    let body: Value = response.json().await.expect("Failed to parse ratings");
    assert_eq!(body["average"].as_f64(), Some(4.0));
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
