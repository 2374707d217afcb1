//! Router-level integration tests.
//!
//! The full router is exercised through `tower::ServiceExt::oneshot`
//! against the in-memory stores and a mock payment provider, so no
//! database or network is needed.

#![allow(clippy::unwrap_used)]

use std::net::IpAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::util::ServiceExt;

use threadline_storefront::config::AppConfig;
use threadline_storefront::db::{MemoryOrderStore, MemoryProductStore, MemoryUserStore};
use threadline_storefront::services::checkout::{
    CheckoutError, CheckoutProvider, CheckoutRequest,
};
use threadline_storefront::state::AppState;

/// Mock payment provider that records the last session request.
#[derive(Default)]
struct MockCheckout {
    last_request: Mutex<Option<CheckoutRequest>>,
}

#[async_trait]
impl CheckoutProvider for MockCheckout {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<String, CheckoutError> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok("cs_test_mock".to_owned())
    }
}

fn test_config(upload_dir: &Path) -> AppConfig {
    AppConfig {
        database_url: SecretString::from("postgres://localhost/unused"),
        host: "127.0.0.1".parse::<IpAddr>().unwrap(),
        port: 4000,
        base_url: "http://localhost:4000".to_owned(),
        client_base_url: "http://localhost:3000".to_owned(),
        auth_token_secret: SecretString::from("t".repeat(32)),
        stripe_secret_key: SecretString::from("sk_test_123"),
        upload_dir: upload_dir.to_path_buf(),
        sentry_dsn: None,
    }
}

struct TestApp {
    router: Router,
    checkout: Arc<MockCheckout>,
    // Keeps the upload directory alive for the test's duration.
    upload_dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let checkout = Arc::new(MockCheckout::default());
    let state = AppState::new(
        test_config(upload_dir.path()),
        Arc::new(MemoryProductStore::default()),
        Arc::new(MemoryUserStore::default()),
        Arc::new(MemoryOrderStore::default()),
        checkout.clone(),
    );
    TestApp {
        router: threadline_storefront::routes::router(state),
        checkout,
        upload_dir: upload_dir,
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("auth-token", token);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(json!({}));
    (status, body)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, None, Some(body)).await
}

async fn post_auth(app: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(token), Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None, None).await
}

/// Register a user and return their token.
async fn register(app: &Router, email: &str) -> String {
    let (status, body) = post(
        app,
        "/register",
        json!({ "username": "tester", "email": email, "password": "hunter22" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    body["token"].as_str().unwrap().to_owned()
}

async fn add_product(app: &Router, name: &str, category: &str) {
    let (status, body) = post(
        app,
        "/addproduct",
        json!({
            "name": name,
            "image": "http://localhost:4000/images/p.png",
            "category": category,
            "new_price": 50,
            "old_price": 80,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["name"], name);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = test_app();
    let (status, _) = get(&app.router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app.router, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app.router, "/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let app = test_app();
    register(&app.router, "dup@example.com").await;

    let (status, body) = post(
        &app.router,
        "/register",
        json!({ "username": "other", "email": "dup@example.com", "password": "pw123456" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email already exists");
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let app = test_app();
    let (status, body) = post(
        &app.router,
        "/register",
        json!({ "username": "x", "email": "not-an-email", "password": "pw123456" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_reports_failures_with_status_200() {
    let app = test_app();
    register(&app.router, "alice@example.com").await;

    let (status, body) = post(
        &app.router,
        "/login",
        json!({ "email": "nobody@example.com", "password": "hunter22" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Wrong Email");

    let (status, body) = post(
        &app.router,
        "/login",
        json!({ "email": "alice@example.com", "password": "wrong-pw" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Wrong Password");

    let (status, body) = post(
        &app.router,
        "/login",
        json!({ "email": "alice@example.com", "password": "hunter22" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn new_user_cart_has_300_zeroed_slots() {
    let app = test_app();
    let token = register(&app.router, "cart@example.com").await;

    let (status, cart) = post_auth(&app.router, "/getcartdata", &token, json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let map = cart.as_object().unwrap();
    assert_eq!(map.len(), 300);
    assert!(map.contains_key("0") && map.contains_key("299"));
    assert!(map.values().all(|v| v == 0));
}

#[tokio::test]
async fn cart_add_and_remove_round_trip() {
    let app = test_app();
    let token = register(&app.router, "roundtrip@example.com").await;

    for _ in 0..2 {
        let (status, body) =
            post_auth(&app.router, "/addtocart", &token, json!({ "itemId": 5 })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }
    let (_, cart) = post_auth(&app.router, "/getcartdata", &token, json!({})).await;
    assert_eq!(cart["5"], 2);

    let (status, _) =
        post_auth(&app.router, "/removefromcart", &token, json!({ "itemId": 5 })).await;
    assert_eq!(status, StatusCode::OK);
    let (_, cart) = post_auth(&app.router, "/getcartdata", &token, json!({})).await;
    assert_eq!(cart["5"], 1);
}

#[tokio::test]
async fn cart_remove_floors_at_zero() {
    let app = test_app();
    let token = register(&app.router, "floor@example.com").await;

    let (status, body) =
        post_auth(&app.router, "/removefromcart", &token, json!({ "itemId": 7 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, cart) = post_auth(&app.router, "/getcartdata", &token, json!({})).await;
    assert_eq!(cart["7"], 0);
}

#[tokio::test]
async fn cart_rejects_out_of_range_slot() {
    let app = test_app();
    let token = register(&app.router, "range@example.com").await;

    let (status, body) =
        post_auth(&app.router, "/addtocart", &token, json!({ "itemId": 300 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = test_app();

    let (status, body) = post(&app.router, "/addtocart", json!({ "itemId": 1 })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Please authenticate using a valid token");

    let (status, _) = post_auth(&app.router, "/getcartdata", "garbage", json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post(
        &app.router,
        "/place-order",
        json!({ "items": [], "amount": 0, "address": {} }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn product_ids_start_at_one_and_follow_max() {
    let app = test_app();
    add_product(&app.router, "First Shirt", "men").await;
    add_product(&app.router, "Second Shirt", "men").await;

    let (_, products) = get(&app.router, "/allproducts").await;
    assert_eq!(products[0]["id"], 1);
    assert_eq!(products[1]["id"], 2);

    // Deleting the highest id frees it for reuse.
    let (_, body) = post(&app.router, "/deleteproduct", json!({ "id": 2 })).await;
    assert_eq!(body["success"], true);
    add_product(&app.router, "Third Shirt", "men").await;

    let (_, products) = get(&app.router, "/allproducts").await;
    assert_eq!(products[1]["id"], 2);
    assert_eq!(products[1]["name"], "Third Shirt");
}

#[tokio::test]
async fn delete_product_succeeds_when_nothing_matches() {
    let app = test_app();
    let (status, body) = post(
        &app.router,
        "/deleteproduct",
        json!({ "id": 999, "name": "Ghost" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["name"], "Ghost");
}

#[tokio::test]
async fn new_collection_is_a_positional_slice() {
    let app = test_app();
    for i in 1..=10 {
        add_product(&app.router, &format!("Item {i}"), "women").await;
    }

    let (status, items) = get(&app.router, "/newcollection").await;
    assert_eq!(status, StatusCode::OK);

    // Skip the first product, then the last 8 of the remainder.
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 8);
    assert_eq!(items[0]["id"], 3);
    assert_eq!(items[7]["id"], 10);
}

#[tokio::test]
async fn popular_men_takes_first_four_in_category() {
    let app = test_app();
    add_product(&app.router, "W1", "women").await;
    for i in 1..=6 {
        add_product(&app.router, &format!("M{i}"), "men").await;
    }

    let (status, items) = get(&app.router, "/popularmen").await;
    assert_eq!(status, StatusCode::OK);

    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|p| p["category"] == "men"));
    assert_eq!(items[0]["name"], "M1");
    assert_eq!(items[3]["name"], "M4");
}

#[tokio::test]
async fn place_order_rejects_empty_items() {
    let app = test_app();
    let token = register(&app.router, "empty@example.com").await;

    let (status, body) = post_auth(
        &app.router,
        "/place-order",
        &token,
        json!({ "items": [], "amount": 0, "address": {} }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No items in the order.");

    let (_, body) = send(&app.router, "GET", "/allorders", None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn place_order_creates_session_and_order() {
    let app = test_app();
    let token = register(&app.router, "buyer@example.com").await;

    let (status, body) = post_auth(
        &app.router,
        "/place-order",
        &token,
        json!({
            "items": [
                { "name": "Shirt", "price": 25.50, "quantity": 2 },
                { "name": "Hat", "price": 10, "quantity": 1, "image": "http://x/hat.png" },
            ],
            "amount": 61,
            "address": { "city": "Springfield" },
            "cartData": { "5": 2 },
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["id"], "cs_test_mock");

    // The provider saw minor-unit prices and callback URLs carrying the
    // order id.
    let request = app.checkout.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.line_items.len(), 2);
    assert_eq!(request.line_items[0].unit_amount, 2550);
    assert_eq!(request.line_items[1].unit_amount, 1000);
    assert!(request.success_url.contains("success=true&orderId="));
    assert!(request.cancel_url.contains("success=false&orderId="));

    // The order is visible to its owner, pending and unpaid.
    let (_, body) = post_auth(&app.router, "/getorders", &token, json!({})).await;
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "Pending");
    assert_eq!(orders[0]["payment"], false);
    // Decimal amounts serialize as strings.
    assert_eq!(orders[0]["amount"], "61");

    // The supplied cartData replaced the stored cart.
    let (_, cart) = post_auth(&app.router, "/getcartdata", &token, json!({})).await;
    assert_eq!(cart["5"], 2);
}

#[tokio::test]
async fn place_order_reports_invalid_price_as_success_false() {
    let app = test_app();
    let token = register(&app.router, "badprice@example.com").await;

    let (status, body) = post_auth(
        &app.router,
        "/place-order",
        &token,
        json!({
            "items": [{ "name": "Mystery", "quantity": 1 }],
            "amount": 10,
            "address": {},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid price for item: Mystery");

    let (_, body) = send(&app.router, "GET", "/allorders", None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn orders_are_scoped_to_their_owner() {
    let app = test_app();
    let buyer = register(&app.router, "owner@example.com").await;
    let other = register(&app.router, "bystander@example.com").await;

    let order = json!({
        "items": [{ "name": "Shirt", "price": 20, "quantity": 1 }],
        "amount": 20,
        "address": {},
    });
    post_auth(&app.router, "/place-order", &buyer, order).await;

    let (_, body) = post_auth(&app.router, "/getorders", &buyer, json!({})).await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);

    let (_, body) = post_auth(&app.router, "/getorders", &other, json!({})).await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 0);

    let (_, body) = send(&app.router, "GET", "/allorders", None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

async fn place_one_order(app: &TestApp, token: &str) -> String {
    let order = json!({
        "items": [{ "name": "Shirt", "price": 20, "quantity": 1 }],
        "amount": 20,
        "address": {},
    });
    let (status, body) = post_auth(&app.router, "/place-order", token, order).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let request = app.checkout.last_request.lock().unwrap().clone().unwrap();
    let (_, order_id) = request.success_url.rsplit_once("orderId=").unwrap();
    order_id.to_owned()
}

#[tokio::test]
async fn verify_order_marks_payment_successful() {
    let app = test_app();
    let token = register(&app.router, "paid@example.com").await;
    let order_id = place_one_order(&app, &token).await;

    let (status, body) = post(
        &app.router,
        "/verify-order",
        json!({ "success": "true", "orderId": order_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Payment Successful");

    let (_, body) = post_auth(&app.router, "/getorders", &token, json!({})).await;
    assert_eq!(body["orders"][0]["payment"], true);
}

#[tokio::test]
async fn verify_order_failure_deletes_the_order() {
    let app = test_app();
    let token = register(&app.router, "unpaid@example.com").await;
    let order_id = place_one_order(&app, &token).await;

    let (status, body) = post(
        &app.router,
        "/verify-order",
        json!({ "success": "false", "orderId": order_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Payment Failed");

    let (_, body) = post_auth(&app.router, "/getorders", &token, json!({})).await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn verify_order_rejects_malformed_id() {
    let app = test_app();
    let (status, _) = post(
        &app.router,
        "/verify-order",
        json!({ "success": "true", "orderId": "not-a-uuid" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_status_changes_the_order() {
    let app = test_app();
    let token = register(&app.router, "status@example.com").await;
    let order_id = place_one_order(&app, &token).await;

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/orders/{order_id}"),
        None,
        Some(json!({ "status": "Shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Order status updated successfully");
    assert_eq!(body["order"]["status"], "Shipped");

    let (_, body) = post_auth(&app.router, "/getorders", &token, json!({})).await;
    assert_eq!(body["orders"][0]["status"], "Shipped");
}

#[tokio::test]
async fn update_status_unknown_order_is_404() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        "PUT",
        "/orders/00000000-0000-0000-0000-000000000000",
        None,
        Some(json!({ "status": "Shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Order not found");

    let (status, _) = send(
        &app.router,
        "PUT",
        "/orders/not-a-uuid",
        None,
        Some(json!({ "status": "Shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_stores_the_image_and_returns_its_url() {
    let app = test_app();

    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"product\"; filename=\"shirt.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         fake-png-bytes\r\n\
         --{boundary}--\r\n"
    );

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["success"], 1);
    let image_url = body["image_url"].as_str().unwrap();
    assert!(image_url.starts_with("http://localhost:4000/images/product_"));
    assert!(image_url.ends_with(".png"));

    // The file landed in the upload directory under the advertised name.
    let filename = image_url.rsplit('/').next().unwrap();
    let stored = std::fs::read(app.upload_dir.path().join(filename)).unwrap();
    assert_eq!(stored, b"fake-png-bytes");
}

#[tokio::test]
async fn malformed_json_body_is_400() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
