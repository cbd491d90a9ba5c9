mod common;

use common::{razorpay_signature, TestApp};
use serde_json::{json, Value};
use std::sync::Arc;
use waitlist_service::services::MockEmailSender;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn signup_body(name: &str, payment_id: &str) -> Value {
    json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "shopifyStoreName": format!("{} Store", name),
        "websiteLink": "https://store.example.com",
        "productCategory": ["Clothes", "Jewelry"],
        "payment": {
            "provider": "razorpay",
            "orderId": "order_1",
            "paymentId": payment_id,
            "signature": razorpay_signature("order_1", payment_id),
        }
    })
}

async fn stub_captured_payment(app: &TestApp, payment_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/payments/{}", payment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": payment_id,
            "entity": "payment",
            "amount": 14900,
            "currency": "INR",
            "status": "captured",
            "order_id": "order_1"
        })))
        .mount(&app.razorpay_server)
        .await;
}

#[tokio::test]
async fn verified_signup_is_listed_exactly_once() {
    let app = TestApp::spawn().await;
    stub_captured_payment(&app, "pay_1").await;

    let response = app
        .client
        .post(format!("{}/waitlist", app.address))
        .json(&signup_body("Alice", "pay_1"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["waitlistEntry"]["name"], "Alice");
    assert_eq!(body["waitlistEntry"]["paymentStatus"], "COMPLETED");

    let listing: Vec<Value> = app
        .client
        .get(format!("{}/waitlist", app.address))
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .unwrap();

    let alices = listing
        .iter()
        .filter(|entry| entry["name"] == "Alice")
        .count();
    assert_eq!(alices, 1);
}

#[tokio::test]
async fn listing_is_idempotent_between_writes() {
    let app = TestApp::spawn().await;
    stub_captured_payment(&app, "pay_1").await;

    app.client
        .post(format!("{}/waitlist", app.address))
        .json(&signup_body("Alice", "pay_1"))
        .send()
        .await
        .expect("request failed");

    let first: Vec<Value> = app
        .client
        .get(format!("{}/waitlist", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Vec<Value> = app
        .client
        .get(format!("{}/waitlist", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn entries_are_listed_in_insertion_order() {
    let app = TestApp::spawn().await;
    stub_captured_payment(&app, "pay_1").await;
    stub_captured_payment(&app, "pay_2").await;

    for (name, payment_id) in [("Alice", "pay_1"), ("Bob", "pay_2")] {
        let response = app
            .client
            .post(format!("{}/waitlist", app.address))
            .json(&signup_body(name, payment_id))
            .send()
            .await
            .expect("request failed");
        assert_eq!(response.status(), 201);
    }

    let listing: Vec<Value> = app
        .client
        .get(format!("{}/waitlist", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let names: Vec<&str> = listing
        .iter()
        .map(|entry| entry["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[tokio::test]
async fn reusing_a_payment_is_rejected_with_conflict() {
    let app = TestApp::spawn().await;
    stub_captured_payment(&app, "pay_1").await;

    let first = app
        .client
        .post(format!("{}/waitlist", app.address))
        .json(&signup_body("Alice", "pay_1"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(first.status(), 201);

    // A retried submit with the same captured payment must not double-insert.
    let second = app
        .client
        .post(format!("{}/waitlist", app.address))
        .json(&signup_body("Alice", "pay_1"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(second.status(), 409);
    let error: Value = second.json().await.unwrap();
    assert_eq!(error["success"], false);

    let listing: Vec<Value> = app
        .client
        .get(format!("{}/waitlist", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing.len(), 1);
}

#[tokio::test]
async fn forged_payment_claim_creates_no_entry_and_no_email() {
    let app = TestApp::spawn().await;

    let mut body = signup_body("Mallory", "pay_1");
    body["payment"]["signature"] = json!("definitely-not-a-signature");

    let response = app
        .client
        .post(format!("{}/waitlist", app.address))
        .json(&body)
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), 400);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["success"], false);
    assert_eq!(error["error"], "Invalid payment signature");

    let listing: Vec<Value> = app
        .client
        .get(format!("{}/waitlist", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listing.is_empty());
    assert_eq!(app.mailer.send_count(), 0);
}

#[tokio::test]
async fn uncaptured_payment_is_rejected() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path("/payments/pay_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pay_1",
            "entity": "payment",
            "amount": 14900,
            "currency": "INR",
            "status": "authorized",
            "order_id": "order_1"
        })))
        .mount(&app.razorpay_server)
        .await;

    let response = app
        .client
        .post(format!("{}/waitlist", app.address))
        .json(&signup_body("Alice", "pay_1"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), 400);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "Payment not captured");
}

#[tokio::test]
async fn paypal_completed_order_is_accepted_as_payment() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path("/v2/checkout/orders/ord_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ord_1",
            "status": "COMPLETED",
            "links": []
        })))
        .mount(&app.paypal_server)
        .await;

    let response = app
        .client
        .post(format!("{}/waitlist", app.address))
        .json(&json!({
            "name": "Carol",
            "email": "carol@example.com",
            "shopifyStoreName": "Carol Store",
            "websiteLink": "https://carol.example.com",
            "productCategory": ["Sunglasses"],
            "payment": { "provider": "paypal", "orderId": "ord_1" }
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn welcome_email_is_sent_after_signup() {
    let app = TestApp::spawn().await;
    stub_captured_payment(&app, "pay_1").await;

    app.client
        .post(format!("{}/waitlist", app.address))
        .json(&signup_body("Alice", "pay_1"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(app.mailer.send_count(), 1);
}

#[tokio::test]
async fn email_failure_does_not_fail_the_signup() {
    let app = TestApp::spawn_with_mailer(Arc::new(MockEmailSender::failing())).await;
    stub_captured_payment(&app, "pay_1").await;

    let response = app
        .client
        .post(format!("{}/waitlist", app.address))
        .json(&signup_body("Alice", "pay_1"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), 201);

    let listing: Vec<Value> = app
        .client
        .get(format!("{}/waitlist", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing.len(), 1);
}

#[tokio::test]
async fn malformed_signup_is_rejected_before_payment_verification() {
    let app = TestApp::spawn().await;

    let mut body = signup_body("Alice", "pay_1");
    body["email"] = json!("not-an-email");

    let response = app
        .client
        .post(format!("{}/waitlist", app.address))
        .json(&body)
        .send()
        .await
        .expect("request failed");

    assert_eq!(response.status(), 422);
}
