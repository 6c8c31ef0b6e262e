//! HTTP server for Gatepass.
//!
//! Exposes order issuance (`POST /order`), gate scanning (`POST /scan`) and
//! receipt verification (`POST /verify`) over the core services, with bearer
//! authentication on the first two.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{authorize, Credentials, IdentityProvider, StaticTokenProvider};
pub use config::{ServerConfig, StoreConfig};
pub use error::{ServerError, ServerResult};
pub use server::GatepassServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use gatepass_store::InMemoryRedemptionStore;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use super::*;

    struct Harness {
        app: Router,
        state: AppState,
    }

    fn harness() -> Harness {
        let mut config = ServerConfig::default();
        config.tokens.insert("tok-u1".into(), "u1".into());
        config.tokens.insert("tok-gate".into(), "gate".into());
        let state = AppState::new(&config, Arc::new(InMemoryRedemptionStore::new())).unwrap();
        Harness {
            app: router::build_router(state.clone(), &config),
            state,
        }
    }

    async fn call(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {token}"));
        }
        let response = app
            .clone()
            .oneshot(req.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn order_data() -> Value {
        json!([
            {"ticketGroupId": "g1", "itemType": "grandstand", "quantity": 1, "ownerId": "u1"},
            {"ticketGroupId": "g1", "itemType": "grandstand", "quantity": 2, "ownerId": "u2"}
        ])
    }

    #[tokio::test]
    async fn health_endpoint() {
        let h = harness();
        let response = h
            .app
            .oneshot(Request::builder().uri("/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn root_banner() {
        let h = harness();
        let response = h
            .app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn order_requires_token() {
        let h = harness();
        let body = json!({"userId": "u1", "data": order_data(), "pin": "1234"});
        let (status, json) = call(&h.app, "POST", "/order", None, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn order_rejects_token_for_other_user() {
        let h = harness();
        let body = json!({"userId": "u2", "data": order_data(), "pin": "1234"});
        let (status, _) = call(&h.app, "POST", "/order", Some("tok-u1"), body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_order_is_bad_request() {
        let h = harness();
        let body = json!({"userId": "u1", "data": [], "pin": "1234"});
        let (status, _) = call(&h.app, "POST", "/order", Some("tok-u1"), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn order_verify_and_scan_flow() {
        let h = harness();
        let mut outcomes = h.state.issuance.writer().subscribe();

        let body = json!({"userId": "u1", "data": order_data(), "pin": "1234"});
        let (status, receipt) = call(&h.app, "POST", "/order", Some("tok-u1"), body).await;
        assert_eq!(status, StatusCode::OK);
        assert!(receipt["publicKey"]
            .as_str()
            .unwrap()
            .starts_with("-----BEGIN PUBLIC KEY-----"));

        // Verification needs no token.
        let verify = json!({
            "originalData": order_data(),
            "publicKey": receipt["publicKey"],
            "digitalSignature": receipt["digitalSignature"],
        });
        let (status, json) = call(&h.app, "POST", "/verify", None, verify).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["isVerified"], true);

        let mut tampered_data = order_data();
        tampered_data[1]["quantity"] = json!(5);
        let tampered = json!({
            "originalData": tampered_data,
            "publicKey": receipt["publicKey"],
            "digitalSignature": receipt["digitalSignature"],
        });
        let (status, json) = call(&h.app, "POST", "/verify", None, tampered).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["isVerified"], false);

        // Records are written in the background; wait for both.
        for _ in 0..2 {
            assert!(outcomes.recv().await.unwrap().is_persisted());
        }

        let scan = |owner: &str, pin: &str| {
            json!({"userId": "gate", "ownerId": owner, "pin": pin, "ticketGroupId": "g1"})
        };
        let (status, json) = call(&h.app, "POST", "/scan", Some("tok-gate"), scan("u1", "1234")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["isValid"], true);

        let (_, json) = call(&h.app, "POST", "/scan", Some("tok-gate"), scan("u1", "9999")).await;
        assert_eq!(json["isValid"], false);

        let (_, json) = call(&h.app, "POST", "/scan", Some("tok-gate"), scan("u3", "1234")).await;
        assert_eq!(json["isValid"], false);
    }

    #[tokio::test]
    async fn scan_requires_token() {
        let h = harness();
        let body = json!({"userId": "gate", "ownerId": "u1", "pin": "1234", "ticketGroupId": "g1"});
        let (status, _) = call(&h.app, "POST", "/scan", None, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_verify_body_is_false() {
        let h = harness();
        let (status, json) = call(&h.app, "POST", "/verify", None, json!({"publicKey": 3})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["isVerified"], false);
    }

    #[tokio::test]
    async fn verify_with_garbage_key_is_false() {
        let h = harness();
        let body = json!({
            "originalData": order_data(),
            "publicKey": "not a key",
            "digitalSignature": "AAAA",
        });
        let (status, json) = call(&h.app, "POST", "/verify", None, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["isVerified"], false);
    }

    #[tokio::test]
    async fn order_with_unknown_item_field_is_rejected_before_signing() {
        let h = harness();
        let mut data = order_data();
        data[0]["price"] = json!(999);
        let body = json!({"userId": "u1", "data": data, "pin": "1234"});
        let (status, json) = call(&h.app, "POST", "/order", Some("tok-u1"), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
        assert_eq!(h.state.issuance.writer().in_flight(), 0);
    }

    #[tokio::test]
    async fn negative_quantity_is_bad_request_with_json_error() {
        let h = harness();
        let mut data = order_data();
        data[0]["quantity"] = json!(-1);
        let body = json!({"userId": "u1", "data": data, "pin": "1234"});
        let (status, json) = call(&h.app, "POST", "/order", Some("tok-u1"), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = json["error"].as_str().unwrap();
        assert!(!message.contains("u32"));
    }

    #[tokio::test]
    async fn order_without_pin_is_bad_request() {
        let h = harness();
        let body = json!({"userId": "u1", "data": order_data()});
        let (status, json) = call(&h.app, "POST", "/order", Some("tok-u1"), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn scan_with_empty_pin_is_bad_request() {
        let h = harness();
        let body = json!({"userId": "gate", "ownerId": "u1", "pin": "", "ticketGroupId": "g1"});
        let (status, _) = call(&h.app, "POST", "/scan", Some("tok-gate"), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_body_without_token_is_unauthorized() {
        let h = harness();
        let (status, json) = call(&h.app, "POST", "/scan", None, json!({"pin": 7})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Invalid token");

        let (status, _) = call(&h.app, "POST", "/order", None, json!([1, 2])).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
