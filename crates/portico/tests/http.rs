//! Integration tests for the HTTP gateway and API client against a local
//! axum backend.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use portico::prelude::*;
use portico::protocol::Credentials;
use portico::session::{Gateway, GatewayError};
use portico::HttpGateway;
use serde::Deserialize;
use serde_json::{json, Value};

// =========================================================================
// Fake backend
// =========================================================================

/// Authorization headers seen by the logout endpoint.
#[derive(Clone, Default)]
struct Seen {
    logouts: Arc<Mutex<Vec<String>>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    mobile_number: String,
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> (StatusCode, String) {
    let (status, body) = match (body.mobile_number.as_str(), body.password.as_str()) {
        ("+249900000002", "member123") => (
            StatusCode::OK,
            json!({ "token": "member-token", "user": { "name": "Member", "role": "USER" } }),
        ),
        ("+249900000001", "admin123") => (
            StatusCode::OK,
            json!({ "token": "admin-token", "actor": { "role": "ADMIN" } }),
        ),
        ("+249900000422", _) => (StatusCode::UNPROCESSABLE_ENTITY, json!({})),
        ("+249900000500", _) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": "database down" }),
        ),
        ("+249900000999", _) => {
            return (StatusCode::OK, "<html>maintenance</html>".to_string());
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            json!({ "message": "رقم الهاتف أو كلمة المرور غير صحيحة" }),
        ),
    };
    (status, body.to_string())
}

async fn logout(State(seen): State<Seen>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    seen.logouts.lock().unwrap().push(auth.clone());

    if auth == "Bearer member-token" {
        (StatusCode::OK, Json(json!({ "message": "bye" })))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "unknown token" })))
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer member-token")
}

async fn bulletins(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "sign in first" })));
    }
    (StatusCode::OK, Json(json!([{ "title": "General assembly" }])))
}

async fn archive(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    let category = query.get("category").cloned().unwrap_or_else(|| "all".into());
    (StatusCode::OK, Json(json!({ "category": category })))
}

async fn vote(
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (StatusCode::OK, Json(json!({ "voting": id, "option": body["option"] })))
}

async fn profile() -> (StatusCode, String) {
    (StatusCode::BAD_GATEWAY, String::new())
}

/// Starts the fake backend on a random port and returns its base URL.
async fn start_backend() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/content/bulletins", get(bulletins))
        .route("/api/content/archive", get(archive))
        .route("/api/content/voting/{id}/vote", post(vote))
        .route("/api/users/profile", get(profile))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/"), seen)
}

/// A base URL nothing listens on.
async fn dead_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn member_token() -> Token {
    Token::new("member-token").unwrap()
}

// =========================================================================
// HttpGateway::authenticate
// =========================================================================

#[tokio::test]
async fn test_authenticate_member_decodes_user_alias() {
    let (base, _) = start_backend().await;
    let gateway = HttpGateway::new(&base).unwrap();

    let response = gateway
        .authenticate(&Credentials::new("+249900000002", "member123"))
        .await
        .unwrap();

    assert_eq!(response.token.as_str(), "member-token");
    assert_eq!(response.actor.role, Role::User);
    assert_eq!(response.actor.name.as_deref(), Some("Member"));
}

#[tokio::test]
async fn test_authenticate_admin_reports_role() {
    let (base, _) = start_backend().await;
    let gateway = HttpGateway::new(&base).unwrap();

    let response = gateway
        .authenticate(&Credentials::new("+249900000001", "admin123"))
        .await
        .unwrap();

    assert_eq!(response.actor.role, Role::Admin);
}

#[tokio::test]
async fn test_authenticate_401_is_rejected_with_backend_message() {
    let (base, _) = start_backend().await;
    let gateway = HttpGateway::new(&base).unwrap();

    let err = gateway
        .authenticate(&Credentials::new("+249900000002", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GatewayError::Rejected("رقم الهاتف أو كلمة المرور غير صحيحة".into())
    );
}

#[tokio::test]
async fn test_authenticate_422_without_message_is_rejected_empty() {
    let (base, _) = start_backend().await;
    let gateway = HttpGateway::new(&base).unwrap();

    let err = gateway
        .authenticate(&Credentials::new("+249900000422", "x"))
        .await
        .unwrap_err();

    assert_eq!(err, GatewayError::Rejected(String::new()));
    let session_err: SessionError = err.into();
    assert_eq!(session_err.user_message(), "Invalid mobile number or password.");
}

#[tokio::test]
async fn test_authenticate_500_is_unreachable() {
    let (base, _) = start_backend().await;
    let gateway = HttpGateway::new(&base).unwrap();

    let err = gateway
        .authenticate(&Credentials::new("+249900000500", "x"))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Unreachable(ref m) if m.contains("database down")));
}

#[tokio::test]
async fn test_authenticate_non_json_body_is_unreachable() {
    let (base, _) = start_backend().await;
    let gateway = HttpGateway::new(&base).unwrap();

    let err = gateway
        .authenticate(&Credentials::new("+249900000999", "x"))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Unreachable(_)));
}

#[tokio::test]
async fn test_authenticate_connection_refused_is_unreachable() {
    let gateway = HttpGateway::new(&dead_backend().await).unwrap();

    let err = gateway
        .authenticate(&Credentials::new("+249900000002", "member123"))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Unreachable(_)));
}

// =========================================================================
// HttpGateway::invalidate
// =========================================================================

#[tokio::test]
async fn test_invalidate_sends_bearer_token() {
    let (base, seen) = start_backend().await;
    let gateway = HttpGateway::new(&base).unwrap();

    gateway.invalidate(&member_token()).await.unwrap();

    assert_eq!(
        *seen.logouts.lock().unwrap(),
        vec!["Bearer member-token".to_string()]
    );
}

#[tokio::test]
async fn test_invalidate_unknown_token_is_rejected() {
    let (base, _) = start_backend().await;
    let gateway = HttpGateway::new(&base).unwrap();

    let err = gateway
        .invalidate(&Token::new("stale").unwrap())
        .await
        .unwrap_err();

    assert_eq!(err, GatewayError::Rejected("unknown token".into()));
}

// =========================================================================
// ApiClient / DataSource
// =========================================================================

#[tokio::test]
async fn test_api_get_attaches_token_and_decodes() {
    let (base, _) = start_backend().await;
    let api = ApiClient::new(&base).unwrap();

    let items: Vec<Value> = api.get(&Endpoint::Bulletins, &member_token()).await.unwrap();

    assert_eq!(items[0]["title"], "General assembly");
}

#[tokio::test]
async fn test_api_get_bad_token_is_api_error() {
    let (base, _) = start_backend().await;
    let api = ApiClient::new(&base).unwrap();

    let err = api
        .get::<Value>(&Endpoint::Bulletins, &Token::new("stale").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PorticoError::Api { status: 401, ref message } if message == "sign in first"
    ));
}

#[tokio::test]
async fn test_api_archive_passes_category_query() {
    let (base, _) = start_backend().await;
    let api = ApiClient::new(&base).unwrap();

    let filtered: Value = api.archive(&member_token(), Some("قوانين")).await.unwrap();
    let all: Value = api.archive(&member_token(), None).await.unwrap();

    assert_eq!(filtered["category"], "قوانين");
    assert_eq!(all["category"], "all");
}

#[tokio::test]
async fn test_api_post_sends_json_body() {
    let (base, _) = start_backend().await;
    let api = ApiClient::new(&base).unwrap();

    let reply: Value = api
        .post(
            &Endpoint::Vote("v-7".into()),
            &member_token(),
            &json!({ "option": "yes" }),
        )
        .await
        .unwrap();

    assert_eq!(reply, json!({ "voting": "v-7", "option": "yes" }));
}

#[tokio::test]
async fn test_api_error_without_body_uses_default_message() {
    let (base, _) = start_backend().await;
    let api = ApiClient::new(&base).unwrap();

    let err = api
        .get::<Value>(&Endpoint::Profile, &member_token())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PorticoError::Api { status: 502, ref message } if !message.is_empty()
    ));
}

#[tokio::test]
async fn test_data_source_falls_back_only_in_development() {
    let (base, _) = start_backend().await;
    let api = ApiClient::new(&base).unwrap();
    let sample = || json!({ "name": "Sample member" });

    let dev = DataSource::new(api.clone(), Environment::Development);
    let profile = dev
        .fetch_or(&Endpoint::Profile, &member_token(), sample)
        .await
        .unwrap();
    assert_eq!(profile["name"], "Sample member");

    let prod = DataSource::new(api, Environment::Production);
    let result = prod
        .fetch_or(&Endpoint::Profile, &member_token(), sample)
        .await;
    assert!(matches!(result, Err(PorticoError::Api { status: 502, .. })));
}

#[tokio::test]
async fn test_data_source_success_ignores_fallback() {
    let (base, _) = start_backend().await;
    let dev = DataSource::new(ApiClient::new(&base).unwrap(), Environment::Development);

    let items: Vec<Value> = dev
        .fetch_or(&Endpoint::Bulletins, &member_token(), Vec::new)
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
}
