use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode};
use futures::StreamExt;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use moaplay_api::{AppState, build_app};
use moaplay_auth::JwtEncoder;
use moaplay_core::config::AppConfig;
use moaplay_core::types::{EventId, UserId};
use moaplay_database::MemoryNotificationStore;
use moaplay_entity::user::UserRole;

struct TestApp {
    app: Router,
    store: MemoryNotificationStore,
    encoder: JwtEncoder,
    host: UserId,
    fans: Vec<UserId>,
    event: EventId,
}

impl TestApp {
    fn new(fan_count: usize) -> Self {
        let config: AppConfig = serde_json::from_value(json!({
            "database": { "url": "postgres://unused@localhost/moaplay" },
            "auth": { "jwt_secret": "api-test-secret" }
        }))
        .unwrap();

        let store = MemoryNotificationStore::new();
        let host = store.add_user("host", UserRole::User);
        let event = store.add_event(host, "Lantern parade");
        let fans = (0..fan_count)
            .map(|i| {
                let id = store.add_user(&format!("fan{i}"), UserRole::User);
                store.add_schedule(id, event);
                id
            })
            .collect();

        let encoder = JwtEncoder::new(&config.auth);
        let state = AppState::new(config, Arc::new(store.clone()), CancellationToken::new());

        Self {
            app: build_app(state),
            store,
            encoder,
            host,
            fans,
            event,
        }
    }

    fn token(&self, user_id: UserId, nickname: &str) -> String {
        self.encoder
            .generate_access_token(user_id, UserRole::User, nickname)
            .unwrap()
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn send_as_host(&self, title: &str) -> Response<Body> {
        let token = self.token(self.host, "host");
        self.call(
            "POST",
            "/api/notifications",
            Some(&token),
            Some(json!({
                "event_id": self.event.to_string(),
                "title": title,
                "message": "Starts at the north gate",
                "type": "warning",
            })),
        )
        .await
    }
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn host_sends_notification_to_schedulers() {
    let t = TestApp::new(3);
    let response = t.send_as_host("Route change").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["recipients_count"], 3);
    assert_eq!(body["title"], "Route change");
    assert_eq!(body["type"], "warning");
    assert_eq!(body["sender"]["nickname"], "host");
    assert_eq!(body["event_id"], t.event.to_string());
    assert!(body.get("recipients").is_none());
    assert_eq!(t.store.recipient_count(), 3);
}

#[tokio::test]
async fn non_host_gets_permission_denied() {
    let t = TestApp::new(2);
    let token = t.token(t.fans[0], "fan0");
    let response = t
        .call(
            "POST",
            "/api/notifications",
            Some(&token),
            Some(json!({
                "event_id": t.event.to_string(),
                "title": "Hi",
                "message": "Hello",
                "type": "info",
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"], "PERMISSION_DENIED");
    assert_eq!(t.store.notification_count(), 0);
}

#[tokio::test]
async fn event_without_schedulers_is_rejected() {
    let t = TestApp::new(0);
    let response = t.send_as_host("Nobody").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "NO_RECIPIENTS");
}

#[tokio::test]
async fn invalid_body_is_a_validation_error() {
    let t = TestApp::new(1);
    let token = t.token(t.host, "host");
    let response = t
        .call(
            "POST",
            "/api/notifications",
            Some(&token),
            Some(json!({ "event_id": t.event.to_string(), "type": "info" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "message is required; title is required");
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let t = TestApp::new(1);
    let response = t.call("GET", "/api/notifications/my", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "UNAUTHORIZED");

    let response = t
        .call("GET", "/api/notifications/my", Some("not-a-jwt"), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn fan_lists_and_reads_notifications() {
    let t = TestApp::new(1);
    t.send_as_host("First").await;
    t.send_as_host("Second").await;
    let token = t.token(t.fans[0], "fan0");

    let listing = json_body(
        t.call("GET", "/api/notifications/my", Some(&token), None)
            .await,
    )
    .await;
    assert_eq!(listing["unread_count"], 2);
    assert_eq!(listing["pagination"]["total"], 2);
    assert_eq!(listing["notifications"][0]["notification"]["title"], "Second");

    let recipient_id = listing["notifications"][0]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/notifications/{recipient_id}/read");
    for _ in 0..2 {
        let response = t.call("PUT", &uri, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let unread = json_body(
        t.call(
            "GET",
            "/api/notifications/my?is_read=false",
            Some(&token),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(unread["unread_count"], 1);
    assert_eq!(unread["notifications"].as_array().unwrap().len(), 1);
    assert_eq!(unread["notifications"][0]["notification"]["title"], "First");
}

#[tokio::test]
async fn page_beyond_the_end_is_empty() {
    let t = TestApp::new(1);
    t.send_as_host("Only page").await;
    let token = t.token(t.fans[0], "fan0");

    let response = t
        .call(
            "GET",
            "/api/notifications/my?page=18446744073709551615&per_page=100",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["notifications"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["unread_count"], 1);
}

#[tokio::test]
async fn reading_someone_elses_notification_is_forbidden() {
    let t = TestApp::new(2);
    t.send_as_host("Only mine").await;
    let owner = t.token(t.fans[0], "fan0");
    let other = t.token(t.fans[1], "fan1");

    let listing = json_body(
        t.call("GET", "/api/notifications/my", Some(&owner), None)
            .await,
    )
    .await;
    let recipient_id = listing["notifications"][0]["id"].as_str().unwrap().to_string();

    let response = t
        .call(
            "PUT",
            &format!("/api/notifications/{recipient_id}/read"),
            Some(&other),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = t
        .call("PUT", "/api/notifications/oops/read", Some(&owner), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sender_deletes_notification() {
    let t = TestApp::new(2);
    let created = json_body(t.send_as_host("Cancelled").await).await;
    let uri = format!("/api/notifications/{}", created["id"].as_str().unwrap());

    let fan = t.token(t.fans[0], "fan0");
    let response = t.call("DELETE", &uri, Some(&fan), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let host = t.token(t.host, "host");
    let response = t.call("DELETE", &uri, Some(&host), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(t.store.notification_count(), 0);
    assert_eq!(t.store.recipient_count(), 0);

    let response = t.call("DELETE", &uri, Some(&host), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stream_delivers_notification_sent_before_connect() {
    let t = TestApp::new(1);
    t.send_as_host("Gates open").await;

    let token = t.token(t.fans[0], "fan0");
    let response = t
        .call("GET", "/api/notifications/stream", Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");
    assert_eq!(response.headers()["cache-control"], "no-cache");
    assert_eq!(response.headers()["x-accel-buffering"], "no");

    let mut body = response.into_body().into_data_stream();
    let mut frame = String::new();
    while !frame.contains("\n\n") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        frame.push_str(std::str::from_utf8(&chunk).unwrap());
    }

    let data = frame
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap();
    let payload: Value = serde_json::from_str(data).unwrap();
    assert_eq!(payload["title"], "Gates open");
    assert_eq!(payload["type"], "warning");
    assert_eq!(payload["sender"]["id"], t.host.to_string());
}

#[tokio::test]
async fn health_reports_live_counters() {
    let t = TestApp::new(2);
    t.send_as_host("Counted").await;

    let response = t.call("GET", "/api/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["status"], "ok");

    let body = json_body(t.call("GET", "/api/health/detailed", None, None).await).await;
    assert_eq!(body["data"]["database"], "connected");
    assert_eq!(body["data"]["live"]["queues"], 2);
    assert_eq!(body["data"]["live"]["pending"], 2);
    assert_eq!(body["data"]["live"]["open_streams"], 0);
}

#[tokio::test]
async fn cors_headers_are_applied_to_api_routes() {
    let t = TestApp::new(0);
    let request = Request::builder()
        .method("GET")
        .uri("/api/health")
        .header("origin", "https://festival.example")
        .body(Body::empty())
        .unwrap();

    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
