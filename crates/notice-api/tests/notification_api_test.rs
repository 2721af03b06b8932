//! 通知 REST API 集成测试
//!
//! 使用内存存储和静态目录构建完整路由，通过 oneshot 发送请求

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use notice_api::{AppState, routes};
use notice_service::{
    DeliveryError, DispatchSettings, Mailer, MemoryNotificationStore, NewNotification,
    NoticeError, NotificationDispatcher, NotificationRecord, NotificationStore, Recipient,
    StaticDirectory,
};
use notice_shared::config::AuthConfig;
use serde_json::{Value, json};
use tower::ServiceExt;

// ==================== 测试替身 ====================

/// 登录名为 "b" 的收件人投递失败，并记录发送尝试次数
#[derive(Default)]
struct FlakyMailer {
    attempts: AtomicUsize,
}

impl FlakyMailer {
    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for FlakyMailer {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn send(
        &self,
        recipient: &Recipient,
        _subject: &str,
        _body: &str,
    ) -> Result<String, DeliveryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if recipient.login == "b" {
            Err(DeliveryError::Transport("connection reset".to_string()))
        } else {
            Ok(format!("msg-{}", recipient.login))
        }
    }
}

/// 写入总是失败的存储
struct UnwritableStore;

#[async_trait]
impl NotificationStore for UnwritableStore {
    async fn save(&self, _n: &NewNotification) -> notice_service::Result<NotificationRecord> {
        Err(NoticeError::Internal("disk full".to_string()))
    }

    async fn find_all(&self) -> notice_service::Result<Vec<NotificationRecord>> {
        Ok(vec![])
    }

    async fn find_by_building(&self, _id: i64) -> notice_service::Result<Vec<NotificationRecord>> {
        Ok(vec![])
    }

    async fn find_by_id(&self, _id: i64) -> notice_service::Result<Option<NotificationRecord>> {
        Ok(None)
    }

    async fn delete(&self, _id: i64) -> notice_service::Result<bool> {
        Ok(false)
    }

    async fn health_check(&self) -> notice_service::Result<()> {
        Err(NoticeError::Internal("unavailable".to_string()))
    }
}

// ==================== 测试夹具 ====================

fn residents(logins: &[&str]) -> Vec<Recipient> {
    logins
        .iter()
        .map(|l| Recipient::new(*l, format!("{l}@example.com")))
        .collect()
}

fn build_app(store: Arc<dyn NotificationStore>) -> (Router, AppState) {
    build_app_with_mailer(store, Arc::new(FlakyMailer::default()))
}

fn build_app_with_mailer(
    store: Arc<dyn NotificationStore>,
    mailer: Arc<FlakyMailer>,
) -> (Router, AppState) {
    let directory = StaticDirectory::new()
        .with_building(1, residents(&["a", "b", "c"]))
        .with_building(2, vec![]);

    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::new(directory),
        mailer,
        store,
        DispatchSettings::default(),
    ));

    let state = AppState::new(dispatcher, &AuthConfig::default());
    (routes::app(state.clone()), state)
}

fn memory_app() -> (Router, AppState) {
    build_app(Arc::new(MemoryNotificationStore::new()))
}

fn counted_memory_app() -> (Router, AppState, Arc<FlakyMailer>) {
    let mailer = Arc::new(FlakyMailer::default());
    let (app, state) =
        build_app_with_mailer(Arc::new(MemoryNotificationStore::new()), Arc::clone(&mailer));
    (app, state, mailer)
}

fn token(state: &AppState, username: &str, roles: &[&str]) -> String {
    let roles = roles.iter().map(|r| r.to_string()).collect();
    state
        .jwt_manager
        .generate_token("1", username, roles)
        .unwrap()
        .0
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ==================== 创建 ====================

#[tokio::test]
async fn test_create_reports_successful_sends() {
    let (app, state) = memory_app();
    let token = token(&state, "manager", &["user"]);

    let response = send(
        &app,
        request(
            "POST",
            "/api/notifications",
            Some(&token),
            Some(json!({"buildingId": 1, "notice": "Water shut-off at 10:00"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Notice is successfully scheduled to 2 recipients"
    );

    let response = send(
        &app,
        request("GET", "/api/notifications/building/1", Some(&token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let records = body_json(response).await;
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["buildingId"], 1);
    assert_eq!(records[0]["notice"], "Water shut-off at 10:00");
    assert_eq!(records[0]["createdBy"], "manager");
    assert!(records[0]["createdDate"].is_string());
}

#[tokio::test]
async fn test_create_for_empty_building() {
    let (app, state) = memory_app();
    let token = token(&state, "manager", &["user"]);

    let response = send(
        &app,
        request(
            "POST",
            "/api/notifications",
            Some(&token),
            Some(json!({"buildingId": 2, "notice": "Lobby closed"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Notice is successfully scheduled to 0 recipients"
    );
}

#[tokio::test]
async fn test_create_requires_token() {
    let (app, _) = memory_app();

    let response = send(
        &app,
        request(
            "POST",
            "/api/notifications",
            None,
            Some(json!({"buildingId": 1, "notice": "hello"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_create_rejects_bad_token() {
    let (app, _) = memory_app();

    let response = send(
        &app,
        request(
            "POST",
            "/api/notifications",
            Some("not-a-jwt"),
            Some(json!({"buildingId": 1, "notice": "hello"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_rejects_blank_notice() {
    let (app, state, mailer) = counted_memory_app();
    let token = token(&state, "manager", &["admin"]);

    for notice in ["", "   "] {
        let response = send(
            &app,
            request(
                "POST",
                "/api/notifications",
                Some(&token),
                Some(json!({"buildingId": 1, "notice": notice})),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "notice {notice:?}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    // 没有发送邮件，也没有任何记录被写入
    assert_eq!(mailer.attempts(), 0);
    let response = send(&app, request("GET", "/api/notifications", Some(&token), None)).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_create_rejects_malformed_body() {
    let (app, state, mailer) = counted_memory_app();
    let token = token(&state, "manager", &["user"]);

    let bodies = [
        json!({"notice": "missing building"}),
        json!({"buildingId": "abc", "notice": "hello"}),
        json!({"buildingId": 0, "notice": "hello"}),
        json!({"buildingId": -5, "notice": "hello"}),
    ];

    for body in bodies {
        let response = send(
            &app,
            request("POST", "/api/notifications", Some(&token), Some(body.clone())),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
    }
    assert_eq!(mailer.attempts(), 0);
}

#[tokio::test]
async fn test_create_unknown_building() {
    let (app, state, mailer) = counted_memory_app();
    let token = token(&state, "manager", &["admin"]);

    let response = send(
        &app,
        request(
            "POST",
            "/api/notifications",
            Some(&token),
            Some(json!({"buildingId": 77, "notice": "hello"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "BUILDING_NOT_FOUND");

    assert_eq!(mailer.attempts(), 0);
    let response = send(&app, request("GET", "/api/notifications", Some(&token), None)).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_create_rejects_overlong_username_before_sending() {
    let (app, state, mailer) = counted_memory_app();
    let long_name = "x".repeat(101);
    let token = token(&state, &long_name, &["admin"]);

    let response = send(
        &app,
        request(
            "POST",
            "/api/notifications",
            Some(&token),
            Some(json!({"buildingId": 1, "notice": "hello"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(mailer.attempts(), 0);

    let response = send(&app, request("GET", "/api/notifications", Some(&token), None)).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_persistence_failure_is_generic_500() {
    let (app, state) = build_app(Arc::new(UnwritableStore));
    let token = token(&state, "manager", &["user"]);

    let response = send(
        &app,
        request(
            "POST",
            "/api/notifications",
            Some(&token),
            Some(json!({"buildingId": 1, "notice": "hello"})),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["code"], "PERSISTENCE_ERROR");
    assert!(!body["message"].as_str().unwrap().contains("disk full"));
}

// ==================== 查询 ====================

#[tokio::test]
async fn test_list_all_requires_admin() {
    let (app, state) = memory_app();
    let user = token(&state, "resident", &["user"]);
    let admin = token(&state, "root", &["admin"]);

    send(
        &app,
        request(
            "POST",
            "/api/notifications",
            Some(&user),
            Some(json!({"buildingId": 1, "notice": "hello"})),
        ),
    )
    .await;

    let response = send(&app, request("GET", "/api/notifications", Some(&user), None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");

    let response = send(&app, request("GET", "/api/notifications", Some(&admin), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_by_id_and_legacy_path() {
    let (app, state) = memory_app();
    let token = token(&state, "manager", &["user"]);

    send(
        &app,
        request(
            "POST",
            "/api/notifications",
            Some(&token),
            Some(json!({"buildingId": 1, "notice": "Elevator maintenance"})),
        ),
    )
    .await;

    for uri in ["/api/notifications/1", "/api/notifications/notification/1"] {
        let response = send(&app, request("GET", uri, Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let record = body_json(response).await;
        assert_eq!(record["id"], 1);
        assert_eq!(record["notice"], "Elevator maintenance");
    }
}

#[tokio::test]
async fn test_get_missing_is_empty_404() {
    let (app, state) = memory_app();
    let token = token(&state, "manager", &["user"]);

    for uri in ["/api/notifications/999", "/api/notifications/notification/999"] {
        let response = send(&app, request("GET", uri, Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert!(body_bytes(response).await.is_empty());
    }
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let (app, state) = memory_app();
    let token = token(&state, "manager", &["user"]);

    for (method, uri) in [
        ("GET", "/api/notifications/abc"),
        ("DELETE", "/api/notifications/abc"),
        ("GET", "/api/notifications/building/abc"),
    ] {
        let response = send(&app, request(method, uri, Some(&token), None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {uri}");

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["data"].is_null());
    }
}

#[tokio::test]
async fn test_list_by_unknown_building_is_empty() {
    let (app, state) = memory_app();
    let token = token(&state, "manager", &["user"]);

    let response = send(
        &app,
        request("GET", "/api/notifications/building/404", Some(&token), None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

// ==================== 删除 ====================

#[tokio::test]
async fn test_delete_then_missing() {
    let (app, state) = memory_app();
    let token = token(&state, "manager", &["user"]);

    send(
        &app,
        request(
            "POST",
            "/api/notifications",
            Some(&token),
            Some(json!({"buildingId": 1, "notice": "temporary"})),
        ),
    )
    .await;

    let response = send(&app, request("DELETE", "/api/notifications/1", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, request("DELETE", "/api/notifications/1", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOTIFICATION_NOT_FOUND");

    let response = send(&app, request("GET", "/api/notifications/1", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ==================== 探针 ====================

#[tokio::test]
async fn test_health_endpoints_are_public() {
    let (app, _) = memory_app();

    let response = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");

    let response = send(&app, request("GET", "/ready", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["checks"]["store"], "ok");
}

#[tokio::test]
async fn test_ready_reports_store_failure() {
    let (app, _) = build_app(Arc::new(UnwritableStore));

    let response = send(&app, request("GET", "/ready", None, None)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["status"], "degraded");
}
