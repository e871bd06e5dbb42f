//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full
//! axum router over a fresh in-memory database and a recording mock
//! transport, so tests can drive the webhook path end to end without a chat
//! platform.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use quotebot_server::api::{create_router, AppState};
use quotebot_server::config::Config;
use quotebot_server::db::{self, Bot};
use quotebot_server::transport::{ChatTransport, TransportError};
use quotebot_server::webhook::signing;

/// A message recorded by the mock transport.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub token: String,
    pub room_id: String,
    pub text: String,
}

/// In-memory chat transport: canned message texts and recorded sends.
#[derive(Default)]
pub struct MockTransport {
    texts: Mutex<HashMap<String, String>>,
    sent: Mutex<Vec<SentMessage>>,
    fail_fetch: AtomicBool,
    fail_send: AtomicBool,
}

impl MockTransport {
    /// Register the text returned for a message id.
    pub fn set_message_text(&self, message_id: &str, text: &str) {
        self.texts
            .lock()
            .unwrap()
            .insert(message_id.to_string(), text.to_string());
    }

    /// Snapshot of every message sent so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Make every subsequent fetch fail.
    pub fn fail_fetch(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent send fail.
    pub fn fail_send(&self) {
        self.fail_send.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn fetch_message_text(
        &self,
        _token: &str,
        message_id: &str,
    ) -> Result<String, TransportError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(TransportError::Malformed("mock fetch failure".to_string()));
        }
        self.texts
            .lock()
            .unwrap()
            .get(message_id)
            .cloned()
            .ok_or_else(|| TransportError::Malformed(format!("no canned text for {message_id}")))
    }

    async fn send_message(
        &self,
        token: &str,
        room_id: &str,
        text: &str,
    ) -> Result<(), TransportError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(TransportError::Malformed("mock send failure".to_string()));
        }
        self.sent.lock().unwrap().push(SentMessage {
            token: token.to_string(),
            room_id: room_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub state: AppState,
    pub transport: Arc<MockTransport>,
}

impl TestApp {
    /// Create a test app over a fresh in-memory database.
    pub async fn new() -> Self {
        let config = Config::default_for_test();
        let pool = db::create_pool(&config.database_url)
            .await
            .expect("Failed to create test pool");
        db::run_migrations(&pool).await.expect("Failed to migrate");

        let transport = Arc::new(MockTransport::default());
        let state = AppState::new(pool.clone(), config, transport.clone());
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            state,
            transport,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Register a tenant directly in the registry and return it.
    pub async fn create_bot(&self, id: &str, auth_required: bool) -> Bot {
        let bot = Bot {
            id: id.to_string(),
            access_token: format!("{id}-token"),
            signing_secret: format!("{id}-secret"),
            auth_required,
        };
        self.state
            .registry
            .register(&bot)
            .await
            .expect("Failed to register test bot");
        bot
    }

    /// Build a correctly signed webhook request for a message event.
    pub fn webhook_request(
        bot: &Bot,
        message_id: &str,
        room_id: &str,
        person_id: &str,
    ) -> Request<Body> {
        let body = serde_json::json!({
            "createdBy": bot.id,
            "data": { "id": message_id, "roomId": room_id, "personId": person_id }
        })
        .to_string();
        let signature = signing::sign_payload(&bot.signing_secret, body.as_bytes());
        Self::request(Method::POST, "/webhook")
            .header("Content-Type", "application/json")
            .header(signing::SIGNATURE_HEADER, signature)
            .body(Body::from(body))
            .unwrap()
    }

    /// Wait until the recorded sends satisfy `predicate`, or panic after two
    /// seconds. Delivery runs on spawned tasks, so tests poll instead of
    /// racing the outbox.
    pub async fn wait_for_sends<F>(&self, predicate: F) -> Vec<SentMessage>
    where
        F: Fn(&[SentMessage]) -> bool,
    {
        for _ in 0..200 {
            let sent = self.transport.sent();
            if predicate(&sent) {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "Timed out waiting for sends; recorded: {:?}",
            self.transport.sent()
        );
    }

    /// Give in-flight deliveries time to land, then return the snapshot.
    /// For asserting that nothing was sent.
    pub async fn settle(&self) -> Vec<SentMessage> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.transport.sent()
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}
