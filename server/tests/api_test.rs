//! Integration tests for the management API and broadcast fan-out.

mod helpers;

use axum::body::Body;
use axum::http::Method;
use helpers::{body_to_json, TestApp};
use serde_json::json;

/// Health check responds ok.
#[tokio::test]
async fn health_check_responds_ok() {
    let app = TestApp::new().await;
    let response = app
        .oneshot(
            TestApp::request(Method::GET, "/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = body_to_json(response).await;
    assert_eq!(body["status"], "ok");
}

/// Provisioning returns the signing secret once and that secret verifies
/// real webhook traffic.
#[tokio::test]
async fn provisioned_bot_can_receive_webhooks() {
    let app = TestApp::new().await;

    let request = TestApp::request(Method::POST, "/api/bots")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({ "id": "newbot", "access_token": "newbot-token" }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await;
    assert_eq!(response.status(), 201);

    let body = body_to_json(response).await;
    assert_eq!(body["id"], "newbot");
    let secret = body["signing_secret"].as_str().unwrap().to_string();
    assert_eq!(secret.len(), 64);

    // Drive a webhook signed with the returned secret
    let bot = app.state.registry.get("newbot").await.unwrap();
    assert_eq!(bot.signing_secret, secret);
    app.transport.set_message_text("msg-1", "@newbot .help");
    let response = app
        .oneshot(TestApp::webhook_request(&bot, "msg-1", "room-1", "alice"))
        .await;
    assert_eq!(response.status(), 200);
    app.wait_for_sends(|s| s.len() == 1).await;
}

/// Provisioning the same id twice conflicts.
#[tokio::test]
async fn duplicate_provisioning_conflicts() {
    let app = TestApp::new().await;
    for expected in [201, 409] {
        let request = TestApp::request(Method::POST, "/api/bots")
            .header("Content-Type", "application/json")
            .body(Body::from(
                json!({ "id": "newbot", "access_token": "tok" }).to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await;
        assert_eq!(response.status(), expected);
    }
}

/// Provisioning validates its input.
#[tokio::test]
async fn provisioning_rejects_empty_id() {
    let app = TestApp::new().await;
    let request = TestApp::request(Method::POST, "/api/bots")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({ "id": "", "access_token": "tok" }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await;
    assert_eq!(response.status(), 400);
}

/// Direct quote add and fetch round-trip, including the search filter and
/// the not-found path.
#[tokio::test]
async fn quote_add_and_fetch_round_trip() {
    let app = TestApp::new().await;
    app.create_bot("zachbot", false).await;

    let request = TestApp::request(Method::POST, "/api/bots/zachbot/quotes")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({ "text": "Stay hungry, stay foolish" }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await;
    assert_eq!(response.status(), 201);
    let created = body_to_json(response).await;
    assert_eq!(created["text"], "Stay hungry, stay foolish");

    let response = app
        .oneshot(
            TestApp::request(Method::GET, "/api/bots/zachbot/quote?search=hungry")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = body_to_json(response).await;
    assert_eq!(body["text"], "Stay hungry, stay foolish");

    let response = app
        .oneshot(
            TestApp::request(Method::GET, "/api/bots/zachbot/quote?search=absent")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), 404);
}

/// Adding an effectively empty quote is rejected.
#[tokio::test]
async fn empty_quote_is_rejected() {
    let app = TestApp::new().await;
    app.create_bot("zachbot", false).await;

    let request = TestApp::request(Method::POST, "/api/bots/zachbot/quotes")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "text": "   " }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await;
    assert_eq!(response.status(), 400);
}

/// Management endpoints 404 for tenants that do not exist.
#[tokio::test]
async fn unknown_tenant_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .oneshot(
            TestApp::request(Method::GET, "/api/bots/ghost/quote")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), 404);
}

/// The authorize endpoint grants quote-add rights.
#[tokio::test]
async fn authorize_user_grants_add_rights() {
    let app = TestApp::new().await;
    let bot = app.create_bot("zachbot", true).await;

    let request = TestApp::request(Method::POST, "/api/bots/zachbot/users")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "user_id": "alice" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await;
    assert_eq!(response.status(), 204);

    assert!(app.state.users.is_authorized("alice", &bot.id).await.unwrap());
}

/// Ping establishes the room and queues one quote for it.
#[tokio::test]
async fn ping_establishes_room_and_sends() {
    let app = TestApp::new().await;
    let bot = app.create_bot("zachbot", false).await;
    app.state.quotes.add("Carpe diem", &bot.id).await.unwrap();

    let request = TestApp::request(Method::POST, "/api/bots/zachbot/ping")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "room_id": "room-1" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await;
    assert_eq!(response.status(), 202);

    let sent = app.wait_for_sends(|s| s.len() == 1).await;
    assert_eq!(sent[0].room_id, "room-1");
    assert_eq!(sent[0].text, "Carpe diem");

    let rooms = app
        .state
        .rooms
        .rooms_for_broadcast(&bot.id, true)
        .await
        .unwrap();
    assert_eq!(rooms.len(), 1);
}

/// Ping on a tenant with no quotes surfaces the not-found taxonomy.
#[tokio::test]
async fn ping_with_no_quotes_is_not_found() {
    let app = TestApp::new().await;
    app.create_bot("zachbot", false).await;

    let request = TestApp::request(Method::POST, "/api/bots/zachbot/ping")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "room_id": "room-1" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await;
    assert_eq!(response.status(), 404);
}

/// The broadcast endpoint fans out to every room regardless of the daily
/// flag.
#[tokio::test]
async fn broadcast_reaches_every_room() {
    let app = TestApp::new().await;
    let bot = app.create_bot("zachbot", false).await;
    app.state.quotes.add("Carpe diem", &bot.id).await.unwrap();
    app.state.rooms.ensure_room(&bot.id, "room-1").await.unwrap();
    app.state.rooms.ensure_room(&bot.id, "room-2").await.unwrap();
    app.state
        .rooms
        .toggle_daily(&bot.id, "room-2", Some(false))
        .await
        .unwrap();

    let request = TestApp::request(Method::POST, "/api/bots/zachbot/broadcast")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await;
    assert_eq!(response.status(), 202);
    let body = body_to_json(response).await;
    assert_eq!(body["enqueued"], 2);

    let sent = app.wait_for_sends(|s| s.len() == 2).await;
    let mut rooms: Vec<&str> = sent.iter().map(|m| m.room_id.as_str()).collect();
    rooms.sort_unstable();
    assert_eq!(rooms, ["room-1", "room-2"]);
}

/// The scheduled variant only reaches rooms that kept daily delivery on.
#[tokio::test]
async fn daily_broadcast_respects_opt_outs() {
    let app = TestApp::new().await;
    let bot = app.create_bot("zachbot", false).await;
    app.state.quotes.add("Carpe diem", &bot.id).await.unwrap();
    app.state.rooms.ensure_room(&bot.id, "room-on").await.unwrap();
    app.state.rooms.ensure_room(&bot.id, "room-off").await.unwrap();
    app.state
        .rooms
        .toggle_daily(&bot.id, "room-off", Some(false))
        .await
        .unwrap();

    let enqueued = app.state.broadcaster.broadcast(&bot, true).await;
    assert_eq!(enqueued, 1);

    let sent = app.wait_for_sends(|s| s.len() == 1).await;
    assert_eq!(sent[0].room_id, "room-on");
}

/// A tenant with no quotes broadcasts nothing and that is not a fault.
#[tokio::test]
async fn broadcast_without_quotes_is_a_no_op() {
    let app = TestApp::new().await;
    let bot = app.create_bot("zachbot", false).await;
    app.state.rooms.ensure_room(&bot.id, "room-1").await.unwrap();

    let enqueued = app.state.broadcaster.broadcast(&bot, true).await;
    assert_eq!(enqueued, 0);
    assert!(app.settle().await.is_empty());
}

/// A failing transport does not disturb the webhook path or later sends.
#[tokio::test]
async fn send_failures_are_contained() {
    let app = TestApp::new().await;
    let bot = app.create_bot("zachbot", false).await;
    app.state.quotes.add("Carpe diem", &bot.id).await.unwrap();
    app.transport.fail_send();
    app.transport.set_message_text("msg-1", "@zachbot");

    let response = app
        .oneshot(TestApp::webhook_request(&bot, "msg-1", "room-1", "alice"))
        .await;
    assert_eq!(response.status(), 200);
    assert!(app.settle().await.is_empty());
}
