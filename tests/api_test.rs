//! End-to-end tests of the REST surface against an in-memory ledger.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::sync::Arc;

use poker_ledger::api;
use poker_ledger::app_state::AppState;
use poker_ledger::config::LedgerConfig;
use poker_ledger::persistence::{LedgerBackend, MemoryStore};
use poker_ledger::service::LedgerService;
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = LedgerConfig {
            persistence_enabled: false,
            dev_routes_enabled: true,
            ..LedgerConfig::default()
        };
        let ledger = Arc::new(LedgerService::new(LedgerBackend::Memory(MemoryStore::new())));
        let app = api::build_app(AppState::new(ledger), &config);

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("failed to bind test listener");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("listener has no local address");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base: format!("http://{addr}/api"),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let Ok(resp) = self
            .client
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
        else {
            panic!("POST {path} failed");
        };
        read(resp).await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let Ok(resp) = self.client.get(format!("{}{path}", self.base)).send().await else {
            panic!("GET {path} failed");
        };
        read(resp).await
    }

    async fn create_session(&self, created_by: &str) -> i64 {
        let (status, body) = self.post("/sessions", json!({ "createdBy": created_by })).await;
        assert_eq!(status, StatusCode::CREATED);
        let Some(id) = body["sessionId"].as_i64() else {
            panic!("missing sessionId in {body}");
        };
        id
    }

    async fn add_player(&self, session: i64, name: &str, buy_in: i64) -> i64 {
        let (status, body) = self
            .post(
                &format!("/sessions/{session}/players"),
                json!({ "name": name, "initialBuyIn": buy_in }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let Some(id) = body["playerId"].as_i64() else {
            panic!("missing playerId in {body}");
        };
        id
    }
}

async fn read(resp: reqwest::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let Ok(text) = resp.text().await else {
        panic!("failed to read body");
    };
    if text.is_empty() {
        return (status, Value::Null);
    }
    let Ok(body) = serde_json::from_str(&text) else {
        panic!("non-JSON body: {text}");
    };
    (status, body)
}

fn assert_error(body: &Value, code: i64, kind: &str) {
    assert_eq!(body["error"]["code"], code, "unexpected error body {body}");
    assert_eq!(body["error"]["kind"], kind, "unexpected error body {body}");
}

#[tokio::test]
async fn full_session_settles_to_zero() {
    let server = TestServer::spawn().await;
    let session = server.create_session("Dana").await;
    let alice = server.add_player(session, "Alice", 100).await;
    let bob = server.add_player(session, "Bob", 100).await;

    let (status, _) = server
        .post(
            &format!("/sessions/{session}/buy-in"),
            json!({ "playerId": alice, "amount": 50 }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = server
        .post(
            &format!("/sessions/{session}/credit"),
            json!({ "providerId": alice, "receiverId": bob, "amount": 30 }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = server
        .post(
            &format!("/sessions/{session}/cash-out"),
            json!({ "playerId": alice, "finalChipCount": 200 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payout"], 80);

    let (status, body) = server
        .post(
            &format!("/sessions/{session}/cash-out"),
            json!({ "playerId": bob, "finalChipCount": 50 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payout"], -80);

    let (status, body) = server.post(&format!("/sessions/{session}/end"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], false);

    let (status, detail) = server.get(&format!("/sessions/{session}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["isActive"], false);
    assert_eq!(detail["createdBy"], "Dana");
    let Some(players) = detail["players"].as_array() else {
        panic!("players should be an array: {detail}");
    };
    assert_eq!(players.len(), 2);
    assert_eq!(players[0]["name"], "Alice");
    assert_eq!(players[0]["totalBuyIns"], 150);
    assert_eq!(players[0]["totalCredits"], 30);
    assert_eq!(players[0]["creditsLog"][0]["receiverId"], bob);
    assert_eq!(players[1]["netBalance"], -130);
    assert_eq!(players[1]["totalBuyIns"], 130);
    assert_eq!(players[1]["payout"], -80);
    assert_eq!(players[1]["isActive"], false);
}

#[tokio::test]
async fn ending_with_active_players_conflicts() {
    let server = TestServer::spawn().await;
    let session = server.create_session("Eve").await;
    server.add_player(session, "Alice", 100).await;

    let (status, body) = server.post(&format!("/sessions/{session}/end"), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error(&body, 2102, "conflict");
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let server = TestServer::spawn().await;

    let (status, body) = server.get("/sessions/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, 2001, "not_found");

    let session = server.create_session("Frank").await;
    let alice = server.add_player(session, "Alice", 100).await;
    let (status, body) = server
        .post(
            &format!("/sessions/{session}/credit"),
            json!({ "providerId": alice, "receiverId": 4242, "amount": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, 2004, "not_found");

    let (status, body) = server.get("/sessions/999/players").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn invalid_bodies_are_rejected() {
    let server = TestServer::spawn().await;
    let session = server.create_session("Gina").await;

    let (status, body) = server
        .post(
            &format!("/sessions/{session}/players"),
            json!({ "name": "  ", "initialBuyIn": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, 1001, "validation");

    let (status, body) = server
        .post(
            &format!("/sessions/{session}/buy-in"),
            json!({ "playerId": 1, "amount": -5 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, 1001, "validation");

    let (status, body) = server
        .post(&format!("/sessions/{session}/cash-out"), json!({ "playerId": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, 1001, "validation");
}

#[tokio::test]
async fn cashed_out_player_cannot_rebuy() {
    let server = TestServer::spawn().await;
    let session = server.create_session("Hal").await;
    let alice = server.add_player(session, "Alice", 100).await;

    let (status, _) = server
        .post(
            &format!("/sessions/{session}/cash-out"),
            json!({ "playerId": alice, "finalChipCount": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .post(
            &format!("/sessions/{session}/buy-in"),
            json!({ "playerId": alice, "amount": 20 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error(&body, 2103, "conflict");
}

#[tokio::test]
async fn ended_session_rejects_new_players() {
    let server = TestServer::spawn().await;
    let session = server.create_session("Ivy").await;

    let (status, _) = server.post(&format!("/sessions/{session}/end"), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .post(
            &format!("/sessions/{session}/players"),
            json!({ "name": "Late", "initialBuyIn": 50 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error(&body, 2101, "conflict");
}

#[tokio::test]
async fn archive_moves_session_between_listings() {
    let server = TestServer::spawn().await;
    let kept = server.create_session("Jules").await;
    let archived = server.create_session("Jules Two").await;

    let (status, _) = server
        .post(&format!("/sessions/{archived}/archive"), json!({}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = server.get("/sessions?q=jules").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], kept);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 10);

    let (status, body) = server.get("/sessions/archived").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], archived);
}

#[tokio::test]
async fn listing_pages_newest_first() {
    let server = TestServer::spawn().await;
    for name in ["a", "b", "c"] {
        server.create_session(name).await;
    }

    let (status, body) = server.get("/sessions?page=2&pageSize=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["items"][0]["createdBy"], "a");
    let Some(items) = body["items"].as_array() else {
        panic!("items should be an array");
    };
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn create_session_accepts_empty_body() {
    let server = TestServer::spawn().await;
    let Ok(resp) = server
        .client
        .post(format!("{}/sessions", server.base))
        .send()
        .await
    else {
        panic!("POST /sessions failed");
    };
    let (status, body) = read(resp).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sessionId"], 1);
}

#[tokio::test]
async fn dev_reset_restarts_ids() {
    let server = TestServer::spawn().await;
    server.create_session("Kim").await;
    server.create_session("Lou").await;

    let Ok(resp) = server
        .client
        .delete(format!("{}/dev/reset", server.base))
        .send()
        .await
    else {
        panic!("DELETE /dev/reset failed");
    };
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert_eq!(server.create_session("Max").await, 1);
}

#[tokio::test]
async fn health_reports_backend() {
    let server = TestServer::spawn().await;
    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn ending_an_ended_session_again_succeeds() {
    let server = TestServer::spawn().await;
    let session = server.create_session("Nia").await;

    for _ in 0..2 {
        let (status, body) = server.post(&format!("/sessions/{session}/end"), json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isActive"], false);
    }
}

#[tokio::test]
async fn overflowing_buy_in_is_rejected_and_session_stays_readable() {
    let server = TestServer::spawn().await;
    let session = server.create_session("Oscar").await;
    let whale = server.add_player(session, "Whale", i64::MAX).await;

    let (status, body) = server
        .post(
            &format!("/sessions/{session}/buy-in"),
            json!({ "playerId": whale, "amount": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, 1002, "validation");

    let (status, detail) = server.get(&format!("/sessions/{session}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["players"][0]["totalBuyIns"], i64::MAX);
    assert_eq!(detail["players"][0]["netBalance"], -i64::MAX);
}

#[tokio::test]
async fn responses_are_not_cacheable() {
    let server = TestServer::spawn().await;
    let Ok(resp) = server
        .client
        .get(format!("{}/sessions", server.base))
        .send()
        .await
    else {
        panic!("GET /sessions failed");
    };
    let cache_control = resp
        .headers()
        .get(reqwest::header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok());
    assert_eq!(cache_control, Some("no-store"));
}
