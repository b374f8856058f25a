//! PostgreSQL store tests. Each test gets a fresh database from
//! `#[sqlx::test]` with the crate migrations applied.
//!
//! Run with `DATABASE_URL=... cargo test --features postgres-tests`.

#![cfg(feature = "postgres-tests")]
#![allow(clippy::panic)]

use chrono::Utc;
use poker_ledger::domain::{BuyInEntry, CreditEntry, NewPlayer, Player, PlayerId, SessionId};
use poker_ledger::error::LedgerError;
use poker_ledger::persistence::{EndOutcome, LedgerStore, PostgresStore};
use sqlx::PgPool;

fn buy_in(amount: i64) -> BuyInEntry {
    BuyInEntry {
        amount,
        timestamp: Utc::now(),
    }
}

async fn open_session(store: &PostgresStore) -> SessionId {
    let Ok(session) = store.insert_session(Some("Dana".to_string()), Utc::now()).await else {
        panic!("session insert failed");
    };
    session.id
}

async fn seat(store: &PostgresStore, session_id: SessionId, name: &str, amount: i64) -> PlayerId {
    let Ok(Some(player)) = store
        .insert_player(NewPlayer {
            session_id,
            name: name.to_string(),
            initial_buy_in: buy_in(amount),
        })
        .await
    else {
        panic!("player insert failed");
    };
    player.id
}

async fn load(store: &PostgresStore, session_id: SessionId, player_id: PlayerId) -> Player {
    let Ok(Some(player)) = store.find_player(session_id, player_id).await else {
        panic!("player {player_id} missing");
    };
    player
}

#[sqlx::test(migrations = "./migrations")]
async fn credit_moves_balance_between_players(pool: PgPool) {
    let store = PostgresStore::new(pool);
    let session_id = open_session(&store).await;
    let alice = seat(&store, session_id, "Alice", 100).await;
    let bob = seat(&store, session_id, "Bob", 100).await;

    let applied = store
        .apply_credit(
            session_id,
            alice,
            CreditEntry {
                amount: 30,
                receiver_id: bob,
                timestamp: Utc::now(),
            },
        )
        .await;
    assert!(matches!(applied, Ok(true)));

    let provider = load(&store, session_id, alice).await;
    let receiver = load(&store, session_id, bob).await;
    assert_eq!(provider.net_balance, -70);
    assert_eq!(provider.total_credits, 30);
    assert_eq!(provider.credits_log.len(), 1);
    assert_eq!(receiver.net_balance, -130);
    assert_eq!(receiver.total_buy_ins, 130);
    assert_eq!(receiver.buy_ins_log.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn credit_to_cashed_out_receiver_rolls_back(pool: PgPool) {
    let store = PostgresStore::new(pool);
    let session_id = open_session(&store).await;
    let alice = seat(&store, session_id, "Alice", 100).await;
    let bob = seat(&store, session_id, "Bob", 100).await;
    let Ok(Some(_)) = store.apply_cash_out(session_id, bob, 100, Utc::now()).await else {
        panic!("cash-out failed");
    };

    // Alice has the lower id, so her row is written before Bob's guard fails.
    let applied = store
        .apply_credit(
            session_id,
            alice,
            CreditEntry {
                amount: 30,
                receiver_id: bob,
                timestamp: Utc::now(),
            },
        )
        .await;
    assert!(matches!(applied, Ok(false)));

    let provider = load(&store, session_id, alice).await;
    assert_eq!(provider.net_balance, -100);
    assert_eq!(provider.total_credits, 0);
    assert!(provider.credits_log.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn buy_in_total_overflow_maps_to_balance_overflow(pool: PgPool) {
    let store = PostgresStore::new(pool);
    let session_id = open_session(&store).await;
    let whale = seat(&store, session_id, "Whale", i64::MAX).await;

    let applied = store.apply_buy_in(session_id, whale, buy_in(1)).await;
    assert!(matches!(applied, Err(LedgerError::BalanceOverflow(_))));

    let stored = load(&store, session_id, whale).await;
    assert_eq!(stored.net_balance, -i64::MAX);
    assert_eq!(stored.total_buy_ins, i64::MAX);
}

#[sqlx::test(migrations = "./migrations")]
async fn session_guards_hold(pool: PgPool) {
    let store = PostgresStore::new(pool);
    let session_id = open_session(&store).await;
    let alice = seat(&store, session_id, "Alice", 100).await;

    assert!(matches!(
        store.end_session(session_id).await,
        Ok(EndOutcome::ActivePlayers(1))
    ));

    let Ok(Some(payout)) = store.apply_cash_out(session_id, alice, 250, Utc::now()).await else {
        panic!("cash-out failed");
    };
    assert_eq!(payout, 150);
    assert!(matches!(store.end_session(session_id).await, Ok(EndOutcome::Ended)));
    assert!(matches!(store.end_session(session_id).await, Ok(EndOutcome::Ended)));
    assert!(matches!(
        store.end_session(SessionId::new(9_999)).await,
        Ok(EndOutcome::NotFound)
    ));

    let late = store
        .insert_player(NewPlayer {
            session_id,
            name: "Late".to_string(),
            initial_buy_in: buy_in(10),
        })
        .await;
    assert!(matches!(late, Ok(None)));
}

#[sqlx::test(migrations = "./migrations")]
async fn reset_restarts_ids(pool: PgPool) {
    let store = PostgresStore::new(pool);
    open_session(&store).await;
    open_session(&store).await;

    let Ok(()) = store.reset().await else {
        panic!("reset failed");
    };
    assert_eq!(open_session(&store).await, SessionId::new(1));
}
