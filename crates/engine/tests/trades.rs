use sea_orm::{Database, DatabaseConnection};

use engine::{
    BuyCmd, Engine, EngineError, Item, MoneyCents, NewItemCmd, NewUserCmd, Page,
    ProposeTradeCmd, RespondTradeCmd, TradeAction, TradeStatus, User,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn register(engine: &Engine, name: &str) -> User {
    engine
        .create_user(NewUserCmd::new(
            name,
            format!("{name}@example.com"),
            "correct horse",
        ))
        .await
        .unwrap()
}

async fn list(engine: &Engine, owner: &User, name: &str) -> Item {
    engine
        .create_item(NewItemCmd::new(owner.id, owner.id, name).price(MoneyCents::new(10_00)))
        .await
        .unwrap()
}

struct Market {
    engine: Engine,
    _db: DatabaseConnection,
    alice: User,
    bob: User,
    guitar: Item,
    camera: Item,
}

/// Alice owns a guitar, Bob owns a camera.
async fn market() -> Market {
    let (engine, db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let guitar = list(&engine, &alice, "Guitar").await;
    let camera = list(&engine, &bob, "Camera").await;
    Market {
        engine,
        _db: db,
        alice,
        bob,
        guitar,
        camera,
    }
}

#[tokio::test]
async fn proposal_derives_responder_from_item_owner() {
    let m = market().await;

    let trade = m
        .engine
        .propose_trade(ProposeTradeCmd::new(m.alice.id, m.guitar.id, m.camera.id))
        .await
        .unwrap();

    assert_eq!(trade.proposer_id, m.alice.id);
    assert_eq!(trade.responder_id, m.bob.id);
    assert_eq!(trade.status, TradeStatus::Pending);
    assert_eq!(m.engine.trade(m.bob.id, trade.id).await.unwrap(), trade);
}

#[tokio::test]
async fn proposal_validation() {
    let m = market().await;
    let engine = &m.engine;

    let err = engine
        .propose_trade(ProposeTradeCmd::new(m.alice.id, m.guitar.id, m.guitar.id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .propose_trade(ProposeTradeCmd::new(m.alice.id, m.guitar.id, Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    // Offering someone else's item.
    let err = engine
        .propose_trade(ProposeTradeCmd::new(m.alice.id, m.camera.id, m.guitar.id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let drum = list(engine, &m.alice, "Drum").await;
    let err = engine
        .propose_trade(ProposeTradeCmd::new(m.alice.id, m.guitar.id, drum.id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn rejected_trade_cannot_be_answered_again() {
    let m = market().await;
    let trade = m
        .engine
        .propose_trade(ProposeTradeCmd::new(m.alice.id, m.guitar.id, m.camera.id))
        .await
        .unwrap();

    let rejected = m
        .engine
        .respond_trade(RespondTradeCmd::new(m.bob.id, trade.id, TradeAction::Reject))
        .await
        .unwrap();
    assert_eq!(rejected.status, TradeStatus::Rejected);

    let err = m
        .engine
        .respond_trade(RespondTradeCmd::new(m.bob.id, trade.id, TradeAction::Accept))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let stored = m.engine.trade(m.alice.id, trade.id).await.unwrap();
    assert_eq!(stored.status, TradeStatus::Rejected);
    assert_eq!(m.engine.item(m.guitar.id).await.unwrap().owner_id, m.alice.id);
}

#[tokio::test]
async fn only_the_responder_may_answer() {
    let m = market().await;
    let trade = m
        .engine
        .propose_trade(ProposeTradeCmd::new(m.alice.id, m.guitar.id, m.camera.id))
        .await
        .unwrap();

    let err = m
        .engine
        .respond_trade(RespondTradeCmd::new(
            m.alice.id,
            trade.id,
            TradeAction::Accept,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = m
        .engine
        .respond_trade(RespondTradeCmd::new(
            m.bob.id,
            Uuid::new_v4(),
            TradeAction::Accept,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn accepting_swaps_item_owners() {
    let m = market().await;
    let trade = m
        .engine
        .propose_trade(ProposeTradeCmd::new(m.alice.id, m.guitar.id, m.camera.id))
        .await
        .unwrap();

    let accepted = m
        .engine
        .respond_trade(RespondTradeCmd::new(m.bob.id, trade.id, TradeAction::Accept))
        .await
        .unwrap();

    assert_eq!(accepted.status, TradeStatus::Accepted);
    let guitar = m.engine.item(m.guitar.id).await.unwrap();
    let camera = m.engine.item(m.camera.id).await.unwrap();
    assert_eq!(guitar.owner_id, m.bob.id);
    assert_eq!(camera.owner_id, m.alice.id);
    assert!(guitar.is_available);
    assert!(camera.is_available);
    assert_eq!(
        m.engine.user(m.alice.id).await.unwrap().balance,
        MoneyCents::STARTING_BALANCE
    );
}

#[tokio::test]
async fn stale_accept_fails_without_changes() {
    let m = market().await;
    let carol = register(&m.engine, "carol").await;
    let trade = m
        .engine
        .propose_trade(ProposeTradeCmd::new(m.alice.id, m.guitar.id, m.camera.id))
        .await
        .unwrap();

    // Carol buys the guitar before Bob answers.
    m.engine
        .buy(BuyCmd::new(carol.id, m.guitar.id))
        .await
        .unwrap();

    let err = m
        .engine
        .respond_trade(RespondTradeCmd::new(m.bob.id, trade.id, TradeAction::Accept))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let stored = m.engine.trade(m.bob.id, trade.id).await.unwrap();
    assert_eq!(stored.status, TradeStatus::Pending);
    assert_eq!(m.engine.item(m.camera.id).await.unwrap().owner_id, m.bob.id);
    assert_eq!(m.engine.item(m.guitar.id).await.unwrap().owner_id, carol.id);
}

#[tokio::test]
async fn proposer_can_cancel_while_pending() {
    let m = market().await;
    let trade = m
        .engine
        .propose_trade(ProposeTradeCmd::new(m.alice.id, m.guitar.id, m.camera.id))
        .await
        .unwrap();

    let err = m.engine.cancel_trade(m.bob.id, trade.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let cancelled = m.engine.cancel_trade(m.alice.id, trade.id).await.unwrap();
    assert_eq!(cancelled.status, TradeStatus::Cancelled);

    let err = m.engine.cancel_trade(m.alice.id, trade.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
    let err = m
        .engine
        .respond_trade(RespondTradeCmd::new(m.bob.id, trade.id, TradeAction::Accept))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn trades_are_visible_to_parties_only() {
    let m = market().await;
    let carol = register(&m.engine, "carol").await;
    let trade = m
        .engine
        .propose_trade(ProposeTradeCmd::new(m.alice.id, m.guitar.id, m.camera.id))
        .await
        .unwrap();

    let err = m.engine.trade(carol.id, trade.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let for_bob = m
        .engine
        .trades_for_user(m.bob.id, Page::default())
        .await
        .unwrap();
    assert_eq!(for_bob, vec![trade.clone()]);
    let for_carol = m
        .engine
        .trades_for_user(carol.id, Page::default())
        .await
        .unwrap();
    assert!(for_carol.is_empty());
}

#[tokio::test]
async fn trade_listing_is_paged_in_creation_order() {
    let m = market().await;
    let mut proposed = Vec::new();
    for name in ["Drum", "Flute", "Harp"] {
        let offered = list(&m.engine, &m.alice, name).await;
        let trade = m
            .engine
            .propose_trade(ProposeTradeCmd::new(m.alice.id, offered.id, m.camera.id))
            .await
            .unwrap();
        proposed.push(trade);
    }

    let page = m
        .engine
        .trades_for_user(m.alice.id, Page::new(1, 2))
        .await
        .unwrap();
    let ids: Vec<_> = page.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![proposed[1].id, proposed[2].id]);
}
