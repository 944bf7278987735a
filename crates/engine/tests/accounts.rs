use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, EngineError, ItemSearch, MoneyCents, NewItemCmd, NewUserCmd, Page, ProposeTradeCmd,
    UpdateItemCmd, UpdateUserCmd, User,
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

#[tokio::test]
async fn registration_starts_with_default_balance() {
    let (engine, _db) = engine_with_db().await;

    let user = engine
        .create_user(NewUserCmd::new("  alice ", " Alice@Example.COM", "correct horse"))
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.balance, MoneyCents::STARTING_BALANCE);
    assert_eq!(engine.user(user.id).await.unwrap(), user);
}

#[tokio::test]
async fn registration_rejects_invalid_input_and_duplicates() {
    let (engine, _db) = engine_with_db().await;
    register(&engine, "alice").await;

    let cases = [
        NewUserCmd::new("", "x@example.com", "correct horse"),
        NewUserCmd::new("x", "not-an-email", "correct horse"),
        NewUserCmd::new("x", "x@example.com", "short"),
    ];
    for cmd in cases {
        let err = engine.create_user(cmd).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)), "{err:?}");
    }

    let err = engine
        .create_user(NewUserCmd::new("ALICE", "other@example.com", "correct horse"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine
        .create_user(NewUserCmd::new("other", "alice@example.com", "correct horse"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn authenticate_by_email_or_username() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let by_email = engine
        .authenticate("alice@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(by_email.id, alice.id);
    let by_name = engine.authenticate("Alice", "correct horse").await.unwrap();
    assert_eq!(by_name.id, alice.id);

    assert_eq!(
        engine.authenticate("alice", "wrong horse").await,
        Err(EngineError::Unauthorized)
    );
    assert_eq!(
        engine.authenticate("nobody", "correct horse").await,
        Err(EngineError::Unauthorized)
    );
}

#[tokio::test]
async fn update_user_is_self_only() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    let err = engine
        .update_user(UpdateUserCmd::new(alice.id, bob.id).username("mallory"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = engine
        .update_user(UpdateUserCmd::new(alice.id, alice.id).email("bob@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let updated = engine
        .update_user(
            UpdateUserCmd::new(alice.id, alice.id)
                .username("alicia")
                .password("battery staple"),
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "alicia");
    assert_eq!(updated.balance, MoneyCents::STARTING_BALANCE);
    assert!(engine.authenticate("alicia", "battery staple").await.is_ok());
    assert_eq!(
        engine.authenticate("alicia", "correct horse").await,
        Err(EngineError::Unauthorized)
    );

    // Keeping your own username is not a conflict.
    engine
        .update_user(UpdateUserCmd::new(alice.id, alice.id).username("Alicia"))
        .await
        .unwrap();
}

#[tokio::test]
async fn deleting_user_removes_items_and_trades() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let guitar = engine
        .create_item(NewItemCmd::new(alice.id, alice.id, "Guitar"))
        .await
        .unwrap();
    let camera = engine
        .create_item(NewItemCmd::new(bob.id, bob.id, "Camera"))
        .await
        .unwrap();
    let trade = engine
        .propose_trade(ProposeTradeCmd::new(alice.id, guitar.id, camera.id))
        .await
        .unwrap();

    let err = engine.delete_user(alice.id, bob.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine.delete_user(alice.id, alice.id).await.unwrap();

    assert!(matches!(
        engine.user(alice.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.item(guitar.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.trade(bob.id, trade.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert_eq!(engine.item(camera.id).await.unwrap().owner_id, bob.id);
}

#[tokio::test]
async fn item_lifecycle_is_owner_only() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    let err = engine
        .create_item(NewItemCmd::new(alice.id, bob.id, "Lamp"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    let err = engine
        .create_item(NewItemCmd::new(alice.id, alice.id, "Lamp").price(MoneyCents::new(-1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let lamp = engine
        .create_item(
            NewItemCmd::new(alice.id, alice.id, "Lamp")
                .description("brass")
                .price(MoneyCents::new(15_00)),
        )
        .await
        .unwrap();
    assert!(lamp.is_available);

    let err = engine
        .update_item(UpdateItemCmd::new(lamp.id, bob.id).name("Mine"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let updated = engine
        .update_item(
            UpdateItemCmd::new(lamp.id, alice.id)
                .name("Desk lamp")
                .description(None)
                .price(Some(MoneyCents::new(12_00))),
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Desk lamp");
    assert_eq!(updated.description, None);
    assert_eq!(updated.price, Some(MoneyCents::new(12_00)));
    assert_eq!(updated.owner_id, alice.id);

    let err = engine.delete_item(lamp.id, bob.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    let deleted = engine.delete_item(lamp.id, alice.id).await.unwrap();
    assert_eq!(deleted, updated);
    assert!(engine.items_by_owner(alice.id).await.unwrap().is_empty());
    assert!(matches!(
        engine.items_by_owner(Uuid::new_v4()).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn search_combines_filters() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;
    let mut listed = Vec::new();
    for (owner, name, description, price) in [
        (&alice, "Red bicycle", None, Some(50_00)),
        (&alice, "Kettle", Some("stainless, fits a bike bag"), Some(15_00)),
        (&bob, "Bike helmet", None, Some(25_00)),
        (&bob, "Old map", Some("100% original"), None),
    ] {
        let mut cmd = NewItemCmd::new(owner.id, owner.id, name);
        if let Some(description) = description {
            cmd = cmd.description(description);
        }
        if let Some(price) = price {
            cmd = cmd.price(MoneyCents::new(price));
        }
        listed.push(engine.create_item(cmd).await.unwrap());
    }
    let names = |items: Vec<engine::Item>| items.into_iter().map(|i| i.name).collect::<Vec<_>>();

    let found = engine
        .search_items(&ItemSearch::default().text("BIKE"), Page::default())
        .await
        .unwrap();
    assert_eq!(names(found), vec!["Kettle", "Bike helmet"]);

    let found = engine
        .search_items(
            &ItemSearch::default()
                .min_price(MoneyCents::new(15_00))
                .max_price(MoneyCents::new(25_00)),
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(names(found), vec!["Kettle", "Bike helmet"]);

    let found = engine
        .search_items(
            &ItemSearch::default().text("bi").owner(alice.id),
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(names(found), vec!["Red bicycle", "Kettle"]);

    // `%` is matched literally.
    let found = engine
        .search_items(&ItemSearch::default().text("0%"), Page::default())
        .await
        .unwrap();
    assert_eq!(names(found), vec!["Old map"]);

    let everything = engine
        .search_items(&ItemSearch::default(), Page::default())
        .await
        .unwrap();
    assert_eq!(everything, listed);

    let paged = engine
        .search_items(&ItemSearch::default(), Page::new(1, 2))
        .await
        .unwrap();
    assert_eq!(paged, listed[1..3].to_vec());

    let err = engine
        .search_items(
            &ItemSearch::default()
                .min_price(MoneyCents::new(30_00))
                .max_price(MoneyCents::new(10_00)),
            Page::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let chair = engine
        .create_item(NewItemCmd::new(alice.id, alice.id, "École chair").description("ÉTÉ sale"))
        .await
        .unwrap();

    for text in ["École", "école", "ÉCOLE CHAIR", "été"] {
        let found = engine
            .search_items(&ItemSearch::default().text(text), Page::default())
            .await
            .unwrap();
        assert_eq!(found, vec![chair.clone()], "searching {text:?}");
    }

    // Renaming refreshes what search sees.
    engine
        .update_item(
            UpdateItemCmd::new(chair.id, alice.id)
                .name("Ölkanne")
                .description(None),
        )
        .await
        .unwrap();
    let found = engine
        .search_items(&ItemSearch::default().text("école"), Page::default())
        .await
        .unwrap();
    assert!(found.is_empty());
    let found = engine
        .search_items(&ItemSearch::default().text("ÖLKANNE"), Page::default())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn non_ascii_usernames_log_in_and_stay_unique() {
    let (engine, _db) = engine_with_db().await;
    let elodie = engine
        .create_user(NewUserCmd::new("Élodie", "elodie@example.com", "correct horse"))
        .await
        .unwrap();

    for login in ["Élodie", "élodie", "ÉLODIE"] {
        let user = engine.authenticate(login, "correct horse").await.unwrap();
        assert_eq!(user.id, elodie.id, "login {login:?}");
    }

    let err = engine
        .create_user(NewUserCmd::new("élodie", "other@example.com", "correct horse"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)), "{err:?}");

    engine
        .update_user(UpdateUserCmd::new(elodie.id, elodie.id).username("Zoé"))
        .await
        .unwrap();
    let user = engine.authenticate("ZOÉ", "correct horse").await.unwrap();
    assert_eq!(user.username, "Zoé");
    assert_eq!(
        engine.authenticate("Élodie", "correct horse").await,
        Err(EngineError::Unauthorized)
    );
    register(&engine, "élodie").await;
}
