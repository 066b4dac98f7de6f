mod common;

use chrono::{Duration, Utc};
use engine::{CategoryKind, EngineError, TransactionInput, TransactionKind, TransferCmd};

use common::{ALICE, BOB, balance, category, count_rows, engine_with_db, exec, wallet};

#[tokio::test]
async fn income_and_expense_move_the_wallet_balance() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let salary = category(&engine, ALICE, "Gaji", CategoryKind::Income).await;
    let food = category(&engine, ALICE, "Makan", CategoryKind::Expense).await;

    let detail = engine
        .create_transaction(
            ALICE,
            TransactionInput::new(cash.id, salary.id, TransactionKind::Income, 500, Utc::now())
                .description("  January  "),
        )
        .await
        .unwrap();
    assert_eq!(detail.wallet.balance, 1500);
    assert_eq!(detail.category.id, salary.id);
    assert_eq!(detail.transaction.description.as_deref(), Some("January"));

    engine
        .create_transaction(
            ALICE,
            TransactionInput::new(cash.id, food.id, TransactionKind::Expense, 200, Utc::now()),
        )
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, 1300);
}

#[tokio::test]
async fn expense_may_overdraw() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 100).await;
    let food = category(&engine, ALICE, "Makan", CategoryKind::Expense).await;

    engine
        .create_transaction(
            ALICE,
            TransactionInput::new(cash.id, food.id, TransactionKind::Expense, 250, Utc::now()),
        )
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, -150);
}

#[tokio::test]
async fn create_then_delete_restores_balance() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let food = category(&engine, ALICE, "Makan", CategoryKind::Expense).await;

    let detail = engine
        .create_transaction(
            ALICE,
            TransactionInput::new(cash.id, food.id, TransactionKind::Expense, 300, Utc::now()),
        )
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, 700);

    engine
        .delete_transaction(ALICE, detail.transaction.id)
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, 1000);
    assert!(matches!(
        engine.transaction(ALICE, detail.transaction.id).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn create_rejects_transfer_kinds_and_bad_amounts() {
    let (engine, db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let food = category(&engine, ALICE, "Makan", CategoryKind::Expense).await;

    let err = engine
        .create_transaction(
            ALICE,
            TransactionInput::new(cash.id, food.id, TransactionKind::TransferIn, 10, Utc::now()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidKind(_)));

    let err = engine
        .create_transaction(
            ALICE,
            TransactionInput::new(cash.id, food.id, TransactionKind::Expense, 0, Utc::now()),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidAmount("amount_minor must be > 0".to_string())
    );

    assert_eq!(count_rows(&db, "transactions").await, 0);
    assert_eq!(balance(&engine, ALICE, &cash).await, 1000);
}

#[tokio::test]
async fn create_requires_owned_wallet_and_category() {
    let (engine, _db) = engine_with_db().await;
    let alice_cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let bob_cash = wallet(&engine, BOB, "Cash", 1000).await;
    let alice_food = category(&engine, ALICE, "Makan", CategoryKind::Expense).await;
    let bob_food = category(&engine, BOB, "Makan", CategoryKind::Expense).await;

    let err = engine
        .create_transaction(
            ALICE,
            TransactionInput::new(
                bob_cash.id,
                alice_food.id,
                TransactionKind::Expense,
                10,
                Utc::now(),
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine
        .create_transaction(
            ALICE,
            TransactionInput::new(
                alice_cash.id,
                bob_food.id,
                TransactionKind::Expense,
                10,
                Utc::now(),
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert_eq!(balance(&engine, BOB, &bob_cash).await, 1000);
}

#[tokio::test]
async fn saving_allocation_leaves_balance_untouched() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let savings = category(&engine, ALICE, "Dana Darurat", CategoryKind::Expense).await;

    let detail = engine
        .create_transaction(
            ALICE,
            TransactionInput::new(
                cash.id,
                savings.id,
                TransactionKind::SavingAllocation,
                400,
                Utc::now(),
            ),
        )
        .await
        .unwrap();
    assert_eq!(detail.wallet.balance, 1000);
}

#[tokio::test]
async fn update_moves_effect_between_wallets() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let bank = wallet(&engine, ALICE, "BCA", 1000).await;
    let food = category(&engine, ALICE, "Makan", CategoryKind::Expense).await;

    let created = engine
        .create_transaction(
            ALICE,
            TransactionInput::new(cash.id, food.id, TransactionKind::Expense, 100, Utc::now())
                .attachment("receipts/1.jpg"),
        )
        .await
        .unwrap();

    let later = Utc::now() + Duration::hours(1);
    let updated = engine
        .update_transaction(
            ALICE,
            created.transaction.id,
            TransactionInput::new(bank.id, food.id, TransactionKind::Expense, 250, later)
                .description("dinner"),
        )
        .await
        .unwrap();

    assert_eq!(balance(&engine, ALICE, &cash).await, 1000);
    assert_eq!(balance(&engine, ALICE, &bank).await, 750);
    assert_eq!(updated.transaction.wallet_id, bank.id);
    assert_eq!(updated.transaction.amount_minor, 250);
    assert_eq!(updated.transaction.description.as_deref(), Some("dinner"));
    assert_eq!(
        updated.transaction.attachment.as_deref(),
        Some("receipts/1.jpg")
    );
}

#[tokio::test]
async fn update_can_flip_income_to_expense() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let misc = category(&engine, ALICE, "Lain-lain", CategoryKind::Expense).await;

    let created = engine
        .create_transaction(
            ALICE,
            TransactionInput::new(cash.id, misc.id, TransactionKind::Income, 100, Utc::now()),
        )
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, 1100);

    engine
        .update_transaction(
            ALICE,
            created.transaction.id,
            TransactionInput::new(cash.id, misc.id, TransactionKind::Expense, 100, Utc::now()),
        )
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, 900);
}

#[tokio::test]
async fn update_cannot_turn_a_plain_transaction_into_a_transfer() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let food = category(&engine, ALICE, "Makan", CategoryKind::Expense).await;

    let created = engine
        .create_transaction(
            ALICE,
            TransactionInput::new(cash.id, food.id, TransactionKind::Expense, 100, Utc::now()),
        )
        .await
        .unwrap();

    let err = engine
        .update_transaction(
            ALICE,
            created.transaction.id,
            TransactionInput::new(cash.id, food.id, TransactionKind::TransferOut, 100, Utc::now()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidKind(_)));
    assert_eq!(balance(&engine, ALICE, &cash).await, 900);
}

#[tokio::test]
async fn transfer_half_keeps_its_kind() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let bank = wallet(&engine, ALICE, "BCA", 0).await;
    let pair = engine
        .transfer(ALICE, TransferCmd::new(cash.id, bank.id, 100, Utc::now()))
        .await
        .unwrap();

    let err = engine
        .update_transaction(
            ALICE,
            pair.outgoing.id,
            TransactionInput::new(
                cash.id,
                pair.outgoing.category_id,
                TransactionKind::Expense,
                100,
                Utc::now(),
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidKind(_)));
}

#[tokio::test]
async fn other_users_cannot_touch_a_transaction() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let food = category(&engine, ALICE, "Makan", CategoryKind::Expense).await;
    let created = engine
        .create_transaction(
            ALICE,
            TransactionInput::new(cash.id, food.id, TransactionKind::Expense, 100, Utc::now()),
        )
        .await
        .unwrap();

    assert!(matches!(
        engine.transaction(BOB, created.transaction.id).await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        engine.delete_transaction(BOB, created.transaction.id).await,
        Err(EngineError::NotFound(_))
    ));
    assert_eq!(balance(&engine, ALICE, &cash).await, 900);
}

#[tokio::test]
async fn wallet_write_failure_rolls_back_the_insert() {
    let (engine, db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let food = category(&engine, ALICE, "Makan", CategoryKind::Expense).await;

    exec(
        &db,
        "CREATE TRIGGER fail_wallet_update BEFORE UPDATE ON wallets \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .await;

    let err = engine
        .create_transaction(
            ALICE,
            TransactionInput::new(cash.id, food.id, TransactionKind::Expense, 300, Utc::now()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::StorageFailure(_)));
    assert_eq!(count_rows(&db, "transactions").await, 0);
    assert_eq!(balance(&engine, ALICE, &cash).await, 1000);

    exec(&db, "DROP TRIGGER fail_wallet_update;").await;
    engine
        .create_transaction(
            ALICE,
            TransactionInput::new(cash.id, food.id, TransactionKind::Expense, 300, Utc::now()),
        )
        .await
        .unwrap();
    assert_eq!(count_rows(&db, "transactions").await, 1);
    assert_eq!(balance(&engine, ALICE, &cash).await, 700);
}
