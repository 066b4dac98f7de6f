mod common;

use chrono::Utc;
use engine::{
    CategoryKind, DEFAULT_PAYMENT_NOTE, DebtKind, DebtStatus, EngineError, NewDebtCmd,
    PayDebtCmd, TransactionInput, TransactionKind, UpdateDebtCmd,
};

use common::{ALICE, BOB, balance, count_rows, engine_with_db, wallet};

fn payable(wallet_id: uuid::Uuid, amount_minor: i64) -> NewDebtCmd {
    NewDebtCmd::new(wallet_id, "Budi", DebtKind::Payable, amount_minor, Utc::now())
        .description("beli motor")
}

#[tokio::test]
async fn payable_credits_the_wallet() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;

    let debt = engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();

    assert_eq!(balance(&engine, ALICE, &cash).await, 1500);
    assert_eq!(debt.remaining_minor, 500);
    assert!(!debt.is_paid);
    assert_eq!(debt.status(), DebtStatus::Open);

    let opening = engine.transaction(ALICE, debt.transaction_id).await.unwrap();
    assert_eq!(opening.transaction.kind, TransactionKind::Income);
    assert_eq!(
        opening.transaction.description.as_deref(),
        Some("Debt/Receivable: Budi - beli motor")
    );
    assert_eq!(opening.category.name, "Utang");
    assert_eq!(opening.category.kind, CategoryKind::Income);
    assert!(opening.category.is_system);
}

#[tokio::test]
async fn installments_settle_and_deleting_one_reopens() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let debt = engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();

    engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 200, Utc::now()))
        .await
        .unwrap();
    let partial = engine.debt(ALICE, debt.id).await.unwrap();
    assert_eq!(partial.remaining_minor, 300);
    assert_eq!(partial.status(), DebtStatus::PartiallyPaid);

    let last = engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 300, Utc::now()))
        .await
        .unwrap();
    let settled = engine.debt(ALICE, debt.id).await.unwrap();
    assert_eq!(settled.remaining_minor, 0);
    assert!(settled.is_paid);
    assert_eq!(settled.payments.len(), 2);
    assert_eq!(balance(&engine, ALICE, &cash).await, 1000);

    let err = engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 1, Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyPaid(_)));

    engine.delete_debt_payment(ALICE, last.id).await.unwrap();
    let reopened = engine.debt(ALICE, debt.id).await.unwrap();
    assert_eq!(reopened.remaining_minor, 300);
    assert!(!reopened.is_paid);
    assert_eq!(reopened.payments.len(), 1);
    assert_eq!(balance(&engine, ALICE, &cash).await, 1300);
    assert!(matches!(
        engine.transaction(ALICE, last.transaction_id).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn payment_from_another_wallet_is_undone_on_that_wallet() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let bank = wallet(&engine, ALICE, "BCA", 800).await;
    let debt = engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();

    let payment = engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(bank.id, 300, Utc::now()))
        .await
        .unwrap();
    assert_eq!(payment.wallet_id, bank.id);
    assert_eq!(balance(&engine, ALICE, &cash).await, 1500);
    assert_eq!(balance(&engine, ALICE, &bank).await, 500);
    let payment_tx = engine
        .transaction(ALICE, payment.transaction_id)
        .await
        .unwrap();
    assert_eq!(payment_tx.transaction.wallet_id, bank.id);

    engine.delete_debt_payment(ALICE, payment.id).await.unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, 1500);
    assert_eq!(balance(&engine, ALICE, &bank).await, 800);
    assert_eq!(engine.debt(ALICE, debt.id).await.unwrap().remaining_minor, 500);
}

#[tokio::test]
async fn overpayment_is_rejected_without_side_effects() {
    let (engine, db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let debt = engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();

    let err = engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 600, Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 0, Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    assert_eq!(engine.debt(ALICE, debt.id).await.unwrap().remaining_minor, 500);
    assert_eq!(count_rows(&db, "debt_payments").await, 0);
    assert_eq!(balance(&engine, ALICE, &cash).await, 1500);
}

#[tokio::test]
async fn payments_belong_to_the_debt_owner() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let debt = engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();
    let payment = engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 100, Utc::now()))
        .await
        .unwrap();

    let err = engine
        .delete_debt_payment(BOB, payment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));

    let err = engine
        .delete_debt_payment(ALICE, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine
        .pay_debt(BOB, debt.id, PayDebtCmd::new(cash.id, 100, Utc::now()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    assert_eq!(engine.debt(ALICE, debt.id).await.unwrap().remaining_minor, 400);
}

#[tokio::test]
async fn receivable_moves_money_the_other_way() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;

    let debt = engine
        .create_debt(
            ALICE,
            NewDebtCmd::new(cash.id, "Sari", DebtKind::Receivable, 400, Utc::now()),
        )
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, 600);

    let payment = engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 100, Utc::now()))
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, 700);

    let opening = engine.transaction(ALICE, debt.transaction_id).await.unwrap();
    assert_eq!(opening.transaction.kind, TransactionKind::Expense);
    assert_eq!(opening.category.name, "Piutang");

    let collection = engine
        .transaction(ALICE, payment.transaction_id)
        .await
        .unwrap();
    assert_eq!(collection.transaction.kind, TransactionKind::Income);
    assert_eq!(collection.category.name, "Terima Piutang");
}

#[tokio::test]
async fn payment_descriptions_and_default_note() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let debt = engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();

    let plain = engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 100, Utc::now()))
        .await
        .unwrap();
    assert_eq!(plain.note, DEFAULT_PAYMENT_NOTE);
    let plain_tx = engine
        .transaction(ALICE, plain.transaction_id)
        .await
        .unwrap();
    assert_eq!(
        plain_tx.transaction.description.as_deref(),
        Some("Payment for: Budi (beli motor)")
    );
    assert_eq!(plain_tx.transaction.kind, TransactionKind::Expense);
    assert_eq!(plain_tx.category.name, "Bayar Utang");

    let noted = engine
        .pay_debt(
            ALICE,
            debt.id,
            PayDebtCmd::new(cash.id, 100, Utc::now()).note("cicilan 2"),
        )
        .await
        .unwrap();
    assert_eq!(noted.note, "cicilan 2");
    let noted_tx = engine
        .transaction(ALICE, noted.transaction_id)
        .await
        .unwrap();
    assert_eq!(
        noted_tx.transaction.description.as_deref(),
        Some("Payment for: Budi - cicilan 2")
    );
}

#[tokio::test]
async fn update_moves_the_opening_effect() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let bank = wallet(&engine, ALICE, "BCA", 0).await;
    let debt = engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();
    engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 200, Utc::now()))
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, 1300);

    let err = engine
        .update_debt(ALICE, debt.id, UpdateDebtCmd::new(cash.id, "Budi", 100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let updated = engine
        .update_debt(
            ALICE,
            debt.id,
            UpdateDebtCmd::new(bank.id, "Budi S.", 400).description("motor bekas"),
        )
        .await
        .unwrap();
    assert_eq!(updated.remaining_minor, 200);
    assert_eq!(updated.wallet_id, bank.id);
    assert_eq!(balance(&engine, ALICE, &cash).await, 800);
    assert_eq!(balance(&engine, ALICE, &bank).await, 400);

    let opening = engine.transaction(ALICE, debt.transaction_id).await.unwrap();
    assert_eq!(opening.transaction.wallet_id, bank.id);
    assert_eq!(opening.transaction.amount_minor, 400);
    assert_eq!(
        opening.transaction.description.as_deref(),
        Some("Debt/Receivable: Budi S. - motor bekas")
    );
}

#[tokio::test]
async fn update_to_exactly_the_paid_amount_settles() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let debt = engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();
    engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 200, Utc::now()))
        .await
        .unwrap();

    let updated = engine
        .update_debt(ALICE, debt.id, UpdateDebtCmd::new(cash.id, "Budi", 200))
        .await
        .unwrap();
    assert_eq!(updated.remaining_minor, 0);
    assert!(updated.is_paid);
}

#[tokio::test]
async fn delete_reverts_only_the_outstanding_amount() {
    let (engine, db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let debt = engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();
    engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 200, Utc::now()))
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, 1300);

    engine.delete_debt(ALICE, debt.id).await.unwrap();

    assert_eq!(balance(&engine, ALICE, &cash).await, 1000);
    assert_eq!(count_rows(&db, "debts").await, 0);
    assert_eq!(count_rows(&db, "debt_payments").await, 0);
    assert_eq!(count_rows(&db, "transactions").await, 2);
    assert!(matches!(
        engine.debt(ALICE, debt.id).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn leftover_transactions_match_the_wallet_after_delete() {
    let (engine, db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let debt = engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();
    let payment = engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 200, Utc::now()))
        .await
        .unwrap();
    engine.delete_debt(ALICE, debt.id).await.unwrap();

    let opening = engine.transaction(ALICE, debt.transaction_id).await.unwrap();
    assert_eq!(opening.transaction.amount_minor, 200);

    engine
        .delete_transaction(ALICE, debt.transaction_id)
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, 800);
    engine
        .delete_transaction(ALICE, payment.transaction_id)
        .await
        .unwrap();
    assert_eq!(balance(&engine, ALICE, &cash).await, 1000);
    assert_eq!(count_rows(&db, "transactions").await, 0);
}

#[tokio::test]
async fn deleting_an_unpaid_debt_removes_its_opening_transaction() {
    let (engine, db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let debt = engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();

    engine.delete_debt(ALICE, debt.id).await.unwrap();

    assert_eq!(balance(&engine, ALICE, &cash).await, 1000);
    assert_eq!(count_rows(&db, "transactions").await, 0);
}

#[tokio::test]
async fn debt_transactions_cannot_be_edited_directly() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    let debt = engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();
    let payment = engine
        .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 100, Utc::now()))
        .await
        .unwrap();
    let opening = engine.transaction(ALICE, debt.transaction_id).await.unwrap();

    let err = engine
        .update_transaction(
            ALICE,
            debt.transaction_id,
            TransactionInput::new(
                cash.id,
                opening.category.id,
                TransactionKind::Income,
                900,
                Utc::now(),
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let err = engine
        .delete_transaction(ALICE, payment.transaction_id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    assert_eq!(balance(&engine, ALICE, &cash).await, 1400);
}

#[tokio::test]
async fn list_filters_by_kind_and_owner() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 1000).await;
    engine.create_debt(ALICE, payable(cash.id, 500)).await.unwrap();
    engine
        .create_debt(
            ALICE,
            NewDebtCmd::new(cash.id, "Sari", DebtKind::Receivable, 100, Utc::now()),
        )
        .await
        .unwrap();

    assert_eq!(engine.debts(ALICE, None).await.unwrap().len(), 2);
    let receivables = engine
        .debts(ALICE, Some(DebtKind::Receivable))
        .await
        .unwrap();
    assert_eq!(receivables.len(), 1);
    assert_eq!(receivables[0].name, "Sari");
    assert!(engine.debts(BOB, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn system_categories_are_created_once() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, ALICE, "Cash", 10_000).await;

    for _ in 0..3 {
        let debt = engine.create_debt(ALICE, payable(cash.id, 100)).await.unwrap();
        engine
            .pay_debt(ALICE, debt.id, PayDebtCmd::new(cash.id, 50, Utc::now()))
            .await
            .unwrap();
    }

    let income = engine
        .categories(ALICE, Some(CategoryKind::Income))
        .await
        .unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].name, "Utang");
    let expense = engine
        .categories(ALICE, Some(CategoryKind::Expense))
        .await
        .unwrap();
    assert_eq!(expense.len(), 1);
    assert_eq!(expense[0].name, "Bayar Utang");
}
