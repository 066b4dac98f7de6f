#![allow(dead_code)]

use std::path::Path;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Category, CategoryKind, Engine, NewCategoryCmd, Wallet, WalletKind};
use migration::MigratorTrait;

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";

/// In-memory engine with `alice` and `bob` registered.
pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // Every pooled connection would open its own in-memory database.
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    engine.new_user(ALICE).await.unwrap();
    engine.new_user(BOB).await.unwrap();
    (engine, db)
}

/// Engine over a SQLite file in `dir`, with a pool of `max_connections`.
pub async fn engine_on_file(dir: &Path, max_connections: u32) -> Engine {
    let url = format!("sqlite:{}?mode=rwc", dir.join("cuan.db").display());
    let mut options = ConnectOptions::new(url);
    options.max_connections(max_connections).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine.new_user(ALICE).await.unwrap();
    engine.new_user(BOB).await.unwrap();
    engine
}

pub async fn wallet(engine: &Engine, user: &str, name: &str, balance: i64) -> Wallet {
    engine
        .new_wallet(user, name, WalletKind::Bank, balance)
        .await
        .unwrap()
}

pub async fn category(engine: &Engine, user: &str, name: &str, kind: CategoryKind) -> Category {
    engine
        .new_category(user, NewCategoryCmd::new(name, kind))
        .await
        .unwrap()
}

pub async fn balance(engine: &Engine, user: &str, wallet: &Wallet) -> i64 {
    engine.wallet(user, wallet.id).await.unwrap().balance
}

pub async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

pub async fn exec(db: &DatabaseConnection, sql: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_string(backend, sql.to_string()))
        .await
        .unwrap();
}
