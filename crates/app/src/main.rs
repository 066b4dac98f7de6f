use chrono::Utc;
use clap::Parser;
use engine::{
    ContributionCmd, Engine, EngineError, NewCategoryCmd, NewDebtCmd, NewSavingGoalCmd,
    PayDebtCmd, TransactionInput, TransferCmd, UpdateCategoryCmd, UpdateDebtCmd,
};
use migration::{Migrator, MigratorTrait};
use sea_orm::ConnectOptions;
use serde::Serialize;

use cli::{
    CategoryCommand, Cli, Command, DebtCommand, GoalCommand, TxCommand, TxFields, UserCommand,
    WalletCommand,
};

mod cli;
mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let mut settings = settings::Settings::load(&cli.config)?;
    if let Some(url) = cli.database_url.clone() {
        settings.database.url = url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "cuan={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let db = connect_database(&settings.database).await?;
    let engine = Engine::builder().database(db).build().await?;

    match run(&engine, &cli.user, cli.command).await {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(Failure::Engine(err)) => {
            tracing::error!("{err}");
            std::process::exit(exit_code(&err));
        }
        Err(Failure::Output(err)) => Err(err.into()),
    }
}

async fn connect_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, BoxError> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);
    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    tracing::debug!(url = %config.url, "database ready");
    Ok(database)
}

#[derive(Debug)]
enum Failure {
    Engine(EngineError),
    Output(serde_json::Error),
}

impl From<EngineError> for Failure {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err)
    }
}

fn json<T: Serialize>(value: &T) -> Result<String, Failure> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Process exit status for an engine error.
///
/// 1 is left to clap and to startup failures.
fn exit_code(err: &EngineError) -> i32 {
    match err {
        EngineError::NotFound(_) => 3,
        EngineError::Unauthorized(_) => 4,
        EngineError::ExistingKey(_) | EngineError::Conflict(_) => 5,
        EngineError::InvalidAmount(_)
        | EngineError::AlreadyPaid(_)
        | EngineError::InvalidKind(_)
        | EngineError::InvalidName(_) => 6,
        EngineError::StorageFailure(_) => 10,
    }
}

fn tx_input(fields: TxFields) -> TransactionInput {
    let mut input = TransactionInput::new(
        fields.wallet,
        fields.category,
        fields.kind,
        fields.amount,
        fields.date.unwrap_or_else(Utc::now),
    );
    input.description = fields.description;
    input.attachment = fields.attachment;
    input
}

async fn run(engine: &Engine, user: &str, command: Command) -> Result<String, Failure> {
    match command {
        Command::User(cli::User {
            command: UserCommand::Create { username },
        }) => json(&engine.new_user(&username).await?),
        Command::Wallet(cli::Wallet { command }) => match command {
            WalletCommand::Create {
                name,
                kind,
                balance,
            } => json(&engine.new_wallet(user, &name, kind, balance).await?),
            WalletCommand::Update { id, name, kind } => {
                json(&engine.update_wallet(user, id, &name, kind).await?)
            }
            WalletCommand::Delete { id } => {
                engine.delete_wallet(user, id).await?;
                json(&serde_json::json!({ "deleted": id }))
            }
            WalletCommand::Show { id } => json(&engine.wallet(user, id).await?),
            WalletCommand::List => json(&engine.wallets(user).await?),
        },
        Command::Category(cli::Category { command }) => match command {
            CategoryCommand::Create { name, kind, budget } => {
                let mut cmd = NewCategoryCmd::new(name, kind);
                cmd.budget_limit_minor = budget;
                json(&engine.new_category(user, cmd).await?)
            }
            CategoryCommand::Update { id, name, budget } => {
                let mut cmd = UpdateCategoryCmd::new(name);
                cmd.budget_limit_minor = budget;
                json(&engine.update_category(user, id, cmd).await?)
            }
            CategoryCommand::Delete { id } => {
                engine.delete_category(user, id).await?;
                json(&serde_json::json!({ "deleted": id }))
            }
            CategoryCommand::Show { id } => json(&engine.category(user, id).await?),
            CategoryCommand::List { kind } => json(&engine.categories(user, kind).await?),
        },
        Command::Tx(cli::Tx { command }) => match command {
            TxCommand::Create(fields) => {
                json(&engine.create_transaction(user, tx_input(fields)).await?)
            }
            TxCommand::Update { id, fields } => json(
                &engine
                    .update_transaction(user, id, tx_input(fields))
                    .await?,
            ),
            TxCommand::Delete { id } => {
                engine.delete_transaction(user, id).await?;
                json(&serde_json::json!({ "deleted": id }))
            }
            TxCommand::Show { id } => json(&engine.transaction(user, id).await?),
        },
        Command::Transfer(args) => {
            let mut cmd = TransferCmd::new(
                args.from,
                args.to,
                args.amount,
                args.date.unwrap_or_else(Utc::now),
            );
            cmd.description = args.description;
            json(&engine.transfer(user, cmd).await?)
        }
        Command::Debt(cli::Debt { command }) => match command {
            DebtCommand::Create {
                wallet,
                name,
                kind,
                amount,
                description,
                due,
                date,
            } => {
                let mut cmd =
                    NewDebtCmd::new(wallet, name, kind, amount, date.unwrap_or_else(Utc::now));
                cmd.description = description;
                cmd.due_date = due;
                json(&engine.create_debt(user, cmd).await?)
            }
            DebtCommand::Pay {
                debt,
                wallet,
                amount,
                note,
                date,
            } => {
                let mut cmd = PayDebtCmd::new(wallet, amount, date.unwrap_or_else(Utc::now));
                cmd.note = note;
                json(&engine.pay_debt(user, debt, cmd).await?)
            }
            DebtCommand::Update {
                debt,
                wallet,
                name,
                amount,
                description,
                due,
            } => {
                let mut cmd = UpdateDebtCmd::new(wallet, name, amount);
                cmd.description = description;
                cmd.due_date = due;
                json(&engine.update_debt(user, debt, cmd).await?)
            }
            DebtCommand::Delete { debt } => {
                engine.delete_debt(user, debt).await?;
                json(&serde_json::json!({ "deleted": debt }))
            }
            DebtCommand::DeletePayment { payment } => {
                engine.delete_debt_payment(user, payment).await?;
                json(&serde_json::json!({ "deleted": payment }))
            }
            DebtCommand::Show { debt } => json(&engine.debt(user, debt).await?),
            DebtCommand::List { kind } => json(&engine.debts(user, kind).await?),
        },
        Command::Goal(cli::Goal { command }) => match command {
            GoalCommand::Create {
                name,
                target,
                category,
                deadline,
            } => {
                let mut cmd = NewSavingGoalCmd::new(name, target);
                cmd.category_id = category;
                cmd.deadline = deadline;
                json(&engine.new_saving_goal(user, cmd).await?)
            }
            GoalCommand::Contribute {
                goal,
                wallet,
                amount,
                date,
                description,
            } => {
                let mut cmd =
                    ContributionCmd::new(goal, wallet, amount, date.unwrap_or_else(Utc::now));
                cmd.description = description;
                json(&engine.add_contribution(user, cmd).await?)
            }
            GoalCommand::Show { goal } => json(&engine.saving_goal(user, goal).await?),
            GoalCommand::List => json(&engine.saving_goals(user).await?),
        },
    }
}
