use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{CategoryKind, DebtKind, TransactionKind, WalletKind};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "cuan")]
#[command(about = "Personal finance ledger: wallets, transfers, debts and savings goals")]
pub struct Cli {
    /// Settings file, without extension.
    #[arg(long, default_value = crate::settings::DEFAULT_SETTINGS_PATH)]
    pub config: String,

    /// Database connection string; overrides the settings file.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Acting user (username).
    #[arg(long, short, global = true, default_value = "")]
    pub user: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    User(User),
    Wallet(Wallet),
    Category(Category),
    Tx(Tx),
    Transfer(TransferArgs),
    Debt(Debt),
    Goal(Goal),
}

#[derive(Args, Debug)]
pub struct User {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Create {
        #[arg(long)]
        username: String,
    },
}

#[derive(Args, Debug)]
pub struct Wallet {
    #[command(subcommand)]
    pub command: WalletCommand,
}

#[derive(Subcommand, Debug)]
pub enum WalletCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_wallet_kind, default_value = "cash")]
        kind: WalletKind,
        /// Opening balance in minor units.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        balance: i64,
    },
    /// Rename a wallet or change its kind; the balance is left alone.
    Update {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_wallet_kind)]
        kind: WalletKind,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    Show {
        #[arg(long)]
        id: Uuid,
    },
    List,
}

#[derive(Args, Debug)]
pub struct Category {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_category_kind)]
        kind: CategoryKind,
        #[arg(long)]
        budget: Option<i64>,
    },
    /// Omitting `--budget` clears the budget.
    Update {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        budget: Option<i64>,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    Show {
        #[arg(long)]
        id: Uuid,
    },
    List {
        #[arg(long, value_parser = parse_category_kind)]
        kind: Option<CategoryKind>,
    },
}

#[derive(Args, Debug)]
pub struct Tx {
    #[command(subcommand)]
    pub command: TxCommand,
}

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    Create(TxFields),
    Update {
        #[arg(long)]
        id: Uuid,
        #[command(flatten)]
        fields: TxFields,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    Show {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args, Debug)]
pub struct TxFields {
    #[arg(long)]
    pub wallet: Uuid,
    #[arg(long)]
    pub category: Uuid,
    #[arg(long, value_parser = parse_transaction_kind)]
    pub kind: TransactionKind,
    #[arg(long)]
    pub amount: i64,
    /// RFC 3339 timestamp; defaults to now.
    #[arg(long)]
    pub date: Option<DateTime<Utc>>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub attachment: Option<String>,
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    #[arg(long)]
    pub from: Uuid,
    #[arg(long)]
    pub to: Uuid,
    #[arg(long)]
    pub amount: i64,
    #[arg(long)]
    pub date: Option<DateTime<Utc>>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct Debt {
    #[command(subcommand)]
    pub command: DebtCommand,
}

#[derive(Subcommand, Debug)]
pub enum DebtCommand {
    Create {
        #[arg(long)]
        wallet: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_debt_kind)]
        kind: DebtKind,
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<DateTime<Utc>>,
        #[arg(long)]
        date: Option<DateTime<Utc>>,
    },
    Pay {
        #[arg(long)]
        debt: Uuid,
        #[arg(long)]
        wallet: Uuid,
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        date: Option<DateTime<Utc>>,
    },
    Update {
        #[arg(long)]
        debt: Uuid,
        #[arg(long)]
        wallet: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<DateTime<Utc>>,
    },
    Delete {
        #[arg(long)]
        debt: Uuid,
    },
    DeletePayment {
        #[arg(long)]
        payment: Uuid,
    },
    Show {
        #[arg(long)]
        debt: Uuid,
    },
    List {
        #[arg(long, value_parser = parse_debt_kind)]
        kind: Option<DebtKind>,
    },
}

#[derive(Args, Debug)]
pub struct Goal {
    #[command(subcommand)]
    pub command: GoalCommand,
}

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        target: i64,
        #[arg(long)]
        category: Option<Uuid>,
        #[arg(long)]
        deadline: Option<DateTime<Utc>>,
    },
    Contribute {
        #[arg(long)]
        goal: Uuid,
        #[arg(long)]
        wallet: Uuid,
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        date: Option<DateTime<Utc>>,
        #[arg(long)]
        description: Option<String>,
    },
    Show {
        #[arg(long)]
        goal: Uuid,
    },
    List,
}

fn parse_wallet_kind(raw: &str) -> Result<WalletKind, String> {
    WalletKind::try_from(raw).map_err(|err| err.to_string())
}

fn parse_category_kind(raw: &str) -> Result<CategoryKind, String> {
    CategoryKind::try_from(raw).map_err(|err| err.to_string())
}

fn parse_transaction_kind(raw: &str) -> Result<TransactionKind, String> {
    TransactionKind::try_from(raw).map_err(|err| err.to_string())
}

fn parse_debt_kind(raw: &str) -> Result<DebtKind, String> {
    DebtKind::try_from(raw).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_transfer() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "cuan",
            "--user",
            "alice",
            "transfer",
            "--from",
            &from.to_string(),
            "--to",
            &to.to_string(),
            "--amount",
            "2500",
        ])
        .unwrap();
        assert_eq!(cli.user, "alice");
        match cli.command {
            Command::Transfer(args) => {
                assert_eq!(args.from, from);
                assert_eq!(args.to, to);
                assert_eq!(args.amount, 2500);
                assert!(args.date.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_kinds_with_storage_names() {
        let cli = Cli::try_parse_from([
            "cuan", "-u", "alice", "wallet", "create", "--name", "GoPay", "--kind", "e_wallet",
        ])
        .unwrap();
        match cli.command {
            Command::Wallet(Wallet {
                command: WalletCommand::Create { kind, balance, .. },
            }) => {
                assert_eq!(kind, WalletKind::EWallet);
                assert_eq!(balance, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn category_update_without_budget_clears_it() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "cuan",
            "category",
            "update",
            "--id",
            &id.to_string(),
            "--name",
            "Jajan",
        ])
        .unwrap();
        match cli.command {
            Command::Category(Category {
                command:
                    CategoryCommand::Update {
                        id: parsed,
                        name,
                        budget,
                    },
            }) => {
                assert_eq!(parsed, id);
                assert_eq!(name, "Jajan");
                assert!(budget.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_debt_kind() {
        let err = Cli::try_parse_from([
            "cuan",
            "debt",
            "list",
            "--kind",
            "loan",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_rfc3339_dates() {
        let cli = Cli::try_parse_from([
            "cuan",
            "goal",
            "contribute",
            "--goal",
            &Uuid::nil().to_string(),
            "--wallet",
            &Uuid::nil().to_string(),
            "--amount",
            "100",
            "--date",
            "2026-01-31T08:00:00Z",
        ])
        .unwrap();
        match cli.command {
            Command::Goal(Goal {
                command: GoalCommand::Contribute { date, .. },
            }) => {
                assert_eq!(date.unwrap().to_rfc3339(), "2026-01-31T08:00:00+00:00");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
