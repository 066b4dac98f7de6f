//! Debts, debt payments, savings goals and savings contributions.
//!
//! Payments and contributions each own exactly one transaction, enforced by
//! a unique index on `transaction_id`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
}

#[derive(Iden)]
enum Wallets {
    Table,
    Id,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
}

#[derive(Iden)]
enum Debts {
    Table,
    Id,
    UserId,
    WalletId,
    TransactionId,
    Name,
    Description,
    AmountMinor,
    RemainingMinor,
    Kind,
    IsPaid,
    DueDate,
    CreatedAt,
}

#[derive(Iden)]
enum DebtPayments {
    Table,
    Id,
    DebtId,
    TransactionId,
    WalletId,
    AmountMinor,
    PaidAt,
    Note,
}

#[derive(Iden)]
enum SavingGoals {
    Table,
    Id,
    UserId,
    Name,
    TargetMinor,
    CurrentMinor,
    IsAchieved,
    CategoryId,
    Deadline,
}

#[derive(Iden)]
enum SavingContributions {
    Table,
    Id,
    GoalId,
    WalletId,
    TransactionId,
    AmountMinor,
    ContributedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Debts
        manager
            .create_table(
                Table::create()
                    .table(Debts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Debts::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Debts::UserId).string().not_null())
                    .col(ColumnDef::new(Debts::WalletId).blob().not_null())
                    .col(ColumnDef::new(Debts::TransactionId).blob().not_null())
                    .col(ColumnDef::new(Debts::Name).string().not_null())
                    .col(ColumnDef::new(Debts::Description).string())
                    .col(ColumnDef::new(Debts::AmountMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Debts::RemainingMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Debts::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Debts::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Debts::DueDate).timestamp())
                    .col(ColumnDef::new(Debts::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debts-user_id")
                            .from(Debts::Table, Debts::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debts-wallet_id")
                            .from(Debts::Table, Debts::WalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debts-transaction_id")
                            .from(Debts::Table, Debts::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-debts-user_id-kind")
                    .table(Debts::Table)
                    .col(Debts::UserId)
                    .col(Debts::Kind)
                    .to_owned(),
            )
            .await?;

        // 2. Debt payments
        manager
            .create_table(
                Table::create()
                    .table(DebtPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DebtPayments::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DebtPayments::DebtId).blob().not_null())
                    .col(
                        ColumnDef::new(DebtPayments::TransactionId)
                            .blob()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DebtPayments::WalletId).blob().not_null())
                    .col(
                        ColumnDef::new(DebtPayments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DebtPayments::PaidAt).timestamp().not_null())
                    .col(ColumnDef::new(DebtPayments::Note).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debt_payments-debt_id")
                            .from(DebtPayments::Table, DebtPayments::DebtId)
                            .to(Debts::Table, Debts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debt_payments-wallet_id")
                            .from(DebtPayments::Table, DebtPayments::WalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debt_payments-transaction_id")
                            .from(DebtPayments::Table, DebtPayments::TransactionId)
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-debt_payments-transaction_id-unique")
                    .table(DebtPayments::Table)
                    .col(DebtPayments::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-debt_payments-debt_id")
                    .table(DebtPayments::Table)
                    .col(DebtPayments::DebtId)
                    .to_owned(),
            )
            .await?;

        // 3. Saving goals
        manager
            .create_table(
                Table::create()
                    .table(SavingGoals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavingGoals::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SavingGoals::UserId).string().not_null())
                    .col(ColumnDef::new(SavingGoals::Name).string().not_null())
                    .col(
                        ColumnDef::new(SavingGoals::TargetMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingGoals::CurrentMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SavingGoals::IsAchieved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(SavingGoals::CategoryId).blob())
                    .col(ColumnDef::new(SavingGoals::Deadline).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-saving_goals-user_id")
                            .from(SavingGoals::Table, SavingGoals::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-saving_goals-category_id")
                            .from(SavingGoals::Table, SavingGoals::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 4. Saving contributions
        manager
            .create_table(
                Table::create()
                    .table(SavingContributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavingContributions::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SavingContributions::GoalId).blob().not_null())
                    .col(
                        ColumnDef::new(SavingContributions::WalletId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingContributions::TransactionId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingContributions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingContributions::ContributedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-saving_contributions-goal_id")
                            .from(SavingContributions::Table, SavingContributions::GoalId)
                            .to(SavingGoals::Table, SavingGoals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-saving_contributions-wallet_id")
                            .from(SavingContributions::Table, SavingContributions::WalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-saving_contributions-transaction_id")
                            .from(
                                SavingContributions::Table,
                                SavingContributions::TransactionId,
                            )
                            .to(Transactions::Table, Transactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-saving_contributions-transaction_id-unique")
                    .table(SavingContributions::Table)
                    .col(SavingContributions::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-saving_contributions-wallet_id")
                    .table(SavingContributions::Table)
                    .col(SavingContributions::WalletId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SavingContributions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SavingGoals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DebtPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Debts::Table).to_owned())
            .await?;
        Ok(())
    }
}
