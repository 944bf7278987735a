//! Initial schema.
//!
//! - `users`: accounts and their balance in minor units
//! - `items`: goods owned by exactly one user
//!
//! `users.username_key`, `items.name_key` and `items.description_key` hold
//! case-folded copies written by the engine; SQLite only folds ASCII.
//! - `trades`: proposed item-for-item exchanges between two users

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    UsernameKey,
    Email,
    PasswordHash,
    BalanceMinor,
    CreatedAt,
}

#[derive(Iden)]
enum Items {
    Table,
    Id,
    Name,
    Description,
    NameKey,
    DescriptionKey,
    PriceMinor,
    IsAvailable,
    OwnerId,
    CreatedAt,
}

#[derive(Iden)]
enum Trades {
    Table,
    Id,
    ProposerId,
    ProposerItemId,
    ResponderId,
    ResponderItemId,
    Status,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(ColumnDef::new(Users::UsernameKey).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(100_00),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-username_key-unique")
                    .table(Users::Table)
                    .col(Users::UsernameKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Items::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Items::Name).string().not_null())
                    .col(ColumnDef::new(Items::Description).string())
                    .col(ColumnDef::new(Items::NameKey).string().not_null())
                    .col(ColumnDef::new(Items::DescriptionKey).string())
                    .col(ColumnDef::new(Items::PriceMinor).big_integer())
                    .col(
                        ColumnDef::new(Items::IsAvailable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Items::OwnerId).string().not_null())
                    .col(
                        ColumnDef::new(Items::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-items-owner_id")
                            .from(Items::Table, Items::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-items-owner_id")
                    .table(Items::Table)
                    .col(Items::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-items-created_at-id")
                    .table(Items::Table)
                    .col(Items::CreatedAt)
                    .col(Items::Id)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Trades
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Trades::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trades::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Trades::ProposerId).string().not_null())
                    .col(ColumnDef::new(Trades::ProposerItemId).string().not_null())
                    .col(ColumnDef::new(Trades::ResponderId).string().not_null())
                    .col(ColumnDef::new(Trades::ResponderItemId).string().not_null())
                    .col(
                        ColumnDef::new(Trades::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Trades::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trades-proposer_id")
                            .from(Trades::Table, Trades::ProposerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trades-responder_id")
                            .from(Trades::Table, Trades::ResponderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trades-proposer_item_id")
                            .from(Trades::Table, Trades::ProposerItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trades-responder_item_id")
                            .from(Trades::Table, Trades::ResponderItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-trades-proposer_id")
                    .table(Trades::Table)
                    .col(Trades::ProposerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-trades-responder_id")
                    .table(Trades::Table)
                    .col(Trades::ResponderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Trades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
