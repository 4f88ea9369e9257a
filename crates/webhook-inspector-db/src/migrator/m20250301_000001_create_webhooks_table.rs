//! Migration to create the webhooks table

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Webhook::Table)
                    .if_not_exists()
                    .col(string(Webhook::Id).not_null().primary_key())
                    .col(string(Webhook::Method).not_null())
                    .col(string(Webhook::Pathname).not_null())
                    .col(string(Webhook::Ip).not_null())
                    .col(integer(Webhook::StatusCode).not_null().default(200))
                    .col(string_null(Webhook::ContentType))
                    .col(integer_null(Webhook::ContentLength))
                    .col(text_null(Webhook::QueryParams))
                    .col(text(Webhook::Headers).not_null())
                    .col(text_null(Webhook::Body))
                    .col(
                        timestamp_with_time_zone(Webhook::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing pages by primary key; this one serves time-range lookups
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_webhooks_created_at")
                    .table(Webhook::Table)
                    .col(Webhook::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Webhook::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Webhook {
    #[sea_orm(iden = "webhooks")]
    Table,
    Id,
    Method,
    Pathname,
    Ip,
    StatusCode,
    ContentType,
    ContentLength,
    QueryParams,
    Headers,
    Body,
    CreatedAt,
}
