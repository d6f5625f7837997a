//! Posting schema: ledger, fiscal calendar, counters, documents and stock.
//!
//! Tables are derived from the entities so the same migration runs on
//! PostgreSQL and SQLite. Parents are created before the tables that
//! reference them.

use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entities::{
    accounts, adjustment_lines, cash_payments, cash_receipts, cash_transfers, cashboxes,
    document_sequences, fiscal_periods, fiscal_years, inventory_adjustments, inventory_movements,
    invoices, journal_entries, journal_lines, journal_sequences, warehouse_products,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        create_table(manager, &schema, accounts::Entity).await?;
        create_table(manager, &schema, fiscal_years::Entity).await?;
        create_table(manager, &schema, fiscal_periods::Entity).await?;
        create_table(manager, &schema, journal_entries::Entity).await?;
        create_table(manager, &schema, journal_lines::Entity).await?;
        create_table(manager, &schema, journal_sequences::Entity).await?;
        create_table(manager, &schema, document_sequences::Entity).await?;
        create_table(manager, &schema, cashboxes::Entity).await?;
        create_table(manager, &schema, invoices::Entity).await?;
        create_table(manager, &schema, warehouse_products::Entity).await?;
        create_table(manager, &schema, inventory_movements::Entity).await?;
        create_table(manager, &schema, cash_payments::Entity).await?;
        create_table(manager, &schema, cash_receipts::Entity).await?;
        create_table(manager, &schema, cash_transfers::Entity).await?;
        create_table(manager, &schema, inventory_adjustments::Entity).await?;
        create_table(manager, &schema, adjustment_lines::Entity).await?;

        // Balance lookups filter lines by account.
        manager
            .create_index(
                Index::create()
                    .name("idx_journal_lines_account")
                    .table(journal_lines::Entity)
                    .col(journal_lines::Column::AccountId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_journal_entries_source")
                    .table(journal_entries::Entity)
                    .col(journal_entries::Column::SourceId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_fiscal_periods_year")
                    .table(fiscal_periods::Entity)
                    .col(fiscal_periods::Column::FiscalYearId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_movements_source")
                    .table(inventory_movements::Entity)
                    .col(inventory_movements::Column::SourceNumber)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, adjustment_lines::Entity).await?;
        drop_table(manager, inventory_adjustments::Entity).await?;
        drop_table(manager, cash_transfers::Entity).await?;
        drop_table(manager, cash_receipts::Entity).await?;
        drop_table(manager, cash_payments::Entity).await?;
        drop_table(manager, inventory_movements::Entity).await?;
        drop_table(manager, warehouse_products::Entity).await?;
        drop_table(manager, invoices::Entity).await?;
        drop_table(manager, cashboxes::Entity).await?;
        drop_table(manager, document_sequences::Entity).await?;
        drop_table(manager, journal_sequences::Entity).await?;
        drop_table(manager, journal_lines::Entity).await?;
        drop_table(manager, journal_entries::Entity).await?;
        drop_table(manager, fiscal_periods::Entity).await?;
        drop_table(manager, fiscal_years::Entity).await?;
        drop_table(manager, accounts::Entity).await?;
        Ok(())
    }
}

async fn create_table<E>(manager: &SchemaManager<'_>, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}

async fn drop_table<E>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}
