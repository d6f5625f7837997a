//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration and run on connect.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_posting_schema;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260301_000001_posting_schema::Migration)]
    }
}
