//! Database configuration module.
//!
//! Handles `SQLite` connection and schema creation using `SeaORM`. Tables are
//! generated from the entity definitions via `Schema::create_table_from_entity`
//! so the schema always matches the Rust structs. On top of the generated
//! tables, a partial unique index guarantees at most one active instance per
//! `(parent_pocket_id, month_year)` pair, closing the check-then-create race
//! in instance generation at the storage layer.

use crate::entities::{CreditCardAccount, Pocket, SystemState, Transaction};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, Statement};

/// Gets the database URL from the `DATABASE_URL` environment variable or
/// falls back to a default local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/pocketbook.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url())
        .await
        .map_err(Into::into)
}

/// Creates all tables and indexes; idempotent across restarts.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut pocket_table = schema.create_table_from_entity(Pocket);
    let mut transaction_table = schema.create_table_from_entity(Transaction);
    let mut credit_card_table = schema.create_table_from_entity(CreditCardAccount);
    let mut system_state_table = schema.create_table_from_entity(SystemState);

    db.execute(builder.build(pocket_table.if_not_exists()))
        .await?;
    db.execute(builder.build(transaction_table.if_not_exists()))
        .await?;
    db.execute(builder.build(credit_card_table.if_not_exists()))
        .await?;
    db.execute(builder.build(system_state_table.if_not_exists()))
        .await?;

    // Partial unique index: at most one ACTIVE instance per template/month.
    // Partial, because soft-deleted instances must not block re-creation.
    db.execute(Statement::from_string(
        builder,
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_pockets_active_instance \
         ON pockets (parent_pocket_id, month_year) \
         WHERE is_active = 1 AND parent_pocket_id IS NOT NULL",
    ))
    .await?;

    Ok(())
}
