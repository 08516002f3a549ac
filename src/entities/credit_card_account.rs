//! Credit card account entity.
//!
//! `current_balance` is a stored cache kept for display compatibility; the
//! reconciler treats it as untrusted and recomputes balances from the ledger.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Credit card account database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_card_accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the account
    pub owner_id: String,
    /// Display name (e.g., "Everyday Visa")
    pub account_name: String,
    /// Issuing institution
    pub institution_name: String,
    /// Credit limit in dollars
    pub credit_limit: f64,
    /// Minimum monthly payment in dollars
    pub minimum_payment: f64,
    /// Day of month the payment is due (1-31)
    pub due_date: i32,
    /// Cached balance; derivable and untrusted, the ledger is authoritative
    pub current_balance: f64,
    /// Soft delete flag
    pub is_active: bool,
}

/// Defines relationships between CreditCardAccount and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has many ledger transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
