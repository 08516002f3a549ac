//! Transaction entity - The append-mostly ledger every balance derives from.
//!
//! Amounts are stored as magnitudes; the sign is implied by `transaction_type`
//! (`"income"` / `"expense"`). A row may reference a pocket instance, a credit
//! card account, both, or neither.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Semantic transaction type: money coming in.
pub const TYPE_INCOME: &str = "income";
/// Semantic transaction type: money going out.
pub const TYPE_EXPENSE: &str = "expense";

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the transaction
    pub owner_id: String,
    /// Unsigned magnitude; sign is implied by `transaction_type`
    pub amount: f64,
    /// `"income"` or `"expense"`
    pub transaction_type: String,
    /// Free-text category label. The literal `"Credit Card Payment"` is a
    /// reserved sentinel interpreted by the reconciler.
    pub category: String,
    /// Human-readable description
    pub description: String,
    /// Calendar date the transaction applies to
    pub transaction_date: Date,
    /// Pocket instance this spend counts against, if any (never a template)
    pub pocket_id: Option<i64>,
    /// Credit card account this transaction ran through, if any
    pub credit_card_account_id: Option<i64>,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction may belong to one pocket instance
    #[sea_orm(
        belongs_to = "super::pocket::Entity",
        from = "Column::PocketId",
        to = "super::pocket::Column::Id"
    )]
    Pocket,
    /// Each transaction may belong to one credit card account
    #[sea_orm(
        belongs_to = "super::credit_card_account::Entity",
        from = "Column::CreditCardAccountId",
        to = "super::credit_card_account::Column::Id"
    )]
    CreditCardAccount,
}

impl Related<super::pocket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pocket.def()
    }
}

impl Related<super::credit_card_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditCardAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
