//! Pocket entity - Represents a budget pocket, template or monthly instance.
//!
//! A single table holds both reusable templates (`is_template = true`,
//! no `parent_pocket_id`, no `month_year`) and their realized per-month
//! instances (`parent_pocket_id` points at a template, `month_year` is set).
//! Balances on instances are derivable from the ledger; `current_amount` is
//! only authored by the rollover engine when seeding a carry-over.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recurring rule type stored on templates: carry nothing into the next month.
pub const RECURRING_RESET: &str = "reset";
/// Recurring rule type: carry the full unused amount (optionally capped).
pub const RECURRING_CARRY_OVER: &str = "carry_over";
/// Recurring rule type: carry a percentage of the unused amount.
pub const RECURRING_PERCENTAGE: &str = "percentage";

/// Pocket database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pockets")]
pub struct Model {
    /// Unique identifier for the pocket
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the pocket; every query is scoped by this
    pub owner_id: String,
    /// Human-readable name (e.g., "Groceries", "Rent")
    pub name: String,
    /// Display color hint
    pub color: String,
    /// Budgeting strategy label (informational, not applied by the core)
    pub budget_type: String,
    /// Category-of-pocket label copied verbatim from template to instance
    pub pocket_type: String,
    /// Budget cycle label copied verbatim from template to instance
    pub cycle_type: String,
    /// Target allocation for the period
    pub budget_amount: f64,
    /// Spend seed; non-zero only when a rollover carry-over was applied.
    /// Displayed balances are always recomputed from the ledger.
    pub current_amount: f64,
    /// True for reusable templates, false for monthly instances
    pub is_template: bool,
    /// Display hint; on instances the effective value is the template's
    pub is_featured: bool,
    /// Template this instance was generated from; None on templates
    pub parent_pocket_id: Option<i64>,
    /// `YYYY-MM` period of an instance; None on templates
    pub month_year: Option<String>,
    /// Whether the rollover engine materializes next-month instances
    pub auto_renew: bool,
    /// Recurring rule type: `"reset"`, `"carry_over"`, or `"percentage"`
    pub recurring_type: Option<String>,
    /// Percentage of unused budget to carry (only for `"percentage"` rules)
    pub recurring_percentage: Option<f64>,
    /// Cap on the carried amount (only for `"carry_over"` rules)
    pub max_carry_over: Option<f64>,
    /// Soft delete flag - inactive pockets are hidden but never removed
    pub is_active: bool,
}

/// Defines relationships between Pocket and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One pocket instance has many ledger transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
