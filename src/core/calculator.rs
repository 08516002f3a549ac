//! Derived balance calculation for pocket instances.
//!
//! Spend per pocket is never read from a stored counter; it is recomputed on
//! demand by joining the month's instances against the transaction ledger.
//! The whole computation is a read: it can run repeatedly and concurrently
//! without coordination.

use crate::{
    core::{ledger, month::MonthYear, pocket},
    entities::{pocket as pocket_entity, transaction},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::collections::{HashMap, HashSet};

/// One pocket instance with its ledger-derived spend.
#[derive(Debug, Clone)]
pub struct PocketBalance {
    /// The stored pocket instance
    pub pocket: pocket_entity::Model,
    /// Net spend this month: expenses add, income (refunds) subtracts
    pub current_amount: f64,
    /// Effective featured flag; inherited from the parent template when set
    pub is_featured: bool,
}

/// All of an owner's pocket balances for one month, with aggregates.
#[derive(Debug, Clone)]
pub struct MonthlySnapshot {
    /// The month the snapshot covers
    pub month: MonthYear,
    /// Per-pocket balances
    pub pockets: Vec<PocketBalance>,
    /// Sum of instance budgets
    pub total_budget: f64,
    /// Sum of derived spends
    pub total_spent: f64,
    /// `total_budget - total_spent`
    pub total_remaining: f64,
}

/// Signed contribution of one ledger row to its pocket's spend.
/// Expenses count toward spend; income attributed to a pocket models a
/// refund or reimbursement and reduces it.
fn signed_amount(tx: &transaction::Model) -> f64 {
    if tx.transaction_type == transaction::TYPE_EXPENSE {
        tx.amount
    } else {
        -tx.amount
    }
}

/// Computes the full monthly snapshot for one owner.
///
/// Fetches the month's active instances, the owner's active templates (for
/// the featured-flag indirection), and the month's transactions, then groups
/// transactions by pocket in a single pass. An owner with no data yields an
/// empty snapshot with zeroed totals, never an error.
pub async fn snapshot_month(
    db: &DatabaseConnection,
    owner_id: &str,
    month: &MonthYear,
) -> Result<MonthlySnapshot> {
    let instances = pocket::fetch_pockets_for_month(db, owner_id, month).await?;
    let templates = pocket::fetch_active_templates(db, owner_id).await?;

    let (start, end) = month.date_range();
    let transactions = ledger::fetch_transactions_in_range(db, owner_id, start, end).await?;

    // The same instance can surface twice when fetched through different
    // relations; drop duplicates by id (first wins) to avoid double counting.
    let mut seen = HashSet::new();
    let instances: Vec<_> = instances
        .into_iter()
        .filter(|p| seen.insert(p.id))
        .collect();

    let featured_by_template: HashMap<i64, bool> =
        templates.into_iter().map(|t| (t.id, t.is_featured)).collect();

    // One pass over the ledger; transactions without a pocket reference, or
    // referencing a pocket outside this month's instance set, fall out when
    // the per-pocket totals are looked up below.
    let mut spent_by_pocket: HashMap<i64, f64> = HashMap::new();
    for tx in &transactions {
        if let Some(pocket_id) = tx.pocket_id {
            *spent_by_pocket.entry(pocket_id).or_insert(0.0) += signed_amount(tx);
        }
    }

    let mut pockets = Vec::with_capacity(instances.len());
    let mut total_budget = 0.0;
    let mut total_spent = 0.0;

    for instance in instances {
        let current_amount = spent_by_pocket.get(&instance.id).copied().unwrap_or(0.0);
        let is_featured = match instance.parent_pocket_id {
            Some(template_id) => featured_by_template
                .get(&template_id)
                .copied()
                .unwrap_or(instance.is_featured),
            None => instance.is_featured,
        };

        total_budget += instance.budget_amount;
        total_spent += current_amount;

        pockets.push(PocketBalance {
            pocket: instance,
            current_amount,
            is_featured,
        });
    }

    Ok(MonthlySnapshot {
        month: *month,
        pockets,
        total_budget,
        total_spent,
        total_remaining: total_budget - total_spent,
    })
}

/// Percentage of an instance's budget consumed, guarded against a zero budget.
#[must_use]
pub fn percent_of_budget(current_amount: f64, budget_amount: f64) -> f64 {
    if budget_amount == 0.0 {
        return 0.0;
    }
    (current_amount / budget_amount) * 100.0
}
