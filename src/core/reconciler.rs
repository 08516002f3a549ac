//! Credit card balance reconciliation from the ledger.
//!
//! Each account's `current_balance` column is a display cache the reconciler
//! never trusts: the balance is re-derived by folding every ledger row tied to
//! the account. Payments subtract, everything else adds, and the result is
//! clamped at zero so an overpaid card reads as paid off rather than as a
//! negative debt.

use crate::{
    entities::{CreditCardAccount, Transaction, credit_card_account, transaction},
    errors::Result,
};
use sea_orm::{QueryOrder, prelude::*};
use std::collections::HashMap;

/// The reserved category label that flips the balance fold.
///
/// This is an exact, case-sensitive string match inherited from the stored
/// data shape. A dedicated flag on the transaction would be the cleaner
/// design but changes stored data; the sentinel therefore lives in exactly
/// one place, behind [`is_card_payment`].
pub const CARD_PAYMENT_CATEGORY: &str = "Credit Card Payment";

/// Whether a ledger row is a payment toward a card's balance.
#[must_use]
pub fn is_card_payment(tx: &transaction::Model) -> bool {
    tx.category == CARD_PAYMENT_CATEGORY
}

/// One credit card account with its ledger-derived balance.
#[derive(Debug, Clone)]
pub struct CardBalance {
    /// The stored account row
    pub account: credit_card_account::Model,
    /// Ledger-derived balance, clamped to a minimum of zero
    pub current_balance: f64,
}

/// An owner's full card portfolio with aggregates.
#[derive(Debug, Clone)]
pub struct CardPortfolio {
    /// Per-card balances, in store order (descending credit limit)
    pub cards: Vec<CardBalance>,
    /// Sum of derived balances
    pub total_debt: f64,
    /// Sum of credit limits
    pub total_credit_limit: f64,
    /// `total_credit_limit - total_debt`
    pub total_available_credit: f64,
    /// `total_debt / total_credit_limit * 100`, 0 when the limit sum is 0
    pub average_utilization: f64,
}

/// Retrieves an owner's active credit card accounts, largest limit first.
/// The reconciler preserves this order; presentation re-sorting is the
/// caller's concern.
pub async fn fetch_active_credit_card_accounts(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<credit_card_account::Model>> {
    CreditCardAccount::find()
        .filter(credit_card_account::Column::OwnerId.eq(owner_id))
        .filter(credit_card_account::Column::IsActive.eq(true))
        .order_by_desc(credit_card_account::Column::CreditLimit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every transaction of the owner that references a credit card
/// account. Full history, no date bound: card balances accumulate forever.
pub async fn fetch_transactions_for_credit_accounts(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::OwnerId.eq(owner_id))
        .filter(transaction::Column::CreditCardAccountId.is_not_null())
        .all(db)
        .await
        .map_err(Into::into)
}

/// Folds one account's transactions into a balance.
///
/// Commutative and associative, so transaction order never matters:
/// payments subtract their amount, every other row adds it. The final
/// result is clamped at zero.
fn fold_balance(transactions: &[&transaction::Model]) -> f64 {
    let balance = transactions.iter().fold(0.0, |acc, tx| {
        if is_card_payment(tx) {
            acc - tx.amount
        } else {
            acc + tx.amount
        }
    });
    balance.max(0.0)
}

/// Recomputes every active card's balance for one owner from the ledger,
/// plus portfolio aggregates. Read-only and safe under concurrent calls.
/// An owner with no cards yields an empty portfolio with zeroed aggregates.
pub async fn reconcile_cards(db: &DatabaseConnection, owner_id: &str) -> Result<CardPortfolio> {
    let accounts = fetch_active_credit_card_accounts(db, owner_id).await?;
    let transactions = fetch_transactions_for_credit_accounts(db, owner_id).await?;

    // Group by account in one pass.
    let mut by_account: HashMap<i64, Vec<&transaction::Model>> = HashMap::new();
    for tx in &transactions {
        if let Some(account_id) = tx.credit_card_account_id {
            by_account.entry(account_id).or_default().push(tx);
        }
    }

    let mut cards = Vec::with_capacity(accounts.len());
    let mut total_debt = 0.0;
    let mut total_credit_limit = 0.0;

    for account in accounts {
        let current_balance = by_account
            .get(&account.id)
            .map_or(0.0, |txs| fold_balance(txs));

        total_debt += current_balance;
        total_credit_limit += account.credit_limit;

        cards.push(CardBalance {
            account,
            current_balance,
        });
    }

    let average_utilization = if total_credit_limit == 0.0 {
        0.0
    } else {
        (total_debt / total_credit_limit) * 100.0
    };

    Ok(CardPortfolio {
        cards,
        total_debt,
        total_credit_limit,
        total_available_credit: total_credit_limit - total_debt,
        average_utilization,
    })
}
