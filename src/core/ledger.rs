//! Ledger operations - appending and removing transactions.
//!
//! The ledger is the single source of truth for every derived balance, so
//! writes here deliberately do not touch any stored counter on pockets or
//! card accounts; the calculator and reconciler recompute on demand.

use crate::{
    entities::{Transaction, transaction},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Set, prelude::*};

/// Parameters for appending a ledger entry.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Owner of the transaction
    pub owner_id: String,
    /// Unsigned magnitude; must be positive and finite
    pub amount: f64,
    /// `"income"` or `"expense"`
    pub transaction_type: String,
    /// Free-text category label
    pub category: String,
    /// Human-readable description
    pub description: String,
    /// Calendar date the transaction applies to
    pub transaction_date: NaiveDate,
    /// Pocket instance the entry counts against, if any
    pub pocket_id: Option<i64>,
    /// Credit card account the entry ran through, if any
    pub credit_card_account_id: Option<i64>,
}

/// Appends a transaction to the ledger, validating the amount and type.
///
/// Amounts are magnitudes: zero, negative, and non-finite values are
/// rejected with [`Error::InvalidAmount`].
pub async fn record_transaction(
    db: &DatabaseConnection,
    new: NewTransaction,
) -> Result<transaction::Model> {
    if new.amount <= 0.0 || !new.amount.is_finite() {
        return Err(Error::InvalidAmount { amount: new.amount });
    }

    if new.transaction_type != transaction::TYPE_INCOME
        && new.transaction_type != transaction::TYPE_EXPENSE
    {
        return Err(Error::Config {
            message: format!("Unknown transaction type: {:?}", new.transaction_type),
        });
    }

    let model = transaction::ActiveModel {
        owner_id: Set(new.owner_id),
        amount: Set(new.amount),
        transaction_type: Set(new.transaction_type),
        category: Set(new.category),
        description: Set(new.description),
        transaction_date: Set(new.transaction_date),
        pocket_id: Set(new.pocket_id),
        credit_card_account_id: Set(new.credit_card_account_id),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    Ok(result)
}

/// Retrieves all of an owner's transactions dated within the half-open range
/// `[start, end_exclusive)`.
pub async fn fetch_transactions_in_range(
    db: &DatabaseConnection,
    owner_id: &str,
    start: NaiveDate,
    end_exclusive: NaiveDate,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::OwnerId.eq(owner_id))
        .filter(transaction::Column::TransactionDate.gte(start))
        .filter(transaction::Column::TransactionDate.lt(end_exclusive))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a transaction on explicit user request.
///
/// Since balances are derived, removal needs no counter reversal; the next
/// snapshot or reconciliation simply no longer sees the row.
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: i64) -> Result<()> {
    let tx = Transaction::find_by_id(transaction_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::Config {
            message: format!("Transaction not found: {transaction_id}"),
        })?;

    tx.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn base(owner: &str, amount: f64) -> NewTransaction {
        NewTransaction {
            owner_id: owner.to_string(),
            amount,
            transaction_type: transaction::TYPE_EXPENSE.to_string(),
            category: "General".to_string(),
            description: "Test transaction".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            pocket_id: None,
            credit_card_account_id: None,
        }
    }

    #[tokio::test]
    async fn test_record_transaction_validation() -> Result<()> {
        let db = setup_test_db().await?;

        for bad in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = record_transaction(&db, base("owner-1", bad)).await;
            assert!(
                matches!(result.unwrap_err(), Error::InvalidAmount { .. }),
                "accepted amount {bad}"
            );
        }

        let result = record_transaction(
            &db,
            NewTransaction {
                transaction_type: "transfer".to_string(),
                ..base("owner-1", 10.0)
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_and_fetch_in_range() -> Result<()> {
        let db = setup_test_db().await?;

        record_transaction(&db, base("owner-1", 10.0)).await?;
        record_transaction(
            &db,
            NewTransaction {
                transaction_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
                ..base("owner-1", 20.0)
            },
        )
        .await?;

        let in_january = fetch_transactions_in_range(
            &db,
            "owner-1",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        )
        .await?;
        assert_eq!(in_january.len(), 1);
        assert_eq!(in_january[0].amount, 10.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_transaction() -> Result<()> {
        let db = setup_test_db().await?;

        let tx = record_transaction(&db, base("owner-1", 10.0)).await?;
        delete_transaction(&db, tx.id).await?;

        let remaining = fetch_transactions_in_range(
            &db,
            "owner-1",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        )
        .await?;
        assert!(remaining.is_empty());

        let result = delete_transaction(&db, tx.id).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }
}
