//! Shared test utilities.
//!
//! Common helpers for setting up in-memory test databases and creating test
//! templates, instances, cards, and ledger rows with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        ledger::{self, NewTransaction},
        month::MonthYear,
        pocket::{self, NewTemplate},
    },
    entities::{credit_card_account, pocket as pocket_entity, transaction},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Creates an in-memory `SQLite` database with all tables and indexes.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Baseline [`NewTemplate`] for struct-update spreads in tests.
///
/// Defaults: budget 100.0, auto-renew on, not featured, no recurring rule.
pub fn default_template(owner_id: &str) -> NewTemplate {
    NewTemplate {
        owner_id: owner_id.to_string(),
        name: "Test Pocket".to_string(),
        color: "#4caf50".to_string(),
        budget_type: "standard".to_string(),
        pocket_type: "expense".to_string(),
        cycle_type: "monthly".to_string(),
        budget_amount: 100.0,
        is_featured: false,
        auto_renew: true,
        recurring_rule: None,
    }
}

/// Creates a test template with defaults and the given name.
pub async fn create_test_template(
    db: &DatabaseConnection,
    owner_id: &str,
    name: &str,
) -> Result<pocket_entity::Model> {
    pocket::create_template(
        db,
        NewTemplate {
            name: name.to_string(),
            ..default_template(owner_id)
        },
    )
    .await
}

/// Creates a test template with a custom budget amount.
pub async fn create_custom_template(
    db: &DatabaseConnection,
    owner_id: &str,
    name: &str,
    budget_amount: f64,
) -> Result<pocket_entity::Model> {
    pocket::create_template(
        db,
        NewTemplate {
            name: name.to_string(),
            budget_amount,
            ..default_template(owner_id)
        },
    )
    .await
}

/// Sets up a database with one template and its materialized instance for
/// the given `YYYY-MM` month. Returns `(db, instance)`.
pub async fn setup_with_instance(
    owner_id: &str,
    month: &str,
) -> Result<(DatabaseConnection, pocket_entity::Model)> {
    let db = setup_test_db().await?;
    let template = create_test_template(&db, owner_id, "Test Pocket").await?;
    let month: MonthYear = month.parse()?;
    let instance_id = pocket::generate_monthly_instance(&db, template.id, &month).await?;
    let instance = pocket::get_pocket_by_id(&db, instance_id).await?.unwrap();
    Ok((db, instance))
}

/// Appends a fully specified ledger row. Dates are `YYYY-MM-DD` strings.
#[allow(clippy::too_many_arguments)]
pub async fn ledger_append(
    db: &DatabaseConnection,
    owner_id: &str,
    amount: f64,
    transaction_type: &str,
    category: &str,
    date: &str,
    pocket_id: Option<i64>,
    credit_card_account_id: Option<i64>,
) -> Result<transaction::Model> {
    ledger::record_transaction(
        db,
        NewTransaction {
            owner_id: owner_id.to_string(),
            amount,
            transaction_type: transaction_type.to_string(),
            category: category.to_string(),
            description: "Test transaction".to_string(),
            transaction_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            pocket_id,
            credit_card_account_id,
        },
    )
    .await
}

/// Appends an expense row attributed to a pocket (or to nothing).
pub async fn ledger_expense(
    db: &DatabaseConnection,
    owner_id: &str,
    amount: f64,
    date: &str,
    pocket_id: Option<i64>,
) -> Result<transaction::Model> {
    ledger_append(
        db,
        owner_id,
        amount,
        transaction::TYPE_EXPENSE,
        "General",
        date,
        pocket_id,
        None,
    )
    .await
}

/// Appends an income (refund) row attributed to a pocket.
pub async fn ledger_income(
    db: &DatabaseConnection,
    owner_id: &str,
    amount: f64,
    date: &str,
    pocket_id: Option<i64>,
) -> Result<transaction::Model> {
    ledger_append(
        db,
        owner_id,
        amount,
        transaction::TYPE_INCOME,
        "Refund",
        date,
        pocket_id,
        None,
    )
    .await
}

/// Appends a card charge with a custom category.
pub async fn card_transaction(
    db: &DatabaseConnection,
    owner_id: &str,
    amount: f64,
    date: &str,
    card_id: i64,
    category: &str,
) -> Result<transaction::Model> {
    ledger_append(
        db,
        owner_id,
        amount,
        transaction::TYPE_EXPENSE,
        category,
        date,
        None,
        Some(card_id),
    )
    .await
}

/// Appends an ordinary card charge.
pub async fn card_expense(
    db: &DatabaseConnection,
    owner_id: &str,
    amount: f64,
    date: &str,
    card_id: i64,
) -> Result<transaction::Model> {
    card_transaction(db, owner_id, amount, date, card_id, "General").await
}

/// Appends a card payment (the reserved sentinel category).
pub async fn card_payment(
    db: &DatabaseConnection,
    owner_id: &str,
    amount: f64,
    date: &str,
    card_id: i64,
) -> Result<transaction::Model> {
    card_transaction(
        db,
        owner_id,
        amount,
        date,
        card_id,
        crate::core::reconciler::CARD_PAYMENT_CATEGORY,
    )
    .await
}

/// Creates an active test credit card account.
pub async fn create_test_card(
    db: &DatabaseConnection,
    owner_id: &str,
    account_name: &str,
    credit_limit: f64,
) -> Result<credit_card_account::Model> {
    let card = credit_card_account::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        account_name: Set(account_name.to_string()),
        institution_name: Set("Test Bank".to_string()),
        credit_limit: Set(credit_limit),
        minimum_payment: Set(25.0),
        due_date: Set(15),
        current_balance: Set(0.0),
        is_active: Set(true),
        ..Default::default()
    };
    card.insert(db).await.map_err(Into::into)
}

/// Soft-deletes a card account.
pub async fn deactivate_card(db: &DatabaseConnection, card_id: i64) -> Result<()> {
    let card = crate::entities::CreditCardAccount::find_by_id(card_id)
        .one(db)
        .await?
        .unwrap();
    let mut active: credit_card_account::ActiveModel = card.into();
    active.is_active = Set(false);
    active.update(db).await?;
    Ok(())
}

/// Overwrites a card's stored balance cache (which the reconciler must ignore).
pub async fn set_cached_balance(db: &DatabaseConnection, card_id: i64, balance: f64) -> Result<()> {
    let card = crate::entities::CreditCardAccount::find_by_id(card_id)
        .one(db)
        .await?
        .unwrap();
    let mut active: credit_card_account::ActiveModel = card.into();
    active.current_balance = Set(balance);
    active.update(db).await?;
    Ok(())
}

/// Sets a pocket's own stored featured flag.
pub async fn set_featured(db: &DatabaseConnection, pocket_id: i64, featured: bool) -> Result<()> {
    let pocket = pocket::get_pocket_by_id(db, pocket_id).await?.unwrap();
    let mut active: pocket_entity::ActiveModel = pocket.into();
    active.is_featured = Set(featured);
    active.update(db).await?;
    Ok(())
}

/// A zeroed pocket model for pure unit tests that never touch the database.
#[must_use]
pub fn blank_pocket_model() -> pocket_entity::Model {
    pocket_entity::Model {
        id: 0,
        owner_id: String::new(),
        name: String::new(),
        color: String::new(),
        budget_type: String::new(),
        pocket_type: String::new(),
        cycle_type: String::new(),
        budget_amount: 0.0,
        current_amount: 0.0,
        is_template: false,
        is_featured: false,
        parent_pocket_id: None,
        month_year: None,
        auto_renew: false,
        recurring_type: None,
        recurring_percentage: None,
        max_carry_over: None,
        is_active: true,
    }
}
