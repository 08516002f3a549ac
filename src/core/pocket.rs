//! Pocket business logic - template/instance lifecycle and pocket queries.
//!
//! Pockets come in two shapes stored in one table: templates (the reusable
//! definition of a budget category) and monthly instances (a template's
//! realization for one `YYYY-MM` period). This module owns creating templates,
//! materializing instances, and the owner-scoped queries the calculator and
//! rollover engine are built on.

use crate::{
    core::month::MonthYear,
    entities::{Pocket, pocket},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Rollover behavior configured on a template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecurringRule {
    /// Nothing carries into the next month
    Reset,
    /// Unused budget carries over, optionally capped
    CarryOver {
        /// Cap on the carried amount, if any
        max_carry_over: Option<f64>,
    },
    /// A percentage of the unused budget carries over
    Percentage {
        /// Percentage of unused budget to carry (0-100)
        percentage: f64,
    },
}

impl pocket::Model {
    /// Decodes the stored recurring-rule columns into a [`RecurringRule`].
    ///
    /// Returns `None` when no rule is configured or the stored type label is
    /// unrecognized; the rollover engine treats both the same as `Reset`.
    #[must_use]
    pub fn recurring_rule(&self) -> Option<RecurringRule> {
        match self.recurring_type.as_deref() {
            Some(pocket::RECURRING_RESET) => Some(RecurringRule::Reset),
            Some(pocket::RECURRING_CARRY_OVER) => Some(RecurringRule::CarryOver {
                max_carry_over: self.max_carry_over,
            }),
            Some(pocket::RECURRING_PERCENTAGE) => Some(RecurringRule::Percentage {
                percentage: self.recurring_percentage.unwrap_or(0.0),
            }),
            _ => None,
        }
    }
}

/// Parameters for creating a new pocket template.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    /// Owner the template belongs to
    pub owner_id: String,
    /// Template name
    pub name: String,
    /// Display color hint
    pub color: String,
    /// Budgeting strategy label
    pub budget_type: String,
    /// Category-of-pocket label
    pub pocket_type: String,
    /// Budget cycle label
    pub cycle_type: String,
    /// Target allocation per period
    pub budget_amount: f64,
    /// Display hint inherited by instances
    pub is_featured: bool,
    /// Whether the rollover engine materializes instances automatically
    pub auto_renew: bool,
    /// Carry-over behavior, if any
    pub recurring_rule: Option<RecurringRule>,
}

/// Retrieves all active pocket instances for one owner and month, ordered
/// alphabetically by name. Templates are excluded; they never accrue spend.
pub async fn fetch_pockets_for_month(
    db: &DatabaseConnection,
    owner_id: &str,
    month: &MonthYear,
) -> Result<Vec<pocket::Model>> {
    Pocket::find()
        .filter(pocket::Column::OwnerId.eq(owner_id))
        .filter(pocket::Column::IsTemplate.eq(false))
        .filter(pocket::Column::MonthYear.eq(month.to_string()))
        .filter(pocket::Column::IsActive.eq(true))
        .order_by_asc(pocket::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all active templates for one owner, ordered alphabetically.
pub async fn fetch_active_templates(
    db: &DatabaseConnection,
    owner_id: &str,
) -> Result<Vec<pocket::Model>> {
    Pocket::find()
        .filter(pocket::Column::OwnerId.eq(owner_id))
        .filter(pocket::Column::IsTemplate.eq(true))
        .filter(pocket::Column::IsActive.eq(true))
        .order_by_asc(pocket::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every active auto-renewing template across all owners.
/// This is the rollover engine's work list.
pub async fn fetch_auto_renew_templates(db: &DatabaseConnection) -> Result<Vec<pocket::Model>> {
    Pocket::find()
        .filter(pocket::Column::IsTemplate.eq(true))
        .filter(pocket::Column::IsActive.eq(true))
        .filter(pocket::Column::AutoRenew.eq(true))
        .order_by_asc(pocket::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a pocket by its unique ID regardless of template/instance shape.
pub async fn get_pocket_by_id<C>(db: &C, pocket_id: i64) -> Result<Option<pocket::Model>>
where
    C: ConnectionTrait,
{
    Pocket::find_by_id(pocket_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the active instance for a `(template, month)` pair, if one exists.
/// At most one can exist; the partial unique index on
/// `(parent_pocket_id, month_year)` enforces it at the storage layer.
pub async fn find_active_instance<C>(
    db: &C,
    template_id: i64,
    month: &MonthYear,
) -> Result<Option<pocket::Model>>
where
    C: ConnectionTrait,
{
    Pocket::find()
        .filter(pocket::Column::ParentPocketId.eq(template_id))
        .filter(pocket::Column::MonthYear.eq(month.to_string()))
        .filter(pocket::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new pocket template, performing input validation.
///
/// The name must be non-empty after trimming and the budget non-negative.
pub async fn create_template(
    db: &DatabaseConnection,
    template: NewTemplate,
) -> Result<pocket::Model> {
    if template.name.trim().is_empty() {
        return Err(Error::Config {
            message: "Pocket name cannot be empty".to_string(),
        });
    }

    if template.budget_amount < 0.0 || !template.budget_amount.is_finite() {
        return Err(Error::InvalidAmount {
            amount: template.budget_amount,
        });
    }

    let (recurring_type, recurring_percentage, max_carry_over) = match template.recurring_rule {
        None => (None, None, None),
        Some(RecurringRule::Reset) => (Some(pocket::RECURRING_RESET.to_string()), None, None),
        Some(RecurringRule::CarryOver { max_carry_over }) => (
            Some(pocket::RECURRING_CARRY_OVER.to_string()),
            None,
            max_carry_over,
        ),
        Some(RecurringRule::Percentage { percentage }) => (
            Some(pocket::RECURRING_PERCENTAGE.to_string()),
            Some(percentage),
            None,
        ),
    };

    let model = pocket::ActiveModel {
        owner_id: Set(template.owner_id),
        name: Set(template.name.trim().to_string()),
        color: Set(template.color),
        budget_type: Set(template.budget_type),
        pocket_type: Set(template.pocket_type),
        cycle_type: Set(template.cycle_type),
        budget_amount: Set(template.budget_amount),
        current_amount: Set(0.0),
        is_template: Set(true),
        is_featured: Set(template.is_featured),
        parent_pocket_id: Set(None),
        month_year: Set(None),
        auto_renew: Set(template.auto_renew),
        recurring_type: Set(recurring_type),
        recurring_percentage: Set(recurring_percentage),
        max_carry_over: Set(max_carry_over),
        is_active: Set(true),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    Ok(result)
}

/// Materializes a template's instance for one month, idempotently.
///
/// If an active instance already exists for `(template_id, month)` its id is
/// returned and nothing is created. Otherwise a new instance is inserted,
/// copying name, color, budget/pocket/cycle type, and `budget_amount` from
/// the template, seeded with `current_amount = 0`.
///
/// The existence check and insert are not one atomic step; the partial unique
/// index on `(parent_pocket_id, month_year)` closes the race. When two callers
/// collide, the loser's insert fails the constraint and we return the winner's
/// row instead of the error.
pub async fn generate_monthly_instance<C>(
    db: &C,
    template_id: i64,
    month: &MonthYear,
) -> Result<i64>
where
    C: ConnectionTrait,
{
    let template = get_pocket_by_id(db, template_id)
        .await?
        .filter(|p| p.is_template && p.is_active)
        .ok_or(Error::TemplateNotFound { id: template_id })?;

    if let Some(existing) = find_active_instance(db, template_id, month).await? {
        return Ok(existing.id);
    }

    let instance = pocket::ActiveModel {
        owner_id: Set(template.owner_id.clone()),
        name: Set(template.name.clone()),
        color: Set(template.color.clone()),
        budget_type: Set(template.budget_type.clone()),
        pocket_type: Set(template.pocket_type.clone()),
        cycle_type: Set(template.cycle_type.clone()),
        budget_amount: Set(template.budget_amount),
        current_amount: Set(0.0),
        is_template: Set(false),
        is_featured: Set(template.is_featured),
        parent_pocket_id: Set(Some(template_id)),
        month_year: Set(Some(month.to_string())),
        auto_renew: Set(false),
        recurring_type: Set(None),
        recurring_percentage: Set(None),
        max_carry_over: Set(None),
        is_active: Set(true),
        ..Default::default()
    };

    match instance.insert(db).await {
        Ok(created) => Ok(created.id),
        Err(insert_err) => {
            // A concurrent caller may have won the unique-index race.
            if let Some(existing) = find_active_instance(db, template_id, month).await? {
                Ok(existing.id)
            } else {
                Err(insert_err.into())
            }
        }
    }
}

/// Rewrites an instance's `budget_amount` and `current_amount` in one update.
/// Used only by the rollover engine when applying a carry-over seed.
pub async fn update_pocket_budget_and_current<C>(
    db: &C,
    pocket_id: i64,
    budget_amount: f64,
    current_amount: f64,
) -> Result<pocket::Model>
where
    C: ConnectionTrait,
{
    let pocket = get_pocket_by_id(db, pocket_id)
        .await?
        .ok_or(Error::PocketNotFound { id: pocket_id })?;

    let mut active: pocket::ActiveModel = pocket.into();
    active.budget_amount = Set(budget_amount);
    active.current_amount = Set(current_amount);
    active.update(db).await.map_err(Into::into)
}
