//! Monthly rollover engine.
//!
//! A scheduled batch pass that ensures every auto-renewing template has an
//! instance for the current month, seeding carry-over amounts from the
//! previous month's instance according to the template's recurring rule.
//! One template failing never aborts the batch; failures are logged and
//! surfaced in the summary counts. The pass also records its run date in the
//! `system_state` table so operators can see when it last completed.

use crate::{
    core::{
        month::MonthYear,
        pocket::{self, RecurringRule},
    },
    entities::{SystemState, pocket as pocket_entity, system_state},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseTransaction, Set, TransactionTrait, prelude::*};
use std::time::Duration;
use tracing::{error, info};

const LAST_ROLLOVER_RUN_KEY: &str = "last_rollover_run";

/// Budget for processing one template before it is abandoned and counted as
/// failed, so a single slow template cannot stall the whole batch.
pub const TEMPLATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of one full rollover batch pass.
#[derive(Debug, Clone)]
pub struct RolloverSummary {
    /// The `YYYY-MM` month the pass materialized instances for
    pub month: String,
    /// Templates for which a new instance was created
    pub processed: usize,
    /// Templates that already had a current-month instance
    pub skipped: usize,
    /// Templates whose processing failed
    pub failed: usize,
    /// Ids of the templates that failed
    pub failed_template_ids: Vec<i64>,
    /// Total auto-renewing templates examined
    pub total: usize,
}

/// How one template fared in the pass.
enum TemplateOutcome {
    Created,
    Skipped,
}

/// Computes the amount carried from the previous month's instance.
///
/// A missing or unrecognized rule behaves like `reset`: nothing carries.
/// With no previous instance there is nothing to carry either. Otherwise the
/// unused budget (`budget_amount - current_amount`, floored at zero) is
/// carried in full, capped, or scaled per the rule.
#[must_use]
pub fn compute_rollover_amount(
    rule: Option<RecurringRule>,
    previous: Option<&pocket_entity::Model>,
) -> f64 {
    let rule = match rule {
        None | Some(RecurringRule::Reset) => return 0.0,
        Some(rule) => rule,
    };

    let Some(previous) = previous else {
        return 0.0;
    };

    let unused = previous.budget_amount - previous.current_amount;
    if unused <= 0.0 {
        return 0.0;
    }

    match rule {
        RecurringRule::Reset => 0.0,
        RecurringRule::CarryOver { max_carry_over } => {
            max_carry_over.map_or(unused, |cap| unused.min(cap))
        }
        RecurringRule::Percentage { percentage } => unused * (percentage / 100.0),
    }
}

/// Processes a single template for the given month.
///
/// Skips when an active current-month instance already exists. Otherwise
/// materializes the instance and, when a carry-over applies, inflates the
/// instance budget by the carried amount while pre-crediting the same amount
/// as already spent. The available-to-spend therefore stays at the template's
/// base budget while the displayed budget line shows the boost; this
/// accounting identity is kept deliberately.
///
/// Instance insert and carry-over update ride one database transaction: if
/// the carry-over fails, the transaction rolls back and no instance remains,
/// so a later run can retry the whole template instead of skipping past a
/// skeleton instance that lost its carry-over.
async fn process_template(
    db: &DatabaseConnection,
    template: &pocket_entity::Model,
    month: &MonthYear,
) -> Result<TemplateOutcome> {
    if pocket::find_active_instance(db, template.id, month)
        .await?
        .is_some()
    {
        return Ok(TemplateOutcome::Skipped);
    }

    let txn = db.begin().await?;
    let instance_id = materialize_with_carry_over(&txn, template, month).await?;
    txn.commit().await?;

    info!(
        template_id = template.id,
        instance_id,
        month = %month,
        "materialized monthly pocket instance"
    );

    Ok(TemplateOutcome::Created)
}

/// The write half of [`process_template`], inside its transaction. Any error
/// propagates before the commit, rolling the whole template back.
async fn materialize_with_carry_over(
    txn: &DatabaseTransaction,
    template: &pocket_entity::Model,
    month: &MonthYear,
) -> Result<i64> {
    let previous = pocket::find_active_instance(txn, template.id, &month.prev()).await?;
    let rollover_amount = compute_rollover_amount(template.recurring_rule(), previous.as_ref());

    let instance_id = pocket::generate_monthly_instance(txn, template.id, month).await?;

    if rollover_amount > 0.0 {
        pocket::update_pocket_budget_and_current(
            txn,
            instance_id,
            template.budget_amount + rollover_amount,
            rollover_amount,
        )
        .await?;
    }

    Ok(instance_id)
}

/// Runs the full rollover pass for the month `today` falls in, with the
/// default per-template timeout.
pub async fn run_rollover(db: &DatabaseConnection, today: NaiveDate) -> Result<RolloverSummary> {
    run_rollover_with_timeout(db, today, TEMPLATE_TIMEOUT).await
}

/// Runs the full rollover pass for the month `today` falls in.
///
/// Every active auto-renewing template is examined; per-template failures
/// and timeouts are logged and counted without aborting the batch, so the
/// summary counts stay accurate even on partial failure. The run date is
/// recorded in `system_state` afterwards on a best-effort basis.
pub async fn run_rollover_with_timeout(
    db: &DatabaseConnection,
    today: NaiveDate,
    per_template_timeout: Duration,
) -> Result<RolloverSummary> {
    let month = MonthYear::from_date(today);
    let templates = pocket::fetch_auto_renew_templates(db).await?;

    let mut processed = 0;
    let mut skipped = 0;
    let mut failed_template_ids = Vec::new();

    for template in &templates {
        let outcome =
            tokio::time::timeout(per_template_timeout, process_template(db, template, &month))
                .await;
        match outcome {
            Ok(Ok(TemplateOutcome::Created)) => processed += 1,
            Ok(Ok(TemplateOutcome::Skipped)) => skipped += 1,
            Ok(Err(e)) => {
                error!(
                    template_id = template.id,
                    owner_id = %template.owner_id,
                    error = %e,
                    "rollover failed for template; continuing"
                );
                failed_template_ids.push(template.id);
            }
            Err(_elapsed) => {
                error!(
                    template_id = template.id,
                    owner_id = %template.owner_id,
                    timeout = ?per_template_timeout,
                    "rollover timed out for template; continuing"
                );
                failed_template_ids.push(template.id);
            }
        }
    }

    // Purely informational; a failure here must not discard an otherwise
    // accurate summary.
    if let Err(e) = set_last_rollover_run(db, today).await {
        error!(error = %e, "failed to record rollover run date");
    }

    let summary = RolloverSummary {
        month: month.to_string(),
        processed,
        skipped,
        failed: failed_template_ids.len(),
        failed_template_ids,
        total: templates.len(),
    };

    info!(
        month = %summary.month,
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed,
        total = summary.total,
        "rollover pass complete"
    );

    Ok(summary)
}

/// Retrieves the date the rollover batch last completed, if ever recorded.
pub async fn get_last_rollover_run(db: &DatabaseConnection) -> Result<Option<NaiveDate>> {
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_ROLLOVER_RUN_KEY))
        .one(db)
        .await?;

    match state {
        Some(s) => NaiveDate::parse_from_str(&s.value, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| Error::Config {
                message: format!("Failed to parse last rollover run date: {e}"),
            }),
        None => Ok(None),
    }
}

/// Records the date of the latest completed rollover pass.
async fn set_last_rollover_run(db: &DatabaseConnection, date: NaiveDate) -> Result<()> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let now = Utc::now().naive_utc();

    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_ROLLOVER_RUN_KEY))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active: system_state::ActiveModel = state.into();
        active.value = Set(date_str);
        active.updated_at = Set(now);
        active.update(db).await?;
    } else {
        let new_state = system_state::ActiveModel {
            key: Set(LAST_ROLLOVER_RUN_KEY.to_string()),
            value: Set(date_str),
            updated_at: Set(now),
            ..Default::default()
        };
        new_state.insert(db).await?;
    }

    Ok(())
}

/// Formats a rollover summary into a human-readable log line block.
#[must_use]
pub fn format_rollover_summary(summary: &RolloverSummary) -> String {
    use std::fmt::Write;

    let mut out = format!(
        "Rollover {} - {} template(s): {} created, {} skipped, {} failed\n",
        summary.month, summary.total, summary.processed, summary.skipped, summary.failed
    );

    if !summary.failed_template_ids.is_empty() {
        // write! to a String cannot fail
        let _ = write!(out, "  failed template ids: {:?}", summary.failed_template_ids);
    }

    out
}
