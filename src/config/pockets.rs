//! Pocket template configuration loading from config.toml.
//!
//! Templates defined in config.toml are used to seed an owner's pocket
//! templates on first run or when templates are missing. Seeding matches by
//! name and never overwrites an existing template.

use crate::core::pocket::{self, NewTemplate, RecurringRule};
use crate::entities::pocket as pocket_entity;
use crate::errors::{Error, Result};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of pocket templates to seed
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,
}

/// Configuration for a single pocket template
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateConfig {
    /// Template name
    pub name: String,
    /// Target allocation per month
    pub budget_amount: f64,
    /// Display color hint
    #[serde(default = "default_color")]
    pub color: String,
    /// Budgeting strategy label
    #[serde(default = "default_budget_type")]
    pub budget_type: String,
    /// Category-of-pocket label
    #[serde(default = "default_pocket_type")]
    pub pocket_type: String,
    /// Budget cycle label
    #[serde(default = "default_cycle_type")]
    pub cycle_type: String,
    /// Display hint inherited by instances
    #[serde(default)]
    pub is_featured: bool,
    /// Whether the rollover engine materializes instances automatically
    #[serde(default = "default_auto_renew")]
    pub auto_renew: bool,
    /// `"reset"`, `"carry_over"`, or `"percentage"`
    #[serde(default)]
    pub recurring_type: Option<String>,
    /// Percentage of unused budget to carry (percentage rules only)
    #[serde(default)]
    pub recurring_percentage: Option<f64>,
    /// Cap on the carried amount (carry_over rules only)
    #[serde(default)]
    pub max_carry_over: Option<f64>,
}

fn default_color() -> String {
    "#9e9e9e".to_string()
}

fn default_budget_type() -> String {
    "standard".to_string()
}

fn default_pocket_type() -> String {
    "expense".to_string()
}

fn default_cycle_type() -> String {
    "monthly".to_string()
}

const fn default_auto_renew() -> bool {
    true
}

impl TemplateConfig {
    /// Decodes the optional recurring-rule fields, rejecting unknown types.
    pub fn recurring_rule(&self) -> Result<Option<RecurringRule>> {
        match self.recurring_type.as_deref() {
            None => Ok(None),
            Some(pocket_entity::RECURRING_RESET) => Ok(Some(RecurringRule::Reset)),
            Some(pocket_entity::RECURRING_CARRY_OVER) => Ok(Some(RecurringRule::CarryOver {
                max_carry_over: self.max_carry_over,
            })),
            Some(pocket_entity::RECURRING_PERCENTAGE) => Ok(Some(RecurringRule::Percentage {
                percentage: self.recurring_percentage.unwrap_or(0.0),
            })),
            Some(other) => Err(Error::Config {
                message: format!("Unknown recurring rule type in config: {other:?}"),
            }),
        }
    }
}

/// Loads template configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads template configuration from the default location (./config.toml).
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}

/// Seeds any configured template the owner does not already have, matching
/// by name against the owner's active templates. Returns how many templates
/// were created.
pub async fn seed_missing_templates(
    db: &DatabaseConnection,
    owner_id: &str,
    config: &Config,
) -> Result<usize> {
    let existing = pocket::fetch_active_templates(db, owner_id).await?;

    let mut created = 0;
    for entry in &config.templates {
        if existing.iter().any(|t| t.name == entry.name) {
            continue;
        }

        let rule = entry.recurring_rule()?;
        pocket::create_template(
            db,
            NewTemplate {
                owner_id: owner_id.to_string(),
                name: entry.name.clone(),
                color: entry.color.clone(),
                budget_type: entry.budget_type.clone(),
                pocket_type: entry.pocket_type.clone(),
                cycle_type: entry.cycle_type.clone(),
                budget_amount: entry.budget_amount,
                is_featured: entry.is_featured,
                auto_renew: entry.auto_renew,
                recurring_rule: rule,
            },
        )
        .await?;

        info!(owner_id, name = %entry.name, "seeded pocket template");
        created += 1;
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_test_db;

    fn sample_config() -> Config {
        toml::from_str(
            r##"
            [[templates]]
            name = "Groceries"
            budget_amount = 500.0
            recurring_type = "carry_over"
            max_carry_over = 50.0

            [[templates]]
            name = "Fun Money"
            budget_amount = 120.0
            color = "#ff5722"
            is_featured = true
            auto_renew = false
            recurring_type = "percentage"
            recurring_percentage = 25.0
        "##,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_template_config() {
        let config = sample_config();
        assert_eq!(config.templates.len(), 2);

        let groceries = &config.templates[0];
        assert_eq!(groceries.name, "Groceries");
        assert_eq!(groceries.budget_amount, 500.0);
        assert_eq!(groceries.color, "#9e9e9e");
        assert!(groceries.auto_renew);
        assert_eq!(
            groceries.recurring_rule().unwrap(),
            Some(RecurringRule::CarryOver {
                max_carry_over: Some(50.0)
            })
        );

        let fun = &config.templates[1];
        assert!(fun.is_featured);
        assert!(!fun.auto_renew);
        assert_eq!(
            fun.recurring_rule().unwrap(),
            Some(RecurringRule::Percentage { percentage: 25.0 })
        );
    }

    #[test]
    fn test_unknown_recurring_type_is_rejected() {
        let config: Config = toml::from_str(
            r#"
            [[templates]]
            name = "Broken"
            budget_amount = 10.0
            recurring_type = "compound"
        "#,
        )
        .unwrap();

        let result = config.templates[0].recurring_rule();
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }

    #[test]
    fn test_empty_config_parses() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.templates.is_empty());
    }

    #[tokio::test]
    async fn test_seed_missing_templates() -> Result<()> {
        let db = setup_test_db().await?;
        let config = sample_config();

        let created = seed_missing_templates(&db, "owner-1", &config).await?;
        assert_eq!(created, 2);

        // Seeding again creates nothing new.
        let created_again = seed_missing_templates(&db, "owner-1", &config).await?;
        assert_eq!(created_again, 0);

        let templates = pocket::fetch_active_templates(&db, "owner-1").await?;
        assert_eq!(templates.len(), 2);

        Ok(())
    }
}
