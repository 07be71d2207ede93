use crate::domain::granularity::{DEFAULT_GRANULARITY, Granularity};
use crate::domain::grid_layout::DEFAULT_EARLY_EXIT_SCORE;
use crate::domain::life_periods::LifeConstants;
use crate::infrastructure::error::InfraError;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CALENDAR_JSON: &str = "calendar.json";
const SUPPORTED_SCHEMA: u64 = 1;
const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarConfig {
    pub schema: u8,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_granularity")]
    pub default_granularity: Granularity,
    #[serde(default = "default_early_exit_score")]
    pub early_exit_score: Option<f64>,
    #[serde(default)]
    pub life_constants: LifeConstants,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            schema: SUPPORTED_SCHEMA as u8,
            timezone: default_timezone(),
            default_granularity: default_granularity(),
            early_exit_score: default_early_exit_score(),
            life_constants: LifeConstants::default(),
        }
    }
}

impl CalendarConfig {
    pub fn validate(&self) -> Result<(), InfraError> {
        self.parsed_timezone()?;
        self.life_constants
            .validate()
            .map_err(InfraError::InvalidConfig)?;
        if let Some(score) = self.early_exit_score {
            if !score.is_finite() || score < 0.0 {
                return Err(InfraError::InvalidConfig(
                    "earlyExitScore must be a non-negative number".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn parsed_timezone(&self) -> Result<Tz, InfraError> {
        parse_timezone(&self.timezone)
    }
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_granularity() -> Granularity {
    DEFAULT_GRANULARITY
}

fn default_early_exit_score() -> Option<f64> {
    Some(DEFAULT_EARLY_EXIT_SCORE)
}

pub fn parse_timezone(value: &str) -> Result<Tz, InfraError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Ok(Tz::UTC);
    }
    normalized
        .parse::<Tz>()
        .map_err(|_| InfraError::InvalidConfig(format!("unknown timezone `{normalized}`")))
}

pub fn ensure_default_config(config_dir: &Path) -> Result<(), InfraError> {
    fs::create_dir_all(config_dir)?;
    let path = config_dir.join(CALENDAR_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&CalendarConfig::default())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

pub fn load_config(config_dir: &Path) -> Result<CalendarConfig, InfraError> {
    let path = config_dir.join(CALENDAR_JSON);
    let raw = fs::read_to_string(&path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != SUPPORTED_SCHEMA {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }

    let config: CalendarConfig = serde_json::from_value(parsed)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, value: serde_json::Value) {
        fs::write(dir.join(CALENDAR_JSON), value.to_string()).expect("write config");
    }

    #[test]
    fn ensure_default_config_writes_loadable_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        ensure_default_config(dir.path()).expect("ensure defaults");
        let config = load_config(dir.path()).expect("load defaults");
        assert_eq!(config, CalendarConfig::default());
        assert_eq!(config.default_granularity, Granularity::Year);
        assert_eq!(config.early_exit_score, Some(3.0));
    }

    #[test]
    fn ensure_default_config_keeps_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config(
            dir.path(),
            serde_json::json!({ "schema": 1, "timezone": "Europe/Berlin" }),
        );
        ensure_default_config(dir.path()).expect("ensure defaults");
        let config = load_config(dir.path()).expect("load config");
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(
            config.parsed_timezone().expect("timezone"),
            chrono_tz::Europe::Berlin
        );
    }

    #[test]
    fn load_config_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config(
            dir.path(),
            serde_json::json!({
                "schema": 1,
                "defaultGranularity": "week",
                "earlyExitScore": null,
                "lifeConstants": { "totalLifeSpanYears": 90 }
            }),
        );
        let config = load_config(dir.path()).expect("load config");
        assert_eq!(config.default_granularity, Granularity::Week);
        assert_eq!(config.early_exit_score, None);
        assert_eq!(config.life_constants.total_life_span_years, 90);
        assert_eq!(config.life_constants.pregnancy_days, 280);
        assert_eq!(config.timezone, "UTC");
    }

    #[test]
    fn load_config_rejects_missing_or_unknown_schema() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config(dir.path(), serde_json::json!({ "timezone": "UTC" }));
        assert!(matches!(
            load_config(dir.path()),
            Err(InfraError::InvalidConfig(_))
        ));

        write_config(dir.path(), serde_json::json!({ "schema": 2 }));
        assert!(matches!(
            load_config(dir.path()),
            Err(InfraError::InvalidConfig(_))
        ));
    }

    #[test]
    fn load_config_rejects_unknown_timezone() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config(
            dir.path(),
            serde_json::json!({ "schema": 1, "timezone": "Mars/Olympus" }),
        );
        assert!(matches!(
            load_config(dir.path()),
            Err(InfraError::InvalidConfig(_))
        ));
    }

    #[test]
    fn load_config_rejects_inconsistent_life_constants() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config(
            dir.path(),
            serde_json::json!({ "schema": 1, "lifeConstants": { "totalLifeSpanYears": 60 } }),
        );
        assert!(matches!(
            load_config(dir.path()),
            Err(InfraError::InvalidConfig(_))
        ));
    }

    #[test]
    fn load_config_rejects_life_constants_that_overflow_months() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config(
            dir.path(),
            serde_json::json!({ "schema": 1, "lifeConstants": { "activeLifeSpanYears": 400_000_000u32 } }),
        );
        assert!(matches!(
            load_config(dir.path()),
            Err(InfraError::InvalidConfig(_))
        ));
    }

    #[test]
    fn load_config_reports_missing_file_as_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(load_config(dir.path()), Err(InfraError::Io(_))));
    }

    #[test]
    fn empty_timezone_means_utc() {
        assert_eq!(parse_timezone("  ").expect("utc"), Tz::UTC);
    }
}
