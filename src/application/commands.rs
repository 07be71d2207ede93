use crate::application::calendar_generator::{CalendarGenerator, CalendarRequest, NowProvider};
use crate::domain::granularity::Granularity;
use crate::domain::grid_layout::{default_search_window, search_nearby};
use crate::domain::models::{GridLayout, LifeCalendar};
use crate::infrastructure::config::{CalendarConfig, ensure_default_config, load_config};
use crate::infrastructure::error::InfraError;
use chrono::NaiveDate;
use std::path::Path;
use std::time::Instant;

const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";
// A week calendar has a few thousand cells.
pub const MAX_SUGGESTED_CELL_COUNT: usize = 100_000;

pub struct AppState {
    config: CalendarConfig,
    generator: CalendarGenerator,
}

impl AppState {
    pub fn new(config_dir: &Path) -> Result<Self, InfraError> {
        ensure_default_config(config_dir)?;
        Self::from_config(load_config(config_dir)?)
    }

    pub fn from_config(config: CalendarConfig) -> Result<Self, InfraError> {
        config.validate()?;
        let generator = CalendarGenerator::new(config.life_constants.clone())
            .with_timezone(config.parsed_timezone()?);
        Ok(Self { config, generator })
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.generator = self.generator.with_now_provider(now_provider);
        self
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn command_error(&self, command: &str, error: &InfraError) -> String {
        log::error!("event=command_failed command={command} error={error}");
        error.to_string()
    }
}

pub fn generate_calendar_impl(
    state: &AppState,
    birth_date: String,
    granularity: Option<String>,
    width: f64,
    height: f64,
) -> Result<LifeCalendar, InfraError> {
    let started = Instant::now();
    let birth_date = parse_birth_date(&birth_date)?;
    validate_dimension(width, "width")?;
    validate_dimension(height, "height")?;

    let granularity = granularity
        .as_deref()
        .map(Granularity::resolve)
        .unwrap_or(state.config.default_granularity);

    let calendar = state.generator.generate(&CalendarRequest {
        birth_date,
        granularity,
        width,
        height,
    })?;

    log::info!(
        "event=generate_calendar granularity={} items={} cols={} rows={} slack_before={} slack_after={} elapsed_ms={}",
        granularity.as_str(),
        calendar.items.len(),
        calendar.layout.cols,
        calendar.layout.rows,
        calendar.layout.slack_before,
        calendar.layout.slack_after,
        started.elapsed().as_millis()
    );
    Ok(calendar)
}

pub fn suggest_layout_impl(
    state: &AppState,
    width: f64,
    height: f64,
    cell_count: usize,
) -> Result<GridLayout, InfraError> {
    validate_dimension(width, "width")?;
    validate_dimension(height, "height")?;
    if cell_count == 0 || cell_count > MAX_SUGGESTED_CELL_COUNT {
        return Err(InfraError::InvalidInput(format!(
            "cell_count must be between 1 and {MAX_SUGGESTED_CELL_COUNT}"
        )));
    }

    let layout = search_nearby(
        width,
        height,
        cell_count,
        default_search_window(cell_count),
        state.config.early_exit_score,
    );
    log::info!(
        "event=suggest_layout requested={} chosen={} cols={} rows={} score={:.4}",
        cell_count,
        layout.cell_count(),
        layout.cols,
        layout.rows,
        layout.score
    );
    Ok(layout)
}

fn parse_birth_date(value: &str) -> Result<NaiveDate, InfraError> {
    NaiveDate::parse_from_str(value.trim(), BIRTH_DATE_FORMAT).map_err(|_| {
        InfraError::InvalidInput(format!("birth_date must be YYYY-MM-DD, got `{value}`"))
    })
}

fn validate_dimension(value: f64, field_name: &str) -> Result<(), InfraError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(InfraError::InvalidInput(format!(
            "{field_name} must be a positive number"
        )));
    }
    Ok(())
}
