pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::calendar_generator::{
    CalendarGenerator, CalendarRequest, NowProvider, choose_slack, generate, slack_trials,
};
pub use application::commands::{
    AppState, MAX_SUGGESTED_CELL_COUNT, generate_calendar_impl, suggest_layout_impl,
};
pub use domain::granularity::{DEFAULT_GRANULARITY, Granularity, GranularityProfile};
pub use domain::grid_layout::{
    DEFAULT_EARLY_EXIT_SCORE, best_factorization, default_search_window, search_nearby,
};
pub use domain::life_periods::{LifeConstants, LifePeriodBoundaries};
pub use domain::models::{CalendarItem, CellRect, GridLayout, LifeCalendar, Phase};
pub use infrastructure::config::{CalendarConfig, ensure_default_config, load_config};
pub use infrastructure::error::InfraError;
pub use infrastructure::logging::{init_logging, logging_status};

pub fn generate_calendar(
    state: &AppState,
    birth_date: String,
    granularity: Option<String>,
    width: f64,
    height: f64,
) -> Result<LifeCalendar, String> {
    generate_calendar_impl(state, birth_date, granularity, width, height)
        .map_err(|error| state.command_error("generate_calendar", &error))
}

pub fn suggest_layout(
    state: &AppState,
    width: f64,
    height: f64,
    cell_count: usize,
) -> Result<GridLayout, String> {
    suggest_layout_impl(state, width, height, cell_count)
        .map_err(|error| state.command_error("suggest_layout", &error))
}
