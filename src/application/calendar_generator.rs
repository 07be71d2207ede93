use crate::domain::granularity::{Granularity, GranularityProfile};
use crate::domain::grid_layout::best_factorization;
use crate::domain::life_periods::{LifeConstants, LifePeriodBoundaries};
use crate::domain::models::{CalendarItem, GridLayout, LifeCalendar, Phase};
use crate::infrastructure::error::InfraError;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::Arc;

pub type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarRequest {
    pub birth_date: NaiveDate,
    pub granularity: Granularity,
    pub width: f64,
    pub height: f64,
}

pub struct CalendarGenerator {
    constants: LifeConstants,
    timezone: Tz,
    now_provider: NowProvider,
}

impl CalendarGenerator {
    pub fn new(constants: LifeConstants) -> Self {
        Self {
            constants,
            timezone: Tz::UTC,
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.now_provider)()
            .with_timezone(&self.timezone)
            .date_naive()
    }

    pub fn generate(&self, request: &CalendarRequest) -> Result<LifeCalendar, InfraError> {
        generate(request, &self.constants, self.today())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Period {
    start: NaiveDate,
    end: NaiveDate,
    phase: Phase,
}

#[derive(Debug)]
struct LifespanWindow {
    periods: Vec<Period>,
    start: NaiveDate,
    end: NaiveDate,
}

/// Builds the calendar for `request` as seen on `today`. Width and height are
/// used as given.
pub fn generate(
    request: &CalendarRequest,
    constants: &LifeConstants,
    today: NaiveDate,
) -> Result<LifeCalendar, InfraError> {
    let profile = request.granularity.profile();
    constants.validate().map_err(InfraError::InvalidConfig)?;
    let boundaries = LifePeriodBoundaries::from_birth(request.birth_date, constants)
        .ok_or_else(|| out_of_range("life boundaries", request.birth_date))?;
    let window = lifespan_window(&profile, &boundaries)
        .ok_or_else(|| out_of_range("lifespan window", request.birth_date))?;

    let layout = choose_slack(request.width, request.height, window.periods.len(), &profile);
    log::debug!(
        "event=slack_selected granularity={} base_cells={} slack_before={} slack_after={} cols={} rows={} score={:.4}",
        request.granularity.as_str(),
        window.periods.len(),
        layout.slack_before,
        layout.slack_after,
        layout.cols,
        layout.rows,
        layout.score
    );

    let periods = extend_with_slack(&profile, window, &layout)
        .ok_or_else(|| out_of_range("slack periods", request.birth_date))?;

    Ok(LifeCalendar {
        granularity: request.granularity,
        birth_date: request.birth_date,
        items: annotate(periods, request.birth_date, today),
        layout,
    })
}

fn out_of_range(stage: &str, birth_date: NaiveDate) -> InfraError {
    InfraError::DateOutOfRange(format!("{stage} for birth date {birth_date}"))
}

fn lifespan_window(
    profile: &GranularityProfile,
    boundaries: &LifePeriodBoundaries,
) -> Option<LifespanWindow> {
    let window_start = profile.step_back(boundaries.birth(), profile.before)?;
    let mut periods = Vec::new();
    let mut start = window_start;

    loop {
        let end = profile.next(start)?;
        // A period takes the phase in effect on its last day.
        let phase = boundaries.classify(end.pred_opt()?);
        if phase.is_terminal() {
            break;
        }
        periods.push(Period { start, end, phase });
        start = end;
    }

    for _ in 0..profile.after {
        let end = profile.next(start)?;
        periods.push(Period {
            start,
            end,
            phase: Phase::AfterAfter,
        });
        start = end;
    }

    Some(LifespanWindow {
        periods,
        start: window_start,
        end: start,
    })
}

/// `(slack_before, slack_after)` pairs in evaluation order. The alternating
/// pass grows the leading side on even steps and the trailing side otherwise,
/// and stops growing a side at its maximum.
pub fn slack_trials(max_before: usize, max_after: usize) -> Vec<(usize, usize)> {
    let alternating = (max_before + max_after).max(1);
    let mut trials = Vec::with_capacity(alternating + max_before);
    let (mut before, mut after) = (0, 0);

    for step in 0..alternating {
        trials.push((before, after));
        if step % 2 == 0 && before < max_before {
            before += 1;
        } else if after < max_after {
            after += 1;
        }
    }

    for before in 0..max_before {
        trials.push((before, max_after));
    }
    trials
}

// First trial wins ties.
pub fn choose_slack(
    width: f64,
    height: f64,
    base_cells: usize,
    profile: &GranularityProfile,
) -> GridLayout {
    let mut best: Option<GridLayout> = None;
    for (before, after) in slack_trials(profile.slack_before, profile.slack_after) {
        let candidate =
            best_factorization(width, height, base_cells + before + after).with_slack(before, after);
        if best.is_none_or(|current| candidate.score < current.score) {
            best = Some(candidate);
        }
    }
    best.unwrap_or_else(|| best_factorization(width, height, base_cells))
}

fn extend_with_slack(
    profile: &GranularityProfile,
    window: LifespanWindow,
    layout: &GridLayout,
) -> Option<Vec<Period>> {
    let mut periods = Vec::with_capacity(
        window.periods.len() + layout.slack_before + layout.slack_after,
    );

    let mut cursor = window.start;
    for _ in 0..layout.slack_before {
        let start = profile.prev(cursor)?;
        periods.push(Period {
            start,
            end: cursor,
            phase: Phase::Before,
        });
        cursor = start;
    }
    periods.reverse();

    periods.extend(window.periods);

    let mut cursor = window.end;
    for _ in 0..layout.slack_after {
        let end = profile.next(cursor)?;
        periods.push(Period {
            start: cursor,
            end,
            phase: Phase::AfterAfter,
        });
        cursor = end;
    }
    Some(periods)
}

fn annotate(periods: Vec<Period>, birth_date: NaiveDate, today: NaiveDate) -> Vec<CalendarItem> {
    let mut totals: HashMap<Phase, usize> = HashMap::new();
    for period in &periods {
        *totals.entry(period.phase).or_insert(0) += 1;
    }

    let mut items = Vec::with_capacity(periods.len());
    let mut previous: Option<Phase> = None;
    let mut run_index = 0usize;
    for (index, period) in periods.into_iter().enumerate() {
        if previous == Some(period.phase) {
            run_index += 1;
        } else {
            run_index = 0;
        }
        previous = Some(period.phase);

        let total_in_phase = totals.get(&period.phase).copied().unwrap_or(1);
        items.push(CalendarItem {
            index,
            phase: period.phase,
            start: period.start,
            end: period.end,
            is_past: today >= period.end,
            is_birth: period.start <= birth_date && birth_date < period.end,
            is_now: period.start <= today && today < period.end,
            index_within_phase_run: run_index,
            total_in_phase,
            fraction: (run_index + 1) as f64 / total_in_phase as f64,
        });
    }
    items
}
