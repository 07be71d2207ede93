use crate::domain::models::Phase;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LifeConstants {
    pub pregnancy_days: u32,
    pub active_life_span_years: u32,
    pub total_life_span_years: u32,
    /// Centered on the end of the active life span.
    pub decline_transition_years: u32,
    pub death_transition_years: u32,
    pub after_death_years: u32,
}

impl Default for LifeConstants {
    fn default() -> Self {
        Self {
            pregnancy_days: 280,
            active_life_span_years: 67,
            total_life_span_years: 84,
            decline_transition_years: 6,
            death_transition_years: 3,
            after_death_years: 2,
        }
    }
}

struct LifespanMonths {
    active_end: u32,
    decline_transition_end: u32,
    decline_end: u32,
    death: u32,
    after_end: u32,
}

impl LifeConstants {
    pub fn validate(&self) -> Result<(), String> {
        self.lifespan_months().map(|_| ())
    }

    fn lifespan_months(&self) -> Result<LifespanMonths, String> {
        let overflow = || "life constants are too large to convert to months".to_string();
        let half_transition = self
            .decline_transition_years
            .checked_mul(6)
            .ok_or_else(overflow)?;
        let active = self.active_life_span_years.checked_mul(12).ok_or_else(overflow)?;
        let total = self.total_life_span_years.checked_mul(12).ok_or_else(overflow)?;
        let death_transition = self
            .death_transition_years
            .checked_mul(12)
            .ok_or_else(overflow)?;
        let after_death = self.after_death_years.checked_mul(12).ok_or_else(overflow)?;

        let active_end = active.checked_sub(half_transition).ok_or_else(|| {
            "life.decline_transition_years must fit inside the active life span".to_string()
        })?;
        let decline_transition_end = active.checked_add(half_transition).ok_or_else(overflow)?;
        let decline_end = total
            .checked_sub(death_transition)
            .filter(|start| *start >= decline_transition_end)
            .ok_or_else(|| {
                "life.total_life_span_years must leave room for both transitions".to_string()
            })?;
        let after_end = total.checked_add(after_death).ok_or_else(overflow)?;

        Ok(LifespanMonths {
            active_end,
            decline_transition_end,
            decline_end,
            death: total,
            after_end,
        })
    }
}

// Exclusive upper bounds of every bounded phase, in lifespan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifePeriodBoundaries {
    birth: NaiveDate,
    bounds: [(Phase, NaiveDate); 7],
}

impl LifePeriodBoundaries {
    pub fn from_birth(birth: NaiveDate, constants: &LifeConstants) -> Option<Self> {
        let months = constants.lifespan_months().ok()?;
        let after = |count: u32| birth.checked_add_months(Months::new(count));

        let conception = birth.checked_sub_days(Days::new(u64::from(constants.pregnancy_days)))?;
        let active_end = after(months.active_end)?;
        let decline_transition_end = after(months.decline_transition_end)?;
        let decline_end = after(months.decline_end)?;
        let death = after(months.death)?;
        let after_end = after(months.after_end)?;

        Some(Self {
            birth,
            bounds: [
                (Phase::Before, conception),
                (Phase::Pregnancy, birth),
                (Phase::Life, active_end),
                (Phase::TransitionLifeDecline, decline_transition_end),
                (Phase::Decline, decline_end),
                (Phase::TransitionDeclineAfter, death),
                (Phase::After, after_end),
            ],
        })
    }

    pub fn birth(&self) -> NaiveDate {
        self.birth
    }

    pub fn conception(&self) -> NaiveDate {
        self.bounds[0].1
    }

    pub fn death(&self) -> NaiveDate {
        self.bounds[5].1
    }

    /// Exclusive end of `phase`, or `None` for the terminal phase.
    pub fn end_of(&self, phase: Phase) -> Option<NaiveDate> {
        self.bounds
            .iter()
            .find(|(candidate, _)| *candidate == phase)
            .map(|(_, end)| *end)
    }

    pub fn classify(&self, date: NaiveDate) -> Phase {
        self.bounds
            .iter()
            .find(|(_, end)| *end > date)
            .map(|(phase, _)| *phase)
            .unwrap_or(Phase::AfterAfter)
    }
}
