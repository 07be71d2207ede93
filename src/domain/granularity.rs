use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GRANULARITY: Granularity = Granularity::Year;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Week,
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim();
        if normalized.eq_ignore_ascii_case("week") {
            Some(Self::Week)
        } else if normalized.eq_ignore_ascii_case("month") {
            Some(Self::Month)
        } else if normalized.eq_ignore_ascii_case("year") {
            Some(Self::Year)
        } else {
            None
        }
    }

    pub fn resolve(value: &str) -> Self {
        Self::parse(value).unwrap_or_else(|| {
            log::warn!(
                "event=granularity_fallback requested={} resolved={}",
                value.trim(),
                DEFAULT_GRANULARITY.as_str()
            );
            DEFAULT_GRANULARITY
        })
    }

    pub fn profile(self) -> GranularityProfile {
        match self {
            Self::Week => GranularityProfile {
                granularity: self,
                before: 60,
                after: 72,
                slack_before: 30,
                slack_after: 50,
            },
            Self::Month => GranularityProfile {
                granularity: self,
                before: 12,
                after: 24,
                slack_before: 10,
                slack_after: 16,
            },
            Self::Year => GranularityProfile {
                granularity: self,
                before: 3,
                after: 4,
                slack_before: 3,
                slack_after: 7,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GranularityProfile {
    pub granularity: Granularity,
    pub before: usize,
    pub after: usize,
    pub slack_before: usize,
    pub slack_after: usize,
}

impl GranularityProfile {
    /// Start of the period containing `date`.
    ///
    /// Weeks start on Monday; years start on Jan 1 for dates before July and
    /// on Jul 1 otherwise.
    pub fn first(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.granularity {
            Granularity::Week => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(offset))
            }
            Granularity::Month => date.with_day(1),
            Granularity::Year => {
                let month = if date.month() < 7 { 1 } else { 7 };
                NaiveDate::from_ymd_opt(date.year(), month, 1)
            }
        }
    }

    pub fn next(&self, date: NaiveDate) -> Option<NaiveDate> {
        let start = self.first(date)?;
        match self.granularity {
            Granularity::Week => start.checked_add_days(Days::new(7)),
            Granularity::Month => start.checked_add_months(Months::new(1)),
            Granularity::Year => start.checked_add_months(Months::new(12)),
        }
    }

    pub fn prev(&self, date: NaiveDate) -> Option<NaiveDate> {
        let start = self.first(date)?;
        match self.granularity {
            Granularity::Week => start.checked_sub_days(Days::new(7)),
            Granularity::Month => start.checked_sub_months(Months::new(1)),
            Granularity::Year => start.checked_sub_months(Months::new(12)),
        }
    }

    pub fn step_back(&self, date: NaiveDate, count: usize) -> Option<NaiveDate> {
        let mut cursor = self.first(date)?;
        for _ in 0..count {
            cursor = self.prev(cursor)?;
        }
        Some(cursor)
    }
}
