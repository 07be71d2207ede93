use crate::domain::granularity::Granularity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Before,
    Pregnancy,
    Life,
    TransitionLifeDecline,
    Decline,
    TransitionDeclineAfter,
    After,
    AfterAfter,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::Before,
        Phase::Pregnancy,
        Phase::Life,
        Phase::TransitionLifeDecline,
        Phase::Decline,
        Phase::TransitionDeclineAfter,
        Phase::After,
        Phase::AfterAfter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::Pregnancy => "pregnancy",
            Self::Life => "life",
            Self::TransitionLifeDecline => "transition_life_decline",
            Self::Decline => "decline",
            Self::TransitionDeclineAfter => "transition_decline_after",
            Self::After => "after",
            Self::AfterAfter => "after_after",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::AfterAfter
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarItem {
    pub index: usize,
    #[serde(rename = "type")]
    pub phase: Phase,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub is_past: bool,
    pub is_birth: bool,
    pub is_now: bool,
    pub index_within_phase_run: usize,
    pub total_in_phase: usize,
    pub fraction: f64,
}

impl CalendarItem {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.end <= self.start {
            return Err("item.end must be after item.start".to_string());
        }
        if self.total_in_phase == 0 {
            return Err("item.total_in_phase must be > 0".to_string());
        }
        if self.index_within_phase_run >= self.total_in_phase {
            return Err("item.index_within_phase_run must be < item.total_in_phase".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    pub cell_width: f64,
    pub cell_height: f64,
    pub cols: usize,
    pub rows: usize,
    pub score: f64,
    pub slack_before: usize,
    pub slack_after: usize,
}

impl GridLayout {
    pub fn empty() -> Self {
        Self {
            cell_width: 0.0,
            cell_height: 0.0,
            cols: 0,
            rows: 0,
            score: f64::INFINITY,
            slack_before: 0,
            slack_after: 0,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    pub fn with_slack(self, slack_before: usize, slack_after: usize) -> Self {
        Self {
            slack_before,
            slack_after,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CellRect {
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LifeCalendar {
    pub granularity: Granularity,
    pub birth_date: NaiveDate,
    pub items: Vec<CalendarItem>,
    pub layout: GridLayout,
}

impl LifeCalendar {
    pub fn cell_rect(&self, index: usize) -> Option<CellRect> {
        if index >= self.items.len() || self.layout.cols == 0 {
            return None;
        }
        let row = index / self.layout.cols;
        let col = index % self.layout.cols;
        Some(CellRect {
            row,
            col,
            x: col as f64 * self.layout.cell_width,
            y: row as f64 * self.layout.cell_height,
            width: self.layout.cell_width,
            height: self.layout.cell_height,
        })
    }

    pub fn birth_item(&self) -> Option<&CalendarItem> {
        self.items.iter().find(|item| item.is_birth)
    }

    pub fn now_item(&self) -> Option<&CalendarItem> {
        self.items.iter().find(|item| item.is_now)
    }

    pub fn count_of(&self, phase: Phase) -> usize {
        self.items.iter().filter(|item| item.phase == phase).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
    }

    fn sample_item() -> CalendarItem {
        CalendarItem {
            index: 4,
            phase: Phase::Life,
            start: date("1990-01-01"),
            end: date("1991-01-01"),
            is_past: true,
            is_birth: true,
            is_now: false,
            index_within_phase_run: 0,
            total_in_phase: 64,
            fraction: 1.0 / 64.0,
        }
    }

    fn sample_calendar() -> LifeCalendar {
        let mut items = Vec::new();
        for index in 0..6 {
            let mut item = sample_item();
            item.index = index;
            items.push(item);
        }
        LifeCalendar {
            granularity: Granularity::Year,
            birth_date: date("1990-06-15"),
            items,
            layout: GridLayout {
                cell_width: 40.0,
                cell_height: 30.0,
                cols: 3,
                rows: 2,
                score: 10.0,
                slack_before: 0,
                slack_after: 0,
            },
        }
    }

    #[test]
    fn phases_are_ordered_along_the_lifespan() {
        let mut sorted = Phase::ALL;
        sorted.sort();
        assert_eq!(sorted, Phase::ALL);
        assert!(Phase::Before < Phase::Pregnancy);
        assert!(Phase::After < Phase::AfterAfter);
        assert!(Phase::AfterAfter.is_terminal());
        assert!(!Phase::After.is_terminal());
    }

    #[test]
    fn phase_serde_names_match_as_str() {
        for phase in Phase::ALL {
            let encoded = serde_json::to_string(&phase).expect("serialize phase");
            assert_eq!(encoded, format!("\"{}\"", phase.as_str()));
        }
    }

    #[test]
    fn item_contains_is_half_open() {
        let item = sample_item();
        assert!(item.contains(date("1990-01-01")));
        assert!(item.contains(date("1990-12-31")));
        assert!(!item.contains(date("1991-01-01")));
        assert!(!item.contains(date("1989-12-31")));
    }

    #[test]
    fn item_validate_rejects_empty_period() {
        let mut item = sample_item();
        assert!(item.validate().is_ok());
        item.end = item.start;
        assert!(item.validate().is_err());
    }

    #[test]
    fn item_validate_rejects_run_index_past_total() {
        let mut item = sample_item();
        item.index_within_phase_run = 64;
        assert!(item.validate().is_err());
    }

    #[test]
    fn item_serializes_with_renderer_field_names() {
        let value = serde_json::to_value(sample_item()).expect("serialize item");
        assert_eq!(value["type"], "life");
        assert_eq!(value["start"], "1990-01-01");
        assert_eq!(value["isBirth"], true);
        assert_eq!(value["indexWithinPhaseRun"], 0);
        assert_eq!(value["totalInPhase"], 64);
    }

    #[test]
    fn cell_rect_follows_row_major_order() {
        let calendar = sample_calendar();
        let rect = calendar.cell_rect(4).expect("cell exists");
        assert_eq!((rect.row, rect.col), (1, 1));
        assert_eq!(rect.x, 40.0);
        assert_eq!(rect.y, 30.0);
        assert!(calendar.cell_rect(6).is_none());
    }

    #[test]
    fn empty_layout_has_no_cells() {
        let layout = GridLayout::empty();
        assert_eq!(layout.cell_count(), 0);
        assert!(layout.score.is_infinite());
    }

    #[test]
    fn calendar_supports_serde_roundtrip() {
        let calendar = sample_calendar();
        let roundtrip: LifeCalendar =
            serde_json::from_str(&serde_json::to_string(&calendar).expect("serialize calendar"))
                .expect("deserialize calendar");
        assert_eq!(roundtrip, calendar);
    }
}
