//! Draft/applied filter pair.
//!
//! Input controls edit the draft freely; nothing reaches the fetch layer until
//! `apply` copies the draft over the applied filter.

use chrono::NaiveDate;

use crate::types::{DashboardFilters, Mode, Topic};

/// Partial draft update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub start_hour: Option<i32>,
    pub end_hour: Option<i32>,
    pub mode: Option<Mode>,
}

impl FilterPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    draft: DashboardFilters,
    applied: DashboardFilters,
}

impl FilterState {
    /// Both filters start as a full-day window on today's date.
    pub fn new(topic: Topic) -> Self {
        Self::with_defaults(DashboardFilters::today(topic))
    }

    pub fn with_defaults(defaults: DashboardFilters) -> Self {
        Self {
            draft: defaults.clone(),
            applied: defaults,
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.applied.topic
    }

    pub fn draft(&self) -> &DashboardFilters {
        &self.draft
    }

    pub fn applied(&self) -> &DashboardFilters {
        &self.applied
    }

    /// Merge `patch` into the draft. Values are taken as given, hours included.
    pub fn set_draft(&mut self, patch: FilterPatch) {
        if let Some(from_date) = patch.from_date {
            self.draft.from_date = from_date;
        }
        if let Some(to_date) = patch.to_date {
            self.draft.to_date = to_date;
        }
        if let Some(start_hour) = patch.start_hour {
            self.draft.start_hour = start_hour;
        }
        if let Some(end_hour) = patch.end_hour {
            self.draft.end_hour = end_hour;
        }
        if let Some(mode) = patch.mode {
            self.draft.mode = mode;
        }
    }

    /// Commit the draft and return the filter the next fetch must use.
    pub fn apply(&mut self) -> DashboardFilters {
        self.applied = self.draft.clone();
        self.applied.clone()
    }

    /// Rebind to another topic, resetting both filters to `defaults`.
    pub fn reset(&mut self, defaults: DashboardFilters) {
        *self = Self::with_defaults(defaults);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_initial_state_is_full_day_today() {
        let state = FilterState::new(Topic::Politics);
        let today = chrono::Local::now().date_naive();
        assert_eq!(state.draft(), state.applied());
        assert_eq!(state.applied().topic, Topic::Politics);
        assert_eq!(state.applied().from_date, today);
        assert_eq!(state.applied().to_date, today);
        assert_eq!(state.applied().start_hour, 0);
        assert_eq!(state.applied().end_hour, 23);
        assert_eq!(state.applied().mode, Mode::Historical);
    }

    #[test]
    fn test_set_draft_does_not_touch_applied() {
        let mut state = FilterState::with_defaults(DashboardFilters::for_day(Topic::Travel, day(2024, 5, 1)));
        let before = state.applied().clone();

        state.set_draft(FilterPatch {
            from_date: Some(day(2024, 4, 1)),
            mode: Some(Mode::Realtime),
            ..Default::default()
        });

        assert_eq!(state.applied(), &before);
        assert_eq!(state.draft().from_date, day(2024, 4, 1));
        assert_eq!(state.draft().to_date, day(2024, 5, 1));
        assert_eq!(state.draft().mode, Mode::Realtime);
    }

    #[test]
    fn test_apply_copies_draft() {
        let mut state = FilterState::with_defaults(DashboardFilters::for_day(Topic::Sports, day(2024, 5, 1)));
        state.set_draft(FilterPatch {
            start_hour: Some(8),
            end_hour: Some(20),
            ..Default::default()
        });

        let applied = state.apply();
        assert_eq!(applied.start_hour, 8);
        assert_eq!(applied.end_hour, 20);
        assert_eq!(state.applied(), state.draft());

        // Later draft edits stay out of the applied copy.
        state.set_draft(FilterPatch {
            start_hour: Some(12),
            ..Default::default()
        });
        assert_eq!(state.applied().start_hour, 8);
    }

    #[test]
    fn test_out_of_range_hours_are_kept() {
        let mut state = FilterState::new(Topic::Cinema);
        state.set_draft(FilterPatch {
            start_hour: Some(-3),
            end_hour: Some(42),
            ..Default::default()
        });
        let applied = state.apply();
        assert_eq!(applied.start_hour, -3);
        assert_eq!(applied.end_hour, 42);
    }

    #[test]
    fn test_reset_rebinds_topic() {
        let mut state = FilterState::new(Topic::Travel);
        state.set_draft(FilterPatch {
            end_hour: Some(5),
            ..Default::default()
        });
        state.reset(DashboardFilters::for_day(Topic::Sports, day(2024, 1, 2)));
        assert_eq!(state.topic(), &Topic::Sports);
        assert_eq!(state.draft().end_hour, 23);
        assert!(FilterPatch::default().is_empty());
    }
}
