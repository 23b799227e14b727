//! Weekly grid coordinate system.
//!
//! The visible grid is a fixed matrix of `(day, time bucket)` coordinates.
//! Columns are teaching days in canonical order; rows are time-of-day buckets
//! generated from an operating window at a chosen granularity. The same
//! generator serves both the hour-granularity summary grid and the
//! half-hour-granularity interactive placement grid.

use crate::api::Day;
use crate::models::time::TimeOfDay;

/// First hour of the institution's operating window.
pub const OPEN_HOUR: u32 = 7;
/// Hour the operating window closes; no bucket starts at or after it.
pub const CLOSE_HOUR: u32 = 21;
/// Bucket granularity of the interactive placement grid.
pub const INTERACTIVE_GRANULARITY_MIN: u32 = 30;
/// Bucket granularity of the read-only summary grid.
pub const SUMMARY_GRANULARITY_MIN: u32 = 60;

/// The visible time window and bucket granularity of one grid rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    pub granularity_minutes: u32,
}

impl GridWindow {
    pub fn new(
        start_hour: u32,
        end_hour: u32,
        granularity_minutes: u32,
    ) -> Result<Self, String> {
        if start_hour >= end_hour {
            return Err(format!(
                "Grid window start hour {} must precede end hour {}",
                start_hour, end_hour
            ));
        }
        if end_hour > 24 {
            return Err(format!("Grid window end hour {} exceeds 24", end_hour));
        }
        if granularity_minutes == 0 {
            return Err("Grid granularity must be at least one minute".to_string());
        }
        Ok(Self {
            start_hour,
            end_hour,
            granularity_minutes,
        })
    }

    /// The half-hour interactive placement window.
    pub fn interactive() -> Self {
        Self {
            start_hour: OPEN_HOUR,
            end_hour: CLOSE_HOUR,
            granularity_minutes: INTERACTIVE_GRANULARITY_MIN,
        }
    }

    /// The hour-granularity summary window.
    pub fn summary() -> Self {
        Self {
            start_hour: OPEN_HOUR,
            end_hour: CLOSE_HOUR,
            granularity_minutes: SUMMARY_GRANULARITY_MIN,
        }
    }

    /// Number of buckets along the time axis.
    pub fn bucket_count(&self) -> usize {
        (((self.end_hour - self.start_hour) * 60) / self.granularity_minutes) as usize
    }

    /// Bucket coordinate of a time, or `None` when it falls outside the
    /// visible window.
    pub fn bucket_index(&self, time: TimeOfDay) -> Option<usize> {
        let minutes = time.minutes_from_midnight();
        let start = self.start_hour * 60;
        let end = self.end_hour * 60;
        if minutes < start || minutes >= end {
            return None;
        }
        Some(((minutes - start) / self.granularity_minutes) as usize)
    }

    /// Time at which a bucket starts, or `None` for an out-of-range index.
    pub fn bucket_time(&self, index: usize) -> Option<TimeOfDay> {
        if index >= self.bucket_count() {
            return None;
        }
        TimeOfDay::from_minutes(self.start_hour * 60 + index as u32 * self.granularity_minutes)
    }

    /// Iterator over the bucket start times of this window.
    pub fn time_slots(&self) -> TimeSlots {
        time_slots(self.start_hour, self.end_hour, self.granularity_minutes)
    }
}

/// Ordered subset of the teaching week matching a caller-supplied inclusion
/// set.
///
/// Output order is always the canonical Monday→Saturday order regardless of
/// the order days appear in `selection`.
pub fn generate_days(selection: &[Day]) -> Vec<Day> {
    Day::TEACHING_WEEK
        .iter()
        .copied()
        .filter(|day| selection.contains(day))
        .collect()
}

/// Lazy, finite, restartable sequence of bucket start times.
///
/// Yields times from `start_hour:00` up to but excluding `end_hour:00`,
/// stepping by `granularity_minutes`. Cloning restarts the sequence.
#[derive(Debug, Clone)]
pub struct TimeSlots {
    next_minutes: u32,
    end_minutes: u32,
    step_minutes: u32,
}

/// Construct the bucket start-time sequence for a window.
pub fn time_slots(start_hour: u32, end_hour: u32, granularity_minutes: u32) -> TimeSlots {
    TimeSlots {
        next_minutes: start_hour * 60,
        end_minutes: end_hour * 60,
        // A zero step would never terminate.
        step_minutes: granularity_minutes.max(1),
    }
}

impl Iterator for TimeSlots {
    type Item = TimeOfDay;

    fn next(&mut self) -> Option<TimeOfDay> {
        if self.next_minutes >= self.end_minutes {
            return None;
        }
        let time = TimeOfDay::from_minutes(self.next_minutes)?;
        self.next_minutes += self.step_minutes;
        Some(time)
    }
}

/// Number of grid buckets a `[start, end)` span occupies at a granularity.
///
/// Floor semantics, clamped so that a degenerate or malformed end time still
/// occupies one bucket rather than disappearing from the grid.
pub fn duration_in_buckets(start: TimeOfDay, end: TimeOfDay, granularity_minutes: u32) -> u32 {
    let step = granularity_minutes.max(1);
    let span = end
        .minutes_from_midnight()
        .saturating_sub(start.minutes_from_midnight());
    (span / step).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().expect("valid time literal")
    }

    #[test]
    fn test_interactive_window_yields_28_slots() {
        let slots: Vec<TimeOfDay> = time_slots(7, 21, 30).collect();
        assert_eq!(slots.len(), 28);
        assert_eq!(slots.first(), Some(&t("07:00")));
        assert_eq!(slots.last(), Some(&t("20:30")));
        for pair in slots.windows(2) {
            assert!(pair[0] < pair[1], "sequence must be strictly increasing");
        }
    }

    #[test]
    fn test_summary_window_yields_14_slots() {
        let slots: Vec<TimeOfDay> = GridWindow::summary().time_slots().collect();
        assert_eq!(slots.len(), 14);
        assert_eq!(slots.first(), Some(&t("07:00")));
        assert_eq!(slots.last(), Some(&t("20:00")));
    }

    #[test]
    fn test_time_slots_restartable() {
        let slots = time_slots(7, 21, 30);
        let first: Vec<TimeOfDay> = slots.clone().collect();
        let second: Vec<TimeOfDay> = slots.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_days_canonical_order() {
        let days = generate_days(&[Day::Friday, Day::Monday, Day::Wednesday]);
        assert_eq!(days, vec![Day::Monday, Day::Wednesday, Day::Friday]);
    }

    #[test]
    fn test_generate_days_excludes_sunday() {
        let days = generate_days(&[Day::Sunday, Day::Monday]);
        assert_eq!(days, vec![Day::Monday]);
    }

    #[test]
    fn test_generate_days_empty_selection() {
        assert!(generate_days(&[]).is_empty());
    }

    #[test]
    fn test_duration_in_buckets_exact_quotient() {
        assert_eq!(duration_in_buckets(t("09:00"), t("11:00"), 60), 2);
        assert_eq!(duration_in_buckets(t("09:00"), t("10:30"), 30), 3);
    }

    #[test]
    fn test_duration_in_buckets_floor() {
        assert_eq!(duration_in_buckets(t("09:00"), t("10:45"), 60), 1);
        assert_eq!(duration_in_buckets(t("09:00"), t("10:59"), 30), 3);
    }

    #[test]
    fn test_duration_in_buckets_never_below_one() {
        assert_eq!(duration_in_buckets(t("09:00"), t("09:00"), 30), 1);
        // Malformed span where the end precedes the start.
        assert_eq!(duration_in_buckets(t("09:00"), t("08:00"), 30), 1);
    }

    #[test]
    fn test_bucket_index_inside_window() {
        let window = GridWindow::interactive();
        assert_eq!(window.bucket_index(t("07:00")), Some(0));
        assert_eq!(window.bucket_index(t("07:30")), Some(1));
        assert_eq!(window.bucket_index(t("20:30")), Some(27));
    }

    #[test]
    fn test_bucket_index_outside_window() {
        let window = GridWindow::interactive();
        assert_eq!(window.bucket_index(t("05:00")), None);
        assert_eq!(window.bucket_index(t("06:59")), None);
        assert_eq!(window.bucket_index(t("21:00")), None);
    }

    #[test]
    fn test_bucket_time_inverse_of_index() {
        let window = GridWindow::summary();
        for index in 0..window.bucket_count() {
            let time = window.bucket_time(index).unwrap();
            assert_eq!(window.bucket_index(time), Some(index));
        }
        assert_eq!(window.bucket_time(window.bucket_count()), None);
    }

    #[test]
    fn test_window_validation() {
        assert!(GridWindow::new(7, 21, 30).is_ok());
        assert!(GridWindow::new(21, 7, 30).is_err());
        assert!(GridWindow::new(7, 25, 30).is_err());
        assert!(GridWindow::new(7, 21, 0).is_err());
    }

    #[test]
    fn test_bucket_counts() {
        assert_eq!(GridWindow::interactive().bucket_count(), 28);
        assert_eq!(GridWindow::summary().bucket_count(), 14);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_time_slots_strictly_increasing(
            start in 0u32..12,
            span in 1u32..12,
            step_idx in 0usize..3,
        ) {
            let step = [15u32, 30, 60][step_idx];
            let end = start + span;
            let slots: Vec<TimeOfDay> = time_slots(start, end, step).collect();
            prop_assert_eq!(slots.len() as u32, span * 60 / step);
            prop_assert_eq!(slots[0], TimeOfDay::from_hm(start, 0).unwrap());
            for pair in slots.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }

        #[test]
        fn prop_duration_at_least_one(
            start_min in 0u32..1380,
            len in 0u32..240,
            granularity in 1u32..120,
        ) {
            let start = TimeOfDay::from_minutes(start_min).unwrap();
            let end = TimeOfDay::from_minutes((start_min + len).min(1439)).unwrap();
            prop_assert!(duration_in_buckets(start, end, granularity) >= 1);
        }

        #[test]
        fn prop_duration_exact_when_quotient_divides(
            start_min in 0u32..1000,
            buckets in 1u32..6,
            g_idx in 0usize..3,
        ) {
            let granularity = [30u32, 60, 90][g_idx];
            let end_min = start_min + buckets * granularity;
            prop_assume!(end_min < 1440);
            let start = TimeOfDay::from_minutes(start_min).unwrap();
            let end = TimeOfDay::from_minutes(end_min).unwrap();
            prop_assert_eq!(duration_in_buckets(start, end, granularity), buckets);
        }
    }
}
