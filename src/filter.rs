//! Capital-expenditure range filter and its log-scale toggle.

use crate::data::FacilityRecord;

pub const CAP_EXP_MIN: u64 = 0;
pub const CAP_EXP_MAX: u64 = 10_000_000;
pub const CAP_EXP_STEP: u64 = 100_000;

/// Inclusive bounds on CAP_EXP. Always `CAP_EXP_MIN <= low <= high <= CAP_EXP_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapExpRange {
    low: u64,
    high: u64,
}

impl CapExpRange {
    pub fn new(low: u64, high: u64) -> Option<Self> {
        (low <= high && high <= CAP_EXP_MAX).then_some(Self { low, high })
    }

    pub fn full() -> Self {
        Self {
            low: CAP_EXP_MIN,
            high: CAP_EXP_MAX,
        }
    }

    pub fn low(&self) -> u64 {
        self.low
    }

    pub fn high(&self) -> u64 {
        self.high
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low as f64 <= value && value <= self.high as f64
    }
}

/// Keep the facilities whose CAP_EXP lies in `range`, in source order.
/// Facilities without a CAP_EXP value never match.
pub fn filter_by_capital_expenditure<'a, I>(records: I, range: CapExpRange) -> Vec<&'a FacilityRecord>
where
    I: IntoIterator<Item = &'a FacilityRecord>,
{
    records
        .into_iter()
        .filter(|r| r.capital_expenditure.is_some_and(|v| range.contains(v)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Low,
    High,
}

/// Input to the filter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterEvent {
    Increase,
    Decrease,
    JumpToMin,
    JumpToMax,
    Select(Handle),
    ToggleHandle,
    ToggleLogScale,
    Reset,
}

/// Two-handle slider plus checkbox. Never lets `low` pass `high`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterControl {
    range: CapExpRange,
    log_x: bool,
    active: Handle,
}

impl Default for FilterControl {
    fn default() -> Self {
        Self {
            range: CapExpRange::full(),
            log_x: false,
            active: Handle::Low,
        }
    }
}

impl FilterControl {
    pub fn range(&self) -> CapExpRange {
        self.range
    }

    pub fn log_x(&self) -> bool {
        self.log_x
    }

    pub fn active(&self) -> Handle {
        self.active
    }

    /// Apply one event. Returns true when the range or the toggle changed,
    /// i.e. when the filtered panel has to be rebuilt.
    pub fn apply(&mut self, event: FilterEvent) -> bool {
        let before = (self.range, self.log_x);
        let CapExpRange { low, high } = self.range;

        let moved = match (event, self.active) {
            (FilterEvent::Increase, Handle::Low) => Some(((low + CAP_EXP_STEP).min(high), high)),
            (FilterEvent::Increase, Handle::High) => {
                Some((low, (high + CAP_EXP_STEP).min(CAP_EXP_MAX)))
            }
            (FilterEvent::Decrease, Handle::Low) => {
                Some((low.saturating_sub(CAP_EXP_STEP).max(CAP_EXP_MIN), high))
            }
            (FilterEvent::Decrease, Handle::High) => {
                Some((low, high.saturating_sub(CAP_EXP_STEP).max(low)))
            }
            (FilterEvent::JumpToMin, Handle::Low) => Some((CAP_EXP_MIN, high)),
            (FilterEvent::JumpToMin, Handle::High) => Some((low, low)),
            (FilterEvent::JumpToMax, Handle::Low) => Some((high, high)),
            (FilterEvent::JumpToMax, Handle::High) => Some((low, CAP_EXP_MAX)),
            (FilterEvent::Select(handle), _) => {
                self.active = handle;
                None
            }
            (FilterEvent::ToggleHandle, active) => {
                self.active = match active {
                    Handle::Low => Handle::High,
                    Handle::High => Handle::Low,
                };
                None
            }
            (FilterEvent::ToggleLogScale, _) => {
                self.log_x = !self.log_x;
                None
            }
            (FilterEvent::Reset, _) => {
                *self = Self::default();
                None
            }
        };

        if let Some(range) = moved.and_then(|(low, high)| CapExpRange::new(low, high)) {
            self.range = range;
        }

        before != (self.range, self.log_x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// `id` rides in the net revenue field so rows stay identifiable.
    fn facility(id: u32, cap: Option<f64>) -> FacilityRecord {
        FacilityRecord {
            capital_expenditure: cap,
            net_revenue: Some(id.into()),
        }
    }

    fn ids(rows: &[&FacilityRecord]) -> Vec<f64> {
        rows.iter().filter_map(|r| r.net_revenue).collect()
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(CapExpRange::new(5, 4).is_none());
        assert!(CapExpRange::new(0, CAP_EXP_MAX + 1).is_none());
        assert_eq!(CapExpRange::new(0, CAP_EXP_MAX), Some(CapExpRange::full()));
    }

    #[test]
    fn test_filter_is_inclusive_and_stable() {
        let rows = vec![
            facility(3, Some(300_000.0)),
            facility(1, Some(100_000.0)),
            facility(0, None),
            facility(2, Some(200_000.0)),
            facility(4, Some(300_001.0)),
        ];
        let range = CapExpRange::new(100_000, 300_000).unwrap();
        assert_eq!(ids(&filter_by_capital_expenditure(&rows, range)), [3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_point_range_selects_equal_values() {
        let rows = vec![facility(1, Some(500_000.0)), facility(2, Some(600_000.0))];
        let range = CapExpRange::new(500_000, 500_000).unwrap();
        assert_eq!(ids(&filter_by_capital_expenditure(&rows, range)), [1.0]);

        let empty = CapExpRange::new(700_000, 700_000).unwrap();
        assert!(filter_by_capital_expenditure(&rows, empty).is_empty());
    }

    #[test]
    fn test_single_row_scenario() {
        let rows = vec![facility(1, Some(5_000_000.0))];
        assert_eq!(filter_by_capital_expenditure(&rows, CapExpRange::full()).len(), 1);
        let upper = CapExpRange::new(6_000_000, 10_000_000).unwrap();
        assert!(filter_by_capital_expenditure(&rows, upper).is_empty());
    }

    #[test]
    fn test_handles_never_cross() {
        let mut control = FilterControl::default();
        control.apply(FilterEvent::Select(Handle::High));
        assert!(control.apply(FilterEvent::JumpToMin));
        assert_eq!((control.range().low(), control.range().high()), (0, 0));
        assert!(!control.apply(FilterEvent::Decrease));

        control.apply(FilterEvent::Select(Handle::Low));
        assert!(!control.apply(FilterEvent::Increase));
        assert_eq!(control.range().low(), 0);

        control.apply(FilterEvent::ToggleHandle);
        assert_eq!(control.active(), Handle::High);
        control.apply(FilterEvent::Increase);
        control.apply(FilterEvent::ToggleHandle);
        assert!(control.apply(FilterEvent::JumpToMax));
        assert_eq!(control.range(), CapExpRange::new(CAP_EXP_STEP, CAP_EXP_STEP).unwrap());
    }

    #[test]
    fn test_steps_and_clamps_at_bounds() {
        let mut control = FilterControl::default();
        assert!(!control.apply(FilterEvent::Decrease));
        assert!(control.apply(FilterEvent::Increase));
        assert_eq!(control.range().low(), CAP_EXP_STEP);

        control.apply(FilterEvent::Select(Handle::High));
        assert!(!control.apply(FilterEvent::Increase));
        assert!(control.apply(FilterEvent::Decrease));
        assert_eq!(control.range().high(), CAP_EXP_MAX - CAP_EXP_STEP);
    }

    #[test]
    fn test_toggle_and_reset() {
        let mut control = FilterControl::default();
        assert!(control.apply(FilterEvent::ToggleLogScale));
        assert!(control.log_x());
        control.apply(FilterEvent::Increase);

        assert!(control.apply(FilterEvent::Reset));
        assert_eq!(control, FilterControl::default());
        assert!(!control.apply(FilterEvent::Reset));
        assert!(!control.apply(FilterEvent::Select(Handle::High)));
    }

    fn arb_rows() -> impl Strategy<Value = Vec<FacilityRecord>> {
        prop::collection::vec(
            prop::option::of(0u64..=12_000_000u64).prop_map(|v| v.map(|v| v as f64)),
            0..40,
        )
        .prop_map(|caps| {
            caps.into_iter()
                .enumerate()
                .map(|(i, cap)| facility(i as u32, cap))
                .collect()
        })
    }

    fn arb_range() -> impl Strategy<Value = CapExpRange> {
        (0u64..=CAP_EXP_MAX, 0u64..=CAP_EXP_MAX).prop_map(|(a, b)| {
            CapExpRange::new(a.min(b), a.max(b)).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_filter_matches_predicate(rows in arb_rows(), range in arb_range()) {
            let filtered = filter_by_capital_expenditure(&rows, range);
            let expected: Vec<&FacilityRecord> = rows
                .iter()
                .filter(|r| matches!(r.capital_expenditure,
                    Some(v) if range.low() as f64 <= v && v <= range.high() as f64))
                .collect();
            prop_assert_eq!(filtered, expected);
        }

        #[test]
        fn prop_filter_is_idempotent(rows in arb_rows(), range in arb_range()) {
            let once = filter_by_capital_expenditure(&rows, range);
            let twice = filter_by_capital_expenditure(once.iter().copied(), range);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_full_range_keeps_every_in_bounds_row(rows in arb_rows()) {
            let filtered = filter_by_capital_expenditure(&rows, CapExpRange::full());
            let in_bounds = rows
                .iter()
                .filter(|r| r.capital_expenditure.is_some_and(|v| v <= CAP_EXP_MAX as f64))
                .count();
            prop_assert_eq!(filtered.len(), in_bounds);
        }

        #[test]
        fn prop_control_never_emits_inverted_range(
            events in prop::collection::vec(0u8..8, 0..60)
        ) {
            let mut control = FilterControl::default();
            for e in events {
                let event = match e {
                    0 => FilterEvent::Increase,
                    1 => FilterEvent::Decrease,
                    2 => FilterEvent::JumpToMin,
                    3 => FilterEvent::JumpToMax,
                    4 => FilterEvent::ToggleHandle,
                    5 => FilterEvent::ToggleLogScale,
                    6 => FilterEvent::Select(Handle::High),
                    _ => FilterEvent::Select(Handle::Low),
                };
                control.apply(event);
                let range = control.range();
                prop_assert!(range.low() <= range.high());
                prop_assert!(range.high() <= CAP_EXP_MAX);
                prop_assert_eq!(range.low() % CAP_EXP_STEP, 0);
            }
        }
    }
}
