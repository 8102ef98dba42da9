//! Tap-tempo estimation
//!
//! Converts the most recent taps of a "tap to the beat" button into a
//! beats-per-minute estimate. Only the last [`TAP_WINDOW`] taps are kept,
//! so the estimate follows the user when they change pace.

use std::collections::VecDeque;

use crate::{Error, Result};

/// Number of taps retained in the sliding window
pub const TAP_WINDOW: usize = 4;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Sliding-window tap tempo estimator
///
/// The estimate is a pure function of the retained timestamps:
/// `round(60000 / mean(consecutive intervals))`.
#[derive(Debug, Clone, Default)]
pub struct TapTempoEstimator {
    taps: VecDeque<i64>,
}

impl TapTempoEstimator {
    pub fn new() -> Self {
        Self {
            taps: VecDeque::with_capacity(TAP_WINDOW + 1),
        }
    }

    /// Record a tap at `timestamp_millis`, dropping the oldest tap once
    /// more than [`TAP_WINDOW`] have accumulated.
    pub fn record_tap(&mut self, timestamp_millis: i64) {
        self.taps.push_back(timestamp_millis);
        while self.taps.len() > TAP_WINDOW {
            self.taps.pop_front();
        }
    }

    /// Number of taps currently retained
    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }

    /// Retained taps, oldest first
    pub fn taps(&self) -> impl Iterator<Item = i64> + '_ {
        self.taps.iter().copied()
    }

    /// Forget all taps (e.g. when a different song is loaded)
    pub fn reset(&mut self) {
        self.taps.clear();
    }

    /// Current BPM estimate, or `None` when fewer than two taps exist or
    /// the retained taps cannot produce a positive tempo.
    pub fn current_estimate(&self) -> Option<u32> {
        self.estimate().ok()
    }

    /// Current BPM estimate with the reason for failure spelled out.
    pub fn estimate(&self) -> Result<u32> {
        if self.taps.len() < 2 {
            return Err(Error::InvalidTempoEstimate(format!(
                "need at least 2 taps, have {}",
                self.taps.len()
            )));
        }

        let mut total: i64 = 0;
        for (earlier, later) in self.taps.iter().zip(self.taps.iter().skip(1)) {
            let interval = later.checked_sub(*earlier).ok_or_else(|| {
                Error::InvalidTempoEstimate(format!(
                    "tap interval from {} to {} ms overflows",
                    earlier, later
                ))
            })?;
            if interval <= 0 {
                return Err(Error::InvalidTempoEstimate(format!(
                    "non-increasing tap interval of {} ms",
                    interval
                )));
            }
            total = total.checked_add(interval).ok_or_else(|| {
                Error::InvalidTempoEstimate("sum of tap intervals overflows".to_string())
            })?;
        }

        let intervals = (self.taps.len() - 1) as f64;
        let mean_interval = total as f64 / intervals;
        let bpm = (MILLIS_PER_MINUTE / mean_interval).round();

        if !bpm.is_finite() || bpm < 1.0 {
            return Err(Error::InvalidTempoEstimate(format!(
                "mean interval of {:.1} ms is too slow to measure",
                mean_interval
            )));
        }

        Ok(bpm as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator_with(taps: &[i64]) -> TapTempoEstimator {
        let mut estimator = TapTempoEstimator::new();
        for &tap in taps {
            estimator.record_tap(tap);
        }
        estimator
    }

    #[test]
    fn test_no_estimate_before_two_taps() {
        assert_eq!(estimator_with(&[]).current_estimate(), None);
        assert_eq!(estimator_with(&[1_000]).current_estimate(), None);
    }

    #[test]
    fn test_two_taps_half_second_apart_is_120_bpm() {
        assert_eq!(estimator_with(&[1_000, 1_500]).current_estimate(), Some(120));
    }

    #[test]
    fn test_estimate_uses_mean_of_intervals() {
        // Intervals 500, 600, 700 → mean 600 → 100 BPM
        let estimator = estimator_with(&[0, 500, 1_100, 1_800]);
        assert_eq!(estimator.current_estimate(), Some(100));
    }

    #[test]
    fn test_estimate_rounds_to_nearest() {
        // 60000 / 700 = 85.71
        assert_eq!(estimator_with(&[0, 700]).current_estimate(), Some(86));
        // 60000 / 461 = 130.15
        assert_eq!(estimator_with(&[0, 461]).current_estimate(), Some(130));
    }

    #[test]
    fn test_window_keeps_last_four_taps() {
        // First tap is far in the past; once dropped it no longer skews the mean
        let estimator = estimator_with(&[-10_000, 0, 500, 1_000, 1_500]);
        assert_eq!(estimator.tap_count(), TAP_WINDOW);
        assert_eq!(estimator.taps().collect::<Vec<_>>(), vec![0, 500, 1_000, 1_500]);
        assert_eq!(estimator.current_estimate(), Some(120));
    }

    #[test]
    fn test_never_retains_more_than_window() {
        let mut estimator = TapTempoEstimator::new();
        for i in 0..50 {
            estimator.record_tap(i * 250);
            assert!(estimator.tap_count() <= TAP_WINDOW);
        }
        assert_eq!(estimator.current_estimate(), Some(240));
    }

    #[test]
    fn test_identical_timestamps_yield_no_estimate() {
        let estimator = estimator_with(&[2_000, 2_000]);
        assert_eq!(estimator.current_estimate(), None);
        assert!(matches!(
            estimator.estimate(),
            Err(Error::InvalidTempoEstimate(_))
        ));
    }

    #[test]
    fn test_decreasing_timestamps_yield_no_estimate() {
        assert_eq!(estimator_with(&[2_000, 1_500]).current_estimate(), None);
        // Positive mean but one backwards step still invalidates the batch
        assert_eq!(
            estimator_with(&[0, 1_000, 900, 2_000]).current_estimate(),
            None
        );
    }

    #[test]
    fn test_very_slow_taps_do_not_round_to_zero() {
        assert_eq!(estimator_with(&[0, 200_000]).current_estimate(), None);
    }

    #[test]
    fn test_extreme_timestamps_yield_no_estimate() {
        let estimator = estimator_with(&[i64::MIN, 0]);
        assert_eq!(estimator.current_estimate(), None);
        assert!(matches!(estimator.estimate(), Err(Error::InvalidTempoEstimate(_))));

        // Each interval fits in i64 but their sum does not
        let estimator = estimator_with(&[i64::MIN, -1, i64::MAX - 1]);
        assert!(matches!(estimator.estimate(), Err(Error::InvalidTempoEstimate(_))));
    }

    #[test]
    fn test_reset_clears_window() {
        let mut estimator = estimator_with(&[0, 500, 1_000]);
        estimator.reset();
        assert_eq!(estimator.tap_count(), 0);
        assert_eq!(estimator.current_estimate(), None);
    }

    #[test]
    fn test_estimate_is_always_positive_for_increasing_taps() {
        for step in [1_i64, 7, 333, 500, 999, 4_321, 59_999] {
            let taps: Vec<i64> = (0..4).map(|i| 10_000 + i * step).collect();
            let bpm = estimator_with(&taps).current_estimate().unwrap();
            assert!(bpm > 0);
            assert_eq!(bpm, (60_000.0 / step as f64).round() as u32);
        }
    }
}
