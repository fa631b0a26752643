//! Cosmetic progress shown while an analysis request is in flight.
//!
//! The value is not derived from upload or analysis progress. It climbs in
//! random steps toward [`PROGRESS_CEILING`] and only reaches 100 when the
//! result arrives.

use std::time::Duration;

use rand::Rng;

/// Highest value reached before the analysis completes.
pub const PROGRESS_CEILING: f64 = 90.0;
/// Value at which the waiting screen switches from loading to analyzing.
pub const ANALYZING_THRESHOLD: f64 = 30.0;
/// Interval between progress increments.
pub const PROGRESS_TICK: Duration = Duration::from_millis(500);
const MIN_STEP: f64 = 3.0;
const MAX_STEP: f64 = 11.0;

/// Step marker shown on the waiting screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    /// Uploading the file.
    Loading,
    /// Waiting for the analysis.
    Analyzing,
    /// Result received.
    Finished,
}

impl ProgressStage {
    /// Zero-based position among the three markers.
    pub fn index(self) -> usize {
        match self {
            Self::Loading => 0,
            Self::Analyzing => 1,
            Self::Finished => 2,
        }
    }

    /// Status line for the waiting screen.
    pub fn label(self) -> &'static str {
        match self {
            Self::Loading => "Uploading file...",
            Self::Analyzing => "Analyzing dataset...",
            Self::Finished => "Analysis complete!",
        }
    }
}

/// Monotonic simulated progress in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulatedProgress {
    value: f64,
}

impl SimulatedProgress {
    /// Start at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current percentage.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Add a random step, never passing [`PROGRESS_CEILING`].
    pub fn advance<R: Rng>(&mut self, rng: &mut R) {
        if self.is_finished() {
            return;
        }
        let step = rng.gen_range(MIN_STEP..MAX_STEP);
        self.value = (self.value + step).min(PROGRESS_CEILING).max(self.value);
    }

    /// Jump to 100.
    pub fn finish(&mut self) {
        self.value = 100.0;
    }

    /// Whether [`finish`](Self::finish) was called.
    pub fn is_finished(&self) -> bool {
        self.value >= 100.0
    }

    /// Marker for the waiting screen.
    pub fn stage(&self) -> ProgressStage {
        if self.is_finished() {
            ProgressStage::Finished
        } else if self.value < ANALYZING_THRESHOLD {
            ProgressStage::Loading
        } else {
            ProgressStage::Analyzing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn advances_monotonically_and_caps_below_one_hundred() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut progress = SimulatedProgress::new();
        let mut previous = progress.value();
        for _ in 0..100 {
            progress.advance(&mut rng);
            assert!(progress.value() >= previous);
            assert!(progress.value() <= PROGRESS_CEILING);
            previous = progress.value();
        }
        assert_eq!(progress.value(), PROGRESS_CEILING);
        assert!(!progress.is_finished());
    }

    #[test]
    fn each_step_is_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut progress = SimulatedProgress::new();
        progress.advance(&mut rng);
        assert!(progress.value() >= MIN_STEP);
        assert!(progress.value() < MAX_STEP);
    }

    #[test]
    fn finish_reaches_one_hundred_and_stops_advancing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut progress = SimulatedProgress::new();
        progress.finish();
        progress.advance(&mut rng);
        assert_eq!(progress.value(), 100.0);
        assert_eq!(progress.stage(), ProgressStage::Finished);
    }

    #[test]
    fn stage_follows_thresholds() {
        let mut progress = SimulatedProgress::new();
        assert_eq!(progress.stage(), ProgressStage::Loading);
        progress.value = ANALYZING_THRESHOLD;
        assert_eq!(progress.stage(), ProgressStage::Analyzing);
        assert_eq!(progress.stage().index(), 1);
        progress.value = PROGRESS_CEILING;
        assert_eq!(progress.stage(), ProgressStage::Analyzing);
    }
}
