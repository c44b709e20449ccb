use tracing::warn;

/// Exponential smoothing over successive band vectors.
///
/// One instance per session; the smoothed state is owned here and mutated
/// only from the capture context. Pre-clamp state may exceed 1.0; the
/// returned values are always clamped to the unit interval.
pub struct SmoothingFilter {
    smoothing: f32,
    state: Vec<f32>,
}

impl SmoothingFilter {
    pub fn new(bars: usize, smoothing: f32) -> Self {
        Self {
            smoothing,
            state: vec![0.0; bars],
        }
    }

    /// Fold one band vector into the smoothed state and return the clamped
    /// display values.
    ///
    /// A length mismatch means a reconfiguration bypassed the reset path;
    /// the state is zeroed to the new length before the update so the
    /// transitional frame behaves like the first frame of a fresh session.
    pub fn apply(&mut self, bands: &[f32]) -> Vec<f32> {
        if bands.len() != self.state.len() {
            warn!(
                expected = self.state.len(),
                got = bands.len(),
                "band vector length changed without reset, zeroing smoothed state"
            );
            self.state = vec![0.0; bands.len()];
        }

        for (state, &new) in self.state.iter_mut().zip(bands) {
            *state = *state * self.smoothing + new * (1.0 - self.smoothing);
        }

        self.state.iter().map(|&v| v.clamp(0.0, 1.0)).collect()
    }

    #[cfg(test)]
    fn state_len(&self) -> usize {
        self.state.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_zero_state() {
        let mut filter = SmoothingFilter::new(3, 0.5);
        let out = filter.apply(&[0.4, 0.8, 0.2]);
        assert_eq!(out, vec![0.2, 0.4, 0.1]);
    }

    #[test]
    fn zero_smoothing_is_clamped_pass_through() {
        let mut filter = SmoothingFilter::new(2, 0.0);
        for _ in 0..3 {
            let out = filter.apply(&[0.3, 1.7]);
            assert_eq!(out, vec![0.3, 1.0]);
        }
    }

    #[test]
    fn high_smoothing_bounds_the_change_per_step() {
        let smoothing = 0.95;
        let mut filter = SmoothingFilter::new(1, smoothing);
        let mut previous = 0.0f32;
        for _ in 0..20 {
            let out = filter.apply(&[1.0])[0];
            // Each step moves at most (1 - smoothing) of the remaining gap.
            assert!((out - previous).abs() <= (1.0 - smoothing) + 1e-6);
            assert!(out >= previous);
            previous = out;
        }
        assert!(previous < 1.0);
    }

    #[test]
    fn length_mismatch_triggers_defensive_reset() {
        let mut filter = SmoothingFilter::new(4, 0.5);
        filter.apply(&[0.4; 4]);

        // Band count changed without going through reset(): state is zeroed
        // first, so the transitional update equals (1 - smoothing) * input.
        let out = filter.apply(&[0.4; 6]);
        assert_eq!(filter.state_len(), 6);
        assert_eq!(out, vec![0.2; 6]);
    }

    #[test]
    fn output_is_clamped_but_state_is_not() {
        let mut filter = SmoothingFilter::new(1, 0.5);
        assert_eq!(filter.apply(&[4.0]), vec![1.0]);
        // Pre-clamp state is 2.0, so a zero input still reads full scale.
        assert_eq!(filter.apply(&[0.0]), vec![1.0]);
        // And decays visibly the step after.
        assert_eq!(filter.apply(&[0.0]), vec![0.5]);
    }
}
