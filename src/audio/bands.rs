use crate::config::FRAME_SIZE;
use crate::error::CaptureError;

/// Reduces a magnitude spectrum to the displayed bars.
///
/// Deliberately a truncation: the lowest `bars` bins are taken directly, not
/// averaged or log-binned, because that is the visual characteristic of the
/// meter. Each bin is scaled by `sensitivity / (FRAME_SIZE / 2)`. Output is
/// unbounded here; clamping happens in the smoothing stage.
pub struct BandReducer {
    bars: usize,
    gain: f32,
}

impl BandReducer {
    pub fn new(bars: usize, sensitivity: f32) -> Self {
        Self {
            bars,
            gain: sensitivity / (FRAME_SIZE as f32 / 2.0),
        }
    }

    pub fn reduce(&self, spectrum: &[f32]) -> Result<Vec<f32>, CaptureError> {
        if spectrum.len() < self.bars {
            // The config invariant was violated upstream; never read past
            // the spectrum.
            return Err(CaptureError::InvalidConfig(format!(
                "{} bands requested but spectrum has only {} bins",
                self.bars,
                spectrum.len()
            )));
        }

        Ok(spectrum[..self.bars].iter().map(|&m| m * self.gain).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SPECTRUM_BINS;

    #[test]
    fn output_length_matches_band_count() {
        let reducer = BandReducer::new(16, 150.0);
        let bands = reducer.reduce(&vec![1.0; SPECTRUM_BINS]).unwrap();
        assert_eq!(bands.len(), 16);
        assert!(bands.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn scaling_is_sensitivity_over_half_frame() {
        let reducer = BandReducer::new(4, 100.0);
        let mut spectrum = vec![0.0; SPECTRUM_BINS];
        spectrum[2] = 512.0;

        let bands = reducer.reduce(&spectrum).unwrap();
        // 512 * 100 / 512 = 100; unbounded at this stage.
        assert!((bands[2] - 100.0).abs() < 1e-3);
        assert_eq!(bands[0], 0.0);
    }

    #[test]
    fn order_is_preserved() {
        let reducer = BandReducer::new(3, 512.0);
        let bands = reducer.reduce(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(bands, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn short_spectrum_is_a_config_error() {
        let reducer = BandReducer::new(8, 150.0);
        let result = reducer.reduce(&[0.0; 4]);
        assert!(matches!(result, Err(CaptureError::InvalidConfig(_))));
    }
}
