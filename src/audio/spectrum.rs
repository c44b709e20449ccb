use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::config::{FRAME_SIZE, SPECTRUM_BINS};
use crate::error::CaptureError;

/// Transforms one raw mono frame into per-bin magnitudes.
///
/// Rectangular window: samples go into the FFT as-is. The output covers the
/// non-negative frequencies only (`FRAME_SIZE / 2 + 1` bins). Scratch
/// buffers are reused across frames so the hot path does not allocate.
pub struct SpectralFrameProcessor {
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
}

impl SpectralFrameProcessor {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(FRAME_SIZE),
            buffer: vec![Complex::new(0.0, 0.0); FRAME_SIZE],
            magnitudes: vec![0.0; SPECTRUM_BINS],
        }
    }

    /// Process exactly one frame of `FRAME_SIZE` samples.
    ///
    /// Any other length means the backend broke its blocksize contract, so
    /// it is reported rather than padded or truncated.
    pub fn process(&mut self, frame: &[f32]) -> Result<&[f32], CaptureError> {
        if frame.len() != FRAME_SIZE {
            return Err(CaptureError::StreamFault(format!(
                "expected {} samples per frame, got {}",
                FRAME_SIZE,
                frame.len()
            )));
        }

        for (slot, &sample) in self.buffer.iter_mut().zip(frame) {
            *slot = Complex::new(sample, 0.0);
        }

        self.fft.process(&mut self.buffer);

        for (magnitude, bin) in self.magnitudes.iter_mut().zip(&self.buffer) {
            *magnitude = bin.norm();
        }

        Ok(&self.magnitudes)
    }
}

impl Default for SpectralFrameProcessor {
    fn default() -> Self {
        Self::new()
    }
}
