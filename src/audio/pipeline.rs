use super::bands::BandReducer;
use super::smoothing::SmoothingFilter;
use super::spectrum::SpectralFrameProcessor;
use super::BandFrame;
use crate::config::CaptureConfig;
use crate::error::CaptureError;

/// The per-frame processing chain, owned by the capture callback.
///
/// Runs synchronously in the delivery context, so every stage is bounded
/// and allocation-light. There is no shared state: the whole pipeline moves
/// into the callback closure and dies with the session.
pub struct FramePipeline {
    processor: SpectralFrameProcessor,
    reducer: BandReducer,
    filter: SmoothingFilter,
}

impl FramePipeline {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            processor: SpectralFrameProcessor::new(),
            reducer: BandReducer::new(config.bars, config.sensitivity),
            filter: SmoothingFilter::new(config.bars, config.smoothing),
        }
    }

    /// Raw frame in, smoothed and clamped bar values out.
    pub fn process(&mut self, frame: &[f32]) -> Result<BandFrame, CaptureError> {
        let spectrum = self.processor.process(frame)?;
        let bands = self.reducer.reduce(spectrum)?;
        Ok(BandFrame {
            bands: self.filter.apply(&bands),
        })
    }
}
