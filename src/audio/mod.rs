mod bands;
mod devices;
mod pipeline;
mod scheduler;
mod smoothing;
mod spectrum;

pub use devices::{list_input_devices, DeviceInfo};
pub use scheduler::CaptureScheduler;

use crate::error::CaptureError;

/// One smoothed spectrum frame shared between capture and consumers.
///
/// `bands` holds one value per bar, each clamped to `0.0..=1.0` for direct
/// use as a display ratio.
#[derive(Debug, Clone, Default)]
pub struct BandFrame {
    pub bands: Vec<f32>,
}

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle → starting → running → stopping → idle
///            ↓          ↓
///              failed
/// ```
///
/// `Failed` is terminal for the session; a later `start()` opens a new one.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    Idle,
    Starting,
    Running,
    Stopping,
    Failed(CaptureError),
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the session failure if the state carries one.
    pub fn failure(&self) -> Option<&CaptureError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}
