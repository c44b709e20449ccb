use thiserror::Error;

/// Errors surfaced by a capture session.
///
/// `Clone + PartialEq` so a failure can be stored inside the scheduler's
/// `Failed` state and compared by consumers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CaptureError {
    /// Rejected synchronously on `start()`; the session never leaves Idle.
    #[error("invalid capture config: {0}")]
    InvalidConfig(String),

    /// Device missing, busy, or refusing the requested stream shape.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device errored or violated its contract mid-session.
    #[error("capture stream fault: {0}")]
    StreamFault(String),
}
