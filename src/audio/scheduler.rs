use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::devices;
use super::pipeline::FramePipeline;
use super::{BandFrame, CaptureState};
use crate::config::{CaptureConfig, FRAME_SIZE, SAMPLE_RATE};
use crate::error::CaptureError;

/// Owns the audio input stream for one capture session.
///
/// The device drives delivery: each hardware callback runs the frame
/// pipeline and publishes the result, with no software timer in between.
/// Consumers subscribe to the frame and state watch channels; they only
/// ever see immutable snapshots, never live pipeline state.
pub struct CaptureScheduler {
    frame_tx: Arc<watch::Sender<Arc<BandFrame>>>,
    state_tx: Arc<watch::Sender<CaptureState>>,
    frame_rx: watch::Receiver<Arc<BandFrame>>,
    state_rx: watch::Receiver<CaptureState>,
    session: Option<Session>,
}

struct Session {
    stream: cpal::Stream,
    // Checked first in every callback; set before teardown so a callback
    // racing with stop() drops its frame instead of touching a dying stream.
    stopping: Arc<AtomicBool>,
}

impl CaptureScheduler {
    pub fn new() -> Self {
        let (frame_tx, frame_rx) = watch::channel(Arc::new(BandFrame::default()));
        let (state_tx, state_rx) = watch::channel(CaptureState::Idle);
        Self {
            frame_tx: Arc::new(frame_tx),
            state_tx: Arc::new(state_tx),
            frame_rx,
            state_rx,
            session: None,
        }
    }

    /// Subscribe to smoothed band frames.
    pub fn frames(&self) -> watch::Receiver<Arc<BandFrame>> {
        self.frame_rx.clone()
    }

    /// Subscribe to session state transitions.
    pub fn state_changes(&self) -> watch::Receiver<CaptureState> {
        self.state_rx.clone()
    }

    /// Current session state.
    pub fn state(&self) -> CaptureState {
        self.state_tx.borrow().clone()
    }

    /// Open the device and begin delivering frames.
    ///
    /// Validation failures are synchronous and leave the scheduler Idle.
    /// Device failures move the session to Failed; the caller decides
    /// whether to retry with a different device.
    pub fn start(&mut self, config: &CaptureConfig) -> Result<(), CaptureError> {
        self.stop();

        config.validate()?;
        self.publish(CaptureState::Starting);

        let device = match devices::find_input_device(config.device.as_deref()) {
            Ok(device) => device,
            Err(err) => return Err(self.fail(err)),
        };
        info!(
            device = %device.name().unwrap_or_else(|_| "unknown device".to_string()),
            bars = config.bars,
            "opening capture stream"
        );

        // Mono at the fixed rate, with the frame size requested explicitly
        // as the device blocksize.
        let stream_config = StreamConfig {
            channels: 1,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: BufferSize::Fixed(FRAME_SIZE as u32),
        };

        let stopping = Arc::new(AtomicBool::new(false));
        let mut pipeline = FramePipeline::new(config);

        let cb_stopping = stopping.clone();
        let cb_frames = self.frame_tx.clone();
        let cb_state = self.state_tx.clone();
        let data_callback = move |data: &[f32], _: &cpal::InputCallbackInfo| {
            if cb_stopping.load(Ordering::Relaxed) {
                // Late callback during teardown: drop the frame, not an error.
                return;
            }
            match pipeline.process(data) {
                Ok(frame) => {
                    let _ = cb_frames.send(Arc::new(frame));
                }
                Err(err) => {
                    warn!(%err, "capture pipeline fault, failing session");
                    cb_stopping.store(true, Ordering::Relaxed);
                    let _ = cb_state.send(CaptureState::Failed(err));
                }
            }
        };

        let err_stopping = stopping.clone();
        let err_state = self.state_tx.clone();
        let error_callback = move |err: cpal::StreamError| {
            if err_stopping.swap(true, Ordering::Relaxed) {
                return;
            }
            let fault = CaptureError::StreamFault(err.to_string());
            warn!(%fault, "capture stream errored");
            let _ = err_state.send(CaptureState::Failed(fault));
        };

        let stream = match device.build_input_stream(
            &stream_config,
            data_callback,
            error_callback,
            None,
        ) {
            Ok(stream) => stream,
            Err(e) => return Err(self.fail(CaptureError::DeviceUnavailable(e.to_string()))),
        };

        if let Err(e) = stream.play() {
            return Err(self.fail(CaptureError::DeviceUnavailable(e.to_string())));
        }

        self.session = Some(Session { stream, stopping });
        self.publish(CaptureState::Running);
        Ok(())
    }

    /// Close the stream and return to Idle.
    ///
    /// Safe to call repeatedly or before a successful `start()`; dropping
    /// the stream joins any in-flight callback, and the stopping flag makes
    /// a racing callback a no-op. A Failed session stays Failed so the
    /// terminal event remains observable.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("stop requested with no active session");
            return;
        };

        session.stopping.store(true, Ordering::Relaxed);
        let failed = self.state().is_failed();
        if !failed {
            self.publish(CaptureState::Stopping);
        }

        let _ = session.stream.pause();
        drop(session.stream);

        if !failed {
            self.publish(CaptureState::Idle);
        }
        debug!("capture session closed");
    }

    /// Tear down the current session and start a new one.
    ///
    /// The pipeline, including the smoothing state, is rebuilt from scratch
    /// for the new config.
    pub fn reconfigure(&mut self, config: &CaptureConfig) -> Result<(), CaptureError> {
        self.stop();
        self.start(config)
    }

    fn publish(&self, state: CaptureState) {
        self.state_tx.send_replace(state);
    }

    fn fail(&self, err: CaptureError) -> CaptureError {
        self.publish(CaptureState::Failed(err.clone()));
        err
    }
}

impl Default for CaptureScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CaptureScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
