//! Stretch engine capability
//!
//! The DSP that actually performs time/pitch stretching lives behind this
//! seam. The processor only assumes a push/pull stream of interleaved i16
//! samples: whole chunks go in, whatever the engine has ready comes out, and
//! the engine is free to buffer arbitrarily in between (warm-up lookahead,
//! block-based analysis, and so on).

mod signalsmith;

pub use signalsmith::{SignalsmithEngine, SignalsmithFactory};

use thiserror::Error;

/// Errors surfaced by engine backends when a stream cannot be created
///
/// Creation failure is never fatal to playback: the processor logs it and
/// passes audio through unmodified until a later attempt succeeds.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Backend refused the requested stream format
    #[error("Unsupported stream format: {sample_rate}Hz / {channels}ch")]
    UnsupportedFormat { sample_rate: u32, channels: u32 },

    /// Backend failed to set up its internal state
    #[error("Engine stream setup failed: {0}")]
    SetupFailed(String),
}

/// One running stretch stream
///
/// An instance transforms a single stream at the fixed format it was created
/// for. Parameter setters may be called at any time and apply to audio
/// processed afterwards. Dropping the instance releases the stream; the
/// processor owns at most one at a time.
pub trait StretchEngine: Send {
    /// Set the tempo factor (2.0 = twice as fast, pitch unchanged)
    fn set_speed(&mut self, speed: f32);

    /// Set the pitch factor (2.0 = one octave up, tempo unchanged)
    fn set_pitch(&mut self, pitch: f32);

    /// Set the combined rate factor (shifts tempo and pitch together)
    fn set_rate(&mut self, rate: f32);

    /// Set the linear output gain
    fn set_volume(&mut self, volume: f32);

    /// Enable nonlinear speedup with the given intensity
    fn enable_nonlinear(&mut self, intensity: f32);

    /// Submit `frames` interleaved frames from `samples`
    ///
    /// Submission is all-or-nothing; returns false if the engine rejected
    /// the write, in which case its state is unchanged.
    fn write(&mut self, samples: &[i16], frames: usize) -> bool;

    /// Drain up to `max_frames` of ready output into `out`
    ///
    /// Returns the number of frames produced; zero means nothing is ready
    /// yet (`out` must hold at least `max_frames` interleaved frames).
    fn read(&mut self, out: &mut [i16], max_frames: usize) -> usize;

    /// Signal end of input so remaining buffered audio becomes readable
    fn flush(&mut self);
}

/// Creates stretch streams for a given stream format
///
/// Called once per format epoch: on the first chunk and again whenever the
/// incoming format drifts. Implementations are stateless factories; all
/// per-stream state lives in the [`StretchEngine`] they return.
pub trait EngineFactory: Send {
    /// Create a stream for the given format
    fn create(&self, sample_rate: u32, channels: u32) -> Result<Box<dyn StretchEngine>, EngineError>;
}
