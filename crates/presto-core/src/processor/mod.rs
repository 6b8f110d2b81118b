//! Streaming stretch processor
//!
//! The host-facing core: owns one engine stream at a time, feeds it whole
//! chunks, drains whatever output is ready, and absorbs format changes,
//! warm-up underruns, and backend failures so the host never sees an error.
//! Worst case the audio passes through unchanged, or a chunk of silence
//! holds the playback cadence while the engine fills its lookahead.

use crate::codec;
use crate::config::StretchConfig;
use crate::engine::{EngineFactory, SignalsmithFactory, StretchEngine};
use crate::types::{AudioChunk, ChunkFormat, Sample};

/// Output staging capacity as a multiple of the input chunk's frame count
///
/// The engine may emit more frames than it consumed (slow-down) or release
/// several chunks' worth at once after its warm-up window. This cap bounds
/// per-chunk growth; anything beyond it stays queued inside the engine and
/// drains on later chunks.
const OUTPUT_GROWTH_FACTOR: usize = 4;

/// Frames per read while draining at end of playback
const DRAIN_FRAMES: usize = 4096;

/// Nominal engine buffering delay while a stream is live, in seconds
const BASE_LATENCY_SECONDS: f64 = 0.020;

/// Additional lookahead window of the nonlinear mode, in seconds
const NONLINEAR_LOOKAHEAD_SECONDS: f64 = 0.120;

/// Streaming time/pitch-stretch processor
///
/// Drives exactly one engine stream per format epoch. The stream is created
/// lazily on the first non-default chunk, torn down and re-created whenever
/// the incoming format drifts, and dropped on explicit reset. A missing
/// stream always means "processing disabled": chunks pass through unchanged.
pub struct StretchProcessor {
    /// Configuration snapshot, applied at engine creation
    config: StretchConfig,
    /// Backend that creates engine streams
    factory: Box<dyn EngineFactory>,
    /// Live engine stream, if any
    engine: Option<Box<dyn StretchEngine>>,
    /// Format the live engine was created for
    context: Option<ChunkFormat>,
    /// Input staging in engine fixed-point format
    input_staging: Vec<i16>,
    /// Output staging in engine fixed-point format
    output_staging: Vec<i16>,
    /// Host-format output copied back into the chunk
    host_staging: Vec<Sample>,
}

impl StretchProcessor {
    /// Create a processor using the default Signalsmith backend
    pub fn new(config: StretchConfig) -> Self {
        Self::with_factory(config, Box::new(SignalsmithFactory))
    }

    /// Create a processor with a custom engine backend
    pub fn with_factory(config: StretchConfig, factory: Box<dyn EngineFactory>) -> Self {
        Self {
            config,
            factory,
            engine: None,
            context: None,
            input_staging: Vec::new(),
            output_staging: Vec::new(),
            host_staging: Vec::new(),
        }
    }

    /// The current configuration
    pub fn config(&self) -> &StretchConfig {
        &self.config
    }

    /// Replace the configuration
    ///
    /// Takes effect at the next engine (re)creation; the live stream, if
    /// any, keeps its parameters until then.
    pub fn set_config(&mut self, config: StretchConfig) {
        self.config = config;
    }

    /// Whether an engine stream is currently live
    pub fn is_active(&self) -> bool {
        self.engine.is_some()
    }

    /// The format of the live stream, if any
    pub fn stream_format(&self) -> Option<ChunkFormat> {
        self.context
    }

    /// Transform one chunk in place
    ///
    /// This call never fails: on any internal failure the chunk is left
    /// unchanged (pass-through) or replaced with silence of the original
    /// frame count, and playback continues.
    pub fn process_chunk(&mut self, chunk: &mut AudioChunk) {
        // Fast path: a default configuration does no work at all, and no
        // engine stream may exist while it is in effect.
        if self.config.is_default() {
            return;
        }
        let frames = chunk.frames();
        if frames == 0 {
            return;
        }

        // Format gate: first chunk or any drift tears the stream down
        let format = chunk.format();
        if self.context != Some(format) {
            self.rebuild_stream(format);
        }
        let Some(engine) = self.engine.as_mut() else {
            // Disabled epoch: pass through until creation succeeds
            return;
        };

        let channels = format.channels as usize;

        // Write phase: the whole chunk, all or nothing
        codec::encode_into(chunk.data(), &mut self.input_staging);
        if !engine.write(&self.input_staging, frames) {
            log::warn!("engine rejected {frames} frames; passing chunk through");
            return;
        }

        // Read phase: drain until the engine runs dry or staging fills up
        let max_frames = frames * OUTPUT_GROWTH_FACTOR;
        self.output_staging.resize(max_frames * channels, 0);
        let mut total = 0usize;
        while total < max_frames {
            let produced =
                engine.read(&mut self.output_staging[total * channels..], max_frames - total);
            if produced == 0 {
                break;
            }
            total += produced;
        }

        if total > 0 {
            codec::decode_into(&self.output_staging[..total * channels], &mut self.host_staging);
            chunk.set_data(&self.host_staging, total);
        } else {
            // Warm-up underrun: hold the cadence with silence; the engine
            // compensates with extra output on later chunks.
            chunk.set_silence(frames);
        }
    }

    /// End of playback: flush the engine and drain everything it still holds
    ///
    /// The drained tail is discarded — the host's chunk path has ended, so
    /// there is nowhere left to deliver it. At most the engine's internal
    /// buffer is lost, a fraction of a second at the stream boundary.
    pub fn end_of_playback(&mut self) {
        let (Some(engine), Some(context)) = (self.engine.as_mut(), self.context) else {
            return;
        };

        engine.flush();
        let channels = context.channels as usize;
        self.output_staging.resize(DRAIN_FRAMES * channels, 0);
        while engine.read(&mut self.output_staging, DRAIN_FRAMES) > 0 {}
    }

    /// Track boundary: deliberately nothing
    ///
    /// The stream persists across track changes so the stretch state carries
    /// through gapless transitions.
    pub fn end_of_track(&mut self) {}

    /// Explicit reset (seek, stop): drop the stream immediately
    ///
    /// The next chunk re-creates from scratch.
    pub fn reset(&mut self) {
        self.teardown();
        self.context = None;
    }

    /// Conservative latency estimate in seconds
    ///
    /// Zero with no live stream; otherwise the engine's nominal buffering
    /// delay, plus the nonlinear lookahead window when that mode is on. An
    /// upper-bound hint for host synchronization, not a measurement.
    pub fn latency_seconds(&self) -> f64 {
        if self.engine.is_none() {
            return 0.0;
        }
        let mut latency = BASE_LATENCY_SECONDS;
        if self.config.nonlinear_enabled {
            latency += NONLINEAR_LOOKAHEAD_SECONDS;
        }
        latency
    }

    /// Tear down the old stream and create one for `format`
    fn rebuild_stream(&mut self, format: ChunkFormat) {
        // Old stream first; its buffered audio must not leak into the new epoch
        self.teardown();

        match self.factory.create(format.sample_rate, format.channels) {
            Ok(mut engine) => {
                apply_config(engine.as_mut(), &self.config);
                log::debug!(
                    "stretch stream created: {}Hz / {}ch (mask {:#x})",
                    format.sample_rate,
                    format.channels,
                    format.channel_mask
                );
                self.engine = Some(engine);
                self.context = Some(format);
            }
            Err(err) => {
                // Leave the context cleared so the next chunk retries
                log::warn!("stretch stream creation failed ({err}); passing audio through");
                self.context = None;
            }
        }
    }

    /// Drop the live stream, if any
    fn teardown(&mut self) {
        if self.engine.take().is_some() {
            log::debug!("stretch stream destroyed");
        }
    }
}

impl Drop for StretchProcessor {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Apply every configured parameter to a freshly created stream
fn apply_config(engine: &mut dyn StretchEngine, config: &StretchConfig) {
    engine.set_speed(config.speed);
    engine.set_pitch(config.pitch);
    engine.set_rate(config.rate);
    engine.set_volume(config.volume);
    if config.nonlinear_enabled {
        engine.enable_nonlinear(config.nonlinear_factor);
    }
}
