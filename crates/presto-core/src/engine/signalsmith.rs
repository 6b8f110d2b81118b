//! Default stretch backend over the Signalsmith Stretch library
//!
//! Signalsmith Stretch exposes a slice-in/slice-out call where the stretch
//! ratio is implied by the relative slice lengths. This adapter turns that
//! into the push/pull stream contract the processor expects: written input
//! queues in an interleaved f32 FIFO, and each read derives its output
//! budget from the queued input and the combined time ratio, so the counts
//! it reports come from its own bookkeeping rather than from guesses about
//! the library's internal latency.

use signalsmith_stretch::Stretch;

use crate::codec;

use super::{EngineError, EngineFactory, StretchEngine};

/// Factory producing [`SignalsmithEngine`] streams
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalsmithFactory;

impl EngineFactory for SignalsmithFactory {
    fn create(&self, sample_rate: u32, channels: u32) -> Result<Box<dyn StretchEngine>, EngineError> {
        if sample_rate == 0 || channels == 0 {
            return Err(EngineError::UnsupportedFormat {
                sample_rate,
                channels,
            });
        }
        Ok(Box::new(SignalsmithEngine::new(sample_rate, channels)))
    }
}

/// Stretch stream backed by `signalsmith_stretch::Stretch`
pub struct SignalsmithEngine {
    stretcher: Stretch,
    channels: usize,
    speed: f32,
    pitch: f32,
    rate: f32,
    volume: f32,
    /// Queued input awaiting processing, interleaved f32
    pending: Vec<f32>,
    /// Output produced by flush, drained by subsequent reads
    flushed: Vec<i16>,
    /// Scratch for one process call
    scratch: Vec<f32>,
    /// The nonlinear fallback notice is logged once per stream
    nonlinear_logged: bool,
}

impl SignalsmithEngine {
    /// Create a stream for the given format with default quality settings
    pub fn new(sample_rate: u32, channels: u32) -> Self {
        Self {
            stretcher: Stretch::preset_default(channels, sample_rate),
            channels: channels as usize,
            speed: 1.0,
            pitch: 1.0,
            rate: 1.0,
            volume: 1.0,
            pending: Vec::new(),
            flushed: Vec::new(),
            scratch: Vec::new(),
            nonlinear_logged: false,
        }
    }

    /// Combined time-compression ratio: input frames consumed per output frame
    fn time_ratio(&self) -> f64 {
        self.speed as f64 * self.rate as f64
    }

    /// Frames currently queued for processing
    fn pending_frames(&self) -> usize {
        self.pending.len() / self.channels
    }

    /// Re-derive the transpose factor from pitch and rate
    ///
    /// Rate shifts pitch along with tempo, exactly as resampling would, so
    /// the effective transpose is the product of both knobs.
    fn update_transpose(&mut self) {
        let factor = self.pitch * self.rate;
        let semitones = 12.0 * factor.log2();
        self.stretcher.set_transpose_factor_semitones(semitones, None);
    }

    /// Run the stretcher over `in_frames` queued frames, producing `out_frames`
    fn process_pending(&mut self, in_frames: usize, out_frames: usize) {
        let in_len = in_frames * self.channels;
        let out_len = out_frames * self.channels;
        self.scratch.resize(out_len, 0.0);
        self.scratch.fill(0.0);
        self.stretcher
            .process(&self.pending[..in_len], &mut self.scratch[..out_len]);
        self.pending.drain(..in_len);
    }
}

impl StretchEngine for SignalsmithEngine {
    fn set_speed(&mut self, speed: f32) {
        if speed.is_finite() && speed > 0.0 {
            self.speed = speed;
        }
    }

    fn set_pitch(&mut self, pitch: f32) {
        if pitch.is_finite() && pitch > 0.0 {
            self.pitch = pitch;
            self.update_transpose();
        }
    }

    fn set_rate(&mut self, rate: f32) {
        if rate.is_finite() && rate > 0.0 {
            self.rate = rate;
            self.update_transpose();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        if volume.is_finite() && volume >= 0.0 {
            self.volume = volume;
        }
    }

    fn enable_nonlinear(&mut self, intensity: f32) {
        // No speech-aware mode in this library; the uniform ratio stands in.
        if !self.nonlinear_logged {
            log::info!(
                "signalsmith backend has no nonlinear speedup; \
                 keeping uniform ratio (requested intensity {intensity:.2})"
            );
            self.nonlinear_logged = true;
        }
    }

    fn write(&mut self, samples: &[i16], frames: usize) -> bool {
        let len = frames * self.channels;
        if samples.len() < len {
            return false;
        }
        self.pending
            .extend(samples[..len].iter().map(|&v| codec::i16_to_sample(v)));
        true
    }

    fn read(&mut self, out: &mut [i16], max_frames: usize) -> usize {
        let channels = self.channels;

        // A flushed tail drains before any fresh processing
        if !self.flushed.is_empty() {
            let take_frames = (self.flushed.len() / channels).min(max_frames);
            let take = take_frames * channels;
            out[..take].copy_from_slice(&self.flushed[..take]);
            self.flushed.drain(..take);
            return take_frames;
        }

        let ratio = self.time_ratio();
        let available = (self.pending_frames() as f64 / ratio).floor() as usize;
        let out_frames = available.min(max_frames);
        if out_frames == 0 {
            return 0;
        }

        let in_frames = ((out_frames as f64 * ratio).ceil() as usize).min(self.pending_frames());
        self.process_pending(in_frames, out_frames);

        let volume = self.volume;
        for (dst, &src) in out[..out_frames * channels]
            .iter_mut()
            .zip(self.scratch.iter())
        {
            *dst = codec::sample_to_i16(src * volume);
        }
        out_frames
    }

    fn flush(&mut self) {
        let channels = self.channels;
        let volume = self.volume;

        // Process whatever is still queued
        let remaining = self.pending_frames();
        if remaining > 0 {
            let out_frames = (remaining as f64 / self.time_ratio()).ceil() as usize;
            if out_frames > 0 {
                self.process_pending(remaining, out_frames);
                self.flushed.extend(
                    self.scratch[..out_frames * channels]
                        .iter()
                        .map(|&s| codec::sample_to_i16(s * volume)),
                );
            }
        }
        self.pending.clear();

        // Then drain the stretcher's own latency window
        let tail_frames = self.stretcher.input_latency() + self.stretcher.output_latency();
        if tail_frames > 0 {
            self.scratch.resize(tail_frames * channels, 0.0);
            self.scratch.fill(0.0);
            self.stretcher.flush(&mut self.scratch[..tail_frames * channels]);
            self.flushed.extend(
                self.scratch[..tail_frames * channels]
                    .iter()
                    .map(|&s| codec::sample_to_i16(s * volume)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_before_write_returns_zero() {
        let mut engine = SignalsmithEngine::new(44100, 2);
        let mut out = vec![0i16; 1024];
        assert_eq!(engine.read(&mut out, 512), 0);
    }

    #[test]
    fn test_unity_ratio_count_bookkeeping() {
        let mut engine = SignalsmithEngine::new(44100, 2);
        let input = vec![1000i16; 512 * 2];
        assert!(engine.write(&input, 512));

        // At unity ratio every queued frame is immediately claimable
        let mut out = vec![0i16; 2048 * 2];
        assert_eq!(engine.read(&mut out, 2048), 512);
        assert_eq!(engine.read(&mut out, 2048), 0);
    }

    #[test]
    fn test_speedup_halves_output_count() {
        let mut engine = SignalsmithEngine::new(44100, 2);
        engine.set_speed(2.0);

        let input = vec![1000i16; 1024 * 2];
        assert!(engine.write(&input, 1024));

        let mut out = vec![0i16; 4096 * 2];
        assert_eq!(engine.read(&mut out, 4096), 512);
        assert_eq!(engine.read(&mut out, 4096), 0);
    }

    #[test]
    fn test_bounded_read_defers_remainder() {
        let mut engine = SignalsmithEngine::new(44100, 2);
        let input = vec![1000i16; 1024 * 2];
        assert!(engine.write(&input, 1024));

        let mut out = vec![0i16; 1024 * 2];
        assert_eq!(engine.read(&mut out, 256), 256);
        assert_eq!(engine.read(&mut out, 1024), 768);
    }

    #[test]
    fn test_write_rejects_short_buffer() {
        let mut engine = SignalsmithEngine::new(44100, 2);
        assert!(!engine.write(&[0i16; 10], 100));
        // Rejected writes leave nothing queued
        let mut out = vec![0i16; 256];
        assert_eq!(engine.read(&mut out, 128), 0);
    }

    #[test]
    fn test_flush_then_drain_terminates() {
        let mut engine = SignalsmithEngine::new(44100, 2);
        engine.set_speed(2.0);

        let input = vec![1000i16; 1024 * 2];
        assert!(engine.write(&input, 1024));
        engine.flush();

        let mut out = vec![0i16; 512 * 2];
        let mut total = 0;
        loop {
            let produced = engine.read(&mut out, 512);
            if produced == 0 {
                break;
            }
            total += produced;
        }
        // The flush released the queued audio plus the latency tail
        assert!(total >= 512);
    }

    #[test]
    fn test_factory_rejects_degenerate_format() {
        assert!(SignalsmithFactory.create(0, 2).is_err());
        assert!(SignalsmithFactory.create(44100, 0).is_err());
        assert!(SignalsmithFactory.create(44100, 2).is_ok());
    }
}
