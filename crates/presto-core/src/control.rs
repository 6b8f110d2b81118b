//! Configuration command surface
//!
//! Replaces the host's preset editor with an explicit command API: every
//! mutation clamps to the documented range, updates the configuration, and
//! pushes a freshly serialized preset to the registered listener so the host
//! can persist it immediately.

use std::ops::RangeInclusive;

use crate::config::{
    StretchConfig, NONLINEAR_FACTOR_RANGE, PITCH_RANGE, RATE_RANGE, SPEED_RANGE, VOLUME_RANGE,
};

/// Callback receiving the freshly serialized preset after each mutation
pub type PresetListener = Box<dyn FnMut(&[u8]) + Send>;

/// Command surface for editing the stretch configuration
///
/// Holds a working copy of the configuration. The host reads it back with
/// [`config`](Self::config) and applies it to a processor whenever it sees
/// fit; the listener gives the host a persistence hook that fires on every
/// edit, matching preset-editor semantics.
pub struct StretchControl {
    config: StretchConfig,
    listener: Option<PresetListener>,
}

impl StretchControl {
    /// Create a control surface with the default configuration
    pub fn new() -> Self {
        Self::with_config(StretchConfig::default())
    }

    /// Create a control surface editing an existing configuration
    pub fn with_config(config: StretchConfig) -> Self {
        Self {
            config,
            listener: None,
        }
    }

    /// Create a control surface from a persisted preset blob
    ///
    /// Malformed presets silently degrade to defaults.
    pub fn from_preset(owner: &[u8; 16], data: &[u8]) -> Self {
        Self::with_config(StretchConfig::from_preset(owner, data))
    }

    /// Register the listener that receives serialized presets on every edit
    pub fn set_listener(&mut self, listener: PresetListener) {
        self.listener = Some(listener);
    }

    /// The current configuration
    pub fn config(&self) -> StretchConfig {
        self.config
    }

    // --- Getters ---

    /// Current tempo factor
    pub fn speed(&self) -> f32 {
        self.config.speed
    }

    /// Current pitch factor
    pub fn pitch(&self) -> f32 {
        self.config.pitch
    }

    /// Current combined rate factor
    pub fn rate(&self) -> f32 {
        self.config.rate
    }

    /// Current linear gain
    pub fn volume(&self) -> f32 {
        self.config.volume
    }

    /// Whether nonlinear speedup is requested
    pub fn nonlinear_enabled(&self) -> bool {
        self.config.nonlinear_enabled
    }

    /// Current nonlinear intensity
    pub fn nonlinear_factor(&self) -> f32 {
        self.config.nonlinear_factor
    }

    // --- Commands ---

    /// Set the tempo factor, clamped to [`SPEED_RANGE`]
    pub fn set_speed(&mut self, speed: f32) {
        if let Some(speed) = clamp_to(speed, &SPEED_RANGE) {
            self.config.speed = speed;
            self.notify();
        }
    }

    /// Set the pitch factor, clamped to [`PITCH_RANGE`]
    pub fn set_pitch(&mut self, pitch: f32) {
        if let Some(pitch) = clamp_to(pitch, &PITCH_RANGE) {
            self.config.pitch = pitch;
            self.notify();
        }
    }

    /// Set the combined rate factor, clamped to [`RATE_RANGE`]
    pub fn set_rate(&mut self, rate: f32) {
        if let Some(rate) = clamp_to(rate, &RATE_RANGE) {
            self.config.rate = rate;
            self.notify();
        }
    }

    /// Set the linear gain, clamped to [`VOLUME_RANGE`]
    pub fn set_volume(&mut self, volume: f32) {
        if let Some(volume) = clamp_to(volume, &VOLUME_RANGE) {
            self.config.volume = volume;
            self.notify();
        }
    }

    /// Enable or disable nonlinear speedup
    pub fn set_nonlinear_enabled(&mut self, enabled: bool) {
        self.config.nonlinear_enabled = enabled;
        self.notify();
    }

    /// Toggle nonlinear speedup
    pub fn toggle_nonlinear(&mut self) {
        self.set_nonlinear_enabled(!self.config.nonlinear_enabled);
    }

    /// Set the nonlinear intensity, clamped to [`NONLINEAR_FACTOR_RANGE`]
    pub fn set_nonlinear_factor(&mut self, factor: f32) {
        if let Some(factor) = clamp_to(factor, &NONLINEAR_FACTOR_RANGE) {
            self.config.nonlinear_factor = factor;
            self.notify();
        }
    }

    /// Restore every parameter to its default
    pub fn reset(&mut self) {
        self.config.reset();
        self.notify();
    }

    /// Push the serialized configuration to the registered listener
    fn notify(&mut self) {
        if let Some(listener) = &mut self.listener {
            let preset = self.config.to_preset();
            listener(&preset);
        }
    }
}

impl Default for StretchControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Clamp a value into a range; non-finite input is dropped
fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> Option<f32> {
    if value.is_finite() {
        Some(value.clamp(*range.start(), *range.end()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StretchConfig, PRESET_LEN, PRESET_OWNER};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_setters_clamp_to_range() {
        let mut control = StretchControl::new();

        control.set_speed(10.0);
        assert_eq!(control.speed(), 4.0);

        control.set_speed(0.01);
        assert_eq!(control.speed(), 0.25);

        control.set_pitch(3.0);
        assert_eq!(control.pitch(), 2.0);

        control.set_volume(-1.0);
        assert_eq!(control.volume(), 0.0);
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        let mut control = StretchControl::new();
        control.set_speed(f32::NAN);
        assert_eq!(control.speed(), 1.0);

        control.set_rate(f32::INFINITY);
        assert_eq!(control.rate(), 1.0);
    }

    #[test]
    fn test_toggle_nonlinear() {
        let mut control = StretchControl::new();
        assert!(!control.nonlinear_enabled());

        control.toggle_nonlinear();
        assert!(control.nonlinear_enabled());

        control.toggle_nonlinear();
        assert!(!control.nonlinear_enabled());
    }

    #[test]
    fn test_listener_receives_serialized_preset() {
        let captured: Arc<Mutex<Vec<Vec<u8>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);

        let mut control = StretchControl::new();
        control.set_listener(Box::new(move |preset| {
            sink.lock().unwrap().push(preset.to_vec());
        }));

        control.set_speed(2.0);
        control.toggle_nonlinear();

        let presets = captured.lock().unwrap();
        assert_eq!(presets.len(), 2);
        assert_eq!(presets[0].len(), PRESET_LEN);

        // The last emission reflects both edits
        let restored = StretchConfig::from_preset(&PRESET_OWNER, &presets[1]);
        assert_eq!(restored.speed, 2.0);
        assert!(restored.nonlinear_enabled);
    }

    #[test]
    fn test_reset_emits_default_preset() {
        let captured: Arc<Mutex<Vec<Vec<u8>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);

        let mut control = StretchControl::with_config(StretchConfig {
            speed: 2.0,
            nonlinear_enabled: true,
            ..Default::default()
        });
        control.set_listener(Box::new(move |preset| {
            sink.lock().unwrap().push(preset.to_vec());
        }));

        control.reset();

        let presets = captured.lock().unwrap();
        let restored = StretchConfig::from_preset(&PRESET_OWNER, presets.last().unwrap());
        assert!(restored.is_default());
    }
}
