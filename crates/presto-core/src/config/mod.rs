//! Stretch configuration and preset persistence
//!
//! Five tunable parameters plus the nonlinear toggle fully determine engine
//! behavior. The host persists configuration as an opaque preset blob tagged
//! with this component's identity; the blob layout is a fixed 21-byte record
//! of little-endian fields, so presets are portable across platforms and
//! never depend on in-memory struct layout.

use std::ops::RangeInclusive;

/// Default tempo factor
pub const DEFAULT_SPEED: f32 = 1.0;
/// Default pitch factor
pub const DEFAULT_PITCH: f32 = 1.0;
/// Default combined rate factor
pub const DEFAULT_RATE: f32 = 1.0;
/// Default linear gain
pub const DEFAULT_VOLUME: f32 = 1.0;
/// Nonlinear speedup is off by default
pub const DEFAULT_NONLINEAR: bool = false;
/// Default nonlinear intensity (only meaningful when the mode is enabled)
pub const DEFAULT_NONLINEAR_FACTOR: f32 = 1.0;

/// Valid speed range (25% to 400%)
pub const SPEED_RANGE: RangeInclusive<f32> = 0.25..=4.0;
/// Valid pitch range (50% to 200%)
pub const PITCH_RANGE: RangeInclusive<f32> = 0.5..=2.0;
/// Valid rate range, same span as speed
pub const RATE_RANGE: RangeInclusive<f32> = 0.25..=4.0;
/// Valid volume range (0 = mute, 4 = +12dB)
pub const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=4.0;
/// Valid nonlinear intensity range
pub const NONLINEAR_FACTOR_RANGE: RangeInclusive<f32> = 0.1..=10.0;

/// Serialized preset size: five little-endian f32 fields plus one boolean byte
pub const PRESET_LEN: usize = 21;

/// Component identity that owns serialized presets
///
/// Compared byte-for-byte; a preset tagged with a different owner belongs to
/// some other component and parses to defaults.
pub const PRESET_OWNER: [u8; 16] = [
    0x8e, 0x4a, 0x9f, 0x2c, 0x3b, 0x5d, 0x4e, 0x7a, 0x9c, 0x1f, 0x6d, 0x8b, 0x2a, 0x4e, 0x5f,
    0x3c,
];

/// The full stretch configuration
///
/// Replaced wholesale on preset load, mutated field-by-field through
/// [`StretchControl`](crate::control::StretchControl), and read (never
/// written) by the processor during steady-state chunk handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StretchConfig {
    /// Multiplicative tempo factor (2.0 = twice as fast, pitch unchanged)
    pub speed: f32,
    /// Multiplicative pitch factor (2.0 = one octave up, tempo unchanged)
    pub pitch: f32,
    /// Combined rate factor; shifts tempo and pitch together like resampling
    pub rate: f32,
    /// Linear output gain
    pub volume: f32,
    /// Whether the engine's nonlinear speedup mode is requested
    pub nonlinear_enabled: bool,
    /// Intensity of the nonlinear mode
    pub nonlinear_factor: f32,
}

impl Default for StretchConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            pitch: DEFAULT_PITCH,
            rate: DEFAULT_RATE,
            volume: DEFAULT_VOLUME,
            nonlinear_enabled: DEFAULT_NONLINEAR,
            nonlinear_factor: DEFAULT_NONLINEAR_FACTOR,
        }
    }
}

impl StretchConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the configuration requests any processing at all
    ///
    /// True when the four scalar factors are 1.0 and nonlinear mode is off.
    /// The nonlinear factor is deliberately ignored here: it has no audible
    /// effect while the mode is disabled.
    pub fn is_default(&self) -> bool {
        self.speed == DEFAULT_SPEED
            && self.pitch == DEFAULT_PITCH
            && self.rate == DEFAULT_RATE
            && self.volume == DEFAULT_VOLUME
            && self.nonlinear_enabled == DEFAULT_NONLINEAR
    }

    /// Restore all parameters to their defaults
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Serialize to the fixed 21-byte preset layout
    ///
    /// Field order: speed, pitch, rate, volume, nonlinear factor (each a
    /// little-endian f32), then one byte for the nonlinear toggle.
    pub fn to_preset(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(PRESET_LEN);
        for field in [
            self.speed,
            self.pitch,
            self.rate,
            self.volume,
            self.nonlinear_factor,
        ] {
            data.extend_from_slice(&field.to_le_bytes());
        }
        data.push(self.nonlinear_enabled as u8);
        data
    }

    /// Parse a preset blob tagged with `owner`
    ///
    /// A foreign owner, a buffer shorter than [`PRESET_LEN`], or non-finite
    /// field values all degrade to the default configuration. Preset parsing
    /// never fails: playback must keep running on whatever the host hands us.
    pub fn from_preset(owner: &[u8; 16], data: &[u8]) -> Self {
        if *owner != PRESET_OWNER {
            log::warn!("from_preset: foreign preset owner, using defaults");
            return Self::default();
        }
        if data.len() < PRESET_LEN {
            log::warn!(
                "from_preset: preset too short ({} bytes), using defaults",
                data.len()
            );
            return Self::default();
        }

        let field = |index: usize| -> f32 {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(&data[index * 4..index * 4 + 4]);
            f32::from_le_bytes(bytes)
        };

        let config = Self {
            speed: field(0),
            pitch: field(1),
            rate: field(2),
            volume: field(3),
            nonlinear_factor: field(4),
            nonlinear_enabled: data[20] != 0,
        };

        let scalars = [
            config.speed,
            config.pitch,
            config.rate,
            config.volume,
            config.nonlinear_factor,
        ];
        if scalars.iter().any(|f| !f.is_finite()) {
            log::warn!("from_preset: non-finite field in preset, using defaults");
            return Self::default();
        }

        config
    }
}
