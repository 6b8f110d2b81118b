//! Sample conversion between host float and engine fixed-point
//!
//! The host pipeline carries normalized f32 samples; the stretch engine
//! consumes and produces interleaved i16. Out-of-range floats saturate at the
//! 16-bit boundaries rather than wrapping, and the round trip quantizes to
//! 16 bits by design.

use crate::types::Sample;

/// Scale factor between normalized float and 16-bit fixed-point
const I16_SCALE: Sample = 32767.0;

/// Convert one normalized float sample to i16, saturating out-of-range input
#[inline]
pub fn sample_to_i16(sample: Sample) -> i16 {
    // Float -> int `as` casts saturate at the target bounds
    (sample * I16_SCALE).round() as i16
}

/// Convert one i16 sample back to a normalized float
#[inline]
pub fn i16_to_sample(value: i16) -> Sample {
    value as Sample / I16_SCALE
}

/// Convert a float slice to i16 into a reusable buffer
pub fn encode_into(input: &[Sample], output: &mut Vec<i16>) {
    output.clear();
    output.extend(input.iter().map(|&s| sample_to_i16(s)));
}

/// Convert an i16 slice to float into a reusable buffer
pub fn decode_into(input: &[i16], output: &mut Vec<Sample>) {
    output.clear();
    output.extend(input.iter().map(|&v| i16_to_sample(v)));
}
