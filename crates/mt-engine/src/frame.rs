//! Audio frame type.

/// A stereo audio frame (16-bit integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub left: i16,
    pub right: i16,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { left: 0, right: 0 }
    }

    /// Quantize a float sample pair, clamping to [-1, 1].
    pub fn from_f32(left: f32, right: f32) -> Self {
        Self {
            left: quantize(left),
            right: quantize(right),
        }
    }

    /// Interleave two float channels into `out`. Writes `min` of the three lengths.
    pub fn interleave(left: &[f32], right: &[f32], out: &mut [Frame]) -> usize {
        let mut written = 0;
        for ((l, r), frame) in left.iter().zip(right).zip(out.iter_mut()) {
            *frame = Frame::from_f32(*l, *r);
            written += 1;
        }
        written
    }
}

fn quantize(sample: f32) -> i16 {
    // NaN clamps to NaN, which `as` saturates to 0
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
