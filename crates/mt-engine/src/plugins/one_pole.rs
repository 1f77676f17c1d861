//! Stereo one-pole low-pass effect.

use core::f32::consts::TAU;

use crate::plugin::{ParamInfo, PluginInfo, PluginKind, SynthPlugin};
use crate::plugins::PluginDescriptor;

const DEFAULT_CUTOFF: f32 = 4410.0;
const PARAM_CUTOFF: u16 = 0;

static PARAMS: &[ParamInfo] = &[ParamInfo {
    id: PARAM_CUTOFF,
    name: "cutoff",
    unit: "Hz",
    min: 20.0,
    max: 20000.0,
    default: DEFAULT_CUTOFF,
    is_enum: false,
}];

static INFO: PluginInfo = PluginInfo {
    name: "onepole",
    kind: PluginKind::Effect,
    inputs: 2,
    outputs: 2,
    voices: 0,
    params: PARAMS,
};

pub(super) const DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    name: "onepole",
    state_size,
    create,
};

fn state_size(_sample_rate: u32) -> usize {
    core::mem::size_of::<OnePole>()
}

fn create() -> Box<dyn SynthPlugin> {
    Box::new(OnePole::new())
}

/// One-pole RC low-pass: `y += alpha * (x - y)`.
pub struct OnePole {
    prev_left: f32,
    prev_right: f32,
    alpha: f32,
    cutoff_hz: f32,
    sample_rate: u32,
}

impl OnePole {
    pub fn new() -> Self {
        Self {
            prev_left: 0.0,
            prev_right: 0.0,
            alpha: 0.0,
            cutoff_hz: DEFAULT_CUTOFF,
            sample_rate: 44100,
        }
    }

    fn recompute_alpha(&mut self) {
        self.alpha = 1.0 - (-TAU * self.cutoff_hz / self.sample_rate as f32).exp();
    }
}

impl Default for OnePole {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthPlugin for OnePole {
    fn info(&self) -> &PluginInfo {
        &INFO
    }

    fn init(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
        self.prev_left = 0.0;
        self.prev_right = 0.0;
        self.recompute_alpha();
    }

    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        let alpha = self.alpha;
        let mut prev_l = self.prev_left;
        let mut prev_r = self.prev_right;

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            prev_l += alpha * (*l - prev_l);
            prev_r += alpha * (*r - prev_r);
            *l = prev_l;
            *r = prev_r;
        }

        // a non-finite input would otherwise stick in the feedback path
        self.prev_left = if prev_l.is_finite() { prev_l } else { 0.0 };
        self.prev_right = if prev_r.is_finite() { prev_r } else { 0.0 };
    }

    fn param(&self, id: u16) -> Option<f32> {
        (id == PARAM_CUTOFF).then_some(self.cutoff_hz)
    }

    fn set_param(&mut self, id: u16, value: f32) {
        if id == PARAM_CUTOFF && !value.is_nan() {
            self.cutoff_hz = value.clamp(PARAMS[0].min, PARAMS[0].max);
            self.recompute_alpha();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_filter(cutoff: f32, sr: u32) -> OnePole {
        let mut f = OnePole::new();
        f.init(sr);
        f.set_param(PARAM_CUTOFF, cutoff);
        f
    }

    #[test]
    fn alpha_at_default_cutoff() {
        let f = init_filter(DEFAULT_CUTOFF, 44100);
        let expected = 1.0 - (-TAU * 4410.0 / 44100.0f32).exp();
        assert!((f.alpha - expected).abs() < 1e-6);
    }

    #[test]
    fn attenuates_high_frequency_content() {
        let mut f = init_filter(1000.0, 44100);
        let mut l: Vec<f32> = (0..200).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let mut r = l.clone();

        f.process(&mut l, &mut r);

        let peak: f32 = l.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        assert!(peak < 0.95, "peak should be attenuated, got {}", peak);
    }

    #[test]
    fn passes_dc() {
        let mut f = init_filter(DEFAULT_CUTOFF, 44100);
        let mut l = vec![0.5f32; 200];
        let mut r = vec![-0.5f32; 200];
        f.process(&mut l, &mut r);

        assert!((l[199] - 0.5).abs() < 0.01, "got {}", l[199]);
        assert!((r[199] + 0.5).abs() < 0.01, "got {}", r[199]);
    }

    #[test]
    fn cutoff_is_clamped() {
        let mut f = init_filter(DEFAULT_CUTOFF, 44100);
        f.set_param(PARAM_CUTOFF, 1.0e6);
        assert_eq!(f.param(PARAM_CUTOFF), Some(20000.0));
        assert_eq!(f.param(3), None);
    }

    #[test]
    fn recovers_from_non_finite_input() {
        let mut f = init_filter(1000.0, 44100);
        let mut l = vec![f32::NAN; 16];
        let mut r = vec![f32::INFINITY; 16];
        f.process(&mut l, &mut r);

        let mut l = vec![0.25f32; 2000];
        let mut r = vec![0.25f32; 2000];
        f.process(&mut l, &mut r);
        assert!(l.iter().chain(&r).all(|x| x.is_finite()));
        assert!((l[1999] - 0.25).abs() < 0.01);
    }

    #[test]
    fn nan_cutoff_is_ignored() {
        let mut f = init_filter(1000.0, 44100);
        f.set_param(PARAM_CUTOFF, f32::NAN);
        assert_eq!(f.param(PARAM_CUTOFF), Some(1000.0));
    }
}
