//! Four-voice subtractive synth: drifting saw into a one-pole low-pass.
//!
//! Each voice is a monophonic gate slot matching one pattern track. Voices
//! are panned across the stereo field from left (voice 0) to right (voice 3).

use core::f64::consts::TAU;

use crate::plugin::{ParamInfo, PluginInfo, PluginKind, SynthPlugin};
use crate::plugins::PluginDescriptor;

const VOICES: usize = 4;

/// Filter cutoff at velocity 0.5, before pitch tracking.
const CUTOFF: f64 = 4000.0;
const CUTOFF_TRACKING: f64 = 0.7;
const GAIN_TRACKING: f64 = 0.2;
const OUTPUT_GAIN: f64 = 0.25;

/// Pitch bend range either way, four octaves.
const MAX_BEND_CENTS: f32 = 4800.0;

/// Amplitude under which a released voice goes idle.
const SILENCE: f64 = 1.0e-6;

const PARAM_ATTACK: u16 = 0;
const PARAM_RELEASE: u16 = 1;

static PARAMS: &[ParamInfo] = &[
    ParamInfo {
        id: PARAM_ATTACK,
        name: "attack",
        unit: "s",
        min: 0.0,
        max: 10.0,
        default: 0.003,
        is_enum: false,
    },
    ParamInfo {
        id: PARAM_RELEASE,
        name: "release",
        unit: "s",
        min: 0.0,
        max: 10.0,
        default: 0.010,
        is_enum: false,
    },
];

static INFO: PluginInfo = PluginInfo {
    name: "simplesynth",
    kind: PluginKind::Instrument,
    inputs: 0,
    outputs: 2,
    voices: VOICES as u16,
    params: PARAMS,
};

pub(super) const DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    name: "simplesynth",
    state_size,
    create,
};

fn state_size(_sample_rate: u32) -> usize {
    core::mem::size_of::<SimpleSynth>()
}

fn create() -> Box<dyn SynthPlugin> {
    Box::new(SimpleSynth::new())
}

#[derive(Clone, Copy, Debug, Default)]
struct Voice {
    phase: f64,
    freq: f64,
    smoothed_freq: f64,
    cutoff: f64,
    gate: f64,
    amp: f64,
    lowpass: f64,
    active: bool,
}

pub struct SimpleSynth {
    voices: [Voice; VOICES],
    sample_rate: f64,
    attack: f64,
    release: f64,
    freq_attack: f64,
    bend: f64,
    modulation: f64,
    gain: f64,
}

impl SimpleSynth {
    pub fn new() -> Self {
        Self {
            voices: [Voice::default(); VOICES],
            sample_rate: 44100.0,
            attack: PARAMS[0].default as f64,
            release: PARAMS[1].default as f64,
            freq_attack: 0.003,
            bend: 1.0,
            modulation: 0.35,
            gain: 1.0,
        }
    }

    /// Per-sample smoothing coefficient for a time constant in seconds.
    fn coeff(&self, seconds: f64) -> f64 {
        (1.0 / (seconds * self.sample_rate + 1.0e-7)).min(0.5)
    }

    /// Number of voices currently sounding or releasing.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }
}

impl Default for SimpleSynth {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthPlugin for SimpleSynth {
    fn info(&self) -> &PluginInfo {
        &INFO
    }

    fn init(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1) as f64;
        for voice in &mut self.voices {
            *voice = Voice::default();
        }
    }

    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        left.fill(0.0);
        right.fill(0.0);

        let attack = self.coeff(self.attack);
        let release = self.coeff(self.release);
        let glide = self.coeff(self.freq_attack);
        let sample_rate = self.sample_rate;
        let bend = self.bend;
        let cutoff_scale = 0.5 + self.modulation;
        let gain = self.gain * OUTPUT_GAIN;

        for (index, v) in self.voices.iter_mut().enumerate() {
            if !v.active {
                continue;
            }
            let pan = (index as f64 + 0.5) / VOICES as f64;
            let gain_l = (1.0 - pan).sqrt() * gain;
            let gain_r = pan.sqrt() * gain;
            let target = v.freq * bend;

            for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                v.smoothed_freq += (target - v.smoothed_freq) * glide;
                v.phase += v.smoothed_freq / sample_rate;
                v.phase -= v.phase.floor();
                let saw = 2.0 * v.phase - 1.0;

                let diff = v.gate - v.amp;
                v.amp += diff * if diff > 0.0 { attack } else { release };

                let tracking = (v.smoothed_freq / 440.0).max(1.0e-3);
                let cutoff = v.cutoff * cutoff_scale * tracking.powf(CUTOFF_TRACKING);
                let omega = (cutoff * TAU / sample_rate).min(1.0e3);
                v.lowpass += (saw * v.amp - v.lowpass) * (omega / (omega + 1.0));

                let out = v.lowpass * tracking.powf(-GAIN_TRACKING);
                *l += (out * gain_l) as f32;
                *r += (out * gain_r) as f32;
            }

            if !v.lowpass.is_finite() || (v.gate == 0.0 && v.amp < SILENCE) {
                *v = Voice::default();
            }
        }
    }

    fn note_on(&mut self, voice: usize, freq: f32, velocity: f32) {
        if !freq.is_finite() || !velocity.is_finite() {
            return;
        }
        let Some(v) = self.voices.get_mut(voice) else {
            return;
        };
        if !v.active {
            // an idle voice starts from silence at the new pitch
            *v = Voice {
                smoothed_freq: freq as f64,
                ..Voice::default()
            };
        }
        v.freq = freq as f64;
        v.cutoff = CUTOFF * velocity.clamp(0.0, 1.0) as f64 * 2.0;
        v.gate = 1.0;
        v.active = true;
    }

    fn note_off(&mut self, voice: usize) {
        if let Some(v) = self.voices.get_mut(voice) {
            v.gate = 0.0;
        }
    }

    fn pitch_bend(&mut self, cents: f32) {
        if cents.is_finite() {
            let cents = cents.clamp(-MAX_BEND_CENTS, MAX_BEND_CENTS) as f64;
            self.bend = (cents / 1200.0).exp2();
        }
    }

    fn mod_wheel(&mut self, value: f32) {
        if !value.is_nan() {
            self.modulation = value.clamp(0.0, 1.0) as f64;
        }
    }

    fn volume(&mut self, value: f32) {
        if !value.is_nan() {
            self.gain = value.clamp(0.0, 1.0) as f64;
        }
    }

    fn param(&self, id: u16) -> Option<f32> {
        match id {
            PARAM_ATTACK => Some(self.attack as f32),
            PARAM_RELEASE => Some(self.release as f32),
            _ => None,
        }
    }

    fn set_param(&mut self, id: u16, value: f32) {
        let Some(info) = INFO.param(id) else {
            return;
        };
        let value = value.clamp(info.min, info.max) as f64;
        match id {
            PARAM_ATTACK => self.attack = value,
            PARAM_RELEASE => self.release = value,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth() -> SimpleSynth {
        let mut s = SimpleSynth::new();
        s.init(48000);
        s
    }

    fn peak(buf: &[f32]) -> f32 {
        buf.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }

    #[test]
    fn silent_without_notes() {
        let mut s = synth();
        let mut l = vec![1.0f32; 256];
        let mut r = vec![1.0f32; 256];
        s.process(&mut l, &mut r);
        assert_eq!(peak(&l), 0.0);
        assert_eq!(peak(&r), 0.0);
    }

    #[test]
    fn note_on_produces_sound() {
        let mut s = synth();
        s.note_on(0, 220.0, 0.5);
        let mut l = vec![0.0f32; 4800];
        let mut r = vec![0.0f32; 4800];
        s.process(&mut l, &mut r);
        assert!(peak(&l) > 1.0e-3, "peak {}", peak(&l));
        // voice 0 is panned left
        assert!(peak(&l) > peak(&r));
        assert!(peak(&l) <= 1.0);
    }

    #[test]
    fn released_voice_goes_idle() {
        let mut s = synth();
        s.note_on(3, 440.0, 0.5);
        let mut l = vec![0.0f32; 4800];
        let mut r = vec![0.0f32; 4800];
        s.process(&mut l, &mut r);
        assert_eq!(s.active_voices(), 1);

        s.note_off(3);
        for _ in 0..10 {
            s.process(&mut l, &mut r);
        }
        assert_eq!(s.active_voices(), 0);
    }

    #[test]
    fn out_of_range_voice_is_ignored() {
        let mut s = synth();
        s.note_on(VOICES, 440.0, 0.5);
        s.note_off(VOICES + 10);
        assert_eq!(s.active_voices(), 0);
    }

    #[test]
    fn non_finite_pitch_is_ignored() {
        let mut s = synth();
        s.note_on(0, f32::INFINITY, 0.5);
        s.note_on(1, f32::NAN, 0.5);
        s.note_on(2, 220.0, f32::NAN);
        assert_eq!(s.active_voices(), 0);
    }

    #[test]
    fn idle_voice_restarts_clean() {
        let mut s = synth();
        s.voices[0].phase = f64::NAN;
        s.voices[0].lowpass = f64::NAN;
        s.voices[0].amp = 0.7;

        s.note_on(0, 220.0, 0.5);
        let mut l = vec![0.0f32; 4800];
        let mut r = vec![0.0f32; 4800];
        s.process(&mut l, &mut r);
        assert!(l.iter().chain(&r).all(|x| x.is_finite()));
        assert!(peak(&l) > 1.0e-3);
    }

    #[test]
    fn runaway_voice_recovers() {
        let mut s = synth();
        s.note_on(1, 220.0, 0.5);
        s.voices[1].lowpass = f64::INFINITY;
        let mut l = vec![0.0f32; 480];
        let mut r = vec![0.0f32; 480];
        s.process(&mut l, &mut r);
        assert_eq!(s.active_voices(), 0);

        s.note_on(1, 220.0, 0.5);
        s.process(&mut l, &mut r);
        assert!(l.iter().chain(&r).all(|x| x.is_finite()));
        assert!(peak(&r) > 0.0);
    }

    #[test]
    fn volume_scales_output() {
        let mut s = synth();
        s.volume(0.0);
        s.note_on(0, 220.0, 0.5);
        let mut l = vec![0.0f32; 4800];
        let mut r = vec![0.0f32; 4800];
        s.process(&mut l, &mut r);
        assert_eq!(peak(&l), 0.0);

        s.volume(2.0);
        assert_eq!(s.gain, 1.0);
        s.volume(f32::NAN);
        assert_eq!(s.gain, 1.0);
        s.process(&mut l, &mut r);
        assert!(peak(&l) > 1.0e-3);
    }

    #[test]
    fn pitch_bend_retunes_voices() {
        let mut s = synth();
        s.pitch_bend(1200.0);
        assert!((s.bend - 2.0).abs() < 1.0e-12);
        s.pitch_bend(-1200.0);
        assert!((s.bend - 0.5).abs() < 1.0e-12);
        s.pitch_bend(f32::INFINITY);
        assert!((s.bend - 0.5).abs() < 1.0e-12);
        s.pitch_bend(1.0e9);
        assert!((s.bend - 16.0).abs() < 1.0e-9);

        // the bent target pulls the glide up
        s.pitch_bend(1200.0);
        s.note_on(0, 200.0, 0.5);
        let mut l = vec![0.0f32; 4800];
        let mut r = vec![0.0f32; 4800];
        s.process(&mut l, &mut r);
        assert!((s.voices[0].smoothed_freq - 400.0).abs() < 1.0);
    }

    #[test]
    fn mod_wheel_is_clamped() {
        let mut s = synth();
        s.mod_wheel(3.0);
        assert_eq!(s.modulation, 1.0);
        s.mod_wheel(-1.0);
        assert_eq!(s.modulation, 0.0);
    }

    #[test]
    fn params_are_clamped() {
        let mut s = synth();
        s.set_param(PARAM_ATTACK, 20.0);
        assert_eq!(s.param(PARAM_ATTACK), Some(10.0));
        s.set_param(PARAM_RELEASE, 0.5);
        assert_eq!(s.param(PARAM_RELEASE), Some(0.5));
        assert_eq!(s.param(9), None);
    }
}
