use crate::audio::bands::{Band, BandEnergies};
use crate::audio::source::AudioSource;
use crate::foundation::error::{PatchError, PatchResult};
use anyhow::Context;
use std::path::Path;

const BASS_CUTOFF_HZ: f32 = 250.0;
const HIGH_CUTOFF_HZ: f32 = 4000.0;
/// Scale applied to positive bass flux so a sharp kick reads near 1.
const EXCITER_GAIN: f32 = 4.0;

/// Clamp a cutoff into `(0, nyquist)`; `None` for an unusable sample rate.
fn normalize_cutoff(cutoff_hz: f32, sample_rate: f32) -> Option<f32> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return None;
    }
    let max_cutoff = (sample_rate * 0.5 - 1.0).max(1.0);
    Some(cutoff_hz.max(1.0).min(max_cutoff))
}

/// Streaming 2nd-order Butterworth section (Q = 0.707).
#[derive(Clone, Copy, Debug, Default)]
struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    fn identity() -> Self {
        Self {
            b0: 1.0,
            ..Self::default()
        }
    }

    fn lowpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let Some(cutoff) = normalize_cutoff(cutoff_hz, sample_rate) else {
            return Self::identity();
        };
        let omega = std::f32::consts::TAU * cutoff / sample_rate;
        let cos = omega.cos();
        let alpha = omega.sin() / (2.0 * 0.707);
        let a0 = 1.0 + alpha;
        Self {
            b0: (1.0 - cos) / 2.0 / a0,
            b1: (1.0 - cos) / a0,
            b2: (1.0 - cos) / 2.0 / a0,
            a1: -2.0 * cos / a0,
            a2: (1.0 - alpha) / a0,
            ..Self::default()
        }
    }

    fn highpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let Some(cutoff) = normalize_cutoff(cutoff_hz, sample_rate) else {
            return Self::identity();
        };
        let omega = std::f32::consts::TAU * cutoff / sample_rate;
        let cos = omega.cos();
        let alpha = omega.sin() / (2.0 * 0.707);
        let a0 = 1.0 + alpha;
        Self {
            b0: (1.0 + cos) / 2.0 / a0,
            b1: -(1.0 + cos) / a0,
            b2: (1.0 + cos) / 2.0 / a0,
            a1: -2.0 * cos / a0,
            a2: (1.0 - alpha) / a0,
            ..Self::default()
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// File-backed source: interleaved little-endian `f32` PCM, down-mixed to mono and split into
/// bass/mid/high with biquad filters. Each tick consumes `dt * sample_rate` samples.
#[derive(Clone, Debug)]
pub struct PcmBandSource {
    samples: Vec<f32>,
    sample_rate: u32,
    pos: usize,
    carry: f64,
    bass: Biquad,
    mid_hp: Biquad,
    mid_lp: Biquad,
    high: Biquad,
    prev_bass: f32,
}

impl PcmBandSource {
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> PatchResult<Self> {
        if sample_rate == 0 {
            return Err(PatchError::validation("audio sample rate must be > 0"));
        }
        let sr = sample_rate as f32;
        Ok(Self {
            samples,
            sample_rate,
            pos: 0,
            carry: 0.0,
            bass: Biquad::lowpass(BASS_CUTOFF_HZ, sr),
            mid_hp: Biquad::highpass(BASS_CUTOFF_HZ, sr),
            mid_lp: Biquad::lowpass(HIGH_CUTOFF_HZ, sr),
            high: Biquad::highpass(HIGH_CUTOFF_HZ, sr),
            prev_bass: 0.0,
        })
    }

    pub fn from_f32le_bytes(bytes: &[u8], sample_rate: u32, channels: u16) -> PatchResult<Self> {
        if channels == 0 {
            return Err(PatchError::validation("audio channel count must be > 0"));
        }
        if bytes.len() % 4 != 0 {
            return Err(PatchError::validation(format!(
                "f32le audio length {} is not a multiple of 4",
                bytes.len()
            )));
        }
        let ch = usize::from(channels);
        let interleaved: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        let mono = interleaved
            .chunks(ch)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();
        Self::from_mono(mono, sample_rate)
    }

    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, sample_rate: u32, channels: u16) -> PatchResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read f32le audio '{}'", path.display()))?;
        Self::from_f32le_bytes(&bytes, sample_rate, channels)
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.samples.len()
    }
}

impl AudioSource for PcmBandSource {
    fn band_energies(&mut self, dt: f32) -> Option<BandEnergies> {
        if self.is_exhausted() || !dt.is_finite() || dt <= 0.0 {
            return None;
        }
        let want = f64::from(dt) * f64::from(self.sample_rate) + self.carry;
        let n = want.floor() as usize;
        self.carry = want - n as f64;
        let end = (self.pos + n).min(self.samples.len());
        let window = &self.samples[self.pos..end];
        self.pos = end;
        if window.is_empty() {
            return Some(BandEnergies::ZERO);
        }

        let mut sq = [0.0f64; 4];
        for &x in window {
            let bass = self.bass.process(x);
            let mid = self.mid_lp.process(self.mid_hp.process(x));
            let high = self.high.process(x);
            for (acc, v) in sq.iter_mut().zip([x, bass, mid, high]) {
                *acc += f64::from(v) * f64::from(v);
            }
        }
        // RMS of a full-scale sine is 1/sqrt(2); rescale so it reads 1.
        let level =
            |s: f64| ((s / window.len() as f64).sqrt() * std::f64::consts::SQRT_2).min(1.0) as f32;

        let mut e = BandEnergies::ZERO;
        e.set(Band::Volume, level(sq[0]));
        e.set(Band::Bass, level(sq[1]));
        e.set(Band::Mid, level(sq[2]));
        e.set(Band::High, level(sq[3]));
        let flux = (e.bass - self.prev_bass).max(0.0) * EXCITER_GAIN;
        e.set(Band::BassExciter, flux.min(1.0));
        self.prev_bass = e.bass;
        Some(e)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/pcm.rs"]
mod tests;
