use crate::audio::bands::BandEnergies;

/// Provider of raw band energies, sampled once per tick.
///
/// Acquisition (devices, decoding) happens outside `tick`; implementations only hand over the
/// latest value and must not block. `None` means no stream is available and every band reads 0.
pub trait AudioSource: Send {
    fn band_energies(&mut self, dt: f32) -> Option<BandEnergies>;
}

/// No stream at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSource;

impl AudioSource for SilentSource {
    fn band_energies(&mut self, _dt: f32) -> Option<BandEnergies> {
        None
    }
}

/// Scripted energies, one entry per tick. After the script ends the source reports no stream,
/// or starts over when looping.
#[derive(Clone, Debug, Default)]
pub struct FixedSource {
    frames: Vec<BandEnergies>,
    pos: usize,
    looping: bool,
}

impl FixedSource {
    pub fn new(frames: Vec<BandEnergies>) -> Self {
        Self {
            frames,
            pos: 0,
            looping: false,
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }
}

impl AudioSource for FixedSource {
    fn band_energies(&mut self, _dt: f32) -> Option<BandEnergies> {
        if self.frames.is_empty() {
            return None;
        }
        if self.pos >= self.frames.len() {
            if !self.looping {
                return None;
            }
            self.pos = 0;
        }
        let e = self.frames[self.pos];
        self.pos += 1;
        Some(e)
    }
}
