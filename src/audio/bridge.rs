use crate::audio::bands::{Band, BandEnergies};
use serde_json::{Map, Value as Json};

/// Defaults for audio nodes that do not set their own values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioOpts {
    pub gain: f32,
    /// EMA coefficient `k` in `s = k*s + (1-k)*x`.
    pub smoothing: f32,
    pub event_level: f32,
    pub debounce_ms: f32,
}

impl Default for AudioOpts {
    fn default() -> Self {
        Self {
            gain: 1.0,
            smoothing: 0.7,
            event_level: 0.5,
            debounce_ms: 120.0,
        }
    }
}

/// Per-node analysis settings read from the node's `values`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BridgeSettings {
    pub gain: f32,
    pub smoothing: f32,
    pub thresholds: BandEnergies,
    pub event_level: f32,
    pub debounce_ms: f32,
}

impl BridgeSettings {
    pub fn from_defaults(opts: &AudioOpts) -> Self {
        Self {
            gain: opts.gain,
            smoothing: opts.smoothing.clamp(0.0, 1.0),
            thresholds: BandEnergies::ZERO,
            event_level: opts.event_level,
            debounce_ms: opts.debounce_ms.max(0.0),
        }
    }

    /// Accepts `thresholds` either nested (`{"thresholds": {"bass": 0.2}}`) or flat
    /// (`{"thresholds.bass": 0.2}`). `selectedDeviceId` and other keys are ignored.
    pub fn from_values(values: &Map<String, Json>, opts: &AudioOpts) -> Self {
        let num = |v: Option<&Json>| -> Option<f32> {
            let n = match v? {
                Json::Number(n) => n.as_f64().map(|v| v as f32),
                Json::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            n.filter(|v| v.is_finite())
        };
        let mut s = Self::from_defaults(opts);
        if let Some(v) = num(values.get("gain")) {
            s.gain = v.max(0.0);
        }
        if let Some(v) = num(values.get("smoothing")) {
            s.smoothing = v.clamp(0.0, 1.0);
        }
        if let Some(v) = num(values.get("eventLevel")) {
            s.event_level = v;
        }
        if let Some(v) = num(values.get("debounceMs")) {
            s.debounce_ms = v.max(0.0);
        }
        let nested = values.get("thresholds").and_then(Json::as_object);
        for band in Band::ALL {
            let flat = values.get(&format!("thresholds.{}", band.name()));
            let v = num(nested.and_then(|m| m.get(band.name()))).or_else(|| num(flat));
            if let Some(v) = v {
                s.thresholds.set(band, v);
            }
        }
        s
    }
}

/// Levels and edge events an audio node exposes for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioFrame {
    pub levels: BandEnergies,
    pub events: [bool; 5],
}

/// Gain, gate, smoothing and debounced events for one audio node.
///
/// Pipeline per band: `x = raw * gain`, then `s = k*s + (1-k)*x`. The output is 0 when
/// `s <= threshold` or the band is silent (`x <= 0`), otherwise `s` clamped to `[0, 1]`.
/// The envelope is never reset; it decays through the average.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBridge {
    settings: BridgeSettings,
    envelope: [f32; 5],
    prev_level: [f32; 5],
    since_event_ms: [f32; 5],
}

impl AudioBridge {
    pub fn new(settings: BridgeSettings) -> Self {
        Self {
            settings,
            envelope: [0.0; 5],
            prev_level: [0.0; 5],
            since_event_ms: [f32::INFINITY; 5],
        }
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// Consume one tick of raw energies. A missing stream reads as silence.
    pub fn process(&mut self, raw: Option<&BandEnergies>, dt: f32) -> AudioFrame {
        let raw = raw.copied().unwrap_or_default();
        let s = self.settings;
        let dt_ms = if dt.is_finite() { dt.max(0.0) * 1000.0 } else { 0.0 };
        let mut frame = AudioFrame::default();

        for band in Band::ALL {
            let i = band.index();
            let mut x = raw.get(band) * s.gain;
            if !x.is_finite() {
                x = 0.0;
            }
            let k = s.smoothing;
            self.envelope[i] = k * self.envelope[i] + (1.0 - k) * x;
            let smoothed = self.envelope[i];
            let level = if x <= 0.0 || smoothed <= s.thresholds.get(band) {
                0.0
            } else {
                smoothed.clamp(0.0, 1.0)
            };

            self.since_event_ms[i] += dt_ms;
            let crossed = level >= s.event_level && self.prev_level[i] < s.event_level;
            if crossed && self.since_event_ms[i] >= s.debounce_ms {
                frame.events[i] = true;
                self.since_event_ms[i] = 0.0;
            }
            self.prev_level[i] = level;
            frame.levels.set(band, level);
        }
        frame
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/bridge.rs"]
mod tests;
