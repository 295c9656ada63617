/// One of the named analysis bands exposed to the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    Volume,
    Bass,
    BassExciter,
    Mid,
    High,
}

impl Band {
    pub const ALL: [Band; 5] = [
        Band::Volume,
        Band::Bass,
        Band::BassExciter,
        Band::Mid,
        Band::High,
    ];

    /// Output port and `thresholds.<band>` key.
    pub fn name(self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Bass => "bass",
            Self::BassExciter => "bassExciter",
            Self::Mid => "mid",
            Self::High => "high",
        }
    }

    /// Edge-triggered companion port.
    pub fn event_port(self) -> &'static str {
        match self {
            Self::Volume => "volumeEvent",
            Self::Bass => "bassEvent",
            Self::BassExciter => "bassExciterEvent",
            Self::Mid => "midEvent",
            Self::High => "highEvent",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Per-tick energies for every band, nominally in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BandEnergies {
    pub volume: f32,
    pub bass: f32,
    pub bass_exciter: f32,
    pub mid: f32,
    pub high: f32,
}

impl BandEnergies {
    pub const ZERO: Self = Self {
        volume: 0.0,
        bass: 0.0,
        bass_exciter: 0.0,
        mid: 0.0,
        high: 0.0,
    };

    pub fn get(&self, band: Band) -> f32 {
        match band {
            Band::Volume => self.volume,
            Band::Bass => self.bass,
            Band::BassExciter => self.bass_exciter,
            Band::Mid => self.mid,
            Band::High => self.high,
        }
    }

    pub fn set(&mut self, band: Band, v: f32) {
        match band {
            Band::Volume => self.volume = v,
            Band::Bass => self.bass = v,
            Band::BassExciter => self.bass_exciter = v,
            Band::Mid => self.mid = v,
            Band::High => self.high = v,
        }
    }

    /// Same value in every band.
    pub fn splat(v: f32) -> Self {
        let mut e = Self::ZERO;
        for band in Band::ALL {
            e.set(band, v);
        }
        e
    }
}
