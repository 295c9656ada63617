//! Audio analysis bridge: raw band energies in, gated and smoothed node outputs out.

pub mod bands;
pub mod bridge;
pub mod pcm;
pub mod source;

pub use bands::{Band, BandEnergies};
pub use bridge::{AudioBridge, AudioFrame, AudioOpts, BridgeSettings};
pub use pcm::PcmBandSource;
pub use source::{AudioSource, FixedSource, SilentSource};
