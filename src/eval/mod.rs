//! Per-frame evaluation of a scheduled graph.

pub mod fingerprint;
pub mod frame;

pub use fingerprint::fingerprint_frame;
pub use frame::{FrameEvaluator, FrameInputs, FrameResult};
