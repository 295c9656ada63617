//! A patch activated for playback.

pub mod runtime;

pub use runtime::{Runtime, RuntimeOpts, TickReport};
