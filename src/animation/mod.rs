//! Time-driven tweens: easing curves and the per-node animation state machine.

pub mod driver;
pub mod ease;

pub use driver::{AnimState, AnimationSpec, Animator, LoopMode};
pub use ease::Ease;
