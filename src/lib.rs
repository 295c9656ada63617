#![forbid(unsafe_code)]
//! `vizpatch` runs node-based visual-synthesis patches frame by frame.
//!
//! A patch is a graph of generator, effect, audio, animation and output nodes. Loading types
//! every control against the [`NodeRegistry`]; scheduling breaks feedback cycles with one-frame
//! delays; each [`Runtime::tick`] replays the schedule and hands the result to an
//! [`OutputSink`].
//!
//! ```no_run
//! use vizpatch::{Runtime, RuntimeOpts};
//!
//! # fn main() -> vizpatch::PatchResult<()> {
//! let json = std::fs::read_to_string("patch.json").map_err(anyhow::Error::from)?;
//! let mut rt = Runtime::from_json(&json, RuntimeOpts::default())?;
//! let report = rt.tick(1.0 / 60.0)?;
//! assert_eq!(report.frame.0, 0);
//! # Ok(())
//! # }
//! ```

pub mod animation;
pub mod audio;
pub mod eval;
pub mod foundation;
pub mod graph;
pub mod ports;
pub mod registry;
pub mod schedule;
pub mod session;
pub mod sink;

pub use animation::{AnimState, Animator, Ease, LoopMode};
pub use audio::{AudioSource, Band, BandEnergies, FixedSource, PcmBandSource, SilentSource};
pub use foundation::core::{Canvas, FrameIndex, NodeId, Rgba, Texture};
pub use foundation::diagnostic::{Diagnostic, DiagnosticKind, LoadFailure, Severity};
pub use foundation::error::{PatchError, PatchResult};
pub use foundation::hash::Fingerprint;
pub use graph::{Connection, Graph, LoadedPatch, Node, load_patch, serialize_patch};
pub use ports::{PortType, Value};
pub use registry::{NodeDescriptor, NodeRegistry};
pub use schedule::{FeedbackEdge, Schedule, ScheduleCache};
pub use session::{Runtime, RuntimeOpts, TickReport};
pub use sink::{InMemorySink, NullSink, OutputSink, PngSink, SinkEvent};
