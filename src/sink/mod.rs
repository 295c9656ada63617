//! Output sink contract: where presented frames and output-node events go.

pub mod memory;
pub mod png;

pub use memory::{InMemorySink, SinkRecord};
pub use png::PngSink;

use crate::foundation::core::{FrameIndex, NodeId, Texture};
use crate::foundation::error::PatchResult;

/// Edge-triggered side-channel request raised by an output node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SinkEvent {
    Snapshot,
    StartRecording,
    StopRecording,
    ShowA,
    ShowB,
}

impl SinkEvent {
    pub fn name(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::StartRecording => "startRecording",
            Self::StopRecording => "stopRecording",
            Self::ShowA => "showA",
            Self::ShowB => "showB",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplaySlot {
    A,
    B,
}

/// Receiver of each tick's final frames and output-node events.
///
/// Ordering contract: calls for frame `n` all happen before any call for frame `n + 1`, and
/// within one frame `present` precedes the events of the same output node.
pub trait OutputSink: Send {
    fn present(&mut self, frame: FrameIndex, node: NodeId, texture: &Texture) -> PatchResult<()>;

    fn capture_snapshot(
        &mut self,
        frame: FrameIndex,
        node: NodeId,
        texture: &Texture,
    ) -> PatchResult<()>;

    fn start_recording(&mut self, frame: FrameIndex, node: NodeId) -> PatchResult<()>;

    fn stop_recording(&mut self, frame: FrameIndex, node: NodeId) -> PatchResult<()>;

    fn show(&mut self, _node: NodeId, _slot: DisplaySlot) -> PatchResult<()> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn present(&mut self, _: FrameIndex, _: NodeId, _: &Texture) -> PatchResult<()> {
        Ok(())
    }

    fn capture_snapshot(&mut self, _: FrameIndex, _: NodeId, _: &Texture) -> PatchResult<()> {
        Ok(())
    }

    fn start_recording(&mut self, _: FrameIndex, _: NodeId) -> PatchResult<()> {
        Ok(())
    }

    fn stop_recording(&mut self, _: FrameIndex, _: NodeId) -> PatchResult<()> {
        Ok(())
    }
}
