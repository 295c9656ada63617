use crate::foundation::core::{FrameIndex, NodeId, Texture};
use crate::foundation::error::PatchResult;
use crate::sink::{DisplaySlot, OutputSink};

/// One non-frame call received by an [`InMemorySink`].
#[derive(Clone, Debug, PartialEq)]
pub enum SinkRecord {
    Snapshot(FrameIndex, NodeId),
    StartRecording(FrameIndex, NodeId),
    StopRecording(FrameIndex, NodeId),
    Show(NodeId, DisplaySlot),
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    /// Presented frames in call order.
    pub frames: Vec<(FrameIndex, NodeId, Texture)>,
    pub snapshots: Vec<(FrameIndex, NodeId, Texture)>,
    pub records: Vec<SinkRecord>,
    recording: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn last_frame(&self) -> Option<&Texture> {
        self.frames.last().map(|(_, _, t)| t)
    }
}

impl OutputSink for InMemorySink {
    fn present(&mut self, frame: FrameIndex, node: NodeId, texture: &Texture) -> PatchResult<()> {
        self.frames.push((frame, node, texture.clone()));
        Ok(())
    }

    fn capture_snapshot(
        &mut self,
        frame: FrameIndex,
        node: NodeId,
        texture: &Texture,
    ) -> PatchResult<()> {
        self.snapshots.push((frame, node, texture.clone()));
        self.records.push(SinkRecord::Snapshot(frame, node));
        Ok(())
    }

    fn start_recording(&mut self, frame: FrameIndex, node: NodeId) -> PatchResult<()> {
        self.recording = true;
        self.records.push(SinkRecord::StartRecording(frame, node));
        Ok(())
    }

    fn stop_recording(&mut self, frame: FrameIndex, node: NodeId) -> PatchResult<()> {
        self.recording = false;
        self.records.push(SinkRecord::StopRecording(frame, node));
        Ok(())
    }

    fn show(&mut self, node: NodeId, slot: DisplaySlot) -> PatchResult<()> {
        self.records.push(SinkRecord::Show(node, slot));
        Ok(())
    }
}
