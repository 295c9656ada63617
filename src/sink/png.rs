use crate::foundation::core::{FrameIndex, NodeId, Texture};
use crate::foundation::error::{PatchError, PatchResult};
use crate::sink::OutputSink;
use std::path::{Path, PathBuf};

/// Writes snapshots, and every presented frame while recording, as PNG files under `dir`.
///
/// Files: `snapshot_<frame>_<node>.png` and `rec_<take>/frame_<frame>.png`.
#[derive(Debug)]
pub struct PngSink {
    dir: PathBuf,
    take: u32,
    recording: Option<NodeId>,
    written: Vec<PathBuf>,
}

impl PngSink {
    pub fn new(dir: impl Into<PathBuf>) -> PatchResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            PatchError::sink(format!("create output dir '{}': {e}", dir.display()))
        })?;
        Ok(Self {
            dir,
            take: 0,
            recording: None,
            written: Vec::new(),
        })
    }

    /// Every file written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write(&mut self, path: PathBuf, texture: &Texture) -> PatchResult<()> {
        write_png(&path, texture)?;
        tracing::debug!(path = %path.display(), "png written");
        self.written.push(path);
        Ok(())
    }
}

/// Encode `texture` as an RGBA8 PNG at `path`.
pub fn write_png(path: &Path, texture: &Texture) -> PatchResult<()> {
    image::save_buffer_with_format(
        path,
        texture.data(),
        texture.width(),
        texture.height(),
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| PatchError::sink(format!("write png '{}': {e}", path.display())))
}

impl OutputSink for PngSink {
    fn present(&mut self, frame: FrameIndex, node: NodeId, texture: &Texture) -> PatchResult<()> {
        if self.recording != Some(node) {
            return Ok(());
        }
        let path = self
            .dir
            .join(format!("rec_{:03}", self.take))
            .join(format!("frame_{:06}.png", frame.0));
        self.write(path, texture)
    }

    fn capture_snapshot(
        &mut self,
        frame: FrameIndex,
        node: NodeId,
        texture: &Texture,
    ) -> PatchResult<()> {
        let path = self
            .dir
            .join(format!("snapshot_{:06}_{}.png", frame.0, node.0));
        self.write(path, texture)
    }

    fn start_recording(&mut self, _frame: FrameIndex, node: NodeId) -> PatchResult<()> {
        self.take += 1;
        let take_dir = self.dir.join(format!("rec_{:03}", self.take));
        std::fs::create_dir_all(&take_dir).map_err(|e| {
            PatchError::sink(format!("create '{}': {e}", take_dir.display()))
        })?;
        self.recording = Some(node);
        Ok(())
    }

    fn stop_recording(&mut self, _frame: FrameIndex, node: NodeId) -> PatchResult<()> {
        if self.recording == Some(node) {
            self.recording = None;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sink/png.rs"]
mod tests;
