// Render backend that draws nothing, for driving frames in tests

use super::{Camera, FrameOutcome, RenderBackend, Scene};
use anyhow::Result;
use std::cell::Cell;

/// Records what the simulation asked of it instead of drawing
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    pub frames_rendered: u64,
    pub frames_failed: u64,
    pub frames_skipped: u64,
    pub frames_requested: Cell<u64>,
    pub size: Option<(u32, u32)>,
    /// Node count of the last rendered scene
    pub last_node_count: usize,
    /// Make every render call fail, as a lost device would
    pub fail_renders: bool,
    /// Number of upcoming render calls that skip, as a rebuilt surface does
    pub skip_renders: u32,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_renders: true,
            ..Self::default()
        }
    }
}

impl RenderBackend for HeadlessBackend {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.size = Some((width, height));
        }
    }

    fn render(&mut self, scene: &Scene, _camera: &Camera) -> Result<FrameOutcome> {
        if self.fail_renders {
            self.frames_failed += 1;
            anyhow::bail!("device unavailable");
        }
        if self.skip_renders > 0 {
            self.skip_renders -= 1;
            self.frames_skipped += 1;
            return Ok(FrameOutcome::Skipped);
        }
        self.frames_rendered += 1;
        self.last_node_count = scene.len();
        Ok(FrameOutcome::Presented)
    }

    fn request_frame(&self) {
        self.frames_requested.set(self.frames_requested.get() + 1);
    }
}
