//! Software renderers for the image output.
//!
//! The backend has no GPU.  The host composites into the mapped surface
//! through an [`OutputRenderer`]; the renderer here clears damaged regions
//! to a configured background colour, which is what an output with no
//! client surfaces shows.

use tracing::trace;
use vfb_core::domain::{damage::Damage, surface::SurfaceView};

use crate::application::output_lifecycle::{OutputRenderer, RenderError};

/// Default background, opaque dark grey (ARGB).
pub const DEFAULT_BACKGROUND: u32 = 0xFF20_2020;

/// Fills every damaged rectangle with one colour.
#[derive(Debug, Clone)]
pub struct SolidFillRenderer {
    color: u32,
    frames: u64,
}

impl SolidFillRenderer {
    pub fn new(color: u32) -> Self {
        Self { color, frames: 0 }
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn set_color(&mut self, color: u32) {
        self.color = color;
    }

    /// Number of successful repaints.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for SolidFillRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_BACKGROUND)
    }
}

impl OutputRenderer for SolidFillRenderer {
    fn repaint_output(
        &mut self,
        mut target: SurfaceView<'_>,
        damage: &Damage,
    ) -> Result<(), RenderError> {
        let mut filled = 0;
        for rect in damage.rects() {
            filled += target.fill_rect(*rect, self.color);
        }
        self.frames += 1;
        trace!(frame = self.frames, pixels = filled, "solid fill");
        Ok(())
    }
}
