//! OutputLifecycle: creation, mapping, and teardown of a virtual output.
//!
//! # States
//!
//! ```text
//!             create()            enable()
//!   (none) ───────────▶ Unopened ──────────▶ Mapped
//!                                           │    ▲
//!                                 disable() │    │ reenable(), same mode
//!                                           ▼    │
//!                                          Disabled
//!                                              │
//!                      reenable(), mode changed│ close storage, reopen at new
//!                                              ▼ size, map again
//!                                            Mapped
//!
//!   destroy() from any state ──▶ Destroyed
//! ```
//!
//! The output keeps the descriptor it was created with across `Disabled`.
//! When the session comes back, [`OutputLifecycle::reenable`] asks the
//! descriptor source again and compares: an unchanged mode just re-maps the
//! existing storage, a changed mode rebuilds the storage at the new size.
//!
//! # Ports
//!
//! Everything the lifecycle touches outside its own state goes through a
//! trait so the state machine can be tested without files or a compositor:
//!
//! - [`FramebufferDevice`] – backing storage and its memory mapping.
//! - [`ScreenDescriptorSource`] – where the current mode comes from.
//! - [`OutputRenderer`] – draws damaged regions into the mapped surface.
//! - [`HostCompositor`] – presentation clock and frame completion.

use std::ops::DerefMut;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, trace, warn};
use vfb_core::domain::{
    damage::Damage,
    screen::{ScreenDescriptor, ScreenError, SurfaceLayout},
    surface::{FramebufferSurface, SurfaceError, SurfaceView},
};

use crate::application::frame_scheduler::FrameScheduler;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that make an output unusable.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("screen descriptor query failed: {0}")]
    DescriptorQuery(String),

    #[error("invalid screen descriptor: {0}")]
    InvalidDescriptor(#[from] ScreenError),

    #[error("framebuffer storage {operation} failed for {target}: {source}")]
    Storage {
        operation: &'static str,
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("framebuffer mapping rejected: {0}")]
    Surface(#[from] SurfaceError),

    #[error("output {0} has been destroyed")]
    Destroyed(String),

    #[error("renderer failed: {0}")]
    Render(#[from] RenderError),
}

/// Renderer failure while painting damaged regions.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer failure: {0}")]
    Failed(String),
}

// ── Ports ─────────────────────────────────────────────────────────────────────

/// Supplies the output's current mode.
pub trait ScreenDescriptorSource: Send + Sync {
    fn query(&self) -> Result<ScreenDescriptor, OutputError>;
}

/// Backing storage for a framebuffer and its memory mapping.
///
/// `open` sizes the storage, `map` hands out memory of exactly
/// `layout.length` bytes, `unmap` takes it back, and `close` releases the
/// storage.  The lifecycle guarantees it never holds two mappings at once
/// and always unmaps before closing.
pub trait FramebufferDevice {
    type Memory: DerefMut<Target = [u8]>;

    fn open(&mut self, layout: &SurfaceLayout) -> Result<(), OutputError>;

    fn map(&mut self, layout: &SurfaceLayout) -> Result<Self::Memory, OutputError>;

    fn unmap(&mut self, memory: Self::Memory);

    fn close(&mut self);

    /// Short human-readable name for log records (e.g. the file path).
    fn describe(&self) -> String;
}

/// Draws into a mapped output.
///
/// The renderer only ever borrows the surface for the duration of one call.
pub trait OutputRenderer {
    fn repaint_output(&mut self, target: SurfaceView<'_>, damage: &Damage)
        -> Result<(), RenderError>;
}

/// Presentation feedback flags passed to [`HostCompositor::finish_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFlags(u32);

impl FrameFlags {
    pub const NONE: FrameFlags = FrameFlags(0);
    /// The timestamp does not belong to a real presentation; the host should
    /// just start its repaint cycle.
    pub const INVALID: FrameFlags = FrameFlags(1 << 0);

    pub fn contains(self, other: FrameFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

/// The compositor hooks an output reports to.
#[cfg_attr(test, mockall::automock)]
pub trait HostCompositor {
    /// Current value of the presentation clock.
    fn read_presentation_clock(&self) -> Duration;

    /// Signals that the frame of `output` has been presented.
    fn finish_frame(&self, output: &str, presented_at: Duration, flags: FrameFlags);

    /// Signals that `output` failed and has been torn down.
    fn output_removed(&self, output: &str);
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

/// Where an output is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    /// Storage exists, nothing mapped.
    Unopened,
    /// Storage mapped and wrapped as a surface; repaints are accepted.
    Mapped,
    /// Unmapped while the session is inactive; descriptor retained.
    Disabled,
    Destroyed,
}

/// Result of [`OutputLifecycle::reenable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReenableOutcome {
    /// Mode unchanged; the existing storage was mapped again.
    Remapped,
    /// Mode changed; the storage was rebuilt at the new size.
    Recreated,
    /// The output was still mapped; nothing to do.
    AlreadyMapped,
}

/// Result of [`OutputLifecycle::repaint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepaintOutcome {
    Painted,
    /// The output is not mapped; the request was dropped, not queued.
    Dropped,
}

/// One virtual output backed by a memory-mapped framebuffer.
pub struct OutputLifecycle<D: FramebufferDevice> {
    name: String,
    device: D,
    descriptor: ScreenDescriptor,
    layout: SurfaceLayout,
    surface: Option<FramebufferSurface<D::Memory>>,
    state: OutputState,
    scheduler: FrameScheduler,
    pending: Damage,
}

impl<D: FramebufferDevice> OutputLifecycle<D> {
    /// Queries the descriptor and creates the backing storage.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if the query fails, the descriptor cannot
    /// describe a surface, or the storage cannot be created.
    pub fn create(
        name: impl Into<String>,
        mut device: D,
        source: &dyn ScreenDescriptorSource,
    ) -> Result<Self, OutputError> {
        let name = name.into();
        let descriptor = source.query()?;
        let layout = descriptor.layout()?;
        device.open(&layout)?;

        info!(
            output = %name,
            storage = %device.describe(),
            "created {}x{} output, {} bytes, {:?} at {} mHz",
            layout.width,
            layout.height,
            layout.length,
            layout.format,
            descriptor.refresh_mhz
        );

        Ok(Self {
            name,
            device,
            scheduler: FrameScheduler::new(descriptor.refresh_mhz),
            descriptor,
            layout,
            surface: None,
            state: OutputState::Unopened,
            pending: Damage::none(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> OutputState {
        self.state
    }

    pub fn descriptor(&self) -> &ScreenDescriptor {
        &self.descriptor
    }

    pub fn layout(&self) -> &SurfaceLayout {
        &self.layout
    }

    /// The mapped surface, while the output is `Mapped`.
    pub fn surface(&self) -> Option<&FramebufferSurface<D::Memory>> {
        self.surface.as_ref()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Maps the storage and makes the output drawable.
    ///
    /// Does nothing if the output is already mapped.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if the mapping fails or does not match the
    /// layout, or if the output was destroyed.
    pub fn enable(&mut self) -> Result<(), OutputError> {
        match self.state {
            OutputState::Destroyed => return Err(OutputError::Destroyed(self.name.clone())),
            OutputState::Mapped => {
                debug!(output = %self.name, "enable ignored: already mapped");
                return Ok(());
            }
            OutputState::Unopened | OutputState::Disabled => {}
        }

        let memory = self.device.map(&self.layout)?;
        if memory.len() != self.layout.length {
            let actual = memory.len();
            self.device.unmap(memory);
            return Err(SurfaceError::LengthMismatch {
                expected: self.layout.length,
                actual,
            }
            .into());
        }
        self.surface = Some(FramebufferSurface::new(memory, self.layout)?);
        self.state = OutputState::Mapped;
        debug!(output = %self.name, "framebuffer mapped");
        Ok(())
    }

    /// Unmaps the surface, keeping the descriptor for a later `reenable`.
    ///
    /// Safe to call in any state; only a mapped output changes.
    pub fn disable(&mut self) {
        if self.state != OutputState::Mapped {
            debug!(output = %self.name, state = ?self.state, "disable ignored");
            return;
        }
        if let Some(surface) = self.surface.take() {
            self.device.unmap(surface.into_memory());
        }
        self.pending.clear();
        self.state = OutputState::Disabled;
        info!(output = %self.name, "output disabled");
    }

    /// Brings a disabled output back, rebuilding it if the mode changed.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if the fresh descriptor cannot be obtained or
    /// used, or if storage or mapping fails.  The output is unusable after an
    /// error and should be destroyed.
    pub fn reenable(
        &mut self,
        source: &dyn ScreenDescriptorSource,
    ) -> Result<ReenableOutcome, OutputError> {
        match self.state {
            OutputState::Destroyed => return Err(OutputError::Destroyed(self.name.clone())),
            OutputState::Mapped => return Ok(ReenableOutcome::AlreadyMapped),
            OutputState::Unopened | OutputState::Disabled => {}
        }

        let fresh = source.query()?;
        if fresh.same_mode(&self.descriptor) {
            self.descriptor = fresh;
            self.enable()?;
            info!(output = %self.name, "output re-enabled with unchanged mode");
            return Ok(ReenableOutcome::Remapped);
        }

        let layout = fresh.layout()?;
        info!(
            output = %self.name,
            "mode changed from {}x{} to {}x{}, recreating output",
            self.descriptor.width,
            self.descriptor.height,
            fresh.width,
            fresh.height
        );
        self.device.close();
        self.state = OutputState::Unopened;
        self.device.open(&layout)?;
        self.scheduler.set_refresh(fresh.refresh_mhz);
        self.descriptor = fresh;
        self.layout = layout;
        self.enable()?;
        Ok(ReenableOutcome::Recreated)
    }

    /// Paints `damage` through `renderer` and arms the frame timer.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Render`] if the renderer fails.  The timer is
    /// still armed and the damage is queued again, so the next frame retries.
    pub fn repaint(
        &mut self,
        damage: &Damage,
        renderer: &mut dyn OutputRenderer,
        now: Instant,
    ) -> Result<RepaintOutcome, OutputError> {
        let Some(surface) = self.surface.as_mut() else {
            trace!(output = %self.name, state = ?self.state, "repaint dropped");
            return Ok(RepaintOutcome::Dropped);
        };

        let clipped = damage.clipped(self.layout.width, self.layout.height);
        let rendered = renderer.repaint_output(surface.view_mut(), &clipped);
        self.scheduler.arm(now);
        if let Err(e) = rendered {
            self.pending.extend(&clipped);
            return Err(e.into());
        }
        trace!(output = %self.name, rects = clipped.rects().len(), "repainted");
        Ok(RepaintOutcome::Painted)
    }

    /// Kicks off the host's repaint cycle with an invalid presentation stamp.
    pub fn start_repaint_loop(&self, host: &dyn HostCompositor) {
        let now = host.read_presentation_clock();
        host.finish_frame(&self.name, now, FrameFlags::INVALID);
    }

    /// Reports frame completion if the frame timer has expired.
    ///
    /// The timer is left running across `disable`, so this may fire for a
    /// disabled output; the host simply sees one more finished frame.
    pub fn dispatch_timer(&mut self, now: Instant, host: &dyn HostCompositor) -> bool {
        if !self.scheduler.poll(now) {
            return false;
        }
        let presented_at = host.read_presentation_clock();
        host.finish_frame(&self.name, presented_at, FrameFlags::NONE);
        true
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// Records damage for the next repaint; ignored unless mapped.
    pub fn add_damage(&mut self, damage: &Damage) {
        if self.state == OutputState::Mapped {
            self.pending.extend(damage);
        }
    }

    /// Marks the whole output as needing a repaint.
    pub fn damage_all(&mut self) {
        let full = Damage::full(self.layout.width, self.layout.height);
        self.add_damage(&full);
    }

    pub fn has_pending_damage(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn take_damage(&mut self) -> Damage {
        std::mem::take(&mut self.pending)
    }

    /// Releases the mapping and the storage.  Idempotent.
    pub fn destroy(&mut self) {
        if self.state == OutputState::Destroyed {
            return;
        }
        if let Some(surface) = self.surface.take() {
            self.device.unmap(surface.into_memory());
        }
        self.device.close();
        self.pending.clear();
        self.state = OutputState::Destroyed;
        info!(output = %self.name, "output destroyed");
    }
}

impl<D: FramebufferDevice> Drop for OutputLifecycle<D> {
    fn drop(&mut self) {
        if self.state != OutputState::Destroyed {
            warn!(output = %self.name, "output dropped without destroy; releasing storage");
            self.destroy();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::infrastructure::framebuffer::mock::{DeviceLog, MockFramebufferDevice};
    use crate::infrastructure::renderer::SolidFillRenderer;
    use crate::infrastructure::screen_info::MockScreenSource;

    struct FailingRenderer;

    impl OutputRenderer for FailingRenderer {
        fn repaint_output(&mut self, _: SurfaceView<'_>, _: &Damage) -> Result<(), RenderError> {
            Err(RenderError::Failed("no backing store".into()))
        }
    }

    fn make_output() -> (OutputLifecycle<MockFramebufferDevice>, Arc<DeviceLog>, MockScreenSource) {
        let device = MockFramebufferDevice::new();
        let log = device.log();
        let source = MockScreenSource::new(ScreenDescriptor::with_size(4, 3));
        let output = OutputLifecycle::create("image", device, &source).unwrap();
        (output, log, source)
    }

    // ── create / enable ──────────────────────────────────────────────────────

    #[test]
    fn test_create_opens_storage_of_descriptor_size() {
        // Arrange / Act
        let (output, log, _) = make_output();

        // Assert
        assert_eq!(output.state(), OutputState::Unopened);
        assert_eq!(log.opened_lengths(), vec![4 * 4 * 3]);
        assert_eq!(log.maps(), 0);
    }

    #[test]
    fn test_create_rejects_invalid_descriptor_without_opening_storage() {
        let device = MockFramebufferDevice::new();
        let log = device.log();
        let source = MockScreenSource::new(ScreenDescriptor::with_size(0, 3));

        let result = OutputLifecycle::create("image", device, &source);

        assert!(matches!(result, Err(OutputError::InvalidDescriptor(_))));
        assert!(log.opened_lengths().is_empty());
    }

    #[test]
    fn test_enable_maps_surface_once() {
        // Arrange
        let (mut output, log, _) = make_output();

        // Act
        output.enable().unwrap();
        output.enable().unwrap();

        // Assert
        assert_eq!(output.state(), OutputState::Mapped);
        assert_eq!(log.maps(), 1, "an already mapped output must not map again");
        assert_eq!(output.surface().map(|s| s.as_bytes().len()), Some(48));
    }

    #[test]
    fn test_enable_map_failure_leaves_output_unmapped() {
        let device = MockFramebufferDevice {
            fail_map: true,
            ..MockFramebufferDevice::new()
        };
        let source = MockScreenSource::new(ScreenDescriptor::with_size(4, 3));
        let mut output = OutputLifecycle::create("image", device, &source).unwrap();

        let result = output.enable();

        assert!(matches!(result, Err(OutputError::Storage { operation: "map", .. })));
        assert_eq!(output.state(), OutputState::Unopened);
    }

    #[test]
    fn test_enable_short_mapping_is_returned_and_rejected() {
        // Arrange – device hands out one byte less than the layout needs
        let device = MockFramebufferDevice {
            short_map: true,
            ..MockFramebufferDevice::new()
        };
        let log = device.log();
        let source = MockScreenSource::new(ScreenDescriptor::with_size(4, 3));
        let mut output = OutputLifecycle::create("image", device, &source).unwrap();

        // Act
        let result = output.enable();

        // Assert
        assert!(matches!(result, Err(OutputError::Surface(_))));
        assert_eq!(log.unmaps(), 1, "rejected mapping must still be released");
    }

    // ── disable ──────────────────────────────────────────────────────────────

    #[test]
    fn test_disable_twice_releases_mapping_exactly_once() {
        // Arrange
        let (mut output, log, _) = make_output();
        output.enable().unwrap();

        // Act
        output.disable();
        output.disable();

        // Assert
        assert_eq!(output.state(), OutputState::Disabled);
        assert_eq!(log.unmaps(), 1);
        assert!(output.surface().is_none());
        assert_eq!(output.descriptor(), &ScreenDescriptor::with_size(4, 3));
    }

    #[test]
    fn test_disable_before_enable_is_a_no_op() {
        let (mut output, log, _) = make_output();

        output.disable();

        assert_eq!(output.state(), OutputState::Unopened);
        assert_eq!(log.unmaps(), 0);
    }

    // ── reenable ─────────────────────────────────────────────────────────────

    #[test]
    fn test_reenable_with_same_mode_remaps_without_touching_storage() {
        // Arrange
        let (mut output, log, source) = make_output();
        output.enable().unwrap();
        output.disable();

        // Act
        let outcome = output.reenable(&source).unwrap();

        // Assert
        assert_eq!(outcome, ReenableOutcome::Remapped);
        assert_eq!(output.state(), OutputState::Mapped);
        assert_eq!(log.closes(), 0, "storage must survive an unchanged mode");
        assert_eq!(log.opened_lengths().len(), 1);
        assert_eq!(log.maps(), 2);
    }

    #[test]
    fn test_reenable_with_changed_refresh_recreates_output() {
        // Arrange
        let (mut output, log, source) = make_output();
        output.enable().unwrap();
        output.disable();
        source.set(ScreenDescriptor {
            refresh_mhz: 30_000,
            ..ScreenDescriptor::with_size(4, 3)
        });

        // Act
        let outcome = output.reenable(&source).unwrap();

        // Assert
        assert_eq!(outcome, ReenableOutcome::Recreated);
        assert_eq!(log.closes(), 1);
        assert_eq!(log.opened_lengths(), vec![48, 48]);
        assert_eq!(output.descriptor().refresh_mhz, 30_000);
    }

    #[test]
    fn test_reenable_with_new_size_resizes_storage_and_surface() {
        let (mut output, log, source) = make_output();
        output.enable().unwrap();
        output.disable();
        source.set(ScreenDescriptor::with_size(8, 2));

        output.reenable(&source).unwrap();

        assert_eq!(log.opened_lengths(), vec![48, 64]);
        assert_eq!(output.layout().width, 8);
        assert_eq!(output.surface().map(|s| s.as_bytes().len()), Some(64));
    }

    #[test]
    fn test_reenable_while_mapped_does_nothing() {
        let (mut output, log, source) = make_output();
        output.enable().unwrap();

        let outcome = output.reenable(&source).unwrap();

        assert_eq!(outcome, ReenableOutcome::AlreadyMapped);
        assert_eq!(log.maps(), 1);
        assert_eq!(source.queries(), 1, "no fresh query while mapped");
    }

    #[test]
    fn test_reenable_with_invalid_descriptor_keeps_old_storage() {
        let (mut output, log, source) = make_output();
        output.enable().unwrap();
        output.disable();
        source.set(ScreenDescriptor::with_size(0, 0));

        let result = output.reenable(&source);

        assert!(matches!(result, Err(OutputError::InvalidDescriptor(_))));
        assert_eq!(log.closes(), 0);
    }

    // ── repaint / timers ─────────────────────────────────────────────────────

    #[test]
    fn test_repaint_while_disabled_is_dropped_and_does_not_arm_timer() {
        // Arrange
        let (mut output, _, _) = make_output();
        output.enable().unwrap();
        output.disable();
        let mut renderer = SolidFillRenderer::new(0xFFFF_FFFF);

        // Act
        let outcome = output
            .repaint(&Damage::full(4, 3), &mut renderer, Instant::now())
            .unwrap();

        // Assert
        assert_eq!(outcome, RepaintOutcome::Dropped);
        assert!(output.next_deadline().is_none());
    }

    #[test]
    fn test_repaint_draws_and_arms_timer() {
        // Arrange
        let (mut output, _, _) = make_output();
        output.enable().unwrap();
        let mut renderer = SolidFillRenderer::new(0x1122_3344);
        let now = Instant::now();

        // Act
        let outcome = output.repaint(&Damage::full(4, 3), &mut renderer, now).unwrap();

        // Assert
        assert_eq!(outcome, RepaintOutcome::Painted);
        assert_eq!(output.next_deadline(), Some(now + Duration::from_millis(16)));
        let bytes = output.surface().unwrap().as_bytes();
        assert!(bytes.chunks_exact(4).all(|px| px == 0x1122_3344u32.to_ne_bytes()));
    }

    #[test]
    fn test_render_failure_requeues_damage_and_still_arms_timer() {
        // Arrange
        let (mut output, _, _) = make_output();
        output.enable().unwrap();
        let now = Instant::now();

        // Act
        let result = output.repaint(&Damage::full(4, 3), &mut FailingRenderer, now);

        // Assert
        assert!(matches!(result, Err(OutputError::Render(_))));
        assert!(output.has_pending_damage(), "failed damage must be retried");
        assert_eq!(output.next_deadline(), Some(now + Duration::from_millis(16)));
    }

    #[test]
    fn test_start_repaint_loop_finishes_frame_with_invalid_flag() {
        // Arrange
        let (output, _, _) = make_output();
        let mut host = MockHostCompositor::new();
        host.expect_read_presentation_clock()
            .times(1)
            .return_const(Duration::from_millis(500));
        host.expect_finish_frame()
            .withf(|name, at, flags| {
                name == "image" && *at == Duration::from_millis(500) && *flags == FrameFlags::INVALID
            })
            .times(1)
            .return_const(());

        // Act / Assert – expectations are verified when `host` is dropped
        output.start_repaint_loop(&host);
    }

    #[test]
    fn test_timer_fires_finish_frame_once() {
        // Arrange
        let (mut output, _, _) = make_output();
        output.enable().unwrap();
        let start = Instant::now();
        output
            .repaint(&Damage::full(4, 3), &mut SolidFillRenderer::new(0), start)
            .unwrap();
        let mut host = MockHostCompositor::new();
        host.expect_read_presentation_clock()
            .return_const(Duration::from_millis(16));
        host.expect_finish_frame()
            .withf(|_, _, flags| *flags == FrameFlags::NONE)
            .times(1)
            .return_const(());

        // Act
        let early = output.dispatch_timer(start, &host);
        let due = output.dispatch_timer(start + Duration::from_millis(16), &host);
        let again = output.dispatch_timer(start + Duration::from_millis(40), &host);

        // Assert
        assert!(!early);
        assert!(due);
        assert!(!again);
    }

    #[test]
    fn test_pending_timer_survives_disable() {
        let (mut output, _, _) = make_output();
        output.enable().unwrap();
        let now = Instant::now();
        output
            .repaint(&Damage::full(4, 3), &mut SolidFillRenderer::new(0), now)
            .unwrap();

        output.disable();

        assert!(output.next_deadline().is_some());
    }

    // ── damage / destroy ─────────────────────────────────────────────────────

    #[test]
    fn test_damage_is_only_collected_while_mapped() {
        let (mut output, _, _) = make_output();
        output.damage_all();
        assert!(!output.has_pending_damage());

        output.enable().unwrap();
        output.damage_all();
        assert!(output.has_pending_damage());

        output.disable();
        assert!(!output.has_pending_damage(), "disable discards pending damage");
    }

    #[test]
    fn test_destroy_from_mapped_unmaps_then_closes_once() {
        // Arrange
        let (mut output, log, _) = make_output();
        output.enable().unwrap();

        // Act
        output.destroy();
        output.destroy();

        // Assert
        assert_eq!(output.state(), OutputState::Destroyed);
        assert_eq!(log.unmaps(), 1);
        assert_eq!(log.closes(), 1);
    }

    #[test]
    fn test_enable_after_destroy_fails() {
        let (mut output, _, source) = make_output();
        output.destroy();

        assert!(matches!(output.enable(), Err(OutputError::Destroyed(_))));
        assert!(matches!(output.reenable(&source), Err(OutputError::Destroyed(_))));
    }

    #[test]
    fn test_drop_releases_storage() {
        let (mut output, log, _) = make_output();
        output.enable().unwrap();

        drop(output);

        assert_eq!(log.unmaps(), 1);
        assert_eq!(log.closes(), 1);
    }

    #[test]
    fn test_frame_flags_contains() {
        assert!(FrameFlags::INVALID.contains(FrameFlags::INVALID));
        assert!(!FrameFlags::NONE.contains(FrameFlags::INVALID));
        assert_eq!(FrameFlags::default(), FrameFlags::NONE);
    }
}
