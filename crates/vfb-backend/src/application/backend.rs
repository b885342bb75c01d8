//! ImageBackend: owns the virtual outputs and applies session activation.
//!
//! When the host's session goes inactive (VT switch, seat lost) every output
//! is disabled and pending repaints are discarded.  When it becomes active
//! again every output is re-enabled against a fresh descriptor and fully
//! damaged so the next repaint redraws everything.  Both passes happen
//! inside one `&mut self` call, so no output can be observed enabled while
//! the session is inactive.
//!
//! An output that fails to come back is torn down, removed from the backend,
//! and reported to the host.  The remaining outputs keep running.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::application::output_lifecycle::{
    FramebufferDevice, HostCompositor, OutputError, OutputLifecycle, OutputRenderer,
    OutputState, RepaintOutcome, ScreenDescriptorSource,
};

/// All outputs of the image backend.
pub struct ImageBackend<D: FramebufferDevice> {
    source: Arc<dyn ScreenDescriptorSource>,
    outputs: Vec<OutputLifecycle<D>>,
    session_active: bool,
}

impl<D: FramebufferDevice> ImageBackend<D> {
    pub fn new(source: Arc<dyn ScreenDescriptorSource>) -> Self {
        Self {
            source,
            outputs: Vec::new(),
            session_active: true,
        }
    }

    /// Creates and enables an output, queueing a full repaint.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if the output cannot be created or mapped; no
    /// output is added in that case.
    pub fn add_output(&mut self, name: &str, device: D) -> Result<(), OutputError> {
        let mut output = OutputLifecycle::create(name, device, self.source.as_ref())?;
        if self.session_active {
            output.enable()?;
            output.damage_all();
        }
        self.outputs.push(output);
        Ok(())
    }

    pub fn outputs(&self) -> &[OutputLifecycle<D>] {
        &self.outputs
    }

    pub fn output(&self, name: &str) -> Option<&OutputLifecycle<D>> {
        self.outputs.iter().find(|o| o.name() == name)
    }

    pub fn is_session_active(&self) -> bool {
        self.session_active
    }

    /// Applies a session activation change to every output.
    pub fn session_notify(&mut self, active: bool, host: &dyn HostCompositor) {
        self.session_active = active;
        if !active {
            info!("session deactivated, disabling {} output(s)", self.outputs.len());
            for output in &mut self.outputs {
                output.disable();
            }
            return;
        }

        info!("session activated, re-enabling {} output(s)", self.outputs.len());
        let source = Arc::clone(&self.source);
        let mut kept = Vec::with_capacity(self.outputs.len());
        for mut output in self.outputs.drain(..) {
            match output.reenable(source.as_ref()) {
                Ok(outcome) => {
                    info!(output = %output.name(), ?outcome, "output back");
                    output.damage_all();
                    kept.push(output);
                }
                Err(e) => {
                    error!(output = %output.name(), "re-enable failed, removing output: {e}");
                    output.destroy();
                    host.output_removed(output.name());
                }
            }
        }
        self.outputs = kept;
    }

    /// Repaints every mapped output that has pending damage.
    ///
    /// Returns the number of outputs painted.
    pub fn repaint_pending(&mut self, renderer: &mut dyn OutputRenderer, now: Instant) -> usize {
        let mut painted = 0;
        for output in &mut self.outputs {
            if output.state() != OutputState::Mapped || !output.has_pending_damage() {
                continue;
            }
            let damage = output.take_damage();
            match output.repaint(&damage, renderer, now) {
                Ok(RepaintOutcome::Painted) => painted += 1,
                Ok(RepaintOutcome::Dropped) => {}
                Err(e) => warn!(output = %output.name(), "repaint failed: {e}"),
            }
        }
        painted
    }

    /// Marks every output as fully damaged.
    pub fn damage_all(&mut self) {
        for output in &mut self.outputs {
            output.damage_all();
        }
    }

    /// Fires every expired frame timer; returns how many fired.
    pub fn dispatch_timers(&mut self, now: Instant, host: &dyn HostCompositor) -> usize {
        let mut fired = 0;
        for output in &mut self.outputs {
            if output.dispatch_timer(now, host) {
                fired += 1;
            }
        }
        fired
    }

    /// Earliest armed frame deadline across all outputs.
    pub fn next_frame_deadline(&self) -> Option<Instant> {
        self.outputs.iter().filter_map(|o| o.next_deadline()).min()
    }

    pub fn start_repaint_loop(&self, host: &dyn HostCompositor) {
        for output in &self.outputs {
            output.start_repaint_loop(host);
        }
    }

    /// Destroys every output.
    pub fn shutdown(&mut self) {
        for output in &mut self.outputs {
            output.destroy();
        }
        self.outputs.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
