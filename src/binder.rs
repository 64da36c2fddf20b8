// This is free and unencumbered software released into the public domain.

use crate::error::CameraError;
use crate::provider::{BindRequest, CameraProvider, CaptureUnitKind};
use tracing::debug;

/// Owns the provider handle and the binding lifecycle of the capture unit
/// set. At most one unit set is attached to the hardware at a time; a rebind
/// always fully unbinds the previous set before the new bind begins, so the
/// hardware never sees a double binding. Every successful (re)bind starts a
/// new generation; completions stamped with an older generation are stale.
pub struct CaptureBinder {
    provider: Box<dyn CameraProvider>,
    generation: u64,
    bound: bool,
}

impl CaptureBinder {
    pub fn new(provider: Box<dyn CameraProvider>) -> Self {
        Self {
            provider,
            generation: 0,
            bound: false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn is_unit_bound(&self, kind: CaptureUnitKind) -> bool {
        self.bound && self.provider.is_bound(kind)
    }

    pub fn provider(&self) -> &dyn CameraProvider {
        self.provider.as_ref()
    }

    pub fn provider_mut(&mut self) -> &mut dyn CameraProvider {
        self.provider.as_mut()
    }

    /// Unbind everything, then attach the requested set. Returns the new
    /// bind generation. On failure the binder is left unbound.
    pub fn rebind(&mut self, request: &BindRequest) -> Result<u64, CameraError> {
        if self.bound {
            self.provider.unbind_all()?;
            self.bound = false;
        }

        debug!(selector = %request.selector, units = request.units.len(), "binding capture units");
        self.provider.bind(request)?;
        self.generation += 1;
        self.bound = true;
        Ok(self.generation)
    }

    /// Swap the camera selector under an open recording session. The
    /// provider detaches and reattaches its preview internally; the video
    /// unit's recording stays live throughout. Providers without native
    /// support must fail with `Unsupported` before touching anything, so on
    /// error the previous binding is still fully in effect.
    pub fn swap_selector_recording(&mut self, request: &BindRequest) -> Result<u64, CameraError> {
        debug_assert!(request.keep_recording);

        debug!(selector = %request.selector, "swapping selector under open recording");
        self.provider.bind(request)?;
        self.generation += 1;
        self.bound = true;
        Ok(self.generation)
    }

    pub fn unbind_unit(&mut self, kind: CaptureUnitKind) -> Result<(), CameraError> {
        if self.is_unit_bound(kind) {
            self.provider.unbind(kind)?;
        }
        Ok(())
    }

    /// Detach every unit. Returns whether anything was bound. Never fails
    /// the caller: a provider error during teardown still leaves the binder
    /// unbound.
    pub fn unbind_all(&mut self) -> bool {
        let was_bound = self.bound;
        if was_bound {
            if let Err(err) = self.provider.unbind_all() {
                debug!(%err, "provider error during unbind, continuing teardown");
            }
        }
        self.bound = false;
        was_bound
    }
}
