use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use log::{error, info};
use parking_lot::Mutex;

use crate::boundary::BackendRef;
use crate::error::{BindingError, BindingResult};
use crate::loader::{ModuleLoader, ModuleSpec};

/// Exit status used when the backend cannot be brought up.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Whether a backend has been loaded. Set once, never reset.
#[derive(Debug, Default)]
pub struct BindingState {
    initialized: AtomicBool,
}

impl BindingState {
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    #[inline]
    fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::Release);
    }
}

/// Loads the backend exactly once and hands out the same instance afterwards.
///
/// A failed load leaves the gate closed; the next call tries again, but in the
/// application a failure goes through [`exit_fatal`] and there is no next call.
#[derive(Default)]
pub struct LifecycleGate {
    state: BindingState,
    slot: Mutex<Option<BackendRef>>,
}

static GLOBAL_GATE: OnceLock<LifecycleGate> = OnceLock::new();

impl LifecycleGate {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide gate.
    #[inline]
    pub fn global() -> &'static Self {
        GLOBAL_GATE.get_or_init(Self::new)
    }

    #[inline]
    pub fn state(&self) -> &BindingState {
        &self.state
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state.is_initialized()
    }

    /// The loaded backend, if any. Never triggers a load.
    pub fn backend(&self) -> Option<BackendRef> {
        self.slot.lock().as_ref().map(Arc::clone)
    }

    /// Idempotent: the first success loads through `loader`, later calls
    /// return the cached backend without touching the loader.
    pub fn ensure_ready(
        &self,
        loader: &dyn ModuleLoader,
        spec: &ModuleSpec,
    ) -> BindingResult<BackendRef> {
        // Held across the load so racing first callers cannot both load.
        let mut slot = self.slot.lock();
        if let Some(backend) = slot.as_ref() {
            return Ok(Arc::clone(backend));
        }

        info!("gate: loading backend '{spec}'");
        let backend = loader.load(spec)?;

        *slot = Some(Arc::clone(&backend));
        self.state.mark_initialized();
        info!("gate: backend ready");

        Ok(backend)
    }

    /// [`Self::ensure_ready`], terminating the process on failure.
    pub fn ensure_ready_or_exit(&self, loader: &dyn ModuleLoader, spec: &ModuleSpec) -> BackendRef {
        self.ensure_ready_or_else(loader, spec, |e| exit_fatal(&e))
    }

    /// [`Self::ensure_ready`] with the failure routed to `on_fatal`.
    ///
    /// The gate stays closed whatever `on_fatal` returns.
    pub fn ensure_ready_or_else<F>(
        &self,
        loader: &dyn ModuleLoader,
        spec: &ModuleSpec,
        on_fatal: F,
    ) -> BackendRef
    where
        F: FnOnce(BindingError) -> BackendRef,
    {
        match self.ensure_ready(loader, spec) {
            Ok(backend) => backend,
            Err(e) => on_fatal(e),
        }
    }
}

/// Log the diagnostic and terminate with [`FATAL_EXIT_CODE`].
pub fn exit_fatal(err: &BindingError) -> ! {
    error!("gate: fatal: {err}");
    error!("gate: no backend available, terminating");
    std::process::exit(FATAL_EXIT_CODE)
}
