use std::path::{Path, PathBuf};

use libloading::Library;

use super::attach::SurfaceInfo;
use super::entry_points::EntryPoints;
use super::NativeBackend;
use crate::error::{BindingError, BindingResult};

/// Backend living in a dynamically loaded library.
///
/// Field order matters: `entry` points into `_lib`, so the library is
/// declared last and unloaded after everything else is gone.
pub struct LibraryBackend {
    path: PathBuf,
    entry: EntryPoints,
    _lib: Library,
}

impl LibraryBackend {
    /// Load `path` and resolve the full entry-point table.
    ///
    /// A library that loads but lacks any symbol is rejected here, so a
    /// missing entry point can never surface mid-session.
    pub fn open(path: &Path) -> BindingResult<Self> {
        // Safety: loading runs the library's initialisers. The backend is a
        // trusted component chosen by configuration.
        let lib = unsafe { Library::new(path) }.map_err(|e| BindingError::LoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Safety: backends are built against the `nv_*` C ABI.
        let entry = unsafe { EntryPoints::resolve(&lib) }.map_err(|symbol| {
            BindingError::MissingEntryPoint {
                symbol,
                path: path.to_path_buf(),
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            entry,
            _lib: lib,
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the library exports the optional surface attach call.
    #[inline]
    pub fn accepts_surface(&self) -> bool {
        self.entry.attach_surface.is_some()
    }
}

impl std::fmt::Debug for LibraryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryBackend")
            .field("path", &self.path)
            .field("accepts_surface", &self.accepts_surface())
            .finish_non_exhaustive()
    }
}

// Safety (all calls below): the pointers were resolved from `_lib`, which is
// still loaded because `self` owns it. Arguments are plain integers/doubles.
impl NativeBackend for LibraryBackend {
    fn attach_surface(&self, info: &SurfaceInfo) {
        if let Some(attach) = self.entry.attach_surface {
            // `info` outlives the call; the backend copies what it keeps.
            unsafe { attach(info as *const SurfaceInfo) }
        }
    }

    fn init(&self) {
        unsafe { (self.entry.init)() }
    }

    fn display(&self) {
        unsafe { (self.entry.display)() }
    }

    fn reshape(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { (self.entry.reshape)(x, y, width, height) }
    }

    fn dispose(&self) {
        unsafe { (self.entry.dispose)() }
    }

    fn mouse_click(&self, x: i32, y: i32, button: i32, click_count: i32) {
        unsafe { (self.entry.mouse_click)(x, y, button, click_count) }
    }

    fn mouse_move(&self, x: i32, y: i32) {
        unsafe { (self.entry.mouse_move)(x, y) }
    }

    fn mouse_drag(&self, x: i32, y: i32, button: i32) {
        unsafe { (self.entry.mouse_drag)(x, y, button) }
    }

    fn mouse_press(&self, x: i32, y: i32, button: i32) {
        unsafe { (self.entry.mouse_press)(x, y, button) }
    }

    fn mouse_release(&self, x: i32, y: i32, button: i32) {
        unsafe { (self.entry.mouse_release)(x, y, button) }
    }

    fn mouse_enter(&self, x: i32, y: i32) {
        unsafe { (self.entry.mouse_enter)(x, y) }
    }

    fn mouse_exit(&self, x: i32, y: i32) {
        unsafe { (self.entry.mouse_exit)(x, y) }
    }

    fn mouse_wheel(&self, delta: f64) {
        unsafe { (self.entry.mouse_wheel)(delta) }
    }
}
