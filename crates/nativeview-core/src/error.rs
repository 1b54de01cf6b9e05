use std::path::PathBuf;

use thiserror::Error;

use crate::surface::SurfaceLifecycleState;

pub type BindingResult<T> = Result<T, BindingError>;

/// Everything that can go wrong between the host and the native backend.
///
/// Load-time variants are fatal to the process (see [`crate::gate`]);
/// the per-call path has no error variants at all.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("load library failed file='{}': {reason}", path.display())]
    LoadFailed { path: PathBuf, reason: String },

    #[error("missing entry point '{symbol}' in '{}'", path.display())]
    MissingEntryPoint { symbol: &'static str, path: PathBuf },

    #[error("no backend library found in '{}'", dir.display())]
    NoCandidate { dir: PathBuf },

    #[error("io error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("surface is {state}, expected active")]
    SurfaceNotActive { state: SurfaceLifecycleState },

    #[error("frame driver error: {0}")]
    FrameDriver(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("window error: {0}")]
    Window(String),
}
