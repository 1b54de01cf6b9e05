#![forbid(unsafe_op_in_unsafe_fn)]

pub mod boundary;
pub mod config;
pub mod error;
pub mod frame_driver;
pub mod gate;
pub mod input;
pub mod loader;
pub mod session;
pub mod shutdown;
pub mod surface;
pub mod telemetry;
pub mod translator;

pub use crate::boundary::{BackendRef, BoundaryCall, NativeBackend, RecordingBackend, SurfaceInfo};
pub use crate::config::ViewerConfig;
pub use crate::error::{BindingError, BindingResult};
pub use crate::frame_driver::{FrameDriver, FrameRate, FrameStats};
pub use crate::gate::{BindingState, LifecycleGate};
pub use crate::input::InputEvent;
pub use crate::loader::{DylibLoader, ModuleLoader, ModuleSpec};
pub use crate::session::ViewSession;
pub use crate::shutdown::ShutdownToken;
pub use crate::surface::{HostSurface, SurfaceDescriptor, SurfaceLifecycleState};
pub use crate::translator::EventTranslator;
