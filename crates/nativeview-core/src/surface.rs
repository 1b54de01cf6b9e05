use std::fmt;

use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

/// Pixel format and drawable size of the hosted surface.
///
/// Built once when the host window is created and never renegotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceDescriptor {
    width: u32,
    height: u32,
    depth_bits: u8,
    color_bits: u8,
    double_buffered: bool,
}

impl SurfaceDescriptor {
    pub const DEFAULT_WIDTH: u32 = 400;
    pub const DEFAULT_HEIGHT: u32 = 400;

    #[inline]
    pub fn new(
        width: u32,
        height: u32,
        depth_bits: u8,
        color_bits: u8,
        double_buffered: bool,
    ) -> Self {
        Self {
            width,
            height,
            depth_bits,
            color_bits,
            double_buffered,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn depth_bits(&self) -> u8 {
        self.depth_bits
    }

    #[inline]
    pub fn color_bits(&self) -> u8 {
        self.color_bits
    }

    #[inline]
    pub fn double_buffered(&self) -> bool {
        self.double_buffered
    }
}

impl Default for SurfaceDescriptor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT, 24, 8, true)
    }
}

/// Native handles of the host window the backend draws into.
///
/// Only borrowed for the attach call before `init`; the host keeps the
/// window alive until the surface is disposed.
#[derive(Debug, Clone, Copy)]
pub struct HostSurface {
    window: RawWindowHandle,
    display: RawDisplayHandle,
}

impl HostSurface {
    #[inline]
    pub fn new(window: RawWindowHandle, display: RawDisplayHandle) -> Self {
        Self { window, display }
    }

    #[inline]
    pub fn window(&self) -> RawWindowHandle {
        self.window
    }

    #[inline]
    pub fn display(&self) -> RawDisplayHandle {
        self.display
    }
}

/// Lifecycle of a surface as seen by the backend.
///
/// `Uninitialized -> Active -> Disposed`, never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceLifecycleState {
    #[default]
    Uninitialized,
    Active,
    Disposed,
}

impl SurfaceLifecycleState {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::Disposed => "disposed",
        }
    }
}

impl fmt::Display for SurfaceLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
