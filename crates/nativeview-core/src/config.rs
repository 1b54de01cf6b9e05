use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{BindingError, BindingResult};
use crate::frame_driver::FrameRate;
use crate::loader::ModuleSpec;
use crate::surface::SurfaceDescriptor;

/// Overrides `backend.search_dir`.
pub const BACKEND_DIR_ENV: &str = "NATIVEVIEW_BACKEND_DIR";

pub const DEFAULT_CONFIG_FILE: &str = "nativeview.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Default `env_logger` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub surface: SurfaceConfig,

    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Directory holding the backend library. Defaults to the executable's directory.
    #[serde(default)]
    pub search_dir: Option<PathBuf>,

    /// Library base name without platform prefix/suffix. Unset: scan the directory.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    #[serde(default = "default_depth_bits")]
    pub depth_bits: u8,

    #[serde(default = "default_color_bits")]
    pub color_bits: u8,

    #[serde(default = "default_double_buffered")]
    pub double_buffered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Max gap between presses that still counts as a multi-click.
    #[serde(default = "default_double_click_ms")]
    pub double_click_ms: u64,

    /// Pixel scroll distance equal to one wheel notch.
    #[serde(default = "default_pixels_per_line")]
    pub pixels_per_line: f64,
}

fn default_title() -> String {
    "Native Viewer".to_string()
}
fn default_width() -> u32 {
    SurfaceDescriptor::DEFAULT_WIDTH
}
fn default_height() -> u32 {
    SurfaceDescriptor::DEFAULT_HEIGHT
}
fn default_fps() -> u32 {
    FrameRate::DEFAULT.hz()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_depth_bits() -> u8 {
    24
}
fn default_color_bits() -> u8 {
    8
}
fn default_double_buffered() -> bool {
    true
}
fn default_double_click_ms() -> u64 {
    250
}
fn default_pixels_per_line() -> f64 {
    120.0
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            log_level: default_log_level(),
            backend: BackendConfig::default(),
            surface: SurfaceConfig::default(),
            input: InputConfig::default(),
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            depth_bits: default_depth_bits(),
            color_bits: default_color_bits(),
            double_buffered: default_double_buffered(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            double_click_ms: default_double_click_ms(),
            pixels_per_line: default_pixels_per_line(),
        }
    }
}

impl InputConfig {
    #[inline]
    pub fn double_click_interval(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}

impl ViewerConfig {
    /// Missing file: defaults. Unreadable or malformed file: error.
    pub fn load_or_default(path: impl AsRef<Path>) -> BindingResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s)
                .map_err(|e| BindingError::Config(format!("parse {}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("config: '{}' not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(BindingError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self) {
        if let Some(dir) = std::env::var_os(BACKEND_DIR_ENV) {
            self.backend.search_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn module_spec(&self) -> BindingResult<ModuleSpec> {
        match &self.backend.search_dir {
            Some(dir) => Ok(ModuleSpec::new(dir.clone(), self.backend.name.clone())),
            None => ModuleSpec::near_exe(self.backend.name.clone()),
        }
    }

    /// Descriptor for a drawable of the given size.
    pub fn surface_descriptor(&self, width: u32, height: u32) -> SurfaceDescriptor {
        SurfaceDescriptor::new(
            width,
            height,
            self.surface.depth_bits,
            self.surface.color_bits,
            self.surface.double_buffered,
        )
    }

    #[inline]
    pub fn frame_rate(&self) -> FrameRate {
        FrameRate::new(self.fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = ViewerConfig::from_toml_str("").expect("parse");
        assert_eq!(cfg, ViewerConfig::default());
        assert_eq!(cfg.frame_rate().hz(), 60);
        assert_eq!(cfg.input.double_click_interval(), Duration::from_millis(250));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = ViewerConfig::from_toml_str(
            r#"
            title = "Lumeview"
            fps = 30

            [backend]
            search_dir = "../build/src"
            name = "lumeview"

            [surface]
            depth_bits = 16
            "#,
        )
        .expect("parse");

        assert_eq!(cfg.title, "Lumeview");
        assert_eq!(cfg.fps, 30);
        assert_eq!(cfg.width, 400);
        assert_eq!(cfg.surface.depth_bits, 16);
        assert!(cfg.surface.double_buffered);

        let spec = cfg.module_spec().expect("spec");
        assert_eq!(spec.search_dir(), Path::new("../build/src"));
        assert_eq!(spec.name(), Some("lumeview"));
    }

    #[test]
    fn missing_file_is_default_and_bad_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");

        let cfg = ViewerConfig::load_or_default(dir.path().join("absent.toml")).expect("default");
        assert_eq!(cfg, ViewerConfig::default());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "fps = \"fast\"").expect("write");
        assert!(matches!(
            ViewerConfig::load_or_default(&bad),
            Err(BindingError::Config(_))
        ));
    }

    #[test]
    fn descriptor_uses_surface_section() {
        let mut cfg = ViewerConfig::default();
        cfg.surface.double_buffered = false;

        let d = cfg.surface_descriptor(800, 600);
        assert_eq!((d.width(), d.height()), (800, 600));
        assert_eq!(d.depth_bits(), 24);
        assert!(!d.double_buffered());
    }
}
