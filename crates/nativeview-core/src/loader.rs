use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

use crate::boundary::{BackendRef, LibraryBackend};
use crate::error::{BindingError, BindingResult};

/// Where to find the backend library.
///
/// With a `name`, the platform file name is derived from it
/// (`libname.so`, `libname.dylib`, `name.dll`). Without one, the directory
/// is scanned and the first compatible library wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    search_dir: PathBuf,
    name: Option<String>,
}

impl ModuleSpec {
    #[inline]
    pub fn new(search_dir: impl Into<PathBuf>, name: Option<String>) -> Self {
        Self {
            search_dir: search_dir.into(),
            name,
        }
    }

    #[inline]
    pub fn named(search_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::new(search_dir, Some(name.into()))
    }

    #[inline]
    pub fn scan(search_dir: impl Into<PathBuf>) -> Self {
        Self::new(search_dir, None)
    }

    /// Search next to the running executable.
    pub fn near_exe(name: Option<String>) -> BindingResult<Self> {
        Ok(Self::new(modules_dir_near_exe()?, name))
    }

    #[inline]
    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Full path of the named library, if a name is set.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.name
            .as_deref()
            .map(|n| self.search_dir.join(libloading::library_filename(n)))
    }
}

impl fmt::Display for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file_path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "{}/*", self.search_dir.display()),
        }
    }
}

/// Resolves and loads a backend module.
///
/// The gate calls this at most once per successful load.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, spec: &ModuleSpec) -> BindingResult<BackendRef>;
}

/// Loads backends from shared libraries with `libloading`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DylibLoader;

impl ModuleLoader for DylibLoader {
    fn load(&self, spec: &ModuleSpec) -> BindingResult<BackendRef> {
        match spec.file_path() {
            Some(path) => {
                info!("loader: loading '{}'", path.display());
                let backend = LibraryBackend::open(&path)?;
                Ok(Arc::new(backend))
            }
            None => load_first_in_dir(spec.search_dir()),
        }
    }
}

fn load_first_in_dir(dir: &Path) -> BindingResult<BackendRef> {
    info!("loader: scanning directory '{}'", dir.display());

    let rd = std::fs::read_dir(dir).map_err(|e| BindingError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut libs: Vec<PathBuf> = Vec::new();
    for ent in rd {
        let ent = ent.map_err(|e| BindingError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let p = ent.path();
        if is_dynlib(&p) {
            libs.push(p);
        }
    }

    libs.sort();

    info!(
        "loader: found {} candidate(s) in '{}'",
        libs.len(),
        dir.display()
    );

    for path in libs {
        match LibraryBackend::open(&path) {
            Ok(backend) => {
                info!("loader: selected '{}'", path.display());
                return Ok(Arc::new(backend));
            }
            Err(e) => warn!("loader: SKIP incompatible library: {e}"),
        }
    }

    Err(BindingError::NoCandidate {
        dir: dir.to_path_buf(),
    })
}

#[inline]
pub fn is_dynlib(p: &Path) -> bool {
    let Some(ext) = p.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    matches!(ext.to_ascii_lowercase().as_str(), "dll" | "so" | "dylib")
}

pub fn modules_dir_near_exe() -> BindingResult<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| BindingError::Io {
        path: PathBuf::from("<current_exe>"),
        source: e,
    })?;
    let base = exe
        .parent()
        .ok_or_else(|| BindingError::Config("current_exe has no parent directory".into()))?;
    Ok(base.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynlib_extensions_are_case_insensitive() {
        assert!(is_dynlib(Path::new("a/libview.so")));
        assert!(is_dynlib(Path::new("a/view.DLL")));
        assert!(is_dynlib(Path::new("libview.dylib")));
        assert!(!is_dynlib(Path::new("libview.so.txt")));
        assert!(!is_dynlib(Path::new("README")));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn named_spec_uses_platform_file_name() {
        let spec = ModuleSpec::named("/opt/nv", "lumeview");
        assert_eq!(
            spec.file_path(),
            Some(PathBuf::from("/opt/nv/liblumeview.so"))
        );
    }

    #[test]
    fn scan_spec_has_no_file_path() {
        let spec = ModuleSpec::scan("/opt/nv");
        assert_eq!(spec.file_path(), None);
        assert_eq!(spec.to_string(), "/opt/nv/*");
    }

    #[test]
    fn scanning_an_empty_dir_finds_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = DylibLoader
            .load(&ModuleSpec::scan(dir.path()))
            .err()
            .expect("no candidates");
        assert!(matches!(err, BindingError::NoCandidate { .. }));
    }

    #[test]
    fn scanning_skips_incompatible_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("libbroken.so"), b"junk").expect("write");
        std::fs::write(dir.path().join("broken.dll"), b"junk").expect("write");
        std::fs::write(dir.path().join("notes.txt"), b"junk").expect("write");

        let err = DylibLoader
            .load(&ModuleSpec::scan(dir.path()))
            .err()
            .expect("nothing loadable");
        assert!(matches!(err, BindingError::NoCandidate { .. }));
    }

    #[test]
    fn scanning_a_missing_dir_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        let err = DylibLoader
            .load(&ModuleSpec::scan(&missing))
            .err()
            .expect("missing dir");
        assert!(matches!(err, BindingError::Io { .. }));
    }
}
