//! STL export through the OpenSCAD command line.

use crate::error::{Result, SurfaceError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Executable name looked up on `PATH`.
pub const OPENSCAD_EXECUTABLE: &str = "openscad";
/// Default Windows install location.
pub const WINDOWS_INSTALL_PATH: &str = r"C:\Program Files\OpenSCAD\openscad.exe";
/// Default macOS install location.
pub const MACOS_INSTALL_PATH: &str = "/Applications/OpenSCAD.app/Contents/MacOS/OpenSCAD";

/// Outcome of looking for an executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutableResolution {
    /// Found at a known install location or an explicit path.
    FoundAt(PathBuf),
    /// Found by searching `PATH`.
    OnPath(PathBuf),
    NotFound,
}

impl ExecutableResolution {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ExecutableResolution::FoundAt(path) | ExecutableResolution::OnPath(path) => Some(path),
            ExecutableResolution::NotFound => None,
        }
    }

    /// The executable path, or [`SurfaceError::OpenScadNotFound`].
    pub fn into_path(self) -> Result<PathBuf> {
        match self {
            ExecutableResolution::FoundAt(path) | ExecutableResolution::OnPath(path) => Ok(path),
            ExecutableResolution::NotFound => Err(SurfaceError::OpenScadNotFound),
        }
    }
}

/// Where to look for an executable: `PATH` first, then fixed install paths.
#[derive(Debug, Clone)]
pub struct ExecutableSearch {
    name: String,
    path_var: Option<OsString>,
    install_paths: Vec<PathBuf>,
}

impl ExecutableSearch {
    /// Search for OpenSCAD using the process `PATH` and the default install paths.
    pub fn openscad() -> Self {
        Self {
            name: OPENSCAD_EXECUTABLE.to_string(),
            path_var: std::env::var_os("PATH"),
            install_paths: vec![PathBuf::from(WINDOWS_INSTALL_PATH), PathBuf::from(MACOS_INSTALL_PATH)],
        }
    }

    /// Search for `name` with no install paths.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path_var: std::env::var_os("PATH"),
            install_paths: Vec::new(),
        }
    }

    pub fn with_path_var(mut self, path_var: Option<OsString>) -> Self {
        self.path_var = path_var;
        self
    }

    pub fn with_install_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.install_paths = paths;
        self
    }

    pub fn resolve(&self) -> ExecutableResolution {
        if let Some(path) = self.search_path_var() {
            log::debug!("Found {} on PATH at {:?}", self.name, path);
            return ExecutableResolution::OnPath(path);
        }

        for candidate in &self.install_paths {
            if candidate.is_file() {
                log::debug!("Found {} at {:?}", self.name, candidate);
                return ExecutableResolution::FoundAt(candidate.clone());
            }
        }

        log::warn!("{} not found on PATH or at {:?}", self.name, self.install_paths);
        ExecutableResolution::NotFound
    }

    fn search_path_var(&self) -> Option<PathBuf> {
        let path_var = self.path_var.as_ref()?;
        let file_names = if cfg!(windows) {
            vec![self.name.clone(), format!("{}.exe", self.name)]
        } else {
            vec![self.name.clone()]
        };

        std::env::split_paths(path_var)
            .filter(|dir| !dir.as_os_str().is_empty())
            .flat_map(|dir| file_names.iter().map(move |name| dir.join(name)))
            .find(|candidate| candidate.is_file())
    }
}

/// Build the OpenSCAD invocation that renders `scene` to `output`.
pub fn openscad_command(executable: &Path, scene: &Path, output: &Path) -> Command {
    let mut command = Command::new(executable);
    command.arg("-m").arg("make").arg("-s").arg(output).arg(scene);
    command
}

/// Run OpenSCAD and wait for it, failing on a non-zero exit.
pub fn export_stl(executable: &Path, scene: &Path, output: &Path) -> Result<()> {
    let mut command = openscad_command(executable, scene, output);
    log::info!("Running {:?}", command);

    let status = command.status()?;
    if !status.success() {
        return Err(SurfaceError::ExportFailed { status });
    }

    log::info!("Exported STL to {:?}", output);
    Ok(())
}
