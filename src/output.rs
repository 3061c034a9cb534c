//! Output naming and file writing.
//!
//! The suffix of the requested output file decides which stages run:
//! `.dat` stops after the heightmap, `.scad` adds the scene file and
//! `.stl` adds the mesh export on top of that.

use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Heightmap file name used when the output is not a `.dat` file.
pub const TEMP_SURFACE_NAME: &str = "temp_text2surface.dat";
/// Scene file name used when the output is not a `.scad` file.
pub const TEMP_SCENE_NAME: &str = "temp_text2surface.scad";

/// Unix mode of written output files.
#[cfg(unix)]
pub const OUTPUT_MODE: u32 = 0o644;

/// What kind of file the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// OpenSCAD surface heightmap.
    Surface,
    /// OpenSCAD scene script.
    Scene,
    /// STL mesh exported by OpenSCAD.
    Mesh,
    /// Unrecognized suffix; only the heightmap is produced.
    Other,
}

impl OutputKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("dat") => OutputKind::Surface,
            Some("scad") => OutputKind::Scene,
            Some("stl") => OutputKind::Mesh,
            _ => OutputKind::Other,
        }
    }

    /// Whether a scene file is written for this output.
    pub fn needs_scene(self) -> bool {
        matches!(self, OutputKind::Scene | OutputKind::Mesh)
    }

    pub fn needs_mesh(self) -> bool {
        self == OutputKind::Mesh
    }
}

/// Where the heightmap goes for a requested output.
pub fn surface_path(output: &Path) -> PathBuf {
    match OutputKind::from_path(output) {
        OutputKind::Surface => output.to_path_buf(),
        _ => output.with_file_name(TEMP_SURFACE_NAME),
    }
}

/// Where the scene file goes for a requested output.
pub fn scene_path(output: &Path) -> PathBuf {
    match OutputKind::from_path(output) {
        OutputKind::Scene => output.to_path_buf(),
        _ => output.with_file_name(TEMP_SCENE_NAME),
    }
}

/// Path of `target` as seen from a file written at `from`.
///
/// OpenSCAD resolves relative paths against the directory of the scene file,
/// so siblings are referenced by file name alone.
pub fn relative_reference(target: &Path, from: &Path) -> String {
    if target.parent() == from.parent() {
        if let Some(name) = target.file_name() {
            return name.to_string_lossy().into_owned();
        }
    }
    match std::path::absolute(target) {
        Ok(absolute) => absolute.to_string_lossy().into_owned(),
        Err(_) => target.to_string_lossy().into_owned(),
    }
}

/// Write `contents` to `path` so that a partial file never appears under the final name.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.flush()?;
    // Temp files are created 0600; outputs must stay readable by OpenSCAD
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(OUTPUT_MODE))?;
    }
    file.persist(path).map_err(|e| e.error)?;

    log::debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_kind_from_suffix() {
        assert_eq!(OutputKind::from_path(Path::new("out.dat")), OutputKind::Surface);
        assert_eq!(OutputKind::from_path(Path::new("out.scad")), OutputKind::Scene);
        assert_eq!(OutputKind::from_path(Path::new("dir/out.stl")), OutputKind::Mesh);
        assert_eq!(OutputKind::from_path(Path::new("out.txt")), OutputKind::Other);
        assert!(OutputKind::Mesh.needs_scene());
        assert!(!OutputKind::Surface.needs_scene());
    }

    #[test]
    fn test_intermediate_paths() {
        assert_eq!(surface_path(Path::new("out.dat")), PathBuf::from("out.dat"));
        assert_eq!(
            surface_path(Path::new("models/out.stl")),
            PathBuf::from("models").join(TEMP_SURFACE_NAME)
        );
        assert_eq!(scene_path(Path::new("out.scad")), PathBuf::from("out.scad"));
        assert_eq!(scene_path(Path::new("out.stl")), PathBuf::from(TEMP_SCENE_NAME));
    }

    #[test]
    fn test_relative_reference_for_siblings() {
        let reference = relative_reference(
            Path::new("models/temp_text2surface.dat"),
            Path::new("models/out.scad"),
        );
        assert_eq!(reference, "temp_text2surface.dat");
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.dat");

        write_atomic(&path, b"old").unwrap();
        write_atomic(&path, b"new contents").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new contents");
        // No stray temporary files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_output_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("o.dat");
        write_atomic(&path, b"x").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, OUTPUT_MODE);
    }
}
