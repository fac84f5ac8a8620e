//! Reading manifests and naming the files written next to them.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::manifest::Manifest;

/// Suffix for the output of a successful ladder run
pub const COMPATIBLE_SUFFIX: &str = "-compatible";

/// Suffix for the output of the upgrade pass
pub const UPGRADED_SUFFIX: &str = "-upgraded";

/// `requirements.txt` with `-compatible` becomes `requirements-compatible.txt`.
///
/// Only the final extension is kept after the suffix; a path without one
/// gets the suffix appended.
pub fn derived_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };

    input.with_file_name(file_name)
}

pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path)?;
    Ok(Manifest::parse(&content))
}

pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    fs::write(path, manifest.serialize())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_derived_output_path() {
        assert_eq!(
            derived_output_path(Path::new("requirements.txt"), COMPATIBLE_SUFFIX),
            PathBuf::from("requirements-compatible.txt")
        );
        assert_eq!(
            derived_output_path(Path::new("/srv/app/requirements.txt"), UPGRADED_SUFFIX),
            PathBuf::from("/srv/app/requirements-upgraded.txt")
        );
        assert_eq!(
            derived_output_path(Path::new("deps/requirements.dev.txt"), COMPATIBLE_SUFFIX),
            PathBuf::from("deps/requirements.dev-compatible.txt")
        );
        assert_eq!(
            derived_output_path(Path::new("requirements"), COMPATIBLE_SUFFIX),
            PathBuf::from("requirements-compatible")
        );
    }

    #[test]
    fn test_read_write_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("requirements.txt");
        let text = "# ml\nnumpy==2.3.1\n\nflask\n";
        fs::write(&path, text).unwrap();

        let manifest = read_manifest(&path).unwrap();
        let out = derived_output_path(&path, COMPATIBLE_SUFFIX);
        write_manifest(&out, &manifest).unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), text);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(read_manifest(&dir.path().join("missing.txt")).is_err());
    }
}
