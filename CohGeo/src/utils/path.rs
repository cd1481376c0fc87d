//! Path utilities

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Normalize path separators to forward slashes.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Get relative path and normalize separators
pub fn relative_path<P: AsRef<Path>>(path: P, base: P) -> Option<String> {
    path.as_ref()
        .strip_prefix(base.as_ref())
        .ok()
        .map(normalize_path)
}

/// Resolve `relative` under `base`, matching each segment case-insensitively.
///
/// An exact match is tried first for each segment before the directory is
/// scanned. `..` and `.` segments are not supported and are skipped.
///
/// # Errors
/// Returns [`Error::PathNotFound`] naming the first segment with no match
/// and the directory it was looked for in.
pub fn find_path_case_insensitive<P: AsRef<Path>, Q: AsRef<Path>>(base: P, relative: Q) -> Result<PathBuf> {
    let relative = normalize_path(relative);
    let mut current = base.as_ref().to_path_buf();
    for segment in Path::new(&relative).components() {
        let Component::Normal(segment) = segment else {
            continue;
        };
        let segment = segment.to_string_lossy();
        current = resolve_segment(&current, &segment)?;
    }
    Ok(current)
}

fn resolve_segment(dir: &Path, segment: &str) -> Result<PathBuf> {
    let exact = dir.join(segment);
    if exact.exists() {
        return Ok(exact);
    }
    let not_found = || Error::PathNotFound {
        segment: segment.to_string(),
        under: dir.to_path_buf(),
    };
    let entries = fs::read_dir(dir).map_err(|_| not_found())?;
    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().eq_ignore_ascii_case(segment) {
            return Ok(entry.path());
        }
    }
    Err(not_found())
}

/// Replace the extension of a forward-slash path, keeping the directory.
pub fn with_extension(path: &str, extension: &str) -> String {
    let stem_end = match path.rfind('.') {
        Some(dot) if !path[dot..].contains('/') => dot,
        _ => path.len(),
    };
    format!("{}.{extension}", &path[..stem_end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("maps\\City_01\\a.bin"), "maps/City_01/a.bin");
    }

    #[test]
    fn test_relative_path() {
        let rel = relative_path(Path::new("/data/object_library/a.geo"), Path::new("/data"));
        assert_eq!(rel.as_deref(), Some("object_library/a.geo"));
        assert_eq!(relative_path(Path::new("/other/a.geo"), Path::new("/data")), None);
    }

    #[test]
    fn test_with_extension() {
        assert_eq!(with_extension("maps/a/b.txt", "bin"), "maps/a/b.bin");
        assert_eq!(with_extension("maps/a.dir/b", "bin"), "maps/a.dir/b.bin");
        assert_eq!(with_extension("x.anm", "geo"), "x.geo");
    }

    #[test]
    fn test_find_path_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("maps").join("city_01").join("geobin");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("X.GEO"), b"geo").unwrap();

        let found = find_path_case_insensitive(dir.path(), "Maps/City_01/geobin/x.geo").unwrap();
        assert_eq!(found, nested.join("X.GEO"));
    }

    #[test]
    fn test_find_path_reports_missing_segment() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("maps")).unwrap();

        let err = find_path_case_insensitive(dir.path(), "MAPS/nowhere/x.geo").unwrap_err();
        match err {
            Error::PathNotFound { segment, under } => {
                assert_eq!(segment, "nowhere");
                assert_eq!(under, dir.path().join("maps"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
