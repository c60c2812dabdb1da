//! Shared filesystem helpers built on `cap-std` and `camino`.
//!
//! Paths given by the user are resolved against ambient authority once, and
//! all further access goes through the opened directory handle.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::path::Component;

/// Resolve an ambient directory for the given path and return the directory with the file name.
///
/// # Errors
///
/// Fails when `path` has no file name or its parent cannot be opened.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create `path` and any missing ancestors.
///
/// # Errors
///
/// Propagates I/O failures from opening the base directory or creating
/// the missing components.
pub fn ensure_dir(path: &Utf8Path) -> io::Result<()> {
    if path.as_str().is_empty() || path == Utf8Path::new("/") {
        return Ok(());
    }
    let (base_dir, relative) = base_dir_and_relative(path)?;
    if relative.as_os_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Ensure the parent directory for `path` exists, handling absolute paths safely for cap-std.
///
/// # Errors
///
/// See [`ensure_dir`].
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => ensure_dir(parent),
        None => Ok(()),
    }
}

/// Write `contents` to `path`, creating parent directories first.
///
/// # Errors
///
/// Propagates I/O failures.
pub fn write_utf8_file(path: &Utf8Path, contents: &str) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    dir.write(name.as_str(), contents)
}

/// Read the whole of `path` as UTF-8 text.
///
/// # Errors
///
/// Propagates I/O failures, including a missing file.
pub fn read_utf8_file(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.read_to_string(name.as_str())
}

/// Return whether a path exists and is a regular file using capability-based IO.
///
/// # Errors
///
/// Fails when the parent directory cannot be opened or the metadata lookup
/// fails for a reason other than the file being absent.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(found) => found,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// File stems of the regular files in `dir` with the given extension, sorted.
///
/// A missing directory yields an empty list.
///
/// # Errors
///
/// Propagates I/O failures other than the directory being absent.
pub fn list_file_stems(dir: &Utf8Path, extension: &str) -> io::Result<Vec<String>> {
    let handle = match fs_utf8::Dir::open_ambient_dir(dir, ambient_authority()) {
        Ok(handle) => handle,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    let mut stems = Vec::new();
    for item in handle.entries()? {
        let entry = item?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = Utf8PathBuf::from(entry.file_name()?);
        if name.extension() == Some(extension)
            && let Some(stem) = name.file_stem()
        {
            stems.push(stem.to_owned());
        }
    }
    stems.sort();
    Ok(stems)
}

/// Split an absolute or relative parent path into an ambient base directory and a relative suffix.
///
/// # Errors
///
/// Fails for non-UTF-8 prefixes or when the base directory cannot be opened.
pub fn base_dir_and_relative(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();

    let (base, relative) = match std_parent.components().next() {
        // Windows absolute path with a drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;

            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_parent.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from parent path"))?
                .to_path_buf();
            (base, relative)
        }
        // Unix-style absolute path.
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        // Relative path: resolve from the current directory.
        _ => (Utf8PathBuf::from("."), std_parent.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative = Utf8PathBuf::from_path_buf(relative)
        .map_err(|_| io::Error::other("non-UTF-8 parent path"))?;

    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path")
    }

    #[rstest]
    fn writes_into_missing_directories(temp_dir: TempDir) {
        let path = utf8(&temp_dir).join("nested/deeper/out.json");
        write_utf8_file(&path, "{}").expect("write file");
        assert_eq!(read_utf8_file(&path).expect("read back"), "{}");
        assert!(file_is_file(&path).expect("metadata"));
    }

    #[rstest]
    fn missing_files_are_not_files(temp_dir: TempDir) {
        let path = utf8(&temp_dir).join("absent/file.json");
        assert!(!file_is_file(&path).expect("metadata"));
    }

    #[rstest]
    fn lists_sorted_stems_for_extension(temp_dir: TempDir) {
        let root = utf8(&temp_dir);
        for name in ["b_ca.geojson", "a_wa.geojson", "notes.txt"] {
            write_utf8_file(&root.join(name), "x").expect("write fixture");
        }
        ensure_dir(&root.join("dir.geojson")).expect("create directory");
        let stems = list_file_stems(&root, "geojson").expect("list");
        assert_eq!(stems, vec!["a_wa".to_owned(), "b_ca".to_owned()]);
    }

    #[rstest]
    fn listing_a_missing_directory_is_empty(temp_dir: TempDir) {
        let stems = list_file_stems(&utf8(&temp_dir).join("nope"), "geojson").expect("list");
        assert!(stems.is_empty());
    }
}
