//! Atomic file output shared by the `.docx` and PDF writers.

use std::fs::File;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Writes `path` through a temporary file in the same directory and returns the file size.
///
/// `fill` receives the temporary file.  Once it succeeds the file is synced, given `0644`
/// permissions on Unix and renamed over `path`.  On any error the destination is left untouched
/// and the temporary file is removed.
pub(crate) fn write_atomically<F>(path: &Path, fill: F) -> Result<u64>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(directory).map_err(|source| Error::io(path, source))?;
    fill(temp.as_file_mut())?;

    let file = temp.as_file();
    file.sync_all().map_err(|source| Error::io(path, source))?;
    let bytes = file
        .metadata()
        .map_err(|source| Error::io(path, source))?
        .len();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|source| Error::io(path, source))?;
    }

    temp.persist(path)
        .map_err(|err| Error::io(path, err.error))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn writes_content_and_reports_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let bytes = write_atomically(&path, |file| {
            file.write_all(b"hello").map_err(|source| Error::io("out.bin", source))
        })
        .unwrap();
        assert_eq!(bytes, 5);
        assert_eq!(fs::read(&path).unwrap(), b"hello");
    }

    #[cfg(unix)]
    #[test]
    fn saved_files_are_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        write_atomically(&path, |_| Ok(())).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn failed_fill_leaves_destination_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        fs::write(&path, b"previous").unwrap();

        let err = write_atomically(&path, |_| Err(Error::Serialization("boom".into())));
        assert!(err.is_err());
        assert_eq!(fs::read(&path).unwrap(), b"previous");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
