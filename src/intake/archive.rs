use super::error::ExtractionError;
use std::cmp::Ordering;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Members of an unpacked archive, living in a scratch directory that is
/// removed when this value is dropped.
#[derive(Debug)]
pub struct ExpandedArchive {
    scratch: TempDir,
    members: Vec<PathBuf>,
}

impl ExpandedArchive {
    /// Absolute paths of every extracted file, in enumeration order.
    pub fn members(&self) -> &[PathBuf] {
        &self.members
    }

    pub fn first_member(&self) -> Option<&Path> {
        self.members.first().map(PathBuf::as_path)
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }
}

/// Fully decompress the zip at `path` into a fresh scratch directory.
///
/// Members are listed top-down: at each level files come before
/// subdirectories, each group ordered by name. No size or entry limits apply.
pub fn expand_archive(path: &Path) -> Result<ExpandedArchive, ExtractionError> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let scratch = tempfile::Builder::new().prefix("tds-archive-").tempdir()?;

    // Entries that would land outside the scratch directory are rejected here
    archive.extract(scratch.path())?;

    let members = list_files(scratch.path())?;
    info!(
        archive = %path.display(),
        entries = archive.len(),
        files = members.len(),
        "Expanded archive"
    );
    Ok(ExpandedArchive { scratch, members })
}

fn list_files(root: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by(files_first) {
        let entry = entry.map_err(|e| ExtractionError::Malformed(e.to_string()))?;
        if entry.file_type().is_file() {
            debug!(member = %entry.path().display(), "Archive member");
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(dir: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = dir.join("bundle.zip");
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn lists_files_before_subdirectories() {
        let dir = TempDir::new().unwrap();
        let zip_path = build_zip(
            dir.path(),
            &[
                ("nested/inner.txt", b"inner"),
                ("b.csv", b"answer\n1\n"),
                ("a.txt", b"first"),
            ],
        );

        let expanded = expand_archive(&zip_path).unwrap();
        let names: Vec<String> = expanded
            .members()
            .iter()
            .map(|p| {
                p.strip_prefix(expanded.scratch_dir())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.txt", "b.csv", "nested/inner.txt"]);
        assert!(expanded.members().iter().all(|p| p.is_absolute()));
        assert_eq!(std::fs::read(expanded.first_member().unwrap()).unwrap(), b"first");
    }

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let zip_path = build_zip(dir.path(), &[("a.txt", b"x")]);

        let expanded = expand_archive(&zip_path).unwrap();
        let scratch = expanded.scratch_dir().to_path_buf();
        assert!(scratch.exists());
        drop(expanded);
        assert!(!scratch.exists());
    }

    #[test]
    fn empty_archive_has_no_members() {
        let dir = TempDir::new().unwrap();
        let zip_path = build_zip(dir.path(), &[]);

        let expanded = expand_archive(&zip_path).unwrap();
        assert!(expanded.first_member().is_none());
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"definitely not a zip").unwrap();

        assert!(matches!(
            expand_archive(&path),
            Err(ExtractionError::Archive(_))
        ));
    }
}
