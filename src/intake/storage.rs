use super::schema::UploadedFile;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;
use unicode_normalization::UnicodeNormalization;

/// Extensions accepted by the upload step; anything else is dropped silently.
pub const ALLOWED_EXTENSIONS: &[&str] = &["zip", "csv", "xlsx", "txt", "json", "pdf"];

/// Whether `filename` carries one of [`ALLOWED_EXTENSIONS`] (case-insensitive).
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Accented letters are decomposed to their ASCII base and other non-ASCII
/// text is dropped. Keeps ASCII letters, digits, `.`, `-` and `_`; whitespace
/// runs and `/` become `_`; leading and trailing dots and underscores are
/// stripped. Returns an empty string when nothing survives.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// An upload written to disk; its directory goes away when this is dropped.
#[derive(Debug)]
pub struct StoredUpload {
    _scratch: TempDir,
    pub file: UploadedFile,
}

/// Writes uploads into per-request scratch directories under a base directory.
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub fn new(base_dir: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(base_dir).to_string();
        let base = PathBuf::from(expanded);
        Ok(Self { base_dir: base })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Store upload bytes under the sanitised form of `original_filename`.
    pub async fn store(&self, original_filename: &str, data: &[u8]) -> Result<StoredUpload> {
        fs::create_dir_all(&self.base_dir)
            .await
            .context("Failed to create upload directory")?;
        let scratch = tempfile::Builder::new()
            .prefix("tds-upload-")
            .tempdir_in(&self.base_dir)
            .context("Failed to create request directory")?;

        let mut stored_name = secure_filename(original_filename);
        if stored_name.is_empty() {
            stored_name = "upload".to_string();
        }

        let abs_path = scratch.path().join(&stored_name);
        fs::write(&abs_path, data)
            .await
            .context("Failed to write file")?;

        Ok(StoredUpload {
            _scratch: scratch,
            file: UploadedFile::new(abs_path, original_filename),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_extensions_are_case_insensitive() {
        assert!(allowed_file("data.CSV"));
        assert!(allowed_file("bundle.tar.zip"));
        assert!(allowed_file("paper.pdf"));
        assert!(!allowed_file("sheet.xls"));
        assert!(!allowed_file("script.py"));
        assert!(!allowed_file("noextension"));
    }

    #[test]
    fn secure_filename_strips_paths_and_oddities() {
        assert_eq!(secure_filename("My cool data.csv"), "My_cool_data.csv");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename(".hidden.txt"), "hidden.txt");
        assert_eq!(secure_filename("naïve.txt"), "naive.txt");
        assert_eq!(secure_filename("Ｒésumé ２.csv"), "Resume_2.csv");
        assert_eq!(secure_filename("日本.csv"), "csv");
        assert_eq!(secure_filename("dir\\data.csv"), "dirdata.csv");
        assert_eq!(secure_filename("..."), "");
    }

    #[tokio::test]
    async fn stored_upload_is_removed_on_drop() {
        let base = TempDir::new().unwrap();
        let storage = FileStorage::new(base.path().to_str().unwrap()).unwrap();

        let stored = storage.store("my data.csv", b"a,b\n1,2\n").await.unwrap();
        let path = stored.file.path.clone();
        assert_eq!(path.file_name().unwrap(), "my_data.csv");
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n1,2\n");
        assert_eq!(stored.file.original_name, "my data.csv");
        assert_eq!(stored.file.extension(), "csv");

        drop(stored);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn unusable_names_fall_back_to_placeholder() {
        let base = TempDir::new().unwrap();
        let storage = FileStorage::new(base.path().to_str().unwrap()).unwrap();

        let stored = storage.store("***", b"x").await.unwrap();
        assert_eq!(stored.file.path.file_name().unwrap(), "upload");
    }
}
