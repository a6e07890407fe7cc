use thiserror::Error;

/// Failures while unpacking or parsing an uploaded file.
///
/// Only the archive expander surfaces these to its caller; the content
/// extractor folds them into [`super::ExtractedContent::Message`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("{0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("{0}")]
    Malformed(String),
}
