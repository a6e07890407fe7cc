//! File intake
//!
//! Handles upload storage, archive expansion, content extraction and the
//! direct-answer shortcut for CSV files.

pub mod archive;
pub mod direct;
pub mod error;
pub mod extract;
pub mod schema;
pub mod storage;

pub use archive::{expand_archive, ExpandedArchive};
pub use direct::find_direct_answer;
pub use error::ExtractionError;
pub use extract::extract_content;
pub use schema::{Cell, ExtractedContent, Table, UploadedFile};
pub use storage::{allowed_file, FileStorage, StoredUpload};
