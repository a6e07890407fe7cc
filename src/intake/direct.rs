use super::extract::load_csv;
use std::path::Path;
use tracing::{debug, info};

/// Column whose first value is returned verbatim.
const ANSWER_COLUMN: &str = "answer";

/// Phrasings that ask for that column's value, matched case-insensitively.
const ANSWER_PHRASES: &[&str] = &[
    "what is the value in the \"answer\" column",
    "what is the value in the 'answer' column",
];

/// Return the first `answer` cell of a CSV file when the question asks for it.
///
/// Any other file, a file that fails to parse, a missing column (the name is
/// case-sensitive), a different question or an empty table all yield `None`.
pub fn find_direct_answer(path: &Path, question: &str) -> Option<String> {
    let is_csv = path
        .to_str()
        .is_some_and(|p| p.to_lowercase().ends_with(".csv"));
    if !is_csv {
        return None;
    }

    let table = match load_csv(path) {
        Ok(table) => table,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No direct answer: CSV did not parse");
            return None;
        }
    };
    table.column_index(ANSWER_COLUMN)?;
    if table.is_empty() {
        return None;
    }

    let question = question.to_lowercase();
    if !ANSWER_PHRASES.iter().any(|p| question.contains(p)) {
        return None;
    }

    let value = table.cell(0, ANSWER_COLUMN)?.as_text();
    if value.is_empty() {
        return None;
    }
    info!(path = %path.display(), "Answered directly from the answer column");
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const QUESTION: &str = "Download the file. What is the value in the \"answer\" column of the CSV?";

    fn csv(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn returns_first_answer_value() {
        let dir = TempDir::new().unwrap();
        let path = csv(&dir, "q.csv", "id,answer\n1,42\n2,43\n");

        assert_eq!(find_direct_answer(&path, QUESTION), Some("42".to_string()));
    }

    #[test]
    fn accepts_single_quoted_phrasing() {
        let dir = TempDir::new().unwrap();
        let path = csv(&dir, "Q.CSV", "answer\nhello\n");

        let question = "WHAT IS THE VALUE IN THE 'ANSWER' COLUMN?";
        assert_eq!(find_direct_answer(&path, question), Some("hello".to_string()));
    }

    #[test]
    fn column_name_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        let path = csv(&dir, "q.csv", "Answer\n42\n");

        assert_eq!(find_direct_answer(&path, QUESTION), None);
    }

    #[test]
    fn other_questions_do_not_match() {
        let dir = TempDir::new().unwrap();
        let path = csv(&dir, "q.csv", "answer\n42\n");

        assert_eq!(find_direct_answer(&path, "What is the sum of the answer column?"), None);
    }

    #[test]
    fn empty_table_does_not_match() {
        let dir = TempDir::new().unwrap();
        let path = csv(&dir, "q.csv", "answer\n");

        assert_eq!(find_direct_answer(&path, QUESTION), None);
    }

    #[test]
    fn only_csv_files_are_considered() {
        let dir = TempDir::new().unwrap();
        let path = csv(&dir, "q.txt", "answer\n42\n");

        assert_eq!(find_direct_answer(&path, QUESTION), None);
    }

    #[test]
    fn unparseable_csv_does_not_match() {
        let dir = TempDir::new().unwrap();
        let path = csv(&dir, "q.csv", "answer\n1,2,3\n");

        assert_eq!(find_direct_answer(&path, QUESTION), None);
    }

    #[test]
    fn missing_cell_reads_as_nan() {
        let dir = TempDir::new().unwrap();
        let path = csv(&dir, "q.csv", "id,answer\n1,\n");

        assert_eq!(find_direct_answer(&path, QUESTION), Some("nan".to_string()));
    }

    #[test]
    fn tiny_and_huge_floats_read_in_exponent_form() {
        let dir = TempDir::new().unwrap();
        let tiny = csv(&dir, "tiny.csv", "answer\n1e-05\n");
        let huge = csv(&dir, "huge.csv", "answer\n100000000000000000000\n");

        assert_eq!(find_direct_answer(&tiny, QUESTION), Some("1e-05".to_string()));
        assert_eq!(find_direct_answer(&huge, QUESTION), Some("1e+20".to_string()));
    }

    #[test]
    fn fractional_value_keeps_plain_form() {
        let dir = TempDir::new().unwrap();
        let path = csv(&dir, "q.csv", "answer\n3.5\n");

        assert_eq!(find_direct_answer(&path, QUESTION), Some("3.5".to_string()));
    }
}
