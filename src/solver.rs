//! Per-request answering pipeline.
//!
//! An archive is expanded and only its first member is looked at. The CSV
//! answer-column shortcut is tried before anything is sent to the model.

use crate::intake::{
    expand_archive, extract_content, find_direct_answer, ExtractedContent, UploadedFile,
};
use crate::llm::{build_prompt, extract_final_answer, CompletionBackend};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    /// Read straight out of the uploaded file; the model was not called.
    Direct,
    /// Produced by the model (or a description of why the model call failed).
    Model,
    /// The upload could not be unpacked; the model was not called.
    Intake,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

impl Answer {
    fn new(text: impl Into<String>, source: AnswerSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// Outcome of looking at the uploaded file before any model call.
#[derive(Debug)]
enum Intake {
    Direct(String),
    Content(Option<ExtractedContent>),
    Failed(String),
}

#[derive(Clone)]
pub struct Solver {
    backend: Arc<dyn CompletionBackend>,
}

impl Solver {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Answer `question`, using `file` as context when given.
    pub async fn answer(&self, question: &str, file: Option<&UploadedFile>) -> Answer {
        let content = match file {
            None => None,
            Some(file) => {
                let path = file.path.clone();
                let is_archive = file.extension() == "zip";
                let owned_question = question.to_string();
                let intake = tokio::task::spawn_blocking(move || {
                    inspect_file(&path, is_archive, &owned_question)
                })
                .await
                .unwrap_or_else(|e| Intake::Failed(format!("Error processing file: {}", e)));

                match intake {
                    Intake::Direct(value) => return Answer::new(value, AnswerSource::Direct),
                    Intake::Failed(message) => return Answer::new(message, AnswerSource::Intake),
                    Intake::Content(content) => content,
                }
            }
        };

        Answer::new(
            self.ask_model(question, content.as_ref()).await,
            AnswerSource::Model,
        )
    }

    async fn ask_model(&self, question: &str, content: Option<&ExtractedContent>) -> String {
        let prompt = build_prompt(question, content);
        debug!(prompt_len = prompt.len(), with_file = content.is_some(), "Querying model");

        match self.backend.complete(&prompt).await {
            Ok(text) => extract_final_answer(&text),
            Err(e) if e.is_request_failure() => {
                warn!(error = %e, "Completion call failed");
                format!("Error calling completion API: {}", e)
            }
            Err(e) => {
                warn!(error = %e, "Completion response unusable");
                format!("Error generating answer: {}", e)
            }
        }
    }
}

/// Blocking file work: archive expansion, the direct-answer check and extraction.
fn inspect_file(path: &Path, is_archive: bool, question: &str) -> Intake {
    if is_archive {
        let archive = match expand_archive(path) {
            Ok(archive) => archive,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Archive expansion failed");
                return Intake::Failed(format!("Error processing archive: {}", e));
            }
        };
        // Only the first member is used; the rest are ignored
        return match archive.first_member() {
            Some(member) => inspect_single(member, question),
            None => {
                info!(path = %path.display(), "Archive has no files");
                Intake::Content(None)
            }
        };
    }
    inspect_single(path, question)
}

fn inspect_single(path: &Path, question: &str) -> Intake {
    if let Some(answer) = find_direct_answer(path, question) {
        return Intake::Direct(answer);
    }
    Intake::Content(Some(extract_content(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Replies with a fixed result and records every prompt it receives.
    struct FakeModel {
        reply: std::result::Result<String, fn() -> LlmError>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeModel {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(err: fn() -> LlmError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for FakeModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn upload(dir: &TempDir, name: &str, data: &[u8]) -> UploadedFile {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        UploadedFile::new(path, name)
    }

    #[tokio::test]
    async fn question_only_goes_to_model() {
        let model = FakeModel::replying("Final Answer: 4");
        let solver = Solver::new(model.clone());

        let answer = solver.answer("What is 2+2?", None).await;
        assert_eq!(answer, Answer::new("4", AnswerSource::Model));
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert!(!model.prompts.lock().unwrap()[0].contains("File contents:"));
    }

    #[tokio::test]
    async fn answer_column_skips_model() {
        let dir = TempDir::new().unwrap();
        let file = upload(&dir, "q.csv", b"answer\n42\n");
        let model = FakeModel::replying("unused");
        let solver = Solver::new(model.clone());

        let answer = solver
            .answer("What is the value in the \"answer\" column?", Some(&file))
            .await;
        assert_eq!(answer, Answer::new("42", AnswerSource::Direct));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn file_content_is_sent_with_question() {
        let dir = TempDir::new().unwrap();
        let file = upload(&dir, "notes.txt", b"the secret is 17");
        let model = FakeModel::replying("17");
        let solver = Solver::new(model.clone());

        let answer = solver.answer("What is the secret?", Some(&file)).await;
        assert_eq!(answer.text, "17");
        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("File contents:\nthe secret is 17\n\n"));
    }

    #[tokio::test]
    async fn network_failures_become_answer_text() {
        let model = FakeModel::failing(|| LlmError::Network("connection refused".into()));
        let solver = Solver::new(model);

        let answer = solver.answer("q", None).await;
        assert_eq!(answer.text, "Error calling completion API: connection refused");
        assert_eq!(answer.source, AnswerSource::Model);
    }

    #[tokio::test]
    async fn malformed_responses_become_answer_text() {
        let model = FakeModel::failing(|| LlmError::Parse("No completion choices in response".into()));
        let solver = Solver::new(model);

        let answer = solver.answer("q", None).await;
        assert_eq!(
            answer.text,
            "Error generating answer: No completion choices in response"
        );
    }

    #[tokio::test]
    async fn corrupt_archive_is_reported_without_model_call() {
        let dir = TempDir::new().unwrap();
        let file = upload(&dir, "bundle.zip", b"not a zip");
        let model = FakeModel::replying("unused");
        let solver = Solver::new(model.clone());

        let answer = solver.answer("q", Some(&file)).await;
        assert_eq!(answer.source, AnswerSource::Intake);
        assert!(answer.text.starts_with("Error processing archive: "));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }
}
