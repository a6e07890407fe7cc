//! Completion API request and response types.

use serde::{Deserialize, Serialize};

/// Body of a text-completion request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub model: String,
}

/// Raw completion response (for internal parsing).
///
/// Absent `choices` or `text` read as one empty choice; an explicit `null`
/// in either place fails to deserialize.
#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponseRaw {
    #[serde(default = "single_empty_choice")]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompletionChoice {
    #[serde(default)]
    pub text: String,
}

fn single_empty_choice() -> Vec<CompletionChoice> {
    vec![CompletionChoice::default()]
}

impl CompletionResponseRaw {
    /// Text of the first choice, trimmed; `None` for an empty `choices` list.
    pub fn first_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.text.trim().to_string())
    }
}
