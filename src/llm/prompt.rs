use crate::intake::ExtractedContent;

const INSTRUCTIONS: &str = "You are an assistant helping with IIT Madras' Online Degree in Data Science graded assignments. \
Answer the following question concisely with just the exact value or text to be submitted as the answer. \
Do not include explanations or extra text.";

const CLOSING: &str =
    "Provide only the exact answer value without any additional text or explanation:";

/// Assemble the completion prompt for `question`, embedding file content when present.
pub fn build_prompt(question: &str, content: Option<&ExtractedContent>) -> String {
    let mut prompt = format!("{}\n\nQuestion: {}\n\n", INSTRUCTIONS, question);
    if let Some(content) = content {
        prompt.push_str(&format!("File contents:\n{}\n\n", content));
    }
    prompt.push_str(CLOSING);
    prompt
}
