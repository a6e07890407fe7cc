/// Boilerplate the model tends to put before the value, tried in this order.
const PREFIXES: &[&str] = &[
    "answer:",
    "the answer is:",
    "final answer:",
    "value:",
    "result:",
    "output:",
];

/// Reduce raw model output to the answer line.
///
/// Works on a lower-cased copy. Each prefix, in order, cuts the copy down to
/// what follows its first occurrence, so later prefixes only see what earlier
/// cuts left behind. The first non-empty line wins; with none left the
/// original text is returned trimmed.
pub fn extract_final_answer(response_text: &str) -> String {
    let mut cleaned = response_text.to_lowercase();

    for prefix in PREFIXES {
        if let Some((_, rest)) = cleaned.split_once(prefix) {
            cleaned = rest.trim().to_string();
        }
    }

    cleaned
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| response_text.trim().to_string())
}
