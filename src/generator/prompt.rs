//! Prompt construction for the model path.

/// Maximum diff characters included in the prompt.
///
/// Small local models have short effective contexts; the head of the diff
/// carries the file headers and the first hunks, which is what the message
/// needs to reflect.
pub const MAX_PROMPT_DIFF_LEN: usize = 1000;

/// Render the prompt template, substituting `{diff}` with a truncated diff.
///
/// A template without the placeholder gets the diff appended so the model
/// always sees the changes.
pub fn build_prompt(template: &str, diff_text: &str) -> String {
    let truncated: String = diff_text.chars().take(MAX_PROMPT_DIFF_LEN).collect();

    if template.contains("{diff}") {
        template.replace("{diff}", &truncated)
    } else {
        format!("{template}\n{truncated}")
    }
}
