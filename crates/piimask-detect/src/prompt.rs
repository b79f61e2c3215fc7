//! Prompts sent to the extraction model.

/// System prompt: identify PII, and prefer masking when unsure.
pub fn system_prompt() -> &'static str {
    "You are an expert at identifying PII in text. \
     You can accurately detect PII from context and classify it correctly. \
     When uncertain, mask the content rather than risk PII exposure."
}

/// User prompt asking for a JSON array of `{pii, type}` objects restricted
/// to `pii_types`.
pub fn extraction_prompt(text: &str, pii_types: &[String]) -> String {
    let types = pii_types.join(", ");
    format!(
        "Extract all substrings from the text below that are personal identifiable information \
         of the following types: {types}. \
         For each detected item, output a valid JSON array of objects with two keys:\n  \
         - 'pii': the exact substring detected\n  \
         - 'type': the PII type (must match one of: {types})\n\n\
         Text: '{text}'"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt() {
        let prompt = system_prompt();
        assert!(prompt.contains("PII"));
        assert!(prompt.len() > 10);
    }

    #[test]
    fn test_extraction_prompt() {
        let prompt = extraction_prompt(
            "Hi alice@example.com",
            &["email".to_string(), "phone".to_string()],
        );
        assert!(prompt.contains("alice@example.com"));
        assert!(prompt.contains("email, phone"));
        assert!(prompt.contains("valid JSON array"));
        assert!(prompt.ends_with("Text: 'Hi alice@example.com'"));
    }
}
