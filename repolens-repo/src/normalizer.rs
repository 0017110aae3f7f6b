//! Configuration content normalization
//!
//! Pure computation over base64 file content; runs inside the worker pool.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Decode base64 content and re-serialize it as canonical YAML
///
/// Returns `None` for empty or undecodable input. Content that is blank after
/// trimming yields an empty string. Content that does not parse as a single
/// YAML document, or parses to nothing, is returned trimmed and unmodified.
pub fn normalize_content(encoded: &str) -> Option<String> {
    if encoded.is_empty() {
        return None;
    }

    let decoded = decode_base64(encoded)?;
    let trimmed = decoded.trim();

    if trimmed.is_empty() {
        return Some(String::new());
    }

    Some(canonical_yaml(&decoded).unwrap_or_else(|| trimmed.to_string()))
}

/// GitHub wraps base64 payloads at 60 columns; line breaks are not part of the data
fn decode_base64(encoded: &str) -> Option<String> {
    let cleaned: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = BASE64.decode(cleaned.as_bytes()).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn canonical_yaml(text: &str) -> Option<String> {
    let value: serde_yaml::Value = serde_yaml::from_str(text).ok()?;
    // Null documents, comment-only ones included, keep their own text
    if value.is_null() {
        return None;
    }

    let serialized = serde_yaml::to_string(&value).ok()?;
    Some(serialized.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> String {
        BASE64.encode(text.as_bytes())
    }

    #[test]
    fn test_empty_input_is_none() {
        assert_eq!(normalize_content(""), None);
    }

    #[test]
    fn test_blank_content_is_empty_string() {
        assert_eq!(normalize_content(&encode(" \n")), Some(String::new()));
    }

    #[test]
    fn test_invalid_base64_is_none() {
        assert_eq!(normalize_content("not base64!!"), None);
    }

    #[test]
    fn test_canonical_reserialization() {
        let text = "name:   ci\ntrigger:\n  push:\n    branches: [ main,  dev ]\n\n\n";
        let normalized = normalize_content(&encode(text)).unwrap();

        assert_eq!(
            normalized,
            "name: ci\ntrigger:\n  push:\n    branches:\n    - main\n    - dev"
        );

        let original: serde_yaml::Value = serde_yaml::from_str(text).unwrap();
        let reparsed: serde_yaml::Value = serde_yaml::from_str(&normalized).unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn test_scalar_document() {
        assert_eq!(normalize_content(&encode("  hello  \n")), Some("hello".to_string()));
    }

    #[test]
    fn test_malformed_yaml_falls_back_to_trimmed_text() {
        let text = "\n  key: [unclosed\n  other: value\n";
        assert_eq!(normalize_content(&encode(text)), Some(text.trim().to_string()));
    }

    #[test]
    fn test_multiple_documents_fall_back_to_trimmed_text() {
        let text = "a: 1\n---\nb: 2\n";
        assert_eq!(normalize_content(&encode(text)), Some(text.trim().to_string()));
    }

    #[test]
    fn test_null_document_keeps_its_text() {
        assert_eq!(normalize_content(&encode("~\n")), Some("~".to_string()));
        assert_eq!(
            normalize_content(&encode("  null  \n")),
            Some("null".to_string())
        );
    }

    #[test]
    fn test_comment_only_document_falls_back_to_trimmed_text() {
        let text = "# nothing configured yet\n";
        assert_eq!(
            normalize_content(&encode(text)),
            Some("# nothing configured yet".to_string())
        );
    }

    #[test]
    fn test_wrapped_base64_is_accepted() {
        let encoded = encode("key: value\nlist:\n  - 1\n  - 2\n");
        let (head, tail) = encoded.split_at(10);
        let wrapped = format!("{}\n{}\n", head, tail);

        assert_eq!(
            normalize_content(&wrapped),
            Some("key: value\nlist:\n- 1\n- 2".to_string())
        );
    }
}
