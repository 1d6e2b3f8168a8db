//! Upload key generation.
//!
//! A key is minted once per issued credential as `{uuid}_{sanitized name}`.
//! The random prefix guarantees uniqueness; the sanitized original name keeps
//! keys readable in the bucket.

use uuid::Uuid;

/// Generate a fresh, globally unique storage key for an upload.
pub fn upload_key(original_name: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitize_filename(original_name))
}

/// Strip characters that are unsafe in object keys or filesystem paths.
/// Path separators and anything outside `[A-Za-z0-9._-]` become `_`.
pub fn sanitize_filename(original_name: &str) -> String {
    let sanitized: String = original_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = sanitized.trim_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
