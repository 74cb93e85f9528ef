/// Keep ASCII alphanumerics, `.`, `-` and `_`; anything else becomes `_`.
/// Leading dots are dropped so the result can never be a hidden file or `..`.
pub fn sanitize_filename(name: &str) -> String {
    // Browsers on Windows may send the full client path
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<millis>_<sanitized name>`
pub fn timestamped_filename(original: &str, millis: i64) -> String {
    format!("{}_{}", millis, sanitize_filename(original))
}
