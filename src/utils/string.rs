/// Convert bytes to a trimmed string, handling UTF-8 conversion errors gracefully
pub fn bytes_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

/// Escape single quotes so the value can sit inside a single-quoted shell word.
/// Each `'` becomes `'\''` (close quote, escaped quote, reopen quote).
pub fn escape_single_quotes(value: &str) -> String {
    value.replace('\'', r"'\''")
}

/// Wrap a value in single quotes for the shell, escaping embedded quotes
pub fn single_quote(value: &str) -> String {
    format!("'{}'", escape_single_quotes(value))
}

/// Format a remote rsync path (`host:path`)
pub fn format_remote_path(host: &str, path: &str) -> String {
    format!("{}:{}", host, path)
}
