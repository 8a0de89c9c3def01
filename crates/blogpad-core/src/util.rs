//! Small helpers shared by the config, wire and media code.

use url::Url;

/// Longest excerpt of a remote error body kept in an error message.
const EXCERPT_CHARS: usize = 180;

/// Trimmed text, or `None` when missing or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

/// Absolute `http`/`https` URL with a host.
pub fn is_http_url(value: &str) -> bool {
    Url::parse(value.trim())
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}

/// Leading part of a response body for error messages.
pub fn error_excerpt(body: &str) -> String {
    body.trim().chars().take(EXCERPT_CHARS).collect()
}

/// Current Unix timestamp in milliseconds.
pub fn unix_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_drops_missing_and_whitespace() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" \t ".to_string())), None);
        assert_eq!(non_blank(Some("  ana ".to_string())), Some("ana".to_string()));
    }

    #[test]
    fn http_url_requires_scheme_and_host() {
        assert!(is_http_url("http://localhost:3000"));
        assert!(is_http_url(" https://img.example/a.png "));
        assert!(!is_http_url("ftp://img.example/a.png"));
        assert!(!is_http_url("img.example/a.png"));
        assert!(!is_http_url("http://"));
        assert!(!is_http_url("data:image/png;base64,AAAA"));
    }

    #[test]
    fn error_excerpt_is_bounded() {
        let body = "é".repeat(400);
        assert_eq!(error_excerpt(&body).chars().count(), EXCERPT_CHARS);
        assert_eq!(error_excerpt("\n not found \n"), "not found");
    }
}
