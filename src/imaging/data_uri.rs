//! Data-URI passthrough rules shared by outgoing captures and displayed
//! server images.

const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Make an image value self-describing. Values that are already http(s) URLs
/// or `data:` URIs pass through unchanged; bare base64 gets the JPEG data-URI
/// prefix. Idempotent. Empty input stays empty.
pub fn ensure_data_uri(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with("http") || trimmed.starts_with("data:") {
        trimmed.to_string()
    } else {
        format!("{JPEG_DATA_URI_PREFIX}{trimmed}")
    }
}

/// Display-mode variant: absent or empty server values yield `None` so the UI
/// can fall back to a placeholder.
pub fn display_image(value: Option<&str>) -> Option<String> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(ensure_data_uri(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_base64_gets_prefixed() {
        assert_eq!(
            ensure_data_uri("aGVsbG8="),
            "data:image/jpeg;base64,aGVsbG8="
        );
    }

    #[test]
    fn urls_and_data_uris_pass_through() {
        assert_eq!(
            ensure_data_uri("https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            ensure_data_uri("data:image/png;base64,xyz"),
            "data:image/png;base64,xyz"
        );
    }

    #[test]
    fn passthrough_is_idempotent() {
        let once = ensure_data_uri("aGVsbG8=");
        let twice = ensure_data_uri(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_values_stay_empty() {
        assert_eq!(ensure_data_uri(""), "");
        assert_eq!(ensure_data_uri("   "), "");
        assert_eq!(display_image(None), None);
        assert_eq!(display_image(Some("")), None);
    }

    #[test]
    fn display_image_prefixes_bare_values() {
        assert_eq!(
            display_image(Some("abc")).unwrap(),
            "data:image/jpeg;base64,abc"
        );
    }
}
