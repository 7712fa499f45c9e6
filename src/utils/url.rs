//! URL and host classification helpers.

use url::Url;

/// Extensions that never contain auditable HTML.
const BINARY_EXTENSIONS: &[&str] = &[
    ".pdf", ".zip", ".gz", ".tar", ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".ico",
    ".mp4", ".mp3", ".avi", ".mov", ".webm", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    ".exe", ".dmg", ".css", ".js", ".woff", ".woff2", ".ttf",
];

/// Host of a URL string, if parseable.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(|h| h.to_lowercase())
}

/// The registrable domain of a host: the last two labels
/// (`blog.example.com` -> `example.com`). Single-label hosts (localhost)
/// are returned as-is.
pub fn registrable_domain(host: &str) -> String {
    let host = host.strip_prefix("www.").unwrap_or(host);
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() >= 2 {
        parts[parts.len() - 2..].join(".")
    } else {
        host.to_string()
    }
}

/// True when both URLs share a registrable domain (subdomains included).
pub fn same_registrable_domain(a: &str, b: &str) -> bool {
    match (host_of(a), host_of(b)) {
        (Some(ha), Some(hb)) => registrable_domain(&ha) == registrable_domain(&hb),
        _ => false,
    }
}

/// True when a URL path points at a binary asset.
pub fn is_binary_asset(url: &str) -> bool {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase();
    BINARY_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("example.com"), "example.com");
        assert_eq!(registrable_domain("www.example.com"), "example.com");
        assert_eq!(registrable_domain("blog.example.com"), "example.com");
        assert_eq!(registrable_domain("localhost"), "localhost");
    }

    #[test]
    fn test_same_registrable_domain() {
        assert!(same_registrable_domain(
            "https://example.com/a",
            "https://blog.example.com/b"
        ));
        assert!(!same_registrable_domain(
            "https://example.com",
            "https://example.org"
        ));
        assert!(!same_registrable_domain("not a url", "https://example.com"));
    }

    #[test]
    fn test_is_binary_asset() {
        assert!(is_binary_asset("https://example.com/report.pdf"));
        assert!(is_binary_asset("https://example.com/pic.JPG?x=1"));
        assert!(!is_binary_asset("https://example.com/guide"));
        assert!(!is_binary_asset("https://example.com/page.html"));
    }
}
