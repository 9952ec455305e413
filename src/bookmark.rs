// SPDX-License-Identifier: GPL-3.0-or-later
// vaultside - Bookmark capture formatting

use url::Url;

const MAX_TITLE_LEN: usize = 100;

/// Host part of a URL, if it has one.
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}

/// `domain - title`, with whitespace collapsed and long titles truncated.
/// Falls back to the bare title when the URL carries no host.
pub fn format_bookmark_title(url: &str, page_title: &str) -> String {
    let mut title = page_title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if title.chars().count() > MAX_TITLE_LEN {
        title = title.chars().take(MAX_TITLE_LEN).collect::<String>() + "...";
    }

    match extract_domain(url) {
        Some(domain) => format!("{} - {}", domain, title),
        None if title.is_empty() => "Untitled".to_string(),
        None => title,
    }
}

/// Markdown line appended to the destination note, with an optional
/// parenthesized comment.
pub fn bookmark_line(title: &str, url: &str, comment: &str) -> String {
    if comment.is_empty() {
        format!("- [{}]({})", title, url)
    } else {
        format!("- [{}]({}) ({})", title, url, comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_extracted_from_url() {
        assert_eq!(
            extract_domain("https://docs.rs/regex/latest").as_deref(),
            Some("docs.rs")
        );
        assert_eq!(extract_domain("not a url"), None);
    }

    #[test]
    fn title_is_prefixed_with_domain() {
        assert_eq!(
            format_bookmark_title("https://x.test/a", "Some  Page\nTitle"),
            "x.test - Some Page Title"
        );
    }

    #[test]
    fn long_titles_are_truncated() {
        let long = "t".repeat(150);
        let formatted = format_bookmark_title("https://x.test", &long);
        assert!(formatted.ends_with("..."));
        assert_eq!(formatted.chars().count(), "x.test - ".len() + 103);
    }

    #[test]
    fn missing_domain_falls_back_to_title() {
        assert_eq!(format_bookmark_title("nope", "A Page"), "A Page");
        assert_eq!(format_bookmark_title("nope", ""), "Untitled");
    }

    #[test]
    fn bookmark_line_formats() {
        assert_eq!(
            bookmark_line("t", "http://x.test", ""),
            "- [t](http://x.test)"
        );
        assert_eq!(
            bookmark_line("t", "http://x.test", "read later"),
            "- [t](http://x.test) (read later)"
        );
    }
}
