// SPDX-License-Identifier: GPL-3.0-or-later
// vaultside - Open-tab matching and stale-tab refresh policy

use chrono::{DateTime, Local};

/// Strip a single trailing slash so `http://x.test/` and `http://x.test`
/// compare equal.
fn trim_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// True when the link URL matches one of the open tab URLs. This is the
/// comparison behind the preview's "already open" badge.
pub fn is_url_open(url: &str, open_tabs: &[String]) -> bool {
    if url.is_empty() || open_tabs.is_empty() {
        return false;
    }
    let normalized = trim_trailing_slash(url);
    open_tabs
        .iter()
        .any(|tab| trim_trailing_slash(tab) == normalized)
}

/// Whether a tab loaded at `last_accessed` is stale enough to reload before
/// re-activating. Tabs with no recorded access time are never refreshed.
pub fn should_refresh(
    last_accessed: Option<DateTime<Local>>,
    now: DateTime<Local>,
    refresh_minutes: i64,
) -> bool {
    match last_accessed {
        Some(t) => now.signed_duration_since(t).num_minutes() > refresh_minutes,
        None => false,
    }
}

pub fn is_relative_url(url: &str) -> bool {
    !url.starts_with("http://") && !url.starts_with("https://") && !url.starts_with("file://")
}

/// Join a relative URL onto a base. Absolute URLs and empty / placeholder
/// values pass through unchanged.
pub fn resolve_url(base: &str, relative: &str) -> String {
    if relative.is_empty() || relative == "#" || !is_relative_url(relative) {
        return relative.to_string();
    }
    if base.ends_with('/') {
        format!("{}{}", base, relative)
    } else {
        format!("{}/{}", base, relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn open_tab_matching_ignores_trailing_slash() {
        let tabs = vec!["http://x.test/".to_string(), "https://y.test/a".to_string()];
        assert!(is_url_open("http://x.test", &tabs));
        assert!(is_url_open("https://y.test/a/", &tabs));
        assert!(!is_url_open("https://y.test/b", &tabs));
        assert!(!is_url_open("", &tabs));
        assert!(!is_url_open("http://x.test", &[]));
    }

    #[test]
    fn tab_loaded_twenty_minutes_ago_refreshes() {
        let now = Local::now();
        let loaded = now - Duration::minutes(20);
        assert!(should_refresh(Some(loaded), now, 15));
    }

    #[test]
    fn tab_loaded_ten_minutes_ago_does_not_refresh() {
        let now = Local::now();
        let loaded = now - Duration::minutes(10);
        assert!(!should_refresh(Some(loaded), now, 15));
    }

    #[test]
    fn tab_without_access_time_does_not_refresh() {
        assert!(!should_refresh(None, Local::now(), 15));
    }

    #[test]
    fn resolves_relative_urls_against_base() {
        assert_eq!(
            resolve_url("http://x.test/docs", "page.html"),
            "http://x.test/docs/page.html"
        );
        assert_eq!(
            resolve_url("http://x.test/docs/", "page.html"),
            "http://x.test/docs/page.html"
        );
        assert_eq!(
            resolve_url("http://x.test", "https://other.test"),
            "https://other.test"
        );
        assert_eq!(resolve_url("http://x.test", "#"), "#");
    }
}
