// SPDX-License-Identifier: GPL-3.0-or-later
// vaultside - Browse history kept as markdown lines in the daily note

use chrono::{DateTime, Local};
use regex::Regex;
use url::Url;

/// `- [normalizedUrl - title - HH:MM](url)`
const ENTRY_RE: &str = r"^- \[(.+) - (.+) - (\d{2}:\d{2})\]\((.+)\)$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    /// Time of day the page was visited, `HH:MM`.
    pub time: String,
    pub normalized_url: String,
    pub raw_line: String,
}

/// Host + path form used in entry labels. Trailing slash is stripped
/// except for a bare root path. Unparseable URLs pass through unchanged.
pub fn normalize_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let host = parsed.host_str().unwrap_or("");
    let mut normalized = format!("{}{}", host, parsed.path());
    if normalized.ends_with('/') && normalized != "/" {
        normalized.pop();
    }
    normalized
}

/// Only ordinary web pages belong in the history: http(s) URLs that are
/// not browser-internal and not the local vault API itself.
pub fn is_history_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    !url.starts_with("chrome://")
        && !url.starts_with("chrome-extension://")
        && !url.starts_with("about:")
        && !url.starts_with("moz-extension://")
        && !url.starts_with("edge://")
        && !url.contains("localhost")
        && !url.contains("127.0.0.1")
        && (url.starts_with("http://") || url.starts_with("https://"))
}

/// Markdown line for a visit at the given wall-clock time.
pub fn entry_line(url: &str, title: &str, now: DateTime<Local>) -> String {
    format!(
        "- [{} - {} - {}]({})",
        normalize_url(url),
        title,
        now.format("%H:%M"),
        url
    )
}

/// Parse all history entries out of a daily note, most recent first.
pub fn parse_history(content: &str) -> Vec<HistoryEntry> {
    let Ok(re) = Regex::new(ENTRY_RE) else {
        return Vec::new();
    };
    let mut entries: Vec<HistoryEntry> = content
        .lines()
        .filter_map(|line| {
            let cap = re.captures(line)?;
            Some(HistoryEntry {
                normalized_url: cap.get(1)?.as_str().trim().to_string(),
                title: cap.get(2)?.as_str().trim().to_string(),
                time: cap.get(3)?.as_str().trim().to_string(),
                url: cap.get(4)?.as_str().trim().to_string(),
                raw_line: line.to_string(),
            })
        })
        .collect();
    entries.sort_by_key(|e| std::cmp::Reverse(minutes_of_day(&e.time)));
    entries
}

fn minutes_of_day(time: &str) -> u32 {
    let mut parts = time.splitn(2, ':');
    let hours: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minutes: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    hours * 60 + minutes
}

/// Prepend a visit to the note content, replacing any earlier entry for
/// the same URL. Returns None when the URL does not belong in history.
pub fn add_entry(
    content: &str,
    url: &str,
    title: &str,
    now: DateTime<Local>,
) -> Option<String> {
    if !is_history_url(url) {
        return None;
    }
    let without = remove_entry(content, url);
    let new_line = entry_line(url, title, now);
    if without.is_empty() {
        Some(new_line)
    } else {
        Some(format!("{}\n{}", new_line, without))
    }
}

/// Drop the history line for `url`, leaving every other line untouched.
pub fn remove_entry(content: &str, url: &str) -> String {
    let Ok(re) = Regex::new(ENTRY_RE) else {
        return content.to_string();
    };
    content
        .lines()
        .filter(|line| match re.captures(line) {
            Some(cap) => cap.get(4).map(|m| m.as_str().trim()) != Some(url),
            None => true,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 6, h, m, 0).unwrap()
    }

    #[test]
    fn normalizes_to_host_and_path() {
        assert_eq!(normalize_url("https://x.test/a/b/"), "x.test/a/b");
        assert_eq!(normalize_url("https://x.test/"), "x.test");
        assert_eq!(normalize_url("not a url"), "not a url");
    }

    #[test]
    fn filters_internal_urls() {
        assert!(is_history_url("https://x.test/page"));
        assert!(!is_history_url("chrome://settings"));
        assert!(!is_history_url("about:blank"));
        assert!(!is_history_url("http://127.0.0.1:27123/vault"));
        assert!(!is_history_url("ftp://x.test"));
        assert!(!is_history_url(""));
    }

    #[test]
    fn entries_round_trip_through_the_note() {
        let line = entry_line("https://x.test/a", "A Page", at(9, 5));
        assert_eq!(line, "- [x.test/a - A Page - 09:05](https://x.test/a)");
        let parsed = parse_history(&line);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].url, "https://x.test/a");
        assert_eq!(parsed[0].title, "A Page");
        assert_eq!(parsed[0].time, "09:05");
    }

    #[test]
    fn parse_sorts_most_recent_first() {
        let content = "\
- [a.test - A - 08:00](https://a.test)
some unrelated line
- [b.test - B - 12:30](https://b.test)
- [c.test - C - 10:15](https://c.test)";
        let parsed = parse_history(content);
        let times: Vec<&str> = parsed.iter().map(|e| e.time.as_str()).collect();
        assert_eq!(times, vec!["12:30", "10:15", "08:00"]);
    }

    #[test]
    fn add_prepends_and_dedupes_by_url() {
        let content = add_entry("", "https://x.test/a", "A", at(9, 0)).unwrap();
        let content = add_entry(&content, "https://y.test/b", "B", at(10, 0)).unwrap();
        // Re-visiting the first URL replaces its old entry.
        let content = add_entry(&content, "https://x.test/a", "A", at(11, 0)).unwrap();
        let parsed = parse_history(&content);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].time, "11:00");
        assert_eq!(parsed[0].url, "https://x.test/a");
    }

    #[test]
    fn add_rejects_non_history_urls() {
        assert!(add_entry("", "chrome://newtab", "t", at(9, 0)).is_none());
    }

    #[test]
    fn remove_keeps_unrelated_lines() {
        let content = "# Daily\n- [x.test - X - 09:00](https://x.test)\n- plain item";
        let removed = remove_entry(content, "https://x.test");
        assert_eq!(removed, "# Daily\n- plain item");
    }
}
