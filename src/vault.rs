// SPDX-License-Identifier: GPL-3.0-or-later
// vaultside - REST client for the notes vault

use crate::config::VaultConfig;
use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Periodic note kinds served by the vault's periodic-notes endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Daily => "daily",
            PeriodKind::Weekly => "weekly",
            PeriodKind::Monthly => "monthly",
            PeriodKind::Yearly => "yearly",
        }
    }
}

impl FromStr for PeriodKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(PeriodKind::Daily),
            "weekly" => Ok(PeriodKind::Weekly),
            "monthly" => Ok(PeriodKind::Monthly),
            "yearly" => Ok(PeriodKind::Yearly),
            other => Err(anyhow!(
                "Unknown period '{}', expected daily/weekly/monthly/yearly",
                other
            )),
        }
    }
}

/// JSON envelope the vault returns for single notes.
#[derive(Deserialize)]
struct NoteBody {
    content: Option<String>,
}

#[derive(Deserialize)]
struct NoteListing {
    #[serde(default)]
    notes: Vec<String>,
}

fn note_url(api_url: &str, page: &str) -> String {
    format!("{}/{}", api_url.trim_end_matches('/'), page)
}

fn periodic_url(periodic_api_url: &str, kind: PeriodKind, date: NaiveDate) -> String {
    format!(
        "{}/periodic/{}/{}/{:02}/{:02}/",
        periodic_api_url.trim_end_matches('/'),
        kind.as_str(),
        date.year(),
        date.month(),
        date.day()
    )
}

/// Client for the local vault REST API. All calls are blocking with the
/// configured timeout; auth is a bearer token on every request.
pub struct VaultClient {
    agent: ureq::Agent,
    api_url: String,
    periodic_api_url: String,
    api_key: String,
}

impl VaultClient {
    pub fn new(cfg: &VaultConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build();
        Self {
            agent,
            api_url: cfg.api_url.clone(),
            periodic_api_url: cfg.periodic_api_url.clone(),
            api_key: cfg.api_key.clone(),
        }
    }

    fn fetch_note(&self, url: &str) -> Result<ureq::Response, ureq::Error> {
        tracing::debug!(url = %url, "vault GET");
        self.agent
            .get(url)
            .set("accept", "application/vnd.olrapi.note+json")
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .call()
    }

    /// Fetch a note's markdown content.
    pub fn get_note(&self, page: &str) -> Result<String> {
        let url = note_url(&self.api_url, page);
        let response = self
            .fetch_note(&url)
            .with_context(|| format!("Failed to load note {}", page))?;
        note_content(response)
    }

    /// Write a note's full markdown content.
    pub fn put_note(&self, page: &str, content: &str) -> Result<()> {
        let url = note_url(&self.api_url, page);
        tracing::debug!(url = %url, "vault PUT");
        self.agent
            .put(&url)
            .set("Content-Type", "text/markdown")
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_string(content)
            .with_context(|| format!("Failed to save note {}", page))?;
        Ok(())
    }

    /// Append a markdown block to a note, creating it when missing.
    pub fn append_to_note(&self, page: &str, block: &str) -> Result<()> {
        let url = note_url(&self.api_url, page);
        let existing = match self.fetch_note(&url) {
            Ok(response) => note_content(response)?,
            Err(ureq::Error::Status(404, _)) => String::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to load note {}", page));
            }
        };
        let updated = if existing.trim().is_empty() {
            block.to_string()
        } else {
            format!("{}\n{}", existing.trim_end(), block)
        };
        self.put_note(page, &updated)
    }

    /// Fetch a periodic note. A missing note is an empty one.
    pub fn get_periodic(&self, kind: PeriodKind, date: NaiveDate) -> Result<String> {
        let url = periodic_url(&self.periodic_api_url, kind, date);
        match self.fetch_note(&url) {
            Ok(response) => note_content(response),
            Err(ureq::Error::Status(404, _)) => Ok(String::new()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to load {} note for {}", kind.as_str(), date)
            }),
        }
    }

    /// Write a periodic note's full content.
    pub fn put_periodic(&self, kind: PeriodKind, date: NaiveDate, content: &str) -> Result<()> {
        let url = periodic_url(&self.periodic_api_url, kind, date);
        tracing::debug!(url = %url, "vault PUT");
        self.agent
            .put(&url)
            .set("Content-Type", "text/markdown")
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_string(content)
            .with_context(|| format!("Failed to save {} note for {}", kind.as_str(), date))?;
        Ok(())
    }

    /// List existing daily notes.
    pub fn list_daily_notes(&self) -> Result<Vec<String>> {
        let url = format!(
            "{}/periodic/daily/",
            self.periodic_api_url.trim_end_matches('/')
        );
        tracing::debug!(url = %url, "vault GET");
        let response = self
            .agent
            .get(&url)
            .set("accept", "application/json")
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .call()
            .context("Failed to list daily notes")?;
        let text = response
            .into_string()
            .context("Failed to read daily note listing")?;
        let listing: NoteListing =
            serde_json::from_str(&text).context("Unexpected daily note listing format")?;
        Ok(listing.notes)
    }
}

/// Extract markdown content from the vault's JSON note envelope.
fn note_content(response: ureq::Response) -> Result<String> {
    let text = response
        .into_string()
        .context("Failed to read vault response")?;
    let body: NoteBody =
        serde_json::from_str(&text).context("Unexpected note response format")?;
    Ok(body.content.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_urls_join_without_double_slashes() {
        assert_eq!(
            note_url("http://127.0.0.1:27123/vault/", "a/b.md"),
            "http://127.0.0.1:27123/vault/a/b.md"
        );
        assert_eq!(
            note_url("http://127.0.0.1:27123/vault", "index.md"),
            "http://127.0.0.1:27123/vault/index.md"
        );
    }

    #[test]
    fn periodic_urls_are_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(
            periodic_url("http://127.0.0.1:27123", PeriodKind::Daily, date),
            "http://127.0.0.1:27123/periodic/daily/2026/08/06/"
        );
        assert_eq!(
            periodic_url("http://127.0.0.1:27123/", PeriodKind::Weekly, date),
            "http://127.0.0.1:27123/periodic/weekly/2026/08/06/"
        );
    }

    #[test]
    fn period_kinds_parse_case_insensitively() {
        assert_eq!("daily".parse::<PeriodKind>().unwrap(), PeriodKind::Daily);
        assert_eq!("Monthly".parse::<PeriodKind>().unwrap(), PeriodKind::Monthly);
        assert!("hourly".parse::<PeriodKind>().is_err());
    }
}
