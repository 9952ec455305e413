// SPDX-License-Identifier: GPL-3.0-or-later
// vaultside - Pomodoro timer tied to tasks in the notes

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// A completed pomodoro, recorded when the timer runs out (possibly while
/// the process was not running) or is stopped after more than a minute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub task: Option<String>,
    pub completed_at: DateTime<Local>,
    pub started_at: Option<DateTime<Local>>,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

/// Timer state. Every transition takes the current wall-clock time so the
/// logic stays pure; persistence snapshots the whole struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PomodoroTimer {
    pub duration_minutes: i64,
    pub phase: Phase,
    /// Set while running; adjusted on resume so `now - started_at` is
    /// always the true working time.
    pub started_at: Option<DateTime<Local>>,
    /// Frozen elapsed seconds while paused.
    pub elapsed_secs: i64,
    pub active_task: Option<String>,
}

impl PomodoroTimer {
    pub fn new(duration_minutes: i64) -> Self {
        Self {
            duration_minutes,
            phase: Phase::Idle,
            started_at: None,
            elapsed_secs: 0,
            active_task: None,
        }
    }

    pub fn start(&mut self, task: Option<String>, now: DateTime<Local>) {
        self.phase = Phase::Running;
        self.started_at = Some(now);
        self.elapsed_secs = 0;
        self.active_task = task;
    }

    pub fn pause(&mut self, now: DateTime<Local>) {
        if self.phase == Phase::Running {
            self.elapsed_secs = self.elapsed(now);
            self.phase = Phase::Paused;
        }
    }

    pub fn resume(&mut self, now: DateTime<Local>) {
        if self.phase == Phase::Paused {
            self.started_at = Some(now - Duration::seconds(self.elapsed_secs));
            self.phase = Phase::Running;
        }
    }

    /// Stop and reset. Sessions longer than a minute are worth recording.
    pub fn stop(&mut self, now: DateTime<Local>) -> Option<CompletionRecord> {
        let record = if self.phase != Phase::Idle && self.elapsed(now) > 60 {
            Some(CompletionRecord {
                task: self.active_task.clone(),
                completed_at: now,
                started_at: self.started_at,
                duration_minutes: self.duration_minutes,
            })
        } else {
            None
        };
        *self = Self::new(self.duration_minutes);
        record
    }

    pub fn elapsed(&self, now: DateTime<Local>) -> i64 {
        match self.phase {
            Phase::Running => self
                .started_at
                .map(|t| now.signed_duration_since(t).num_seconds())
                .unwrap_or(0),
            Phase::Paused => self.elapsed_secs,
            Phase::Idle => 0,
        }
    }

    pub fn remaining_secs(&self, now: DateTime<Local>) -> i64 {
        (self.duration_minutes * 60 - self.elapsed(now)).max(0)
    }

    pub fn is_finished(&self, now: DateTime<Local>) -> bool {
        self.phase == Phase::Running && self.remaining_secs(now) == 0
    }

    /// Percentage of the session already worked, 0-100.
    pub fn progress(&self, now: DateTime<Local>) -> f64 {
        let total = (self.duration_minutes * 60) as f64;
        if total <= 0.0 {
            return 0.0;
        }
        let spent = total - self.remaining_secs(now) as f64;
        (spent / total * 100.0).clamp(0.0, 100.0)
    }

    /// Restore a persisted timer. A session that ran out while the state
    /// sat on disk converts into a completion record and a fresh timer;
    /// paused sessions come back frozen exactly where they were.
    pub fn restore(saved: Self, now: DateTime<Local>) -> (Self, Option<CompletionRecord>) {
        match saved.phase {
            Phase::Running => {
                if saved.remaining_secs(now) > 0 {
                    (saved, None)
                } else {
                    let record = CompletionRecord {
                        task: saved.active_task.clone(),
                        completed_at: now,
                        started_at: saved.started_at,
                        duration_minutes: saved.duration_minutes,
                    };
                    (Self::new(saved.duration_minutes), Some(record))
                }
            }
            Phase::Paused | Phase::Idle => (saved, None),
        }
    }
}

/// `MM:SS` for the countdown display.
pub fn format_time(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn state_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "vaultside")
        .context("Could not determine XDG data directory")?;
    let dir = dirs.data_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
    Ok(dir)
}

pub fn state_file_path() -> Result<PathBuf> {
    Ok(state_dir()?.join("pomodoro.json"))
}

pub fn completion_file_path() -> Result<PathBuf> {
    Ok(state_dir()?.join("pomodoro_completed.json"))
}

/// Load the persisted timer, converting an expired session into a
/// completion record on the side. Missing state yields a fresh timer.
pub fn load_timer(
    duration_minutes: i64,
    now: DateTime<Local>,
) -> Result<(PomodoroTimer, Option<CompletionRecord>)> {
    let path = state_file_path()?;
    if !path.exists() {
        return Ok((PomodoroTimer::new(duration_minutes), None));
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read timer state: {}", path.display()))?;
    match serde_json::from_str::<PomodoroTimer>(&content) {
        Ok(saved) => {
            let (timer, record) = PomodoroTimer::restore(saved, now);
            if let Some(record) = &record {
                save_completion(record)?;
                fs::remove_file(&path).ok();
            }
            Ok((timer, record))
        }
        Err(_) => {
            // Corrupt state is discarded rather than wedging the timer.
            fs::remove_file(&path).ok();
            Ok((PomodoroTimer::new(duration_minutes), None))
        }
    }
}

pub fn save_timer(timer: &PomodoroTimer) -> Result<()> {
    let path = state_file_path()?;
    if timer.phase == Phase::Idle {
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to clear timer state: {}", path.display()))?;
        }
        return Ok(());
    }
    let content = serde_json::to_string_pretty(timer)?;
    fs::write(&path, content)
        .with_context(|| format!("Failed to write timer state: {}", path.display()))
}

pub fn save_completion(record: &CompletionRecord) -> Result<()> {
    let path = completion_file_path()?;
    let content = serde_json::to_string_pretty(record)?;
    fs::write(&path, content)
        .with_context(|| format!("Failed to write completion record: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 6, h, m, s).unwrap()
    }

    #[test]
    fn fresh_timer_is_idle_with_full_duration() {
        let timer = PomodoroTimer::new(25);
        let now = at(9, 0, 0);
        assert_eq!(timer.phase, Phase::Idle);
        assert_eq!(timer.remaining_secs(now), 25 * 60);
        assert_eq!(timer.progress(now), 0.0);
    }

    #[test]
    fn running_timer_counts_down_by_wall_clock() {
        let mut timer = PomodoroTimer::new(25);
        timer.start(Some("write tests".into()), at(9, 0, 0));
        assert_eq!(timer.remaining_secs(at(9, 10, 0)), 15 * 60);
        assert!((timer.progress(at(9, 10, 0)) - 40.0).abs() < 1e-9);
        assert!(!timer.is_finished(at(9, 10, 0)));
        assert!(timer.is_finished(at(9, 25, 0)));
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let mut timer = PomodoroTimer::new(25);
        timer.start(None, at(9, 0, 0));
        timer.pause(at(9, 5, 0));
        // Ten minutes of pause do not count.
        assert_eq!(timer.remaining_secs(at(9, 15, 0)), 20 * 60);
        timer.resume(at(9, 15, 0));
        assert_eq!(timer.remaining_secs(at(9, 20, 0)), 15 * 60);
    }

    #[test]
    fn short_sessions_are_not_recorded() {
        let mut timer = PomodoroTimer::new(25);
        timer.start(None, at(9, 0, 0));
        assert!(timer.stop(at(9, 0, 30)).is_none());
        assert_eq!(timer.phase, Phase::Idle);
    }

    #[test]
    fn long_sessions_record_a_completion() {
        let mut timer = PomodoroTimer::new(25);
        timer.start(Some("refactor".into()), at(9, 0, 0));
        let record = timer.stop(at(9, 10, 0)).expect("should record");
        assert_eq!(record.task.as_deref(), Some("refactor"));
        assert_eq!(record.duration_minutes, 25);
        assert_eq!(timer.phase, Phase::Idle);
    }

    #[test]
    fn restore_keeps_a_live_session() {
        let mut timer = PomodoroTimer::new(25);
        timer.start(Some("read".into()), at(9, 0, 0));
        let (restored, record) = PomodoroTimer::restore(timer, at(9, 10, 0));
        assert!(record.is_none());
        assert_eq!(restored.phase, Phase::Running);
        assert_eq!(restored.remaining_secs(at(9, 10, 0)), 15 * 60);
    }

    #[test]
    fn restore_converts_an_expired_session() {
        let mut timer = PomodoroTimer::new(25);
        timer.start(Some("read".into()), at(9, 0, 0));
        let (restored, record) = PomodoroTimer::restore(timer, at(10, 0, 0));
        assert_eq!(restored.phase, Phase::Idle);
        let record = record.expect("expired session records a completion");
        assert_eq!(record.task.as_deref(), Some("read"));
        assert_eq!(record.completed_at, at(10, 0, 0));
    }

    #[test]
    fn restore_keeps_a_paused_session_frozen() {
        let mut timer = PomodoroTimer::new(25);
        timer.start(None, at(9, 0, 0));
        timer.pause(at(9, 5, 0));
        let (restored, record) = PomodoroTimer::restore(timer, at(13, 0, 0));
        assert!(record.is_none());
        assert_eq!(restored.phase, Phase::Paused);
        assert_eq!(restored.remaining_secs(at(13, 0, 0)), 20 * 60);
    }

    #[test]
    fn countdown_formats_as_minutes_and_seconds() {
        assert_eq!(format_time(25 * 60), "25:00");
        assert_eq!(format_time(61), "01:01");
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(-5), "00:00");
    }

    #[test]
    fn timer_state_round_trips_through_json() {
        let mut timer = PomodoroTimer::new(25);
        timer.start(Some("task".into()), at(9, 0, 0));
        let json = serde_json::to_string(&timer).unwrap();
        let back: PomodoroTimer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, timer);
    }
}
