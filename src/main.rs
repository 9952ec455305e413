// SPDX-License-Identifier: GPL-3.0-or-later
// vaultside - A keyboard-driven sidebar companion for a markdown note vault

mod bookmark;
mod breadcrumbs;
mod config;
mod history;
mod hotkeys;
mod markdown;
mod pomodoro;
mod tabs;
mod vault;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use config::Config;
use markdown::RenderOptions;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vault::{PeriodKind, VaultClient};

#[derive(Parser)]
#[command(name = "vaultside")]
#[command(author = "Vaultside Contributors")]
#[command(version)]
#[command(about = "A keyboard-driven sidebar companion for a markdown note vault")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown to a hotkey-annotated HTML fragment
    Render {
        /// Markdown file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Disable hotkey badges for this render
        #[arg(long)]
        no_hotkeys: bool,
        /// Sequence index symbol assignment starts at
        #[arg(long, default_value_t = 0)]
        start_index: usize,
        /// Exclude digits from the symbol alphabet
        #[arg(long)]
        letters_only: bool,
        /// Current input buffer, for badge highlighting
        #[arg(long, default_value = "")]
        buffer: String,
        /// URL of an open tab (repeatable)
        #[arg(long = "open-tab")]
        open_tabs: Vec<String>,
        /// Use the reserved secondary-region symbol namespace
        #[arg(long)]
        secondary: bool,
    },
    /// Count hotkey targets in markdown
    Count {
        /// Markdown file; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Print a note from the vault
    Get {
        /// Vault page path, e.g. bookmarks/index.md
        page: String,
    },
    /// Write a note to the vault
    Put {
        page: String,
        /// Content file; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Print a periodic note (daily, weekly, monthly, yearly)
    Periodic {
        kind: String,
        /// Date as YYYY-MM-DD; defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Write this file's content instead of printing
        #[arg(long)]
        put: Option<PathBuf>,
    },
    /// List existing daily notes
    DailyList,
    /// Append a page or link as a markdown bookmark
    Capture {
        url: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        comment: String,
        /// Append to today's daily note instead of the bookmarks page
        #[arg(long)]
        today: bool,
        /// Destination page, overriding the configured bookmarks page
        #[arg(long)]
        page: Option<String>,
    },
    /// Browse history kept in the daily note
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Pomodoro timer tied to note tasks
    Pomodoro {
        #[command(subcommand)]
        action: PomodoroAction,
    },
    /// Print the breadcrumb trail for a vault page
    Crumbs { page: String },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Record a visit in the daily note
    Add {
        url: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// List recorded visits, most recent first
    List {
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove a visit from the daily note
    Remove {
        url: String,
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
enum PomodoroAction {
    /// Start a session, optionally tied to a task
    Start { task: Option<String> },
    Pause,
    Resume,
    Stop,
    Status,
}

fn read_markdown(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read stdin")?;
            Ok(content)
        }
    }
}

fn parse_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s)),
        None => Ok(Local::now().date_naive()),
    }
}

fn run(cli: Cli, cfg: Config) -> Result<()> {
    match cli.command {
        Commands::Render {
            file,
            no_hotkeys,
            start_index,
            letters_only,
            buffer,
            open_tabs,
            secondary,
        } => {
            let content = read_markdown(file.as_deref())?;
            let opts = RenderOptions {
                hotkeys: cfg.hotkeys.enabled && !no_hotkeys,
                start_index,
                letters_only: cfg.hotkeys.letters_only || letters_only,
                buffer: &buffer,
                open_tabs: &open_tabs,
                secondary_region: secondary,
            };
            print!("{}", markdown::render_markdown(&content, &opts));
        }
        Commands::Count { file } => {
            let content = read_markdown(file.as_deref())?;
            println!("{}", markdown::count_targets(&content));
        }
        Commands::Get { page } => {
            let client = VaultClient::new(&cfg.vault);
            print!("{}", client.get_note(&page)?);
        }
        Commands::Put { page, file } => {
            let client = VaultClient::new(&cfg.vault);
            let content = read_markdown(file.as_deref())?;
            client.put_note(&page, &content)?;
        }
        Commands::Periodic { kind, date, put } => {
            let kind: PeriodKind = kind.parse()?;
            let date = parse_date(date.as_deref())?;
            let client = VaultClient::new(&cfg.vault);
            match put {
                Some(file) => {
                    let content = read_markdown(Some(&file))?;
                    client.put_periodic(kind, date, &content)?;
                }
                None => print!("{}", client.get_periodic(kind, date)?),
            }
        }
        Commands::DailyList => {
            let client = VaultClient::new(&cfg.vault);
            for note in client.list_daily_notes()? {
                println!("{}", note);
            }
        }
        Commands::Capture {
            url,
            title,
            comment,
            today,
            page,
        } => {
            let client = VaultClient::new(&cfg.vault);
            let formatted = bookmark::format_bookmark_title(&url, &title);
            let line = bookmark::bookmark_line(&formatted, &url, &comment);
            if today {
                let date = Local::now().date_naive();
                let existing = client.get_periodic(PeriodKind::Daily, date)?;
                let updated = if existing.trim().is_empty() {
                    line.clone()
                } else {
                    format!("{}\n{}", existing.trim_end(), line)
                };
                client.put_periodic(PeriodKind::Daily, date, &updated)?;
            } else {
                let page = page.unwrap_or_else(|| cfg.pages.bookmarks_page.clone());
                client.append_to_note(&page, &line)?;
            }
            println!("{}", line);
        }
        Commands::History { action } => run_history(action, &cfg)?,
        Commands::Pomodoro { action } => run_pomodoro(action, &cfg)?,
        Commands::Crumbs { page } => {
            for crumb in breadcrumbs::breadcrumbs(&page) {
                println!("{}\t{}", crumb.name, crumb.path);
            }
        }
    }
    Ok(())
}

fn run_history(action: HistoryAction, cfg: &Config) -> Result<()> {
    let client = VaultClient::new(&cfg.vault);
    match action {
        HistoryAction::Add { url, title, date } => {
            let date = parse_date(date.as_deref())?;
            let content = client.get_periodic(PeriodKind::Daily, date)?;
            match history::add_entry(&content, &url, &title, Local::now()) {
                Some(updated) => client.put_periodic(PeriodKind::Daily, date, &updated)?,
                None => tracing::info!(url = %url, "not a history URL, skipped"),
            }
        }
        HistoryAction::List { date } => {
            let date = parse_date(date.as_deref())?;
            let content = client.get_periodic(PeriodKind::Daily, date)?;
            for entry in history::parse_history(&content) {
                println!("{}\t{}\t{}", entry.time, entry.title, entry.url);
            }
        }
        HistoryAction::Remove { url, date } => {
            let date = parse_date(date.as_deref())?;
            let content = client.get_periodic(PeriodKind::Daily, date)?;
            let updated = history::remove_entry(&content, &url);
            client.put_periodic(PeriodKind::Daily, date, &updated)?;
        }
    }
    Ok(())
}

fn run_pomodoro(action: PomodoroAction, cfg: &Config) -> Result<()> {
    let now = Local::now();
    let (mut timer, completed) = pomodoro::load_timer(cfg.pomodoro.duration_minutes, now)?;
    if let Some(record) = &completed {
        println!(
            "Completed pomodoro{} at {}",
            record
                .task
                .as_deref()
                .map(|t| format!(" for '{}'", t))
                .unwrap_or_default(),
            record.completed_at.format("%H:%M")
        );
    }
    match action {
        PomodoroAction::Start { task } => {
            timer.start(task, now);
            pomodoro::save_timer(&timer)?;
            println!("Started {} minute session", timer.duration_minutes);
        }
        PomodoroAction::Pause => {
            timer.pause(now);
            pomodoro::save_timer(&timer)?;
            println!("Paused at {}", pomodoro::format_time(timer.remaining_secs(now)));
        }
        PomodoroAction::Resume => {
            timer.resume(now);
            pomodoro::save_timer(&timer)?;
            println!("Resumed, {} left", pomodoro::format_time(timer.remaining_secs(now)));
        }
        PomodoroAction::Stop => {
            if let Some(record) = timer.stop(now) {
                pomodoro::save_completion(&record)?;
                println!("Recorded completed session");
            }
            pomodoro::save_timer(&timer)?;
            println!("Stopped");
        }
        PomodoroAction::Status => {
            let state = match timer.phase {
                pomodoro::Phase::Idle => "idle",
                pomodoro::Phase::Running => "running",
                pomodoro::Phase::Paused => "paused",
            };
            let task = timer
                .active_task
                .as_deref()
                .map(|t| format!(" ({})", t))
                .unwrap_or_default();
            println!(
                "{}{} {} {:.0}%",
                state,
                task,
                pomodoro::format_time(timer.remaining_secs(now)),
                timer.progress(now)
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;
    run(cli, cfg)
}
