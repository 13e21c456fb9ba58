//! `revise`: command-line client for the revise study tracker.
//!
//! # Usage
//!
//! ```
//! revise --url http://localhost:8001 home
//! revise subject add "Organic chemistry"
//! revise topic add <SUBJECT_ID> "Aldehydes" --notes "chapter 12"
//! revise done <TOPIC_ID> 7
//! revise --config ~/.config/revise/config.toml home --select 2024-03-14
//! ```

mod client;
mod reminders;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use reminders::ReminderLog;
use revise_core::{
  service::{HomeState, StudyService},
  status::Completion,
  topic::TopicPatch,
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "revise", about = "Spaced-repetition study tracker")]
struct Args {
  /// Path to a TOML config file (url, username, password, reminders).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the revise server (default: http://localhost:8001).
  #[arg(long, env = "REVISE_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "REVISE_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "REVISE_PASSWORD")]
  password: Option<String>,

  /// Append reminders for new topics to this file as JSON lines.
  #[arg(long, env = "REVISE_REMINDERS", value_name = "FILE")]
  reminders: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Today's and upcoming revisions, subjects, and the month calendar.
  Home {
    /// Pretend today is this date.
    #[arg(long)]
    date:   Option<NaiveDate>,
    /// Calendar day to show revisions for (default: today).
    #[arg(long)]
    select: Option<NaiveDate>,
  },
  /// The next incomplete revision of every topic.
  Next {
    #[arg(long)]
    date: Option<NaiveDate>,
  },
  /// List subjects.
  Subjects,
  /// Manage a subject.
  #[command(subcommand)]
  Subject(SubjectCommand),
  /// List topics, optionally of one subject.
  Topics {
    #[arg(long)]
    subject: Option<Uuid>,
  },
  /// Manage a topic.
  #[command(subcommand)]
  Topic(TopicCommand),
  /// Mark the day 2, 7 or 14 revision of a topic as done.
  Done { topic_id: Uuid, day: u32 },
}

#[derive(Subcommand, Debug)]
enum SubjectCommand {
  Add { name: String },
  Rename { id: Uuid, name: String },
  /// Delete a subject and all its topics.
  Rm { id: Uuid },
}

#[derive(Subcommand, Debug)]
enum TopicCommand {
  Add {
    subject_id: Uuid,
    name:       String,
    #[arg(long, default_value = "")]
    notes:      String,
  },
  Show { id: Uuid },
  Edit {
    id:    Uuid,
    #[arg(long)]
    name:  Option<String>,
    #[arg(long)]
    notes: Option<String>,
  },
  Rm { id: Uuid },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:       String,
  #[serde(default)]
  username:  String,
  #[serde(default)]
  password:  String,
  reminders: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8001".to_string()),
    username: args
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config).context("building HTTP client")?;
  let notifier = ReminderLog::new(args.reminders.or(file_cfg.reminders));
  let service = StudyService::new(client, notifier);

  let mut out = String::new();
  run(&service, args.command, &mut out).await?;
  print!("{out}");
  Ok(())
}

/// `date` at the current wall-clock time, or now.
fn as_of(date: Option<NaiveDate>) -> DateTime<Utc> {
  let now = Utc::now();
  date.map_or(now, |d| d.and_time(now.time()).and_utc())
}

async fn run(
  service: &StudyService<ApiClient, ReminderLog>,
  command: Command,
  out: &mut String,
) -> Result<()> {
  use std::fmt::Write as _;

  match command {
    Command::Home { date, select } => {
      let now = as_of(date);
      let mut state = HomeState::new(now.date_naive());
      let ticket = state.begin_refresh();
      let view = service.refresh(now).await;
      state.apply(ticket, view);
      if let Some(day) = select {
        state.select(day);
      }
      render::home(out, &state)?;
    }

    Command::Next { date } => {
      let records = service.store().next_due(Some(as_of(date))).await?;
      render::records(out, &records)?;
    }

    Command::Subjects => render::subjects(out, &service.subjects().await?)?,

    Command::Subject(SubjectCommand::Add { name }) => {
      let subject = service.create_subject(&name).await?;
      writeln!(out, "created subject {} ({})", subject.name, subject.subject_id)?;
    }
    Command::Subject(SubjectCommand::Rename { id, name }) => {
      let subject = service.rename_subject(id, &name).await?;
      writeln!(out, "renamed subject to {}", subject.name)?;
    }
    Command::Subject(SubjectCommand::Rm { id }) => {
      service.delete_subject(id).await?;
      writeln!(out, "deleted subject {id}")?;
    }

    Command::Topics { subject: Some(id) } => {
      render::topics(out, &service.topics(id).await?)?;
    }
    Command::Topics { subject: None } => {
      use revise_core::store::StudyStore as _;
      let topics = service.store().list_all_topics().await?;
      render::topics(out, &topics)?;
    }

    Command::Topic(TopicCommand::Add { subject_id, name, notes }) => {
      let topic = service
        .create_topic(subject_id, &name, &notes, Utc::now())
        .await?;
      writeln!(out, "created topic")?;
      render::topic(out, &topic)?;
    }
    Command::Topic(TopicCommand::Show { id }) => {
      render::topic(out, &service.topic(id).await?)?;
    }
    Command::Topic(TopicCommand::Edit { id, name, notes }) => {
      let topic = service.update_topic(id, TopicPatch { name, notes }).await?;
      render::topic(out, &topic)?;
    }
    Command::Topic(TopicCommand::Rm { id }) => {
      service.delete_topic(id).await?;
      writeln!(out, "deleted topic {id}")?;
    }

    Command::Done { topic_id, day } => {
      let mut topic = service.topic(topic_id).await?;
      match service.complete_revision(&mut topic, day).await? {
        Completion::Marked => writeln!(out, "day {day} revision marked as done")?,
        Completion::AlreadyCompleted => {
          writeln!(out, "day {day} revision was already done")?
        }
      }
      render::topic(out, &topic)?;
    }
  }
  Ok(())
}
