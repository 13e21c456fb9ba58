//! SQL schema for the Revise SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subjects (
    subject_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL      -- RFC 3339 UTC, fixed microsecond width
);

CREATE TABLE IF NOT EXISTS topics (
    topic_id    TEXT PRIMARY KEY,
    subject_id  TEXT NOT NULL REFERENCES subjects(subject_id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    notes       TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL
);

-- Exactly three rows per topic, written once at topic creation.
-- Only `completed` is ever updated, and only from 0 to 1.
CREATE TABLE IF NOT EXISTS revisions (
    topic_id    TEXT    NOT NULL REFERENCES topics(topic_id) ON DELETE CASCADE,
    day_number  INTEGER NOT NULL CHECK (day_number IN (2, 7, 14)),
    due_on      TEXT    NOT NULL,   -- ISO 8601 date
    completed   INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (topic_id, day_number)
);

CREATE INDEX IF NOT EXISTS topics_subject_idx ON topics(subject_id);
CREATE INDEX IF NOT EXISTS revisions_due_idx  ON revisions(due_on);

PRAGMA user_version = 1;
";
