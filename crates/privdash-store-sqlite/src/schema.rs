//! SQL schema for the privdash SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    display_name  TEXT NOT NULL,
    mail          TEXT,
    role          TEXT NOT NULL,   -- 'subject' | 'controller' | 'dpo'
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS applications (
    app_id        TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    description   TEXT,
    purposes      TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    questionnaire TEXT,                         -- JSON QuestionnaireResult
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS associations (
    user_id    TEXT NOT NULL REFERENCES users(user_id),
    app_id     TEXT NOT NULL REFERENCES applications(app_id),
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, app_id)
);

-- The consent audit trail. Rows are only ever appended, except by a
-- delete-everything erasure. `seq` orders changes for the same key.
CREATE TABLE IF NOT EXISTS consent_changes (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    change_id   TEXT NOT NULL UNIQUE,
    subject_id  TEXT NOT NULL REFERENCES users(user_id),
    app_id      TEXT NOT NULL REFERENCES applications(app_id),
    purpose     TEXT NOT NULL,
    granted     INTEGER NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS gdpr_requests (
    request_id   TEXT PRIMARY KEY,
    subject_id   TEXT NOT NULL REFERENCES users(user_id),
    app_id       TEXT NOT NULL REFERENCES applications(app_id),
    kind         TEXT NOT NULL,
    status       TEXT NOT NULL DEFAULT 'pending',   -- 'pending' | 'handled'
    other        TEXT,
    details      TEXT,
    created_at   TEXT NOT NULL,
    response     TEXT,
    responded_by TEXT REFERENCES users(user_id),
    handled_at   TEXT,
    CHECK (status IN ('pending', 'handled'))
);

CREATE TABLE IF NOT EXISTS messages (
    message_id   TEXT PRIMARY KEY,
    sender_id    TEXT NOT NULL REFERENCES users(user_id),
    recipient_id TEXT NOT NULL REFERENCES users(user_id),
    app_id       TEXT NOT NULL REFERENCES applications(app_id),
    body         TEXT NOT NULL,
    sent_at      TEXT NOT NULL,
    CHECK (sender_id != recipient_id)
);

CREATE TABLE IF NOT EXISTS privacy_notices (
    notice_id    TEXT PRIMARY KEY,
    app_id       TEXT NOT NULL REFERENCES applications(app_id),
    version      INTEGER NOT NULL,
    content      TEXT NOT NULL,
    published_by TEXT NOT NULL REFERENCES users(user_id),
    published_at TEXT NOT NULL,
    UNIQUE (app_id, version)
);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    recipient_id    TEXT NOT NULL REFERENCES users(user_id),
    sender_id       TEXT,
    kind            TEXT NOT NULL,
    object_id       TEXT,
    description     TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    is_read         INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS associations_app_idx   ON associations(app_id);
CREATE INDEX IF NOT EXISTS consent_key_idx        ON consent_changes(subject_id, app_id, purpose);
CREATE INDEX IF NOT EXISTS requests_subject_idx   ON gdpr_requests(subject_id);
CREATE INDEX IF NOT EXISTS requests_app_idx       ON gdpr_requests(app_id);
CREATE INDEX IF NOT EXISTS messages_sender_idx    ON messages(sender_id);
CREATE INDEX IF NOT EXISTS messages_recipient_idx ON messages(recipient_id);
CREATE INDEX IF NOT EXISTS notifications_user_idx ON notifications(recipient_id);

PRAGMA user_version = 1;
";
