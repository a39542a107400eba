//! SQL statements for the SQLite store.

pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS registrations (
    id TEXT PRIMARY KEY,
    child_name TEXT NOT NULL,
    child_surname TEXT NOT NULL,
    child_age TEXT NOT NULL,
    parent_name TEXT NOT NULL,
    parent_surname TEXT NOT NULL,
    parent_phone TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS heartbeats (
    created_at TEXT NOT NULL
);
";

/// Rows come back in insertion order; rowid preserves it across the
/// delete-and-reinsert save cycle.
pub const SELECT_REGISTRATIONS: &str = "
SELECT id, child_name, child_surname, child_age,
       parent_name, parent_surname, parent_phone, timestamp
FROM registrations
ORDER BY rowid
";

pub const DELETE_REGISTRATIONS: &str = "DELETE FROM registrations";

pub const INSERT_REGISTRATION: &str = "
INSERT INTO registrations
    (id, child_name, child_surname, child_age,
     parent_name, parent_surname, parent_phone, timestamp)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
";

pub const INSERT_HEARTBEAT: &str = "INSERT INTO heartbeats (created_at) VALUES (?1)";

pub const DELETE_STALE_HEARTBEATS: &str = "DELETE FROM heartbeats WHERE created_at < ?1";
