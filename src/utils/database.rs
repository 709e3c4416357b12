//! SQLite persistence for the bot's durable settings: each user's preferred
//! AI model and each channel's activation flag. Conversation content is
//! never stored here.

use rusqlite::{Connection, Result as SqlResult, params};
use serenity::all::User;
use std::sync::Once;

use crate::utils::ollama_client::OLLAMA_CLIENT;

/// The filename for the SQLite database.
pub const APPDATA_DB: &str = "parley_data.db";
/// Ensures the table creation logic runs only once.
static DB_INIT: Once = Once::new();

/// A user's stored preference settings.
pub struct UserPreference {
    pub user_id: String,
    /// Stored for convenience; may go stale if the user renames.
    pub username: String,
    /// The user's preferred AI model identifier.
    pub model: String,
}

/// Initializes the database, creating the tables on first call.
pub fn init_db() -> SqlResult<()> {
    DB_INIT.call_once(|| {
        if let Err(e) = create_tables() {
            eprintln!("Failed to create database tables: {e}");
        }
    });
    Ok(())
}

fn create_tables() -> SqlResult<()> {
    let conn = Connection::open(APPDATA_DB)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_preferences (
            user_id TEXT PRIMARY KEY,
            username TEXT NOT NULL,
            model TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS channel_activation (
            channel_id INTEGER PRIMARY KEY,
            active BOOLEAN NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Retrieves the preferred AI model for a user, falling back to the
/// client's default model when no preference is stored or the query fails.
pub fn get_user_model(user: &User) -> Option<String> {
    if let Ok(conn) = Connection::open(APPDATA_DB) {
        if let Ok(mut statement) =
            conn.prepare("SELECT model FROM user_preferences WHERE user_id = ?1")
        {
            if let Ok(mut rows) = statement.query([user.id.to_string()]) {
                if let Ok(Some(row)) = rows.next() {
                    if let Ok(model) = row.get(0) {
                        return model;
                    }
                }
            }
        }
    }

    OLLAMA_CLIENT.clone().get_default_model()
}

/// Inserts or replaces a user's preference settings.
pub fn set_user_preference(pref: &UserPreference) -> SqlResult<()> {
    let conn = Connection::open(APPDATA_DB)?;
    conn.execute(
        "INSERT OR REPLACE INTO user_preferences (user_id, username, model) VALUES (?1, ?2, ?3)",
        (&pref.user_id, &pref.username, &pref.model),
    )?;
    Ok(())
}

/// Inserts or replaces a channel's activation flag.
pub fn set_channel_active(channel_id: u64, active: bool) -> SqlResult<()> {
    let conn = Connection::open(APPDATA_DB)?;
    conn.execute(
        "INSERT OR REPLACE INTO channel_activation (channel_id, active) VALUES (?1, ?2)",
        params![channel_id, active],
    )?;
    Ok(())
}

/// Whether the bot replies to every message in this channel.
/// Defaults to `false` when no row exists or a database error occurs.
pub fn is_channel_active(channel_id: u64) -> bool {
    if let Ok(conn) = Connection::open(APPDATA_DB) {
        if let Ok(mut statement) =
            conn.prepare("SELECT active FROM channel_activation WHERE channel_id = ?1")
        {
            if let Ok(mut rows) = statement.query(params![channel_id]) {
                if let Ok(Some(row)) = rows.next() {
                    if let Ok(active) = row.get(0) {
                        return active;
                    }
                }
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rusqlite::{Connection, Error as SqliteError};

    /// In-memory database with the production schema. The public functions
    /// hardcode the production path, so the tests exercise the same SQL
    /// against an isolated connection.
    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory database");
        conn.execute(
            "CREATE TABLE user_preferences (
                user_id TEXT PRIMARY KEY,
                username TEXT NOT NULL,
                model TEXT NOT NULL
            )",
            [],
        )
        .expect("Failed to create user_preferences table");
        conn.execute(
            "CREATE TABLE channel_activation (
                channel_id INTEGER PRIMARY KEY,
                active BOOLEAN NOT NULL
            )",
            [],
        )
        .expect("Failed to create channel_activation table");
        conn
    }

    #[test]
    fn user_preference_is_stored_and_replaced() {
        let conn = setup_db();
        let user_id = "123456789";

        conn.execute(
            "INSERT OR REPLACE INTO user_preferences (user_id, username, model) VALUES (?1, ?2, ?3)",
            params![user_id, "someone", "model-v1"],
        )
        .expect("Failed to insert user preference");

        let mut stmt = conn
            .prepare("SELECT model FROM user_preferences WHERE user_id = ?1")
            .unwrap();
        let stored: Option<String> = stmt.query_row([user_id], |row| row.get(0)).ok();
        assert_eq!(stored, Some("model-v1".to_string()));

        conn.execute(
            "INSERT OR REPLACE INTO user_preferences (user_id, username, model) VALUES (?1, ?2, ?3)",
            params![user_id, "someone", "model-v2"],
        )
        .expect("Failed to replace user preference");

        let replaced: Option<String> = stmt.query_row([user_id], |row| row.get(0)).ok();
        assert_eq!(replaced, Some("model-v2".to_string()));
    }

    #[test]
    fn missing_user_preference_returns_no_rows() {
        let conn = setup_db();

        let mut stmt = conn
            .prepare("SELECT model FROM user_preferences WHERE user_id = ?1")
            .unwrap();
        let result: Result<String, SqliteError> =
            stmt.query_row(["987654321"], |row| row.get(0));

        // get_user_model converts this case into the default-model fallback.
        assert!(matches!(result, Err(SqliteError::QueryReturnedNoRows)));
    }

    #[test]
    fn channel_activation_round_trips() {
        let conn = setup_db();
        let channel_id: u64 = 111222333;

        conn.execute(
            "INSERT OR REPLACE INTO channel_activation (channel_id, active) VALUES (?1, ?2)",
            params![channel_id, true],
        )
        .expect("Failed to activate channel");

        let mut stmt = conn
            .prepare("SELECT active FROM channel_activation WHERE channel_id = ?1")
            .unwrap();
        let active: Option<bool> = stmt.query_row(params![channel_id], |row| row.get(0)).ok();
        assert_eq!(active, Some(true));

        conn.execute(
            "INSERT OR REPLACE INTO channel_activation (channel_id, active) VALUES (?1, ?2)",
            params![channel_id, false],
        )
        .expect("Failed to deactivate channel");

        let deactivated: Option<bool> = stmt.query_row(params![channel_id], |row| row.get(0)).ok();
        assert_eq!(deactivated, Some(false));
    }

    #[test]
    fn missing_channel_activation_returns_no_rows() {
        let conn = setup_db();

        let mut stmt = conn
            .prepare("SELECT active FROM channel_activation WHERE channel_id = ?1")
            .unwrap();
        let result: Result<bool, SqliteError> =
            stmt.query_row(params![444555666u64], |row| row.get(0));

        // is_channel_active converts this case into `false`.
        assert!(matches!(result, Err(SqliteError::QueryReturnedNoRows)));
    }
}
