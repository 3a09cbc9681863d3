//! Hub store (SQLite): users, access tokens and consultation results.
//!
//! One connection per call, foreign keys enforced on each. Consultation rows are written once
//! and never updated; deleting a user cascades to their tokens and consultations.
//!
//! Every method blocks on SQLite. Async callers go through [`HubStore::call`], which runs the
//! work on tokio's blocking pool.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{HubError, HubResult};

#[derive(Clone)]
pub struct HubStore {
    db_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TokenRow {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Everything needed to persist one consultation.
#[derive(Debug, Clone)]
pub struct NewConsultation {
    pub user_id: i64,
    pub input_data: serde_json::Value,
    pub ai_result: String,
    pub recommended_majors: Vec<String>,
    pub study_suggestions: Vec<String>,
    pub confidence_score: f64,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultationRecord {
    pub id: i64,
    pub user_id: i64,
    pub input_data: serde_json::Value,
    pub ai_result: String,
    pub recommended_majors: Vec<String>,
    pub study_suggestions: Vec<String>,
    pub confidence_score: f64,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Consultation joined with its owner, for the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct OwnedConsultation {
    #[serde(flatten)]
    pub record: ConsultationRecord,
    pub user_name: String,
    pub user_email: String,
}

/// One page of a newest-first listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
}

impl<T> Page<T> {
    fn new(data: Vec<T>, current_page: u32, per_page: u32, total: u64) -> Self {
        let last_page = total.div_ceil(u64::from(per_page)).max(1);
        Self {
            data,
            current_page,
            per_page,
            total,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
        }
    }
}

/// Page request; `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub const MAX_PER_PAGE: u32 = 100;

    /// Clamps `page` to >= 1 and `per_page` to 1..=100.
    pub fn new(page: Option<u32>, per_page: Option<u32>, default_per_page: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(default_per_page)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

const CONSULTATION_COLUMNS: &str = "c.id, c.user_id, c.input_data, c.ai_result, c.recommended_majors, \
     c.study_suggestions, c.confidence_score, c.session_id, c.created_at_ms, c.updated_at_ms";

const USER_COLUMNS: &str = "id, name, email, password_hash, is_admin, created_at_ms, updated_at_ms";

fn to_ms(t: DateTime<Utc>) -> i64 {
    t.timestamp_millis()
}

fn from_ms(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

fn json_column<T: DeserializeOwned>(r: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = r.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_user(r: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get(0)?,
        name: r.get(1)?,
        email: r.get(2)?,
        password_hash: r.get(3)?,
        is_admin: r.get(4)?,
        created_at: from_ms(r.get(5)?),
        updated_at: from_ms(r.get(6)?),
    })
}

fn map_consultation(r: &Row<'_>) -> rusqlite::Result<ConsultationRecord> {
    Ok(ConsultationRecord {
        id: r.get(0)?,
        user_id: r.get(1)?,
        input_data: json_column(r, 2)?,
        ai_result: r.get(3)?,
        recommended_majors: json_column(r, 4)?,
        study_suggestions: json_column(r, 5)?,
        confidence_score: r.get(6)?,
        session_id: r.get(7)?,
        created_at: from_ms(r.get(8)?),
        updated_at: from_ms(r.get(9)?),
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// SQL name of the Unicode lowercase function registered on every connection. SQLite's own
/// `lower()` only folds ASCII, which misses letters such as `Đ`.
const UNICODE_LOWER: &str = "hub_lower";

fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
    )
}

/// `%term%` LIKE pattern with `\`, `%` and `_` in `term` escaped (used with `ESCAPE '\'`).
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

impl HubStore {
    pub fn new(db_path: PathBuf) -> HubResult<Self> {
        let this = Self { db_path };
        this.init()?;
        Ok(this)
    }

    /// Runs blocking store work on the blocking thread pool.
    pub async fn call<T, F>(&self, work: F) -> HubResult<T>
    where
        F: FnOnce(&HubStore) -> HubResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || work(&store)).await?
    }

    fn open(&self) -> Result<Connection, rusqlite::Error> {
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        register_functions(&conn)?;
        Ok(conn)
    }

    fn init(&self) -> HubResult<()> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = self.open()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                is_admin INTEGER NOT NULL DEFAULT 0,
                created_at_ms INTEGER NOT NULL,
                updated_at_ms INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS access_tokens (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                token_hash TEXT NOT NULL,
                created_at_ms INTEGER NOT NULL,
                last_used_at_ms INTEGER NULL,
                FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_access_tokens_user_id ON access_tokens(user_id);

            CREATE TABLE IF NOT EXISTS consultation_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                input_data TEXT NOT NULL,
                ai_result TEXT NOT NULL,
                recommended_majors TEXT NOT NULL,
                study_suggestions TEXT NOT NULL,
                confidence_score REAL NOT NULL,
                session_id TEXT NOT NULL,
                created_at_ms INTEGER NOT NULL,
                updated_at_ms INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_consultations_user_created
                ON consultation_results(user_id, created_at_ms);
            CREATE INDEX IF NOT EXISTS idx_consultations_created
                ON consultation_results(created_at_ms);
            "#,
        )?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> HubResult<User> {
        let conn = self.open()?;
        let email = normalize_email(email);
        let ts = to_ms(Utc::now());
        conn.execute(
            "INSERT INTO users (name, email, password_hash, is_admin, created_at_ms, updated_at_ms) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![name.trim(), email, password_hash, is_admin, ts, ts],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                HubError::EmailTaken
            } else {
                HubError::Database(e)
            }
        })?;
        let id = conn.last_insert_rowid();
        self.get_user(id)?.ok_or(HubError::NotFound)
    }

    pub fn get_user(&self, id: i64) -> HubResult<Option<User>> {
        let conn = self.open()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn find_user_by_email(&self, email: &str) -> HubResult<Option<User>> {
        let conn = self.open()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![normalize_email(email)],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// True when another account (not `except_user`) already uses `email`.
    pub fn email_taken(&self, email: &str, except_user: Option<i64>) -> HubResult<bool> {
        Ok(self
            .find_user_by_email(email)?
            .is_some_and(|u| Some(u.id) != except_user))
    }

    /// Updates the given fields; `None` leaves a field unchanged.
    pub fn update_user(&self, id: i64, name: Option<&str>, email: Option<&str>) -> HubResult<User> {
        let conn = self.open()?;
        let changed = conn
            .execute(
                "UPDATE users SET name = COALESCE(?1, name), email = COALESCE(?2, email), updated_at_ms = ?3 WHERE id = ?4",
                params![
                    name.map(str::trim),
                    email.map(normalize_email),
                    to_ms(Utc::now()),
                    id
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    HubError::EmailTaken
                } else {
                    HubError::Database(e)
                }
            })?;
        if changed == 0 {
            return Err(HubError::NotFound);
        }
        self.get_user(id)?.ok_or(HubError::NotFound)
    }

    pub fn count_users(&self) -> HubResult<u64> {
        let conn = self.open()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
        Ok(n.unsigned_abs())
    }

    // ---------------------------------------------------------------------
    // Access tokens
    // ---------------------------------------------------------------------

    pub fn insert_token(&self, user_id: i64, name: &str, token_hash: &str) -> HubResult<i64> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO access_tokens (user_id, name, token_hash, created_at_ms, last_used_at_ms) VALUES (?1, ?2, ?3, ?4, NULL)",
            params![user_id, name, token_hash, to_ms(Utc::now())],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_token(&self, id: i64) -> HubResult<Option<TokenRow>> {
        let conn = self.open()?;
        let row = conn
            .query_row(
                "SELECT id, user_id, token_hash, created_at_ms, last_used_at_ms FROM access_tokens WHERE id = ?1",
                params![id],
                |r| {
                    Ok(TokenRow {
                        id: r.get(0)?,
                        user_id: r.get(1)?,
                        token_hash: r.get(2)?,
                        created_at: from_ms(r.get(3)?),
                        last_used_at: r.get::<_, Option<i64>>(4)?.map(from_ms),
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    pub fn touch_token(&self, id: i64) -> HubResult<()> {
        let conn = self.open()?;
        conn.execute(
            "UPDATE access_tokens SET last_used_at_ms = ?1 WHERE id = ?2",
            params![to_ms(Utc::now()), id],
        )?;
        Ok(())
    }

    pub fn delete_token(&self, id: i64) -> HubResult<bool> {
        let conn = self.open()?;
        let n = conn.execute("DELETE FROM access_tokens WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    // ---------------------------------------------------------------------
    // Consultations
    // ---------------------------------------------------------------------

    pub fn create_consultation(&self, new: &NewConsultation) -> HubResult<ConsultationRecord> {
        self.insert_consultation(new, Utc::now())
    }

    /// Inserts with an explicit creation time.
    pub fn insert_consultation(
        &self,
        new: &NewConsultation,
        created_at: DateTime<Utc>,
    ) -> HubResult<ConsultationRecord> {
        let conn = self.open()?;
        let ts = to_ms(created_at);
        conn.execute(
            "INSERT INTO consultation_results (user_id, input_data, ai_result, recommended_majors, study_suggestions, confidence_score, session_id, created_at_ms, updated_at_ms) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                new.user_id,
                serde_json::to_string(&new.input_data)?,
                new.ai_result,
                serde_json::to_string(&new.recommended_majors)?,
                serde_json::to_string(&new.study_suggestions)?,
                new.confidence_score,
                new.session_id,
                ts,
                ts
            ],
        )?;
        Ok(ConsultationRecord {
            id: conn.last_insert_rowid(),
            user_id: new.user_id,
            input_data: new.input_data.clone(),
            ai_result: new.ai_result.clone(),
            recommended_majors: new.recommended_majors.clone(),
            study_suggestions: new.study_suggestions.clone(),
            confidence_score: new.confidence_score,
            session_id: new.session_id.clone(),
            created_at: from_ms(ts),
            updated_at: from_ms(ts),
        })
    }

    /// Owner-scoped lookup: a record owned by someone else is reported as missing.
    pub fn get_consultation_for_user(&self, user_id: i64, id: i64) -> HubResult<ConsultationRecord> {
        let conn = self.open()?;
        conn.query_row(
            &format!("SELECT {CONSULTATION_COLUMNS} FROM consultation_results c WHERE c.id = ?1 AND c.user_id = ?2"),
            params![id, user_id],
            map_consultation,
        )
        .optional()?
        .ok_or(HubError::NotFound)
    }

    pub fn list_consultations_for_user(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> HubResult<Page<ConsultationRecord>> {
        let conn = self.open()?;
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM consultation_results WHERE user_id = ?1",
            params![user_id],
            |r| r.get(0),
        )?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONSULTATION_COLUMNS} FROM consultation_results c WHERE c.user_id = ?1 ORDER BY c.created_at_ms DESC, c.id DESC LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
            .query_map(
                params![user_id, i64::from(page.per_page), page.offset()],
                map_consultation,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(rows, page.page, page.per_page, total.unsigned_abs()))
    }

    pub fn recent_consultations_for_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> HubResult<Vec<ConsultationRecord>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONSULTATION_COLUMNS} FROM consultation_results c WHERE c.user_id = ?1 ORDER BY c.created_at_ms DESC, c.id DESC LIMIT ?2"
        ))?;
        let rows = stmt
            .query_map(
                params![user_id, i64::try_from(limit).unwrap_or(i64::MAX)],
                map_consultation,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Consultations of one user, optionally only those created at or after `since`.
    pub fn count_consultations_for_user(
        &self,
        user_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> HubResult<u64> {
        let conn = self.open()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM consultation_results WHERE user_id = ?1 AND created_at_ms >= ?2",
            params![user_id, since.map_or(i64::MIN, to_ms)],
            |r| r.get(0),
        )?;
        Ok(n.unsigned_abs())
    }

    pub fn average_confidence_for_user(&self, user_id: i64) -> HubResult<Option<f64>> {
        let conn = self.open()?;
        let avg: Option<f64> = conn.query_row(
            "SELECT AVG(confidence_score) FROM consultation_results WHERE user_id = ?1",
            params![user_id],
            |r| r.get(0),
        )?;
        Ok(avg)
    }

    pub fn count_consultations(&self, since: Option<DateTime<Utc>>) -> HubResult<u64> {
        let conn = self.open()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM consultation_results WHERE created_at_ms >= ?1",
            params![since.map_or(i64::MIN, to_ms)],
            |r| r.get(0),
        )?;
        Ok(n.unsigned_abs())
    }

    pub fn average_confidence(&self) -> HubResult<Option<f64>> {
        let conn = self.open()?;
        let avg: Option<f64> = conn.query_row(
            "SELECT AVG(confidence_score) FROM consultation_results",
            [],
            |r| r.get(0),
        )?;
        Ok(avg)
    }

    /// Distinct users with at least one consultation at or after `since`.
    pub fn count_active_users(&self, since: DateTime<Utc>) -> HubResult<u64> {
        let conn = self.open()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT user_id) FROM consultation_results WHERE created_at_ms >= ?1",
            params![to_ms(since)],
            |r| r.get(0),
        )?;
        Ok(n.unsigned_abs())
    }

    /// All consultations with owner name/email, newest first. `search` filters on a
    /// case-insensitive substring of the owner's name or email; `%` and `_` match literally.
    pub fn list_all_consultations(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> HubResult<Page<OwnedConsultation>> {
        let conn = self.open()?;
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        let filter = format!(
            "(?1 IS NULL OR {UNICODE_LOWER}(u.name) LIKE {UNICODE_LOWER}(?1) ESCAPE '\\' \
             OR {UNICODE_LOWER}(u.email) LIKE {UNICODE_LOWER}(?1) ESCAPE '\\')"
        );

        let total: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM consultation_results c JOIN users u ON u.id = c.user_id WHERE {filter}"
            ),
            params![pattern],
            |r| r.get(0),
        )?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONSULTATION_COLUMNS}, u.name, u.email FROM consultation_results c JOIN users u ON u.id = c.user_id WHERE {filter} ORDER BY c.created_at_ms DESC, c.id DESC LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
            .query_map(
                params![pattern, i64::from(page.per_page), page.offset()],
                |r| {
                    Ok(OwnedConsultation {
                        record: map_consultation(r)?,
                        user_name: r.get(10)?,
                        user_email: r.get(11)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(rows, page.page, page.per_page, total.unsigned_abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, HubStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HubStore::new(dir.path().join("hub.sqlite")).unwrap();
        (dir, store)
    }

    fn draft(user_id: i64, interests: &[&str]) -> NewConsultation {
        NewConsultation {
            user_id,
            input_data: json!({"interests": interests}),
            ai_result: "raw".to_string(),
            recommended_majors: vec!["IT".to_string()],
            study_suggestions: vec!["nên học.".to_string()],
            confidence_score: 0.8,
            session_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn duplicate_email_is_rejected_case_insensitively() {
        let (_dir, store) = store();
        store.create_user("An", "an@student.com", "h", false).unwrap();
        let err = store.create_user("An 2", " AN@Student.com ", "h", false).unwrap_err();
        assert!(matches!(err, HubError::EmailTaken));
        assert_eq!(store.count_users().unwrap(), 1);
    }

    #[test]
    fn update_user_keeps_unspecified_fields() {
        let (_dir, store) = store();
        let user = store.create_user("An", "an@student.com", "h", false).unwrap();
        let updated = store.update_user(user.id, Some("Bình"), None).unwrap();
        assert_eq!(updated.name, "Bình");
        assert_eq!(updated.email, "an@student.com");
        assert!(matches!(store.update_user(999, Some("x"), None), Err(HubError::NotFound)));
    }

    #[test]
    fn email_taken_ignores_the_user_itself() {
        let (_dir, store) = store();
        let a = store.create_user("A", "a@x.com", "h", false).unwrap();
        store.create_user("B", "b@x.com", "h", false).unwrap();
        assert!(!store.email_taken("a@x.com", Some(a.id)).unwrap());
        assert!(store.email_taken("b@x.com", Some(a.id)).unwrap());
    }

    #[test]
    fn consultation_round_trips_json_columns() {
        let (_dir, store) = store();
        let user = store.create_user("An", "an@x.com", "h", false).unwrap();
        let saved = store.create_consultation(&draft(user.id, &["coding"])).unwrap();
        let loaded = store.get_consultation_for_user(user.id, saved.id).unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.input_data["interests"], json!(["coding"]));
    }

    #[test]
    fn other_users_record_is_not_found() {
        let (_dir, store) = store();
        let a = store.create_user("A", "a@x.com", "h", false).unwrap();
        let b = store.create_user("B", "b@x.com", "h", false).unwrap();
        let record = store.create_consultation(&draft(b.id, &["art"])).unwrap();
        assert!(matches!(
            store.get_consultation_for_user(a.id, record.id),
            Err(HubError::NotFound)
        ));
        assert!(matches!(
            store.get_consultation_for_user(a.id, 12345),
            Err(HubError::NotFound)
        ));
    }

    #[test]
    fn history_is_newest_first_and_paginated() {
        let (_dir, store) = store();
        let user = store.create_user("A", "a@x.com", "h", false).unwrap();
        let base = Utc::now() - Duration::days(10);
        let ids: Vec<i64> = (0..5)
            .map(|i| {
                store
                    .insert_consultation(&draft(user.id, &["x"]), base + Duration::hours(i))
                    .unwrap()
                    .id
            })
            .collect();

        let first = store
            .list_consultations_for_user(user.id, PageRequest::new(Some(1), Some(2), 10))
            .unwrap();
        assert_eq!(first.total, 5);
        assert_eq!(first.last_page, 3);
        assert_eq!(first.data.iter().map(|r| r.id).collect::<Vec<_>>(), vec![ids[4], ids[3]]);

        let last = store
            .list_consultations_for_user(user.id, PageRequest::new(Some(3), Some(2), 10))
            .unwrap();
        assert_eq!(last.data.len(), 1);
        assert_eq!(last.data[0].id, ids[0]);
    }

    #[test]
    fn page_request_is_clamped() {
        assert_eq!(PageRequest::new(Some(0), Some(0), 10), PageRequest { page: 1, per_page: 1 });
        assert_eq!(PageRequest::new(None, Some(1000), 10).per_page, PageRequest::MAX_PER_PAGE);
        assert_eq!(PageRequest::new(None, None, 10).per_page, 10);
    }

    #[test]
    fn empty_listing_still_has_one_page() {
        let (_dir, store) = store();
        let user = store.create_user("A", "a@x.com", "h", false).unwrap();
        let page = store
            .list_consultations_for_user(user.id, PageRequest::new(None, None, 10))
            .unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.last_page, 1);
        assert!(page.data.is_empty());
    }

    #[test]
    fn admin_listing_filters_on_owner() {
        let (_dir, store) = store();
        let an = store.create_user("Nguyen Van An", "an@student.com", "h", false).unwrap();
        let binh = store.create_user("Tran Thi Binh", "binh@student.com", "h", false).unwrap();
        store.create_consultation(&draft(an.id, &["a"])).unwrap();
        store.create_consultation(&draft(binh.id, &["b"])).unwrap();

        let all = store.list_all_consultations(None, PageRequest::new(None, None, 20)).unwrap();
        assert_eq!(all.total, 2);

        let filtered = store
            .list_all_consultations(Some("BINH"), PageRequest::new(None, None, 20))
            .unwrap();
        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.data[0].user_email, "binh@student.com");
    }

    #[test]
    fn admin_search_folds_vietnamese_capitals() {
        let (_dir, store) = store();
        let duc = store.create_user("Nguyễn Đức Anh", "duc@student.com", "h", false).unwrap();
        store.create_user("Trần Thị Bình", "binh@student.com", "h", false).unwrap();
        store.create_consultation(&draft(duc.id, &["a"])).unwrap();

        for term in ["Đức", "đức", "ĐỨC", "nguyễn đ"] {
            let page = store
                .list_all_consultations(Some(term), PageRequest::new(None, None, 20))
                .unwrap();
            assert_eq!(page.total, 1, "search {term:?}");
            assert_eq!(page.data[0].user_name, "Nguyễn Đức Anh");
        }
    }

    #[test]
    fn admin_search_treats_wildcards_literally() {
        let (_dir, store) = store();
        let plain = store.create_user("An", "an@student.com", "h", false).unwrap();
        let odd = store.create_user("Lê_100%", "le@student.com", "h", false).unwrap();
        store.create_consultation(&draft(plain.id, &["a"])).unwrap();
        store.create_consultation(&draft(odd.id, &["b"])).unwrap();

        let all = PageRequest::new(None, None, 20);
        assert_eq!(store.list_all_consultations(Some("%"), all).unwrap().total, 1);
        assert_eq!(store.list_all_consultations(Some("_"), all).unwrap().total, 1);
        assert_eq!(store.list_all_consultations(Some("ê_1"), all).unwrap().total, 1);
        assert_eq!(store.list_all_consultations(Some("a_"), all).unwrap().total, 0);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("an"), "%an%");
        assert_eq!(like_pattern(r"5%_\x"), r"%5\%\_\\x%");
    }

    #[test]
    fn deleting_a_user_cascades_to_tokens_and_consultations() {
        let (_dir, store) = store();
        let gone = store.create_user("A", "a@x.com", "h", false).unwrap();
        let kept = store.create_user("B", "b@x.com", "h", false).unwrap();
        let token = store.insert_token(gone.id, "auth_token", "digest").unwrap();
        store.create_consultation(&draft(gone.id, &["a"])).unwrap();
        store.create_consultation(&draft(kept.id, &["b"])).unwrap();

        let conn = store.open().unwrap();
        conn.execute("DELETE FROM users WHERE id = ?1", params![gone.id]).unwrap();

        assert!(store.get_token(token).unwrap().is_none());
        assert_eq!(store.count_consultations_for_user(gone.id, None).unwrap(), 0);
        assert_eq!(store.count_consultations(None).unwrap(), 1);
        assert_eq!(store.count_users().unwrap(), 1);
    }

    #[tokio::test]
    async fn call_runs_work_off_the_runtime() {
        let (_dir, store) = store();
        let user = store
            .call(|s| s.create_user("An", "an@x.com", "h", false))
            .await
            .unwrap();
        let found = store
            .call(|s| s.find_user_by_email("AN@x.com"))
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(matches!(
            store.call(|s| s.update_user(999, Some("x"), None)).await,
            Err(HubError::NotFound)
        ));
    }

    #[test]
    fn tokens_are_revocable() {
        let (_dir, store) = store();
        let user = store.create_user("A", "a@x.com", "h", false).unwrap();
        let id = store.insert_token(user.id, "auth_token", "digest").unwrap();
        assert_eq!(store.get_token(id).unwrap().unwrap().user_id, user.id);
        assert!(store.delete_token(id).unwrap());
        assert!(store.get_token(id).unwrap().is_none());
    }
}
