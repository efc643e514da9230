//! SQLite-backed content library and leaderboard.
//!
//! The session engine never talks to the database directly. The app loads a
//! passage through [`ContentSource`], and hands the finished result to
//! [`ResultSink`]. Leaderboard views read through [`LeaderboardQuery`].

use chrono::{DateTime, SecondsFormat, Utc};
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::Rng;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::reference::ReferenceText;
use crate::session::SessionResult;

static PASSAGE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/passages");

const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS content (
        id              TEXT    PRIMARY KEY,
        title           TEXT    NOT NULL,
        content         TEXT    NOT NULL,
        source_type     TEXT    NOT NULL,
        character_count INTEGER NOT NULL,
        word_count      INTEGER NOT NULL,
        created_at      TEXT    NOT NULL
    );

    CREATE TABLE IF NOT EXISTS leaderboard_entries (
        id              TEXT    PRIMARY KEY,
        username        TEXT    NOT NULL,
        content_id      TEXT    NOT NULL REFERENCES content(id),
        wpm             REAL    NOT NULL,
        accuracy        REAL    NOT NULL,
        test_duration   INTEGER NOT NULL,
        error_count     INTEGER NOT NULL,
        correct_chars   INTEGER NOT NULL,
        total_chars     INTEGER NOT NULL,
        completed_at    TEXT    NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_entries_wpm ON leaderboard_entries(wpm);
    CREATE INDEX IF NOT EXISTS idx_entries_accuracy ON leaderboard_entries(accuracy);
    CREATE INDEX IF NOT EXISTS idx_entries_content ON leaderboard_entries(content_id);
"#;

const ENTRY_COLUMNS: &str = "id, username, content_id, wpm, accuracy, test_duration, \
     error_count, correct_chars, total_chars, completed_at";

const CONTENT_COLUMNS: &str =
    "id, title, content, source_type, character_count, word_count, created_at";

/// Column a leaderboard is ranked by, always descending.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortBy {
    #[default]
    Wpm,
    Accuracy,
}

impl SortBy {
    fn column(self) -> &'static str {
        match self {
            SortBy::Wpm => "wpm",
            SortBy::Accuracy => "accuracy",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortBy::Wpm => SortBy::Accuracy,
            SortBy::Accuracy => SortBy::Wpm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceType {
    Paste,
    File,
    Bundled,
}

impl SourceType {
    fn from_db(s: &str) -> Option<Self> {
        match s {
            "paste" => Some(SourceType::Paste),
            "file" => Some(SourceType::File),
            "bundled" => Some(SourceType::Bundled),
            _ => None,
        }
    }
}

/// A passage about to be added to the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContent {
    pub title: String,
    pub content: String,
    pub source_type: SourceType,
}

impl NewContent {
    /// Collapses whitespace runs (line breaks and tabs included) to single
    /// spaces so every character can be typed, and rejects what is left if
    /// it is empty or still holds control characters.
    pub fn new(title: &str, raw: &str, source_type: SourceType) -> Result<Self> {
        let content = raw.split_whitespace().join(" ");

        if content.is_empty() {
            return Err(Error::InvalidInput("no content provided".into()));
        }
        if content.chars().any(char::is_control) {
            return Err(Error::InvalidInput(
                "content contains control characters".into(),
            ));
        }

        let title = match title.trim() {
            "" => "Untitled".to_string(),
            t => t.to_string(),
        };

        Ok(Self {
            title,
            content,
            source_type,
        })
    }

    /// Reads a UTF-8 text file; the title defaults to the file stem.
    pub fn from_file(path: &Path, title: Option<&str>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(title.unwrap_or(&stem), &raw, SourceType::File)
    }

    pub fn character_count(&self) -> usize {
        self.content.chars().count()
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub source_type: SourceType,
    pub character_count: usize,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

impl ContentRecord {
    pub fn reference_text(&self) -> Result<ReferenceText> {
        Ok(ReferenceText::new(self.id.clone(), &self.content)?.with_title(self.title.clone()))
    }
}

/// A finished session on its way to the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub username: String,
    pub content_id: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub duration_seconds: u64,
    pub error_count: usize,
    pub correct_chars: usize,
    pub total_chars: usize,
}

impl NewEntry {
    pub fn from_result(username: &str, result: &SessionResult) -> Result<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::InvalidInput("username is required".into()));
        }

        Ok(Self {
            username: username.to_string(),
            content_id: result.content_id.clone(),
            wpm: result.wpm,
            accuracy: result.accuracy,
            duration_seconds: result.duration_seconds,
            error_count: result.error_count,
            correct_chars: result.correct_chars,
            total_chars: result.total_chars,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub username: String,
    pub content_id: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub duration_seconds: u64,
    pub error_count: usize,
    pub correct_chars: usize,
    pub total_chars: usize,
    pub completed_at: DateTime<Utc>,
}

/// Stored entry plus its 1-based place on the WPM leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
    pub rank: usize,
}

pub trait ContentSource {
    fn create_content(&self, content: &NewContent) -> Result<ContentRecord>;
    fn get_content(&self, id: &str) -> Result<ContentRecord>;
    /// Newest first.
    fn list_content(&self) -> Result<Vec<ContentRecord>>;
    /// Any passage; seeds the bundled passages when the library is empty.
    fn random_content(&self) -> Result<ContentRecord>;
    /// Oldest passage whose normalized text is exactly `content`.
    fn find_by_text(&self, content: &str) -> Result<Option<ContentRecord>>;

    /// Reuses a passage with the same text, so repeated runs of one prompt
    /// share a record and a per-passage leaderboard.
    fn find_or_create(&self, content: &NewContent) -> Result<ContentRecord> {
        match self.find_by_text(&content.content)? {
            Some(existing) => Ok(existing),
            None => self.create_content(content),
        }
    }
}

pub trait ResultSink {
    fn submit(&self, entry: &NewEntry) -> Result<Submission>;
}

pub trait LeaderboardQuery {
    fn leaderboard(&self, sort_by: SortBy, limit: usize) -> Result<Vec<LeaderboardEntry>>;
    fn leaderboard_for_content(
        &self,
        content_id: &str,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>>;
}

/// Everything the app needs from persistence.
pub trait Repository: ContentSource + ResultSink + LeaderboardQuery {}

impl<T: ContentSource + ResultSink + LeaderboardQuery> Repository for T {}

#[derive(Deserialize)]
struct BundledPassage {
    title: String,
    content: String,
}

/// Passages shipped inside the binary, in file name order
pub fn bundled_passages() -> Vec<NewContent> {
    PASSAGE_DIR
        .files()
        .sorted_by_key(|f| f.path())
        .filter_map(|file| {
            let parsed = file
                .contents_utf8()
                .and_then(|s| serde_json::from_str::<BundledPassage>(s).ok());
            match parsed {
                Some(p) => NewContent::new(&p.title, &p.content, SourceType::Bundled).ok(),
                None => {
                    log::warn!("skipping unreadable bundled passage {}", file.path().display());
                    None
                }
            }
        })
        .collect()
}

/// Content library and leaderboard on one SQLite connection.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    pub fn content_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM content", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Adds the bundled passages; returns how many were inserted.
    pub fn seed_bundled(&self) -> Result<usize> {
        let passages = bundled_passages();
        for passage in &passages {
            self.create_content(passage)?;
        }
        log::info!("seeded {} bundled passages", passages.len());
        Ok(passages.len())
    }

    /// Inserts with an explicit completion time; `submit` uses the current time.
    pub fn submit_at(&self, entry: &NewEntry, completed_at: DateTime<Utc>) -> Result<Submission> {
        let id = Uuid::new_v4().to_string();
        let completed = format_timestamp(completed_at);

        self.conn
            .execute(
                r#"
                INSERT INTO leaderboard_entries
                (id, username, content_id, wpm, accuracy, test_duration,
                 error_count, correct_chars, total_chars, completed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    id,
                    entry.username,
                    entry.content_id,
                    entry.wpm,
                    entry.accuracy,
                    entry.duration_seconds as i64,
                    entry.error_count as i64,
                    entry.correct_chars as i64,
                    entry.total_chars as i64,
                    completed,
                ],
            )
            .map_err(|e| Error::SubmissionFailure(e.to_string()))?;
        let rowid = self.conn.last_insert_rowid();

        let better: i64 = self
            .conn
            .query_row(
                r#"
                SELECT COUNT(*) FROM leaderboard_entries
                WHERE wpm > ?1
                   OR (wpm = ?1 AND (completed_at < ?2 OR (completed_at = ?2 AND rowid < ?3)))
                "#,
                params![entry.wpm, completed, rowid],
                |row| row.get(0),
            )
            .map_err(|e| Error::SubmissionFailure(e.to_string()))?;

        let entry = LeaderboardEntry {
            id,
            username: entry.username.clone(),
            content_id: entry.content_id.clone(),
            wpm: entry.wpm,
            accuracy: entry.accuracy,
            duration_seconds: entry.duration_seconds,
            error_count: entry.error_count,
            correct_chars: entry.correct_chars,
            total_chars: entry.total_chars,
            completed_at: parse_timestamp(&completed, 9)?,
        };
        let rank = better as usize + 1;

        log::info!(
            "stored result for {} on {}: {} wpm, rank {rank}",
            entry.username,
            entry.content_id,
            entry.wpm
        );
        Ok(Submission { entry, rank })
    }

    fn query_entries(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, entry_from_row)?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }
}

impl ContentSource for Store {
    fn create_content(&self, content: &NewContent) -> Result<ContentRecord> {
        // stored at micro precision; return what a later read will see
        let created = format_timestamp(Utc::now());
        let record = ContentRecord {
            id: Uuid::new_v4().to_string(),
            title: content.title.clone(),
            content: content.content.clone(),
            source_type: content.source_type,
            character_count: content.character_count(),
            word_count: content.word_count(),
            created_at: parse_timestamp(&created, 6)?,
        };

        self.conn.execute(
            r#"
            INSERT INTO content
            (id, title, content, source_type, character_count, word_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.id,
                record.title,
                record.content,
                record.source_type.to_string(),
                record.character_count as i64,
                record.word_count as i64,
                created,
            ],
        )?;

        log::info!("added content {} ({:?})", record.id, record.title);
        Ok(record)
    }

    fn get_content(&self, id: &str) -> Result<ContentRecord> {
        let sql = format!("SELECT {CONTENT_COLUMNS} FROM content WHERE id = ?1");
        self.conn
            .query_row(&sql, [id], content_from_row)
            .optional()?
            .ok_or_else(|| Error::ContentNotFound(id.to_string()))
    }

    fn list_content(&self) -> Result<Vec<ContentRecord>> {
        let sql = format!(
            "SELECT {CONTENT_COLUMNS} FROM content ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], content_from_row)?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }

    fn random_content(&self) -> Result<ContentRecord> {
        let mut count = self.content_count()?;
        if count == 0 {
            count = self.seed_bundled()?;
        }
        if count == 0 {
            return Err(Error::ContentNotFound("library is empty".into()));
        }

        let offset = rand::thread_rng().gen_range(0..count) as i64;
        let sql =
            format!("SELECT {CONTENT_COLUMNS} FROM content ORDER BY rowid LIMIT 1 OFFSET ?1");
        Ok(self.conn.query_row(&sql, [offset], content_from_row)?)
    }

    fn find_by_text(&self, content: &str) -> Result<Option<ContentRecord>> {
        let sql = format!(
            "SELECT {CONTENT_COLUMNS} FROM content WHERE content = ?1 ORDER BY rowid LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, [content], content_from_row)
            .optional()?)
    }
}

impl ResultSink for Store {
    fn submit(&self, entry: &NewEntry) -> Result<Submission> {
        self.submit_at(entry, Utc::now())
    }
}

impl LeaderboardQuery for Store {
    fn leaderboard(&self, sort_by: SortBy, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM leaderboard_entries \
             ORDER BY {} DESC, completed_at ASC, rowid ASC LIMIT ?1",
            sort_by.column()
        );
        self.query_entries(&sql, [limit as i64])
    }

    fn leaderboard_for_content(
        &self,
        content_id: &str,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM leaderboard_entries WHERE content_id = ?1 \
             ORDER BY wpm DESC, completed_at ASC, rowid ASC LIMIT ?2"
        );
        self.query_entries(&sql, params![content_id, limit as i64])
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn entry_from_row(row: &Row) -> rusqlite::Result<LeaderboardEntry> {
    let completed_at: String = row.get(9)?;
    Ok(LeaderboardEntry {
        id: row.get(0)?,
        username: row.get(1)?,
        content_id: row.get(2)?,
        wpm: row.get(3)?,
        accuracy: row.get(4)?,
        duration_seconds: row.get::<_, i64>(5)? as u64,
        error_count: row.get::<_, i64>(6)? as usize,
        correct_chars: row.get::<_, i64>(7)? as usize,
        total_chars: row.get::<_, i64>(8)? as usize,
        completed_at: parse_timestamp(&completed_at, 9)?,
    })
}

fn content_from_row(row: &Row) -> rusqlite::Result<ContentRecord> {
    let source: String = row.get(3)?;
    let created_at: String = row.get(6)?;
    Ok(ContentRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        source_type: SourceType::from_db(&source)
            .ok_or_else(|| rusqlite::Error::InvalidColumnType(3, source.clone(), Type::Text))?,
        character_count: row.get::<_, i64>(4)? as usize,
        word_count: row.get::<_, i64>(5)? as usize,
        created_at: parse_timestamp(&created_at, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn store_with_content() -> (Store, ContentRecord) {
        let store = Store::open_in_memory().unwrap();
        let content = store
            .create_content(&NewContent::new("Pets", "the cat sat", SourceType::Paste).unwrap())
            .unwrap();
        (store, content)
    }

    fn entry(content_id: &str, username: &str, wpm: f64, accuracy: f64) -> NewEntry {
        NewEntry {
            username: username.to_string(),
            content_id: content_id.to_string(),
            wpm,
            accuracy,
            duration_seconds: 30,
            error_count: 1,
            correct_chars: 10,
            total_chars: 11,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_new_content_normalizes_whitespace() {
        let raw = "roses are red\n\tviolets  are blue\r\n";
        let c = NewContent::new("  Poem ", raw, SourceType::Paste).unwrap();
        assert_eq!(c.content, "roses are red violets are blue");
        assert_eq!(c.title, "Poem");
        assert_eq!(c.word_count(), 6);
        assert_eq!(c.character_count(), 30);
    }

    #[test]
    fn test_new_content_rejects_empty() {
        assert_matches!(
            NewContent::new("t", " \n\t ", SourceType::Paste),
            Err(Error::InvalidInput(_))
        );
        assert_matches!(
            NewContent::new("t", "bell\u{7}", SourceType::Paste),
            Err(Error::InvalidInput(_))
        );
    }

    #[test]
    fn test_new_content_default_title() {
        let c = NewContent::new("", "text", SourceType::Paste).unwrap();
        assert_eq!(c.title, "Untitled");
    }

    #[test]
    fn test_create_and_get_content() {
        let (store, created) = store_with_content();
        let loaded = store.get_content(&created.id).unwrap();

        assert_eq!(loaded, created);
        assert_eq!(loaded.character_count, 11);
        assert_eq!(loaded.word_count, 3);
        assert_eq!(loaded.source_type, SourceType::Paste);

        let text = loaded.reference_text().unwrap();
        assert_eq!(text.content_id(), created.id);
        assert_eq!(text.title(), "Pets");
    }

    #[test]
    fn test_find_or_create_reuses_same_text() {
        let (store, pets) = store_with_content();

        let prompt = NewContent::new("Custom prompt", "pack my  box", SourceType::Paste).unwrap();
        let first = store.find_or_create(&prompt).unwrap();
        let again = store.find_or_create(&prompt).unwrap();
        assert_eq!(again, first);
        assert_eq!(store.content_count().unwrap(), 2);

        // matched on text, whatever the title
        let same_text = NewContent::new("Custom prompt", "the cat sat", SourceType::Paste).unwrap();
        assert_eq!(store.find_or_create(&same_text).unwrap().id, pets.id);
        assert_eq!(store.content_count().unwrap(), 2);
        assert!(store.find_by_text("the cat").unwrap().is_none());
    }

    #[test]
    fn test_get_missing_content() {
        let store = Store::open_in_memory().unwrap();
        assert_matches!(store.get_content("nope"), Err(Error::ContentNotFound(id)) if id == "nope");
    }

    #[test]
    fn test_random_content_seeds_empty_library() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.content_count().unwrap(), 0);

        let content = store.random_content().unwrap();

        assert_eq!(content.source_type, SourceType::Bundled);
        assert_eq!(store.content_count().unwrap(), bundled_passages().len());
    }

    #[test]
    fn test_random_content_does_not_reseed() {
        let (store, created) = store_with_content();
        let picked = store.random_content().unwrap();
        assert_eq!(picked.id, created.id);
        assert_eq!(store.content_count().unwrap(), 1);
    }

    #[test]
    fn test_bundled_passages_are_valid() {
        let passages = bundled_passages();
        assert!(!passages.is_empty());
        for p in passages {
            assert!(ReferenceText::new("x", &p.content).is_ok(), "{}", p.title);
        }
    }

    #[test]
    fn test_list_content_newest_first() {
        let (store, first) = store_with_content();
        let second = store
            .create_content(&NewContent::new("Two", "second text", SourceType::File).unwrap())
            .unwrap();

        let ids: Vec<String> = store.list_content().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_submit_returns_rank() {
        let (store, content) = store_with_content();

        let a = store.submit_at(&entry(&content.id, "ada", 80.0, 95.0), at(0)).unwrap();
        assert_eq!(a.rank, 1);

        let b = store.submit_at(&entry(&content.id, "bob", 60.0, 99.0), at(1)).unwrap();
        assert_eq!(b.rank, 2);

        let c = store.submit_at(&entry(&content.id, "cy", 90.0, 90.0), at(2)).unwrap();
        assert_eq!(c.rank, 1);
        assert_eq!(c.entry.username, "cy");
        assert_eq!(c.entry.completed_at, at(2));
    }

    #[test]
    fn test_ties_rank_earlier_first() {
        let (store, content) = store_with_content();
        store.submit_at(&entry(&content.id, "early", 70.0, 90.0), at(0)).unwrap();
        let late = store.submit_at(&entry(&content.id, "late", 70.0, 90.0), at(5)).unwrap();
        assert_eq!(late.rank, 2);

        let same_instant = store.submit_at(&entry(&content.id, "same", 70.0, 90.0), at(5)).unwrap();
        assert_eq!(same_instant.rank, 3);

        let names: Vec<String> = store
            .leaderboard(SortBy::Wpm, 10)
            .unwrap()
            .into_iter()
            .map(|e| e.username)
            .collect();
        assert_eq!(names, vec!["early", "late", "same"]);
    }

    #[test]
    fn test_leaderboard_sorting_and_limit() {
        let (store, content) = store_with_content();
        store.submit_at(&entry(&content.id, "fast", 100.0, 80.0), at(0)).unwrap();
        store.submit_at(&entry(&content.id, "careful", 50.0, 100.0), at(1)).unwrap();
        store.submit_at(&entry(&content.id, "middle", 75.0, 90.0), at(2)).unwrap();

        let by_wpm: Vec<String> = store
            .leaderboard(SortBy::Wpm, 10)
            .unwrap()
            .into_iter()
            .map(|e| e.username)
            .collect();
        assert_eq!(by_wpm, vec!["fast", "middle", "careful"]);

        let by_accuracy: Vec<String> = store
            .leaderboard(SortBy::Accuracy, 2)
            .unwrap()
            .into_iter()
            .map(|e| e.username)
            .collect();
        assert_eq!(by_accuracy, vec!["careful", "middle"]);
    }

    #[test]
    fn test_leaderboard_for_content_filters() {
        let (store, pets) = store_with_content();
        let other = store
            .create_content(&NewContent::new("Other", "other words", SourceType::Paste).unwrap())
            .unwrap();

        store.submit_at(&entry(&pets.id, "ada", 40.0, 90.0), at(0)).unwrap();
        store.submit_at(&entry(&other.id, "bob", 90.0, 90.0), at(1)).unwrap();
        store.submit_at(&entry(&pets.id, "cy", 60.0, 90.0), at(2)).unwrap();

        let entries = store.leaderboard_for_content(&pets.id, 10).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["cy", "ada"]);
        assert!(entries.iter().all(|e| e.content_id == pets.id));
    }

    #[test]
    fn test_submit_unknown_content_fails() {
        let store = Store::open_in_memory().unwrap();
        assert_matches!(
            store.submit(&entry("missing", "ada", 10.0, 10.0)),
            Err(Error::SubmissionFailure(_))
        );
    }

    #[test]
    fn test_entry_from_result_requires_username() {
        let result = SessionResult {
            content_id: "c".into(),
            wpm: 6.0,
            accuracy: 100.0,
            duration_seconds: 6,
            error_count: 0,
            correct_chars: 3,
            total_chars: 3,
        };
        assert_matches!(NewEntry::from_result("   ", &result), Err(Error::InvalidInput(_)));

        let entry = NewEntry::from_result(" ada ", &result).unwrap();
        assert_eq!(entry.username, "ada");
        assert_eq!(entry.wpm, 6.0);
        assert_eq!(entry.total_chars, 3);
    }

    #[test]
    fn test_store_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("typeboard.db");
        let id = {
            let store = Store::open(&path).unwrap();
            let content = store
                .create_content(&NewContent::new("Disk", "on disk", SourceType::Paste).unwrap())
                .unwrap();
            store.submit(&entry(&content.id, "ada", 42.0, 97.0)).unwrap();
            content.id
        };

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.get_content(&id).unwrap().title, "Disk");
        assert_eq!(reopened.leaderboard(SortBy::Wpm, 5).unwrap().len(), 1);
    }

    #[test]
    fn test_sort_by_display_and_toggle() {
        assert_eq!(SortBy::Wpm.to_string(), "wpm");
        assert_eq!(SortBy::Accuracy.to_string(), "accuracy");
        assert_eq!(SortBy::Wpm.toggled(), SortBy::Accuracy);
    }
}
