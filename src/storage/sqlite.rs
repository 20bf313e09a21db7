//! SQLite storage backend for Refinery

use super::traits::{ManuscriptStore, OpenStore, StorageError, StorageResult};
use crate::analysis::{AnalysisModule, EditQueueItem, ItemStatus};
use crate::model::{
    AnalysisResult, AnnotationId, Manuscript, ManuscriptId, ManuscriptStatus, ManuscriptSummary,
    ResultId,
};
use crate::workflow::{Annotation, Decision};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed manuscript store
///
/// One database file with a table per record kind. Everything hangs off
/// `manuscripts` with `ON DELETE CASCADE`. Thread-safe via internal mutex
/// on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_date(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StorageError::DateParse(e.to_string()))
}

fn parse_optional_date(value: Option<String>) -> StorageResult<Option<DateTime<Utc>>> {
    value.as_deref().map(parse_date).transpose()
}

fn parse_label<T>(value: &str) -> StorageResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e: T::Err| StorageError::Corrupt(e.to_string()))
}

// Raw column sets, read inside rusqlite closures and converted afterwards.

struct ManuscriptRow {
    id: String,
    title: String,
    file_type: String,
    kind: String,
    author_name: Option<String>,
    genre: Option<String>,
    word_count: i64,
    chapter_count: i64,
    status: String,
    raw_text: Option<String>,
    chapters_json: Option<String>,
    created_at: String,
    updated_at: String,
    last_analyzed_at: Option<String>,
}

const SUMMARY_COLUMNS: &str = "id, title, file_type, kind, author_name, genre, word_count, \
     chapter_count, status, created_at, updated_at, last_analyzed_at";

impl ManuscriptRow {
    /// Read the summary columns; `full` rows also carry text and chapters.
    fn read(row: &Row<'_>, full: bool) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            file_type: row.get(2)?,
            kind: row.get(3)?,
            author_name: row.get(4)?,
            genre: row.get(5)?,
            word_count: row.get(6)?,
            chapter_count: row.get(7)?,
            status: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
            last_analyzed_at: row.get(11)?,
            raw_text: if full { row.get(12)? } else { None },
            chapters_json: if full { row.get(13)? } else { None },
        })
    }

    fn into_summary(self) -> StorageResult<ManuscriptSummary> {
        Ok(ManuscriptSummary {
            id: ManuscriptId::from_string(self.id),
            title: self.title,
            file_type: self.file_type,
            kind: parse_label(&self.kind)?,
            author_name: self.author_name,
            genre: self.genre,
            word_count: self.word_count as usize,
            chapter_count: self.chapter_count as usize,
            status: parse_label(&self.status)?,
            created_at: parse_date(&self.created_at)?,
            updated_at: parse_date(&self.updated_at)?,
            last_analyzed_at: parse_optional_date(self.last_analyzed_at)?,
        })
    }

    fn into_manuscript(mut self) -> StorageResult<Manuscript> {
        let raw_text = self.raw_text.take().unwrap_or_default();
        let chapters = match self.chapters_json.take() {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };
        let s = self.into_summary()?;
        Ok(Manuscript {
            id: s.id,
            title: s.title,
            file_type: s.file_type,
            kind: s.kind,
            author_name: s.author_name,
            genre: s.genre,
            word_count: s.word_count,
            chapter_count: s.chapter_count,
            status: s.status,
            raw_text,
            chapters,
            created_at: s.created_at,
            updated_at: s.updated_at,
            last_analyzed_at: s.last_analyzed_at,
        })
    }
}

struct ResultRow {
    id: String,
    manuscript_id: String,
    module: String,
    status: String,
    scores_json: String,
    report_json: Option<String>,
    error: Option<String>,
    created_at: String,
    started_at: Option<String>,
    completed_at: Option<String>,
    duration_seconds: Option<f64>,
}

const RESULT_COLUMNS: &str = "id, manuscript_id, module, status, scores_json, report_json, \
     error, created_at, started_at, completed_at, duration_seconds";

impl ResultRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            manuscript_id: row.get(1)?,
            module: row.get(2)?,
            status: row.get(3)?,
            scores_json: row.get(4)?,
            report_json: row.get(5)?,
            error: row.get(6)?,
            created_at: row.get(7)?,
            started_at: row.get(8)?,
            completed_at: row.get(9)?,
            duration_seconds: row.get(10)?,
        })
    }

    fn into_result(self) -> StorageResult<AnalysisResult> {
        Ok(AnalysisResult {
            id: ResultId::from_string(self.id),
            manuscript_id: ManuscriptId::from_string(self.manuscript_id),
            module: parse_label::<AnalysisModule>(&self.module)?,
            status: parse_label(&self.status)?,
            scores: serde_json::from_str(&self.scores_json)?,
            report: self
                .report_json
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            error: self.error,
            created_at: parse_date(&self.created_at)?,
            started_at: parse_optional_date(self.started_at)?,
            completed_at: parse_optional_date(self.completed_at)?,
            duration_seconds: self.duration_seconds,
        })
    }
}

type QueueRow = (i64, String, String, String, String, String, String, String);

fn row_to_queue_item(
    (position, module, finding_type, severity, chapter_ref, finding, suggestion, status): QueueRow,
) -> StorageResult<EditQueueItem> {
    Ok(EditQueueItem {
        id: position as u32,
        module: parse_label(&module)?,
        finding_type,
        severity: parse_label(&severity)?,
        chapter_ref,
        finding,
        suggestion,
        status: parse_label(&status)?,
    })
}

type AnnotationRow = (
    String,
    String,
    Option<i64>,
    Option<String>,
    String,
    String,
    String,
    String,
);

const ANNOTATION_COLUMNS: &str =
    "id, manuscript_id, chapter, location_hint, content, kind, created_at, updated_at";

fn read_annotation(row: &Row<'_>) -> rusqlite::Result<AnnotationRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn row_to_annotation(
    (id, manuscript_id, chapter, location_hint, content, kind, created_at, updated_at): AnnotationRow,
) -> StorageResult<Annotation> {
    Ok(Annotation {
        id: AnnotationId::from_string(id),
        manuscript_id: ManuscriptId::from_string(manuscript_id),
        chapter: chapter.map(|c| c as u32),
        location_hint,
        content,
        kind: parse_label(&kind)?,
        created_at: parse_date(&created_at)?,
        updated_at: parse_date(&updated_at)?,
    })
}

impl SqliteStore {
    /// Initialize the database schema
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS manuscripts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                file_type TEXT NOT NULL,
                kind TEXT NOT NULL,
                author_name TEXT,
                genre TEXT,
                word_count INTEGER NOT NULL,
                chapter_count INTEGER NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                last_analyzed_at TEXT,
                raw_text TEXT NOT NULL,
                chapters_json TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS analysis_results (
                id TEXT PRIMARY KEY,
                manuscript_id TEXT NOT NULL,
                module TEXT NOT NULL,
                status TEXT NOT NULL,
                scores_json TEXT NOT NULL,
                report_json TEXT,
                error TEXT,
                created_at TEXT NOT NULL,
                started_at TEXT,
                completed_at TEXT,
                duration_seconds REAL,
                FOREIGN KEY (manuscript_id) REFERENCES manuscripts(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_results_manuscript
                ON analysis_results(manuscript_id, module);

            CREATE TABLE IF NOT EXISTS edit_queue_items (
                manuscript_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                module TEXT NOT NULL,
                finding_type TEXT NOT NULL,
                severity TEXT NOT NULL,
                chapter_ref TEXT NOT NULL,
                finding TEXT NOT NULL,
                suggestion TEXT NOT NULL,
                status TEXT NOT NULL,
                PRIMARY KEY (manuscript_id, position),
                FOREIGN KEY (manuscript_id) REFERENCES manuscripts(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS decisions (
                manuscript_id TEXT PRIMARY KEY,
                stage TEXT NOT NULL,
                outcome TEXT NOT NULL,
                reader_notes TEXT,
                editor_notes TEXT,
                director_notes TEXT,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (manuscript_id) REFERENCES manuscripts(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS annotations (
                id TEXT PRIMARY KEY,
                manuscript_id TEXT NOT NULL,
                chapter INTEGER,
                location_hint TEXT,
                content TEXT NOT NULL,
                kind TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (manuscript_id) REFERENCES manuscripts(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_annotations_manuscript
                ON annotations(manuscript_id, created_at);

            PRAGMA foreign_keys = ON;

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl ManuscriptStore for SqliteStore {
    // === Manuscripts ===

    fn save_manuscript(&self, m: &Manuscript) -> StorageResult<()> {
        let chapters_json = serde_json::to_string(&m.chapters)?;
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO manuscripts (id, title, file_type, kind, author_name, genre, word_count,
                                     chapter_count, status, created_at, updated_at,
                                     last_analyzed_at, raw_text, chapters_json)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                file_type = excluded.file_type,
                kind = excluded.kind,
                author_name = excluded.author_name,
                genre = excluded.genre,
                word_count = excluded.word_count,
                chapter_count = excluded.chapter_count,
                status = excluded.status,
                updated_at = excluded.updated_at,
                last_analyzed_at = excluded.last_analyzed_at,
                raw_text = excluded.raw_text,
                chapters_json = excluded.chapters_json
            "#,
            params![
                m.id.as_str(),
                m.title,
                m.file_type,
                m.kind.as_str(),
                m.author_name,
                m.genre,
                m.word_count as i64,
                m.chapter_count as i64,
                m.status.as_str(),
                timestamp(&m.created_at),
                timestamp(&m.updated_at),
                m.last_analyzed_at.as_ref().map(timestamp),
                m.raw_text,
                chapters_json,
            ],
        )?;
        Ok(())
    }

    fn load_manuscript(&self, id: &ManuscriptId) -> StorageResult<Option<Manuscript>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {}, raw_text, chapters_json FROM manuscripts WHERE id = ?1",
                    SUMMARY_COLUMNS
                ),
                params![id.as_str()],
                |row| ManuscriptRow::read(row, true),
            )
            .optional()?;
        row.map(ManuscriptRow::into_manuscript).transpose()
    }

    fn list_manuscripts(&self) -> StorageResult<Vec<ManuscriptSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM manuscripts ORDER BY created_at DESC, rowid DESC",
            SUMMARY_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], |row| ManuscriptRow::read(row, false))?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(ManuscriptRow::into_summary).collect()
    }

    fn delete_manuscript(&self, id: &ManuscriptId) -> StorageResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM manuscripts WHERE id = ?1", params![id.as_str()])?;
        Ok(deleted > 0)
    }

    fn set_manuscript_status(
        &self,
        id: &ManuscriptId,
        status: ManuscriptStatus,
        analyzed_at: Option<DateTime<Utc>>,
    ) -> StorageResult<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            r#"
            UPDATE manuscripts SET
                status = ?2,
                updated_at = ?3,
                last_analyzed_at = COALESCE(?4, last_analyzed_at)
            WHERE id = ?1
            "#,
            params![
                id.as_str(),
                status.as_str(),
                timestamp(&Utc::now()),
                analyzed_at.as_ref().map(timestamp),
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::not_found("Manuscript", id));
        }
        Ok(())
    }

    // === Analysis results ===

    fn save_result(&self, r: &AnalysisResult) -> StorageResult<()> {
        let scores_json = serde_json::to_string(&r.scores)?;
        let report_json = r.report.as_ref().map(serde_json::to_string).transpose()?;
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO analysis_results (id, manuscript_id, module, status, scores_json,
                                          report_json, error, created_at, started_at,
                                          completed_at, duration_seconds)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                scores_json = excluded.scores_json,
                report_json = excluded.report_json,
                error = excluded.error,
                started_at = excluded.started_at,
                completed_at = excluded.completed_at,
                duration_seconds = excluded.duration_seconds
            "#,
            params![
                r.id.as_str(),
                r.manuscript_id.as_str(),
                r.module.as_str(),
                r.status.as_str(),
                scores_json,
                report_json,
                r.error,
                timestamp(&r.created_at),
                r.started_at.as_ref().map(timestamp),
                r.completed_at.as_ref().map(timestamp),
                r.duration_seconds,
            ],
        )?;
        Ok(())
    }

    fn load_result(&self, id: &ResultId) -> StorageResult<Option<AnalysisResult>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM analysis_results WHERE id = ?1", RESULT_COLUMNS),
                params![id.as_str()],
                ResultRow::read,
            )
            .optional()?;
        row.map(ResultRow::into_result).transpose()
    }

    fn list_results(&self, manuscript_id: &ManuscriptId) -> StorageResult<Vec<AnalysisResult>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM analysis_results WHERE manuscript_id = ?1 ORDER BY created_at, rowid",
            RESULT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![manuscript_id.as_str()], ResultRow::read)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(ResultRow::into_result).collect()
    }

    // === Edit queue ===

    fn replace_edit_queue(
        &self,
        manuscript_id: &ManuscriptId,
        items: &[EditQueueItem],
    ) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM edit_queue_items WHERE manuscript_id = ?1",
            params![manuscript_id.as_str()],
        )?;
        {
            let mut insert = tx.prepare(
                r#"
                INSERT INTO edit_queue_items (manuscript_id, position, module, finding_type,
                                              severity, chapter_ref, finding, suggestion, status)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )?;
            for item in items {
                insert.execute(params![
                    manuscript_id.as_str(),
                    item.id as i64,
                    item.module.as_str(),
                    item.finding_type,
                    item.severity.as_str(),
                    item.chapter_ref,
                    item.finding,
                    item.suggestion,
                    item.status.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_edit_queue(
        &self,
        manuscript_id: &ManuscriptId,
        status: Option<ItemStatus>,
    ) -> StorageResult<Vec<EditQueueItem>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT position, module, finding_type, severity, chapter_ref, finding, suggestion, status
            FROM edit_queue_items
            WHERE manuscript_id = ?1 AND (?2 IS NULL OR status = ?2)
            ORDER BY position
            "#,
        )?;
        let rows = stmt
            .query_map(
                params![manuscript_id.as_str(), status.map(|s| s.as_str())],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                        row.get(7)?,
                    ))
                },
            )?
            .collect::<Result<Vec<QueueRow>, _>>()?;
        rows.into_iter().map(row_to_queue_item).collect()
    }

    fn set_item_status(
        &self,
        manuscript_id: &ManuscriptId,
        item_id: u32,
        status: ItemStatus,
    ) -> StorageResult<bool> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE edit_queue_items SET status = ?3 WHERE manuscript_id = ?1 AND position = ?2",
            params![manuscript_id.as_str(), item_id as i64, status.as_str()],
        )?;
        Ok(updated > 0)
    }

    // === Decisions ===

    fn load_decision(&self, manuscript_id: &ManuscriptId) -> StorageResult<Option<Decision>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                r#"
                SELECT stage, outcome, reader_notes, editor_notes, director_notes, updated_at
                FROM decisions WHERE manuscript_id = ?1
                "#,
                params![manuscript_id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        row.map(
            |(stage, outcome, reader_notes, editor_notes, director_notes, updated_at)| {
                Ok(Decision {
                    manuscript_id: manuscript_id.clone(),
                    stage: parse_label(&stage)?,
                    outcome: parse_label(&outcome)?,
                    reader_notes,
                    editor_notes,
                    director_notes,
                    updated_at: parse_date(&updated_at)?,
                })
            },
        )
        .transpose()
    }

    fn save_decision(&self, d: &Decision) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO decisions (manuscript_id, stage, outcome, reader_notes, editor_notes,
                                   director_notes, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(manuscript_id) DO UPDATE SET
                stage = excluded.stage,
                outcome = excluded.outcome,
                reader_notes = excluded.reader_notes,
                editor_notes = excluded.editor_notes,
                director_notes = excluded.director_notes,
                updated_at = excluded.updated_at
            "#,
            params![
                d.manuscript_id.as_str(),
                d.stage.as_str(),
                d.outcome.as_str(),
                d.reader_notes,
                d.editor_notes,
                d.director_notes,
                timestamp(&d.updated_at),
            ],
        )?;
        Ok(())
    }

    // === Annotations ===

    fn save_annotation(&self, a: &Annotation) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO annotations (id, manuscript_id, chapter, location_hint, content, kind,
                                     created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                chapter = excluded.chapter,
                location_hint = excluded.location_hint,
                content = excluded.content,
                kind = excluded.kind,
                updated_at = excluded.updated_at
            "#,
            params![
                a.id.as_str(),
                a.manuscript_id.as_str(),
                a.chapter.map(i64::from),
                a.location_hint,
                a.content,
                a.kind.as_str(),
                timestamp(&a.created_at),
                timestamp(&a.updated_at),
            ],
        )?;
        Ok(())
    }

    fn load_annotation(&self, id: &AnnotationId) -> StorageResult<Option<Annotation>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM annotations WHERE id = ?1", ANNOTATION_COLUMNS),
                params![id.as_str()],
                read_annotation,
            )
            .optional()?;
        row.map(row_to_annotation).transpose()
    }

    fn list_annotations(&self, manuscript_id: &ManuscriptId) -> StorageResult<Vec<Annotation>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM annotations WHERE manuscript_id = ?1 ORDER BY created_at, rowid",
            ANNOTATION_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![manuscript_id.as_str()], read_annotation)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(row_to_annotation).collect()
    }

    fn delete_annotation(&self, id: &AnnotationId) -> StorageResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM annotations WHERE id = ?1", params![id.as_str()])?;
        Ok(deleted > 0)
    }
}
