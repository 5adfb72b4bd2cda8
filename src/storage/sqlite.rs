//! SQLite storage backend for projects

use super::record::{generate_thread_id, NewProject, ProjectId, ProjectRecord, ProjectUpdate};
use super::traits::{OpenStore, ProjectStore, StorageError, StorageResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const SELECT_COLUMNS: &str = "id, owner_id, thread_id, title, generated_document, \
     chat_history_json, knowledge_graph_json, created_at, updated_at";

/// Raw column values of one `projects` row
type ProjectRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    String,
    String,
);

/// SQLite-backed project store
///
/// One `projects` table; chat history and the mirrored graph are stored
/// as JSON text. Thread-safe via internal mutex on the connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                thread_id TEXT NOT NULL,
                title TEXT NOT NULL,
                generated_document TEXT,
                chat_history_json TEXT NOT NULL,
                knowledge_graph_json TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_projects_owner
                ON projects(owner_id, created_at);

            -- Concurrent reads while a background mirror writes
            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    /// Fixed-width so that text ordering matches time ordering
    fn format_timestamp(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
        Ok(DateTime::parse_from_rfc3339(value)
            .map_err(|e| StorageError::DateParse(e.to_string()))?
            .with_timezone(&Utc))
    }

    fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
        ))
    }

    /// Deserialize a project from database columns
    fn row_to_record(row: ProjectRow) -> StorageResult<ProjectRecord> {
        let (
            id,
            owner_id,
            thread_id,
            title,
            generated_document,
            chat_history_json,
            knowledge_graph_json,
            created_at,
            updated_at,
        ) = row;

        let knowledge_graph = match knowledge_graph_json {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };

        Ok(ProjectRecord {
            id: ProjectId::from_string(id),
            owner_id,
            thread_id,
            title,
            generated_document,
            chat_history: serde_json::from_str(&chat_history_json)?,
            knowledge_graph,
            created_at: Self::parse_timestamp(&created_at)?,
            updated_at: Self::parse_timestamp(&updated_at)?,
        })
    }

    fn load(conn: &Connection, id: &ProjectId) -> StorageResult<Option<ProjectRecord>> {
        let sql = format!("SELECT {} FROM projects WHERE id = ?1", SELECT_COLUMNS);
        let row = conn
            .query_row(&sql, params![id.as_str()], Self::read_row)
            .optional()?;
        row.map(Self::row_to_record).transpose()
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
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

impl ProjectStore for SqliteStore {
    fn create_project(&self, project: NewProject) -> StorageResult<ProjectRecord> {
        let now = Utc::now();
        let knowledge_graph = match &project.knowledge_graph {
            Some(graph) => Some(serde_json::to_value(graph)?),
            None => None,
        };
        let record = ProjectRecord {
            id: ProjectId::new(),
            owner_id: project.owner_id,
            thread_id: project.thread_id.unwrap_or_else(generate_thread_id),
            title: project.title,
            generated_document: project.generated_document,
            chat_history: project.chat_history,
            knowledge_graph,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO projects (id, owner_id, thread_id, title, generated_document,
                chat_history_json, knowledge_graph_json, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.id.as_str(),
                record.owner_id,
                record.thread_id,
                record.title,
                record.generated_document,
                serde_json::to_string(&record.chat_history)?,
                record
                    .knowledge_graph
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                Self::format_timestamp(&record.created_at),
                Self::format_timestamp(&record.updated_at),
            ],
        )?;

        Ok(record)
    }

    fn get_project(&self, id: &ProjectId) -> StorageResult<Option<ProjectRecord>> {
        let conn = self.conn.lock().unwrap();
        Self::load(&conn, id)
    }

    fn list_projects(&self, owner_id: &str) -> StorageResult<Vec<ProjectRecord>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {} FROM projects WHERE owner_id = ?1 ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![owner_id], Self::read_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    fn update_project(
        &self,
        id: &ProjectId,
        update: &ProjectUpdate,
    ) -> StorageResult<ProjectRecord> {
        let conn = self.conn.lock().unwrap();
        let mut record = Self::load(&conn, id)?
            .ok_or_else(|| StorageError::ProjectNotFound(id.to_string()))?;
        update.apply_to(&mut record)?;

        conn.execute(
            r#"
            UPDATE projects SET
                title = ?2,
                generated_document = ?3,
                chat_history_json = ?4,
                knowledge_graph_json = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
            params![
                id.as_str(),
                record.title,
                record.generated_document,
                serde_json::to_string(&record.chat_history)?,
                record
                    .knowledge_graph
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                Self::format_timestamp(&record.updated_at),
            ],
        )?;

        Ok(record)
    }

    fn delete_project(&self, id: &ProjectId) -> StorageResult<bool> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute("DELETE FROM projects WHERE id = ?1", params![id.as_str()])?;
        Ok(rows > 0)
    }
}
