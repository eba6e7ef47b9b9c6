use super::{PersistenceResult, PlannerStore};
use crate::profile::{Preferences, StudentProfile};
use crate::task::Task;
use crate::timetable::Timetable;
use crate::Planner;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

const TIMETABLE: &str = "timetable";
const PROFILE: &str = "profile";
const PREFERENCES: &str = "preferences";

pub struct SqlitePlannerStore {
    connection: Mutex<Connection>,
}

impl SqlitePlannerStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS planner_users (
                user_id TEXT PRIMARY KEY
            );
            CREATE TABLE IF NOT EXISTS planner_tasks (
                user_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                id TEXT NOT NULL,
                task_json TEXT NOT NULL,
                PRIMARY KEY (user_id, id)
            );
            CREATE TABLE IF NOT EXISTS planner_documents (
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                json TEXT NOT NULL,
                PRIMARY KEY (user_id, kind)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_document<T: Serialize>(
        tx: &Transaction,
        user_id: &str,
        kind: &str,
        value: Option<&T>,
    ) -> PersistenceResult<()> {
        tx.execute(
            "DELETE FROM planner_documents WHERE user_id = ?1 AND kind = ?2",
            params![user_id, kind],
        )?;
        if let Some(value) = value {
            let json = serde_json::to_string(value)?;
            tx.execute(
                "INSERT INTO planner_documents (user_id, kind, json) VALUES (?1, ?2, ?3)",
                params![user_id, kind, json],
            )?;
        }
        Ok(())
    }

    fn load_document<T: DeserializeOwned>(
        connection: &Connection,
        user_id: &str,
        kind: &str,
    ) -> PersistenceResult<Option<T>> {
        let json: Option<String> = connection
            .query_row(
                "SELECT json FROM planner_documents WHERE user_id = ?1 AND kind = ?2",
                params![user_id, kind],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Into::into)
    }

    fn save_tasks(tx: &Transaction, user_id: &str, tasks: &[Task]) -> PersistenceResult<()> {
        tx.execute("DELETE FROM planner_tasks WHERE user_id = ?1", params![user_id])?;
        let mut stmt = tx.prepare(
            "INSERT INTO planner_tasks (user_id, position, id, task_json) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, task) in tasks.iter().enumerate() {
            let json = serde_json::to_string(task)?;
            stmt.execute(params![user_id, position as i64, task.id, json])?;
        }
        Ok(())
    }
}

impl PlannerStore for SqlitePlannerStore {
    fn save_planner(&self, user_id: &str, planner: &Planner) -> PersistenceResult<()> {
        super::validate_tasks(planner.tasks())?;
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO planner_users (user_id) VALUES (?1)",
            params![user_id],
        )?;
        Self::save_tasks(&tx, user_id, planner.tasks())?;
        Self::save_document(&tx, user_id, TIMETABLE, planner.custom_timetable())?;
        Self::save_document(&tx, user_id, PROFILE, Some(planner.profile()))?;
        Self::save_document(&tx, user_id, PREFERENCES, Some(&planner.preferences()))?;
        tx.commit()?;
        tracing::debug!(user_id, tasks = planner.tasks().len(), "planner saved to sqlite");
        Ok(())
    }

    fn load_planner(&self, user_id: &str) -> PersistenceResult<Option<Planner>> {
        let conn = self.connection.lock();

        let known: Option<String> = conn
            .query_row(
                "SELECT user_id FROM planner_users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        if known.is_none() {
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT task_json FROM planner_tasks WHERE user_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        let mut tasks = Vec::new();
        for json in rows {
            let task: Task = serde_json::from_str(&json?)?;
            tasks.push(task);
        }
        super::validate_tasks(&tasks)?;

        let timetable: Option<Timetable> = Self::load_document(&conn, user_id, TIMETABLE)?;
        let profile: StudentProfile =
            Self::load_document(&conn, user_id, PROFILE)?.unwrap_or_default();
        let preferences: Preferences =
            Self::load_document(&conn, user_id, PREFERENCES)?.unwrap_or_default();

        tracing::debug!(user_id, tasks = tasks.len(), "planner loaded from sqlite");
        Ok(Some(Planner::from_parts(
            tasks,
            timetable,
            profile,
            preferences,
        )?))
    }
}
