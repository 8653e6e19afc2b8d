use super::{PersistenceError, PersistenceResult, SectionStore, SectionUpdate, TimetableStore};
use crate::section::Section;
use crate::section_validation;
use crate::timetable::TimetableEntry;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS sections (
                id TEXT PRIMARY KEY,
                section_code TEXT NOT NULL,
                section_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS timetable_entries (
                student_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                entry_json TEXT NOT NULL,
                PRIMARY KEY (student_id, position)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn read_section(connection: &Connection, id: Uuid) -> PersistenceResult<Option<Section>> {
        let json: Option<String> = connection
            .query_row(
                "SELECT section_json FROM sections WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(json) = json else {
            return Ok(None);
        };
        let section: Section = serde_json::from_str(&json)?;
        section_validation::validate_section(&section)?;
        Ok(Some(section))
    }
}

impl SectionStore for SqliteStore {
    fn insert_section(&self, section: &Section) -> PersistenceResult<()> {
        section_validation::validate_section(section)?;
        let json = serde_json::to_string(section)?;
        let conn = self.connection.lock();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO sections (id, section_code, section_json) VALUES (?1, ?2, ?3)",
            params![section.id.to_string(), section.section_code, json],
        )?;
        if inserted == 0 {
            return Err(PersistenceError::InvalidData(format!(
                "section {} already exists",
                section.id
            )));
        }
        Ok(())
    }

    fn get_section(&self, id: Uuid) -> PersistenceResult<Option<Section>> {
        let conn = self.connection.lock();
        Self::read_section(&conn, id)
    }

    fn list_sections(&self) -> PersistenceResult<Vec<Section>> {
        let conn = self.connection.lock();
        let mut stmt =
            conn.prepare("SELECT section_json FROM sections ORDER BY section_code ASC, id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut sections = Vec::new();
        for json in rows {
            let section: Section = serde_json::from_str(&json?)?;
            sections.push(section);
        }
        super::validate_sections(&sections)?;
        Ok(sections)
    }

    fn delete_section(&self, id: Uuid) -> PersistenceResult<bool> {
        let conn = self.connection.lock();
        let removed = conn.execute("DELETE FROM sections WHERE id = ?1", params![id.to_string()])?;
        Ok(removed > 0)
    }

    fn update_section(&self, id: Uuid, update: SectionUpdate<'_>) -> PersistenceResult<Section> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        let current = Self::read_section(&tx, id)?.ok_or(PersistenceError::SectionNotFound(id))?;
        let updated = update(&current)?;
        section_validation::validate_section(&updated)?;
        let json = serde_json::to_string(&updated)?;
        tx.execute(
            "UPDATE sections SET section_code = ?2, section_json = ?3 WHERE id = ?1",
            params![id.to_string(), updated.section_code, json],
        )?;
        tx.commit()?;
        Ok(updated)
    }
}

impl TimetableStore for SqliteStore {
    fn timetable_for_student(&self, student_id: &str) -> PersistenceResult<Vec<TimetableEntry>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(
            "SELECT entry_json FROM timetable_entries WHERE student_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt.query_map(params![student_id], |row| row.get::<_, String>(0))?;

        let mut entries = Vec::new();
        for json in rows {
            let entry: TimetableEntry = serde_json::from_str(&json?)?;
            entries.push(entry);
        }
        super::validate_entries(&entries)?;
        Ok(entries)
    }

    fn replace_timetable(
        &self,
        student_id: &str,
        entries: &[TimetableEntry],
    ) -> PersistenceResult<()> {
        super::validate_entries(entries)?;
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM timetable_entries WHERE student_id = ?1",
            params![student_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO timetable_entries (student_id, position, entry_json) VALUES (?1, ?2, ?3)",
            )?;
            for (position, entry) in entries.iter().enumerate() {
                let json = serde_json::to_string(entry)?;
                stmt.execute(params![student_id, position as i64, json])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
