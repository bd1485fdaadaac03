//! Habit entry repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide check-in CRUD plus the streak-recomputation read paths
//!   (`successful_dates`, `count_successful`).
//! - Map the `(habit_uuid, date)` unique-constraint violation to the
//!   semantic `DuplicateEntry` error.
//!
//! # Invariants
//! - `successful_dates` returns dates in ascending order.
//! - Entry rows never change their owning habit; `update_entry` leaves
//!   `habit_uuid` untouched.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

use chrono::NaiveDate;

use crate::model::entry::{EntryId, HabitEntry};
use crate::model::habit::HabitId;
use crate::repo::{
    bool_to_int, date_to_db, ensure_connection_ready, is_unique_violation, parse_db_bool,
    parse_db_date, parse_db_uuid, RepoError, RepoResult, SchemaRequirement,
};

const ENTRY_SELECT_SQL: &str = "SELECT
    uuid,
    habit_uuid,
    owner,
    date,
    success,
    note
FROM habit_entries";

const ENTRY_SCHEMA: &[SchemaRequirement] = &[(
    "habit_entries",
    &["uuid", "habit_uuid", "owner", "date", "success", "note"],
)];

/// Query options for listing entries.
#[derive(Debug, Clone, Default)]
pub struct EntryListQuery {
    /// Restrict to one habit.
    pub habit_id: Option<HabitId>,
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
    /// Restrict by success flag.
    pub success: Option<bool>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for habit check-in entries.
pub trait EntryRepository {
    /// Creates one entry. A second entry for the same `(habit, date)` pair
    /// fails with `DuplicateEntry`.
    fn create_entry(&self, entry: &HabitEntry) -> RepoResult<EntryId>;
    /// Updates `date`, `success`, `note` and `owner`. Moving the entry onto
    /// an occupied date fails with `DuplicateEntry`.
    fn update_entry(&self, entry: &HabitEntry) -> RepoResult<()>;
    fn get_entry(&self, id: EntryId) -> RepoResult<Option<HabitEntry>>;
    /// Finds the unique entry for `(habit, date)`, if present.
    fn find_entry(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<Option<HabitEntry>>;
    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<HabitEntry>>;
    /// Ascending dates of all successful entries for one habit; the input
    /// shape expected by streak recomputation.
    fn successful_dates(&self, habit_id: HabitId) -> RepoResult<Vec<NaiveDate>>;
    /// Count of successful entries with `date` in `[start, end]` inclusive.
    fn count_successful(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<u32>;
    fn delete_entry(&self, id: EntryId) -> RepoResult<()>;
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, ENTRY_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn create_entry(&self, entry: &HabitEntry) -> RepoResult<EntryId> {
        let result = self.conn.execute(
            "INSERT INTO habit_entries (
                uuid,
                habit_uuid,
                owner,
                date,
                success,
                note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                entry.uuid.to_string(),
                entry.habit_id.to_string(),
                entry.owner.as_str(),
                date_to_db(entry.date),
                bool_to_int(entry.success),
                entry.note.as_deref(),
            ],
        );

        match result {
            Ok(_) => Ok(entry.uuid),
            Err(err) if is_unique_violation(&err) => Err(RepoError::DuplicateEntry {
                habit_id: entry.habit_id,
                date: entry.date,
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn update_entry(&self, entry: &HabitEntry) -> RepoResult<()> {
        let result = self.conn.execute(
            "UPDATE habit_entries
             SET
                owner = ?1,
                date = ?2,
                success = ?3,
                note = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?5;",
            params![
                entry.owner.as_str(),
                date_to_db(entry.date),
                bool_to_int(entry.success),
                entry.note.as_deref(),
                entry.uuid.to_string(),
            ],
        );

        let changed = match result {
            Ok(changed) => changed,
            Err(err) if is_unique_violation(&err) => {
                return Err(RepoError::DuplicateEntry {
                    habit_id: entry.habit_id,
                    date: entry.date,
                });
            }
            Err(err) => return Err(err.into()),
        };

        if changed == 0 {
            return Err(RepoError::NotFound(entry.uuid));
        }

        Ok(())
    }

    fn get_entry(&self, id: EntryId) -> RepoResult<Option<HabitEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }

        Ok(None)
    }

    fn find_entry(&self, habit_id: HabitId, date: NaiveDate) -> RepoResult<Option<HabitEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL} WHERE habit_uuid = ?1 AND date = ?2;"
        ))?;

        let mut rows = stmt.query(params![habit_id.to_string(), date_to_db(date)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }

        Ok(None)
    }

    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<HabitEntry>> {
        let mut sql = format!("{ENTRY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(habit_id) = query.habit_id {
            sql.push_str(" AND habit_uuid = ?");
            bind_values.push(Value::Text(habit_id.to_string()));
        }

        if let Some(from) = query.from {
            sql.push_str(" AND date >= ?");
            bind_values.push(Value::Text(date_to_db(from)));
        }

        if let Some(to) = query.to {
            sql.push_str(" AND date <= ?");
            bind_values.push(Value::Text(date_to_db(to)));
        }

        if let Some(success) = query.success {
            sql.push_str(" AND success = ?");
            bind_values.push(Value::Integer(bool_to_int(success)));
        }

        sql.push_str(" ORDER BY date ASC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn successful_dates(&self, habit_id: HabitId) -> RepoResult<Vec<NaiveDate>> {
        let mut stmt = self.conn.prepare(
            "SELECT date
             FROM habit_entries
             WHERE habit_uuid = ?1
               AND success = 1
             ORDER BY date ASC, uuid ASC;",
        )?;

        let mut rows = stmt.query([habit_id.to_string()])?;
        let mut dates = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            dates.push(parse_db_date(&value, "habit_entries.date")?);
        }
        Ok(dates)
    }

    fn count_successful(
        &self,
        habit_id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM habit_entries
             WHERE habit_uuid = ?1
               AND success = 1
               AND date >= ?2
               AND date <= ?3;",
            params![habit_id.to_string(), date_to_db(start), date_to_db(end)],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn delete_entry(&self, id: EntryId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM habit_entries WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<HabitEntry> {
    let uuid_text: String = row.get("uuid")?;
    let habit_text: String = row.get("habit_uuid")?;
    let date_text: String = row.get("date")?;

    Ok(HabitEntry {
        uuid: parse_db_uuid(&uuid_text, "habit_entries.uuid")?,
        habit_id: parse_db_uuid(&habit_text, "habit_entries.habit_uuid")?,
        owner: row.get("owner")?,
        date: parse_db_date(&date_text, "habit_entries.date")?,
        success: parse_db_bool(row.get("success")?, "habit_entries.success")?,
        note: row.get("note")?,
    })
}
