//! Habit repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over `habits` storage.
//! - Persist streak state produced by recomputation (`save_streak`).
//!
//! # Invariants
//! - Write paths call `Habit::validate()` before SQL mutations.
//! - Streak fields are only written through `save_streak`, never through
//!   `update_habit`.
//! - Deleting a habit cascades to its entries via the FK constraint.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;

use crate::model::habit::{ColorTheme, FrequencyRule, Habit, HabitId};
use crate::repo::{
    bool_to_int, date_to_db, ensure_connection_ready, parse_db_bool, parse_db_date, parse_db_uuid,
    RepoError, RepoResult, SchemaRequirement,
};
use crate::streak::compute::StreakState;

const HABIT_SELECT_SQL: &str = "SELECT
    uuid,
    owner,
    name,
    icon,
    color,
    sequence,
    active,
    goal,
    frequency_type,
    every_n_days,
    custom_days,
    current_streak,
    longest_streak,
    last_done_date
FROM habits";

const HABIT_SCHEMA: &[SchemaRequirement] = &[(
    "habits",
    &[
        "uuid",
        "owner",
        "name",
        "icon",
        "color",
        "sequence",
        "active",
        "goal",
        "frequency_type",
        "every_n_days",
        "custom_days",
        "current_streak",
        "longest_streak",
        "last_done_date",
    ],
)];

/// Query options for listing habits.
#[derive(Debug, Clone, Default)]
pub struct HabitListQuery {
    /// Restrict to one owner.
    pub owner: Option<String>,
    /// Include archived habits in the result.
    pub include_inactive: bool,
}

/// Repository interface for habit CRUD and streak persistence.
pub trait HabitRepository {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId>;
    /// Updates definition fields. Streak fields on `habit` are ignored; use
    /// `save_streak` for those.
    fn update_habit(&self, habit: &Habit) -> RepoResult<()>;
    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>>;
    fn list_habits(&self, query: &HabitListQuery) -> RepoResult<Vec<Habit>>;
    /// Hard delete; entries are removed by the FK cascade.
    fn delete_habit(&self, id: HabitId) -> RepoResult<()>;
    fn save_streak(&self, id: HabitId, state: &StreakState) -> RepoResult<()>;
    /// All habit IDs, used by the consistency sweep.
    fn list_habit_ids(&self) -> RepoResult<Vec<HabitId>>;
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, HABIT_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, habit: &Habit) -> RepoResult<HabitId> {
        habit.validate()?;

        let (frequency_type, every_n_days, custom_days) = frequency_to_db(&habit.frequency);
        self.conn.execute(
            "INSERT INTO habits (
                uuid,
                owner,
                name,
                icon,
                color,
                sequence,
                active,
                goal,
                frequency_type,
                every_n_days,
                custom_days,
                current_streak,
                longest_streak,
                last_done_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                habit.uuid.to_string(),
                habit.owner.as_str(),
                habit.name.as_str(),
                habit.icon.as_str(),
                color_to_db(habit.color),
                habit.sequence,
                bool_to_int(habit.active),
                habit.goal,
                frequency_type,
                every_n_days,
                custom_days.as_deref(),
                habit.current_streak,
                habit.longest_streak,
                habit.last_done_date.map(date_to_db),
            ],
        )?;

        Ok(habit.uuid)
    }

    fn update_habit(&self, habit: &Habit) -> RepoResult<()> {
        habit.validate()?;

        let (frequency_type, every_n_days, custom_days) = frequency_to_db(&habit.frequency);
        let changed = self.conn.execute(
            "UPDATE habits
             SET
                owner = ?1,
                name = ?2,
                icon = ?3,
                color = ?4,
                sequence = ?5,
                active = ?6,
                goal = ?7,
                frequency_type = ?8,
                every_n_days = ?9,
                custom_days = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?11;",
            params![
                habit.owner.as_str(),
                habit.name.as_str(),
                habit.icon.as_str(),
                color_to_db(habit.color),
                habit.sequence,
                bool_to_int(habit.active),
                habit.goal,
                frequency_type,
                every_n_days,
                custom_days.as_deref(),
                habit.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(habit.uuid));
        }

        Ok(())
    }

    fn get_habit(&self, id: HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_habit_row(row)?));
        }

        Ok(None)
    }

    fn list_habits(&self, query: &HabitListQuery) -> RepoResult<Vec<Habit>> {
        let mut sql = format!("{HABIT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_inactive {
            sql.push_str(" AND active = 1");
        }

        if let Some(owner) = query.owner.as_ref() {
            sql.push_str(" AND owner = ?");
            bind_values.push(Value::Text(owner.clone()));
        }

        sql.push_str(" ORDER BY sequence ASC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut habits = Vec::new();

        while let Some(row) = rows.next()? {
            habits.push(parse_habit_row(row)?);
        }

        Ok(habits)
    }

    fn delete_habit(&self, id: HabitId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM habits WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn save_streak(&self, id: HabitId, state: &StreakState) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE habits
             SET
                current_streak = ?1,
                longest_streak = ?2,
                last_done_date = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?4;",
            params![
                state.current_streak,
                state.longest_streak,
                state.last_done_date.map(date_to_db),
                id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn list_habit_ids(&self) -> RepoResult<Vec<HabitId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid FROM habits ORDER BY uuid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            ids.push(parse_db_uuid(&uuid_text, "habits.uuid")?);
        }
        Ok(ids)
    }
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_db_uuid(&uuid_text, "habits.uuid")?;

    let color_text: String = row.get("color")?;
    let color = parse_color(&color_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid color value `{color_text}` in habits.color"))
    })?;

    let frequency_text: String = row.get("frequency_type")?;
    let every_n_days: i64 = row.get("every_n_days")?;
    let custom_days: Option<String> = row.get("custom_days")?;
    let frequency = parse_frequency(&frequency_text, every_n_days, custom_days.as_deref())
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid frequency value `{frequency_text}` in habits.frequency_type"
            ))
        })?;

    let active = parse_db_bool(row.get("active")?, "habits.active")?;
    let last_done_date = match row.get::<_, Option<String>>("last_done_date")? {
        Some(value) => Some(parse_db_date(&value, "habits.last_done_date")?),
        None => None,
    };

    let habit = Habit {
        uuid,
        owner: row.get("owner")?,
        name: row.get("name")?,
        icon: row.get("icon")?,
        color,
        sequence: row.get("sequence")?,
        active,
        goal: row.get("goal")?,
        frequency,
        current_streak: row.get("current_streak")?,
        longest_streak: row.get("longest_streak")?,
        last_done_date,
    };
    habit.validate()?;
    Ok(habit)
}

fn color_to_db(color: ColorTheme) -> &'static str {
    match color {
        ColorTheme::Purple => "purple",
        ColorTheme::Blue => "blue",
        ColorTheme::Green => "green",
        ColorTheme::Yellow => "yellow",
        ColorTheme::Orange => "orange",
        ColorTheme::Red => "red",
        ColorTheme::Pink => "pink",
        ColorTheme::Teal => "teal",
    }
}

fn parse_color(value: &str) -> Option<ColorTheme> {
    match value {
        "purple" => Some(ColorTheme::Purple),
        "blue" => Some(ColorTheme::Blue),
        "green" => Some(ColorTheme::Green),
        "yellow" => Some(ColorTheme::Yellow),
        "orange" => Some(ColorTheme::Orange),
        "red" => Some(ColorTheme::Red),
        "pink" => Some(ColorTheme::Pink),
        "teal" => Some(ColorTheme::Teal),
        _ => None,
    }
}

fn frequency_to_db(rule: &FrequencyRule) -> (&'static str, i64, Option<String>) {
    match rule {
        FrequencyRule::Daily => ("daily", 1, None),
        FrequencyRule::Weekdays => ("weekdays", 1, None),
        FrequencyRule::EveryNDays(interval) => ("every_n_days", i64::from(*interval), None),
        FrequencyRule::Custom(days) => {
            let csv = days
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(",");
            ("custom", 1, Some(csv))
        }
    }
}

/// Parses the persisted frequency triple back into a rule.
///
/// The custom-day CSV is parsed leniently: non-numeric or out-of-range
/// tokens are dropped, and an empty surviving set degrades to daily
/// behavior at evaluation time rather than failing the read.
fn parse_frequency(
    frequency_type: &str,
    every_n_days: i64,
    custom_days: Option<&str>,
) -> Option<FrequencyRule> {
    match frequency_type {
        "daily" => Some(FrequencyRule::Daily),
        "weekdays" => Some(FrequencyRule::Weekdays),
        "every_n_days" => {
            let interval = u32::try_from(every_n_days.max(1)).ok()?;
            Some(FrequencyRule::EveryNDays(interval))
        }
        "custom" => {
            let days: BTreeSet<u8> = custom_days
                .unwrap_or("")
                .split(',')
                .filter_map(|token| token.trim().parse::<u8>().ok())
                .filter(|day| *day <= 6)
                .collect();
            Some(FrequencyRule::Custom(days))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{frequency_to_db, parse_frequency};
    use crate::model::habit::FrequencyRule;
    use std::collections::BTreeSet;

    #[test]
    fn frequency_roundtrips_through_db_encoding() {
        for rule in [
            FrequencyRule::Daily,
            FrequencyRule::Weekdays,
            FrequencyRule::EveryNDays(4),
            FrequencyRule::Custom(BTreeSet::from([0, 2, 4])),
        ] {
            let (kind, interval, csv) = frequency_to_db(&rule);
            assert_eq!(parse_frequency(kind, interval, csv.as_deref()), Some(rule));
        }
    }

    #[test]
    fn custom_day_csv_is_parsed_leniently() {
        let parsed = parse_frequency("custom", 1, Some("0, x, 9, 3,"));
        assert_eq!(parsed, Some(FrequencyRule::Custom(BTreeSet::from([0, 3]))));
    }

    #[test]
    fn unknown_frequency_type_is_rejected() {
        assert_eq!(parse_frequency("hourly", 1, None), None);
    }
}
