//! Journal repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide journal-entry persistence APIs plus tag-link replacement
//!   (`set_tags`) with atomic semantics.
//!
//! # Invariants
//! - `set_tags` replaces the whole tag set in a single transaction.
//! - Tag names are normalized to lowercase before persistence.
//! - Journal list is always sorted by `entry_at DESC, uuid ASC`.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

use crate::model::journal::{JournalEntry, JournalId, Mood};
use crate::repo::{
    ensure_connection_ready, parse_db_uuid, RepoError, RepoResult, SchemaRequirement,
};

const JOURNAL_SELECT_SQL: &str = "SELECT
    uuid,
    owner,
    entry_at,
    title,
    content,
    mood
FROM journal_entries";

const JOURNAL_SCHEMA: &[SchemaRequirement] = &[
    (
        "journal_entries",
        &["uuid", "owner", "entry_at", "title", "content", "mood"],
    ),
    ("journal_tags", &["id", "name"]),
    ("journal_entry_tags", &["entry_uuid", "tag_id"]),
];

/// Read model for journal list/detail use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRecord {
    /// The stored entry.
    pub entry: JournalEntry,
    /// Entry tags, normalized to lowercase, sorted by name.
    pub tags: Vec<String>,
}

/// Query options for journal list use-cases.
#[derive(Debug, Clone, Default)]
pub struct JournalListQuery {
    /// Restrict to one author.
    pub owner: Option<String>,
    /// Optional single-tag exact match filter.
    pub tag: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for journal entries and tags.
pub trait JournalRepository {
    fn create_entry(&self, entry: &JournalEntry) -> RepoResult<JournalId>;
    fn update_entry(&self, entry: &JournalEntry) -> RepoResult<()>;
    fn get_entry(&self, id: JournalId) -> RepoResult<Option<JournalRecord>>;
    fn list_entries(&self, query: &JournalListQuery) -> RepoResult<Vec<JournalRecord>>;
    /// Replaces all tags for the given entry in one transaction.
    fn set_tags(&mut self, id: JournalId, tags: &[String]) -> RepoResult<()>;
    /// Returns all known tags sorted by name.
    fn list_tags(&self) -> RepoResult<Vec<String>>;
    fn delete_entry(&self, id: JournalId) -> RepoResult<()>;
}

/// SQLite-backed journal repository.
pub struct SqliteJournalRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteJournalRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, JOURNAL_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl JournalRepository for SqliteJournalRepository<'_> {
    fn create_entry(&self, entry: &JournalEntry) -> RepoResult<JournalId> {
        self.conn.execute(
            "INSERT INTO journal_entries (
                uuid,
                owner,
                entry_at,
                title,
                content,
                mood
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                entry.uuid.to_string(),
                entry.owner.as_str(),
                entry.entry_at,
                entry.title.as_deref(),
                entry.content.as_deref(),
                entry.mood.map(Mood::score),
            ],
        )?;

        Ok(entry.uuid)
    }

    fn update_entry(&self, entry: &JournalEntry) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE journal_entries
             SET
                owner = ?1,
                entry_at = ?2,
                title = ?3,
                content = ?4,
                mood = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                entry.owner.as_str(),
                entry.entry_at,
                entry.title.as_deref(),
                entry.content.as_deref(),
                entry.mood.map(Mood::score),
                entry.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(entry.uuid));
        }

        Ok(())
    }

    fn get_entry(&self, id: JournalId) -> RepoResult<Option<JournalRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{JOURNAL_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let entry = parse_journal_row(row)?;
            let tags = load_tags_for_entry(self.conn, &entry.uuid.to_string())?;
            return Ok(Some(JournalRecord { entry, tags }));
        }

        Ok(None)
    }

    fn list_entries(&self, query: &JournalListQuery) -> RepoResult<Vec<JournalRecord>> {
        let mut sql = format!("{JOURNAL_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner) = query.owner.as_ref() {
            sql.push_str(" AND owner = ?");
            bind_values.push(Value::Text(owner.clone()));
        }

        if let Some(tag) = query.tag.as_ref() {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM journal_entry_tags jet
                    INNER JOIN journal_tags jt ON jt.id = jet.tag_id
                    WHERE jet.entry_uuid = journal_entries.uuid
                      AND jt.name = ? COLLATE NOCASE
                )",
            );
            bind_values.push(Value::Text(tag.clone()));
        }

        sql.push_str(" ORDER BY entry_at DESC, uuid ASC");

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

        let mut records = Vec::new();
        {
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            while let Some(row) = rows.next()? {
                records.push(parse_journal_row(row)?);
            }
        }

        let mut results = Vec::with_capacity(records.len());
        for entry in records {
            let tags = load_tags_for_entry(self.conn, &entry.uuid.to_string())?;
            results.push(JournalRecord { entry, tags });
        }

        Ok(results)
    }

    fn set_tags(&mut self, id: JournalId, tags: &[String]) -> RepoResult<()> {
        let entry_uuid = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !entry_exists_in_tx(&tx, entry_uuid.as_str())? {
            return Err(RepoError::NotFound(id));
        }

        tx.execute(
            "DELETE FROM journal_entry_tags WHERE entry_uuid = ?1;",
            [entry_uuid.as_str()],
        )?;

        for tag in tags {
            tx.execute(
                "INSERT OR IGNORE INTO journal_tags (name) VALUES (?1);",
                [tag.as_str()],
            )?;
            tx.execute(
                "INSERT INTO journal_entry_tags (entry_uuid, tag_id)
                 SELECT ?1, id
                 FROM journal_tags
                 WHERE name = ?2 COLLATE NOCASE;",
                params![entry_uuid.as_str(), tag.as_str()],
            )?;
        }

        tx.execute(
            "UPDATE journal_entries
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [entry_uuid.as_str()],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn list_tags(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM journal_tags ORDER BY name COLLATE NOCASE ASC;")?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get("name")?;
            tags.push(value.to_lowercase());
        }
        Ok(tags)
    }

    fn delete_entry(&self, id: JournalId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM journal_entries WHERE uuid = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

/// Normalizes one tag value according to the journal contract.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates tag values.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag) {
            unique.insert(value);
        }
    }
    unique.into_iter().collect()
}

fn parse_journal_row(row: &Row<'_>) -> RepoResult<JournalEntry> {
    let uuid_text: String = row.get("uuid")?;
    let mood = match row.get::<_, Option<i64>>("mood")? {
        Some(stored) => {
            let parsed = u8::try_from(stored).ok().and_then(Mood::from_score);
            Some(parsed.ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid mood score `{stored}` in journal_entries.mood"
                ))
            })?)
        }
        None => None,
    };

    Ok(JournalEntry {
        uuid: parse_db_uuid(&uuid_text, "journal_entries.uuid")?,
        owner: row.get("owner")?,
        entry_at: row.get("entry_at")?,
        title: row.get("title")?,
        content: row.get("content")?,
        mood,
    })
}

fn load_tags_for_entry(conn: &Connection, entry_uuid: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT jt.name
         FROM journal_entry_tags jet
         INNER JOIN journal_tags jt ON jt.id = jet.tag_id
         WHERE jet.entry_uuid = ?1
         ORDER BY jt.name COLLATE NOCASE ASC;",
    )?;
    let mut rows = stmt.query([entry_uuid])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        tags.push(value.to_lowercase());
    }
    Ok(tags)
}

fn entry_exists_in_tx(tx: &Transaction<'_>, entry_uuid: &str) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM journal_entries
            WHERE uuid = ?1
        );",
        [entry_uuid],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{normalize_tag, normalize_tags};

    #[test]
    fn normalize_tag_lowercases_and_trims() {
        assert_eq!(normalize_tag("  Gratitude "), Some("gratitude".to_string()));
        assert_eq!(normalize_tag("   "), None);
    }

    #[test]
    fn normalize_tags_deduplicates_case_insensitively() {
        let tags = vec![
            "Focus".to_string(),
            "focus".to_string(),
            " travel ".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["focus", "travel"]);
    }
}
