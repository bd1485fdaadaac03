//! Vision board repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `VisionItem::validate()` before SQL mutations.
//! - Board list is always sorted by `sequence ASC, uuid ASC`.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

use crate::model::vision::{VisionId, VisionItem};
use crate::repo::{
    bool_to_int, date_to_db, ensure_connection_ready, parse_db_bool, parse_db_date, parse_db_uuid,
    RepoError, RepoResult, SchemaRequirement,
};

const VISION_SELECT_SQL: &str = "SELECT
    uuid,
    owner,
    title,
    description,
    image_path,
    category,
    sequence,
    target_date,
    achieved
FROM vision_items";

const VISION_SCHEMA: &[SchemaRequirement] = &[(
    "vision_items",
    &[
        "uuid",
        "owner",
        "title",
        "description",
        "image_path",
        "category",
        "sequence",
        "target_date",
        "achieved",
    ],
)];

/// Query options for listing vision items.
#[derive(Debug, Clone, Default)]
pub struct VisionListQuery {
    /// Restrict to one owner.
    pub owner: Option<String>,
    /// Restrict to one category label.
    pub category: Option<String>,
    /// Include already-achieved goals in the result.
    pub include_achieved: bool,
}

/// Repository interface for vision board items.
pub trait VisionRepository {
    fn create_item(&self, item: &VisionItem) -> RepoResult<VisionId>;
    fn update_item(&self, item: &VisionItem) -> RepoResult<()>;
    fn get_item(&self, id: VisionId) -> RepoResult<Option<VisionItem>>;
    fn list_items(&self, query: &VisionListQuery) -> RepoResult<Vec<VisionItem>>;
    fn set_achieved(&self, id: VisionId, achieved: bool) -> RepoResult<()>;
    fn delete_item(&self, id: VisionId) -> RepoResult<()>;
}

/// SQLite-backed vision board repository.
pub struct SqliteVisionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteVisionRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, VISION_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl VisionRepository for SqliteVisionRepository<'_> {
    fn create_item(&self, item: &VisionItem) -> RepoResult<VisionId> {
        item.validate()?;

        self.conn.execute(
            "INSERT INTO vision_items (
                uuid,
                owner,
                title,
                description,
                image_path,
                category,
                sequence,
                target_date,
                achieved
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                item.uuid.to_string(),
                item.owner.as_str(),
                item.title.as_str(),
                item.description.as_deref(),
                item.image_path.as_deref(),
                item.category.as_deref(),
                item.sequence,
                item.target_date.map(date_to_db),
                bool_to_int(item.achieved),
            ],
        )?;

        Ok(item.uuid)
    }

    fn update_item(&self, item: &VisionItem) -> RepoResult<()> {
        item.validate()?;

        let changed = self.conn.execute(
            "UPDATE vision_items
             SET
                owner = ?1,
                title = ?2,
                description = ?3,
                image_path = ?4,
                category = ?5,
                sequence = ?6,
                target_date = ?7,
                achieved = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?9;",
            params![
                item.owner.as_str(),
                item.title.as_str(),
                item.description.as_deref(),
                item.image_path.as_deref(),
                item.category.as_deref(),
                item.sequence,
                item.target_date.map(date_to_db),
                bool_to_int(item.achieved),
                item.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(item.uuid));
        }

        Ok(())
    }

    fn get_item(&self, id: VisionId) -> RepoResult<Option<VisionItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{VISION_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_vision_row(row)?));
        }

        Ok(None)
    }

    fn list_items(&self, query: &VisionListQuery) -> RepoResult<Vec<VisionItem>> {
        let mut sql = format!("{VISION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_achieved {
            sql.push_str(" AND achieved = 0");
        }

        if let Some(owner) = query.owner.as_ref() {
            sql.push_str(" AND owner = ?");
            bind_values.push(Value::Text(owner.clone()));
        }

        if let Some(category) = query.category.as_ref() {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.clone()));
        }

        sql.push_str(" ORDER BY sequence ASC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_vision_row(row)?);
        }

        Ok(items)
    }

    fn set_achieved(&self, id: VisionId, achieved: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE vision_items
             SET
                achieved = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![bool_to_int(achieved), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_item(&self, id: VisionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM vision_items WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_vision_row(row: &Row<'_>) -> RepoResult<VisionItem> {
    let uuid_text: String = row.get("uuid")?;
    let target_date = match row.get::<_, Option<String>>("target_date")? {
        Some(value) => Some(parse_db_date(&value, "vision_items.target_date")?),
        None => None,
    };

    let item = VisionItem {
        uuid: parse_db_uuid(&uuid_text, "vision_items.uuid")?,
        owner: row.get("owner")?,
        title: row.get("title")?,
        description: row.get("description")?,
        image_path: row.get("image_path")?,
        category: row.get("category")?,
        sequence: row.get("sequence")?,
        target_date,
        achieved: parse_db_bool(row.get("achieved")?, "vision_items.achieved")?,
    };
    item.validate()?;
    Ok(item)
}
