//! SQLite resource model for pack options.
//!
//! # Responsibility
//! - Load, save and delete single pack option records by identifier.
//! - Own the extension attribute child table.
//! - Verify that a connection carries the expected schema.
//!
//! # Invariants
//! - Writes validate the record before any SQL mutation.
//! - Base row and extension attributes are written atomically, nesting as a
//!   savepoint when the caller already holds a transaction.
//! - Loading an absent identifier leaves the target record untouched.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::pack_option::{
    DiscountType, ExtensionAttributes, PackOption, PackOptionId, PackOptionValidationError,
};
use crate::repo::collection::PackOptionCollection;
use log::warn;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub(crate) const PACK_OPTIONS_TABLE: &str = "pack_options";
pub(crate) const EXTENSION_ATTRIBUTES_TABLE: &str = "pack_option_extension_attributes";

/// Columns of `pack_options`; also the set of filterable and sortable fields.
pub(crate) const PACK_OPTION_COLUMNS: &[&str] = &[
    "packoption_id",
    "product_id",
    "pack_size",
    "discount_type",
    "discount_value",
    "sort_order",
];

const EXTENSION_ATTRIBUTE_COLUMNS: &[&str] = &["packoption_id", "code", "value"];

const SAVE_SAVEPOINT: &str = "pack_option_save";

pub(crate) const PACK_OPTION_SELECT_SQL: &str = "SELECT
    packoption_id,
    product_id,
    pack_size,
    discount_type,
    discount_value,
    sort_order
FROM pack_options";

pub type ResourceResult<T> = Result<T, ResourceError>;

/// Storage-level failure raised by the resource model and collections.
#[derive(Debug)]
pub enum ResourceError {
    Db(DbError),
    Validation(PackOptionValidationError),
    InvalidData(String),
    /// Filter or sort referenced a field that is not a `pack_options` column.
    UnknownField(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for ResourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pack option data: {message}"),
            Self::UnknownField(field) => write!(f, "unknown pack option field `{field}`"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for ResourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for ResourceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ResourceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<PackOptionValidationError> for ResourceError {
    fn from(value: PackOptionValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Single-record persistence over a borrowed connection.
pub struct PackOptionResource<'conn> {
    conn: &'conn Connection,
}

impl<'conn> PackOptionResource<'conn> {
    /// Constructs a resource from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> ResourceResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Creates an empty collection over the same connection.
    pub fn collection(&self) -> PackOptionCollection<'conn> {
        PackOptionCollection::new(self.conn)
    }

    /// Populates `pack_option` with the stored record for `id`.
    ///
    /// When no row exists the record is left as it was, so callers detect
    /// absence by checking the identifier afterwards.
    pub fn load(&self, pack_option: &mut PackOption, id: PackOptionId) -> ResourceResult<()> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PACK_OPTION_SELECT_SQL} WHERE packoption_id = ?1;"))?;
        let mut rows = stmt.query([id])?;

        if let Some(row) = rows.next()? {
            let mut loaded = parse_pack_option_row(row)?;
            loaded.extension_attributes = load_extension_attributes(self.conn, id)?;
            *pack_option = loaded;
        }

        Ok(())
    }

    /// Persists `pack_option` and writes the assigned identifier back.
    ///
    /// Records that already carry an identifier are upserted under it. Inside
    /// a caller's open transaction the write is scoped to a savepoint, so a
    /// failure undoes only this save.
    pub fn save(&self, pack_option: &mut PackOption) -> ResourceResult<()> {
        pack_option.validate()?;

        let id = if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let id = write_pack_option(&tx, pack_option)?;
            tx.commit()?;
            id
        } else {
            within_savepoint(self.conn, |conn| write_pack_option(conn, pack_option))?
        };

        pack_option.packoption_id = Some(id);
        Ok(())
    }

    /// Deletes the stored row for `pack_option`.
    ///
    /// A record without identifier is a no-op. Extension attributes go with
    /// the row through `ON DELETE CASCADE`.
    pub fn delete(&self, pack_option: &PackOption) -> ResourceResult<()> {
        let Some(id) = pack_option.packoption_id else {
            return Ok(());
        };

        self.conn
            .execute("DELETE FROM pack_options WHERE packoption_id = ?1;", [id])?;
        Ok(())
    }
}

fn write_pack_option(conn: &Connection, pack_option: &PackOption) -> ResourceResult<PackOptionId> {
    let id = match pack_option.packoption_id {
        Some(id) => {
            conn.execute(
                "INSERT INTO pack_options (
                    packoption_id,
                    product_id,
                    pack_size,
                    discount_type,
                    discount_value,
                    sort_order
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT (packoption_id) DO UPDATE SET
                    product_id = excluded.product_id,
                    pack_size = excluded.pack_size,
                    discount_type = excluded.discount_type,
                    discount_value = excluded.discount_value,
                    sort_order = excluded.sort_order;",
                params![
                    id,
                    pack_option.product_id,
                    pack_option.pack_size,
                    pack_option.discount_type.as_str(),
                    pack_option.discount_value,
                    pack_option.sort_order,
                ],
            )?;
            id
        }
        None => {
            conn.execute(
                "INSERT INTO pack_options (
                    product_id,
                    pack_size,
                    discount_type,
                    discount_value,
                    sort_order
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    pack_option.product_id,
                    pack_option.pack_size,
                    pack_option.discount_type.as_str(),
                    pack_option.discount_value,
                    pack_option.sort_order,
                ],
            )?;
            conn.last_insert_rowid()
        }
    };

    conn.execute(
        "DELETE FROM pack_option_extension_attributes WHERE packoption_id = ?1;",
        [id],
    )?;
    let mut insert = conn.prepare(
        "INSERT INTO pack_option_extension_attributes (packoption_id, code, value)
         VALUES (?1, ?2, ?3);",
    )?;
    for (code, value) in &pack_option.extension_attributes {
        insert.execute(params![id, code, value])?;
    }

    Ok(id)
}

/// Runs `body` under a named savepoint of the caller's open transaction.
///
/// On error the savepoint is rolled back and released; the outer
/// transaction stays open either way.
fn within_savepoint<T>(
    conn: &Connection,
    body: impl FnOnce(&Connection) -> ResourceResult<T>,
) -> ResourceResult<T> {
    conn.execute_batch(&format!("SAVEPOINT {SAVE_SAVEPOINT};"))?;
    match body(conn) {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE {SAVE_SAVEPOINT};"))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = conn.execute_batch(&format!(
                "ROLLBACK TO {SAVE_SAVEPOINT}; RELEASE {SAVE_SAVEPOINT};"
            )) {
                warn!(
                    "event=savepoint_rollback module=resource status=error error={rollback_err}"
                );
            }
            Err(err)
        }
    }
}

/// Verifies schema version, tables and columns expected by this module.
pub fn ensure_connection_ready(conn: &Connection) -> ResourceResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(ResourceError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    ensure_table(conn, PACK_OPTIONS_TABLE, PACK_OPTION_COLUMNS)?;
    ensure_table(conn, EXTENSION_ATTRIBUTES_TABLE, EXTENSION_ATTRIBUTE_COLUMNS)?;
    Ok(())
}

fn ensure_table(
    conn: &Connection,
    table: &'static str,
    columns: &'static [&'static str],
) -> ResourceResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let present = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if present.is_empty() {
        return Err(ResourceError::MissingRequiredTable(table));
    }

    if let Some(column) = columns
        .iter()
        .copied()
        .find(|column| !present.iter().any(|name| name == *column))
    {
        return Err(ResourceError::MissingRequiredColumn { table, column });
    }

    Ok(())
}

pub(crate) fn parse_pack_option_row(row: &Row<'_>) -> ResourceResult<PackOption> {
    let discount_text: String = row.get("discount_type")?;
    let discount_type = DiscountType::parse(&discount_text).ok_or_else(|| {
        ResourceError::InvalidData(format!(
            "invalid discount type `{discount_text}` in pack_options.discount_type"
        ))
    })?;

    let pack_size_raw: i64 = row.get("pack_size")?;
    let pack_size = u32::try_from(pack_size_raw).map_err(|_| {
        ResourceError::InvalidData(format!(
            "invalid pack size `{pack_size_raw}` in pack_options.pack_size"
        ))
    })?;

    Ok(PackOption {
        packoption_id: Some(row.get("packoption_id")?),
        product_id: row.get("product_id")?,
        pack_size,
        discount_type,
        discount_value: row.get("discount_value")?,
        sort_order: row.get("sort_order")?,
        extension_attributes: ExtensionAttributes::new(),
    })
}

fn load_extension_attributes(
    conn: &Connection,
    id: PackOptionId,
) -> ResourceResult<ExtensionAttributes> {
    let mut stmt = conn.prepare(
        "SELECT code, value
         FROM pack_option_extension_attributes
         WHERE packoption_id = ?1
         ORDER BY code ASC;",
    )?;
    let attributes = stmt
        .query_map([id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<ExtensionAttributes, _>>()?;
    Ok(attributes)
}

/// Loads extension attributes for many records in one query.
pub(crate) fn load_extension_attributes_for(
    conn: &Connection,
    ids: &[PackOptionId],
) -> ResourceResult<HashMap<PackOptionId, ExtensionAttributes>> {
    let mut by_id: HashMap<PackOptionId, ExtensionAttributes> = HashMap::new();
    if ids.is_empty() {
        return Ok(by_id);
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT packoption_id, code, value
         FROM pack_option_extension_attributes
         WHERE packoption_id IN ({placeholders});"
    ))?;
    let mut rows = stmt.query(params_from_iter(ids.iter()))?;

    while let Some(row) = rows.next()? {
        let id: PackOptionId = row.get(0)?;
        by_id
            .entry(id)
            .or_default()
            .insert(row.get(1)?, row.get(2)?);
    }

    Ok(by_id)
}
