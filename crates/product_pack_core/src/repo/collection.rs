//! Queryable set of stored pack options.
//!
//! # Responsibility
//! - Accumulate field filters, ordering and page settings.
//! - Render them into parameterized SQL over `pack_options`.
//! - Materialize records and count the filtered set.
//!
//! # Invariants
//! - Only whitelisted column names ever reach SQL text; values are bound.
//! - `size()` ignores pagination.
//! - Ordering is deterministic: requested orders, then `packoption_id ASC`.

use crate::model::pack_option::{PackOption, PackOptionId};
use crate::repo::resource::{
    load_extension_attributes_for, parse_pack_option_row, ResourceError, ResourceResult,
    PACK_OPTION_COLUMNS, PACK_OPTION_SELECT_SQL,
};
use crate::search::criteria::{Condition, Filter, FilterValue, SortDirection};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Lazily evaluated pack option query.
pub struct PackOptionCollection<'conn> {
    conn: &'conn Connection,
    where_clauses: Vec<String>,
    bind_values: Vec<Value>,
    orders: Vec<(&'static str, SortDirection)>,
    page_size: Option<u32>,
    current_page: u32,
    join_extension_attributes: bool,
}

impl<'conn> PackOptionCollection<'conn> {
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            where_clauses: Vec::new(),
            bind_values: Vec::new(),
            orders: Vec::new(),
            page_size: None,
            current_page: 1,
            join_extension_attributes: false,
        }
    }

    /// Adds a group of conditions of which at least one must hold.
    ///
    /// An empty group adds nothing.
    pub fn add_filter_group(&mut self, filters: &[Filter]) -> ResourceResult<()> {
        if filters.is_empty() {
            return Ok(());
        }

        let mut clauses = Vec::with_capacity(filters.len());
        let mut values = Vec::new();
        for filter in filters {
            let column = resolve_column(&filter.field)?;
            let (clause, bound) = render_condition(column, &filter.condition);
            clauses.push(clause);
            values.extend(bound);
        }

        self.where_clauses
            .push(format!("({})", clauses.join(" OR ")));
        self.bind_values.extend(values);
        Ok(())
    }

    pub fn add_order(&mut self, field: &str, direction: SortDirection) -> ResourceResult<()> {
        let column = resolve_column(field)?;
        self.orders.push((column, direction));
        Ok(())
    }

    /// `None` or `Some(0)` disables the limit.
    pub fn set_page_size(&mut self, page_size: Option<u32>) {
        self.page_size = page_size.filter(|size| *size > 0);
    }

    /// 1-based; `0` is clamped to the first page.
    pub fn set_current_page(&mut self, current_page: u32) {
        self.current_page = current_page.max(1);
    }

    /// Hydrates `extension_attributes` on loaded records.
    pub fn join_extension_attributes(&mut self) {
        self.join_extension_attributes = true;
    }

    /// Counts records matching the filters, ignoring pagination.
    pub fn size(&self) -> ResourceResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM pack_options{}", self.render_where());
        let count: i64 = self.conn.query_row(
            &sql,
            params_from_iter(self.bind_values.iter()),
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| ResourceError::InvalidData(format!("negative row count `{count}`")))
    }

    /// Loads the current page of matching records in order.
    pub fn load(&self) -> ResourceResult<Vec<PackOption>> {
        let mut sql = format!("{PACK_OPTION_SELECT_SQL}{}", self.render_where());
        let mut bind_values = self.bind_values.clone();

        sql.push_str(" ORDER BY ");
        for (column, direction) in &self.orders {
            sql.push_str(column);
            sql.push_str(match direction {
                SortDirection::Asc => " ASC, ",
                SortDirection::Desc => " DESC, ",
            });
        }
        sql.push_str("packoption_id ASC");

        if let Some(size) = self.page_size {
            let offset = u64::from(self.current_page - 1) * u64::from(size);
            sql.push_str(" LIMIT ? OFFSET ?");
            bind_values.push(Value::Integer(i64::from(size)));
            bind_values.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_pack_option_row(row)?);
        }

        if self.join_extension_attributes {
            let ids = items
                .iter()
                .filter_map(PackOption::id)
                .collect::<Vec<PackOptionId>>();
            let mut attributes = load_extension_attributes_for(self.conn, &ids)?;
            for item in &mut items {
                if let Some(found) = item.id().and_then(|id| attributes.remove(&id)) {
                    item.extension_attributes = found;
                }
            }
        }

        Ok(items)
    }

    fn render_where(&self) -> String {
        if self.where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.where_clauses.join(" AND "))
        }
    }
}

fn resolve_column(field: &str) -> ResourceResult<&'static str> {
    let trimmed = field.trim();
    PACK_OPTION_COLUMNS
        .iter()
        .copied()
        .find(|column| *column == trimmed)
        .ok_or_else(|| ResourceError::UnknownField(trimmed.to_string()))
}

fn render_condition(column: &str, condition: &Condition) -> (String, Vec<Value>) {
    let compare = |op: &str, value: &FilterValue| {
        (format!("{column} {op} ?"), vec![to_sql_value(value)])
    };

    match condition {
        Condition::Eq(value) => compare("=", value),
        Condition::Neq(value) => compare("!=", value),
        Condition::Gt(value) => compare(">", value),
        Condition::Gteq(value) => compare(">=", value),
        Condition::Lt(value) => compare("<", value),
        Condition::Lteq(value) => compare("<=", value),
        Condition::Like(pattern) => (
            format!("{column} LIKE ?"),
            vec![Value::Text(pattern.clone())],
        ),
        Condition::In(values) if values.is_empty() => ("0 = 1".to_string(), Vec::new()),
        Condition::Nin(values) if values.is_empty() => ("1 = 1".to_string(), Vec::new()),
        Condition::In(values) => (
            format!("{column} IN ({})", placeholders(values.len())),
            values.iter().map(to_sql_value).collect(),
        ),
        Condition::Nin(values) => (
            format!("{column} NOT IN ({})", placeholders(values.len())),
            values.iter().map(to_sql_value).collect(),
        ),
        Condition::Null => (format!("{column} IS NULL"), Vec::new()),
        Condition::NotNull => (format!("{column} IS NOT NULL"), Vec::new()),
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn to_sql_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::Integer(number) => Value::Integer(*number),
        FilterValue::Real(number) => Value::Real(*number),
        FilterValue::Text(text) => Value::Text(text.clone()),
    }
}
