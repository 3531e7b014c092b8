//! Generic search criteria for list queries.
//!
//! # Responsibility
//! - Describe filtering, sorting and pagination independent of storage.
//! - Provide a fluent builder for callers.
//!
//! # Invariants
//! - Filter groups are AND-combined; filters inside a group are OR-combined.
//! - `current_page` is 1-based; `0` is treated as the first page.
//! - A missing `page_size` means "no limit".

use serde::{Deserialize, Serialize};

/// Scalar value compared against a stored field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Comparison applied by one [`Filter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "condition_type", content = "value")]
pub enum Condition {
    Eq(FilterValue),
    Neq(FilterValue),
    Gt(FilterValue),
    Gteq(FilterValue),
    Lt(FilterValue),
    Lteq(FilterValue),
    /// SQL `LIKE` pattern, `%` and `_` wildcards included by the caller.
    Like(String),
    In(Vec<FilterValue>),
    Nin(Vec<FilterValue>),
    Null,
    #[serde(rename = "notnull")]
    NotNull,
}

/// Single field condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    #[serde(flatten)]
    pub condition: Condition,
}

impl Filter {
    pub fn new(field: impl Into<String>, condition: Condition) -> Self {
        Self {
            field: field.into(),
            condition,
        }
    }
}

/// Filters matched when any one of them holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Filter, sort and pagination request for list operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub filter_groups: Vec<FilterGroup>,
    #[serde(default)]
    pub sort_orders: Vec<SortOrder>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
}

impl SearchCriteria {
    /// Criteria that match every record without pagination.
    pub fn all() -> Self {
        Self::default()
    }
}

/// Fluent builder for [`SearchCriteria`].
///
/// Each `add_filter` call opens its own AND-ed group; use
/// [`SearchCriteriaBuilder::add_filter_group`] for OR semantics.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteriaBuilder {
    criteria: SearchCriteria,
}

impl SearchCriteriaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_filter(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.criteria.filter_groups.push(FilterGroup {
            filters: vec![Filter::new(field, condition)],
        });
        self
    }

    pub fn add_filter_group(mut self, filters: Vec<Filter>) -> Self {
        self.criteria.filter_groups.push(FilterGroup { filters });
        self
    }

    pub fn add_sort_order(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.criteria
            .sort_orders
            .push(SortOrder::new(field, direction));
        self
    }

    pub fn set_page_size(mut self, page_size: u32) -> Self {
        self.criteria.page_size = Some(page_size);
        self
    }

    pub fn set_current_page(mut self, current_page: u32) -> Self {
        self.criteria.current_page = Some(current_page);
        self
    }

    pub fn create(self) -> SearchCriteria {
        self.criteria
    }
}

#[cfg(test)]
mod tests {
    use super::{Condition, FilterValue, SearchCriteria, SearchCriteriaBuilder, SortDirection};

    #[test]
    fn builder_puts_each_filter_in_its_own_group() {
        let criteria = SearchCriteriaBuilder::new()
            .add_filter("product_id", Condition::Eq(10_i64.into()))
            .add_filter("pack_size", Condition::Gt(2_u32.into()))
            .add_sort_order("sort_order", SortDirection::Desc)
            .set_page_size(5)
            .set_current_page(2)
            .create();

        assert_eq!(criteria.filter_groups.len(), 2);
        assert_eq!(criteria.sort_orders[0].direction, SortDirection::Desc);
        assert_eq!(criteria.page_size, Some(5));
        assert_eq!(criteria.current_page, Some(2));
    }

    #[test]
    fn criteria_deserialize_from_json() {
        let criteria: SearchCriteria = serde_json::from_str(
            r#"{
                "filter_groups": [
                    { "filters": [
                        { "field": "discount_type", "condition_type": "eq", "value": "fixed" },
                        { "field": "pack_size", "condition_type": "in", "value": [6, 12] }
                    ] },
                    { "filters": [ { "field": "sort_order", "condition_type": "notnull" } ] }
                ],
                "sort_orders": [ { "field": "pack_size", "direction": "DESC" } ],
                "page_size": 20
            }"#,
        )
        .unwrap();

        let first_group = &criteria.filter_groups[0].filters;
        assert_eq!(
            first_group[0].condition,
            Condition::Eq(FilterValue::Text("fixed".to_string()))
        );
        assert_eq!(
            first_group[1].condition,
            Condition::In(vec![FilterValue::Integer(6), FilterValue::Integer(12)])
        );
        assert_eq!(
            criteria.filter_groups[1].filters[0].condition,
            Condition::NotNull
        );
        assert_eq!(criteria.sort_orders[0].direction, SortDirection::Desc);
        assert_eq!(criteria.page_size, Some(20));
        assert_eq!(criteria.current_page, None);
    }
}
