//! QueryParams - select/filter/order/limit/offset for one request

use crate::filter::Filter;
use shared::{InvalidFilterError, Result};

/// Sort key for the `order` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    /// Parse `column`, `column.asc` or `column.desc`
    pub fn parse(expression: &str) -> Result<Self> {
        let expression = expression.trim();
        let (column, direction) = match expression.rsplit_once('.') {
            Some((column, "asc")) => (column, false),
            Some((column, "desc")) => (column, true),
            _ => (expression, false),
        };

        if column.is_empty() {
            return Err(InvalidFilterError {
                expression: expression.to_string(),
                reason: "order needs a column".to_string(),
            }
            .into());
        }

        Ok(Self {
            column: column.to_string(),
            descending: direction,
        })
    }

    fn render(&self) -> String {
        let direction = if self.descending { "desc" } else { "asc" };
        format!("{}.{}", self.column, direction)
    }
}

/// Query-string parameters for a table request
///
/// Renders to ordered `(key, value)` pairs: `select`, the filters in
/// insertion order, `order`, `limit`, `offset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    select: Vec<String>,
    filters: Vec<Filter>,
    order: Vec<Order>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality filters built from `column -> value` pairs
    pub fn from_equalities<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        Self {
            filters: Filter::equalities(pairs),
            ..Default::default()
        }
    }

    /// Set the column list (`select=a,b,c`)
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the column list from a comma-separated string
    pub fn select_str(self, columns: &str) -> Self {
        self.select(
            columns
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>(),
        )
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters<I: IntoIterator<Item = Filter>>(mut self, filters: I) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn filter_list(&self) -> &[Filter] {
        &self.filters
    }

    pub fn selected_columns(&self) -> &[String] {
        &self.select
    }

    pub fn order_list(&self) -> &[Order] {
        &self.order
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<usize> {
        self.offset
    }

    /// True when at least one row filter is present
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Same filters without select/order/limit/offset.
    ///
    /// Used for counts and mutations, which only care about which rows match.
    pub fn filters_only(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            ..Default::default()
        }
    }

    /// Same query without limit/offset, for `Range`-driven paging
    pub fn without_paging(&self) -> Self {
        Self {
            limit: None,
            offset: None,
            ..self.clone()
        }
    }

    /// Render as ordered query pairs
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 4);

        if !self.select.is_empty() {
            pairs.push(("select".to_string(), self.select.join(",")));
        }

        pairs.extend(self.filters.iter().map(Filter::to_pair));

        if !self.order.is_empty() {
            let order: Vec<String> = self.order.iter().map(Order::render).collect();
            pairs.push(("order".to_string(), order.join(",")));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }

        pairs
    }
}
