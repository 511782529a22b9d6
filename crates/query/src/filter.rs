//! Filter - PostgREST horizontal filtering
//!
//! A filter is rendered as one query pair `column=operator.value`, e.g.
//! `tipo=eq.film`, `regista=is.null`, `titolo=ilike.*bellezza*` or
//! `id=in.(1,2,3)`.

use regex::Regex;
use shared::{InvalidFilterError, Result};
use std::fmt;

/// Plain column names plus JSON path access (`metadati->>id_opera_staging`)
fn is_valid_column(name: &str) -> bool {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(->>?[A-Za-z0-9_]+)*$")
        .map(|r| r.is_match(name))
        .unwrap_or(false)
}

/// Right-hand side of `is.`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsValue {
    Null,
    True,
    False,
}

impl IsValue {
    fn as_str(&self) -> &'static str {
        match self {
            IsValue::Null => "null",
            IsValue::True => "true",
            IsValue::False => "false",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "null" => Some(IsValue::Null),
            "true" => Some(IsValue::True),
            "false" => Some(IsValue::False),
            _ => None,
        }
    }
}

/// Comparison operator together with its operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Eq(String),
    Neq(String),
    Gt(String),
    Gte(String),
    Lt(String),
    Lte(String),
    /// Case-sensitive pattern, `*` is the wildcard
    Like(String),
    /// Case-insensitive pattern, `*` is the wildcard
    Ilike(String),
    Is(IsValue),
    In(Vec<String>),
}

impl Operator {
    /// Operator keyword as it appears on the wire
    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::Eq(_) => "eq",
            Operator::Neq(_) => "neq",
            Operator::Gt(_) => "gt",
            Operator::Gte(_) => "gte",
            Operator::Lt(_) => "lt",
            Operator::Lte(_) => "lte",
            Operator::Like(_) => "like",
            Operator::Ilike(_) => "ilike",
            Operator::Is(_) => "is",
            Operator::In(_) => "in",
        }
    }

    fn operand(&self) -> String {
        match self {
            Operator::Eq(v)
            | Operator::Neq(v)
            | Operator::Gt(v)
            | Operator::Gte(v)
            | Operator::Lt(v)
            | Operator::Lte(v)
            | Operator::Like(v)
            | Operator::Ilike(v) => v.clone(),
            Operator::Is(v) => v.as_str().to_string(),
            Operator::In(values) => {
                let items: Vec<String> = values.iter().map(|v| quote_list_item(v)).collect();
                format!("({})", items.join(","))
            }
        }
    }

    /// Build an operator from its keyword and raw operand.
    ///
    /// Returns `Ok(None)` when the keyword is not a known operator.
    fn from_parts(keyword: &str, operand: &str, expression: &str) -> Result<Option<Self>> {
        let op = match keyword {
            "eq" => Operator::Eq(operand.to_string()),
            "neq" => Operator::Neq(operand.to_string()),
            "gt" => Operator::Gt(operand.to_string()),
            "gte" => Operator::Gte(operand.to_string()),
            "lt" => Operator::Lt(operand.to_string()),
            "lte" => Operator::Lte(operand.to_string()),
            "like" => Operator::Like(operand.to_string()),
            "ilike" => Operator::Ilike(operand.to_string()),
            "is" => Operator::Is(IsValue::parse(operand).ok_or_else(|| InvalidFilterError {
                expression: expression.to_string(),
                reason: format!("'is' expects null, true or false, got '{}'", operand),
            })?),
            "in" => Operator::In(parse_list(operand, expression)?),
            _ => return Ok(None),
        };
        Ok(Some(op))
    }
}

/// A single `column=operator.value` filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    column: String,
    operator: Operator,
    negated: bool,
}

impl Filter {
    /// Create a filter on `column`
    pub fn new(column: impl Into<String>, operator: Operator) -> Self {
        Self {
            column: column.into(),
            operator,
            negated: false,
        }
    }

    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Self::new(column, Operator::Eq(value.to_string()))
    }

    pub fn neq(column: impl Into<String>, value: impl ToString) -> Self {
        Self::new(column, Operator::Neq(value.to_string()))
    }

    pub fn gt(column: impl Into<String>, value: impl ToString) -> Self {
        Self::new(column, Operator::Gt(value.to_string()))
    }

    pub fn gte(column: impl Into<String>, value: impl ToString) -> Self {
        Self::new(column, Operator::Gte(value.to_string()))
    }

    pub fn lt(column: impl Into<String>, value: impl ToString) -> Self {
        Self::new(column, Operator::Lt(value.to_string()))
    }

    pub fn lte(column: impl Into<String>, value: impl ToString) -> Self {
        Self::new(column, Operator::Lte(value.to_string()))
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, Operator::Like(pattern.into()))
    }

    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, Operator::Ilike(pattern.into()))
    }

    /// Case-insensitive substring match, rendered as `ilike.*text*`
    pub fn contains(column: impl Into<String>, text: &str) -> Self {
        Self::ilike(column, format!("*{}*", text))
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, Operator::Is(IsValue::Null))
    }

    pub fn in_list<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self::new(column, Operator::In(values.into_iter().map(|v| v.to_string()).collect()))
    }

    /// Negate the filter (`not.` prefix)
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Query-string value, e.g. `eq.film` or `not.is.null`
    pub fn value(&self) -> String {
        let rendered = format!("{}.{}", self.operator.keyword(), self.operator.operand());
        if self.negated {
            format!("not.{}", rendered)
        } else {
            rendered
        }
    }

    /// Query pair `(column, value)`
    pub fn to_pair(&self) -> (String, String) {
        (self.column.clone(), self.value())
    }

    /// Parse `column=op.value`, `column=not.op.value` or `column=value`
    /// (the last one is an equality filter).
    pub fn parse(expression: &str) -> Result<Self> {
        let invalid = |reason: &str| InvalidFilterError {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let (column, rhs) = expression
            .split_once('=')
            .ok_or_else(|| invalid("expected column=operator.value"))?;
        let column = column.trim();
        if !is_valid_column(column) {
            return Err(invalid("column name is not a valid identifier").into());
        }

        if let Some(rest) = rhs.strip_prefix("not.") {
            let (keyword, operand) = rest
                .split_once('.')
                .ok_or_else(|| invalid("'not.' must be followed by operator.value"))?;
            let operator = Operator::from_parts(keyword, operand, expression)?
                .ok_or_else(|| invalid(&format!("unknown operator '{}'", keyword)))?;
            return Ok(Self::new(column, operator).not());
        }

        if let Some((keyword, operand)) = rhs.split_once('.') {
            if let Some(operator) = Operator::from_parts(keyword, operand, expression)? {
                return Ok(Self::new(column, operator));
            }
        }

        Ok(Self::eq(column, rhs))
    }

    /// Equality filters from `column -> value` pairs, ordered by column
    pub fn equalities<I, K, V>(pairs: I) -> Vec<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let mut filters: Vec<Self> = pairs.into_iter().map(|(k, v)| Self::eq(k, v)).collect();
        filters.sort_by(|a, b| a.column.cmp(&b.column));
        filters
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.column, self.value())
    }
}

fn needs_quotes(item: &str) -> bool {
    item.is_empty()
        || item.trim() != item
        || item.chars().any(|c| matches!(c, ',' | '(' | ')' | '"' | '\\'))
}

fn quote_list_item(item: &str) -> String {
    if !needs_quotes(item) {
        return item.to_string();
    }
    let escaped = item.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Split the operand of `in.` (`(a,b,"c,d")`) into its items.
fn parse_list(operand: &str, expression: &str) -> Result<Vec<String>> {
    let inner = operand
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| InvalidFilterError {
            expression: expression.to_string(),
            reason: "'in' expects a parenthesized list".to_string(),
        })?;

    if inner.is_empty() {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(InvalidFilterError {
            expression: expression.to_string(),
            reason: "unterminated quote in list".to_string(),
        }
        .into());
    }
    items.push(current);

    Ok(items)
}
