//! The subset of DynamoDB expressions understood by the in-memory store.
//!
//! Conditions: `a = :v`, `begins_with(a, :v)`, `attribute_exists(a)` and
//! `attribute_not_exists(a)`, joined by `AND`. Updates: `SET a = :v, ...`.
//! Attribute names may be `#placeholders`.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use sharedtable_core::table::Item;

use super::error::InMemoryError;

/// Placeholder bindings of one request.
pub(super) struct Bindings<'a> {
    names: &'a HashMap<String, String>,
    values: &'a Item,
}

impl<'a> Bindings<'a> {
    pub(super) fn new(names: &'a HashMap<String, String>, values: &'a Item) -> Self {
        Self { names, values }
    }

    fn name(&self, token: &str) -> Result<String, InMemoryError> {
        let token = token.trim();
        if token.starts_with('#') {
            self.names
                .get(token)
                .cloned()
                .ok_or_else(|| InMemoryError::UnboundPlaceholder(token.to_string()))
        } else {
            Ok(token.to_string())
        }
    }

    fn value(&self, token: &str) -> Result<AttributeValue, InMemoryError> {
        let token = token.trim();
        self.values
            .get(token)
            .cloned()
            .ok_or_else(|| InMemoryError::UnboundPlaceholder(token.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Condition {
    Equals {
        attribute: String,
        value: AttributeValue,
    },
    BeginsWith {
        attribute: String,
        prefix: String,
    },
    Exists(String),
    NotExists(String),
}

impl Condition {
    pub(super) fn matches(&self, item: &Item) -> bool {
        match self {
            Condition::Equals { attribute, value } => item.get(attribute) == Some(value),
            Condition::BeginsWith { attribute, prefix } => matches!(
                item.get(attribute),
                Some(AttributeValue::S(s)) if s.starts_with(prefix.as_str())
            ),
            Condition::Exists(attribute) => item.contains_key(attribute),
            Condition::NotExists(attribute) => !item.contains_key(attribute),
        }
    }
}

/// Parse an `AND`-joined condition expression.
pub(super) fn parse_conditions(
    expression: &str,
    bindings: &Bindings<'_>,
) -> Result<Vec<Condition>, InMemoryError> {
    split_and(expression)
        .into_iter()
        .map(|clause| parse_clause(clause, bindings))
        .collect()
}

fn parse_clause(clause: &str, bindings: &Bindings<'_>) -> Result<Condition, InMemoryError> {
    let unsupported = || InMemoryError::UnsupportedExpression(clause.to_string());

    if let Some(args) = function_args(clause, "begins_with") {
        let (name, value) = args.split_once(',').ok_or_else(unsupported)?;
        let AttributeValue::S(prefix) = bindings.value(value)? else {
            return Err(unsupported());
        };
        return Ok(Condition::BeginsWith {
            attribute: bindings.name(name)?,
            prefix,
        });
    }
    if let Some(name) = function_args(clause, "attribute_exists") {
        return Ok(Condition::Exists(bindings.name(name)?));
    }
    if let Some(name) = function_args(clause, "attribute_not_exists") {
        return Ok(Condition::NotExists(bindings.name(name)?));
    }

    let (name, value) = clause.split_once('=').ok_or_else(unsupported)?;
    if name.contains(['<', '>', '!']) {
        return Err(unsupported());
    }
    Ok(Condition::Equals {
        attribute: bindings.name(name)?,
        value: bindings.value(value)?,
    })
}

/// Parse `SET a = :v, #b = :w` into attribute assignments.
pub(super) fn parse_set(
    expression: &str,
    bindings: &Bindings<'_>,
) -> Result<Vec<(String, AttributeValue)>, InMemoryError> {
    let trimmed = expression.trim();
    let assignments = trimmed
        .get(..4)
        .filter(|head| head.eq_ignore_ascii_case("set "))
        .map(|_| &trimmed[4..])
        .ok_or_else(|| InMemoryError::UnsupportedExpression(expression.to_string()))?;

    assignments
        .split(',')
        .map(|assignment| {
            let (name, value) = assignment
                .split_once('=')
                .ok_or_else(|| InMemoryError::UnsupportedExpression(assignment.to_string()))?;
            Ok((bindings.name(name)?, bindings.value(value)?))
        })
        .collect()
}

/// Resolve a projection expression into attribute names.
pub(super) fn parse_projection(
    expression: &str,
    bindings: &Bindings<'_>,
) -> Result<Vec<String>, InMemoryError> {
    expression
        .split(',')
        .map(|name| bindings.name(name))
        .collect()
}

fn function_args<'e>(clause: &'e str, function: &str) -> Option<&'e str> {
    clause
        .trim()
        .strip_prefix(function)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn split_and(expression: &str) -> Vec<&str> {
    let lower = expression.to_ascii_lowercase();
    let mut parts = Vec::new();
    let mut start = 0;

    while let Some(pos) = lower[start..].find(" and ") {
        parts.push(expression[start..start + pos].trim());
        start += pos + " and ".len();
    }
    parts.push(expression[start..].trim());
    parts
}
