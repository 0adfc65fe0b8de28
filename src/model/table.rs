//! The injectable table map: fact table plus links to every dimension table.

use serde::{Deserialize, Serialize};

use crate::sql::JoinType;

/// Join kind used when a linked table is pulled into a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
}

impl From<JoinKind> for JoinType {
    fn from(kind: JoinKind) -> Self {
        match kind {
            JoinKind::Inner => JoinType::Inner,
            JoinKind::Left => JoinType::Left,
            JoinKind::Right => JoinType::Right,
        }
    }
}

/// Fixed predicate applied to every query, e.g. `t.status = 'completed'`.
///
/// The value is registry data, not caller input, so it is rendered as a
/// literal rather than a bind parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseFilter {
    pub column: String,
    pub value: String,
}

/// The central table every join chain starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactTable {
    pub table: String,
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_filter: Option<BaseFilter>,
}

/// How `table` attaches to its parent:
/// `parent_alias.parent_column = alias.column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLink {
    pub table: String,
    pub alias: String,
    /// The fact table or another linked table
    pub parent: String,
    pub parent_column: String,
    pub column: String,
    #[serde(default)]
    pub kind: JoinKind,
}

impl TableLink {
    pub fn new(table: &str, alias: &str, parent: &str, parent_column: &str, column: &str) -> Self {
        Self {
            table: table.into(),
            alias: alias.into(),
            parent: parent.into(),
            parent_column: parent_column.into(),
            column: column.into(),
            kind: JoinKind::Inner,
        }
    }

    pub fn with_kind(mut self, kind: JoinKind) -> Self {
        self.kind = kind;
        self
    }
}
