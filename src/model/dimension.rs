// src/model/dimension.rs
use serde::{Deserialize, Serialize};

use crate::sql::TimeGrain;

/// A categorical axis for grouping and filtering, backed by one table.
///
/// Dimensions form a forest through `parent_id`: `region -> city -> barangay`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: String,
    /// Backing table (the fact table or a registered link)
    pub table: String,
    pub key_field: String,
    /// Column selected and grouped by
    pub display_field: String,
    /// Column compared by filters; falls back to the select expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Set for time dimensions: the display field is bucketed to this grain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grain: Option<TimeGrain>,
}

impl Dimension {
    pub fn new(id: &str, table: &str, key_field: &str, display_field: &str) -> Self {
        Self {
            id: id.into(),
            table: table.into(),
            key_field: key_field.into(),
            display_field: display_field.into(),
            filter_field: None,
            parent_id: None,
            grain: None,
        }
    }

    pub fn with_parent(mut self, parent_id: &str) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_filter_field(mut self, field: &str) -> Self {
        self.filter_field = Some(field.into());
        self
    }

    pub fn with_grain(mut self, grain: TimeGrain) -> Self {
        self.grain = Some(grain);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
