//! Dimension Registry: validated, immutable star-schema metadata.
//!
//! The registry answers the questions the compiler asks while resolving a
//! request:
//!
//! - which dimension is `id`, and what is its path from the hierarchy root
//! - may two dimensions appear in the same query
//! - which metric is `id`
//! - which chain of table links connects a table to the fact table
//!
//! It is built once from a [`RegistryDefinition`] and never mutated, so one
//! instance can be shared across threads behind an `Arc`.

mod definition;
mod error;
mod retail;

pub use definition::RegistryDefinition;
pub use error::{RegistryError, RegistryResult};

use std::collections::{HashMap, HashSet};

use crate::model::{Dimension, FactTable, Metric, TableLink};

#[derive(Debug, Clone)]
pub struct DimensionRegistry {
    definition: RegistryDefinition,
    dimension_index: HashMap<String, usize>,
    metric_index: HashMap<String, usize>,
    link_index: HashMap<String, usize>,
    incompatible: HashSet<(String, String)>,
}

/// Order-independent key for an incompatible pair.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl DimensionRegistry {
    /// Validate a definition and build the registry from it.
    pub fn from_definition(definition: RegistryDefinition) -> RegistryResult<Self> {
        validate(&definition)?;
        Ok(Self::index(definition))
    }

    /// The built-in retail registry.
    pub fn retail() -> Self {
        // Covered by test_retail_definition_is_valid.
        Self::index(RegistryDefinition::retail())
    }

    fn index(definition: RegistryDefinition) -> Self {
        let dimension_index = definition
            .dimensions
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i))
            .collect();
        let metric_index = definition
            .metrics
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        let link_index = definition
            .tables
            .iter()
            .enumerate()
            .map(|(i, l)| (l.table.clone(), i))
            .collect();
        let incompatible = definition
            .incompatible
            .iter()
            .map(|[a, b]| pair_key(a, b))
            .collect();

        Self {
            definition,
            dimension_index,
            metric_index,
            link_index,
            incompatible,
        }
    }

    pub fn definition(&self) -> &RegistryDefinition {
        &self.definition
    }

    pub fn version(&self) -> u32 {
        self.definition.version
    }

    pub fn schema(&self) -> Option<&str> {
        self.definition.schema.as_deref()
    }

    pub fn fact(&self) -> &FactTable {
        &self.definition.fact
    }

    /// Dimensions in definition order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.definition.dimensions
    }

    /// Metrics in definition order.
    pub fn metrics(&self) -> &[Metric] {
        &self.definition.metrics
    }

    pub fn get_dimension(&self, id: &str) -> Option<&Dimension> {
        self.dimension_index
            .get(id)
            .map(|&i| &self.definition.dimensions[i])
    }

    pub fn get_metric(&self, id: &str) -> Option<&Metric> {
        self.metric_index
            .get(id)
            .map(|&i| &self.definition.metrics[i])
    }

    /// The dimension date-range requests filter on.
    pub fn date_dimension(&self) -> Option<&Dimension> {
        self.definition
            .date_dimension
            .as_deref()
            .and_then(|id| self.get_dimension(id))
    }

    /// Ordered root -> leaf, inclusive of `id`.
    pub fn hierarchy_path(&self, id: &str) -> Option<Vec<&Dimension>> {
        let mut current = self.get_dimension(id)?;
        let mut path = vec![current];
        while let Some(parent_id) = current.parent_id.as_deref() {
            if path.len() > self.definition.dimensions.len() {
                // unreachable for validated definitions
                return None;
            }
            current = self.get_dimension(parent_id)?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// False iff `{a, b}` is a declared incompatible pair.
    pub fn can_combine(&self, a: &str, b: &str) -> bool {
        a == b || !self.incompatible.contains(&pair_key(a, b))
    }

    pub fn table_link(&self, table: &str) -> Option<&TableLink> {
        self.link_index
            .get(table)
            .map(|&i| &self.definition.tables[i])
    }

    /// Links from the fact table down to `table`, parent first.
    ///
    /// Empty for the fact table itself; `None` for unregistered tables.
    pub fn table_chain(&self, table: &str) -> Option<Vec<&TableLink>> {
        let fact = self.definition.fact.table.as_str();
        let mut chain = Vec::new();
        let mut current = table;
        while current != fact {
            if chain.len() >= self.definition.tables.len() {
                return None;
            }
            let link = self.table_link(current)?;
            chain.push(link);
            current = link.parent.as_str();
        }
        chain.reverse();
        Some(chain)
    }

    pub fn alias_of(&self, table: &str) -> Option<&str> {
        if table == self.definition.fact.table {
            Some(&self.definition.fact.alias)
        } else {
            self.table_link(table).map(|l| l.alias.as_str())
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate(def: &RegistryDefinition) -> RegistryResult<()> {
    let fact = def.fact.table.as_str();

    // Tables and aliases
    let mut tables: HashSet<&str> = HashSet::from([fact]);
    let mut aliases: HashSet<&str> = HashSet::from([def.fact.alias.as_str()]);
    for link in &def.tables {
        if !tables.insert(&link.table) {
            return Err(RegistryError::DuplicateTable(link.table.clone()));
        }
        if !aliases.insert(&link.alias) {
            return Err(RegistryError::DuplicateAlias(link.alias.clone()));
        }
    }

    let links: HashMap<&str, &TableLink> =
        def.tables.iter().map(|l| (l.table.as_str(), l)).collect();
    for link in &def.tables {
        if !tables.contains(link.parent.as_str()) {
            return Err(RegistryError::UnknownLinkParent {
                table: link.table.clone(),
                parent: link.parent.clone(),
            });
        }
        let mut current = link.parent.as_str();
        let mut steps = 0;
        while current != fact {
            steps += 1;
            if current == link.table || steps > def.tables.len() {
                return Err(RegistryError::LinkCycle(link.table.clone()));
            }
            current = match links.get(current) {
                Some(parent) => parent.parent.as_str(),
                None => break,
            };
        }
    }

    // Shared id namespace
    let mut ids: HashSet<&str> = HashSet::new();
    for id in def
        .dimensions
        .iter()
        .map(|d| &d.id)
        .chain(def.metrics.iter().map(|m| &m.id))
    {
        if !ids.insert(id) {
            return Err(RegistryError::DuplicateId(id.clone()));
        }
    }

    let dimensions: HashMap<&str, &Dimension> =
        def.dimensions.iter().map(|d| (d.id.as_str(), d)).collect();
    for dim in &def.dimensions {
        if !tables.contains(dim.table.as_str()) {
            return Err(RegistryError::UnknownTable {
                owner: dim.id.clone(),
                table: dim.table.clone(),
            });
        }
        let mut current = dim;
        let mut steps = 0;
        while let Some(parent_id) = &current.parent_id {
            let Some(parent) = dimensions.get(parent_id.as_str()) else {
                return Err(RegistryError::UnknownParent {
                    dimension: current.id.clone(),
                    parent: parent_id.clone(),
                });
            };
            steps += 1;
            if parent.id == dim.id || steps > def.dimensions.len() {
                return Err(RegistryError::HierarchyCycle(dim.id.clone()));
            }
            current = *parent;
        }
    }

    for metric in &def.metrics {
        if !tables.contains(metric.table.as_str()) {
            return Err(RegistryError::UnknownTable {
                owner: metric.id.clone(),
                table: metric.table.clone(),
            });
        }
    }

    for id in def.incompatible.iter().flatten() {
        if !dimensions.contains_key(id.as_str()) {
            return Err(RegistryError::UnknownIncompatibleDimension(id.clone()));
        }
    }

    if let Some(id) = &def.date_dimension {
        if dimensions.get(id.as_str()).and_then(|d| d.grain).is_none() {
            return Err(RegistryError::InvalidDateDimension(id.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AggregateFunction, JoinKind};

    fn ids(path: &[&Dimension]) -> Vec<String> {
        path.iter().map(|d| d.id.clone()).collect()
    }

    #[test]
    fn test_retail_definition_is_valid() {
        DimensionRegistry::from_definition(RegistryDefinition::retail()).unwrap();
    }

    #[test]
    fn test_get_dimension() {
        let registry = DimensionRegistry::retail();
        let store = registry.get_dimension("store").unwrap();
        assert_eq!(store.table, "stores");
        assert_eq!(store.display_field, "name");
        assert_eq!(store.filter_field.as_deref(), Some("id"));
        assert!(registry.get_dimension("nonexistent").is_none());
    }

    #[test]
    fn test_hierarchy_path_root_to_leaf() {
        let registry = DimensionRegistry::retail();
        let path = registry.hierarchy_path("barangay").unwrap();
        assert_eq!(ids(&path), vec!["region", "city", "barangay"]);

        let path = registry.hierarchy_path("brand").unwrap();
        assert_eq!(ids(&path), vec!["client", "brand"]);

        let path = registry.hierarchy_path("region").unwrap();
        assert_eq!(ids(&path), vec!["region"]);

        assert!(registry.hierarchy_path("nonexistent").is_none());
    }

    #[test]
    fn test_can_combine_is_symmetric() {
        let registry = DimensionRegistry::retail();
        assert!(!registry.can_combine("store", "day"));
        assert!(!registry.can_combine("day", "store"));
        assert!(registry.can_combine("region", "month"));
        assert!(registry.can_combine("store", "store"));
    }

    #[test]
    fn test_table_chain_parent_first() {
        let registry = DimensionRegistry::retail();
        let chain: Vec<&str> = registry
            .table_chain("clients")
            .unwrap()
            .iter()
            .map(|l| l.table.as_str())
            .collect();
        assert_eq!(
            chain,
            vec!["transaction_items", "products", "brands", "clients"]
        );
        assert!(registry.table_chain("transactions").unwrap().is_empty());
        assert!(registry.table_chain("warehouses").is_none());
    }

    #[test]
    fn test_alias_of() {
        let registry = DimensionRegistry::retail();
        assert_eq!(registry.alias_of("transactions"), Some("t"));
        assert_eq!(registry.alias_of("transaction_items"), Some("ti"));
        assert_eq!(registry.table_link("clients").unwrap().kind, JoinKind::Left);
        assert_eq!(registry.alias_of("warehouses"), None);
    }

    #[test]
    fn test_metric_catalog() {
        let registry = DimensionRegistry::retail();
        let transactions = registry.get_metric("transactions").unwrap();
        assert_eq!(transactions.function, AggregateFunction::Count);
        assert!(transactions.distinct);
        assert_eq!(registry.get_metric("units_sold").unwrap().table, "transaction_items");
        assert_eq!(registry.metrics().len(), 8);
    }

    #[test]
    fn test_date_dimension() {
        let registry = DimensionRegistry::retail();
        assert_eq!(registry.date_dimension().unwrap().id, "day");
    }

    #[test]
    fn test_rejects_unknown_parent() {
        let mut def = RegistryDefinition::retail();
        def.dimensions.push(Dimension::new("aisle", "stores", "aisle", "aisle").with_parent("floor"));
        assert!(matches!(
            DimensionRegistry::from_definition(def),
            Err(RegistryError::UnknownParent { .. })
        ));
    }

    #[test]
    fn test_rejects_hierarchy_cycle() {
        let mut def = RegistryDefinition::retail();
        for dim in def.dimensions.iter_mut() {
            if dim.id == "region" {
                dim.parent_id = Some("city".into());
            }
        }
        assert!(matches!(
            DimensionRegistry::from_definition(def),
            Err(RegistryError::HierarchyCycle(_))
        ));
    }

    #[test]
    fn test_rejects_link_cycle() {
        let mut def = RegistryDefinition::retail();
        for link in def.tables.iter_mut() {
            if link.table == "products" {
                link.parent = "brands".into();
            }
        }
        assert!(matches!(
            DimensionRegistry::from_definition(def),
            Err(RegistryError::LinkCycle(_))
        ));
    }

    #[test]
    fn test_rejects_metric_id_clashing_with_dimension() {
        let mut def = RegistryDefinition::retail();
        def.metrics.push(crate::model::Metric::new(
            "region",
            AggregateFunction::Count,
            "stores",
            "id",
        ));
        assert!(matches!(
            DimensionRegistry::from_definition(def),
            Err(RegistryError::DuplicateId(id)) if id == "region"
        ));
    }

    #[test]
    fn test_rejects_duplicate_alias() {
        let mut def = RegistryDefinition::retail();
        def.tables
            .push(TableLink::new("suppliers", "s", "products", "supplier_id", "id"));
        assert!(matches!(
            DimensionRegistry::from_definition(def),
            Err(RegistryError::DuplicateAlias(alias)) if alias == "s"
        ));
    }

    #[test]
    fn test_rejects_unknown_dimension_table() {
        let mut def = RegistryDefinition::retail();
        def.dimensions
            .push(Dimension::new("warehouse", "warehouses", "id", "name"));
        assert!(matches!(
            DimensionRegistry::from_definition(def),
            Err(RegistryError::UnknownTable { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_incompatible_dimension() {
        let mut def = RegistryDefinition::retail();
        def.incompatible.push(["store".into(), "week".into()]);
        assert!(matches!(
            DimensionRegistry::from_definition(def),
            Err(RegistryError::UnknownIncompatibleDimension(id)) if id == "week"
        ));
    }

    #[test]
    fn test_rejects_non_time_date_dimension() {
        let mut def = RegistryDefinition::retail();
        def.date_dimension = Some("region".into());
        assert!(matches!(
            DimensionRegistry::from_definition(def),
            Err(RegistryError::InvalidDateDimension(_))
        ));
    }
}
