//! Join resolution: the tables a request structurally needs, parent first.

use std::collections::HashSet;

use super::output::JoinClause;
use super::CompileState;
use crate::registry::DimensionRegistry;

/// Collect the join chain of every table the request touches.
///
/// For each referenced dimension the whole hierarchy path is walked, and each
/// table on it is expanded to its link chain from the fact table. Metric
/// tables come last. A table reached more than once is joined once, at its
/// first position; the fact table is never joined. The date range
/// dimension, when it lives off the fact table, joins after the filters.
pub(crate) fn resolve_joins<'r>(
    state: CompileState<'r>,
    registry: &'r DimensionRegistry,
) -> CompileState<'r> {
    let path_tables = state
        .resolved
        .referenced_dimensions()
        .into_iter()
        .chain(state.resolved.date_range.as_ref().map(|range| range.dimension))
        .flat_map(|dim| registry.hierarchy_path(&dim.id).unwrap_or_default())
        .map(|dim| dim.table.as_str());
    let metric_tables = state.resolved.metrics.iter().map(|m| m.table.as_str());

    let mut seen = HashSet::new();
    let mut joins = Vec::new();
    for table in path_tables.chain(metric_tables) {
        for link in registry.table_chain(table).unwrap_or_default() {
            if !seen.insert(link.table.as_str()) {
                continue;
            }
            joins.push(JoinClause {
                table: link.table.clone(),
                alias: link.alias.clone(),
                kind: link.kind,
                parent_alias: registry.alias_of(&link.parent).unwrap_or(&link.parent).to_string(),
                parent_column: link.parent_column.clone(),
                column: link.column.clone(),
            });
        }
    }

    CompileState { joins, ..state }
}
