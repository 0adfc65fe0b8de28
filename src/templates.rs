//! Named `QueryConfig` presets for the common retail dashboards.

use crate::model::{OrderBy, QueryConfig};

struct Template {
    name: &'static str,
    description: &'static str,
    build: fn() -> QueryConfig,
}

const TEMPLATES: &[Template] = &[
    Template {
        name: "regional_sales_by_month",
        description: "Revenue and transaction count per region per month",
        build: regional_sales_by_month,
    },
    Template {
        name: "category_mix",
        description: "Revenue and units sold per product category",
        build: category_mix,
    },
    Template {
        name: "store_coverage",
        description: "Transactions and unique customers per store, busiest first",
        build: store_coverage,
    },
    Template {
        name: "brand_performance",
        description: "Top brands by revenue with their client",
        build: brand_performance,
    },
    Template {
        name: "hourly_pattern",
        description: "Transactions and average basket by hour of day",
        build: hourly_pattern,
    },
];

/// `(name, description)` for every template, in a stable order.
pub fn all() -> Vec<(&'static str, &'static str)> {
    TEMPLATES.iter().map(|t| (t.name, t.description)).collect()
}

pub fn get(name: &str) -> Option<QueryConfig> {
    TEMPLATES
        .iter()
        .find(|t| t.name == name)
        .map(|t| (t.build)())
}

pub fn regional_sales_by_month() -> QueryConfig {
    QueryConfig::new()
        .metrics(&["revenue", "transactions"])
        .dimensions(&["region", "month"])
        .order_by(OrderBy::asc("region"))
        .order_by(OrderBy::asc("month"))
}

pub fn category_mix() -> QueryConfig {
    QueryConfig::new()
        .metrics(&["revenue", "units_sold"])
        .dimension("category")
        .order_by(OrderBy::desc("revenue"))
}

pub fn store_coverage() -> QueryConfig {
    QueryConfig::new()
        .metrics(&["transactions", "unique_customers"])
        .dimensions(&["region", "store"])
        .order_by(OrderBy::desc("transactions"))
        .limit(50)
}

pub fn brand_performance() -> QueryConfig {
    QueryConfig::new()
        .metrics(&["revenue", "units_sold", "avg_basket"])
        .dimensions(&["client", "brand"])
        .order_by(OrderBy::desc("revenue"))
        .limit(20)
}

pub fn hourly_pattern() -> QueryConfig {
    QueryConfig::new()
        .metrics(&["transactions", "avg_basket"])
        .dimension("hour")
        .order_by(OrderBy::asc("hour"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile_with, CompileOptions};
    use crate::registry::DimensionRegistry;
    use crate::sql::test_utils::validate_sql;
    use crate::sql::Dialect;

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = all().into_iter().map(|(name, _)| name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), TEMPLATES.len());
    }

    #[test]
    fn test_get_unknown() {
        assert!(get("weekly_churn").is_none());
    }

    #[test]
    fn test_every_template_compiles_in_every_dialect() {
        let registry = DimensionRegistry::retail();
        for (name, _) in all() {
            let config = get(name).unwrap();
            for dialect in [
                Dialect::Postgres,
                Dialect::DuckDb,
                Dialect::Sqlite,
                Dialect::MySql,
                Dialect::TSql,
            ] {
                let compiled = compile_with(
                    &config,
                    &registry,
                    &CompileOptions::default().with_dialect(dialect),
                )
                .unwrap_or_else(|e| panic!("{name} failed on {dialect}: {e}"));
                validate_sql(compiled.sql(), dialect)
                    .unwrap_or_else(|e| panic!("{name} invalid on {dialect}: {e}"));
            }
        }
    }

    #[test]
    fn test_category_mix_joins_through_items() {
        let compiled =
            crate::compiler::compile(&category_mix(), &DimensionRegistry::retail()).unwrap();
        let tables: Vec<_> = compiled.joins().iter().map(|j| j.table.as_str()).collect();
        assert_eq!(tables, ["transaction_items", "products", "categories"]);
    }
}
