//! The built-in retail star schema (version 1).

use super::definition::RegistryDefinition;
use crate::model::{
    AggregateFunction, BaseFilter, Dimension, FactTable, JoinKind, Metric, TableLink,
};
use crate::sql::TimeGrain;

const FACT: &str = "transactions";

impl RegistryDefinition {
    /// Sales transactions joined to stores, line items, products, brands,
    /// categories and clients.
    pub fn retail() -> Self {
        let tables = vec![
            TableLink::new("stores", "s", FACT, "store_id", "id"),
            TableLink::new("transaction_items", "ti", FACT, "id", "transaction_id"),
            TableLink::new("products", "p", "transaction_items", "product_id", "id"),
            TableLink::new("brands", "b", "products", "brand_id", "id"),
            TableLink::new("categories", "c", "products", "category_id", "id"),
            TableLink::new("clients", "cl", "brands", "client_id", "id").with_kind(JoinKind::Left),
        ];

        let dimensions = vec![
            // Geography
            Dimension::new("region", "stores", "region", "region"),
            Dimension::new("city", "stores", "city", "city").with_parent("region"),
            Dimension::new("barangay", "stores", "barangay", "barangay").with_parent("city"),
            Dimension::new("store", "stores", "id", "name")
                .with_parent("barangay")
                .with_filter_field("id"),
            Dimension::new("store_type", "stores", "store_type", "store_type"),
            // Product
            Dimension::new("category", "categories", "id", "name"),
            Dimension::new("product", "products", "id", "name").with_parent("category"),
            // Client
            Dimension::new("client", "clients", "id", "name"),
            Dimension::new("brand", "brands", "id", "name").with_parent("client"),
            // Time
            Dimension::new("year", FACT, "created_at", "created_at").with_grain(TimeGrain::Year),
            Dimension::new("month", FACT, "created_at", "created_at")
                .with_parent("year")
                .with_grain(TimeGrain::Month),
            Dimension::new("day", FACT, "created_at", "created_at")
                .with_parent("month")
                .with_grain(TimeGrain::Day),
            Dimension::new("hour", FACT, "created_at", "created_at").with_grain(TimeGrain::Hour),
            Dimension::new("payment_method", FACT, "payment_method", "payment_method"),
        ];

        let metrics = vec![
            Metric::new("revenue", AggregateFunction::Sum, FACT, "total_amount"),
            Metric::new("transactions", AggregateFunction::Count, FACT, "id").distinct(),
            Metric::new("units_sold", AggregateFunction::Sum, "transaction_items", "quantity"),
            Metric::new("avg_basket", AggregateFunction::Avg, FACT, "total_amount"),
            Metric::new("unique_customers", AggregateFunction::Count, FACT, "customer_id")
                .distinct(),
            Metric::new("line_items", AggregateFunction::Count, "transaction_items", "id"),
            Metric::new("min_basket", AggregateFunction::Min, FACT, "total_amount"),
            Metric::new("max_basket", AggregateFunction::Max, FACT, "total_amount"),
        ];

        // Fine-grained geography against fine-grained time explodes the result
        // set; store x product double-counts through the line-item fan-out.
        let incompatible = [
            ("barangay", "day"),
            ("barangay", "hour"),
            ("store", "day"),
            ("store", "hour"),
            ("store", "product"),
        ]
        .iter()
        .map(|(a, b)| [a.to_string(), b.to_string()])
        .collect();

        Self {
            version: 1,
            schema: None,
            date_dimension: Some("day".into()),
            fact: FactTable {
                table: FACT.into(),
                alias: "t".into(),
                base_filter: Some(BaseFilter {
                    column: "status".into(),
                    value: "completed".into(),
                }),
            },
            tables,
            dimensions,
            metrics,
            incompatible,
        }
    }
}
