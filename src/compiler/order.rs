//! ORDER BY stage.

use super::output::OrderItem;
use super::CompileState;
use crate::model::SortDirection;
use crate::sql::expr::col;
use crate::sql::{OrderByExpr, SortDir};

/// Order by the output alias of each resolved target, in request order.
pub(crate) fn build_order_by(state: CompileState<'_>) -> CompileState<'_> {
    let order_by = state.resolved.order_by.iter().map(order_expr).collect();
    CompileState { order_by, ..state }
}

fn order_expr(item: &OrderItem) -> OrderByExpr {
    let dir = match item.direction {
        SortDirection::Asc => SortDir::Asc,
        SortDirection::Desc => SortDir::Desc,
    };
    OrderByExpr::new(col(&item.alias), dir)
}
