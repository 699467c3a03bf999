//! Product catalog route.

use axum::Json;
use glyca_core::CATALOG;
use glyca_core::catalog::ProductView;

/// `GET /api/catalog` - bundles in display order.
pub async fn index() -> Json<Vec<ProductView>> {
    Json(CATALOG.iter().map(glyca_core::ProductOption::view).collect())
}
