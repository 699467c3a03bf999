//! Order dashboard route handlers.
//!
//! Orders here are the local snapshots written at checkout. Status is purely
//! an admin annotation: changing it never calls Shopify.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use glyca_core::{OrderRecord, OrderRecordId, OrderStatus};
use glyca_storefront::db::{OrderFilter, OrderRepository, RepositoryError};
use glyca_storefront::services::OrderCreator;
use glyca_storefront::shopify::{CreatedOrder, OrderDraft};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::address::{AddressQuery, AddressVerdict};
use crate::error::{AppError, Result};
use crate::state::AppState;

// =============================================================================
// Requests / Responses
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Address check result for one order.
#[derive(Debug, Serialize)]
pub struct AddressCheck {
    pub order_id: OrderRecordId,
    pub address: AddressQuery,
    #[serde(flatten)]
    pub verdict: AddressVerdict,
}

/// Result of exporting a record to Shopify.
///
/// `synced` is false when the Shopify order exists but the local record
/// could not be marked; `order` is then the record as it was before export.
#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub shopify_order: CreatedOrder,
    pub order: OrderRecord,
    pub synced: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/orders`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<OrderRecord>>> {
    let orders = OrderRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderRecordId>,
) -> Result<Json<OrderRecord>> {
    Ok(Json(load(&state, id).await?))
}

/// `POST /api/orders/{id}/status`
#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderRecordId>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<OrderRecord>> {
    let order = OrderRepository::new(state.pool())
        .update_status(id, update.status)
        .await?;
    tracing::info!(order_id = %id, status = %update.status, "Order status updated");
    Ok(Json(order))
}

/// `POST /api/orders/{id}/validate-address`
#[instrument(skip(state))]
pub async fn validate_address(
    State(state): State<AppState>,
    Path(id): Path<OrderRecordId>,
) -> Result<Json<AddressCheck>> {
    let client = state
        .address()
        .ok_or_else(|| AppError::Unavailable("address validation is not configured".to_string()))?;

    let order = load(&state, id).await?;
    let address = AddressQuery::from(&order);
    let verdict = client.validate(&address).await?;

    Ok(Json(AddressCheck {
        order_id: id,
        address,
        verdict,
    }))
}

/// `POST /api/orders/{id}/export`
#[instrument(skip(state))]
pub async fn export(
    State(state): State<AppState>,
    Path(id): Path<OrderRecordId>,
) -> Result<Json<ExportResult>> {
    let repository = OrderRepository::new(state.pool());
    let record = load(&state, id).await?;

    let created = export_record(state.shopify(), &record).await?;
    let marked = repository.mark_synced(id, created.id.into()).await;

    Ok(Json(finish_export(record, created, marked)))
}

// =============================================================================
// Helpers
// =============================================================================

async fn load(state: &AppState, id: OrderRecordId) -> Result<OrderRecord> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

/// Build the export response once Shopify has created the order.
///
/// A failed sync flag never hides the created order from the caller.
fn finish_export(
    record: OrderRecord,
    created: CreatedOrder,
    marked: std::result::Result<OrderRecord, RepositoryError>,
) -> ExportResult {
    match marked {
        Ok(order) => ExportResult {
            shopify_order: created,
            order,
            synced: true,
        },
        Err(error) => {
            let event_id = sentry::capture_error(&error);
            tracing::error!(
                error = %error,
                order_id = %record.id,
                shopify_order_id = created.id,
                shopify_order = %created.name,
                sentry_event_id = %event_id,
                "Shopify order created but record not marked as synced"
            );
            ExportResult {
                shopify_order: created,
                order: record,
                synced: false,
            }
        }
    }
}

/// Create the Shopify order for a record that was never synced.
///
/// Uses the same payload mapping as checkout submission.
///
/// # Errors
///
/// Returns `AppError::Conflict` if the record is already synced,
/// `AppError::BadRequest` if its product, country or phone no longer
/// resolve, or `AppError::Shopify` if Shopify rejects the order.
pub async fn export_record(
    creator: &dyn OrderCreator,
    record: &OrderRecord,
) -> Result<CreatedOrder> {
    if record.shopify_synced {
        return Err(AppError::Conflict(format!(
            "order {} is already in Shopify",
            record.id
        )));
    }

    let draft = OrderDraft::from_record(record).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let created = creator.create_order(&draft.to_request()).await?;

    tracing::info!(
        order_id = %record.id,
        shopify_order = %created.name,
        "Order exported to Shopify"
    );
    Ok(created)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use glyca_core::SubmissionKey;
    use glyca_storefront::shopify::{OrderRequest, ShopifyError};
    use rust_decimal::Decimal;

    use super::*;

    #[derive(Default)]
    struct FakeCreator {
        requests: Mutex<Vec<OrderRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl OrderCreator for FakeCreator {
        async fn create_order(
            &self,
            request: &OrderRequest,
        ) -> std::result::Result<CreatedOrder, ShopifyError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(ShopifyError::UserError(
                    "line_items: variant is unavailable".to_string(),
                ));
            }
            Ok(CreatedOrder {
                id: 5_500_000_001,
                name: "#1042".to_string(),
                order_number: Some(1042),
            })
        }
    }

    fn record(synced: bool) -> OrderRecord {
        OrderRecord {
            id: OrderRecordId::generate(),
            shopify_order_id: None,
            submission_key: Some(SubmissionKey::generate()),
            product_id: "compra-2".to_string(),
            product_title: "Compra 2".to_string(),
            units: 2,
            total_price: Decimal::from(89),
            shipping_cost: Decimal::ZERO,
            currency: "EUR".to_string(),
            first_name: "Joana".to_string(),
            last_name: "Costa".to_string(),
            email: Some("joana@glyca.test".to_string()),
            phone: "912 345 678".to_string(),
            address: "Rua Brito Capelo 100".to_string(),
            region: "Porto".to_string(),
            city: "Matosinhos".to_string(),
            postal_code: "4450-000".to_string(),
            country: "PT".to_string(),
            status: OrderStatus::Pending,
            shopify_synced: synced,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_export_sends_checkout_payload() {
        let creator = FakeCreator::default();
        let record = record(false);

        let created = export_record(&creator, &record).await.unwrap();
        assert_eq!(created.name, "#1042");

        let requests = creator.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let order = &requests.first().unwrap().order;
        assert_eq!(order.phone, "+351912345678");
        assert_eq!(order.line_items.len(), 1);
        assert!(order.shipping_lines.is_empty());
    }

    #[tokio::test]
    async fn test_export_rejects_synced_record_without_calling_shopify() {
        let creator = FakeCreator::default();

        let result = export_record(&creator, &record(true)).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert!(creator.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_rejects_unresolvable_record() {
        let creator = FakeCreator::default();
        let mut record = record(false);
        record.phone = "12345".to_string();

        let result = export_record(&creator, &record).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(creator.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_surfaces_shopify_error() {
        let creator = FakeCreator {
            fail: true,
            ..FakeCreator::default()
        };

        let result = export_record(&creator, &record(false)).await;
        assert!(matches!(
            result,
            Err(AppError::Shopify(ShopifyError::UserError(_)))
        ));
    }

    #[tokio::test]
    async fn test_export_reports_created_order_when_marking_fails() {
        let creator = FakeCreator::default();
        let record = record(false);

        let created = export_record(&creator, &record).await.unwrap();
        let marked = Err(RepositoryError::DataCorruption("lost write".to_string()));
        let result = finish_export(record.clone(), created, marked);

        assert!(!result.synced);
        assert_eq!(result.shopify_order.id, 5_500_000_001);
        assert_eq!(result.order.id, record.id);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["synced"], false);
        assert_eq!(json["shopify_order"]["name"], "#1042");
    }

    #[tokio::test]
    async fn test_export_marks_record_synced() {
        let creator = FakeCreator::default();
        let record = record(false);

        let created = export_record(&creator, &record).await.unwrap();
        let mut synced = record.clone();
        synced.shopify_synced = true;
        synced.shopify_order_id = Some(created.id.into());
        let result = finish_export(record, created, Ok(synced));

        assert!(result.synced);
        assert!(result.order.shopify_synced);
    }

    #[test]
    fn test_status_update_deserializes() {
        let update: StatusUpdate = serde_json::from_str(r#"{"status":"shipped"}"#).unwrap();
        assert_eq!(update.status, OrderStatus::Shipped);
        assert!(serde_json::from_str::<StatusUpdate>(r#"{"status":"lost"}"#).is_err());
    }

    #[test]
    fn test_address_check_flattens_verdict() {
        let check = AddressCheck {
            order_id: OrderRecordId::generate(),
            address: AddressQuery::from(&record(false)),
            verdict: AddressVerdict {
                is_valid: true,
                suggested_address: None,
                issues: vec![],
            },
        };
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["isValid"], true);
        assert_eq!(json["address"]["postalCode"], "4450-000");
    }
}
