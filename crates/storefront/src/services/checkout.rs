//! Order submission gateway.
//!
//! Turns a selected bundle and a shipping form into a Shopify order, then
//! keeps a local snapshot for the admin dashboard. The two collaborators sit
//! behind [`OrderCreator`] and [`OrderRecorder`] so the sequence can run
//! against fakes.
//!
//! Failures never escape as `Err`: every call returns a
//! [`SubmissionOutcome`]. Shopify errors collapse into a generic
//! [`Notice::OrderError`]; a failed local snapshot after a successful order is
//! logged and ignored.
//!
//! There is no retry and no deduplication. Each call generates a fresh
//! [`SubmissionKey`] and sends a new order, so resubmitting after an
//! ambiguous failure can create a second order.

use async_trait::async_trait;
use glyca_core::{
    Checkout, CommerceOrderId, FieldErrors, NewOrderRecord, OrderRecord, ProductOption,
    ShippingForm, Step, SubmissionKey, WizardState,
};
use serde::Serialize;
use tracing::instrument;

use crate::db::{OrderRepository, RepositoryError};
use crate::shopify::{CreatedOrder, OrderDraft, OrderRequest, ShopifyClient, ShopifyError};

/// Creates orders in the commerce backend.
#[async_trait]
pub trait OrderCreator: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<CreatedOrder, ShopifyError>;
}

/// Persists the local order snapshot.
#[async_trait]
pub trait OrderRecorder: Send + Sync {
    async fn record_order(&self, record: &NewOrderRecord) -> Result<OrderRecord, RepositoryError>;
}

#[async_trait]
impl OrderCreator for ShopifyClient {
    async fn create_order(&self, request: &OrderRequest) -> Result<CreatedOrder, ShopifyError> {
        Self::create_order(self, request).await
    }
}

#[async_trait]
impl OrderRecorder for OrderRepository<'_> {
    async fn record_order(&self, record: &NewOrderRecord) -> Result<OrderRecord, RepositoryError> {
        self.upsert(record).await
    }
}

/// User-facing reason a submission did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Notice {
    /// Submission was attempted outside the purchase step.
    NotAtPurchase,
    /// No bundle selected.
    MissingProduct,
    /// Shipping form has invalid fields.
    InvalidShipping { errors: FieldErrors },
    /// Shopify could not be reached or refused the order.
    OrderError,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NotAtPurchase => "Finish the previous steps before ordering.",
            Self::MissingProduct => "Choose a bundle before ordering.",
            Self::InvalidShipping { .. } => "Check the highlighted shipping fields.",
            Self::OrderError => "We could not place your order. Please try again.",
        })
    }
}

/// Result of a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Submitted {
        order_id: CommerceOrderId,
        order_name: String,
    },
    Failed {
        notice: Notice,
    },
}

impl SubmissionOutcome {
    const fn failed(notice: Notice) -> Self {
        Self::Failed { notice }
    }

    /// Whether the order was accepted.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

/// Submits checkouts through an order creator and recorder.
pub struct CheckoutGateway<'a> {
    creator: &'a dyn OrderCreator,
    recorder: &'a dyn OrderRecorder,
}

impl<'a> CheckoutGateway<'a> {
    #[must_use]
    pub fn new(creator: &'a dyn OrderCreator, recorder: &'a dyn OrderRecorder) -> Self {
        Self { creator, recorder }
    }

    /// Submit the selected bundle with the shipping form.
    ///
    /// Nothing is sent unless a product is selected and the form validates.
    pub async fn submit(
        &self,
        product: Option<&'static ProductOption>,
        form: &ShippingForm,
    ) -> SubmissionOutcome {
        let shipping = match form.validate() {
            Ok(shipping) => shipping,
            Err(errors) => return SubmissionOutcome::failed(Notice::InvalidShipping { errors }),
        };
        let Some(product) = product else {
            return SubmissionOutcome::failed(Notice::MissingProduct);
        };

        self.submit_checkout(&Checkout { product, shipping }).await
    }

    /// Create the order, then record it.
    #[instrument(skip(self, checkout), fields(product = checkout.product.id))]
    pub async fn submit_checkout(&self, checkout: &Checkout) -> SubmissionOutcome {
        let submission_key = SubmissionKey::generate();
        let draft = OrderDraft::from_checkout(checkout, submission_key);

        let created = match self.creator.create_order(&draft.to_request()).await {
            Ok(created) => created,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    submission_key = %submission_key,
                    "Order creation failed"
                );
                return SubmissionOutcome::failed(Notice::OrderError);
            }
        };

        let order_id = CommerceOrderId::new(created.id);
        let record =
            NewOrderRecord::from_checkout(checkout, order_id, submission_key, draft.phone());
        if let Err(err) = self.recorder.record_order(&record).await {
            tracing::warn!(
                error = %err,
                shopify_order_id = %order_id,
                "Order created but local record failed"
            );
        }

        SubmissionOutcome::Submitted {
            order_id,
            order_name: created.name,
        }
    }
}

/// Submit from the wizard's purchase step and advance it on success.
///
/// Off the purchase step this fails without contacting anything. An invalid
/// shipping form also has its errors recorded for display.
pub async fn submit_purchase(
    gateway: &CheckoutGateway<'_>,
    state: &mut WizardState,
) -> SubmissionOutcome {
    if state.step() != Step::Purchase {
        return SubmissionOutcome::failed(Notice::NotAtPurchase);
    }

    let outcome = gateway
        .submit(state.selected_product(), &state.shipping)
        .await;

    match &outcome {
        SubmissionOutcome::Submitted { order_id, .. } => {
            state.complete_purchase(*order_id);
        }
        SubmissionOutcome::Failed {
            notice: Notice::InvalidShipping { .. },
        } => {
            if let Err(errors) = state.shipping.submit() {
                tracing::debug!(invalid_fields = errors.len(), "Shipping form rejected");
            }
        }
        SubmissionOutcome::Failed { .. } => {}
    }

    outcome
}
