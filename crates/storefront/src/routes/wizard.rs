//! Wizard routes.
//!
//! Every handler loads the visitor's [`WizardState`] from the session,
//! applies one operation, stores the state back and returns a fresh
//! [`WizardView`]. Validation failures are part of the view, not HTTP errors,
//! except for an unknown product which is rejected with 422.

use axum::Json;
use axum::extract::State;
use glyca_core::catalog::ProductView;
use glyca_core::form::{DiabetesType, ShippingUpdate};
use glyca_core::{
    Advance, CommerceOrderId, CountryCode, Field, FieldErrors, Language, ProductId, ProfileForm,
    Step, WizardState,
};
use serde::{Deserialize, Serialize};

use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::WizardSession;
use crate::services::{CheckoutGateway, SubmissionOutcome, submit_purchase};
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// Client-facing snapshot of the wizard.
#[derive(Debug, Serialize)]
pub struct WizardView {
    pub step: Step,
    pub index: usize,
    pub step_count: usize,
    pub progress: f64,
    pub language: Option<Language>,
    pub profile: ProfileForm,
    pub product: Option<ProductView>,
    pub shipping: ShippingView,
    pub errors: FieldErrors,
    pub purchased_order: Option<CommerceOrderId>,
    pub completed: bool,
}

/// Shipping form fields plus the country-dependent choices.
#[derive(Debug, Serialize)]
pub struct ShippingView {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub postal_code: String,
    pub country: CountryCode,
    pub region: String,
    pub city: String,
    pub phone_placeholder: &'static str,
    pub region_choices: Vec<&'static str>,
    pub city_choices: &'static [&'static str],
    pub errors: FieldErrors,
}

impl From<&WizardState> for WizardView {
    fn from(state: &WizardState) -> Self {
        let form = &state.shipping;
        Self {
            step: state.step(),
            index: state.index(),
            step_count: Step::COUNT,
            progress: state.progress_percentage(),
            language: state.language,
            profile: state.profile.clone(),
            product: state.selected_product().map(glyca_core::ProductOption::view),
            shipping: ShippingView {
                first_name: form.first_name.clone(),
                last_name: form.last_name.clone(),
                email: form.email.clone(),
                phone: form.phone.clone(),
                address: form.address.clone(),
                postal_code: form.postal_code.clone(),
                country: form.country(),
                region: form.region().to_string(),
                city: form.city().to_string(),
                phone_placeholder: form.phone_hint(),
                region_choices: form.region_choices().collect(),
                city_choices: form.city_choices(),
                errors: form.errors().clone(),
            },
            errors: state.errors().clone(),
            purchased_order: state.purchased_order(),
            completed: state.is_completed(),
        }
    }
}

/// Result of an operation together with the updated wizard.
#[derive(Debug, Serialize)]
pub struct StepResponse<T> {
    pub result: T,
    pub wizard: WizardView,
}

impl<T> StepResponse<T> {
    fn new(result: T, state: &WizardState) -> Json<Self> {
        Json(Self {
            result,
            wizard: WizardView::from(state),
        })
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    pub step: Step,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub diabetes_type: Option<DiabetesType>,
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub product_id: ProductId,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/wizard`
pub async fn show(wizard: WizardSession) -> Json<WizardView> {
    Json(WizardView::from(&wizard.state))
}

/// `POST /api/wizard/advance`
pub async fn advance(mut wizard: WizardSession) -> Result<Json<StepResponse<Advance>>> {
    let from = wizard.state.step();
    let result = wizard.state.advance();
    add_breadcrumb("wizard", "advance", Some(&[("from", from.as_str())]));
    wizard.save().await?;
    Ok(StepResponse::new(result, &wizard.state))
}

/// `POST /api/wizard/retreat`
pub async fn retreat(mut wizard: WizardSession) -> Result<Json<StepResponse<bool>>> {
    let moved = wizard.state.retreat();
    wizard.save().await?;
    Ok(StepResponse::new(moved, &wizard.state))
}

/// `POST /api/wizard/jump` - returns the step left behind.
pub async fn jump(
    mut wizard: WizardSession,
    Json(request): Json<JumpRequest>,
) -> Result<Json<StepResponse<Step>>> {
    let previous = wizard.state.jump_to(request.step);
    add_breadcrumb("wizard", "jump", Some(&[("to", request.step.as_str())]));
    wizard.save().await?;
    Ok(StepResponse::new(previous, &wizard.state))
}

/// `POST /api/wizard/language`
pub async fn language(
    mut wizard: WizardSession,
    Json(request): Json<LanguageRequest>,
) -> Result<Json<WizardView>> {
    wizard.state.set_language(request.language);
    wizard.save().await?;
    Ok(Json(WizardView::from(&wizard.state)))
}

/// `POST /api/wizard/profile`
pub async fn profile(
    mut wizard: WizardSession,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<WizardView>> {
    if let Some(name) = update.name {
        wizard.state.profile.name = name;
    }
    if update.diabetes_type.is_some() {
        wizard.state.profile.diabetes_type = update.diabetes_type;
    }
    wizard.save().await?;
    Ok(Json(WizardView::from(&wizard.state)))
}

/// `POST /api/wizard/product`
pub async fn product(
    mut wizard: WizardSession,
    Json(request): Json<ProductRequest>,
) -> Result<Json<WizardView>> {
    wizard
        .state
        .select_product(request.product_id)
        .map_err(|error| AppError::Validation(FieldErrors::single(Field::Product, error)))?;
    wizard.save().await?;
    Ok(Json(WizardView::from(&wizard.state)))
}

/// `POST /api/wizard/shipping` - partial update, country then region then city.
pub async fn shipping(
    mut wizard: WizardSession,
    Json(update): Json<ShippingUpdate>,
) -> Result<Json<WizardView>> {
    wizard.state.shipping.apply(update);
    wizard.save().await?;
    Ok(Json(WizardView::from(&wizard.state)))
}

/// `POST /api/wizard/shipping/phone/blur`
pub async fn blur_phone(mut wizard: WizardSession) -> Result<Json<StepResponse<bool>>> {
    let valid = wizard.state.shipping.blur_phone();
    wizard.save().await?;
    Ok(StepResponse::new(valid, &wizard.state))
}

/// `POST /api/wizard/submit` - place the order from the purchase step.
pub async fn submit(
    State(state): State<AppState>,
    mut wizard: WizardSession,
) -> Result<Json<StepResponse<SubmissionOutcome>>> {
    let repository = OrderRepository::new(state.pool());
    let gateway = CheckoutGateway::new(state.shopify(), &repository);

    let outcome = submit_purchase(&gateway, &mut wizard.state).await;
    if let SubmissionOutcome::Submitted { order_name, .. } = &outcome {
        add_breadcrumb("checkout", "order submitted", Some(&[("order", order_name.as_str())]));
    }

    settle_submission(&outcome, wizard.save().await)?;
    Ok(StepResponse::new(outcome, &wizard.state))
}

/// Once Shopify has accepted the order, a failed session write is reported
/// to Sentry and the success still goes back to the visitor.
fn settle_submission(outcome: &SubmissionOutcome, saved: Result<()>) -> Result<()> {
    match saved {
        Err(error) if outcome.is_success() => {
            let event_id = sentry::capture_error(&error);
            tracing::error!(
                error = %error,
                sentry_event_id = %event_id,
                "Order placed but wizard session was not saved"
            );
            Ok(())
        }
        other => other,
    }
}

/// `POST /api/wizard/reset`
pub async fn reset(mut wizard: WizardSession) -> Result<Json<WizardView>> {
    wizard.reset().await?;
    Ok(Json(WizardView::from(&wizard.state)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_wizard_view() {
        let view = WizardView::from(&WizardState::new());
        assert_eq!(view.step, Step::Language);
        assert_eq!(view.index, 0);
        assert_eq!(view.step_count, 7);
        assert!(view.product.is_none());
        assert_eq!(view.shipping.country, CountryCode::PT);
        assert_eq!(view.shipping.phone_placeholder, "912 345 678");
        assert!(view.shipping.region_choices.contains(&"Lisboa"));
        assert!(view.shipping.city_choices.is_empty());
    }

    #[test]
    fn test_view_reflects_selected_product_and_region() {
        let mut state = WizardState::new();
        state.select_product(ProductId::from("compra-2")).unwrap();
        state.shipping.set_region("Porto");

        let view = WizardView::from(&state);
        assert_eq!(view.product.unwrap().id, "compra-2");
        assert!(view.shipping.city_choices.contains(&"Matosinhos"));
    }

    #[test]
    fn test_view_json_field_names() {
        let json = serde_json::to_value(WizardView::from(&WizardState::new())).unwrap();
        assert_eq!(json["step"], "language");
        assert_eq!(json["shipping"]["country"], "PT");
        assert!(json["purchased_order"].is_null());
    }

    #[test]
    fn test_session_failure_after_order_keeps_success() {
        let placed = SubmissionOutcome::Submitted {
            order_id: CommerceOrderId::new(7_000_000_001),
            order_name: "#1001".to_string(),
        };
        let saved = Err(AppError::Internal("session store down".to_string()));
        assert!(settle_submission(&placed, saved).is_ok());
    }

    #[test]
    fn test_session_failure_without_order_is_error() {
        let failed = SubmissionOutcome::Failed {
            notice: crate::services::Notice::OrderError,
        };
        let saved = Err(AppError::Internal("session store down".to_string()));
        assert!(matches!(
            settle_submission(&failed, saved),
            Err(AppError::Internal(_))
        ));
        assert!(settle_submission(&failed, Ok(())).is_ok());
    }

    #[test]
    fn test_shipping_update_deserializes_partial() {
        let update: ShippingUpdate =
            serde_json::from_str(r#"{"country":"ES","phone":"612 345 678"}"#).unwrap();
        assert_eq!(update.country.as_deref(), Some("ES"));
        assert!(update.region.is_none());
    }
}
