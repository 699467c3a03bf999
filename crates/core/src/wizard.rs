//! Onboarding and checkout step sequencer.
//!
//! [`WizardState`] is a plain value: the storefront loads it from the
//! session, applies one transition and stores it back. Forward motion is
//! gated per step; the purchase step only moves forward through
//! [`WizardState::complete_purchase`], which the caller invokes after the
//! order was accepted by the commerce backend.

use serde::{Deserialize, Serialize};

use crate::catalog::{ProductOption, find_product};
use crate::form::{Field, FieldError, FieldErrors, ProfileForm, ShippingForm, ShippingInfo};
use crate::types::{CommerceOrderId, ProductId};

/// Wizard steps, in order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Language,
    Welcome,
    Profile,
    Product,
    Shipping,
    Purchase,
    Tutorial,
}

impl Step {
    pub const ALL: [Self; 7] = [
        Self::Language,
        Self::Welcome,
        Self::Profile,
        Self::Product,
        Self::Shipping,
        Self::Purchase,
        Self::Tutorial,
    ];

    /// Number of steps.
    pub const COUNT: usize = Self::ALL.len();

    /// Position in the sequence.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Step at `index`, if in range.
    #[must_use]
    pub fn at(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::Welcome => "welcome",
            Self::Profile => "profile",
            Self::Product => "product",
            Self::Shipping => "shipping",
            Self::Purchase => "purchase",
            Self::Tutorial => "tutorial",
        }
    }

    #[must_use]
    pub const fn is_last(self) -> bool {
        matches!(self, Self::Tutorial)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("unknown step: {s}"))
    }
}

/// Interface language chosen on the first step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Pt,
    Es,
    Fr,
    It,
    En,
}

/// Result of [`WizardState::advance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Advance {
    /// Moved forward by one step.
    Moved { from: Step, to: Step },
    /// Current step has invalid fields; nothing moved.
    Blocked { errors: FieldErrors },
    /// On the purchase step; forward motion waits for order submission.
    AwaitingSubmission,
    /// Advanced past the last step; the wizard is finished.
    Completed,
}

/// Everything the wizard knows about one visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    step: Step,
    pub language: Option<Language>,
    pub profile: ProfileForm,
    product: Option<ProductId>,
    pub shipping: ShippingForm,
    /// Errors from the last blocked advance on a non-shipping step.
    #[serde(default)]
    errors: FieldErrors,
    purchased: Option<CommerceOrderId>,
    completed: bool,
}

/// A checkout ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub product: &'static ProductOption,
    pub shipping: ShippingInfo,
}

impl WizardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Index of the current step, always in `[0, Step::COUNT - 1]`.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.step.index()
    }

    /// Completion as a percentage: `(index + 1) / len * 100`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // at most 7 steps
    pub fn progress_percentage(&self) -> f64 {
        (self.index() + 1) as f64 / Step::COUNT as f64 * 100.0
    }

    /// Errors from the most recent blocked transition.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub const fn purchased_order(&self) -> Option<CommerceOrderId> {
        self.purchased
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub const fn product_id(&self) -> Option<&ProductId> {
        self.product.as_ref()
    }

    /// The selected catalog entry.
    #[must_use]
    pub fn selected_product(&self) -> Option<&'static ProductOption> {
        self.product.as_ref().and_then(find_product)
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = Some(language);
        self.errors.remove(Field::Language);
    }

    /// Select a catalog product.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::UnknownProduct` (and keeps the previous
    /// selection) when the ID is not in the catalog.
    pub fn select_product(&mut self, id: ProductId) -> Result<(), FieldError> {
        if find_product(&id).is_none() {
            self.errors.insert(Field::Product, FieldError::UnknownProduct);
            return Err(FieldError::UnknownProduct);
        }
        self.product = Some(id);
        self.errors.remove(Field::Product);
        Ok(())
    }

    fn check_step(&mut self) -> Result<(), FieldErrors> {
        match self.step {
            Step::Language if self.language.is_none() => {
                Err(FieldErrors::single(Field::Language, FieldError::Required))
            }
            Step::Profile => self.profile.validate(),
            Step::Product if self.selected_product().is_none() => {
                Err(FieldErrors::single(Field::Product, FieldError::Required))
            }
            Step::Shipping => self.shipping.submit().map(drop),
            _ => Ok(()),
        }
    }

    /// Move forward one step if the current step's fields are valid.
    ///
    /// The purchase step never moves here, and the last step marks the
    /// wizard completed instead of moving.
    pub fn advance(&mut self) -> Advance {
        let from = self.step;
        if from == Step::Purchase {
            return Advance::AwaitingSubmission;
        }
        if let Err(errors) = self.check_step() {
            if from != Step::Shipping {
                self.errors = errors.clone();
            }
            return Advance::Blocked { errors };
        }
        self.errors = FieldErrors::new();

        match Step::at(from.index() + 1) {
            Some(to) => {
                self.step = to;
                Advance::Moved { from, to }
            }
            None => {
                self.completed = true;
                Advance::Completed
            }
        }
    }

    /// Move back one step without clearing any field.
    ///
    /// Floored at the first step, and at the tutorial once a purchase went
    /// through. Returns whether the step changed.
    pub fn retreat(&mut self) -> bool {
        let floor = if self.purchased.is_some() {
            Step::Tutorial.index()
        } else {
            0
        };
        let index = self.index();
        if index <= floor {
            return false;
        }
        match Step::at(index - 1) {
            Some(previous) => {
                self.step = previous;
                true
            }
            None => false,
        }
    }

    /// Jump straight to `step` (deep links, skip-to-home). Bypasses every
    /// gate; callers must not use it to skip required data collection.
    pub fn jump_to(&mut self, step: Step) -> Step {
        std::mem::replace(&mut self.step, step)
    }

    /// Snapshot the selected product and validated shipping details.
    ///
    /// # Errors
    ///
    /// Returns field errors when no product is selected or the shipping form
    /// is invalid.
    pub fn checkout(&self) -> Result<Checkout, FieldErrors> {
        let shipping = self.shipping.validate();
        match (self.selected_product(), shipping) {
            (Some(product), Ok(shipping)) => Ok(Checkout { product, shipping }),
            (product, shipping) => {
                let mut errors = shipping.err().unwrap_or_default();
                if product.is_none() {
                    errors.insert(Field::Product, FieldError::Required);
                }
                Err(errors)
            }
        }
    }

    /// Record an accepted order and move from the purchase step to the
    /// tutorial. Returns `false` (and changes nothing) anywhere else.
    pub fn complete_purchase(&mut self, order_id: CommerceOrderId) -> bool {
        if self.step != Step::Purchase {
            return false;
        }
        self.purchased = Some(order_id);
        self.step = Step::Tutorial;
        true
    }
}
