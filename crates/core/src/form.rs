//! Form state for the onboarding wizard.
//!
//! Validation failures are values: every predicate reports a [`FieldError`]
//! against a [`Field`], and nothing in this module returns an error type or
//! panics on bad input.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::country::{CountryCode, CountryProfile};

/// A form field that can carry an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Language,
    Name,
    Product,
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    Region,
    City,
    PostalCode,
    Country,
}

/// Why a field is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum FieldError {
    #[error("this field is required")]
    Required,
    #[error("invalid phone number, expected a number like {example}")]
    InvalidPhone { example: String },
    #[error("invalid email address")]
    InvalidEmail,
    #[error("unsupported country")]
    UnknownCountry,
    #[error("unknown region")]
    UnknownRegion,
    #[error("city is not in the selected region")]
    UnknownCity,
    #[error("unknown product")]
    UnknownProduct,
}

/// Field-level errors, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, FieldError>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors for a single field.
    #[must_use]
    pub fn single(field: Field, error: FieldError) -> Self {
        let mut errors = Self::new();
        errors.insert(field, error);
        errors
    }

    pub fn insert(&mut self, field: Field, error: FieldError) {
        self.0.insert(field, error);
    }

    pub fn remove(&mut self, field: Field) {
        self.0.remove(&field);
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.0.get(&field)
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldError)> {
        self.0.iter().map(|(field, error)| (*field, error))
    }

    /// Record `error` for `field` when the predicate failed.
    fn check(&mut self, field: Field, result: Result<(), FieldError>) {
        if let Err(error) = result {
            self.insert(field, error);
        }
    }
}

fn required(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        Err(FieldError::Required)
    } else {
        Ok(())
    }
}

/// Local part without whitespace, dot-separated domain labels, alphabetic TLD.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[^\s@]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$",
    )
    .expect("Invalid email pattern")
});

fn optional_email(value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() || EMAIL.is_match(value) {
        Ok(())
    } else {
        Err(FieldError::InvalidEmail)
    }
}

// =============================================================================
// Shipping
// =============================================================================

/// Mutable shipping form, updated on every keystroke.
///
/// Country is the privileged field: changing it invalidates region and city
/// and swaps the phone pattern. Region in turn constrains the city.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub postal_code: String,
    country: CountryCode,
    region: String,
    city: String,
    #[serde(default)]
    errors: FieldErrors,
}

/// A partial update to the shipping form, as sent by the client.
///
/// Country is applied first, then region, then city, so a single update can
/// switch all three consistently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingUpdate {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
}

impl ShippingForm {
    /// Empty form for `country`.
    #[must_use]
    pub fn for_country(country: CountryCode) -> Self {
        Self {
            country,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn country(&self) -> CountryCode {
        self.country
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Errors currently shown next to fields.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub fn profile(&self) -> &'static CountryProfile {
        self.country.profile()
    }

    /// Placeholder for the phone input.
    #[must_use]
    pub fn phone_hint(&self) -> &'static str {
        self.profile().phone_placeholder
    }

    /// Pattern the phone is validated against.
    #[must_use]
    pub fn phone_pattern(&self) -> &'static Regex {
        &self.profile().phone_pattern
    }

    /// Regions selectable for the current country.
    pub fn region_choices(&self) -> impl Iterator<Item = &'static str> {
        self.profile().region_names()
    }

    /// Cities selectable for the current region (empty until one is chosen).
    #[must_use]
    pub fn city_choices(&self) -> &'static [&'static str] {
        self.profile().cities(&self.region)
    }

    /// Switch country. A different country clears region and city and any
    /// errors tied to the old country's rules.
    pub fn set_country(&mut self, country: CountryCode) {
        self.errors.remove(Field::Country);
        if country == self.country {
            return;
        }
        self.country = country;
        self.region.clear();
        self.city.clear();
        self.errors.remove(Field::Region);
        self.errors.remove(Field::City);
        self.errors.remove(Field::Phone);
    }

    /// Switch country from a raw code; unsupported codes leave the form
    /// untouched and flag the country field.
    pub fn set_country_code(&mut self, raw: &str) {
        match raw.parse::<CountryCode>() {
            Ok(country) => self.set_country(country),
            Err(_) => self.errors.insert(Field::Country, FieldError::UnknownCountry),
        }
    }

    /// Select a region of the current country. A city outside the new
    /// region's list is cleared; an unknown region is flagged and ignored.
    pub fn set_region(&mut self, region: &str) {
        let Some(found) = self.profile().region(region) else {
            self.errors.insert(Field::Region, FieldError::UnknownRegion);
            return;
        };
        self.region = found.name.to_owned();
        self.errors.remove(Field::Region);
        if !found.has_city(&self.city) {
            self.city.clear();
        }
    }

    /// Select a city of the current region.
    pub fn set_city(&mut self, city: &str) {
        if self.profile().cities(&self.region).contains(&city) {
            city.clone_into(&mut self.city);
            self.errors.remove(Field::City);
        } else {
            self.errors.insert(Field::City, FieldError::UnknownCity);
        }
    }

    /// Apply a client update. Edited text fields lose their stale error.
    pub fn apply(&mut self, update: ShippingUpdate) {
        if let Some(country) = update.country {
            self.set_country_code(&country);
        }
        if let Some(region) = update.region {
            self.set_region(&region);
        }
        if let Some(city) = update.city {
            self.set_city(&city);
        }

        let text_fields = [
            (Field::FirstName, update.first_name, &mut self.first_name),
            (Field::LastName, update.last_name, &mut self.last_name),
            (Field::Email, update.email, &mut self.email),
            (Field::Phone, update.phone, &mut self.phone),
            (Field::Address, update.address, &mut self.address),
            (Field::PostalCode, update.postal_code, &mut self.postal_code),
        ];
        for (field, value, slot) in text_fields {
            if let Some(value) = value {
                *slot = value;
                self.errors.remove(field);
            }
        }
    }

    fn check_phone(&self) -> Result<(), FieldError> {
        required(&self.phone)?;
        if self.profile().is_valid_phone(&self.phone) {
            Ok(())
        } else {
            Err(FieldError::InvalidPhone {
                example: self.phone_hint().to_owned(),
            })
        }
    }

    /// Phone-only validation, run when the phone input loses focus.
    pub fn blur_phone(&mut self) -> bool {
        match self.check_phone() {
            Ok(()) => {
                self.errors.remove(Field::Phone);
                true
            }
            Err(error) => {
                self.errors.insert(Field::Phone, error);
                false
            }
        }
    }

    /// Validate every field without touching the displayed errors.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when any predicate fails.
    pub fn validate(&self) -> Result<ShippingInfo, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(Field::FirstName, required(&self.first_name));
        errors.check(Field::LastName, required(&self.last_name));
        errors.check(Field::Email, optional_email(&self.email));
        errors.check(Field::Phone, self.check_phone());
        errors.check(Field::Address, required(&self.address));
        errors.check(Field::Region, required(&self.region));
        errors.check(Field::City, required(&self.city));
        errors.check(Field::PostalCode, required(&self.postal_code));

        let phone_national = self.profile().national_number(&self.phone);
        match phone_national {
            Some(phone_national) if errors.is_empty() => Ok(ShippingInfo {
                first_name: self.first_name.trim().to_owned(),
                last_name: self.last_name.trim().to_owned(),
                email: Some(self.email.trim())
                    .filter(|email| !email.is_empty())
                    .map(str::to_owned),
                phone: self.phone.trim().to_owned(),
                phone_national,
                address: self.address.trim().to_owned(),
                region: self.region.clone(),
                city: self.city.clone(),
                postal_code: self.postal_code.trim().to_owned(),
                country: self.country,
            }),
            _ => Err(errors),
        }
    }

    /// Validate on submit, showing every error next to its field.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when any predicate fails.
    pub fn submit(&mut self) -> Result<ShippingInfo, FieldErrors> {
        let result = self.validate();
        self.errors = result.as_ref().err().cloned().unwrap_or_default();
        result
    }
}

/// A validated shipping snapshot, consumed once by order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    /// Phone as typed.
    pub phone: String,
    /// National significant digits, prefix and formatting removed.
    pub phone_national: String,
    pub address: String,
    pub region: String,
    pub city: String,
    pub postal_code: String,
    pub country: CountryCode,
}

// =============================================================================
// Profile
// =============================================================================

/// Self-reported condition, used to tailor the learning content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiabetesType {
    Type1,
    Type2,
    Prediabetes,
    Gestational,
    NotDiagnosed,
}

/// Profile step fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub diabetes_type: Option<DiabetesType>,
}

impl ProfileForm {
    /// # Errors
    ///
    /// Returns a `Name` error when the name is blank.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(Field::Name, required(&self.name));
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
