//! Glyca Core - onboarding and checkout domain library.
//!
//! This crate provides the pieces of the Glyca checkout flow that do not
//! touch the network:
//! - `storefront` - Public onboarding/checkout API (wizard sessions, order submission)
//! - `admin` - Internal order dashboard (loopback-bound by default)
//! - `cli` - Command-line tools for migrations and order inspection
//!
//! # Architecture
//!
//! The core crate contains only types, reference tables and pure state
//! transitions - no I/O, no database access, no HTTP clients. The binaries
//! own every side effect.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, order statuses and order records
//! - [`country`] - Per-country phone patterns, regions and cities
//! - [`catalog`] - Static product catalog
//! - [`form`] - Shipping and profile form state with field validation
//! - [`wizard`] - Onboarding step sequencer

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod country;
pub mod form;
pub mod types;
pub mod wizard;

pub use catalog::{CATALOG, ProductOption, find_product};
pub use country::{CountryCode, CountryProfile};
pub use form::{Field, FieldError, FieldErrors, ProfileForm, ShippingForm, ShippingInfo};
pub use types::*;
pub use wizard::{Advance, Checkout, Language, Step, WizardState};
