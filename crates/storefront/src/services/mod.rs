//! Business logic services for storefront.
//!
//! # Services
//!
//! - `checkout` - Order submission gateway (Shopify order + local record)

pub mod checkout;

pub use checkout::{
    CheckoutGateway, Notice, OrderCreator, OrderRecorder, SubmissionOutcome, submit_purchase,
};
