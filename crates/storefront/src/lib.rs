//! Glyca Storefront library.
//!
//! This crate provides the onboarding and checkout service as a library,
//! allowing it to be tested and reused by the admin binary and CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
