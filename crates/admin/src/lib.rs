//! Glyca Admin library.
//!
//! This crate provides the order dashboard API as a library, allowing it to
//! be tested and reused by the CLI.
//!
//! # Security
//!
//! This crate holds the Shopify Admin API token and can change order
//! status. There is no login: bind it to localhost or a private network.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
