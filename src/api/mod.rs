//! # API Layer
//!
//! - [`rest`]: axum REST endpoints for the quote workflow

pub mod rest;
