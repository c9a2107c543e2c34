//! # Application Layer
//!
//! Use cases over the domain, driven through the persistence and platform
//! ports.
//!
//! - [`services`]: quote workflow and expiration worker
//! - [`dto`]: use case inputs and outputs
//! - [`error`]: application errors with HTTP mapping

pub mod dto;
pub mod error;
pub mod services;
