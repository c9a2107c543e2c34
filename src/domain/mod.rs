//! # Domain Layer
//!
//! Quote entities, value objects and the status state machine. Nothing in
//! this layer performs I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;
