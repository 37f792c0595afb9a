//! # Domain Layer
//!
//! Identifiers, signed payloads and block structures with no I/O.
//! This is the inner layer of the hexagonal architecture.

pub mod block;
pub mod codec;
pub mod entities;
pub mod errors;
