//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that message-handling callers and the
//!   channel synchronization owner use
//! - **Outbound (Driven)**: Membership authorities, policies and digests
//!   this subsystem depends on

pub mod inbound;
pub mod outbound;
