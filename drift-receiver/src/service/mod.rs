//! Service Module
//!
//! Business logic layer for the receiver: event validation and dispatch.

pub mod dispatch;
pub mod drift;

// Re-export for convenience
pub use dispatch::{DispatchError, DispatchOutcome, DispatchService};
pub use drift::{ValidationError, validate_event};
