//! Data Transfer Objects
//!
//! Bodies returned by the drift webhook receiver. Shared so the CLI can
//! decode them without redefining the wire format.

pub mod webhook;
