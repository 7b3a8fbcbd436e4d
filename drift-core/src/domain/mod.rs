//! Core domain types
//!
//! This module contains the structures shared between the receiver (which
//! builds trigger requests from drift events) and the client (which sends them).

pub mod drift;
pub mod trigger;
