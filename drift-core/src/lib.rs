//! Drift Core
//!
//! Core types and abstractions for the drift-triggered pipeline dispatcher.
//!
//! This crate contains:
//! - Domain types: trigger requests/results and inbound drift events
//! - DTOs: Data transfer objects exchanged over the webhook
//! - Configuration: the process-wide dispatcher configuration

pub mod config;
pub mod domain;
pub mod dto;
