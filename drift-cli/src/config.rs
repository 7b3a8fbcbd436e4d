//! Configuration module
//!
//! Settings shared by every CLI command.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of a running drift webhook receiver
    pub receiver_url: String,
}
