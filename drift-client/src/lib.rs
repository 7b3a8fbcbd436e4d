//! Drift HTTP Client
//!
//! Outbound HTTP for the drift dispatcher:
//! - [`TriggerClient`]: one authenticated trigger call to the CI API per request
//! - [`SlackNotifier`]: best-effort outcome summaries
//! - [`ReceiverClient`]: operator access to a running webhook receiver
//!
//! # Example
//!
//! ```no_run
//! use drift_client::{PipelineTrigger, TriggerClient};
//! use drift_core::config::DispatcherConfig;
//! use drift_core::domain::trigger::TriggerVariables;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DispatcherConfig::new("1234", "glptt-...");
//!     let client = TriggerClient::new(config.trigger_timeout)?;
//!
//!     let request = config.trigger_request(TriggerVariables::new().retrain(true));
//!     let result = client.submit(&request).await?;
//!
//!     println!("Pipeline: {:?}", result.pipeline_url);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod notify;
mod receiver;
pub mod trigger;

// Re-export commonly used types
pub use error::{ClientError, NotifyError, Result, TriggerError};
pub use notify::{Notification, NotificationSink, SlackNotifier};
pub use receiver::ReceiverClient;
pub use trigger::{PipelineTrigger, TriggerClient};
