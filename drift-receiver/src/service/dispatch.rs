//! Dispatch Service
//!
//! Converts accepted drift events into pipeline triggers and fans the
//! outcome out to the notification sink.

use drift_client::{Notification, NotificationSink, PipelineTrigger, TriggerError};
use drift_core::config::DispatcherConfig;
use drift_core::domain::trigger::{TriggerResult, TriggerVariables};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::Instrument;
use uuid::Uuid;

use crate::service::drift::AcceptedEvent;

/// What happened to an accepted drift event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A pipeline was started
    Triggered(TriggerResult),
    /// The detector reported no drift; nothing was submitted
    Skipped,
}

/// Service error type
#[derive(Debug)]
pub enum DispatchError {
    Trigger(TriggerError),
    /// The submit task panicked or was cancelled
    Interrupted(JoinError),
}

impl From<TriggerError> for DispatchError {
    fn from(err: TriggerError) -> Self {
        DispatchError::Trigger(err)
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Shared, read-only dispatch state
pub struct DispatchService {
    config: Arc<DispatcherConfig>,
    trigger: Arc<dyn PipelineTrigger>,
    notifier: Option<Arc<dyn NotificationSink>>,
}

impl DispatchService {
    pub fn new(
        config: Arc<DispatcherConfig>,
        trigger: Arc<dyn PipelineTrigger>,
        notifier: Option<Arc<dyn NotificationSink>>,
    ) -> Self {
        Self {
            config,
            trigger,
            notifier,
        }
    }

    /// Handle one accepted drift event
    ///
    /// The submit call runs on its own task, so dropping this future (the
    /// caller went away) does not abort a trigger already in flight.
    pub async fn dispatch(&self, accepted: AcceptedEvent) -> Result<DispatchOutcome> {
        let dispatch_id = Uuid::new_v4();
        let span = tracing::info_span!("dispatch", %dispatch_id);

        self.run(accepted).instrument(span).await
    }

    async fn run(&self, accepted: AcceptedEvent) -> Result<DispatchOutcome> {
        let AcceptedEvent { event, is_drift } = accepted;

        if !is_drift {
            tracing::info!(
                p_val = ?event.p_value(),
                "Detector reported no drift, skipping trigger"
            );
            return Ok(DispatchOutcome::Skipped);
        }

        tracing::info!(
            p_val = ?event.p_value(),
            timestamp = ?event.timestamp(),
            "Drift detected, triggering retrain pipeline"
        );

        let variables = TriggerVariables::new()
            .drift_detected(true)
            .drift_payload(&event.payload)
            .slack_webhook_url(self.config.slack_webhook_url.as_deref());
        let request = self.config.trigger_request(variables);
        let git_ref = request.git_ref.clone();

        let trigger = self.trigger.clone();
        let submitted = tokio::spawn(
            async move { trigger.submit(&request).await }.in_current_span(),
        )
        .await
        .map_err(DispatchError::Interrupted)?;

        match submitted {
            Ok(result) => {
                self.notify(Notification::triggered(git_ref, &result));
                Ok(DispatchOutcome::Triggered(result))
            }
            Err(err) => {
                if !matches!(err, TriggerError::Configuration(_)) {
                    self.notify(Notification::failed(git_ref, &err));
                }
                Err(err.into())
            }
        }
    }

    /// Fire-and-forget delivery bounded by the notification timeout
    fn notify(&self, notification: Notification) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };
        let timeout = self.config.notify_timeout;

        tokio::spawn(
            async move {
                match tokio::time::timeout(timeout, notifier.notify(&notification)).await {
                    Ok(Ok(())) => tracing::debug!("Outcome notification sent"),
                    Ok(Err(e)) => tracing::warn!("Failed to send outcome notification: {}", e),
                    Err(_) => tracing::warn!(
                        "Outcome notification timed out after {:?}",
                        timeout
                    ),
                }
            }
            .in_current_span(),
        );
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use drift_client::NotifyError;
    use drift_core::domain::drift::DriftEvent;
    use drift_core::domain::trigger::TriggerRequest;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// Trigger double that records requests and answers from a script
    pub(crate) struct FakeTrigger {
        pub requests: Mutex<Vec<TriggerRequest>>,
        reply: FakeReply,
    }

    #[derive(Clone, Copy)]
    pub(crate) enum FakeReply {
        Created(u64),
        Rejected(u16, &'static str),
    }

    impl FakeTrigger {
        pub(crate) fn new(reply: FakeReply) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                reply,
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PipelineTrigger for FakeTrigger {
        async fn submit(
            &self,
            request: &TriggerRequest,
        ) -> std::result::Result<TriggerResult, TriggerError> {
            request.validate()?;
            self.requests.lock().unwrap().push(request.clone());

            match self.reply {
                FakeReply::Created(id) => Ok(TriggerResult::from_response(
                    request,
                    201,
                    format!(r#"{{"id":{}}}"#, id),
                )),
                FakeReply::Rejected(status, body) => Err(TriggerError::RemoteRejected {
                    status,
                    body: body.to_string(),
                }),
            }
        }
    }

    /// Sink that forwards every notification to a channel, optionally slowly
    pub(crate) struct ChannelSink {
        tx: mpsc::UnboundedSender<Notification>,
        delay: Duration,
    }

    #[async_trait]
    impl NotificationSink for ChannelSink {
        async fn notify(&self, notification: &Notification) -> std::result::Result<(), NotifyError> {
            tokio::time::sleep(self.delay).await;
            let _ = self.tx.send(notification.clone());
            Ok(())
        }
    }

    /// Sink whose every delivery fails, reporting each attempt on a channel
    pub(crate) struct FailingSink {
        pub(crate) attempts: mpsc::UnboundedSender<()>,
    }

    #[async_trait]
    impl NotificationSink for FailingSink {
        async fn notify(&self, _: &Notification) -> std::result::Result<(), NotifyError> {
            let _ = self.attempts.send(());
            Err(NotifyError::Rejected {
                status: 500,
                body: "internal error".to_string(),
            })
        }
    }

    pub(crate) fn config() -> Arc<DispatcherConfig> {
        let mut config = DispatcherConfig::new("77", "glptt-test");
        config.ci_url = "https://gitlab.example.com".to_string();
        Arc::new(config)
    }

    fn accepted(is_drift: bool) -> AcceptedEvent {
        AcceptedEvent {
            event: DriftEvent::drift(is_drift, Some(0.001)),
            is_drift,
        }
    }

    #[tokio::test]
    async fn test_no_drift_is_skipped_without_trigger() {
        let trigger = FakeTrigger::new(FakeReply::Created(1));
        let service = DispatchService::new(config(), trigger.clone(), None);

        let outcome = service.dispatch(accepted(false)).await.unwrap();

        assert_eq!(outcome, DispatchOutcome::Skipped);
        assert_eq!(trigger.calls(), 0);
    }

    #[tokio::test]
    async fn test_drift_triggers_once_with_variables() {
        let trigger = FakeTrigger::new(FakeReply::Created(42));
        let service = DispatchService::new(config(), trigger.clone(), None);

        let outcome = service.dispatch(accepted(true)).await.unwrap();

        let DispatchOutcome::Triggered(result) = outcome else {
            panic!("expected a triggered outcome");
        };
        assert_eq!(result.pipeline_id, Some(42));

        let requests = trigger.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].variables.get("DRIFT_DETECTED"), Some("true"));
        assert_eq!(requests[0].git_ref, "main");
        assert!(requests[0].variables.get("DRIFT_PAYLOAD").unwrap().contains("0.001"));
        assert!(!requests[0].variables.contains("SLACK_WEBHOOK_URL"));
    }

    #[tokio::test]
    async fn test_slack_url_forwarded_and_notified() {
        let mut config = (*config()).clone();
        config.slack_webhook_url = Some("https://hooks.slack.com/services/T/B/X".to_string());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn NotificationSink> = Arc::new(ChannelSink {
            tx,
            delay: Duration::ZERO,
        });
        let trigger = FakeTrigger::new(FakeReply::Created(9));
        let service = DispatchService::new(Arc::new(config), trigger.clone(), Some(sink));

        service.dispatch(accepted(true)).await.unwrap();

        let notification = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            notification,
            Notification::Triggered { pipeline_id: Some(9), .. }
        ));
        assert_eq!(
            trigger.requests.lock().unwrap()[0]
                .variables
                .get("SLACK_WEBHOOK_URL"),
            Some("https://hooks.slack.com/services/T/B/X")
        );
    }

    #[tokio::test]
    async fn test_rejection_is_returned_and_notified() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn NotificationSink> = Arc::new(ChannelSink {
            tx,
            delay: Duration::ZERO,
        });
        let trigger = FakeTrigger::new(FakeReply::Rejected(401, "unauthorized"));
        let service = DispatchService::new(config(), trigger, Some(sink));

        let err = service.dispatch(accepted(true)).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Trigger(TriggerError::RemoteRejected { status: 401, .. })
        ));

        let notification = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(notification, Notification::Failed { .. }));
    }

    #[tokio::test]
    async fn test_slow_sink_does_not_delay_dispatch() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn NotificationSink> = Arc::new(ChannelSink {
            tx,
            delay: Duration::from_secs(30),
        });
        let service = DispatchService::new(
            config(),
            FakeTrigger::new(FakeReply::Created(1)),
            Some(sink),
        );

        let outcome = tokio::time::timeout(
            Duration::from_secs(1),
            service.dispatch(accepted(true)),
        )
        .await
        .expect("dispatch waited on the notification sink");
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_failing_sink_leaves_outcome_unchanged() {
        let (attempts, mut rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn NotificationSink> = Arc::new(FailingSink { attempts });
        let trigger = FakeTrigger::new(FakeReply::Created(5));
        let service = DispatchService::new(config(), trigger.clone(), Some(sink));

        let outcome = service.dispatch(accepted(true)).await.unwrap();

        let DispatchOutcome::Triggered(result) = outcome else {
            panic!("expected a triggered outcome");
        };
        assert_eq!(result.pipeline_id, Some(5));
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(trigger.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_credentials_surface_as_configuration() {
        let mut config = (*config()).clone();
        config.trigger_token = Default::default();
        let trigger = FakeTrigger::new(FakeReply::Created(1));
        let service = DispatchService::new(Arc::new(config), trigger.clone(), None);

        let err = service.dispatch(accepted(true)).await.unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Trigger(TriggerError::Configuration(_))
        ));
        assert_eq!(trigger.calls(), 0);
    }
}
