//! Fan-out of one event to its matched subscribers.

use shared_types::{AppId, NotifyEnvelope};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::PublishError;
use crate::ports::NotifyTransport;

/// Publishes one envelope to a list of apps, one task per recipient,
/// joined before returning.
///
/// A single recipient's failure is logged and does not affect the others:
/// subscribers tolerate occasional drops and can re-derive anything they
/// missed from the chain itself.
pub struct Publisher<T> {
    transport: Arc<T>,
}

impl<T: NotifyTransport + 'static> Publisher<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Serialize once, publish to every app's subject, wait for all sends.
    pub async fn publish(
        &self,
        app_ids: &[AppId],
        envelope: &NotifyEnvelope,
    ) -> Result<(), PublishError> {
        let payload = envelope.to_bytes()?;
        let mut tasks = JoinSet::new();
        for app_id in app_ids {
            let transport = Arc::clone(&self.transport);
            let subject = app_id.clone();
            let payload = payload.clone();
            tasks.spawn(async move {
                if let Err(err) = transport.publish(subject.as_str(), payload).await {
                    warn!(app_id = %subject, error = %err, "publish to subscriber failed");
                }
            });
        }
        while tasks.join_next().await.is_some() {}
        Ok(())
    }

    /// Release the transport connection. The dispatcher calls this last,
    /// after every worker has finished.
    pub fn close(&self) {
        self.transport.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use shared_types::{ExecutionEvent, Message, MessageId, TipsetContext};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockTransport {
        published: Mutex<Vec<String>>,
        fail_subject: Option<String>,
        closed: AtomicUsize,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                published: Mutex::new(Vec::new()),
                fail_subject: None,
                closed: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl NotifyTransport for MockTransport {
        async fn publish(&self, subject: &str, _payload: Bytes) -> Result<(), TransportError> {
            if self.fail_subject.as_deref() == Some(subject) {
                return Err(TransportError::Connection("nope".into()));
            }
            self.published.lock().push(subject.to_owned());
            Ok(())
        }

        fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn envelope() -> NotifyEnvelope {
        NotifyEnvelope::from_event(&ExecutionEvent::new(
            TipsetContext::default(),
            MessageId::from("bafy-m"),
            Message::new("t1a", "t1b"),
        ))
    }

    #[tokio::test]
    async fn test_publishes_to_every_recipient() {
        let transport = Arc::new(MockTransport::new());
        let publisher = Publisher::new(transport.clone());
        let apps = vec![AppId::from("a"), AppId::from("b"), AppId::from("c")];

        publisher.publish(&apps, &envelope()).await.unwrap();

        let mut published = transport.published.lock().clone();
        published.sort();
        assert_eq!(published, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_rest() {
        let transport = Arc::new(MockTransport {
            published: Mutex::new(Vec::new()),
            fail_subject: Some("b".into()),
            closed: AtomicUsize::new(0),
        });
        let publisher = Publisher::new(transport.clone());
        let apps = vec![AppId::from("a"), AppId::from("b"), AppId::from("c")];

        publisher.publish(&apps, &envelope()).await.unwrap();

        let mut published = transport.published.lock().clone();
        published.sort();
        assert_eq!(published, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_empty_recipient_list_is_a_noop() {
        let transport = Arc::new(MockTransport::new());
        let publisher = Publisher::new(transport.clone());
        publisher.publish(&[], &envelope()).await.unwrap();
        assert!(transport.published.lock().is_empty());
    }

    #[tokio::test]
    async fn test_close_releases_transport() {
        let transport = Arc::new(MockTransport::new());
        let publisher = Publisher::new(transport.clone());
        publisher.close();
        assert_eq!(transport.closed.load(Ordering::SeqCst), 1);
    }
}
