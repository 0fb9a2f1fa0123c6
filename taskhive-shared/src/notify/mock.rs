/// Mock notifier for tests and local development
///
/// Records every message instead of delivering it, and can be flipped
/// into a failing state to exercise the log-and-continue dispatch paths.
///
/// # Example
///
/// ```
/// use taskhive_shared::notify::{mock::MockNotifier, EmailMessage, Notifier};
///
/// # async fn example() {
/// let notifier = MockNotifier::new();
/// let message = EmailMessage {
///     to: "dev@example.com".to_string(),
///     subject: "Hello".to_string(),
///     html_body: "<p>Hi</p>".to_string(),
/// };
///
/// notifier.send(&message).await.unwrap();
/// assert_eq!(notifier.sent().len(), 1);
/// # }
/// ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{DispatchError, EmailMessage, Notifier};

/// Notifier that records messages in memory
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<EmailMessage>>,
    fail: AtomicBool,
}

impl MockNotifier {
    /// Creates a mock notifier that accepts everything
    pub fn new() -> Self {
        MockNotifier::default()
    }

    /// Makes subsequent sends fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of every message accepted so far
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DispatchError::ChannelUnreachable(
                "mock notifier set to fail".to_string(),
            ));
        }

        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
