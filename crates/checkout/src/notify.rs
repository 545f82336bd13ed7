//! Receipt notification trait and in-memory implementation.
//!
//! Notifications run after the settlement transaction commits. A failed
//! send is logged and dropped; it never rolls back a committed payment.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{Order, User};
use thiserror::Error;

/// A notification send failure.
#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Trait for sending order receipts.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Sends a purchase receipt for a settled order.
    async fn send_receipt(&self, order: &Order, user: &User) -> Result<(), NotifyError>;
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    sent: Vec<(String, String)>,
    fail_on_send: bool,
}

/// In-memory notification service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationService {
    state: Arc<RwLock<InMemoryNotificationState>>,
}

impl InMemoryNotificationService {
    /// Creates a new in-memory notification service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail on the next send call.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Returns the number of receipts sent.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }

    /// Returns true if a receipt was sent to the given email.
    pub fn sent_to(&self, email: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .sent
            .iter()
            .any(|(to, _)| to == email)
    }
}

#[async_trait]
impl NotificationService for InMemoryNotificationService {
    async fn send_receipt(&self, order: &Order, user: &User) -> Result<(), NotifyError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_send {
            return Err(NotifyError("SMTP unavailable".to_string()));
        }

        state
            .sent
            .push((user.email.clone(), order.id.to_string()));
        Ok(())
    }
}
