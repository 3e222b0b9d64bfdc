//! Delivery of email verification links

use std::sync::Mutex;

use crate::storage::StoredUser;

/// Sends a verification link to a freshly registered user
pub trait VerificationNotifier: Send + Sync {
    fn send_verification(&self, user: &StoredUser, link: &str);
}

/// Writes the link to the server log. Stand-in for a mail transport.
pub struct LogNotifier;

impl VerificationNotifier for LogNotifier {
    fn send_verification(&self, user: &StoredUser, link: &str) {
        log::info!("Verify account {} <{}>: {}", user.id, user.email, link);
    }
}

/// Keeps every sent link in memory so callers can inspect them
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>, // (email, link)
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All (email, link) pairs sent so far
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Most recent link sent to `email`
    pub fn last_link_for(&self, email: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, link)| link)
    }
}

impl VerificationNotifier for RecordingNotifier {
    fn send_verification(&self, user: &StoredUser, link: &str) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((user.email.clone(), link.to_string()));
        }
    }
}
