//! A mock desktop backend for testing the system channel.

use async_trait::async_trait;
use ncli::notification::{DesktopBackend, NotifyError};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Default)]
pub struct MockDesktop {
    pub shown: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl MockDesktop {
    /// A backend that rejects every notification.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl DesktopBackend for MockDesktop {
    async fn show(&self, _title: &str, body: &str) -> Result<(), NotifyError> {
        self.shown.lock().unwrap().push(body.to_string());
        if self.fail {
            Err(NotifyError::System("notify-send exited with 1".to_string()))
        } else {
            Ok(())
        }
    }
}
