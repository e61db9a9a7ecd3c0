use async_trait::async_trait;
use parking_lot::Mutex;

use super::Notifier;

/// Keeps every delivered message; `failing()` rejects them all
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, message: &str) -> Result<(), String> {
        if self.fail {
            return Err("channel unavailable".to_string());
        }
        self.messages.lock().push(message.to_string());
        Ok(())
    }
}
