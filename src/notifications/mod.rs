//! Cycle summary notifications
//!
//! `Notifier` is the outbound collaborator the engine calls once per cycle.
//! `NotifierSet` fans a message out to every configured channel.

pub mod email;
#[cfg(feature = "telegram")]
pub mod telegram;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::logger::{self, LogTag};

pub use email::EmailNotifier;
#[cfg(feature = "telegram")]
pub use telegram::TelegramNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, message: &str) -> Result<(), String>;
}

/// Delivers to every channel; one failing channel does not stop the others
#[derive(Default)]
pub struct NotifierSet {
    channels: Vec<Arc<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, notifier: Arc<dyn Notifier>) {
        self.channels.push(notifier);
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Build the channels enabled in configuration
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let mut set = Self::new();

        if config.telegram.enabled {
            #[cfg(feature = "telegram")]
            set.add(Arc::new(TelegramNotifier::new(
                &config.telegram.bot_token,
                &config.telegram.chat_id,
            )?));

            #[cfg(not(feature = "telegram"))]
            logger::warning(
                LogTag::Notify,
                "telegram.enabled is set but the binary was built without the telegram feature",
            );
        }

        if config.email.enabled {
            set.add(Arc::new(EmailNotifier::new(
                &config.email.api_key,
                &config.email.to,
                &config.email.from,
            )?));
        }

        logger::debug(
            LogTag::Notify,
            &format!("{} notification channel(s) configured", set.len()),
        );
        Ok(set)
    }
}

#[async_trait]
impl Notifier for NotifierSet {
    fn name(&self) -> &str {
        "all"
    }

    /// Fails only if every channel failed
    async fn notify(&self, message: &str) -> Result<(), String> {
        let mut failures = Vec::new();
        for channel in &self.channels {
            if let Err(e) = channel.notify(message).await {
                logger::warning(
                    LogTag::Notify,
                    &format!("{} notification failed: {}", channel.name(), e),
                );
                failures.push(format!("{}: {}", channel.name(), e));
            }
        }

        if !self.channels.is_empty() && failures.len() == self.channels.len() {
            return Err(failures.join("; "));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingNotifier;
    use super::*;

    #[tokio::test]
    async fn fan_out_tolerates_one_failing_channel() {
        let ok = Arc::new(RecordingNotifier::new());
        let broken = Arc::new(RecordingNotifier::failing());
        let mut set = NotifierSet::new();
        set.add(broken.clone());
        set.add(ok.clone());

        set.notify("cycle done").await.unwrap();
        assert_eq!(ok.messages(), vec!["cycle done".to_string()]);
    }

    #[tokio::test]
    async fn all_channels_failing_is_an_error() {
        let mut set = NotifierSet::new();
        set.add(Arc::new(RecordingNotifier::failing()));
        assert!(set.notify("cycle done").await.is_err());
        assert!(NotifierSet::new().notify("nobody listens").await.is_ok());
    }

    #[test]
    fn disabled_channels_are_not_built() {
        let set = NotifierSet::from_config(&Config::default()).unwrap();
        assert!(set.is_empty());

        let mut config = Config::default();
        config.email.enabled = true;
        config.email.api_key = "re_test".to_string();
        config.email.to = "ops@example.com".to_string();
        assert_eq!(NotifierSet::from_config(&config).unwrap().len(), 1);
    }
}
