//! Long-poll loop: one engine invocation per incoming message.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use vidstats_engine::{AnswerEngine, MSG_CANNOT_PARSE};

use crate::telegram::{IncomingMessage, TelegramClient};

const GREETING: &str = "Hi! I answer analytics questions about video statistics.\n\
Ask things like:\n\
• How many videos are in the system?\n\
• How many videos did creator blogger-7 publish from 2025-11-01 to 2025-11-05?\n\
• By how many views did all videos grow on 2025-11-28?";

const POLL_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Drives `getUpdates` and fans incoming messages out to the engine.
pub struct Poller {
    client: TelegramClient,
    engine: Arc<AnswerEngine>,
}

impl Poller {
    #[must_use]
    pub fn new(client: TelegramClient, engine: Arc<AnswerEngine>) -> Self {
        Self { client, engine }
    }

    /// Polls until `shutdown` resolves.
    ///
    /// Each message is answered on its own spawned task, so a slow model
    /// call or query never stalls the poll loop, and the update offset
    /// advances past every update exactly once.
    pub async fn run(&self, shutdown: impl Future<Output = ()> + Send) {
        tokio::pin!(shutdown);
        let mut offset: Option<i64> = None;

        loop {
            let updates = tokio::select! {
                () = &mut shutdown => {
                    info!("shutdown signal received, stopping poller");
                    return;
                }
                result = self.client.get_updates(offset) => match result {
                    Ok(updates) => updates,
                    Err(e) => {
                        warn!(error = %e, "poll failed");
                        tokio::select! {
                            () = &mut shutdown => {
                                info!("shutdown signal received, stopping poller");
                                return;
                            }
                            () = tokio::time::sleep(POLL_RETRY_DELAY) => continue,
                        }
                    }
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                if let Some(message) = update.message {
                    self.spawn_reply(message);
                }
            }
        }
    }

    fn spawn_reply(&self, message: IncomingMessage) {
        let client = self.client.clone();
        let engine = Arc::clone(&self.engine);

        tokio::spawn(async move {
            let chat_id = message.chat.id;
            let reply = match message.text.as_deref().map(str::trim) {
                Some(text) if text.starts_with("/start") => GREETING.to_string(),
                Some(text) => engine.answer(text).await,
                None => {
                    info!(chat_id, "non-text message");
                    MSG_CANNOT_PARSE.to_string()
                }
            };

            if let Err(e) = client.send_message(chat_id, &reply).await {
                error!(error = %e, chat_id, "failed to send reply");
            }
        });
    }
}
