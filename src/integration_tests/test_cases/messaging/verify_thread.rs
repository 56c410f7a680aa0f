use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::{ContentState, FriendFiError, MessageDirection, ThreadMessage};

/// Reads the thread from both sides and checks the last sent text shows
/// up resolved, labeled "You" for the author and with the author's
/// username for the counterparty.
pub struct VerifyThreadTestCase {
    sender: &'static str,
    receiver: &'static str,
}

impl VerifyThreadTestCase {
    pub fn new(sender: &'static str, receiver: &'static str) -> Self {
        Self { sender, receiver }
    }

    fn find_text<'a>(
        thread: &'a [ThreadMessage],
        text: &str,
        direction: MessageDirection,
    ) -> Option<&'a ThreadMessage> {
        thread.iter().find(|m| {
            m.direction == direction
                && matches!(&m.content, ContentState::Text { text: t } if t == text)
        })
    }
}

#[async_trait]
impl TestCase for VerifyThreadTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        let text = context.get_sent_text(&format!("{}-text", self.sender))?.clone();
        let sender_account = context.get_account(self.sender)?.clone();
        let receiver_account = context.get_account(self.receiver)?.clone();

        // Sender's view: the message is outgoing and labeled "You"
        switch_session(context, self.sender).await?;
        let thread = retry_until(
            RetryConfig::default(),
            || async {
                let thread = context.friendfi.thread(receiver_account.address).await?;
                if Self::find_text(&thread, &text, MessageDirection::Sent).is_some() {
                    Ok(thread)
                } else {
                    Err(FriendFiError::Other(anyhow::anyhow!(
                        "sent text not resolved yet"
                    )))
                }
            },
            "sender thread resolution",
        )
        .await?;

        let sent = Self::find_text(&thread, &text, MessageDirection::Sent)
            .ok_or_else(|| FriendFiError::Other(anyhow::anyhow!("sent message vanished")))?;
        assert_eq!(sent.author_label, "You");
        assert_eq!(sent.message.sender, sender_account.address);
        assert_eq!(sent.message.receiver, receiver_account.address);

        // Timestamps must be ascending
        let mut last_seen = 0u64;
        for message in &thread {
            assert!(
                message.message.timestamp_seconds >= last_seen,
                "Thread is not in chronological order"
            );
            last_seen = message.message.timestamp_seconds;
        }

        // Receiver's view: same record, incoming, labeled with the sender
        switch_session(context, self.receiver).await?;
        let thread = retry_until(
            RetryConfig::default(),
            || async {
                let thread = context.friendfi.thread(sender_account.address).await?;
                if Self::find_text(&thread, &text, MessageDirection::Received).is_some() {
                    Ok(thread)
                } else {
                    Err(FriendFiError::Other(anyhow::anyhow!(
                        "received text not resolved yet"
                    )))
                }
            },
            "receiver thread resolution",
        )
        .await?;

        let received = Self::find_text(&thread, &text, MessageDirection::Received)
            .ok_or_else(|| FriendFiError::Other(anyhow::anyhow!("received message vanished")))?;
        assert_ne!(received.author_label, "You");
        if let Some(username) = context.usernames.get(self.sender) {
            assert_eq!(&received.author_label, username);
        }

        tracing::info!("✓ Thread verified from both sides");
        Ok(())
    }
}
