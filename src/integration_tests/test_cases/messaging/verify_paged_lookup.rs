use async_trait::async_trait;

use crate::integration_tests::core::*;
use crate::integration_tests::test_cases::shared::switch_session;
use crate::{FriendFiError, MessageDirection};

/// Out-of-range guard; a scenario run sends nowhere near this many.
const MAX_PAGED_RECORDS: u64 = 50;

/// Walks the sender's sent list through the index-based record lookup
/// and checks it agrees with what the scenario sent.
pub struct VerifyPagedLookupTestCase {
    sender: &'static str,
    receiver: &'static str,
}

impl VerifyPagedLookupTestCase {
    pub fn new(sender: &'static str, receiver: &'static str) -> Self {
        Self { sender, receiver }
    }
}

#[async_trait]
impl TestCase for VerifyPagedLookupTestCase {
    async fn run(&self, context: &mut ScenarioContext) -> Result<(), FriendFiError> {
        switch_session(context, self.sender).await?;
        let sender_address = context.get_account(self.sender)?.address;
        let receiver_address = context.get_account(self.receiver)?.address;

        let mut records = Vec::new();
        for index in 0..MAX_PAGED_RECORDS {
            match context
                .friendfi
                .message_at_index(sender_address, index, MessageDirection::Sent)
                .await
            {
                Ok(message) => records.push(message),
                // The first out-of-range index ends the walk
                Err(FriendFiError::ChainClient(_)) => break,
                Err(e) => return Err(e),
            }
        }

        assert!(
            !records.is_empty(),
            "Paged lookup returned no sent records for '{}'",
            self.sender
        );
        for record in &records {
            assert_eq!(record.sender, sender_address);
        }

        let mut last_seen = 0u64;
        for record in &records {
            assert!(
                record.timestamp_seconds >= last_seen,
                "Sent list is not append-ordered"
            );
            last_seen = record.timestamp_seconds;
        }

        // The scenario's last send from this wallet went to the receiver
        let newest = records.last().expect("checked non-empty");
        assert_eq!(newest.receiver, receiver_address);

        tracing::info!("✓ Paged lookup returned {} sent records", records.len());
        Ok(())
    }
}
