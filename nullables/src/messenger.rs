//! Nullable governor messenger: record cross-chain calls without sending them.

use bastion_crypto::blake2b_256;
use bastion_governance::{GovernorCall, GovernorMessenger, L2TransactionRequest};
use bastion_types::Digest;

/// A messenger that records every governor call it is asked to send.
///
/// Transaction hashes are derived from the sequence number, so they are
/// deterministic and distinct.
#[derive(Default)]
pub struct NullMessenger {
    sent: Vec<(L2TransactionRequest, GovernorCall)>,
    fail_next: Option<String>,
}

impl NullMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next send with `reason`.
    pub fn fail_next(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    /// Get all sent calls (for assertions).
    pub fn sent(&self) -> &[(L2TransactionRequest, GovernorCall)] {
        &self.sent
    }
}

impl GovernorMessenger for NullMessenger {
    fn send_governor_call(
        &mut self,
        request: &L2TransactionRequest,
        call: &GovernorCall,
    ) -> Result<Digest, String> {
        if let Some(reason) = self.fail_next.take() {
            return Err(reason);
        }
        self.sent.push((request.clone(), call.clone()));
        let sequence = self.sent.len() as u64;
        Ok(Digest::new(blake2b_256(&sequence.to_be_bytes())))
    }
}
