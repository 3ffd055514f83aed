//! Cross-chain collaborators.
//!
//! Inbound: proof that the remote token governor emitted an upgrade proposal.
//! Outbound: governor calls the guardians forward to the remote chain.
//! Both are injected traits; transport and proof internals live elsewhere.

use bastion_crypto::{hash_encoded, CryptoError};
use bastion_types::{Address, Digest, UpgradeProposal};
use serde::{Deserialize, Serialize};

/// A message sent from the remote chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2Message {
    pub tx_number_in_batch: u16,
    pub sender: Address,
    pub data: Vec<u8>,
}

/// Everything needed to prove a proposal was emitted remotely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalInclusion {
    pub batch_number: u64,
    pub message_index: u64,
    pub tx_number_in_batch: u16,
    pub proof: Vec<Digest>,
    pub proposal: UpgradeProposal,
}

/// Verifies inclusion of a remote message. Its answer is trusted absolutely.
pub trait InclusionVerifier {
    fn prove_message_inclusion(
        &self,
        batch_number: u64,
        message_index: u64,
        message: &L2Message,
        proof: &[Digest],
    ) -> bool;
}

/// A proposal on the remote token governor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorProposal {
    pub targets: Vec<Address>,
    pub values: Vec<u128>,
    pub calldatas: Vec<Vec<u8>>,
    pub description: String,
}

impl GovernorProposal {
    /// Stable content hash, used in signing digests.
    pub fn hash(&self) -> Result<Digest, CryptoError> {
        hash_encoded(self)
    }
}

/// What the guardians ask the remote governor to do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernorCall {
    Propose(GovernorProposal),
    Cancel(GovernorProposal),
}

/// Transport parameters for a cross-chain governor call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2TransactionRequest {
    /// Remote governor address.
    pub to: Address,
    pub gas_limit: u64,
    pub gas_per_pubdata_limit: u64,
    pub refund_recipient: Address,
    pub mint_value: u128,
}

impl L2TransactionRequest {
    pub fn hash(&self) -> Result<Digest, CryptoError> {
        hash_encoded(self)
    }
}

/// Sends governor calls to the remote chain.
pub trait GovernorMessenger {
    /// Returns the hash identifying the submitted transaction.
    fn send_governor_call(
        &mut self,
        request: &L2TransactionRequest,
        call: &GovernorCall,
    ) -> Result<Digest, String>;
}
