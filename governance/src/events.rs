//! Audit events appended to the ledger by every applied action.

use crate::bridge::GovernorProposal;
use bastion_types::{Address, Digest, ProposalId, Timestamp, UpgradeProposal};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceEvent {
    UpgradeStarted {
        id: ProposalId,
        proposal: UpgradeProposal,
        at: Timestamp,
    },
    LegalVetoExtended {
        id: ProposalId,
    },
    ApprovedByCouncil {
        id: ProposalId,
        at: Timestamp,
    },
    ApprovedByGuardians {
        id: ProposalId,
    },
    UpgradeExecuted {
        id: ProposalId,
        executor: Address,
    },
    EmergencyUpgradeExecuted {
        id: ProposalId,
    },
    SoftFreeze {
        until: Timestamp,
    },
    HardFreeze {
        until: Timestamp,
    },
    ReinforceFreeze {
        until: Timestamp,
    },
    Unfreeze,
    ReinforceUnfreeze,
    SoftFreezeThresholdSet {
        threshold: usize,
    },
    GovernorProposalForwarded {
        proposal: GovernorProposal,
        tx_hash: Digest,
    },
    GovernorCancellationForwarded {
        proposal: GovernorProposal,
        tx_hash: Digest,
    },
}
