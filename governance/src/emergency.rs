//! Emergency Upgrade Board.
//!
//! Bypasses the timed lifecycle entirely, but only with simultaneous sign-off
//! from the council (as one delegated principal), the guardians (likewise) and
//! an external third party. Each party signs its own digest of the same id.

use crate::error::GovernanceError;
use bastion_crypto::SigningDomain;
use bastion_multisig::SignatureChecker;
use bastion_types::{Address, Digest, ProposalId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One signature per party. Council and guardian signatures are encoded
/// multisig signatures; the foundation's is whatever its address accepts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyApprovals {
    pub council: Vec<u8>,
    pub guardians: Vec<u8>,
    pub foundation: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct EmergencyUpgradeBoard {
    address: Address,
    council: Address,
    guardians: Address,
    foundation: Address,
    domain: SigningDomain,
}

impl EmergencyUpgradeBoard {
    pub fn new(
        address: Address,
        council: Address,
        guardians: Address,
        foundation: Address,
    ) -> Self {
        Self {
            address,
            council,
            guardians,
            foundation,
            domain: SigningDomain::new("EmergencyUpgradeBoard", "1", address),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn council_digest(&self, id: &ProposalId) -> Digest {
        self.party_digest("ExecuteEmergencyUpgradeSecurityCouncil(bytes32 id)", id)
    }

    pub fn guardians_digest(&self, id: &ProposalId) -> Digest {
        self.party_digest("ExecuteEmergencyUpgradeGuardians(bytes32 id)", id)
    }

    pub fn foundation_digest(&self, id: &ProposalId) -> Digest {
        self.party_digest("ExecuteEmergencyUpgradeFoundation(bytes32 id)", id)
    }

    fn party_digest(&self, tag: &str, id: &ProposalId) -> Digest {
        self.domain.typed(tag).digest(id).finish()
    }

    /// All three parties must have signed their digest of `id`.
    pub(crate) fn authorize(
        &self,
        checker: &SignatureChecker,
        id: &ProposalId,
        approvals: &EmergencyApprovals,
    ) -> Result<(), GovernanceError> {
        let parties = [
            ("security council", self.council, self.council_digest(id), &approvals.council),
            ("guardians", self.guardians, self.guardians_digest(id), &approvals.guardians),
            ("foundation", self.foundation, self.foundation_digest(id), &approvals.foundation),
        ];
        for (party, signer, digest, signature) in parties {
            if !checker.is_valid_signature_now(&signer, &digest, signature) {
                debug!(party, %id, "emergency approval rejected");
                return Err(GovernanceError::EmergencyApprovalInvalid { party });
            }
        }
        Ok(())
    }
}
