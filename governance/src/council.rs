//! Security Council: twelve experts who approve upgrades on the fast path
//! and hold the freeze brake.

use crate::authorization::Approvals;
use crate::error::GovernanceError;
use bastion_crypto::SigningDomain;
use bastion_multisig::{Multisig, SignatureChecker};
use bastion_types::{Address, Digest, ProposalId, Timestamp};

pub const COUNCIL_SIZE: usize = 12;

pub const APPROVE_UPGRADE_THRESHOLD: usize = 6;
pub const HARD_FREEZE_THRESHOLD: usize = 9;
pub const SET_SOFT_FREEZE_THRESHOLD_THRESHOLD: usize = 9;
pub const UNFREEZE_THRESHOLD: usize = 9;
/// Signatures needed for the council to sign as one principal (emergency upgrades).
pub const DELEGATION_THRESHOLD: usize = 9;

const DOMAIN_NAME: &str = "SecurityCouncil";
const DOMAIN_VERSION: &str = "1";

#[derive(Clone, Debug)]
pub struct SecurityCouncil {
    address: Address,
    multisig: Multisig,
    domain: SigningDomain,
}

impl SecurityCouncil {
    pub fn new(address: Address, members: Vec<Address>) -> Result<Self, GovernanceError> {
        let multisig = Multisig::with_exact_size(members, COUNCIL_SIZE, DELEGATION_THRESHOLD)?;
        Ok(Self {
            address,
            multisig,
            domain: SigningDomain::new(DOMAIN_NAME, DOMAIN_VERSION, address),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn multisig(&self) -> &Multisig {
        &self.multisig
    }

    pub fn approve_upgrade_digest(&self, id: &ProposalId) -> Digest {
        self.domain
            .typed("ApproveUpgradeSecurityCouncil(bytes32 id)")
            .digest(id)
            .finish()
    }

    pub fn soft_freeze_digest(&self, nonce: u64, valid_until: Timestamp) -> Digest {
        self.domain
            .typed("SoftFreeze(uint256 nonce,uint256 validUntil)")
            .u64(nonce)
            .timestamp(valid_until)
            .finish()
    }

    pub fn hard_freeze_digest(&self, nonce: u64, valid_until: Timestamp) -> Digest {
        self.domain
            .typed("HardFreeze(uint256 nonce,uint256 validUntil)")
            .u64(nonce)
            .timestamp(valid_until)
            .finish()
    }

    pub fn unfreeze_digest(&self, nonce: u64, valid_until: Timestamp) -> Digest {
        self.domain
            .typed("Unfreeze(uint256 nonce,uint256 validUntil)")
            .u64(nonce)
            .timestamp(valid_until)
            .finish()
    }

    pub fn set_soft_freeze_threshold_digest(
        &self,
        threshold: usize,
        nonce: u64,
        valid_until: Timestamp,
    ) -> Digest {
        self.domain
            .typed("SetSoftFreezeThreshold(uint256 threshold,uint256 nonce,uint256 validUntil)")
            .u64(threshold as u64)
            .u64(nonce)
            .timestamp(valid_until)
            .finish()
    }

    pub(crate) fn authorize(
        &self,
        checker: &SignatureChecker,
        digest: &Digest,
        approvals: &Approvals,
        threshold: usize,
    ) -> Result<(), GovernanceError> {
        self.multisig.check_signatures(
            checker,
            digest,
            &approvals.signers,
            &approvals.signatures,
            threshold,
        )?;
        Ok(())
    }
}
