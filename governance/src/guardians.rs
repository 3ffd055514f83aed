//! Guardians: eight members on the slow path. They can extend the legal veto
//! window, approve upgrades that then wait out the full window, and forward
//! proposals and cancellations to the remote token governor.

use crate::authorization::Approvals;
use crate::bridge::{GovernorProposal, L2TransactionRequest};
use crate::error::GovernanceError;
use bastion_crypto::SigningDomain;
use bastion_multisig::{Multisig, SignatureChecker};
use bastion_types::{Address, Digest, ProposalId, Timestamp};

pub const GUARDIANS_SIZE: usize = 8;

pub const EXTEND_LEGAL_VETO_THRESHOLD: usize = 2;
pub const APPROVE_UPGRADE_THRESHOLD: usize = 5;
pub const PROPOSE_THRESHOLD: usize = 5;
pub const CANCEL_THRESHOLD: usize = 5;
pub const DELEGATION_THRESHOLD: usize = 5;

#[derive(Clone, Debug)]
pub struct Guardians {
    address: Address,
    multisig: Multisig,
    domain: SigningDomain,
}

impl Guardians {
    pub fn new(address: Address, members: Vec<Address>) -> Result<Self, GovernanceError> {
        let multisig = Multisig::with_exact_size(members, GUARDIANS_SIZE, DELEGATION_THRESHOLD)?;
        Ok(Self {
            address,
            multisig,
            domain: SigningDomain::new("Guardians", "1", address),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn multisig(&self) -> &Multisig {
        &self.multisig
    }

    pub fn extend_legal_veto_digest(
        &self,
        id: &ProposalId,
        nonce: u64,
        valid_until: Timestamp,
    ) -> Digest {
        self.domain
            .typed("ExtendLegalVetoPeriod(bytes32 id,uint256 nonce,uint256 validUntil)")
            .digest(id)
            .u64(nonce)
            .timestamp(valid_until)
            .finish()
    }

    pub fn approve_upgrade_digest(&self, id: &ProposalId) -> Digest {
        self.domain
            .typed("ApproveUpgradeGuardians(bytes32 id)")
            .digest(id)
            .finish()
    }

    pub fn propose_digest(
        &self,
        proposal: &GovernorProposal,
        request: &L2TransactionRequest,
        nonce: u64,
        valid_until: Timestamp,
    ) -> Result<Digest, GovernanceError> {
        self.governor_digest("ProposeL2GovernorProposal", proposal, request, nonce, valid_until)
    }

    pub fn cancel_digest(
        &self,
        proposal: &GovernorProposal,
        request: &L2TransactionRequest,
        nonce: u64,
        valid_until: Timestamp,
    ) -> Result<Digest, GovernanceError> {
        self.governor_digest("CancelL2GovernorProposal", proposal, request, nonce, valid_until)
    }

    fn governor_digest(
        &self,
        action: &str,
        proposal: &GovernorProposal,
        request: &L2TransactionRequest,
        nonce: u64,
        valid_until: Timestamp,
    ) -> Result<Digest, GovernanceError> {
        Ok(self
            .domain
            .typed(action)
            .digest(&proposal.hash()?)
            .digest(&request.hash()?)
            .u64(nonce)
            .timestamp(valid_until)
            .finish())
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
