//! Governance engine: the transaction boundary.
//!
//! Owns the ledger, the three bodies and the injected collaborators. Each
//! action authorizes against the current nonce, applies the transition, and
//! only then consumes the nonce. Failures at any step leave the ledger as it
//! was.

use crate::authorization::{ensure_not_expired, Approvals};
use crate::bridge::{
    GovernorCall, GovernorMessenger, GovernorProposal, InclusionVerifier, L2TransactionRequest,
    ProposalInclusion,
};
use crate::config::GovernanceConfig;
use crate::council::{self, SecurityCouncil};
use crate::emergency::{EmergencyApprovals, EmergencyUpgradeBoard};
use crate::error::GovernanceError;
use crate::events::GovernanceEvent;
use crate::execution::CallDispatcher;
use crate::freeze::FreezeOutcome;
use crate::guardians::{self, Guardians};
use crate::handler::UpgradeHandler;
use crate::ledger::{GovernanceLedger, RECOMMENDED_SOFT_FREEZE_THRESHOLD};
use crate::lifecycle::{UpgradeState, UpgradeStatus};
use bastion_crypto::proposal_id;
use bastion_multisig::{Multisig, SignatureChecker};
use bastion_types::{Address, Digest, ProposalId, Timestamp, UpgradeProposal};
use std::sync::Arc;
use tracing::{debug, info};

pub struct GovernanceEngine<V, D, M> {
    handler: UpgradeHandler,
    council: SecurityCouncil,
    guardians: Guardians,
    board: EmergencyUpgradeBoard,
    checker: SignatureChecker,
    ledger: GovernanceLedger,
    verifier: V,
    dispatcher: D,
    messenger: M,
}

impl<V, D, M> GovernanceEngine<V, D, M>
where
    V: InclusionVerifier,
    D: CallDispatcher,
    M: GovernorMessenger,
{
    /// Build the bodies from a validated config over a fresh ledger.
    pub fn from_config(
        config: &GovernanceConfig,
        verifier: V,
        dispatcher: D,
        messenger: M,
    ) -> Result<Self, GovernanceError> {
        config.validate()?;

        let council = SecurityCouncil::new(config.council_address, config.council_members.clone())?;
        let guardians = Guardians::new(config.guardians_address, config.guardian_members.clone())?;
        let board = EmergencyUpgradeBoard::new(
            config.emergency_board_address,
            council.address(),
            guardians.address(),
            config.foundation,
        );

        // Both bodies can sign as a single principal for the emergency board.
        let mut checker = SignatureChecker::new();
        checker.register(council.address(), Arc::new(council.multisig().clone()));
        checker.register(guardians.address(), Arc::new(guardians.multisig().clone()));

        // `validate` has ruled out collisions with the bodies and duplicates.
        for account in &config.delegated_accounts {
            let multisig = Multisig::new(account.members.clone(), account.threshold)?;
            checker.register(account.address, Arc::new(multisig));
            debug!(
                account = %account.address,
                members = account.members.len(),
                threshold = account.threshold,
                "delegated account registered"
            );
        }

        let handler = UpgradeHandler::new(
            config.handler_address,
            config.remote_governor,
            board.address(),
            config.params.clone(),
        );

        info!(
            handler = %handler.address(),
            council = %council.address(),
            guardians = %guardians.address(),
            board = %board.address(),
            "governance engine initialised"
        );

        Ok(Self {
            handler,
            council,
            guardians,
            board,
            checker,
            ledger: GovernanceLedger::new(),
            verifier,
            dispatcher,
            messenger,
        })
    }

    /// Resume from a previously persisted ledger.
    pub fn with_ledger(mut self, ledger: GovernanceLedger) -> Result<Self, GovernanceError> {
        let threshold = ledger.council.soft_freeze_threshold;
        if threshold == 0 || threshold > council::COUNCIL_SIZE {
            return Err(GovernanceError::InvalidSoftFreezeThreshold {
                threshold,
                max: council::COUNCIL_SIZE,
            });
        }
        self.ledger = ledger;
        Ok(self)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn upgrade_state(&self, id: &ProposalId, now: Timestamp) -> UpgradeState {
        self.handler.upgrade_state(&self.ledger, id, now)
    }

    pub fn upgrade_status(&self, id: &ProposalId) -> Option<&UpgradeStatus> {
        self.ledger.upgrade_status(id)
    }

    pub fn is_frozen(&self, now: Timestamp) -> bool {
        self.ledger.freeze.is_frozen(now)
    }

    pub fn frozen_until(&self) -> Timestamp {
        self.ledger.freeze.frozen_until
    }

    pub fn ledger(&self) -> &GovernanceLedger {
        &self.ledger
    }

    pub fn events(&self) -> &[GovernanceEvent] {
        self.ledger.events()
    }

    pub fn handler(&self) -> &UpgradeHandler {
        &self.handler
    }

    pub fn council(&self) -> &SecurityCouncil {
        &self.council
    }

    pub fn guardians(&self) -> &Guardians {
        &self.guardians
    }

    pub fn emergency_board(&self) -> &EmergencyUpgradeBoard {
        &self.board
    }

    pub fn checker(&self) -> &SignatureChecker {
        &self.checker
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Permissionless: the inclusion proof is the authorization.
    pub fn start_upgrade(
        &mut self,
        inclusion: &ProposalInclusion,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        self.handler
            .start_upgrade(&mut self.ledger, &self.verifier, inclusion, now)
    }

    pub fn extend_legal_veto(
        &mut self,
        id: &ProposalId,
        valid_until: Timestamp,
        approvals: &Approvals,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        ensure_not_expired(valid_until, now)?;
        let digest =
            self.guardians
                .extend_legal_veto_digest(id, self.ledger.guardians.nonce, valid_until);
        self.guardians.authorize(
            &self.checker,
            &digest,
            approvals,
            guardians::EXTEND_LEGAL_VETO_THRESHOLD,
        )?;
        self.handler.extend_legal_veto(&mut self.ledger, id, now)?;
        self.ledger.guardians.nonce += 1;
        Ok(())
    }

    pub fn approve_upgrade_council(
        &mut self,
        id: &ProposalId,
        approvals: &Approvals,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let digest = self.council.approve_upgrade_digest(id);
        self.council.authorize(
            &self.checker,
            &digest,
            approvals,
            council::APPROVE_UPGRADE_THRESHOLD,
        )?;
        self.handler
            .approve_upgrade_council(&mut self.ledger, id, now)
    }

    pub fn approve_upgrade_guardians(
        &mut self,
        id: &ProposalId,
        approvals: &Approvals,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let digest = self.guardians.approve_upgrade_digest(id);
        self.guardians.authorize(
            &self.checker,
            &digest,
            approvals,
            guardians::APPROVE_UPGRADE_THRESHOLD,
        )?;
        self.handler
            .approve_upgrade_guardians(&mut self.ledger, id, now)
    }

    /// Run a ready upgrade's call batch as `caller`. Returns each call's output.
    pub fn execute(
        &mut self,
        caller: &Address,
        proposal: &UpgradeProposal,
        now: Timestamp,
    ) -> Result<Vec<Vec<u8>>, GovernanceError> {
        self.handler
            .execute(&mut self.ledger, &mut self.dispatcher, caller, proposal, now)
    }

    pub fn execute_emergency_upgrade(
        &mut self,
        proposal: &UpgradeProposal,
        approvals: &EmergencyApprovals,
    ) -> Result<Vec<Vec<u8>>, GovernanceError> {
        let id = proposal_id(proposal)?;
        self.board.authorize(&self.checker, &id, approvals)?;
        self.handler
            .execute_emergency_upgrade(&mut self.ledger, &mut self.dispatcher, proposal)
    }

    // ── Freeze ───────────────────────────────────────────────────────────

    pub fn soft_freeze(
        &mut self,
        valid_until: Timestamp,
        approvals: &Approvals,
        now: Timestamp,
    ) -> Result<FreezeOutcome, GovernanceError> {
        ensure_not_expired(valid_until, now)?;
        let state = &self.ledger.council;
        let digest = self
            .council
            .soft_freeze_digest(state.soft_freeze_nonce, valid_until);
        self.council
            .authorize(&self.checker, &digest, approvals, state.soft_freeze_threshold)?;

        let outcome = self.handler.soft_freeze(&mut self.ledger, now)?;
        let state = &mut self.ledger.council;
        state.soft_freeze_nonce += 1;
        state.soft_freeze_threshold = RECOMMENDED_SOFT_FREEZE_THRESHOLD;
        Ok(outcome)
    }

    pub fn hard_freeze(
        &mut self,
        valid_until: Timestamp,
        approvals: &Approvals,
        now: Timestamp,
    ) -> Result<FreezeOutcome, GovernanceError> {
        ensure_not_expired(valid_until, now)?;
        let digest = self
            .council
            .hard_freeze_digest(self.ledger.council.hard_freeze_nonce, valid_until);
        self.council.authorize(
            &self.checker,
            &digest,
            approvals,
            council::HARD_FREEZE_THRESHOLD,
        )?;

        let outcome = self.handler.hard_freeze(&mut self.ledger, now)?;
        self.ledger.council.hard_freeze_nonce += 1;
        Ok(outcome)
    }

    pub fn unfreeze(
        &mut self,
        valid_until: Timestamp,
        approvals: &Approvals,
        now: Timestamp,
    ) -> Result<FreezeOutcome, GovernanceError> {
        ensure_not_expired(valid_until, now)?;
        let digest = self
            .council
            .unfreeze_digest(self.ledger.council.unfreeze_nonce, valid_until);
        self.council.authorize(
            &self.checker,
            &digest,
            approvals,
            council::UNFREEZE_THRESHOLD,
        )?;

        let outcome = self.handler.unfreeze(&mut self.ledger);
        self.ledger.council.unfreeze_nonce += 1;
        Ok(outcome)
    }

    pub fn set_soft_freeze_threshold(
        &mut self,
        threshold: usize,
        valid_until: Timestamp,
        approvals: &Approvals,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        ensure_not_expired(valid_until, now)?;
        if threshold == 0 || threshold > council::COUNCIL_SIZE {
            return Err(GovernanceError::InvalidSoftFreezeThreshold {
                threshold,
                max: council::COUNCIL_SIZE,
            });
        }
        let digest = self.council.set_soft_freeze_threshold_digest(
            threshold,
            self.ledger.council.soft_freeze_threshold_setting_nonce,
            valid_until,
        );
        self.council.authorize(
            &self.checker,
            &digest,
            approvals,
            council::SET_SOFT_FREEZE_THRESHOLD_THRESHOLD,
        )?;

        let state = &mut self.ledger.council;
        state.soft_freeze_threshold = threshold;
        state.soft_freeze_threshold_setting_nonce += 1;
        self.ledger
            .record(GovernanceEvent::SoftFreezeThresholdSet { threshold });
        info!(threshold, "soft freeze threshold set");
        Ok(())
    }

    // ── Remote governor ──────────────────────────────────────────────────

    /// Forward a proposal to the remote governor. Returns the transaction hash.
    pub fn propose_governor_proposal(
        &mut self,
        proposal: &GovernorProposal,
        request: &L2TransactionRequest,
        valid_until: Timestamp,
        approvals: &Approvals,
        now: Timestamp,
    ) -> Result<Digest, GovernanceError> {
        ensure_not_expired(valid_until, now)?;
        let digest =
            self.guardians
                .propose_digest(proposal, request, self.ledger.guardians.nonce, valid_until)?;
        self.guardians
            .authorize(&self.checker, &digest, approvals, guardians::PROPOSE_THRESHOLD)?;

        let tx_hash = self
            .messenger
            .send_governor_call(request, &GovernorCall::Propose(proposal.clone()))
            .map_err(GovernanceError::Messenger)?;
        self.ledger.guardians.nonce += 1;
        self.ledger.record(GovernanceEvent::GovernorProposalForwarded {
            proposal: proposal.clone(),
            tx_hash,
        });
        info!(%tx_hash, "governor proposal forwarded");
        Ok(tx_hash)
    }

    pub fn cancel_governor_proposal(
        &mut self,
        proposal: &GovernorProposal,
        request: &L2TransactionRequest,
        valid_until: Timestamp,
        approvals: &Approvals,
        now: Timestamp,
    ) -> Result<Digest, GovernanceError> {
        ensure_not_expired(valid_until, now)?;
        let digest =
            self.guardians
                .cancel_digest(proposal, request, self.ledger.guardians.nonce, valid_until)?;
        self.guardians
            .authorize(&self.checker, &digest, approvals, guardians::CANCEL_THRESHOLD)?;

        let tx_hash = self
            .messenger
            .send_governor_call(request, &GovernorCall::Cancel(proposal.clone()))
            .map_err(GovernanceError::Messenger)?;
        self.ledger.guardians.nonce += 1;
        self.ledger
            .record(GovernanceEvent::GovernorCancellationForwarded {
                proposal: proposal.clone(),
                tx_hash,
            });
        info!(%tx_hash, "governor cancellation forwarded");
        Ok(tx_hash)
    }
}
