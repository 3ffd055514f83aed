//! Upgrade handler: the lifecycle and freeze transitions.
//!
//! The handler does no signature checking. Callers authorize first, then
//! apply; every method validates all preconditions before it touches the
//! ledger, so a rejected action leaves the ledger unchanged.

use crate::bridge::{InclusionVerifier, L2Message, ProposalInclusion};
use crate::error::GovernanceError;
use crate::events::GovernanceEvent;
use crate::execution::{execute_batch, CallDispatcher};
use crate::freeze::FreezeOutcome;
use crate::ledger::GovernanceLedger;
use crate::lifecycle::{upgrade_state, UpgradeState, UpgradeStatus};
use bastion_crypto::{encode_proposal, proposal_id};
use bastion_types::{Address, GovernanceParams, ProposalId, Timestamp, UpgradeProposal};
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct UpgradeHandler {
    /// The account calls are executed from.
    address: Address,
    /// Governor on the remote chain allowed to start upgrades.
    remote_governor: Address,
    emergency_board: Address,
    params: GovernanceParams,
}

impl UpgradeHandler {
    pub fn new(
        address: Address,
        remote_governor: Address,
        emergency_board: Address,
        params: GovernanceParams,
    ) -> Self {
        Self {
            address,
            remote_governor,
            emergency_board,
            params,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn upgrade_state(
        &self,
        ledger: &GovernanceLedger,
        id: &ProposalId,
        now: Timestamp,
    ) -> UpgradeState {
        upgrade_state(ledger.upgrade_status(id), &self.params, now)
    }

    fn require_state(
        &self,
        ledger: &GovernanceLedger,
        id: &ProposalId,
        now: Timestamp,
        expected: UpgradeState,
        action: &'static str,
    ) -> Result<(), GovernanceError> {
        let state = self.upgrade_state(ledger, id, now);
        if state != expected {
            return Err(GovernanceError::InvalidState {
                action,
                id: *id,
                state,
            });
        }
        Ok(())
    }

    fn status_mut<'a>(
        ledger: &'a mut GovernanceLedger,
        id: &ProposalId,
        action: &'static str,
    ) -> Result<&'a mut UpgradeStatus, GovernanceError> {
        ledger
            .upgrades
            .get_mut(id)
            .ok_or(GovernanceError::InvalidState {
                action,
                id: *id,
                state: UpgradeState::None,
            })
    }

    /// Start an upgrade the remote governor proved it emitted.
    pub fn start_upgrade<V: InclusionVerifier>(
        &self,
        ledger: &mut GovernanceLedger,
        verifier: &V,
        inclusion: &ProposalInclusion,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let proposal = &inclusion.proposal;
        if proposal.executor == self.emergency_board {
            return Err(GovernanceError::EmergencyBoardAsExecutor);
        }

        let message = L2Message {
            tx_number_in_batch: inclusion.tx_number_in_batch,
            sender: self.remote_governor,
            data: encode_proposal(proposal)?,
        };
        if !verifier.prove_message_inclusion(
            inclusion.batch_number,
            inclusion.message_index,
            &message,
            &inclusion.proof,
        ) {
            warn!(
                batch = inclusion.batch_number,
                index = inclusion.message_index,
                "proposal inclusion proof rejected"
            );
            return Err(GovernanceError::InclusionNotProven);
        }

        let id = proposal_id(proposal)?;
        if ledger.upgrades.contains_key(&id) {
            return Err(GovernanceError::UpgradeAlreadyExists(id));
        }

        ledger.upgrades.insert(id, UpgradeStatus::new(now));
        ledger.record(GovernanceEvent::UpgradeStarted {
            id,
            proposal: proposal.clone(),
            at: now,
        });
        info!(%id, calls = proposal.calls.len(), "upgrade started");
        Ok(id)
    }

    pub(crate) fn extend_legal_veto(
        &self,
        ledger: &mut GovernanceLedger,
        id: &ProposalId,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        if ledger
            .upgrade_status(id)
            .is_some_and(|s| s.guardians_extended_legal_veto)
        {
            return Err(GovernanceError::LegalVetoAlreadyExtended);
        }
        self.require_state(ledger, id, now, UpgradeState::LegalVetoPeriod, "extend legal veto of")?;

        Self::status_mut(ledger, id, "extend legal veto of")?.guardians_extended_legal_veto = true;
        ledger.record(GovernanceEvent::LegalVetoExtended { id: *id });
        info!(%id, "legal veto period extended");
        Ok(())
    }

    pub(crate) fn approve_upgrade_council(
        &self,
        ledger: &mut GovernanceLedger,
        id: &ProposalId,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.require_state(ledger, id, now, UpgradeState::Waiting, "council-approve")?;

        Self::status_mut(ledger, id, "council-approve")?.council_approval_timestamp = Some(now);
        ledger.record(GovernanceEvent::ApprovedByCouncil { id: *id, at: now });
        info!(%id, "upgrade approved by security council");
        Ok(())
    }

    pub(crate) fn approve_upgrade_guardians(
        &self,
        ledger: &mut GovernanceLedger,
        id: &ProposalId,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        if ledger.upgrade_status(id).is_some_and(|s| s.guardians_approval) {
            return Err(GovernanceError::AlreadyApprovedByGuardians);
        }
        self.require_state(ledger, id, now, UpgradeState::Waiting, "guardians-approve")?;

        Self::status_mut(ledger, id, "guardians-approve")?.guardians_approval = true;
        ledger.record(GovernanceEvent::ApprovedByGuardians { id: *id });
        info!(%id, "upgrade approved by guardians");
        Ok(())
    }

    /// Execute a ready upgrade. On a reverted call nothing changes and the
    /// upgrade stays ready.
    pub fn execute<D: CallDispatcher>(
        &self,
        ledger: &mut GovernanceLedger,
        dispatcher: &mut D,
        caller: &Address,
        proposal: &UpgradeProposal,
        now: Timestamp,
    ) -> Result<Vec<Vec<u8>>, GovernanceError> {
        if ledger.freeze.is_frozen(now) {
            return Err(GovernanceError::ProtocolFrozen {
                until: ledger.freeze.frozen_until,
            });
        }
        if !proposal.can_be_executed_by(caller) {
            return Err(GovernanceError::UnauthorizedExecutor { caller: *caller });
        }
        let id = proposal_id(proposal)?;
        self.require_state(ledger, &id, now, UpgradeState::Ready, "execute")?;

        let outputs = execute_batch(dispatcher, &self.address, &proposal.calls)?;

        Self::status_mut(ledger, &id, "execute")?.executed = true;
        ledger.freeze.reset_cycle();
        ledger.record(GovernanceEvent::UpgradeExecuted {
            id,
            executor: *caller,
        });
        info!(%id, %caller, "upgrade executed");
        Ok(outputs)
    }

    /// Execute an emergency upgrade. The board has already authorized it;
    /// the timed lifecycle is not consulted.
    pub(crate) fn execute_emergency_upgrade<D: CallDispatcher>(
        &self,
        ledger: &mut GovernanceLedger,
        dispatcher: &mut D,
        proposal: &UpgradeProposal,
    ) -> Result<Vec<Vec<u8>>, GovernanceError> {
        if proposal.executor != self.emergency_board {
            return Err(GovernanceError::EmergencyExecutorMismatch(proposal.executor));
        }
        let id = proposal_id(proposal)?;
        if ledger.emergency.executed.contains(&id) {
            return Err(GovernanceError::EmergencyUpgradeAlreadyExecuted(id));
        }

        let outputs = execute_batch(dispatcher, &self.address, &proposal.calls)?;

        ledger.emergency.executed.insert(id);
        ledger.freeze.reset_cycle();
        ledger.record(GovernanceEvent::EmergencyUpgradeExecuted { id });
        info!(%id, "emergency upgrade executed");
        Ok(outputs)
    }

    pub(crate) fn soft_freeze(
        &self,
        ledger: &mut GovernanceLedger,
        now: Timestamp,
    ) -> Result<FreezeOutcome, GovernanceError> {
        let outcome = ledger.freeze.soft_freeze(&self.params, now)?;
        Self::record_freeze(ledger, outcome);
        Ok(outcome)
    }

    pub(crate) fn hard_freeze(
        &self,
        ledger: &mut GovernanceLedger,
        now: Timestamp,
    ) -> Result<FreezeOutcome, GovernanceError> {
        let outcome = ledger.freeze.hard_freeze(&self.params, now)?;
        Self::record_freeze(ledger, outcome);
        Ok(outcome)
    }

    pub(crate) fn unfreeze(&self, ledger: &mut GovernanceLedger) -> FreezeOutcome {
        let outcome = ledger.freeze.unfreeze();
        Self::record_freeze(ledger, outcome);
        outcome
    }

    fn record_freeze(ledger: &mut GovernanceLedger, outcome: FreezeOutcome) {
        let event = match outcome {
            FreezeOutcome::SoftFrozen { until } => {
                info!(%until, "protocol soft frozen");
                GovernanceEvent::SoftFreeze { until }
            }
            FreezeOutcome::HardFrozen { until } => {
                info!(%until, "protocol hard frozen");
                GovernanceEvent::HardFreeze { until }
            }
            FreezeOutcome::ReinforcedFreeze { until } => {
                info!(%until, "freeze reinforced");
                GovernanceEvent::ReinforceFreeze { until }
            }
            FreezeOutcome::Unfrozen => {
                info!("protocol unfrozen");
                GovernanceEvent::Unfreeze
            }
            FreezeOutcome::ReinforcedUnfreeze => {
                info!("unfreeze reinforced");
                GovernanceEvent::ReinforceUnfreeze
            }
        };
        ledger.record(event);
    }
}
