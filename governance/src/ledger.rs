//! The single authoritative governance store.
//!
//! Every action is a serialized transaction against one [`GovernanceLedger`]:
//! the proposal table, the freeze record, per-body nonces and the event log.

use crate::events::GovernanceEvent;
use crate::freeze::FreezeRecord;
use crate::lifecycle::UpgradeStatus;
use bastion_types::ProposalId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Soft freeze threshold the council falls back to after every soft freeze.
pub const RECOMMENDED_SOFT_FREEZE_THRESHOLD: usize = 3;

/// Council nonces, one per action family, plus the adjustable soft freeze threshold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilState {
    pub soft_freeze_nonce: u64,
    pub hard_freeze_nonce: u64,
    pub soft_freeze_threshold_setting_nonce: u64,
    pub unfreeze_nonce: u64,
    pub soft_freeze_threshold: usize,
}

impl Default for CouncilState {
    fn default() -> Self {
        Self {
            soft_freeze_nonce: 0,
            hard_freeze_nonce: 0,
            soft_freeze_threshold_setting_nonce: 0,
            unfreeze_nonce: 0,
            soft_freeze_threshold: RECOMMENDED_SOFT_FREEZE_THRESHOLD,
        }
    }
}

/// Guardians share one nonce across every nonce-bound action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardiansState {
    pub nonce: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyState {
    pub executed: BTreeSet<ProposalId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceLedger {
    pub upgrades: BTreeMap<ProposalId, UpgradeStatus>,
    pub freeze: FreezeRecord,
    pub council: CouncilState,
    pub guardians: GuardiansState,
    pub emergency: EmergencyState,
    pub events: Vec<GovernanceEvent>,
}

impl GovernanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upgrade_status(&self, id: &ProposalId) -> Option<&UpgradeStatus> {
        self.upgrades.get(id)
    }

    pub fn record(&mut self, event: GovernanceEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GovernanceEvent] {
        &self.events
    }

    /// Binary snapshot of the whole ledger.
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
