//! Upgrade lifecycle: per-proposal status and the state it implies.
//!
//! Only [`UpgradeStatus`] is stored. The [`UpgradeState`] is recomputed from it
//! and the current time on every read, so there is no scheduler that has to
//! push proposals through time-driven transitions and no stored state that
//! can go stale.
//!
//! ```text
//! None ─start─▶ LegalVetoPeriod ─time─▶ Waiting ─council─▶ ExecutionPending ─time─▶ Ready ─execute─▶ Done
//!                                          │  └─guardians + time──────▲
//!                                          └─time (no approval)─▶ Expired
//! ```

use bastion_types::{GovernanceParams, Timestamp};
use serde::{Deserialize, Serialize};

/// Where an upgrade is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeState {
    /// No record exists.
    None,
    /// Initial review window; guardians may extend it once.
    LegalVetoPeriod,
    /// Awaiting council or guardians approval.
    Waiting,
    /// Approved; mandatory delay running.
    ExecutionPending,
    /// May be executed.
    Ready,
    /// Wait window passed without the approval required to proceed.
    Expired,
    /// Executed. Terminal.
    Done,
}

/// The only persisted per-proposal state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeStatus {
    pub creation_timestamp: Timestamp,
    pub council_approval_timestamp: Option<Timestamp>,
    pub guardians_approval: bool,
    pub guardians_extended_legal_veto: bool,
    pub executed: bool,
}

impl UpgradeStatus {
    pub fn new(creation_timestamp: Timestamp) -> Self {
        Self {
            creation_timestamp,
            council_approval_timestamp: None,
            guardians_approval: false,
            guardians_extended_legal_veto: false,
            executed: false,
        }
    }

    /// The lifecycle state at `now`. Pure and total.
    ///
    /// Windows are measured as time elapsed since their start, never as
    /// shifted deadlines, so nothing saturates near the end of the clock.
    pub fn state(&self, params: &GovernanceParams, now: Timestamp) -> UpgradeState {
        if self.executed {
            return UpgradeState::Done;
        }

        let elapsed = self.creation_timestamp.elapsed_since(now);
        let veto = params.legal_veto_period(self.guardians_extended_legal_veto);
        if elapsed < veto {
            return UpgradeState::LegalVetoPeriod;
        }

        if let Some(approved_at) = self.council_approval_timestamp {
            return if approved_at.elapsed_since(now) < params.council_approval_delay_secs {
                UpgradeState::ExecutionPending
            } else {
                UpgradeState::Ready
            };
        }

        let waited = elapsed - veto;
        if waited < params.wait_or_expire_period_secs {
            return UpgradeState::Waiting;
        }

        if self.guardians_approval {
            let delayed = waited - params.wait_or_expire_period_secs;
            return if delayed < params.guardians_approval_delay_secs {
                UpgradeState::ExecutionPending
            } else {
                UpgradeState::Ready
            };
        }

        UpgradeState::Expired
    }
}

/// Lifecycle state of an optional record: absence is [`UpgradeState::None`].
pub fn upgrade_state(
    status: Option<&UpgradeStatus>,
    params: &GovernanceParams,
    now: Timestamp,
) -> UpgradeState {
    status.map_or(UpgradeState::None, |s| s.state(params, now))
}
