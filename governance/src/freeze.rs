//! Protocol-wide freeze: the council's emergency brake.
//!
//! The freeze kind is tracked per upgrade cycle (the span between two executed
//! upgrades). Within a cycle the council may soft freeze once, escalate to a
//! hard freeze, and unfreeze; it cannot hard freeze again after a hard freeze
//! or soft freeze again after any freeze. Executing an upgrade starts a new cycle.
//!
//! | last in cycle     | soft freeze   | hard freeze   | unfreeze          |
//! |-------------------|---------------|---------------|-------------------|
//! | None              | → Soft        | → Hard        | reinforce         |
//! | Soft (active)     | reinforce     | → Hard        | → AfterSoftFreeze |
//! | Soft (lapsed)     | rejected      | → Hard        | → AfterSoftFreeze |
//! | Hard (active)     | reinforce     | reinforce     | → AfterHardFreeze |
//! | Hard (lapsed)     | rejected      | rejected      | → AfterHardFreeze |
//! | AfterSoftFreeze   | rejected      | → Hard        | reinforce         |
//! | AfterHardFreeze   | rejected      | rejected      | reinforce         |

use crate::error::GovernanceError;
use bastion_types::{GovernanceParams, Timestamp};
use serde::{Deserialize, Serialize};

/// The last freeze action taken in the current upgrade cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FreezeStatus {
    #[default]
    None,
    Soft,
    Hard,
    AfterSoftFreeze,
    AfterHardFreeze,
}

/// What a freeze action did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreezeOutcome {
    SoftFrozen { until: Timestamp },
    HardFrozen { until: Timestamp },
    /// Already frozen; nothing changed.
    ReinforcedFreeze { until: Timestamp },
    Unfrozen,
    /// Already unfrozen; nothing changed.
    ReinforcedUnfreeze,
}

/// The single protocol-wide freeze record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeRecord {
    pub last_freeze_in_cycle: FreezeStatus,
    /// [`Timestamp::EPOCH`] when not frozen.
    pub frozen_until: Timestamp,
}

impl FreezeRecord {
    /// Whether the protocol is frozen at `now`. Freezes lapse on their own.
    pub fn is_frozen(&self, now: Timestamp) -> bool {
        now < self.frozen_until
    }

    pub fn soft_freeze(
        &mut self,
        params: &GovernanceParams,
        now: Timestamp,
    ) -> Result<FreezeOutcome, GovernanceError> {
        if self.is_frozen(now) {
            return Ok(FreezeOutcome::ReinforcedFreeze {
                until: self.frozen_until,
            });
        }
        if self.last_freeze_in_cycle != FreezeStatus::None {
            return Err(GovernanceError::FreezeNotAllowed {
                action: "soft frozen",
                last: self.last_freeze_in_cycle,
            });
        }
        let until = now.plus(params.soft_freeze_period_secs);
        self.last_freeze_in_cycle = FreezeStatus::Soft;
        self.frozen_until = until;
        Ok(FreezeOutcome::SoftFrozen { until })
    }

    pub fn hard_freeze(
        &mut self,
        params: &GovernanceParams,
        now: Timestamp,
    ) -> Result<FreezeOutcome, GovernanceError> {
        match self.last_freeze_in_cycle {
            FreezeStatus::None | FreezeStatus::Soft | FreezeStatus::AfterSoftFreeze => {
                let until = now.plus(params.hard_freeze_period_secs);
                self.last_freeze_in_cycle = FreezeStatus::Hard;
                self.frozen_until = until;
                Ok(FreezeOutcome::HardFrozen { until })
            }
            FreezeStatus::Hard if self.is_frozen(now) => Ok(FreezeOutcome::ReinforcedFreeze {
                until: self.frozen_until,
            }),
            last => Err(GovernanceError::FreezeNotAllowed {
                action: "hard frozen",
                last,
            }),
        }
    }

    pub fn unfreeze(&mut self) -> FreezeOutcome {
        let next = match self.last_freeze_in_cycle {
            FreezeStatus::Soft => FreezeStatus::AfterSoftFreeze,
            FreezeStatus::Hard => FreezeStatus::AfterHardFreeze,
            _ => return FreezeOutcome::ReinforcedUnfreeze,
        };
        self.last_freeze_in_cycle = next;
        self.frozen_until = Timestamp::EPOCH;
        FreezeOutcome::Unfrozen
    }

    /// Start a new upgrade cycle.
    pub fn reset_cycle(&mut self) {
        self.last_freeze_in_cycle = FreezeStatus::None;
        self.frozen_until = Timestamp::EPOCH;
    }
}
