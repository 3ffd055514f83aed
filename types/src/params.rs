//! Governance timing parameters.
//!
//! All durations are whole seconds. The defaults are the production values;
//! tests and devnets shrink them through config.

use serde::{Deserialize, Serialize};

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;

/// Durations driving the upgrade lifecycle and the freeze subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    // ── Lifecycle ────────────────────────────────────────────────────────
    /// Initial review window after an upgrade starts.
    #[serde(default = "default_legal_veto_period")]
    pub legal_veto_period_secs: u64,

    /// Total review window once guardians extend it.
    #[serde(default = "default_extended_legal_veto_period")]
    pub extended_legal_veto_period_secs: u64,

    /// Time after the legal veto window during which the upgrade may be
    /// approved; without council approval it expires unless guardians approved.
    #[serde(default = "default_wait_or_expire_period")]
    pub wait_or_expire_period_secs: u64,

    /// Mandatory delay between council approval and readiness.
    #[serde(default = "default_council_approval_delay")]
    pub council_approval_delay_secs: u64,

    /// Mandatory delay after the wait window for guardians-only approval.
    #[serde(default = "default_guardians_approval_delay")]
    pub guardians_approval_delay_secs: u64,

    // ── Freeze ───────────────────────────────────────────────────────────
    /// How long a soft freeze lasts unless lifted early.
    #[serde(default = "default_soft_freeze_period")]
    pub soft_freeze_period_secs: u64,

    /// How long a hard freeze lasts unless lifted early.
    #[serde(default = "default_hard_freeze_period")]
    pub hard_freeze_period_secs: u64,
}

fn default_legal_veto_period() -> u64 {
    3 * DAY
}

fn default_extended_legal_veto_period() -> u64 {
    7 * DAY
}

fn default_wait_or_expire_period() -> u64 {
    90 * DAY
}

fn default_council_approval_delay() -> u64 {
    DAY
}

fn default_guardians_approval_delay() -> u64 {
    2 * DAY
}

fn default_soft_freeze_period() -> u64 {
    12 * HOUR
}

fn default_hard_freeze_period() -> u64 {
    7 * DAY
}

impl GovernanceParams {
    /// Legal veto length for a proposal, depending on whether guardians extended it.
    pub fn legal_veto_period(&self, extended: bool) -> u64 {
        if extended {
            self.extended_legal_veto_period_secs
        } else {
            self.legal_veto_period_secs
        }
    }
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            legal_veto_period_secs: default_legal_veto_period(),
            extended_legal_veto_period_secs: default_extended_legal_veto_period(),
            wait_or_expire_period_secs: default_wait_or_expire_period(),
            council_approval_delay_secs: default_council_approval_delay(),
            guardians_approval_delay_secs: default_guardians_approval_delay(),
            soft_freeze_period_secs: default_soft_freeze_period(),
            hard_freeze_period_secs: default_hard_freeze_period(),
        }
    }
}
