//! Upgrade governance core.
//!
//! Irreversible changes to the platform ("upgrades") are gated behind a
//! time-boxed, multi-body approval process:
//!
//! - an upgrade starts when the remote token governor proves it emitted the
//!   proposal ([`bridge`]),
//! - it sits in a legal veto window, then waits for approval from the
//!   [`SecurityCouncil`] (fast path) or the [`Guardians`] (slow path),
//! - after a mandatory delay anyone (or its designated executor) runs its call
//!   batch atomically ([`execution`]).
//!
//! The [`EmergencyUpgradeBoard`] bypasses the timers with sign-off from all
//! three parties, and the council can freeze the protocol ([`freeze`]).
//!
//! Lifecycle state is never stored; see [`lifecycle`].

pub mod authorization;
pub mod bridge;
pub mod config;
pub mod council;
pub mod emergency;
pub mod engine;
pub mod error;
pub mod events;
pub mod execution;
pub mod freeze;
pub mod guardians;
pub mod handler;
pub mod ledger;
pub mod lifecycle;

pub use authorization::{ensure_not_expired, Approvals};
pub use bridge::{
    GovernorCall, GovernorMessenger, GovernorProposal, InclusionVerifier, L2Message,
    L2TransactionRequest, ProposalInclusion,
};
pub use config::{ConfigError, DelegatedAccountConfig, GovernanceConfig};
pub use council::SecurityCouncil;
pub use emergency::{EmergencyApprovals, EmergencyUpgradeBoard};
pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use events::GovernanceEvent;
pub use execution::{execute_batch, CallDispatcher, CallRevert, ExecutionError};
pub use freeze::{FreezeOutcome, FreezeRecord, FreezeStatus};
pub use guardians::Guardians;
pub use handler::UpgradeHandler;
pub use ledger::{
    CouncilState, EmergencyState, GovernanceLedger, GuardiansState,
    RECOMMENDED_SOFT_FREEZE_THRESHOLD,
};
pub use lifecycle::{upgrade_state, UpgradeState, UpgradeStatus};
