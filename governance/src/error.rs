use crate::config::ConfigError;
use crate::execution::ExecutionError;
use crate::freeze::FreezeStatus;
use crate::lifecycle::UpgradeState;
use bastion_multisig::MultisigError;
use bastion_types::{Address, ProposalId, Timestamp};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    // ── Authorization ────────────────────────────────────────────────────
    #[error("authorization failed: {0}")]
    Authorization(#[from] MultisigError),

    #[error("signature expired: valid until {valid_until}, now {now}")]
    SignatureExpired { valid_until: Timestamp, now: Timestamp },

    #[error("missing or invalid {party} approval for emergency upgrade")]
    EmergencyApprovalInvalid { party: &'static str },

    #[error("{caller} is not authorized to execute this upgrade")]
    UnauthorizedExecutor { caller: Address },

    // ── State preconditions ──────────────────────────────────────────────
    #[error("upgrade {0} already exists")]
    UpgradeAlreadyExists(ProposalId),

    #[error("cannot {action} upgrade {id} in state {state:?}")]
    InvalidState {
        action: &'static str,
        id: ProposalId,
        state: UpgradeState,
    },

    #[error("legal veto period is already extended")]
    LegalVetoAlreadyExtended,

    #[error("upgrade is already approved by guardians")]
    AlreadyApprovedByGuardians,

    #[error("emergency upgrade board can't execute a regular upgrade")]
    EmergencyBoardAsExecutor,

    #[error("emergency upgrade {0} was already executed")]
    EmergencyUpgradeAlreadyExecuted(ProposalId),

    #[error("emergency upgrade must be executed by the board, got executor {0}")]
    EmergencyExecutorMismatch(Address),

    #[error("protocol can't be {action} after {last:?} in this upgrade cycle")]
    FreezeNotAllowed {
        action: &'static str,
        last: FreezeStatus,
    },

    #[error("protocol is frozen until {until}")]
    ProtocolFrozen { until: Timestamp },

    #[error("invalid soft freeze threshold {threshold} (must be 1..={max})")]
    InvalidSoftFreezeThreshold { threshold: usize, max: usize },

    // ── External collaborators ───────────────────────────────────────────
    #[error("failed to prove upgrade proposal inclusion")]
    InclusionNotProven,

    #[error("governor message dispatch failed: {0}")]
    Messenger(String),

    #[error("execution failed: {0}")]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("encoding error: {0}")]
    Encoding(String),
}

impl From<bastion_crypto::CryptoError> for GovernanceError {
    fn from(e: bastion_crypto::CryptoError) -> Self {
        Self::Encoding(e.to_string())
    }
}
