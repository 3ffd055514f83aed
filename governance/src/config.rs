//! Governance deployment configuration with TOML file support.

use crate::council::COUNCIL_SIZE;
use crate::guardians::GUARDIANS_SIZE;
use bastion_types::{Address, GovernanceParams};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A principal that signs as a k-of-n account of its own rather than with a
/// single key. Council members, guardians and the foundation may be one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatedAccountConfig {
    pub address: Address,
    /// Strictly ascending. Members may themselves be delegated accounts.
    pub members: Vec<Address>,
    pub threshold: usize,
}

/// Everything needed to stand up the governance core.
///
/// Load with [`GovernanceConfig::from_toml_file`] or build programmatically
/// (tests do). Call [`GovernanceConfig::validate`] before use; the engine
/// constructor does.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Account upgrade calls are executed from.
    #[serde(default)]
    pub handler_address: Address,

    /// Token governor on the remote chain whose proposals may start upgrades.
    #[serde(default)]
    pub remote_governor: Address,

    #[serde(default)]
    pub council_address: Address,

    #[serde(default)]
    pub guardians_address: Address,

    #[serde(default)]
    pub emergency_board_address: Address,

    /// Third party that co-signs emergency upgrades.
    #[serde(default)]
    pub foundation: Address,

    /// Exactly twelve, strictly ascending.
    #[serde(default)]
    pub council_members: Vec<Address>,

    /// Exactly eight, strictly ascending.
    #[serde(default)]
    pub guardian_members: Vec<Address>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Multi-party principals, registered with the signature checker.
    #[serde(default)]
    pub delegated_accounts: Vec<DelegatedAccountConfig>,

    #[serde(default)]
    pub params: GovernanceParams,
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl GovernanceConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Structural checks that must hold before any body is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("handler_address", self.handler_address),
            ("remote_governor", self.remote_governor),
            ("council_address", self.council_address),
            ("guardians_address", self.guardians_address),
            ("emergency_board_address", self.emergency_board_address),
            ("foundation", self.foundation),
        ];
        if let Some((name, _)) = named.iter().find(|(_, a)| a.is_zero()) {
            return Err(ConfigError::Invalid(format!("{name} must be set")));
        }
        let bodies = [
            self.handler_address,
            self.council_address,
            self.guardians_address,
            self.emergency_board_address,
        ];
        for (i, a) in bodies.iter().enumerate() {
            if bodies[i + 1..].contains(a) {
                return Err(ConfigError::Invalid(format!(
                    "address {a} is used by more than one body"
                )));
            }
        }

        check_members("council_members", &self.council_members, COUNCIL_SIZE)?;
        check_members("guardian_members", &self.guardian_members, GUARDIANS_SIZE)?;

        let mut seen = Vec::with_capacity(self.delegated_accounts.len());
        for account in &self.delegated_accounts {
            check_delegated_account(account, &bodies)?;
            if seen.contains(&account.address) {
                return Err(ConfigError::Invalid(format!(
                    "delegated account {} is listed twice",
                    account.address
                )));
            }
            seen.push(account.address);
        }

        let p = &self.params;
        if p.legal_veto_period_secs == 0 {
            return Err(ConfigError::Invalid("legal veto period must be positive".into()));
        }
        if p.extended_legal_veto_period_secs < p.legal_veto_period_secs {
            return Err(ConfigError::Invalid(
                "extended legal veto period is shorter than the standard one".into(),
            ));
        }
        if p.soft_freeze_period_secs == 0 || p.hard_freeze_period_secs == 0 {
            return Err(ConfigError::Invalid("freeze periods must be positive".into()));
        }
        if !matches!(self.log_format.as_str(), "human" | "json") {
            return Err(ConfigError::Invalid(format!(
                "unknown log format {:?}",
                self.log_format
            )));
        }
        Ok(())
    }
}

fn check_members(name: &str, members: &[Address], expected: usize) -> Result<(), ConfigError> {
    if members.len() != expected {
        return Err(ConfigError::Invalid(format!(
            "{name}: expected {expected} members, got {}",
            members.len()
        )));
    }
    if members.iter().any(Address::is_zero) {
        return Err(ConfigError::Invalid(format!("{name}: zero address member")));
    }
    if members.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ConfigError::Invalid(format!(
            "{name}: members must be strictly ascending"
        )));
    }
    Ok(())
}

fn check_delegated_account(
    account: &DelegatedAccountConfig,
    bodies: &[Address],
) -> Result<(), ConfigError> {
    let address = account.address;
    if address.is_zero() {
        return Err(ConfigError::Invalid("delegated account address must be set".into()));
    }
    if bodies.contains(&address) {
        return Err(ConfigError::Invalid(format!(
            "delegated account {address} collides with a body address"
        )));
    }
    if account.members.is_empty() || account.members.iter().any(Address::is_zero) {
        return Err(ConfigError::Invalid(format!(
            "delegated account {address}: members must be non-empty and non-zero"
        )));
    }
    if account.members.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ConfigError::Invalid(format!(
            "delegated account {address}: members must be strictly ascending"
        )));
    }
    if account.threshold == 0 || account.threshold > account.members.len() {
        return Err(ConfigError::Invalid(format!(
            "delegated account {address}: threshold {} out of 1..={}",
            account.threshold,
            account.members.len()
        )));
    }
    Ok(())
}
