//! Bastion CLI: operator and signer tooling for the governance core.
//!
//! Members sign digests off-line; this tool computes exactly what they sign
//! and produces the signatures. It never submits anything.

use anyhow::{bail, Context};
use bastion_crypto::{generate_keypair, keypair_from_private, proposal_id, sign_digest};
use bastion_governance::{EmergencyUpgradeBoard, GovernanceConfig, Guardians, SecurityCouncil};
use bastion_types::{Digest, PrivateKey, Timestamp, UpgradeProposal};
use bastion_utils::{format_duration, init_logging, LogFormat};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "bastion", about = "Bastion upgrade governance tooling")]
struct Cli {
    /// Path to the governance TOML configuration file.
    #[arg(long, env = "BASTION_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Defaults to the config file's value.
    #[arg(long, env = "BASTION_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Log format: "human" or "json". Defaults to the config file's value.
    #[arg(long, env = "BASTION_LOG_FORMAT", global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the configuration and print the deployment summary.
    CheckConfig,

    /// Print the id of an upgrade proposal stored as TOML.
    ProposalId {
        /// TOML file with `calls`, `executor` and `salt`.
        proposal: PathBuf,
    },

    /// Print the digest members must sign for a body action.
    Digest {
        #[command(subcommand)]
        action: DigestAction,
    },

    /// Generate a new Ed25519 signing key.
    Keygen,

    /// Sign a digest with the key in BASTION_SIGNING_KEY (hex seed).
    Sign {
        /// The 32-byte digest, hex.
        digest: Digest,

        #[arg(long, env = "BASTION_SIGNING_KEY", hide_env_values = true)]
        key: String,
    },
}

#[derive(Subcommand)]
enum DigestAction {
    CouncilApprove {
        id: Digest,
    },
    GuardiansApprove {
        id: Digest,
    },
    ExtendLegalVeto {
        id: Digest,
        #[arg(long)]
        nonce: u64,
        #[arg(long)]
        valid_until: u64,
    },
    SoftFreeze {
        #[arg(long)]
        nonce: u64,
        #[arg(long)]
        valid_until: u64,
    },
    HardFreeze {
        #[arg(long)]
        nonce: u64,
        #[arg(long)]
        valid_until: u64,
    },
    Unfreeze {
        #[arg(long)]
        nonce: u64,
        #[arg(long)]
        valid_until: u64,
    },
    SetSoftFreezeThreshold {
        threshold: usize,
        #[arg(long)]
        nonce: u64,
        #[arg(long)]
        valid_until: u64,
    },
    Emergency {
        id: Digest,
        #[arg(long, value_enum)]
        party: Party,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Party {
    Council,
    Guardians,
    Foundation,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "warn".to_string());
    let format: LogFormat = cli
        .log_format
        .clone()
        .or_else(|| config.as_ref().map(|c| c.log_format.clone()))
        .unwrap_or_else(|| "human".to_string())
        .parse()?;
    init_logging(format, &level)?;

    match cli.command {
        Command::CheckConfig => check_config(require(config)?),
        Command::ProposalId { proposal } => print_proposal_id(&proposal),
        Command::Digest { action } => print_digest(&require(config)?, action),
        Command::Keygen => keygen(),
        Command::Sign { digest, key } => sign(&digest, &key),
    }
}

fn load_config(path: &Path) -> anyhow::Result<GovernanceConfig> {
    let config = GovernanceConfig::from_toml_file(path)
        .with_context(|| format!("loading {}", path.display()))?;
    config.validate()?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

fn require(config: Option<GovernanceConfig>) -> anyhow::Result<GovernanceConfig> {
    match config {
        Some(config) => Ok(config),
        None => bail!("this command needs --config"),
    }
}

fn check_config(config: GovernanceConfig) -> anyhow::Result<()> {
    let p = &config.params;
    println!("handler            {}", config.handler_address);
    println!("remote governor    {}", config.remote_governor);
    println!(
        "security council   {} ({} members)",
        config.council_address,
        config.council_members.len()
    );
    println!(
        "guardians          {} ({} members)",
        config.guardians_address,
        config.guardian_members.len()
    );
    println!("emergency board    {}", config.emergency_board_address);
    println!("delegated accounts {}", config.delegated_accounts.len());
    println!("foundation         {}", config.foundation);
    println!("legal veto         {}", format_duration(p.legal_veto_period_secs));
    println!("extended veto      {}", format_duration(p.extended_legal_veto_period_secs));
    println!("wait or expire     {}", format_duration(p.wait_or_expire_period_secs));
    println!("council delay      {}", format_duration(p.council_approval_delay_secs));
    println!("guardians delay    {}", format_duration(p.guardians_approval_delay_secs));
    println!("soft freeze        {}", format_duration(p.soft_freeze_period_secs));
    println!("hard freeze        {}", format_duration(p.hard_freeze_period_secs));
    info!("config ok");
    Ok(())
}

fn print_proposal_id(path: &Path) -> anyhow::Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let proposal: UpgradeProposal = toml::from_str(&content).context("parsing proposal")?;
    let id = proposal_id(&proposal)?;
    debug!(calls = proposal.calls.len(), %id, "proposal hashed");
    println!("{id}");
    Ok(())
}

fn print_digest(config: &GovernanceConfig, action: DigestAction) -> anyhow::Result<()> {
    let council = SecurityCouncil::new(config.council_address, config.council_members.clone())?;
    let guardians = Guardians::new(config.guardians_address, config.guardian_members.clone())?;
    let board = EmergencyUpgradeBoard::new(
        config.emergency_board_address,
        council.address(),
        guardians.address(),
        config.foundation,
    );

    let digest = match action {
        DigestAction::CouncilApprove { id } => council.approve_upgrade_digest(&id),
        DigestAction::GuardiansApprove { id } => guardians.approve_upgrade_digest(&id),
        DigestAction::ExtendLegalVeto {
            id,
            nonce,
            valid_until,
        } => guardians.extend_legal_veto_digest(&id, nonce, Timestamp::new(valid_until)),
        DigestAction::SoftFreeze { nonce, valid_until } => {
            council.soft_freeze_digest(nonce, Timestamp::new(valid_until))
        }
        DigestAction::HardFreeze { nonce, valid_until } => {
            council.hard_freeze_digest(nonce, Timestamp::new(valid_until))
        }
        DigestAction::Unfreeze { nonce, valid_until } => {
            council.unfreeze_digest(nonce, Timestamp::new(valid_until))
        }
        DigestAction::SetSoftFreezeThreshold {
            threshold,
            nonce,
            valid_until,
        } => {
            council.set_soft_freeze_threshold_digest(threshold, nonce, Timestamp::new(valid_until))
        }
        DigestAction::Emergency { id, party } => match party {
            Party::Council => board.council_digest(&id),
            Party::Guardians => board.guardians_digest(&id),
            Party::Foundation => board.foundation_digest(&id),
        },
    };
    println!("{digest}");
    Ok(())
}

fn keygen() -> anyhow::Result<()> {
    let keypair = generate_keypair()?;
    println!("address     {}", keypair.address());
    println!("signing key {}", hex::encode(keypair.private.0));
    Ok(())
}

fn sign(digest: &Digest, key: &str) -> anyhow::Result<()> {
    let bytes = hex::decode(key.trim().trim_start_matches("0x")).context("signing key is not hex")?;
    let seed: [u8; 32] = match bytes.try_into() {
        Ok(seed) => seed,
        Err(_) => bail!("signing key must be 32 bytes"),
    };
    let keypair = keypair_from_private(PrivateKey(seed));
    let signature = sign_digest(digest, &keypair.private);
    println!("signer    {}", keypair.address());
    println!("signature 0x{}", hex::encode(signature.as_bytes()));
    Ok(())
}
