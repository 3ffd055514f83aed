//! End-to-end governance flows with real keys and nullable collaborators.

use bastion_crypto::{encode_proposal, keypair_from_seed, proposal_id, sign_digest};
use bastion_governance::*;
use bastion_multisig::MultisigError;
use bastion_nullables::{NullClock, NullDispatcher, NullInclusionVerifier, NullMessenger};
use bastion_types::{
    Address, Call, Digest, GovernanceParams, KeyPair, ProposalId, Timestamp, UpgradeProposal,
};

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;
const T0: u64 = 1_700_000_000;

const HANDLER: Address = Address::new([0xAA; 32]);
const REMOTE_GOVERNOR: Address = Address::new([0x60; 32]);
const COUNCIL: Address = Address::new([0xC0; 32]);
const GUARDIANS: Address = Address::new([0x6A; 32]);
const BOARD: Address = Address::new([0xEB; 32]);

type Engine = GovernanceEngine<NullInclusionVerifier, NullDispatcher, NullMessenger>;

struct Fixture {
    council: Vec<KeyPair>,
    guardians: Vec<KeyPair>,
    foundation: KeyPair,
    clock: NullClock,
    engine: Engine,
}

fn sorted_keys(seeds: std::ops::RangeInclusive<u8>) -> Vec<KeyPair> {
    let mut keys: Vec<KeyPair> = seeds.map(|i| keypair_from_seed(&[i; 32])).collect();
    keys.sort_by_key(|k| k.address());
    keys
}

fn config(council: &[KeyPair], guardians: &[KeyPair], foundation: &KeyPair) -> GovernanceConfig {
    GovernanceConfig {
        handler_address: HANDLER,
        remote_governor: REMOTE_GOVERNOR,
        council_address: COUNCIL,
        guardians_address: GUARDIANS,
        emergency_board_address: BOARD,
        foundation: foundation.address(),
        council_members: council.iter().map(KeyPair::address).collect(),
        guardian_members: guardians.iter().map(KeyPair::address).collect(),
        log_format: "human".into(),
        log_level: "info".into(),
        delegated_accounts: Vec::new(),
        params: GovernanceParams::default(),
    }
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(|_| {})
    }

    fn with_config(adjust: impl FnOnce(&mut GovernanceConfig)) -> Self {
        let council = sorted_keys(1..=12);
        let guardians = sorted_keys(21..=28);
        let foundation = keypair_from_seed(&[99; 32]);
        let mut config = config(&council, &guardians, &foundation);
        adjust(&mut config);
        let engine = Engine::from_config(
            &config,
            NullInclusionVerifier::new(),
            NullDispatcher::new(),
            NullMessenger::new(),
        )
        .unwrap();
        Self {
            council,
            guardians,
            foundation,
            clock: NullClock::new(T0),
            engine,
        }
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn council_sign(&self, digest: &Digest, n: usize) -> Approvals {
        let keys: Vec<&KeyPair> = self.council.iter().take(n).collect();
        Approvals::sign(digest, &keys)
    }

    fn guardians_sign(&self, digest: &Digest, n: usize) -> Approvals {
        let keys: Vec<&KeyPair> = self.guardians.iter().take(n).collect();
        Approvals::sign(digest, &keys)
    }

    fn start(&mut self, proposal: &UpgradeProposal) -> ProposalId {
        let now = self.now();
        self.engine.start_upgrade(&inclusion(proposal), now).unwrap()
    }

    fn council_approve(&mut self, id: &ProposalId) -> Result<(), GovernanceError> {
        let digest = self.engine.council().approve_upgrade_digest(id);
        let approvals = self.council_sign(&digest, 6);
        let now = self.now();
        self.engine.approve_upgrade_council(id, &approvals, now)
    }

    fn guardians_approve(&mut self, id: &ProposalId) -> Result<(), GovernanceError> {
        let digest = self.engine.guardians().approve_upgrade_digest(id);
        let approvals = self.guardians_sign(&digest, 5);
        let now = self.now();
        self.engine.approve_upgrade_guardians(id, &approvals, now)
    }

    fn soft_freeze(&mut self, signers: usize) -> Result<FreezeOutcome, GovernanceError> {
        let valid_until = self.clock.deadline(1000);
        let nonce = self.engine.ledger().council.soft_freeze_nonce;
        let digest = self.engine.council().soft_freeze_digest(nonce, valid_until);
        let approvals = self.council_sign(&digest, signers);
        let now = self.now();
        self.engine.soft_freeze(valid_until, &approvals, now)
    }

    fn hard_freeze(&mut self) -> Result<FreezeOutcome, GovernanceError> {
        let valid_until = self.clock.deadline(1000);
        let nonce = self.engine.ledger().council.hard_freeze_nonce;
        let digest = self.engine.council().hard_freeze_digest(nonce, valid_until);
        let approvals = self.council_sign(&digest, 9);
        let now = self.now();
        self.engine.hard_freeze(valid_until, &approvals, now)
    }

    fn unfreeze(&mut self) -> Result<FreezeOutcome, GovernanceError> {
        let valid_until = self.clock.deadline(1000);
        let nonce = self.engine.ledger().council.unfreeze_nonce;
        let digest = self.engine.council().unfreeze_digest(nonce, valid_until);
        let approvals = self.council_sign(&digest, 9);
        let now = self.now();
        self.engine.unfreeze(valid_until, &approvals, now)
    }

    fn emergency_approvals(&self, id: &ProposalId) -> EmergencyApprovals {
        let board = self.engine.emergency_board();
        EmergencyApprovals {
            council: self
                .council_sign(&board.council_digest(id), 9)
                .to_delegated_signature()
                .unwrap(),
            guardians: self
                .guardians_sign(&board.guardians_digest(id), 5)
                .to_delegated_signature()
                .unwrap(),
            foundation: sign_digest(&board.foundation_digest(id), &self.foundation.private)
                .to_vec(),
        }
    }

    fn state(&self, id: &ProposalId) -> UpgradeState {
        self.engine.upgrade_state(id, self.now())
    }
}

fn proposal(salt: u8) -> UpgradeProposal {
    UpgradeProposal {
        calls: vec![
            Call {
                target: Address::new([0x01; 32]),
                value: 0,
                data: b"transferOwnership".to_vec(),
            },
            Call {
                target: Address::new([0x02; 32]),
                value: 10,
                data: b"grantRole".to_vec(),
            },
        ],
        executor: Address::ZERO,
        salt: [salt; 32],
    }
}

fn inclusion(proposal: &UpgradeProposal) -> ProposalInclusion {
    ProposalInclusion {
        batch_number: 42,
        message_index: 3,
        tx_number_in_batch: 7,
        proof: vec![],
        proposal: proposal.clone(),
    }
}

// ── Lifecycle ────────────────────────────────────────────────────────────

#[test]
fn start_passes_governor_message_to_verifier() {
    let mut f = Fixture::new();
    let p = proposal(1);
    let id = f.start(&p);
    assert_eq!(id, proposal_id(&p).unwrap());
    assert_eq!(f.state(&id), UpgradeState::LegalVetoPeriod);
    assert_eq!(
        f.engine.upgrade_status(&id).unwrap().creation_timestamp,
        Timestamp::new(T0)
    );

    let queries = f.engine.verifier().queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].batch_number, 42);
    assert_eq!(queries[0].message_index, 3);
    assert_eq!(queries[0].message.tx_number_in_batch, 7);
    assert_eq!(queries[0].message.sender, REMOTE_GOVERNOR);
    assert_eq!(queries[0].message.data, encode_proposal(&p).unwrap());
}

#[test]
fn rejected_proof_creates_nothing() {
    let f = Fixture::new();
    let mut engine = Engine::from_config(
        &fixture_config(&f),
        NullInclusionVerifier::rejecting(),
        NullDispatcher::new(),
        NullMessenger::new(),
    )
    .unwrap();
    let p = proposal(1);
    let now = f.now();
    assert!(matches!(
        engine.start_upgrade(&inclusion(&p), now),
        Err(GovernanceError::InclusionNotProven)
    ));
    assert_eq!(
        engine.upgrade_state(&proposal_id(&p).unwrap(), now),
        UpgradeState::None
    );
    assert!(engine.events().is_empty());
}

#[test]
fn invalid_config_is_refused() {
    let result = Engine::from_config(
        &GovernanceConfig::default(),
        NullInclusionVerifier::new(),
        NullDispatcher::new(),
        NullMessenger::new(),
    );
    assert!(matches!(result, Err(GovernanceError::Config(_))));
}

fn fixture_config(f: &Fixture) -> GovernanceConfig {
    config(&f.council, &f.guardians, &f.foundation)
}

#[test]
fn identical_proposal_cannot_start_twice() {
    let mut f = Fixture::new();
    let id = f.start(&proposal(1));
    f.clock.advance(500 * DAY);
    let now = f.now();
    let err = f
        .engine
        .start_upgrade(&inclusion(&proposal(1)), now)
        .unwrap_err();
    assert!(matches!(err, GovernanceError::UpgradeAlreadyExists(e) if e == id));

    // A different salt is a different upgrade.
    f.start(&proposal(2));
}

#[test]
fn guardians_then_council_path_reaches_done() {
    let mut f = Fixture::new();
    let p = proposal(1);
    let id = f.start(&p);

    // One second before the veto window closes, guardians are too early.
    f.clock.set(T0 + 3 * DAY - 1);
    assert!(matches!(
        f.guardians_approve(&id),
        Err(GovernanceError::InvalidState {
            state: UpgradeState::LegalVetoPeriod,
            ..
        })
    ));

    f.clock.set(T0 + 3 * DAY);
    assert_eq!(f.state(&id), UpgradeState::Waiting);
    f.guardians_approve(&id).unwrap();
    assert_eq!(f.state(&id), UpgradeState::Waiting);

    f.clock.advance(10 * DAY);
    f.council_approve(&id).unwrap();
    assert_eq!(f.state(&id), UpgradeState::ExecutionPending);

    f.clock.advance(DAY - 1);
    assert_eq!(f.state(&id), UpgradeState::ExecutionPending);
    let now = f.now();
    assert!(matches!(
        f.engine.execute(&Address::new([5; 32]), &p, now),
        Err(GovernanceError::InvalidState {
            state: UpgradeState::ExecutionPending,
            ..
        })
    ));

    f.clock.advance(1);
    assert_eq!(f.state(&id), UpgradeState::Ready);
    let now = f.now();
    f.engine.execute(&Address::new([5; 32]), &p, now).unwrap();

    assert_eq!(f.state(&id), UpgradeState::Done);
    assert!(f.engine.upgrade_status(&id).unwrap().executed);
    let calls = f.engine.dispatcher().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.sender == HANDLER));
    assert_eq!(f.engine.dispatcher().balance(&Address::new([0x02; 32])), 10);

    // Done is terminal.
    let now = f.now();
    assert!(f.engine.execute(&Address::ZERO, &p, now).is_err());
}

#[test]
fn guardians_only_approval_waits_for_window_and_delay() {
    let mut f = Fixture::new();
    let p = proposal(1);
    let id = f.start(&p);
    f.clock.set(T0 + 3 * DAY);
    f.guardians_approve(&id).unwrap();

    let wait_end = T0 + 3 * DAY + 90 * DAY;
    f.clock.set(wait_end);
    assert_eq!(f.state(&id), UpgradeState::ExecutionPending);
    f.clock.set(wait_end + 2 * DAY);
    assert_eq!(f.state(&id), UpgradeState::Ready);
    let now = f.now();
    assert!(f.engine.execute(&Address::ZERO, &p, now).is_ok());
}

#[test]
fn unapproved_upgrade_expires_and_cannot_execute() {
    let mut f = Fixture::new();
    let p = proposal(1);
    let id = f.start(&p);
    f.clock.set(T0 + 3 * DAY + 90 * DAY);
    assert_eq!(f.state(&id), UpgradeState::Expired);

    let now = f.now();
    assert!(matches!(
        f.engine.execute(&Address::ZERO, &p, now),
        Err(GovernanceError::InvalidState {
            state: UpgradeState::Expired,
            ..
        })
    ));
    assert!(f.council_approve(&id).is_err());
    assert!(f.engine.dispatcher().calls().is_empty());
}

#[test]
fn extension_moves_waiting_back() {
    let mut f = Fixture::new();
    let id = f.start(&proposal(1));
    f.clock.advance(DAY);

    let valid_until = f.clock.deadline(HOUR);
    let digest = f
        .engine
        .guardians()
        .extend_legal_veto_digest(&id, 0, valid_until);
    let approvals = f.guardians_sign(&digest, 2);
    let now = f.now();
    f.engine
        .extend_legal_veto(&id, valid_until, &approvals, now)
        .unwrap();
    assert_eq!(f.engine.ledger().guardians.nonce, 1);

    f.clock.set(T0 + 3 * DAY);
    assert_eq!(f.state(&id), UpgradeState::LegalVetoPeriod);
    f.clock.set(T0 + 7 * DAY);
    assert_eq!(f.state(&id), UpgradeState::Waiting);
}

#[test]
fn replayed_extension_is_rejected() {
    let mut f = Fixture::new();
    let first = f.start(&proposal(1));
    let valid_until = f.clock.deadline(HOUR);
    let digest = f
        .engine
        .guardians()
        .extend_legal_veto_digest(&first, 0, valid_until);
    let approvals = f.guardians_sign(&digest, 2);
    let now = f.now();
    f.engine
        .extend_legal_veto(&first, valid_until, &approvals, now)
        .unwrap();

    // The already-extended flag would catch the same id; a different id with
    // the old nonce fails on signatures.
    let second = f.start(&proposal(2));
    let digest = f
        .engine
        .guardians()
        .extend_legal_veto_digest(&second, 0, valid_until);
    let stale = f.guardians_sign(&digest, 2);
    assert!(matches!(
        f.engine.extend_legal_veto(&second, valid_until, &stale, now),
        Err(GovernanceError::Authorization(MultisigError::InvalidSignature(_)))
    ));
    assert_eq!(f.engine.ledger().guardians.nonce, 1);
}

#[test]
fn insufficient_or_foreign_signatures_are_rejected() {
    let mut f = Fixture::new();
    let id = f.start(&proposal(1));
    f.clock.set(T0 + 3 * DAY);

    let digest = f.engine.council().approve_upgrade_digest(&id);
    let five = f.council_sign(&digest, 5);
    let now = f.now();
    assert!(matches!(
        f.engine.approve_upgrade_council(&id, &five, now),
        Err(GovernanceError::Authorization(
            MultisigError::InsufficientSignatures { .. }
        ))
    ));

    // Guardian keys are not council members.
    let outsiders = Approvals::sign(
        &digest,
        &f.guardians.iter().take(6).collect::<Vec<_>>(),
    );
    assert!(matches!(
        f.engine.approve_upgrade_council(&id, &outsiders, now),
        Err(GovernanceError::Authorization(MultisigError::NotAMember(_)))
    ));
    assert_eq!(f.state(&id), UpgradeState::Waiting);
}

#[test]
fn designated_executor_only() {
    let mut f = Fixture::new();
    let mut p = proposal(1);
    p.executor = Address::new([0x77; 32]);
    let id = f.start(&p);
    f.clock.set(T0 + 3 * DAY);
    f.council_approve(&id).unwrap();
    f.clock.advance(DAY);

    let now = f.now();
    assert!(matches!(
        f.engine.execute(&Address::new([0x78; 32]), &p, now),
        Err(GovernanceError::UnauthorizedExecutor { .. })
    ));
    f.engine.execute(&Address::new([0x77; 32]), &p, now).unwrap();
}

#[test]
fn board_cannot_be_a_regular_executor() {
    let mut f = Fixture::new();
    let mut p = proposal(1);
    p.executor = BOARD;
    let now = f.now();
    assert!(matches!(
        f.engine.start_upgrade(&inclusion(&p), now),
        Err(GovernanceError::EmergencyBoardAsExecutor)
    ));
}

#[test]
fn reverted_call_keeps_upgrade_ready_for_retry() {
    let mut f = Fixture::new();
    let p = proposal(1);
    let id = f.start(&p);
    f.clock.set(T0 + 3 * DAY);
    f.council_approve(&id).unwrap();
    f.clock.advance(DAY);

    // The dispatcher is owned by the engine; script the revert through a
    // fresh engine sharing the same ledger.
    let mut dispatcher = NullDispatcher::new();
    dispatcher.revert_on(Address::new([0x02; 32]), b"role admin missing".to_vec());
    let config = fixture_config(&f);
    let mut engine = Engine::from_config(
        &config,
        NullInclusionVerifier::new(),
        dispatcher,
        NullMessenger::new(),
    )
    .unwrap()
    .with_ledger(f.engine.ledger().clone())
    .unwrap();

    let now = f.now();
    let err = engine.execute(&Address::ZERO, &p, now).unwrap_err();
    match err {
        GovernanceError::Execution(ExecutionError::CallReverted { index, revert, .. }) => {
            assert_eq!(index, 1);
            assert_eq!(revert.reason, b"role admin missing".to_vec());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(engine.dispatcher().calls().is_empty());
    assert_eq!(engine.upgrade_state(&id, now), UpgradeState::Ready);

    // Retry against a healthy platform.
    f.engine.execute(&Address::ZERO, &p, now).unwrap();
    assert_eq!(f.state(&id), UpgradeState::Done);
}

// ── Freeze ───────────────────────────────────────────────────────────────

#[test]
fn nine_of_twelve_soft_freeze_consumes_nonce() {
    let mut f = Fixture::new();
    let valid_until = f.clock.deadline(1000);
    let now = f.now();

    let digest = f
        .engine
        .council()
        .set_soft_freeze_threshold_digest(9, 0, valid_until);
    let approvals = f.council_sign(&digest, 9);
    f.engine
        .set_soft_freeze_threshold(9, valid_until, &approvals, now)
        .unwrap();

    let digest = f.engine.council().soft_freeze_digest(0, valid_until);
    let short = f.council_sign(&digest, 8);
    assert!(matches!(
        f.engine.soft_freeze(valid_until, &short, now),
        Err(GovernanceError::Authorization(
            MultisigError::InsufficientSignatures {
                provided: 8,
                threshold: 9
            }
        ))
    ));
    assert_eq!(f.engine.ledger().council.soft_freeze_nonce, 0);
    assert!(!f.engine.is_frozen(now));

    let approvals = f.council_sign(&digest, 9);
    let outcome = f.engine.soft_freeze(valid_until, &approvals, now).unwrap();
    assert_eq!(
        outcome,
        FreezeOutcome::SoftFrozen {
            until: Timestamp::new(T0 + 12 * HOUR)
        }
    );
    assert_eq!(
        f.engine.ledger().freeze.last_freeze_in_cycle,
        FreezeStatus::Soft
    );
    assert_eq!(f.engine.frozen_until(), Timestamp::new(T0 + 12 * HOUR));
    assert!(f.engine.is_frozen(now));
    assert_eq!(f.engine.ledger().council.soft_freeze_nonce, 1);

    // Same submission again: the nonce moved on, so the signatures no longer match.
    assert!(matches!(
        f.engine.soft_freeze(valid_until, &approvals, now),
        Err(GovernanceError::Authorization(MultisigError::InvalidSignature(_)))
    ));
}

#[test]
fn concurrent_freeze_submissions_reinforce() {
    let mut f = Fixture::new();
    f.soft_freeze(3).unwrap();
    assert!(matches!(
        f.soft_freeze(3).unwrap(),
        FreezeOutcome::ReinforcedFreeze { .. }
    ));
    assert!(matches!(f.hard_freeze().unwrap(), FreezeOutcome::HardFrozen { .. }));
    assert!(matches!(
        f.hard_freeze().unwrap(),
        FreezeOutcome::ReinforcedFreeze { .. }
    ));
    assert_eq!(f.unfreeze().unwrap(), FreezeOutcome::Unfrozen);
    assert_eq!(f.unfreeze().unwrap(), FreezeOutcome::ReinforcedUnfreeze);
    assert!(matches!(
        f.hard_freeze(),
        Err(GovernanceError::FreezeNotAllowed {
            last: FreezeStatus::AfterHardFreeze,
            ..
        })
    ));

    let events = f.engine.events();
    assert!(events.contains(&GovernanceEvent::ReinforceUnfreeze));
    assert!(events.contains(&GovernanceEvent::Unfreeze));
}

#[test]
fn freeze_lapses_on_its_own() {
    let mut f = Fixture::new();
    f.soft_freeze(3).unwrap();
    f.clock.advance(12 * HOUR);
    assert!(!f.engine.is_frozen(f.now()));
    assert!(f.soft_freeze(3).is_err());
}

#[test]
fn frozen_protocol_blocks_execution_until_unfrozen() {
    let mut f = Fixture::new();
    let p = proposal(1);
    let id = f.start(&p);
    f.clock.set(T0 + 3 * DAY);
    f.council_approve(&id).unwrap();
    f.clock.advance(DAY);
    f.hard_freeze().unwrap();

    let now = f.now();
    assert!(matches!(
        f.engine.execute(&Address::ZERO, &p, now),
        Err(GovernanceError::ProtocolFrozen { .. })
    ));
    // Timestamps were not touched by the freeze.
    assert_eq!(f.state(&id), UpgradeState::Ready);

    f.unfreeze().unwrap();
    let now = f.now();
    f.engine.execute(&Address::ZERO, &p, now).unwrap();
}

#[test]
fn executed_upgrade_resets_freeze_cycle() {
    let mut f = Fixture::new();
    f.hard_freeze().unwrap();
    f.unfreeze().unwrap();
    assert!(f.soft_freeze(3).is_err());

    let p = proposal(1);
    let id = f.start(&p);
    f.clock.set(T0 + 3 * DAY);
    f.council_approve(&id).unwrap();
    f.clock.advance(DAY);
    let now = f.now();
    f.engine.execute(&Address::ZERO, &p, now).unwrap();

    assert_eq!(
        f.engine.ledger().freeze.last_freeze_in_cycle,
        FreezeStatus::None
    );
    assert!(matches!(
        f.soft_freeze(3).unwrap(),
        FreezeOutcome::SoftFrozen { .. }
    ));
}

#[test]
fn soft_freeze_threshold_is_adjustable_and_resets() {
    let mut f = Fixture::new();
    let valid_until = f.clock.deadline(1000);
    let digest = f
        .engine
        .council()
        .set_soft_freeze_threshold_digest(5, 0, valid_until);
    let approvals = f.council_sign(&digest, 9);
    let now = f.now();
    f.engine
        .set_soft_freeze_threshold(5, valid_until, &approvals, now)
        .unwrap();
    assert_eq!(f.engine.ledger().council.soft_freeze_threshold, 5);

    assert!(matches!(
        f.soft_freeze(4),
        Err(GovernanceError::Authorization(
            MultisigError::InsufficientSignatures { .. }
        ))
    ));
    f.soft_freeze(5).unwrap();
    assert_eq!(
        f.engine.ledger().council.soft_freeze_threshold,
        RECOMMENDED_SOFT_FREEZE_THRESHOLD
    );
}

#[test]
fn soft_freeze_threshold_must_be_in_range() {
    let mut f = Fixture::new();
    let valid_until = f.clock.deadline(1000);
    let now = f.now();
    for threshold in [0, 13] {
        let digest = f
            .engine
            .council()
            .set_soft_freeze_threshold_digest(threshold, 0, valid_until);
        let approvals = f.council_sign(&digest, 12);
        assert!(matches!(
            f.engine
                .set_soft_freeze_threshold(threshold, valid_until, &approvals, now),
            Err(GovernanceError::InvalidSoftFreezeThreshold { .. })
        ));
    }
}

#[test]
fn expired_signatures_are_refused() {
    let mut f = Fixture::new();
    let valid_until = f.now();
    let digest = f.engine.council().unfreeze_digest(0, valid_until);
    let approvals = f.council_sign(&digest, 12);
    let now = f.now();
    assert!(matches!(
        f.engine.unfreeze(valid_until, &approvals, now),
        Err(GovernanceError::SignatureExpired { .. })
    ));
    assert_eq!(f.engine.ledger().council.unfreeze_nonce, 0);
}

// ── Emergency ────────────────────────────────────────────────────────────

fn emergency_proposal() -> UpgradeProposal {
    UpgradeProposal {
        executor: BOARD,
        ..proposal(9)
    }
}

#[test]
fn emergency_upgrade_bypasses_timers_and_freeze() {
    let mut f = Fixture::new();
    f.hard_freeze().unwrap();
    let p = emergency_proposal();
    let id = proposal_id(&p).unwrap();
    let approvals = f.emergency_approvals(&id);

    f.engine.execute_emergency_upgrade(&p, &approvals).unwrap();
    assert_eq!(f.engine.dispatcher().calls().len(), 2);
    assert!(f.engine.upgrade_status(&id).is_none());
    assert_eq!(
        f.engine.ledger().freeze.last_freeze_in_cycle,
        FreezeStatus::None
    );
    assert!(!f.engine.is_frozen(f.now()));
    assert!(f
        .engine
        .events()
        .contains(&GovernanceEvent::EmergencyUpgradeExecuted { id }));

    assert!(matches!(
        f.engine.execute_emergency_upgrade(&p, &approvals),
        Err(GovernanceError::EmergencyUpgradeAlreadyExecuted(_))
    ));
}

#[test]
fn emergency_upgrade_needs_every_party() {
    let mut f = Fixture::new();
    let p = emergency_proposal();
    let id = proposal_id(&p).unwrap();

    let mut approvals = f.emergency_approvals(&id);
    approvals.foundation = vec![0; 64];
    assert!(matches!(
        f.engine.execute_emergency_upgrade(&p, &approvals),
        Err(GovernanceError::EmergencyApprovalInvalid { party: "foundation" })
    ));

    // Eight council signatures are below the council's delegation threshold.
    let mut approvals = f.emergency_approvals(&id);
    let digest = f.engine.emergency_board().council_digest(&id);
    approvals.council = f.council_sign(&digest, 8).to_delegated_signature().unwrap();
    assert!(matches!(
        f.engine.execute_emergency_upgrade(&p, &approvals),
        Err(GovernanceError::EmergencyApprovalInvalid {
            party: "security council"
        })
    ));
    assert!(f.engine.dispatcher().calls().is_empty());
}

// ── Delegated principals ─────────────────────────────────────────────────

const ACCOUNT: Address = Address::new([0x0D; 32]);

/// A 2-of-3 account standing in for one principal.
fn account_keys() -> Vec<KeyPair> {
    sorted_keys(31..=33)
}

fn account_config(keys: &[KeyPair]) -> DelegatedAccountConfig {
    DelegatedAccountConfig {
        address: ACCOUNT,
        members: keys.iter().map(KeyPair::address).collect(),
        threshold: 2,
    }
}

/// Plain signatures from `keys` plus the account's encoded signature,
/// ordered by signer address.
fn approvals_with_account(digest: &Digest, keys: &[&KeyPair], account: &[&KeyPair]) -> Approvals {
    let mut signed: Vec<(Address, Vec<u8>)> = keys
        .iter()
        .map(|k| (k.address(), sign_digest(digest, &k.private).to_vec()))
        .collect();
    let inner = Approvals::sign(digest, account)
        .to_delegated_signature()
        .unwrap();
    signed.push((ACCOUNT, inner));
    signed.sort_by_key(|(address, _)| *address);
    let (signers, signatures) = signed.into_iter().unzip();
    Approvals {
        signers,
        signatures,
    }
}

#[test]
fn council_member_signs_through_its_account() {
    let inner = account_keys();
    let mut f = Fixture::with_config(|config| {
        config.council_members.pop();
        config.council_members.push(ACCOUNT);
        config.council_members.sort();
        config.delegated_accounts = vec![account_config(&inner)];
    });
    let p = proposal(1);
    let id = f.start(&p);
    f.clock.set(T0 + 3 * DAY);
    let now = f.now();

    let digest = f.engine.council().approve_upgrade_digest(&id);
    let plain: Vec<&KeyPair> = f.council.iter().take(5).collect();

    // One inner signature is below the account's own threshold.
    let weak = approvals_with_account(&digest, &plain, &[&inner[0]]);
    assert!(matches!(
        f.engine.approve_upgrade_council(&id, &weak, now),
        Err(GovernanceError::Authorization(MultisigError::InvalidSignature(a))) if a == ACCOUNT
    ));

    let approvals = approvals_with_account(&digest, &plain, &[&inner[0], &inner[2]]);
    f.engine.approve_upgrade_council(&id, &approvals, now).unwrap();
    assert_eq!(f.state(&id), UpgradeState::ExecutionPending);
}

#[test]
fn foundation_may_be_a_multi_party_account() {
    let inner = account_keys();
    let mut f = Fixture::with_config(|config| {
        config.foundation = ACCOUNT;
        config.delegated_accounts = vec![account_config(&inner)];
    });
    let p = emergency_proposal();
    let id = proposal_id(&p).unwrap();
    let digest = f.engine.emergency_board().foundation_digest(&id);

    let mut approvals = f.emergency_approvals(&id);
    approvals.foundation = Approvals::sign(&digest, &[&inner[1]])
        .to_delegated_signature()
        .unwrap();
    assert!(matches!(
        f.engine.execute_emergency_upgrade(&p, &approvals),
        Err(GovernanceError::EmergencyApprovalInvalid { party: "foundation" })
    ));

    approvals.foundation = Approvals::sign(&digest, &[&inner[1], &inner[2]])
        .to_delegated_signature()
        .unwrap();
    f.engine.execute_emergency_upgrade(&p, &approvals).unwrap();
    assert_eq!(f.engine.dispatcher().calls().len(), 2);
}

#[test]
fn delegated_account_cannot_shadow_a_body() {
    let council = sorted_keys(1..=12);
    let guardians = sorted_keys(21..=28);
    let mut config = config(&council, &guardians, &keypair_from_seed(&[99; 32]));
    config.delegated_accounts = vec![DelegatedAccountConfig {
        address: COUNCIL,
        ..account_config(&account_keys())
    }];
    let result = Engine::from_config(
        &config,
        NullInclusionVerifier::new(),
        NullDispatcher::new(),
        NullMessenger::new(),
    );
    assert!(matches!(result, Err(GovernanceError::Config(_))));
}

// ── Remote governor ──────────────────────────────────────────────────────

fn governor_proposal() -> GovernorProposal {
    GovernorProposal {
        targets: vec![Address::new([0x31; 32])],
        values: vec![0],
        calldatas: vec![b"setVotingDelay".to_vec()],
        description: "shorten voting delay".into(),
    }
}

fn request() -> L2TransactionRequest {
    L2TransactionRequest {
        to: Address::new([0x30; 32]),
        gas_limit: 2_000_000,
        gas_per_pubdata_limit: 800,
        refund_recipient: GUARDIANS,
        mint_value: 0,
    }
}

#[test]
fn guardians_forward_governor_calls() {
    let mut f = Fixture::new();
    let valid_until = f.clock.deadline(HOUR);
    let digest = f
        .engine
        .guardians()
        .propose_digest(&governor_proposal(), &request(), 0, valid_until)
        .unwrap();
    let approvals = f.guardians_sign(&digest, 5);
    let now = f.now();
    let tx = f
        .engine
        .propose_governor_proposal(&governor_proposal(), &request(), valid_until, &approvals, now)
        .unwrap();

    let digest = f
        .engine
        .guardians()
        .cancel_digest(&governor_proposal(), &request(), 1, valid_until)
        .unwrap();
    let approvals = f.guardians_sign(&digest, 5);
    let cancel_tx = f
        .engine
        .cancel_governor_proposal(&governor_proposal(), &request(), valid_until, &approvals, now)
        .unwrap();
    assert_ne!(tx, cancel_tx);

    let sent = f.engine.messenger().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1, GovernorCall::Propose(governor_proposal()));
    assert_eq!(sent[1].1, GovernorCall::Cancel(governor_proposal()));
    assert_eq!(f.engine.ledger().guardians.nonce, 2);
}

#[test]
fn failed_forward_keeps_nonce() {
    let f = Fixture::new();
    let mut messenger = NullMessenger::new();
    messenger.fail_next("bridge halted");
    let mut engine = Engine::from_config(
        &fixture_config(&f),
        NullInclusionVerifier::new(),
        NullDispatcher::new(),
        messenger,
    )
    .unwrap();

    let valid_until = f.clock.deadline(HOUR);
    let digest = engine
        .guardians()
        .propose_digest(&governor_proposal(), &request(), 0, valid_until)
        .unwrap();
    let approvals = f.guardians_sign(&digest, 5);
    let now = f.now();
    assert!(matches!(
        engine.propose_governor_proposal(
            &governor_proposal(),
            &request(),
            valid_until,
            &approvals,
            now
        ),
        Err(GovernanceError::Messenger(_))
    ));
    assert_eq!(engine.ledger().guardians.nonce, 0);

    // The same approvals go through once the transport recovers.
    engine
        .propose_governor_proposal(&governor_proposal(), &request(), valid_until, &approvals, now)
        .unwrap();
}

// ── Persistence ──────────────────────────────────────────────────────────

#[test]
fn ledger_snapshot_resumes_lifecycle() {
    let mut f = Fixture::new();
    let p = proposal(1);
    let id = f.start(&p);
    f.clock.set(T0 + 3 * DAY);
    f.council_approve(&id).unwrap();

    let bytes = f.engine.ledger().encode().unwrap();
    let restored = GovernanceLedger::decode(&bytes).unwrap();
    let mut engine = Engine::from_config(
        &fixture_config(&f),
        NullInclusionVerifier::new(),
        NullDispatcher::new(),
        NullMessenger::new(),
    )
    .unwrap()
    .with_ledger(restored)
    .unwrap();

    let later = Timestamp::new(T0 + 4 * DAY);
    assert_eq!(engine.upgrade_state(&id, later), UpgradeState::Ready);
    engine.execute(&Address::ZERO, &p, later).unwrap();
    assert_eq!(engine.events().len(), 3);
}

#[test]
fn snapshot_with_zero_soft_freeze_threshold_is_refused() {
    let f = Fixture::new();
    let mut ledger = f.engine.ledger().clone();
    ledger.council.soft_freeze_threshold = 0;
    let restored = GovernanceLedger::decode(&ledger.encode().unwrap()).unwrap();

    let resumed = Engine::from_config(
        &fixture_config(&f),
        NullInclusionVerifier::new(),
        NullDispatcher::new(),
        NullMessenger::new(),
    )
    .unwrap()
    .with_ledger(restored);
    assert!(matches!(
        resumed,
        Err(GovernanceError::InvalidSoftFreezeThreshold { threshold: 0, .. })
    ));
}
