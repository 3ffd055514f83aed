//! Nullable inclusion verifier: accept or reject proofs on command.

use bastion_governance::{InclusionVerifier, L2Message};
use bastion_types::Digest;
use std::cell::{Cell, RefCell};

/// A single inclusion query, as the verifier saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InclusionQuery {
    pub batch_number: u64,
    pub message_index: u64,
    pub message: L2Message,
}

/// A verifier whose answer is whatever the test says it is.
pub struct NullInclusionVerifier {
    accept: Cell<bool>,
    queries: RefCell<Vec<InclusionQuery>>,
}

impl NullInclusionVerifier {
    /// Accepts every proof.
    pub fn new() -> Self {
        Self {
            accept: Cell::new(true),
            queries: RefCell::new(Vec::new()),
        }
    }

    /// Rejects every proof.
    pub fn rejecting() -> Self {
        let verifier = Self::new();
        verifier.set_accept(false);
        verifier
    }

    pub fn set_accept(&self, accept: bool) {
        self.accept.set(accept);
    }

    /// Every query received so far.
    pub fn queries(&self) -> Vec<InclusionQuery> {
        self.queries.borrow().clone()
    }
}

impl Default for NullInclusionVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl InclusionVerifier for NullInclusionVerifier {
    fn prove_message_inclusion(
        &self,
        batch_number: u64,
        message_index: u64,
        message: &L2Message,
        _proof: &[Digest],
    ) -> bool {
        self.queries.borrow_mut().push(InclusionQuery {
            batch_number,
            message_index,
            message: message.clone(),
        });
        self.accept.get()
    }
}
