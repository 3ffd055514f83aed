//! Nullable call dispatcher: an in-memory, transactional stand-in for the
//! platform upgrade calls are sent to.

use bastion_governance::{CallDispatcher, CallRevert};
use bastion_types::{Address, Call};
use std::collections::{BTreeMap, HashMap};

/// A call that took effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchedCall {
    pub sender: Address,
    pub call: Call,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlatformSnapshot {
    storage: BTreeMap<Address, Vec<u8>>,
    balances: BTreeMap<Address, u128>,
    log: Vec<DispatchedCall>,
}

/// Every call to a target stores its payload in that target's slot, credits
/// its value to the target and is appended to the call log. Targets scripted
/// with [`NullDispatcher::revert_on`] fail with the given reason instead.
#[derive(Default)]
pub struct NullDispatcher {
    state: PlatformSnapshot,
    reverts: HashMap<Address, Vec<u8>>,
}

impl NullDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call to `target` revert with `reason`.
    pub fn revert_on(&mut self, target: Address, reason: impl Into<Vec<u8>>) {
        self.reverts.insert(target, reason.into());
    }

    /// Stop reverting calls to `target`.
    pub fn clear_revert(&mut self, target: &Address) {
        self.reverts.remove(target);
    }

    /// Calls that took effect, in order.
    pub fn calls(&self) -> &[DispatchedCall] {
        &self.state.log
    }

    /// Last payload written to `target`.
    pub fn storage(&self, target: &Address) -> Option<&[u8]> {
        self.state.storage.get(target).map(Vec::as_slice)
    }

    pub fn balance(&self, target: &Address) -> u128 {
        self.state.balances.get(target).copied().unwrap_or(0)
    }
}

impl CallDispatcher for NullDispatcher {
    type Checkpoint = PlatformSnapshot;

    fn checkpoint(&self) -> PlatformSnapshot {
        self.state.clone()
    }

    fn rollback(&mut self, checkpoint: PlatformSnapshot) {
        self.state = checkpoint;
    }

    fn dispatch(&mut self, sender: &Address, call: &Call) -> Result<Vec<u8>, CallRevert> {
        if let Some(reason) = self.reverts.get(&call.target) {
            return Err(CallRevert::new(reason.clone()));
        }
        let previous = self
            .state
            .storage
            .insert(call.target, call.data.clone())
            .unwrap_or_default();
        let balance = self.state.balances.entry(call.target).or_default();
        *balance = balance.saturating_add(call.value);
        self.state.log.push(DispatchedCall {
            sender: *sender,
            call: call.clone(),
        });
        Ok(previous)
    }
}
