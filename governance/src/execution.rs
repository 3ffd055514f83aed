//! Call-batch execution engine.
//!
//! Runs an ordered list of calls against the platform, all-or-nothing: the
//! first failing call rolls the platform back to where it was before the
//! batch and surfaces the original revert reason. No retries here; callers
//! resubmit.

use bastion_types::{Address, Call};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Raw revert data returned by a failing call, kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRevert {
    pub reason: Vec<u8>,
}

impl CallRevert {
    pub fn new(reason: impl Into<Vec<u8>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CallRevert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.reason) {
            Ok(text) => write!(f, "{text}"),
            Err(_) => {
                for b in &self.reason {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("call {index} to {target} reverted: {revert}")]
    CallReverted {
        index: usize,
        target: Address,
        revert: CallRevert,
    },
}

/// The platform the governance core has authority over.
///
/// Implementations must be able to snapshot and restore every effect a
/// dispatched call can have.
pub trait CallDispatcher {
    type Checkpoint;

    fn checkpoint(&self) -> Self::Checkpoint;

    fn rollback(&mut self, checkpoint: Self::Checkpoint);

    /// Perform one call on behalf of `sender`, returning its output.
    fn dispatch(&mut self, sender: &Address, call: &Call) -> Result<Vec<u8>, CallRevert>;
}

/// Execute `calls` in order as `sender`. Returns each call's output.
pub fn execute_batch<D: CallDispatcher>(
    dispatcher: &mut D,
    sender: &Address,
    calls: &[Call],
) -> Result<Vec<Vec<u8>>, ExecutionError> {
    let checkpoint = dispatcher.checkpoint();
    let mut outputs = Vec::with_capacity(calls.len());
    for (index, call) in calls.iter().enumerate() {
        match dispatcher.dispatch(sender, call) {
            Ok(output) => {
                debug!(index, target = %call.target, value = call.value, "call succeeded");
                outputs.push(output);
            }
            Err(revert) => {
                warn!(index, target = %call.target, %revert, "call reverted, rolling back batch");
                dispatcher.rollback(checkpoint);
                return Err(ExecutionError::CallReverted {
                    index,
                    target: call.target,
                    revert,
                });
            }
        }
    }
    Ok(outputs)
}
