//! Nullable infrastructure for deterministic testing.
//!
//! Everything the governance core treats as an external collaborator (the
//! clock, the cross-chain inclusion verifier, the platform calls are
//! dispatched to, the remote governor transport) has a test-friendly
//! implementation here that:
//! - Returns deterministic values
//! - Can be controlled programmatically
//! - Records what it was asked to do, for assertions
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod dispatcher;
pub mod messenger;
pub mod verifier;

pub use clock::NullClock;
pub use dispatcher::NullDispatcher;
pub use messenger::NullMessenger;
pub use verifier::NullInclusionVerifier;
