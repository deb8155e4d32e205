//! Convergence polling: waiting for asynchronous AWS state changes.
//!
//! The `policy` module holds the interval/max-wait policy and the per-loop
//! state. `poller` re-issues a describe command until a probe is satisfied.
//! `predicates` are the pure conditions over typed describe output, and
//! `waits` combines them into the named waits callers use.

pub mod policy;
pub mod poller;
pub mod predicates;
pub mod waits;
