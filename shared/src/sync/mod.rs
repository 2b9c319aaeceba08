//! # Variable sync – the per-tick replication loop
//!
//! A network entity owns an ordered list of replicated variables. Each tick
//! the host walks that list once per connected peer:
//!
//! 1. **Write** – [`VariableSync::write_update`] emits, for every variable,
//!    either "nothing changed" or that variable's pending delta. On the
//!    server, variables the peer can't read are always reported as unchanged.
//! 2. **Reset** – once every peer has been written,
//!    [`VariableSync::finish_update`] clears the dirty log of each variable
//!    that went out.
//! 3. **Read** – the peer's [`VariableSync::read_update`] replays the deltas
//!    in order. A server keeps replayed client writes dirty so they are
//!    forwarded to every other client on its next write.
//!
//! Late joiners get [`VariableSync::write_snapshot`] instead: full contents,
//! still filtered by read permission.
//!
//! Both ends must list their variables in the same order.

mod config;
mod variable_sync;

pub use config::SyncConfig;
pub use variable_sync::VariableSync;
