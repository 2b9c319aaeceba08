//! # `SyncConfig` – per-host replication knobs
//!
//! Set once when the host starts and cloned into its [`VariableSync`].
//! Both ends of a connection must agree on every field here, since they
//! change the shape of the update stream itself.
//!
//! [`VariableSync`]: super::VariableSync

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncConfig {
    /// *Prefix every variable payload with its byte length.*
    /// - **On**: a variable the sender may not write is skipped with a
    ///   warning, and a reader that consumes too much or too little of a
    ///   payload is realigned to the next variable.
    /// - **Off**: a single presence bit per variable. Cheaper, but one
    ///   forbidden write makes the rest of the update unreadable.
    pub length_safety: bool,
}

