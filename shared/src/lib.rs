//! # Netcoll Shared
//! Replicated collections and the per-tick variable sync loop, shared by
//! server and client hosts.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use netcoll_serde::{
    read_i32_packed, read_u16_packed, write_i32_packed, write_u16_packed, BitCounter, BitReader,
    BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr,
};

mod collections;
mod dirty_log;
mod error;
mod host;
mod permission;
mod settings;
mod sync;
mod types;
mod variable;

pub use collections::{
    ChangeListeners, CollectionOps, DictionaryEvent, DictionaryOps, ListEvent, ListOps,
    ListenerKey, Replicated, ReplicatedDictionary, ReplicatedList, ReplicatedSet, SetEvent,
    SetOps, MAX_ENCODED_COUNT,
};
pub use dirty_log::DirtyLog;
pub use error::ReplicationError;
pub use host::{HostBinding, HostEntity, ReplicaHost};
pub use permission::{can_read, can_write, PermissionPredicate, ReplicationPermission};
pub use settings::{AbsentKeyRemoval, SendChannel, VariableSettings};
pub use sync::{SyncConfig, VariableSync};
pub use types::{ClientId, HostType, NetworkTime, SERVER_CLIENT_ID};
pub use variable::ReplicatedVariable;
