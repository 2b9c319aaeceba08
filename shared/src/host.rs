use std::{
    cell::Cell,
    rc::{Rc, Weak},
};

use crate::{
    error::ReplicationError,
    types::{ClientId, HostType, SERVER_CLIENT_ID},
};

/// The network entity a replicated container lives on.
///
/// Containers only ever ask their host these questions, so any entity
/// representation can implement it.
pub trait ReplicaHost {
    /// The client that owns the entity
    fn owner_id(&self) -> ClientId;
    /// Whether this process holds the authoritative copy
    fn is_authority(&self) -> bool;
    /// Whether anyone currently needs to receive updates
    fn has_observers(&self) -> bool;
    /// The id this process is known by
    fn local_client_id(&self) -> ClientId;
}

/// Weak link from a container to its host
pub struct HostBinding {
    kind: &'static str,
    host: Option<Weak<dyn ReplicaHost>>,
}

impl HostBinding {
    pub fn new(kind: &'static str) -> Self {
        Self { kind, host: None }
    }

    pub fn bind(&mut self, host: Weak<dyn ReplicaHost>) -> Result<(), ReplicationError> {
        if self.host.is_some() {
            return Err(ReplicationError::AlreadyBound { kind: self.kind });
        }
        self.host = Some(host);
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.host.is_some()
    }

    pub fn host(&self, operation: &'static str) -> Result<Rc<dyn ReplicaHost>, ReplicationError> {
        let Some(host) = &self.host else {
            return Err(ReplicationError::NotInitialized {
                kind: self.kind,
                operation,
            });
        };
        host.upgrade()
            .ok_or(ReplicationError::HostDropped { kind: self.kind })
    }

    pub fn owner_id(&self) -> Result<ClientId, ReplicationError> {
        Ok(self.host("owner_id")?.owner_id())
    }

    pub fn is_local_authority(&self) -> Result<bool, ReplicationError> {
        Ok(self.host("is_local_authority")?.is_authority())
    }
}

/// A plain host entity for processes that don't bring their own
pub struct HostEntity {
    host_type: HostType,
    local_client_id: ClientId,
    owner_id: Cell<ClientId>,
    authority: Cell<bool>,
    observer_count: Cell<usize>,
}

impl HostEntity {
    /// An entity on the server, which is the authority
    pub fn server(owner_id: ClientId) -> Self {
        Self {
            host_type: HostType::Server,
            local_client_id: SERVER_CLIENT_ID,
            owner_id: Cell::new(owner_id),
            authority: Cell::new(true),
            observer_count: Cell::new(0),
        }
    }

    /// A client's mirror of a server entity
    pub fn client(local_client_id: ClientId, owner_id: ClientId) -> Self {
        Self {
            host_type: HostType::Client,
            local_client_id,
            owner_id: Cell::new(owner_id),
            authority: Cell::new(false),
            observer_count: Cell::new(0),
        }
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn set_owner_id(&self, owner_id: ClientId) {
        self.owner_id.set(owner_id);
    }

    /// Hands authority to (or takes it from) this process, for owner-authoritative setups
    pub fn set_authority(&self, authority: bool) {
        self.authority.set(authority);
    }

    pub fn set_observer_count(&self, count: usize) {
        self.observer_count.set(count);
    }

    pub fn observer_count(&self) -> usize {
        self.observer_count.get()
    }
}

impl ReplicaHost for HostEntity {
    fn owner_id(&self) -> ClientId {
        self.owner_id.get()
    }

    fn is_authority(&self) -> bool {
        self.authority.get()
    }

    fn has_observers(&self) -> bool {
        // a client always has the server to report to
        match self.host_type {
            HostType::Client => true,
            HostType::Server => self.observer_count.get() > 0,
        }
    }

    fn local_client_id(&self) -> ClientId {
        self.local_client_id
    }
}
