use netcoll_serde::{BitReader, BitWrite};

use crate::{
    collections::{CollectionOps, Replicated},
    error::ReplicationError,
    settings::SendChannel,
    types::{ClientId, NetworkTime},
};

/// A single replicated field of a network entity, as seen by the per-tick
/// replication loop.
///
/// Object safe so that an entity can hand the loop a slice of heterogeneous
/// containers.
pub trait ReplicatedVariable {
    /// Type name used in logs
    fn kind(&self) -> &'static str;
    fn channel(&self) -> SendChannel;
    fn is_dirty(&self, now: NetworkTime) -> bool;
    fn reset_dirty(&mut self, now: NetworkTime);
    fn can_client_read(&self, client: ClientId) -> bool;
    fn can_client_write(&self, client: ClientId) -> bool;
    fn write_field(&self, writer: &mut dyn BitWrite) -> Result<(), ReplicationError>;
    fn read_field(&mut self, reader: &mut BitReader) -> Result<(), ReplicationError>;
    fn write_delta(&self, writer: &mut dyn BitWrite) -> Result<(), ReplicationError>;
    fn read_delta(
        &mut self,
        reader: &mut BitReader,
        keep_dirty: bool,
    ) -> Result<usize, ReplicationError>;
}

impl<C: CollectionOps> ReplicatedVariable for Replicated<C> {
    fn kind(&self) -> &'static str {
        C::KIND
    }

    fn channel(&self) -> SendChannel {
        self.settings().channel
    }

    fn is_dirty(&self, now: NetworkTime) -> bool {
        Replicated::is_dirty(self, now)
    }

    fn reset_dirty(&mut self, now: NetworkTime) {
        Replicated::reset_dirty(self, now)
    }

    fn can_client_read(&self, client: ClientId) -> bool {
        Replicated::can_client_read(self, client)
    }

    fn can_client_write(&self, client: ClientId) -> bool {
        Replicated::can_client_write(self, client)
    }

    fn write_field(&self, writer: &mut dyn BitWrite) -> Result<(), ReplicationError> {
        Replicated::write_field(self, writer)
    }

    fn read_field(&mut self, reader: &mut BitReader) -> Result<(), ReplicationError> {
        Replicated::read_field(self, reader)
    }

    fn write_delta(&self, writer: &mut dyn BitWrite) -> Result<(), ReplicationError> {
        Replicated::write_delta(self, writer)
    }

    fn read_delta(
        &mut self,
        reader: &mut BitReader,
        keep_dirty: bool,
    ) -> Result<usize, ReplicationError> {
        Replicated::read_delta(self, reader, keep_dirty)
    }
}
