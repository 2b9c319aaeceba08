use log::debug;

use netcoll_shared::{
    BitReader, BitWriter, ClientId, HostEntity, HostType, NetworkTime, ReplicationError,
    SyncConfig, VariableSettings, VariableSync,
};

use super::{TestClient, TestEntity};

/// The authoritative side of a single replicated entity
pub struct TestServer {
    pub entity: TestEntity,
    sync: VariableSync,
    clients: Vec<ClientId>,
    now: NetworkTime,
}

impl TestServer {
    pub fn new(
        owner: ClientId,
        settings: VariableSettings,
        config: SyncConfig,
    ) -> Result<Self, ReplicationError> {
        Ok(Self {
            entity: TestEntity::new(HostEntity::server(owner), settings)?,
            sync: VariableSync::new(HostType::Server, config),
            clients: Vec::new(),
            now: 0.0,
        })
    }

    pub fn now(&self) -> NetworkTime {
        self.now
    }

    pub fn advance(&mut self, seconds: NetworkTime) {
        self.now += seconds;
    }

    pub fn clients(&self) -> &[ClientId] {
        &self.clients
    }

    /// Starts replicating to `client`, sending it a full snapshot.
    ///
    /// Pending deltas must be flushed first, or the new client would apply
    /// them on top of a snapshot that already contains them.
    pub fn connect(&mut self, client: &mut TestClient) -> Result<usize, ReplicationError> {
        assert!(
            !self.entity.has_pending(),
            "flush pending updates before connecting client {}",
            client.id()
        );

        self.clients.push(client.id());
        self.entity.host().set_observer_count(self.clients.len());

        let mut writer = BitWriter::new();
        self.sync
            .write_snapshot(&self.entity.vars(), client.id(), &mut writer)?;
        debug!("Sending snapshot to client {}", client.id());
        client.receive_snapshot(&writer.to_bytes())
    }

    pub fn disconnect(&mut self, client: ClientId) {
        self.clients.retain(|id| *id != client);
        self.entity.host().set_observer_count(self.clients.len());
    }

    /// Writes one update per connected client that has something to receive,
    /// then resets the dirty state of everything sent
    pub fn send_updates(&mut self) -> Result<Vec<(ClientId, Vec<u8>)>, ReplicationError> {
        let mut packets = Vec::new();
        for client in &self.clients {
            let mut writer = BitWriter::new();
            if self
                .sync
                .write_update(&self.entity.vars(), *client, self.now, &mut writer)?
            {
                packets.push((*client, writer.to_bytes()));
            }
        }
        self.sync.finish_update(&mut self.entity.vars_mut(), self.now);
        Ok(packets)
    }

    pub fn receive_update(&mut self, sender: ClientId, bytes: &[u8]) -> Result<usize, ReplicationError> {
        let mut reader = BitReader::new(bytes);
        self.sync
            .read_update(&mut self.entity.vars_mut(), sender, &mut reader)
    }
}
