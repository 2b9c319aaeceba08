use log::{error, trace, warn};

use netcoll_serde::{read_u16_packed, write_u16_packed, BitReader, BitWrite, BitWriter};

use crate::{
    error::ReplicationError,
    sync::SyncConfig,
    types::{ClientId, HostType, NetworkTime},
    variable::ReplicatedVariable,
};

/// Drives the replicated variables of one network entity through the update
/// stream. Keeps track of which variables went out so their dirty state can
/// be reset once every peer has been served.
pub struct VariableSync {
    host_type: HostType,
    config: SyncConfig,
    pending_reset: Vec<usize>,
}

impl VariableSync {
    pub fn new(host_type: HostType, config: SyncConfig) -> Self {
        Self {
            host_type,
            config,
            pending_reset: Vec::new(),
        }
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Whether any variable has something it is allowed to send at `now`
    pub fn has_dirty(vars: &[&dyn ReplicatedVariable], now: NetworkTime) -> bool {
        vars.iter().any(|variable| variable.is_dirty(now))
    }

    /// Writes one update for `client`. Returns whether any variable was
    /// included; when nothing was, the caller may drop the message.
    pub fn write_update(
        &mut self,
        vars: &[&dyn ReplicatedVariable],
        client: ClientId,
        now: NetworkTime,
        writer: &mut dyn BitWrite,
    ) -> Result<bool, ReplicationError> {
        let mut written_any = false;

        for (index, variable) in vars.iter().enumerate() {
            // the server only sends what the client may see; a client always sends
            let should_write = variable.is_dirty(now)
                && (self.host_type == HostType::Client || variable.can_client_read(client));

            if self.config.length_safety {
                if should_write {
                    write_prefixed(index, writer, |payload| variable.write_delta(payload))?;
                } else {
                    write_u16_packed(writer, 0);
                }
            } else {
                writer.write_bit(should_write);
                if should_write {
                    variable.write_delta(writer)?;
                }
            }

            if should_write {
                written_any = true;
                if !self.pending_reset.contains(&index) {
                    self.pending_reset.push(index);
                }
            }
        }

        if written_any {
            trace!("Wrote variable update for client {}", client);
        }
        Ok(written_any)
    }

    /// Resets the dirty state of every variable written since the last call.
    /// Call once per tick, after every peer has been written.
    pub fn finish_update(&mut self, vars: &mut [&mut dyn ReplicatedVariable], now: NetworkTime) {
        for index in self.pending_reset.drain(..) {
            if let Some(variable) = vars.get_mut(index) {
                variable.reset_dirty(now);
            }
        }
    }

    /// Replays an update written by `write_update` on the other end. Returns
    /// how many variables were updated.
    ///
    /// On the server, a write from a client without permission is skipped
    /// when payloads are length-prefixed; otherwise the remaining variables
    /// can't be located and `ClientWriteDenied` is returned.
    pub fn read_update(
        &mut self,
        vars: &mut [&mut dyn ReplicatedVariable],
        sender: ClientId,
        reader: &mut BitReader,
    ) -> Result<usize, ReplicationError> {
        let is_server = self.host_type == HostType::Server;
        let mut updated = 0;

        for (index, variable) in vars.iter_mut().enumerate() {
            if self.config.length_safety {
                let length = read_u16_packed(reader)? as usize;
                if length == 0 {
                    continue;
                }
                let payload = reader.read_bytes(length)?;

                if is_server && !variable.can_client_write(sender) {
                    warn!(
                        "Client {} wrote to {} (variable {}) without permission, skipping",
                        sender,
                        variable.kind(),
                        index
                    );
                    continue;
                }

                let mut payload_reader = BitReader::new(&payload);
                variable.read_delta(&mut payload_reader, is_server)?;
                warn_on_leftover(&payload_reader, variable.kind(), index);
            } else {
                if !reader.read_bit()? {
                    continue;
                }

                if is_server && !variable.can_client_write(sender) {
                    error!(
                        "Client {} wrote to {} (variable {}) without permission. No more variables can be read",
                        sender,
                        variable.kind(),
                        index
                    );
                    return Err(ReplicationError::ClientWriteDenied {
                        client: sender,
                        variable: index,
                    });
                }

                variable.read_delta(reader, is_server)?;
            }
            updated += 1;
        }

        Ok(updated)
    }

    /// Writes the full contents of every variable `client` may read, for a
    /// peer that is seeing this entity for the first time
    pub fn write_snapshot(
        &self,
        vars: &[&dyn ReplicatedVariable],
        client: ClientId,
        writer: &mut dyn BitWrite,
    ) -> Result<(), ReplicationError> {
        for (index, variable) in vars.iter().enumerate() {
            let readable = self.host_type == HostType::Client || variable.can_client_read(client);

            if self.config.length_safety {
                if readable {
                    write_prefixed(index, writer, |payload| variable.write_field(payload))?;
                } else {
                    write_u16_packed(writer, 0);
                }
            } else {
                writer.write_bit(readable);
                if readable {
                    variable.write_field(writer)?;
                }
            }
        }
        Ok(())
    }

    /// Replaces the contents of every variable included by `write_snapshot`.
    /// Returns how many were replaced.
    pub fn read_snapshot(
        &self,
        vars: &mut [&mut dyn ReplicatedVariable],
        reader: &mut BitReader,
    ) -> Result<usize, ReplicationError> {
        let mut replaced = 0;

        for (index, variable) in vars.iter_mut().enumerate() {
            if self.config.length_safety {
                let length = read_u16_packed(reader)? as usize;
                if length == 0 {
                    continue;
                }
                let payload = reader.read_bytes(length)?;
                let mut payload_reader = BitReader::new(&payload);
                variable.read_field(&mut payload_reader)?;
                warn_on_leftover(&payload_reader, variable.kind(), index);
            } else {
                if !reader.read_bit()? {
                    continue;
                }
                variable.read_field(reader)?;
            }
            replaced += 1;
        }

        Ok(replaced)
    }
}

// Encodes into a scratch buffer so the byte length can go first
fn write_prefixed(
    index: usize,
    writer: &mut dyn BitWrite,
    encode: impl FnOnce(&mut dyn BitWrite) -> Result<(), ReplicationError>,
) -> Result<(), ReplicationError> {
    let mut payload = BitWriter::new();
    encode(&mut payload)?;
    let bytes = payload.to_bytes();

    let length = u16::try_from(bytes.len()).map_err(|_| ReplicationError::VariableLengthOverflow {
        variable: index,
        bytes: bytes.len(),
        max: u16::MAX as usize,
    })?;
    write_u16_packed(writer, length);
    writer.write_bytes(&bytes);
    Ok(())
}

fn warn_on_leftover(reader: &BitReader, kind: &str, index: usize) {
    // anything under a byte is padding
    let leftover = reader.bits_remaining() / 8;
    if leftover > 0 {
        warn!(
            "{} (variable {}) left {} bytes of its payload unread",
            kind, index, leftover
        );
    }
}
