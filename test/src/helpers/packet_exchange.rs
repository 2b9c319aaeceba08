use netcoll_shared::{NetworkTime, ReplicationError};

use super::{TestClient, TestServer};

/// Delivers every client's pending writes to the server, then every server
/// update to its client. Packets arrive intact and in order.
pub fn exchange_packets(
    server: &mut TestServer,
    clients: &mut [&mut TestClient],
) -> Result<(), ReplicationError> {
    for client in clients.iter_mut() {
        if let Some(bytes) = client.send_update()? {
            server.receive_update(client.id(), &bytes)?;
        }
    }

    for (id, bytes) in server.send_updates()? {
        if let Some(client) = clients.iter_mut().find(|client| client.id() == id) {
            client.receive_update(&bytes)?;
        }
    }
    Ok(())
}

pub fn exchange_packets_n_times(
    server: &mut TestServer,
    clients: &mut [&mut TestClient],
    n: usize,
) -> Result<(), ReplicationError> {
    for _ in 0..n {
        exchange_packets(server, clients)?;
    }
    Ok(())
}

/// Advances every peer's clock by `seconds`, then exchanges packets
pub fn tick_and_exchange(
    server: &mut TestServer,
    clients: &mut [&mut TestClient],
    seconds: NetworkTime,
) -> Result<(), ReplicationError> {
    server.advance(seconds);
    for client in clients.iter_mut() {
        client.advance(seconds);
    }
    exchange_packets(server, clients)
}
