/// REGRESSION TESTS: removals that reach a mirror after the entry is gone
///
/// An authority can legitimately emit a removal for something the mirror
/// won't hold by the time it replays the event: a dictionary `remove` of an
/// absent key emits a `Remove` with no value, and a `clear` followed by a
/// removal in the same tick leaves the removal pointing at nothing. Replaying
/// these must be a no-op, not a desync.

use netcoll_shared::SyncConfig;
use netcoll_test::{assert_converged, exchange_packets, TestClient, TestServer};

fn setup() -> (TestServer, TestClient) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut server = TestServer::new(1, Default::default(), SyncConfig::default()).unwrap();
    let mut client = TestClient::new(1, 1, Default::default(), SyncConfig::default()).unwrap();
    server.connect(&mut client).unwrap();
    (server, client)
}

#[test]
fn dictionary_remove_after_clear_in_same_tick() {
    let (mut server, mut client) = setup();
    server.entity.scores.add("k".to_string(), 1).unwrap();
    exchange_packets(&mut server, &mut [&mut client]).unwrap();

    server.entity.scores.clear().unwrap();
    assert_eq!(server.entity.scores.remove(&"k".to_string()), Ok(None));

    let result = exchange_packets(&mut server, &mut [&mut client]);
    assert!(
        result.is_ok(),
        "Replaying a Remove for a key the mirror no longer holds must not fail: {:?}",
        result
    );
    assert_converged!(server, client);
}

#[test]
fn set_and_list_removals_of_missing_values_are_ignored() {
    let (mut server, mut client) = setup();
    server.entity.tags.insert(3).unwrap();
    server.entity.list.push(3).unwrap();
    exchange_packets(&mut server, &mut [&mut client]).unwrap();

    // a mirror that drifted must still accept the stream
    client.entity.tags = Default::default();
    client.entity.list = Default::default();

    server.entity.tags.remove(&3).unwrap();
    server.entity.list.remove(&3).unwrap();
    let result = exchange_packets(&mut server, &mut [&mut client]);

    assert!(result.is_ok(), "Stale removals should be no-ops: {:?}", result);
    assert_converged!(server, client);
}
