/// INTEGRATION TESTS: ReplicatedSet delta sync

use std::{cell::RefCell, collections::HashSet, rc::Rc};

use netcoll_shared::{SetEvent, SyncConfig};
use netcoll_test::{assert_converged, exchange_packets, TestClient, TestServer};

fn setup() -> (TestServer, TestClient) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut server = TestServer::new(1, Default::default(), SyncConfig::default()).unwrap();
    let mut client = TestClient::new(1, 1, Default::default(), SyncConfig::default()).unwrap();
    server.connect(&mut client).unwrap();
    (server, client)
}

#[test]
fn set_algebra_converges() {
    let (mut server, mut client) = setup();
    let tags = &mut server.entity.tags;

    tags.union_with(1..=10).unwrap();
    tags.intersect_with([2, 4, 6, 8, 10, 12]).unwrap();
    tags.except_with([4]).unwrap();
    tags.symmetric_except_with([2, 3]).unwrap();
    exchange_packets(&mut server, &mut [&mut client]).unwrap();

    let expected: HashSet<u16> = [3, 6, 8, 10].into_iter().collect();
    assert!(client.entity.tags.set_equals(&expected));
    assert_converged!(server, client);
}

#[test]
fn set_bulk_operations_arrive_as_element_events() {
    let (mut server, mut client) = setup();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    client
        .entity
        .tags
        .on_change(move |event: &SetEvent<u16>| sink.borrow_mut().push(event.clone()));

    server.entity.tags.union_with([5, 6, 7]).unwrap();
    exchange_packets(&mut server, &mut [&mut client]).unwrap();

    let events = seen.borrow();
    assert_eq!(events.len(), 3);
    assert!(events
        .iter()
        .all(|event| matches!(event, SetEvent::Add { .. })));
}

#[test]
fn set_clear_converges() {
    let (mut server, mut client) = setup();
    server.entity.tags.union_with([1, 2, 3]).unwrap();
    exchange_packets(&mut server, &mut [&mut client]).unwrap();
    assert_eq!(client.entity.tags.len(), 3);

    server.entity.tags.clear().unwrap();
    server.entity.tags.insert(9).unwrap();
    exchange_packets(&mut server, &mut [&mut client]).unwrap();

    assert_eq!(client.entity.tag_set(), HashSet::from([9]));
}
