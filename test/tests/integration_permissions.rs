/// INTEGRATION TESTS: write and read permissions across server and clients

use std::rc::Rc;

use netcoll_shared::{ClientId, ReplicationError, ReplicationPermission, SyncConfig, VariableSettings};
use netcoll_test::{assert_converged, exchange_packets, TestClient, TestServer};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn owner_write_is_forwarded_to_other_clients() {
    init_logging();
    let settings = VariableSettings {
        write_permission: ReplicationPermission::OwnerOnly,
        ..Default::default()
    };
    let config = SyncConfig::default();
    let mut server = TestServer::new(1, settings.clone(), config.clone()).unwrap();
    let mut owner = TestClient::new(1, 1, settings.clone(), config.clone()).unwrap();
    let mut other = TestClient::new(2, 1, settings, config).unwrap();
    server.connect(&mut owner).unwrap();
    server.connect(&mut other).unwrap();

    owner.entity.tags.insert(5).unwrap();
    // echoed locally, applied once the server confirms it
    assert!(owner.entity.tags.is_empty());

    assert_eq!(
        other.entity.tags.insert(6),
        Err(ReplicationError::PermissionDenied {
            kind: "ReplicatedSet",
            client: 2,
            operation: "insert"
        })
    );

    exchange_packets(&mut server, &mut [&mut owner, &mut other]).unwrap();
    assert!(server.entity.tags.contains(&5));
    assert_converged!(server, owner);
    assert_converged!(server, other);
}

#[test]
fn owner_only_read_hides_contents_from_other_clients() {
    init_logging();
    let settings = VariableSettings {
        read_permission: ReplicationPermission::OwnerOnly,
        ..Default::default()
    };
    let config = SyncConfig::default();
    let mut server = TestServer::new(1, settings.clone(), config.clone()).unwrap();
    let mut owner = TestClient::new(1, 1, settings.clone(), config.clone()).unwrap();
    let mut other = TestClient::new(2, 1, settings.clone(), config.clone()).unwrap();
    server.connect(&mut owner).unwrap();
    server.connect(&mut other).unwrap();

    server.entity.list.push(10).unwrap();
    server.entity.scores.add("secret".to_string(), 1).unwrap();
    exchange_packets(&mut server, &mut [&mut owner, &mut other]).unwrap();

    assert_converged!(server, owner);
    assert!(other.entity.list.is_empty());
    assert!(other.entity.scores.is_empty());

    // a late joiner that isn't the owner gets nothing either
    let mut late = TestClient::new(3, 1, settings, config).unwrap();
    assert_eq!(server.connect(&mut late), Ok(0));
    assert!(late.entity.list.is_empty());
}

#[test]
fn forbidden_client_write_is_skipped_with_length_safety() {
    init_logging();
    let config = SyncConfig {
        length_safety: true,
    };
    let permissive = VariableSettings {
        write_permission: ReplicationPermission::Everyone,
        ..Default::default()
    };
    let mut server = TestServer::new(1, VariableSettings::default(), config.clone()).unwrap();
    // this client believes it may write
    let mut client = TestClient::new(1, 1, permissive, config).unwrap();
    server.connect(&mut client).unwrap();

    client.entity.list.push(99).unwrap();
    server.entity.tags.insert(4).unwrap();
    exchange_packets(&mut server, &mut [&mut client]).unwrap();

    assert!(server.entity.list.is_empty());
    assert_converged!(server, client);
}

#[test]
fn forbidden_client_write_aborts_update_without_length_safety() {
    init_logging();
    let config = SyncConfig::default();
    let permissive = VariableSettings {
        write_permission: ReplicationPermission::Everyone,
        ..Default::default()
    };
    let mut server = TestServer::new(1, VariableSettings::default(), config.clone()).unwrap();
    let mut client = TestClient::new(1, 1, permissive, config).unwrap();
    server.connect(&mut client).unwrap();

    client.entity.scores.set("cheat".to_string(), 1000).unwrap();
    let result = exchange_packets(&mut server, &mut [&mut client]);

    assert_eq!(
        result,
        Err(ReplicationError::ClientWriteDenied {
            client: 1,
            variable: 1
        })
    );
    assert!(server.entity.scores.is_empty());
}

#[test]
fn custom_predicate_decides_who_may_write() {
    init_logging();
    let settings = VariableSettings {
        write_permission: ReplicationPermission::Custom,
        write_predicate: Some(Rc::new(|client: ClientId| client % 2 == 0)),
        ..Default::default()
    };
    let config = SyncConfig::default();
    let mut server = TestServer::new(1, settings.clone(), config.clone()).unwrap();
    let mut even = TestClient::new(2, 1, settings.clone(), config.clone()).unwrap();
    let mut odd = TestClient::new(3, 1, settings, config).unwrap();
    server.connect(&mut even).unwrap();
    server.connect(&mut odd).unwrap();

    even.entity.list.push(2).unwrap();
    assert!(matches!(
        odd.entity.list.push(3),
        Err(ReplicationError::PermissionDenied { client: 3, .. })
    ));

    exchange_packets(&mut server, &mut [&mut even, &mut odd]).unwrap();
    assert_eq!(server.entity.list.as_slice(), &[2]);
    assert_converged!(server, odd);
}
