/// PROPERTY-BASED TESTS: mirrors converge on the server's state
///
/// Uses proptest to drive random mutator sequences against the server's
/// containers, replicating in random-sized batches.
///
/// Key invariants:
/// 1. After every exchange, each client's mirror equals the server's snapshot
/// 2. A client joining at any point converges from the snapshot alone
/// 3. Rejected mutations never leak into the update stream

use proptest::prelude::*;

use netcoll_shared::{ReplicationError, SyncConfig};
use netcoll_test::{assert_converged, exchange_packets, TestClient, TestEntity, TestServer};

#[derive(Clone, Debug)]
enum Op {
    ListPush(u32),
    ListInsert(usize, u32),
    ListRemoveAt(usize),
    ListRemove(u32),
    ListSet(usize, u32),
    ListClear,
    DictAdd(u8, u32),
    DictSet(u8, u32),
    DictRemove(u8),
    DictRemovePair(u8, u32),
    DictClear,
    SetInsert(u16),
    SetRemove(u16),
    SetUnion(Vec<u16>),
    SetIntersect(Vec<u16>),
    SetSymmetricExcept(Vec<u16>),
    SetClear,
}

// Small value domains so removals and duplicates actually hit
fn op_strategy() -> impl Strategy<Value = Op> {
    let small = 0u32..8;
    let tag = 0u16..12;
    prop_oneof![
        4 => small.clone().prop_map(Op::ListPush),
        2 => (any::<usize>(), small.clone()).prop_map(|(i, v)| Op::ListInsert(i, v)),
        2 => any::<usize>().prop_map(Op::ListRemoveAt),
        2 => small.clone().prop_map(Op::ListRemove),
        2 => (any::<usize>(), small.clone()).prop_map(|(i, v)| Op::ListSet(i, v)),
        1 => Just(Op::ListClear),
        3 => (0u8..6, small.clone()).prop_map(|(k, v)| Op::DictAdd(k, v)),
        2 => (0u8..6, small.clone()).prop_map(|(k, v)| Op::DictSet(k, v)),
        2 => (0u8..6).prop_map(Op::DictRemove),
        2 => (0u8..6, small).prop_map(|(k, v)| Op::DictRemovePair(k, v)),
        1 => Just(Op::DictClear),
        3 => tag.clone().prop_map(Op::SetInsert),
        2 => tag.clone().prop_map(Op::SetRemove),
        1 => prop::collection::vec(tag.clone(), 0..6).prop_map(Op::SetUnion),
        1 => prop::collection::vec(tag.clone(), 0..6).prop_map(Op::SetIntersect),
        1 => prop::collection::vec(tag, 0..6).prop_map(Op::SetSymmetricExcept),
        1 => Just(Op::SetClear),
    ]
}

fn key(k: u8) -> String {
    format!("key-{}", k)
}

/// Applies `op`, mapping random indices onto the current length. Returns the
/// error a rejected mutation reported, if any.
fn apply(entity: &mut TestEntity, op: &Op) -> Result<(), ReplicationError> {
    match op.clone() {
        Op::ListPush(v) => entity.list.push(v),
        Op::ListInsert(i, v) => entity.list.insert(i % (entity.list.len() + 1), v),
        Op::ListRemoveAt(i) => {
            if entity.list.is_empty() {
                return Ok(());
            }
            entity.list.remove_at(i % entity.list.len()).map(|_| ())
        }
        Op::ListRemove(v) => entity.list.remove(&v).map(|_| ()),
        Op::ListSet(i, v) => {
            if entity.list.is_empty() {
                return Ok(());
            }
            entity.list.set(i % entity.list.len(), v)
        }
        Op::ListClear => entity.list.clear(),
        Op::DictAdd(k, v) => entity.scores.add(key(k), v),
        Op::DictSet(k, v) => entity.scores.set(key(k), v).map(|_| ()),
        Op::DictRemove(k) => entity.scores.remove(&key(k)).map(|_| ()),
        Op::DictRemovePair(k, v) => entity.scores.remove_pair(&key(k), &v).map(|_| ()),
        Op::DictClear => entity.scores.clear(),
        Op::SetInsert(v) => entity.tags.insert(v).map(|_| ()),
        Op::SetRemove(v) => entity.tags.remove(&v).map(|_| ()),
        Op::SetUnion(values) => entity.tags.union_with(values),
        Op::SetIntersect(values) => entity.tags.intersect_with(values),
        Op::SetSymmetricExcept(values) => entity.tags.symmetric_except_with(values),
        Op::SetClear => entity.tags.clear(),
    }
}

proptest! {
    /// Test that every client converges after each batch of server mutations
    #[test]
    fn prop_mirrors_converge_after_each_exchange(
        batches in prop::collection::vec(prop::collection::vec(op_strategy(), 0..12), 1..8),
        length_safety in any::<bool>(),
    ) {
        let config = SyncConfig { length_safety };
        let mut server = TestServer::new(1, Default::default(), config.clone()).unwrap();
        let mut first = TestClient::new(1, 1, Default::default(), config.clone()).unwrap();
        let mut second = TestClient::new(2, 1, Default::default(), config).unwrap();
        server.connect(&mut first).unwrap();
        server.connect(&mut second).unwrap();

        for batch in &batches {
            for op in batch {
                match apply(&mut server.entity, op) {
                    Ok(()) | Err(ReplicationError::KeyAlreadyExists { .. }) => {}
                    Err(error) => {
                        prop_assert!(false, "unexpected error {:?} for {:?}", error, op);
                    }
                }
            }
            exchange_packets(&mut server, &mut [&mut first, &mut second]).unwrap();
            assert_converged!(server, first);
            assert_converged!(server, second);
        }
    }

    /// Test that a client joining after any history converges from the snapshot
    #[test]
    fn prop_late_joiner_converges(
        before in prop::collection::vec(op_strategy(), 0..24),
        after in prop::collection::vec(op_strategy(), 0..24),
    ) {
        let config = SyncConfig::default();
        let mut server = TestServer::new(1, Default::default(), config.clone()).unwrap();
        let mut early = TestClient::new(1, 1, Default::default(), config.clone()).unwrap();
        server.connect(&mut early).unwrap();

        for op in &before {
            let _ = apply(&mut server.entity, op);
        }
        exchange_packets(&mut server, &mut [&mut early]).unwrap();

        let mut late = TestClient::new(2, 1, Default::default(), config).unwrap();
        server.connect(&mut late).unwrap();
        assert_converged!(server, late);

        for op in &after {
            let _ = apply(&mut server.entity, op);
        }
        exchange_packets(&mut server, &mut [&mut early, &mut late]).unwrap();
        assert_converged!(server, early);
        assert_converged!(server, late);
    }

    /// Test that a rejected mutation leaves no trace in the next update
    #[test]
    fn prop_rejected_add_sends_nothing(k in 0u8..6, v in 0u32..8) {
        let mut server = TestServer::new(1, Default::default(), SyncConfig::default()).unwrap();
        let mut client = TestClient::new(1, 1, Default::default(), SyncConfig::default()).unwrap();
        server.connect(&mut client).unwrap();

        server.entity.scores.add(key(k), v).unwrap();
        exchange_packets(&mut server, &mut [&mut client]).unwrap();

        let rejected = server.entity.scores.add(key(k), v + 1);
        let is_key_exists = matches!(rejected, Err(ReplicationError::KeyAlreadyExists { .. }));
        prop_assert!(is_key_exists);
        prop_assert!(server.send_updates().unwrap().is_empty());
        prop_assert_eq!(client.entity.scores.get(&key(k)), Some(&v));
    }
}
