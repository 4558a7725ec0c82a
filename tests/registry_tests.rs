use lanwarden::model::DeviceStatus;
use lanwarden::registry::{ApplyOutcome, Registry, RegistryEvent};
use test_utils::create_test_record;


#[tokio::test]
async fn test_apply_new_record_emits_added() {
    let registry = Registry::new();
    let mut events = registry.subscribe();

    let record = create_test_record("192.168.1.10", &[80]);
    let outcome = registry.apply(record.clone()).await;

    assert_eq!(outcome, ApplyOutcome::Added);
    assert_eq!(registry.len().await, 1);
    match events.try_recv().unwrap() {
        RegistryEvent::Added(r) => assert_eq!(r.address, record.address),
        other => panic!("expected Added, got {:?}", other),
    }
}

#[tokio::test]
async fn test_apply_identical_record_is_a_refresh() {
    let registry = Registry::new();
    let record = create_test_record("192.168.1.10", &[80]);

    registry.apply(record.clone()).await;
    let mut events = registry.subscribe();

    // Second apply of the same record: no event, just a refresh
    let outcome = registry.apply(record).await;
    assert_eq!(outcome, ApplyOutcome::Refreshed);
    assert!(events.try_recv().is_err());
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn test_apply_with_flipped_status_emits_status_changed() {
    let registry = Registry::new();
    let record = create_test_record("192.168.1.10", &[80]);
    registry.apply(record.clone()).await;

    let mut events = registry.subscribe();
    let mut offline = record;
    offline.status = DeviceStatus::Offline;
    let outcome = registry.apply(offline).await;

    assert_eq!(outcome, ApplyOutcome::StatusChanged);
    match events.try_recv().unwrap() {
        RegistryEvent::StatusChanged { old, new, .. } => {
            assert_eq!(old, DeviceStatus::Online);
            assert_eq!(new, DeviceStatus::Offline);
        }
        other => panic!("expected StatusChanged, got {:?}", other),
    }
}

#[tokio::test]
async fn test_mark_offline_transitions_exactly_once() {
    let registry = Registry::new();
    let record = create_test_record("192.168.1.20", &[22]);
    let address = record.address;
    registry.apply(record).await;

    let mut events = registry.subscribe();

    assert!(registry.mark_offline(address).await);
    // Already offline: no second transition, no second event
    assert!(!registry.mark_offline(address).await);

    match events.try_recv().unwrap() {
        RegistryEvent::StatusChanged { new, .. } => assert_eq!(new, DeviceStatus::Offline),
        other => panic!("expected StatusChanged, got {:?}", other),
    }
    assert!(events.try_recv().is_err());

    // The record is marked, never deleted
    let stored = registry.get(address).await.unwrap();
    assert_eq!(stored.status, DeviceStatus::Offline);
}

#[tokio::test]
async fn test_mark_offline_unknown_address_is_noop() {
    let registry = Registry::new();
    assert!(!registry.mark_offline("10.0.0.1".parse().unwrap()).await);
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_mark_online_refreshes_last_seen_and_flips_back() {
    let registry = Registry::new();
    let record = create_test_record("192.168.1.30", &[80]);
    let address = record.address;
    let original_seen = record.last_seen;
    registry.apply(record).await;
    registry.mark_offline(address).await;

    assert!(registry.mark_online(address).await);
    let stored = registry.get(address).await.unwrap();
    assert_eq!(stored.status, DeviceStatus::Online);
    assert!(stored.last_seen >= original_seen);

    // Still online: refresh only, no transition
    assert!(!registry.mark_online(address).await);
}

#[tokio::test]
async fn test_snapshot_is_a_point_in_time_copy() {
    let registry = Registry::new();
    let record = create_test_record("192.168.1.40", &[80]);
    let address = record.address;
    registry.apply(record).await;

    let snapshot = registry.snapshot().await;
    registry.mark_offline(address).await;

    // The snapshot is unaffected by later mutation
    assert_eq!(snapshot[&address].status, DeviceStatus::Online);
    assert_eq!(
        registry.get(address).await.unwrap().status,
        DeviceStatus::Offline
    );
}

#[tokio::test]
async fn test_list_is_sorted_by_address() {
    let registry = Registry::new();
    registry.apply(create_test_record("192.168.1.9", &[])).await;
    registry.apply(create_test_record("192.168.1.2", &[])).await;
    registry.apply(create_test_record("192.168.1.5", &[])).await;

    let records = registry.list().await;
    let addresses: Vec<String> = records.iter().map(|r| r.address.to_string()).collect();
    assert_eq!(addresses, vec!["192.168.1.2", "192.168.1.5", "192.168.1.9"]);
}

#[tokio::test]
async fn test_concurrent_applies_do_not_lose_records() {
    use std::sync::Arc;

    let registry = Arc::new(Registry::new());
    let mut handles = Vec::new();
    for i in 1..=50u8 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            let record = create_test_record(&format!("10.0.0.{}", i), &[80]);
            registry.apply(record).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), ApplyOutcome::Added);
    }
    assert_eq!(registry.len().await, 50);
}
